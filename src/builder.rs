//! Recursive transducer from the attributed element tree to the layer
//! tree: cascades presentation state, resolves clip/mask/use/pattern
//! references against the definition index, and composes transforms.
//!
//! Per-branch resolution failures (a dangling use reference, an
//! undecodable image payload) are logged and downgraded to "no
//! contents"; the rest of the document always finishes building.

use anyhow::Context as _;
use base64::Engine as _;
use kurbo::Point;

use crate::{
    error::{StrataError, StrataResult},
    layer::{
        Contents, FillAttributes, FillPaint, Image, Layer, LayerColor, Pattern, StrokeAttributes,
        TextAttributes,
    },
    model::{
        Color, DisplayMode, Document, Element, ElementKind, ImageRef, Paint, Shape, TextSpan,
        UseRef,
    },
    state::State,
    transform::{self, Transform},
};

/// Builds the whole layer tree for `doc`.
#[tracing::instrument(skip_all)]
pub fn build_layer_tree(doc: &Document) -> Layer {
    Builder::new(doc).build()
}

pub struct Builder<'a> {
    doc: &'a Document,
    /// Use-reference ids currently being resolved on the call stack;
    /// a revisit is a reference cycle.
    active_references: Vec<String>,
}

impl<'a> Builder<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            active_references: Vec::new(),
        }
    }

    pub fn build(&mut self) -> Layer {
        let doc = self.doc;
        let state = State::default();
        let mut root = Layer::default();
        root.children = doc
            .children
            .iter()
            .map(|child| self.make_layer(child, &state))
            .collect();
        root.transform = transform::root_transform(doc.view_box, doc.width, doc.height);
        root
    }

    pub fn make_layer(&mut self, element: &'a Element, inheriting: &State) -> Layer {
        let state = State::for_element(&element.attributes, inheriting);
        let mut layer = Layer::default();

        if state.display != DisplayMode::Inline {
            // Still present in the tree, but visually inert.
            return layer;
        }

        layer.transform =
            transform::expand_all(element.attributes.transform.as_deref().unwrap_or(&[]));
        layer.clip = self.clip_shapes(element);
        layer.mask = self.mask_layer(element);
        layer.opacity = state.opacity;

        if let Some(contents) = self.make_contents(element, &state) {
            layer.contents = Some(contents);
        } else if let Some(children) = element.kind.child_elements() {
            layer.children = children
                .iter()
                .map(|child| self.make_layer(child, &state))
                .collect();
        }

        layer
    }

    fn make_contents(&mut self, element: &'a Element, state: &State) -> Option<Contents> {
        match &element.kind {
            ElementKind::Shape(shape) => Some(self.shape_contents(shape.clone(), state)),
            ElementKind::Text(text) => Some(text_contents(text)),
            ElementKind::Image(image) => match image_contents(image) {
                Ok(contents) => Some(contents),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping undecodable image");
                    None
                }
            },
            ElementKind::Use(use_ref) => match self.use_contents(use_ref, state) {
                Ok(contents) => Some(contents),
                Err(e) => {
                    tracing::warn!(href = %use_ref.href, error = %e, "dropping unresolvable use reference");
                    None
                }
            },
            // A switch delegates to its first child, visible or not.
            ElementKind::Switch(children) => children
                .first()
                .map(|first| Contents::Layer(Box::new(self.make_layer(first, state)))),
            _ => None,
        }
    }

    fn shape_contents(&mut self, shape: Shape, state: &State) -> Contents {
        Contents::Shape {
            shape,
            stroke: stroke_attributes(state),
            fill: self.fill_attributes(state),
        }
    }

    fn fill_attributes(&mut self, state: &State) -> FillAttributes {
        let fill = match &state.fill {
            Paint::Color(color) => {
                FillPaint::Color(LayerColor::from(*color).with_alpha(state.fill_opacity))
            }
            Paint::Reference(id) => match self.pattern(id) {
                Some(pattern) => FillPaint::Pattern(pattern),
                None => {
                    tracing::warn!(id = %id, "fill reference does not name a pattern, using black");
                    FillPaint::Color(LayerColor::from(Color::black()).with_alpha(state.fill_opacity))
                }
            },
        };
        FillAttributes {
            fill,
            rule: state.fill_rule,
        }
    }

    fn pattern(&mut self, id: &str) -> Option<Pattern> {
        let doc = self.doc;
        let element = doc.defs.elements.get(id)?;
        let ElementKind::Pattern(children) = &element.kind else {
            return None;
        };
        Some(self.make_pattern(children))
    }

    /// Pattern contents are built once against a fresh default state;
    /// they never inherit from the element referencing the pattern.
    pub fn make_pattern(&mut self, children: &'a [Element]) -> Pattern {
        let state = State::default();
        Pattern {
            contents: children
                .iter()
                .filter_map(|child| self.make_contents(child, &state))
                .collect(),
        }
    }

    fn use_contents(&mut self, use_ref: &UseRef, state: &State) -> StrataResult<Contents> {
        let doc = self.doc;
        let element = doc.defs.elements.get(&use_ref.href).ok_or_else(|| {
            StrataError::invalid_reference(format!("missing referenced element: {}", use_ref.href))
        })?;

        if self.active_references.iter().any(|id| id == &use_ref.href) {
            return Err(StrataError::invalid_reference(format!(
                "reference cycle through: {}",
                use_ref.href
            )));
        }

        self.active_references.push(use_ref.href.clone());
        let mut layer = self.make_layer(element, state);
        self.active_references.pop();

        let x = use_ref.x.unwrap_or(0.0);
        let y = use_ref.y.unwrap_or(0.0);
        if x != 0.0 || y != 0.0 {
            layer.transform.insert(0, Transform::Translate { tx: x, ty: y });
        }

        Ok(Contents::Layer(Box::new(layer)))
    }

    /// Direct shape children of the referenced clip path; non-shape
    /// children and deeper nesting are silently ignored. A dangling or
    /// absent reference is an empty clip, not an error.
    fn clip_shapes(&self, element: &Element) -> Vec<Shape> {
        let Some(clip_id) = &element.attributes.clip_path else {
            return Vec::new();
        };
        let Some(clip) = self.doc.defs.clip_paths.iter().find(|c| &c.id == clip_id) else {
            return Vec::new();
        };
        clip.children
            .iter()
            .filter_map(|child| match &child.kind {
                ElementKind::Shape(shape) => Some(shape.clone()),
                _ => None,
            })
            .collect()
    }

    /// Mask contents never inherit the referencing element's state.
    fn mask_layer(&mut self, element: &Element) -> Option<Box<Layer>> {
        let mask_id = element.attributes.mask.as_ref()?;
        let doc = self.doc;
        let mask = doc.defs.masks.iter().find(|m| &m.id == mask_id)?;

        let mut layer = Layer::default();
        layer.children = mask
            .children
            .iter()
            .map(|child| self.make_layer(child, &State::default()))
            .collect();
        Some(Box::new(layer))
    }
}

fn stroke_attributes(state: &State) -> StrokeAttributes {
    let color = if state.stroke_width > 0.0 {
        LayerColor::from(state.stroke).with_alpha(state.stroke_opacity)
    } else {
        LayerColor::None
    };
    StrokeAttributes {
        color,
        width: state.stroke_width,
        cap: state.stroke_line_cap,
        join: state.stroke_line_join,
        miter_limit: state.stroke_miter_limit,
        dash_array: state.stroke_dash_array.clone(),
    }
}

fn text_contents(text: &TextSpan) -> Contents {
    let point = Point::new(text.x.unwrap_or(0.0), text.y.unwrap_or(0.0));
    let mut attributes = TextAttributes::normal();
    if let Some(family) = &text.font_family {
        attributes.font_family = family.clone();
    }
    if let Some(size) = text.font_size {
        attributes.size = size;
    }
    Contents::Text {
        text: text.value.clone(),
        point,
        attributes,
    }
}

fn image_contents(image: &ImageRef) -> StrataResult<Contents> {
    let (mime, data) = decode_data_uri(&image.href)?;
    let decoded = image::load_from_memory(&data).context("decode embedded image")?;
    Ok(Contents::Image(Image {
        mime,
        width: decoded.width(),
        height: decoded.height(),
        data,
    }))
}

fn decode_data_uri(href: &str) -> StrataResult<(String, Vec<u8>)> {
    let rest = href
        .strip_prefix("data:")
        .ok_or_else(|| StrataError::invalid_reference(format!("not a data URI: {href}")))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| StrataError::invalid_reference("data URI has no payload"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| StrataError::invalid_reference("data URI payload is not base64"))?;
    let data = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| StrataError::invalid_reference(format!("invalid base64 payload: {e}")))?;
    Ok((mime.to_string(), data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Definitions, PresentationAttributes, TransformOp};

    fn circle() -> Shape {
        Shape::Circle {
            cx: 0.0,
            cy: 0.0,
            r: 1.0,
        }
    }

    fn empty_doc() -> Document {
        Document {
            width: 10,
            height: 10,
            view_box: None,
            defs: Definitions::default(),
            children: vec![],
        }
    }

    #[test]
    fn display_none_yields_an_inert_layer() {
        let element = Element {
            attributes: PresentationAttributes {
                display: Some(DisplayMode::None),
                opacity: Some(0.5),
                transform: Some(vec![TransformOp::Translate { tx: 5.0, ty: 5.0 }]),
                ..Default::default()
            },
            kind: ElementKind::Shape(circle()),
        };
        let doc = empty_doc();
        let layer = Builder::new(&doc).make_layer(&element, &State::default());
        assert_eq!(layer, Layer::default());
    }

    #[test]
    fn effective_opacity_is_own_or_one() {
        let doc = empty_doc();
        let parent_state = State {
            opacity: 0.25,
            ..State::default()
        };

        let element = Element::new(ElementKind::Shape(circle()));
        let layer = Builder::new(&doc).make_layer(&element, &parent_state);
        assert_eq!(layer.opacity, 1.0);
    }

    #[test]
    fn zero_stroke_width_drops_the_stroke_color() {
        let state = State {
            stroke: Color::Rgb(255, 0, 0),
            stroke_width: 0.0,
            ..State::default()
        };
        assert_eq!(stroke_attributes(&state).color, LayerColor::None);
    }

    #[test]
    fn text_defaults_and_overrides() {
        let span = TextSpan {
            value: "hi".to_string(),
            x: None,
            y: Some(4.0),
            font_family: Some("Menlo".to_string()),
            font_size: None,
        };
        let Contents::Text {
            text,
            point,
            attributes,
        } = text_contents(&span)
        else {
            panic!("expected text contents");
        };
        assert_eq!(text, "hi");
        assert_eq!(point, Point::new(0.0, 4.0));
        assert_eq!(attributes.font_family, "Menlo");
        assert_eq!(attributes.size, 12.0);
    }

    #[test]
    fn data_uri_decodes_mime_and_payload() {
        let (mime, data) = decode_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(data, b"hello");

        assert!(decode_data_uri("http://example.com/x.png").is_err());
        assert!(decode_data_uri("data:image/png;base64,!!").is_err());
        assert!(decode_data_uri("data:image/png,plain").is_err());
    }

    #[test]
    fn undecodable_image_degrades_to_no_contents() {
        let doc = empty_doc();
        let element = Element::new(ElementKind::Image(ImageRef {
            // valid base64, not a decodable image
            href: "data:image/png;base64,aGVsbG8=".to_string(),
        }));
        let layer = Builder::new(&doc).make_layer(&element, &State::default());
        assert!(layer.contents.is_none());
        assert!(layer.children.is_empty());
    }
}
