//! The attributed element tree handed over by the upstream document
//! parser, plus the document-wide definition index.

use std::collections::BTreeMap;

use kurbo::{BezPath, Point};

use crate::error::{StrataError, StrataResult};

/// Viewport lengths are integers in the document model; the builder
/// widens them when composing the root transform.
pub type Length = i64;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Document {
    pub width: Length,
    pub height: Length,
    #[serde(default)]
    pub view_box: Option<ViewBox>,
    #[serde(default)]
    pub defs: Definitions,
    #[serde(default)]
    pub children: Vec<Element>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Built once per document and read-only while building.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Definitions {
    #[serde(default)]
    pub clip_paths: Vec<ClipPathDef>,
    #[serde(default)]
    pub masks: Vec<MaskDef>,
    #[serde(default)]
    pub elements: BTreeMap<String, Element>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ClipPathDef {
    pub id: String,
    #[serde(default)]
    pub children: Vec<Element>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MaskDef {
    pub id: String,
    #[serde(default)]
    pub children: Vec<Element>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Element {
    #[serde(default)]
    pub attributes: PresentationAttributes,
    pub kind: ElementKind,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            attributes: PresentationAttributes::default(),
            kind,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum ElementKind {
    Shape(Shape),
    Text(TextSpan),
    Image(ImageRef),
    Use(UseRef),
    Switch(Vec<Element>),
    Group(Vec<Element>),
    ClipPath(ClipPathDef),
    Mask(MaskDef),
    Pattern(Vec<Element>),
}

impl ElementKind {
    /// Container-ness is a capability of the variant, not a cast.
    pub fn child_elements(&self) -> Option<&[Element]> {
        match self {
            Self::Group(children) | Self::Switch(children) | Self::Pattern(children) => {
                Some(children)
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PresentationAttributes {
    pub opacity: Option<f32>,
    pub display: Option<DisplayMode>,

    pub stroke: Option<Color>,
    pub stroke_width: Option<f32>,
    pub stroke_opacity: Option<f32>,
    pub stroke_line_cap: Option<LineCap>,
    pub stroke_line_join: Option<LineJoin>,
    pub stroke_miter_limit: Option<f32>,
    pub stroke_dash_array: Option<Vec<f32>>,

    pub fill: Option<Paint>,
    pub fill_opacity: Option<f32>,
    pub fill_rule: Option<FillRule>,

    pub transform: Option<Vec<TransformOp>>,
    pub clip_path: Option<String>,
    pub mask: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rx: Option<f64>,
        ry: Option<f64>,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Polyline {
        points: Vec<Point>,
    },
    Polygon {
        points: Vec<Point>,
    },
    Path(BezPath),
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TextSpan {
    pub value: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ImageRef {
    /// A `data:` URI holding the encoded payload.
    pub href: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct UseRef {
    /// Fragment id of the referenced definition.
    pub href: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Document-level transform operation, angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TransformOp {
    Matrix {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        e: f64,
        f: f64,
    },
    Translate {
        tx: f64,
        ty: f64,
    },
    Scale {
        sx: f64,
        sy: f64,
    },
    Rotate {
        angle: f64,
    },
    RotatePoint {
        angle: f64,
        cx: f64,
        cy: f64,
    },
    SkewX {
        angle: f64,
    },
    SkewY {
        angle: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Color {
    None,
    Rgb(u8, u8, u8),
}

impl Color {
    pub fn black() -> Self {
        Self::Rgb(0, 0, 0)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Paint {
    Color(Color),
    /// `url(#id)` paint reference, typically to a pattern definition.
    Reference(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DisplayMode {
    Inline,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

impl Document {
    pub fn validate(&self) -> StrataResult<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(StrataError::validation("viewport width/height must be > 0"));
        }
        if let Some(vb) = &self.view_box {
            if vb.width <= 0.0 || vb.height <= 0.0 {
                return Err(StrataError::validation("view box width/height must be > 0"));
            }
        }
        for def in &self.defs.clip_paths {
            if def.id.trim().is_empty() {
                return Err(StrataError::validation("clip path definition must have an id"));
            }
        }
        for def in &self.defs.masks {
            if def.id.trim().is_empty() {
                return Err(StrataError::validation("mask definition must have an id"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containers_expose_children() {
        let group = ElementKind::Group(vec![Element::new(ElementKind::Shape(Shape::Circle {
            cx: 0.0,
            cy: 0.0,
            r: 1.0,
        }))]);
        assert_eq!(group.child_elements().map(<[Element]>::len), Some(1));

        let shape = ElementKind::Shape(Shape::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 1.0,
        });
        assert!(shape.child_elements().is_none());
    }

    #[test]
    fn validate_rejects_degenerate_viewports() {
        let doc = Document {
            width: 0,
            height: 10,
            view_box: None,
            defs: Definitions::default(),
            children: vec![],
        };
        assert!(doc.validate().is_err());

        let doc = Document {
            width: 10,
            height: 10,
            view_box: Some(ViewBox {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 10.0,
            }),
            defs: Definitions::default(),
            children: vec![],
        };
        assert!(doc.validate().is_err());
    }
}
