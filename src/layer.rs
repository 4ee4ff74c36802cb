//! Renderer-agnostic output tree. A layer is produced for every visited
//! element, even a visually inert one, so the tree mirrors the source
//! document's structural shape.

use kurbo::Point;

use crate::{
    model::{Color, FillRule, LineCap, LineJoin, Shape},
    transform::Transform,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    pub transform: Vec<Transform>,
    pub clip: Vec<Shape>,
    pub mask: Option<Box<Layer>>,
    pub opacity: f32,
    pub contents: Option<Contents>,
    pub children: Vec<Layer>,
}

impl Default for Layer {
    /// An inert layer: identity transform, full opacity, nothing else.
    fn default() -> Self {
        Self {
            transform: Vec::new(),
            clip: Vec::new(),
            mask: None,
            opacity: 1.0,
            contents: None,
            children: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Contents {
    Shape {
        shape: Shape,
        stroke: StrokeAttributes,
        fill: FillAttributes,
    },
    Text {
        text: String,
        point: Point,
        attributes: TextAttributes,
    },
    Image(Image),
    Layer(Box<Layer>),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeAttributes {
    pub color: LayerColor,
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
    pub dash_array: Vec<f32>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FillAttributes {
    pub fill: FillPaint,
    pub rule: FillRule,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum FillPaint {
    Color(LayerColor),
    Pattern(Pattern),
}

/// Content list of a pattern definition, built once against a fresh
/// default state, independent of any reference site.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pattern {
    pub contents: Vec<Contents>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum LayerColor {
    None,
    Rgba { r: f32, g: f32, b: f32, a: f32 },
}

impl LayerColor {
    pub fn with_alpha(self, alpha: f32) -> Self {
        match self {
            Self::None => Self::None,
            Self::Rgba { r, g, b, a } => Self::Rgba {
                r,
                g,
                b,
                a: a * alpha,
            },
        }
    }
}

impl From<Color> for LayerColor {
    fn from(color: Color) -> Self {
        match color {
            Color::None => Self::None,
            Color::Rgb(r, g, b) => Self::Rgba {
                r: f32::from(r) / 255.0,
                g: f32::from(g) / 255.0,
                b: f32::from(b) / 255.0,
                a: 1.0,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextAttributes {
    pub color: LayerColor,
    pub font_family: String,
    pub size: f32,
}

impl TextAttributes {
    /// Normal baseline style, before any declared font family/size.
    pub fn normal() -> Self {
        Self {
            color: LayerColor::from(Color::black()),
            font_family: "Helvetica".to_string(),
            size: 12.0,
        }
    }
}

/// Decoded embedded image payload; width/height come from the external
/// codec's decode call.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Image {
    pub mime: String,
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}
