#![forbid(unsafe_code)]

pub mod builder;
pub mod error;
pub mod layer;
pub mod model;
pub mod parse;
pub mod scanner;
pub mod state;
pub mod transform;

pub use builder::{Builder, build_layer_tree};
pub use error::{StrataError, StrataResult};
pub use layer::{Contents, FillPaint, Layer, LayerColor, Pattern};
pub use model::{Document, Element, ElementKind, Shape};
pub use scanner::{CharacterSet, ScanError, Scanner};
pub use state::State;
pub use transform::Transform;
