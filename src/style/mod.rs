//! Visual style primitives shared by traces and the renderer.

mod color;
mod fill;
mod line;
mod marker;
mod text;

pub use color::{Color, ColorCycle, KELLY_COLORS};
pub use fill::FillStyle;
pub use line::{DashPattern, LineStyle};
pub use marker::{Marker, MarkerStyle};
pub use text::{escape_xml, TextAnchor, TextBaseline, TextStyle};
