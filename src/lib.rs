//! Interactive 2D chart plotting core.
//!
//! Takes loosely formatted numeric text, turns it into styled traces,
//! lays out axes with nice ticks, fits curves, and renders the figure
//! to SVG. The crate holds all plotting state and drawing logic; a
//! front end only forwards edits and displays the rendered output.

pub mod axis;
pub mod config;
pub mod error;
pub mod export;
pub mod expr;
pub mod fit;
pub mod parse;
pub mod render;
pub mod style;
pub mod trace;

pub use config::PlotConfig;
pub use error::{PlotError, PlotResult};
pub use render::Chart;
pub use trace::list::TraceList;
pub use trace::Trace;
