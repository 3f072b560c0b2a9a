//! Per-trace visual styling.

use crate::style::{Color, DashPattern, Marker};

/// How a trace is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotType {
    #[default]
    Line,
    Scatter,
    LineAndScatter,
    Area,
    LineAndArea,
}

impl PlotType {
    pub fn has_line(self) -> bool {
        !matches!(self, PlotType::Scatter)
    }

    pub fn has_markers(self) -> bool {
        matches!(self, PlotType::Scatter | PlotType::LineAndScatter)
    }

    pub fn has_area(self) -> bool {
        matches!(self, PlotType::Area | PlotType::LineAndArea)
    }
}

/// Error bar presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorBarMode {
    #[default]
    Off,
    /// Bars on both axes where error columns exist
    Bar,
    /// Bars on the x axis only
    XBar,
    /// Bars on the y axis only
    YBar,
    /// Shaded band around the y values
    Area,
}

impl ErrorBarMode {
    pub fn shows_x(self) -> bool {
        matches!(self, ErrorBarMode::Bar | ErrorBarMode::XBar)
    }

    pub fn shows_y(self) -> bool {
        matches!(self, ErrorBarMode::Bar | ErrorBarMode::YBar | ErrorBarMode::Area)
    }
}

/// Error bar styling.
#[derive(Debug, Clone)]
pub struct ErrorBarStyle {
    pub mode: ErrorBarMode,
    pub color: Color,
    pub opacity: f64,
    pub dash: DashPattern,
    pub stroke_width: f64,
    /// Cap width as a multiple of the stroke width
    pub cap_width_multiplier: f64,
    /// Apply the x axis transform to the x error column
    pub transform_x: bool,
    /// Apply the y axis transform to the y error column
    pub transform_y: bool,
}

impl Default for ErrorBarStyle {
    fn default() -> Self {
        ErrorBarStyle {
            mode: ErrorBarMode::Off,
            color: Color::BLACK,
            opacity: 1.0,
            dash: DashPattern::Solid,
            stroke_width: 2.0,
            cap_width_multiplier: 2.5,
            transform_x: false,
            transform_y: false,
        }
    }
}

/// Full visual style of one trace.
#[derive(Debug, Clone)]
pub struct TraceStyle {
    /// Axis transform expression for x values ("x" is the identity)
    pub x_scaling: String,
    /// Axis transform expression for y values ("y" is the identity)
    pub y_scaling: String,
    pub plot_type: PlotType,
    pub marker: Marker,
    pub marker_size: f64,
    pub marker_color: Color,
    pub line_color: Color,
    pub line_width: f64,
    pub dash: DashPattern,
    pub error_bar: ErrorBarStyle,
}

impl TraceStyle {
    /// Style applied to synthesized fit curve traces.
    pub fn fit_default() -> Self {
        TraceStyle {
            line_color: Color::RED,
            line_width: 2.0,
            ..Default::default()
        }
    }
}

impl Default for TraceStyle {
    fn default() -> Self {
        TraceStyle {
            x_scaling: "x".to_string(),
            y_scaling: "y".to_string(),
            plot_type: PlotType::Line,
            marker: Marker::Circle,
            marker_size: 10.0,
            marker_color: Color::RED,
            line_color: Color::BLACK,
            line_width: 1.5,
            dash: DashPattern::Solid,
            error_bar: ErrorBarStyle::default(),
        }
    }
}
