//! Plot configuration.
//!
//! One value holds everything a redraw needs: figure geometry, axis
//! bounds, grid and legend settings, label text and font sizes, and
//! the import layout. Loadable from JSON; every field has a default so
//! partial files work.

use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::axis::{AxisLimits, Bound};
use crate::error::{PlotError, PlotResult};
use crate::parse::ColumnLayout;

/// Legend placement inside the plot frame.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LegendLocation {
    #[default]
    None,
    Northeast,
    Southeast,
    Southwest,
    Northwest,
}

/// Per-side axis visibility.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct AxisVisibility {
    #[serde(default = "default_true")]
    pub bottom: bool,
    #[serde(default = "default_true")]
    pub top: bool,
    #[serde(default = "default_true")]
    pub left: bool,
    #[serde(default = "default_true")]
    pub right: bool,
}

impl Default for AxisVisibility {
    fn default() -> Self {
        AxisVisibility {
            bottom: true,
            top: true,
            left: true,
            right: true,
        }
    }
}

/// Grid line toggles.
#[derive(Deserialize, Debug, Clone, Copy, Default)]
pub struct GridConfig {
    #[serde(default)]
    pub horizontal: bool,
    #[serde(default)]
    pub vertical: bool,
    #[serde(default)]
    pub horizontal_minor: bool,
    #[serde(default)]
    pub vertical_minor: bool,
}

/// Full plot configuration.
#[derive(Deserialize, Debug, Clone)]
pub struct PlotConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    /// Height/width ratio constraint; None leaves the figure free
    #[serde(default)]
    pub aspect_ratio: Option<f64>,

    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub x_label: String,
    #[serde(default)]
    pub y_label: String,

    #[serde(default)]
    pub x_start: Bound,
    #[serde(default)]
    pub x_end: Bound,
    #[serde(default)]
    pub y_start: Bound,
    #[serde(default)]
    pub y_end: Bound,
    /// Margin fraction added to each auto side of the x axis
    #[serde(default = "default_margin")]
    pub margin_x: f64,
    /// Margin fraction added to each auto side of the y axis
    #[serde(default = "default_margin")]
    pub margin_y: f64,

    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub legend_location: LegendLocation,
    #[serde(default)]
    pub axis_visible: AxisVisibility,

    /// Tick lengths in pixels; the axis stroke width is in tenths of a
    /// percent of the figure diagonal.
    #[serde(default = "default_major_tick_size")]
    pub major_tick_size: f64,
    #[serde(default = "default_minor_tick_size")]
    pub minor_tick_size: f64,
    #[serde(default = "default_axis_stroke_width")]
    pub axis_stroke_width: f64,

    #[serde(default = "default_axis_font_size")]
    pub axis_font_size: f64,
    #[serde(default = "default_label_font_size")]
    pub x_label_font_size: f64,
    #[serde(default = "default_label_font_size")]
    pub y_label_font_size: f64,
    #[serde(default = "default_title_font_size")]
    pub title_font_size: f64,
    #[serde(default = "default_axis_font")]
    pub axis_font: String,

    #[serde(default)]
    pub import_format: ColumnLayout,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_true() -> bool {
    true
}

fn default_width() -> f64 {
    800.0
}

fn default_height() -> f64 {
    600.0
}

fn default_margin() -> f64 {
    0.05
}

fn default_major_tick_size() -> f64 {
    6.0
}

fn default_minor_tick_size() -> f64 {
    4.0
}

fn default_axis_stroke_width() -> f64 {
    2.0
}

fn default_axis_font_size() -> f64 {
    1.25
}

fn default_label_font_size() -> f64 {
    1.5
}

fn default_title_font_size() -> f64 {
    2.0
}

fn default_axis_font() -> String {
    "sans-serif".to_string()
}

fn default_file_name() -> String {
    "exported_graph".to_string()
}

impl Default for PlotConfig {
    fn default() -> Self {
        // serde defaults are the single source of truth
        serde_json::from_str("{}").unwrap_or_else(|e| panic!("default config: {e}"))
    }
}

impl PlotConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> PlotResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: PlotConfig = serde_json::from_reader(reader)
            .map_err(|e| PlotError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PlotResult<()> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(PlotError::InvalidConfig(
                "figure dimensions must be positive".to_string(),
            ));
        }
        if self.margin_x < 0.0 || self.margin_y < 0.0 {
            return Err(PlotError::InvalidConfig(
                "axis margins cannot be negative".to_string(),
            ));
        }
        if let Some(ratio) = self.aspect_ratio {
            if ratio <= 0.0 {
                return Err(PlotError::InvalidConfig(
                    "aspect ratio must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn x_limits(&self) -> AxisLimits {
        AxisLimits {
            start: self.x_start,
            end: self.x_end,
        }
    }

    pub fn y_limits(&self) -> AxisLimits {
        AxisLimits {
            start: self.y_start,
            end: self.y_end,
        }
    }

    /// Fix both axes to an explicit window.
    pub fn zoom_to(&mut self, x0: f64, x1: f64, y0: f64, y1: f64) {
        self.x_start = Bound::Value(x0.min(x1));
        self.x_end = Bound::Value(x0.max(x1));
        self.y_start = Bound::Value(y0.min(y1));
        self.y_end = Bound::Value(y0.max(y1));
    }

    /// Shift the currently resolved window by a data-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64, x_window: (f64, f64), y_window: (f64, f64)) {
        self.x_start = Bound::Value(x_window.0 + dx);
        self.x_end = Bound::Value(x_window.1 + dx);
        self.y_start = Bound::Value(y_window.0 + dy);
        self.y_end = Bound::Value(y_window.1 + dy);
    }

    /// Back to automatic limits on both axes.
    pub fn reset_limits(&mut self) {
        self.x_start = Bound::Auto;
        self.x_end = Bound::Auto;
        self.y_start = Bound::Auto;
        self.y_end = Bound::Auto;
    }

    /// Figure width after the aspect ratio constraint.
    pub fn figure_width(&self) -> f64 {
        match self.aspect_ratio {
            None => self.width,
            Some(ratio) => self.width.min(self.height / ratio),
        }
    }

    /// Figure height after the aspect ratio constraint.
    pub fn figure_height(&self) -> f64 {
        match self.aspect_ratio {
            None => self.height,
            Some(ratio) => self.height.min(self.width * ratio),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_json_gives_defaults() {
        let config: PlotConfig = serde_json::from_str("{}").unwrap();
        assert_relative_eq!(config.width, 800.0);
        assert_eq!(config.x_start, Bound::Auto);
        assert_eq!(config.legend_location, LegendLocation::None);
        assert!(config.axis_visible.right);
        assert_eq!(config.import_format, ColumnLayout::XY);
        assert_eq!(config.file_name, "exported_graph");
    }

    #[test]
    fn bounds_accept_keywords_and_numbers() {
        let config: PlotConfig = serde_json::from_str(
            r#"{"x_start": "tight", "x_end": 4.5, "y_start": "auto"}"#,
        )
        .unwrap();
        assert_eq!(config.x_start, Bound::Tight);
        assert_eq!(config.x_end, Bound::Value(4.5));
        assert_eq!(config.y_start, Bound::Auto);
    }

    #[test]
    fn layout_and_legend_parse_from_surface_names() {
        let config: PlotConfig = serde_json::from_str(
            r#"{"import_format": "x_y_xerr_yerr", "legend_location": "northeast"}"#,
        )
        .unwrap();
        assert_eq!(config.import_format, ColumnLayout::XYXerrYerr);
        assert_eq!(config.legend_location, LegendLocation::Northeast);
    }

    #[test]
    fn zoom_pan_reset_round_trip() {
        let mut config = PlotConfig::default();
        config.zoom_to(0.0, 4.0, -1.0, 1.0);
        assert_eq!(config.x_limits(), AxisLimits::fixed(0.0, 4.0));
        config.pan_by(1.0, 0.5, (0.0, 4.0), (-1.0, 1.0));
        assert_eq!(config.x_limits(), AxisLimits::fixed(1.0, 5.0));
        assert_eq!(config.y_limits(), AxisLimits::fixed(-0.5, 1.5));
        config.reset_limits();
        assert_eq!(config.x_start, Bound::Auto);
    }

    #[test]
    fn aspect_ratio_constrains_figure_geometry() {
        let mut config = PlotConfig::default();
        config.aspect_ratio = Some(1.0);
        assert_relative_eq!(config.figure_width(), 600.0);
        assert_relative_eq!(config.figure_height(), 600.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = PlotConfig::default();
        config.width = 0.0;
        assert!(config.validate().is_err());
        let mut config = PlotConfig::default();
        config.aspect_ratio = Some(-2.0);
        assert!(config.validate().is_err());
    }
}
