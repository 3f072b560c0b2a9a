//! Figure assembly.
//!
//! `Chart` turns a configuration plus a trace list into a finished SVG
//! document: margins and font sizes derived from the figure diagonal,
//! resolved axis domains, grids, clipped trace geometry, four axis
//! sides, legend and labels.

pub mod svg;

pub use svg::SvgBackend;

use log::{debug, warn};

use crate::axis::{format_ticks, nice_ticks, with_minor_ticks, LinearScale, TickSet, NUM_TICKS};
use crate::axis::resolve_limits;
use crate::config::{LegendLocation, PlotConfig};
use crate::error::{PlotError, PlotResult};
use crate::style::{
    Color, FillStyle, LineStyle, MarkerStyle, TextAnchor, TextBaseline, TextStyle,
};
use crate::trace::list::{LegendEntry, TraceList};
use crate::trace::style::ErrorBarStyle;
use crate::trace::{Trace, XyData};

// Margins as fractions of the figure diagonal.
const MARGIN_TOP: f64 = 0.05;
const MARGIN_BOTTOM: f64 = 0.08;
const MARGIN_LEFT: f64 = 0.08;
const MARGIN_RIGHT: f64 = 0.02;

// Tick label offsets from the axis line, in pixels.
const TICK_LABEL_OFFSET: f64 = 5.0;

// Legend geometry, in pixels.
const LEGEND_ROW_HEIGHT: f64 = 20.0;
const LEGEND_SWATCH_SIZE: f64 = 12.0;
const LEGEND_LABEL_OFFSET_X: f64 = 18.0;
const LEGEND_LABEL_OFFSET_Y: f64 = 11.0;
const LEGEND_PADDING: f64 = 32.0;
const LEGEND_FONT_SIZE: f64 = 16.0;
// Label width estimate without font metrics.
const LEGEND_CHAR_WIDTH: f64 = 8.0;

// Opacity applied to shaded error bands on top of the bar opacity.
const ERROR_BAND_OPACITY: f64 = 0.3;

// Area fills under a line are translucent so the line stays readable;
// a bare area plot is opaque.
const AREA_WITH_LINE_OPACITY: f64 = 0.6;

/// Which sides of the plot frame an axis is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Bottom,
    Top,
    Left,
    Right,
}

/// Renders one figure from a configuration.
#[derive(Debug)]
pub struct Chart<'a> {
    config: &'a PlotConfig,
    width: f64,
    height: f64,
    diagonal: f64,
}

impl<'a> Chart<'a> {
    pub fn new(config: &'a PlotConfig) -> Self {
        let width = config.figure_width();
        let height = config.figure_height();
        Chart {
            config,
            width,
            height,
            diagonal: width.hypot(height),
        }
    }

    /// A percentage of the figure diagonal, floored to whole pixels.
    /// Fonts, margins and label offsets all scale with the diagonal so
    /// a resized figure keeps its proportions.
    fn pct(&self, percent: f64) -> f64 {
        (0.01 * percent * self.diagonal).floor()
    }

    /// Stroke widths are tenths of a percent of the diagonal, kept
    /// fractional so thin lines survive.
    fn stroke_px(&self, width: f64) -> f64 {
        0.001 * width * self.diagonal
    }

    fn margin_top(&self) -> f64 {
        (MARGIN_TOP * self.diagonal).floor()
    }

    fn margin_bottom(&self) -> f64 {
        (MARGIN_BOTTOM * self.diagonal).floor()
    }

    fn margin_left(&self) -> f64 {
        (MARGIN_LEFT * self.diagonal).floor()
    }

    fn margin_right(&self) -> f64 {
        (MARGIN_RIGHT * self.diagonal).floor()
    }

    /// Width of the plot area between the margins.
    pub fn plot_width(&self) -> f64 {
        self.width - self.margin_left() - self.margin_right()
    }

    /// Height of the plot area between the margins.
    pub fn plot_height(&self) -> f64 {
        self.height - self.margin_top() - self.margin_bottom()
    }

    /// Resolve both axis domains from the visible traces and the
    /// configured limits.
    pub fn resolve_domains(&self, traces: &TraceList) -> PlotResult<((f64, f64), (f64, f64))> {
        let data: Vec<XyData> = traces.visible_traces().map(Trace::xy_data).collect();
        let x_extents: Vec<(f64, f64)> = data.iter().filter_map(XyData::x_extent).collect();
        let y_extents: Vec<(f64, f64)> = data.iter().filter_map(XyData::y_extent).collect();
        let x = resolve_limits(&x_extents, self.config.x_limits(), self.config.margin_x, "x")?;
        let y = resolve_limits(&y_extents, self.config.y_limits(), self.config.margin_y, "y")?;
        Ok((x, y))
    }

    /// Render the figure. Without visible data an empty frame over the
    /// unit domain is drawn instead of failing.
    pub fn render(&self, traces: &TraceList) -> String {
        let (x_domain, y_domain) = match self.resolve_domains(traces) {
            Ok(domains) => domains,
            Err(PlotError::NoVisibleData { axis }) => {
                debug!("no visible data on {axis} axis, rendering empty frame");
                ((0.0, 1.0), (0.0, 1.0))
            }
            Err(e) => {
                warn!("domain resolution failed: {e}, rendering empty frame");
                ((0.0, 1.0), (0.0, 1.0))
            }
        };
        self.render_with_domains(traces, x_domain, y_domain)
    }

    fn render_with_domains(
        &self,
        traces: &TraceList,
        x_domain: (f64, f64),
        y_domain: (f64, f64),
    ) -> String {
        let plot_w = self.plot_width();
        let plot_h = self.plot_height();
        let x_scale = LinearScale::new(x_domain, (0.0, plot_w));
        let y_scale = LinearScale::new(y_domain, (plot_h, 0.0));

        let x_major = nice_ticks(x_domain.0, x_domain.1, NUM_TICKS);
        let y_major = nice_ticks(y_domain.0, y_domain.1, NUM_TICKS);
        let x_ticks = with_minor_ticks(&x_major, x_domain);
        let y_ticks = with_minor_ticks(&y_major, y_domain);

        let mut backend = SvgBackend::new(self.width, self.height);
        backend.start_group(&format!(
            "transform=\"translate({:.2},{:.2})\"",
            self.margin_left(),
            self.margin_top()
        ));

        self.draw_grids(&mut backend, &x_ticks, &y_ticks, &x_scale, &y_scale);

        backend.start_clip("plot-area", 0.0, 0.0, plot_w, plot_h);
        for trace in traces.visible_traces() {
            let data = trace.xy_data();
            if data.is_empty() {
                continue;
            }
            self.draw_error_bars(&mut backend, trace, &data, &x_scale, &y_scale);
            self.draw_trace(&mut backend, trace, &data, &x_scale, &y_scale);
        }
        backend.end_clip();

        for side in [Side::Bottom, Side::Top, Side::Left, Side::Right] {
            self.draw_axis(&mut backend, side, &x_ticks, &y_ticks, &x_scale, &y_scale);
        }
        self.draw_legend(&mut backend, &traces.legend_data());
        self.draw_labels(&mut backend);

        backend.end_group();
        backend.render()
    }

    fn grid_style(&self) -> LineStyle {
        LineStyle::new()
            .color(Color::LIGHT_GRAY)
            .width(self.stroke_px(0.1).max(0.5))
            .opacity(0.6)
    }

    fn draw_grids(
        &self,
        backend: &mut SvgBackend,
        x_ticks: &TickSet,
        y_ticks: &TickSet,
        x_scale: &LinearScale,
        y_scale: &LinearScale,
    ) {
        let grid = self.config.grid;
        let style = self.grid_style();
        let plot_w = self.plot_width();
        let plot_h = self.plot_height();

        for (i, &v) in x_ticks.values.iter().enumerate() {
            let wanted = if x_ticks.is_major(i) {
                grid.vertical
            } else {
                grid.vertical_minor
            };
            if wanted {
                let px = x_scale.scale(v);
                backend.draw_line(px, 0.0, px, plot_h, &style);
            }
        }
        for (i, &v) in y_ticks.values.iter().enumerate() {
            let wanted = if y_ticks.is_major(i) {
                grid.horizontal
            } else {
                grid.horizontal_minor
            };
            if wanted {
                let py = y_scale.scale(v);
                backend.draw_line(0.0, py, plot_w, py, &style);
            }
        }
    }

    fn draw_trace(
        &self,
        backend: &mut SvgBackend,
        trace: &Trace,
        data: &XyData,
        x_scale: &LinearScale,
        y_scale: &LinearScale,
    ) {
        let style = &trace.style;
        let points: Vec<(f64, f64)> = data
            .x
            .iter()
            .zip(&data.y)
            .map(|(&x, &y)| (x_scale.scale(x), y_scale.scale(y)))
            .collect();

        if style.plot_type.has_area() {
            let baseline = y_scale.scale(0.0);
            let mut polygon = Vec::with_capacity(points.len() + 2);
            polygon.push((points[0].0, baseline));
            polygon.extend_from_slice(&points);
            polygon.push((points[points.len() - 1].0, baseline));
            let opacity = if style.plot_type.has_line() {
                AREA_WITH_LINE_OPACITY
            } else {
                1.0
            };
            let fill = FillStyle::new(style.line_color.clone()).opacity(opacity);
            backend.draw_polygon(&polygon, &fill);
        }
        if style.plot_type.has_line() {
            let line = LineStyle::new()
                .color(style.line_color.clone())
                .width(style.line_width)
                .dash(style.dash);
            backend.draw_polyline(&points, &line);
        }
        if style.plot_type.has_markers() {
            let marker = MarkerStyle::new(style.marker)
                .size(style.marker_size)
                .fill(style.marker_color.clone());
            for &(px, py) in &points {
                backend.add_element(marker.render_at(px, py));
            }
        }
    }

    fn draw_error_bars(
        &self,
        backend: &mut SvgBackend,
        trace: &Trace,
        data: &XyData,
        x_scale: &LinearScale,
        y_scale: &LinearScale,
    ) {
        let err = &trace.style.error_bar;
        let mode = err.mode;
        if mode.shows_y() {
            if let Some(y_err) = &data.y_err {
                if mode == crate::trace::style::ErrorBarMode::Area {
                    self.draw_error_band(backend, data, y_err, err, x_scale, y_scale);
                } else {
                    self.draw_y_bars(backend, data, y_err, err, x_scale, y_scale);
                }
            }
        }
        if mode.shows_x() {
            if let Some(x_err) = &data.x_err {
                self.draw_x_bars(backend, data, x_err, err, x_scale, y_scale);
            }
        }
    }

    fn error_line_style(&self, err: &ErrorBarStyle) -> LineStyle {
        LineStyle::new()
            .color(err.color.clone())
            .width(err.stroke_width)
            .dash(err.dash)
            .opacity(err.opacity)
    }

    fn draw_y_bars(
        &self,
        backend: &mut SvgBackend,
        data: &XyData,
        y_err: &[f64],
        err: &ErrorBarStyle,
        x_scale: &LinearScale,
        y_scale: &LinearScale,
    ) {
        let style = self.error_line_style(err);
        let cap = err.stroke_width * err.cap_width_multiplier;
        for i in 0..data.len() {
            let px = x_scale.scale(data.x[i]);
            let lo = y_scale.scale(data.y[i] - y_err[i]);
            let hi = y_scale.scale(data.y[i] + y_err[i]);
            backend.draw_line(px, lo, px, hi, &style);
            backend.draw_line(px - cap, lo, px + cap, lo, &style);
            backend.draw_line(px - cap, hi, px + cap, hi, &style);
        }
    }

    fn draw_x_bars(
        &self,
        backend: &mut SvgBackend,
        data: &XyData,
        x_err: &[f64],
        err: &ErrorBarStyle,
        x_scale: &LinearScale,
        y_scale: &LinearScale,
    ) {
        let style = self.error_line_style(err);
        let cap = err.stroke_width * err.cap_width_multiplier;
        for i in 0..data.len() {
            let py = y_scale.scale(data.y[i]);
            let lo = x_scale.scale(data.x[i] - x_err[i]);
            let hi = x_scale.scale(data.x[i] + x_err[i]);
            backend.draw_line(lo, py, hi, py, &style);
            backend.draw_line(lo, py - cap, lo, py + cap, &style);
            backend.draw_line(hi, py - cap, hi, py + cap, &style);
        }
    }

    fn draw_error_band(
        &self,
        backend: &mut SvgBackend,
        data: &XyData,
        y_err: &[f64],
        err: &ErrorBarStyle,
        x_scale: &LinearScale,
        y_scale: &LinearScale,
    ) {
        let mut polygon = Vec::with_capacity(2 * data.len());
        for i in 0..data.len() {
            polygon.push((
                x_scale.scale(data.x[i]),
                y_scale.scale(data.y[i] + y_err[i]),
            ));
        }
        for i in (0..data.len()).rev() {
            polygon.push((
                x_scale.scale(data.x[i]),
                y_scale.scale(data.y[i] - y_err[i]),
            ));
        }
        let fill = FillStyle::new(err.color.clone()).opacity(ERROR_BAND_OPACITY * err.opacity);
        backend.draw_polygon(&polygon, &fill);
    }

    fn side_visible(&self, side: Side) -> bool {
        let visible = self.config.axis_visible;
        match side {
            Side::Bottom => visible.bottom,
            Side::Top => visible.top,
            Side::Left => visible.left,
            Side::Right => visible.right,
        }
    }

    fn draw_axis(
        &self,
        backend: &mut SvgBackend,
        side: Side,
        x_ticks: &TickSet,
        y_ticks: &TickSet,
        x_scale: &LinearScale,
        y_scale: &LinearScale,
    ) {
        if !self.side_visible(side) {
            return;
        }
        let plot_w = self.plot_width();
        let plot_h = self.plot_height();
        let stroke = LineStyle::new()
            .color(Color::BLACK)
            .width(self.stroke_px(self.config.axis_stroke_width));

        match side {
            Side::Bottom => backend.draw_line(0.0, plot_h, plot_w, plot_h, &stroke),
            Side::Top => backend.draw_line(0.0, 0.0, plot_w, 0.0, &stroke),
            Side::Left => backend.draw_line(0.0, 0.0, 0.0, plot_h, &stroke),
            Side::Right => backend.draw_line(plot_w, 0.0, plot_w, plot_h, &stroke),
        }

        let horizontal = matches!(side, Side::Bottom | Side::Top);
        let ticks = if horizontal { x_ticks } else { y_ticks };
        let scale = if horizontal { x_scale } else { y_scale };

        for (i, &v) in ticks.values.iter().enumerate() {
            let len = if ticks.is_major(i) {
                self.config.major_tick_size
            } else {
                self.config.minor_tick_size
            };
            let p = scale.scale(v);
            // all ticks point into the plot area
            match side {
                Side::Bottom => backend.draw_line(p, plot_h, p, plot_h - len, &stroke),
                Side::Top => backend.draw_line(p, 0.0, p, len, &stroke),
                Side::Left => backend.draw_line(0.0, p, len, p, &stroke),
                Side::Right => backend.draw_line(plot_w, p, plot_w - len, p, &stroke),
            }
        }

        // labels only on the bottom and left sides, majors only
        if matches!(side, Side::Bottom | Side::Left) {
            let labels = format_ticks(&ticks.major_values());
            let font_size = self.pct(self.config.axis_font_size);
            for (&v, label) in ticks.major_values().iter().zip(&labels) {
                let p = scale.scale(v);
                let style = TextStyle::new()
                    .font_family(self.config.axis_font.clone())
                    .font_size(font_size);
                match side {
                    Side::Bottom => backend.draw_text(
                        p,
                        plot_h + TICK_LABEL_OFFSET,
                        label,
                        &style.anchor(TextAnchor::Middle).baseline(TextBaseline::Hanging),
                    ),
                    Side::Left => backend.draw_text(
                        -TICK_LABEL_OFFSET,
                        p,
                        label,
                        &style.anchor(TextAnchor::End).baseline(TextBaseline::Middle),
                    ),
                    _ => unreachable!(),
                }
            }
        }
    }

    fn draw_legend(&self, backend: &mut SvgBackend, entries: &[LegendEntry]) {
        if entries.is_empty() || self.config.legend_location == LegendLocation::None {
            return;
        }
        let max_label = entries.iter().map(|e| e.label.len()).max().unwrap_or(0);
        let legend_w = max_label as f64 * LEGEND_CHAR_WIDTH + LEGEND_PADDING;
        let legend_h = entries.len() as f64 * LEGEND_ROW_HEIGHT;
        let plot_w = self.plot_width();
        let plot_h = self.plot_height();

        let (ox, oy) = match self.config.legend_location {
            LegendLocation::Northeast => (plot_w - legend_w, 15.0),
            LegendLocation::Southeast => (plot_w - legend_w, plot_h - legend_h - 10.0),
            LegendLocation::Southwest => (15.0, plot_h - legend_h - 10.0),
            LegendLocation::Northwest => (15.0, 15.0),
            LegendLocation::None => return,
        };

        backend.start_group(&format!("transform=\"translate({ox:.2},{oy:.2})\""));
        let text = TextStyle::new()
            .font_family(self.config.axis_font.clone())
            .font_size(LEGEND_FONT_SIZE);
        for (i, entry) in entries.iter().enumerate() {
            let row_y = i as f64 * LEGEND_ROW_HEIGHT;
            backend.draw_rect(
                0.0,
                row_y,
                LEGEND_SWATCH_SIZE,
                LEGEND_SWATCH_SIZE,
                &FillStyle::new(entry.color.clone()),
            );
            backend.draw_text(
                LEGEND_LABEL_OFFSET_X,
                row_y + LEGEND_LABEL_OFFSET_Y,
                &entry.label,
                &text.clone(),
            );
        }
        backend.end_group();
    }

    fn draw_labels(&self, backend: &mut SvgBackend) {
        let plot_w = self.plot_width();
        let plot_h = self.plot_height();
        let font = self.config.axis_font.clone();

        if !self.config.title.is_empty() {
            let style = TextStyle::new()
                .font_family(font.clone())
                .font_size(self.pct(self.config.title_font_size))
                .anchor(TextAnchor::Middle);
            backend.draw_text(plot_w / 2.0, -self.pct(1.0), &self.config.title, &style);
        }
        if !self.config.x_label.is_empty() {
            let style = TextStyle::new()
                .font_family(font.clone())
                .font_size(self.pct(self.config.x_label_font_size))
                .anchor(TextAnchor::Middle);
            backend.draw_text(
                plot_w / 2.0,
                plot_h + self.pct(4.0),
                &self.config.x_label,
                &style,
            );
        }
        if !self.config.y_label.is_empty() {
            let style = TextStyle::new()
                .font_family(font)
                .font_size(self.pct(self.config.y_label_font_size))
                .anchor(TextAnchor::Middle)
                .rotation(-90.0);
            backend.draw_text(-self.pct(6.0), plot_h / 2.0, &self.config.y_label, &style);
        }
    }
}

/// Decimal places for a readout step of `num`, chosen so neighboring
/// cursor positions print differently without drowning in digits.
pub fn format_precision(num: f64) -> usize {
    if num == 0.0 || !num.is_finite() {
        return 2;
    }
    let magnitude = num.abs().log10().floor() as i32;
    if magnitude < 0 {
        (-magnitude + 1) as usize
    } else if magnitude == 0 {
        2
    } else if magnitude == 1 {
        1
    } else {
        0
    }
}

/// Data cursor readout, with decimals derived from a ten-thousandth of
/// each axis range.
pub fn cursor_label(x: f64, y: f64, x_range: f64, y_range: f64) -> String {
    let xp = format_precision(x_range / 1e4);
    let yp = format_precision(y_range / 1e4);
    format!("({x:.xp$}, {y:.yp$})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{ColumnLayout, NumericParser};
    use crate::trace::style::TraceStyle;
    use approx::assert_relative_eq;

    fn config() -> PlotConfig {
        PlotConfig::default()
    }

    fn list_with(text: &str) -> TraceList {
        let parser = NumericParser::new(ColumnLayout::XY);
        let cols = parser.parse(text).unwrap();
        let mut list = TraceList::new();
        list.add_trace(Trace::new(cols, TraceStyle::default(), "data"), None);
        list
    }

    #[test]
    fn geometry_scales_with_the_diagonal() {
        let config = config();
        let chart = Chart::new(&config);
        // 800 x 600 figure, diagonal 1000
        assert_relative_eq!(chart.diagonal, 1000.0);
        assert_relative_eq!(chart.pct(1.25), 12.0);
        assert_relative_eq!(chart.margin_left(), 80.0);
        assert_relative_eq!(chart.plot_width(), 800.0 - 80.0 - 20.0);
        assert_relative_eq!(chart.plot_height(), 600.0 - 50.0 - 80.0);
        assert_relative_eq!(chart.stroke_px(2.0), 2.0);
    }

    #[test]
    fn resolved_domains_pad_the_data_extent() {
        let config = config();
        let chart = Chart::new(&config);
        let list = list_with("0 0\n10 100\n");
        let ((x0, x1), (y0, y1)) = chart.resolve_domains(&list).unwrap();
        assert_relative_eq!(x0, -0.5);
        assert_relative_eq!(x1, 10.5);
        assert_relative_eq!(y0, -5.0);
        assert_relative_eq!(y1, 105.0);
    }

    #[test]
    fn empty_list_renders_a_frame_instead_of_failing() {
        let config = config();
        let chart = Chart::new(&config);
        let svg = chart.render(&TraceList::new());
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<line"));
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn line_trace_renders_inside_the_clip() {
        let config = config();
        let chart = Chart::new(&config);
        let svg = chart.render(&list_with("1 2\n3 4\n5 6\n"));
        assert!(svg.contains("<clipPath id=\"plot-area\">"));
        assert!(svg.contains("<polyline"));
    }

    #[test]
    fn hidden_sides_are_not_drawn() {
        let mut config = config();
        config.axis_visible.top = false;
        config.axis_visible.right = false;
        let chart = Chart::new(&config);
        let full = Chart::new(&PlotConfig::default()).render(&TraceList::new());
        let trimmed = chart.render(&TraceList::new());
        assert!(trimmed.matches("<line").count() < full.matches("<line").count());
    }

    #[test]
    fn legend_draws_one_swatch_per_visible_trace() {
        let mut config = config();
        config.legend_location = LegendLocation::Northeast;
        let chart = Chart::new(&config);
        let mut list = list_with("1 2\n3 4\n");
        let parser = NumericParser::new(ColumnLayout::XY);
        let cols = parser.parse("1 1\n2 2\n").unwrap();
        list.add_trace(Trace::new(cols, TraceStyle::default(), "second"), None);
        let svg = chart.render(&list);
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains(">second</text>"));
    }

    #[test]
    fn title_and_labels_appear_when_set() {
        let mut config = config();
        config.title = "Voltage sweep".to_string();
        config.x_label = "t [s]".to_string();
        config.y_label = "U [V]".to_string();
        let chart = Chart::new(&config);
        let svg = chart.render(&TraceList::new());
        assert!(svg.contains("Voltage sweep"));
        assert!(svg.contains("t [s]"));
        assert!(svg.contains("rotate(-90"));
    }

    #[test]
    fn cursor_precision_tracks_the_axis_range()  {
        // range 10 -> step 1e-3 -> 4 decimals
        assert_eq!(format_precision(10.0 / 1e4), 4);
        assert_eq!(format_precision(1.0), 2);
        assert_eq!(format_precision(10.0), 1);
        assert_eq!(format_precision(100.0), 0);
        assert_eq!(cursor_label(1.23456, 2.0, 10.0, 10.0), "(1.2346, 2.0000)");
    }
}
