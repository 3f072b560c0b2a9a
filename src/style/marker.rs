//! Marker shapes for scatter plots and line plot points.

use super::color::Color;

/// Marker shapes for data points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Marker {
    #[default]
    Circle,
    Square,
    /// Upward-pointing triangle
    TriangleUp,
    /// Downward-pointing triangle
    TriangleDown,
    Diamond,
    Plus,
    /// X shape
    Cross,
    /// 5-pointed star
    Star,
}

impl Marker {
    /// Generate SVG path data for the marker centered at the origin.
    /// The size parameter is the radius (half the marker size).
    /// Circles render as a `<circle>` element instead.
    pub fn to_svg_path(&self, size: f64) -> Option<String> {
        match self {
            Marker::Circle => None,
            Marker::Square => {
                let s = size;
                Some(format!(
                    "M{},{} L{},{} L{},{} L{},{} Z",
                    -s, -s, s, -s, s, s, -s, s
                ))
            }
            Marker::TriangleUp => {
                // equilateral triangle height factor
                let h = size * 1.1547;
                Some(format!(
                    "M0,{} L{},{} L{},{} Z",
                    -h,
                    -size,
                    h * 0.5,
                    size,
                    h * 0.5
                ))
            }
            Marker::TriangleDown => {
                let h = size * 1.1547;
                Some(format!(
                    "M0,{} L{},{} L{},{} Z",
                    h,
                    -size,
                    -h * 0.5,
                    size,
                    -h * 0.5
                ))
            }
            Marker::Diamond => {
                let s = size * 1.2;
                Some(format!("M0,{} L{},0 L0,{} L{},0 Z", -s, s, s, -s))
            }
            Marker::Plus => {
                let s = size;
                let w = size * 0.3;
                Some(format!(
                    "M{},{} L{},{} L{},{} L{},{} L{},{} L{},{} L{},{} L{},{} L{},{} L{},{} L{},{} L{},{} Z",
                    -w, -s, w, -s, w, -w, s, -w, s, w, w, w, w, s, -w, s, -w, w, -s, w, -s, -w, -w, -w
                ))
            }
            Marker::Cross => {
                let s = size * 0.707;
                Some(format!(
                    "M{:.2},{:.2} L{:.2},{:.2} M{:.2},{:.2} L{:.2},{:.2}",
                    -s, -s, s, s, -s, s, s, -s
                ))
            }
            Marker::Star => {
                let outer = size;
                let inner = size * 0.4;
                let mut path = String::new();
                for i in 0..10 {
                    let r = if i % 2 == 0 { outer } else { inner };
                    let angle =
                        std::f64::consts::PI * (i as f64) / 5.0 - std::f64::consts::FRAC_PI_2;
                    let x = r * angle.cos();
                    let y = r * angle.sin();
                    if i == 0 {
                        path.push_str(&format!("M{x:.2},{y:.2}"));
                    } else {
                        path.push_str(&format!(" L{x:.2},{y:.2}"));
                    }
                }
                path.push_str(" Z");
                Some(path)
            }
        }
    }

    pub fn is_circle(&self) -> bool {
        matches!(self, Marker::Circle)
    }
}

/// Style configuration for markers.
#[derive(Debug, Clone)]
pub struct MarkerStyle {
    /// The marker shape
    pub marker: Marker,
    /// Marker size (diameter in pixels)
    pub size: f64,
    /// Fill color
    pub fill: Color,
}

impl MarkerStyle {
    pub fn new(marker: Marker) -> Self {
        MarkerStyle {
            marker,
            ..Default::default()
        }
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn fill(mut self, color: impl Into<Color>) -> Self {
        self.fill = color.into();
        self
    }

    /// Render the marker at a position, returning an SVG element.
    /// Open shapes (plus, cross) stroke with the fill color.
    pub fn render_at(&self, x: f64, y: f64) -> String {
        let radius = self.size / 2.0;
        let fill = self.fill.to_svg_string();

        if self.marker.is_circle() {
            return format!(
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"none\"/>",
                x, y, radius, fill
            );
        }
        let style = if matches!(self.marker, Marker::Cross) {
            format!("fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\"", fill)
        } else {
            format!("fill=\"{}\" stroke=\"none\"", fill)
        };
        match self.marker.to_svg_path(radius) {
            Some(path) => format!(
                "<path d=\"{}\" transform=\"translate({:.2},{:.2})\" {}/>",
                path, x, y, style
            ),
            None => String::new(),
        }
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        MarkerStyle {
            marker: Marker::Circle,
            size: 10.0,
            fill: Color::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_renders_as_circle_element() {
        let style = MarkerStyle::new(Marker::Circle).size(8.0).fill("#C10020");
        let svg = style.render_at(10.0, 20.0);
        assert!(svg.starts_with("<circle"));
        assert!(svg.contains("r=\"4.00\""));
    }

    #[test]
    fn closed_shapes_produce_closed_paths() {
        for marker in [
            Marker::Square,
            Marker::TriangleUp,
            Marker::TriangleDown,
            Marker::Diamond,
            Marker::Plus,
            Marker::Star,
        ] {
            let path = marker.to_svg_path(5.0).unwrap();
            assert!(path.ends_with('Z'), "{marker:?} should close its path");
        }
    }
}
