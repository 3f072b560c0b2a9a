//! SVG rendering backend.

use crate::style::{escape_xml, FillStyle, LineStyle, TextStyle};

/// Accumulates SVG elements and assembles the final document.
#[derive(Debug)]
pub struct SvgBackend {
    /// Image width in pixels
    pub width: f64,
    /// Image height in pixels
    pub height: f64,
    /// SVG content accumulated during rendering
    content: Vec<String>,
    /// SVG defs section (clip paths)
    defs: Vec<String>,
    /// Whether to include the XML declaration
    include_declaration: bool,
}

impl SvgBackend {
    pub fn new(width: f64, height: f64) -> Self {
        SvgBackend {
            width,
            height,
            content: Vec::new(),
            defs: Vec::new(),
            include_declaration: false,
        }
    }

    /// Set whether to include the XML declaration.
    pub fn include_declaration(mut self, include: bool) -> Self {
        self.include_declaration = include;
        self
    }

    /// Draw a line between two points.
    pub fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &LineStyle) {
        self.content.push(format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" {}/>",
            x1,
            y1,
            x2,
            y2,
            style.to_svg_style()
        ));
    }

    /// Draw a polyline.
    pub fn draw_polyline(&mut self, points: &[(f64, f64)], style: &LineStyle) {
        if points.is_empty() {
            return;
        }
        let points_str: String = points
            .iter()
            .map(|(x, y)| format!("{x:.2},{y:.2}"))
            .collect::<Vec<_>>()
            .join(" ");
        self.content.push(format!(
            "<polyline points=\"{}\" {}/>",
            points_str,
            style.to_svg_style()
        ));
    }

    /// Draw a closed polygon.
    pub fn draw_polygon(&mut self, points: &[(f64, f64)], style: &FillStyle) {
        if points.is_empty() {
            return;
        }
        let points_str: String = points
            .iter()
            .map(|(x, y)| format!("{x:.2},{y:.2}"))
            .collect::<Vec<_>>()
            .join(" ");
        self.content.push(format!(
            "<polygon points=\"{}\" {}/>",
            points_str,
            style.to_svg_style()
        ));
    }

    /// Draw a rectangle.
    pub fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &FillStyle) {
        self.content.push(format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" {}/>",
            x,
            y,
            width,
            height,
            style.to_svg_style()
        ));
    }

    /// Add a pre-rendered element (markers render themselves).
    pub fn add_element(&mut self, element: String) {
        if !element.is_empty() {
            self.content.push(element);
        }
    }

    /// Draw text.
    pub fn draw_text(&mut self, x: f64, y: f64, text: &str, style: &TextStyle) {
        let transform = if style.rotation != 0.0 {
            format!(" transform=\"rotate({},{:.2},{:.2})\"", style.rotation, x, y)
        } else {
            String::new()
        };
        self.content.push(format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" {}{}>{}</text>",
            x,
            y,
            style.to_svg_attrs(),
            transform,
            escape_xml(text)
        ));
    }

    /// Start a group with optional attributes.
    pub fn start_group(&mut self, attrs: &str) {
        if attrs.is_empty() {
            self.content.push("<g>".to_string());
        } else {
            self.content.push(format!("<g {}>", attrs));
        }
    }

    /// End the current group.
    pub fn end_group(&mut self) {
        self.content.push("</g>".to_string());
    }

    /// Start a clipped group.
    pub fn start_clip(&mut self, id: &str, x: f64, y: f64, width: f64, height: f64) {
        self.defs.push(format!(
            "<clipPath id=\"{}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"/></clipPath>",
            id, x, y, width, height
        ));
        self.content
            .push(format!("<g clip-path=\"url(#{})\">", id));
    }

    /// End the current clipped group.
    pub fn end_clip(&mut self) {
        self.content.push("</g>".to_string());
    }

    /// Assemble the final SVG document.
    pub fn render(self) -> String {
        let declaration = if self.include_declaration {
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"
        } else {
            ""
        };
        let defs_section = if self.defs.is_empty() {
            String::new()
        } else {
            format!("  <defs>\n    {}\n  </defs>\n", self.defs.join("\n    "))
        };
        format!(
            r#"{}<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" preserveAspectRatio="xMidYMid meet">
{}  {}
</svg>"#,
            declaration,
            self.width,
            self.height,
            self.width,
            self.height,
            defs_section,
            self.content.join("\n  ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    #[test]
    fn document_has_namespace_and_viewbox() {
        let backend = SvgBackend::new(800.0, 600.0);
        let svg = backend.render();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("viewBox=\"0 0 800 600\""));
    }

    #[test]
    fn clip_group_references_its_def() {
        let mut backend = SvgBackend::new(100.0, 100.0);
        backend.start_clip("plot-clip", 0.0, 0.0, 80.0, 60.0);
        backend.draw_line(0.0, 0.0, 10.0, 10.0, &LineStyle::new().color(Color::BLACK));
        backend.end_clip();
        let svg = backend.render();
        assert!(svg.contains("<clipPath id=\"plot-clip\">"));
        assert!(svg.contains("clip-path=\"url(#plot-clip)\""));
    }

    #[test]
    fn text_content_is_escaped() {
        let mut backend = SvgBackend::new(100.0, 100.0);
        backend.draw_text(0.0, 0.0, "a < b", &TextStyle::new());
        assert!(backend.render().contains("a &lt; b"));
    }
}
