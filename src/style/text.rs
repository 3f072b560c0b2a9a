//! Text styling options.

use super::color::Color;

/// Horizontal anchor for text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn to_svg_string(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Vertical alignment for text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    #[default]
    Auto,
    Middle,
    Hanging,
}

impl TextBaseline {
    pub fn to_svg_string(&self) -> &'static str {
        match self {
            TextBaseline::Auto => "auto",
            TextBaseline::Middle => "middle",
            TextBaseline::Hanging => "hanging",
        }
    }
}

/// Style configuration for text elements.
#[derive(Debug, Clone)]
pub struct TextStyle {
    /// Font family
    pub font_family: String,
    /// Font size in pixels
    pub font_size: f64,
    /// Text color
    pub color: Color,
    /// Horizontal anchor
    pub anchor: TextAnchor,
    /// Vertical alignment
    pub baseline: TextBaseline,
    /// Rotation angle in degrees
    pub rotation: f64,
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn color(mut self, color: impl Into<Color>) -> Self {
        self.color = color.into();
        self
    }

    pub fn anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn baseline(mut self, baseline: TextBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Generate SVG style attributes (excluding positioning).
    pub fn to_svg_attrs(&self) -> String {
        format!(
            "font-family=\"{}\" font-size=\"{}\" fill=\"{}\" text-anchor=\"{}\" dominant-baseline=\"{}\"",
            self.font_family,
            self.font_size,
            self.color.to_svg_string(),
            self.anchor.to_svg_string(),
            self.baseline.to_svg_string(),
        )
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            font_family: "sans-serif".to_string(),
            font_size: 12.0,
            color: Color::BLACK,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Auto,
            rotation: 0.0,
        }
    }
}

/// Escape text for inclusion in SVG/XML content.
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_xml("a<b & c>d"), "a&lt;b &amp; c&gt;d");
    }
}
