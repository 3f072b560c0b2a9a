//! Color definitions and the trace color cycle.

use std::fmt;

/// A color for plotting elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// RGB color with values 0-255
    Rgb(u8, u8, u8),
    /// RGBA color with alpha 0.0-1.0
    Rgba(u8, u8, u8, f64),
    /// Named CSS color (e.g., "lightgray")
    Named(String),
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb(r, g, b)
    }

    /// Parse a hex string ("#FF0000", "FF0000", or "#FF0000CC").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if hex.len() == 8 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
            Some(Color::Rgba(r, g, b, a as f64 / 255.0))
        } else {
            None
        }
    }

    /// SVG attribute value for this color.
    pub fn to_svg_string(&self) -> String {
        match self {
            Color::Rgb(r, g, b) => format!("#{r:02x}{g:02x}{b:02x}"),
            Color::Rgba(r, g, b, a) => format!("rgba({r},{g},{b},{a})"),
            Color::Named(name) => name.clone(),
        }
    }

    pub const BLACK: Color = Color::Rgb(0, 0, 0);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);
    pub const RED: Color = Color::Rgb(255, 0, 0);
    pub const LIGHT_GRAY: Color = Color::Rgb(211, 211, 211);
    pub const TRANSPARENT: Color = Color::Rgba(0, 0, 0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_svg_string())
    }
}

impl From<&str> for Color {
    fn from(s: &str) -> Self {
        Color::from_hex(s).unwrap_or_else(|| Color::Named(s.to_string()))
    }
}

impl From<String> for Color {
    fn from(s: String) -> Self {
        Color::from(s.as_str())
    }
}

/// The 20 Kelly colors of maximum contrast, preceded by black.
/// New traces draw from this palette in order.
pub const KELLY_COLORS: [&str; 21] = [
    "#000000", "#C10020", "#00538A", "#007D34", "#FFB300", "#803E75", "#FF6800",
    "#A6BDD7", "#CEA262", "#817066", "#F6768E", "#FF7A5C", "#53377A", "#FF8E00",
    "#B32851", "#F4C800", "#7F180D", "#93AA00", "#593315", "#F13A13", "#232C16",
];

/// Cursor over the trace palette.
#[derive(Debug, Clone, Default)]
pub struct ColorCycle {
    idx: usize,
}

impl ColorCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reposition the cursor; wraps modulo the palette length.
    pub fn seed(&mut self, idx: usize) {
        self.idx = idx;
    }

    pub fn next_color(&mut self) -> Color {
        if self.idx >= KELLY_COLORS.len() {
            self.idx = 0;
        }
        let color = Color::from(KELLY_COLORS[self.idx]);
        self.idx += 1;
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let c = Color::from_hex("#C10020").unwrap();
        assert_eq!(c, Color::Rgb(0xC1, 0x00, 0x20));
        assert_eq!(c.to_svg_string(), "#c10020");
    }

    #[test]
    fn non_hex_falls_back_to_named() {
        assert_eq!(Color::from("lightgray"), Color::Named("lightgray".into()));
    }

    #[test]
    fn cycle_starts_with_black_and_wraps() {
        let mut cycle = ColorCycle::new();
        assert_eq!(cycle.next_color(), Color::BLACK);
        assert_eq!(cycle.next_color(), Color::from("#C10020"));
        cycle.seed(KELLY_COLORS.len());
        assert_eq!(cycle.next_color(), Color::BLACK);
    }
}
