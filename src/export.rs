//! CSV and SVG export.
//!
//! Traces export as two-column CSV with CRLF line endings. Rendered
//! figures export as standalone SVG documents, either written to disk
//! or wrapped in a data URI for embedding.

use std::fs;
use std::path::Path;

use log::info;
use regex::Regex;

use crate::error::PlotResult;
use crate::trace::Trace;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" standalone=\"no\"?>\r\n";
const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Transformed trace data as CSV. Rows that do not survive the finite
/// filter are not exported; what you see is what you get.
pub fn trace_to_csv(trace: &Trace) -> String {
    let data = trace.xy_data();
    let mut out = String::new();
    for (x, y) in data.x.iter().zip(&data.y) {
        out.push_str(&format!("{x}, {y}\r\n"));
    }
    out
}

/// Export file name for a trace, derived from its label.
pub fn csv_file_name(label: &str) -> String {
    format!("{label}.csv")
}

/// Turn rendered SVG markup into a standalone document: the root
/// element gets the SVG and xlink namespaces if missing, and the XML
/// declaration is prepended.
pub fn standalone_svg(svg: &str) -> String {
    let mut doc = svg.to_string();
    if !doc.contains("xmlns=") {
        // fixed pattern, always compiles
        let re = Regex::new(r"^<svg").unwrap_or_else(|e| panic!("svg pattern: {e}"));
        doc = re
            .replace(&doc, format!("<svg xmlns=\"{SVG_NS}\""))
            .into_owned();
    }
    if !doc.contains("xmlns:xlink=") {
        let re = Regex::new(r"^<svg").unwrap_or_else(|e| panic!("svg pattern: {e}"));
        doc = re
            .replace(&doc, format!("<svg xmlns:xlink=\"{XLINK_NS}\""))
            .into_owned();
    }
    format!("{XML_DECLARATION}{doc}")
}

/// Data URI carrying the standalone document, suitable for an image
/// href.
pub fn svg_data_uri(svg: &str) -> String {
    format!(
        "data:image/svg+xml;charset=utf-8,{}",
        percent_encode(&standalone_svg(svg))
    )
}

// encodeURIComponent's unreserved set
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
}

fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for &b in text.as_bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Write the standalone SVG document to disk.
pub fn save_svg(path: impl AsRef<Path>, svg: &str) -> PlotResult<()> {
    let path = path.as_ref();
    fs::write(path, standalone_svg(svg))?;
    info!("wrote figure to {}", path.display());
    Ok(())
}

/// Write a trace's CSV export to disk.
pub fn save_csv(path: impl AsRef<Path>, trace: &Trace) -> PlotResult<()> {
    let path = path.as_ref();
    fs::write(path, trace_to_csv(trace))?;
    info!("wrote trace data to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{ColumnLayout, NumericParser};
    use crate::trace::style::TraceStyle;

    fn trace(text: &str) -> Trace {
        let parser = NumericParser::new(ColumnLayout::XY);
        let cols = parser.parse(text).unwrap();
        Trace::new(cols, TraceStyle::default(), "sample")
    }

    #[test]
    fn csv_uses_crlf_rows() {
        let csv = trace_to_csv(&trace("1 2\n3 4\n"));
        assert_eq!(csv, "1, 2\r\n3, 4\r\n");
        assert_eq!(csv_file_name("sample"), "sample.csv");
    }

    #[test]
    fn csv_reflects_the_axis_transform() {
        let mut t = trace("1 2\n3 4\n");
        t.style.y_scaling = "y * 10".to_string();
        assert_eq!(trace_to_csv(&t), "1, 20\r\n3, 40\r\n");
    }

    #[test]
    fn exported_csv_parses_back_into_the_same_columns() {
        let t = trace("1.5 -2\n3 4.25\n5 6\n");
        let parser = NumericParser::new(ColumnLayout::XY);
        let cols = parser.parse(&trace_to_csv(&t)).unwrap();
        assert_eq!(cols.x(), t.xy_data().x.as_slice());
        assert_eq!(cols.y(), t.xy_data().y.as_slice());
    }

    #[test]
    fn standalone_document_gains_declaration_and_namespaces() {
        let doc = standalone_svg("<svg width=\"10\"></svg>");
        assert!(doc.starts_with(XML_DECLARATION));
        assert!(doc.contains("xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(doc.contains("xmlns:xlink=\"http://www.w3.org/1999/xlink\""));
    }

    #[test]
    fn existing_namespace_is_not_duplicated() {
        let doc = standalone_svg("<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>");
        assert_eq!(doc.matches("xmlns=\"").count(), 1);
    }

    #[test]
    fn data_uri_is_percent_encoded() {
        let uri = svg_data_uri("<svg></svg>");
        assert!(uri.starts_with("data:image/svg+xml;charset=utf-8,"));
        assert!(uri.contains("%3Csvg"));
        assert!(!uri.contains('<'));
    }
}
