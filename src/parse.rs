//! Numeric text parsing.
//!
//! Turns loosely formatted tabular text (clipboard pastes, exported
//! instrument files) into typed columns. Rows are matched line by line
//! against a layout-specific pattern; anything that does not look like
//! a data row (headers, comments, blank lines) is skipped silently.

use indexmap::IndexMap;
use log::debug;
use regex::Regex;

use crate::error::{PlotError, PlotResult};

/// Role of a column in the imported data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    X,
    Y,
    XErr,
    YErr,
}

/// Supported column layouts, named left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
pub enum ColumnLayout {
    /// x, y
    #[default]
    #[serde(rename = "x_y")]
    XY,
    /// x, y, y uncertainty
    #[serde(rename = "x_y_yerr")]
    XYYerr,
    /// x, x uncertainty, y
    #[serde(rename = "x_yerr_y")]
    XYerrY,
    /// x, y, x uncertainty, y uncertainty
    #[serde(rename = "x_y_xerr_yerr")]
    XYXerrYerr,
}

impl ColumnLayout {
    /// Column roles in file order.
    pub fn roles(self) -> &'static [ColumnRole] {
        match self {
            ColumnLayout::XY => &[ColumnRole::X, ColumnRole::Y],
            ColumnLayout::XYYerr => &[ColumnRole::X, ColumnRole::Y, ColumnRole::YErr],
            ColumnLayout::XYerrY => &[ColumnRole::X, ColumnRole::XErr, ColumnRole::Y],
            ColumnLayout::XYXerrYerr => &[
                ColumnRole::X,
                ColumnRole::Y,
                ColumnRole::XErr,
                ColumnRole::YErr,
            ],
        }
    }

    pub fn n_cols(self) -> usize {
        self.roles().len()
    }
}

/// Parsed columns keyed by role, in layout order. All columns have the
/// same length and every value came from a line that matched the row
/// pattern in full.
#[derive(Debug, Clone, Default)]
pub struct ParsedColumns {
    columns: IndexMap<ColumnRole, Vec<f64>>,
}

impl ParsedColumns {
    /// Build columns directly from computed data, for synthesized
    /// traces such as sampled fit curves.
    pub fn from_xy(x: Vec<f64>, y: Vec<f64>) -> Self {
        let mut columns = IndexMap::new();
        columns.insert(ColumnRole::X, x);
        columns.insert(ColumnRole::Y, y);
        ParsedColumns { columns }
    }

    pub fn get(&self, role: ColumnRole) -> Option<&[f64]> {
        self.columns.get(&role).map(Vec::as_slice)
    }

    pub fn x(&self) -> &[f64] {
        self.columns.get(&ColumnRole::X).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn y(&self) -> &[f64] {
        self.columns.get(&ColumnRole::Y).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn x_err(&self) -> Option<&[f64]> {
        self.get(ColumnRole::XErr)
    }

    pub fn y_err(&self) -> Option<&[f64]> {
        self.get(ColumnRole::YErr)
    }

    /// Number of matched rows.
    pub fn len(&self) -> usize {
        self.columns.first().map(|(_, col)| col.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// One signed decimal number, decimal point or decimal comma, optional
// exponent.
const NUMBER: &str = r"([+-]?[0-9]+[.,]?[0-9]*(?:[eE][-+]?[0-9]+)?)";
// Tab, comma, colon, semicolon or whitespace, with optional padding.
const SEP: &str = r"\s*(?::|,|;|\s)\s*";

/// Line-oriented parser for one column layout.
#[derive(Debug)]
pub struct NumericParser {
    layout: ColumnLayout,
    row: Regex,
}

impl NumericParser {
    pub fn new(layout: ColumnLayout) -> Self {
        let mut pattern = String::from(r"^\s*");
        for i in 0..layout.n_cols() {
            if i > 0 {
                pattern.push_str(SEP);
            }
            pattern.push_str(NUMBER);
        }
        pattern.push_str(r"\s*$");
        // the pattern is built from fixed fragments, so it always compiles
        let row = Regex::new(&pattern).unwrap_or_else(|e| panic!("row pattern: {e}"));
        NumericParser { layout, row }
    }

    pub fn layout(&self) -> ColumnLayout {
        self.layout
    }

    /// Parse raw text into columns. Lines that do not match the row
    /// pattern are skipped; fewer than two matching rows is an error.
    pub fn parse(&self, raw: &str) -> PlotResult<ParsedColumns> {
        let roles = self.layout.roles();
        let mut columns: IndexMap<ColumnRole, Vec<f64>> =
            roles.iter().map(|&r| (r, Vec::new())).collect();

        let mut skipped = 0usize;
        let mut matched = 0usize;
        for line in raw.lines() {
            let Some(caps) = self.row.captures(line) else {
                if !line.trim().is_empty() {
                    skipped += 1;
                }
                continue;
            };
            matched += 1;
            for (i, &role) in roles.iter().enumerate() {
                let text = caps
                    .get(i + 1)
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                if let Some(col) = columns.get_mut(&role) {
                    col.push(parse_number(text));
                }
            }
        }
        if skipped > 0 {
            debug!("skipped {} non-data lines", skipped);
        }
        if matched < 2 {
            return Err(PlotError::InsufficientRows { found: matched });
        }
        Ok(ParsedColumns { columns })
    }
}

/// Parse one matched number, normalizing a decimal comma to a point.
fn parse_number(text: &str) -> f64 {
    let normalized = text.replacen(',', ".", 1);
    normalized.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_two_columns_with_mixed_separators() {
        let parser = NumericParser::new(ColumnLayout::XY);
        let cols = parser.parse("1\t2\n3, 4\n5;6\n7 : 8\n9  10\n").unwrap();
        assert_eq!(cols.x(), &[1.0, 3.0, 5.0, 7.0, 9.0]);
        assert_eq!(cols.y(), &[2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn skips_headers_and_garbage_silently() {
        let parser = NumericParser::new(ColumnLayout::XY);
        let cols = parser
            .parse("time\tvoltage\n# comment\n1 2\n\nnot a row\n3 4\n")
            .unwrap();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols.x(), &[1.0, 3.0]);
    }

    #[test]
    fn normalizes_decimal_commas() {
        let parser = NumericParser::new(ColumnLayout::XY);
        let cols = parser.parse("1,5;2,5\n3,5;4,5\n").unwrap();
        assert_relative_eq!(cols.x()[0], 1.5);
        assert_relative_eq!(cols.y()[0], 2.5);
        assert_relative_eq!(cols.x()[1], 3.5);
        assert_relative_eq!(cols.y()[1], 4.5);
    }

    #[test]
    fn single_matching_row_is_an_error() {
        let parser = NumericParser::new(ColumnLayout::XY);
        match parser.parse("1 2\nnonsense\n") {
            Err(PlotError::InsufficientRows { found }) => assert_eq!(found, 1),
            other => panic!("expected InsufficientRows, got {other:?}"),
        }
    }

    #[test]
    fn three_column_layout_assigns_error_column() {
        let parser = NumericParser::new(ColumnLayout::XYerrY);
        let cols = parser.parse("1 0.1 10\n2 0.2 20\n").unwrap();
        assert_eq!(cols.x(), &[1.0, 2.0]);
        assert_eq!(cols.x_err().unwrap(), &[0.1, 0.2]);
        assert_eq!(cols.y(), &[10.0, 20.0]);
        assert!(cols.y_err().is_none());
    }

    #[test]
    fn four_column_layout() {
        let parser = NumericParser::new(ColumnLayout::XYXerrYerr);
        let cols = parser.parse("1 10 0.1 1\n2 20 0.2 2\n3 30 0.3 3\n").unwrap();
        assert_eq!(cols.len(), 3);
        assert_eq!(cols.y(), &[10.0, 20.0, 30.0]);
        assert_eq!(cols.x_err().unwrap(), &[0.1, 0.2, 0.3]);
        assert_eq!(cols.y_err().unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn scientific_notation_rows() {
        let parser = NumericParser::new(ColumnLayout::XY);
        let cols = parser.parse("1e-3 2E+2\n-1.5e2 +4\n").unwrap();
        assert_relative_eq!(cols.x()[0], 0.001);
        assert_relative_eq!(cols.y()[0], 200.0);
        assert_relative_eq!(cols.x()[1], -150.0);
        assert_relative_eq!(cols.y()[1], 4.0);
    }
}
