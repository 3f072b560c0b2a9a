//! Data series: raw columns, axis transforms, and the filtered
//! geometry view used for layout and rendering.

pub mod list;
pub mod style;

use std::collections::HashMap;

use log::warn;
use regex::Regex;

use crate::error::{PlotError, PlotResult};
use crate::expr::Expr;
use crate::parse::ParsedColumns;
use crate::style::Color;
use crate::trace::style::{PlotType, TraceStyle};

/// One data series: immutable imported columns plus mutable style,
/// label and visibility. Derived views are recomputed on demand so
/// style edits never touch the raw data.
#[derive(Debug, Clone)]
pub struct Trace {
    cols: ParsedColumns,
    pub style: TraceStyle,
    pub label: String,
    pub visible: bool,
}

impl Trace {
    pub fn new(cols: ParsedColumns, style: TraceStyle, label: impl Into<String>) -> Self {
        Trace {
            cols,
            style,
            label: label.into(),
            visible: true,
        }
    }

    pub fn has_x_error(&self) -> bool {
        self.cols.x_err().is_some()
    }

    pub fn has_y_error(&self) -> bool {
        self.cols.y_err().is_some()
    }

    /// Color shown in the legend: the marker color for pure scatter
    /// traces, the line color otherwise.
    pub fn legend_color(&self) -> Color {
        if self.style.plot_type == PlotType::Scatter {
            self.style.marker_color.clone()
        } else {
            self.style.line_color.clone()
        }
    }

    /// X values with the x axis transform applied.
    pub fn x_transformed(&self) -> Vec<f64> {
        self.transform_or_identity(self.cols.x(), "x", &self.style.x_scaling)
    }

    /// Y values with the y axis transform applied.
    pub fn y_transformed(&self) -> Vec<f64> {
        self.transform_or_identity(self.cols.y(), "y", &self.style.y_scaling)
    }

    /// X error column, transformed only when the error bar style asks
    /// for it.
    pub fn x_err_transformed(&self) -> Option<Vec<f64>> {
        let err = self.cols.x_err()?;
        if self.style.error_bar.transform_x {
            Some(self.transform_or_identity(err, "x", &self.style.x_scaling))
        } else {
            Some(err.to_vec())
        }
    }

    /// Y error column, transformed only when the error bar style asks
    /// for it.
    pub fn y_err_transformed(&self) -> Option<Vec<f64>> {
        let err = self.cols.y_err()?;
        if self.style.error_bar.transform_y {
            Some(self.transform_or_identity(err, "y", &self.style.y_scaling))
        } else {
            Some(err.to_vec())
        }
    }

    /// Filtered geometry view of the transformed columns. Error
    /// columns only take part when the error bar mode shows them on
    /// their axis; an expanded extent without visible bars would be
    /// misleading.
    pub fn xy_data(&self) -> XyData {
        let mode = self.style.error_bar.mode;
        let x_err = if mode.shows_x() {
            self.x_err_transformed()
        } else {
            None
        };
        let y_err = if mode.shows_y() {
            self.y_err_transformed()
        } else {
            None
        };
        XyData::new(self.x_transformed(), self.y_transformed(), x_err, y_err)
    }

    fn transform_or_identity(&self, values: &[f64], var: &str, scaling: &str) -> Vec<f64> {
        match transform_values(values, var, scaling) {
            Ok(out) => out,
            Err(e) => {
                warn!("trace '{}': {}, using identity", self.label, e);
                values.to_vec()
            }
        }
    }
}

/// Apply an axis transform expression to a column. The aggregate
/// shorthands `max(v)`, `min(v)` and `mean(v)` are replaced with their
/// numeric values over the whole column before the expression is
/// compiled, so "x - min(x)" shifts a column to zero.
pub fn transform_values(values: &[f64], var: &str, expr_src: &str) -> PlotResult<Vec<f64>> {
    if expr_src.trim() == var {
        return Ok(values.to_vec());
    }
    let substituted = substitute_aggregates(expr_src, var, values)?;
    let expr = Expr::compile(&substituted).map_err(|e| PlotError::Transform {
        message: e.to_string(),
    })?;
    let mut scope = HashMap::with_capacity(1);
    let mut out = Vec::with_capacity(values.len());
    for &v in values {
        scope.insert(var.to_string(), v);
        let mapped = expr.eval(&scope).map_err(|e| PlotError::Transform {
            message: e.to_string(),
        })?;
        out.push(mapped);
    }
    Ok(out)
}

fn substitute_aggregates(expr_src: &str, var: &str, values: &[f64]) -> PlotResult<String> {
    let mut result = expr_src.to_string();
    let n = values.len() as f64;
    let aggregates = [
        ("max", values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)),
        ("min", values.iter().cloned().fold(f64::INFINITY, f64::min)),
        ("mean", values.iter().sum::<f64>() / n),
    ];
    for (name, value) in aggregates {
        let pattern = format!(r"{name}\(\s*{var}\s*\)");
        let re = Regex::new(&pattern).map_err(|e| PlotError::Transform {
            message: e.to_string(),
        })?;
        if re.is_match(&result) {
            result = re.replace_all(&result, format!("({value})")).into_owned();
        }
    }
    Ok(result)
}

/// Transformed columns with non-finite rows removed, plus the derived
/// quantities layout needs: error-expanded extents, sortedness, and
/// nearest-point lookup.
///
/// A row survives only if every present column is finite at its index,
/// so all columns stay aligned.
#[derive(Debug, Clone)]
pub struct XyData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub x_err: Option<Vec<f64>>,
    pub y_err: Option<Vec<f64>>,
    x_sorted: bool,
}

impl XyData {
    pub fn new(
        x: Vec<f64>,
        y: Vec<f64>,
        x_err: Option<Vec<f64>>,
        y_err: Option<Vec<f64>>,
    ) -> Self {
        let n = x.len().min(y.len());
        let mut fx = Vec::with_capacity(n);
        let mut fy = Vec::with_capacity(n);
        let mut fxe = x_err.as_ref().map(|_| Vec::with_capacity(n));
        let mut fye = y_err.as_ref().map(|_| Vec::with_capacity(n));

        for i in 0..n {
            let xe = x_err.as_ref().map(|e| e[i]);
            let ye = y_err.as_ref().map(|e| e[i]);
            let finite = x[i].is_finite()
                && y[i].is_finite()
                && xe.map_or(true, f64::is_finite)
                && ye.map_or(true, f64::is_finite);
            if !finite {
                continue;
            }
            fx.push(x[i]);
            fy.push(y[i]);
            if let (Some(out), Some(v)) = (fxe.as_mut(), xe) {
                out.push(v);
            }
            if let (Some(out), Some(v)) = (fye.as_mut(), ye) {
                out.push(v);
            }
        }

        let x_sorted = fx.windows(2).all(|w| w[0] <= w[1]);
        XyData {
            x: fx,
            y: fy,
            x_err: fxe,
            y_err: fye,
            x_sorted,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x_sorted(&self) -> bool {
        self.x_sorted
    }

    /// Min and max of x, widened by the x error column when present.
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        extent(&self.x, self.x_err.as_deref())
    }

    /// Min and max of y, widened by the y error column when present.
    pub fn y_extent(&self) -> Option<(f64, f64)> {
        extent(&self.y, self.y_err.as_deref())
    }

    pub fn x_range(&self) -> f64 {
        self.x_extent().map(|(lo, hi)| (hi - lo).abs()).unwrap_or(0.0)
    }

    pub fn y_range(&self) -> f64 {
        self.y_extent().map(|(lo, hi)| (hi - lo).abs()).unwrap_or(0.0)
    }

    /// The data point whose x value is closest to `x0`. Requires x to
    /// be non-decreasing; returns None otherwise.
    pub fn nearest_point(&self, x0: f64) -> Option<(f64, f64)> {
        if !self.x_sorted || self.x.is_empty() {
            return None;
        }
        let pos = self.x.partition_point(|&v| v < x0);
        let idx = if pos == 0 {
            0
        } else if pos == self.x.len() {
            self.x.len() - 1
        } else {
            let prev = self.x[pos - 1];
            let next = self.x[pos];
            if x0 - prev < next - x0 {
                pos - 1
            } else {
                pos
            }
        };
        Some((self.x[idx], self.y[idx]))
    }
}

fn extent(values: &[f64], err: Option<&[f64]>) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        let e = err.map(|e| e[i]).unwrap_or(0.0);
        lo = lo.min(v - e);
        hi = hi.max(v + e);
    }
    Some((lo, hi))
}
