//! Nonlinear least-squares curve fitting.
//!
//! Fits a user expression in `x` with free parameters A through F to
//! the active trace's transformed data, using damped Gauss-Newton
//! (Levenberg-Marquardt) with a forward-difference Jacobian. Parameter
//! values persist between fits so a converged result seeds the next
//! run, and a successful fit can be sampled into a synthetic curve
//! trace.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};

use crate::error::{PlotError, PlotResult};
use crate::expr::Expr;
use crate::parse::ParsedColumns;
use crate::trace::style::TraceStyle;
use crate::trace::{Trace, XyData};

/// Parameter letters an expression may use.
pub const PARAM_LETTERS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

/// Default sample count for synthesized fit curves.
pub const FIT_N_POINTS: usize = 1000;

/// Default x margin fraction for synthesized fit curves.
pub const FIT_X_MARGIN: f64 = 0.0;

/// Line and marker color assigned to synthesized fit curve traces.
pub const FIT_TRACE_COLOR: &str = "#00ff00";

/// Solver options.
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    pub damping: f64,
    pub gradient_difference: f64,
    pub max_iterations: usize,
    pub error_tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions {
            damping: 1.5,
            gradient_difference: 0.1,
            max_iterations: 100,
            error_tolerance: 0.01,
        }
    }
}

impl FitOptions {
    pub fn validate(&self) -> PlotResult<()> {
        if self.max_iterations < 1 {
            return Err(PlotError::InvalidOption {
                name: "max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.gradient_difference < 0.0 {
            return Err(PlotError::InvalidOption {
                name: "gradient_difference",
                reason: "cannot be negative".to_string(),
            });
        }
        if self.damping < 0.0 {
            return Err(PlotError::InvalidOption {
                name: "damping",
                reason: "cannot be negative".to_string(),
            });
        }
        if self.error_tolerance < 0.0 {
            return Err(PlotError::InvalidOption {
                name: "error_tolerance",
                reason: "cannot be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Outcome of a successful fit.
#[derive(Debug, Clone)]
pub struct FitResult {
    /// Fitted values in parameter-letter order
    pub parameters: Vec<(char, f64)>,
    /// Sum of squared residuals at the fitted parameters
    pub sse: f64,
    /// Iterations actually run
    pub iterations: usize,
}

/// Parameters A-F referenced by the expression text, in letter order.
/// A plain substring scan; function names are lowercase so they never
/// collide with the uppercase letters.
pub fn find_used_parameters(expression: &str) -> Vec<char> {
    PARAM_LETTERS
        .iter()
        .copied()
        .filter(|&p| expression.contains(p))
        .collect()
}

/// Curve fitter with a persistent parameter table.
#[derive(Debug, Clone)]
pub struct CurveFitter {
    params: IndexMap<char, Option<f64>>,
}

impl Default for CurveFitter {
    fn default() -> Self {
        Self::new()
    }
}

impl CurveFitter {
    /// All parameters start at 1.
    pub fn new() -> Self {
        CurveFitter {
            params: PARAM_LETTERS.iter().map(|&p| (p, Some(1.0))).collect(),
        }
    }

    pub fn param(&self, letter: char) -> Option<f64> {
        self.params.get(&letter).copied().flatten()
    }

    pub fn set_param(&mut self, letter: char, value: f64) {
        if let Some(slot) = self.params.get_mut(&letter) {
            *slot = Some(value);
        }
    }

    /// Remove a parameter's value; fitting with it then fails until a
    /// new initial value is set.
    pub fn clear_param(&mut self, letter: char) {
        if let Some(slot) = self.params.get_mut(&letter) {
            *slot = None;
        }
    }

    /// Fit `expression` to the trace data. On success the fitted
    /// values replace the stored ones; on any error the table is left
    /// untouched. Running out of iterations is not an error: the best
    /// parameters seen are kept.
    pub fn fit(
        &mut self,
        data: &XyData,
        expression: &str,
        options: &FitOptions,
    ) -> PlotResult<FitResult> {
        options.validate()?;
        let used = find_used_parameters(expression);
        if used.is_empty() {
            return Err(PlotError::NoFreeParameters);
        }
        let mut guess = Vec::with_capacity(used.len());
        for &p in &used {
            let value = self
                .param(p)
                .ok_or(PlotError::MissingInitialValue { param: p })?;
            guess.push(value);
        }

        let expr = Expr::compile(expression).map_err(|e| PlotError::Evaluation {
            message: e.to_string(),
        })?;
        let model = Model {
            expr,
            params: &used,
            x: &data.x,
            y: &data.y,
        };
        let (fitted, sse, iterations) = levenberg_marquardt(&model, guess, options)?;

        for (&p, &v) in used.iter().zip(fitted.iter()) {
            self.set_param(p, v);
        }
        info!(
            "fit converged after {} iterations, sse {:.4e}",
            iterations, sse
        );
        Ok(FitResult {
            parameters: used.into_iter().zip(fitted).collect(),
            sse,
            iterations,
        })
    }

    /// Evaluate the expression with the stored parameters over
    /// `n_points` evenly spaced samples spanning the data's x extent
    /// widened by `margin` times its span on each side.
    pub fn sample_curve(
        &self,
        data: &XyData,
        expression: &str,
        n_points: usize,
        margin: f64,
    ) -> PlotResult<(Vec<f64>, Vec<f64>)> {
        if n_points < 2 {
            return Err(PlotError::InvalidOption {
                name: "n_points",
                reason: "at least 2 sample points required".to_string(),
            });
        }
        if margin < 0.0 {
            return Err(PlotError::InvalidOption {
                name: "margin",
                reason: "cannot be negative".to_string(),
            });
        }
        let (x_min, x_max) = data.x_extent().ok_or(PlotError::NoVisibleData { axis: "x" })?;
        let span = (x_max - x_min).abs();
        let start = x_min - margin * span;
        let end = x_max + margin * span;
        let delta = (end - start) / (n_points - 1) as f64;

        let expr = Expr::compile(expression).map_err(|e| PlotError::Evaluation {
            message: e.to_string(),
        })?;
        let mut scope = self.scope_with_params(expression)?;
        let mut xs = Vec::with_capacity(n_points);
        let mut ys = Vec::with_capacity(n_points);
        for i in 0..n_points {
            let x = start + i as f64 * delta;
            scope.insert("x".to_string(), x);
            let y = expr.eval(&scope).map_err(|e| PlotError::Evaluation {
                message: e.to_string(),
            })?;
            xs.push(x);
            ys.push(y);
        }
        Ok((xs, ys))
    }

    /// Build the synthetic fit curve trace for a target trace.
    pub fn make_fit_trace(
        &self,
        target: &Trace,
        expression: &str,
        n_points: usize,
        margin: f64,
    ) -> PlotResult<Trace> {
        let data = target.xy_data();
        let (xs, ys) = self.sample_curve(&data, expression, n_points, margin)?;
        let label = self.fit_label(target, expression);
        Ok(Trace::new(
            ParsedColumns::from_xy(xs, ys),
            TraceStyle::fit_default(),
            label,
        ))
    }

    fn fit_label(&self, target: &Trace, expression: &str) -> String {
        let params = find_used_parameters(expression)
            .into_iter()
            .filter_map(|p| self.param(p).map(|v| format!("{p}: {v}")))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Fit to \"{}\", y={}, {}", target.label, expression, params)
    }

    fn scope_with_params(&self, expression: &str) -> PlotResult<HashMap<String, f64>> {
        let mut scope = HashMap::new();
        for p in find_used_parameters(expression) {
            let value = self
                .param(p)
                .ok_or(PlotError::MissingInitialValue { param: p })?;
            scope.insert(p.to_string(), value);
        }
        Ok(scope)
    }
}

struct Model<'a> {
    expr: Expr,
    params: &'a [char],
    x: &'a [f64],
    y: &'a [f64],
}

impl Model<'_> {
    /// Model predictions over all x for one parameter vector.
    fn predict(&self, params: &[f64]) -> PlotResult<Vec<f64>> {
        let mut scope: HashMap<String, f64> = self
            .params
            .iter()
            .zip(params)
            .map(|(&p, &v)| (p.to_string(), v))
            .collect();
        let mut out = Vec::with_capacity(self.x.len());
        for &x in self.x {
            scope.insert("x".to_string(), x);
            let y = self.expr.eval(&scope).map_err(|e| PlotError::Evaluation {
                message: e.to_string(),
            })?;
            out.push(y);
        }
        Ok(out)
    }

    fn residuals(&self, params: &[f64]) -> PlotResult<DVector<f64>> {
        let predicted = self.predict(params)?;
        Ok(DVector::from_iterator(
            self.y.len(),
            self.y.iter().zip(predicted).map(|(&y, f)| y - f),
        ))
    }
}

/// Damped Gauss-Newton iteration. Each step perturbs one parameter at
/// a time by `gradient_difference` to build the Jacobian, then solves
/// the damped normal equations for the update.
fn levenberg_marquardt(
    model: &Model<'_>,
    initial: Vec<f64>,
    options: &FitOptions,
) -> PlotResult<(Vec<f64>, f64, usize)> {
    let n_params = initial.len();
    let n_points = model.x.len();

    let mut params = initial;
    let mut residuals = model.residuals(&params)?;
    let mut best = params.clone();
    let mut best_sse = residuals.norm_squared();
    let mut iterations = 0;

    for iter in 1..=options.max_iterations {
        iterations = iter;

        // forward-difference Jacobian of the model, one column per parameter
        let mut jacobian = DMatrix::zeros(n_points, n_params);
        let base = model.predict(&params)?;
        for j in 0..n_params {
            let mut perturbed = params.clone();
            perturbed[j] += options.gradient_difference;
            let shifted = model.predict(&perturbed)?;
            for i in 0..n_points {
                jacobian[(i, j)] = (shifted[i] - base[i]) / options.gradient_difference;
            }
        }

        let jt = jacobian.transpose();
        let mut normal = &jt * &jacobian;
        for j in 0..n_params {
            normal[(j, j)] += options.damping;
        }
        let rhs = &jt * &residuals;
        let delta = normal
            .svd(true, true)
            .solve(&rhs, 1e-12)
            .map_err(|e| PlotError::Evaluation {
                message: e.to_string(),
            })?;

        for j in 0..n_params {
            params[j] += delta[j];
        }
        residuals = model.residuals(&params)?;
        let sse = residuals.norm_squared();
        debug!("iteration {iter}: sse {sse:.4e}");
        if sse.is_finite() && sse < best_sse {
            best_sse = sse;
            best.copy_from_slice(&params);
        }
        if sse <= options.error_tolerance {
            break;
        }
    }

    if !best_sse.is_finite() {
        return Err(PlotError::Evaluation {
            message: "fit never produced a finite error".to_string(),
        });
    }
    Ok((best, best_sse, iterations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_data() -> XyData {
        let x: Vec<f64> = (0..11).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| 2.0 * v + 1.0).collect();
        XyData::new(x, y, None, None)
    }

    #[test]
    fn finds_parameters_by_substring_scan() {
        assert_eq!(find_used_parameters("A*x + B"), vec!['A', 'B']);
        assert_eq!(find_used_parameters("C*exp(x)"), vec!['C']);
        assert_eq!(find_used_parameters("x^2"), Vec::<char>::new());
    }

    #[test]
    fn linear_fit_converges() {
        let mut fitter = CurveFitter::new();
        let result = fitter
            .fit(&linear_data(), "A*x + B", &FitOptions::default())
            .unwrap();
        let params: std::collections::HashMap<char, f64> =
            result.parameters.iter().copied().collect();
        assert_relative_eq!(params[&'A'], 2.0, epsilon = 1e-3);
        assert_relative_eq!(params[&'B'], 1.0, epsilon = 1e-3);
        // success writes the fitted values back
        assert_relative_eq!(fitter.param('A').unwrap(), 2.0, epsilon = 1e-3);
    }

    #[test]
    fn expression_without_parameters_is_rejected() {
        let mut fitter = CurveFitter::new();
        match fitter.fit(&linear_data(), "x^2", &FitOptions::default()) {
            Err(PlotError::NoFreeParameters) => {}
            other => panic!("expected NoFreeParameters, got {other:?}"),
        }
    }

    #[test]
    fn cleared_parameter_blocks_the_fit() {
        let mut fitter = CurveFitter::new();
        fitter.clear_param('B');
        match fitter.fit(&linear_data(), "A*x + B", &FitOptions::default()) {
            Err(PlotError::MissingInitialValue { param }) => assert_eq!(param, 'B'),
            other => panic!("expected MissingInitialValue, got {other:?}"),
        }
    }

    #[test]
    fn option_validation_names_the_option() {
        let mut fitter = CurveFitter::new();
        let options = FitOptions {
            max_iterations: 0,
            ..Default::default()
        };
        match fitter.fit(&linear_data(), "A*x", &options) {
            Err(PlotError::InvalidOption { name, .. }) => assert_eq!(name, "max_iterations"),
            other => panic!("expected InvalidOption, got {other:?}"),
        }
    }

    #[test]
    fn iteration_exhaustion_keeps_best_parameters() {
        let mut fitter = CurveFitter::new();
        let options = FitOptions {
            max_iterations: 3,
            error_tolerance: 0.0,
            ..Default::default()
        };
        let result = fitter
            .fit(&linear_data(), "A*x + B", &options)
            .expect("exhaustion is still success");
        assert_eq!(result.iterations, 3);
    }

    #[test]
    fn sampled_curve_spans_data_with_margin() {
        let mut fitter = CurveFitter::new();
        fitter.set_param('A', 2.0);
        fitter.set_param('B', 1.0);
        let data = linear_data();
        let (xs, ys) = fitter.sample_curve(&data, "A*x + B", 5, 0.1).unwrap();
        assert_eq!(xs.len(), 5);
        assert_relative_eq!(xs[0], -1.0);
        assert_relative_eq!(xs[4], 11.0);
        assert_relative_eq!(ys[0], -1.0);
        assert_relative_eq!(ys[4], 23.0);
    }

    #[test]
    fn fit_trace_carries_fit_style_and_label() {
        let parser = crate::parse::NumericParser::new(crate::parse::ColumnLayout::XY);
        let cols = parser.parse("0 1\n1 3\n2 5\n").unwrap();
        let target = Trace::new(cols, TraceStyle::default(), "sample");

        let mut fitter = CurveFitter::new();
        fitter
            .fit(&target.xy_data(), "A*x + B", &FitOptions::default())
            .unwrap();
        let fit_trace = fitter
            .make_fit_trace(&target, "A*x + B", 100, FIT_X_MARGIN)
            .unwrap();
        assert_eq!(fit_trace.xy_data().len(), 100);
        assert!(fit_trace.label.starts_with("Fit to \"sample\""));
        assert_eq!(fit_trace.style.line_color, crate::style::Color::RED);
    }
}
