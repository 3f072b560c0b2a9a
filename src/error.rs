//! Error types for the plotting pipeline.

use thiserror::Error;

/// Errors surfaced by parsing, trace management, axis resolution,
/// curve fitting, and rendering.
#[derive(Debug, Error)]
pub enum PlotError {
    /// Fewer than two data rows matched the selected column layout.
    #[error("need at least 2 data rows, found {found}")]
    InsufficientRows { found: usize },

    /// An axis transform expression failed to compile or evaluate.
    /// Recoverable: callers fall back to the identity transform.
    #[error("transform error: {message}")]
    Transform { message: String },

    /// The fit expression references none of the parameters A-F.
    #[error("fit expression contains no free parameters (A-F)")]
    NoFreeParameters,

    /// A parameter used by the fit expression has no initial value.
    #[error("no initial value for fit parameter {param}")]
    MissingInitialValue { param: char },

    /// A fit option is out of its valid range.
    #[error("invalid fit option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// The fit expression could not be evaluated over the data.
    #[error("fit evaluation failed: {message}")]
    Evaluation { message: String },

    /// No visible trace contributed data to an axis.
    #[error("no visible data on the {axis} axis")]
    NoVisibleData { axis: &'static str },

    /// Configuration value rejected at load or use time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PlotResult<T> = Result<T, PlotError>;
