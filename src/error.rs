//! Error types.
//!
//! - `AnalysisError`: failures raised by the analysis pipeline itself. Every
//!   numerical failure is a distinct variant so callers can tell them apart.
//! - `AppError`: what the binary reports (message + process exit code).

use thiserror::Error;

/// Failures raised by grid loading, validation, statistics and fitting.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The native raster is smaller than the requested target window.
    #[error(
        "Raster '{path}' is {native_rows}x{native_cols} (rows x cols), smaller than the requested {target_rows}x{target_cols} window."
    )]
    Shape {
        path: String,
        native_rows: usize,
        native_cols: usize,
        target_rows: usize,
        target_cols: usize,
    },

    /// Two sequences that must be paired cell-for-cell have different lengths.
    #[error("Length mismatch: {left} vs {right} values.")]
    LengthMismatch { left: usize, right: usize },

    /// Too few valid observations for the requested statistic.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Input has no spread (e.g. a constant series), so the statistic is undefined.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// A value lies outside the domain the operation is defined on.
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// The nonlinear solver stopped without converging.
    #[error("Fit did not converge after {iterations} iterations (last estimate: {}).", fmt_estimate(.last_estimate))]
    FitDivergence {
        iterations: usize,
        last_estimate: Option<[f64; 2]>,
    },

    /// A caller-supplied parameter is out of range.
    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// The raster-reading collaborator could not decode a file.
    #[error("Raster read error for '{path}': {message}")]
    Raster { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn invalid_parameter(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit code used by the binary for this failure.
    ///
    /// - 2: bad input, configuration or I/O
    /// - 3: shape problems or not enough data
    /// - 4: numerical failure
    pub fn exit_code(&self) -> u8 {
        match self {
            AnalysisError::InvalidParameter { .. } | AnalysisError::Raster { .. } | AnalysisError::Io(_) => 2,
            AnalysisError::Shape { .. }
            | AnalysisError::LengthMismatch { .. }
            | AnalysisError::InsufficientData(_) => 3,
            AnalysisError::DegenerateInput(_)
            | AnalysisError::InvalidDomain(_)
            | AnalysisError::FitDivergence { .. } => 4,
        }
    }
}

fn fmt_estimate(estimate: &Option<[f64; 2]>) -> String {
    match estimate {
        Some([a, b]) => format!("a={a:.6}, b={b:.6}"),
        None => "none".to_string(),
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
