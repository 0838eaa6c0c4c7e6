//! Analyzer errors

use qarar_core::QararError;
use thiserror::Error;

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors returned by analysis sessions and model analysis
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("DEBUG must be enabled for query analysis")]
    InstrumentationDisabled,

    #[error(transparent)]
    Core(#[from] QararError),
}
