use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Fatal and recoverable conditions raised by ingestion, configuration and
/// the processing stages.
///
/// "No peaks", "no groups" and "no compound" are not errors; see
/// [`crate::pipeline::Outcome`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing/misnamed columns, non-numeric cells, unsupported files.
    #[error("input format error: {0}")]
    InputFormat(String),

    /// The spectrum is shorter than a filter window.
    #[error("insufficient samples: filter window needs {required} samples, spectrum has {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed functional-group range (fatal at catalog load).
    #[error("invalid functional group range #{index}: {reason}")]
    InvalidRange { index: usize, reason: String },

    /// Malformed compound signature (skipped at catalog load).
    #[error("invalid compound signature #{index}: {reason}")]
    InvalidSignature { index: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Wrap an `anyhow` chain from the loaders, keeping every context layer.
    pub(crate) fn input_format(err: anyhow::Error) -> Self {
        AnalysisError::InputFormat(format!("{err:#}"))
    }
}
