use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("sampling rate {0} Hz is below the supported minimum of 10 Hz")]
    InvalidSampleRate(f64),
    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },
    #[error("channel {channel} has {actual} samples, expected {expected}")]
    RaggedChannels {
        channel: String,
        expected: usize,
        actual: usize,
    },
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    #[error("insufficient data for window [{start:.3}s, {end:.3}s): recording spans 0..{available:.3}s")]
    InsufficientData { start: f64, end: f64, available: f64 },
    #[error("threshold must be a finite non-negative amplitude, got {0}")]
    InvalidThreshold(f64),
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("no events left to epoch")]
    EmptyEventSet,
    #[error("component decomposition failed: {0}")]
    Decomposition(String),
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse recording {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl AnalysisError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
    /// True for failures scoped to a single (channel, event) pair.
    pub fn is_per_event(&self) -> bool {
        matches!(self, AnalysisError::InsufficientData { .. })
    }
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for AnalysisError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        AnalysisError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for AnalysisError {
    fn from(value: image::ImageError) -> Self {
        AnalysisError::Plot(value.to_string())
    }
}
