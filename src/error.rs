//! Error types for the detection service

use thiserror::Error;

/// Result type alias for the detection service
pub type Result<T> = std::result::Result<T, DetectError>;

/// Errors that can occur while scheduling or running detection work
///
/// The first three variants are usage errors and fail a whole batch
/// before any task starts; `Storage` and `Inference` are contained
/// per-task and surface as `TaskResult.error`; `Pool` means the
/// dispatcher itself could not run work at all.
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("no images supplied")]
    NoImages,

    #[error("no models available")]
    NoModelsLoaded,

    #[error("invalid or unavailable model: {0}")]
    UnknownModel(String),

    #[error("scratch storage failure: {0}")]
    Storage(#[from] std::io::Error),

    #[error("detection failed: {0}")]
    Inference(String),

    #[error("worker pool failure: {0}")]
    Pool(String),
}

impl DetectError {
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    pub fn pool<S: Into<String>>(msg: S) -> Self {
        Self::Pool(msg.into())
    }
}
