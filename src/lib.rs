//! Concurrent batch inference core for wildlife image annotation
//!
//! Runs pre-trained detection models over batches of uploaded images with
//! bounded parallelism. Per-image failures are contained in the affected
//! result, per-task scratch storage is released on every exit path, and
//! batch output order always matches submission order.

pub mod backend;
pub mod backend_stub;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod scratch;
pub mod task;
pub mod types;

pub use backend::{DetectionBackend, RawDetection};
pub use backend_stub::StubBackend;
pub use dispatcher::{BatchDispatcher, DispatcherConfig};
pub use error::{DetectError, Result};
pub use registry::{ModelEntry, ModelRegistry, ModelRegistryBuilder};
pub use scratch::ScratchImage;
pub use task::DetectionTask;
pub use types::{Annotation, BatchResult, BoundingBox, ModelInfo, TaskInput, TaskResult};

/// Get library version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
