// Stand-in backend for wiring tests and local development without model files

use std::path::Path;

use crate::backend::{DetectionBackend, RawDetection};
use crate::error::Result;

/// Backend that replays a fixed set of detections for every image
pub struct StubBackend {
    detections: Vec<RawDetection>,
}

impl StubBackend {
    /// Create a stub that reports no detections
    pub fn new() -> Self {
        Self {
            detections: Vec::new(),
        }
    }

    /// Create a stub that replays `detections` for every image
    pub fn with_detections(detections: Vec<RawDetection>) -> Self {
        Self { detections }
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionBackend for StubBackend {
    fn detect(&self, path: &Path) -> Result<Vec<RawDetection>> {
        log::debug!(
            "stub backend: {} detection(s) for {}",
            self.detections.len(),
            path.display()
        );
        Ok(self.detections.clone())
    }

    fn name(&self) -> &str {
        "stub"
    }
}
