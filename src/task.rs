//! The unit of work: run one image through one model, containing failure
//!
//! `execute` never propagates an error to its caller. Every failure mode
//! (unknown model, scratch I/O, backend invocation) is folded into the
//! returned `TaskResult` so one bad image cannot abort the rest of a
//! batch.

use crate::backend::RawDetection;
use crate::error::{DetectError, Result};
use crate::registry::ModelRegistry;
use crate::scratch::ScratchImage;
use crate::types::{Annotation, BoundingBox, TaskInput, TaskResult};

/// One image's detection work item within a batch
pub struct DetectionTask {
    input: TaskInput,
}

impl DetectionTask {
    pub fn new(input: TaskInput) -> Self {
        Self { input }
    }

    /// Image name this task reports under
    pub fn image_name(&self) -> &str {
        &self.input.name
    }

    /// Run the task to completion; always yields exactly one result
    pub fn execute(self, registry: &ModelRegistry) -> TaskResult {
        let name = self.input.name.clone();
        match self.run(registry) {
            Ok(annotations) => {
                log::debug!("{}: {} annotation(s)", name, annotations.len());
                TaskResult::completed(name, annotations)
            }
            Err(err) => {
                log::warn!("{}: {}", name, err);
                TaskResult::failed(name, err)
            }
        }
    }

    fn run(self, registry: &ModelRegistry) -> Result<Vec<Annotation>> {
        // Re-checked here even though run_batch validates up front: the
        // task must stand on its own, and the lookup happens before any
        // scratch I/O.
        let entry = registry
            .get(&self.input.model)
            .ok_or_else(|| DetectError::UnknownModel(self.input.model.clone()))?;

        let scratch = ScratchImage::write(&self.input.image)?;
        let raw = entry.backend.detect(scratch.path())?;
        Ok(normalize(&raw))
        // scratch drops here; the file is gone on success and failure alike
    }
}

/// Convert raw backend detections into review-ready annotations
///
/// Ids are fresh per task (`ai-1`, `ai-2`, ...) and unique within this
/// task's output only. Confidence is clamped into [0, 1].
fn normalize(raw: &[RawDetection]) -> Vec<Annotation> {
    raw.iter()
        .enumerate()
        .map(|(i, det)| {
            let bbox = BoundingBox::from_corners(det.x1, det.y1, det.x2, det.y2);
            if bbox.is_degenerate() {
                log::debug!("degenerate box from backend: {:?}", bbox);
            }
            Annotation::new(
                format!("ai-{}", i + 1),
                det.label.clone(),
                det.confidence.clamp(0.0, 1.0),
                bbox,
            )
        })
        .collect()
}
