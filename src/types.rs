//! Data shapes shared between the request layer and the detection core

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in absolute pixel coordinates (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    /// Create new bounding box
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from the absolute corner coordinates reported by a backend
    ///
    /// Fractional coordinates are truncated toward zero. A detector
    /// reporting swapped corners (x2 < x1) yields a zero or negative
    /// extent; it is recorded as-is, not rejected.
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1 as i32,
            y: y1 as i32,
            width: (x2 - x1) as i32,
            height: (y2 - y1) as i32,
        }
    }

    /// True when the box has no positive extent
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// A single machine-generated annotation, ready for human review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique within one task's output only (`ai-1`, `ai-2`, ...)
    pub id: String,
    /// Class name reported by the backend
    pub label: String,
    /// Detection confidence score (0-1)
    pub confidence: f32,
    pub bbox: BoundingBox,
    /// Always `"ai"` for machine-generated annotations
    pub source: String,
    /// Review-UI flag, not interpreted by the core
    pub visible: bool,
    /// Review-UI flag, not interpreted by the core
    pub verified: bool,
}

impl Annotation {
    /// Create a machine-generated annotation with the review-flag defaults
    /// (`visible: true`, `verified: false`)
    pub fn new<I, L>(id: I, label: L, confidence: f32, bbox: BoundingBox) -> Self
    where
        I: Into<String>,
        L: Into<String>,
    {
        Self {
            id: id.into(),
            label: label.into(),
            confidence,
            bbox,
            source: "ai".to_string(),
            visible: true,
            verified: false,
        }
    }
}

/// The unit-of-work input: one named image bound to one model identifier
///
/// Immutable once created; the image bytes are dropped as soon as the
/// task's result has been produced.
#[derive(Debug, Clone)]
pub struct TaskInput {
    pub name: String,
    pub model: String,
    pub image: Vec<u8>,
}

impl TaskInput {
    pub fn new<N, M>(name: N, model: M, image: Vec<u8>) -> Self
    where
        N: Into<String>,
        M: Into<String>,
    {
        Self {
            name: name.into(),
            model: model.into(),
            image,
        }
    }
}

/// Outcome of one detection task
///
/// `error` is the authoritative outcome indicator: when it is set the
/// annotations are always empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub image_name: String,
    pub annotations: Vec<Annotation>,
    pub error: Option<String>,
}

impl TaskResult {
    pub fn completed<N: Into<String>>(image_name: N, annotations: Vec<Annotation>) -> Self {
        Self {
            image_name: image_name.into(),
            annotations,
            error: None,
        }
    }

    pub fn failed<N, E>(image_name: N, error: E) -> Self
    where
        N: Into<String>,
        E: std::fmt::Display,
    {
        Self {
            image_name: image_name.into(),
            annotations: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregated response for one batch of images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// One entry per submitted image, in submission order
    pub results: Vec<TaskResult>,
    /// Display name of the model the batch ran against
    pub model_used: String,
    pub total_processed: usize,
}

impl BatchResult {
    pub fn new<M: Into<String>>(results: Vec<TaskResult>, model_used: M) -> Self {
        let total_processed = results.len();
        Self {
            results,
            model_used: model_used.into(),
            total_processed,
        }
    }

    /// Number of tasks that finished with a contained error
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }
}

/// Metadata describing a registered detection model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl ModelInfo {
    pub fn new<I, N, D>(id: I, name: N, description: D) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_from_corners_truncates_toward_zero() {
        let bbox = BoundingBox::from_corners(10.9, 20.2, 110.7, 70.9);

        assert_eq!(bbox.x, 10);
        assert_eq!(bbox.y, 20);
        assert_eq!(bbox.width, 99);
        assert_eq!(bbox.height, 50);
    }

    #[test]
    fn test_bbox_from_corners_negative_coordinates() {
        // int(-3.7) truncates toward zero, not toward negative infinity
        let bbox = BoundingBox::from_corners(-3.7, -0.5, 6.3, 9.5);

        assert_eq!(bbox.x, -3);
        assert_eq!(bbox.y, 0);
        assert_eq!(bbox.width, 10);
        assert_eq!(bbox.height, 10);
    }

    #[test]
    fn test_bbox_swapped_corners_recorded_as_degenerate() {
        let bbox = BoundingBox::from_corners(100.0, 50.0, 40.0, 50.0);

        assert_eq!(bbox.width, -60);
        assert_eq!(bbox.height, 0);
        assert!(bbox.is_degenerate());
    }

    #[test]
    fn test_annotation_defaults() {
        let ann = Annotation::new("ai-1", "zebra", 0.87, BoundingBox::new(1, 2, 3, 4));

        assert_eq!(ann.source, "ai");
        assert!(ann.visible);
        assert!(!ann.verified);
    }

    #[test]
    fn test_task_result_error_is_authoritative() {
        let ok = TaskResult::completed("a.jpg", Vec::new());
        let bad = TaskResult::failed("b.jpg", "detection failed: boom");

        assert!(!ok.is_failed());
        assert!(bad.is_failed());
        assert!(bad.annotations.is_empty());
    }

    #[test]
    fn test_batch_result_counts() {
        let results = vec![
            TaskResult::completed("a.jpg", Vec::new()),
            TaskResult::failed("b.jpg", "detection failed: boom"),
            TaskResult::completed("c.jpg", Vec::new()),
        ];
        let batch = BatchResult::new(results, "MDV6 YOLOv9-C");

        assert_eq!(batch.total_processed, 3);
        assert_eq!(batch.failed_count(), 1);
    }

    #[test]
    fn test_wire_field_names() {
        let ann = Annotation::new("ai-1", "zebra", 0.5, BoundingBox::new(1, 2, 3, 4));
        let batch = BatchResult::new(
            vec![TaskResult::completed("img.jpg", vec![ann])],
            "Mugie Zebra",
        );

        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value["model_used"], "Mugie Zebra");
        assert_eq!(value["total_processed"], 1);
        assert_eq!(value["results"][0]["image_name"], "img.jpg");
        assert_eq!(value["results"][0]["error"], serde_json::Value::Null);

        let ann = &value["results"][0]["annotations"][0];
        assert_eq!(ann["id"], "ai-1");
        assert_eq!(ann["source"], "ai");
        assert_eq!(ann["bbox"]["width"], 3);
        assert_eq!(ann["visible"], true);
        assert_eq!(ann["verified"], false);
    }
}
