//! Read-only mapping from model identifier to a loaded detection backend
//!
//! Built once at startup and shared across requests; never mutated while
//! requests are in flight.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::DetectionBackend;
use crate::types::ModelInfo;

/// A loaded model: its metadata plus the backend instance that serves it
#[derive(Clone)]
pub struct ModelEntry {
    pub info: ModelInfo,
    pub backend: Arc<dyn DetectionBackend>,
}

/// Immutable registry of loaded models, keyed by identifier
pub struct ModelRegistry {
    entries: HashMap<String, ModelEntry>,
    /// Registration order; drives listing order and the default model
    order: Vec<String>,
}

impl ModelRegistry {
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Look up a loaded model by identifier
    pub fn get(&self, id: &str) -> Option<&ModelEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Metadata for every loaded model, in registration order
    pub fn models(&self) -> Vec<ModelInfo> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .map(|entry| entry.info.clone())
            .collect()
    }

    /// Identifier of the first registered model, used when a request does
    /// not select one
    pub fn default_model(&self) -> Option<&str> {
        self.order.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder collecting model registrations before the registry is frozen
pub struct ModelRegistryBuilder {
    entries: HashMap<String, ModelEntry>,
    order: Vec<String>,
}

impl ModelRegistryBuilder {
    /// Register a loaded backend under its model metadata
    ///
    /// Registering the same identifier twice replaces the earlier entry.
    pub fn register(mut self, info: ModelInfo, backend: Arc<dyn DetectionBackend>) -> Self {
        let id = info.id.clone();
        log::info!("✓ Registered model: {} ({})", info.name, id);

        let entry = ModelEntry { info, backend };
        if self.entries.insert(id.clone(), entry).is_some() {
            log::warn!("model {} registered twice, replacing earlier entry", id);
        } else {
            self.order.push(id);
        }
        self
    }

    pub fn build(self) -> ModelRegistry {
        log::info!("Model registry ready with {} model(s)", self.entries.len());
        ModelRegistry {
            entries: self.entries,
            order: self.order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend_stub::StubBackend;

    fn info(id: &str) -> ModelInfo {
        ModelInfo::new(id, format!("Model {}", id), "test model")
    }

    #[test]
    fn test_empty_registry() {
        let registry = ModelRegistry::builder().build();

        assert!(registry.is_empty());
        assert_eq!(registry.default_model(), None);
        assert!(registry.models().is_empty());
    }

    #[test]
    fn test_lookup_and_listing_order() {
        let registry = ModelRegistry::builder()
            .register(info("mdv6-yolov9"), Arc::new(StubBackend::new()))
            .register(info("mugie-zebra"), Arc::new(StubBackend::new()))
            .build();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("mugie-zebra"));
        assert!(!registry.contains("missing"));
        assert_eq!(registry.default_model(), Some("mdv6-yolov9"));

        let ids: Vec<String> = registry.models().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["mdv6-yolov9", "mugie-zebra"]);
    }

    #[test]
    fn test_duplicate_registration_replaces() {
        let replacement = ModelInfo::new("mdv6-yolov9", "Replacement", "newer weights");
        let registry = ModelRegistry::builder()
            .register(info("mdv6-yolov9"), Arc::new(StubBackend::new()))
            .register(replacement, Arc::new(StubBackend::new()))
            .build();

        assert_eq!(registry.len(), 1);
        let entry = registry.get("mdv6-yolov9").unwrap();
        assert_eq!(entry.info.name, "Replacement");
    }
}
