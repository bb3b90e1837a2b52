//! Explicit model registry.
//!
//! Model architectures are selected by name on the command line. Instead of
//! resolving names dynamically, the registry holds a fixed map from
//! identifiers to [`ModelSpec`] entries, so an unknown name fails at startup
//! with the set of known identifiers in the error message.

use crate::core::{SegError, SegResult};
use std::collections::HashMap;

/// Specification of a registered model architecture.
///
/// Describes what the checkpoint for this identifier is expected to look
/// like: the input resolution the exported graph was traced with, the number
/// of output classes, and optional overrides for the graph's tensor names
/// (when `None`, the names are discovered from the session).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ModelSpec {
    /// The registry identifier for this architecture.
    pub name: String,
    /// Expected input resolution as (width, height).
    pub input_size: (u32, u32),
    /// Number of output classes, including background.
    pub num_classes: usize,
    /// Input tensor name override.
    #[serde(default)]
    pub input_name: Option<String>,
    /// Output tensor name override.
    #[serde(default)]
    pub output_name: Option<String>,
}

impl ModelSpec {
    /// Creates a spec with discovered tensor names.
    pub fn new(name: impl Into<String>, input_size: (u32, u32), num_classes: usize) -> Self {
        Self {
            name: name.into(),
            input_size,
            num_classes,
            input_name: None,
            output_name: None,
        }
    }
}

/// Registry mapping model identifiers to their specifications.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    specs: HashMap<String, ModelSpec>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the built-in architectures.
    ///
    /// All built-ins share the 512x512 training resolution and the 12-class
    /// label set of the test corpus; they differ only in the exported graph.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for name in ["base", "unet", "deeplabv3"] {
            registry.register(ModelSpec::new(name, (512, 512), 12));
        }
        registry
    }

    /// Registers a model spec, replacing any previous entry with the same name.
    pub fn register(&mut self, spec: ModelSpec) {
        self.specs.insert(spec.name.clone(), spec);
    }

    /// Looks up a model spec by identifier.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the known identifiers when the
    /// requested name is not registered.
    pub fn get(&self, name: &str) -> SegResult<&ModelSpec> {
        self.specs.get(name).ok_or_else(|| {
            SegError::config(format!(
                "unknown model '{}'; known models: {}",
                name,
                self.names().join(", ")
            ))
        })
    }

    /// Returns the registered identifiers in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.specs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
