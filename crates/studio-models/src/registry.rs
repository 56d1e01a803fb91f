//! The catalog registry: immutable descriptors looked up by id.

use std::path::Path;

use crate::catalog;
use crate::error::Error;
use crate::spec::ModelDescriptor;

/// Registry of selectable models.
///
/// Built once at startup, either from the built-in catalog or from a JSON
/// catalog file, and never mutated afterwards. Share it behind an `Arc`.
///
/// # Example
///
/// ```
/// use studio_models::Registry;
///
/// let registry = Registry::builtin();
/// assert!(registry.lookup("lcm-sdxl").is_some());
/// assert!(registry.lookup("unknown").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    models: Vec<ModelDescriptor>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { models: Vec::new() }
    }

    /// The built-in catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for model in catalog::builtin() {
            registry
                .add(model)
                .expect("built-in catalog entries should be valid");
        }
        registry
    }

    /// Register a descriptor after checking its invariants.
    pub fn add(&mut self, model: ModelDescriptor) -> Result<(), Error> {
        if self.lookup(&model.id).is_some() {
            return Err(Error::DuplicateModel(model.id));
        }
        model.validate()?;
        self.models.push(model);
        Ok(())
    }

    /// Load a catalog from a JSON array of descriptors.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let models: Vec<ModelDescriptor> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for model in models {
            registry.add(model)?;
        }
        Ok(registry)
    }

    /// Load a catalog file (see [`from_json`](Self::from_json)).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize the catalog in the shape [`from_json`](Self::from_json) reads.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&self.models)?)
    }

    /// Find a model by catalog id.
    pub fn lookup(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Like [`lookup`](Self::lookup), but absent ids become
    /// [`Error::ModelNotFound`].
    pub fn get(&self, id: &str) -> Result<&ModelDescriptor, Error> {
        self.lookup(id)
            .ok_or_else(|| Error::ModelNotFound(id.to_string()))
    }

    /// All models in registration order.
    pub fn list(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
