//! # Resource State
//!
//! [`ResourceData`] is the configuration object handed to lifecycle
//! handlers. It carries the resource id, the current attribute values, and
//! the values recorded before the operation started so handlers can ask
//! which attributes changed.
//!
//! An empty id means the resource does not exist.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::StateError;
use crate::schema::Schema;

pub mod store;

pub use store::StateFile;

#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: Arc<Schema>,
    id: String,
    attributes: Map<String, Value>,
    prior: Map<String, Value>,
}

impl ResourceData {
    /// Empty state with no id
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            id: String::new(),
            attributes: Map::new(),
            prior: Map::new(),
        }
    }

    /// State for a resource that does not exist yet, populated from configuration
    pub fn from_config(schema: Arc<Schema>, config: Map<String, Value>) -> Self {
        Self {
            attributes: config,
            ..Self::new(schema)
        }
    }

    /// State for an existing resource: `prior` is what was last recorded,
    /// `config` is the desired configuration
    pub fn from_prior(
        schema: Arc<Schema>,
        id: impl Into<String>,
        prior: Map<String, Value>,
        config: Map<String, Value>,
    ) -> Self {
        // Computed attributes the configuration leaves unset keep their recorded value
        let mut attributes = config;
        for attribute in schema.attributes().filter(|a| a.computed) {
            if attributes.get(attribute.name).map_or(true, Value::is_null) {
                if let Some(previous) = prior.get(attribute.name) {
                    attributes.insert(attribute.name.to_string(), previous.clone());
                }
            }
        }
        Self {
            schema,
            id: id.into(),
            attributes,
            prior,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Mark the resource as absent
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn exists(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Value of a string attribute, treating the empty string as unset
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get_str(key).filter(|s| !s.is_empty())
    }

    /// Whether the attribute differs from the value recorded before this operation
    pub fn has_change(&self, key: &str) -> bool {
        let current = self.attributes.get(key).filter(|v| !v.is_null());
        let previous = self.prior.get(key).filter(|v| !v.is_null());
        current != previous
    }

    /// Assign an attribute, checking it against the schema
    ///
    /// # Errors
    /// Returns an error if the attribute is not declared or has the wrong type
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), StateError> {
        let attribute = self
            .schema
            .attribute(key)
            .ok_or_else(|| StateError::UnknownAttribute(key.to_string()))?;
        let value = value.into();
        if !attribute.ty.accepts(&value) {
            return Err(StateError::TypeMismatch {
                attribute: key.to_string(),
                expected: attribute.ty.as_str(),
            });
        }
        self.attributes.insert(key.to_string(), value);
        Ok(())
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn into_attributes(self) -> Map<String, Value> {
        self.attributes
    }
}
