//! # Schema
//!
//! Declarative description of resource attributes.
//!
//! The schema decides which attributes a configuration may carry, which of
//! them are required, and which are filled in by the provider (computed).
//! Validation rules live in [`validation`].

use serde::Serialize;

pub mod validation;

/// Value type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
}

impl AttributeType {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeType::String => "string",
        }
    }

    /// Whether `value` is acceptable for this type (null always is)
    pub fn accepts(self, value: &serde_json::Value) -> bool {
        match self {
            AttributeType::String => value.is_string() || value.is_null(),
        }
    }
}

/// A single attribute declaration
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub force_new: bool,
    pub description: &'static str,
}

impl Attribute {
    fn new(name: &'static str, ty: AttributeType) -> Self {
        Self {
            name,
            ty,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            description: "",
        }
    }

    pub fn required_string(name: &'static str) -> Self {
        Self {
            required: true,
            ..Self::new(name, AttributeType::String)
        }
    }

    pub fn optional_string(name: &'static str) -> Self {
        Self {
            optional: true,
            ..Self::new(name, AttributeType::String)
        }
    }

    #[must_use]
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    #[must_use]
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

/// Ordered set of attribute declarations for one resource type
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    pub fn required_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| a.required)
    }
}
