//! # Attribute Validation
//!
//! Regex and length validators for resource attributes.
//!
//! Each resource registers a [`ResourceValidator`] holding one
//! [`ValidateSchema`] per validated attribute. Configurations are checked
//! before any remote call is made, and every violation is reported at once.
//! Lengths are byte lengths.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Which check a [`ValidateSchema`] performs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateFunction {
    /// Value must match the regex and fall within the length bounds
    RegexpLen,
    /// Value must be one of a fixed set
    AllowedValues(&'static [&'static str]),
}

/// Validation rule for one attribute
#[derive(Debug, Clone)]
pub struct ValidateSchema {
    pub identifier: &'static str,
    pub function: ValidateFunction,
    pub required: bool,
    pub regexp: Option<Regex>,
    pub min_value_length: usize,
    pub max_value_length: usize,
}

impl ValidateSchema {
    /// Regex + length validator
    ///
    /// # Errors
    /// Returns an error if `pattern` is not a valid regular expression
    pub fn regexp_len(
        identifier: &'static str,
        pattern: &str,
        min_value_length: usize,
        max_value_length: usize,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            identifier,
            function: ValidateFunction::RegexpLen,
            required: false,
            regexp: Some(Regex::new(pattern)?),
            min_value_length,
            max_value_length,
        })
    }

    pub fn allowed_values(identifier: &'static str, values: &'static [&'static str]) -> Self {
        Self {
            identifier,
            function: ValidateFunction::AllowedValues(values),
            required: false,
            regexp: None,
            min_value_length: 0,
            max_value_length: usize::MAX,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Validate a single string value
    ///
    /// # Errors
    /// Returns the first violated constraint
    pub fn validate_str(&self, value: &str) -> Result<(), ValidationError> {
        match &self.function {
            ValidateFunction::RegexpLen => {
                let len = value.len();
                if len < self.min_value_length || len > self.max_value_length {
                    return Err(ValidationError::new(
                        self.identifier,
                        ValidationErrorKind::Length {
                            min: self.min_value_length,
                            max: self.max_value_length,
                            actual: len,
                        },
                    ));
                }
                if let Some(regex) = &self.regexp {
                    if !regex.is_match(value) {
                        return Err(ValidationError::new(
                            self.identifier,
                            ValidationErrorKind::Pattern {
                                pattern: regex.as_str().to_string(),
                            },
                        ));
                    }
                }
                Ok(())
            }
            ValidateFunction::AllowedValues(values) => {
                if values.contains(&value) {
                    Ok(())
                } else {
                    Err(ValidationError::new(
                        self.identifier,
                        ValidationErrorKind::NotAllowed { allowed: values },
                    ))
                }
            }
        }
    }

    /// Validate an optional JSON value (absent and null are treated alike)
    ///
    /// # Errors
    /// Returns an error for a missing required value, a non-string value,
    /// or a violated constraint
    pub fn validate_value(&self, value: Option<&serde_json::Value>) -> Result<(), ValidationError> {
        match value {
            None | Some(serde_json::Value::Null) => {
                if self.required {
                    Err(ValidationError::new(
                        self.identifier,
                        ValidationErrorKind::Missing,
                    ))
                } else {
                    Ok(())
                }
            }
            Some(serde_json::Value::String(s)) => self.validate_str(s),
            Some(_) => Err(ValidationError::new(
                self.identifier,
                ValidationErrorKind::NotAString,
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    Missing,
    NotAString,
    Length { min: usize, max: usize, actual: usize },
    Pattern { pattern: String },
    NotAllowed { allowed: &'static [&'static str] },
    UnknownAttribute,
}

/// A violated validation rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{attribute}: {kind}")]
pub struct ValidationError {
    pub attribute: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(attribute: &str, kind: ValidationErrorKind) -> Self {
        Self {
            attribute: attribute.to_string(),
            kind,
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "is required"),
            Self::NotAString => write!(f, "must be a string"),
            Self::Length { min, max, actual } => write!(
                f,
                "must be between {min} and {max} characters long (got {actual})"
            ),
            Self::Pattern { pattern } => write!(f, "must match the pattern {pattern}"),
            Self::NotAllowed { allowed } => write!(f, "must be one of {}", allowed.join(", ")),
            Self::UnknownAttribute => write!(f, "is not a supported attribute"),
        }
    }
}

/// All violations found in one configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn has_error_for(&self, attribute: &str) -> bool {
        self.0.iter().any(|e| e.attribute == attribute)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: ")?;
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validation rules for every validated attribute of one resource type
#[derive(Debug, Clone)]
pub struct ResourceValidator {
    pub resource_name: &'static str,
    pub schema: Vec<ValidateSchema>,
}

impl ResourceValidator {
    pub fn rule(&self, identifier: &str) -> Option<&ValidateSchema> {
        self.schema.iter().find(|s| s.identifier == identifier)
    }

    /// Validate a whole attribute map
    ///
    /// Attributes listed in `known` but without a rule are accepted as-is;
    /// anything else not covered by a rule is reported as unknown.
    ///
    /// # Errors
    /// Returns every violation found
    pub fn validate_config(
        &self,
        config: &serde_json::Map<String, serde_json::Value>,
        known: &[&str],
    ) -> Result<(), ValidationErrors> {
        let mut errors: Vec<ValidationError> = self
            .schema
            .iter()
            .filter_map(|rule| rule.validate_value(config.get(rule.identifier)).err())
            .collect();

        errors.extend(
            config
                .keys()
                .filter(|key| self.rule(key).is_none() && !known.contains(&key.as_str()))
                .map(|key| ValidationError::new(key, ValidationErrorKind::UnknownAttribute)),
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// Lookup of validators by resource type
#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    validators: BTreeMap<&'static str, ResourceValidator>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, validator: ResourceValidator) {
        self.validators.insert(validator.resource_name, validator);
    }

    pub fn resource(&self, resource_name: &str) -> Option<&ResourceValidator> {
        self.validators.get(resource_name)
    }

    /// Find the rule for one attribute of one resource type
    pub fn invoke_validator(&self, resource_name: &str, identifier: &str) -> Option<&ValidateSchema> {
        self.resource(resource_name)?.rule(identifier)
    }
}
