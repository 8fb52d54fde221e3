//! Dataset document validation with per-constraint error reporting

use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::Diagnostic;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::schema::registry::{schema_for, SchemaVariant, MBID_PATTERN};

/// Validation failure for a submitted dataset document
#[derive(Debug, Error, Diagnostic)]
#[error("dataset validation failed: {summary}")]
#[diagnostic(code(classet::schema::validation_error))]
pub struct ValidationError {
    summary: String,

    #[related]
    violations: Vec<SchemaViolation>,
}

/// A single schema violation
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaViolation {
    path: String,
    message: String,

    #[help]
    help: Option<String>,
}

impl SchemaViolation {
    pub fn new(path: String, message: String, help: Option<String>) -> Self {
        Self {
            path,
            message,
            help,
        }
    }

    /// JSON pointer to the offending value ("" for the document root)
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ValidationError {
    pub fn new(variant: SchemaVariant, violations: Vec<SchemaViolation>) -> Self {
        let summary = if violations.len() == 1 {
            format!("1 violation of the {} schema", variant)
        } else {
            format!("{} violations of the {} schema", violations.len(), variant)
        };
        Self {
            summary,
            violations,
        }
    }

    pub fn violations(&self) -> &[SchemaViolation] {
        &self.violations
    }

    /// Get the number of violations
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }
}

/// Dataset validator with compiled schemas
///
/// Compiling a schema is not free, so both variants are compiled once at
/// construction and shared by every validation call. The validator holds
/// no mutable state and checks are side-effect free.
pub struct DatasetValidator {
    base: JsonValidator,
    complete: JsonValidator,
}

impl DatasetValidator {
    pub fn new() -> Self {
        // Both schema documents are fixed literals; compilation cannot
        // fail on user input.
        let base = validator_for(&schema_for(SchemaVariant::Base))
            .expect("base dataset schema compiles");
        let complete = validator_for(&schema_for(SchemaVariant::Complete))
            .expect("complete dataset schema compiles");
        Self { base, complete }
    }

    fn compiled(&self, variant: SchemaVariant) -> &JsonValidator {
        match variant {
            SchemaVariant::Base => &self.base,
            SchemaVariant::Complete => &self.complete,
        }
    }

    /// Check a document against a schema variant, stopping at the first
    /// violation.
    pub fn validate(
        &self,
        document: &JsonValue,
        variant: SchemaVariant,
    ) -> Result<(), ValidationError> {
        if let Err(error) = self.compiled(variant).validate(document) {
            let violation = error_to_violation(&error);
            return Err(ValidationError::new(variant, vec![violation]));
        }
        Ok(())
    }

    /// Check a document against a schema variant and collect every
    /// violation.
    pub fn iter_errors(
        &self,
        document: &JsonValue,
        variant: SchemaVariant,
    ) -> Result<(), ValidationError> {
        let violations: Vec<SchemaViolation> = self
            .compiled(variant)
            .iter_errors(document)
            .map(|e| error_to_violation(&e))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(variant, violations))
        }
    }
}

impl Default for DatasetValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a JSON Schema validation error to our violation format
fn error_to_violation(error: &JsonSchemaError) -> SchemaViolation {
    let path = error.instance_path.to_string();
    let message = format_schema_error(error);
    let help = generate_help_message(error);
    SchemaViolation::new(path, message, help)
}

/// Format a JSON Schema error into a user-friendly message
fn format_schema_error(error: &JsonSchemaError) -> String {
    let path = if error.instance_path.as_str().is_empty() {
        "document root".to_string()
    } else {
        format!("'{}'", error.instance_path)
    };

    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            format!("Missing required field: {} at {}", prop_str, path)
        }
        jsonschema::error::ValidationErrorKind::Type { kind } => {
            format!("Wrong type at {}: expected {:?}", path, kind)
        }
        jsonschema::error::ValidationErrorKind::Pattern { pattern } => {
            format!("Value at {} doesn't match pattern: {}", path, pattern)
        }
        jsonschema::error::ValidationErrorKind::MinLength { limit } => {
            format!(
                "Value at {} is too short: minimum {} characters",
                path, limit
            )
        }
        jsonschema::error::ValidationErrorKind::MaxLength { limit } => {
            format!("Value at {} is too long: maximum {} characters", path, limit)
        }
        jsonschema::error::ValidationErrorKind::MinItems { limit } => {
            format!("Array at {} is too small: minimum {} entries", path, limit)
        }
        _ => {
            format!("Validation error at {}: {}", path, error)
        }
    }
}

/// Generate a help message with suggestions for fixing the error
fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            Some(format!("Add the '{}' field to the document", prop_str))
        }
        jsonschema::error::ValidationErrorKind::Pattern { pattern } => {
            if *pattern == MBID_PATTERN {
                Some(
                    "Recordings are identified by MBID: 8-4-4-4-12 hexadecimal groups, \
                     e.g. 5465d03c-c767-4a51-9131-1b8d0c0de46b"
                        .to_string(),
                )
            } else {
                None
            }
        }
        jsonschema::error::ValidationErrorKind::Type { kind } => {
            Some(format!("Expected value of type: {:?}", kind))
        }
        jsonschema::error::ValidationErrorKind::MinItems { .. } => {
            Some("A complete dataset needs at least 2 classes with 2 recordings each".to_string())
        }
        _ => None,
    }
}
