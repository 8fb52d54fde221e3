//! Dataset schema documents
//!
//! Two variants are defined. Base describes the structural shape of a
//! submitted dataset; Complete adds the minimum class and recording
//! counts a dataset needs before downstream processing will accept it.
//! Complete is derived from Base by copying the document and tightening
//! the two bounds, so neither variant shares mutable state.

use serde_json::{json, Value as JsonValue};

/// Canonical recording identifier pattern: 8-4-4-4-12 hex groups,
/// case-insensitive (a MusicBrainz recording ID).
pub const MBID_PATTERN: &str =
    "^[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}$";

/// Schema variant selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVariant {
    /// Structural checks only; empty class lists are allowed
    Base,
    /// Base plus minimum counts: >=2 classes, each with >=2 recordings
    Complete,
}

impl SchemaVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVariant::Base => "base",
            SchemaVariant::Complete => "complete",
        }
    }

    /// All variants, in increasing strictness
    pub fn all() -> &'static [SchemaVariant] {
        &[SchemaVariant::Base, SchemaVariant::Complete]
    }
}

impl std::fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build the base dataset schema document.
pub fn base_schema() -> JsonValue {
    json!({
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "minLength": 1,
                "maxLength": 100
            },
            "description": {"type": ["string", "null"]},
            "public": {"type": "boolean"},
            "classes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "minLength": 1,
                            "maxLength": 100
                        },
                        "description": {"type": ["string", "null"]},
                        "recordings": {
                            "type": "array",
                            "items": {
                                "type": "string",
                                "pattern": MBID_PATTERN
                            }
                        }
                    },
                    "required": ["name", "recordings"]
                }
            }
        },
        "required": ["name", "classes", "public"]
    })
}

/// Build the complete-variant schema: base with minimum counts applied.
pub fn complete_schema() -> JsonValue {
    let mut schema = base_schema();
    schema["properties"]["classes"]["minItems"] = json!(2);
    schema["properties"]["classes"]["items"]["properties"]["recordings"]["minItems"] = json!(2);
    schema
}

/// Get the schema document for a variant.
pub fn schema_for(variant: SchemaVariant) -> JsonValue {
    match variant {
        SchemaVariant::Base => base_schema(),
        SchemaVariant::Complete => complete_schema(),
    }
}
