//! Schema system - dataset document validation

pub mod registry;
pub mod validator;

pub use registry::{SchemaVariant, MBID_PATTERN};
pub use validator::{DatasetValidator, SchemaViolation, ValidationError};
