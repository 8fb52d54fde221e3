//! Store type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =========================================================================
// Submitted Documents
// =========================================================================

/// A dataset definition as submitted by a caller
///
/// Decoded from a JSON document after it passes schema validation, so the
/// fields mirror the schema exactly. Unknown fields in the submission are
/// ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDocument {
    /// Dataset name, 1-100 characters
    pub name: String,

    /// Optional free-form description; absent maps to None
    #[serde(default)]
    pub description: Option<String>,

    /// Visibility flag
    pub public: bool,

    /// Classes in submission order
    pub classes: Vec<ClassDocument>,
}

/// A class definition within a submitted dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDocument {
    /// Class name, 1-100 characters
    pub name: String,

    /// Optional free-form description; absent maps to None
    #[serde(default)]
    pub description: Option<String>,

    /// Recording MBIDs assigned to this class
    pub recordings: Vec<String>,
}

// =========================================================================
// Stored Entities
// =========================================================================

/// A stored dataset with its full class tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub public: bool,
    pub author: String,
    pub created: DateTime<Utc>,
    pub classes: Vec<DatasetClass>,
}

/// A stored class and its members
///
/// The id is assigned by the database at insertion time. Updates replace
/// the whole class set, so ids are not stable across an update and must
/// not be persisted by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetClass {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub recordings: Vec<String>,
}

/// Listing view of a dataset, without the class tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub author: String,
    pub created: DateTime<Utc>,
}

// =========================================================================
// Aggregate Result Types
// =========================================================================

/// Row counts across the three tables
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreStats {
    pub datasets: usize,
    pub classes: usize,
    pub members: usize,
}
