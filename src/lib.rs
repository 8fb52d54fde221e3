//! classet: storage and validation for recording classification datasets
//!
//! A dataset groups recordings (identified by MBID) into named classes.
//! Submitted dataset documents are checked against a JSON schema, then
//! persisted across three related tables inside a single transaction.

pub mod schema;
pub mod store;

pub use schema::{DatasetValidator, SchemaVariant, ValidationError};
pub use store::{
    ClassDocument, Dataset, DatasetClass, DatasetDocument, DatasetStore, DatasetSummary,
    StoreError, StoreStats,
};
