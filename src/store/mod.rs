//! SQLite-backed dataset store
//!
//! This module persists datasets across three related tables:
//! - `dataset` holds the dataset row itself
//! - `dataset_class` holds its classes, keyed back to the dataset
//! - `dataset_class_member` holds the recordings assigned to each class
//!
//! Every write operation validates the submitted document against the
//! base dataset schema first, then runs all of its statements inside a
//! single transaction. A failure at any point drops the transaction and
//! rolls everything back; committed state is never partially replaced.

mod queries;
mod schema;
mod types;

pub use types::*;

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, Transaction};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::schema::{DatasetValidator, SchemaVariant, ValidationError};

/// Errors surfaced by store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The submitted document does not match the dataset schema
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No dataset exists with the requested id
    #[error("no dataset with id {0}")]
    NotFound(Uuid),

    /// A database failure inside a unit of work; the transaction has
    /// been rolled back
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A schema-valid document failed typed decoding
    #[error("malformed dataset document: {0}")]
    Document(#[from] serde_json::Error),
}

/// The dataset store, backed by a single SQLite connection
///
/// Write operations take `&mut self`, so one handle serializes its own
/// operations; separate handles (one connection each) are isolated by
/// SQLite's locking. The store keeps no state between calls beyond the
/// connection and the compiled schemas.
pub struct DatasetStore {
    conn: Connection,
    validator: DatasetValidator,
}

impl DatasetStore {
    /// Open or create a store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an ephemeral in-memory store. Used by tests and tooling.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        // Cascading deletes rely on foreign key enforcement, which
        // SQLite leaves off unless asked.
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;",
        )?;

        let store = Self {
            conn,
            validator: DatasetValidator::new(),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Check a document against a schema variant without writing anything.
    ///
    /// The store's own writes use the base variant; callers select the
    /// complete variant to decide downstream-processing eligibility.
    pub fn validate(
        &self,
        document: &JsonValue,
        variant: SchemaVariant,
    ) -> Result<(), ValidationError> {
        self.validator.iter_errors(document, variant)
    }

    /// Create a dataset from a submitted document.
    ///
    /// The document is validated before any row is written. The dataset
    /// row, its classes, and their members are inserted in one
    /// transaction, committed only after every insert succeeds. Returns
    /// the newly assigned dataset id.
    pub fn create(&mut self, document: &JsonValue, author: &str) -> Result<Uuid, StoreError> {
        self.validator.iter_errors(document, SchemaVariant::Base)?;
        let doc: DatasetDocument = serde_json::from_value(document.clone())?;

        let dataset_id = Uuid::new_v4();
        let created = Utc::now();

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO dataset (id, name, description, public, author, created)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                dataset_id.to_string(),
                doc.name,
                doc.description,
                doc.public,
                author,
                created.to_rfc3339(),
            ],
        )?;
        insert_classes(&tx, dataset_id, &doc.classes)?;
        tx.commit()?;

        debug!("created dataset {} for author {}", dataset_id, author);
        Ok(dataset_id)
    }

    /// Replace a dataset's fields and its entire class tree.
    ///
    /// Classes are not diffed against the previous state: every existing
    /// class row is deleted (members go with it via cascade) and the
    /// submitted set is inserted fresh, all in one transaction. Class ids
    /// are therefore not stable across updates. The dataset's id and
    /// created timestamp are untouched.
    ///
    /// Returns `StoreError::NotFound` when no dataset has the given id.
    pub fn update(
        &mut self,
        dataset_id: Uuid,
        document: &JsonValue,
        author: &str,
    ) -> Result<(), StoreError> {
        self.validator.iter_errors(document, SchemaVariant::Base)?;
        let doc: DatasetDocument = serde_json::from_value(document.clone())?;

        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE dataset SET name = ?1, description = ?2, public = ?3, author = ?4
             WHERE id = ?5",
            params![
                doc.name,
                doc.description,
                doc.public,
                author,
                dataset_id.to_string(),
            ],
        )?;
        if updated == 0 {
            // Early return drops the transaction and rolls back.
            return Err(StoreError::NotFound(dataset_id));
        }

        // Replace old classes with the submitted set; members cascade.
        tx.execute(
            "DELETE FROM dataset_class WHERE dataset = ?1",
            params![dataset_id.to_string()],
        )?;
        insert_classes(&tx, dataset_id, &doc.classes)?;
        tx.commit()?;

        debug!("updated dataset {}", dataset_id);
        Ok(())
    }

    /// Delete a dataset. Classes and members are removed via cascade.
    ///
    /// Deleting an id that does not exist affects zero rows and is not
    /// an error.
    pub fn delete(&mut self, dataset_id: Uuid) -> Result<(), StoreError> {
        let removed = self.conn.execute(
            "DELETE FROM dataset WHERE id = ?1",
            params![dataset_id.to_string()],
        )?;
        if removed > 0 {
            debug!("deleted dataset {}", dataset_id);
        }
        Ok(())
    }
}

/// Insert all classes and their members for a dataset.
///
/// Class ids are assigned by the database at insertion time; member rows
/// are keyed off the freshly assigned id.
fn insert_classes(
    tx: &Transaction<'_>,
    dataset_id: Uuid,
    classes: &[ClassDocument],
) -> Result<(), StoreError> {
    let mut member_stmt =
        tx.prepare_cached("INSERT INTO dataset_class_member (class, mbid) VALUES (?1, ?2)")?;

    for class in classes {
        tx.execute(
            "INSERT INTO dataset_class (name, description, dataset) VALUES (?1, ?2, ?3)",
            params![class.name, class.description, dataset_id.to_string()],
        )?;
        let class_id = tx.last_insert_rowid();

        for mbid in &class.recordings {
            member_stmt.execute(params![class_id, mbid])?;
        }
    }

    Ok(())
}
