//! Database schema initialization

use super::{DatasetStore, StoreError};

impl DatasetStore {
    /// Create the three tables if they do not exist yet.
    ///
    /// Ownership is expressed as declarative cascades: deleting a dataset
    /// removes its classes, deleting a class removes its members. Requires
    /// foreign key enforcement, switched on at open.
    pub(super) fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            -- Datasets
            CREATE TABLE IF NOT EXISTS dataset (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                public INTEGER NOT NULL,
                author TEXT NOT NULL,
                created TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_dataset_author ON dataset(author);

            -- Classes, owned by a dataset
            CREATE TABLE IF NOT EXISTS dataset_class (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                dataset TEXT NOT NULL,
                FOREIGN KEY (dataset) REFERENCES dataset(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_class_dataset ON dataset_class(dataset);

            -- Class members, owned by a class
            CREATE TABLE IF NOT EXISTS dataset_class_member (
                class INTEGER NOT NULL,
                mbid TEXT NOT NULL,
                FOREIGN KEY (class) REFERENCES dataset_class(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_member_class ON dataset_class_member(class);
            "#,
        )?;

        Ok(())
    }
}
