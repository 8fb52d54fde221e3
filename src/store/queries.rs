//! Query methods for reading datasets back out
//!
//! Reconstruction is composed of one query for the dataset row, one for
//! its classes, and one per class for its members. Row order is whatever
//! the storage returns; callers must not rely on it.

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use super::{Dataset, DatasetClass, DatasetStore, DatasetSummary, StoreError, StoreStats};

impl DatasetStore {
    /// Fetch a dataset with its full class tree.
    ///
    /// Returns `Ok(None)` when no dataset has the given id.
    pub fn get(&self, dataset_id: Uuid) -> Result<Option<Dataset>, StoreError> {
        let dataset = self
            .conn
            .query_row(
                "SELECT id, name, description, public, author, created
                 FROM dataset WHERE id = ?1",
                params![dataset_id.to_string()],
                |row| {
                    Ok(Dataset {
                        id: parse_uuid(row.get::<_, String>(0)?),
                        name: row.get(1)?,
                        description: row.get(2)?,
                        public: row.get(3)?,
                        author: row.get(4)?,
                        created: parse_datetime(row.get::<_, String>(5)?),
                        classes: Vec::new(),
                    })
                },
            )
            .optional()?;

        let Some(mut dataset) = dataset else {
            return Ok(None);
        };

        dataset.classes = self.get_classes(dataset_id)?;
        Ok(Some(dataset))
    }

    /// List datasets authored by the given user, without class trees.
    ///
    /// With `public_only`, private datasets are filtered out.
    pub fn get_by_author(
        &self,
        author: &str,
        public_only: bool,
    ) -> Result<Vec<DatasetSummary>, StoreError> {
        let mut sql = String::from(
            "SELECT id, name, description, author, created FROM dataset WHERE author = ?1",
        );
        if public_only {
            sql.push_str(" AND public = 1");
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![author], |row| {
            Ok(DatasetSummary {
                id: parse_uuid(row.get::<_, String>(0)?),
                name: row.get(1)?,
                description: row.get(2)?,
                author: row.get(3)?,
                created: parse_datetime(row.get::<_, String>(4)?),
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Row counts across the three tables.
    pub fn statistics(&self) -> Result<StoreStats, StoreError> {
        let datasets: usize =
            self.conn
                .query_row("SELECT COUNT(*) FROM dataset", [], |row| row.get(0))?;
        let classes: usize =
            self.conn
                .query_row("SELECT COUNT(*) FROM dataset_class", [], |row| row.get(0))?;
        let members: usize =
            self.conn
                .query_row("SELECT COUNT(*) FROM dataset_class_member", [], |row| {
                    row.get(0)
                })?;

        Ok(StoreStats {
            datasets,
            classes,
            members,
        })
    }

    /// Get all classes for a dataset, each with its members attached.
    fn get_classes(&self, dataset_id: Uuid) -> Result<Vec<DatasetClass>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description FROM dataset_class WHERE dataset = ?1",
        )?;
        let rows = stmt.query_map(params![dataset_id.to_string()], |row| {
            Ok(DatasetClass {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                recordings: Vec::new(),
            })
        })?;

        let mut classes = rows.collect::<Result<Vec<_>, _>>()?;
        for class in &mut classes {
            class.recordings = self.get_class_members(class.id)?;
        }
        Ok(classes)
    }

    /// Get the member MBIDs for a class.
    fn get_class_members(&self, class_id: i64) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT mbid FROM dataset_class_member WHERE class = ?1")?;
        let rows = stmt.query_map(params![class_id], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

/// Parse a stored dataset id.
fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_default()
}

/// Parse a stored RFC 3339 timestamp.
fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap())
}
