//! Database layer for the prescription portal.

mod records;
mod schema;

pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

use crate::config::{ConfigError, SchemaConfig};

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Schema configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
    queries: RecordQueries,
}

impl Database {
    /// Open database at path, creating the prescription table if needed.
    pub fn open<P: AsRef<Path>>(path: P, schema: &SchemaConfig) -> DbResult<Self> {
        let queries = RecordQueries::new(schema)?;
        let conn = Connection::open(path)?;
        let db = Self { conn, queries };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database with the default schema (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open_in_memory_with_schema(&SchemaConfig::default())
    }

    /// Create in-memory database with a custom schema.
    pub fn open_in_memory_with_schema(schema: &SchemaConfig) -> DbResult<Self> {
        let queries = RecordQueries::new(schema)?;
        let conn = Connection::open_in_memory()?;
        let db = Self { conn, queries };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(&self.queries.create_table)?;
        tracing::debug!(table = %self.queries.table, "prescription table ready");
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Table this database reads and writes.
    pub fn table_name(&self) -> &str {
        &self.queries.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(db: &Database) -> Vec<String> {
        db.conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();
        assert!(table_names(&db).contains(&"prescriptions".to_string()));
        assert_eq!(db.table_name(), "prescriptions");
    }

    #[test]
    fn test_legacy_schema_initialized() {
        let db = Database::open_in_memory_with_schema(&SchemaConfig::legacy()).unwrap();
        assert!(table_names(&db).contains(&"Prescription".to_string()));
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let mut schema = SchemaConfig::default();
        schema.table = "bad name".into();
        let result = Database::open_in_memory_with_schema(&schema);
        assert!(matches!(result, Err(DbError::Config(_))));
    }

    #[test]
    fn test_reopen_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal.db");

        Database::open(&path, &SchemaConfig::default()).unwrap();
        // Second open must not fail on the existing table
        let db = Database::open(&path, &SchemaConfig::default()).unwrap();
        assert!(table_names(&db).contains(&"prescriptions".to_string()));
    }
}
