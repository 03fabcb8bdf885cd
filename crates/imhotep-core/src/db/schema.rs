//! SQLite schema and statements, generated from [`SchemaConfig`].

use crate::config::{ConfigResult, SchemaConfig, DEFAULT_AUTHOR_NAME};

/// Prepared SQL text for one configured prescription table.
///
/// Identifiers are validated before interpolation and always quoted.
#[derive(Debug, Clone)]
pub struct RecordQueries {
    pub table: String,
    pub create_table: String,
    pub insert: String,
    pub update: String,
    pub select_by_patient: String,
    pub select_by_id: String,
}

impl RecordQueries {
    pub fn new(schema: &SchemaConfig) -> ConfigResult<Self> {
        schema.validate()?;

        let table = quote(&schema.table);
        let id = quote(&schema.record_id);
        let patient = quote(&schema.patient_identifier);
        let notes = quote(&schema.condition_notes);
        let prescription = quote(&schema.prescription_text);
        let author = quote(&schema.author_name);
        let created = quote(&schema.created_at);
        let index = quote(&format!(
            "idx_{}_{}",
            schema.table, schema.patient_identifier
        ));

        let create_table = format!(
            r#"
CREATE TABLE IF NOT EXISTS {table} (
    {id} INTEGER PRIMARY KEY AUTOINCREMENT,
    {patient} TEXT NOT NULL,
    {notes} TEXT NOT NULL DEFAULT '',
    {prescription} TEXT NOT NULL DEFAULT '',
    {author} TEXT NOT NULL DEFAULT '{DEFAULT_AUTHOR_NAME}',
    {created} TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS {index} ON {table}({patient}, {created});
"#
        );

        let insert = format!(
            "INSERT INTO {table} ({patient}, {notes}, {prescription}, {author}, {created}) \
             VALUES (?1, ?2, ?3, ?4, ?5)"
        );

        // created_at is never touched after insert
        let update = format!(
            "UPDATE {table} SET {notes} = ?2, {prescription} = ?3, {author} = ?4 WHERE {id} = ?1"
        );

        let columns = format!("{id}, {patient}, {notes}, {prescription}, {author}, {created}");

        // julianday() so legacy and RFC 3339 timestamps compare as instants
        let select_by_patient = format!(
            "SELECT {columns} FROM {table} WHERE {patient} = ?1 \
             ORDER BY julianday({created}) DESC, {id} DESC"
        );

        let select_by_id = format!("SELECT {columns} FROM {table} WHERE {id} = ?1");

        Ok(Self {
            table: schema.table.clone(),
            create_table,
            insert,
            update,
            select_by_patient,
            select_by_id,
        })
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let queries = RecordQueries::new(&SchemaConfig::default()).unwrap();
        let result = conn.execute_batch(&queries.create_table);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_legacy_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let queries = RecordQueries::new(&SchemaConfig::legacy()).unwrap();
        conn.execute_batch(&queries.create_table).unwrap();

        // All statements must prepare against the created table
        for sql in [
            &queries.insert,
            &queries.update,
            &queries.select_by_patient,
            &queries.select_by_id,
        ] {
            assert!(conn.prepare(sql).is_ok(), "Failed to prepare: {}", sql);
        }
    }

    #[test]
    fn test_identifiers_quoted() {
        let queries = RecordQueries::new(&SchemaConfig::legacy()).unwrap();
        assert!(queries.insert.starts_with("INSERT INTO \"Prescription\""));
        assert!(queries
            .select_by_patient
            .contains("ORDER BY julianday(\"Created_At\") DESC, \"Pr_ID\" DESC"));
    }

    #[test]
    fn test_author_default_applied() {
        let conn = Connection::open_in_memory().unwrap();
        let queries = RecordQueries::new(&SchemaConfig::default()).unwrap();
        conn.execute_batch(&queries.create_table).unwrap();

        conn.execute(
            "INSERT INTO prescriptions (patient_uid, created_at) VALUES ('P1', '2026-01-01 00:00:00.000000')",
            [],
        )
        .unwrap();

        let author: String = conn
            .query_row("SELECT doctor_name FROM prescriptions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(author, "Unknown");
    }
}
