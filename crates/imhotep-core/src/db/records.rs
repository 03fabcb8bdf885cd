//! Prescription record database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::config::DEFAULT_AUTHOR_NAME;
use crate::models::{timestamp_now, PrescriptionRecord, RecordId};

impl Database {
    /// Insert a new record. The store assigns the ID and `created_at`.
    pub fn insert_record(
        &self,
        patient_identifier: &str,
        notes: &str,
        stored_prescription_text: &str,
        author_name: &str,
    ) -> DbResult<RecordId> {
        self.conn
            .execute(
                &self.queries.insert,
                params![
                    patient_identifier,
                    notes,
                    stored_prescription_text,
                    author_name,
                    timestamp_now(),
                ],
            )
            .map_err(write_error)?;
        let record_id = RecordId(self.conn.last_insert_rowid());
        tracing::info!(patient = patient_identifier, %record_id, "inserted prescription record");
        Ok(record_id)
    }

    /// Update notes, prescription and author of an existing record.
    pub fn update_record(
        &self,
        record_id: RecordId,
        notes: &str,
        stored_prescription_text: &str,
        author_name: &str,
    ) -> DbResult<()> {
        let rows_affected = self
            .conn
            .execute(
                &self.queries.update,
                params![record_id.get(), notes, stored_prescription_text, author_name],
            )
            .map_err(write_error)?;
        if rows_affected == 0 {
            return Err(DbError::NotFound(format!("prescription record {}", record_id)));
        }
        tracing::info!(%record_id, rows = rows_affected, "updated prescription record");
        Ok(())
    }

    /// All records for a patient, newest first.
    pub fn find_by_patient(&self, patient_identifier: &str) -> DbResult<Vec<PrescriptionRecord>> {
        let mut stmt = self.conn.prepare(&self.queries.select_by_patient)?;
        let rows = stmt.query_map([patient_identifier], map_record)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(
            patient = patient_identifier,
            rows = records.len(),
            "queried prescription history"
        );
        Ok(records)
    }

    /// Get a record by ID.
    pub fn get_record(&self, record_id: RecordId) -> DbResult<Option<PrescriptionRecord>> {
        self.conn
            .query_row(&self.queries.select_by_id, [record_id.get()], map_record)
            .optional()
            .map_err(Into::into)
    }
}

/// Constraint failures on write (NOT NULL, CHECK, UNIQUE) become
/// [`DbError::Constraint`].
fn write_error(err: rusqlite::Error) -> DbError {
    match err {
        rusqlite::Error::SqliteFailure(cause, message)
            if cause.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::Constraint(message.unwrap_or_else(|| cause.to_string()))
        }
        other => DbError::Sqlite(other),
    }
}

/// Map a row selected in schema column order.
///
/// Tables created by older deployments allow NULL text columns.
fn map_record(row: &Row<'_>) -> rusqlite::Result<PrescriptionRecord> {
    Ok(PrescriptionRecord {
        record_id: RecordId(row.get(0)?),
        patient_identifier: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        condition_notes: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        stored_prescription_text: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        author_name: row
            .get::<_, Option<String>>(4)?
            .unwrap_or_else(|| DEFAULT_AUTHOR_NAME.to_string()),
        created_at: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
    })
}
