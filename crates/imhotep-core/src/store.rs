//! Persistence boundary used by the session layer.

use crate::db::{Database, DbError, DbResult};
use crate::models::{timestamp_now, PrescriptionRecord, RecordId};

/// Fetch, insert and update prescription records. No business rules.
pub trait RecordStore {
    /// All records for a patient, newest first. Empty when none exist.
    fn find_by_patient(&self, patient_identifier: &str) -> DbResult<Vec<PrescriptionRecord>>;

    /// Create a record and return its store-assigned ID.
    fn insert(
        &mut self,
        patient_identifier: &str,
        notes: &str,
        stored_prescription_text: &str,
        author_name: &str,
    ) -> DbResult<RecordId>;

    /// Overwrite notes, prescription and author of an existing record.
    fn update(
        &mut self,
        record_id: RecordId,
        notes: &str,
        stored_prescription_text: &str,
        author_name: &str,
    ) -> DbResult<()>;
}

impl RecordStore for Database {
    fn find_by_patient(&self, patient_identifier: &str) -> DbResult<Vec<PrescriptionRecord>> {
        Database::find_by_patient(self, patient_identifier)
    }

    fn insert(
        &mut self,
        patient_identifier: &str,
        notes: &str,
        stored_prescription_text: &str,
        author_name: &str,
    ) -> DbResult<RecordId> {
        self.insert_record(patient_identifier, notes, stored_prescription_text, author_name)
    }

    fn update(
        &mut self,
        record_id: RecordId,
        notes: &str,
        stored_prescription_text: &str,
        author_name: &str,
    ) -> DbResult<()> {
        self.update_record(record_id, notes, stored_prescription_text, author_name)
    }
}

impl<S: RecordStore + ?Sized> RecordStore for &mut S {
    fn find_by_patient(&self, patient_identifier: &str) -> DbResult<Vec<PrescriptionRecord>> {
        (**self).find_by_patient(patient_identifier)
    }

    fn insert(
        &mut self,
        patient_identifier: &str,
        notes: &str,
        stored_prescription_text: &str,
        author_name: &str,
    ) -> DbResult<RecordId> {
        (**self).insert(patient_identifier, notes, stored_prescription_text, author_name)
    }

    fn update(
        &mut self,
        record_id: RecordId,
        notes: &str,
        stored_prescription_text: &str,
        author_name: &str,
    ) -> DbResult<()> {
        (**self).update(record_id, notes, stored_prescription_text, author_name)
    }
}

/// Non-durable store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<PrescriptionRecord>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record, in insertion order.
    pub fn records(&self) -> &[PrescriptionRecord] {
        &self.records
    }
}

impl RecordStore for MemoryStore {
    fn find_by_patient(&self, patient_identifier: &str) -> DbResult<Vec<PrescriptionRecord>> {
        let mut found: Vec<PrescriptionRecord> = self
            .records
            .iter()
            .filter(|r| r.patient_identifier == patient_identifier)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.record_id.cmp(&a.record_id))
        });
        Ok(found)
    }

    fn insert(
        &mut self,
        patient_identifier: &str,
        notes: &str,
        stored_prescription_text: &str,
        author_name: &str,
    ) -> DbResult<RecordId> {
        self.next_id += 1;
        let record_id = RecordId(self.next_id);
        self.records.push(PrescriptionRecord {
            record_id,
            patient_identifier: patient_identifier.to_string(),
            condition_notes: notes.to_string(),
            stored_prescription_text: stored_prescription_text.to_string(),
            author_name: author_name.to_string(),
            created_at: timestamp_now(),
        });
        Ok(record_id)
    }

    fn update(
        &mut self,
        record_id: RecordId,
        notes: &str,
        stored_prescription_text: &str,
        author_name: &str,
    ) -> DbResult<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.record_id == record_id)
            .ok_or_else(|| DbError::NotFound(format!("prescription record {}", record_id)))?;
        record.condition_notes = notes.to_string();
        record.stored_prescription_text = stored_prescription_text.to_string();
        record.author_name = author_name.to_string();
        Ok(())
    }
}
