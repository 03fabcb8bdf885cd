//! Patient prescription history.

use serde::{Deserialize, Serialize};

use super::record::{PrescriptionRecord, RecordId};

/// All records for one patient, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientHistory {
    pub records: Vec<PrescriptionRecord>,
}

impl PatientHistory {
    pub fn new(records: Vec<PrescriptionRecord>) -> Self {
        Self { records }
    }

    /// The most recent record, if any.
    pub fn latest(&self) -> Option<&PrescriptionRecord> {
        self.records.first()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Find a record by ID within this history.
    pub fn find(&self, record_id: RecordId) -> Option<&PrescriptionRecord> {
        self.records.iter().find(|r| r.record_id == record_id)
    }

    /// Serialize for a presentation surface.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
