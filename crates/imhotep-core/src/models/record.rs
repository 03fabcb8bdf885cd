//! Prescription record models.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::strip_signature;

/// Store-assigned identifier of a prescription record. Never reassigned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// One prescription entry tied to a patient identifier, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionRecord {
    /// Assigned by the store on creation
    pub record_id: RecordId,
    /// Caller-supplied patient identifier (not validated for format)
    pub patient_identifier: String,
    /// Free-text condition notes, may be empty
    pub condition_notes: String,
    /// Prescription text with the trailing signature block
    pub stored_prescription_text: String,
    /// Signing clinician
    pub author_name: String,
    /// Insertion timestamp (RFC 3339, UTC), immutable
    pub created_at: String,
}

impl PrescriptionRecord {
    /// Prescription text as authored, without the signature block.
    pub fn prescription_text(&self) -> &str {
        strip_signature(&self.stored_prescription_text)
    }
}

/// `created_at` layout: SQLite's own `YYYY-MM-DD HH:MM:SS.SSSSSS`, in UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Current UTC time in [`TIMESTAMP_FORMAT`].
///
/// Matches rows written by `CURRENT_TIMESTAMP`, and the fixed microsecond
/// width keeps lexical and chronological order equal.
pub fn timestamp_now() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(stored: &str) -> PrescriptionRecord {
        PrescriptionRecord {
            record_id: RecordId(7),
            patient_identifier: "P1".into(),
            condition_notes: "fever".into(),
            stored_prescription_text: stored.into(),
            author_name: "DrA".into(),
            created_at: timestamp_now(),
        }
    }

    #[test]
    fn test_prescription_text_strips_signature() {
        let record = make_record("paracetamol 500mg\n\n— DrA");
        assert_eq!(record.prescription_text(), "paracetamol 500mg");
    }

    #[test]
    fn test_prescription_text_without_signature() {
        let record = make_record("paracetamol 500mg");
        assert_eq!(record.prescription_text(), "paracetamol 500mg");
    }

    #[test]
    fn test_timestamp_fixed_width() {
        let a = timestamp_now();
        let b = timestamp_now();
        assert_eq!(a.len(), b.len());
        assert_eq!(a.len(), "2026-01-01 00:00:00.000000".len());
        assert!(chrono::NaiveDateTime::parse_from_str(&a, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_record_id_serializes_as_number() {
        let json = serde_json::to_string(&RecordId(42)).unwrap();
        assert_eq!(json, "42");
    }
}
