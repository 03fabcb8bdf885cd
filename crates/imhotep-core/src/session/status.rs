//! User-visible outcome of each session action.

use serde::{Deserialize, Serialize};

use crate::models::PatientHistory;

use super::{SaveOutcome, SessionError, ValidationError};

/// One distinguishable status per outcome. A persistence failure is never
/// folded into "nothing happened".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    Loaded,
    NotFound,
    EditSelected,
    Created,
    Updated,
    NoChange,
    ValidationFailed,
    PersistenceFailed,
}

impl SessionStatus {
    pub fn for_load(history: &PatientHistory) -> Self {
        if history.is_empty() {
            SessionStatus::NotFound
        } else {
            SessionStatus::Loaded
        }
    }

    pub fn for_save(outcome: &SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Created { .. } => SessionStatus::Created,
            SaveOutcome::Updated { .. } => SessionStatus::Updated,
            SaveOutcome::NoChange => SessionStatus::NoChange,
        }
    }

    pub fn for_error(error: &SessionError) -> Self {
        match error {
            SessionError::Validation(_) => SessionStatus::ValidationFailed,
            SessionError::Persistence(_) => SessionStatus::PersistenceFailed,
        }
    }

    /// Whether the presentation should highlight this status.
    ///
    /// `NoChange` is not a failure, but the clinician still needs to see that
    /// nothing was written.
    pub fn needs_attention(self) -> bool {
        matches!(
            self,
            SessionStatus::NoChange
                | SessionStatus::ValidationFailed
                | SessionStatus::PersistenceFailed
        )
    }

    /// Default notification text.
    pub fn message(self) -> &'static str {
        match self {
            SessionStatus::Loaded => {
                "Loaded latest record (not in edit mode). Select a record to edit it."
            }
            SessionStatus::NotFound => "No patient data found. Ready to create new.",
            SessionStatus::EditSelected => "Loaded record for editing.",
            SessionStatus::Created => "Prescription saved successfully.",
            SessionStatus::Updated => "Record updated successfully.",
            SessionStatus::NoChange => "No new changes. Prescription not saved.",
            SessionStatus::ValidationFailed => "Enter a patient UID and notes or prescription.",
            SessionStatus::PersistenceFailed => "Could not save to the database.",
        }
    }
}

impl From<&SaveOutcome> for SessionStatus {
    fn from(outcome: &SaveOutcome) -> Self {
        SessionStatus::for_save(outcome)
    }
}

impl From<&SessionError> for SessionStatus {
    fn from(error: &SessionError) -> Self {
        SessionStatus::for_error(error)
    }
}

impl ValidationError {
    /// Field-specific prompt for the presentation surface.
    pub fn prompt(&self) -> &'static str {
        match self {
            ValidationError::EmptyIdentifier => "Enter a patient UID.",
            ValidationError::EmptyContent => "Please enter notes or prescription.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;
    use crate::models::RecordId;
    use std::collections::HashSet;

    #[test]
    fn test_every_status_has_distinct_message() {
        let all = [
            SessionStatus::Loaded,
            SessionStatus::NotFound,
            SessionStatus::EditSelected,
            SessionStatus::Created,
            SessionStatus::Updated,
            SessionStatus::NoChange,
            SessionStatus::ValidationFailed,
            SessionStatus::PersistenceFailed,
        ];
        let messages: HashSet<_> = all.iter().map(|s| s.message()).collect();
        assert_eq!(messages.len(), all.len());
    }

    #[test]
    fn test_for_load() {
        assert_eq!(
            SessionStatus::for_load(&PatientHistory::default()),
            SessionStatus::NotFound
        );
    }

    #[test]
    fn test_for_save() {
        let created = SaveOutcome::Created {
            record_id: RecordId(1),
            history: PatientHistory::default(),
        };
        assert_eq!(SessionStatus::from(&created), SessionStatus::Created);
        assert_eq!(
            SessionStatus::from(&SaveOutcome::NoChange),
            SessionStatus::NoChange
        );
    }

    #[test]
    fn test_persistence_error_is_not_no_change() {
        let error = SessionError::Persistence(DbError::NotFound("prescription record 3".into()));
        let status = SessionStatus::from(&error);
        assert_eq!(status, SessionStatus::PersistenceFailed);
        assert_ne!(status, SessionStatus::NoChange);
        assert!(status.needs_attention());
    }

    #[test]
    fn test_needs_attention() {
        assert!(SessionStatus::NoChange.needs_attention());
        assert!(SessionStatus::ValidationFailed.needs_attention());
        assert!(!SessionStatus::Created.needs_attention());
        assert!(!SessionStatus::Updated.needs_attention());
        assert!(!SessionStatus::Loaded.needs_attention());
        assert!(!SessionStatus::NotFound.needs_attention());
        assert!(!SessionStatus::EditSelected.needs_attention());
    }

    #[test]
    fn test_validation_prompts() {
        assert_eq!(ValidationError::EmptyIdentifier.prompt(), "Enter a patient UID.");
        assert_eq!(
            SessionStatus::from(&SessionError::from(ValidationError::EmptyContent)),
            SessionStatus::ValidationFailed
        );
    }
}
