//! Session state value object.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_AUTHOR_NAME;
use crate::models::RecordId;

use super::signature_name;

/// Which path the next save takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Create a new record ("new or latest")
    Insert,
    /// Update the selected historical record
    Edit(RecordId),
}

/// Transient state of one clinician's interaction between loads and saves.
///
/// Never persisted. Transitions in [`super::transitions`] take a reference and
/// return the next state, so a failed operation leaves the caller's copy as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Identifier of the last successful load
    pub active_patient_identifier: Option<String>,
    /// Set while a historical record is selected for editing
    pub edit_target_id: Option<RecordId>,
    /// Notes of the latest record at last load, for duplicate-save suppression
    pub baseline_notes: String,
    /// Unsigned prescription of the latest record at last load
    pub baseline_prescription: String,
    /// Clinician signing saves that do not name an author
    pub clinician_name: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Empty session signed by the sentinel author.
    pub fn new() -> Self {
        Self::for_clinician(DEFAULT_AUTHOR_NAME)
    }

    /// Empty session for a known clinician.
    pub fn for_clinician(name: &str) -> Self {
        let name = signature_name(name);
        Self {
            active_patient_identifier: None,
            edit_target_id: None,
            baseline_notes: String::new(),
            baseline_prescription: String::new(),
            clinician_name: if name.is_empty() {
                DEFAULT_AUTHOR_NAME.to_string()
            } else {
                name
            },
        }
    }

    pub fn mode(&self) -> SaveMode {
        match self.edit_target_id {
            Some(id) => SaveMode::Edit(id),
            None => SaveMode::Insert,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.edit_target_id.is_some()
    }

    /// True when an insert of this content would repeat the loaded latest record.
    pub fn matches_baseline(&self, notes: &str, prescription_text: &str) -> bool {
        !self.baseline_notes.is_empty()
            && notes == self.baseline_notes
            && prescription_text == self.baseline_prescription
    }

    /// Author for a save: the given name if non-blank, else the session clinician.
    ///
    /// Line breaks are flattened so the stored author matches the signature.
    pub fn resolve_author(&self, author_name: &str) -> String {
        let author_name = signature_name(author_name);
        if author_name.is_empty() {
            self.clinician_name.clone()
        } else {
            author_name
        }
    }
}
