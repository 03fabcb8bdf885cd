//! Store and session state kept together behind one object.

use crate::models::{PatientHistory, PrescriptionRecord};
use crate::store::RecordStore;

use super::{transitions, EditDraft, SaveOutcome, SaveRequest, SessionResult, SessionState};

/// Drives one clinician's session against a [`RecordStore`].
///
/// State is replaced only when a transition succeeds, so a failed save can be
/// retried with the same inputs.
pub struct RecordSessionController<S> {
    store: S,
    state: SessionState,
}

impl<S: RecordStore> RecordSessionController<S> {
    pub fn new(store: S) -> Self {
        Self::with_state(store, SessionState::new())
    }

    pub fn with_state(store: S, state: SessionState) -> Self {
        Self { store, state }
    }

    /// Load a patient's history. Cancels any pending edit target.
    pub fn load(&mut self, patient_identifier: &str) -> SessionResult<PatientHistory> {
        let (next, history) = transitions::load(&self.store, &self.state, patient_identifier)?;
        self.state = next;
        Ok(history)
    }

    /// Select a loaded record for editing.
    pub fn select_for_edit(&mut self, record: &PrescriptionRecord) -> EditDraft {
        let (next, draft) = transitions::select_for_edit(&self.state, record);
        self.state = next;
        draft
    }

    /// Save the collected fields. A blank `author_name` signs as the session
    /// clinician.
    pub fn save(
        &mut self,
        patient_identifier: &str,
        notes: &str,
        prescription_text: &str,
        author_name: &str,
    ) -> SessionResult<SaveOutcome> {
        let request = SaveRequest::new(patient_identifier, notes, prescription_text, author_name);
        self.save_request(&request)
    }

    pub fn save_request(&mut self, request: &SaveRequest) -> SessionResult<SaveOutcome> {
        let (next, outcome) = transitions::save(&mut self.store, &self.state, request)?;
        self.state = next;
        Ok(outcome)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_parts(self) -> (S, SessionState) {
        (self.store, self.state)
    }
}
