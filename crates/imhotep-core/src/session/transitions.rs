//! Pure session transitions.

use crate::models::{PatientHistory, PrescriptionRecord};
use crate::store::RecordStore;

use super::{
    append_signature, EditDraft, SaveMode, SaveOutcome, SaveRequest, SessionResult,
    SessionState, ValidationError,
};

/// Load a patient's history and make its newest record the baseline.
///
/// Always leaves edit mode, whatever record was selected.
pub fn load<S: RecordStore + ?Sized>(
    store: &S,
    state: &SessionState,
    patient_identifier: &str,
) -> SessionResult<(SessionState, PatientHistory)> {
    let patient_identifier = require_identifier(patient_identifier)?;

    let history = PatientHistory::new(store.find_by_patient(patient_identifier)?);

    let mut next = state.clone();
    next.edit_target_id = None;
    next.active_patient_identifier = Some(patient_identifier.to_string());
    match history.latest() {
        Some(latest) => {
            next.baseline_notes = latest.condition_notes.clone();
            next.baseline_prescription = latest.prescription_text().to_string();
        }
        None => {
            next.baseline_notes.clear();
            next.baseline_prescription.clear();
        }
    }

    tracing::debug!(
        patient = patient_identifier,
        records = history.len(),
        "loaded patient history"
    );
    Ok((next, history))
}

/// Put a record from a loaded history into edit mode.
///
/// Baselines stay tied to the latest record.
pub fn select_for_edit(
    state: &SessionState,
    record: &PrescriptionRecord,
) -> (SessionState, EditDraft) {
    let mut next = state.clone();
    next.edit_target_id = Some(record.record_id);

    tracing::debug!(record_id = %record.record_id, "selected record for edit");
    let draft = EditDraft {
        record_id: record.record_id,
        patient_identifier: record.patient_identifier.clone(),
        notes: record.condition_notes.clone(),
        prescription_text: record.prescription_text().to_string(),
    };
    (next, draft)
}

/// Save the request: update the edit target, or insert unless it repeats the
/// loaded latest record.
///
/// Store errors are returned as is and the caller keeps `state`.
pub fn save<S: RecordStore + ?Sized>(
    store: &mut S,
    state: &SessionState,
    request: &SaveRequest,
) -> SessionResult<(SessionState, SaveOutcome)> {
    let patient_identifier = require_identifier(&request.patient_identifier)?;
    let notes = request.notes.trim();
    let prescription_text = request.prescription_text.trim();
    if notes.is_empty() && prescription_text.is_empty() {
        tracing::warn!(patient = patient_identifier, "rejected save with no content");
        return Err(ValidationError::EmptyContent.into());
    }

    let author_name = state.resolve_author(&request.author_name);

    match state.mode() {
        SaveMode::Edit(record_id) => {
            let stored = append_signature(prescription_text, &author_name);
            store
                .update(record_id, notes, &stored, &author_name)
                .inspect_err(|e| {
                    tracing::warn!(
                        patient = patient_identifier,
                        %record_id,
                        error = %e,
                        "prescription update failed"
                    )
                })?;

            let (next, history) = load(&*store, state, patient_identifier)?;
            Ok((next, SaveOutcome::Updated { record_id, history }))
        }
        SaveMode::Insert => {
            if state.matches_baseline(notes, prescription_text) {
                tracing::warn!(
                    patient = patient_identifier,
                    "save matches latest record, nothing written"
                );
                return Ok((state.clone(), SaveOutcome::NoChange));
            }

            let stored = append_signature(prescription_text, &author_name);
            let record_id = store
                .insert(patient_identifier, notes, &stored, &author_name)
                .inspect_err(|e| {
                    tracing::warn!(
                        patient = patient_identifier,
                        error = %e,
                        "prescription insert failed"
                    )
                })?;

            let (mut next, history) = load(&*store, state, patient_identifier)?;
            next.baseline_notes = notes.to_string();
            next.baseline_prescription = prescription_text.to_string();
            Ok((next, SaveOutcome::Created { record_id, history }))
        }
    }
}

fn require_identifier(patient_identifier: &str) -> Result<&str, ValidationError> {
    let trimmed = patient_identifier.trim();
    if trimmed.is_empty() {
        tracing::warn!("rejected empty patient identifier");
        return Err(ValidationError::EmptyIdentifier);
    }
    Ok(trimmed)
}
