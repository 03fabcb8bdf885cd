//! Prescription record session: load, select-for-edit and save.
//!
//! # State machine
//!
//! ```text
//!                    select_for_edit(r)
//!   ┌──────────────┐ ───────────────────► ┌──────────────────┐
//!   │ INSERT       │                      │ EDIT(r)          │
//!   │ save: insert │ ◄─────────────────── │ save: update(r)  │
//!   │  or NoChange │   load, or save ok   └──────────────────┘
//!   └──────────────┘
//!     ▲        │ load
//!     └────────┘
//! ```
//!
//! Every transition takes the current [`SessionState`] by reference and
//! returns the next one. The [`RecordSessionController`] wrapper keeps a store
//! and a state together for callers that want a single object.

mod controller;
mod signature;
mod state;
mod status;
pub mod transitions;

pub use controller::*;
pub use signature::*;
pub use state::*;
pub use status::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::DbError;
use crate::models::{PatientHistory, RecordId};

/// Input rejected before any store call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("empty identifier")]
    EmptyIdentifier,

    #[error("notes and prescription are both empty")]
    EmptyContent,
}

/// Session errors.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Store failure, surfaced unmodified
    #[error("Persistence error: {0}")]
    Persistence(#[from] DbError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// What a save did.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// New record inserted; history refreshed afterwards
    Created {
        record_id: RecordId,
        history: PatientHistory,
    },
    /// Selected record overwritten; history refreshed afterwards
    Updated {
        record_id: RecordId,
        history: PatientHistory,
    },
    /// Content equal to the loaded latest record, nothing written
    NoChange,
}

impl SaveOutcome {
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            SaveOutcome::Created { record_id, .. } | SaveOutcome::Updated { record_id, .. } => {
                Some(*record_id)
            }
            SaveOutcome::NoChange => None,
        }
    }

    /// Refreshed history, when the save wrote anything.
    pub fn history(&self) -> Option<&PatientHistory> {
        match self {
            SaveOutcome::Created { history, .. } | SaveOutcome::Updated { history, .. } => {
                Some(history)
            }
            SaveOutcome::NoChange => None,
        }
    }
}

/// Text of a record selected for editing, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditDraft {
    pub record_id: RecordId,
    pub patient_identifier: String,
    pub notes: String,
    /// Prescription text without the signature block
    pub prescription_text: String,
}

/// Fields collected by the presentation surface for a save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub patient_identifier: String,
    pub notes: String,
    pub prescription_text: String,
    /// Blank means "sign as the session clinician"
    pub author_name: String,
}

impl SaveRequest {
    pub fn new(
        patient_identifier: impl Into<String>,
        notes: impl Into<String>,
        prescription_text: impl Into<String>,
        author_name: impl Into<String>,
    ) -> Self {
        Self {
            patient_identifier: patient_identifier.into(),
            notes: notes.into(),
            prescription_text: prescription_text.into(),
            author_name: author_name.into(),
        }
    }
}
