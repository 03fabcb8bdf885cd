//! Imhotep Core Library
//!
//! Prescription history for a clinician's portal: look up a patient's records,
//! view the latest, edit a historical one or write a new one, and persist it
//! with the clinician's signature.
//!
//! # Architecture
//!
//! ```text
//!   Presentation surface (native UI via UniFFI)
//!        │ load / select_for_edit / save
//!        ▼
//!   ┌──────────────────────────────┐
//!   │ Session transitions          │  SessionState in, SessionState out
//!   │  - edit vs. insert decision  │
//!   │  - duplicate-save check      │
//!   │  - signature append/strip    │
//!   └──────────────┬───────────────┘
//!                  │ RecordStore
//!                  ▼
//!   ┌──────────────────────────────┐
//!   │ SQLite (configurable schema) │
//!   └──────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: TOML configuration, table/column naming
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (PrescriptionRecord, PatientHistory)
//! - [`session`]: Session state machine and signature transform
//! - [`store`]: Persistence boundary trait

pub mod config;
pub mod db;
pub mod models;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use config::{PortalConfig, SchemaConfig};
pub use db::Database;
pub use models::{PatientHistory, PrescriptionRecord, RecordId};
pub use session::{
    append_signature, strip_signature, EditDraft, RecordSessionController, SaveOutcome,
    SaveRequest, SessionError, SessionState, SessionStatus, ValidationError,
};
pub use store::{MemoryStore, RecordStore};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PortalError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<SessionError> for PortalError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Validation(v) => PortalError::Validation(v.to_string()),
            SessionError::Persistence(p) => PortalError::Persistence(p.to_string()),
        }
    }
}

impl From<db::DbError> for PortalError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::Config(c) => PortalError::Config(c.to_string()),
            other => PortalError::Persistence(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for PortalError {
    fn from(e: config::ConfigError) -> Self {
        PortalError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(e: serde_json::Error) -> Self {
        PortalError::Persistence(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PortalError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PortalError::Persistence(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Install the tracing subscriber. `RUST_LOG` overrides `filter`.
///
/// Returns false if a subscriber was already installed.
#[uniffi::export]
pub fn init_logging(filter: String) -> bool {
    install_subscriber(&filter)
}

fn install_subscriber(filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .try_init()
        .is_ok()
}

/// Open the portal described by a TOML config file.
///
/// Installs logging with the config's `log_filter` unless a subscriber is
/// already in place.
#[uniffi::export]
pub fn open_portal(config_path: String) -> Result<Arc<PrescriptionPortal>, PortalError> {
    let config = PortalConfig::load(&config_path)?;
    if install_subscriber(&config.log_filter) {
        tracing::debug!(filter = %config.log_filter, "installed log subscriber");
    }
    let db = Database::open(&config.database_path, &config.schema)?;
    tracing::info!(
        path = %config.database_path.display(),
        table = db.table_name(),
        "opened prescription portal"
    );
    Ok(PrescriptionPortal::new(db, config.default_author))
}

/// Open a database at the given path with the default schema.
#[uniffi::export]
pub fn open_portal_at(db_path: String) -> Result<Arc<PrescriptionPortal>, PortalError> {
    let db = Database::open(&db_path, &SchemaConfig::default())?;
    Ok(PrescriptionPortal::new(
        db,
        config::DEFAULT_AUTHOR_NAME.to_string(),
    ))
}

/// Create an in-memory portal (for testing).
#[uniffi::export]
pub fn open_portal_in_memory() -> Result<Arc<PrescriptionPortal>, PortalError> {
    let db = Database::open_in_memory()?;
    Ok(PrescriptionPortal::new(
        db,
        config::DEFAULT_AUTHOR_NAME.to_string(),
    ))
}

// =========================================================================
// Main API Objects
// =========================================================================

/// Shared database handle. Sessions opened from it keep separate state.
#[derive(uniffi::Object)]
pub struct PrescriptionPortal {
    db: Arc<Mutex<Database>>,
    default_author: String,
}

impl PrescriptionPortal {
    fn new(db: Database, default_author: String) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            default_author,
        })
    }
}

#[uniffi::export]
impl PrescriptionPortal {
    /// Start a session signed by the configured default author.
    pub fn open_session(&self) -> Arc<PortalSession> {
        self.open_session_for(self.default_author.clone())
    }

    /// Start a session signed by a named clinician.
    pub fn open_session_for(&self, clinician_name: String) -> Arc<PortalSession> {
        Arc::new(PortalSession {
            db: Arc::clone(&self.db),
            state: Mutex::new(SessionState::for_clinician(&clinician_name)),
        })
    }

    /// Patient history as JSON, without touching any session.
    pub fn history_json(&self, patient_identifier: String) -> Result<String, PortalError> {
        let db = self.db.lock()?;
        let history = PatientHistory::new(db.find_by_patient(patient_identifier.trim())?);
        Ok(history.to_json()?)
    }
}

/// One clinician's session over the shared database.
#[derive(uniffi::Object)]
pub struct PortalSession {
    db: Arc<Mutex<Database>>,
    state: Mutex<SessionState>,
}

#[uniffi::export]
impl PortalSession {
    /// Load a patient's history; leaves edit mode.
    pub fn load(&self, patient_identifier: String) -> Result<FfiHistory, PortalError> {
        let db = self.db.lock()?;
        let mut state = self.state.lock()?;
        let (next, history) = session::transitions::load(&*db, &state, &patient_identifier)?;
        *state = next;
        Ok(history.into())
    }

    /// Select a record from a loaded history for editing.
    pub fn select_for_edit(&self, record: FfiPrescriptionRecord) -> Result<FfiEditDraft, PortalError> {
        let mut state = self.state.lock()?;
        let (next, draft) = session::transitions::select_for_edit(&state, &record.into());
        *state = next;
        Ok(draft.into())
    }

    /// Save the collected fields; blank author signs as the session clinician.
    pub fn save(
        &self,
        patient_identifier: String,
        notes: String,
        prescription_text: String,
        author_name: Option<String>,
    ) -> Result<FfiSaveResult, PortalError> {
        let request = SaveRequest {
            patient_identifier,
            notes,
            prescription_text,
            author_name: author_name.unwrap_or_default(),
        };
        let mut db = self.db.lock()?;
        let mut state = self.state.lock()?;
        let (next, outcome) = session::transitions::save(&mut *db, &state, &request)?;
        *state = next;
        Ok(outcome.into())
    }

    /// Record currently selected for editing, if any.
    pub fn edit_target_id(&self) -> Result<Option<i64>, PortalError> {
        Ok(self.state.lock()?.edit_target_id.map(RecordId::get))
    }

    /// Identifier of the last successful load.
    pub fn active_patient_identifier(&self) -> Result<Option<String>, PortalError> {
        Ok(self.state.lock()?.active_patient_identifier.clone())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe prescription record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPrescriptionRecord {
    pub record_id: i64,
    pub patient_identifier: String,
    pub condition_notes: String,
    /// Unsigned text, for display
    pub prescription_text: String,
    pub stored_prescription_text: String,
    pub author_name: String,
    pub created_at: String,
}

impl From<PrescriptionRecord> for FfiPrescriptionRecord {
    fn from(record: PrescriptionRecord) -> Self {
        Self {
            record_id: record.record_id.get(),
            prescription_text: record.prescription_text().to_string(),
            patient_identifier: record.patient_identifier,
            condition_notes: record.condition_notes,
            stored_prescription_text: record.stored_prescription_text,
            author_name: record.author_name,
            created_at: record.created_at,
        }
    }
}

impl From<FfiPrescriptionRecord> for PrescriptionRecord {
    fn from(record: FfiPrescriptionRecord) -> Self {
        PrescriptionRecord {
            record_id: RecordId(record.record_id),
            patient_identifier: record.patient_identifier,
            condition_notes: record.condition_notes,
            stored_prescription_text: record.stored_prescription_text,
            author_name: record.author_name,
            created_at: record.created_at,
        }
    }
}

/// FFI-safe load result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHistory {
    pub status: FfiStatus,
    pub message: String,
    pub latest: Option<FfiPrescriptionRecord>,
    pub records: Vec<FfiPrescriptionRecord>,
}

impl From<PatientHistory> for FfiHistory {
    fn from(history: PatientHistory) -> Self {
        let status = SessionStatus::for_load(&history);
        let records: Vec<FfiPrescriptionRecord> =
            history.records.into_iter().map(|r| r.into()).collect();
        Self {
            status: status.into(),
            message: status.message().to_string(),
            latest: records.first().cloned(),
            records,
        }
    }
}

/// FFI-safe edit selection.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEditDraft {
    pub record_id: i64,
    pub patient_identifier: String,
    pub notes: String,
    pub prescription_text: String,
    pub message: String,
}

impl From<EditDraft> for FfiEditDraft {
    fn from(draft: EditDraft) -> Self {
        Self {
            record_id: draft.record_id.get(),
            patient_identifier: draft.patient_identifier,
            notes: draft.notes,
            prescription_text: draft.prescription_text,
            message: SessionStatus::EditSelected.message().to_string(),
        }
    }
}

/// FFI-safe save result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSaveResult {
    pub status: FfiStatus,
    pub message: String,
    pub record_id: Option<i64>,
    /// Refreshed history; empty for NoChange
    pub records: Vec<FfiPrescriptionRecord>,
}

impl From<SaveOutcome> for FfiSaveResult {
    fn from(outcome: SaveOutcome) -> Self {
        let status = SessionStatus::for_save(&outcome);
        let record_id = outcome.record_id().map(RecordId::get);
        let records = match outcome {
            SaveOutcome::Created { history, .. } | SaveOutcome::Updated { history, .. } => {
                history.records.into_iter().map(|r| r.into()).collect()
            }
            SaveOutcome::NoChange => Vec::new(),
        };
        Self {
            status: status.into(),
            message: status.message().to_string(),
            record_id,
            records,
        }
    }
}

/// FFI-safe status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiStatus {
    Loaded,
    NotFound,
    EditSelected,
    Created,
    Updated,
    NoChange,
    ValidationFailed,
    PersistenceFailed,
}

impl From<SessionStatus> for FfiStatus {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Loaded => FfiStatus::Loaded,
            SessionStatus::NotFound => FfiStatus::NotFound,
            SessionStatus::EditSelected => FfiStatus::EditSelected,
            SessionStatus::Created => FfiStatus::Created,
            SessionStatus::Updated => FfiStatus::Updated,
            SessionStatus::NoChange => FfiStatus::NoChange,
            SessionStatus::ValidationFailed => FfiStatus::ValidationFailed,
            SessionStatus::PersistenceFailed => FfiStatus::PersistenceFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_session_round_trip() {
        let portal = open_portal_in_memory().unwrap();
        let session = portal.open_session_for("DrB".into());

        let loaded = session.load("P2".into()).unwrap();
        assert_eq!(loaded.status, FfiStatus::NotFound);
        assert!(loaded.latest.is_none());

        let saved = session
            .save("P2".into(), "cough".into(), "rest".into(), None)
            .unwrap();
        assert_eq!(saved.status, FfiStatus::Created);
        assert_eq!(saved.records.len(), 1);
        assert_eq!(saved.records[0].prescription_text, "rest");
        assert_eq!(saved.records[0].stored_prescription_text, "rest\n\n— DrB");

        let again = session
            .save("P2".into(), "cough".into(), "rest".into(), None)
            .unwrap();
        assert_eq!(again.status, FfiStatus::NoChange);
        assert!(again.record_id.is_none());
    }

    #[test]
    fn test_portal_edit_flow() {
        let portal = open_portal_in_memory().unwrap();
        let session = portal.open_session();
        session
            .save("P1".into(), "N".into(), "Rx".into(), Some("DrA".into()))
            .unwrap();

        let loaded = session.load("P1".into()).unwrap();
        let latest = loaded.latest.unwrap();
        let draft = session.select_for_edit(latest.clone()).unwrap();
        assert_eq!(draft.prescription_text, "Rx");
        assert_eq!(session.edit_target_id().unwrap(), Some(latest.record_id));

        let saved = session
            .save("P1".into(), "N".into(), "Rx".into(), Some("DrA".into()))
            .unwrap();
        assert_eq!(saved.status, FfiStatus::Updated);
        assert_eq!(saved.record_id, Some(latest.record_id));
        assert_eq!(session.edit_target_id().unwrap(), None);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let portal = open_portal_in_memory().unwrap();
        let first = portal.open_session();
        let second = portal.open_session();

        first.save("P1".into(), "N".into(), "Rx".into(), None).unwrap();
        let loaded = first.load("P1".into()).unwrap();
        first.select_for_edit(loaded.latest.unwrap()).unwrap();

        assert!(first.edit_target_id().unwrap().is_some());
        assert!(second.edit_target_id().unwrap().is_none());
        assert!(second.active_patient_identifier().unwrap().is_none());

        // Shared store: the second session sees the first one's write
        let seen = second.load("P1".into()).unwrap();
        assert_eq!(seen.records.len(), 1);
    }

    #[test]
    fn test_portal_errors_map_to_variants() {
        let portal = open_portal_in_memory().unwrap();
        let session = portal.open_session();

        let result = session.save("".into(), "n".into(), "p".into(), None);
        assert!(matches!(result, Err(PortalError::Validation(_))));

        let result = session.select_for_edit(FfiPrescriptionRecord {
            record_id: 77,
            patient_identifier: "P1".into(),
            condition_notes: "n".into(),
            prescription_text: "p".into(),
            stored_prescription_text: "p".into(),
            author_name: "DrA".into(),
            created_at: String::new(),
        });
        assert!(result.is_ok());

        let result = session.save("P1".into(), "n".into(), "p".into(), None);
        assert!(matches!(result, Err(PortalError::Persistence(_))));
        // Edit target kept for retry
        assert_eq!(session.edit_target_id().unwrap(), Some(77));
    }

    #[test]
    fn test_open_portal_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("portal.db");
        let config_path = dir.path().join("imhotep.toml");
        std::fs::write(
            &config_path,
            format!(
                "database_path = {:?}\ndefault_author = \"Dr. Imhotep\"\n\n[schema]\ntable = \"Prescription\"\n",
                db_path.display().to_string()
            ),
        )
        .unwrap();

        let portal = open_portal(config_path.display().to_string()).unwrap();
        let session = portal.open_session();
        session.save("P1".into(), "N".into(), "Rx".into(), None).unwrap();

        let json = portal.history_json("P1".into()).unwrap();
        assert!(json.contains("Rx\\n\\n— Dr. Imhotep"));
    }

    #[test]
    fn test_open_portal_installs_logging() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("imhotep.toml");
        std::fs::write(
            &config_path,
            format!(
                "database_path = {:?}\nlog_filter = \"imhotep_core=debug\"\n",
                dir.path().join("portal.db").display().to_string()
            ),
        )
        .unwrap();

        open_portal(config_path.display().to_string()).unwrap();

        assert!(tracing::dispatcher::has_been_set());
        assert!(!init_logging("imhotep_core=trace".into()));
    }

    #[test]
    fn test_open_portal_bad_config() {
        let result = open_portal("/nonexistent/imhotep.toml".into());
        assert!(matches!(result, Err(PortalError::Config(_))));
    }
}
