//! Portal configuration loaded from TOML.
//!
//! The persisted shape is fixed (one row per prescription event), but table and
//! column names differ between deployments, so they are configured here rather
//! than baked into the queries.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel author name used when no clinician is known.
pub const DEFAULT_AUTHOR_NAME: &str = "Unknown";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid SQL identifier for {field}: {value:?}")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("Column name {0:?} is used more than once")]
    DuplicateColumn(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level portal configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PortalConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Clinician name used when a save does not supply one
    pub default_author: String,
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
    /// Table and column naming
    pub schema: SchemaConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("imhotep.db"),
            default_author: DEFAULT_AUTHOR_NAME.to_string(),
            log_filter: default_log_filter().to_string(),
            schema: SchemaConfig::default(),
        }
    }
}

impl PortalConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        let config: PortalConfig = toml::from_str(s)?;
        config.schema.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Default `tracing` filter.
pub fn default_log_filter() -> &'static str {
    "imhotep_core=info"
}

/// Table and column names for prescription rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchemaConfig {
    pub table: String,
    pub record_id: String,
    pub patient_identifier: String,
    pub condition_notes: String,
    pub prescription_text: String,
    pub author_name: String,
    pub created_at: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            table: "prescriptions".into(),
            record_id: "prescription_id".into(),
            patient_identifier: "patient_uid".into(),
            condition_notes: "condition_notes".into(),
            prescription_text: "prescription".into(),
            author_name: "doctor_name".into(),
            created_at: "created_at".into(),
        }
    }
}

impl SchemaConfig {
    /// Capitalised layout used by older portal databases.
    pub fn legacy() -> Self {
        Self {
            table: "Prescription".into(),
            record_id: "Pr_ID".into(),
            patient_identifier: "Patient_UID".into(),
            condition_notes: "Condition_Notes".into(),
            prescription_text: "Prescription".into(),
            author_name: "Doctor_Name".into(),
            created_at: "Created_At".into(),
        }
    }

    /// Column names in persisted order.
    pub fn columns(&self) -> [(&'static str, &str); 6] {
        [
            ("record_id", self.record_id.as_str()),
            ("patient_identifier", self.patient_identifier.as_str()),
            ("condition_notes", self.condition_notes.as_str()),
            ("prescription_text", self.prescription_text.as_str()),
            ("author_name", self.author_name.as_str()),
            ("created_at", self.created_at.as_str()),
        ]
    }

    /// Check every name is a plain identifier and columns are distinct.
    ///
    /// SQLite identifiers are case-insensitive, so distinctness is too.
    pub fn validate(&self) -> ConfigResult<()> {
        check_identifier("table", &self.table)?;
        let mut seen: Vec<String> = Vec::with_capacity(6);
        for (field, name) in self.columns() {
            check_identifier(field, name)?;
            let folded = name.to_ascii_lowercase();
            if seen.contains(&folded) {
                return Err(ConfigError::DuplicateColumn(name.to_string()));
            }
            seen.push(folded);
        }
        Ok(())
    }
}

fn check_identifier(field: &'static str, value: &str) -> ConfigResult<()> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            field,
            value: value.to_string(),
        })
    }
}
