//! Error types for import actions.
//!
//! Errors are classified by where they surface:
//! - Io: the file boundary (read/write of stores and sources)
//! - Parse: a source file that is structurally unreadable
//! - Validation: a readable source that yields no usable records
//!
//! Pipeline transforms never produce these; malformed values inside a record
//! degrade to empty/default results instead.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised by import/clear actions and store I/O.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("No scenarios found in {path}")]
    NoScenarios { path: PathBuf },
}

impl ImportError {
    /// True when the source file could not be parsed at all.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, ImportError::Json { .. } | ImportError::Csv { .. })
    }

    /// True when the source parsed fine but carried no usable records.
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, ImportError::NoScenarios { .. })
    }
}
