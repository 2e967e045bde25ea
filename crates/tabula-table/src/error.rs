#![forbid(unsafe_code)]

//! Table error taxonomy.
//!
//! Structural and key-conflict failures are reported synchronously before
//! any storage is touched; callers can rely on strong exception safety for
//! every variant here.

use thiserror::Error;

use tabula_props::ValidationError;

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, TableError>;

/// Everything the table engine can fail with.
#[derive(Debug, Error)]
pub enum TableError {
    /// A cell or metadata value failed its check chain.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Shape, range, or permutation mismatch in a structural operation.
    #[error("{message}")]
    Structural { message: String },

    /// A duplicate column key where uniqueness is required.
    #[error("duplicate column key `{key}`")]
    KeyConflict { key: String },

    /// Operation attempted on a closed or detached object.
    #[error("{message}")]
    State { message: String },
}

impl TableError {
    pub(crate) fn structural(message: impl Into<String>) -> Self {
        Self::Structural {
            message: message.into(),
        }
    }

    pub(crate) fn key_conflict(key: impl Into<String>) -> Self {
        Self::KeyConflict { key: key.into() }
    }

    pub(crate) fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }
}
