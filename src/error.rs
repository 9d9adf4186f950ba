//! Crate-level error type.
//!
//! Each module owns its error enum; `QcError` wraps them so library callers
//! get one type to match on and the binary one place to pick an exit code.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::contacts::ContactError;
use crate::curves::InvalidCurveError;
use crate::grid_frame::MissingRequiredInputError;

#[derive(Debug, Error)]
pub enum QcError {
    #[error(transparent)]
    MissingRequiredInput(#[from] MissingRequiredInputError),

    #[error(transparent)]
    InvalidCurve(#[from] InvalidCurveError),

    #[error(transparent)]
    Contact(#[from] ContactError),

    #[error("cell {cell} references {keyword} {id}, which has no table")]
    UnknownRegion {
        keyword: &'static str,
        id: u32,
        cell: usize,
    },

    #[error("{keyword} {id} is defined more than once")]
    DuplicateRegion { keyword: &'static str, id: u32 },

    #[error("invalid cell {cell}: {reason}")]
    InvalidCell { cell: usize, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed grid frame document: {0}")]
    Json(#[from] serde_json::Error),
}

impl QcError {
    /// Process exit status for this error: `2` for missing simulator
    /// output, `1` for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            QcError::MissingRequiredInput(_) => 2,
            _ => 1,
        }
    }
}
