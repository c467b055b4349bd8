use std::path::PathBuf;

use leadgen_core::ValidationError;
use thiserror::Error;

use crate::session::SessionKey;

/// Errors from writing or clearing the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize session entry '{key}': {source}")]
    Serialize {
        key: SessionKey,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from editing a record in place.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("index {index} out of range for '{list}' (length {len})")]
    IndexOutOfRange {
        list: String,
        index: usize,
        len: usize,
    },

    #[error("unknown field '{0}'")]
    UnknownField(String),
}

/// Errors returned by [`crate::Sequencer::dispatch`].
///
/// Remote failures are not here: they are recorded in the current stage as
/// a [`crate::StageFailure`] and `dispatch` still succeeds.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("cannot continue with an empty {0} selection")]
    EmptySelection(&'static str),

    #[error("action '{action}' is not available in stage '{stage}'")]
    InvalidAction {
        action: &'static str,
        stage: &'static str,
    },

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Errors from writing a CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
