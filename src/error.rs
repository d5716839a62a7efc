use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostics::Diagnostic;

pub type Result<T> = std::result::Result<T, Diagnostic>;

/// Failures outside the language itself. These are never recovered from.
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<InternalError> for Diagnostic {
    fn from(e: InternalError) -> Self {
        Diagnostic::error(e.to_string())
    }
}
