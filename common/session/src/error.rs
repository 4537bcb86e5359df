use std::path::PathBuf;

use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("credential for slot '{0}' must not be empty")]
    EmptyCredential(&'static str),
    #[error("failed to read credential store at {path}: {source}")]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write credential store at {path}: {source}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("credential store at {path} is not a JSON object of strings: {message}")]
    StoreFormat { path: PathBuf, message: String },
}
