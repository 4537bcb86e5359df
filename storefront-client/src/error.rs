use common_auth::AuthError;
use common_session::{CredentialSlot, SessionError};
use http::StatusCode;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request was rejected as unauthorized")]
    Unauthorized { evicted: Option<CredentialSlot> },
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("metrics output was not UTF-8")]
    MetricsEncoding,
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(err) => err.status(),
            _ => None,
        }
    }
}
