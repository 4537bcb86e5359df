use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token must have three dot-separated segments, found {0}")]
    MalformedToken(usize),
    #[error("token payload is not valid base64url: {0}")]
    InvalidEncoding(String),
    #[error("malformed claim payload: {0}")]
    InvalidJson(String),
    #[error("claim payload must be a JSON object")]
    PayloadNotObject,
    #[error("unknown role '{0}'")]
    UnknownRole(String),
    #[error("token contains characters not allowed in a header value")]
    InvalidHeaderValue,
}
