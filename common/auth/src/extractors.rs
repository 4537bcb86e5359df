use http::HeaderValue;

use crate::error::{AuthError, AuthResult};

const BEARER_PREFIX: &str = "Bearer ";

/// Builds the `Authorization` value for a stored credential.
pub fn bearer_header_value(token: &str) -> AuthResult<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("{BEARER_PREFIX}{}", token.trim()))
        .map_err(|_| AuthError::InvalidHeaderValue)?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_value_is_sensitive_and_trimmed() {
        let header = bearer_header_value(" abc.def.ghi\t").expect("header");
        assert!(header.is_sensitive());
        assert_eq!(header.to_str().unwrap(), "Bearer abc.def.ghi");
    }

    #[test]
    fn bearer_value_rejects_control_characters() {
        let err = bearer_header_value("abc\ndef").expect_err("newline");
        assert!(matches!(err, AuthError::InvalidHeaderValue));
    }
}
