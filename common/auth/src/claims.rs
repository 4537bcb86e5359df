use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AuthError, AuthResult};
use crate::roles::Role;

/// Application-focused view of an unverified token payload.
///
/// Only `role` and `exp` drive routing decisions; the remaining fields are
/// surfaced for display. Claims that are present but malformed are treated
/// as absent rather than failing the whole decode.
#[derive(Debug, Clone, Serialize)]
pub struct Claims {
    pub role: Option<Role>,
    pub expires_at: Option<DateTime<Utc>>,
    pub issued_at: Option<DateTime<Utc>>,
    pub subject: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub raw: Value,
}

impl Claims {
    /// Strictly-before comparison; a token without `exp` never expires here.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at < now,
            None => false,
        }
    }
}

impl TryFrom<Value> for Claims {
    type Error = AuthError;

    fn try_from(value: Value) -> AuthResult<Self> {
        let object = value.as_object().ok_or(AuthError::PayloadNotObject)?;

        let role = object
            .get("role")
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse::<Role>().ok());

        Ok(Self {
            role,
            expires_at: object.get("exp").and_then(timestamp),
            issued_at: object.get("iat").and_then(timestamp),
            subject: subject(object),
            email: string_claim(object, "email"),
            name: string_claim(object, "name"),
            raw: value.clone(),
        })
    }
}

// Numeric values past chrono's range clamp to its bounds, so an absurdly
// old `exp` still reads as expired.
fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(seconds) = value.as_i64() {
        let at = Utc.timestamp_opt(seconds, 0).single();
        return Some(at.unwrap_or_else(|| saturated(seconds < 0)));
    }
    let seconds = value.as_f64().filter(|seconds| seconds.is_finite())?;
    let millis = seconds * 1000.0;
    let at = Utc.timestamp_millis_opt(millis as i64).single();
    Some(at.unwrap_or_else(|| saturated(millis < 0.0)))
}

fn saturated(past: bool) -> DateTime<Utc> {
    if past {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    }
}

fn subject(object: &Map<String, Value>) -> Option<String> {
    ["sub", "id", "_id"]
        .iter()
        .filter_map(|key| object.get(*key))
        .find_map(|value| match value {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
}

fn string_claim(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_routing_and_display_claims() {
        let claims = Claims::try_from(json!({
            "role": "SELLER",
            "exp": 1_700_000_000,
            "iat": 1_699_990_000,
            "id": 42,
            "email": "shop@example.com",
            "name": "Corner Shop"
        }))
        .expect("claims");

        assert_eq!(claims.role, Some(Role::Seller));
        assert_eq!(claims.expires_at.map(|at| at.timestamp()), Some(1_700_000_000));
        assert_eq!(claims.issued_at.map(|at| at.timestamp()), Some(1_699_990_000));
        assert_eq!(claims.subject.as_deref(), Some("42"));
        assert_eq!(claims.email.as_deref(), Some("shop@example.com"));
        assert_eq!(claims.name.as_deref(), Some("Corner Shop"));
    }

    #[test]
    fn malformed_exp_is_treated_as_absent() {
        let claims = Claims::try_from(json!({ "role": "admin", "exp": "tomorrow" })).unwrap();
        assert!(claims.expires_at.is_none());
        assert!(!claims.is_expired_at(Utc::now()));
    }

    #[test]
    fn huge_negative_exp_is_in_the_past() {
        let claims = Claims::try_from(json!({ "exp": -9_000_000_000_000_000_i64 })).unwrap();
        assert_eq!(claims.expires_at, Some(DateTime::<Utc>::MIN_UTC));
        assert!(claims.is_expired_at(Utc::now()));
    }

    #[test]
    fn unknown_role_is_absent() {
        let claims = Claims::try_from(json!({ "role": "cashier" })).unwrap();
        assert!(claims.role.is_none());
    }

    #[test]
    fn rejects_non_object_payload() {
        let err = Claims::try_from(json!(["role", "ADMIN"])).expect_err("array payload");
        assert!(matches!(err, AuthError::PayloadNotObject));
    }

    #[test]
    fn expiry_is_strictly_before_now() {
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        let at_now = Claims::try_from(json!({ "exp": 1_000 })).unwrap();
        let before = Claims::try_from(json!({ "exp": 999 })).unwrap();
        assert!(!at_now.is_expired_at(now));
        assert!(before.is_expired_at(now));
    }
}
