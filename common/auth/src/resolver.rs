use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::roles::Role;

pub type Clock = fn() -> DateTime<Utc>;

/// Reads claims out of compact JWTs without verifying signatures.
///
/// Signature checks belong to the API; the storefront only needs the role and
/// expiry to route requests and gate navigation. Every public query fails
/// closed: a token that cannot be decoded has no role and counts as expired.
#[derive(Clone, Copy)]
pub struct TokenResolver {
    clock: Clock,
}

impl Default for TokenResolver {
    fn default() -> Self {
        Self { clock: Utc::now }
    }
}

impl std::fmt::Debug for TokenResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResolver").finish_non_exhaustive()
    }
}

impl TokenResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the wall clock, mainly for tests.
    pub fn with_clock(clock: Clock) -> Self {
        Self { clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn decode(&self, raw: &str) -> Option<Claims> {
        match self.try_decode(raw) {
            Ok(claims) => Some(claims),
            Err(err) => {
                debug!(error = %err, "discarding undecodable token");
                None
            }
        }
    }

    pub fn try_decode(&self, raw: &str) -> AuthResult<Claims> {
        let segments: Vec<&str> = raw.trim().split('.').collect();
        if segments.len() != 3 {
            return Err(AuthError::MalformedToken(segments.len()));
        }

        let payload = decode_segment(segments[1])?;
        let value: Value = serde_json::from_slice(&payload)
            .map_err(|err| AuthError::InvalidJson(err.to_string()))?;
        Claims::try_from(value)
    }

    pub fn is_expired(&self, raw: &str) -> bool {
        self.is_expired_at(raw, self.now())
    }

    pub fn is_expired_at(&self, raw: &str, now: DateTime<Utc>) -> bool {
        match self.decode(raw) {
            Some(claims) => claims.is_expired_at(now),
            None => true,
        }
    }

    pub fn role_of(&self, raw: &str) -> Option<Role> {
        self.decode(raw).and_then(|claims| claims.role)
    }
}

fn decode_segment(segment: &str) -> AuthResult<Vec<u8>> {
    let normalized: String = segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    if normalized.is_empty() {
        return Err(AuthError::InvalidEncoding("empty payload".to_string()));
    }
    URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|err| AuthError::InvalidEncoding(err.to_string()))
}
