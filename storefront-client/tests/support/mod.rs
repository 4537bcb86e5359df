#![allow(dead_code)]

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use common_session::{CredentialSlot, InMemoryCredentialStore};
use serde_json::Value;
use storefront_client::{ClientConfig, FixedNavigator, Storefront};

/// Unsigned compact JWT carrying `claims`.
pub fn token(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

pub struct Harness {
    pub app: Storefront,
    pub store: Arc<InMemoryCredentialStore>,
    pub navigator: Arc<FixedNavigator>,
}

pub fn harness(path: &str, entries: &[(CredentialSlot, &str)]) -> Harness {
    let store = Arc::new(InMemoryCredentialStore::with_entries(
        entries.iter().map(|(slot, token)| (*slot, token.to_string())),
    ));
    let navigator = Arc::new(FixedNavigator::new(path));
    let app = Storefront::new(ClientConfig::default(), store.clone(), navigator.clone())
        .expect("storefront wiring");
    Harness {
        app,
        store,
        navigator,
    }
}
