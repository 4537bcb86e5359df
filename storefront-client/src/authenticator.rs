use std::sync::Arc;

use common_auth::bearer_header_value;
use common_session::{
    select_credential, CredentialSlot, CredentialStore, NavigationContext, Selection,
};
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue, StatusCode};
use tracing::{debug, warn};

/// Per-request authentication state, created before dispatch and consulted
/// when the response arrives. Re-sending the same logical request must reuse
/// the attempt so that the retry marker survives.
#[derive(Debug, Clone)]
pub struct AuthAttempt {
    selection: Option<Selection>,
    retried: bool,
}

impl AuthAttempt {
    pub fn anonymous() -> Self {
        Self {
            selection: None,
            retried: false,
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Slot key used for metrics and logs, or `anonymous`.
    pub fn credential_label(&self) -> &'static str {
        self.selection
            .as_ref()
            .map(|selection| selection.slot.key())
            .unwrap_or("anonymous")
    }

    pub fn authorization(&self) -> Option<HeaderValue> {
        let selection = self.selection.as_ref()?;
        match bearer_header_value(&selection.token) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    slot = selection.slot.key(),
                    error = %err,
                    "stored credential is not a valid header value; sending request without it"
                );
                None
            }
        }
    }

    /// Sets `Authorization` when a credential was selected. Without one the
    /// request goes out as-is and the API decides.
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Some(value) = self.authorization() {
            headers.insert(AUTHORIZATION, value);
        }
    }
}

/// What to do after a response has been seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthCommand {
    /// Hand the response to the caller untouched.
    PassThrough,
    /// Delete the slot for the current page's module, then hard-reload.
    EvictAndReload { slot: CredentialSlot },
    /// 401 on a page outside any module; nothing is known to be stale.
    Ignore,
}

impl AuthCommand {
    pub fn evicted_slot(&self) -> Option<CredentialSlot> {
        match self {
            AuthCommand::EvictAndReload { slot } => Some(*slot),
            _ => None,
        }
    }
}

/// Decides which credential accompanies a request and how a 401 is handled.
/// Holds no side effects of its own; see `EffectExecutor`.
#[derive(Clone)]
pub struct RequestAuthenticator {
    store: Arc<dyn CredentialStore>,
}

impl RequestAuthenticator {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn authorize(&self, nav: &NavigationContext, request_path: &str) -> AuthAttempt {
        AuthAttempt {
            selection: select_credential(nav, request_path, self.store.as_ref()),
            retried: false,
        }
    }

    pub fn on_response(
        &self,
        attempt: &mut AuthAttempt,
        nav: &NavigationContext,
        status: StatusCode,
    ) -> AuthCommand {
        if status != StatusCode::UNAUTHORIZED || attempt.retried {
            return AuthCommand::PassThrough;
        }
        attempt.retried = true;

        // The page, not the request, tells us which credential went stale.
        match nav.scope().role() {
            Some(role) => {
                let slot = CredentialSlot::Role(role);
                debug!(nav = nav.path(), slot = slot.key(), "401 received; evicting credential");
                AuthCommand::EvictAndReload { slot }
            }
            None => {
                warn!(
                    nav = nav.path(),
                    credential = attempt.credential_label(),
                    "401 on a page outside any module; leaving credentials in place"
                );
                AuthCommand::Ignore
            }
        }
    }
}
