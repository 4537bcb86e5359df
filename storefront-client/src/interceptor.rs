use std::sync::Arc;

use common_session::CredentialStore;
use http::StatusCode;

use crate::authenticator::{AuthAttempt, AuthCommand, RequestAuthenticator};
use crate::effects::{EffectExecutor, Navigator};
use crate::error::ClientResult;
use crate::metrics::ClientMetrics;

/// Request/response hooks shared by the tower layer and `ApiClient`.
///
/// `before` runs to completion ahead of dispatch; `after` runs once the
/// response is in and before the caller sees it.
#[derive(Clone)]
pub struct AuthInterceptor {
    authenticator: RequestAuthenticator,
    executor: EffectExecutor,
    navigator: Arc<dyn Navigator>,
    metrics: Arc<ClientMetrics>,
}

impl AuthInterceptor {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        metrics: Arc<ClientMetrics>,
    ) -> Self {
        Self {
            authenticator: RequestAuthenticator::new(store.clone()),
            executor: EffectExecutor::new(store, navigator.clone(), metrics.clone()),
            navigator,
            metrics,
        }
    }

    pub fn authenticator(&self) -> &RequestAuthenticator {
        &self.authenticator
    }

    pub fn metrics(&self) -> &Arc<ClientMetrics> {
        &self.metrics
    }

    pub fn before(&self, request_path: &str) -> AuthAttempt {
        let attempt = self
            .authenticator
            .authorize(&self.navigator.current(), request_path);
        self.metrics.request(attempt.credential_label());
        attempt
    }

    pub fn after(
        &self,
        attempt: &mut AuthAttempt,
        status: StatusCode,
    ) -> ClientResult<AuthCommand> {
        let command = self
            .authenticator
            .on_response(attempt, &self.navigator.current(), status);
        self.executor.execute(command)?;
        Ok(command)
    }
}
