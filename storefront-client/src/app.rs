use std::sync::Arc;

use common_session::{CredentialStore, FileCredentialStore, Guards, RouteTable, SessionManager};
use http::Uri;

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::effects::Navigator;
use crate::error::ClientResult;
use crate::interceptor::AuthInterceptor;
use crate::layer::AuthLayer;
use crate::metrics::ClientMetrics;

/// Shared wiring: one credential store behind the sessions, the guards and
/// the request path.
#[derive(Clone)]
pub struct Storefront {
    pub config: Arc<ClientConfig>,
    pub store: Arc<dyn CredentialStore>,
    pub sessions: SessionManager,
    pub navigator: Arc<dyn Navigator>,
    pub metrics: Arc<ClientMetrics>,
    pub interceptor: Arc<AuthInterceptor>,
}

impl Storefront {
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        let metrics = Arc::new(ClientMetrics::new()?);
        let interceptor = Arc::new(AuthInterceptor::new(
            store.clone(),
            navigator.clone(),
            metrics.clone(),
        ));
        Ok(Self {
            config: Arc::new(config),
            sessions: SessionManager::new(store.clone()),
            store,
            navigator,
            metrics,
            interceptor,
        })
    }

    /// Store persisted at the configured credentials path.
    pub fn from_config(config: ClientConfig, navigator: Arc<dyn Navigator>) -> ClientResult<Self> {
        let store = Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
        Self::new(config, store, navigator)
    }

    pub fn routes(&self) -> &RouteTable {
        &self.config.routes
    }

    pub fn guards(&self) -> Guards<'_, SessionManager> {
        Guards::new(&self.sessions, &self.config.routes)
    }

    pub fn api_client(&self, base_url: &str) -> ClientResult<ApiClient> {
        ApiClient::new(base_url, self.config.timeout, self.interceptor.clone())
    }

    /// Tower middleware mounted under the configured API base path.
    pub fn auth_layer(&self) -> AuthLayer {
        let layer = AuthLayer::new(self.interceptor.clone());
        match self
            .config
            .api_base_url
            .as_deref()
            .and_then(|url| url.parse::<Uri>().ok())
        {
            Some(uri) => layer.with_base_path(uri.path()),
            None => layer,
        }
    }
}
