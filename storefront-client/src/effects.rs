use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use common_session::{CredentialStore, NavigationContext};
use tracing::info;

use crate::authenticator::AuthCommand;
use crate::error::ClientResult;
use crate::metrics::ClientMetrics;

/// Access to the current location and the ability to force a full reload.
pub trait Navigator: Send + Sync {
    fn current(&self) -> NavigationContext;

    /// Hard reload: abandons in-flight client state and re-runs the guards.
    fn reload(&self);
}

/// Navigator pinned to one path that records reload requests instead of
/// performing them. Used by the CLI and by tests.
#[derive(Debug, Default)]
pub struct FixedNavigator {
    path: RwLock<String>,
    reloads: AtomicUsize,
}

impl FixedNavigator {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: RwLock::new(path.into()),
            reloads: AtomicUsize::new(0),
        }
    }

    pub fn navigate(&self, path: impl Into<String>) {
        let mut guard = self.path.write().expect("rwlock poisoned");
        *guard = path.into();
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl Navigator for FixedNavigator {
    fn current(&self) -> NavigationContext {
        let guard = self.path.read().expect("rwlock poisoned");
        if guard.is_empty() {
            NavigationContext::default()
        } else {
            NavigationContext::new(guard.as_str())
        }
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        let nav = self.current();
        info!(path = nav.path(), "reload requested");
    }
}

/// Carries out the commands produced by `RequestAuthenticator`.
#[derive(Clone)]
pub struct EffectExecutor {
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    metrics: Arc<ClientMetrics>,
}

impl EffectExecutor {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        metrics: Arc<ClientMetrics>,
    ) -> Self {
        Self {
            store,
            navigator,
            metrics,
        }
    }

    pub fn execute(&self, command: AuthCommand) -> ClientResult<()> {
        match command {
            AuthCommand::PassThrough => {}
            AuthCommand::Ignore => self.metrics.unauthorized_ignored(),
            AuthCommand::EvictAndReload { slot } => {
                self.store.delete(slot)?;
                self.metrics.credential_evicted(slot.key());
                info!(slot = slot.key(), "credential evicted after 401");
                self.navigator.reload();
            }
        }
        Ok(())
    }
}
