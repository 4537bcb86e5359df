use std::sync::Arc;

use common_auth::{Claims, Role, TokenResolver, ALL_ROLES};
use tracing::{debug, info};

use crate::error::{SessionError, SessionResult};
use crate::scope::NavigationContext;
use crate::store::{CredentialSlot, CredentialStore, ALL_SLOTS};

/// Who is signed in for a given page.
#[derive(Debug, Clone)]
pub struct Session {
    pub slot: CredentialSlot,
    pub token: String,
    pub claims: Claims,
}

impl Session {
    /// The token's `role` claim, falling back to the slot it was stored in.
    pub fn role(&self) -> Option<Role> {
        self.claims.role.or_else(|| self.slot.role())
    }
}

/// Anything able to answer "is there an authenticated session here".
pub trait SessionSource {
    fn current_session(&self, nav: &NavigationContext) -> Option<Session>;
}

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    resolver: TokenResolver,
}

impl SessionManager {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            resolver: TokenResolver::new(),
        }
    }

    pub fn with_resolver(store: Arc<dyn CredentialStore>, resolver: TokenResolver) -> Self {
        Self { store, resolver }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn resolver(&self) -> &TokenResolver {
        &self.resolver
    }

    /// Session for the page's module. Pages outside any module accept a
    /// customer session, then a legacy one.
    pub fn current(&self, nav: &NavigationContext) -> Option<Session> {
        let candidates = match nav.scope().role() {
            Some(role) => vec![CredentialSlot::Role(role)],
            None => vec![CredentialSlot::Role(Role::Customer), CredentialSlot::Legacy],
        };
        candidates.into_iter().find_map(|slot| self.session_for(slot))
    }

    /// A live session in `slot`: present, decodable and not expired.
    pub fn session_for(&self, slot: CredentialSlot) -> Option<Session> {
        let token = self.store.present(slot)?;
        let claims = self.resolver.decode(&token)?;
        if claims.is_expired_at(self.resolver.now()) {
            debug!(slot = slot.key(), "stored credential has expired");
            return None;
        }
        Some(Session {
            slot,
            token,
            claims,
        })
    }

    pub fn login(&self, role: Role, token: &str) -> SessionResult<()> {
        let slot = CredentialSlot::Role(role);
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::EmptyCredential(slot.key()));
        }
        self.store.set(slot, token)?;
        info!(slot = slot.key(), "credential stored");
        Ok(())
    }

    pub fn logout(&self, role: Role) -> SessionResult<()> {
        let slot = CredentialSlot::Role(role);
        self.store.delete(slot)?;
        info!(slot = slot.key(), "credential cleared");
        Ok(())
    }

    pub fn logout_all(&self) -> SessionResult<()> {
        for slot in ALL_SLOTS {
            self.store.delete(*slot)?;
        }
        info!("all credentials cleared");
        Ok(())
    }

    /// Every role currently holding a live session.
    pub fn active_sessions(&self) -> Vec<Session> {
        ALL_ROLES
            .iter()
            .filter_map(|role| self.session_for(CredentialSlot::Role(*role)))
            .collect()
    }
}

impl SessionSource for SessionManager {
    fn current_session(&self, nav: &NavigationContext) -> Option<Session> {
        self.current(nav)
    }
}
