use common_auth::Role;
use tracing::{debug, warn};

use crate::routes::RouteTable;
use crate::scope::NavigationContext;
use crate::session::{Session, SessionSource};

#[derive(Debug, Clone)]
pub enum GuardOutcome {
    Authenticated(Session),
    /// Send the user to `to`, remembering where they were headed.
    Redirect { to: String, from: String },
}

#[derive(Debug, Clone)]
pub enum RoleOutcome {
    Allowed(Session),
    Forbidden { to: String, session: Session },
    Unauthenticated { to: String, from: String },
}

/// Redirects to the module's login page when no session resolves.
pub struct AuthGuard<'a, S: SessionSource + ?Sized> {
    sessions: &'a S,
    routes: &'a RouteTable,
}

impl<'a, S: SessionSource + ?Sized> AuthGuard<'a, S> {
    pub fn new(sessions: &'a S, routes: &'a RouteTable) -> Self {
        Self { sessions, routes }
    }

    pub fn check(&self, nav: &NavigationContext) -> GuardOutcome {
        match self.sessions.current_session(nav) {
            Some(session) => GuardOutcome::Authenticated(session),
            None => {
                let to = self.routes.login_for(nav.scope()).to_string();
                debug!(path = nav.path(), redirect = %to, "no session; redirecting to login");
                GuardOutcome::Redirect {
                    to,
                    from: nav.path().to_string(),
                }
            }
        }
    }
}

/// Admits sessions whose role is on the allow-list. An empty list admits any
/// authenticated session.
pub struct RoleGuard<'a, S: SessionSource + ?Sized> {
    auth: AuthGuard<'a, S>,
    allowed: &'a [Role],
}

impl<'a, S: SessionSource + ?Sized> RoleGuard<'a, S> {
    pub fn new(sessions: &'a S, routes: &'a RouteTable, allowed: &'a [Role]) -> Self {
        Self {
            auth: AuthGuard::new(sessions, routes),
            allowed,
        }
    }

    pub fn check(&self, nav: &NavigationContext) -> RoleOutcome {
        let session = match self.auth.check(nav) {
            GuardOutcome::Authenticated(session) => session,
            GuardOutcome::Redirect { to, from } => {
                return RoleOutcome::Unauthenticated { to, from }
            }
        };

        if self.allowed.is_empty() {
            return RoleOutcome::Allowed(session);
        }

        match session.role() {
            Some(role) if self.allowed.contains(&role) => RoleOutcome::Allowed(session),
            role => {
                warn!(
                    path = nav.path(),
                    role = ?role,
                    allowed = ?self.allowed,
                    "role_check_failed"
                );
                RoleOutcome::Forbidden {
                    to: self.auth.routes.unauthorized.clone(),
                    session,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    Unauthenticated,
    Forbidden,
}

/// Final verdict for rendering a protected route.
#[derive(Debug, Clone)]
pub enum RouteDecision {
    Render(Session),
    Redirect {
        to: String,
        reason: RedirectReason,
    },
}

impl RouteDecision {
    pub fn is_render(&self) -> bool {
        matches!(self, RouteDecision::Render(_))
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            RouteDecision::Render(_) => None,
            RouteDecision::Redirect { to, .. } => Some(to),
        }
    }
}

/// Composes the authentication and role guards for a route.
pub struct Guards<'a, S: SessionSource + ?Sized> {
    sessions: &'a S,
    routes: &'a RouteTable,
}

impl<'a, S: SessionSource + ?Sized> Guards<'a, S> {
    pub fn new(sessions: &'a S, routes: &'a RouteTable) -> Self {
        Self { sessions, routes }
    }

    pub fn evaluate(&self, nav: &NavigationContext, allowed: &[Role]) -> RouteDecision {
        match RoleGuard::new(self.sessions, self.routes, allowed).check(nav) {
            RoleOutcome::Allowed(session) => RouteDecision::Render(session),
            RoleOutcome::Forbidden { to, .. } => RouteDecision::Redirect {
                to,
                reason: RedirectReason::Forbidden,
            },
            RoleOutcome::Unauthenticated { to, .. } => RouteDecision::Redirect {
                to,
                reason: RedirectReason::Unauthenticated,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CredentialSlot;
    use crate::test_support::token;
    use common_auth::TokenResolver;
    use serde_json::json;

    /// Fixed answer regardless of the page.
    struct StaticSessions(Option<Session>);

    impl SessionSource for StaticSessions {
        fn current_session(&self, _nav: &NavigationContext) -> Option<Session> {
            self.0.clone()
        }
    }

    fn session(role: &str) -> Session {
        let raw = token(json!({ "role": role }));
        Session {
            slot: CredentialSlot::Legacy,
            claims: TokenResolver::new().decode(&raw).unwrap(),
            token: raw,
        }
    }

    #[test]
    fn auth_guard_redirects_to_module_login() {
        let routes = RouteTable::default();
        let sessions = StaticSessions(None);
        match AuthGuard::new(&sessions, &routes).check(&NavigationContext::new("/admin/users")) {
            GuardOutcome::Redirect { to, from } => {
                assert_eq!(to, "/admin/login");
                assert_eq!(from, "/admin/users");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn auth_guard_uses_generic_login_off_module() {
        let routes = RouteTable::default().with_login(crate::Scope::Unscoped, "/signin");
        let sessions = StaticSessions(None);
        let outcome = AuthGuard::new(&sessions, &routes).check(&NavigationContext::new("/orders"));
        assert!(matches!(outcome, GuardOutcome::Redirect { to, .. } if to == "/signin"));
    }

    #[test]
    fn role_guard_forbids_other_role() {
        let routes = RouteTable::default();
        let sessions = StaticSessions(Some(session("SELLER")));
        let outcome = RoleGuard::new(&sessions, &routes, &[Role::Admin])
            .check(&NavigationContext::new("/admin"));
        assert!(matches!(outcome, RoleOutcome::Forbidden { to, .. } if to == "/unauthorized"));
    }

    #[test]
    fn role_guard_without_session_is_unauthenticated() {
        let routes = RouteTable::default();
        let sessions = StaticSessions(None);
        let outcome = RoleGuard::new(&sessions, &routes, &[Role::Admin])
            .check(&NavigationContext::new("/admin"));
        assert!(matches!(outcome, RoleOutcome::Unauthenticated { to, .. } if to == "/admin/login"));
    }

    #[test]
    fn role_guard_allows_listed_role() {
        let routes = RouteTable::default();
        let sessions = StaticSessions(Some(session("ADMIN")));
        let outcome = RoleGuard::new(&sessions, &routes, &[Role::Seller, Role::Admin])
            .check(&NavigationContext::new("/admin"));
        assert!(matches!(outcome, RoleOutcome::Allowed(_)));
    }

    #[test]
    fn empty_allow_list_admits_any_session() {
        let routes = RouteTable::default();
        let sessions = StaticSessions(Some(session("DELIVERY")));
        let decision = Guards::new(&sessions, &routes).evaluate(&NavigationContext::new("/"), &[]);
        assert!(decision.is_render());
    }

    #[test]
    fn guards_distinguish_redirect_reasons() {
        let routes = RouteTable::default();
        let seller = StaticSessions(Some(session("SELLER")));
        let admin_page = NavigationContext::new("/admin");
        let forbidden = Guards::new(&seller, &routes).evaluate(&admin_page, &[Role::Admin]);
        assert!(matches!(
            forbidden,
            RouteDecision::Redirect { reason: RedirectReason::Forbidden, .. }
        ));

        let nobody = StaticSessions(None);
        let unauthenticated = Guards::new(&nobody, &routes).evaluate(&admin_page, &[Role::Admin]);
        assert_eq!(unauthenticated.redirect_target(), Some("/admin/login"));
        assert!(matches!(
            unauthenticated,
            RouteDecision::Redirect { reason: RedirectReason::Unauthenticated, .. }
        ));
    }
}
