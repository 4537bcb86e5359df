pub mod error;
pub mod guards;
pub mod routes;
pub mod scope;
pub mod selector;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{SessionError, SessionResult};
pub use guards::{
    AuthGuard, GuardOutcome, Guards, RedirectReason, RoleGuard, RoleOutcome, RouteDecision,
};
pub use routes::RouteTable;
pub use scope::{classify, classify_request, NavigationContext, Scope};
pub use selector::{select_credential, Selection, SelectionStep};
pub use session::{Session, SessionManager, SessionSource};
pub use store::{
    CredentialSlot, CredentialStore, FileCredentialStore, InMemoryCredentialStore, ALL_SLOTS,
};
