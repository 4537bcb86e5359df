use common_auth::Role;
use tracing::debug;

use crate::scope::{classify_request, NavigationContext};
use crate::store::{CredentialSlot, CredentialStore};

/// Which resolution step produced the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStep {
    NavigationScope,
    RequestScope,
    CustomerDefault,
    Legacy,
}

impl SelectionStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStep::NavigationScope => "navigation_scope",
            SelectionStep::RequestScope => "request_scope",
            SelectionStep::CustomerDefault => "customer_default",
            SelectionStep::Legacy => "legacy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub slot: CredentialSlot,
    pub token: String,
    pub step: SelectionStep,
}

/// Picks the credential for an outbound request.
///
/// Order: the page's own module, then the module the request targets, then
/// the customer slot (skipped on seller/admin/delivery pages), then the
/// legacy slot. The first present, non-empty token wins; expiry is not
/// consulted, so a stale token is still sent and the API's 401 is what
/// invalidates it.
pub fn select_credential(
    nav: &NavigationContext,
    request_path: &str,
    store: &dyn CredentialStore,
) -> Option<Selection> {
    let nav_scope = nav.scope();

    let candidates = [
        (nav_scope.role().map(CredentialSlot::Role), SelectionStep::NavigationScope),
        (
            classify_request(request_path).role().map(CredentialSlot::Role),
            SelectionStep::RequestScope,
        ),
        (
            (!nav_scope.is_back_office()).then_some(CredentialSlot::Role(Role::Customer)),
            SelectionStep::CustomerDefault,
        ),
        (Some(CredentialSlot::Legacy), SelectionStep::Legacy),
    ];

    let selection = candidates.into_iter().find_map(|(slot, step)| {
        let slot = slot?;
        store.present(slot).map(|token| Selection { slot, token, step })
    });

    match &selection {
        Some(found) => debug!(
            nav = nav.path(),
            request = request_path,
            slot = found.slot.key(),
            step = found.step.as_str(),
            "selected credential"
        ),
        None => debug!(nav = nav.path(), request = request_path, "no credential available"),
    }

    selection
}
