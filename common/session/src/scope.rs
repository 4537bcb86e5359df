use common_auth::Role;
use http::Uri;

/// Module a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Seller,
    Admin,
    Delivery,
    Customer,
    Unscoped,
}

impl Scope {
    pub fn role(&self) -> Option<Role> {
        match self {
            Scope::Seller => Some(Role::Seller),
            Scope::Admin => Some(Role::Admin),
            Scope::Delivery => Some(Role::Delivery),
            Scope::Customer => Some(Role::Customer),
            Scope::Unscoped => None,
        }
    }

    /// Seller, admin and delivery pages never fall back to customer credentials.
    pub fn is_back_office(&self) -> bool {
        matches!(self, Scope::Seller | Scope::Admin | Scope::Delivery)
    }
}

// Checked in order; the first matching prefix wins.
const MODULE_PREFIXES: &[(&str, Scope)] = &[
    ("/seller", Scope::Seller),
    ("/admin", Scope::Admin),
    ("/delivery", Scope::Delivery),
    ("/customer", Scope::Customer),
];

// Shared storefront endpoints that only customers call.
const CUSTOMER_REQUEST_PREFIXES: &[&str] = &["/cart", "/wishlist", "/categories", "/products"];

pub fn classify(path: &str) -> Scope {
    MODULE_PREFIXES
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map(|(_, scope)| *scope)
        .unwrap_or(Scope::Unscoped)
}

/// Classifies an API request target, which may be an absolute URL.
pub fn classify_request(target: &str) -> Scope {
    let path = request_path(target);
    let scope = classify(&path);
    let customer_only = CUSTOMER_REQUEST_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix));
    if scope == Scope::Unscoped && customer_only {
        Scope::Customer
    } else {
        scope
    }
}

fn request_path(target: &str) -> String {
    match target.parse::<Uri>() {
        Ok(uri) if uri.scheme().is_some() => uri.path().to_string(),
        _ => target.to_string(),
    }
}

/// Where the user currently is. Passed explicitly instead of being read
/// from ambient state so selection stays a pure function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationContext {
    path: String,
}

impl NavigationContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn scope(&self) -> Scope {
        classify(&self.path)
    }
}

impl Default for NavigationContext {
    fn default() -> Self {
        Self::new("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_prefixes() {
        assert_eq!(classify("/seller/dashboard"), Scope::Seller);
        assert_eq!(classify("/admin"), Scope::Admin);
        assert_eq!(classify("/delivery/orders/7"), Scope::Delivery);
        assert_eq!(classify("/customer/profile"), Scope::Customer);
        assert_eq!(classify("/"), Scope::Unscoped);
        assert_eq!(classify("/products/12"), Scope::Unscoped);
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(classify("/admin/seller-tools"), Scope::Admin);
        assert_eq!(classify("/seller/admin"), Scope::Seller);
    }

    #[test]
    fn request_extensions_map_to_customer() {
        for path in ["/cart", "/wishlist/3", "/categories", "/products?page=2"] {
            assert_eq!(classify_request(path), Scope::Customer, "{path}");
        }
        assert_eq!(classify_request("/orders"), Scope::Unscoped);
        assert_eq!(classify_request("/admin/products"), Scope::Admin);
    }

    #[test]
    fn absolute_request_urls_use_their_path() {
        assert_eq!(
            classify_request("https://api.example.com/seller/products"),
            Scope::Seller
        );
        assert_eq!(classify_request("http://localhost:5000/cart"), Scope::Customer);
    }

    #[test]
    fn navigation_context_scope() {
        assert_eq!(NavigationContext::new("/delivery").scope(), Scope::Delivery);
        assert_eq!(NavigationContext::default().scope(), Scope::Unscoped);
        assert!(Scope::Admin.is_back_office());
        assert!(!Scope::Customer.is_back_office());
    }
}
