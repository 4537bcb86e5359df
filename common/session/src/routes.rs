use crate::scope::Scope;

/// Login and rejection targets consumed by the navigation guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    pub seller_login: String,
    pub admin_login: String,
    pub delivery_login: String,
    pub customer_login: String,
    /// Used when the path belongs to no module.
    pub generic_login: String,
    pub unauthorized: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            seller_login: "/seller/login".to_string(),
            admin_login: "/admin/login".to_string(),
            delivery_login: "/delivery/login".to_string(),
            customer_login: "/login".to_string(),
            generic_login: "/login".to_string(),
            unauthorized: "/unauthorized".to_string(),
        }
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login(mut self, scope: Scope, route: impl Into<String>) -> Self {
        let route = route.into();
        match scope {
            Scope::Seller => self.seller_login = route,
            Scope::Admin => self.admin_login = route,
            Scope::Delivery => self.delivery_login = route,
            Scope::Customer => self.customer_login = route,
            Scope::Unscoped => self.generic_login = route,
        }
        self
    }

    pub fn with_unauthorized(mut self, route: impl Into<String>) -> Self {
        self.unauthorized = route.into();
        self
    }

    pub fn login_for(&self, scope: Scope) -> &str {
        match scope {
            Scope::Seller => &self.seller_login,
            Scope::Admin => &self.admin_login,
            Scope::Delivery => &self.delivery_login,
            Scope::Customer => &self.customer_login,
            Scope::Unscoped => &self.generic_login,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_per_scope() {
        let routes = RouteTable::default();
        assert_eq!(routes.login_for(Scope::Seller), "/seller/login");
        assert_eq!(routes.login_for(Scope::Admin), "/admin/login");
        assert_eq!(routes.login_for(Scope::Delivery), "/delivery/login");
        assert_eq!(routes.login_for(Scope::Customer), "/login");
        assert_eq!(routes.login_for(Scope::Unscoped), "/login");
        assert_eq!(routes.unauthorized, "/unauthorized");
    }

    #[test]
    fn overrides() {
        let routes = RouteTable::new()
            .with_login(Scope::Delivery, "/delivery/sign-in")
            .with_unauthorized("/403");
        assert_eq!(routes.login_for(Scope::Delivery), "/delivery/sign-in");
        assert_eq!(routes.unauthorized, "/403");
        assert_eq!(routes.login_for(Scope::Seller), "/seller/login");
    }
}
