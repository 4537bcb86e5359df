use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use common_session::{RouteTable, Scope};

const DEFAULT_CREDENTIALS_PATH: &str = ".storefront/credentials.json";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: Option<String>,
    pub timeout: Duration,
    pub credentials_path: PathBuf,
    pub routes: RouteTable,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            routes: RouteTable::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        let api_base_url = env::var("STOREFRONT_API_BASE_URL")
            .ok()
            .and_then(|value| normalize_optional(&value));

        let timeout_seconds = env::var("STOREFRONT_API_TIMEOUT_SECONDS")
            .ok()
            .map(|value| {
                value
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("Invalid STOREFRONT_API_TIMEOUT_SECONDS '{value}'"))
            })
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        let credentials_path = env::var("STOREFRONT_CREDENTIALS_PATH")
            .ok()
            .and_then(|value| normalize_optional(&value))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH));

        let mut routes = RouteTable::default();
        for (key, scope) in [
            ("STOREFRONT_LOGIN_ROUTE_SELLER", Scope::Seller),
            ("STOREFRONT_LOGIN_ROUTE_ADMIN", Scope::Admin),
            ("STOREFRONT_LOGIN_ROUTE_DELIVERY", Scope::Delivery),
            ("STOREFRONT_LOGIN_ROUTE_CUSTOMER", Scope::Customer),
            ("STOREFRONT_LOGIN_ROUTE", Scope::Unscoped),
        ] {
            if let Some(route) = route_from_env(key)? {
                routes = routes.with_login(scope, route);
            }
        }
        if let Some(route) = route_from_env("STOREFRONT_UNAUTHORIZED_ROUTE")? {
            routes = routes.with_unauthorized(route);
        }

        Ok(Self {
            api_base_url,
            timeout: Duration::from_secs(timeout_seconds.max(1)),
            credentials_path,
            routes,
        })
    }

    pub fn require_api_base_url(&self) -> Result<&str> {
        self.api_base_url
            .as_deref()
            .context("STOREFRONT_API_BASE_URL must be set to send API requests")
    }
}

fn route_from_env(key: &str) -> Result<Option<String>> {
    match env::var(key).ok().and_then(|value| normalize_optional(&value)) {
        Some(route) if route.starts_with('/') => Ok(Some(route)),
        Some(route) => Err(anyhow!("{key} must be an absolute path, got '{route}'")),
        None => Ok(None),
    }
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
