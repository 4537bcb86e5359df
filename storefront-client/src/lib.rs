pub mod app;
pub mod authenticator;
pub mod client;
pub mod config;
pub mod effects;
pub mod error;
pub mod interceptor;
pub mod layer;
pub mod metrics;

pub use app::Storefront;
pub use authenticator::{AuthAttempt, AuthCommand, RequestAuthenticator};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use effects::{EffectExecutor, FixedNavigator, Navigator};
pub use error::{ClientError, ClientResult};
pub use interceptor::AuthInterceptor;
pub use layer::{AuthLayer, AuthService};
pub use metrics::ClientMetrics;
