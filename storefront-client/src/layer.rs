use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::{Request, Response};
use tower::{Layer, Service};
use tracing::warn;

use crate::authenticator::AuthAttempt;
use crate::interceptor::AuthInterceptor;

/// Tower middleware that authenticates outbound requests.
///
/// The `AuthAttempt` is copied into the response extensions. A caller that
/// re-sends the same logical request puts it back into the request
/// extensions, so a repeated 401 is passed through instead of triggering a
/// second eviction.
#[derive(Clone)]
pub struct AuthLayer {
    interceptor: Arc<AuthInterceptor>,
    base_path: Arc<str>,
}

impl AuthLayer {
    pub fn new(interceptor: Arc<AuthInterceptor>) -> Self {
        Self {
            interceptor,
            base_path: Arc::from(""),
        }
    }

    /// Path prefix of the API mount (`/api/v1`). Request paths are classified
    /// relative to it.
    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = Arc::from(base_path.trim_end_matches('/'));
        self
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            interceptor: self.interceptor.clone(),
            base_path: self.base_path.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    interceptor: Arc<AuthInterceptor>,
    base_path: Arc<str>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AuthService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let mut attempt = match request.extensions_mut().remove::<AuthAttempt>() {
            Some(previous) => previous,
            None => self
                .interceptor
                .before(relative_path(&self.base_path, request.uri().path())),
        };
        attempt.apply(request.headers_mut());

        let interceptor = self.interceptor.clone();
        let response = self.inner.call(request);
        Box::pin(async move {
            let mut response = response.await?;
            if let Err(err) = interceptor.after(&mut attempt, response.status()) {
                warn!(error = %err, "failed to apply credential eviction");
            }
            response.extensions_mut().insert(attempt);
            Ok(response)
        })
    }
}

fn relative_path<'a>(base_path: &str, path: &'a str) -> &'a str {
    if base_path.is_empty() {
        return path;
    }
    match path.strip_prefix(base_path) {
        Some("") => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::relative_path;

    #[test]
    fn strips_api_mount_on_segment_boundary() {
        assert_eq!(relative_path("/api/v1", "/api/v1/cart"), "/cart");
        assert_eq!(relative_path("/api/v1", "/api/v1"), "/");
        assert_eq!(relative_path("/api/v1", "/api/v10/cart"), "/api/v10/cart");
        assert_eq!(relative_path("/api/v1", "/seller/orders"), "/seller/orders");
        assert_eq!(relative_path("", "/wishlist"), "/wishlist");
    }
}
