use std::sync::Arc;
use std::time::Duration;

use http::header::AUTHORIZATION;
use http::{Method, StatusCode};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::authenticator::{AuthAttempt, AuthCommand};
use crate::error::{ClientError, ClientResult};
use crate::interceptor::AuthInterceptor;

/// Storefront API client with role-aware credential selection.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    interceptor: Arc<AuthInterceptor>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        interceptor: Arc<AuthInterceptor>,
    ) -> ClientResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url, interceptor))
    }

    pub fn with_client(
        http: Client,
        base_url: impl Into<String>,
        interceptor: Arc<AuthInterceptor>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            interceptor,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Target handed to the credential selector: relative to the API base
    /// and always rooted, so `cart` and `{base}/cart` classify like `/cart`.
    fn request_target(&self, path: &str) -> String {
        if let Some(rest) = path.strip_prefix(self.base_url.as_str()) {
            if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') {
                return format!("/{}", rest.trim_start_matches('/'));
            }
        }
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("/{}", path.trim_start_matches('/'))
    }

    /// Sends a request and returns the raw response whatever its status. A
    /// 401 has already been acted on by the time this returns.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<Response> {
        let mut attempt = self.interceptor.before(&self.request_target(path));
        let (response, _) = self.send_attempt(method, path, body, &mut attempt).await?;
        Ok(response)
    }

    /// Sends one attempt of a logical request. Passing the same attempt again
    /// re-sends it without repeating the 401 handling.
    pub async fn send_attempt<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        attempt: &mut AuthAttempt,
    ) -> ClientResult<(Response, AuthCommand)> {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(value) = attempt.authorization() {
            request = request.header(AUTHORIZATION, value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%method, path, %status, credential = attempt.credential_label(), "api response");
        let command = self.interceptor.after(attempt, status)?;
        Ok((response, command))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request_json::<T, ()>(Method::GET, path, None).await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_json(Method::POST, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let mut attempt = self.interceptor.before(&self.request_target(path));
        let (response, command) = self
            .send_attempt::<()>(Method::DELETE, path, None, &mut attempt)
            .await?;
        error_for_status(response, command).await?;
        Ok(())
    }

    async fn request_json<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut attempt = self.interceptor.before(&self.request_target(path));
        let (response, command) = self.send_attempt(method, path, body, &mut attempt).await?;
        let response = error_for_status(response, command).await?;
        Ok(response.json::<T>().await?)
    }
}

async fn error_for_status(response: Response, command: AuthCommand) -> ClientResult<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized {
            evicted: command.evicted_slot(),
        });
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status { status, body });
    }
    Ok(response)
}
