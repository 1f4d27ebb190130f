//! HTTP client wrapper for the Autotask REST API.

use std::fmt;
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{ApiError, Error, Result};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of body characters carried into error snippets.
const SNIPPET_MAX_CHARS: usize = 200;

/// Structured error envelope the API returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<String>,
}

/// Client for interacting with the Autotask REST API.
///
/// Authentication uses the platform's three header scheme: an API
/// integration code, a username and a secret, sent with every request.
/// The base URL is the caller's zone endpoint (zone discovery is a
/// bootstrap concern outside this crate).
#[derive(Clone)]
pub struct AutotaskClient {
    integration_code: String,
    username: String,
    secret: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl AutotaskClient {
    /// Creates a new client for the given zone base URL and credentials.
    ///
    /// # Arguments
    /// * `base_url` - The zone API root (e.g. `https://webservices2.autotask.net/ATServicesRest/V1.0`)
    /// * `integration_code` - The API integration code header value
    /// * `username` - The API user name
    /// * `secret` - The API secret
    pub fn new(
        base_url: impl Into<String>,
        integration_code: impl Into<String>,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self> {
        AutotaskClientBuilder::new()
            .base_url(base_url)
            .integration_code(integration_code)
            .username(username)
            .secret(secret)
            .build()
    }

    /// Returns a builder for configuring the client.
    pub fn builder() -> AutotaskClientBuilder {
        AutotaskClientBuilder::new()
    }

    /// Returns the zone base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the API user name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns a reference to the underlying HTTP client.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Fails with [`Error::NotAuthenticated`] unless a usable session
    /// context (credentials plus zone URL) is configured.
    pub fn ensure_session(&self) -> Result<()> {
        if self.base_url.is_empty()
            || self.integration_code.is_empty()
            || self.username.is_empty()
            || self.secret.is_empty()
        {
            return Err(Error::NotAuthenticated);
        }
        Ok(())
    }

    /// Joins an endpoint path onto the zone base URL.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Performs a GET request to the given endpoint path.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.endpoint_url(endpoint);
        self.get_url(&url).await
    }

    /// Performs a GET request to an absolute URL (used to follow
    /// opaque next-page cursors).
    pub async fn get_url<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.authorized(self.http_client.get(url)).send().await?;
        self.handle_response(response, url).await
    }

    /// Performs a POST request with a JSON body to the given endpoint path.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint_url(endpoint);
        self.post_url(&url, body).await
    }

    /// Performs a POST request with a JSON body to an absolute URL.
    pub async fn post_url<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .authorized(self.http_client.post(url))
            .json(body)
            .send()
            .await?;
        self.handle_response(response, url).await
    }

    /// Attaches the three authentication headers.
    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("ApiIntegrationCode", &self.integration_code)
            .header("UserName", &self.username)
            .header("Secret", &self.secret)
    }

    /// Handles the HTTP response, converting failures to our error types.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        url: &str,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.json::<T>().await?;
            return Ok(body);
        }

        Err(self.classify_error_response(response, url).await)
    }

    /// Classifies an error response.
    ///
    /// Checked in priority order: 401, then not-found/HTML maintenance
    /// pages, then the structured `{"errors":[...]}` envelope, then any
    /// other non-2xx status.
    async fn classify_error_response(&self, response: reqwest::Response, url: &str) -> Error {
        let status = response.status();
        let status_code = status.as_u16();

        if status_code == 401 {
            return Error::Api(ApiError::Auth {
                url: url.to_string(),
            });
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("text/html"))
            .unwrap_or(false);

        let body = response.text().await.unwrap_or_default();

        if status_code == 404 || is_html {
            return Error::Api(ApiError::ServiceUnavailable {
                url: url.to_string(),
                snippet: truncate_snippet(&body),
            });
        }

        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            if !envelope.errors.is_empty() {
                return Error::Api(ApiError::Api {
                    status: status_code,
                    url: url.to_string(),
                    messages: envelope.errors.join("; "),
                });
            }
        }

        let snippet = if body.is_empty() {
            status.canonical_reason().unwrap_or("Unknown error").to_string()
        } else {
            truncate_snippet(&body)
        };

        Error::Api(ApiError::Http {
            status: status_code,
            url: url.to_string(),
            snippet,
        })
    }
}

/// Truncates a response body for inclusion in error messages.
fn truncate_snippet(body: &str) -> String {
    if body.chars().count() <= SNIPPET_MAX_CHARS {
        return body.to_string();
    }
    let truncated: String = body.chars().take(SNIPPET_MAX_CHARS).collect();
    format!("{truncated}...")
}

impl fmt::Debug for AutotaskClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutotaskClient")
            .field("base_url", &self.base_url)
            .field("integration_code", &self.integration_code)
            .field("username", &self.username)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Builder for [`AutotaskClient`].
#[derive(Debug, Default)]
pub struct AutotaskClientBuilder {
    base_url: String,
    integration_code: String,
    username: String,
    secret: String,
    timeout: Option<Duration>,
}

impl AutotaskClientBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the zone base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the API integration code.
    pub fn integration_code(mut self, code: impl Into<String>) -> Self {
        self.integration_code = code.into();
        self
    }

    /// Sets the API user name.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Sets the API secret.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    /// Overrides the per-request timeout (default 30 seconds). A timeout
    /// on any page aborts the whole fetch as a transport error.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<AutotaskClient> {
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(AutotaskClient {
            integration_code: self.integration_code,
            username: self.username,
            secret: self.secret,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }
}
