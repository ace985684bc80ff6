//! Main client implementation.

use crate::api::{ChannelsApi, GithubApi, PackageIndexApi};
use crate::config::Endpoints;
use chefops_core::{ChefopsError, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Client for the channel, GitHub and package index APIs
#[derive(Clone)]
pub struct ChefopsClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    endpoints: Endpoints,
    github_token: Option<String>,
    timeout: Duration,
}

impl ChefopsClient {
    /// Create a client with default endpoints and no GitHub token
    pub fn new() -> Result<Self> {
        ChefopsClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> ChefopsClientBuilder {
        ChefopsClientBuilder::new()
    }

    /// Configured endpoints
    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.inner.endpoints
    }

    /// Access channel listing endpoints
    #[must_use]
    pub fn channels(&self) -> ChannelsApi<'_> {
        ChannelsApi::new(self)
    }

    /// Access GitHub endpoints
    #[must_use]
    pub fn github(&self) -> GithubApi<'_> {
        GithubApi::new(self)
    }

    /// Access package index endpoints
    #[must_use]
    pub fn packages(&self) -> PackageIndexApi<'_> {
        PackageIndexApi::new(self)
    }

    /// GET `base` + `path` and decode the JSON body
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        base: &str,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = build_url(base, path, params)?;
        debug!(url = %url, "GET request");
        let request = self.inner.http.get(url);
        self.send(request).await
    }

    /// GET from the GitHub API, authenticated when a token is configured
    pub(crate) async fn get_github<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = build_url(&self.inner.endpoints.github_api_url, path, params)?;
        debug!(url = %url, "GitHub GET request");
        let mut request = self.inner.http.get(url).header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.inner.github_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|e| self.map_transport_error(&e))?;
        let status = response.status();

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| ChefopsError::Http(e.to_string()))?;
            serde_json::from_str(&body).map_err(ChefopsError::Json)
        } else {
            Self::handle_error(status.as_u16(), response).await
        }
    }

    fn map_transport_error(&self, err: &reqwest::Error) -> ChefopsError {
        if err.is_timeout() {
            ChefopsError::Timeout(self.inner.timeout.as_secs())
        } else if err.is_connect() {
            ChefopsError::Connection(err.to_string())
        } else {
            ChefopsError::Http(err.to_string())
        }
    }

    /// Convert an error response to a `ChefopsError`
    async fn handle_error<T>(status: u16, response: reqwest::Response) -> Result<T> {
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();

        // GitHub and the channel APIs both use a JSON body with a message field
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("detail"))
                    .and_then(|m| m.as_str())
                    .map(String::from)
            })
            .unwrap_or(body);

        match status {
            401 => Err(ChefopsError::Unauthorized),
            404 => Err(ChefopsError::NotFound { resource: url }),
            _ => Err(ChefopsError::Api {
                code: status,
                message,
            }),
        }
    }
}

/// Join a base URL and a path and append query parameters.
fn build_url(base: &str, path: &str, params: &[(&str, &str)]) -> Result<Url> {
    let joined = format!("{}{}", base.trim_end_matches('/'), path);
    if params.is_empty() {
        Url::parse(&joined)
    } else {
        Url::parse_with_params(&joined, params)
    }
    .map_err(|e| ChefopsError::InvalidUrl(format!("{joined}: {e}")))
}

/// Builder for configuring a [`ChefopsClient`]
pub struct ChefopsClientBuilder {
    endpoints: Endpoints,
    github_token: Option<String>,
    timeout: Duration,
    user_agent: String,
}

impl Default for ChefopsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChefopsClientBuilder {
    /// Create a new builder with default endpoints
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoints: Endpoints::default(),
            github_token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("chefops/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Replace all endpoints
    #[must_use]
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the authoritative channel API URL
    #[must_use]
    pub fn studio_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.studio_url = url.into();
        self
    }

    /// Set the catalog URL
    #[must_use]
    pub fn catalog_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.catalog_url = url.into();
        self
    }

    /// Set the GitHub API URL
    #[must_use]
    pub fn github_api_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.github_api_url = url.into();
        self
    }

    /// Set the package index URL
    #[must_use]
    pub fn package_index_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.package_index_url = url.into();
        self
    }

    /// Set the GitHub token sent as a bearer token
    #[must_use]
    pub fn github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token.filter(|t| !t.is_empty());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ChefopsClient> {
        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| ChefopsError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(ChefopsClient {
            inner: Arc::new(ClientInner {
                http,
                endpoints: self.endpoints,
                github_token: self.github_token,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn urls_are_joined_and_encoded() {
        let url = build_url("https://example.org/", "/api/catalog", &[("q", "a b")]).unwrap();
        assert_eq!(url.as_str(), "https://example.org/api/catalog?q=a+b");
        assert!(build_url("not a url", "/x", &[]).is_err());
    }

    #[tokio::test]
    async fn error_statuses_are_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"detail": "boom"})),
            )
            .mount(&server)
            .await;

        let client = ChefopsClient::builder().build().unwrap();
        let missing: Result<serde_json::Value> = client.get_json(&server.uri(), "/missing", &[]).await;
        assert!(matches!(missing, Err(ChefopsError::NotFound { .. })));

        let broken: Result<serde_json::Value> = client.get_json(&server.uri(), "/broken", &[]).await;
        match broken {
            Err(ChefopsError::Api { code, message }) => {
                assert_eq!(code, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn github_requests_carry_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rate_limit"))
            .and(header("authorization", "Bearer s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = ChefopsClient::builder()
            .github_api_url(server.uri())
            .github_token(Some("s3cret".into()))
            .build()
            .unwrap();
        let body: serde_json::Value = client.get_github("/rate_limit", &[]).await.unwrap();
        assert_eq!(body["ok"], true);
    }
}
