//! HTTP client settings.

use std::time::Duration;

use url::Url;

/// Audience of the authorization extension API.
pub const DEFAULT_AUDIENCE: &str = "urn:auth0-authz-api";

/// Settings shared by the token and store clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the authorization store API.
    pub api_url: Url,

    /// Per-request timeout (default: 30 seconds).
    pub request_timeout: Duration,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl ClientConfig {
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("authz-provision/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// URL of `path` under the API base, regardless of a trailing slash.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .user_agent(&self.user_agent)
            .build()
    }
}

/// Token endpoint of a tenant domain. A bare domain gets `https://`.
#[must_use]
pub fn token_url_for_domain(domain: &str) -> String {
    let domain = domain.trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        format!("{domain}/oauth/token")
    } else {
        format!("https://{domain}/oauth/token")
    }
}
