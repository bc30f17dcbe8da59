//! Client-credentials token exchange.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ClientConfig, DEFAULT_AUDIENCE};

/// Errors that can occur while obtaining an access token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token endpoint could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The token endpoint rejected the credentials.
    #[error("Token request rejected (HTTP {status}): {body}")]
    Rejected {
        /// The HTTP status code.
        status: u16,
        /// The response body.
        body: String,
    },

    /// The token response could not be parsed.
    #[error("Failed to parse token response: {0}")]
    InvalidResponse(String),
}

/// Form body of an OAuth2 client-credentials grant.
///
/// The [`Debug`] impl redacts the client secret.
#[derive(Clone, Serialize)]
pub struct ClientCredentials {
    pub audience: String,
    pub client_id: String,
    pub client_secret: String,
    pub grant_type: String,
}

impl ClientCredentials {
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            audience: DEFAULT_AUDIENCE.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            grant_type: "client_credentials".to_string(),
        }
    }

    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("audience", &self.audience)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("grant_type", &self.grant_type)
            .finish()
    }
}

/// A bearer token. Its [`Debug`] impl never prints the token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges client credentials for a bearer token. No retries.
#[derive(Debug, Clone)]
pub struct Authenticator {
    http: reqwest::Client,
    token_url: String,
}

impl Authenticator {
    #[must_use]
    pub fn new(http: reqwest::Client, token_url: impl Into<String>) -> Self {
        Self {
            http,
            token_url: token_url.into(),
        }
    }

    /// Builds an authenticator sharing the timeout and user agent of `config`.
    pub fn from_config(config: &ClientConfig, token_url: impl Into<String>) -> Result<Self, AuthError> {
        let http = config
            .http_client()
            .map_err(|e| AuthError::Network(e.to_string()))?;
        Ok(Self::new(http, token_url))
    }

    pub async fn authenticate(&self, credentials: &ClientCredentials) -> Result<AccessToken, AuthError> {
        info!(audience = %credentials.audience, "Getting access token");
        debug!(token_url = %self.token_url, client_id = %credentials.client_id, "Requesting token");

        let resp = self
            .http
            .post(&self.token_url)
            .form(credentials)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .map_err(|e| AuthError::Network(format!("Failed to read response body: {e}")))?;
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        Ok(AccessToken(token.access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_defaults() {
        let credentials = ClientCredentials::new("cid", "secret");
        assert_eq!(credentials.audience, "urn:auth0-authz-api");
        assert_eq!(credentials.grant_type, "client_credentials");

        let credentials = credentials.with_audience("urn:other");
        assert_eq!(credentials.audience, "urn:other");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credentials = ClientCredentials::new("cid", "super-secret");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("cid"));
        assert!(!rendered.contains("super-secret"));

        let token = AccessToken::new("eyJhbGciOi");
        assert_eq!(format!("{token:?}"), "AccessToken([REDACTED])");
        assert_eq!(token.as_str(), "eyJhbGciOi");
    }
}
