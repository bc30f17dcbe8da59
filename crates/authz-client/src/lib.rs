//! # authz-client
//!
//! HTTP access to the authorization extension API.
//!
//! - [`Authenticator`] exchanges client credentials for an [`AccessToken`].
//! - [`DirectoryClient`] implements [`authz_core::DirectoryStore`] over the
//!   REST endpoints (`/permissions`, `/roles`, `/groups`).
//!
//! ```ignore
//! let http = reqwest::Client::new();
//! let token = Authenticator::new(http, token_url_for_domain("tenant.auth0.com"))
//!     .authenticate(&ClientCredentials::new(client_id, client_secret))
//!     .await?;
//! let client = DirectoryClient::new(ClientConfig::new(api_url), token)?;
//! ```

pub mod auth;
mod client;
pub mod config;

pub use auth::{AccessToken, AuthError, Authenticator, ClientCredentials};
pub use client::DirectoryClient;
pub use config::{ClientConfig, DEFAULT_AUDIENCE, token_url_for_domain};
