pub mod list;
pub mod provision;
pub mod validate;

use anyhow::Result;
use tracing::{debug, info};

use authz_client::{Authenticator, DirectoryClient};
use authz_core::ProvisionError;

use crate::config::Settings;

/// Authenticates and returns a store client carrying the token.
pub async fn connect(settings: &Settings) -> Result<DirectoryClient> {
    info!(
        api_url = %settings.client.api_url,
        token_url = %settings.token_url,
        "Connecting to authorization store"
    );
    let authenticator = Authenticator::from_config(&settings.client, &settings.token_url)
        .map_err(|e| ProvisionError::authentication(e.to_string()))?;
    let token = authenticator
        .authenticate(&settings.credentials)
        .await
        .map_err(|e| ProvisionError::authentication(e.to_string()))?;
    debug!(client_id = %settings.credentials.client_id, "Access token obtained");
    Ok(DirectoryClient::new(settings.client.clone(), token)?)
}
