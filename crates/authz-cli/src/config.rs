use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use authz_client::{ClientConfig, ClientCredentials, DEFAULT_AUDIENCE, token_url_for_domain};

use crate::cli::Cli;

/// Non-secret settings stored per profile. Secrets come from flags or env only.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub api_url: Option<String>,
    pub domain: Option<String>,
    pub audience: Option<String>,
    pub client_id: Option<String>,
}

pub const CONFIG_KEYS: &[&str] = &["api_url", "domain", "audience", "client_id"];

impl ProfileConfig {
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let slot = match key {
            "api_url" => &mut self.api_url,
            "domain" => &mut self.domain,
            "audience" => &mut self.audience,
            "client_id" => &mut self.client_id,
            other => anyhow::bail!(
                "Unknown config key: {other}. Valid keys: {}",
                CONFIG_KEYS.join(", ")
            ),
        };
        *slot = Some(value.to_string());
        Ok(())
    }
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

/// Location of the profile file. Nothing is created until a profile is saved.
pub fn config_path() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".authz-provision")
        .join("config.toml"))
}

/// All profiles in `path`; a missing file (or unreadable parent) means none.
pub fn load_all(path: &Path) -> Result<ConfigFile> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            return Ok(ConfigFile::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read config: {}", path.display()));
        }
    };
    let cfg: ConfigFile =
        toml::from_str(&content).with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(cfg)
}

pub fn load_profile(path: &Path, profile: &str) -> Result<ProfileConfig> {
    let mut all = load_all(path)?;
    Ok(all.remove(profile).unwrap_or_default())
}

pub fn save_profile(path: &Path, profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all(path)?;
    all.insert(profile.to_string(), config.clone());
    let content = toml::to_string_pretty(&all)?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    Ok(())
}

/// Everything needed to authenticate and reach the store.
#[derive(Debug)]
pub struct Settings {
    pub client: ClientConfig,
    pub token_url: String,
    pub credentials: ClientCredentials,
}

/// Resolves settings. Precedence: flag / env var, then the profile, then an error.
pub fn resolve_settings(cli: &Cli, profile: &ProfileConfig) -> Result<Settings> {
    let api_url = pick(&cli.api_url, &profile.api_url).context(
        "No API URL configured. Use --api-url, set AUTHZ_API_URL, or run: authz-provision config set api_url <url>",
    )?;
    let api_url = Url::parse(&api_url).with_context(|| format!("Invalid API URL: {api_url}"))?;

    let domain = pick(&cli.domain, &profile.domain).context(
        "No domain configured. Use --domain, set AUTH0_DOMAIN, or run: authz-provision config set domain <domain>",
    )?;
    let client_id = pick(&cli.client_id, &profile.client_id)
        .context("No client ID configured. Use --client-id or set AUTH0_CLIENT_ID")?;
    let client_secret = cli
        .client_secret
        .clone()
        .context("No client secret configured. Use --client-secret or set AUTH0_CLIENT_SECRET")?;
    let audience =
        pick(&cli.audience, &profile.audience).unwrap_or_else(|| DEFAULT_AUDIENCE.to_string());

    Ok(Settings {
        client: ClientConfig::new(api_url).with_request_timeout(Duration::from_secs(cli.timeout_secs)),
        token_url: token_url_for_domain(&domain),
        credentials: ClientCredentials::new(client_id, client_secret).with_audience(audience),
    })
}

fn pick(flag: &Option<String>, profile: &Option<String>) -> Option<String> {
    flag.clone()
        .or_else(|| profile.clone())
        .filter(|v| !v.trim().is_empty())
}
