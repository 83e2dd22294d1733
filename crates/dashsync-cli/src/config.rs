//! Connection settings: flags, environment, then a TOML profile file.

use clap::Args;
use dashsync_remote::{ClientOptions, Credentials};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(
        "no server URL configured for profile `{0}`; use --server-url, set DASHSYNC_SERVER_URL, or add server_url to ~/.dashsync/config.toml"
    )]
    MissingServerUrl(String),
    #[error("login user `{0}` given without a password")]
    MissingPassword(String),
}

/// One `[profile]` table of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub server_url: Option<String>,
    pub api_token: Option<String>,
    pub login_user: Option<String>,
    pub login_password: Option<String>,
    pub timeout_secs: Option<u64>,
    pub validate_certs: Option<bool>,
}

pub type ConfigFile = BTreeMap<String, ProfileConfig>;

/// Global connection options shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Base URL of the monitoring frontend
    #[arg(long, global = true, env = "DASHSYNC_SERVER_URL")]
    pub server_url: Option<String>,
    /// API token (preferred over login)
    #[arg(long, global = true, env = "DASHSYNC_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,
    /// Login user for a password session
    #[arg(long, global = true, env = "DASHSYNC_LOGIN_USER")]
    pub login_user: Option<String>,
    /// Password for --login-user
    #[arg(long, global = true, env = "DASHSYNC_LOGIN_PASSWORD", hide_env_values = true)]
    pub login_password: Option<String>,
    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
    /// Skip TLS certificate validation
    #[arg(long, global = true)]
    pub insecure: bool,
    /// Profile in the config file
    #[arg(long, global = true, default_value = "default")]
    pub profile: String,
    /// Config file (default: ~/.dashsync/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".dashsync").join("config.toml"))
}

/// Reads every profile; a missing file is an empty config.
pub fn load_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_profile(path: &Path, profile: &str) -> Result<ProfileConfig, ConfigError> {
    Ok(load_file(path)?.remove(profile).unwrap_or_default())
}

impl ConnectionArgs {
    fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(default_config_path)
    }

    /// Merges flags and environment (already folded in by clap) over the
    /// selected profile.
    pub fn resolve(&self) -> Result<ClientOptions, ConfigError> {
        let profile = match self.config_path() {
            Some(path) => load_profile(&path, &self.profile)?,
            None => ProfileConfig::default(),
        };

        let server_url = self
            .server_url
            .clone()
            .or(profile.server_url)
            .ok_or_else(|| ConfigError::MissingServerUrl(self.profile.clone()))?;

        let api_token = self.api_token.clone().or(profile.api_token);
        let login_user = self.login_user.clone().or(profile.login_user);
        let login_password = self.login_password.clone().or(profile.login_password);

        let credentials = match (api_token, login_user) {
            (Some(token), _) => Credentials::ApiToken(token),
            (None, Some(user)) => match login_password {
                Some(password) => Credentials::Login { user, password },
                None => return Err(ConfigError::MissingPassword(user)),
            },
            (None, None) => Credentials::Anonymous,
        };

        let validate_certs = !self.insecure && profile.validate_certs.unwrap_or(true);

        Ok(ClientOptions {
            server_url,
            credentials,
            timeout: self
                .timeout_secs
                .or(profile.timeout_secs)
                .map(Duration::from_secs),
            validate_certs,
        })
    }
}
