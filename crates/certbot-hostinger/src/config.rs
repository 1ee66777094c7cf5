//! Hook configuration with environment variable priority
//!
//! Configuration is resolved in this order (first found wins):
//! 1. Command line flags
//! 2. Environment variables (CERTBOT_HOSTINGER_*)
//! 3. Config file (config.toml)
//! 4. Default values (where applicable)

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use hostinger_dns::{ClientOptions, Credentials, DEFAULT_API_BASE, DEFAULT_TTL};
use serde::Deserialize;

/// Environment variable prefix
const ENV_PREFIX: &str = "CERTBOT_HOSTINGER";

/// Seconds to wait for the TXT record to propagate
const DEFAULT_PROPAGATION_SECONDS: u64 = 30;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Hook configuration (parsed from TOML, can be overridden by env and flags)
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct HookConfig {
    /// Path to the certbot-style credentials INI file
    pub credentials: Option<String>,

    /// API token (plain value, env:// or file://), takes precedence over `credentials`
    pub api_token: Option<String>,

    /// Hostinger API base URL
    pub api_base_url: Option<String>,

    /// TTL of challenge records
    pub ttl: Option<u32>,

    /// Seconds to wait after publishing a record
    pub propagation_seconds: Option<u64>,

    /// HTTP request timeout
    pub timeout_seconds: Option<u64>,
}

/// Values given on the command line
#[derive(Debug, Default)]
pub struct Overrides {
    pub credentials: Option<String>,
    pub propagation_seconds: Option<u64>,
}

/// Resolved configuration with the credentials loaded
#[derive(Debug)]
pub struct ResolvedConfig {
    pub credentials: Credentials,
    pub client: ClientOptions,
    pub ttl: u32,
    pub propagation: Duration,
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{}_{}", ENV_PREFIX, name)).ok()
}

/// Get environment variable as a number
fn get_env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

impl HookConfig {
    /// `<config_dir>/certbot-hostinger/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("certbot-hostinger").join("config.toml"))
    }

    /// Load configuration from a TOML file (optional)
    ///
    /// A missing file yields the defaults; a file that exists must parse.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve configuration and load the credentials
    pub fn resolve(self, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
        let credentials = match get_env("API_TOKEN").or(self.api_token) {
            Some(source) => Credentials::from_secret(&source)
                .map_err(|e| anyhow::anyhow!("Invalid Hostinger API token: {}", e))?,
            None => {
                let path = overrides
                    .credentials
                    .or_else(|| get_env("CREDENTIALS"))
                    .or(self.credentials)
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "Hostinger credentials required. Pass --credentials, set \
                             CERTBOT_HOSTINGER_CREDENTIALS or credentials in config"
                        )
                    })?;
                let path = shellexpand::tilde(&path).into_owned();
                Credentials::load_from_file(Path::new(&path))?
            }
        };

        let base_url = get_env("API_BASE_URL")
            .or(self.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let timeout_seconds = get_env_parsed("TIMEOUT_SECONDS")
            .or(self.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        let ttl = get_env_parsed("TTL").or(self.ttl).unwrap_or(DEFAULT_TTL);

        let propagation_seconds = overrides
            .propagation_seconds
            .or_else(|| get_env_parsed("PROPAGATION_SECONDS"))
            .or(self.propagation_seconds)
            .unwrap_or(DEFAULT_PROPAGATION_SECONDS);

        Ok(ResolvedConfig {
            credentials,
            client: ClientOptions {
                base_url,
                timeout: Duration::from_secs(timeout_seconds),
            },
            ttl,
            propagation: Duration::from_secs(propagation_seconds),
        })
    }

    /// Load config file and resolve with environment and flag overrides
    pub fn load_and_resolve(path: &Path, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
        Self::load(path)?.resolve(overrides)
    }
}
