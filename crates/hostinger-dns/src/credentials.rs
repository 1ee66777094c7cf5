//! API token credentials
//!
//! Credentials files follow the certbot DNS plugin INI convention:
//!
//! ```ini
//! # Hostinger API credentials used by certbot
//! dns_hostinger_api_token = 0123456789abcdef
//! ```
//!
//! The token value may also be an `env://` or `file://` secret reference.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::ChallengeError;
use crate::secret::SecretUri;

/// Where API tokens are created
pub const ACCOUNT_URL: &str = "https://hpanel.hostinger.com/domains";

/// Credentials file key holding the API token
pub const TOKEN_KEY: &str = "dns_hostinger_api_token";

const KEY_PREFIX: &str = "dns_hostinger_";

/// A validated, non-empty Hostinger API token
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_token: String,
}

impl Credentials {
    /// Validate a literal token
    pub fn new(api_token: impl Into<String>) -> Result<Self, ChallengeError> {
        let api_token = api_token.into().trim().to_string();
        if api_token.is_empty() {
            return Err(ChallengeError::configuration(format!(
                "{} is required. See {} for information about creating an API token.",
                TOKEN_KEY, ACCOUNT_URL
            )));
        }
        Ok(Self { api_token })
    }

    /// Resolve a token given literally or as a secret reference
    pub fn from_secret(source: &str) -> Result<Self, ChallengeError> {
        let uri: SecretUri = source.parse()?;
        Self::new(uri.resolve()?)
    }

    /// Load the token from a certbot-style INI credentials file
    pub fn load_from_file(path: &Path) -> Result<Self, ChallengeError> {
        #[cfg(unix)]
        warn_if_world_readable(path);

        let content = fs::read_to_string(path).map_err(|e| {
            ChallengeError::configuration(format!(
                "Failed to read credentials file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let entries = parse_ini(&content);
        let token = entries
            .get("api_token")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ChallengeError::configuration(format!(
                    "{}: {} is required. See {} for information about creating an API token.",
                    path.display(),
                    TOKEN_KEY,
                    ACCOUNT_URL
                ))
            })?;

        let credentials = Self::from_secret(token).map_err(|e| match e {
            ChallengeError::Configuration(message) => {
                ChallengeError::configuration(format!("{}: {}", path.display(), message))
            }
            other => other,
        })?;

        tracing::debug!(path = %path.display(), "Loaded Hostinger credentials");
        Ok(credentials)
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &"<redacted>")
            .finish()
    }
}

#[cfg(unix)]
fn warn_if_world_readable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = fs::metadata(path) {
        let mode = metadata.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            tracing::warn!(
                path = %path.display(),
                mode = format!("{:o}", mode),
                "Credentials file is accessible by other users (should be 0600 or 0400)"
            );
        }
    }
}

/// Parse `key = value` lines into a map keyed by the unprefixed option name
///
/// `dns_hostinger_api_token`, `dns-hostinger-api-token` and `api_token` all
/// map to `api_token`. Later keys win.
fn parse_ini(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with(';'))
        .filter(|line| !line.starts_with('['))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let key = key.trim().replace('-', "_");
            let key = key.strip_prefix(KEY_PREFIX).unwrap_or(key.as_str()).to_string();
            (key, unquote(value.trim()).to_string())
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
