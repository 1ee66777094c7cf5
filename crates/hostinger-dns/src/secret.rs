//! Secret references for the API token
//!
//! A token can be given literally or as a reference resolved at load time:
//! - `env://VAR_NAME` - environment variable
//! - `file:///path/to/file` - file content
//! - anything else - the literal value

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ChallengeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretUri {
    Plain(String),
    Env { var_name: String },
    File { path: PathBuf },
}

impl SecretUri {
    /// Backend name for logging/errors
    pub fn backend_name(&self) -> &'static str {
        match self {
            SecretUri::Plain(_) => "plain",
            SecretUri::Env { .. } => "env",
            SecretUri::File { .. } => "file",
        }
    }

    /// Resolve to the secret value, trimming surrounding whitespace
    pub fn resolve(&self) -> Result<String, ChallengeError> {
        tracing::debug!(backend = self.backend_name(), "Resolving secret");

        let value = match self {
            SecretUri::Plain(value) => value.clone(),
            SecretUri::Env { var_name } => std::env::var(var_name).map_err(|_| {
                ChallengeError::configuration(format!(
                    "Environment variable '{}' not set",
                    var_name
                ))
            })?,
            SecretUri::File { path } => std::fs::read_to_string(path).map_err(|e| {
                ChallengeError::configuration(format!(
                    "Failed to read secret file '{}': {}",
                    path.display(),
                    e
                ))
            })?,
        };

        Ok(value.trim().to_string())
    }
}

impl FromStr for SecretUri {
    type Err = ChallengeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(var_name) = s.strip_prefix("env://") {
            if var_name.is_empty() {
                return Err(ChallengeError::configuration(format!(
                    "Invalid secret reference '{}': env URI must specify a variable name",
                    s
                )));
            }
            Ok(SecretUri::Env {
                var_name: var_name.to_string(),
            })
        } else if let Some(path) = s.strip_prefix("file://") {
            if path.is_empty() {
                return Err(ChallengeError::configuration(format!(
                    "Invalid secret reference '{}': file URI must specify a path",
                    s
                )));
            }
            Ok(SecretUri::File {
                path: PathBuf::from(path),
            })
        } else {
            Ok(SecretUri::Plain(s.to_string()))
        }
    }
}
