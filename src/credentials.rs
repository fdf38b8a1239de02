use crate::error::ExportError;
use anyhow::Context;
use std::fs;
use std::path::PathBuf;

/// Environment variable checked first for the access token
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";
/// Secret file consulted when the environment variable is unset
pub const TOKEN_FILE: &str = "access_token.priv";

/// Abstract access token lookup
pub trait CredentialSource {
    /// Return the token, or `CredentialMissing` if none is available
    fn token(&self) -> Result<String, ExportError>;
}

/// Resolves the token from an environment variable, then from a local secret file
pub struct EnvOrFileCredentials {
    env_var: String,
    path: PathBuf,
}

impl EnvOrFileCredentials {
    pub fn new() -> Self {
        EnvOrFileCredentials {
            env_var: TOKEN_ENV_VAR.to_string(),
            path: PathBuf::from(TOKEN_FILE),
        }
    }

    pub fn with_sources(env_var: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        EnvOrFileCredentials {
            env_var: env_var.into(),
            path: path.into(),
        }
    }

    fn from_file(&self) -> anyhow::Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).context("Failed to read token file")?;
        Ok(non_blank(content))
    }

    fn missing(&self, reason: String) -> ExportError {
        ExportError::CredentialMissing {
            env_var: self.env_var.clone(),
            secret_file: self.path.clone(),
            reason,
        }
    }
}

impl Default for EnvOrFileCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialSource for EnvOrFileCredentials {
    fn token(&self) -> Result<String, ExportError> {
        if let Some(token) = std::env::var(&self.env_var).ok().and_then(non_blank) {
            tracing::debug!(source = %self.env_var, "Using token from environment");
            return Ok(token);
        }

        match self.from_file() {
            Ok(Some(token)) => {
                tracing::debug!(source = %self.path.display(), "Using token from secret file");
                Ok(token)
            }
            Ok(None) => Err(self.missing(format!(
                "set {} or create {}",
                self.env_var,
                self.path.display()
            ))),
            Err(e) => Err(self.missing(format!(
                "{} is unset and {} exists but is unreadable: {e:#}",
                self.env_var,
                self.path.display()
            ))),
        }
    }
}

/// A token supplied directly, e.g. by tests or an embedding program
pub struct StaticToken(pub String);

impl CredentialSource for StaticToken {
    fn token(&self) -> Result<String, ExportError> {
        non_blank(self.0.clone()).ok_or_else(|| ExportError::CredentialMissing {
            env_var: TOKEN_ENV_VAR.to_string(),
            secret_file: PathBuf::from(TOKEN_FILE),
            reason: "the supplied token is blank".to_string(),
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
