use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while resolving input, fetching, transforming or writing issues.
///
/// Every variant is fatal for the run; nothing is retried.
#[derive(Error, Debug)]
pub enum ExportError {
    /// No access token could be resolved from the environment or the secret file
    #[error("No access token found: {reason}")]
    CredentialMissing {
        env_var: String,
        secret_file: PathBuf,
        reason: String,
    },

    /// The pagination header was present but could not be interpreted
    #[error("Failed to parse pagination header `{header}`: {reason}")]
    PaginationParseFailed { header: String, reason: String },

    /// A page request failed; no partial result is returned
    #[error("Failed to fetch page {page}: {cause}")]
    FetchFailed { page: u32, cause: FetchCause },

    /// A raw record lacked a field the normalized record needs
    #[error("Malformed issue record at index {index}: field `{field}` {reason}")]
    MalformedRecord {
        index: usize,
        field: String,
        reason: String,
    },

    /// Command-line input did not resolve to an owner/name pair
    #[error("{0}")]
    InputResolutionFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to write {}: {source}", .path.display())]
    OutputFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Underlying reason for a [`ExportError::FetchFailed`]
#[derive(Debug, Clone, PartialEq)]
pub enum FetchCause {
    /// Connection, TLS, timeout or body read failure
    Transport(String),
    /// The credential was rejected (401) or lacks access (403)
    Unauthorized { status: u16 },
    /// Any other non-success status
    Status { status: u16, reason: String },
    /// The body was not a JSON array of objects
    Decode(String),
}

impl FetchCause {
    /// Classifies a non-success HTTP status
    pub fn from_status(status: u16, reason: &str) -> Self {
        match status {
            401 | 403 => FetchCause::Unauthorized { status },
            _ => FetchCause::Status {
                status,
                reason: reason.to_string(),
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchCause::Unauthorized { .. })
    }
}

impl std::fmt::Display for FetchCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchCause::Transport(msg) => write!(f, "network error: {msg}"),
            FetchCause::Unauthorized { status } => {
                write!(f, "HTTP {status}: token invalid, expired or lacking access")
            }
            FetchCause::Status { status, reason } => write!(f, "HTTP {status} {reason}"),
            FetchCause::Decode(msg) => write!(f, "unexpected response body: {msg}"),
        }
    }
}
