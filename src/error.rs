//! Error taxonomy for portal operations
//!
//! Every failure is caught by the caller and turned into a transient
//! notification; none of these variants are fatal to the process.

use thiserror::Error;

/// Failure of a portal operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    /// Backend answered with `success: false`; the message is shown verbatim
    #[error("{0}")]
    UserFacing(String),

    /// Backend rejected the credential (HTTP 401/403)
    #[error("{0}")]
    AuthRejected(String),

    /// Request could not be completed (connection, timeout, malformed body)
    #[error("{0}")]
    Transport(String),

    /// Local check failed before any request was issued
    #[error("{0}")]
    Precondition(String),

    /// Identical mutation already in flight
    #[error("Request already in progress: {0}")]
    Duplicate(String),

    /// Invalid configuration (missing or malformed backend URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PortalError {
    /// Short machine-readable kind, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            PortalError::UserFacing(_) => "user_facing",
            PortalError::AuthRejected(_) => "auth_rejected",
            PortalError::Transport(_) => "transport",
            PortalError::Precondition(_) => "precondition",
            PortalError::Duplicate(_) => "duplicate",
            PortalError::Config(_) => "config",
        }
    }

    /// True when the backend rejected the acting role's token
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, PortalError::AuthRejected(_))
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        PortalError::Transport(err.to_string())
    }
}

/// Type alias for Result with PortalError
pub type PortalResult<T> = Result<T, PortalError>;
