/// Core error types for FreeTunes
use thiserror::Error;

/// Result type alias using `TunesError`
pub type Result<T> = std::result::Result<T, TunesError>;

/// Failure category used to branch on errors without inspecting variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Business-rule conflict (duplicate like, OTP mismatch, ...)
    Invariant,
    /// Referenced entity does not exist
    NotFound,
    /// Authenticated but not entitled
    Forbidden,
    /// Missing or wrong credentials
    Authentication,
    /// Anything the client cannot act upon
    Internal,
}

/// Core error type for FreeTunes
#[derive(Error, Debug)]
pub enum TunesError {
    /// Business-rule conflict
    #[error("{0}")]
    Invariant(String),

    /// Entity not found
    #[error("{0}")]
    NotFound(String),

    /// Caller is not allowed to touch the resource
    #[error("{0}")]
    Forbidden(String),

    /// Credentials rejected
    #[error("{0}")]
    Authentication(String),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl TunesError {
    /// Create an invariant violation
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create an authentication error
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Failure category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invariant(_) => ErrorKind::Invariant,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Database(_) | Self::Serialization(_) | Self::Other(_) => ErrorKind::Internal,
        }
    }

    /// True for failures that are reported verbatim to clients
    pub fn is_expected(&self) -> bool {
        self.kind() != ErrorKind::Internal
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for TunesError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
