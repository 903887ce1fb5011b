//! Error types for jotter.

use thiserror::Error;

/// Result type alias using jotter's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for jotter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Input failed a shape or content rule (user-correctable)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication failed (bad header, token, or credentials)
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Entity absent, or not owned by the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate key or illegal lifecycle transition
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Note lookup miss; same message whether absent or owned by someone else.
    pub fn note_not_found(id: uuid::Uuid) -> Self {
        Error::NotFound(format!("Note {} not found", id))
    }

    /// Tag lookup miss; same message whether absent or owned by someone else.
    pub fn tag_not_found(id: uuid::Uuid) -> Self {
        Error::NotFound(format!("Tag {} not found", id))
    }

    /// Whether this error is a storage or internal failure (500-class).
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Internal(_))
    }
}

/// Why a request could not be authenticated.
///
/// Messages are safe to return to clients: they never echo the token or
/// password that was presented.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Authorization header missing or not exactly `Bearer <token>`
    #[error("Missing or invalid token format")]
    MalformedHeader,

    /// Token is present in the revocation ledger
    #[error("Token has been revoked")]
    Revoked,

    /// Token expiry instant has passed
    #[error("Token has expired")]
    Expired,

    /// Token failed structural or signature checks
    #[error("Invalid token")]
    InvalidToken,

    /// Login email/password pair did not match a user
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Old password supplied to change-password was wrong
    #[error("Old password is incorrect")]
    IncorrectPassword,
}

/// Failure verifying a signed token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Structurally invalid, wrong algorithm, or bad signature
    #[error("malformed token")]
    Malformed,

    /// The `exp` claim is not in the future
    #[error("expired token")]
    Expired,
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Malformed => AuthError::InvalidToken,
            TokenError::Expired => AuthError::Expired,
        }
    }
}

impl From<TokenError> for Error {
    fn from(e: TokenError) -> Self {
        Error::Auth(e.into())
    }
}
