use thiserror::Error;

/// Outcomes of authentication operations.
///
/// `InvalidCredentials` is deliberately generic: an unknown username and a
/// wrong password are indistinguishable to the caller, which prevents
/// username enumeration. `InvalidToken` likewise collapses expired, malformed
/// and wrong-purpose tokens into one outcome at this layer.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    /// Storage connectivity, hashing or signing failure. Surfaced to callers
    /// as a generic internal error with no detail leaked.
    #[error("Internal error: {0}")]
    Internal(String),
}
