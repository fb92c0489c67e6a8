use thiserror::Error;

/// Error type for password operations.
///
/// Both variants are unrecoverable from the caller's point of view:
/// a failed hash or an unparseable stored digest is an internal fault,
/// never a user-facing outcome.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password verification failed: {0}")]
    VerificationFailed(String),
}
