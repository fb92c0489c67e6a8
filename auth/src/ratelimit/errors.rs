use std::time::Duration;

use thiserror::Error;

/// Error type for rate limit checks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RateLimitError {
    /// The identity is inside its block window; the caller must stop
    /// processing and surface a too-many-attempts outcome.
    #[error("Too many failed login attempts")]
    TooManyAttempts { retry_after: Duration },
}
