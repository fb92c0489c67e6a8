pub mod errors;
pub mod limiter;

pub use errors::RateLimitError;
pub use limiter::AttemptKey;
pub use limiter::LoginRateLimiter;
