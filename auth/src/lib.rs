//! Authentication utilities library
//!
//! Provides reusable security infrastructure for services:
//! - Password hashing (Argon2id)
//! - Signed access/refresh token issuance and validation (HS256)
//! - Per-identity login rate limiting with a background sweep
//!
//! Each service defines its own authentication traits and adapts these
//! implementations. This avoids coupling services through shared domain logic
//! while reducing code duplication.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use auth::TokenService;
//! use chrono::Duration;
//!
//! let tokens = TokenService::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     Duration::hours(24),
//!     Duration::hours(168),
//! );
//!
//! let (access, _expires_at) = tokens
//!     .issue_access_token("user123", Some("alice@example.com"), Some("user"))
//!     .unwrap();
//! let claims = tokens.validate_access_token(&access).unwrap();
//! assert_eq!(claims.sub, "user123");
//! ```
//!
//! ## Login Rate Limiting
//! ```
//! use std::net::{IpAddr, Ipv4Addr};
//! use std::time::Duration;
//! use auth::{AttemptKey, LoginRateLimiter};
//!
//! let limiter = LoginRateLimiter::new(5, Duration::from_secs(300));
//! let key = AttemptKey::new("alice", IpAddr::V4(Ipv4Addr::LOCALHOST));
//!
//! assert!(limiter.check(&key).is_ok());
//! limiter.record_failed_attempt(&key);
//! assert_eq!(limiter.remaining_attempts(&key), 4);
//! limiter.record_successful_login(&key);
//! assert_eq!(limiter.remaining_attempts(&key), 5);
//! ```

pub mod jwt;
pub mod password;
pub mod ratelimit;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::TokenError;
pub use jwt::TokenPurpose;
pub use jwt::TokenService;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use ratelimit::AttemptKey;
pub use ratelimit::LoginRateLimiter;
pub use ratelimit::RateLimitError;
