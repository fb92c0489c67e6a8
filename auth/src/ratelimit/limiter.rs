use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::time::Duration;
use std::time::Instant;

use super::errors::RateLimitError;

/// Identity key for login attempt tracking.
///
/// Scoped to username + origin address: the same username from two addresses
/// is tracked independently, and different usernames from one address are
/// tracked independently. A single hostile address therefore cannot lock out
/// legitimate users elsewhere, while credential stuffing from one address is
/// still limited per username.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttemptKey {
    username: String,
    origin: IpAddr,
}

impl AttemptKey {
    pub fn new(username: impl Into<String>, origin: IpAddr) -> Self {
        Self {
            username: username.into(),
            origin,
        }
    }
}

/// Failed login state for one identity key.
#[derive(Debug, Default)]
struct LoginAttempt {
    failed_count: u32,
    blocked_until: Option<Instant>,
}

impl LoginAttempt {
    fn blocked_at(&self, now: Instant) -> bool {
        matches!(self.blocked_until, Some(until) if now < until)
    }

    /// A block was set and its window has passed.
    fn block_lapsed(&self, now: Instant) -> bool {
        matches!(self.blocked_until, Some(until) if now >= until)
    }
}

/// Tracks failed login attempts per identity and blocks brute forcing.
///
/// Each identity moves between two states, Normal and Blocked. Reaching
/// `max_attempts` failures opens a block window of `block_duration`; the
/// window expires lazily — nothing un-blocks an entry until the next access
/// or the periodic [`sweep`](Self::sweep) observes that the window passed.
///
/// All methods take the map lock only for their brief critical section and
/// are safe to call from any number of concurrent request handlers. The
/// pre-check ([`check`](Self::check)) and [`record_failed_attempt`] are
/// deliberately not atomic as a pair; two racing failures for one identity
/// can both pass the pre-check, which only makes blocking more eager.
///
/// [`record_failed_attempt`]: Self::record_failed_attempt
pub struct LoginRateLimiter {
    attempts: RwLock<HashMap<AttemptKey, LoginAttempt>>,
    max_attempts: u32,
    block_duration: Duration,
}

impl LoginRateLimiter {
    /// Create a new rate limiter.
    ///
    /// # Arguments
    /// * `max_attempts` - Failed attempts before an identity is blocked
    /// * `block_duration` - Length of the block window once reached
    pub fn new(max_attempts: u32, block_duration: Duration) -> Self {
        Self {
            attempts: RwLock::new(HashMap::new()),
            max_attempts,
            block_duration,
        }
    }

    /// Check whether an identity is currently blocked.
    ///
    /// # Returns
    /// Remaining block window if blocked, `None` otherwise
    pub fn is_blocked(&self, key: &AttemptKey) -> Option<Duration> {
        let attempts = self.attempts.read().unwrap_or_else(PoisonError::into_inner);

        let until = attempts.get(key)?.blocked_until?;
        let now = Instant::now();
        if now < until {
            Some(until - now)
        } else {
            None
        }
    }

    /// Pre-check for a login attempt.
    ///
    /// # Errors
    /// * `TooManyAttempts` - The identity is blocked; the caller must stop
    ///   processing and report the remaining window
    pub fn check(&self, key: &AttemptKey) -> Result<(), RateLimitError> {
        match self.is_blocked(key) {
            Some(retry_after) => Err(RateLimitError::TooManyAttempts { retry_after }),
            None => Ok(()),
        }
    }

    /// Record a failed login attempt for an identity.
    ///
    /// A lapsed block is cleared first (count restarts from 0 before the
    /// increment). Reaching `max_attempts` opens the block window and pins
    /// the count at the threshold.
    pub fn record_failed_attempt(&self, key: &AttemptKey) {
        let mut attempts = self
            .attempts
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let now = Instant::now();
        let attempt = attempts.entry(key.clone()).or_default();

        if attempt.block_lapsed(now) {
            attempt.failed_count = 0;
            attempt.blocked_until = None;
        }

        attempt.failed_count += 1;

        if attempt.failed_count >= self.max_attempts {
            attempt.failed_count = self.max_attempts;
            attempt.blocked_until = Some(now + self.block_duration);
        }
    }

    /// Clear all state for an identity after a successful login.
    pub fn record_successful_login(&self, key: &AttemptKey) {
        let mut attempts = self
            .attempts
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        attempts.remove(key);
    }

    /// Attempts left before the identity is blocked.
    ///
    /// Full allowance when the identity has no entry or its block window has
    /// already passed.
    pub fn remaining_attempts(&self, key: &AttemptKey) -> u32 {
        let attempts = self.attempts.read().unwrap_or_else(PoisonError::into_inner);

        let Some(attempt) = attempts.get(key) else {
            return self.max_attempts;
        };

        if attempt.block_lapsed(Instant::now()) {
            return self.max_attempts;
        }

        self.max_attempts.saturating_sub(attempt.failed_count)
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.attempts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// One maintenance pass over the attempt map.
    ///
    /// Unblocked entries with no failures are removed; unblocked entries
    /// with a stale count are reset in place so long-idle identities do not
    /// retain it forever. Blocked entries are left untouched.
    pub fn sweep(&self) {
        let mut attempts = self
            .attempts
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let now = Instant::now();
        attempts.retain(|_, attempt| {
            if attempt.blocked_at(now) {
                return true;
            }
            if attempt.failed_count == 0 {
                return false;
            }
            attempt.failed_count = 0;
            attempt.blocked_until = None;
            true
        });
    }

    /// Periodic sweep loop, intended for `tokio::spawn`.
    ///
    /// Runs independently of request traffic; each pass holds the map lock
    /// only for the duration of [`sweep`](Self::sweep), never across an
    /// await point.
    pub async fn run_sweeper(self: Arc<Self>, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick of a tokio interval fires immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.sweep();
            tracing::debug!(
                tracked_identities = self.tracked_identities(),
                "Login attempt sweep completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::thread;

    use super::*;

    fn key(username: &str, last_octet: u8) -> AttemptKey {
        AttemptKey::new(username, IpAddr::V4(Ipv4Addr::new(10, 0, 0, last_octet)))
    }

    #[test]
    fn test_unknown_identity_is_not_blocked() {
        let limiter = LoginRateLimiter::new(5, Duration::from_secs(300));
        let alice = key("alice", 1);

        assert_eq!(limiter.is_blocked(&alice), None);
        assert!(limiter.check(&alice).is_ok());
        assert_eq!(limiter.remaining_attempts(&alice), 5);
    }

    #[test]
    fn test_blocks_at_threshold() {
        let limiter = LoginRateLimiter::new(5, Duration::from_secs(300));
        let alice = key("alice", 1);

        for expected_remaining in (1..5).rev() {
            limiter.record_failed_attempt(&alice);
            assert_eq!(limiter.is_blocked(&alice), None);
            assert_eq!(limiter.remaining_attempts(&alice), expected_remaining);
        }

        // Fifth failure opens the block window
        limiter.record_failed_attempt(&alice);
        let remaining = limiter.is_blocked(&alice).expect("Identity is blocked");
        assert!(remaining <= Duration::from_secs(300));
        assert!(remaining > Duration::from_secs(295));
        assert_eq!(limiter.remaining_attempts(&alice), 0);

        assert!(matches!(
            limiter.check(&alice),
            Err(RateLimitError::TooManyAttempts { .. })
        ));
    }

    #[test]
    fn test_success_clears_the_entry() {
        let limiter = LoginRateLimiter::new(5, Duration::from_secs(300));
        let alice = key("alice", 1);

        for _ in 0..5 {
            limiter.record_failed_attempt(&alice);
        }
        assert!(limiter.is_blocked(&alice).is_some());

        limiter.record_successful_login(&alice);
        assert_eq!(limiter.is_blocked(&alice), None);
        assert_eq!(limiter.remaining_attempts(&alice), 5);
        assert_eq!(limiter.tracked_identities(), 0);
    }

    #[test]
    fn test_lapsed_block_restarts_counting_from_one() {
        let limiter = LoginRateLimiter::new(3, Duration::from_millis(20));
        let alice = key("alice", 1);

        for _ in 0..3 {
            limiter.record_failed_attempt(&alice);
        }
        assert!(limiter.is_blocked(&alice).is_some());

        thread::sleep(Duration::from_millis(30));

        // Lazy expiry: the block is gone only once observed
        assert_eq!(limiter.is_blocked(&alice), None);
        assert_eq!(limiter.remaining_attempts(&alice), 3);

        limiter.record_failed_attempt(&alice);
        assert_eq!(limiter.remaining_attempts(&alice), 2);
        assert_eq!(limiter.is_blocked(&alice), None);
    }

    #[test]
    fn test_identities_are_independent() {
        let limiter = LoginRateLimiter::new(2, Duration::from_secs(300));
        let alice_home = key("alice", 1);
        let alice_work = key("alice", 2);
        let bob_home = key("bob", 1);

        limiter.record_failed_attempt(&alice_home);
        limiter.record_failed_attempt(&alice_home);

        assert!(limiter.is_blocked(&alice_home).is_some());
        // Same username, different origin
        assert_eq!(limiter.is_blocked(&alice_work), None);
        assert_eq!(limiter.remaining_attempts(&alice_work), 2);
        // Same origin, different username
        assert_eq!(limiter.is_blocked(&bob_home), None);
        assert_eq!(limiter.remaining_attempts(&bob_home), 2);
    }

    #[test]
    fn test_sweep_removes_clean_entries_and_resets_stale_counts() {
        let limiter = LoginRateLimiter::new(5, Duration::from_secs(300));
        let alice = key("alice", 1);
        let bob = key("bob", 1);

        limiter.record_failed_attempt(&alice);
        limiter.record_failed_attempt(&alice);
        limiter.record_failed_attempt(&bob);

        // First pass: idle amnesty resets counts in place
        limiter.sweep();
        assert_eq!(limiter.tracked_identities(), 2);
        assert_eq!(limiter.remaining_attempts(&alice), 5);

        // Second pass: unblocked zero-count entries are deleted
        limiter.sweep();
        assert_eq!(limiter.tracked_identities(), 0);
    }

    #[test]
    fn test_sweep_leaves_blocked_entries_untouched() {
        let limiter = LoginRateLimiter::new(2, Duration::from_secs(300));
        let alice = key("alice", 1);

        limiter.record_failed_attempt(&alice);
        limiter.record_failed_attempt(&alice);
        assert!(limiter.is_blocked(&alice).is_some());

        limiter.sweep();
        assert!(limiter.is_blocked(&alice).is_some());
        assert_eq!(limiter.tracked_identities(), 1);
    }

    #[test]
    fn test_concurrent_failures_never_exceed_threshold() {
        let limiter = Arc::new(LoginRateLimiter::new(5, Duration::from_secs(300)));
        let alice = key("alice", 1);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let alice = alice.clone();
                thread::spawn(move || {
                    for _ in 0..10 {
                        limiter.record_failed_attempt(&alice);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("Worker thread panicked");
        }

        assert!(limiter.is_blocked(&alice).is_some());
        assert_eq!(limiter.remaining_attempts(&alice), 0);
    }

    #[tokio::test]
    async fn test_sweeper_task_runs_periodically() {
        let limiter = Arc::new(LoginRateLimiter::new(5, Duration::from_secs(300)));
        let alice = key("alice", 1);

        limiter.record_failed_attempt(&alice);
        assert_eq!(limiter.tracked_identities(), 1);

        let sweeper = tokio::spawn(Arc::clone(&limiter).run_sweeper(Duration::from_millis(10)));

        // Two passes: reset, then delete
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(limiter.tracked_identities(), 0);

        sweeper.abort();
    }
}
