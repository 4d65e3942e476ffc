use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use taraba_core::PhoneNumber;
use thiserror::Error;

/// Which budget a key draws from. Login, code issuance, and code
/// confirmation are independent budgets so one cannot exhaust another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitScope {
    Login,
    CodeIssue,
    CodeConfirm,
}

/// Composite limiter key: scope + identity, optionally narrowed by the
/// request's source address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    scope: RateLimitScope,
    identity: String,
    source: Option<String>,
}

impl RateLimitKey {
    pub fn new(scope: RateLimitScope, identity: impl Into<String>, source: Option<String>) -> Self {
        Self {
            scope,
            identity: identity.into(),
            source,
        }
    }

    pub fn login(phone: &PhoneNumber, source: Option<String>) -> Self {
        Self::new(RateLimitScope::Login, phone.as_str(), source)
    }

    pub fn code_issue(phone: &PhoneNumber) -> Self {
        Self::new(RateLimitScope::CodeIssue, phone.as_str(), None)
    }

    pub fn code_confirm(phone: &PhoneNumber) -> Self {
        Self::new(RateLimitScope::CodeConfirm, phone.as_str(), None)
    }

    pub fn scope(&self) -> RateLimitScope {
        self.scope
    }
}

/// Failure threshold and timing for one scope.
#[derive(Debug, Clone, Copy)]
pub struct LimiterPolicy {
    pub threshold: u32,
    pub window: Duration,
    pub lockout: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub login: LimiterPolicy,
    pub code_issue: LimiterPolicy,
    pub code_confirm: LimiterPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login: LimiterPolicy {
                threshold: 5,
                window: Duration::hours(1),
                lockout: Duration::minutes(30),
            },
            code_issue: LimiterPolicy {
                threshold: 5,
                window: Duration::hours(1),
                lockout: Duration::hours(1),
            },
            code_confirm: LimiterPolicy {
                threshold: 5,
                window: Duration::hours(1),
                lockout: Duration::minutes(30),
            },
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("Too many attempts; retry after {} seconds", retry_after.num_seconds())]
    Locked { retry_after: Duration },
}

#[derive(Debug)]
struct RateLimitEntry {
    failure_count: u32,
    window_started_at: DateTime<Utc>,
    locked_until: Option<DateTime<Utc>>,
}

/// Tracks failure counts per key within a time window and imposes a
/// temporary lockout once a scope's threshold is crossed.
///
/// Entries live in a sharded map, so each key's read-modify-write happens
/// under that key's entry lock: two simultaneous failures cannot both slip
/// under the threshold, and distinct keys never block each other. Expired
/// entries are dropped lazily when inspected; correctness rests only on the
/// `locked_until` comparison, never on deletion timing.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: Arc<DashMap<RateLimitKey, RateLimitEntry>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: Arc::new(DashMap::new()),
        }
    }

    fn policy(&self, scope: RateLimitScope) -> LimiterPolicy {
        match scope {
            RateLimitScope::Login => self.config.login,
            RateLimitScope::CodeIssue => self.config.code_issue,
            RateLimitScope::CodeConfirm => self.config.code_confirm,
        }
    }

    /// Reject while a lockout is active; otherwise allow. Stale entries
    /// encountered here are garbage-collected as a side effect.
    pub fn check_allowed(
        &self,
        key: &RateLimitKey,
        now: DateTime<Utc>,
    ) -> Result<(), RateLimitError> {
        let policy = self.policy(key.scope());

        let stale = {
            let Some(entry) = self.entries.get(key) else {
                return Ok(());
            };

            if let Some(locked_until) = entry.locked_until {
                if now < locked_until {
                    return Err(RateLimitError::Locked {
                        retry_after: locked_until - now,
                    });
                }
                true
            } else {
                now - entry.window_started_at >= policy.window
            }
        };

        if stale {
            self.entries.remove_if(key, |_, entry| match entry.locked_until {
                Some(locked_until) => now >= locked_until,
                None => now - entry.window_started_at >= policy.window,
            });
        }

        Ok(())
    }

    /// Create or increment the entry for `key`; lock it once the scope's
    /// threshold is reached. A failure arriving after an expired lockout or
    /// window starts a fresh window.
    pub fn record_failure(&self, key: RateLimitKey, now: DateTime<Utc>) {
        let policy = self.policy(key.scope());

        let mut entry = self.entries.entry(key).or_insert_with(|| RateLimitEntry {
            failure_count: 0,
            window_started_at: now,
            locked_until: None,
        });

        let lockout_expired = entry.locked_until.is_some_and(|until| now >= until);
        let window_expired =
            entry.locked_until.is_none() && now - entry.window_started_at >= policy.window;

        if lockout_expired || window_expired {
            entry.failure_count = 0;
            entry.window_started_at = now;
            entry.locked_until = None;
        }

        entry.failure_count += 1;
        if entry.locked_until.is_none() && entry.failure_count >= policy.threshold {
            entry.locked_until = Some(now + policy.lockout);
        }
    }

    /// Clear the entry for `key`.
    pub fn record_success(&self, key: &RateLimitKey) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimitConfig::default())
    }

    fn login_key() -> RateLimitKey {
        let phone = PhoneNumber::parse("+40712345678").unwrap();
        RateLimitKey::login(&phone, None)
    }

    #[test]
    fn test_allowed_with_no_history() {
        assert!(limiter().check_allowed(&login_key(), Utc::now()).is_ok());
    }

    #[test]
    fn test_locks_exactly_at_threshold() {
        let limiter = limiter();
        let now = Utc::now();

        for _ in 0..4 {
            limiter.record_failure(login_key(), now);
            assert!(limiter.check_allowed(&login_key(), now).is_ok());
        }

        limiter.record_failure(login_key(), now);
        let result = limiter.check_allowed(&login_key(), now);
        assert_eq!(
            result,
            Err(RateLimitError::Locked {
                retry_after: Duration::minutes(30),
            })
        );
    }

    #[test]
    fn test_retry_after_counts_down() {
        let limiter = limiter();
        let now = Utc::now();

        for _ in 0..5 {
            limiter.record_failure(login_key(), now);
        }

        let later = now + Duration::minutes(10);
        assert_eq!(
            limiter.check_allowed(&login_key(), later),
            Err(RateLimitError::Locked {
                retry_after: Duration::minutes(20),
            })
        );
    }

    #[test]
    fn test_allowed_again_after_lockout_elapses() {
        let limiter = limiter();
        let now = Utc::now();

        for _ in 0..5 {
            limiter.record_failure(login_key(), now);
        }

        let after_lockout = now + Duration::minutes(30);
        assert!(limiter.check_allowed(&login_key(), after_lockout).is_ok());
    }

    #[test]
    fn test_success_clears_the_count() {
        let limiter = limiter();
        let now = Utc::now();

        for _ in 0..4 {
            limiter.record_failure(login_key(), now);
        }
        limiter.record_success(&login_key());

        // A full fresh run of failures is needed to lock again.
        for _ in 0..4 {
            limiter.record_failure(login_key(), now);
        }
        assert!(limiter.check_allowed(&login_key(), now).is_ok());
    }

    #[test]
    fn test_window_expiry_resets_the_count() {
        let limiter = limiter();
        let now = Utc::now();

        for _ in 0..4 {
            limiter.record_failure(login_key(), now);
        }

        // Fifth failure lands after the window; it must start a new one
        // rather than trip the lockout.
        let later = now + Duration::hours(1);
        limiter.record_failure(login_key(), later);
        assert!(limiter.check_allowed(&login_key(), later).is_ok());
    }

    #[test]
    fn test_failure_after_expired_lockout_starts_fresh() {
        let limiter = limiter();
        let now = Utc::now();

        for _ in 0..5 {
            limiter.record_failure(login_key(), now);
        }

        let after_lockout = now + Duration::minutes(31);
        limiter.record_failure(login_key(), after_lockout);
        assert!(limiter.check_allowed(&login_key(), after_lockout).is_ok());
    }

    #[test]
    fn test_distinct_keys_are_independent() {
        let limiter = limiter();
        let now = Utc::now();

        for _ in 0..5 {
            limiter.record_failure(login_key(), now);
        }

        let other = PhoneNumber::parse("+40722000000").unwrap();
        let other_key = RateLimitKey::login(&other, None);
        assert!(limiter.check_allowed(&other_key, now).is_ok());
    }

    #[test]
    fn test_scopes_are_independent_budgets() {
        let limiter = limiter();
        let now = Utc::now();
        let phone = PhoneNumber::parse("+40712345678").unwrap();

        for _ in 0..5 {
            limiter.record_failure(RateLimitKey::code_issue(&phone), now);
        }

        assert!(limiter
            .check_allowed(&RateLimitKey::code_confirm(&phone), now)
            .is_ok());
        assert!(limiter
            .check_allowed(&RateLimitKey::login(&phone, None), now)
            .is_ok());
    }

    #[test]
    fn test_source_address_narrows_the_key() {
        let limiter = limiter();
        let now = Utc::now();
        let phone = PhoneNumber::parse("+40712345678").unwrap();

        for _ in 0..5 {
            limiter.record_failure(
                RateLimitKey::login(&phone, Some("10.0.0.1".to_string())),
                now,
            );
        }

        let other_source = RateLimitKey::login(&phone, Some("10.0.0.2".to_string()));
        assert!(limiter.check_allowed(&other_source, now).is_ok());
    }

    #[test]
    fn test_stale_entries_are_dropped_on_inspection() {
        let limiter = limiter();
        let now = Utc::now();

        limiter.record_failure(login_key(), now);
        assert_eq!(limiter.entries.len(), 1);

        let later = now + Duration::hours(2);
        assert!(limiter.check_allowed(&login_key(), later).is_ok());
        assert_eq!(limiter.entries.len(), 0);
    }

    #[test]
    fn test_concurrent_failures_never_under_count() {
        let limiter = limiter();
        let now = Utc::now();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let limiter = limiter.clone();
                scope.spawn(move || {
                    for _ in 0..5 {
                        limiter.record_failure(login_key(), now);
                    }
                });
            }
        });

        let entry = limiter.entries.get(&login_key()).unwrap();
        assert_eq!(entry.failure_count, 20);
        assert!(entry.locked_until.is_some());
    }
}
