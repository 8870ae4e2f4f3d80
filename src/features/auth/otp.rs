//! One outstanding OTP: its expiry, attempt budget, and resend cooldown.
//! The cooldown end is fixed when the OTP is issued (or re-sent), so the
//! remaining time shrinks as the clock moves.

use chrono::{DateTime, TimeDelta, Utc};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_COOLDOWN_SECONDS: u64 = 60;

/// Upper bound accepted for a cooldown, keeps date arithmetic in range.
pub const MAX_COOLDOWN_SECONDS: u64 = 86_400;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtpRequest {
    pub email: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: u32,
    pub max_attempts: u32,
    pub cooldown_seconds: u64,
    cooldown_until: DateTime<Utc>,
}

impl OtpRequest {
    /// OTP issued now, with the default attempt budget and cooldown.
    #[must_use]
    pub fn new(email: &str, expires_at: DateTime<Utc>) -> Self {
        Self::issued_at(email, expires_at, Utc::now())
    }

    #[must_use]
    pub fn issued_at(email: &str, expires_at: DateTime<Utc>, issued_at: DateTime<Utc>) -> Self {
        Self {
            email: email.to_string(),
            expires_at,
            attempts: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            cooldown_seconds: DEFAULT_COOLDOWN_SECONDS,
            cooldown_until: issued_at + cooldown_delta(DEFAULT_COOLDOWN_SECONDS),
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    #[must_use]
    pub fn has_exceeded_max_attempts(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    pub fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    #[must_use]
    pub fn attempts_remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }

    #[must_use]
    pub fn cooldown_until(&self) -> DateTime<Utc> {
        self.cooldown_until
    }

    #[must_use]
    pub fn remaining_cooldown_seconds(&self) -> u64 {
        self.remaining_cooldown_seconds_at(Utc::now())
    }

    /// Whole seconds until resend is allowed, rounded up; `0` once elapsed.
    #[must_use]
    pub fn remaining_cooldown_seconds_at(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.cooldown_until - now).num_milliseconds();
        u64::try_from(millis).map_or(0, |millis| millis.div_ceil(1000))
    }

    /// Starts a new cooldown window from `now`, e.g. after a resend. A
    /// server-reported length replaces the configured one, capped at
    /// `MAX_COOLDOWN_SECONDS`.
    pub fn restart_cooldown(&mut self, now: DateTime<Utc>, cooldown_seconds: Option<u64>) {
        if let Some(seconds) = cooldown_seconds {
            self.cooldown_seconds = seconds.min(MAX_COOLDOWN_SECONDS);
        }
        self.cooldown_until = now + cooldown_delta(self.cooldown_seconds);
    }
}

fn cooldown_delta(seconds: u64) -> TimeDelta {
    let clamped = i64::try_from(seconds.min(MAX_COOLDOWN_SECONDS)).unwrap_or_default();
    TimeDelta::try_seconds(clamped).unwrap_or_default()
}
