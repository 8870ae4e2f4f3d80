//! OTP entry controller: the attempt counter and resend cooldown shown on the
//! verification screen. Both are local to one controller instance; the server
//! still enforces its own limits.

use crate::features::auth::{
    otp::{OtpRequest, MAX_COOLDOWN_SECONDS},
    state::AuthSession,
};
use chrono::{TimeDelta, Utc};
use regex::Regex;
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

pub const LOCKOUT_REDIRECT_DELAY: Duration = Duration::from_secs(2);
/// Lifetime assumed for a freshly sent code.
pub const OTP_TTL_MINUTES: i64 = 10;

pub const INVALID_CODE: &str = "Please enter a valid 6-digit OTP";
pub const TOO_MANY_ATTEMPTS: &str = "Too many failed attempts. Please try again later.";
pub const CODE_EXPIRED: &str = "This OTP has expired. Please request a new one.";

/// Where the screen should go next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Dashboard,
    Root,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Verified,
    /// Rejected locally; not sent and not counted.
    Invalid(String),
    Expired(String),
    Failed {
        message: String,
        attempts_remaining: u32,
    },
    Locked(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResendOutcome {
    Sent { message: String, cooldown_seconds: u64 },
    CoolingDown { remaining_seconds: u64 },
    Failed(String),
    Locked(String),
}

struct Counters {
    /// Attempts, expiry and the cooldown length; its wall-clock deadline is
    /// what library callers see through `OtpRequest`.
    request: OtpRequest,
    server_remaining: Option<u32>,
    /// The same window on the tokio clock, which the ticker sleeps on.
    cooldown_until: Instant,
    locked: bool,
}

impl Counters {
    fn attempts_remaining(&self) -> u32 {
        let local = self.request.attempts_remaining();
        self.server_remaining.map_or(local, |server| local.min(server))
    }

    fn remaining_cooldown(&self) -> u64 {
        let left = self.cooldown_until.saturating_duration_since(Instant::now());
        left.as_secs() + u64::from(left.subsec_nanos() > 0)
    }
}

struct Shared {
    counters: Mutex<Counters>,
    countdown: watch::Sender<u64>,
    navigation: watch::Sender<Option<Navigation>>,
}

impl Shared {
    fn counters(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct OtpVerification {
    session: Arc<AuthSession>,
    email: String,
    shared: Arc<Shared>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    redirect: Mutex<Option<JoinHandle<()>>>,
}

impl OtpVerification {
    /// Controller for a code just sent to `email`. Starts the resend
    /// cooldown immediately. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn new(session: Arc<AuthSession>, email: &str) -> Self {
        let now = Utc::now();
        let request = OtpRequest::issued_at(email, now + TimeDelta::minutes(OTP_TTL_MINUTES), now);
        let cooldown = Duration::from_secs(request.cooldown_seconds);
        let (countdown, _) = watch::channel(request.cooldown_seconds);
        let (navigation, _) = watch::channel(None);

        let shared = Arc::new(Shared {
            counters: Mutex::new(Counters {
                request,
                server_remaining: None,
                cooldown_until: deadline(cooldown),
                locked: false,
            }),
            countdown,
            navigation,
        });
        let ticker = spawn_ticker(Arc::clone(&shared));

        Self {
            session,
            email: email.to_string(),
            shared,
            ticker: Mutex::new(Some(ticker)),
            redirect: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.shared.counters().request.attempts
    }

    #[must_use]
    pub fn attempts_remaining(&self) -> u32 {
        self.shared.counters().attempts_remaining()
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.shared.counters().locked
    }

    /// Whole seconds until a resend is allowed.
    #[must_use]
    pub fn remaining_cooldown(&self) -> u64 {
        self.shared.counters().remaining_cooldown()
    }

    #[must_use]
    pub fn can_resend(&self) -> bool {
        let counters = self.shared.counters();
        !counters.locked && counters.remaining_cooldown() == 0
    }

    /// Seconds left on the cooldown, updated once per second until zero.
    #[must_use]
    pub fn countdown(&self) -> watch::Receiver<u64> {
        self.shared.countdown.subscribe()
    }

    #[must_use]
    pub fn navigation(&self) -> watch::Receiver<Option<Navigation>> {
        self.shared.navigation.subscribe()
    }

    /// Submits a code. Every well-formed code counts as an attempt whether
    /// or not the server accepts it.
    pub async fn submit(&self, code: &str) -> SubmitOutcome {
        let code = code.trim();
        {
            let mut counters = self.shared.counters();
            if counters.locked {
                return SubmitOutcome::Locked(TOO_MANY_ATTEMPTS.to_string());
            }
            if !is_valid_code(code) {
                return SubmitOutcome::Invalid(INVALID_CODE.to_string());
            }
            if counters.request.is_expired() {
                return SubmitOutcome::Expired(CODE_EXPIRED.to_string());
            }
            counters.request.record_attempt();
            if let Some(server) = counters.server_remaining.as_mut() {
                *server = server.saturating_sub(1);
            }
        }

        let output = self.session.verify_otp(&self.email, code).await;
        if output.success {
            info!("otp verified");
            self.shared.navigation.send_replace(Some(Navigation::Dashboard));
            return SubmitOutcome::Verified;
        }

        let attempts_remaining = self.shared.counters().attempts_remaining();
        if attempts_remaining == 0 {
            self.lock_out();
            return SubmitOutcome::Locked(TOO_MANY_ATTEMPTS.to_string());
        }

        debug!(attempts_remaining, "otp rejected");
        SubmitOutcome::Failed {
            message: output.message,
            attempts_remaining,
        }
    }

    /// Requests a new code once the cooldown has elapsed.
    pub async fn resend(&self) -> ResendOutcome {
        {
            let counters = self.shared.counters();
            if counters.locked {
                return ResendOutcome::Locked(TOO_MANY_ATTEMPTS.to_string());
            }
            let remaining_seconds = counters.remaining_cooldown();
            if remaining_seconds > 0 {
                return ResendOutcome::CoolingDown { remaining_seconds };
            }
        }

        let output = self.session.resend_otp(&self.email).await;
        if !output.success {
            return ResendOutcome::Failed(output.message);
        }

        let (cooldown_seconds, exhausted) = {
            let mut counters = self.shared.counters();
            let now = Utc::now();
            counters.request.restart_cooldown(now, output.cooldown_seconds);
            counters.request.expires_at = now + TimeDelta::minutes(OTP_TTL_MINUTES);
            if let Some(server) = output.attempts_remaining {
                counters.server_remaining = Some(server);
            }
            let cooldown_seconds = counters.request.cooldown_seconds;
            counters.cooldown_until = deadline(Duration::from_secs(cooldown_seconds));
            (cooldown_seconds, counters.attempts_remaining() == 0)
        };

        self.shared.countdown.send_replace(cooldown_seconds);
        self.restart_ticker();
        if exhausted {
            self.lock_out();
        }

        ResendOutcome::Sent {
            message: output.message,
            cooldown_seconds,
        }
    }

    fn restart_ticker(&self) {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = ticker.take() {
            handle.abort();
        }
        *ticker = Some(spawn_ticker(Arc::clone(&self.shared)));
    }

    fn lock_out(&self) {
        self.shared.counters().locked = true;
        warn!("otp attempts exhausted, redirecting");

        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(LOCKOUT_REDIRECT_DELAY).await;
            shared.navigation.send_replace(Some(Navigation::Root));
        });

        let mut redirect = self.redirect.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = redirect.replace(handle) {
            previous.abort();
        }
    }
}

impl Drop for OtpVerification {
    fn drop(&mut self) {
        for slot in [&self.ticker, &self.redirect] {
            let handle = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(handle) = handle {
                handle.abort();
            }
        }
    }
}

fn deadline(after: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(after)
        .unwrap_or_else(|| now + Duration::from_secs(MAX_COOLDOWN_SECONDS))
}

fn spawn_ticker(shared: Arc<Shared>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let remaining = shared.counters().remaining_cooldown();
            shared.countdown.send_replace(remaining);
            if remaining == 0 {
                break;
            }
        }
    })
}

/// Six ASCII digits.
#[must_use]
pub fn is_valid_code(code: &str) -> bool {
    Regex::new(r"^[0-9]{6}$").is_ok_and(|regex| regex.is_match(code))
}
