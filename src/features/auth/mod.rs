//! Auth feature: OTP sign-in, session refresh, and logout. Layered as API
//! client, repository, use-cases, and the session state machine, with the
//! verification controller on top. This module handles bearer tokens and OTP
//! codes and must never log them.
//!
//! Flow Overview: signup or login asks the server to email a 6-digit code and
//! moves the session to `AwaitingOtp`. Verifying the code returns a token and
//! user; the token goes onto the shared `HttpClient`. On startup a refresh
//! check restores an existing cookie-backed session without a code.

pub mod client;
pub mod error;
pub mod otp;
pub mod repository;
pub mod state;
pub mod types;
pub mod use_cases;
pub mod verification;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::AuthError;
pub use repository::{ApiAuthRepository, AuthRepository};
pub use state::{AuthEvent, AuthSession, AuthState, SessionSnapshot};
pub use verification::{Navigation, OtpVerification, ResendOutcome, SubmitOutcome};
