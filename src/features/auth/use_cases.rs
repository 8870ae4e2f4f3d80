//! Auth use-cases. Each wraps one repository call, substitutes default
//! messages, and folds every failure into a tagged `success: false` result,
//! so nothing above this layer needs error handling for expected failures.

use crate::features::auth::{
    error::AuthError,
    repository::AuthRepository,
    types::{LoginRequest, ResendOtpRequest, SignupRequest, User, VerifyOtpRequest},
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::debug;

pub const OTP_SENT: &str = "OTP sent successfully";
pub const OTP_RESENT: &str = "OTP resent successfully";
pub const AUTHENTICATED: &str = "Authentication successful";
pub const TOKEN_REFRESHED: &str = "Token refreshed successfully";
pub const LOGGED_OUT: &str = "Logged out successfully";

pub const SIGNUP_FALLBACK: &str = "Failed to sign up";
pub const LOGIN_FALLBACK: &str = "Failed to log in";
pub const VERIFY_OTP_FALLBACK: &str = "Failed to verify OTP";
pub const RESEND_OTP_FALLBACK: &str = "Failed to resend OTP";
pub const REFRESH_TOKEN_FALLBACK: &str = "Failed to refresh token";
pub const LOGOUT_FALLBACK: &str = "Failed to log out";

/// Result of signup and login: an OTP was (or was not) sent to `email`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtpIssuedOutput {
    pub success: bool,
    pub email: Option<String>,
    pub message: String,
}

/// Result of verify-otp and refresh-token.
#[derive(Debug)]
pub struct SessionOutput {
    pub success: bool,
    pub message: String,
    pub token: Option<SecretString>,
    pub user: Option<User>,
}

impl SessionOutput {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            token: None,
            user: None,
        }
    }
}

pub type VerifyOtpOutput = SessionOutput;
pub type RefreshTokenOutput = SessionOutput;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResendOtpOutput {
    pub success: bool,
    pub message: String,
    pub attempts_remaining: Option<u32>,
    pub cooldown_seconds: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogoutOutput {
    pub success: bool,
    pub message: String,
}

pub struct SignupUseCase {
    repository: Arc<dyn AuthRepository>,
}

impl SignupUseCase {
    #[must_use]
    pub fn new(repository: Arc<dyn AuthRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, input: SignupRequest) -> OtpIssuedOutput {
        match self.repository.signup(&input).await {
            Ok(response) => OtpIssuedOutput {
                success: true,
                email: Some(input.email),
                message: message_or(response.message, OTP_SENT),
            },
            Err(err) => OtpIssuedOutput {
                success: false,
                email: None,
                message: failure_message(&err, SIGNUP_FALLBACK),
            },
        }
    }
}

pub struct LoginUseCase {
    repository: Arc<dyn AuthRepository>,
}

impl LoginUseCase {
    #[must_use]
    pub fn new(repository: Arc<dyn AuthRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, input: LoginRequest) -> OtpIssuedOutput {
        match self.repository.login(&input).await {
            Ok(response) => OtpIssuedOutput {
                success: true,
                email: Some(input.email),
                message: message_or(response.message, OTP_SENT),
            },
            Err(err) => OtpIssuedOutput {
                success: false,
                email: None,
                message: failure_message(&err, LOGIN_FALLBACK),
            },
        }
    }
}

pub struct VerifyOtpUseCase {
    repository: Arc<dyn AuthRepository>,
}

impl VerifyOtpUseCase {
    #[must_use]
    pub fn new(repository: Arc<dyn AuthRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, input: VerifyOtpRequest) -> VerifyOtpOutput {
        match self.repository.verify_otp(&input).await {
            Ok(response) => SessionOutput {
                success: true,
                message: message_or(response.message, AUTHENTICATED),
                token: response.token,
                user: response.user,
            },
            Err(err) => SessionOutput::failure(failure_message(&err, VERIFY_OTP_FALLBACK)),
        }
    }
}

pub struct ResendOtpUseCase {
    repository: Arc<dyn AuthRepository>,
}

impl ResendOtpUseCase {
    #[must_use]
    pub fn new(repository: Arc<dyn AuthRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, input: ResendOtpRequest) -> ResendOtpOutput {
        match self.repository.resend_otp(&input).await {
            Ok(response) => ResendOtpOutput {
                success: true,
                message: message_or(response.message, OTP_RESENT),
                attempts_remaining: response.attempts_remaining,
                cooldown_seconds: response.cooldown_seconds,
            },
            Err(err) => ResendOtpOutput {
                success: false,
                message: failure_message(&err, RESEND_OTP_FALLBACK),
                attempts_remaining: None,
                cooldown_seconds: None,
            },
        }
    }
}

pub struct RefreshTokenUseCase {
    repository: Arc<dyn AuthRepository>,
}

impl RefreshTokenUseCase {
    #[must_use]
    pub fn new(repository: Arc<dyn AuthRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> RefreshTokenOutput {
        match self.repository.refresh_token().await {
            Ok(response) => SessionOutput {
                success: true,
                message: message_or(response.message, TOKEN_REFRESHED),
                token: response.token,
                user: response.user,
            },
            Err(err) => SessionOutput::failure(failure_message(&err, REFRESH_TOKEN_FALLBACK)),
        }
    }
}

pub struct LogoutUseCase {
    repository: Arc<dyn AuthRepository>,
}

impl LogoutUseCase {
    #[must_use]
    pub fn new(repository: Arc<dyn AuthRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> LogoutOutput {
        match self.repository.logout().await {
            Ok(response) => LogoutOutput {
                success: true,
                message: message_or(response.message, LOGGED_OUT),
            },
            Err(err) => LogoutOutput {
                success: false,
                message: failure_message(&err, LOGOUT_FALLBACK),
            },
        }
    }
}

/// All auth use-cases over one shared repository, built once at startup.
pub struct AuthServices {
    pub signup: SignupUseCase,
    pub login: LoginUseCase,
    pub verify_otp: VerifyOtpUseCase,
    pub resend_otp: ResendOtpUseCase,
    pub refresh_token: RefreshTokenUseCase,
    pub logout: LogoutUseCase,
}

impl AuthServices {
    #[must_use]
    pub fn new(repository: Arc<dyn AuthRepository>) -> Self {
        Self {
            signup: SignupUseCase::new(Arc::clone(&repository)),
            login: LoginUseCase::new(Arc::clone(&repository)),
            verify_otp: VerifyOtpUseCase::new(Arc::clone(&repository)),
            resend_otp: ResendOtpUseCase::new(Arc::clone(&repository)),
            refresh_token: RefreshTokenUseCase::new(Arc::clone(&repository)),
            logout: LogoutUseCase::new(repository),
        }
    }
}

/// Server message when present and non-blank, otherwise `default`.
fn message_or(message: Option<String>, default: &str) -> String {
    message
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn failure_message(err: &AuthError, fallback: &str) -> String {
    debug!(error = %err, "use-case failed");
    let message = err.message().trim();
    if message.is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}
