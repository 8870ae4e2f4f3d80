//! Repository seam between the use-cases and the auth API. Transport and
//! business failures both come out as `AuthError`, so use-cases handle one
//! failure path.

use crate::features::auth::{
    client::{
        AuthApi, LOGIN_FAILED, LOGOUT_FAILED, REFRESH_TOKEN_FAILED, RESEND_OTP_FAILED,
        SIGNUP_FAILED, VERIFY_OTP_FAILED,
    },
    error::AuthError,
    types::{
        LoginRequest, MessageResponse, ResendOtpRequest, ResendOtpResponse, SessionResponse,
        SignupRequest, VerifyOtpRequest,
    },
};
use async_trait::async_trait;

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse, AuthError>;
    async fn login(&self, request: &LoginRequest) -> Result<MessageResponse, AuthError>;
    async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<SessionResponse, AuthError>;
    async fn resend_otp(&self, request: &ResendOtpRequest)
        -> Result<ResendOtpResponse, AuthError>;
    async fn refresh_token(&self) -> Result<SessionResponse, AuthError>;
    async fn logout(&self) -> Result<MessageResponse, AuthError>;
}

/// `AuthRepository` backed by the HTTP API.
#[derive(Clone, Debug)]
pub struct ApiAuthRepository {
    api: AuthApi,
}

impl ApiAuthRepository {
    #[must_use]
    pub fn new(api: AuthApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthRepository for ApiAuthRepository {
    async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse, AuthError> {
        let response = self.api.signup(request).await?;
        ensure_success(response.success, response.message.as_deref(), SIGNUP_FAILED)?;
        Ok(response)
    }

    async fn login(&self, request: &LoginRequest) -> Result<MessageResponse, AuthError> {
        let response = self.api.login(request).await?;
        ensure_success(response.success, response.message.as_deref(), LOGIN_FAILED)?;
        Ok(response)
    }

    async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<SessionResponse, AuthError> {
        let response = self.api.verify_otp(request).await?;
        ensure_success(
            response.success,
            response.message.as_deref(),
            VERIFY_OTP_FAILED,
        )?;
        Ok(response)
    }

    async fn resend_otp(
        &self,
        request: &ResendOtpRequest,
    ) -> Result<ResendOtpResponse, AuthError> {
        let response = self.api.resend_otp(request).await?;
        ensure_success(
            response.success,
            response.message.as_deref(),
            RESEND_OTP_FAILED,
        )?;
        Ok(response)
    }

    async fn refresh_token(&self) -> Result<SessionResponse, AuthError> {
        let response = self.api.refresh_token().await?;
        ensure_success(
            response.success,
            response.message.as_deref(),
            REFRESH_TOKEN_FAILED,
        )?;
        Ok(response)
    }

    async fn logout(&self) -> Result<MessageResponse, AuthError> {
        let response = self.api.logout().await?;
        ensure_success(response.success, response.message.as_deref(), LOGOUT_FAILED)?;
        Ok(response)
    }
}

fn ensure_success(success: bool, message: Option<&str>, fallback: &str) -> Result<(), AuthError> {
    if success {
        return Ok(());
    }

    let message = message
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .unwrap_or(fallback);
    Err(AuthError::Rejected(message.to_string()))
}
