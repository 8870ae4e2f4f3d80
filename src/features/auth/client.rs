//! Client wrappers for the auth endpoints. Each method posts a fixed payload
//! to a fixed path through the shared `HttpClient` and turns HTTP failures
//! into plain messages. Payloads hold OTP codes and tokens; never log them.

use crate::{
    app_lib::{HttpClient, HttpError, RequestOptions},
    features::auth::{
        error::AuthError,
        types::{
            LoginRequest, MessageResponse, ResendOtpRequest, ResendOtpResponse, SessionResponse,
            SignupRequest, VerifyOtpRequest,
        },
    },
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tracing::{instrument, warn};

pub const SIGNUP_PATH: &str = "/auth/signup";
pub const LOGIN_PATH: &str = "/auth/login";
pub const VERIFY_OTP_PATH: &str = "/auth/verify-otp";
pub const RESEND_OTP_PATH: &str = "/auth/resend-otp";
pub const REFRESH_TOKEN_PATH: &str = "/auth/refresh-token";
pub const LOGOUT_PATH: &str = "/auth/logout";

pub const SIGNUP_FAILED: &str = "Signup failed";
pub const LOGIN_FAILED: &str = "Login failed";
pub const VERIFY_OTP_FAILED: &str = "OTP verification failed";
pub const RESEND_OTP_FAILED: &str = "Failed to resend OTP";
pub const REFRESH_TOKEN_FAILED: &str = "Token refresh failed";
pub const LOGOUT_FAILED: &str = "Logout failed";

#[derive(Clone, Debug)]
pub struct AuthApi {
    http: HttpClient,
}

impl AuthApi {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Registers a new account and triggers the first OTP email.
    ///
    /// # Errors
    /// Returns `AuthError::Api` with the server message or a fallback.
    #[instrument(skip_all)]
    pub async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse, AuthError> {
        self.post(SIGNUP_PATH, request, RequestOptions::new(), SIGNUP_FAILED)
            .await
    }

    /// Requests an OTP for an existing account.
    ///
    /// # Errors
    /// Returns `AuthError::Api` with the server message or a fallback.
    #[instrument(skip_all)]
    pub async fn login(&self, request: &LoginRequest) -> Result<MessageResponse, AuthError> {
        self.post(LOGIN_PATH, request, RequestOptions::new(), LOGIN_FAILED)
            .await
    }

    /// Exchanges an OTP for a session token and user.
    ///
    /// # Errors
    /// Returns `AuthError::Api` with the server message or a fallback.
    #[instrument(skip_all)]
    pub async fn verify_otp(
        &self,
        request: &VerifyOtpRequest,
    ) -> Result<SessionResponse, AuthError> {
        self.post(
            VERIFY_OTP_PATH,
            request,
            RequestOptions::new(),
            VERIFY_OTP_FAILED,
        )
        .await
    }

    /// # Errors
    /// Returns `AuthError::Api` with the server message or a fallback.
    #[instrument(skip_all)]
    pub async fn resend_otp(
        &self,
        request: &ResendOtpRequest,
    ) -> Result<ResendOtpResponse, AuthError> {
        self.post(
            RESEND_OTP_PATH,
            request,
            RequestOptions::new(),
            RESEND_OTP_FAILED,
        )
        .await
    }

    /// Asks the server to mint a new token from its session cookie.
    /// Sent with XHR-style headers so the server treats it as a script call.
    ///
    /// # Errors
    /// Returns `AuthError::Api` with the server message or a fallback.
    #[instrument(skip_all)]
    pub async fn refresh_token(&self) -> Result<SessionResponse, AuthError> {
        let options = RequestOptions::new()
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Content-Type", "application/json");
        self.post(REFRESH_TOKEN_PATH, &json!({}), options, REFRESH_TOKEN_FAILED)
            .await
    }

    /// # Errors
    /// Returns `AuthError::Api` with the server message or a fallback.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<MessageResponse, AuthError> {
        self.post(LOGOUT_PATH, &json!({}), RequestOptions::new(), LOGOUT_FAILED)
            .await
    }

    async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
        fallback: &str,
    ) -> Result<T, AuthError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(path, body, options)
            .await
            .map_err(|err| to_auth_error(&err, fallback))?;

        response.into_json().map_err(|err| {
            warn!(path, error = %err, "unexpected auth response body");
            AuthError::Api(fallback.to_string())
        })
    }
}

fn to_auth_error(err: &HttpError, fallback: &str) -> AuthError {
    warn!(status = err.status, url = %err.url, error = %err, "auth request failed");
    AuthError::Api(
        err.server_message()
            .map_or_else(|| fallback.to_string(), str::to_string),
    )
}
