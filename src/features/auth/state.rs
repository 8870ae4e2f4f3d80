//! Auth session state for the client. The session is an explicit state
//! machine (`Anonymous -> AwaitingOtp -> Authenticated`) rather than a set of
//! independent flags, so "awaiting OTP while authenticated" cannot be
//! represented. Errors and the loading flag ride alongside as side channels.
//!
//! The session owns the only path that installs a bearer token on the
//! `HttpClient`: a successful verify-otp or refresh-token transition. Logout
//! clears it in the same step that returns the state to `Anonymous`.

use crate::{
    app_lib::{HttpClient, UserIdHint},
    features::auth::{
        client::AuthApi,
        repository::{ApiAuthRepository, AuthRepository},
        types::{
            is_valid_email, LoginRequest, ResendOtpRequest, SignupRequest, User, VerifyOtpRequest,
        },
        use_cases::{
            AuthServices, LogoutOutput, OtpIssuedOutput, RefreshTokenOutput, ResendOtpOutput,
            SessionOutput, VerifyOtpOutput,
        },
    },
};
use secrecy::{ExposeSecret, SecretString};
use std::{fmt, sync::Arc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const ALREADY_SIGNED_IN: &str = "Already signed in. Log out first.";
pub const INCOMPLETE_SESSION: &str = "Authentication failed: no session token received";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    AwaitingOtp { email: String, is_signup: bool },
    Authenticated { user: User },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    /// Signup or login succeeded and an OTP was sent.
    OtpIssued { email: String, is_signup: bool },
    /// Verify-otp returned a token and user.
    OtpVerified { user: User },
    /// Refresh-token returned a token and user.
    SessionRestored { user: User },
    LoggedOut,
}

impl AuthState {
    /// Next state for `event`, or `None` when the transition is not allowed.
    #[must_use]
    pub fn transition(&self, event: &AuthEvent) -> Option<Self> {
        match (self, event) {
            (Self::Anonymous | Self::AwaitingOtp { .. }, AuthEvent::OtpIssued { email, is_signup }) => {
                Some(Self::AwaitingOtp {
                    email: email.clone(),
                    is_signup: *is_signup,
                })
            }
            (Self::Anonymous | Self::AwaitingOtp { .. }, AuthEvent::OtpVerified { user })
            | (_, AuthEvent::SessionRestored { user }) => {
                Some(Self::Authenticated { user: user.clone() })
            }
            (_, AuthEvent::LoggedOut) => Some(Self::Anonymous),
            (Self::Authenticated { .. }, AuthEvent::OtpIssued { .. } | AuthEvent::OtpVerified { .. }) => {
                None
            }
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    #[must_use]
    pub fn awaiting_otp_verification(&self) -> bool {
        matches!(self, Self::AwaitingOtp { .. })
    }

    /// Email the pending OTP was sent to.
    #[must_use]
    pub fn current_email(&self) -> Option<&str> {
        match self {
            Self::AwaitingOtp { email, .. } => Some(email),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_signup(&self) -> bool {
        matches!(self, Self::AwaitingOtp { is_signup: true, .. })
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated { user } => Some(user),
            _ => None,
        }
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("anonymous"),
            Self::AwaitingOtp { .. } => f.write_str("awaiting-otp"),
            Self::Authenticated { .. } => f.write_str("authenticated"),
        }
    }
}

impl fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OtpIssued { .. } => f.write_str("otp-issued"),
            Self::OtpVerified { .. } => f.write_str("otp-verified"),
            Self::SessionRestored { .. } => f.write_str("session-restored"),
            Self::LoggedOut => f.write_str("logged-out"),
        }
    }
}

/// Point-in-time view of the session, published to subscribers on change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    state: AuthState,
    in_flight: usize,
    error: Option<String>,
}

impl SessionSnapshot {
    fn new() -> Self {
        Self {
            state: AuthState::Anonymous,
            in_flight: 0,
            error: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    #[must_use]
    pub fn awaiting_otp_verification(&self) -> bool {
        self.state.awaiting_otp_verification()
    }

    #[must_use]
    pub fn current_email(&self) -> Option<&str> {
        self.state.current_email()
    }

    #[must_use]
    pub fn is_signup(&self) -> bool {
        self.state.is_signup()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.state.user()
    }
}

/// Auth session shared by the front-end. Built once at startup; cheap to
/// share behind an `Arc`.
pub struct AuthSession {
    http: HttpClient,
    services: AuthServices,
    hint: UserIdHint,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("http", &self.http)
            .field("snapshot", &*self.snapshot.borrow())
            .finish_non_exhaustive()
    }
}

/// Keeps the loading flag raised until dropped, including when the calling
/// future is cancelled mid-request.
struct LoadingGuard<'a> {
    snapshot: &'a watch::Sender<SessionSnapshot>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.snapshot.send_modify(|snapshot| {
            snapshot.in_flight = snapshot.in_flight.saturating_sub(1);
        });
    }
}

impl AuthSession {
    /// Session talking to the HTTP API through `http`.
    #[must_use]
    pub fn new(http: HttpClient, hint: UserIdHint) -> Self {
        let repository = Arc::new(ApiAuthRepository::new(AuthApi::new(http.clone())));
        Self::with_repository(http, repository, hint)
    }

    #[must_use]
    pub fn with_repository(
        http: HttpClient,
        repository: Arc<dyn AuthRepository>,
        hint: UserIdHint,
    ) -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::new());
        Self {
            http,
            services: AuthServices::new(repository),
            hint,
            snapshot,
        }
    }

    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    #[must_use]
    pub fn hint(&self) -> &UserIdHint {
        &self.hint
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified on every state, loading, or error change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn clear_error(&self) {
        self.snapshot.send_if_modified(|snapshot| snapshot.error.take().is_some());
    }

    /// Creates an account and moves to `AwaitingOtp` on success.
    pub async fn signup(&self, input: SignupRequest) -> OtpIssuedOutput {
        let _loading = self.begin();
        if let Some(rejected) = self.precheck_otp_request(&input.email) {
            return rejected;
        }

        let input = SignupRequest {
            email: input.email.trim().to_string(),
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
        };
        let output = self.services.signup.execute(input).await;
        self.finish_otp_request(&output, true);
        output
    }

    /// Requests a login OTP and moves to `AwaitingOtp` on success.
    pub async fn login(&self, email: &str) -> OtpIssuedOutput {
        let _loading = self.begin();
        if let Some(rejected) = self.precheck_otp_request(email) {
            return rejected;
        }

        let output = self
            .services
            .login
            .execute(LoginRequest {
                email: email.trim().to_string(),
            })
            .await;
        self.finish_otp_request(&output, false);
        output
    }

    /// Verifies an OTP. On success the bearer token is installed and the
    /// session becomes `Authenticated`; on failure the state is unchanged.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> VerifyOtpOutput {
        let _loading = self.begin();
        if self.snapshot.borrow().is_authenticated() {
            self.set_error(ALREADY_SIGNED_IN);
            return failed_session(ALREADY_SIGNED_IN);
        }

        let output = self
            .services
            .verify_otp
            .execute(VerifyOtpRequest {
                email: email.trim().to_string(),
                otp: otp.trim().to_string(),
            })
            .await;

        self.establish(output, |user| AuthEvent::OtpVerified { user }, true)
    }

    /// Re-sends the OTP. The state stays `AwaitingOtp`.
    pub async fn resend_otp(&self, email: &str) -> ResendOtpOutput {
        let _loading = self.begin();
        let output = self
            .services
            .resend_otp
            .execute(ResendOtpRequest {
                email: email.trim().to_string(),
            })
            .await;

        if !output.success {
            self.set_error(&output.message);
        }
        output
    }

    /// Startup check: asks the server to refresh an existing session. Success
    /// goes straight to `Authenticated`; failure is silent, leaves the session
    /// `Anonymous` with no bearer token, and drops the stale user-id hint.
    pub async fn hydrate(&self) -> bool {
        let _loading = self.begin();
        let output = self.services.refresh_token.execute().await;
        if !output.success {
            debug!("no existing session to restore");
            self.snapshot.send_modify(|snapshot| {
                self.http.clear_auth_token();
                snapshot.state = AuthState::Anonymous;
            });
            self.forget_hint();
            return false;
        }

        let output = self.establish(output, |user| AuthEvent::SessionRestored { user }, false);
        output.success
    }

    /// Explicit token refresh; failures are recorded as the session error.
    pub async fn refresh_session(&self) -> RefreshTokenOutput {
        let _loading = self.begin();
        let output = self.services.refresh_token.execute().await;
        self.establish(output, |user| AuthEvent::SessionRestored { user }, true)
    }

    /// Ends the session locally even if the server call fails.
    pub async fn logout(&self) -> LogoutOutput {
        let _loading = self.begin();
        let output = self.services.logout.execute().await;

        self.snapshot.send_modify(|snapshot| {
            self.http.clear_auth_token();
            info!(from = %snapshot.state, "logged out");
            snapshot.state = AuthState::Anonymous;
            snapshot.error = (!output.success).then(|| output.message.clone());
        });
        self.forget_hint();

        output
    }

    fn begin(&self) -> LoadingGuard<'_> {
        self.snapshot.send_modify(|snapshot| {
            snapshot.in_flight += 1;
            snapshot.error = None;
        });
        LoadingGuard {
            snapshot: &self.snapshot,
        }
    }

    fn set_error(&self, message: &str) {
        self.snapshot.send_modify(|snapshot| {
            snapshot.error = Some(message.to_string());
        });
    }

    /// Refuses signup or login without a network call when already signed
    /// in or when the email is malformed.
    fn precheck_otp_request(&self, email: &str) -> Option<OtpIssuedOutput> {
        let message = if self.snapshot.borrow().is_authenticated() {
            ALREADY_SIGNED_IN
        } else if !is_valid_email(email) {
            INVALID_EMAIL
        } else {
            return None;
        };
        self.set_error(message);
        Some(OtpIssuedOutput {
            success: false,
            email: None,
            message: message.to_string(),
        })
    }

    fn finish_otp_request(&self, output: &OtpIssuedOutput, is_signup: bool) {
        match output.email.as_ref().filter(|_| output.success) {
            Some(email) => {
                self.apply(
                    &AuthEvent::OtpIssued {
                        email: email.clone(),
                        is_signup,
                    },
                    None,
                );
            }
            None => self.set_error(&output.message),
        }
    }

    /// Installs the token and user from a verify or refresh result. A
    /// success without both is downgraded to a failure.
    fn establish(
        &self,
        mut output: SessionOutput,
        event: impl FnOnce(User) -> AuthEvent,
        record_error: bool,
    ) -> SessionOutput {
        if !output.success {
            if record_error {
                self.set_error(&output.message);
            }
            return output;
        }

        let (Some(token), Some(user)) = (output.token.take(), output.user.clone()) else {
            warn!("session response missing token or user");
            if record_error {
                self.set_error(INCOMPLETE_SESSION);
            }
            return failed_session(INCOMPLETE_SESSION);
        };

        let user_id = user.id.clone();
        let installed = SecretString::from(token.expose_secret().to_string());
        if !self.apply(&event(user), Some(token)) {
            return failed_session(ALREADY_SIGNED_IN);
        }

        if let Err(err) = self.hint.store(&user_id) {
            warn!(error = %err, "failed to store user id hint");
        }

        output.token = Some(installed);
        output
    }

    /// Applies `event` atomically; the token (if any) is installed in the
    /// same step so the authenticated flag and the header never disagree.
    fn apply(&self, event: &AuthEvent, token: Option<SecretString>) -> bool {
        let mut applied = false;
        self.snapshot.send_modify(|snapshot| {
            if let Some(next) = snapshot.state.transition(event) {
                info!(from = %snapshot.state, to = %next, %event, "auth state changed");
                if let Some(token) = token {
                    self.http.set_auth_token(token);
                }
                snapshot.state = next;
                applied = true;
            } else {
                warn!(state = %snapshot.state, %event, "rejected auth transition");
                snapshot.error = Some(ALREADY_SIGNED_IN.to_string());
            }
        });
        applied
    }

    fn forget_hint(&self) {
        if let Err(err) = self.hint.clear() {
            warn!(error = %err, "failed to clear user id hint");
        }
    }
}

fn failed_session(message: &str) -> SessionOutput {
    SessionOutput {
        success: false,
        message: message.to_string(),
        token: None,
        user: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::app_lib::AppConfig;
    use crate::features::auth::error::AuthError;
    use crate::features::auth::test_support::{user_json, FakeRepository, Op};
    use crate::features::auth::types::Role;
    use serde_json::json;
    use std::time::Duration;

    fn user() -> User {
        serde_json::from_value(user_json()).unwrap()
    }

    fn session_with(repository: FakeRepository) -> (AuthSession, Arc<FakeRepository>) {
        let repository = Arc::new(repository);
        let http = HttpClient::new(&AppConfig::default()).unwrap();
        let session =
            AuthSession::with_repository(http, repository.clone(), UserIdHint::in_memory());
        (session, repository)
    }

    fn signed_in_repository() -> FakeRepository {
        FakeRepository::new()
            .with(
                Op::Login,
                Ok(json!({"success": true, "message": "OTP sent successfully"})),
            )
            .with(
                Op::VerifyOtp,
                Ok(json!({"success": true, "token": "tok", "user": user_json()})),
            )
            .with(Op::Logout, Ok(json!({"success": true})))
    }

    #[test]
    fn transition_table() {
        let awaiting = AuthState::AwaitingOtp {
            email: "a@b.c".to_string(),
            is_signup: false,
        };
        let authenticated = AuthState::Authenticated { user: user() };
        let issued = AuthEvent::OtpIssued {
            email: "a@b.c".to_string(),
            is_signup: true,
        };
        let verified = AuthEvent::OtpVerified { user: user() };
        let restored = AuthEvent::SessionRestored { user: user() };

        assert!(matches!(
            AuthState::Anonymous.transition(&issued),
            Some(AuthState::AwaitingOtp { is_signup: true, .. })
        ));
        assert!(awaiting.transition(&issued).is_some());
        assert_eq!(awaiting.transition(&verified), Some(authenticated.clone()));
        assert_eq!(
            AuthState::Anonymous.transition(&restored),
            Some(authenticated.clone())
        );
        assert_eq!(authenticated.transition(&issued), None);
        assert_eq!(authenticated.transition(&verified), None);
        assert_eq!(
            authenticated.transition(&restored),
            Some(authenticated.clone())
        );
        assert_eq!(
            authenticated.transition(&AuthEvent::LoggedOut),
            Some(AuthState::Anonymous)
        );
    }

    #[test]
    fn derived_flags_never_overlap() {
        let awaiting = AuthState::AwaitingOtp {
            email: "a@b.c".to_string(),
            is_signup: true,
        };
        assert!(awaiting.awaiting_otp_verification() && !awaiting.is_authenticated());
        assert_eq!(awaiting.current_email(), Some("a@b.c"));
        assert!(awaiting.is_signup());

        let authenticated = AuthState::Authenticated { user: user() };
        assert!(authenticated.is_authenticated() && !authenticated.awaiting_otp_verification());
        assert_eq!(authenticated.current_email(), None);
        assert_eq!(authenticated.user().map(|user| user.role), Some(Role::Member));
    }

    #[tokio::test]
    async fn malformed_email_never_reaches_the_server() {
        let (session, repository) = session_with(signed_in_repository());
        let output = session.login("not-an-email").await;

        assert!(!output.success);
        assert_eq!(output.message, INVALID_EMAIL);
        assert!(repository.calls().is_empty());
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state(), &AuthState::Anonymous);
        assert_eq!(snapshot.error(), Some(INVALID_EMAIL));
    }

    #[tokio::test]
    async fn login_moves_to_awaiting_otp() {
        let (session, _) = session_with(signed_in_repository());
        let output = session.login("ada@example.com").await;

        assert_eq!(
            output,
            OtpIssuedOutput {
                success: true,
                email: Some("ada@example.com".to_string()),
                message: "OTP sent successfully".to_string(),
            }
        );
        let snapshot = session.snapshot();
        assert!(snapshot.awaiting_otp_verification());
        assert_eq!(snapshot.current_email(), Some("ada@example.com"));
        assert!(!snapshot.is_signup());
        assert!(!snapshot.is_loading());
        assert!(!session.http().has_auth_token());
    }

    #[tokio::test]
    async fn signup_marks_signup_flow() {
        let (session, _) = session_with(
            FakeRepository::new().with(Op::Signup, Ok(json!({"success": true}))),
        );
        let output = session
            .signup(SignupRequest {
                email: "ada@example.com".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            })
            .await;
        assert!(output.success);
        assert!(session.snapshot().is_signup());
    }

    #[tokio::test]
    async fn signup_trims_the_email() {
        let (session, _) = session_with(
            FakeRepository::new().with(Op::Signup, Ok(json!({"success": true}))),
        );
        let output = session
            .signup(SignupRequest {
                email: "  ada@example.com ".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            })
            .await;
        assert_eq!(output.email.as_deref(), Some("ada@example.com"));
        assert_eq!(session.snapshot().current_email(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn failed_login_records_error_and_stays_anonymous() {
        let (session, _) = session_with(
            FakeRepository::new().with(Op::Login, Err(AuthError::Api("Login failed".to_string()))),
        );
        let output = session.login("ada@example.com").await;
        assert!(!output.success);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state(), &AuthState::Anonymous);
        assert_eq!(snapshot.error(), Some("Login failed"));

        session.clear_error();
        assert_eq!(session.snapshot().error(), None);
    }

    #[tokio::test]
    async fn verify_installs_token_and_authenticates() {
        let (session, _) = session_with(signed_in_repository());
        session.login("ada@example.com").await;

        let output = session.verify_otp("ada@example.com", "123456").await;
        assert!(output.success);
        assert_eq!(
            output.token.map(|token| token.expose_secret().to_string()),
            Some("tok".to_string())
        );

        let snapshot = session.snapshot();
        assert!(snapshot.is_authenticated());
        assert!(!snapshot.awaiting_otp_verification());
        assert_eq!(snapshot.user().map(|user| user.id.as_str()), Some("u1"));
        assert!(session.http().has_auth_token());
        assert_eq!(session.hint().load().unwrap(), Some("u1".to_string()));
    }

    #[tokio::test]
    async fn failed_verify_keeps_awaiting_otp() {
        let (session, repository) = session_with(signed_in_repository());
        session.login("ada@example.com").await;
        repository.set(Op::VerifyOtp, Err(AuthError::Api("Invalid OTP".to_string())));

        let output = session.verify_otp("ada@example.com", "000000").await;
        assert!(!output.success);

        let snapshot = session.snapshot();
        assert!(snapshot.awaiting_otp_verification());
        assert_eq!(snapshot.error(), Some("Invalid OTP"));
        assert!(!session.http().has_auth_token());
    }

    #[tokio::test]
    async fn verify_without_token_is_not_authenticated() {
        let (session, repository) = session_with(signed_in_repository());
        session.login("ada@example.com").await;
        repository.set(
            Op::VerifyOtp,
            Ok(json!({"success": true, "user": user_json()})),
        );

        let output = session.verify_otp("ada@example.com", "123456").await;
        assert!(!output.success);
        assert_eq!(output.message, INCOMPLETE_SESSION);
        assert!(!session.snapshot().is_authenticated());
        assert!(!session.http().has_auth_token());
    }

    #[tokio::test]
    async fn resend_keeps_state_and_reports_failure() {
        let (session, repository) = session_with(signed_in_repository());
        session.login("ada@example.com").await;

        repository.set(Op::ResendOtp, Ok(json!({"success": true})));
        let output = session.resend_otp("ada@example.com").await;
        assert!(output.success);
        assert!(session.snapshot().awaiting_otp_verification());

        repository.set(
            Op::ResendOtp,
            Err(AuthError::Rejected("Too many requests".to_string())),
        );
        let output = session.resend_otp("ada@example.com").await;
        assert!(!output.success);
        let snapshot = session.snapshot();
        assert!(snapshot.awaiting_otp_verification());
        assert_eq!(snapshot.error(), Some("Too many requests"));
    }

    #[tokio::test]
    async fn hydrate_restores_without_otp() {
        let (session, repository) = session_with(FakeRepository::new().with(
            Op::RefreshToken,
            Ok(json!({"success": true, "token": "fresh", "user": user_json()})),
        ));
        assert!(session.hydrate().await);
        assert!(session.snapshot().is_authenticated());
        assert!(session.http().has_auth_token());
        assert_eq!(repository.calls(), vec![Op::RefreshToken]);
    }

    #[tokio::test]
    async fn failed_hydrate_is_silent_and_drops_hint() {
        let (session, _) = session_with(FakeRepository::new().with(
            Op::RefreshToken,
            Err(AuthError::Api("Token refresh failed".to_string())),
        ));
        session.hint().store("stale").unwrap();

        assert!(!session.hydrate().await);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state(), &AuthState::Anonymous);
        assert_eq!(snapshot.error(), None);
        assert_eq!(session.hint().load().unwrap(), None);
    }

    #[tokio::test]
    async fn failed_hydrate_drops_a_preinstalled_token() {
        let (session, _) = session_with(FakeRepository::new().with(
            Op::RefreshToken,
            Err(AuthError::Api("Token refresh failed".to_string())),
        ));
        session
            .http()
            .set_auth_token(SecretString::from("stale".to_string()));

        assert!(!session.hydrate().await);
        let snapshot = session.snapshot();
        assert!(!snapshot.is_authenticated());
        assert_eq!(snapshot.is_authenticated(), session.http().has_auth_token());
    }

    #[tokio::test]
    async fn refresh_session_records_failure() {
        let (session, _) = session_with(FakeRepository::new().with(
            Op::RefreshToken,
            Err(AuthError::Api("Token refresh failed".to_string())),
        ));
        let output = session.refresh_session().await;
        assert!(!output.success);
        assert_eq!(session.snapshot().error(), Some("Token refresh failed"));
    }

    #[tokio::test]
    async fn logout_clears_everything_even_on_server_failure() {
        let (session, repository) = session_with(signed_in_repository());
        session.login("ada@example.com").await;
        session.verify_otp("ada@example.com", "123456").await;
        repository.set(Op::Logout, Err(AuthError::Api("Logout failed".to_string())));

        let output = session.logout().await;
        assert!(!output.success);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state(), &AuthState::Anonymous);
        assert_eq!(snapshot.error(), Some("Logout failed"));
        assert!(!session.http().has_auth_token());
        assert_eq!(session.hint().load().unwrap(), None);
    }

    #[tokio::test]
    async fn login_while_authenticated_is_rejected_locally() {
        let (session, repository) = session_with(signed_in_repository());
        session.login("ada@example.com").await;
        session.verify_otp("ada@example.com", "123456").await;

        let output = session.login("other@example.com").await;
        assert!(!output.success);
        assert_eq!(output.message, ALREADY_SIGNED_IN);
        assert!(session.snapshot().is_authenticated());
        assert_eq!(repository.calls(), vec![Op::Login, Op::VerifyOtp]);

        let verify = session.verify_otp("ada@example.com", "123456").await;
        assert!(!verify.success);
        assert_eq!(repository.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn loading_spans_overlapping_calls() {
        let (session, _) = session_with(
            signed_in_repository()
                .with(Op::ResendOtp, Ok(json!({"success": true})))
                .with_delay(Op::Login, Duration::from_secs(1))
                .with_delay(Op::ResendOtp, Duration::from_secs(3)),
        );
        let session = Arc::new(session);
        let changes = session.subscribe();

        let login = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.login("ada@example.com").await }
        });
        let resend = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.resend_otp("ada@example.com").await }
        });

        tokio::task::yield_now().await;
        assert!(session.snapshot().is_loading());
        assert!(changes.has_changed().unwrap());

        assert!(login.await.unwrap().success);
        assert!(session.snapshot().is_loading());

        assert!(resend.await.unwrap().success);
        assert!(!session.snapshot().is_loading());
        assert!(session.snapshot().awaiting_otp_verification());
    }
}
