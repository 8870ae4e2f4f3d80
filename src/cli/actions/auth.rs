use crate::{
    app_lib::HttpClient,
    cli::globals::GlobalArgs,
    features::auth::{
        types::{SignupRequest, User},
        use_cases::OtpIssuedOutput,
        verification::TOO_MANY_ATTEMPTS,
        AuthSession, Navigation, OtpVerification, ResendOutcome, SubmitOutcome,
    },
};
use anyhow::{bail, Result};
use secrecy::ExposeSecret;
use std::{io::Write, sync::Arc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Debug)]
pub struct SignupArgs {
    pub request: SignupRequest,
    pub print_token: bool,
}

#[derive(Debug)]
pub struct LoginArgs {
    pub email: String,
    pub print_token: bool,
}

/// How the code prompt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptEnd {
    Verified,
    Quit,
    Locked,
}

/// Sign-in flows start from a client without `--token`; only a verify or
/// refresh result may install a bearer token on the session's client.
fn new_session(globals: &GlobalArgs) -> Result<Arc<AuthSession>> {
    Ok(Arc::new(AuthSession::new(
        HttpClient::new(&globals.config)?,
        globals.hint(),
    )))
}

/// # Errors
/// Returns an error if signup fails or no valid code is entered.
pub async fn signup(args: SignupArgs, globals: &GlobalArgs) -> Result<()> {
    let session = new_session(globals)?;
    let output = session.signup(args.request).await;
    finish_sign_in(session, output, args.print_token).await
}

/// # Errors
/// Returns an error if login fails or no valid code is entered.
pub async fn login(args: LoginArgs, globals: &GlobalArgs) -> Result<()> {
    let session = new_session(globals)?;
    let output = session.login(&args.email).await;
    finish_sign_in(session, output, args.print_token).await
}

async fn finish_sign_in(
    session: Arc<AuthSession>,
    output: OtpIssuedOutput,
    print_token: bool,
) -> Result<()> {
    let email = match output.email {
        Some(email) if output.success => email,
        _ => bail!(output.message),
    };
    println!("{}", output.message);

    let verification = OtpVerification::new(Arc::clone(&session), &email);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    match prompt_for_code(&verification, stdin, &mut stdout).await? {
        PromptEnd::Verified => {
            if let Some(user) = session.snapshot().user() {
                println!("{}", signed_in_line(user));
            }
            if print_token {
                if let Some(token) = session.http().auth_token() {
                    println!("{}", token.expose_secret());
                }
            }
            Ok(())
        }
        PromptEnd::Quit => bail!("Sign-in cancelled."),
        PromptEnd::Locked => {
            let mut navigation = verification.navigation();
            let returned = navigation
                .wait_for(|target| *target == Some(Navigation::Root))
                .await
                .is_ok();
            info!(returned, "sign-in locked out");
            bail!(TOO_MANY_ATTEMPTS)
        }
    }
}

/// Reads codes line by line until one verifies, the user quits, or the
/// attempt budget runs out. `r` asks for a new code, `q` quits.
///
/// # Errors
/// Returns an error if reading input or writing output fails.
pub async fn prompt_for_code<R, W>(
    verification: &OtpVerification,
    input: R,
    output: &mut W,
) -> Result<PromptEnd>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(
        output,
        "Enter the 6-digit code sent to {} (r = resend, q = quit):",
        verification.email()
    )?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "q" => return Ok(PromptEnd::Quit),
            "r" => match verification.resend().await {
                ResendOutcome::Sent {
                    message,
                    cooldown_seconds,
                } => writeln!(output, "{message} (next resend in {cooldown_seconds}s)")?,
                ResendOutcome::CoolingDown { remaining_seconds } => writeln!(
                    output,
                    "Please wait {remaining_seconds}s before requesting a new code."
                )?,
                ResendOutcome::Failed(message) => writeln!(output, "{message}")?,
                ResendOutcome::Locked(message) => {
                    writeln!(output, "{message}")?;
                    return Ok(PromptEnd::Locked);
                }
            },
            code => match verification.submit(code).await {
                SubmitOutcome::Verified => return Ok(PromptEnd::Verified),
                SubmitOutcome::Invalid(message) | SubmitOutcome::Expired(message) => {
                    writeln!(output, "{message}")?;
                }
                SubmitOutcome::Failed {
                    message,
                    attempts_remaining,
                } => writeln!(
                    output,
                    "{message} ({attempts_remaining} attempts left)"
                )?,
                SubmitOutcome::Locked(message) => {
                    writeln!(output, "{message}")?;
                    return Ok(PromptEnd::Locked);
                }
            },
        }
    }

    Ok(PromptEnd::Quit)
}

/// Runs the refresh check and prints who is signed in.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub async fn session(globals: &GlobalArgs) -> Result<()> {
    let session = new_session(globals)?;
    match session.hint().load() {
        Ok(Some(_)) => println!("Previously signed in; checking session..."),
        Ok(None) => {}
        Err(err) => warn!(error = %err, "failed to read user id hint"),
    }

    if session.hydrate().await {
        if let Some(user) = session.snapshot().user() {
            println!("{}", signed_in_line(user));
        }
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

/// Ends the session. The local state is cleared even when the server call
/// fails, so this only reports the failure.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub async fn logout(globals: &GlobalArgs) -> Result<()> {
    let session = new_session(globals)?;
    let output = session.logout().await;
    if output.success {
        println!("{}", output.message);
    } else {
        eprintln!("{} (local session cleared)", output.message);
    }
    Ok(())
}

fn signed_in_line(user: &User) -> String {
    format!(
        "Signed in as {} <{}> ({})",
        user.display_name(),
        user.email,
        user.role
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::app_lib::{AppConfig, UserIdHint};
    use secrecy::SecretString;
    use crate::features::auth::error::AuthError;
    use crate::features::auth::test_support::{user_json, FakeRepository, Op};
    use crate::features::auth::types::Role;
    use crate::features::auth::verification::INVALID_CODE;
    use serde_json::json;
    use std::time::Duration;

    fn verification(repository: FakeRepository) -> (OtpVerification, Arc<AuthSession>) {
        let http = HttpClient::new(&AppConfig::default()).unwrap();
        let session = Arc::new(AuthSession::with_repository(
            http,
            Arc::new(repository),
            UserIdHint::in_memory(),
        ));
        (
            OtpVerification::new(Arc::clone(&session), "ada@example.com"),
            session,
        )
    }

    async fn run(verification: &OtpVerification, input: &str) -> (PromptEnd, String) {
        let mut output = Vec::new();
        let end = prompt_for_code(verification, input.as_bytes(), &mut output)
            .await
            .unwrap();
        (end, String::from_utf8(output).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn prompt_verifies_after_bad_format() {
        let (verification, session) = verification(FakeRepository::new().with(
            Op::VerifyOtp,
            Ok(json!({"success": true, "token": "tok", "user": user_json()})),
        ));

        let (end, output) = run(&verification, "12ab\n123456\n").await;
        assert_eq!(end, PromptEnd::Verified);
        assert!(output.contains(INVALID_CODE));
        assert!(session.snapshot().is_authenticated());
        assert_eq!(
            session
                .http()
                .auth_token()
                .map(|token| token.expose_secret().to_string()),
            Some("tok".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn prompt_refuses_resend_during_cooldown() {
        let (verification, _) = verification(FakeRepository::new());
        let (end, output) = run(&verification, "r\nq\n").await;
        assert_eq!(end, PromptEnd::Quit);
        assert!(output.contains("Please wait 60s"));
    }

    #[tokio::test(start_paused = true)]
    async fn prompt_resends_after_cooldown() {
        let (verification, _) = verification(
            FakeRepository::new().with(Op::ResendOtp, Ok(json!({"success": true}))),
        );
        tokio::time::advance(Duration::from_secs(60)).await;

        let (_, output) = run(&verification, "r\n").await;
        assert!(output.contains("OTP resent successfully (next resend in 60s)"));
    }

    #[tokio::test(start_paused = true)]
    async fn prompt_locks_after_three_failures() {
        let (verification, _) = verification(
            FakeRepository::new()
                .with(Op::VerifyOtp, Err(AuthError::Api("Invalid OTP".to_string()))),
        );

        let (end, output) = run(&verification, "000001\n000002\n000003\n000004\n").await;
        assert_eq!(end, PromptEnd::Locked);
        assert!(output.contains("Invalid OTP (2 attempts left)"));
        assert!(output.contains("Invalid OTP (1 attempts left)"));
        assert!(output.contains(TOO_MANY_ATTEMPTS));
    }

    #[tokio::test(start_paused = true)]
    async fn prompt_treats_eof_as_quit() {
        let (verification, _) = verification(FakeRepository::new());
        let (end, _) = run(&verification, "").await;
        assert_eq!(end, PromptEnd::Quit);
    }

    #[test]
    fn sign_in_session_ignores_configured_token() {
        let mut globals = GlobalArgs::new(AppConfig::default());
        globals.set_token(SecretString::from("from-env".to_string()));

        let session = new_session(&globals).unwrap();
        assert!(!session.snapshot().is_authenticated());
        assert!(!session.http().has_auth_token());
        assert!(globals.authenticated_client().unwrap().has_auth_token());
    }

    #[test]
    fn signed_in_line_shows_name_email_and_role() {
        let mut user: User = serde_json::from_value(user_json()).unwrap();
        user.role = Role::Admin;
        assert_eq!(
            signed_in_line(&user),
            "Signed in as Ada Lovelace <ada@example.com> (admin)"
        );
    }
}
