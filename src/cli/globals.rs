use crate::app_lib::{AppConfig, AppError, HttpClient, UserIdHint};
use anyhow::{bail, Result};
use secrecy::{ExposeSecret, SecretString};

/// Settings shared by every subcommand.
#[derive(Debug)]
pub struct GlobalArgs {
    pub config: AppConfig,
    pub token: Option<SecretString>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            token: None,
        }
    }

    pub fn set_token(&mut self, token: SecretString) {
        self.token = Some(token);
    }

    /// Client for the configured API, carrying `--token` when one was given.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the client cannot be built.
    pub fn http_client(&self) -> Result<HttpClient, AppError> {
        let http = HttpClient::new(&self.config)?;
        if let Some(token) = &self.token {
            http.set_auth_token(SecretString::from(token.expose_secret().to_string()));
        }
        Ok(http)
    }

    /// Like [`GlobalArgs::http_client`], but refuses to run without a token.
    ///
    /// # Errors
    /// Returns an error when no token was configured.
    pub fn authenticated_client(&self) -> Result<HttpClient> {
        if self.token.is_none() {
            bail!("Not signed in. Pass --token or set KUDOS_TOKEN (see `kudos login --print-token`).");
        }
        Ok(self.http_client()?)
    }

    #[must_use]
    pub fn hint(&self) -> UserIdHint {
        UserIdHint::new(self.config.hint_path.clone())
    }
}
