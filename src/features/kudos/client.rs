//! Client wrappers for the kudos endpoints.

use crate::{
    app_lib::{AppError, HttpClient, Payload, RequestOptions},
    features::kudos::types::{GiveKudosRequest, Kudos, KudosAnalytics, KudosFilter, KudosPage},
};
use reqwest::Method;
use tracing::instrument;

pub const KUDOS_PATH: &str = "/kudos";
pub const ANALYTICS_PATH: &str = "/kudos/analytics";
pub const MAX_MESSAGE_CHARS: usize = 500;

#[derive(Clone, Debug)]
pub struct KudosApi {
    http: HttpClient,
}

impl KudosApi {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Fetches one page of the feed.
    ///
    /// # Errors
    /// Returns `AppError::Http` on request failure.
    #[instrument(skip(self))]
    pub async fn list_kudos(&self, filter: &KudosFilter) -> Result<KudosPage, AppError> {
        let options = filter.apply(RequestOptions::new());
        let payload: Payload<KudosPage> = self.http.get_json(KUDOS_PATH, options).await?;
        Ok(payload.into_inner())
    }

    /// Sends kudos to a teammate.
    ///
    /// # Errors
    /// Returns `AppError::Validation` when the recipient is blank or the
    /// message is blank or longer than `MAX_MESSAGE_CHARS`.
    #[instrument(skip_all)]
    pub async fn give_kudos(&self, request: &GiveKudosRequest) -> Result<Kudos, AppError> {
        let request = validate(request)?;
        let payload: Payload<Kudos> = self
            .http
            .send_json(Method::POST, KUDOS_PATH, &request, RequestOptions::new())
            .await?;
        Ok(payload.into_inner())
    }

    /// # Errors
    /// Returns `AppError::Http` on request failure.
    pub async fn analytics(&self) -> Result<KudosAnalytics, AppError> {
        let payload: Payload<KudosAnalytics> = self
            .http
            .get_json(ANALYTICS_PATH, RequestOptions::new())
            .await?;
        Ok(payload.into_inner())
    }
}

fn validate(request: &GiveKudosRequest) -> Result<GiveKudosRequest, AppError> {
    let recipient_id = request.recipient_id.trim();
    if recipient_id.is_empty() {
        return Err(AppError::Validation("Recipient is required.".to_string()));
    }

    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Message is required.".to_string()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "Message must be at most {MAX_MESSAGE_CHARS} characters."
        )));
    }

    Ok(GiveKudosRequest {
        recipient_id: recipient_id.to_string(),
        message: message.to_string(),
        category: request
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .map(str::to_string),
    })
}
