use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Status code carried by errors that never produced an HTTP response.
pub const NO_RESPONSE_STATUS: u16 = 0;

#[derive(Clone, Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Typed failure for a single HTTP call. Transport failures and timeouts use
/// status `0`; everything else carries the response status and parsed body.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct HttpError {
    pub status: u16,
    pub status_text: String,
    pub url: String,
    pub data: Value,
    pub message: String,
    timed_out: bool,
}

impl HttpError {
    /// Builds the error for a non-2xx response.
    #[must_use]
    pub fn from_response(status: StatusCode, url: &str, data: Value) -> Self {
        Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            url: url.to_string(),
            data,
            message: format!("Request failed with status {}", status.as_u16()),
            timed_out: false,
        }
    }

    /// Wraps a transport failure (DNS, refused connection, reset).
    #[must_use]
    pub fn network(url: &str, detail: &str) -> Self {
        Self {
            status: NO_RESPONSE_STATUS,
            status_text: "Network Error".to_string(),
            url: url.to_string(),
            data: Value::Null,
            message: format!("Network error: {detail}"),
            timed_out: false,
        }
    }

    #[must_use]
    pub fn timeout(url: &str) -> Self {
        Self {
            status: NO_RESPONSE_STATUS,
            status_text: "Timeout".to_string(),
            url: url.to_string(),
            data: Value::Null,
            message: "Request timeout".to_string(),
            timed_out: true,
        }
    }

    /// Request could not be built (bad URL, header, or body).
    #[must_use]
    pub fn invalid_request(url: &str, detail: &str) -> Self {
        Self {
            status: NO_RESPONSE_STATUS,
            status_text: "Request Error".to_string(),
            url: url.to_string(),
            data: Value::Null,
            message: detail.to_string(),
            timed_out: false,
        }
    }

    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        self.status == 403
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    #[must_use]
    pub fn is_network_error(&self) -> bool {
        self.status == NO_RESPONSE_STATUS
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }

    /// Message supplied by the server body (`message`, then `error`), if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        ["message", "error"]
            .iter()
            .filter_map(|key| self.data.get(key).and_then(Value::as_str))
            .map(str::trim)
            .find(|message| !message.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_predicates_follow_ranges() {
        let not_found = HttpError::from_response(StatusCode::NOT_FOUND, "http://x/a", Value::Null);
        assert!(not_found.is_client_error());
        assert!(not_found.is_not_found());
        assert!(!not_found.is_server_error());
        assert_eq!(not_found.status_text, "Not Found");

        let unavailable =
            HttpError::from_response(StatusCode::SERVICE_UNAVAILABLE, "http://x/a", Value::Null);
        assert!(unavailable.is_server_error());
        assert!(!unavailable.is_client_error());

        assert!(
            HttpError::from_response(StatusCode::UNAUTHORIZED, "u", Value::Null).is_unauthorized()
        );
        assert!(HttpError::from_response(StatusCode::FORBIDDEN, "u", Value::Null).is_forbidden());
    }

    #[test]
    fn transport_errors_use_status_zero() {
        let network = HttpError::network("http://x/a", "connection refused");
        assert_eq!(network.status, 0);
        assert!(network.is_network_error());
        assert!(!network.is_timeout());

        let timeout = HttpError::timeout("http://x/a");
        assert_eq!(timeout.status, 0);
        assert!(timeout.is_timeout());
        assert_eq!(timeout.to_string(), "Request timeout");
    }

    #[test]
    fn server_message_prefers_message_then_error() {
        let both = HttpError::from_response(
            StatusCode::BAD_REQUEST,
            "u",
            json!({"message": "Invalid OTP", "error": "bad_request"}),
        );
        assert_eq!(both.server_message(), Some("Invalid OTP"));

        let error_only =
            HttpError::from_response(StatusCode::BAD_REQUEST, "u", json!({"error": "Locked"}));
        assert_eq!(error_only.server_message(), Some("Locked"));

        let blank = HttpError::from_response(StatusCode::BAD_REQUEST, "u", json!({"message": " "}));
        assert_eq!(blank.server_message(), None);
    }
}
