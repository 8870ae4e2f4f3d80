use thiserror::Error;

/// Auth failures as seen above the HTTP layer. Both variants carry the
/// message shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Transport or HTTP-status failure, with the server message or a fallback.
    #[error("{0}")]
    Api(String),
    /// The server answered 2xx but reported `success: false`.
    #[error("{0}")]
    Rejected(String),
}

impl AuthError {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Api(message) | Self::Rejected(message) => message,
        }
    }
}
