//! Shared client plumbing: the HTTP client, configuration, errors, and the
//! user-id hint store. Feature modules build on these so network behavior,
//! timeouts, and error shapes stay consistent. Nothing here logs token
//! material; callers must not either.

pub mod api;
pub mod config;
pub mod errors;
pub mod storage;

pub use api::{
    ErrorInterceptor, HttpClient, HttpResponse, InterceptorId, Payload, RequestOptions,
    ResponseBody,
};
pub use config::AppConfig;
pub use errors::{AppError, HttpError};
pub use storage::UserIdHint;
