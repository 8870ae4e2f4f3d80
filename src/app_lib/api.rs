//! HTTP client for the kudos JSON API with consistent timeouts, default
//! headers, and typed errors. Every feature client goes through one shared
//! `HttpClient`; it owns the bearer token so callers never thread it by hand.
//! Each request snapshots the default headers at dispatch, so a token change
//! never affects a request that is already in flight.

use super::{
    config::AppConfig,
    errors::{AppError, HttpError},
};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method, StatusCode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, PoisonError, RwLock,
    },
    time::Duration,
};
use tracing::{debug, instrument, warn};
use url::Url;

/// Per-call settings merged over the client defaults.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Response body decoded according to its `Content-Type`.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    Text(String),
    Form(Vec<(String, String)>),
    Binary(Vec<u8>),
}

impl ResponseBody {
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Flattens the body into a JSON value; binary bodies become `null`.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
            Self::Form(pairs) => Value::Object(
                pairs
                    .into_iter()
                    .map(|(key, value)| (key, Value::String(value)))
                    .collect::<Map<String, Value>>(),
            ),
            Self::Empty | Self::Binary(_) => Value::Null,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub data: ResponseBody,
    pub status: StatusCode,
    pub status_text: String,
    pub headers: HeaderMap,
}

impl HttpResponse {
    /// Deserializes the body into `T`.
    ///
    /// # Errors
    /// Returns `AppError::Parse` if the body does not match `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, AppError> {
        serde_json::from_value(self.data.into_value())
            .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))
    }
}

/// Response body that may arrive wrapped as `{ "data": ... }` or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Payload<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Payload<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Offered every non-2xx response, in registration order. Returning `Some`
/// recovers the call with that response; `None` passes to the next one.
#[async_trait]
pub trait ErrorInterceptor: Send + Sync {
    async fn intercept(&self, error: &HttpError) -> Option<HttpResponse>;
}

/// Handle returned by `add_interceptor`, used to remove it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InterceptorId(u64);

#[derive(Default)]
struct DefaultHeaders {
    headers: HeaderMap,
    token: Option<SecretString>,
}

struct Inner {
    client: reqwest::Client,
    base_url: String,
    default_timeout: Option<Duration>,
    defaults: RwLock<DefaultHeaders>,
    interceptors: RwLock<Vec<(InterceptorId, Arc<dyn ErrorInterceptor>)>>,
    next_interceptor_id: AtomicU64,
}

/// Shared handle to the API. Clones share headers, token, and interceptors.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<Inner>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.inner.base_url)
            .field("default_timeout", &self.inner.default_timeout)
            .field("authenticated", &self.has_auth_token())
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Builds a client for the configured API base URL with a cookie store,
    /// so session cookies set by the server ride along on later calls.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the base URL is invalid or the TLS
    /// backend cannot be initialized.
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .cookie_store(true)
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                base_url: config.api_base_url.trim().trim_end_matches('/').to_string(),
                default_timeout: config.request_timeout,
                defaults: RwLock::new(DefaultHeaders {
                    headers,
                    token: None,
                }),
                interceptors: RwLock::new(Vec::new()),
                next_interceptor_id: AtomicU64::new(1),
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Installs the bearer token sent with every subsequent request.
    pub fn set_auth_token(&self, token: SecretString) {
        let mut defaults = self
            .inner
            .defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        defaults.token = Some(token);
    }

    pub fn clear_auth_token(&self) {
        let mut defaults = self
            .inner
            .defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        defaults.token = None;
    }

    #[must_use]
    pub fn has_auth_token(&self) -> bool {
        self.inner
            .defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .is_some()
    }

    /// Copy of the installed bearer token, for callers that hand it on.
    #[must_use]
    pub fn auth_token(&self) -> Option<SecretString> {
        self.inner
            .defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .as_ref()
            .map(|token| SecretString::from(token.expose_secret().to_string()))
    }

    /// Sets a default header sent with every request.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if the name or value is not a valid header.
    pub fn set_default_header(&self, name: &str, value: &str) -> Result<(), AppError> {
        let (name, value) = parse_header(name, value).map_err(AppError::Validation)?;
        self.inner
            .defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .headers
            .insert(name, value);
        Ok(())
    }

    pub fn remove_default_header(&self, name: &str) {
        if let Ok(name) = HeaderName::from_bytes(name.as_bytes()) {
            self.inner
                .defaults
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .headers
                .remove(name);
        }
    }

    pub fn add_interceptor(&self, interceptor: Arc<dyn ErrorInterceptor>) -> InterceptorId {
        let id = InterceptorId(
            self.inner
                .next_interceptor_id
                .fetch_add(1, Ordering::Relaxed),
        );
        self.inner
            .interceptors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, interceptor));
        id
    }

    /// Removes an interceptor; returns `false` if it was not registered.
    pub fn remove_interceptor(&self, id: InterceptorId) -> bool {
        let mut interceptors = self
            .inner
            .interceptors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = interceptors.len();
        interceptors.retain(|(existing, _)| *existing != id);
        interceptors.len() != before
    }

    /// # Errors
    /// Returns `HttpError` on transport failure or a non-2xx response that no
    /// interceptor recovered.
    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<HttpResponse, HttpError> {
        self.request(Method::GET, path, None, options).await
    }

    /// # Errors
    /// See [`HttpClient::get`].
    pub async fn delete(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        self.request(Method::DELETE, path, None, options).await
    }

    /// # Errors
    /// See [`HttpClient::get`]; also fails if `body` cannot be encoded.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        let body = self.encode_body(path, body)?;
        self.request(Method::POST, path, Some(body), options).await
    }

    /// # Errors
    /// See [`HttpClient::post`].
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        let body = self.encode_body(path, body)?;
        self.request(Method::PUT, path, Some(body), options).await
    }

    /// # Errors
    /// See [`HttpClient::post`].
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        let body = self.encode_body(path, body)?;
        self.request(Method::PATCH, path, Some(body), options).await
    }

    /// Fetches JSON and decodes it into `T`.
    ///
    /// # Errors
    /// Returns `AppError::Http` for request failures and `AppError::Parse`
    /// when the body does not match `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, AppError> {
        self.get(path, options).await?.into_json()
    }

    /// Sends a JSON body with `method` and decodes the JSON response.
    ///
    /// # Errors
    /// See [`HttpClient::get_json`].
    pub async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, AppError> {
        let body = self.encode_body(path, body)?;
        self.request(method, path, Some(body), options)
            .await?
            .into_json()
    }

    /// Sends one request. Bodies are only attached to POST, PUT and PATCH.
    ///
    /// # Errors
    /// Returns `HttpError` with status `0` for transport failures and
    /// timeouts, or the response status for non-2xx replies that no
    /// interceptor recovered.
    #[instrument(skip(self, body, options), fields(url = tracing::field::Empty))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        let url = self.build_url(path, &options.params)?;
        let url_text = url.to_string();
        tracing::Span::current().record("url", url_text.as_str());

        let mut headers = self.header_snapshot();
        for (name, value) in &options.headers {
            let (name, value) = parse_header(name, value)
                .map_err(|detail| HttpError::invalid_request(&url_text, &detail))?;
            headers.insert(name, value);
        }

        let mut builder = self
            .inner
            .client
            .request(method.clone(), url)
            .headers(headers);

        if let Some(timeout) = options.timeout.or(self.inner.default_timeout) {
            builder = builder.timeout(timeout);
        }

        if accepts_body(&method) {
            if let Some(body) = body {
                let payload = serde_json::to_vec(&body).map_err(|err| {
                    HttpError::invalid_request(&url_text, &format!("Failed to encode request: {err}"))
                })?;
                builder = builder.body(payload);
            }
        }

        debug!(%method, url = %url_text, "sending request");

        let response = builder
            .send()
            .await
            .map_err(|err| map_request_error(&url_text, &err))?;

        let status = response.status();
        let headers = response.headers().clone();
        let data = read_body(response)
            .await
            .map_err(|err| map_request_error(&url_text, &err))?;

        debug!(%method, url = %url_text, status = status.as_u16(), "received response");

        if status.is_success() {
            return Ok(HttpResponse {
                data,
                status,
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                headers,
            });
        }

        let error = HttpError::from_response(status, &url_text, data.into_value());
        self.recover(error).await
    }

    /// Offers `error` to each interceptor in order; the first recovery wins.
    async fn recover(&self, error: HttpError) -> Result<HttpResponse, HttpError> {
        let interceptors: Vec<Arc<dyn ErrorInterceptor>> = self
            .inner
            .interceptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, interceptor)| Arc::clone(interceptor))
            .collect();

        for interceptor in interceptors {
            if let Some(response) = interceptor.intercept(&error).await {
                debug!(status = error.status, url = %error.url, "interceptor recovered request");
                return Ok(response);
            }
        }

        if error.is_server_error() {
            warn!(status = error.status, url = %error.url, "server error");
        }
        Err(error)
    }

    fn header_snapshot(&self) -> HeaderMap {
        let defaults = self
            .inner
            .defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut headers = defaults.headers.clone();

        if let Some(token) = &defaults.token {
            match HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("bearer token contains invalid header characters; not sent"),
            }
        }

        headers
    }

    fn build_url(&self, path: &str, params: &[(String, String)]) -> Result<Url, HttpError> {
        let joined = build_url_with_base(&self.inner.base_url, path);
        let mut url = Url::parse(&joined)
            .map_err(|err| HttpError::invalid_request(&joined, &format!("Invalid URL: {err}")))?;

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        Ok(url)
    }

    fn encode_body<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, HttpError> {
        serde_json::to_value(body).map_err(|err| {
            HttpError::invalid_request(
                &build_url_with_base(&self.inner.base_url, path),
                &format!("Failed to encode request: {err}"),
            )
        })
    }
}

/// Joins a base URL and a path with exactly one slash between them.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn accepts_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), String> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|err| format!("Invalid header name {name}: {err}"))?;
    let value =
        HeaderValue::from_str(value).map_err(|err| format!("Invalid header value: {err}"))?;
    Ok((name, value))
}

/// Maps transport errors into status-0 `HttpError`s with timeout detection.
fn map_request_error(url: &str, err: &reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::timeout(url)
    } else {
        HttpError::network(url, &err.to_string())
    }
}

async fn read_body(response: reqwest::Response) -> Result<ResponseBody, reqwest::Error> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();

    let bytes = response.bytes().await?;
    Ok(decode_body(&content_type, &bytes))
}

fn decode_body(content_type: &str, bytes: &[u8]) -> ResponseBody {
    if bytes.is_empty() {
        return ResponseBody::Empty;
    }

    let mime = content_type.split(';').next().unwrap_or_default().trim();

    if mime == "application/json" || mime.ends_with("+json") {
        serde_json::from_slice(bytes).map_or_else(
            |_| ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()),
            ResponseBody::Json,
        )
    } else if mime.starts_with("text/") {
        ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned())
    } else if mime == "application/x-www-form-urlencoded" {
        ResponseBody::Form(url::form_urlencoded::parse(bytes).into_owned().collect())
    } else {
        ResponseBody::Binary(bytes.to_vec())
    }
}
