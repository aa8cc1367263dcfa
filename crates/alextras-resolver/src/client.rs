//! Shared HTTP client with timeouts and bounded retries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use alextras_core::config::api::ApiConfig;
use alextras_core::error::ErrorKind;
use alextras_core::{AppError, AppResult};

/// Status and decoded body of a finished request.
///
/// Bodies that are not valid JSON decode to [`Value::Null`].
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Decoded JSON body.
    pub body: Value,
}

/// Thin wrapper over [`reqwest::Client`] applying the configured retry policy.
///
/// Rate limiting (429), server errors, timeouts and connection failures
/// are retried up to `max_retries` times. Every other status is handed
/// back to the caller, which decides what it means.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Build a client from the API configuration.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("alextras/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// The underlying reqwest client, for building requests.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// The API configuration this client was built from.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Send `request`, retrying transient failures.
    pub async fn execute(&self, label: &str, request: RequestBuilder) -> AppResult<ApiResponse> {
        let mut attempt = 0;

        loop {
            let current = request
                .try_clone()
                .ok_or_else(|| AppError::internal(format!("{label}: request body is not clonable")))?;

            match self.send_once(label, current).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = match e.retry_after {
                        Some(requested) => self.config.retry_after(requested),
                        None => self.config.backoff(attempt),
                    };
                    warn!(
                        api = label,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, label: &str, request: RequestBuilder) -> AppResult<ApiResponse> {
        let response = request.send().await.map_err(|e| map_http_error(label, e))?;
        let status = response.status();
        debug!(api = label, status = status.as_u16(), "Response received");

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::rate_limit(
                format!("{label} rate limit exceeded"),
                retry_after(response.headers()),
            ));
        }
        if status.is_server_error() {
            return Err(AppError::external_service(format!("{label} returned {status}")));
        }

        let text = response.text().await.map_err(|e| map_http_error(label, e))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(ApiResponse { status, body })
    }
}

/// Maps a transport error to an [`AppError`].
fn map_http_error(label: &str, error: reqwest::Error) -> AppError {
    if error.is_timeout() {
        AppError::with_source(
            ErrorKind::Timeout,
            format!("{label} request timed out"),
            error,
        )
    } else if error.is_connect() || error.is_body() {
        AppError::with_source(
            ErrorKind::ExternalService,
            format!("{label} connection error: {error}"),
            error,
        )
    } else {
        AppError::with_source(
            ErrorKind::Internal,
            format!("{label} HTTP error: {error}"),
            error,
        )
    }
}

/// Parse a `Retry-After` header given either in seconds or as an HTTP date.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = raw.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(raw).ok()?.with_timezone(&Utc);
    (at - Utc::now()).to_std().ok().or(Some(Duration::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_retry_after_seconds() {
        assert_eq!(retry_after(&headers("7")), Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_retry_after_past_date_is_zero() {
        assert_eq!(
            retry_after(&headers("Wed, 21 Oct 2015 07:28:00 GMT")),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_retry_after_garbage() {
        assert_eq!(retry_after(&headers("soon")), None);
        assert_eq!(retry_after(&HeaderMap::new()), None);
    }
}
