//! Shared HTTP plumbing for the lookup collaborators.
//!
//! Transient failures are retried with exponential backoff:
//! - Timeouts and connection errors
//! - 5xx server errors, 408 and 429
//!
//! Other 4xx responses are returned immediately.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use folio_core::{RetryConfig, ServiceConfig};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::LookupError;

/// Retry policy for lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Initial delay between retries (doubles each attempt)
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt + 1`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    NoRetry,
}

/// Check if a reqwest error is retryable
pub fn is_retryable_error(error: &reqwest::Error) -> RetryDecision {
    if error.is_timeout() || error.is_connect() {
        return RetryDecision::Retry;
    }

    if error.is_request() {
        return RetryDecision::NoRetry;
    }

    match error.status() {
        Some(status) => is_retryable_status(status),
        None => RetryDecision::NoRetry,
    }
}

/// Check if a status code is retryable
pub fn is_retryable_status(status: StatusCode) -> RetryDecision {
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        RetryDecision::Retry
    } else {
        RetryDecision::NoRetry
    }
}

/// Run `operation` until it succeeds, fails permanently, or retries run out.
///
/// A retryable status on the final attempt is returned as-is for the caller to inspect.
pub async fn with_retry<F, Fut>(policy: &RetryPolicy, operation: F) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = policy.delay_for_attempt(attempt - 1);
            tracing::debug!(
                "Retry attempt {} of {}, waiting {:?}",
                attempt,
                policy.max_retries,
                delay
            );
            tokio::time::sleep(delay).await;
        }

        let last_attempt = attempt >= policy.max_retries;

        match operation().await {
            Ok(response) => {
                let status = response.status();
                if !last_attempt && is_retryable_status(status) == RetryDecision::Retry {
                    tracing::warn!(
                        "Request returned retryable status {}, attempt {} of {}",
                        status,
                        attempt + 1,
                        policy.max_retries + 1
                    );
                    attempt += 1;
                    continue;
                }

                if attempt > 0 {
                    tracing::debug!("Request settled after {} retries", attempt);
                }
                return Ok(response);
            }
            Err(e) => {
                if last_attempt || is_retryable_error(&e) == RetryDecision::NoRetry {
                    return Err(e);
                }

                tracing::warn!(
                    "Retryable error on attempt {} of {}: {}",
                    attempt + 1,
                    policy.max_retries + 1,
                    e
                );
                attempt += 1;
            }
        }
    }
}

/// reqwest client shared by every HTTP collaborator
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            retry,
        })
    }

    /// Build a client from the `services` and `retry` config sections
    pub fn from_config(services: &ServiceConfig, retry: &RetryConfig) -> Result<Self, LookupError> {
        Self::new(
            &services.user_agent,
            Duration::from_secs(services.request_timeout_secs),
            RetryPolicy::from(retry),
        )
    }

    /// GET `url` with `query` and decode the JSON body.
    ///
    /// Non-success statuses become `LookupError::Api` carrying the response body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        query: &[(&str, String)],
    ) -> Result<T, LookupError> {
        tracing::debug!("GET {}", url);

        let response = with_retry(&self.retry, || {
            self.client.get(url.clone()).query(query).send()
        })
        .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LookupError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| LookupError::Parse(e.to_string()))
    }
}

/// Parse a configured endpoint, reporting which setting was wrong.
pub(crate) fn parse_endpoint(raw: &str, setting: &str) -> Result<Url, LookupError> {
    Url::parse(raw).map_err(|e| LookupError::MissingConfiguration(format!("{setting}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_from_default_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.initial_delay, Duration::from_millis(200));
        assert_eq!(policy.max_delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_delay_calculation() {
        let policy = RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(5000),
        };

        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_capped_at_max() {
        let policy = RetryPolicy {
            max_retries: 10,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
        };

        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_millis(1000));
    }

    #[test]
    fn test_retryable_status_codes() {
        assert_eq!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR), RetryDecision::Retry);
        assert_eq!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE), RetryDecision::Retry);
        assert_eq!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS), RetryDecision::Retry);
        assert_eq!(is_retryable_status(StatusCode::REQUEST_TIMEOUT), RetryDecision::Retry);

        assert_eq!(is_retryable_status(StatusCode::BAD_REQUEST), RetryDecision::NoRetry);
        assert_eq!(is_retryable_status(StatusCode::FORBIDDEN), RetryDecision::NoRetry);
        assert_eq!(is_retryable_status(StatusCode::NOT_FOUND), RetryDecision::NoRetry);
        assert_eq!(is_retryable_status(StatusCode::OK), RetryDecision::NoRetry);
    }

    #[test]
    fn test_parse_endpoint_names_setting() {
        let err = parse_endpoint("not a url", "services.forecast_url").unwrap_err();
        assert!(err.to_string().contains("services.forecast_url"));
    }
}
