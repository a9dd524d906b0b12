//! HTTP client for DhanHQ v2.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api_types::DhanErrorResponse;
use super::config::DhanConfig;
use super::error::DhanError;
use crate::infrastructure::broker::RetryConfig;
use crate::infrastructure::broker::retry::{ErrorCategory, ExponentialBackoff, categorize_status};

pub const ORDERS_PATH: &str = "/v2/orders";
pub const POSITIONS_PATH: &str = "/v2/positions";

/// HTTP client for the Dhan API.
#[derive(Debug, Clone)]
pub struct DhanHttpClient {
    client: Client,
    base_url: String,
    retry_config: RetryConfig,
}

impl DhanHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &DhanConfig) -> Result<Self, DhanError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DhanError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            retry_config: config.retry.clone(),
        })
    }

    /// GET with retry.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, access_token: &str) -> Result<T, DhanError> {
        let text = self
            .send(Method::GET, path, access_token, None::<&()>, true)
            .await?;
        parse(&text)
    }

    /// POST, sent once.
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        access_token: &str,
        body: &B,
    ) -> Result<T, DhanError> {
        let text = self
            .send(Method::POST, path, access_token, Some(body), false)
            .await?;
        parse(&text)
    }

    /// DELETE, sent once. The response body is ignored.
    pub async fn delete(&self, path: &str, access_token: &str) -> Result<(), DhanError> {
        self.send(Method::DELETE, path, access_token, None::<&()>, false)
            .await?;
        Ok(())
    }

    /// Succeeds if the token is accepted for a read.
    pub async fn probe(&self, access_token: &str) -> Result<(), DhanError> {
        self.send(Method::GET, POSITIONS_PATH, access_token, None::<&()>, true)
            .await?;
        Ok(())
    }

    async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        access_token: &str,
        body: Option<&B>,
        idempotent: bool,
    ) -> Result<String, DhanError> {
        let url = format!("{}{path}", self.base_url);
        let retry = if idempotent {
            self.retry_config.clone()
        } else {
            RetryConfig::none()
        };
        let mut backoff = ExponentialBackoff::new(&retry);

        loop {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .header("access-token", access_token.trim())
                .header("Accept", "application/json");
            if let Some(b) = body {
                request = request.json(b);
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            error = %e,
                            path,
                            delay_ms = delay.as_millis(),
                            attempt = backoff.attempt,
                            "Dhan network error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    if backoff.attempt > 1 {
                        return Err(DhanError::MaxRetriesExceeded {
                            attempts: backoff.attempt,
                        });
                    }
                    return Err(DhanError::Network(e.to_string()));
                }
            };

            let status = response.status();
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let text = response
                .text()
                .await
                .map_err(|e| DhanError::Network(e.to_string()))?;

            if status.is_success() {
                return Ok(text);
            }

            let category = categorize_status(status);
            if category != ErrorCategory::NonRetryable {
                if let Some(delay) = backoff.next_backoff() {
                    let delay = match (category, retry_after) {
                        (ErrorCategory::RateLimited, Some(secs)) => Duration::from_secs(secs),
                        _ => delay,
                    };
                    tracing::warn!(
                        status = status.as_u16(),
                        path,
                        delay_ms = delay.as_millis(),
                        "Dhan retryable error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }

            tracing::debug!(status = status.as_u16(), path, body = %text, "Dhan error response");
            return Err(error_from_body(status, text));
        }
    }
}

fn parse<T: DeserializeOwned>(text: &str) -> Result<T, DhanError> {
    serde_json::from_str(text).map_err(|e| DhanError::JsonParse(e.to_string()))
}

/// Vendor error for a non-2xx response.
fn error_from_body(status: StatusCode, body: String) -> DhanError {
    let parsed = serde_json::from_str::<DhanErrorResponse>(&body)
        .ok()
        .and_then(|err| {
            let message = err.error_message.filter(|m| !m.trim().is_empty())?;
            Some((err.error_code.unwrap_or_else(|| status.as_u16().to_string()), message))
        });

    match (status, parsed) {
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, parsed) => {
            DhanError::Unauthorized(parsed.map_or(body, |(_, message)| message))
        }
        (_, Some((code, message))) => DhanError::Api { code, message },
        (_, None) => DhanError::Http {
            status: status.as_u16(),
            body,
        },
    }
}
