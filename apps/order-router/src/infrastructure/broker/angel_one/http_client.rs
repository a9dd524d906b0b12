//! HTTP client for SmartAPI with the mandatory source headers.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::api_types::{AngelEnvelope, LoginData, LoginRequest};
use super::config::AngelOneConfig;
use super::error::AngelOneError;
use crate::infrastructure::broker::RetryConfig;
use crate::infrastructure::broker::retry::{ErrorCategory, ExponentialBackoff, categorize_status};

pub const LOGIN_PATH: &str = "/rest/auth/angelbroking/user/v1/loginByPassword";
pub const PLACE_ORDER_PATH: &str = "/rest/secure/angelbroking/order/v1/placeOrder";
pub const POSITIONS_PATH: &str = "/rest/secure/angelbroking/order/v1/getPosition";
pub const CANDLE_DATA_PATH: &str = "/rest/secure/angelbroking/historical/v1/getCandleData";

/// Whether a call may be repeated on transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idempotency {
    /// Reads; retried with backoff.
    Idempotent,
    /// Logins and order placement; sent once.
    SendOnce,
}

/// HTTP client for the Angel One API.
#[derive(Debug, Clone)]
pub struct AngelOneHttpClient {
    client: Client,
    base_url: String,
    client_local_ip: String,
    client_public_ip: String,
    mac_address: String,
    retry_config: RetryConfig,
}

impl AngelOneHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &AngelOneConfig) -> Result<Self, AngelOneError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AngelOneError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            client_local_ip: config.client_local_ip.clone(),
            client_public_ip: config.client_public_ip.clone(),
            mac_address: config.mac_address.clone(),
            retry_config: config.retry.clone(),
        })
    }

    /// Password + TOTP login.
    pub async fn login(
        &self,
        api_key: &str,
        body: &LoginRequest<'_>,
    ) -> Result<AngelEnvelope<LoginData>, AngelOneError> {
        self.request(
            Method::POST,
            LOGIN_PATH,
            None,
            api_key,
            Some(body),
            Idempotency::SendOnce,
        )
        .await
    }

    /// Authenticated POST.
    pub async fn post_secured<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        jwt: &str,
        api_key: &str,
        body: &B,
        idempotency: Idempotency,
    ) -> Result<AngelEnvelope<T>, AngelOneError> {
        self.request(Method::POST, path, Some(jwt), api_key, Some(body), idempotency)
            .await
    }

    /// Authenticated GET.
    pub async fn get_secured<T: DeserializeOwned>(
        &self,
        path: &str,
        jwt: &str,
        api_key: &str,
    ) -> Result<AngelEnvelope<T>, AngelOneError> {
        self.request(
            Method::GET,
            path,
            Some(jwt),
            api_key,
            None::<&()>,
            Idempotency::Idempotent,
        )
        .await
    }

    fn build(&self, method: &Method, url: &str, jwt: Option<&str>, api_key: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method.clone(), url)
            .header("Accept", "application/json")
            .header("X-UserType", "USER")
            .header("X-SourceID", "WEB")
            .header("X-ClientLocalIP", &self.client_local_ip)
            .header("X-ClientPublicIP", &self.client_public_ip)
            .header("X-MACAddress", &self.mac_address)
            .header("X-PrivateKey", api_key);
        if let Some(jwt) = jwt {
            request = request.bearer_auth(jwt);
        }
        request
    }

    async fn request<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        jwt: Option<&str>,
        api_key: &str,
        body: Option<&B>,
        idempotency: Idempotency,
    ) -> Result<AngelEnvelope<T>, AngelOneError> {
        let url = format!("{}{path}", self.base_url);
        let retry = match idempotency {
            Idempotency::Idempotent => self.retry_config.clone(),
            Idempotency::SendOnce => RetryConfig::none(),
        };
        let mut backoff = ExponentialBackoff::new(&retry);

        loop {
            let mut request = self.build(&method, &url, jwt, api_key);
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
                            "Angel One network error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    if backoff.attempt > 1 {
                        return Err(AngelOneError::MaxRetriesExceeded {
                            attempts: backoff.attempt,
                        });
                    }
                    return Err(AngelOneError::Network(e.to_string()));
                }
            };

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| AngelOneError::Network(e.to_string()))?;

            if status.is_success() {
                return serde_json::from_str(&text)
                    .map_err(|e| AngelOneError::JsonParse(e.to_string()));
            }

            let category = categorize_status(status);
            if category != ErrorCategory::NonRetryable {
                if let Some(delay) = backoff.next_backoff() {
                    let delay = if category == ErrorCategory::RateLimited {
                        delay.max(Duration::from_secs(1))
                    } else {
                        delay
                    };
                    tracing::warn!(
                        status = status.as_u16(),
                        path,
                        delay_ms = delay.as_millis(),
                        "Angel One retryable error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }

            return Err(error_from_body(status.as_u16(), text));
        }
    }
}

/// Vendor error for a non-2xx response.
fn error_from_body(status: u16, body: String) -> AngelOneError {
    match serde_json::from_str::<AngelEnvelope<Value>>(&body) {
        Ok(envelope) if !envelope.message.trim().is_empty() => AngelOneError::Api {
            status,
            message: envelope.message,
        },
        _ => AngelOneError::Http { status, body },
    }
}
