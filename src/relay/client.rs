//! HTTP client for the EmailJS REST API
//!
//! Sends templated emails with the account's public key. The client also
//! applies the per-id send throttle the hosted service expects from browser
//! clients, rejecting early sends without touching the network.

use super::traits::{EmailRelay, RelayError, RelayMessage};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default relay address
pub const DEFAULT_RELAY_URL: &str = "https://api.emailjs.com";

const SEND_PATH: &str = "/api/v1.0/email/send";

/// Minimum interval between two sends sharing an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimit {
    pub id: String,
    pub throttle: Duration,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a BTreeMap<String, String>,
}

/// Client for sending mail through EmailJS
pub struct EmailJsClient {
    http: Client,
    base_url: String,
    public_key: Option<String>,
    rate_limit: Option<RateLimit>,
    /// Time of the last send that passed the throttle
    last_sent: Mutex<Option<Instant>>,
}

impl EmailJsClient {
    pub fn new(base_url: impl Into<String>, public_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            public_key,
            rate_limit: None,
            last_sent: Mutex::new(None),
        }
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SEND_PATH)
    }

    /// Reserve a send slot at `now`, or report how long to wait
    fn check_rate_limit(&self, now: Instant) -> Result<(), RelayError> {
        let Some(limit) = &self.rate_limit else {
            return Ok(());
        };
        let mut last_sent = self.last_sent.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(previous) = *last_sent {
            let elapsed = now.saturating_duration_since(previous);
            if elapsed < limit.throttle {
                let remaining = (limit.throttle - elapsed).as_millis();
                return Err(RelayError::RateLimited {
                    id: limit.id.clone(),
                    remaining_ms: u64::try_from(remaining).unwrap_or(u64::MAX),
                });
            }
        }
        *last_sent = Some(now);
        Ok(())
    }
}

#[async_trait]
impl EmailRelay for EmailJsClient {
    async fn send(&self, message: &RelayMessage) -> Result<(), RelayError> {
        let public_key = self
            .public_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(RelayError::MissingPublicKey)?;

        self.check_rate_limit(Instant::now())?;

        let request = SendRequest {
            service_id: &message.service_id,
            template_id: &message.template_id,
            user_id: public_key,
            template_params: &message.template_params,
        };

        debug!("Sending template {} via {}", message.template_id, self.endpoint());

        let response = self.http.post(self.endpoint()).json(&request).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(RelayError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> RelayMessage {
        RelayMessage {
            service_id: "service_test".to_string(),
            template_id: "template_test".to_string(),
            template_params: BTreeMap::new(),
        }
    }

    fn limited_client() -> EmailJsClient {
        EmailJsClient::new(DEFAULT_RELAY_URL, Some("public-key".to_string())).with_rate_limit(
            RateLimit {
                id: "vercel".to_string(),
                throttle: Duration::from_millis(5000),
            },
        )
    }

    #[test]
    fn test_endpoint_joins_path() {
        let client = EmailJsClient::new("http://localhost:8080/", None);
        assert_eq!(client.endpoint(), "http://localhost:8080/api/v1.0/email/send");
    }

    #[test]
    fn test_missing_public_key() {
        let client = EmailJsClient::new(DEFAULT_RELAY_URL, None);
        let result = tokio_test::block_on(client.send(&message()));
        assert!(matches!(result, Err(RelayError::MissingPublicKey)));
    }

    #[test]
    fn test_blank_public_key_is_missing() {
        let client = EmailJsClient::new(DEFAULT_RELAY_URL, Some("  ".to_string()));
        let result = tokio_test::block_on(client.send(&message()));
        assert!(matches!(result, Err(RelayError::MissingPublicKey)));
    }

    #[test]
    fn test_missing_key_does_not_use_rate_limit_slot() {
        let client = EmailJsClient::new(DEFAULT_RELAY_URL, None).with_rate_limit(RateLimit {
            id: "vercel".to_string(),
            throttle: Duration::from_secs(5),
        });
        let _ = tokio_test::block_on(client.send(&message()));
        assert!(client.check_rate_limit(Instant::now()).is_ok());
    }

    #[test]
    fn test_rate_limit_window() {
        let client = limited_client();
        let start = Instant::now();

        assert!(client.check_rate_limit(start).is_ok());

        match client.check_rate_limit(start + Duration::from_millis(1000)) {
            Err(RelayError::RateLimited { id, remaining_ms }) => {
                assert_eq!(id, "vercel");
                assert_eq!(remaining_ms, 4000);
            }
            other => panic!("expected rate limit, got {other:?}"),
        }

        assert!(client
            .check_rate_limit(start + Duration::from_millis(5000))
            .is_ok());
    }

    #[test]
    fn test_rejected_send_keeps_previous_slot() {
        let client = limited_client();
        let start = Instant::now();

        assert!(client.check_rate_limit(start).is_ok());
        assert!(client
            .check_rate_limit(start + Duration::from_millis(4000))
            .is_err());
        // The window still runs from the first send
        assert!(client
            .check_rate_limit(start + Duration::from_millis(5000))
            .is_ok());
    }

    #[test]
    fn test_huge_throttle_saturates_remaining() {
        let client = EmailJsClient::new(DEFAULT_RELAY_URL, Some("key".to_string()))
            .with_rate_limit(RateLimit {
                id: "vercel".to_string(),
                throttle: Duration::MAX,
            });
        let now = Instant::now();
        assert!(client.check_rate_limit(now).is_ok());
        match client.check_rate_limit(now) {
            Err(RelayError::RateLimited { remaining_ms, .. }) => {
                assert_eq!(remaining_ms, u64::MAX)
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[test]
    fn test_no_rate_limit_configured() {
        let client = EmailJsClient::new(DEFAULT_RELAY_URL, Some("key".to_string()));
        let now = Instant::now();
        assert!(client.check_rate_limit(now).is_ok());
        assert!(client.check_rate_limit(now).is_ok());
    }

    #[test]
    fn test_request_body_shape() {
        let mut params = BTreeMap::new();
        params.insert("firstName".to_string(), "John".to_string());
        let request = SendRequest {
            service_id: "service_h6lo7jb",
            template_id: "template_voccwdi",
            user_id: "public-key",
            template_params: &params,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["user_id"], "public-key");
        assert_eq!(json["template_params"]["firstName"], "John");
    }
}
