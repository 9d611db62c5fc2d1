//! Trait abstraction for the email relay to enable mocking in tests

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// One templated email to send through the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayMessage {
    pub service_id: String,
    pub template_id: String,
    pub template_params: BTreeMap<String, String>,
}

/// Failures reported by a relay
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("No public key configured for the email relay")]
    MissingPublicKey,

    #[error("Rate limited by '{id}', retry in {remaining_ms} ms")]
    RateLimited { id: String, remaining_ms: u64 },

    #[error("Failed to reach the email relay: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Email relay rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Trait for relay operations, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailRelay: Send + Sync {
    /// Send a single message; no retries
    async fn send(&self, message: &RelayMessage) -> Result<(), RelayError>;
}
