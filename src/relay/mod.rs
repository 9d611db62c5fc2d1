//! Email relay module for sending form submissions

mod client;
mod traits;

pub use client::{EmailJsClient, RateLimit, DEFAULT_RELAY_URL};
pub use traits::{EmailRelay, RelayError, RelayMessage};

#[cfg(test)]
pub use traits::MockEmailRelay;
