//! Outbound member notification
//!
//! A `Notifier` delivers one message to one member's callback address.
//! `HttpNotifier` does so with a JSON `POST`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{ConfigError, DeliveryError};
use crate::message::CallbackBody;

/// User agent sent with callback requests
const USER_AGENT: &str = concat!("chat_broadcast_server/", env!("CARGO_PKG_VERSION"));

/// Capability to deliver a message to a callback address
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` to `callback_url`
    ///
    /// Returns an error if the recipient could not be reached or did not
    /// acknowledge with a success status.
    async fn notify(&self, callback_url: &str, message: &str) -> Result<(), DeliveryError>;
}

/// Notifier posting `{"message": ...}` to the callback address
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: Client,
}

impl HttpNotifier {
    /// Create a notifier whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, callback_url: &str, message: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(callback_url)
            .json(&CallbackBody { message })
            .send()
            .await?;

        let status = response.status();
        debug!("Callback {} responded with {}", callback_url, status);

        if !status.is_success() {
            return Err(DeliveryError::Status(status));
        }

        Ok(())
    }
}
