//! HTTP transport for Discord webhooks
//!
//! POSTs the JSON payload with `wait=true`, which makes Discord answer
//! `200 OK` with the created message instead of `204 No Content`.

use crate::core::{LoggerError, Result, Transport, WirePayload};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Webhook transport backed by a blocking `reqwest` client
///
/// The client is built on first use, so constructing the transport from
/// inside an async runtime is fine as long as sends happen on the
/// dispatcher thread.
///
/// # Example
///
/// ```no_run
/// use discord_logger::transports::WebhookTransport;
/// use discord_logger::{Transport, WirePayload};
///
/// let transport = WebhookTransport::new();
/// let payload = WirePayload {
///     content: Some("hello".to_string()),
///     ..WirePayload::default()
/// };
/// let status = transport
///     .send("https://discord.com/api/webhooks/1/token", &payload)
///     .expect("request failed");
/// assert_eq!(status, 200);
/// ```
pub struct WebhookTransport {
    client: OnceCell<Client>,
    timeout: Duration,
}

impl WebhookTransport {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: OnceCell::new(),
            timeout,
        }
    }

    fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| {
            Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(LoggerError::from)
        })
    }
}

impl Default for WebhookTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WebhookTransport {
    fn send(&self, url: &str, payload: &WirePayload) -> Result<u16> {
        let response = self
            .client()?
            .post(url)
            .query(&[("wait", "true")])
            .json(payload)
            .send()
            .map_err(|e| LoggerError::from(e.without_url()))?;
        Ok(response.status().as_u16())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
