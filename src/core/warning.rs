//! Non-fatal warnings raised by the delivery pipeline
//!
//! Webhook failures must never interrupt the instrumented application, so
//! they are reported through a [`WarningHandler`] instead of being returned.

use reqwest::Url;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Destination answered with a status other than 200
    DeliveryFailed { url: String, status: u16 },

    /// Request could not be completed at all
    TransportFailed { url: String, reason: String },

    /// Payloads still queued when the dispatcher stopped
    PendingDiscarded { count: usize },

    /// Payload rejected before reaching the queue
    Dropped { logger: String, reason: String },
}

impl Warning {
    /// Destination the warning refers to, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Warning::DeliveryFailed { url, .. } | Warning::TransportFailed { url, .. } => {
                Some(url)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DeliveryFailed { url, status } => write!(
                f,
                "Failed to send log to {}. Status code: {}",
                redact_url(url),
                status
            ),
            Warning::TransportFailed { url, reason } => {
                write!(f, "Failed to send log to {}: {}", redact_url(url), reason)
            }
            Warning::PendingDiscarded { count } => write!(
                f,
                "Dispatcher stopped with {} pending payloads; they were discarded",
                count
            ),
            Warning::Dropped { logger, reason } => {
                write!(f, "Dropped log from '{}': {}", logger, reason)
            }
        }
    }
}

/// Printable form of a webhook URL with its token masked.
///
/// Keeps the origin and the path up to the webhook id, so
/// `https://discord.com/api/webhooks/123/abc?wait=true` becomes
/// `https://discord.com/api/webhooks/123/***`. Credentials and the query
/// string are never kept.
pub fn redact_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return "<invalid webhook url>".to_string();
    };

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let keep = segments
        .iter()
        .position(|s| *s == "webhooks")
        .map_or(0, |i| (i + 2).min(segments.len()));

    let mut redacted = parsed.origin().ascii_serialization();
    for segment in &segments[..keep] {
        redacted.push('/');
        redacted.push_str(segment);
    }
    if segments.len() > keep {
        redacted.push_str("/***");
    }
    redacted
}

/// Callback receiving every warning
pub type WarningHandler = Arc<dyn Fn(&Warning) + Send + Sync>;

/// Handler used when none is configured: one line on stderr per warning
pub fn stderr_handler() -> WarningHandler {
    Arc::new(|warning: &Warning| {
        eprintln!("[DISCORD LOGGER WARNING] {}", warning);
    })
}
