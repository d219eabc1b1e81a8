//! Transport trait for webhook destinations

use super::{error::Result, payload::WirePayload};

/// Outbound channel used by the dispatcher.
///
/// `send` delivers one payload to one destination and returns the HTTP
/// status it answered with; any status other than 200 is a delivery
/// failure. `Err` means no status was obtained (DNS, TLS, timeout...).
pub trait Transport: Send + Sync {
    fn send(&self, url: &str, payload: &WirePayload) -> Result<u16>;
    fn name(&self) -> &str;
}
