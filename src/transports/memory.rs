//! In-memory transport
//!
//! Records every payload instead of sending it. Each destination answers
//! 200 unless another status was configured for it.

use crate::core::{Result, Transport, WirePayload};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub url: String,
    pub payload: WirePayload,
    pub status: u16,
}

#[derive(Default)]
pub struct MemoryTransport {
    deliveries: Mutex<Vec<Delivery>>,
    delivered: Condvar,
    statuses: Mutex<HashMap<String, u16>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `status` for every send to `url`
    #[must_use]
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.statuses.lock().insert(url.into(), status);
        self
    }

    pub fn set_status(&self, url: impl Into<String>, status: u16) {
        self.statuses.lock().insert(url.into(), status);
    }

    /// Snapshot of all recorded sends
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.deliveries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Block until at least `count` sends were recorded or `timeout` elapsed
    pub fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut deliveries = self.deliveries.lock();
        while deliveries.len() < count {
            if self.delivered.wait_until(&mut deliveries, deadline).timed_out() {
                return deliveries.len() >= count;
            }
        }
        true
    }
}

impl Transport for MemoryTransport {
    fn send(&self, url: &str, payload: &WirePayload) -> Result<u16> {
        let status = self.statuses.lock().get(url).copied().unwrap_or(200);
        self.deliveries.lock().push(Delivery {
            url: url.to_string(),
            payload: payload.clone(),
            status,
        });
        self.delivered.notify_all();
        Ok(status)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_records_and_answers_configured_status() {
        let transport = MemoryTransport::new().with_status("https://b.test", 404);
        assert_eq!(transport.send("https://a.test", &WirePayload::default()).unwrap(), 200);
        assert_eq!(transport.send("https://b.test", &WirePayload::default()).unwrap(), 404);

        let deliveries = transport.deliveries();
        assert_eq!(deliveries.len(), 2);
        assert_eq!(deliveries[1].status, 404);
    }

    #[test]
    fn test_status_can_change_between_sends() {
        let transport = MemoryTransport::new();
        assert_eq!(transport.send("https://a.test", &WirePayload::default()).unwrap(), 200);

        transport.set_status("https://a.test", 429);
        assert_eq!(transport.send("https://a.test", &WirePayload::default()).unwrap(), 429);
        assert_eq!(transport.deliveries()[1].status, 429);
    }

    #[test]
    fn test_wait_for_wakes_on_send() {
        let transport = Arc::new(MemoryTransport::new());
        let sender = Arc::clone(&transport);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            sender.send("https://a.test", &WirePayload::default()).unwrap();
        });

        assert!(transport.wait_for(1, Duration::from_secs(5)));
        handle.join().unwrap();
        assert!(!transport.wait_for(2, Duration::from_millis(20)));
    }
}
