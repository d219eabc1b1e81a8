//! Transport implementations

pub mod memory;
pub mod webhook;

pub use memory::{Delivery, MemoryTransport};
pub use webhook::{WebhookTransport, DEFAULT_REQUEST_TIMEOUT};

// Re-export the trait next to its implementations
pub use crate::core::Transport;
