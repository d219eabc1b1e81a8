//! Process-wide logger registry
//!
//! The first request for a name creates the logger; every later request
//! returns that same instance and ignores the configuration it carries.

use super::{
    dispatcher::{Dispatcher, DispatcherConfig},
    error::Result,
    logger::{Logger, LoggerConfig},
};
use crate::transports::WebhookTransport;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

static GLOBAL: OnceCell<LoggerManager> = OnceCell::new();

/// Name-to-logger map sharing one dispatcher
pub struct LoggerManager {
    dispatcher: Arc<Dispatcher>,
    loggers: Mutex<HashMap<String, Arc<Logger>>>,
}

impl LoggerManager {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            loggers: Mutex::new(HashMap::new()),
        }
    }

    /// Registry backed by the webhook transport, created on first use
    pub fn global() -> Result<&'static LoggerManager> {
        GLOBAL.get_or_try_init(|| {
            let dispatcher = Dispatcher::spawn(
                Arc::new(WebhookTransport::new()),
                DispatcherConfig::default(),
            )?;
            tracing::debug!(target: "discord_logger", "global dispatcher started");
            Ok(LoggerManager::new(Arc::new(dispatcher)))
        })
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Logger for `name` with the default configuration.
    pub fn get_logger(&self, name: &str) -> Result<Arc<Logger>> {
        self.get_logger_with(name, LoggerConfig::default())
    }

    /// Logger for `name`, built from `config` if it does not exist yet.
    ///
    /// Construction happens under the registry lock, so concurrent first
    /// requests produce exactly one logger. A failed construction leaves
    /// the registry unchanged.
    pub fn get_logger_with(&self, name: &str, config: LoggerConfig) -> Result<Arc<Logger>> {
        let mut loggers = self.loggers.lock();
        if let Some(existing) = loggers.get(name) {
            return Ok(Arc::clone(existing));
        }

        let logger = Arc::new(Logger::new(name, config, Arc::clone(&self.dispatcher))?);
        loggers.insert(name.to_string(), Arc::clone(&logger));
        Ok(logger)
    }

    /// Existing logger, without creating one
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.lock().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loggers.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.loggers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.lock().is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Stop the shared dispatcher; see [`Dispatcher::stop`]
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.dispatcher.stop(timeout)
    }
}

/// Logger for `name` from the global registry
pub fn get_logger(name: &str) -> Result<Arc<Logger>> {
    LoggerManager::global()?.get_logger(name)
}

/// Logger for `name` from the global registry, built from `config` on first use
pub fn get_logger_with(name: &str, config: LoggerConfig) -> Result<Arc<Logger>> {
    LoggerManager::global()?.get_logger_with(name, config)
}

/// Stop the global dispatcher if it was ever started.
///
/// Queued payloads are discarded, not flushed.
pub fn shutdown(timeout: Duration) -> bool {
    match GLOBAL.get() {
        Some(manager) => manager.shutdown(timeout),
        None => true,
    }
}
