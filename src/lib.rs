//! # Discord Logger
//!
//! Send log records to Discord webhooks, either as rich embeds or as
//! plain messages, without blocking the code that logs.
//!
//! ## Features
//!
//! - **Non-blocking**: records are formatted on the caller's thread and
//!   delivered by one background dispatcher
//! - **Named loggers**: a process-wide registry hands out one logger per name
//! - **Optional fields**: thread, process, function, module and line number,
//!   gathered only when enabled
//! - **Fan-out**: every record goes to each configured webhook independently
//!
//! ## Quick start
//!
//! ```no_run
//! use discord_logger::{get_logger_with, LoggerConfig, LogLevel};
//!
//! let logger = get_logger_with(
//!     "MyApp",
//!     LoggerConfig {
//!         webhook_urls: vec!["https://discord.com/api/webhooks/1/token".into()],
//!         level: LogLevel::Debug,
//!         ..LoggerConfig::default()
//!     },
//! )?;
//!
//! logger.set_embed_line_number(true);
//! logger.info("service started");
//! discord_logger::warning!(logger, "queue depth {}", 1234);
//!
//! discord_logger::shutdown(std::time::Duration::from_secs(5));
//! # Ok::<(), discord_logger::LoggerError>(())
//! ```
//!
//! When `webhook_urls` is empty the logger reads `DISCORDLOGGER_WEBHOOK_URL`,
//! which may hold several comma separated URLs.

pub mod core;
pub mod macros;
pub mod transports;

pub mod prelude {
    pub use crate::core::{
        get_logger, get_logger_with, shutdown, CallSite, Dispatcher, DispatcherConfig,
        FieldFlags, IntoLogLevel, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError,
        LoggerManager, OptionalField, PayloadType, Result, Transport, Warning, WarningHandler,
    };
    pub use crate::transports::WebhookTransport;
}

pub use core::{
    format_payload, format_payload_embedded, format_payload_message, get_logger,
    get_logger_with, shutdown, stderr_handler, CallSite, DispatchMetrics, Dispatcher,
    DispatcherConfig, DispatcherState, Embed, FieldFlags, IntoLogLevel, LevelColor, LogLevel,
    LogPayload, LogRecord, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerManager,
    MessageTemplate, OptionalField, PayloadFormat, PayloadType, redact_url, Result, Transport, Warning,
    WarningHandler, WebhookIdentity, WirePayload, DEFAULT_POLL_INTERVAL, DEFAULT_SHUTDOWN_TIMEOUT,
    WEBHOOK_URL_ENV,
};
pub use transports::WebhookTransport;
