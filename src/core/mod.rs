//! Core logger types and traits

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod payload;
pub mod registry;
pub mod transport;
pub mod warning;

pub use config::{parse_url_list, resolve_webhook_urls, webhook_urls_from_env, WEBHOOK_URL_ENV};
pub use dispatcher::{
    Dispatcher, DispatcherConfig, DispatcherState, LogPayload, DEFAULT_POLL_INTERVAL,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use error::{LoggerError, Result};
pub use log_level::{IntoLogLevel, LevelColor, LogLevel};
pub use log_record::{CallSite, FieldFlags, LogRecord, OptionalField};
pub use logger::{Logger, LoggerBuilder, LoggerConfig};
pub use metrics::DispatchMetrics;
pub use payload::{
    format_payload, format_payload_embedded, format_payload_message, Embed, EmbedAuthor,
    EmbedField, EmbedFooter, MessageTemplate, PayloadFormat, PayloadType, WebhookIdentity,
    WirePayload, MESSAGE_TIMESTAMP_FORMAT, PACKAGE_NAME, VERSION,
};
pub use registry::{get_logger, get_logger_with, shutdown, LoggerManager};
pub use transport::Transport;
pub use warning::{redact_url, stderr_handler, Warning, WarningHandler};
