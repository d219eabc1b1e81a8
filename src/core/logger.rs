//! Named webhook logger

use super::{
    config::resolve_webhook_urls,
    dispatcher::{Dispatcher, LogPayload},
    error::Result,
    log_level::{IntoLogLevel, LogLevel},
    log_record::{CallSite, FieldFlags, LogRecord, OptionalField},
    payload::{format_payload, PayloadFormat, PayloadType, WebhookIdentity},
    registry::LoggerManager,
    warning::{redact_url, Warning},
};
use parking_lot::RwLock;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Construction parameters for a [`Logger`]
///
/// Deserializable so it can live in an application's own config file:
///
/// ```
/// use discord_logger::{LogLevel, LoggerConfig, PayloadType};
///
/// let config: LoggerConfig = serde_json::from_str(
///     r#"{
///         "webhook_urls": ["https://discord.com/api/webhooks/1/a"],
///         "level": "WARNING",
///         "payload_type": "MESSAGE",
///         "fields": { "line_number": true },
///         "username": "ops-bot"
///     }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.level, LogLevel::Warning);
/// assert_eq!(config.payload_type, PayloadType::Message);
/// assert!(config.fields.line_number);
/// assert_eq!(config.identity.username.as_deref(), Some("ops-bot"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Empty means "read `DISCORDLOGGER_WEBHOOK_URL`"
    pub webhook_urls: Vec<String>,
    pub level: LogLevel,
    pub fields: FieldFlags,
    pub payload_type: PayloadType,
    #[serde(flatten)]
    pub identity: WebhookIdentity,
}

struct Settings {
    level: LogLevel,
    fields: FieldFlags,
    format: PayloadFormat,
}

impl Settings {
    fn new(level: LogLevel, fields: FieldFlags, payload_type: PayloadType) -> Self {
        Self {
            level,
            fields,
            format: PayloadFormat::new(payload_type, fields),
        }
    }

    /// Keep the message template in step with the field flags
    fn rebuild(&mut self) {
        self.format = PayloadFormat::new(self.format.payload_type(), self.fields);
    }
}

/// A named logger sending records to one or more Discord webhooks
///
/// Records below the threshold are discarded before anything is captured.
/// Everything else is formatted on the calling thread and handed to the
/// shared [`Dispatcher`]; no network I/O happens on the caller's thread.
pub struct Logger {
    name: String,
    destinations: Arc<[String]>,
    identity: WebhookIdentity,
    settings: RwLock<Settings>,
    dispatcher: Arc<Dispatcher>,
}

impl Logger {
    pub fn new(
        name: impl Into<String>,
        config: LoggerConfig,
        dispatcher: Arc<Dispatcher>,
    ) -> Result<Self> {
        let name = name.into();
        let destinations = resolve_webhook_urls(&config.webhook_urls)?;

        tracing::debug!(
            target: "discord_logger",
            logger = %name,
            destinations = destinations.len(),
            level = %config.level,
            payload_type = config.payload_type.to_str(),
            "logger created"
        );

        Ok(Self {
            name,
            destinations: destinations.into(),
            identity: config.identity,
            settings: RwLock::new(Settings::new(config.level, config.fields, config.payload_type)),
            dispatcher,
        })
    }

    #[must_use]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn webhook_urls(&self) -> &[String] {
        &self.destinations
    }

    pub fn identity(&self) -> &WebhookIdentity {
        &self.identity
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn level(&self) -> LogLevel {
        self.settings.read().level
    }

    /// Change the threshold. An invalid name or value leaves it untouched.
    pub fn set_level(&self, level: impl IntoLogLevel) -> Result<()> {
        let level = level.into_level()?;
        self.settings.write().level = level;
        Ok(())
    }

    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        level >= self.settings.read().level
    }

    pub fn payload_type(&self) -> PayloadType {
        self.settings.read().format.payload_type()
    }

    pub fn set_payload_type(&self, payload_type: PayloadType) {
        let mut settings = self.settings.write();
        settings.format = PayloadFormat::new(payload_type, settings.fields);
    }

    pub fn fields(&self) -> FieldFlags {
        self.settings.read().fields
    }

    pub fn set_fields(&self, fields: FieldFlags) {
        let mut settings = self.settings.write();
        settings.fields = fields;
        settings.rebuild();
    }

    pub fn set_embed_field(&self, field: OptionalField, enabled: bool) {
        let mut settings = self.settings.write();
        settings.fields.set(field, enabled);
        settings.rebuild();
    }

    pub fn set_embed_thread_name(&self, enabled: bool) {
        self.set_embed_field(OptionalField::Thread, enabled);
    }

    pub fn set_embed_process_name(&self, enabled: bool) {
        self.set_embed_field(OptionalField::Process, enabled);
    }

    pub fn set_embed_func_name(&self, enabled: bool) {
        self.set_embed_field(OptionalField::Function, enabled);
    }

    pub fn set_embed_module_name(&self, enabled: bool) {
        self.set_embed_field(OptionalField::Module, enabled);
    }

    pub fn set_embed_line_number(&self, enabled: bool) {
        self.set_embed_field(OptionalField::Line, enabled);
    }

    pub fn set_embed_all(&self, enabled: bool) {
        let fields = if enabled {
            FieldFlags::all()
        } else {
            FieldFlags::none()
        };
        self.set_fields(fields);
    }

    /// Log at a level given by name, value or [`LogLevel`].
    ///
    /// Only level validation can fail; delivery problems are reported as
    /// warnings by the dispatcher.
    ///
    /// The file and line come from the caller, but a function name cannot be
    /// recovered from a plain method call: with the function field enabled
    /// the record shows `Function: <unknown>`. The [`log!`](crate::log) family
    /// of macros captures the real function name.
    #[track_caller]
    pub fn log(&self, level: impl IntoLogLevel, message: impl Into<String>) -> Result<()> {
        let level = level.into_level()?;
        self.log_at(level, message, CallSite::caller());
        Ok(())
    }

    /// Log with an explicit call site, as the macros do
    pub fn log_at(&self, level: LogLevel, message: impl Into<String>, call_site: CallSite) {
        let settings = self.settings.read();
        if level < settings.level {
            return;
        }

        let record = LogRecord::capture(
            level,
            &self.name,
            message.into(),
            settings.fields,
            &call_site,
        );
        let body = format_payload(&record, &settings.format, &self.identity);
        drop(settings);

        let result = body.and_then(|body| {
            self.dispatcher
                .enqueue(LogPayload::new(record, body, Arc::clone(&self.destinations)))
        });
        if let Err(e) = result {
            self.dispatcher.warn(&Warning::Dropped {
                logger: self.name.clone(),
                reason: e.to_string(),
            });
        }
    }

    /// Log at `DEBUG`. The function field reads `<unknown>`; use
    /// [`debug!`](crate::debug) to record it. See [`Logger::log`].
    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Debug, message, CallSite::caller());
    }

    /// Log at `INFO`. The function field reads `<unknown>`; use
    /// [`info!`](crate::info) to record it. See [`Logger::log`].
    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Info, message, CallSite::caller());
    }

    /// Log at `WARNING`. The function field reads `<unknown>`; use
    /// [`warning!`](crate::warning) to record it. See [`Logger::log`].
    #[track_caller]
    pub fn warning(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Warning, message, CallSite::caller());
    }

    /// Alias of [`Logger::warning`], with the same function field caveat
    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Warning, message, CallSite::caller());
    }

    /// Log at `ERROR`. The function field reads `<unknown>`; use
    /// [`error!`](crate::error) to record it. See [`Logger::log`].
    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Error, message, CallSite::caller());
    }

    /// Log at `CRITICAL`. The function field reads `<unknown>`; use
    /// [`critical!`](crate::critical) to record it. See [`Logger::log`].
    #[track_caller]
    pub fn critical(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Critical, message, CallSite::caller());
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = self.settings.read();
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field(
                "destinations",
                &self.destinations.iter().map(|u| redact_url(u)).collect::<Vec<_>>(),
            )
            .field("level", &settings.level)
            .field("fields", &settings.fields)
            .field("payload_type", &settings.format.payload_type())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Logger`]
///
/// Without an explicit dispatcher the logger shares the global one.
pub struct LoggerBuilder {
    name: String,
    config: LoggerConfig,
    dispatcher: Option<Arc<Dispatcher>>,
}

impl LoggerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: LoggerConfig::default(),
            dispatcher: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.config.webhook_urls.push(url.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn webhook_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.webhook_urls.extend(urls.into_iter().map(Into::into));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn payload_type(mut self, payload_type: PayloadType) -> Self {
        self.config.payload_type = payload_type;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn fields(mut self, fields: FieldFlags) -> Self {
        self.config.fields = fields;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn embed(mut self, field: OptionalField, enabled: bool) -> Self {
        self.config.fields.set(field, enabled);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn embed_all(mut self, enabled: bool) -> Self {
        self.config.fields = if enabled {
            FieldFlags::all()
        } else {
            FieldFlags::none()
        };
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.identity.username = Some(username.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.config.identity.avatar_url = Some(avatar_url.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn dispatcher(mut self, dispatcher: Arc<Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn build(self) -> Result<Logger> {
        let dispatcher = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Arc::clone(LoggerManager::global()?.dispatcher()),
        };
        Logger::new(self.name, self.config, dispatcher)
    }
}
