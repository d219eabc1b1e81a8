//! Error types for the Discord logger

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// No webhook URL was passed and none is set in the environment
    #[error(
        "Could not find a webhook URL: pass one explicitly or set {env_var} \
         with the URL of the Discord webhook to use"
    )]
    MissingWebhookUrl { env_var: &'static str },

    /// Payload type name or value that is neither EMBEDDED nor MESSAGE
    #[error("Unsupported payload type: {0}")]
    UnsupportedPayloadType(String),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Level name that is not one of the defined level names
    #[error("Invalid log level name: '{0}'")]
    InvalidLevelName(String),

    /// Integer that does not map to a defined level
    #[error("Invalid log level value: {0}")]
    InvalidLevelValue(i64),

    /// Malformed message template
    #[error("Invalid message template: {0}")]
    Template(String),

    /// Template references a field the record does not carry
    #[error("Message template references missing field '{0}'")]
    MissingField(&'static str),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Dispatcher already stopped
    #[error("Dispatcher already stopped")]
    DispatcherStopped,

    /// Bounded queue is full
    #[error("Dispatch queue full: {capacity} payloads buffered")]
    QueueFull { capacity: usize },
}

impl LoggerError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        LoggerError::Template(msg.into())
    }

    /// True for errors raised while validating user configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LoggerError::MissingWebhookUrl { .. }
                | LoggerError::UnsupportedPayloadType(_)
                | LoggerError::InvalidConfiguration { .. }
        )
    }

    /// True for errors raised while parsing a level
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidLevelName(_) | LoggerError::InvalidLevelValue(_)
        )
    }
}
