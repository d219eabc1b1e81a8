//! Webhook payload construction
//!
//! A [`LogRecord`] becomes a [`WirePayload`] in one of two shapes:
//! - Embedded: a rich embed with title, author, footer, color, UTC timestamp
//!   and one inline field per optional record field
//! - Message: a single line rendered from a [`MessageTemplate`]

use super::error::{LoggerError, Result};
use super::log_record::{FieldFlags, LogRecord, OptionalField};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name shown in embed footers
pub const PACKAGE_NAME: &str = "Discord-Logger";

/// Crate version shown in embed footers
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Timestamp pattern of plain messages
pub const MESSAGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn footer_text() -> String {
    format!("{} {}", PACKAGE_NAME, VERSION)
}

/// Shape of the payload sent to the webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PayloadType {
    Message = 0,
    #[default]
    Embedded = 1,
}

impl PayloadType {
    pub fn to_str(&self) -> &'static str {
        match self {
            PayloadType::Message => "MESSAGE",
            PayloadType::Embedded => "EMBEDDED",
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for PayloadType {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MESSAGE" => Ok(PayloadType::Message),
            "EMBEDDED" => Ok(PayloadType::Embedded),
            other => Err(LoggerError::UnsupportedPayloadType(other.to_string())),
        }
    }
}

impl TryFrom<i64> for PayloadType {
    type Error = LoggerError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(PayloadType::Message),
            1 => Ok(PayloadType::Embedded),
            other => Err(LoggerError::UnsupportedPayloadType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Timestamp,
    Level,
    AppName,
    Message,
    Field(OptionalField),
}

impl Segment {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "timestamp" => Some(Segment::Timestamp),
            "level" => Some(Segment::Level),
            "app_name" => Some(Segment::AppName),
            "message" => Some(Segment::Message),
            other => OptionalField::from_key(other).map(Segment::Field),
        }
    }

    fn key(&self) -> Option<&'static str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Timestamp => Some("timestamp"),
            Segment::Level => Some("level"),
            Segment::AppName => Some("app_name"),
            Segment::Message => Some("message"),
            Segment::Field(field) => Some(field.key()),
        }
    }
}

/// Pre-parsed plain message layout
///
/// # Example
///
/// ```
/// use discord_logger::{FieldFlags, MessageTemplate};
///
/// let template = MessageTemplate::from_fields(FieldFlags::all());
/// assert_eq!(
///     template.to_string(),
///     "{timestamp}::**{level}**::{app_name}::{thread_name}::{process_name}\
///      ::{func_name}::{module_name}:{line_number}:: {message}"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    segments: Vec<Segment>,
}

impl MessageTemplate {
    /// Default layout for a set of enabled fields.
    ///
    /// The line number is glued to the preceding field with a single colon.
    pub fn from_fields(fields: FieldFlags) -> Self {
        let mut template = Self {
            segments: Vec::with_capacity(16),
        };
        template.push(Segment::Timestamp);
        template.push_literal("::**");
        template.push(Segment::Level);
        template.push_literal("**::");
        template.push(Segment::AppName);
        for field in OptionalField::ORDER {
            if field == OptionalField::Line || !fields.is_enabled(field) {
                continue;
            }
            template.push_literal("::");
            template.push(Segment::Field(field));
        }
        if fields.line_number {
            template.push_literal(":");
            template.push(Segment::Field(OptionalField::Line));
        }
        template.push_literal(":: ");
        template.push(Segment::Message);
        template
    }

    /// Parse a `{placeholder}` template; `{{` and `}}` escape braces.
    pub fn parse(template: &str) -> Result<Self> {
        let mut parsed = Self {
            segments: Vec::new(),
        };
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut key = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') | None => {
                                return Err(LoggerError::template(format!(
                                    "unterminated placeholder '{{{}'",
                                    key
                                )))
                            }
                            Some(ch) => key.push(ch),
                        }
                    }
                    let segment = Segment::from_key(&key).ok_or_else(|| {
                        LoggerError::template(format!("unknown placeholder '{{{}}}'", key))
                    })?;
                    if !literal.is_empty() {
                        parsed.push_literal(&std::mem::take(&mut literal));
                    }
                    parsed.push(segment);
                }
                '}' => return Err(LoggerError::template("single '}' encountered")),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            parsed.push_literal(&literal);
        }
        Ok(parsed)
    }

    fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    fn push_literal(&mut self, text: &str) {
        if let Some(Segment::Literal(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Literal(text.to_string()));
        }
    }

    /// Optional fields referenced by this template
    pub fn required_fields(&self) -> FieldFlags {
        let mut flags = FieldFlags::none();
        for segment in &self.segments {
            if let Segment::Field(field) = segment {
                flags.set(*field, true);
            }
        }
        flags
    }

    /// Render the template with a record's values
    pub fn render(&self, record: &LogRecord) -> Result<String> {
        let mut out = String::with_capacity(64 + record.message.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Timestamp => {
                    out.push_str(&record.timestamp.format(MESSAGE_TIMESTAMP_FORMAT).to_string())
                }
                Segment::Level => out.push_str(record.level.to_str()),
                Segment::AppName => out.push_str(&record.app_name),
                Segment::Message => out.push_str(&record.message),
                Segment::Field(field) => {
                    let value = record
                        .field_value(*field)
                        .ok_or(LoggerError::MissingField(field.key()))?;
                    out.push_str(&value);
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => {
                    f.write_str(&text.replace('{', "{{").replace('}', "}}"))?
                }
                placeholder => {
                    if let Some(key) = placeholder.key() {
                        write!(f, "{{{}}}", key)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub author: EmbedAuthor,
    pub footer: EmbedFooter,
    pub color: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

impl Embed {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }
}

/// Sender overrides applied to every payload of a logger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookIdentity {
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

/// JSON body POSTed to the webhook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WirePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl WirePayload {
    fn with_identity(mut self, identity: &WebhookIdentity) -> Self {
        self.username = identity.username.clone();
        self.avatar_url = identity.avatar_url.clone();
        self
    }

    pub fn embed(&self) -> Option<&Embed> {
        self.embeds.first()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// How a logger renders its records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadFormat {
    Embedded,
    Message(MessageTemplate),
}

impl PayloadFormat {
    pub fn new(payload_type: PayloadType, fields: FieldFlags) -> Self {
        match payload_type {
            PayloadType::Embedded => PayloadFormat::Embedded,
            PayloadType::Message => PayloadFormat::Message(MessageTemplate::from_fields(fields)),
        }
    }

    pub fn payload_type(&self) -> PayloadType {
        match self {
            PayloadFormat::Embedded => PayloadType::Embedded,
            PayloadFormat::Message(_) => PayloadType::Message,
        }
    }
}

/// Build the embed for a record
pub fn format_payload_embedded(record: &LogRecord) -> Embed {
    let fields = record
        .optional_fields()
        .into_iter()
        .map(|(field, value)| EmbedField {
            name: field.display_name().to_string(),
            value,
            inline: true,
        })
        .collect();

    Embed {
        title: record.level.to_str().to_string(),
        description: record.message.clone(),
        author: EmbedAuthor {
            name: record.app_name.clone(),
        },
        footer: EmbedFooter {
            text: footer_text(),
        },
        color: record.level.color().value(),
        timestamp: record.timestamp.with_timezone(&Utc),
        fields,
    }
}

/// Render a record as a plain message
pub fn format_payload_message(record: &LogRecord, template: &MessageTemplate) -> Result<String> {
    template.render(record)
}

/// Build the full webhook body for a record
pub fn format_payload(
    record: &LogRecord,
    format: &PayloadFormat,
    identity: &WebhookIdentity,
) -> Result<WirePayload> {
    let payload = match format {
        PayloadFormat::Embedded => WirePayload {
            embeds: vec![format_payload_embedded(record)],
            ..WirePayload::default()
        },
        PayloadFormat::Message(template) => WirePayload {
            content: Some(format_payload_message(record, template)?),
            ..WirePayload::default()
        },
    };
    Ok(payload.with_identity(identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::LogLevel;
    use chrono::{Local, TimeZone};

    fn record() -> LogRecord {
        let ts = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let mut record = LogRecord::new(LogLevel::Info, "TestApp", "Test message", ts);
        record.thread_name = Some("Thread1".to_string());
        record.process_name = Some("Process1".to_string());
        record.line_number = Some(10);
        record.func_name = Some("test_func".to_string());
        record.module_name = Some("test_module".to_string());
        record
    }

    #[test]
    fn test_payload_type_parse() {
        assert_eq!("EMBEDDED".parse::<PayloadType>().unwrap(), PayloadType::Embedded);
        assert_eq!(PayloadType::try_from(0i64).unwrap(), PayloadType::Message);
        assert!(matches!(
            PayloadType::try_from(2i64),
            Err(LoggerError::UnsupportedPayloadType(_))
        ));
        assert!("embedded".parse::<PayloadType>().is_err());
    }

    #[test]
    fn test_default_template_without_fields() {
        let template = MessageTemplate::from_fields(FieldFlags::none());
        assert_eq!(
            template.to_string(),
            "{timestamp}::**{level}**::{app_name}:: {message}"
        );
        assert_eq!(template.required_fields(), FieldFlags::none());
    }

    #[test]
    fn test_line_number_attaches_with_single_colon() {
        let fields = FieldFlags {
            module_name: true,
            line_number: true,
            ..FieldFlags::none()
        };
        let template = MessageTemplate::from_fields(fields);
        assert_eq!(
            template.to_string(),
            "{timestamp}::**{level}**::{app_name}::{module_name}:{line_number}:: {message}"
        );

        let rendered = template.render(&record()).unwrap();
        assert!(rendered.ends_with("::TestApp::test_module:10:: Test message"));
    }

    #[test]
    fn test_render_custom_template() {
        let template = MessageTemplate::parse(
            "Level: {level}, App Name: {app_name}, Message: {message}, Timestamp: {timestamp}, \
             Thread Name: {thread_name}, Process Name: {process_name}, Line Number: {line_number}, \
             Function Name: {func_name}, Module Name: {module_name}",
        )
        .unwrap();
        let rendered = format_payload_message(&record(), &template).unwrap();
        assert_eq!(
            rendered,
            "Level: INFO, App Name: TestApp, Message: Test message, Timestamp: \
             2024-03-09 14:05:07, Thread Name: Thread1, Process Name: Process1, \
             Line Number: 10, Function Name: test_func, Module Name: test_module"
        );
    }

    #[test]
    fn test_template_parse_errors() {
        assert!(matches!(
            MessageTemplate::parse("{nope}"),
            Err(LoggerError::Template(_))
        ));
        assert!(MessageTemplate::parse("{level").is_err());
        assert!(MessageTemplate::parse("level}").is_err());
        let escaped = MessageTemplate::parse("{{{level}}}").unwrap();
        assert_eq!(escaped.render(&record()).unwrap(), "{INFO}");
        assert_eq!(escaped.to_string(), "{{{level}}}");
    }

    #[test]
    fn test_render_missing_field() {
        let template = MessageTemplate::parse("{message} @ {thread_name}").unwrap();
        let bare = LogRecord::new(LogLevel::Info, "App", "m", Local::now());
        assert!(matches!(
            template.render(&bare),
            Err(LoggerError::MissingField("thread_name"))
        ));
    }

    #[test]
    fn test_embedded_payload() {
        let embed = format_payload_embedded(&record());
        assert_eq!(embed.title, "INFO");
        assert_eq!(embed.description, "Test message");
        assert_eq!(embed.author.name, "TestApp");
        assert_eq!(embed.footer.text, format!("Discord-Logger {}", VERSION));
        assert_eq!(embed.color, 0x1974D2);
        assert_eq!(embed.timestamp, record().timestamp.with_timezone(&Utc));

        let names: Vec<_> = embed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Thread", "Process", "Function", "Module", "Line"]);
        assert_eq!(embed.field("Line"), Some("10"));
        assert!(embed.fields.iter().all(|f| f.inline));
    }

    #[test]
    fn test_embedded_skips_absent_fields() {
        let mut partial = record();
        partial.thread_name = None;
        partial.func_name = None;
        let embed = format_payload_embedded(&partial);
        let names: Vec<_> = embed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Process", "Module", "Line"]);
    }

    #[test]
    fn test_wire_json_shape() {
        let identity = WebhookIdentity {
            username: Some("bot".to_string()),
            avatar_url: None,
        };
        let payload = format_payload(&record(), &PayloadFormat::Embedded, &identity).unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert!(json.get("content").is_none());
        assert_eq!(json["username"], "bot");
        assert!(json.get("avatar_url").is_none());
        assert_eq!(json["embeds"][0]["color"], 0x1974D2);
        assert_eq!(json["embeds"][0]["author"]["name"], "TestApp");
        assert_eq!(json["embeds"][0]["fields"][4]["name"], "Line");

        let format = PayloadFormat::new(PayloadType::Message, FieldFlags::none());
        let payload = format_payload(&record(), &format, &WebhookIdentity::default()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(
            json["content"],
            "2024-03-09 14:05:07::**INFO**::TestApp:: Test message"
        );
        assert!(json.get("embeds").is_none());
    }
}
