//! Log level and level color definitions

use super::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum LogLevel {
    NotSet = 0,
    Debug = 10,
    #[default]
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::NotSet,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::NotSet => "NOTSET",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Numeric severity of the level
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Parse a level from its exact upper-case name
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "NOTSET" => Ok(LogLevel::NotSet),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => Err(LoggerError::InvalidLevelName(name.to_string())),
        }
    }

    /// Parse a level from its numeric severity
    pub fn from_value(value: i64) -> Result<Self> {
        match value {
            0 => Ok(LogLevel::NotSet),
            10 => Ok(LogLevel::Debug),
            20 => Ok(LogLevel::Info),
            30 => Ok(LogLevel::Warning),
            40 => Ok(LogLevel::Error),
            50 => Ok(LogLevel::Critical),
            _ => Err(LoggerError::InvalidLevelValue(value)),
        }
    }

    pub fn color(&self) -> LevelColor {
        LevelColor::for_level(*self)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        LogLevel::from_name(s)
    }
}

impl TryFrom<i64> for LogLevel {
    type Error = LoggerError;

    fn try_from(value: i64) -> Result<Self> {
        LogLevel::from_value(value)
    }
}

/// Anything a caller may pass where a level is expected.
///
/// Conversion is the validation boundary: an unknown name or value fails
/// here, before a logger does any other work.
pub trait IntoLogLevel {
    fn into_level(self) -> Result<LogLevel>;
}

impl IntoLogLevel for LogLevel {
    #[inline]
    fn into_level(self) -> Result<LogLevel> {
        Ok(self)
    }
}

impl IntoLogLevel for &str {
    fn into_level(self) -> Result<LogLevel> {
        LogLevel::from_name(self)
    }
}

impl IntoLogLevel for String {
    fn into_level(self) -> Result<LogLevel> {
        LogLevel::from_name(&self)
    }
}

impl IntoLogLevel for &String {
    fn into_level(self) -> Result<LogLevel> {
        LogLevel::from_name(self)
    }
}

impl IntoLogLevel for i64 {
    fn into_level(self) -> Result<LogLevel> {
        LogLevel::from_value(self)
    }
}

impl IntoLogLevel for i32 {
    fn into_level(self) -> Result<LogLevel> {
        LogLevel::from_value(i64::from(self))
    }
}

impl IntoLogLevel for u8 {
    fn into_level(self) -> Result<LogLevel> {
        LogLevel::from_value(i64::from(self))
    }
}

/// Embed color attached to each level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelColor {
    NotSet,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LevelColor {
    pub fn for_level(level: LogLevel) -> Self {
        match level {
            LogLevel::NotSet => LevelColor::NotSet,
            LogLevel::Debug => LevelColor::Debug,
            LogLevel::Info => LevelColor::Info,
            LogLevel::Warning => LevelColor::Warning,
            LogLevel::Error => LevelColor::Error,
            LogLevel::Critical => LevelColor::Critical,
        }
    }

    /// Look up a color by level name (case-sensitive)
    pub fn from_name(name: &str) -> Result<Self> {
        LogLevel::from_name(name).map(LevelColor::for_level)
    }

    /// Hex representation without the leading `#`
    pub fn hex(&self) -> &'static str {
        match self {
            LevelColor::NotSet => "000000",
            LevelColor::Debug => "D5EAD8",
            LevelColor::Info => "1974D2",
            LevelColor::Warning => "FFE135",
            // Error and Critical share the same red
            LevelColor::Error | LevelColor::Critical => "C90913",
        }
    }

    /// Integer form used by the webhook API
    pub fn value(&self) -> u32 {
        match self {
            LevelColor::NotSet => 0x000000,
            LevelColor::Debug => 0xD5EAD8,
            LevelColor::Info => 0x1974D2,
            LevelColor::Warning => 0xFFE135,
            LevelColor::Error | LevelColor::Critical => 0xC90913,
        }
    }
}

impl fmt::Display for LevelColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::NotSet < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Critical);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert!(matches!(
            "warning".parse::<LogLevel>(),
            Err(LoggerError::InvalidLevelName(_))
        ));
        assert!("WARN".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_from_value() {
        assert_eq!(LogLevel::try_from(40i64).unwrap(), LogLevel::Error);
        assert!(matches!(
            LogLevel::from_value(45),
            Err(LoggerError::InvalidLevelValue(45))
        ));
        assert!(LogLevel::from_value(-10).is_err());
    }

    #[test]
    fn test_into_level() {
        assert_eq!(LogLevel::Debug.into_level().unwrap(), LogLevel::Debug);
        assert_eq!("CRITICAL".into_level().unwrap(), LogLevel::Critical);
        assert_eq!(20_i32.into_level().unwrap(), LogLevel::Info);
        assert_eq!(String::from("NOTSET").into_level().unwrap(), LogLevel::NotSet);
        assert!(7_u8.into_level().is_err());
    }

    #[test]
    fn test_colors() {
        assert_eq!(LevelColor::for_level(LogLevel::Info).hex(), "1974D2");
        assert_eq!(LogLevel::Error.color(), LevelColor::Error);
        assert_eq!(LevelColor::Error.hex(), LevelColor::Critical.hex());
        assert_eq!(LevelColor::Warning.value(), 0xFFE135);
        assert_eq!(LevelColor::from_name("DEBUG").unwrap().hex(), "D5EAD8");
        assert!(LevelColor::from_name("Debug").is_err());
    }

    #[test]
    fn test_color_value_matches_hex() {
        for level in LogLevel::ALL {
            let color = level.color();
            assert_eq!(u32::from_str_radix(color.hex(), 16).unwrap(), color.value());
        }
    }

    #[test]
    fn test_serde_uses_names() {
        let json = serde_json::to_string(&LogLevel::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
        let level: LogLevel = serde_json::from_str("\"NOTSET\"").unwrap();
        assert_eq!(level, LogLevel::NotSet);
    }
}
