//! Log record structure and caller context capture

use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::panic::Location;

// Thread-local cache for the thread name to avoid repeated allocations
thread_local! {
    static THREAD_NAME_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Get cached thread name, computing and caching it on first access.
///
/// Unnamed threads are reported by their id.
fn current_thread_name() -> String {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| {
                let thread = std::thread::current();
                match thread.name() {
                    Some(name) => name.to_string(),
                    None => format!("{:?}", thread.id()),
                }
            })
            .clone()
    })
}

static PROCESS_NAME: Lazy<String> = Lazy::new(|| {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| format!("process-{}", std::process::id()))
});

fn current_process_name() -> String {
    PROCESS_NAME.clone()
}

/// Caller context attachable to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionalField {
    Thread,
    Process,
    Function,
    Module,
    Line,
}

impl OptionalField {
    /// Display order used by both payload formats
    pub const ORDER: [OptionalField; 5] = [
        OptionalField::Thread,
        OptionalField::Process,
        OptionalField::Function,
        OptionalField::Module,
        OptionalField::Line,
    ];

    /// Label shown in embeds
    pub fn display_name(&self) -> &'static str {
        match self {
            OptionalField::Thread => "Thread",
            OptionalField::Process => "Process",
            OptionalField::Function => "Function",
            OptionalField::Module => "Module",
            OptionalField::Line => "Line",
        }
    }

    /// Placeholder key used in message templates
    pub fn key(&self) -> &'static str {
        match self {
            OptionalField::Thread => "thread_name",
            OptionalField::Process => "process_name",
            OptionalField::Function => "func_name",
            OptionalField::Module => "module_name",
            OptionalField::Line => "line_number",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        OptionalField::ORDER.into_iter().find(|field| field.key() == key)
    }
}

/// Set of optional fields a logger collects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldFlags {
    pub thread_name: bool,
    pub process_name: bool,
    pub func_name: bool,
    pub module_name: bool,
    pub line_number: bool,
}

impl FieldFlags {
    pub const fn none() -> Self {
        Self {
            thread_name: false,
            process_name: false,
            func_name: false,
            module_name: false,
            line_number: false,
        }
    }

    pub const fn all() -> Self {
        Self {
            thread_name: true,
            process_name: true,
            func_name: true,
            module_name: true,
            line_number: true,
        }
    }

    pub fn is_enabled(&self, field: OptionalField) -> bool {
        match field {
            OptionalField::Thread => self.thread_name,
            OptionalField::Process => self.process_name,
            OptionalField::Function => self.func_name,
            OptionalField::Module => self.module_name,
            OptionalField::Line => self.line_number,
        }
    }

    pub fn set(&mut self, field: OptionalField, enabled: bool) {
        match field {
            OptionalField::Thread => self.thread_name = enabled,
            OptionalField::Process => self.process_name = enabled,
            OptionalField::Function => self.func_name = enabled,
            OptionalField::Module => self.module_name = enabled,
            OptionalField::Line => self.line_number = enabled,
        }
    }

    #[must_use]
    pub fn with(mut self, field: OptionalField) -> Self {
        self.set(field, true);
        self
    }

    pub fn any(&self) -> bool {
        OptionalField::ORDER.iter().any(|f| self.is_enabled(*f))
    }

    /// Fields that need the call site rather than the runtime
    pub fn needs_call_site(&self) -> bool {
        self.func_name || self.module_name || self.line_number
    }
}

/// Source location of a logging call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub function: &'static str,
}

impl CallSite {
    /// Function name recorded when the call site was captured without macros
    pub const UNKNOWN_FUNCTION: &'static str = "<unknown>";

    pub const fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file,
            line,
            function,
        }
    }

    /// Capture the location of the nearest non-`#[track_caller]` frame
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line(), Self::UNKNOWN_FUNCTION)
    }

    /// File name of the call site without its directories
    pub fn module_name(&self) -> &'static str {
        self.file
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(self.file)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub app_name: String,
    pub message: String,
    pub timestamp: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub func_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
}

impl LogRecord {
    /// Record without optional fields
    pub fn new(
        level: LogLevel,
        app_name: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            level,
            app_name: app_name.into(),
            message: message.into(),
            timestamp,
            thread_name: None,
            process_name: None,
            line_number: None,
            func_name: None,
            module_name: None,
        }
    }

    /// Build a record stamped now, collecting exactly the enabled fields
    pub fn capture(
        level: LogLevel,
        app_name: &str,
        message: String,
        fields: FieldFlags,
        call_site: &CallSite,
    ) -> Self {
        let mut record = Self::new(level, app_name, message, Local::now());
        if fields.thread_name {
            record.thread_name = Some(current_thread_name());
        }
        if fields.process_name {
            record.process_name = Some(current_process_name());
        }
        if fields.needs_call_site() {
            if fields.func_name {
                record.func_name = Some(call_site.function.to_string());
            }
            if fields.module_name {
                record.module_name = Some(call_site.module_name().to_string());
            }
            if fields.line_number {
                record.line_number = Some(call_site.line);
            }
        }
        record
    }

    /// Flags of the optional fields this record carries
    pub fn present_fields(&self) -> FieldFlags {
        FieldFlags {
            thread_name: self.thread_name.is_some(),
            process_name: self.process_name.is_some(),
            func_name: self.func_name.is_some(),
            module_name: self.module_name.is_some(),
            line_number: self.line_number.is_some(),
        }
    }

    /// Rendered value of one optional field, if present
    pub fn field_value(&self, field: OptionalField) -> Option<String> {
        match field {
            OptionalField::Thread => self.thread_name.clone(),
            OptionalField::Process => self.process_name.clone(),
            OptionalField::Function => self.func_name.clone(),
            OptionalField::Module => self.module_name.clone(),
            OptionalField::Line => self.line_number.map(|line| line.to_string()),
        }
    }

    /// Present optional fields in display order
    pub fn optional_fields(&self) -> Vec<(OptionalField, String)> {
        OptionalField::ORDER
            .into_iter()
            .filter_map(|field| self.field_value(field).map(|value| (field, value)))
            .collect()
    }
}
