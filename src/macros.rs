//! Logging macros with `format!` arguments and call-site capture.
//!
//! Unlike the plain [`Logger`](crate::Logger) methods, the macros record
//! the name of the enclosing function, so `embed_func_name` shows
//! something better than `<unknown>`.
//!
//! # Examples
//!
//! ```
//! use discord_logger::prelude::*;
//! use discord_logger::transports::MemoryTransport;
//! use discord_logger::{error, info};
//! use std::sync::Arc;
//!
//! let dispatcher = Dispatcher::spawn(
//!     Arc::new(MemoryTransport::new()),
//!     DispatcherConfig::default().handle_signals(false),
//! )
//! .unwrap();
//! let logger = Logger::builder("Server")
//!     .webhook_url("https://discord.com/api/webhooks/1/token")
//!     .dispatcher(Arc::new(dispatcher))
//!     .build()
//!     .unwrap();
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! error!(logger, "Upstream {} refused the connection", "db-1");
//! ```

/// Log at any level accepted by [`IntoLogLevel`](crate::IntoLogLevel).
///
/// Evaluates to `Result<()>`: an unknown level name or value is an error
/// and nothing is logged. The message is only formatted when the level
/// passes the logger's threshold.
///
/// ```
/// # use discord_logger::prelude::*;
/// # use discord_logger::transports::MemoryTransport;
/// # use std::sync::Arc;
/// # let dispatcher = Dispatcher::spawn(
/// #     Arc::new(MemoryTransport::new()),
/// #     DispatcherConfig::default().handle_signals(false),
/// # ).unwrap();
/// # let logger = Logger::builder("App")
/// #     .webhook_url("https://discord.com/api/webhooks/1/token")
/// #     .dispatcher(Arc::new(dispatcher))
/// #     .build()
/// #     .unwrap();
/// use discord_logger::log;
/// log!(logger, LogLevel::Info, "Simple message").unwrap();
/// log!(logger, "ERROR", "Error code: {}", 500).unwrap();
/// assert!(log!(logger, 25, "not a level").is_err());
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        match $crate::IntoLogLevel::into_level($level) {
            ::std::result::Result::Ok(level) => {
                let logger = &$logger;
                if logger.is_enabled_for(level) {
                    logger.log_at(level, format!($($arg)+), $crate::call_site!());
                }
                ::std::result::Result::Ok::<(), $crate::LoggerError>(())
            }
            ::std::result::Result::Err(e) => ::std::result::Result::Err::<(), $crate::LoggerError>(e),
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_fixed {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        if logger.is_enabled_for($level) {
            logger.log_at($level, format!($($arg)+), $crate::call_site!());
        }
    }};
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_fixed!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_fixed!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_fixed!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_fixed!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_fixed!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}

/// [`CallSite`](crate::CallSite) of the macro invocation
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(file!(), line!(), $crate::function_name!())
    };
}

/// Name of the enclosing function, without its module path
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::macros::short_function_name(__type_name_of(__here))
    }};
}

/// Strip the helper suffix, closure frames and module path from a
/// `type_name` produced inside [`function_name!`].
#[doc(hidden)]
pub fn short_function_name(path: &'static str) -> &'static str {
    let mut path = path.strip_suffix("::__here").unwrap_or(path);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path.rsplit("::").next().unwrap_or(path)
}
