//! Structured, log-friendly view of an error.

use serde::Serialize;

use crate::{ExtError, Trace};

/// Provide a structured view of an error for logging.
///
/// Implementors expose a lightweight set of serializable fields; callers can
/// choose between the raw fields, a `serde_json::Value`, or a pretty JSON
/// string for human consumption.
pub trait PrettyDebug {
    type Fields<'a>: Serialize + 'a
    where
        Self: 'a;

    fn fields(&self) -> Self::Fields<'_>;

    /// Convert fields to a JSON value without pretty whitespace.
    fn to_value(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self.fields()).ok()
    }

    /// Convert fields to a pretty JSON string (for logs or UI).
    fn pretty_json(&self) -> Option<String> {
        serde_json::to_string_pretty(&self.fields()).ok()
    }

    /// Emit a tracing event with both the Display string and the JSON fields.
    #[cfg(feature = "tracing")]
    fn emit_tracing(&self, level: tracing::Level, message: &str)
    where
        Self: std::fmt::Display,
    {
        let fields = self.to_value().unwrap_or_default();
        match level {
            tracing::Level::ERROR => {
                tracing::event!(tracing::Level::ERROR, error = %self, %fields, "{message}")
            }
            tracing::Level::WARN => {
                tracing::event!(tracing::Level::WARN, error = %self, %fields, "{message}")
            }
            tracing::Level::INFO => {
                tracing::event!(tracing::Level::INFO, error = %self, %fields, "{message}")
            }
            tracing::Level::DEBUG => {
                tracing::event!(tracing::Level::DEBUG, error = %self, %fields, "{message}")
            }
            _ => {
                tracing::event!(tracing::Level::TRACE, error = %self, %fields, "{message}")
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorFields<'a> {
    pub message: &'a str,
    pub alt_message: &'a str,
    pub code: i64,
    pub trace: &'a Trace,
}

impl PrettyDebug for ExtError {
    type Fields<'a> = ErrorFields<'a>;

    fn fields(&self) -> Self::Fields<'_> {
        ErrorFields {
            message: self.message(),
            alt_message: self.alt_message(),
            code: self.code(),
            trace: self.trace(),
        }
    }
}
