//! Error types for cxsheet.
//!
//! The library reports failures through [`CxSheetError`]; the binary wraps it
//! with `anyhow` context at the command layer.

use std::path::PathBuf;

use crate::api::ResourceKind;
use crate::convert::SchemaReport;

/// Every failure the conversion and submission pipeline can report.
#[derive(Debug, thiserror::Error)]
pub enum CxSheetError {
    /// Required columns are missing or hold values of the wrong type.
    #[error("{0}")]
    Schema(SchemaReport),

    /// Invalid build mode, agent path or configuration file.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A display name has no counterpart in the remote agent.
    #[error("{kind} not found: [{display_name}]{}", suggestion_suffix(.suggestion))]
    Lookup {
        kind: ResourceKind,
        display_name: String,
        suggestion: Option<String>,
    },

    /// Malformed JSON in a cell, or a built document the typed model rejects.
    #[error("parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// Any failed call to the agent, sheets, drive or token endpoints.
    #[error("remote service error during {operation}{}: {message}", status_suffix(.status))]
    Remote {
        operation: String,
        status: Option<u16>,
        message: String,
    },

    /// Local file access failed.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A spreadsheet file could not be read or written.
    #[error("table error: {0}")]
    Table(String),
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, CxSheetError>;

impl CxSheetError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn parse(context: impl Into<String>, msg: impl std::fmt::Display) -> Self {
        Self::Parse {
            context: context.into(),
            message: msg.to_string(),
        }
    }

    pub fn remote(operation: impl Into<String>, msg: impl std::fmt::Display) -> Self {
        Self::Remote {
            operation: operation.into(),
            status: None,
            message: msg.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn table(msg: impl std::fmt::Display) -> Self {
        Self::Table(msg.to_string())
    }

    /// Errors that skip a single item instead of aborting a batch.
    pub fn is_item_level(&self) -> bool {
        matches!(self, Self::Lookup { .. })
    }
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean [{}]?)", s),
        None => String::new(),
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}
