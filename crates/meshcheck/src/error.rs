//! Error types for loading mesh tables and configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::exchange::TableKind;

/// Why a single record could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("invalid integer `{value}` in field `{field}`")]
    InvalidInteger { field: &'static str, value: String },

    #[error("invalid number `{value}` in field `{field}`")]
    InvalidReal { field: &'static str, value: String },

    #[error("negative count {value} in field `{field}`")]
    NegativeCount { field: &'static str, value: i64 },

    #[error("{count} unexpected trailing field(s)")]
    TrailingFields { count: usize },
}

/// A record that did not match the layout of its table.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{table} line {line}: {kind}")]
pub struct ParseError {
    pub table: TableKind,
    /// 1-based line number in the source text, the header being line 1.
    pub line: usize,
    pub kind: ParseErrorKind,
}

/// Errors that stop a table or mesh from loading at all.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {table} table `{}`: {source}", .path.display())]
    Open {
        table: TableKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{table} table has no header line")]
    MissingHeader { table: TableKind },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors reading a `CheckConfig` from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type LoadResult<T> = Result<T, LoadError>;
