//! Error types for reviewlens

use std::path::PathBuf;

/// Result type alias using reviewlens' Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for reviewlens operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Classifier protocol errors (unparseable stage output, etc.)
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Generative backend errors (transport failures, non-success status)
    #[error("backend error: {0}")]
    Backend(String),

    /// Timeout errors
    #[error("operation timed out")]
    Timeout,

    /// Input file does not exist
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Required column absent from a loaded table
    #[error("missing column '{0}'")]
    MissingColumn(String),

    /// Spreadsheet / CSV read or write errors
    #[error("table error: {0}")]
    Table(String),

    /// Malformed label-set encoding
    #[error("label parse error: {0}")]
    LabelParse(String),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a new table error
    pub fn table(msg: impl Into<String>) -> Self {
        Self::Table(msg.into())
    }

    /// Create a new label parse error
    pub fn label_parse(msg: impl Into<String>) -> Self {
        Self::LabelParse(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
