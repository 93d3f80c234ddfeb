use std::path::PathBuf;

/// Errors that can occur while loading, editing or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration path does not exist.
    #[error("configuration path doesn't exist: {}", .0.display())]
    NotFound(PathBuf),

    /// The configuration path exists but is not a regular file.
    #[error("configuration path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Reading the configuration file failed.
    #[error("error reading configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing the configuration file failed.
    #[error("error writing configuration {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The requested on-disk format is not supported.
    #[error("configuration format not supported: {0}")]
    UnsupportedFormat(String),

    /// Only objects and arrays can be written as documents.
    #[error("expected an object or array, {0} given")]
    NotStructured(&'static str),

    /// The document is not valid JSON, or a row does not match its shape.
    #[error("error decoding JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A path segment could not be traversed.
    #[error("path not traversable, key not found: {0}")]
    KeyNotFound(String),

    /// The final key is absent.
    #[error("not found: {0}")]
    MissingKey(String),

    /// The value could not be stored under the key.
    #[error("setting key '{key}' failed: {reason}")]
    SetFailed { key: String, reason: &'static str },

    /// A row failed validation.
    #[error("invalid {entity} {id}: {field} {message}")]
    Validation {
        entity: &'static str,
        id: u16,
        field: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
