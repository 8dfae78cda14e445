//! Error types for store access
//!
//! Only structural failures surface as [`ProviderError`]. Optional attributes
//! that cannot be read are reported by the store as absent values instead.

use std::path::PathBuf;

/// Errors raised by an external store collaborator
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The store (or one of its fixed roots) cannot be opened
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A value read failed for a reason other than absence
    #[error("failed to read {key}\\{value}: {message}")]
    ReadFailed {
        /// Key the value lives under
        key: String,
        /// Value name
        value: String,
        /// Provider message
        message: String,
    },

    /// Running-status query failed
    #[error("status query failed for {service}: {message}")]
    StatusQuery {
        /// Service queried
        service: String,
        /// Provider message
        message: String,
    },

    /// IO error while reading a store export
    #[error("io error reading {path}: {source}")]
    Io {
        /// Export path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Store export is not valid
    #[error("malformed store snapshot {path}: {source}")]
    Malformed {
        /// Export path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

impl ProviderError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create read failure for a key/value pair
    pub fn read_failed(
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ReadFailed {
            key: key.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}
