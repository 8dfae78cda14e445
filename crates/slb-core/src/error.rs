//! Error types for a run
//!
//! Every variant aborts the run with exit status 1. Conflicts and vendor
//! warnings carry their full diagnosis so nothing is reported piecemeal.

use slb_catalog::ProviderError;
use slb_plan::WriteError;
use slb_resolve::ConflictReport;
use slb_vendor::VendorReview;
use std::path::PathBuf;

/// Hint printed with a vendor warning
pub const VENDOR_WARNING_HINT: &str =
    "edit the config or use --disable-service-warning to suppress this warning if this is intentional";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file does not exist
    #[error("config file {} not found", .0.display())]
    NotFound(PathBuf),

    /// Config file could not be read
    #[error("io error reading {}: {source}", .path.display())]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Not valid TOML for a run config
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed but unusable
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create invalid-config error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Main run error type
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Store unreadable
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Config missing or malformed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Dependency validation failed
    #[error(transparent)]
    Conflict(#[from] ConflictReport),

    /// Candidates include third-party or unidentified services
    #[error("{0}. are you sure you want to disable these?")]
    VendorWarning(VendorReview),

    /// Scripts could not be written
    #[error("failed to write scripts: {0}")]
    Write(#[from] WriteError),

    /// Dependency query for a service that isn't installed
    #[error("{0} not exists as a service")]
    UnknownService(String),
}

impl RunError {
    /// Process exit status for this error
    #[inline]
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Operator hint, if the error has one
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::VendorWarning(_) => Some(VENDOR_WARNING_HINT),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_warning_message() {
        let err = RunError::VendorWarning(VendorReview::default());
        assert_eq!(
            err.to_string(),
            "0 non-Windows services detected, 0 service vendors are unknown. are you sure you want to disable these?"
        );
        assert_eq!(err.hint(), Some(VENDOR_WARNING_HINT));
    }

    #[test]
    fn conflict_is_transparent() {
        let err = RunError::from(ConflictReport::default());
        assert!(err.to_string().starts_with("dependency validation failed"));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.hint(), None);
    }

    #[test]
    fn config_not_found_message() {
        let err = ConfigError::NotFound(PathBuf::from("lists.toml"));
        assert_eq!(err.to_string(), "config file lists.toml not found");
    }
}
