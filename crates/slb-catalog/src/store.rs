//! External collaborators
//!
//! The engine never talks to the operating system directly. Everything it
//! needs from the configuration store, the service controller and the file
//! system comes through these traits.

use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Address of a key under the fixed store root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// `Services\<name>`
    Service(String),

    /// `Control\Class\<class id>`
    DeviceClass(String),
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service(name) => write!(f, "Services\\{name}"),
            Self::DeviceClass(id) => write!(f, "Control\\Class\\{id}"),
        }
    }
}

/// Typed value read from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreValue {
    /// 32-bit number
    Dword(u32),

    /// Plain string
    String(String),

    /// String with unexpanded `%VAR%` references
    ExpandString(String),

    /// Ordered string list
    MultiString(Vec<String>),
}

impl StoreValue {
    /// Numeric value, if this is a dword
    #[inline]
    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Dword(v) => Some(*v),
            _ => None,
        }
    }

    /// String value, for either string flavour
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::ExpandString(s) => Some(s),
            _ => None,
        }
    }

    /// List value; a single string reads as a one-element list
    #[must_use]
    pub fn to_list(&self) -> Option<Vec<String>> {
        match self {
            Self::MultiString(items) => Some(items.clone()),
            Self::String(s) | Self::ExpandString(s) => Some(vec![s.clone()]),
            Self::Dword(_) => None,
        }
    }
}

/// Hierarchical configuration store
pub trait ServiceStore: Send + Sync {
    /// Raw service identifiers under the services root, in store order
    ///
    /// Failure here is fatal for the run.
    fn enumerate_services(&self) -> Result<Vec<String>, ProviderError>;

    /// Device-class identifiers under the class root, in store order
    fn enumerate_device_classes(&self) -> Result<Vec<String>, ProviderError>;

    /// Read one named value
    ///
    /// `Ok(None)` means the value (or its key) does not exist.
    fn read_value(&self, key: &StoreKey, name: &str) -> Result<Option<StoreValue>, ProviderError>;
}

/// Live status of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Currently running
    Running,

    /// Stopped, paused or pending
    NotRunning,
}

/// Live service status source
pub trait StatusProvider: Send + Sync {
    /// Query whether a service is running
    fn query_running_status(&self, service: &str) -> Result<RunStatus, ProviderError>;
}

/// File system existence checks
///
/// Paths are target-system paths (e.g. `c:\windows\system32\svchost.exe`),
/// not necessarily paths on the host running the planner.
pub trait FileProbe: Send + Sync {
    /// Check whether a path exists
    fn exists(&self, path: &str) -> bool;
}

/// Publisher metadata embedded in executables
pub trait MetadataSource: Send + Sync {
    /// Read a version-resource string attribute (e.g. `CompanyName`)
    ///
    /// `Ok(None)` when the binary has no such attribute.
    fn resolve_vendor(&self, path: &str, attribute: &str) -> Result<Option<String>, ProviderError>;
}
