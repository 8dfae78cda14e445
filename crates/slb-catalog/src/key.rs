//! Service identity

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Normalized identity of a service
///
/// Always lowercase. The store treats service names case-insensitively, so
/// every lookup, set membership test and ordering in the workspace goes
/// through this type rather than the display name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceKey(String);

impl ServiceKey {
    /// Create key from any spelling of a service name
    #[inline]
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_lowercase())
    }

    /// Key as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ServiceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<&String> for ServiceKey {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for ServiceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
