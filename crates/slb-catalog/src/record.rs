//! Normalized service entry

use crate::key::ServiceKey;
use crate::kind::ServiceKind;
use serde::{Deserialize, Serialize};

/// One service as seen in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Canonical display name
    pub name: String,

    /// Normalized identity (`name` lowercased)
    pub key: ServiceKey,

    /// Kernel-mode or user-mode
    pub kind: ServiceKind,

    /// Raw type code, if configured
    pub type_code: Option<u32>,

    /// Configured start value; `None` means "not configured"
    pub start: Option<u32>,

    /// Referenced service names, in store order
    ///
    /// Entries may name services that don't exist.
    pub depends_on: Vec<String>,

    /// Unresolved image path
    pub image_path: Option<String>,
}

impl ServiceRecord {
    /// Create record with no optional attributes
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ServiceKind) -> Self {
        let name = name.into();
        Self {
            key: ServiceKey::new(&name),
            name,
            kind,
            type_code: None,
            start: None,
            depends_on: Vec::new(),
            image_path: None,
        }
    }

    /// With image path
    #[inline]
    #[must_use]
    pub fn with_image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Dependency keys in store order
    pub fn dependency_keys(&self) -> impl Iterator<Item = ServiceKey> + '_ {
        self.depends_on.iter().map(|d| ServiceKey::new(d))
    }
}
