//! Kernel-mode / user-mode classification
//!
//! The store records a numeric `Type` code per service. Whether a code denotes
//! a user-mode service is decided by a [`ServiceTypeTable`] handed in by the
//! caller, so tests and configuration can substitute their own code set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Type codes that denote user-mode services
///
/// Own-process (16), shared-process (32), user own/share (80, 96) and their
/// interactive variants (272, 288).
pub const DEFAULT_USER_MODE_TYPES: [u32; 6] = [16, 32, 80, 96, 272, 288];

/// Execution privilege level of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    /// Drivers and anything not listed as user-mode
    KernelMode,

    /// Service processes
    UserMode,
}

impl ServiceKind {
    /// Check for user-mode
    #[inline]
    #[must_use]
    pub fn is_user_mode(self) -> bool {
        matches!(self, Self::UserMode)
    }
}

/// Set of raw type codes classified as user-mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTypeTable {
    user_mode: BTreeSet<u32>,
}

impl ServiceTypeTable {
    /// Create table from explicit user-mode codes
    #[must_use]
    pub fn new(user_mode: impl IntoIterator<Item = u32>) -> Self {
        Self {
            user_mode: user_mode.into_iter().collect(),
        }
    }

    /// Classify a raw type code
    ///
    /// A missing code is never user-mode.
    #[inline]
    #[must_use]
    pub fn classify(&self, type_code: Option<u32>) -> ServiceKind {
        match type_code {
            Some(code) if self.user_mode.contains(&code) => ServiceKind::UserMode,
            _ => ServiceKind::KernelMode,
        }
    }
}

impl Default for ServiceTypeTable {
    fn default() -> Self {
        Self::new(DEFAULT_USER_MODE_TYPES)
    }
}
