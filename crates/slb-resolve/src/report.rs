//! Conflict report
//!
//! Everything the validator found wrong with a selection, plus the fixes an
//! operator can apply to the configuration. The validator never resolves
//! conflicts on its own.

use slb_catalog::{ServiceCatalog, ServiceKey};
use std::collections::{BTreeMap, BTreeSet};

/// Map from a service to the services it relates to
pub type ConflictMap = BTreeMap<ServiceKey, BTreeSet<ServiceKey>>;

/// Full diagnosis of a failed validation
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error(
    "dependency validation failed: {} missing dependencies, {} required-by conflicts",
    .missing_dependencies.len(),
    .required_by.len()
)]
pub struct ConflictReport {
    /// Service → user-mode dependencies that are not staying enabled
    pub missing_dependencies: ConflictMap,

    /// Service slated for disabling → still-enabled services that need it
    pub required_by: ConflictMap,

    /// Suggested configuration changes, sorted
    pub remediations: Vec<Remediation>,
}

impl ConflictReport {
    /// Check if no conflicts were found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missing_dependencies.is_empty() && self.required_by.is_empty()
    }

    /// Human-readable diagnostics, grouped by category
    ///
    /// Missing dependencies first, then required-by conflicts, then
    /// remediations; each group in service-name order.
    #[must_use]
    pub fn diagnostics(&self, catalog: &ServiceCatalog) -> Vec<ConflictDiagnostic> {
        let join = |keys: &BTreeSet<ServiceKey>| {
            keys.iter()
                .map(|k| catalog.display_name(k))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let missing = self.missing_dependencies.iter().map(|(service, deps)| ConflictDiagnostic {
            category: ConflictCategory::MissingDependency,
            message: format!("{} depends on {}", catalog.display_name(service), join(deps)),
        });

        let required = self.required_by.iter().map(|(service, dependents)| ConflictDiagnostic {
            category: ConflictCategory::RequiredBy,
            message: format!(
                "{} is required by {}",
                catalog.display_name(service),
                join(dependents)
            ),
        });

        let fixes = self.remediations.iter().map(|fix| ConflictDiagnostic {
            category: ConflictCategory::Remediation,
            message: fix.describe(catalog),
        });

        missing.chain(required).chain(fixes).collect()
    }
}

/// Diagnostic category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConflictCategory {
    /// An enabled service needs something not on the allow-list
    MissingDependency,

    /// A disabled service is needed by one staying enabled
    RequiredBy,

    /// Suggested fix
    Remediation,
}

/// One diagnostic line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictDiagnostic {
    /// Category for grouping
    pub category: ConflictCategory,

    /// Message with display names
    pub message: String,
}

/// Configuration change that resolves a conflict
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Remediation {
    /// Add the service to the allow-list
    AddToEnabled(ServiceKey),

    /// Take the service off the deny-list
    RemoveFromIndividuallyDisabled(ServiceKey),
}

impl Remediation {
    /// Operator-facing description
    #[must_use]
    pub fn describe(&self, catalog: &ServiceCatalog) -> String {
        match self {
            Self::AddToEnabled(key) => format!(
                "add {} to [enabled_services] to fix dependency errors",
                catalog.display_name(key)
            ),
            Self::RemoveFromIndividuallyDisabled(key) => format!(
                "remove {} from [individual_disabled_services] to fix dependency errors",
                catalog.display_name(key)
            ),
        }
    }
}
