//! Disable-plan builder
//!
//! Turns a validated [`DisableSet`] into an [`ActionPlan`]. Every action is
//! emitted only when it changes something observable, so a fully applied
//! configuration yields [`PlanOutcome::NoOp`].
//!
//! Forward order:
//!
//! 1. rename targets (an `.exe` is killed right before its rename)
//! 2. filter-list rewrites, in store order
//! 3. start-value overrides, by service name

use crate::action::{Action, ActionPlan, PlanOutcome, DISABLED_START_VALUE};
use slb_catalog::{FileProbe, FilterTable, ServiceCatalog, ServiceKey};
use slb_resolve::DisableSet;
use std::fmt;
use tracing::{debug, info};

/// Default drive rename targets are probed on
pub const DEFAULT_SYSTEM_DRIVE: &str = "C:";

/// A binary to hide by renaming
///
/// Paths are drive-relative (`\Windows\System32\mobsync.exe`); the drive is
/// chosen when the script runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenameTarget(String);

impl RenameTarget {
    /// Create target from a drive-relative path
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Drive-relative path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.0
    }

    /// Final path component
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit(['\\', '/']).next().unwrap_or(&self.0)
    }

    /// Check for an `.exe` extension
    #[must_use]
    pub fn is_executable(&self) -> bool {
        self.file_name()
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("exe"))
    }

    /// Character appended to the file name to form the decoy
    ///
    /// `mobsync.exe` becomes `mobsync.exee`.
    #[must_use]
    pub fn decoy_suffix(&self) -> Option<char> {
        self.0.chars().last()
    }
}

impl fmt::Display for RenameTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RenameTarget {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Builds action plans against one catalog snapshot
pub struct PlanBuilder<'a> {
    catalog: &'a ServiceCatalog,
    filters: &'a FilterTable,
    probe: &'a dyn FileProbe,
    system_drive: String,
}

impl fmt::Debug for PlanBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanBuilder")
            .field("services", &self.catalog.len())
            .field("filters", &self.filters.len())
            .field("system_drive", &self.system_drive)
            .finish_non_exhaustive()
    }
}

impl<'a> PlanBuilder<'a> {
    /// Create builder
    #[must_use]
    pub fn new(catalog: &'a ServiceCatalog, filters: &'a FilterTable, probe: &'a dyn FileProbe) -> Self {
        Self {
            catalog,
            filters,
            probe,
            system_drive: DEFAULT_SYSTEM_DRIVE.to_string(),
        }
    }

    /// With drive rename targets are probed on
    #[must_use]
    pub fn with_system_drive(mut self, drive: impl Into<String>) -> Self {
        self.system_drive = drive.into();
        self
    }

    /// Build the plan
    #[must_use]
    pub fn build(&self, disable_set: &DisableSet, renames: &[RenameTarget]) -> PlanOutcome {
        let mut plan = ActionPlan::new();

        self.plan_renames(&mut plan, renames);
        self.plan_filters(&mut plan, disable_set);
        self.plan_start_values(&mut plan, disable_set);

        debug!(
            forward = plan.forward().len(),
            rollback = plan.rollback().len(),
            "plan built"
        );

        if plan.is_empty() {
            info!("there are no changes to write to the scripts");
        }

        plan.into()
    }

    fn plan_renames(&self, plan: &mut ActionPlan, renames: &[RenameTarget]) {
        for target in renames {
            let probed = format!("{}{}", self.system_drive, target.path());
            let Some(suffix) = target.decoy_suffix().filter(|_| self.probe.exists(&probed)) else {
                info!("item does not exist: {target}... skipping");
                continue;
            };

            let file_name = target.file_name();
            if target.is_executable() {
                plan.push_forward(Action::KillProcess {
                    image: file_name.to_string(),
                });
            }

            plan.push_pair(
                Action::Rename {
                    from: target.path().to_string(),
                    to: format!("{file_name}{suffix}"),
                },
                Action::Rename {
                    from: format!("{}{suffix}", target.path()),
                    to: file_name.to_string(),
                },
            );
        }
    }

    fn plan_filters(&self, plan: &mut ActionPlan, disable_set: &DisableSet) {
        for entry in self.filters.entries() {
            let kept: Vec<String> = entry
                .drivers
                .iter()
                .filter(|driver| !disable_set.contains(&ServiceKey::new(driver.as_str())))
                .cloned()
                .collect();

            if kept.len() == entry.drivers.len() {
                continue;
            }

            plan.push_pair(
                Action::SetFilterList {
                    class_id: entry.class_id.clone(),
                    kind: entry.kind,
                    drivers: kept,
                },
                Action::SetFilterList {
                    class_id: entry.class_id.clone(),
                    kind: entry.kind,
                    drivers: entry.drivers.clone(),
                },
            );
        }
    }

    fn plan_start_values(&self, plan: &mut ActionPlan, disable_set: &DisableSet) {
        // keys are lowercase, so key order is case-insensitive name order
        for key in disable_set {
            let Some(record) = self.catalog.get(key) else {
                continue;
            };
            let Some(original) = record.start else {
                debug!(service = %record.name, "no start value configured");
                continue;
            };
            if original == DISABLED_START_VALUE {
                continue;
            }

            plan.push_pair(
                Action::SetStartValue {
                    service: record.name.clone(),
                    value: DISABLED_START_VALUE,
                },
                Action::SetStartValue {
                    service: record.name.clone(),
                    value: original,
                },
            );
        }
    }
}
