//! Conflict validator
//!
//! Decides the full disable set for a selection and checks it against the
//! dependency graph:
//!
//! 1. seed the disable set with the individually disabled services
//! 2. with a non-empty allow-list, add every user-mode service not on it
//! 3. every allow-listed (or individually disabled) service must have its
//!    user-mode closure on the allow-list
//! 4. no service staying enabled may need a disabled one
//!
//! Step 3 only applies when an allow-list exists; with an empty allow-list
//! the run is "explicit disables only" and there is nothing for a
//! dependency to be missing from.

use crate::disable::DisableSet;
use crate::report::{ConflictMap, ConflictReport, Remediation};
use crate::resolver::DependencyResolver;
use slb_catalog::{ServiceCatalog, ServiceKey};
use std::collections::BTreeSet;
use tracing::debug;

/// Operator's choice of services, matched against the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceSelection {
    /// Allow-list; empty means "no allow-list"
    pub enabled: BTreeSet<ServiceKey>,

    /// Explicit deny-list
    pub individually_disabled: BTreeSet<ServiceKey>,
}

impl ServiceSelection {
    /// Match configured names, silently dropping unknown ones
    pub fn from_names<E, D, S, T>(catalog: &ServiceCatalog, enabled: E, individually_disabled: D) -> Self
    where
        E: IntoIterator<Item = S>,
        D: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            enabled: catalog.resolve_names(enabled),
            individually_disabled: catalog.resolve_names(individually_disabled),
        }
    }

    /// Check whether an allow-list is in effect
    #[inline]
    #[must_use]
    pub fn has_allow_list(&self) -> bool {
        !self.enabled.is_empty()
    }
}

/// Outcome of a validation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// Services slated for disabling
    pub disable_set: DisableSet,

    /// Conflicts found; empty when the selection is safe
    pub report: ConflictReport,
}

impl Validation {
    /// Check if the selection is safe
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.report.is_empty()
    }

    /// Disable set, or the report when conflicts exist
    pub fn into_result(self) -> Result<DisableSet, ConflictReport> {
        if self.report.is_empty() {
            Ok(self.disable_set)
        } else {
            Err(self.report)
        }
    }
}

/// Checks a selection against the dependency graph
#[derive(Debug)]
pub struct ConflictValidator<'r, 'a> {
    resolver: &'r DependencyResolver<'a>,
}

impl<'r, 'a> ConflictValidator<'r, 'a> {
    /// Create validator sharing a resolver (and its memo)
    #[must_use]
    pub fn new(resolver: &'r DependencyResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Compute the disable set and every conflict in one pass
    #[must_use]
    pub fn validate(&self, selection: &ServiceSelection) -> Validation {
        let catalog = self.resolver.catalog();
        let disable_set = self.disable_set(selection);

        let missing_dependencies = self.missing_dependencies(selection);
        let required_by = self.required_by(selection, &disable_set);
        let remediations = remediations(catalog, selection, &missing_dependencies, &required_by);

        debug!(
            disable = disable_set.len(),
            missing = missing_dependencies.len(),
            required_by = required_by.len(),
            "validation finished"
        );

        Validation {
            disable_set,
            report: ConflictReport {
                missing_dependencies,
                required_by,
                remediations,
            },
        }
    }

    fn disable_set(&self, selection: &ServiceSelection) -> DisableSet {
        let catalog = self.resolver.catalog();
        let mut keys = selection.individually_disabled.clone();

        if selection.has_allow_list() {
            keys.extend(
                catalog
                    .iter()
                    .filter(|r| r.kind.is_user_mode() && !selection.enabled.contains(&r.key))
                    .map(|r| r.key.clone()),
            );
        }

        DisableSet::from_keys(keys)
    }

    fn missing_dependencies(&self, selection: &ServiceSelection) -> ConflictMap {
        let mut missing = ConflictMap::new();

        if !selection.has_allow_list() {
            return missing;
        }

        for service in selection.enabled.union(&selection.individually_disabled) {
            let absent: BTreeSet<_> = self
                .resolver
                .closure(service, false)
                .iter()
                .filter(|dep| !selection.enabled.contains(*dep))
                .cloned()
                .collect();

            if !absent.is_empty() {
                missing.insert(service.clone(), absent);
            }
        }

        missing
    }

    fn required_by(&self, selection: &ServiceSelection, disable_set: &DisableSet) -> ConflictMap {
        let catalog = self.resolver.catalog();
        let mut required_by = ConflictMap::new();

        for record in catalog.iter().filter(|r| !disable_set.contains(&r.key)) {
            for dep in self.resolver.closure(&record.key, true).iter() {
                // services can depend on names that aren't installed
                if !catalog.contains(dep) {
                    continue;
                }

                let off_allow_list = selection.has_allow_list()
                    && catalog.is_user_mode(dep)
                    && !selection.enabled.contains(dep);

                if off_allow_list || selection.individually_disabled.contains(dep) {
                    required_by
                        .entry(dep.clone())
                        .or_default()
                        .insert(record.key.clone());
                }
            }
        }

        required_by
    }
}

fn remediations(
    catalog: &ServiceCatalog,
    selection: &ServiceSelection,
    missing: &ConflictMap,
    required_by: &ConflictMap,
) -> Vec<Remediation> {
    let to_resolve: BTreeSet<&ServiceKey> = missing
        .values()
        .flatten()
        .chain(required_by.keys())
        .collect();

    let mut fixes = Vec::new();

    for service in to_resolve {
        if selection.individually_disabled.contains(service) {
            fixes.push(Remediation::RemoveFromIndividuallyDisabled(service.clone()));
        }
        if selection.has_allow_list() && catalog.is_user_mode(service) {
            fixes.push(Remediation::AddToEnabled(service.clone()));
        }
    }

    fixes.sort();
    fixes.dedup();
    fixes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use slb_test_utils::{kernel_driver, user_service, StoreBuilder};

    fn key(name: &str) -> ServiceKey {
        ServiceKey::new(name)
    }

    fn set(names: &[&str]) -> BTreeSet<ServiceKey> {
        names.iter().map(|n| key(n)).collect()
    }

    fn disabled(validation: &Validation) -> Vec<&str> {
        validation.disable_set.iter().map(ServiceKey::as_str).collect()
    }

    #[test]
    fn explicit_only_without_allow_list() {
        let catalog = StoreBuilder::new()
            .service(user_service("X"))
            .service(user_service("Y"))
            .service(kernel_driver("Z"))
            .catalog();
        let resolver = DependencyResolver::new(&catalog);
        let selection = ServiceSelection::from_names(&catalog, Vec::<&str>::new(), ["x"]);

        let validation = ConflictValidator::new(&resolver).validate(&selection);

        assert_eq!(disabled(&validation), ["x"]);
        assert!(validation.passed());
    }

    #[test]
    fn allow_list_sweeps_user_mode_services_only() {
        let catalog = StoreBuilder::new()
            .service(user_service("Keep"))
            .service(user_service("Drop"))
            .service(kernel_driver("Driver"))
            .catalog();
        let resolver = DependencyResolver::new(&catalog);
        let selection = ServiceSelection::from_names(&catalog, ["keep"], Vec::<&str>::new());

        let validation = ConflictValidator::new(&resolver).validate(&selection);

        assert_eq!(disabled(&validation), ["drop"]);
        assert!(validation.passed());
    }

    #[test]
    fn missing_dependency_reported_once() {
        let catalog = StoreBuilder::new()
            .service(user_service("A").depends_on(["B"]))
            .service(user_service("B"))
            .catalog();
        let resolver = DependencyResolver::new(&catalog);
        let selection = ServiceSelection::from_names(&catalog, ["A"], Vec::<&str>::new());

        let validation = ConflictValidator::new(&resolver).validate(&selection);

        assert_eq!(validation.report.missing_dependencies.len(), 1);
        assert_eq!(validation.report.missing_dependencies[&key("a")], set(&["b"]));
        assert!(validation.clone().into_result().is_err());
    }

    #[test]
    fn kernel_mode_dependency_of_enabled_service_is_not_missing() {
        let catalog = StoreBuilder::new()
            .service(user_service("A").depends_on(["Tcpip"]))
            .service(kernel_driver("Tcpip"))
            .catalog();
        let resolver = DependencyResolver::new(&catalog);
        let selection = ServiceSelection::from_names(&catalog, ["A"], Vec::<&str>::new());

        let validation = ConflictValidator::new(&resolver).validate(&selection);

        assert!(validation.passed());
    }

    #[test]
    fn required_by_for_individually_disabled_service() {
        let catalog = StoreBuilder::new()
            .service(user_service("App").depends_on(["Helper"]))
            .service(user_service("Helper"))
            .catalog();
        let resolver = DependencyResolver::new(&catalog);
        let selection = ServiceSelection::from_names(&catalog, Vec::<&str>::new(), ["Helper"]);

        let validation = ConflictValidator::new(&resolver).validate(&selection);

        assert_eq!(validation.report.required_by[&key("helper")], set(&["app"]));
        assert_eq!(
            validation.report.remediations,
            vec![Remediation::RemoveFromIndividuallyDisabled(key("helper"))]
        );
    }

    #[test]
    fn required_by_kernel_service_needing_swept_user_service() {
        let catalog = StoreBuilder::new()
            .service(user_service("Keep"))
            .service(kernel_driver("Filter").depends_on(["Broker"]))
            .service(user_service("Broker"))
            .catalog();
        let resolver = DependencyResolver::new(&catalog);
        let selection = ServiceSelection::from_names(&catalog, ["Keep"], Vec::<&str>::new());

        let validation = ConflictValidator::new(&resolver).validate(&selection);

        assert_eq!(validation.report.required_by[&key("broker")], set(&["filter"]));
        assert_eq!(
            validation.report.remediations,
            vec![Remediation::AddToEnabled(key("broker"))]
        );
    }

    #[test]
    fn transitive_requirement_through_drivers() {
        let catalog = StoreBuilder::new()
            .service(user_service("Keep").depends_on(["Bridge"]))
            .service(kernel_driver("Bridge").depends_on(["Deep"]))
            .service(kernel_driver("Deep"))
            .catalog();
        let resolver = DependencyResolver::new(&catalog);
        let selection = ServiceSelection::from_names(&catalog, ["Keep"], ["Deep"]);

        let validation = ConflictValidator::new(&resolver).validate(&selection);

        // Keep -> Bridge -> Deep, Bridge -> Deep
        assert_eq!(validation.report.required_by[&key("deep")], set(&["bridge", "keep"]));
    }

    #[test]
    fn uninstalled_dependencies_are_not_required_by_conflicts() {
        let catalog = StoreBuilder::new()
            .service(user_service("Keep").depends_on(["Ghost"]))
            .catalog();
        let resolver = DependencyResolver::new(&catalog);
        let selection = ServiceSelection::from_names(&catalog, ["Keep"], Vec::<&str>::new());

        assert!(ConflictValidator::new(&resolver).validate(&selection).passed());
    }

    #[test]
    fn individually_disabled_dependencies_checked_against_allow_list() {
        let catalog = StoreBuilder::new()
            .service(user_service("Keep"))
            .service(user_service("Gone").depends_on(["Other"]))
            .service(user_service("Other"))
            .catalog();
        let resolver = DependencyResolver::new(&catalog);
        let selection = ServiceSelection::from_names(&catalog, ["Keep"], ["Gone"]);

        let validation = ConflictValidator::new(&resolver).validate(&selection);

        assert_eq!(validation.report.missing_dependencies[&key("gone")], set(&["other"]));
    }

    #[test]
    fn every_conflict_is_reported() {
        let catalog = StoreBuilder::new()
            .service(user_service("A").depends_on(["B"]))
            .service(user_service("C").depends_on(["D"]))
            .service(user_service("B"))
            .service(user_service("D"))
            .service(kernel_driver("K").depends_on(["E"]))
            .service(user_service("E"))
            .catalog();
        let resolver = DependencyResolver::new(&catalog);
        let selection = ServiceSelection::from_names(&catalog, ["A", "C"], Vec::<&str>::new());

        let report = ConflictValidator::new(&resolver).validate(&selection).report;

        assert_eq!(report.missing_dependencies.keys().cloned().collect::<BTreeSet<_>>(), set(&["a", "c"]));
        assert_eq!(report.required_by.keys().cloned().collect::<BTreeSet<_>>(), set(&["b", "d", "e"]));
        assert_eq!(
            report.remediations,
            vec![
                Remediation::AddToEnabled(key("b")),
                Remediation::AddToEnabled(key("d")),
                Remediation::AddToEnabled(key("e")),
            ]
        );
    }

    #[test]
    fn unknown_config_names_are_dropped() {
        let catalog = StoreBuilder::new().service(user_service("Real")).catalog();
        let selection = ServiceSelection::from_names(&catalog, ["Real", "Imaginary"], ["Nope"]);

        assert_eq!(selection.enabled, set(&["real"]));
        assert!(selection.individually_disabled.is_empty());
    }
}
