//! Disable set

use slb_catalog::{ProviderError, RunStatus, ServiceCatalog, ServiceKey, StatusProvider};
use std::collections::BTreeSet;
use tracing::debug;

/// Final set of services a plan will disable
///
/// Produced once by the validator and consumed read-only afterwards. Any
/// narrowing (e.g. to running services) yields a new set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisableSet(BTreeSet<ServiceKey>);

impl DisableSet {
    /// Build a set from keys
    ///
    /// Normally sets come out of [`ConflictValidator`](crate::ConflictValidator);
    /// this is for callers that already validated elsewhere.
    #[must_use]
    pub fn from_keys(keys: impl IntoIterator<Item = ServiceKey>) -> Self {
        Self(keys.into_iter().collect())
    }

    /// Check membership
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.0.contains(key)
    }

    /// Keys in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &ServiceKey> {
        self.0.iter()
    }

    /// Number of services
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing is slated for disabling
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only services that are currently running
    pub fn retain_running(
        &self,
        catalog: &ServiceCatalog,
        status: &dyn StatusProvider,
    ) -> Result<Self, ProviderError> {
        let mut running = BTreeSet::new();

        for key in &self.0 {
            let name = catalog.display_name(key);
            match status.query_running_status(name)? {
                RunStatus::Running => {
                    running.insert(key.clone());
                }
                RunStatus::NotRunning => debug!(service = name, "not running, leaving as is"),
            }
        }

        Ok(Self(running))
    }
}

impl<'a> IntoIterator for &'a DisableSet {
    type Item = &'a ServiceKey;
    type IntoIter = std::collections::btree_set::Iter<'a, ServiceKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
