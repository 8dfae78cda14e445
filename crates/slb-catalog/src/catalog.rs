//! Service catalog
//!
//! Built once from a [`ServiceStore`] and immutable afterwards.

use crate::error::ProviderError;
use crate::key::ServiceKey;
use crate::kind::{ServiceKind, ServiceTypeTable};
use crate::record::ServiceRecord;
use crate::store::{ServiceStore, StoreKey, StoreValue};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Separator between a logical service name and a per-instance suffix
pub const INSTANCE_SEPARATOR: char = '_';

/// Collapse per-instance service identifiers onto their logical service
///
/// An identifier containing [`INSTANCE_SEPARATOR`] loses the suffix after the
/// last separator only when the stripped form has already been seen. The
/// first occurrence of a name establishes the entry; a later collapsing
/// instance overwrites the display name with its own stripped spelling.
///
/// The result depends on the order of `identifiers`, so callers must pass
/// them in the store's (stable) enumeration order.
pub fn normalize_identifiers<I, S>(identifiers: I) -> BTreeMap<ServiceKey, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut names = BTreeMap::new();

    for raw in identifiers {
        let raw = raw.as_ref();
        let mut name = raw;

        if let Some((stem, _)) = raw.rsplit_once(INSTANCE_SEPARATOR) {
            if names.contains_key(&ServiceKey::new(stem)) {
                debug!(identifier = raw, "removing instance suffix");
                name = stem;
            }
        }

        names.insert(ServiceKey::new(name), name.to_string());
    }

    names
}

/// Immutable index of every service in the store
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    records: BTreeMap<ServiceKey, ServiceRecord>,
}

impl ServiceCatalog {
    /// Read the full catalog from the store
    ///
    /// Only the enumeration is fatal. Per-service attributes that are absent
    /// or unreadable load as `None`.
    pub fn load(store: &dyn ServiceStore, types: &ServiceTypeTable) -> Result<Self, ProviderError> {
        let identifiers = store.enumerate_services()?;
        let names = normalize_identifiers(&identifiers);

        let records = names
            .into_iter()
            .map(|(key, name)| {
                let record = read_record(store, types, name);
                (key, record)
            })
            .collect::<BTreeMap<_, _>>();

        debug!(
            identifiers = identifiers.len(),
            services = records.len(),
            "service catalog loaded"
        );

        Ok(Self { records })
    }

    /// Look up a service by any spelling of its name
    #[inline]
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ServiceRecord> {
        self.records.get(&ServiceKey::new(name))
    }

    /// Look up a service by key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &ServiceKey) -> Option<&ServiceRecord> {
        self.records.get(key)
    }

    /// Check whether a key is known
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.records.contains_key(key)
    }

    /// Kind of a known service
    #[inline]
    #[must_use]
    pub fn kind_of(&self, key: &ServiceKey) -> Option<ServiceKind> {
        self.records.get(key).map(|r| r.kind)
    }

    /// Check whether a key names a known user-mode service
    #[inline]
    #[must_use]
    pub fn is_user_mode(&self, key: &ServiceKey) -> bool {
        self.kind_of(key).is_some_and(ServiceKind::is_user_mode)
    }

    /// Display name for a key; unknown keys display as themselves
    #[must_use]
    pub fn display_name<'a>(&'a self, key: &'a ServiceKey) -> &'a str {
        self.records
            .get(key)
            .map_or(key.as_str(), |r| r.name.as_str())
    }

    /// Match configured names against the catalog
    ///
    /// Names that don't exist are dropped, not reported.
    pub fn resolve_names<I, S>(&self, names: I) -> BTreeSet<ServiceKey>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| {
                let key = ServiceKey::new(name.as_ref());
                if self.contains(&key) {
                    Some(key)
                } else {
                    debug!(service = name.as_ref(), "not present, ignoring");
                    None
                }
            })
            .collect()
    }

    /// Records in key order
    pub fn iter(&self) -> impl Iterator<Item = &ServiceRecord> {
        self.records.values()
    }

    /// Number of services
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn read_record(store: &dyn ServiceStore, types: &ServiceTypeTable, name: String) -> ServiceRecord {
    let key = StoreKey::Service(name.clone());

    let type_code = read_optional(store, &key, "Type").and_then(|v| v.as_u32());
    let start = read_optional(store, &key, "Start").and_then(|v| v.as_u32());
    let depends_on = read_optional(store, &key, "DependOnService")
        .and_then(|v| v.to_list())
        .unwrap_or_default();
    let image_path = read_optional(store, &key, "ImagePath").and_then(|v| v.as_str().map(str::to_owned));

    ServiceRecord {
        key: ServiceKey::new(&name),
        name,
        kind: types.classify(type_code),
        type_code,
        start,
        depends_on,
        image_path,
    }
}

fn read_optional(store: &dyn ServiceStore, key: &StoreKey, value: &str) -> Option<StoreValue> {
    match store.read_value(key, value) {
        Ok(v) => v,
        Err(e) => {
            debug!(%key, value, error = %e, "treating unreadable value as absent");
            None
        }
    }
}
