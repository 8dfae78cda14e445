//! Snapshot-backed store
//!
//! A [`StoreSnapshot`] is a JSON export of everything the planner reads from
//! the target machine: service keys, device-class keys, the set of running
//! services and publisher metadata for the binaries that exist. A
//! [`SnapshotStore`] indexes one and implements every collaborator trait, so
//! a plan can be built offline and reproduced exactly.
//!
//! ```json
//! {
//!   "services": [
//!     { "name": "AudioSrv", "values": { "Type": { "dword": 16 }, "Start": { "dword": 2 } } }
//!   ],
//!   "device_classes": [
//!     { "name": "{4d36e96c-e325-11ce-bfc1-08002be10318}",
//!       "values": { "UpperFilters": { "multi_string": ["ksthunk"] } } }
//!   ],
//!   "running": ["AudioSrv"],
//!   "files": { "c:\\windows\\system32\\svchost.exe": { "CompanyName": "Microsoft Corporation" } }
//! }
//! ```

use crate::error::ProviderError;
use crate::store::{
    FileProbe, MetadataSource, RunStatus, ServiceStore, StatusProvider, StoreKey, StoreValue,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// One exported key with its values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySnapshot {
    /// Subkey name
    pub name: String,

    /// Values by name
    #[serde(default)]
    pub values: BTreeMap<String, StoreValue>,
}

impl KeySnapshot {
    /// Create key with no values
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// With value
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: StoreValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }
}

/// Serializable export of the target machine's state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Service keys in enumeration order
    #[serde(default)]
    pub services: Vec<KeySnapshot>,

    /// Device-class keys in enumeration order
    #[serde(default)]
    pub device_classes: Vec<KeySnapshot>,

    /// Names of running services
    #[serde(default)]
    pub running: Vec<String>,

    /// Existing files and their version-resource strings
    #[serde(default)]
    pub files: BTreeMap<String, BTreeMap<String, String>>,
}

impl StoreSnapshot {
    /// With service key
    #[must_use]
    pub fn with_service(mut self, key: KeySnapshot) -> Self {
        self.services.push(key);
        self
    }

    /// With device-class key
    #[must_use]
    pub fn with_device_class(mut self, key: KeySnapshot) -> Self {
        self.device_classes.push(key);
        self
    }

    /// With running service
    #[must_use]
    pub fn with_running(mut self, service: impl Into<String>) -> Self {
        self.running.push(service.into());
        self
    }

    /// With existing file and its attributes
    #[must_use]
    pub fn with_file<I, K, V>(mut self, path: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.files.insert(
            path.into(),
            attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }
}

/// Indexed, read-only view over a [`StoreSnapshot`]
///
/// All lookups are case-insensitive, matching the store's own semantics.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    snapshot: StoreSnapshot,
    services: HashMap<String, usize>,
    classes: HashMap<String, usize>,
    running: HashSet<String>,
    files: HashMap<String, HashMap<String, String>>,
}

impl SnapshotStore {
    /// Load a JSON export from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ProviderError::io_error(path, e))?;
        let snapshot = serde_json::from_str(&raw).map_err(|source| ProviderError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(snapshot))
    }

    /// Index a snapshot
    #[must_use]
    pub fn new(snapshot: StoreSnapshot) -> Self {
        let index = |keys: &[KeySnapshot]| {
            keys.iter()
                .enumerate()
                .map(|(i, k)| (k.name.to_lowercase(), i))
                .collect::<HashMap<_, _>>()
        };

        let services = index(&snapshot.services);
        let classes = index(&snapshot.device_classes);
        let running = snapshot.running.iter().map(|s| s.to_lowercase()).collect();
        let files = snapshot
            .files
            .iter()
            .map(|(path, attrs)| {
                let attrs = attrs
                    .iter()
                    .map(|(k, v)| (k.to_lowercase(), v.clone()))
                    .collect();
                (path.to_lowercase(), attrs)
            })
            .collect();

        Self {
            snapshot,
            services,
            classes,
            running,
            files,
        }
    }

    /// Underlying snapshot
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }

    fn key_snapshot(&self, key: &StoreKey) -> Option<&KeySnapshot> {
        match key {
            StoreKey::Service(name) => self
                .services
                .get(&name.to_lowercase())
                .map(|&i| &self.snapshot.services[i]),
            StoreKey::DeviceClass(id) => self
                .classes
                .get(&id.to_lowercase())
                .map(|&i| &self.snapshot.device_classes[i]),
        }
    }
}

impl From<StoreSnapshot> for SnapshotStore {
    fn from(snapshot: StoreSnapshot) -> Self {
        Self::new(snapshot)
    }
}

impl ServiceStore for SnapshotStore {
    fn enumerate_services(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.snapshot.services.iter().map(|k| k.name.clone()).collect())
    }

    fn enumerate_device_classes(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self
            .snapshot
            .device_classes
            .iter()
            .map(|k| k.name.clone())
            .collect())
    }

    fn read_value(&self, key: &StoreKey, name: &str) -> Result<Option<StoreValue>, ProviderError> {
        Ok(self.key_snapshot(key).and_then(|k| {
            k.values
                .iter()
                .find(|(value_name, _)| value_name.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.clone())
        }))
    }
}

impl StatusProvider for SnapshotStore {
    fn query_running_status(&self, service: &str) -> Result<RunStatus, ProviderError> {
        if self.running.contains(&service.to_lowercase()) {
            Ok(RunStatus::Running)
        } else {
            Ok(RunStatus::NotRunning)
        }
    }
}

impl FileProbe for SnapshotStore {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(&path.to_lowercase())
    }
}

impl MetadataSource for SnapshotStore {
    fn resolve_vendor(&self, path: &str, attribute: &str) -> Result<Option<String>, ProviderError> {
        Ok(self
            .files
            .get(&path.to_lowercase())
            .and_then(|attrs| attrs.get(&attribute.to_lowercase()))
            .cloned())
    }
}
