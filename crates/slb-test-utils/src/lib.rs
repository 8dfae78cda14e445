//! Testing utilities for the service list builder workspace
//!
//! Fixture builders producing [`SnapshotStore`]s, so tests exercise the same
//! store → catalog path as a real run.

#![allow(missing_docs)]

use slb_catalog::{
    FilterKind, KeySnapshot, ServiceCatalog, ServiceTypeTable, SnapshotStore, StoreSnapshot,
    StoreValue,
};

/// Type code of a shared-process service
pub const USER_SERVICE_TYPE: u32 = 32;

/// Type code of a kernel driver
pub const KERNEL_DRIVER_TYPE: u32 = 1;

/// Attribute name the vendor classifier reads
pub const COMPANY_NAME: &str = "CompanyName";

#[derive(Debug, Clone)]
pub struct ServiceFixture {
    name: String,
    type_code: Option<u32>,
    start: Option<u32>,
    depends_on: Vec<String>,
    image_path: Option<String>,
}

impl ServiceFixture {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_code: None,
            start: None,
            depends_on: Vec::new(),
            image_path: None,
        }
    }

    #[must_use]
    pub fn type_code(mut self, code: u32) -> Self {
        self.type_code = Some(code);
        self
    }

    #[must_use]
    pub fn start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn image_path(mut self, path: &str) -> Self {
        self.image_path = Some(path.to_string());
        self
    }

    fn into_snapshot(self) -> KeySnapshot {
        let mut key = KeySnapshot::new(self.name);
        if let Some(code) = self.type_code {
            key = key.with_value("Type", StoreValue::Dword(code));
        }
        if let Some(start) = self.start {
            key = key.with_value("Start", StoreValue::Dword(start));
        }
        if !self.depends_on.is_empty() {
            key = key.with_value("DependOnService", StoreValue::MultiString(self.depends_on));
        }
        if let Some(path) = self.image_path {
            key = key.with_value("ImagePath", StoreValue::ExpandString(path));
        }
        key
    }
}

pub fn user_service(name: &str) -> ServiceFixture {
    ServiceFixture::new(name).type_code(USER_SERVICE_TYPE)
}

pub fn kernel_driver(name: &str) -> ServiceFixture {
    ServiceFixture::new(name).type_code(KERNEL_DRIVER_TYPE)
}

/// Incrementally assembled store snapshot
#[derive(Debug, Clone, Default)]
pub struct StoreBuilder {
    snapshot: StoreSnapshot,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn service(mut self, fixture: ServiceFixture) -> Self {
        self.snapshot = self.snapshot.with_service(fixture.into_snapshot());
        self
    }

    /// Attach a filter list to a device class, creating the class on first use
    #[must_use]
    pub fn filter(mut self, class_id: &str, kind: FilterKind, drivers: &[&str]) -> Self {
        let value = StoreValue::MultiString(drivers.iter().map(ToString::to_string).collect());

        match self
            .snapshot
            .device_classes
            .iter_mut()
            .find(|c| c.name == class_id)
        {
            Some(class) => {
                class.values.insert(kind.value_name().to_string(), value);
            }
            None => {
                self.snapshot = self
                    .snapshot
                    .with_device_class(KeySnapshot::new(class_id).with_value(kind.value_name(), value));
            }
        }
        self
    }

    #[must_use]
    pub fn running(mut self, service: &str) -> Self {
        self.snapshot = self.snapshot.with_running(service);
        self
    }

    /// Existing binary published by `company`
    #[must_use]
    pub fn file(mut self, path: &str, company: &str) -> Self {
        self.snapshot = self.snapshot.with_file(path, [(COMPANY_NAME, company)]);
        self
    }

    /// Existing file without version metadata
    #[must_use]
    pub fn bare_file(mut self, path: &str) -> Self {
        self.snapshot = self
            .snapshot
            .with_file(path, std::iter::empty::<(String, String)>());
        self
    }

    pub fn build(self) -> SnapshotStore {
        SnapshotStore::new(self.snapshot)
    }

    pub fn catalog(self) -> ServiceCatalog {
        Self::catalog_of(&self.build())
    }

    pub fn catalog_of(store: &SnapshotStore) -> ServiceCatalog {
        ServiceCatalog::load(store, &ServiceTypeTable::default()).unwrap()
    }
}
