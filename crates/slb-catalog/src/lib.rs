//! Service Catalog
//!
//! Normalized, case-insensitive index of every service known to the
//! configuration store, plus the collaborator traits the rest of the
//! workspace uses to reach the store.
//!
//! # Core Concepts
//!
//! - [`ServiceKey`]: lowercase identity of a service
//! - [`ServiceRecord`]: one normalized service entry
//! - [`ServiceKind`] / [`ServiceTypeTable`]: kernel-mode vs user-mode classification
//! - [`ServiceCatalog`]: immutable `key → record` index built once per run
//! - [`FilterTable`]: device-class filter driver lists
//! - [`ServiceStore`], [`StatusProvider`], [`FileProbe`], [`MetadataSource`]: external collaborators
//! - [`SnapshotStore`]: collaborator implementation backed by a JSON store export
//!
//! # Example
//!
//! ```rust,ignore
//! use slb_catalog::{ServiceCatalog, ServiceTypeTable, SnapshotStore};
//!
//! let store = SnapshotStore::from_path("snapshot.json")?;
//! let catalog = ServiceCatalog::load(&store, &ServiceTypeTable::default())?;
//!
//! let record = catalog.lookup("rpcss").unwrap();
//! println!("{} depends on {:?}", record.name, record.depends_on);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod catalog;
mod error;
mod filters;
mod key;
mod kind;
mod record;
mod snapshot;
mod store;

// Re-exports
pub use catalog::{normalize_identifiers, ServiceCatalog, INSTANCE_SEPARATOR};
pub use error::ProviderError;
pub use filters::{FilterEntry, FilterKind, FilterTable};
pub use key::ServiceKey;
pub use kind::{ServiceKind, ServiceTypeTable, DEFAULT_USER_MODE_TYPES};
pub use record::ServiceRecord;
pub use snapshot::{KeySnapshot, SnapshotStore, StoreSnapshot};
pub use store::{
    FileProbe, MetadataSource, RunStatus, ServiceStore, StatusProvider, StoreKey, StoreValue,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
