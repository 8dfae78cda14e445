//! Device-class filter driver lists

use crate::error::ProviderError;
use crate::store::{ServiceStore, StoreKey};
use std::fmt::{self, Display, Formatter};
use tracing::debug;

/// Position of a filter list in a device stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKind {
    /// `LowerFilters`
    Lower,

    /// `UpperFilters`
    Upper,
}

impl FilterKind {
    /// Both kinds, in the order they are read and rewritten
    pub const ALL: [Self; 2] = [Self::Lower, Self::Upper];

    /// Store value name
    #[inline]
    #[must_use]
    pub fn value_name(self) -> &'static str {
        match self {
            Self::Lower => "LowerFilters",
            Self::Upper => "UpperFilters",
        }
    }
}

impl Display for FilterKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.value_name())
    }
}

/// One filter list attached to a device class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    /// Device-class identifier
    pub class_id: String,

    /// Lower or upper filter
    pub kind: FilterKind,

    /// Driver names in stack order
    pub drivers: Vec<String>,
}

/// Every filter list present in the store, in enumeration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterTable {
    entries: Vec<FilterEntry>,
}

impl FilterTable {
    /// Read all device-class filter lists
    ///
    /// Classes without a given list are skipped; an unreadable class root is
    /// fatal.
    pub fn load(store: &dyn ServiceStore) -> Result<Self, ProviderError> {
        let mut entries = Vec::new();

        for class_id in store.enumerate_device_classes()? {
            let key = StoreKey::DeviceClass(class_id.clone());

            for kind in FilterKind::ALL {
                let drivers = match store.read_value(&key, kind.value_name()) {
                    Ok(value) => value.and_then(|v| v.to_list()),
                    Err(e) => {
                        debug!(%key, %kind, error = %e, "treating unreadable filter as absent");
                        None
                    }
                };

                if let Some(drivers) = drivers {
                    entries.push(FilterEntry {
                        class_id: class_id.clone(),
                        kind,
                        drivers,
                    });
                }
            }
        }

        Ok(Self { entries })
    }

    /// Build a table from prepared entries
    #[must_use]
    pub fn from_entries(entries: Vec<FilterEntry>) -> Self {
        Self { entries }
    }

    /// Entries in enumeration order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    /// Number of filter lists
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no filter lists exist
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
