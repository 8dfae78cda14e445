//! Vendor warning gate
//!
//! Looks at every service about to be disabled and collects the ones that
//! aren't first-party, so an operator can stop before touching software they
//! didn't expect. Lookups fan out over rayon; results are aggregated into
//! sorted sets so the review is independent of scheduling.

use crate::classifier::{Vendor, VendorClassifier};
use rayon::prelude::*;
use slb_catalog::{ServiceCatalog, ServiceKey};
use slb_resolve::DisableSet;
use std::collections::BTreeSet;
use tracing::info;

/// Services that need an operator's confirmation
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error(
    "{} non-Windows services detected, {} service vendors are unknown",
    .third_party.len(),
    .unknown.len()
)]
pub struct VendorReview {
    /// Published by someone other than the expected publisher
    pub third_party: BTreeSet<ServiceKey>,

    /// Publisher could not be determined
    pub unknown: BTreeSet<ServiceKey>,
}

impl VendorReview {
    /// Check if nothing needs confirming
    #[inline]
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.third_party.is_empty() && self.unknown.is_empty()
    }
}

/// Reviews a disable set with a [`VendorClassifier`]
#[derive(Debug)]
pub struct VendorGate<'c, 'a> {
    classifier: &'c VendorClassifier<'a>,
}

impl<'c, 'a> VendorGate<'c, 'a> {
    /// Create gate
    #[must_use]
    pub fn new(classifier: &'c VendorClassifier<'a>) -> Self {
        Self { classifier }
    }

    /// Classify every candidate
    ///
    /// Keys without a catalog record count as unknown.
    #[must_use]
    pub fn review(&self, catalog: &ServiceCatalog, candidates: &DisableSet) -> VendorReview {
        let keys: Vec<&ServiceKey> = candidates.iter().collect();

        let verdicts: Vec<(&ServiceKey, Vendor)> = keys
            .par_iter()
            .map(|key| {
                let vendor = catalog
                    .get(key)
                    .map_or(Vendor::Unknown, |record| self.classifier.classify(record));
                (*key, vendor)
            })
            .collect();

        let mut review = VendorReview::default();
        for (key, vendor) in verdicts {
            match vendor {
                Vendor::Microsoft => {}
                Vendor::ThirdParty => {
                    info!("\"{}\" is not a Windows service", catalog.display_name(key));
                    review.third_party.insert(key.clone());
                }
                Vendor::Unknown => {
                    review.unknown.insert(key.clone());
                }
            }
        }

        review
    }
}
