//! Publisher classification

use crate::path::ImagePathResolver;
use slb_catalog::{FileProbe, MetadataSource, ServiceRecord};
use std::fmt::{self, Display, Formatter};
use tracing::{error, info};

/// Version-resource attribute holding the publisher
pub const COMPANY_NAME: &str = "CompanyName";

/// Publisher expected for first-party services
pub const DEFAULT_EXPECTED_PUBLISHER: &str = "Microsoft Corporation";

/// Who ships a service's binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    /// Publisher matches the expected first-party name
    Microsoft,

    /// Publisher present and different
    ThirdParty,

    /// No image path, no binary on disk, or no publisher metadata
    Unknown,
}

impl Display for Vendor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Microsoft => "microsoft",
            Self::ThirdParty => "third-party",
            Self::Unknown => "unknown",
        })
    }
}

/// Classifies services by the publisher of their image
pub struct VendorClassifier<'a> {
    paths: ImagePathResolver,
    probe: &'a dyn FileProbe,
    metadata: &'a dyn MetadataSource,
    expected_publisher: String,
}

impl fmt::Debug for VendorClassifier<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendorClassifier")
            .field("paths", &self.paths)
            .field("expected_publisher", &self.expected_publisher)
            .finish_non_exhaustive()
    }
}

impl<'a> VendorClassifier<'a> {
    /// Create classifier with the default publisher
    #[must_use]
    pub fn new(paths: ImagePathResolver, probe: &'a dyn FileProbe, metadata: &'a dyn MetadataSource) -> Self {
        Self {
            paths,
            probe,
            metadata,
            expected_publisher: DEFAULT_EXPECTED_PUBLISHER.to_string(),
        }
    }

    /// With expected publisher
    #[must_use]
    pub fn with_expected_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.expected_publisher = publisher.into();
        self
    }

    /// Classify one service
    ///
    /// Read-only; every failure along the way degrades to
    /// [`Vendor::Unknown`].
    pub fn classify(&self, record: &ServiceRecord) -> Vendor {
        let Some(image_path) = record.image_path.as_deref() else {
            info!(service = %record.name, "unable to get image path");
            return Vendor::Unknown;
        };

        let path = match self.paths.resolve(image_path) {
            Ok(path) => path,
            Err(e) => {
                error!(service = %record.name, "{e}");
                return Vendor::Unknown;
            }
        };

        if !self.probe.exists(&path) {
            info!(service = %record.name, %path, "unable to get binary path");
            return Vendor::Unknown;
        }

        match self.metadata.resolve_vendor(&path, COMPANY_NAME) {
            Ok(Some(company)) if !company.is_empty() => {
                if company == self.expected_publisher {
                    Vendor::Microsoft
                } else {
                    Vendor::ThirdParty
                }
            }
            Ok(_) => {
                info!(service = %record.name, "unable to get {COMPANY_NAME}");
                Vendor::Unknown
            }
            Err(e) => {
                info!(service = %record.name, error = %e, "unable to get {COMPANY_NAME}");
                Vendor::Unknown
            }
        }
    }
}
