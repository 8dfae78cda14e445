//! Vendor Classification
//!
//! Decides whether a service about to be disabled ships with the operating
//! system, so an operator can be warned before disabling third-party or
//! unidentifiable software.
//!
//! # Core Concepts
//!
//! - [`ImagePathResolver`]: raw image path → absolute lowercase binary path
//! - [`VendorClassifier`]: [`Vendor::Microsoft`], [`Vendor::ThirdParty`] or [`Vendor::Unknown`]
//! - [`VendorGate`]: reviews a whole disable set and yields a [`VendorReview`]
//!
//! # Example
//!
//! ```rust,ignore
//! use slb_vendor::{ImagePathResolver, VendorClassifier, VendorGate};
//!
//! let classifier = VendorClassifier::new(ImagePathResolver::default(), &store, &store);
//! let review = VendorGate::new(&classifier).review(&catalog, &disable_set);
//!
//! if !review.is_clear() {
//!     eprintln!("{review}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod classifier;
mod gate;
mod path;

// Re-exports
pub use classifier::{Vendor, VendorClassifier, COMPANY_NAME, DEFAULT_EXPECTED_PUBLISHER};
pub use gate::{VendorGate, VendorReview};
pub use path::{default_aliases, default_environment, ImagePathResolver, PathAlias, PathError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
