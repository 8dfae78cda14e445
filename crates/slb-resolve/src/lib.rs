//! Dependency Resolution
//!
//! Transitive dependency closures over a [`ServiceCatalog`](slb_catalog::ServiceCatalog)
//! and validation of a service selection against them.
//!
//! # Core Concepts
//!
//! - [`DependencyResolver`]: memoized, cycle-safe closures and dependency trees
//! - [`ServiceSelection`]: allow-list and deny-list matched against the catalog
//! - [`ConflictValidator`]: derives the [`DisableSet`] and every conflict in one pass
//! - [`ConflictReport`]: missing dependencies, required-by conflicts and remediations
//!
//! # Example
//!
//! ```rust,ignore
//! use slb_resolve::{ConflictValidator, DependencyResolver, ServiceSelection};
//!
//! let resolver = DependencyResolver::new(&catalog);
//! let selection = ServiceSelection::from_names(&catalog, &config.enabled_services, &config.individual_disabled_services);
//!
//! match ConflictValidator::new(&resolver).validate(&selection).into_result() {
//!     Ok(disable_set) => println!("{} services to disable", disable_set.len()),
//!     Err(report) => eprintln!("{report}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod disable;
mod report;
mod resolver;
mod validator;

// Re-exports
pub use disable::DisableSet;
pub use report::{ConflictCategory, ConflictDiagnostic, ConflictMap, ConflictReport, Remediation};
pub use resolver::{Closure, DependencyResolver, DependencyTree, TraversalMode};
pub use validator::{ConflictValidator, ServiceSelection, Validation};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
