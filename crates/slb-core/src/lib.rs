//! Service List Builder
//!
//! Plans a safe, reversible transition of a machine's service set from "all
//! services running" to "only an allow-listed subset running", and writes
//! matching disable and enable scripts.
//!
//! # Core Concepts
//!
//! - [`RunConfig`]: operator's allow-list, deny-list and rename targets, plus [`EngineConfig`]
//! - [`run_plan`]: catalog → validation → vendor gate → plan → scripts
//! - [`query_dependencies`]: dependency closure and tree of one service
//! - [`RunError`]: every way a run can fail, each with exit status 1
//!
//! # Example
//!
//! ```rust,ignore
//! use slb_catalog::SnapshotStore;
//! use slb_core::{run_plan, RunConfig, RunOptions, RunOutcome};
//!
//! let store = SnapshotStore::from_path("snapshot.json")?;
//! let config = RunConfig::from_path("lists.toml")?;
//!
//! match run_plan(&store, &config, &RunOptions::default())? {
//!     RunOutcome::NoChanges => println!("nothing to do"),
//!     RunOutcome::Written { build_dir, .. } => println!("scripts in {}", build_dir.display()),
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cli;
mod config;
mod error;
mod pipeline;

// Re-exports
pub use config::{EngineConfig, RunConfig};
pub use error::{ConfigError, RunError, VENDOR_WARNING_HINT};
pub use pipeline::{
    query_dependencies, run_plan, validate, DependencyReport, RunOptions, RunOutcome, TargetSystem,
    DEFAULT_OUTPUT_DIR,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
