//! Disable Plans
//!
//! Reversible action plans for a validated disable set, and their
//! materialization as a pair of batch scripts.
//!
//! # Core Concepts
//!
//! - [`Action`]: one idempotent mutation (start value, filter list, kill, rename)
//! - [`ActionPlan`]: forward and rollback transcripts built pair by pair
//! - [`PlanBuilder`]: derives a plan from catalog, filters and disable set
//! - [`ScriptRenderer`] / [`BatchScriptRenderer`]: plan → script text
//! - [`ScriptWriter`]: writes both scripts atomically
//!
//! # Example
//!
//! ```rust,ignore
//! use slb_plan::{BatchScriptRenderer, PlanBuilder, PlanOutcome, ScriptRenderer, ScriptWriter};
//!
//! let builder = PlanBuilder::new(&catalog, &filters, &store);
//! if let PlanOutcome::Ready(plan) = builder.build(&disable_set, &renames) {
//!     let scripts = BatchScriptRenderer::default().render_plan(&plan);
//!     ScriptWriter::new("build").write_now(&scripts)?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod action;
mod builder;
mod render;
mod writer;

// Re-exports
pub use action::{Action, ActionPlan, PlanOutcome, DISABLED_START_VALUE};
pub use builder::{PlanBuilder, RenameTarget, DEFAULT_SYSTEM_DRIVE};
pub use render::{
    BatchScriptRenderer, ScriptRenderer, ScriptSet, DISABLE_SCRIPT, ENABLE_SCRIPT, LIVE_HIVE,
};
pub use writer::{ScriptWriter, WriteError, BUILD_DIR_FORMAT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
