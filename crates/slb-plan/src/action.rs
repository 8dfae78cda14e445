//! Plan actions

use slb_catalog::FilterKind;
use std::fmt::{self, Display, Formatter};

/// Start value that disables a service
pub const DISABLED_START_VALUE: u32 = 4;

/// One idempotent mutation of the target system
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Set a service's `Start` value
    SetStartValue {
        /// Service name as displayed
        service: String,
        /// New start value
        value: u32,
    },

    /// Replace a device-class filter list
    SetFilterList {
        /// Device-class identifier
        class_id: String,
        /// Lower or upper filter
        kind: FilterKind,
        /// Full list to write, in stack order
        drivers: Vec<String>,
    },

    /// Terminate every process running an image
    KillProcess {
        /// Image file name (e.g. `mobsync.exe`)
        image: String,
    },

    /// Rename a file in place
    Rename {
        /// Drive-relative path of the existing file
        from: String,
        /// New file name (same directory)
        to: String,
    },
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetStartValue { service, value } => write!(f, "set {service} Start = {value}"),
            Self::SetFilterList {
                class_id,
                kind,
                drivers,
            } => write!(f, "set {class_id} {kind} = [{}]", drivers.join(", ")),
            Self::KillProcess { image } => write!(f, "kill {image}"),
            Self::Rename { from, to } => write!(f, "rename {from} -> {to}"),
        }
    }
}

/// Forward and rollback transcripts of one run
///
/// Both lists are built together, pair by pair. A rollback entry restores
/// exactly the value its forward entry observed before overwriting it.
/// Process kills have no rollback counterpart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionPlan {
    forward: Vec<Action>,
    rollback: Vec<Action>,
}

impl ActionPlan {
    /// Create empty plan
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reversible mutation
    pub fn push_pair(&mut self, forward: Action, rollback: Action) {
        self.forward.push(forward);
        self.rollback.push(rollback);
    }

    /// Append a forward-only action
    pub fn push_forward(&mut self, action: Action) {
        self.forward.push(action);
    }

    /// Forward actions in execution order
    #[inline]
    #[must_use]
    pub fn forward(&self) -> &[Action] {
        &self.forward
    }

    /// Rollback actions in execution order
    #[inline]
    #[must_use]
    pub fn rollback(&self) -> &[Action] {
        &self.rollback
    }

    /// Check if the plan changes nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// Result of plan building
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    /// Nothing differs from the current state; write no scripts
    NoOp,

    /// At least one forward action
    Ready(ActionPlan),
}

impl PlanOutcome {
    /// Plan, if any
    #[must_use]
    pub fn into_plan(self) -> Option<ActionPlan> {
        match self {
            Self::NoOp => None,
            Self::Ready(plan) => Some(plan),
        }
    }
}

impl From<ActionPlan> for PlanOutcome {
    fn from(plan: ActionPlan) -> Self {
        if plan.is_empty() {
            Self::NoOp
        } else {
            Self::Ready(plan)
        }
    }
}
