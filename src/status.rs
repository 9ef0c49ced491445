use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::control::ControlKey;
use crate::validation::ErrorKey;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlStatus {
    Valid,
    Invalid,
    Disabled,
}

/// Per-child inputs to a group status decision, in child order.
#[derive(Clone, Debug)]
pub struct ChildState {
    pub key: ControlKey,
    pub disabled: bool,
    pub invalid: bool,
}

/// Inputs to a status decision: the node's own error keys and the states of
/// its children (empty for leaves).
pub struct StatusContext<'a> {
    pub errors: &'a [ErrorKey],
    pub children: &'a [ChildState],
}

/// Status derivation strategy, injected at node construction so leaves and
/// groups share the same update machinery.
pub trait StatusPredicate: Send + Sync {
    fn evaluate(&self, ctx: &StatusContext<'_>) -> ControlStatus;
}

/// Leaf strategy: invalid iff the node's own validation failed. Never yields
/// `Disabled`; disabling is an orthogonal toggle on the status cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct LeafStatus;

impl StatusPredicate for LeafStatus {
    fn evaluate(&self, ctx: &StatusContext<'_>) -> ControlStatus {
        if ctx.errors.is_empty() {
            ControlStatus::Valid
        } else {
            ControlStatus::Invalid
        }
    }
}

/// Group strategy: disabled when every child reports disabled (vacuously true
/// for an empty group), else invalid when any child is invalid or the group's
/// own validation failed, else valid.
#[derive(Clone, Copy, Debug, Default)]
pub struct GroupStatus;

impl StatusPredicate for GroupStatus {
    fn evaluate(&self, ctx: &StatusContext<'_>) -> ControlStatus {
        if ctx.children.iter().all(|child| child.disabled) {
            return ControlStatus::Disabled;
        }
        if ctx.children.iter().any(|child| child.invalid) || !ctx.errors.is_empty() {
            return ControlStatus::Invalid;
        }
        ControlStatus::Valid
    }
}

/// Status capability of a control: the derived status, the external disabled
/// toggle, and the injected predicate.
#[derive(Clone)]
pub(crate) struct StatusCell {
    status: ControlStatus,
    disabled: bool,
    predicate: Arc<dyn StatusPredicate>,
}

impl StatusCell {
    pub(crate) fn new(predicate: Arc<dyn StatusPredicate>) -> Self {
        Self {
            // Matches the pre-first-update state of the original model.
            status: ControlStatus::Invalid,
            disabled: false,
            predicate,
        }
    }

    pub(crate) fn status(&self) -> ControlStatus {
        self.status
    }

    /// Whether validation and status recomputation are suppressed. Only the
    /// external toggle suppresses; a group that derived `Disabled` from its
    /// children keeps recomputing so it can leave that state.
    pub(crate) fn is_suppressed(&self) -> bool {
        self.disabled
    }

    /// What this node contributes to its parent's "all disabled" check.
    pub(crate) fn reports_disabled(&self) -> bool {
        self.disabled || self.status == ControlStatus::Disabled
    }

    pub(crate) fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.status = ControlStatus::Disabled;
        }
    }

    pub(crate) fn recompute(&mut self, ctx: &StatusContext<'_>) {
        self.status = self.predicate.evaluate(ctx);
    }
}
