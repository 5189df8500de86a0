//! Output contracts from the dispatcher.
//!
//! Outputs record what one dispatch rendered, in target then range order.
//! The styles have already been handed to the host or tween engine; the
//! records exist for callers that need to observe or replay them.

use serde::{Deserialize, Serialize};

use crate::ids::{NodeId, TargetId};
use crate::value::StyleMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// The frame fell inside the range.
    Interpolated,
    /// The frame skipped past the range and it was forced to an end style.
    Snapped,
}

/// One rendered range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub target: TargetId,
    pub node: NodeId,
    pub range: usize,
    pub percent: f64,
    pub style: StyleMap,
    pub kind: ChangeKind,
}

/// Returned by `Timeline::dispatch()`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    /// Frame after clamping.
    pub frame: f64,
    #[serde(default)]
    pub changes: Vec<Change>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changes rendered for one target.
    pub fn for_target(&self, target: TargetId) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(move |c| c.target == target)
    }
}
