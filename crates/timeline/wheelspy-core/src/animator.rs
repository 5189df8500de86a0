//! Programmatic jumps: an ease-out-cubic run of frames consumed one per tick.
//!
//! A timeline holds at most one [`Jump`]. Starting another cancels the first
//! through its shared [`JumpToken`], which also drops its completion hook
//! unrun.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::interp::functions::ease_out_cubic;

/// Completion hook of a jump.
pub type CompleteFn = Box<dyn FnOnce()>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpState {
    Running,
    Finished,
    Cancelled,
}

/// Shared state between a running jump and the handles given to callers.
#[derive(Clone, Debug)]
pub struct JumpToken(Rc<Cell<JumpState>>);

impl JumpToken {
    fn new(state: JumpState) -> Self {
        Self(Rc::new(Cell::new(state)))
    }

    pub fn state(&self) -> JumpState {
        self.0.get()
    }

    /// No-op once the jump has finished.
    pub fn cancel(&self) {
        if self.0.get() == JumpState::Running {
            self.0.set(JumpState::Cancelled);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == JumpState::Cancelled
    }

    fn finish(&self) {
        self.0.set(JumpState::Finished);
    }
}

/// Caller-side view of a jump started with `Timeline::jump`.
#[derive(Clone, Debug)]
pub struct JumpHandle {
    token: JumpToken,
    target: f64,
}

impl JumpHandle {
    pub(crate) fn finished(target: f64) -> Self {
        Self {
            token: JumpToken::new(JumpState::Finished),
            target,
        }
    }

    /// Frame the jump settles on (after clamping).
    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn state(&self) -> JumpState {
        self.token.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == JumpState::Running
    }

    /// Stop the jump; the timeline drops it on its next tick.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

/// `ceil(duration / tick)` steps, at least one. Saturates instead of
/// overflowing for huge durations or tiny ticks.
pub fn step_count(duration_ms: f64, tick_ms: f64) -> u64 {
    if tick_ms > 0.0 && duration_ms.is_finite() {
        ((duration_ms / tick_ms).ceil() as u64).max(1)
    } else {
        1
    }
}

/// The in-flight animation of a timeline.
///
/// Frames follow an ease-out-cubic curve from `from` to `target` and are
/// computed one at a time; the last one is exactly `target`.
pub struct Jump {
    from: f64,
    target: f64,
    steps: u64,
    next: u64,
    token: JumpToken,
    on_complete: Option<CompleteFn>,
}

impl Jump {
    pub fn new(
        from: f64,
        target: f64,
        duration_ms: f64,
        tick_ms: f64,
        on_complete: Option<CompleteFn>,
    ) -> Self {
        Self {
            from,
            target,
            steps: step_count(duration_ms, tick_ms),
            next: 0,
            token: JumpToken::new(JumpState::Running),
            on_complete,
        }
    }

    pub fn handle(&self) -> JumpHandle {
        JumpHandle {
            token: self.token.clone(),
            target: self.target,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn remaining(&self) -> u64 {
        self.steps - self.next
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn next_frame(&mut self) -> Option<f64> {
        if self.is_exhausted() {
            return None;
        }
        self.next += 1;
        if self.next == self.steps {
            return Some(self.target);
        }
        Some(ease_out_cubic(
            self.next as f64,
            self.from,
            self.target - self.from,
            self.steps as f64,
        ))
    }

    /// Cancel and drop; the completion hook never runs.
    pub fn cancel(self) {
        self.token.cancel();
    }

    /// Mark finished and run the completion hook once.
    pub fn finish(mut self) {
        self.token.finish();
        if let Some(cb) = self.on_complete.take() {
            cb();
        }
    }
}

impl fmt::Debug for Jump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jump")
            .field("target", &self.target)
            .field("remaining", &self.remaining())
            .field("state", &self.token.state())
            .finish()
    }
}
