//! Targets and their keyframe ranges.
//!
//! A target owns an ordered list of non-overlapping frame ranges. Each range
//! carries its final style and a begin style inherited from the range added
//! before it (empty for the first one, resolved from the element on render).

use std::fmt;

use crate::error::TimelineError;
use crate::ids::{NodeId, TargetId};
use crate::interp::functions::clamp_percent;
use crate::value::StyleMap;
use crate::Result;

/// Per-frame progress hook, called with the range percent in [0,1].
pub type ProgressFn = Box<dyn FnMut(f64)>;

pub struct KeyframeRange {
    pub start: f64,
    pub end: f64,
    pub final_style: StyleMap,
    pub begin_style: StyleMap,
    /// Percent at the last render or snap.
    pub percent: f64,
    progress: Option<ProgressFn>,
}

impl KeyframeRange {
    #[inline]
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Inclusive on both ends, so boundary frames render the range.
    #[inline]
    pub fn contains(&self, frame: f64) -> bool {
        frame >= self.start && frame <= self.end
    }

    /// Whether `[start, end)` intersects this range's `[start, end)`.
    #[inline]
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        start < self.end && self.start < end
    }

    #[inline]
    pub fn percent_at(&self, frame: f64) -> f64 {
        clamp_percent((frame - self.start) / self.span())
    }

    pub fn has_progress(&self) -> bool {
        self.progress.is_some()
    }

    pub(crate) fn report(&mut self, percent: f64) {
        self.percent = percent;
        if let Some(cb) = self.progress.as_mut() {
            cb(percent);
        }
    }
}

impl fmt::Debug for KeyframeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyframeRange")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("final_style", &self.final_style)
            .field("begin_style", &self.begin_style)
            .field("percent", &self.percent)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Check `[start, end)` against the ranges already registered.
pub fn validate_range(ranges: &[KeyframeRange], start: f64, end: f64) -> Result<()> {
    if !start.is_finite() || !end.is_finite() || start >= end {
        return Err(TimelineError::InvalidRange { start, end });
    }
    if let Some(existing) = ranges.iter().find(|r| r.overlaps(start, end)) {
        return Err(TimelineError::OverlappingRange {
            start: existing.start,
            end: existing.end,
        });
    }
    Ok(())
}

/// One element bound to the timeline.
#[derive(Debug)]
pub struct Target {
    pub id: TargetId,
    pub selector: String,
    pub node: NodeId,
    ranges: Vec<KeyframeRange>,
}

impl Target {
    pub fn new(id: TargetId, selector: impl Into<String>, node: NodeId) -> Self {
        Self {
            id,
            selector: selector.into(),
            node,
            ranges: Vec::new(),
        }
    }

    pub fn ranges(&self) -> &[KeyframeRange] {
        &self.ranges
    }

    pub(crate) fn ranges_mut(&mut self) -> &mut [KeyframeRange] {
        &mut self.ranges
    }

    /// Append a range with an already expanded final style.
    pub fn add_range(
        &mut self,
        start: f64,
        end: f64,
        final_style: StyleMap,
        progress: Option<ProgressFn>,
    ) -> Result<&KeyframeRange> {
        validate_range(&self.ranges, start, end)?;
        let begin_style = self
            .ranges
            .last()
            .map(|prev| prev.final_style.clone())
            .unwrap_or_default();
        self.ranges.push(KeyframeRange {
            start,
            end,
            final_style,
            begin_style,
            percent: 0.0,
            progress,
        });
        Ok(&self.ranges[self.ranges.len() - 1])
    }
}
