//! Debug snapshots of a timeline's state.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::host::StyleHost;
use crate::ids::{NodeId, TargetId};
use crate::keyframes::{KeyframeRange, Target};
use crate::timeline::Timeline;
use crate::value::StyleMap;

/// Shown through `StyleHost::notify` when `debug` is called without a sink.
pub const DEBUG_DISABLED: &str = "Debug is disabled";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeSnapshot {
    pub start: f64,
    pub end: f64,
    pub percent: f64,
    pub begin_style: StyleMap,
    pub final_style: StyleMap,
    pub has_progress: bool,
}

impl From<&KeyframeRange> for RangeSnapshot {
    fn from(r: &KeyframeRange) -> Self {
        Self {
            start: r.start,
            end: r.end,
            percent: r.percent,
            begin_style: r.begin_style.clone(),
            final_style: r.final_style.clone(),
            has_progress: r.has_progress(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetSnapshot {
    pub id: TargetId,
    pub selector: String,
    pub node: NodeId,
    pub ranges: Vec<RangeSnapshot>,
}

impl From<&Target> for TargetSnapshot {
    fn from(t: &Target) -> Self {
        Self {
            id: t.id,
            selector: t.selector.clone(),
            node: t.node,
            ranges: t.ranges().iter().map(RangeSnapshot::from).collect(),
        }
    }
}

/// Everything `Timeline::debug` reports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebugSnapshot {
    pub current_frame: f64,
    pub max_frame: f64,
    /// False while input is paused.
    pub spy_on: bool,
    pub animating: bool,
    pub targets: Vec<TargetSnapshot>,
    pub config: Config,
}

/// Receiver of debug snapshots (a console, a devtools panel, a test).
pub trait DiagnosticSink {
    fn report(&mut self, snapshot: &DebugSnapshot);
}

/// Writes snapshots as JSON through `log::info!`.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, snapshot: &DebugSnapshot) {
        match serde_json::to_string(snapshot) {
            Ok(json) => log::info!("wheelspy debug: {json}"),
            Err(err) => log::warn!("wheelspy debug: cannot serialize snapshot: {err}"),
        }
    }
}

impl DiagnosticSink for Vec<DebugSnapshot> {
    fn report(&mut self, snapshot: &DebugSnapshot) {
        self.push(snapshot.clone());
    }
}

impl<H: StyleHost> Timeline<H> {
    pub fn snapshot(&self) -> DebugSnapshot {
        DebugSnapshot {
            current_frame: self.current_frame(),
            max_frame: self.max_frame(),
            spy_on: !self.is_suppressed(),
            animating: self.is_animating(),
            targets: self.targets().iter().map(TargetSnapshot::from).collect(),
            config: self.config().clone(),
        }
    }

    /// Report the current state to `sink`, or tell the user debugging is off.
    pub fn debug(&mut self, sink: Option<&mut dyn DiagnosticSink>) {
        match sink {
            Some(sink) => sink.report(&self.snapshot()),
            None => self.host_mut().notify(DEBUG_DISABLED),
        }
    }
}
