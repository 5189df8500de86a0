//! Timeline: data ownership and the frame dispatch loop.
//!
//! Methods:
//! - register / target (+ TargetBuilder::to), configure, pause/resume
//! - dispatch (clamp → render every covering range → progress hooks)
//! - jump / tick / cancel_jump (one eased animation at a time)

use crate::animator::{CompleteFn, Jump, JumpHandle};
use crate::config::{Config, ConfigPatch};
use crate::error::TimelineError;
use crate::host::{StyleHost, TweenEngine};
use crate::ids::{IdAllocator, NodeId, TargetId};
use crate::interp::interpolate_style;
use crate::keyframes::{KeyframeRange, ProgressFn, Target};
use crate::outputs::{Change, ChangeKind, Outputs};
use crate::shorthand;
use crate::value::{StyleDecl, StyleMap};
use crate::Result;

/// Dispatch durations (ms) are divided by this to get tween seconds.
pub const TWEEN_DURATION_DIVISOR: f64 = 500.0;

/// Shortest tween used when snapping a skipped range.
pub const MIN_SNAP_SECONDS: f64 = 0.5;

/// What a call to [`Timeline::tick`] did.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// No jump in flight (or it was cancelled).
    Idle,
    /// One jump frame was dispatched.
    Advanced { frame: f64 },
    /// The last frame was dispatched and the completion hook ran.
    Completed { frame: f64 },
}

/// One scroll-frame timeline over a host document.
pub struct Timeline<H: StyleHost> {
    host: H,
    tween: Option<Box<dyn TweenEngine>>,
    cfg: Config,
    ids: IdAllocator,
    targets: Vec<Target>,
    current_frame: f64,
    max_frame: f64,
    suppressed: bool,
    jump: Option<Jump>,
    outputs: Outputs,
}

impl<H: StyleHost> Timeline<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, Config::default())
    }

    pub fn with_config(host: H, cfg: Config) -> Self {
        Self {
            host,
            tween: None,
            cfg,
            ids: IdAllocator::new(),
            targets: Vec::new(),
            current_frame: 0.0,
            max_frame: 0.0,
            suppressed: false,
            jump: None,
            outputs: Outputs::default(),
        }
    }

    /// Install a tween engine; styles go through it while `use_tween` is on.
    pub fn with_tween(mut self, tween: Box<dyn TweenEngine>) -> Self {
        self.tween = Some(tween);
        self
    }

    pub fn set_tween(&mut self, tween: Option<Box<dyn TweenEngine>>) {
        self.tween = tween;
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn configure(&mut self, patch: ConfigPatch) {
        self.cfg.merge(patch);
    }

    pub fn configure_json(&mut self, text: &str) -> Result<()> {
        self.configure(ConfigPatch::from_json(text)?);
        Ok(())
    }

    #[inline]
    pub fn current_frame(&self) -> f64 {
        self.current_frame
    }

    #[inline]
    pub fn max_frame(&self) -> f64 {
        self.max_frame
    }

    /// Input handlers ignore events while paused; `dispatch`/`jump` still work.
    pub fn pause(&mut self) {
        self.suppressed = true;
    }

    pub fn resume(&mut self) {
        self.suppressed = false;
    }

    #[inline]
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    #[inline]
    pub fn has_targets(&self) -> bool {
        !self.targets.is_empty()
    }

    /// Targets in registration order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Bind a new target to the first element matching `selector`.
    pub fn register(&mut self, selector: &str) -> Result<TargetBuilder<'_, H>> {
        let node = self
            .host
            .query(selector)
            .ok_or_else(|| TimelineError::UnknownSelector {
                selector: selector.to_string(),
            })?;
        let id = self.ids.alloc_target();
        self.targets.push(Target::new(id, selector, node));
        log::debug!("registered target {id:?} for '{selector}' ({node})");
        Ok(TargetBuilder { timeline: self, id })
    }

    /// Builder for an already registered target.
    pub fn target_mut(&mut self, id: TargetId) -> Result<TargetBuilder<'_, H>> {
        if self.target(id).is_none() {
            return Err(TimelineError::UnknownTarget(id));
        }
        Ok(TargetBuilder { timeline: self, id })
    }

    fn add_range(
        &mut self,
        id: TargetId,
        start: f64,
        end: f64,
        decl: &StyleDecl,
        progress: Option<ProgressFn>,
    ) -> Result<()> {
        let style = shorthand::expand(&self.host, decl);
        let target = self
            .targets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TimelineError::UnknownTarget(id))?;
        target.add_range(start, end, style, progress)?;
        self.max_frame = self.max_frame.max(end);
        Ok(())
    }

    /// Clamp into `[0, max_frame]`; NaN keeps the current frame.
    pub fn clamp_frame(&self, frame: f64) -> f64 {
        if frame.is_nan() {
            return self.current_frame;
        }
        frame.clamp(0.0, self.max_frame)
    }

    /// Move to `frame` and render every range that covers it.
    ///
    /// `duration_ms` is the time the move should take on screen; it only
    /// matters when a tween engine renders the styles.
    pub fn dispatch(&mut self, frame: f64, duration_ms: f64) -> Result<&Outputs> {
        let frame = self.clamp_frame(frame);
        self.current_frame = frame;
        self.outputs.clear();
        self.outputs.frame = frame;

        let Self {
            host,
            tween,
            cfg,
            targets,
            outputs,
            ..
        } = self;
        let mut renderer = Renderer {
            host,
            tween: if cfg.use_tween { tween.as_deref_mut() } else { None },
        };

        for target in targets.iter_mut() {
            let (id, node) = (target.id, target.node);
            for (idx, range) in target.ranges_mut().iter_mut().enumerate() {
                if range.contains(frame) {
                    let percent = range.percent_at(frame);
                    let style = renderer.render(
                        node,
                        range,
                        percent,
                        duration_ms / TWEEN_DURATION_DIVISOR,
                    )?;
                    outputs.push_change(Change {
                        target: id,
                        node,
                        range: idx,
                        percent,
                        style,
                        kind: ChangeKind::Interpolated,
                    });
                }
                if cfg.snap_passed_ranges {
                    if let Some((percent, style)) = renderer.snap(node, range, frame)? {
                        outputs.push_change(Change {
                            target: id,
                            node,
                            range: idx,
                            percent,
                            style,
                            kind: ChangeKind::Snapped,
                        });
                    }
                }
            }
        }

        log::trace!(
            "dispatch frame={frame} rendered={}",
            self.outputs.changes.len()
        );
        Ok(&self.outputs)
    }

    /// Animate to `frame` over `duration_ms` (config default when `None`).
    pub fn jump(&mut self, frame: f64, duration_ms: Option<f64>) -> JumpHandle {
        self.start_jump(frame, duration_ms, None)
    }

    /// Like [`Timeline::jump`], running `on_complete` once the frame is reached.
    /// A superseded or cancelled jump never runs it.
    pub fn jump_then(
        &mut self,
        frame: f64,
        duration_ms: Option<f64>,
        on_complete: impl FnOnce() + 'static,
    ) -> JumpHandle {
        self.start_jump(frame, duration_ms, Some(Box::new(on_complete)))
    }

    fn start_jump(
        &mut self,
        frame: f64,
        duration_ms: Option<f64>,
        on_complete: Option<CompleteFn>,
    ) -> JumpHandle {
        self.cancel_jump();
        let target = self.clamp_frame(frame);
        let duration = duration_ms
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(self.cfg.default_jump_ms);

        if target == self.current_frame {
            if let Some(cb) = on_complete {
                cb();
            }
            return JumpHandle::finished(target);
        }

        let jump = Jump::new(
            self.current_frame,
            target,
            duration,
            self.cfg.tick_ms,
            on_complete,
        );
        log::debug!(
            "jump {} -> {target} in {} frames",
            self.current_frame,
            jump.remaining()
        );
        let handle = jump.handle();
        self.jump = Some(jump);
        handle
    }

    /// Drop the in-flight jump without running its completion hook.
    pub fn cancel_jump(&mut self) {
        if let Some(jump) = self.jump.take() {
            log::debug!("cancel jump to {}", jump.target());
            jump.cancel();
        }
    }

    pub fn is_animating(&self) -> bool {
        self.jump.as_ref().is_some_and(|j| !j.is_cancelled())
    }

    /// Advance the in-flight jump by one display refresh.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let Some(jump) = self.jump.as_mut() else {
            return Ok(TickOutcome::Idle);
        };
        if jump.is_cancelled() {
            self.jump = None;
            return Ok(TickOutcome::Idle);
        }
        let next = jump.next_frame();
        let exhausted = jump.is_exhausted();

        if let Some(frame) = next {
            let tick_ms = self.cfg.tick_ms;
            if let Err(err) = self.dispatch(frame, tick_ms) {
                self.cancel_jump();
                return Err(err);
            }
            if !exhausted {
                return Ok(TickOutcome::Advanced {
                    frame: self.current_frame,
                });
            }
        }

        match self.jump.take() {
            Some(jump) => {
                self.current_frame = jump.target();
                log::debug!("jump reached {}", self.current_frame);
                jump.finish();
                Ok(TickOutcome::Completed {
                    frame: self.current_frame,
                })
            }
            None => Ok(TickOutcome::Idle),
        }
    }
}

/// Applies styles through the tween engine or straight to the host.
struct Renderer<'a, H: StyleHost> {
    host: &'a mut H,
    tween: Option<&'a mut (dyn TweenEngine + 'static)>,
}

impl<H: StyleHost> Renderer<'_, H> {
    fn apply(&mut self, node: NodeId, style: &StyleMap, seconds: f64) {
        match self.tween.as_deref_mut() {
            Some(tween) => tween.tween(node, seconds, style),
            None => self.host.apply_style(node, style),
        }
    }

    fn render(
        &mut self,
        node: NodeId,
        range: &mut KeyframeRange,
        percent: f64,
        seconds: f64,
    ) -> Result<StyleMap> {
        let style = interpolate_style(
            &mut *self.host,
            node,
            &mut range.begin_style,
            &range.final_style,
            percent,
        )?;
        self.apply(node, &style, seconds);
        range.report(percent);
        Ok(style)
    }

    /// Force a range the frame has moved past to its final (or begin) style.
    fn snap(
        &mut self,
        node: NodeId,
        range: &mut KeyframeRange,
        frame: f64,
    ) -> Result<Option<(f64, StyleMap)>> {
        let forward = frame >= range.end && range.percent < 1.0;
        let backward = frame <= range.start && range.percent > 0.0;
        let (percent, seconds) = if forward {
            (1.0, (1.0 - range.percent).max(MIN_SNAP_SECONDS))
        } else if backward {
            (0.0, range.percent.max(MIN_SNAP_SECONDS))
        } else {
            return Ok(None);
        };
        let style = self.render(node, range, percent, seconds)?;
        Ok(Some((percent, style)))
    }
}

/// Chainable handle for adding ranges to one target.
pub struct TargetBuilder<'t, H: StyleHost> {
    timeline: &'t mut Timeline<H>,
    id: TargetId,
}

impl<H: StyleHost> TargetBuilder<'_, H> {
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// Animate towards `style` between frames `start` and `end`.
    pub fn to(&mut self, start: f64, end: f64, style: StyleDecl) -> Result<&mut Self> {
        self.timeline.add_range(self.id, start, end, &style, None)?;
        Ok(self)
    }

    /// Like [`TargetBuilder::to`], calling `progress` with the range percent on every render.
    pub fn to_with(
        &mut self,
        start: f64,
        end: f64,
        style: StyleDecl,
        progress: impl FnMut(f64) + 'static,
    ) -> Result<&mut Self> {
        self.timeline
            .add_range(self.id, start, end, &style, Some(Box::new(progress)))?;
        Ok(self)
    }
}
