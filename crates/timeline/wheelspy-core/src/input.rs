//! Wheel, touch and keyboard input mapped to frame dispatches.
//!
//! The router owns the throttling state of each device. Events arriving
//! faster than `Config::throttle_ms` park a trailing dispatch that
//! [`InputRouter::poll`] fires once it is due; a newer event of the same
//! device replaces it. Every handler returns whether the host should treat
//! the event as consumed (suppress its default scrolling).

use serde::{Deserialize, Serialize};

use crate::host::StyleHost;
use crate::timeline::Timeline;
use crate::Result;

/// Delay of a trailing dispatch and the duration it renders with.
pub const TRAILING_DELAY_MS: f64 = 100.0;
/// Idle time after which a wheel session starts over.
pub const WHEEL_SESSION_MS: f64 = 300.0;
/// Frames per wheel notch at `wheel_speed == 1`.
pub const WHEEL_FRAMES_PER_NOTCH: f64 = 10.0;
/// A touch gesture shorter than this...
pub const SWIPE_MAX_MS: f64 = 300.0;
/// ...and longer than this counts as a swipe.
pub const SWIPE_MIN_PX: f64 = 30.0;
/// Frames per arrow key press at `keyboard_speed == 1`.
pub const KEY_FRAMES: f64 = 2.0;
pub const KEY_DURATION_MS: f64 = 30.0;

/// Raw wheel reading; browsers report one or the other.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WheelDelta {
    /// `wheelDelta` style: 120 per notch, positive when scrolling up.
    Delta(f64),
    /// `detail` style: 3 per notch, positive when scrolling down.
    Detail(f64),
}

impl WheelDelta {
    /// Notches towards the end of the timeline.
    pub fn notches(self) -> f64 {
        match self {
            WheelDelta::Delta(d) => -d / 120.0,
            WheelDelta::Detail(d) => d / 3.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Other,
}

impl Key {
    pub fn from_code(code: u32) -> Self {
        match code {
            38 => Key::Up,
            40 => Key::Down,
            _ => Key::Other,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct Pending {
    due_ms: f64,
    /// Touch movement captured by the event; wheel reads its accumulator.
    touch_change: f64,
}

#[derive(Clone, Debug, Default)]
struct WheelState {
    notches: f64,
    last_ms: Option<f64>,
    reset_at: Option<f64>,
    pending: Option<Pending>,
}

#[derive(Clone, Debug, Default)]
struct TouchState {
    start_y: Option<f64>,
    start_ms: f64,
    current_y: f64,
    current_ms: f64,
    pending: Option<Pending>,
}

#[derive(Clone, Debug, Default)]
pub struct InputRouter {
    wheel: WheelState,
    touch: TouchState,
}

fn accepts<H: StyleHost>(timeline: &Timeline<H>) -> bool {
    timeline.has_targets() && !timeline.is_suppressed()
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a trailing dispatch is waiting for [`InputRouter::poll`].
    pub fn has_pending(&self) -> bool {
        self.wheel.pending.is_some() || self.touch.pending.is_some()
    }

    /// Earliest time a pending dispatch becomes due.
    pub fn next_due(&self) -> Option<f64> {
        [self.wheel.pending, self.touch.pending]
            .into_iter()
            .flatten()
            .map(|p| p.due_ms)
            .reduce(f64::min)
    }

    fn expire_wheel_session(&mut self, now_ms: f64) {
        if self.wheel.reset_at.is_some_and(|at| now_ms >= at) {
            self.wheel.last_ms = None;
            self.wheel.reset_at = None;
        }
    }

    pub fn on_wheel<H: StyleHost>(
        &mut self,
        timeline: &mut Timeline<H>,
        now_ms: f64,
        delta: WheelDelta,
    ) -> Result<bool> {
        self.wheel.pending = None;
        if !accepts(timeline) {
            return Ok(true);
        }
        self.expire_wheel_session(now_ms);
        self.wheel.notches += delta.notches();

        let Some(last) = self.wheel.last_ms else {
            self.wheel.last_ms = Some(now_ms);
            return Ok(true);
        };
        let elapsed = now_ms - last;
        if elapsed < timeline.config().throttle_ms {
            self.wheel.pending = Some(Pending {
                due_ms: now_ms + TRAILING_DELAY_MS,
                touch_change: 0.0,
            });
            return Ok(true);
        }

        self.wheel.last_ms = Some(now_ms);
        self.dispatch_wheel(timeline, elapsed)?;
        self.wheel.reset_at = Some(now_ms + WHEEL_SESSION_MS);
        Ok(true)
    }

    fn dispatch_wheel<H: StyleHost>(
        &mut self,
        timeline: &mut Timeline<H>,
        duration_ms: f64,
    ) -> Result<()> {
        let speed = timeline.config().wheel_speed;
        let frame = timeline.current_frame() + self.wheel.notches * speed * WHEEL_FRAMES_PER_NOTCH;
        self.wheel.notches = 0.0;
        timeline.dispatch(frame, duration_ms)?;
        Ok(())
    }

    pub fn on_touch_start<H: StyleHost>(
        &mut self,
        timeline: &Timeline<H>,
        now_ms: f64,
        page_y: f64,
    ) -> bool {
        if !accepts(timeline) {
            return false;
        }
        let touch = &mut self.touch;
        touch.start_y = Some(page_y);
        touch.current_y = page_y;
        touch.start_ms = now_ms;
        touch.current_ms = now_ms;
        true
    }

    pub fn on_touch_move<H: StyleHost>(
        &mut self,
        timeline: &mut Timeline<H>,
        now_ms: f64,
        page_y: f64,
    ) -> Result<bool> {
        self.touch.pending = None;
        if self.touch.start_y.is_none() || !accepts(timeline) {
            return Ok(true);
        }
        // finger up scrolls forward
        let change = self.touch.current_y - page_y;
        self.touch.current_y = page_y;

        let elapsed = now_ms - self.touch.current_ms;
        if elapsed < timeline.config().throttle_ms {
            self.touch.pending = Some(Pending {
                due_ms: now_ms + TRAILING_DELAY_MS,
                touch_change: change,
            });
            return Ok(true);
        }
        self.touch.current_ms = now_ms;
        let frame = timeline.current_frame() + change * timeline.config().touch_speed;
        timeline.dispatch(frame, elapsed)?;
        Ok(true)
    }

    /// Ends the gesture; a short, long-distance gesture continues as a swipe.
    pub fn on_touch_end<H: StyleHost>(&mut self, timeline: &mut Timeline<H>) -> Result<bool> {
        if !accepts(timeline) {
            return Ok(false);
        }
        let Some(start_y) = self.touch.start_y.take() else {
            return Ok(false);
        };
        let distance = start_y - self.touch.current_y;
        let elapsed = self.touch.current_ms - self.touch.start_ms;
        if elapsed < SWIPE_MAX_MS && distance.abs() > SWIPE_MIN_PX {
            log::debug!("swipe {distance}px in {elapsed}ms");
            let frame = timeline.current_frame() + distance * timeline.config().touch_speed;
            timeline.dispatch(frame, elapsed * 2.0)?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn on_key<H: StyleHost>(&mut self, timeline: &mut Timeline<H>, key: Key) -> Result<bool> {
        let direction = match key {
            Key::Down => 1.0,
            Key::Up => -1.0,
            Key::Other => return Ok(false),
        };
        if accepts(timeline) {
            let step = timeline.config().keyboard_speed * KEY_FRAMES;
            let frame = timeline.current_frame() + direction * step;
            timeline.dispatch(frame, KEY_DURATION_MS)?;
        }
        Ok(true)
    }

    /// Fire trailing dispatches due at `now_ms`. Returns how many ran.
    pub fn poll<H: StyleHost>(&mut self, timeline: &mut Timeline<H>, now_ms: f64) -> Result<usize> {
        let mut fired = 0;
        if self.wheel.pending.is_some_and(|p| p.due_ms <= now_ms) {
            self.wheel.pending = None;
            if accepts(timeline) {
                self.dispatch_wheel(timeline, TRAILING_DELAY_MS)?;
                fired += 1;
            }
        }
        if let Some(p) = self.touch.pending.filter(|p| p.due_ms <= now_ms) {
            self.touch.pending = None;
            if accepts(timeline) {
                let frame =
                    timeline.current_frame() + p.touch_change * timeline.config().touch_speed;
                timeline.dispatch(frame, TRAILING_DELAY_MS)?;
                fired += 1;
            }
        }
        self.expire_wheel_session(now_ms);
        Ok(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHost;
    use crate::value::StyleDecl;

    fn timeline() -> Timeline<MemoryHost> {
        let mut host = MemoryHost::new();
        let root = host.root();
        host.append(root, "div", Some("box"), &[]);
        let mut tl = Timeline::new(host);
        tl.register("#box")
            .unwrap()
            .to(0.0, 1000.0, StyleDecl::new().with("left", 1000))
            .unwrap();
        tl
    }

    #[test]
    fn wheel_notches() {
        assert_eq!(WheelDelta::Delta(-240.0).notches(), 2.0);
        assert_eq!(WheelDelta::Detail(-3.0).notches(), -1.0);
    }

    #[test]
    fn first_wheel_event_only_starts_the_session() {
        let mut tl = timeline();
        let mut input = InputRouter::new();
        assert!(input.on_wheel(&mut tl, 0.0, WheelDelta::Delta(-120.0)).unwrap());
        assert_eq!(tl.current_frame(), 0.0);
        // the first notch is kept and dispatched with the second
        input.on_wheel(&mut tl, 50.0, WheelDelta::Delta(-120.0)).unwrap();
        assert_eq!(tl.current_frame(), 20.0);
    }

    #[test]
    fn wheel_session_expires_after_idle() {
        let mut tl = timeline();
        let mut input = InputRouter::new();
        input.on_wheel(&mut tl, 0.0, WheelDelta::Detail(3.0)).unwrap();
        input.on_wheel(&mut tl, 40.0, WheelDelta::Detail(3.0)).unwrap();
        assert_eq!(tl.current_frame(), 20.0);
        // past the idle window the next event only restarts the session
        input.on_wheel(&mut tl, 400.0, WheelDelta::Detail(3.0)).unwrap();
        assert_eq!(tl.current_frame(), 20.0);
    }

    #[test]
    fn keys_step_by_keyboard_speed() {
        let mut tl = timeline();
        tl.configure(crate::config::ConfigPatch {
            keyboard_speed: Some(5.0),
            ..Default::default()
        });
        let mut input = InputRouter::new();
        assert!(input.on_key(&mut tl, Key::from_code(40)).unwrap());
        assert_eq!(tl.current_frame(), 10.0);
        assert!(input.on_key(&mut tl, Key::Up).unwrap());
        assert_eq!(tl.current_frame(), 0.0);
        assert!(!input.on_key(&mut tl, Key::from_code(13)).unwrap());
    }

    #[test]
    fn touch_move_follows_the_finger() {
        let mut tl = timeline();
        let mut input = InputRouter::new();
        assert!(input.on_touch_start(&tl, 0.0, 500.0));
        input.on_touch_move(&mut tl, 20.0, 440.0).unwrap();
        assert_eq!(tl.current_frame(), 60.0);
        input.on_touch_move(&mut tl, 40.0, 460.0).unwrap();
        assert_eq!(tl.current_frame(), 40.0);
    }

    #[test]
    fn no_targets_means_no_input() {
        let mut tl = Timeline::new(MemoryHost::new());
        let mut input = InputRouter::new();
        assert!(!input.on_touch_start(&tl, 0.0, 10.0));
        input.on_wheel(&mut tl, 0.0, WheelDelta::Delta(-120.0)).unwrap();
        input.on_wheel(&mut tl, 50.0, WheelDelta::Delta(-120.0)).unwrap();
        assert_eq!(tl.current_frame(), 0.0);
        assert!(!input.has_pending());
    }
}
