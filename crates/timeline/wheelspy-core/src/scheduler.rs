//! Frame scheduling for jumps.
//!
//! A [`FrameSource`] blocks until the next display refresh. [`drive`] pairs one
//! with a timeline and ticks its jump to completion.

use std::time::{Duration, Instant};

use crate::host::StyleHost;
use crate::timeline::{TickOutcome, Timeline};
use crate::Result;

/// Nominal refresh interval (60 Hz) of the timer fallback.
pub const FALLBACK_FRAME_MS: f64 = 16.7;

/// Source of display refresh callbacks.
pub trait FrameSource {
    /// Wait for the next refresh and return its timestamp in ms.
    fn wait_frame(&mut self) -> f64;
}

/// Sleep-based source for hosts without a refresh-linked primitive.
///
/// Each wait sleeps whatever is left of the 16.7 ms slot since the previous
/// frame, so a slow caller is never delayed further.
#[derive(Debug)]
pub struct TimerFallback {
    origin: Instant,
    last_ms: f64,
}

impl TimerFallback {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_ms: 0.0,
        }
    }

    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    /// Time to sleep before the next frame, given the current timestamp.
    pub fn delay_ms(&self, now_ms: f64) -> f64 {
        (FALLBACK_FRAME_MS - (now_ms - self.last_ms)).max(0.0)
    }
}

impl Default for TimerFallback {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for TimerFallback {
    fn wait_frame(&mut self) -> f64 {
        let delay = self.delay_ms(self.now_ms());
        if delay > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(delay / 1000.0));
        }
        self.last_ms = self.now_ms();
        self.last_ms
    }
}

/// Non-sleeping source advancing a virtual clock by a fixed step.
#[derive(Clone, Debug, PartialEq)]
pub struct VirtualClock {
    now_ms: f64,
    step_ms: f64,
}

impl VirtualClock {
    pub fn new(step_ms: f64) -> Self {
        Self {
            now_ms: 0.0,
            step_ms,
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new(FALLBACK_FRAME_MS)
    }
}

impl FrameSource for VirtualClock {
    fn wait_frame(&mut self) -> f64 {
        self.now_ms += self.step_ms;
        self.now_ms
    }
}

/// Tick `timeline` once per refresh of `source` until its jump settles.
/// Returns the number of ticks that advanced or completed the jump.
pub fn drive<H, F>(timeline: &mut Timeline<H>, source: &mut F) -> Result<usize>
where
    H: StyleHost,
    F: FrameSource + ?Sized,
{
    let mut ticks = 0;
    while timeline.is_animating() {
        let now = source.wait_frame();
        match timeline.tick()? {
            TickOutcome::Idle => break,
            TickOutcome::Advanced { frame } => {
                log::trace!("tick {ticks} at {now:.1}ms -> frame {frame}");
                ticks += 1;
            }
            TickOutcome::Completed { frame } => {
                log::trace!("tick {ticks} at {now:.1}ms completed at frame {frame}");
                ticks += 1;
                break;
            }
        }
    }
    Ok(ticks)
}
