//! Timeline configuration.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Input speeds, throttling and rendering switches for one timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum spacing in ms between two dispatched wheel/touch events.
    pub throttle_ms: f64,
    pub wheel_speed: f64,
    pub touch_speed: f64,
    pub keyboard_speed: f64,
    /// Route rendered styles through the tween engine when one is installed.
    pub use_tween: bool,
    /// Force ranges the current frame skipped over to their final/begin style.
    pub snap_passed_ranges: bool,
    /// Jump duration when the caller does not give one.
    pub default_jump_ms: f64,
    /// Nominal display refresh interval; one jump step per tick.
    pub tick_ms: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            throttle_ms: 16.0,
            wheel_speed: 1.0,
            touch_speed: 1.0,
            keyboard_speed: 1.0,
            use_tween: true,
            snap_passed_ranges: false,
            default_jump_ms: 500.0,
            tick_ms: 16.0,
        }
    }
}

/// Partial config; `None` fields leave the current value alone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    pub throttle_ms: Option<f64>,
    pub wheel_speed: Option<f64>,
    pub touch_speed: Option<f64>,
    pub keyboard_speed: Option<f64>,
    pub use_tween: Option<bool>,
    pub snap_passed_ranges: Option<bool>,
    pub default_jump_ms: Option<f64>,
    pub tick_ms: Option<f64>,
}

impl ConfigPatch {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Config {
    /// Shallow merge of `patch` into `self`.
    pub fn merge(&mut self, patch: ConfigPatch) {
        if let Some(v) = patch.throttle_ms {
            self.throttle_ms = v;
        }
        if let Some(v) = patch.wheel_speed {
            self.wheel_speed = v;
        }
        if let Some(v) = patch.touch_speed {
            self.touch_speed = v;
        }
        if let Some(v) = patch.keyboard_speed {
            self.keyboard_speed = v;
        }
        if let Some(v) = patch.use_tween {
            self.use_tween = v;
        }
        if let Some(v) = patch.snap_passed_ranges {
            self.snap_passed_ranges = v;
        }
        if let Some(v) = patch.default_jump_ms {
            self.default_jump_ms = v;
        }
        if let Some(v) = patch.tick_ms {
            self.tick_ms = v;
        }
    }
}
