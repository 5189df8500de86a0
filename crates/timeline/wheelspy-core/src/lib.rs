//! wheelSpy core (host-agnostic)
//!
//! Maps a scroll-like "frame" position onto element styles. Targets carry
//! non-overlapping keyframe ranges; dispatching a frame interpolates every
//! range that covers it, converting units through the host where needed.
//! Browser bindings, tween engines and frame sources plug in through the
//! traits in [`host`] and [`scheduler`].

pub mod animator;
pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod host;
pub mod ids;
pub mod input;
pub mod interp;
pub mod keyframes;
pub mod memory;
pub mod outputs;
pub mod scheduler;
pub mod shorthand;
pub mod timeline;
pub mod value;

pub type Result<T> = core::result::Result<T, TimelineError>;

// Re-exports for consumers (adapters)
pub use animator::{JumpHandle, JumpState};
pub use config::{Config, ConfigPatch};
pub use convert::convert_unit;
pub use diagnostics::{DebugSnapshot, DiagnosticSink, LogSink};
pub use error::{ErrorKind, TimelineError};
pub use host::{StyleHost, TweenEngine};
pub use ids::{NodeId, TargetId};
pub use input::{InputRouter, Key};
pub use interp::interpolate_style;
pub use keyframes::{KeyframeRange, Target};
pub use memory::{DocumentSpec, MemoryHost, NodeSpec};
pub use outputs::{Change, ChangeKind, Outputs};
pub use scheduler::{drive, FrameSource, TimerFallback, VirtualClock};
pub use timeline::{TargetBuilder, TickOutcome, Timeline};
pub use value::{StyleDecl, StyleInput, StyleMap, UnitValue};
