//! primgraph-animation-core (engine-agnostic)
//!
//! Per-scalar keyframe storage with linear/step sampling, and the per-stage
//! time state the editor evaluates against. No GUI or I/O concerns live
//! here; the graph crate composes these into animatable parameters.

pub mod keyframes;
pub mod time;

pub use keyframes::{Keyframe, KeyframeStore};
pub use primgraph_api_core::{Scalar, ScalarKind, Value};
pub use time::{StageId, TimeContext, TimeEvent, TimeState};
