//! primgraph-api-core: shared Scalar/Value vocabulary and the listener
//! registry used by the graph and animation crates.

pub mod notify;
pub mod value;

pub use notify::{ListenerId, Notifier};
pub use value::{Scalar, ScalarKind, Value};
