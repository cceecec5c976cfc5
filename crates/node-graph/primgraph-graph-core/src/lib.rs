//! Connectivity core for the primgraph scene-graph editor.
//!
//! The modules are organised to keep domain concerns isolated:
//!
//! - [`ids`] dense identifiers for nodes, ports, and connections.
//! - [`types`] the data model: nodes, directional ports, directed edges.
//! - [`parameter`] animatable parameters and their export records.
//! - [`graph`] the arena that owns everything and enforces the connection
//!   invariants, traversal queries, and notifications.
//! - [`label`] the two expression-label placeholder forms.
//!
//! Integration code should primarily interact with [`Graph`].

pub mod error;
pub mod graph;
pub mod ids;
pub mod label;
pub mod parameter;
pub mod types;

pub use error::GraphError;
pub use graph::{Graph, GraphEvent, PRIM_NAME_PARAM};
pub use ids::{ConnectionId, IdAllocator, NodeId, PortId};
pub use label::resolve_label;
pub use parameter::{ParamRecord, Parameter};
pub use primgraph_api_core::{Scalar, ScalarKind, Value};
pub use types::{Connection, Direction, Node, Orientation, Port};
