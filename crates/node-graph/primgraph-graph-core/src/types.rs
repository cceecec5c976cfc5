//! Data model: nodes, directional ports, directed connections.
//!
//! Ports carry an explicit [`Direction`] field rather than being distinct
//! types, and an [`Orientation`] distinguishing plain (vertical data flow)
//! from shader-style (horizontal) endpoints. Connections are always stored
//! source = output side, target = input side, regardless of which side
//! initiated the request.

use serde::{Deserialize, Serialize};

use crate::ids::{ConnectionId, NodeId, PortId};
use crate::parameter::Parameter;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

/// How a port presents on its node: plain ports stack on the top/bottom
/// edge, shader ports on the left/right edge. Connectivity rules do not
/// depend on this.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Directional connection endpoint, exclusively owned by one node.
#[derive(Clone, Debug)]
pub struct Port {
    pub id: PortId,
    pub node: NodeId,
    pub name: String,
    pub direction: Direction,
    pub orientation: Orientation,
    pub(crate) connections: Vec<ConnectionId>,
}

impl Port {
    /// Connections this port participates in, in attach order.
    pub fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }
}

/// Directed edge from an output port to an input port.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Connection {
    pub id: ConnectionId,
    pub source: PortId,
    pub target: PortId,
}

/// A typed graph vertex owning ports and parameters.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub node_class: String,
    pub(crate) ports: Vec<PortId>,
    pub(crate) parameters: Vec<Parameter>,
}

impl Node {
    /// Port ids in creation order.
    pub fn ports(&self) -> &[PortId] {
        &self.ports
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.name() == name)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameter(name).is_some()
    }
}
