//! Numeric handles for nodes, ports, and connections.
//!
//! Handles are never reused within a graph's lifetime; each kind counts
//! up from zero independently of the others.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PortId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u32);

/// Hands out fresh handles, one counter per entity kind.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_node: u32,
    next_port: u32,
    next_connection: u32,
}

fn bump(counter: &mut u32) -> u32 {
    let id = *counter;
    *counter = counter.wrapping_add(1);
    id
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_node(&mut self) -> NodeId {
        NodeId(bump(&mut self.next_node))
    }

    pub fn alloc_port(&mut self) -> PortId {
        PortId(bump(&mut self.next_port))
    }

    pub fn alloc_connection(&mut self) -> ConnectionId {
        ConnectionId(bump(&mut self.next_connection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_counts_independently() {
        let mut ids = IdAllocator::new();
        ids.alloc_node();
        ids.alloc_node();
        ids.alloc_port();
        // A third node keeps its own sequence regardless of how many
        // ports or connections were handed out in between.
        assert_eq!(ids.alloc_node(), NodeId(2));
        assert_eq!(ids.alloc_port(), PortId(1));
        assert_eq!(ids.alloc_connection(), ConnectionId(0));
    }
}
