//! The graph arena: connection management, traversal, and export.
//!
//! All nodes, ports, and connections live in id-keyed maps owned here, so
//! cascade destruction is deterministic: a connection is deregistered from
//! both endpoints before its slot is released, and a port is detached from
//! its node only after every referencing connection is gone. Observers are
//! notified after the mutation completes, never mid-state.

use hashbrown::{HashMap, HashSet};
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use primgraph_api_core::{ListenerId, Notifier, Scalar, Value};

use crate::error::GraphError;
use crate::ids::{ConnectionId, IdAllocator, NodeId, PortId};
use crate::parameter::Parameter;
use crate::types::{Connection, Direction, Node, Orientation, Port};

/// Parameter carrying the prim-name trait used by ancestor path queries.
pub const PRIM_NAME_PARAM: &str = "primName";

/// Notifications delivered to graph observers.
#[derive(Clone, Debug)]
pub enum GraphEvent {
    /// A port's connection list changed; `node` is the input-side node of
    /// the affected edge. Emitted once per mutation, not once per port.
    ConnectionChanged { node: NodeId },
    /// A parameter took a new effective value.
    ValueChanged {
        node: NodeId,
        parameter: String,
        value: Value,
    },
}

#[derive(Debug, Default)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    ports: HashMap<PortId, Port>,
    connections: HashMap<ConnectionId, Connection>,
    ids: IdAllocator,
    notifier: Notifier<GraphEvent>,
    /// Node creation order, for stable iteration and export.
    order: Vec<NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- construction ----------------------------------------------------

    /// Create a node. The requested name is made unique within the graph by
    /// appending a numeric suffix when taken. Built-in parameters (`name`,
    /// `label`, `x`, `y`, `disable`) are installed on every node.
    pub fn add_node(&mut self, name: impl Into<String>, node_class: impl Into<String>) -> NodeId {
        let name = self.unique_name(&name.into(), None);
        let node_class = node_class.into();
        let id = self.ids.alloc_node();
        let parameters = vec![
            Parameter::new("name", "string", Value::text(name.clone())).with_built_in(),
            Parameter::new("label", "string", Value::text("")).with_built_in(),
            Parameter::new("x", "float", Value::f(0.0))
                .with_built_in()
                .with_visible(false),
            Parameter::new("y", "float", Value::f(0.0))
                .with_built_in()
                .with_visible(false),
            Parameter::new("disable", "bool", Value::boolean(false))
                .with_built_in()
                .with_visible(false),
        ];
        self.nodes.insert(
            id,
            Node {
                id,
                name,
                node_class,
                ports: Vec::new(),
                parameters,
            },
        );
        self.order.push(id);
        id
    }

    fn unique_name(&self, base: &str, exclude: Option<NodeId>) -> String {
        let taken = |name: &str| {
            self.find_node(name)
                .is_some_and(|id| Some(id) != exclude)
        };
        if !taken(base) {
            return base.to_string();
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{base}{n}");
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Add a port to `node`. Names must be unique among the node's ports of
    /// the same direction.
    pub fn add_port(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        direction: Direction,
        orientation: Orientation,
    ) -> Result<PortId, GraphError> {
        let name = name.into();
        let owner = self
            .nodes
            .get(&node)
            .ok_or(GraphError::UnknownNode { id: node })?;
        let taken = owner.ports.iter().any(|pid| {
            self.ports
                .get(pid)
                .is_some_and(|p| p.direction == direction && p.name == name)
        });
        if taken {
            return Err(GraphError::DuplicatePort {
                node: owner.name.clone(),
                name,
                direction: direction.as_str(),
            });
        }
        let id = self.ids.alloc_port();
        self.ports.insert(
            id,
            Port {
                id,
                node,
                name,
                direction,
                orientation,
                connections: Vec::new(),
            },
        );
        if let Some(owner) = self.nodes.get_mut(&node) {
            owner.ports.push(id);
        }
        Ok(id)
    }

    // ---- lookup ----------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(&id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Nodes in creation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.nodes.get(id).is_some_and(|n| n.name == name))
    }

    pub fn find_port(&self, node: NodeId, name: &str, direction: Direction) -> Option<PortId> {
        let owner = self.nodes.get(&node)?;
        owner.ports.iter().copied().find(|pid| {
            self.ports
                .get(pid)
                .is_some_and(|p| p.direction == direction && p.name == name)
        })
    }

    pub fn input_port(&self, node: NodeId, name: &str) -> Option<PortId> {
        self.find_port(node, name, Direction::Input)
    }

    pub fn output_port(&self, node: NodeId, name: &str) -> Option<PortId> {
        self.find_port(node, name, Direction::Output)
    }

    fn node_name(&self, id: NodeId) -> String {
        self.nodes
            .get(&id)
            .map_or_else(|| format!("{id:?}"), |n| n.name.clone())
    }

    // ---- connection management -------------------------------------------

    /// Connect two ports, normalizing direction so the input side becomes
    /// the target. Self-connection and duplicate edges are logged no-ops
    /// (`Ok(None)`); same-direction or same-node requests are rejected.
    /// An input port that is already driven has its previous edge replaced,
    /// keeping the single-producer invariant.
    ///
    /// On success one `ConnectionChanged` notification fires, after both
    /// ports' lists are updated.
    pub fn connect(&mut self, a: PortId, b: PortId) -> Result<Option<ConnectionId>, GraphError> {
        if a == b {
            log::warn!("ignoring self-connection request on {a:?}");
            return Ok(None);
        }
        let pa = self.ports.get(&a).ok_or(GraphError::UnknownPort { id: a })?;
        let pb = self.ports.get(&b).ok_or(GraphError::UnknownPort { id: b })?;
        if pa.node == pb.node {
            return Err(GraphError::SameNode { a, b });
        }
        if pa.direction == pb.direction {
            return Err(GraphError::SameDirection {
                a,
                b,
                direction: pa.direction.as_str(),
            });
        }
        let duplicate = pa.connections.iter().any(|cid| {
            self.connections.get(cid).is_some_and(|c| {
                (c.source == a && c.target == b) || (c.source == b && c.target == a)
            })
        });
        if duplicate {
            log::debug!("ignoring duplicate edge between {a:?} and {b:?}");
            return Ok(None);
        }

        let (source, target) = if pa.direction == Direction::Input {
            (b, a)
        } else {
            (a, b)
        };

        // Single-producer: silently drop the edge currently driving the
        // input side, then emit one notification for the whole exchange.
        let existing: Vec<ConnectionId> = self
            .ports
            .get(&target)
            .map(|p| {
                p.connections
                    .iter()
                    .copied()
                    .filter(|cid| {
                        self.connections
                            .get(cid)
                            .is_some_and(|c| c.target == target)
                    })
                    .collect()
            })
            .unwrap_or_default();
        for cid in existing {
            self.release_connection(cid);
        }

        let id = self.ids.alloc_connection();
        self.connections.insert(id, Connection { id, source, target });
        if let Some(p) = self.ports.get_mut(&source) {
            p.connections.push(id);
        }
        if let Some(p) = self.ports.get_mut(&target) {
            p.connections.push(id);
        }
        let node = self.ports.get(&target).map(|p| p.node);
        if let Some(node) = node {
            self.notifier.emit(&GraphEvent::ConnectionChanged { node });
        }
        Ok(Some(id))
    }

    /// By-name convenience: drive `node`'s input from `source`'s output.
    pub fn connect_source(
        &mut self,
        node: NodeId,
        input_name: &str,
        source: NodeId,
        output_name: &str,
    ) -> Result<Option<ConnectionId>, GraphError> {
        let input = self
            .input_port(node, input_name)
            .ok_or_else(|| GraphError::PortNotFound {
                node: self.node_name(node),
                name: input_name.to_string(),
            })?;
        let output = self
            .output_port(source, output_name)
            .ok_or_else(|| GraphError::PortNotFound {
                node: self.node_name(source),
                name: output_name.to_string(),
            })?;
        self.connect(input, output)
    }

    /// Remove a connection from both endpoints before releasing it, then
    /// notify once.
    pub fn disconnect(&mut self, id: ConnectionId) -> Result<(), GraphError> {
        let conn = self
            .release_connection(id)
            .ok_or(GraphError::UnknownConnection { id })?;
        let node = self.ports.get(&conn.target).map(|p| p.node);
        if let Some(node) = node {
            self.notifier.emit(&GraphEvent::ConnectionChanged { node });
        }
        Ok(())
    }

    /// Deregister `id` from both endpoint ports and free its slot. No
    /// notification; callers decide how to report the mutation.
    fn release_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let conn = self.connections.remove(&id)?;
        for endpoint in [conn.source, conn.target] {
            if let Some(port) = self.ports.get_mut(&endpoint) {
                port.connections.retain(|cid| *cid != id);
            }
        }
        Some(conn)
    }

    /// Destroy a port: cascade removal of every connection referencing it,
    /// detach it from its node, then free it, in that order. Counterpart
    /// input-side nodes are notified after the cascade completes.
    pub fn destroy_port(&mut self, id: PortId) -> Result<(), GraphError> {
        let port = self.ports.get(&id).ok_or(GraphError::UnknownPort { id })?;
        let owner = port.node;
        let cascade: Vec<ConnectionId> = port.connections.clone();

        let mut touched: Vec<NodeId> = Vec::new();
        for cid in cascade {
            if let Some(conn) = self.release_connection(cid) {
                // The input-side port still resolves here; it is only this
                // port's storage that goes away below.
                if let Some(p) = self.ports.get(&conn.target) {
                    if !touched.contains(&p.node) {
                        touched.push(p.node);
                    }
                }
            }
        }
        if let Some(node) = self.nodes.get_mut(&owner) {
            node.ports.retain(|pid| *pid != id);
        }
        self.ports.remove(&id);

        for node in touched {
            self.notifier.emit(&GraphEvent::ConnectionChanged { node });
        }
        Ok(())
    }

    /// Destroy every port of the node (cascading its connections), then the
    /// node itself.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let ports: Vec<PortId> = self
            .nodes
            .get(&id)
            .ok_or(GraphError::UnknownNode { id })?
            .ports
            .clone();
        for pid in ports {
            self.destroy_port(pid)?;
        }
        self.nodes.remove(&id);
        self.order.retain(|nid| *nid != id);
        Ok(())
    }

    // ---- queries ---------------------------------------------------------

    /// Connections where `port` is the output side.
    pub fn connections_as_source(&self, port: PortId) -> Vec<&Connection> {
        self.port_connections(port, |c| c.source == port)
    }

    /// Connections where `port` is the input side.
    pub fn connections_as_target(&self, port: PortId) -> Vec<&Connection> {
        self.port_connections(port, |c| c.target == port)
    }

    fn port_connections(
        &self,
        port: PortId,
        keep: impl Fn(&Connection) -> bool,
    ) -> Vec<&Connection> {
        self.ports
            .get(&port)
            .map(|p| {
                p.connections
                    .iter()
                    .filter_map(|cid| self.connections.get(cid))
                    .filter(|c| keep(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Distinct nodes feeding this node's input ports, in port order.
    pub fn upstream_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.neighboring_nodes(node, Direction::Input)
    }

    /// Distinct nodes consuming this node's output ports, in port order.
    pub fn downstream_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.neighboring_nodes(node, Direction::Output)
    }

    fn neighboring_nodes(&self, node: NodeId, direction: Direction) -> Vec<NodeId> {
        let Some(n) = self.nodes.get(&node) else {
            return Vec::new();
        };
        let mut out: Vec<NodeId> = Vec::new();
        for pid in &n.ports {
            let Some(port) = self.ports.get(pid) else {
                continue;
            };
            if port.direction != direction {
                continue;
            }
            for conn in port.connections.iter().filter_map(|cid| self.connections.get(cid)) {
                let far = match direction {
                    Direction::Input => conn.source,
                    Direction::Output => conn.target,
                };
                if let Some(far_port) = self.ports.get(&far) {
                    if !out.contains(&far_port.node) {
                        out.push(far_port.node);
                    }
                }
            }
        }
        out
    }

    /// Nearest ancestor exposing the prim-name trait, walking strictly
    /// upward through single-producer chains. A node with zero or more than
    /// one upstream producer terminates the search; cycles do too.
    pub fn upstream_prim_node(&self, node: NodeId) -> Option<NodeId> {
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut current = node;
        loop {
            if !seen.insert(current) {
                return None;
            }
            let sources = self.upstream_nodes(current);
            if sources.len() != 1 {
                return None;
            }
            let up = sources[0];
            if self
                .nodes
                .get(&up)
                .is_some_and(|n| n.has_parameter(PRIM_NAME_PARAM))
            {
                return Some(up);
            }
            current = up;
        }
    }

    /// Hierarchical path of prim names above `node`, root to leaf, joined
    /// with `/`. The node's own name is not appended.
    pub fn upstream_prim_path(&self, node: NodeId) -> String {
        let mut segments: Vec<String> = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut current = node;
        while let Some(up) = self.upstream_prim_node(current) {
            if !seen.insert(up) {
                break;
            }
            if let Some(param) = self.nodes.get(&up).and_then(|n| n.parameter(PRIM_NAME_PARAM)) {
                segments.push(param.value().to_string());
            }
            current = up;
        }
        segments.reverse();
        segments.join("/")
    }

    // ---- parameters ------------------------------------------------------

    pub fn add_parameter(&mut self, node: NodeId, parameter: Parameter) -> Result<(), GraphError> {
        let n = self
            .nodes
            .get_mut(&node)
            .ok_or(GraphError::UnknownNode { id: node })?;
        if n.has_parameter(parameter.name()) {
            return Err(GraphError::DuplicateParameter {
                node: n.name.clone(),
                name: parameter.name().to_string(),
            });
        }
        n.parameters.push(parameter);
        Ok(())
    }

    pub fn parameter(&self, node: NodeId, name: &str) -> Option<&Parameter> {
        self.nodes.get(&node)?.parameter(name)
    }

    pub fn parameter_mut(&mut self, node: NodeId, name: &str) -> Option<&mut Parameter> {
        self.nodes.get_mut(&node)?.parameter_mut(name)
    }

    /// Resolve a parameter's value at `time`: an active connect reference
    /// defers entirely to the referenced parameter's current value (connect
    /// overrides animation); otherwise time samples, otherwise the static
    /// value.
    pub fn effective_value(&self, node: NodeId, name: &str, time: f32) -> Option<Value> {
        let param = self.parameter(node, name)?;
        if let Some(target) = param.connect() {
            return self.resolve_connect(target);
        }
        Some(param.value_at(time))
    }

    /// Resolve a `node.parameter` connect reference to the target's current
    /// static value. Dangling references are a logged miss, never an error.
    fn resolve_connect(&self, reference: &str) -> Option<Value> {
        let Some((node_name, param_name)) = reference.rsplit_once('.') else {
            log::warn!("malformed connect reference (expected node.parameter): {reference}");
            return None;
        };
        let Some(node) = self.find_node(node_name) else {
            log::warn!("connect reference to unknown node: {reference}");
            return None;
        };
        let Some(param) = self.parameter(node, param_name) else {
            log::warn!("connect reference to unknown parameter: {reference}");
            return None;
        };
        Some(param.value().clone())
    }

    fn emit_value_changed(&mut self, node: NodeId, name: &str, time: f32) {
        if let Some(value) = self.effective_value(node, name, time) {
            self.notifier.emit(&GraphEvent::ValueChanged {
                node,
                parameter: name.to_string(),
                value,
            });
        }
    }

    /// Static parameter write. Writing `name` also renames the node.
    pub fn set_param_value(
        &mut self,
        node: NodeId,
        name: &str,
        value: Value,
    ) -> Result<(), GraphError> {
        let node_name = self.node_name(node);
        if self.parameter(node, name).is_none() {
            return Err(GraphError::ParameterNotFound {
                node: node_name,
                name: name.to_string(),
            });
        }
        // Renames go through the same collision handling as node creation,
        // and the adjusted name is what ends up stored.
        let value = if name == "name" {
            if let Value::Scalar(s) = &value {
                let unique = self.unique_name(&s.to_string(), Some(node));
                if let Some(n) = self.nodes.get_mut(&node) {
                    n.name = unique.clone();
                }
                Value::text(unique)
            } else {
                value
            }
        } else {
            value
        };
        if let Some(param) = self.parameter_mut(node, name) {
            param.set_value(value);
        }
        self.emit_value_changed(node, name, 0.0);
        Ok(())
    }

    /// Author a key on one scalar component of a parameter.
    pub fn set_param_key(
        &mut self,
        node: NodeId,
        name: &str,
        component: usize,
        time: f32,
        value: Scalar,
    ) -> Result<(), GraphError> {
        let node_name = self.node_name(node);
        let param = self
            .parameter_mut(node, name)
            .ok_or(GraphError::ParameterNotFound {
                node: node_name,
                name: name.to_string(),
            })?;
        param.set_key(component, time, value);
        self.emit_value_changed(node, name, time);
        Ok(())
    }

    pub fn remove_param_key(
        &mut self,
        node: NodeId,
        name: &str,
        component: usize,
        time: f32,
    ) -> Result<(), GraphError> {
        let node_name = self.node_name(node);
        let param = self
            .parameter_mut(node, name)
            .ok_or(GraphError::ParameterNotFound {
                node: node_name,
                name: name.to_string(),
            })?;
        param.remove_key(component, time);
        self.emit_value_changed(node, name, time);
        Ok(())
    }

    // ---- observers -------------------------------------------------------

    pub fn subscribe(&mut self, listener: impl FnMut(&GraphEvent) + 'static) -> ListenerId {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // ---- export ----------------------------------------------------------

    /// Export one node as `{ <name>: { parameters, inputs, nodeClass } }`.
    /// `inputs` lists only input ports with an incoming connection, as
    /// `[sourceNodeName, sourcePortName]` pairs.
    pub fn export_node(&self, id: NodeId) -> Option<JsonValue> {
        let node = self.nodes.get(&id)?;

        let mut params = JsonMap::new();
        for param in &node.parameters {
            if param.name() == "name" {
                continue;
            }
            if let Some(record) = param.record() {
                params.insert(
                    param.name().to_string(),
                    serde_json::to_value(record).unwrap_or(JsonValue::Null),
                );
            }
        }

        let mut inputs = JsonMap::new();
        for pid in &node.ports {
            let Some(port) = self.ports.get(pid) else {
                continue;
            };
            if port.direction != Direction::Input {
                continue;
            }
            if let Some(conn) = self.connections_as_target(*pid).first() {
                if let Some(source) = self.ports.get(&conn.source) {
                    inputs.insert(
                        port.name.clone(),
                        json!([self.node_name(source.node), source.name]),
                    );
                }
            }
        }

        let mut body = JsonMap::new();
        body.insert("parameters".to_string(), JsonValue::Object(params));
        body.insert("inputs".to_string(), JsonValue::Object(inputs));
        body.insert(
            "nodeClass".to_string(),
            JsonValue::String(node.node_class.clone()),
        );
        let mut record = JsonMap::new();
        record.insert(node.name.clone(), JsonValue::Object(body));
        Some(JsonValue::Object(record))
    }

    /// Export every node, merged into one record keyed by node name.
    pub fn export_graph(&self) -> JsonValue {
        let mut out = JsonMap::new();
        for id in &self.order {
            if let Some(JsonValue::Object(record)) = self.export_node(*id) {
                out.extend(record);
            }
        }
        JsonValue::Object(out)
    }
}
