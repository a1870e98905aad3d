// SPDX-License-Identifier: MIT OR Apache-2.0
//! The node graph: aggregate root for mutation and invariant enforcement.

use crate::id::{LocalId, LocalPropertyId};
use crate::node::{Field, FieldValue, Node};
use indexmap::IndexMap;

/// A mutable behaviour graph: nodes keyed by [`LocalId`].
///
/// Node ids are unique for the graph's lifetime. Connections are held by
/// value in input fields; removing a node leaves references to it dangling,
/// to be detected at resolution time rather than repaired here. Each
/// mutation call is its own unit: a failed call has no side effects, and
/// earlier calls are never rolled back.
///
/// A graph instance belongs to one host context at a time; callers extending
/// this to multiple threads must serialize access themselves.
#[derive(Debug, Default)]
pub struct NodeGraph {
    nodes: IndexMap<LocalId, Node>,
}

impl NodeGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node of the given type with the given fields, allocating a
    /// fresh id. Auto-generated ids never collide.
    pub fn add_node(
        &mut self,
        type_tag: impl Into<String>,
        data: impl IntoIterator<Item = (String, Field)>,
        position: [i32; 2],
    ) -> LocalId {
        let id = LocalId::new();
        let mut node = Node::new(id, type_tag, position);
        for (key, field) in data {
            node.insert_field(key, field);
        }
        self.nodes.insert(id, node);
        id
    }

    /// Insert a fully built node under its own id.
    ///
    /// Fails with [`GraphError::DuplicateId`] if the id is already present
    /// or is the reserved sentinel.
    pub fn insert_node(&mut self, node: Node) -> Result<LocalId, GraphError> {
        let id = node.id;
        if id.is_none() || self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Remove a node, returning it.
    ///
    /// Succeeds even if other nodes still hold links pointing at it; those
    /// links dangle until resolved or rewritten (lazy invalidation).
    pub fn remove_node(&mut self, id: LocalId) -> Result<Node, GraphError> {
        self.nodes
            .swap_remove(&id)
            .ok_or(GraphError::NodeNotFound(id))
    }

    /// Look up a node by id.
    pub fn node(&self, id: LocalId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Look up a node by id, mutably.
    pub fn node_mut(&mut self, id: LocalId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: LocalId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All `(id, node)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (LocalId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// All node ids.
    pub fn node_ids(&self) -> impl Iterator<Item = LocalId> + '_ {
        self.nodes.keys().copied()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn field_mut(&mut self, node_id: LocalId, key: &str) -> Result<&mut Field, GraphError> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        node.field_mut(key).ok_or_else(|| GraphError::FieldNotFound {
            node: node_id,
            field: key.to_string(),
        })
    }

    /// Write a field's value, firing its before/after notifications.
    pub fn set_field_value(
        &mut self,
        node_id: LocalId,
        key: &str,
        value: FieldValue,
    ) -> Result<(), GraphError> {
        self.field_mut(node_id, key)?.set(value);
        Ok(())
    }

    /// Point an input field at an upstream output socket.
    ///
    /// No type validation happens here; a graph may pass through incorrect
    /// intermediate states while being edited. Compatibility is checked on
    /// demand by the resolver.
    pub fn connect(
        &mut self,
        input_node: LocalId,
        input_key: &str,
        target: LocalPropertyId,
    ) -> Result<(), GraphError> {
        self.set_field_value(input_node, input_key, FieldValue::Link(target))
    }

    /// Reset an input field to the unconnected state.
    pub fn disconnect(&mut self, input_node: LocalId, input_key: &str) -> Result<(), GraphError> {
        self.set_field_value(input_node, input_key, FieldValue::unconnected())
    }

    /// Update a node's editor position. Metadata only; no field
    /// notifications fire.
    pub fn move_node(&mut self, id: LocalId, position: [i32; 2]) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(GraphError::NodeNotFound(id))?;
        node.position = position;
        Ok(())
    }
}

/// Error from a graph mutation call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A caller-supplied node id collides with an existing one.
    #[error("duplicate node id: {0}")]
    DuplicateId(LocalId),

    /// The mutation targets a node that does not exist.
    #[error("node not found: {0}")]
    NodeNotFound(LocalId),

    /// The mutation targets a field absent from the node.
    #[error("field not found: {field} on node {node}")]
    FieldNotFound {
        /// The node that was targeted.
        node: LocalId,
        /// The missing field key.
        field: String,
    },
}
