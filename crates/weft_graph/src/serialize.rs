// SPDX-License-Identifier: MIT OR Apache-2.0
//! Whole-graph persistence: the document format and its encodings.

use crate::catalog::SocketCatalog;
use crate::graph::{GraphError, NodeGraph};
use crate::id::{LocalId, ParseIdError};
use crate::node::{Field, FieldValue, Node};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Serialized form of a whole graph: a node-id-keyed mapping.
///
/// Node order carries no meaning; it is preserved only so repeated
/// encode/decode cycles are value-stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Nodes keyed by the string form of their id.
    pub nodes: IndexMap<String, NodeDocument>,
}

/// Serialized form of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    /// The node's type tag.
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Field data by key. Connection-valued fields carry the
    /// `node/socket` pair in string form, or `"none"` when unconnected.
    pub data: IndexMap<String, FieldDocument>,
    /// Editor metadata, persisted but never interpreted.
    pub editor: EditorDocument,
}

/// Serialized form of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDocument {
    /// The field's declared type name.
    #[serde(rename = "type")]
    pub declared_type: String,
    /// The field's value.
    pub value: FieldValue,
}

/// Serialized editor metadata for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorDocument {
    /// Canvas position.
    pub position: PositionDocument,
}

/// A canvas position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionDocument {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

/// Converts graphs to and from [`GraphDocument`]s, with JSON and RON
/// encodings over the same logical shape.
///
/// Loading builds a complete graph before returning it, so a malformed
/// document never leaves a half-restored graph behind. A field whose key is
/// absent from the catalog entry for its node's type is preserved opaquely
/// and reported with a warning, keeping round trips lossless across schema
/// changes.
#[derive(Debug, Clone, Copy)]
pub struct GraphSerializer<'a> {
    catalog: &'a SocketCatalog,
}

impl<'a> GraphSerializer<'a> {
    /// Create a serializer using the host's socket catalog.
    pub fn new(catalog: &'a SocketCatalog) -> Self {
        Self { catalog }
    }

    /// Snapshot a graph into its document form.
    pub fn to_document(&self, graph: &NodeGraph) -> GraphDocument {
        let mut nodes = IndexMap::with_capacity(graph.node_count());
        for (id, node) in graph.iter() {
            let mut data = IndexMap::with_capacity(node.field_count());
            for (key, field) in node.fields() {
                data.insert(
                    key.to_string(),
                    FieldDocument {
                        declared_type: field.declared_type.clone(),
                        value: field.value().clone(),
                    },
                );
            }
            nodes.insert(
                id.to_string(),
                NodeDocument {
                    type_tag: node.type_tag.clone(),
                    data,
                    editor: EditorDocument {
                        position: PositionDocument {
                            x: node.position[0],
                            y: node.position[1],
                        },
                    },
                },
            );
        }
        GraphDocument { nodes }
    }

    /// Rebuild a graph from its document form.
    ///
    /// Node order in the document is not significant. Fields unknown to the
    /// catalog are kept as-is and reported via `tracing::warn!`.
    pub fn from_document(&self, document: GraphDocument) -> Result<NodeGraph, SerializeError> {
        let mut graph = NodeGraph::new();
        for (id_text, node_doc) in document.nodes {
            let id: LocalId = id_text.parse().map_err(|source| SerializeError::InvalidNodeId {
                id: id_text.clone(),
                source,
            })?;

            self.report_unknown_fields(id, &node_doc);

            let mut node = Node::new(
                id,
                node_doc.type_tag,
                [node_doc.editor.position.x, node_doc.editor.position.y],
            );
            for (key, field_doc) in node_doc.data {
                node.insert_field(key, Field::new(field_doc.declared_type, field_doc.value));
            }
            graph.insert_node(node).map_err(|err| match err {
                GraphError::DuplicateId(id) => SerializeError::DuplicateNode(id),
                other => SerializeError::Graph(other),
            })?;
        }
        Ok(graph)
    }

    fn report_unknown_fields(&self, id: LocalId, node_doc: &NodeDocument) {
        match self.catalog.get(&node_doc.type_tag) {
            Some(info) => {
                for key in node_doc.data.keys() {
                    if !info.has_socket(key) {
                        tracing::warn!(
                            node = %id,
                            type_tag = %node_doc.type_tag,
                            field = %key,
                            "field not in catalog for this node type, preserved opaquely"
                        );
                    }
                }
            }
            None => {
                tracing::warn!(
                    node = %id,
                    type_tag = %node_doc.type_tag,
                    "node type not in catalog, fields preserved opaquely"
                );
            }
        }
    }

    /// Serialize a graph to JSON.
    pub fn to_json(&self, graph: &NodeGraph) -> Result<String, SerializeError> {
        Ok(serde_json::to_string_pretty(&self.to_document(graph))?)
    }

    /// Deserialize a graph from JSON.
    pub fn from_json(&self, text: &str) -> Result<NodeGraph, SerializeError> {
        let document: GraphDocument = serde_json::from_str(text)?;
        self.from_document(document)
    }

    /// Serialize a graph to RON.
    pub fn to_ron(&self, graph: &NodeGraph) -> Result<String, SerializeError> {
        Ok(ron::ser::to_string_pretty(
            &self.to_document(graph),
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Deserialize a graph from RON.
    pub fn from_ron(&self, text: &str) -> Result<NodeGraph, SerializeError> {
        let document: GraphDocument = ron::from_str(text)?;
        self.from_document(document)
    }
}

/// Error loading or saving a graph document.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// Malformed JSON.
    #[error("malformed JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// RON encoding failed.
    #[error("RON encode failed: {0}")]
    RonEncode(#[from] ron::Error),

    /// Malformed RON.
    #[error("malformed RON document: {0}")]
    RonDecode(#[from] ron::error::SpannedError),

    /// A node key is not a valid identifier.
    #[error("invalid node id {id:?}: {source}")]
    InvalidNodeId {
        /// The offending key text.
        id: String,
        /// Why it failed to parse.
        source: ParseIdError,
    },

    /// Two node keys decode to the same identifier.
    #[error("duplicate node id in document: {0}")]
    DuplicateNode(LocalId),

    /// Rebuilding the graph failed structurally.
    #[error(transparent)]
    Graph(GraphError),
}
