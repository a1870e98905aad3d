// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection resolution: following a link to its upstream socket.

use crate::catalog::{SocketCatalog, SocketInformation};
use crate::graph::{GraphError, NodeGraph};
use crate::id::{LocalId, LocalPropertyId};

/// Outcome of resolving one input field's connection.
///
/// Everything except [`Resolution::Resolved`] and
/// [`Resolution::Unconnected`] describes a graph that is currently invalid
/// at this field. None of them are fatal: graphs legitimately pass through
/// such states while being edited, and consumers flag them rather than
/// aborting.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    /// The field holds no connection (or a plain value).
    Unconnected,

    /// The link resolves to an upstream socket whose declared type matches
    /// the input field's.
    Resolved {
        /// The followed reference.
        target: &'a LocalPropertyId,
        /// Descriptor of the upstream output socket.
        socket: &'a SocketInformation,
    },

    /// The link names a node absent from the graph (removed or never
    /// present).
    Dangling {
        /// The followed reference.
        target: &'a LocalPropertyId,
    },

    /// The link names a socket key absent from the catalog entry for the
    /// referenced node's type (or the type tag itself is unregistered).
    UnknownSocket {
        /// The followed reference.
        target: &'a LocalPropertyId,
    },

    /// The upstream socket exists but its declared type differs from the
    /// input field's.
    TypeMismatch {
        /// The input field's declared type.
        expected: &'a str,
        /// The upstream socket's declared type.
        found: &'a str,
    },
}

/// Stateless view that follows connection references and checks declared
/// type compatibility.
///
/// Holds no caches and mutates nothing, so it is safe to construct and
/// invoke at arbitrary frequency (every presentation refresh, say).
#[derive(Debug, Clone, Copy)]
pub struct ConnectionResolver<'a> {
    graph: &'a NodeGraph,
    catalog: &'a SocketCatalog,
}

impl<'a> ConnectionResolver<'a> {
    /// Create a resolver over a graph and the host's socket catalog.
    pub fn new(graph: &'a NodeGraph, catalog: &'a SocketCatalog) -> Self {
        Self { graph, catalog }
    }

    /// Resolve the connection held by `field_key` on `node_id`.
    ///
    /// Looking up the input node or field itself misses with the ordinary
    /// structural errors; everything about the *referenced* side is reported
    /// through [`Resolution`].
    pub fn resolve_field(
        &self,
        node_id: LocalId,
        field_key: &str,
    ) -> Result<Resolution<'a>, GraphError> {
        let node = self
            .graph
            .node(node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        let field = node.field(field_key).ok_or_else(|| GraphError::FieldNotFound {
            node: node_id,
            field: field_key.to_string(),
        })?;

        let Some(target) = field.value().as_link() else {
            return Ok(Resolution::Unconnected);
        };
        if target.is_none() {
            return Ok(Resolution::Unconnected);
        }

        let Some(upstream) = self.graph.node(target.node) else {
            return Ok(Resolution::Dangling { target });
        };
        let socket = self
            .catalog
            .get(&upstream.type_tag)
            .and_then(|info| info.output(&target.socket));
        let Some(socket) = socket else {
            return Ok(Resolution::UnknownSocket { target });
        };

        if socket.socket_type != field.declared_type {
            return Ok(Resolution::TypeMismatch {
                expected: &field.declared_type,
                found: &socket.socket_type,
            });
        }
        Ok(Resolution::Resolved { target, socket })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NodeInformation;
    use crate::node::{Field, FieldValue};

    fn catalog() -> SocketCatalog {
        let mut catalog = SocketCatalog::new();
        catalog
            .register(
                "IntConstant",
                NodeInformation::new().with_output("result", "Int32"),
            )
            .unwrap();
        catalog
            .register(
                "Echo",
                NodeInformation::new()
                    .with_input("x", "Int32")
                    .with_output("result", "Int32"),
            )
            .unwrap();
        catalog
            .register(
                "Damp",
                NodeInformation::new()
                    .with_input("y", "Single")
                    .with_output("result", "Single"),
            )
            .unwrap();
        catalog
    }

    fn source(graph: &mut NodeGraph) -> LocalId {
        graph.add_node(
            "IntConstant",
            [("value".to_string(), Field::new("Int32", FieldValue::Int(5)))],
            [0, 0],
        )
    }

    #[test]
    fn test_resolve_matching_connection() {
        let catalog = catalog();
        let mut graph = NodeGraph::new();
        let a = source(&mut graph);
        let b = graph.add_node(
            "Echo",
            [("x".to_string(), Field::input("Int32"))],
            [10, 0],
        );
        graph
            .connect(b, "x", LocalPropertyId::new(a, "result"))
            .unwrap();

        let resolver = ConnectionResolver::new(&graph, &catalog);
        match resolver.resolve_field(b, "x").unwrap() {
            Resolution::Resolved { target, socket } => {
                assert_eq!(target.node, a);
                assert_eq!(socket.socket_type, "Int32");
            }
            other => panic!("expected Resolved, got {other:?}"),
        }
    }

    #[test]
    fn test_unconnected_is_not_an_error() {
        let catalog = catalog();
        let mut graph = NodeGraph::new();
        let b = graph.add_node(
            "Echo",
            [("x".to_string(), Field::input("Int32"))],
            [0, 0],
        );

        let resolver = ConnectionResolver::new(&graph, &catalog);
        assert_eq!(resolver.resolve_field(b, "x").unwrap(), Resolution::Unconnected);
    }

    #[test]
    fn test_plain_value_resolves_unconnected() {
        let catalog = catalog();
        let mut graph = NodeGraph::new();
        let a = source(&mut graph);

        let resolver = ConnectionResolver::new(&graph, &catalog);
        assert_eq!(
            resolver.resolve_field(a, "value").unwrap(),
            Resolution::Unconnected
        );
    }

    #[test]
    fn test_removed_upstream_node_reports_dangling() {
        let catalog = catalog();
        let mut graph = NodeGraph::new();
        let a = source(&mut graph);
        let b = graph.add_node(
            "Echo",
            [("x".to_string(), Field::input("Int32"))],
            [10, 0],
        );
        graph
            .connect(b, "x", LocalPropertyId::new(a, "result"))
            .unwrap();
        graph.remove_node(a).unwrap();

        let resolver = ConnectionResolver::new(&graph, &catalog);
        match resolver.resolve_field(b, "x").unwrap() {
            Resolution::Dangling { target } => assert_eq!(target.node, a),
            other => panic!("expected Dangling, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_socket_key() {
        let catalog = catalog();
        let mut graph = NodeGraph::new();
        let a = source(&mut graph);
        let b = graph.add_node(
            "Echo",
            [("x".to_string(), Field::input("Int32"))],
            [10, 0],
        );
        graph
            .connect(b, "x", LocalPropertyId::new(a, "no_such_socket"))
            .unwrap();

        let resolver = ConnectionResolver::new(&graph, &catalog);
        match resolver.resolve_field(b, "x").unwrap() {
            Resolution::UnknownSocket { target } => {
                assert_eq!(target.socket, "no_such_socket");
            }
            other => panic!("expected UnknownSocket, got {other:?}"),
        }
    }

    #[test]
    fn test_type_mismatch_is_reported_not_fatal() {
        let catalog = catalog();
        let mut graph = NodeGraph::new();
        let a = source(&mut graph);
        let c = graph.add_node(
            "Damp",
            [("y".to_string(), Field::input("Single"))],
            [10, 10],
        );
        graph
            .connect(c, "y", LocalPropertyId::new(a, "result"))
            .unwrap();

        let resolver = ConnectionResolver::new(&graph, &catalog);
        assert_eq!(
            resolver.resolve_field(c, "y").unwrap(),
            Resolution::TypeMismatch {
                expected: "Single",
                found: "Int32",
            }
        );
    }

    #[test]
    fn test_missing_input_node_or_field_is_structural() {
        let catalog = catalog();
        let graph = NodeGraph::new();
        let ghost = LocalId::new_short();

        let resolver = ConnectionResolver::new(&graph, &catalog);
        assert_eq!(
            resolver.resolve_field(ghost, "x").unwrap_err(),
            GraphError::NodeNotFound(ghost)
        );
    }
}
