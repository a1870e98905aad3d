// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket descriptors and the per-node-type catalog.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Declared value type of one socket.
///
/// Type names are a closed, catalog-defined vocabulary (`"Int32"`,
/// `"Single"`, ...), not a general type system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketInformation {
    /// Declared type name.
    pub socket_type: String,
}

impl SocketInformation {
    /// Describe a socket of the given declared type.
    pub fn new(socket_type: impl Into<String>) -> Self {
        Self {
            socket_type: socket_type.into(),
        }
    }
}

/// Socket shape of one node type: named inputs and outputs.
///
/// Registered once per type tag and immutable thereafter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInformation {
    /// Input sockets by key.
    pub inputs: IndexMap<String, SocketInformation>,
    /// Output sockets by key.
    pub outputs: IndexMap<String, SocketInformation>,
}

impl NodeInformation {
    /// Create a descriptor with no sockets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input socket.
    pub fn with_input(mut self, key: impl Into<String>, socket_type: impl Into<String>) -> Self {
        self.inputs
            .insert(key.into(), SocketInformation::new(socket_type));
        self
    }

    /// Add an output socket.
    pub fn with_output(mut self, key: impl Into<String>, socket_type: impl Into<String>) -> Self {
        self.outputs
            .insert(key.into(), SocketInformation::new(socket_type));
        self
    }

    /// Look up an output socket by key.
    pub fn output(&self, key: &str) -> Option<&SocketInformation> {
        self.outputs.get(key)
    }

    /// Look up an input socket by key.
    pub fn input(&self, key: &str) -> Option<&SocketInformation> {
        self.inputs.get(key)
    }

    /// Whether `key` names any socket, input or output.
    pub fn has_socket(&self, key: &str) -> bool {
        self.inputs.contains_key(key) || self.outputs.contains_key(key)
    }
}

/// Registry mapping node type tags to their socket shape.
///
/// Constructed explicitly by the host at startup and passed by reference
/// wherever descriptors are needed. There is no process-wide catalog.
#[derive(Debug, Clone, Default)]
pub struct SocketCatalog {
    types: IndexMap<String, NodeInformation>,
}

impl SocketCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the descriptor for a type tag.
    ///
    /// A tag registers exactly once; registering it again fails and leaves
    /// the original descriptor in place.
    pub fn register(
        &mut self,
        type_tag: impl Into<String>,
        info: NodeInformation,
    ) -> Result<(), CatalogError> {
        let type_tag = type_tag.into();
        if self.types.contains_key(&type_tag) {
            return Err(CatalogError::DuplicateTypeTag(type_tag));
        }
        self.types.insert(type_tag, info);
        Ok(())
    }

    /// Look up the descriptor for a type tag.
    pub fn get(&self, type_tag: &str) -> Option<&NodeInformation> {
        self.types.get(type_tag)
    }

    /// Whether a type tag is registered.
    pub fn contains(&self, type_tag: &str) -> bool {
        self.types.contains_key(type_tag)
    }

    /// All registered `(type tag, descriptor)` pairs.
    pub fn types(&self) -> impl Iterator<Item = (&str, &NodeInformation)> {
        self.types.iter().map(|(tag, info)| (tag.as_str(), info))
    }

    /// Number of registered type tags.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Error registering a node type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The type tag is already registered.
    #[error("node type already registered: {0}")]
    DuplicateTypeTag(String),
}
