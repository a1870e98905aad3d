// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reactive behaviour graph model for Weft.
//!
//! This crate provides the structural core a node-graph editor or evaluator
//! sits on top of:
//! - Graph-scoped identifiers for nodes and output sockets
//! - Reactive fields with before/after change notification
//! - A per-node-type socket catalog supplied by the host
//! - Graph mutation with per-call error reporting
//! - On-demand connection resolution and type checking
//! - Lossless whole-graph persistence (JSON and RON)
//!
//! ## Architecture
//!
//! A [`NodeGraph`] maps [`LocalId`]s to [`Node`]s; each node carries named
//! fields whose values may reference another node's output socket by
//! [`LocalPropertyId`]. References are held by value and never validated at
//! connect time: a [`ConnectionResolver`] classifies them on demand, so a
//! graph can pass through incomplete states while being edited. The
//! [`GraphSerializer`] round-trips the whole structure, connection
//! references and editor metadata included.
//!
//! Everything is single-threaded and synchronous; a graph belongs to one
//! host context at a time.

pub mod catalog;
pub mod graph;
pub mod id;
pub mod node;
pub mod reactive;
pub mod resolve;
pub mod serialize;

pub use catalog::{CatalogError, NodeInformation, SocketCatalog, SocketInformation};
pub use graph::{GraphError, NodeGraph};
pub use id::{LocalId, LocalPropertyId, ParseIdError};
pub use node::{Field, FieldValue, Node};
pub use reactive::{ChangeHandler, HandlerCollection, HandlerToken, ReactiveField};
pub use resolve::{ConnectionResolver, Resolution};
pub use serialize::{GraphDocument, GraphSerializer, SerializeError};
