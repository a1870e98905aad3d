// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node instances and their typed, reactive data fields.

use crate::id::{LocalId, LocalPropertyId};
use crate::reactive::{HandlerToken, ReactiveField};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A value stored in a node field.
///
/// Input fields hold either a plain value or a [`FieldValue::Link`]
/// referencing an upstream output socket; `Link(LocalPropertyId::NONE)` is
/// the unconnected state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// String
    String(String),
    /// Reference to an upstream output socket
    Link(LocalPropertyId),
}

impl FieldValue {
    /// The unconnected link value.
    pub fn unconnected() -> Self {
        Self::Link(LocalPropertyId::NONE)
    }

    /// Whether this value is a connection reference (including the
    /// unconnected sentinel).
    pub fn is_link(&self) -> bool {
        matches!(self, Self::Link(_))
    }

    /// The connection reference, if this value is one.
    pub fn as_link(&self) -> Option<&LocalPropertyId> {
        match self {
            Self::Link(target) => Some(target),
            _ => None,
        }
    }
}

/// One named field on a node: a declared type plus a reactive value cell.
#[derive(Debug)]
pub struct Field {
    /// Declared type name from the catalog vocabulary.
    pub declared_type: String,
    cell: ReactiveField<FieldValue>,
}

impl Field {
    /// Create a field of the given declared type holding `value`.
    pub fn new(declared_type: impl Into<String>, value: FieldValue) -> Self {
        Self {
            declared_type: declared_type.into(),
            cell: ReactiveField::new(value),
        }
    }

    /// Create an input field of the given declared type, unconnected.
    pub fn input(declared_type: impl Into<String>) -> Self {
        Self::new(declared_type, FieldValue::unconnected())
    }

    /// Current value. No side effects.
    pub fn value(&self) -> &FieldValue {
        self.cell.get()
    }

    /// Write the value, firing the before/after notification sequence.
    pub fn set(&mut self, value: FieldValue) {
        self.cell.set(value);
    }

    /// Subscribe to the moment just before each write to this field.
    pub fn subscribe_before(
        &mut self,
        handler: impl FnMut(&FieldValue) + 'static,
    ) -> HandlerToken {
        self.cell.subscribe_before(handler)
    }

    /// Subscribe to the moment just after each write to this field.
    pub fn subscribe_after(
        &mut self,
        handler: impl FnMut(&FieldValue) + 'static,
    ) -> HandlerToken {
        self.cell.subscribe_after(handler)
    }

    /// Remove one subscription by token.
    pub fn unsubscribe(&mut self, token: HandlerToken) -> bool {
        self.cell.unsubscribe(token)
    }

    /// Release all of this field's handlers.
    pub fn dispose(&mut self) {
        self.cell.dispose();
    }
}

/// A node instance in the graph.
///
/// `type_tag` selects the catalog descriptor for its socket shape. `data`
/// keys are stable socket/field names. `position` is opaque editor metadata:
/// persisted and round-tripped, never interpreted here.
#[derive(Debug)]
pub struct Node {
    /// Unique instance id.
    pub id: LocalId,
    /// Node type tag.
    pub type_tag: String,
    data: IndexMap<String, Field>,
    /// Position in the editor canvas.
    pub position: [i32; 2],
}

impl Node {
    /// Create a node with no fields.
    pub fn new(id: LocalId, type_tag: impl Into<String>, position: [i32; 2]) -> Self {
        Self {
            id,
            type_tag: type_tag.into(),
            data: IndexMap::new(),
            position,
        }
    }

    /// Add a field, builder style.
    pub fn with_field(mut self, key: impl Into<String>, field: Field) -> Self {
        self.data.insert(key.into(), field);
        self
    }

    /// Insert or replace a field.
    pub fn insert_field(&mut self, key: impl Into<String>, field: Field) {
        self.data.insert(key.into(), field);
    }

    /// Look up a field by key.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.data.get(key)
    }

    /// Look up a field by key, mutably.
    pub fn field_mut(&mut self, key: &str) -> Option<&mut Field> {
        self.data.get_mut(key)
    }

    /// Whether `key` names a field on this node.
    pub fn has_field(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// All `(key, field)` pairs in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.data.iter().map(|(key, field)| (key.as_str(), field))
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.data.len()
    }

    /// Release the handlers of every field on this node.
    pub fn dispose(&mut self) {
        for field in self.data.values_mut() {
            field.dispose();
        }
    }
}
