//! Arena-allocated object graph.
//!
//! Nodes are entries in a flat arena addressed by stable [`NodeId`] indices;
//! cyclic and shared references are just repeated ids. Plain attributes hold
//! [`Value`]s, relations hold shape-tagged id collections. Every read and
//! write is checked against the schema of the node's type; opaque value
//! nodes carry no type and expose nothing.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::schema::{RelationKind, Schema, TypeId, TypeInfo};
use crate::value::Value;

/// Dense, stable identifier of a stored node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Traversal handle: a stored object, or a map-entry pseudo-node exposing
/// exactly the `key` and `value` pseudo-properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Node {
    Object(NodeId),
    Entry { key: NodeId, value: NodeId },
}

/// A relation's stored value, tagged with its runtime shape.
///
/// Cloning mirrors the shape: a list keeps its order, a set stays a set, a
/// sorted set stays sorted (ids order by the arena index, the analogue of a
/// comparator), maps analogously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelationValue {
    One(NodeId),
    List(Vec<NodeId>),
    Set(IndexSet<NodeId>),
    SortedSet(BTreeSet<NodeId>),
    Map(IndexMap<NodeId, NodeId>),
    SortedMap(BTreeMap<NodeId, NodeId>),
}

impl RelationValue {
    /// Whether the runtime shape is one the declared kind recognizes.
    pub(crate) fn matches_kind(&self, kind: RelationKind) -> bool {
        matches!(
            (self, kind),
            (RelationValue::One(_), RelationKind::One)
                | (
                    RelationValue::List(_) | RelationValue::Set(_) | RelationValue::SortedSet(_),
                    RelationKind::Many,
                )
                | (
                    RelationValue::Map(_) | RelationValue::SortedMap(_),
                    RelationKind::Map,
                )
        )
    }
}

#[derive(Debug, Clone, Default)]
struct ObjectData {
    ty: Option<TypeId>,
    attrs: HashMap<String, Value>,
    relations: HashMap<String, RelationValue>,
}

/// Owning arena of graph nodes, bound to one schema.
#[derive(Debug, Clone)]
pub struct Store {
    schema: Arc<Schema>,
    entries: Vec<ObjectData>,
}

impl Store {
    pub fn new(schema: Schema) -> Self {
        Self::with_schema(Arc::new(schema))
    }

    pub fn with_schema(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            entries: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Allocates a fresh node of `ty` with every attribute at its zero-value
    /// and every relation unset.
    pub fn alloc(&mut self, ty: TypeId) -> NodeId {
        self.push(ObjectData {
            ty: Some(ty),
            ..ObjectData::default()
        })
    }

    /// Allocates an opaque value node: not introspectable, never traversed,
    /// aliased rather than copied by the clone engine.
    pub fn alloc_opaque(&mut self) -> NodeId {
        self.push(ObjectData::default())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The node's type, or `None` for opaque value nodes.
    pub fn node_type(&self, node: NodeId) -> Option<TypeId> {
        self.entries[node.index()].ty
    }

    pub fn type_name(&self, node: NodeId) -> Option<&str> {
        self.node_type(node).map(|ty| self.schema.info(ty).name())
    }

    /// Reads a declared attribute; unset attributes read as [`Value::Null`].
    pub fn attr(&self, node: NodeId, name: &str) -> Result<Value, EngineError> {
        self.check_attr(node, name)?;
        Ok(self.entries[node.index()]
            .attrs
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    /// Writes a declared attribute.
    pub fn set_attr(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), EngineError> {
        self.check_attr(node, name)?;
        self.entries[node.index()]
            .attrs
            .insert(name.to_string(), value.into());
        Ok(())
    }

    /// Reads a declared relation; `None` when it has no value.
    pub fn relation(&self, node: NodeId, name: &str) -> Result<Option<&RelationValue>, EngineError> {
        let info = self.introspect(node, name)?;
        if info.relation(name).is_none() {
            return Err(EngineError::property_access(info.name(), name));
        }
        Ok(self.relation_unchecked(node, name))
    }

    /// Writes a declared relation.
    pub fn set_relation(
        &mut self,
        node: NodeId,
        name: &str,
        value: RelationValue,
    ) -> Result<(), EngineError> {
        let info = self.introspect(node, name)?;
        if info.relation(name).is_none() {
            return Err(EngineError::property_access(info.name(), name));
        }
        self.entries[node.index()]
            .relations
            .insert(name.to_string(), value);
        Ok(())
    }

    /// Raw relation read; callers have already established that `name` is a
    /// declared relation of the node's type.
    pub(crate) fn relation_unchecked(&self, node: NodeId, name: &str) -> Option<&RelationValue> {
        self.entries[node.index()].relations.get(name)
    }

    pub(crate) fn info(&self, node: NodeId) -> Option<&TypeInfo> {
        self.node_type(node).map(|ty| self.schema.info(ty))
    }

    fn push(&mut self, data: ObjectData) -> NodeId {
        let id = NodeId(self.entries.len() as u32);
        self.entries.push(data);
        id
    }

    fn check_attr(&self, node: NodeId, name: &str) -> Result<(), EngineError> {
        let Some(info) = self.info(node) else {
            return Err(EngineError::property_access("<value>", name));
        };
        if !info.attributes().iter().any(|a| a == name) {
            return Err(EngineError::property_access(info.name(), name));
        }
        Ok(())
    }

    fn introspect(&self, node: NodeId, name: &str) -> Result<&TypeInfo, EngineError> {
        self.info(node)
            .ok_or_else(|| EngineError::property_access("<value>", name))
    }
}
