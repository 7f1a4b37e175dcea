//! Pure pattern traversal over a store.
//!
//! [`StoreExplorer`] resolves patterns without mutating anything, collecting
//! every introspectable node the walk touches. The resolution front-end here
//! (entry pseudo-nodes, filtering, declared-relation checks, shape fan-out)
//! is shared with the clone engine.

use graft_path::{Explorer, NodeSet};
use indexmap::IndexSet;

use crate::error::EngineError;
use crate::filter::PropertyFilter;
use crate::store::{Node, NodeId, RelationValue, Store};

/// Related nodes of one relation value, in collaborator form: map relations
/// resolve to entry pseudo-nodes, everything else to plain objects.
pub(crate) fn members(value: &RelationValue) -> NodeSet<Node> {
    match value {
        RelationValue::One(id) => NodeSet::from_iter([Node::Object(*id)]),
        RelationValue::List(ids) => ids.iter().map(|&id| Node::Object(id)).collect(),
        RelationValue::Set(ids) => ids.iter().map(|&id| Node::Object(id)).collect(),
        RelationValue::SortedSet(ids) => ids.iter().map(|&id| Node::Object(id)).collect(),
        RelationValue::Map(map) => map
            .iter()
            .map(|(&key, &value)| Node::Entry { key, value })
            .collect(),
        RelationValue::SortedMap(map) => map
            .iter()
            .map(|(&key, &value)| Node::Entry { key, value })
            .collect(),
    }
}

/// Resolves a pseudo-property of a map-entry pseudo-node. Only `key` and
/// `value` exist; anything else is a usage error.
pub(crate) fn entry_member(
    key: NodeId,
    value: NodeId,
    property: &str,
) -> Result<Option<NodeSet<Node>>, EngineError> {
    match property {
        "key" => Ok(Some(NodeSet::from_iter([Node::Object(key)]))),
        "value" => Ok(Some(NodeSet::from_iter([Node::Object(value)]))),
        other => Err(EngineError::EntryProperty(other.to_string())),
    }
}

/// Declared relation names of a node, for wildcard enumeration.
///
/// Entry pseudo-nodes report nothing: `key`/`value` are addressable by name
/// only, wildcards never enumerate them. Opaque nodes report nothing either.
pub(crate) fn relation_names(store: &Store, node: Node) -> Vec<String> {
    match node {
        Node::Entry { .. } => Vec::new(),
        Node::Object(id) => store
            .info(id)
            .map(|info| info.relation_names().to_vec())
            .unwrap_or_default(),
    }
}

/// Read-only traversal collaborator that records visited nodes.
pub struct StoreExplorer<'s, F: PropertyFilter> {
    store: &'s Store,
    filter: &'s F,
    visited: IndexSet<NodeId>,
}

impl<'s, F: PropertyFilter> StoreExplorer<'s, F> {
    pub fn new(store: &'s Store, filter: &'s F) -> Self {
        Self {
            store,
            filter,
            visited: IndexSet::new(),
        }
    }

    /// Records a node as visited when it is introspectable.
    pub(crate) fn visit(&mut self, id: NodeId) {
        if self.store.node_type(id).is_some() {
            self.visited.insert(id);
        }
    }

    pub(crate) fn into_visited(self) -> IndexSet<NodeId> {
        self.visited
    }
}

impl<F: PropertyFilter> Explorer for StoreExplorer<'_, F> {
    type Node = Node;
    type Error = EngineError;

    fn properties(&mut self, node: Node) -> Result<Vec<String>, EngineError> {
        Ok(relation_names(self.store, node))
    }

    fn explore(&mut self, node: Node, property: &str) -> Result<Option<NodeSet<Node>>, EngineError> {
        let id = match node {
            Node::Entry { key, value } => return entry_member(key, value, property),
            Node::Object(id) => id,
        };
        if !self.filter.test(self.store, id, property) {
            return Ok(None);
        }
        let Some(info) = self.store.info(id) else {
            return Ok(None);
        };
        if info.relation(property).is_none() {
            return Ok(None);
        }
        self.visit(id);
        let Some(value) = self.store.relation_unchecked(id, property) else {
            return Ok(None);
        };
        let found = members(value);
        for member in &found {
            match *member {
                Node::Object(id) => self.visit(id),
                Node::Entry { key, value } => {
                    self.visit(key);
                    self.visit(value);
                }
            }
        }
        Ok(Some(found))
    }
}

/// Outcome of a pattern exploration.
#[derive(Debug)]
pub struct Explored {
    result: NodeSet<Node>,
    visited: IndexSet<NodeId>,
}

impl Explored {
    pub(crate) fn new(result: NodeSet<Node>, visited: IndexSet<NodeId>) -> Self {
        Self { result, visited }
    }

    /// Union of the node sets the patterns evaluated to.
    pub fn result(&self) -> &NodeSet<Node> {
        &self.result
    }

    /// Every introspectable node the walk touched, roots included.
    pub fn visited(&self) -> &IndexSet<NodeId> {
        &self.visited
    }

    /// Visited nodes of one named type.
    pub fn of_type(&self, store: &Store, type_name: &str) -> Vec<NodeId> {
        self.visited
            .iter()
            .copied()
            .filter(|&id| store.type_name(id) == Some(type_name))
            .collect()
    }
}
