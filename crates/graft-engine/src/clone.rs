//! Pattern-driven deep cloning.
//!
//! [`Cloner`] is the mutating traversal collaborator: resolving a relation
//! during pattern evaluation is the act that clones it. [`CloneEngine`] is
//! the facade that compiles patterns, drives the walk, and hands back the
//! root clones.

use std::collections::HashMap;
use std::sync::Arc;

use graft_path::{Explorer, NodeSet, PatternCache};
use indexmap::{IndexMap, IndexSet};

use crate::error::EngineError;
use crate::explore::{Explored, StoreExplorer, entry_member, members, relation_names};
use crate::filter::{AllowAll, PropertyFilter};
use crate::store::{Node, NodeId, RelationValue, Store};

/// Stateful clone walk over one store.
///
/// Two caches carry the walk's guarantees. The clone cache maps each original
/// node to its single clone, so shared and cyclic references converge on the
/// same copy; it is populated before relations recurse, which is what stops
/// cycles. The exploration cache remembers each `(node, relation)` pair
/// already resolved, so overlapping patterns redo no work and cause no
/// second side effect.
pub struct Cloner<'s, F: PropertyFilter> {
    store: &'s mut Store,
    filter: &'s F,
    clones: HashMap<NodeId, NodeId>,
    explored: HashMap<(NodeId, String), NodeSet<Node>>,
}

impl<'s, F: PropertyFilter> Cloner<'s, F> {
    pub fn new(store: &'s mut Store, filter: &'s F) -> Self {
        Self {
            store,
            filter,
            clones: HashMap::new(),
            explored: HashMap::new(),
        }
    }

    /// Returns the clone of `node`, creating it on first request.
    ///
    /// The fresh clone carries the original's type and its filter-approved,
    /// non-null attributes; relations stay unset until a pattern resolves
    /// them. Opaque value nodes are aliased, not copied.
    pub fn get_clone(&mut self, node: NodeId) -> Result<NodeId, EngineError> {
        if let Some(&clone) = self.clones.get(&node) {
            return Ok(clone);
        }
        let Some(ty) = self.store.node_type(node) else {
            self.clones.insert(node, node);
            return Ok(node);
        };
        let schema = Arc::clone(self.store.schema());
        let info = schema.info(ty);
        if !info.instantiable() {
            return Err(EngineError::Instantiation(info.name().to_string()));
        }
        let clone = self.store.alloc(ty);
        self.clones.insert(node, clone);
        for attr in info.attributes() {
            if !self.filter.test(self.store, node, attr) {
                continue;
            }
            let value = self.store.attr(node, attr)?;
            if !value.is_null() {
                self.store.set_attr(clone, attr, value)?;
            }
        }
        Ok(clone)
    }

    fn clone_value(&mut self, value: &RelationValue) -> Result<RelationValue, EngineError> {
        Ok(match value {
            RelationValue::One(id) => RelationValue::One(self.get_clone(*id)?),
            RelationValue::List(ids) => {
                let mut out = Vec::with_capacity(ids.len());
                for &id in ids {
                    out.push(self.get_clone(id)?);
                }
                RelationValue::List(out)
            }
            RelationValue::Set(ids) => {
                let mut out = IndexSet::with_capacity(ids.len());
                for &id in ids {
                    out.insert(self.get_clone(id)?);
                }
                RelationValue::Set(out)
            }
            RelationValue::SortedSet(ids) => {
                let mut out = std::collections::BTreeSet::new();
                for &id in ids {
                    out.insert(self.get_clone(id)?);
                }
                RelationValue::SortedSet(out)
            }
            RelationValue::Map(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (&key, &value) in map {
                    out.insert(self.get_clone(key)?, self.get_clone(value)?);
                }
                RelationValue::Map(out)
            }
            RelationValue::SortedMap(map) => {
                let mut out = std::collections::BTreeMap::new();
                for (&key, &value) in map {
                    out.insert(self.get_clone(key)?, self.get_clone(value)?);
                }
                RelationValue::SortedMap(out)
            }
        })
    }

    /// Resolves the inverse back-reference path on a related node, cloning
    /// each hop along the way. A multi-segment path fans out through the
    /// intermediate results exactly like a dotted pattern would.
    fn walk_inverse(
        &mut self,
        node: Node,
        path: &[String],
        idx: usize,
    ) -> Result<(), EngineError> {
        let Some(found) = self.explore(node, &path[idx])? else {
            return Ok(());
        };
        if idx + 1 < path.len() {
            for member in found {
                self.walk_inverse(member, path, idx + 1)?;
            }
        }
        Ok(())
    }
}

impl<F: PropertyFilter> Explorer for Cloner<'_, F> {
    type Node = Node;
    type Error = EngineError;

    fn properties(&mut self, node: Node) -> Result<Vec<String>, EngineError> {
        Ok(relation_names(self.store, node))
    }

    /// Resolves one relation and clones it onto the owner's clone.
    ///
    /// Returns the original related nodes (cloning continues along
    /// originals; clones are looked up at the edges), or `None` when the
    /// relation is filtered out, undeclared, unset, or the node is opaque.
    fn explore(&mut self, node: Node, property: &str) -> Result<Option<NodeSet<Node>>, EngineError> {
        let id = match node {
            Node::Entry { key, value } => return entry_member(key, value, property),
            Node::Object(id) => id,
        };
        if !self.filter.test(self.store, id, property) {
            return Ok(None);
        }
        let Some(ty) = self.store.node_type(id) else {
            return Ok(None);
        };
        let schema = Arc::clone(self.store.schema());
        let info = schema.info(ty);
        let Some(relation) = info.relation(property) else {
            return Ok(None);
        };
        let cache_key = (id, property.to_string());
        if let Some(found) = self.explored.get(&cache_key) {
            return Ok(Some(found.clone()));
        }
        let Some(value) = self.store.relation_unchecked(id, property) else {
            return Ok(None);
        };
        if !value.matches_kind(relation.kind()) {
            return Err(EngineError::unsupported_shape(info.name(), property));
        }
        let value = value.clone();
        let cloned = self.clone_value(&value)?;
        let owner_clone = self.get_clone(id)?;
        self.store.set_relation(owner_clone, property, cloned)?;
        if let Some(path) = relation.inverse() {
            let path = path.to_vec();
            for target in inverse_targets(&value) {
                // nodes aliased rather than cloned carry no back-reference
                if self.get_clone(target)? != target {
                    self.walk_inverse(Node::Object(target), &path, 0)?;
                }
            }
        }
        let found = members(&value);
        self.explored.insert(cache_key, found.clone());
        Ok(Some(found))
    }
}

/// Related nodes whose back-references must follow the clone. Map keys are
/// identifiers, only the values point back.
fn inverse_targets(value: &RelationValue) -> Vec<NodeId> {
    match value {
        RelationValue::One(id) => vec![*id],
        RelationValue::List(ids) => ids.clone(),
        RelationValue::Set(ids) => ids.iter().copied().collect(),
        RelationValue::SortedSet(ids) => ids.iter().copied().collect(),
        RelationValue::Map(map) => map.values().copied().collect(),
        RelationValue::SortedMap(map) => map.values().copied().collect(),
    }
}

/// Facade over pattern compilation, exploration and cloning.
///
/// Holds only the pattern cache; every operation acts on a caller-supplied
/// [`Store`]. One engine can serve many stores and many threads.
#[derive(Debug, Default)]
pub struct CloneEngine {
    patterns: PatternCache,
}

impl CloneEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-clones `root`, following every relation path some pattern
    /// matches. With no patterns only the root itself is cloned.
    pub fn clone_node(
        &self,
        store: &mut Store,
        root: NodeId,
        patterns: &[&str],
    ) -> Result<NodeId, EngineError> {
        self.clone_node_filtered(store, root, patterns, &AllowAll)
    }

    pub fn clone_node_filtered<F: PropertyFilter>(
        &self,
        store: &mut Store,
        root: NodeId,
        patterns: &[&str],
        filter: &F,
    ) -> Result<NodeId, EngineError> {
        let mut clones = self.run(store, &[root], patterns, filter)?;
        Ok(clones.remove(0))
    }

    /// Clones several roots in one walk, sharing the clone cache so nodes
    /// reachable from more than one root come out as a single clone.
    pub fn clone_nodes(
        &self,
        store: &mut Store,
        roots: &[NodeId],
        patterns: &[&str],
    ) -> Result<Vec<NodeId>, EngineError> {
        self.clone_nodes_filtered(store, roots, patterns, &AllowAll)
    }

    pub fn clone_nodes_filtered<F: PropertyFilter>(
        &self,
        store: &mut Store,
        roots: &[NodeId],
        patterns: &[&str],
        filter: &F,
    ) -> Result<Vec<NodeId>, EngineError> {
        self.run(store, roots, patterns, filter)
    }

    fn run<F: PropertyFilter>(
        &self,
        store: &mut Store,
        roots: &[NodeId],
        patterns: &[&str],
        filter: &F,
    ) -> Result<Vec<NodeId>, EngineError> {
        let mut cloner = Cloner::new(store, filter);
        for &pattern in patterns {
            let expr = self.patterns.get(pattern)?;
            for &root in roots {
                let start = NodeSet::from_iter([Node::Object(root)]);
                expr.explore(&start, &mut cloner)?;
            }
        }
        roots.iter().map(|&root| cloner.get_clone(root)).collect()
    }

    /// Copies the plain attributes of `source` onto `target`, overwriting
    /// what `target` declares in common. Relations are untouched. An opaque
    /// source copies nothing.
    pub fn copy(&self, store: &mut Store, source: NodeId, target: NodeId) -> Result<(), EngineError> {
        self.copy_filtered(store, source, target, &AllowAll)
    }

    pub fn copy_filtered<F: PropertyFilter>(
        &self,
        store: &mut Store,
        source: NodeId,
        target: NodeId,
        filter: &F,
    ) -> Result<(), EngineError> {
        let Some(source_ty) = store.node_type(source) else {
            return Ok(());
        };
        let schema = Arc::clone(store.schema());
        let source_info = schema.info(source_ty);
        let Some(target_info) = store.node_type(target).map(|ty| schema.info(ty)) else {
            return Ok(());
        };
        for attr in source_info.attributes() {
            if !target_info.attributes().iter().any(|a| a == attr) {
                continue;
            }
            if !filter.test(store, source, attr) {
                continue;
            }
            let value = store.attr(source, attr)?;
            store.set_attr(target, attr, value)?;
        }
        Ok(())
    }

    /// Evaluates the patterns over `roots` without touching the store,
    /// reporting the result set and every node the walk visited.
    pub fn explore(
        &self,
        store: &Store,
        roots: &[NodeId],
        patterns: &[&str],
    ) -> Result<Explored, EngineError> {
        self.explore_filtered(store, roots, patterns, &AllowAll)
    }

    pub fn explore_filtered<F: PropertyFilter>(
        &self,
        store: &Store,
        roots: &[NodeId],
        patterns: &[&str],
        filter: &F,
    ) -> Result<Explored, EngineError> {
        let mut explorer = StoreExplorer::new(store, filter);
        for &root in roots {
            explorer.visit(root);
        }
        let start: NodeSet<Node> = roots.iter().map(|&root| Node::Object(root)).collect();
        let mut result = NodeSet::default();
        for &pattern in patterns {
            let expr = self.patterns.get(pattern)?;
            result.extend(expr.explore(&start, &mut explorer)?);
        }
        Ok(Explored::new(result, explorer.into_visited()))
    }
}
