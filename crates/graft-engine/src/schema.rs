//! Per-type introspection metadata.
//!
//! The schema is the engine's answer to annotation scanning: for every named
//! type it records the plain attributes, the relations with their declared
//! shape and optional inverse back-reference path, and whether the type can
//! be default-constructed. Built once through [`SchemaBuilder`], then
//! immutable and shared behind an `Arc` for the process lifetime.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Stable identifier of a schema type, assigned in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(pub(crate) u32);

/// Declared shape of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    /// Exactly one related node (or unset).
    One,
    /// A list, set, or sorted set of related nodes.
    Many,
    /// A map or sorted map from key nodes to value nodes.
    Map,
}

/// One declared relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationInfo {
    name: String,
    kind: RelationKind,
    inverse: Option<Vec<String>>,
}

impl RelationInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    /// Back-reference path on related nodes, split on `.`.
    pub fn inverse(&self) -> Option<&[String]> {
        self.inverse.as_deref()
    }
}

/// Introspection metadata for one type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeInfo {
    name: String,
    instantiable: bool,
    attributes: Vec<String>,
    relations: Vec<RelationInfo>,
    relation_names: Vec<String>,
}

impl TypeInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instantiable(&self) -> bool {
        self.instantiable
    }

    /// Plain attribute names, in declaration order.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn relations(&self) -> &[RelationInfo] {
        &self.relations
    }

    /// Relation names in traversal order: many-valued relations come first,
    /// which reduces fetch count for collaborators backed by lazy loading.
    pub fn relation_names(&self) -> &[String] {
        &self.relation_names
    }

    pub fn relation(&self, name: &str) -> Option<&RelationInfo> {
        self.relations.iter().find(|r| r.name == name)
    }
}

/// Immutable registry of type metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    types: Vec<TypeInfo>,
    by_name: HashMap<String, TypeId>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn info(&self, ty: TypeId) -> &TypeInfo {
        &self.types[ty.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Builder for a [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    types: Vec<TypeDraft>,
}

#[derive(Debug)]
struct TypeDraft {
    name: String,
    instantiable: bool,
    attributes: Vec<String>,
    relations: Vec<RelationInfo>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or continues) declaring a type.
    pub fn ty(&mut self, name: &str) -> TypeBuilder<'_> {
        self.types.push(TypeDraft {
            name: name.to_string(),
            instantiable: true,
            attributes: Vec::new(),
            relations: Vec::new(),
        });
        TypeBuilder {
            draft: self.types.last_mut().unwrap(),
        }
    }

    pub fn build(self) -> Schema {
        let mut types = Vec::with_capacity(self.types.len());
        let mut by_name = HashMap::with_capacity(self.types.len());
        for (index, mut draft) in self.types.into_iter().enumerate() {
            // many/map relations first; stable, so declaration order is kept
            // within each group
            draft
                .relations
                .sort_by_key(|r| matches!(r.kind, RelationKind::One));
            let relation_names = draft.relations.iter().map(|r| r.name.clone()).collect();
            by_name.insert(draft.name.clone(), TypeId(index as u32));
            types.push(TypeInfo {
                name: draft.name,
                instantiable: draft.instantiable,
                attributes: draft.attributes,
                relations: draft.relations,
                relation_names,
            });
        }
        Schema { types, by_name }
    }
}

/// Declares the members of one type.
pub struct TypeBuilder<'a> {
    draft: &'a mut TypeDraft,
}

impl TypeBuilder<'_> {
    /// Declares a plain attribute.
    pub fn attr(self, name: &str) -> Self {
        self.draft.attributes.push(name.to_string());
        self
    }

    /// Declares a singular relation.
    pub fn one(self, name: &str) -> Self {
        self.relation(name, RelationKind::One)
    }

    /// Declares a collection-valued relation.
    pub fn many(self, name: &str) -> Self {
        self.relation(name, RelationKind::Many)
    }

    /// Declares a map-valued relation.
    pub fn map(self, name: &str) -> Self {
        self.relation(name, RelationKind::Map)
    }

    /// Declares the inverse back-reference path of the most recent relation.
    /// The path may have several dot-separated segments.
    ///
    /// # Panics
    /// Panics when no relation has been declared yet.
    pub fn mapped_by(self, path: &str) -> Self {
        match self.draft.relations.last_mut() {
            Some(relation) => {
                relation.inverse = Some(path.split('.').map(str::to_string).collect());
            }
            None => panic!("mapped_by requires a preceding relation"),
        }
        self
    }

    /// Marks the type as not default-constructible; cloning a node of this
    /// type fails with an instantiation error.
    pub fn non_instantiable(self) -> Self {
        self.draft.instantiable = false;
        self
    }

    fn relation(self, name: &str, kind: RelationKind) -> Self {
        self.draft.relations.push(RelationInfo {
            name: name.to_string(),
            kind,
            inverse: None,
        });
        self
    }
}
