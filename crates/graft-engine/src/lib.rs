//! Identity-preserving deep cloning of cyclic object graphs.
//!
//! A [`Store`] holds an arena of typed nodes whose shape is described by a
//! [`Schema`]. The [`CloneEngine`] evaluates path patterns (compiled by
//! `graft-path`) over a store and clones exactly the relations the patterns
//! reach, preserving collection shapes, shared references and cycles.
//!
//! ```
//! use graft_engine::{CloneEngine, RelationValue, Schema, Store};
//!
//! let mut schema = Schema::builder();
//! schema.ty("Node").attr("label").one("next");
//! let schema = schema.build();
//! let node = schema.type_id("Node").unwrap();
//!
//! let mut store = Store::new(schema);
//! let a = store.alloc(node);
//! let b = store.alloc(node);
//! store.set_attr(a, "label", "a").unwrap();
//! store.set_relation(a, "next", RelationValue::One(b)).unwrap();
//! store.set_relation(b, "next", RelationValue::One(a)).unwrap();
//!
//! let engine = CloneEngine::new();
//! let clone = engine.clone_node(&mut store, a, &["next+"]).unwrap();
//! assert_ne!(clone, a);
//! assert_eq!(store.attr(clone, "label").unwrap(), "a".into());
//! ```

pub mod clone;
pub mod error;
pub mod explore;
pub mod filter;
pub mod schema;
pub mod store;
pub mod value;

#[cfg(test)]
mod clone_tests;

pub use clone::{CloneEngine, Cloner};
pub use error::EngineError;
pub use explore::{Explored, StoreExplorer};
pub use filter::{AllowAll, PropertyFilter};
pub use graft_path::{PatternCache, PatternError};
pub use schema::{RelationInfo, RelationKind, Schema, SchemaBuilder, TypeBuilder, TypeId, TypeInfo};
pub use store::{Node, NodeId, RelationValue, Store};
pub use value::Value;
