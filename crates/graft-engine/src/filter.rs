//! Property filtering.

use crate::store::{NodeId, Store};

/// Exclusion filter over plain attributes and relations.
///
/// Returning `false` screens the property out: an excluded attribute stays at
/// its zero-value on clones, an excluded relation resolves to nothing during
/// traversal. The filter sees the original node, so decisions may depend on
/// the node itself, not just the name.
pub trait PropertyFilter {
    fn test(&self, store: &Store, node: NodeId, property: &str) -> bool;
}

/// The default filter: every property passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PropertyFilter for AllowAll {
    fn test(&self, _store: &Store, _node: NodeId, _property: &str) -> bool {
        true
    }
}

impl<F> PropertyFilter for F
where
    F: Fn(&Store, NodeId, &str) -> bool,
{
    fn test(&self, store: &Store, node: NodeId, property: &str) -> bool {
        self(store, node, property)
    }
}
