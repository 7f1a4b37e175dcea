//! Collaborator contract consumed by the traversal executor.

use std::hash::Hash;

use indexmap::IndexSet;

/// A deduplicated collection of graph nodes with deterministic iteration
/// order. Nodes are keyed by identity/equality; insertion order carries no
/// meaning beyond determinism.
pub type NodeSet<N> = IndexSet<N>;

/// Supplies per-node relation names and resolves `(node, property)` pairs to
/// related nodes.
///
/// The traversal executor is stateless beyond the compiled expression; all
/// graph knowledge, and any accumulated side effects (such as cloning), live
/// in the collaborator.
pub trait Explorer {
    /// Node handle. Cheap to copy; equality and hashing define node identity.
    type Node: Copy + Eq + Hash;

    /// Error type surfaced through evaluation. Failures are fatal to the
    /// whole call; there is no partial-result suppression.
    type Error;

    /// Ordered traversable property names for `node`.
    ///
    /// Order is a hint only. Collaborators backed by lazy-loading storage may
    /// place collection-valued relations first to reduce fetch count.
    fn properties(&mut self, node: Self::Node) -> Result<Vec<String>, Self::Error>;

    /// Resolves one property of `node` to related nodes.
    ///
    /// `Ok(None)` is the soft outcome: the property is not a relation on this
    /// node, is filtered out, or currently has no value. This is the normal
    /// mechanism by which optional pattern branches contribute nothing.
    fn explore(
        &mut self,
        node: Self::Node,
        property: &str,
    ) -> Result<Option<NodeSet<Self::Node>>, Self::Error>;
}
