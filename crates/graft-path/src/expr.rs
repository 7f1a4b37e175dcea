//! Traversal-plan AST and its evaluation.

use crate::explorer::{Explorer, NodeSet};
use crate::wildcard::WildcardMatcher;

/// A compiled path expression.
///
/// A closed set of traversal primitives built by the compiler. Expressions
/// are immutable and stateless apart from the wildcard matcher's memoized
/// match decisions, so one compiled expression can serve many concurrent
/// traversals.
#[derive(Debug, PartialEq)]
pub enum PathExpr {
    /// Resolve one relation name on every input node.
    Literal(String),
    /// Resolve every relation name matching a glob on every input node.
    Wildcard(WildcardMatcher),
    /// Sequential composition: feed the left result into the right side.
    Dot(Box<PathExpr>, Box<PathExpr>),
    /// Branch: union of both sides over the same input.
    Or(Box<PathExpr>, Box<PathExpr>),
    /// One-or-more repetition of the child.
    Plus(Box<PathExpr>),
    /// Zero-or-more repetition of the child.
    Star(Box<PathExpr>),
    /// Evaluate the child for its side effects, return the empty set.
    Terminator(Box<PathExpr>),
}

impl PathExpr {
    /// Evaluates the expression over `nodes`, resolving relations through
    /// `explorer`. Returns the set of nodes reached at the end of the paths.
    pub fn explore<E: Explorer>(
        &self,
        nodes: &NodeSet<E::Node>,
        explorer: &mut E,
    ) -> Result<NodeSet<E::Node>, E::Error> {
        match self {
            PathExpr::Literal(name) => {
                let mut explored = NodeSet::default();
                for &node in nodes {
                    if let Some(found) = explorer.explore(node, name)? {
                        explored.extend(found);
                    }
                }
                Ok(explored)
            }
            PathExpr::Wildcard(matcher) => {
                let mut explored = NodeSet::default();
                for &node in nodes {
                    for property in explorer.properties(node)? {
                        if matcher.matches(&property)
                            && let Some(found) = explorer.explore(node, &property)?
                        {
                            explored.extend(found);
                        }
                    }
                }
                Ok(explored)
            }
            PathExpr::Dot(a, b) => b.explore(&a.explore(nodes, explorer)?, explorer),
            PathExpr::Or(a, b) => {
                let mut explored = a.explore(nodes, explorer)?;
                explored.extend(b.explore(nodes, explorer)?);
                Ok(explored)
            }
            PathExpr::Plus(child) => repeat(child, nodes, explorer, false),
            PathExpr::Star(child) => repeat(child, nodes, explorer, true),
            PathExpr::Terminator(child) => {
                child.explore(nodes, explorer)?;
                Ok(NodeSet::default())
            }
        }
    }
}

/// Fixpoint repetition. The frontier starts as the input set; each round
/// explores the frontier, drops nodes seen before (cycle and duplicate
/// guard), and accumulates the rest. Terminates because the node set is
/// finite and every frontier strictly shrinks to unvisited nodes.
///
/// Zero-or-more differs from one-or-more only by pre-seeding the visited set
/// with the starting nodes, so a round that finds nothing still yields them.
fn repeat<E: Explorer>(
    child: &PathExpr,
    nodes: &NodeSet<E::Node>,
    explorer: &mut E,
    seed_with_input: bool,
) -> Result<NodeSet<E::Node>, E::Error> {
    let mut explored: NodeSet<E::Node> = NodeSet::default();
    if seed_with_input {
        explored.extend(nodes.iter().copied());
    }
    let mut frontier = nodes.clone();
    loop {
        let mut next = child.explore(&frontier, explorer)?;
        next.retain(|node| !explored.contains(node));
        if next.is_empty() {
            return Ok(explored);
        }
        explored.extend(next.iter().copied());
        frontier = next;
    }
}
