use crate::node::TreeNode;
use crate::node_tuple::NodeTuple;

/// A matcher defines the criterion that a tuple of points must satisfy to
/// contribute to an N-point statistic, and it owns the accumulated results.
///
/// Aside from [`Matcher::prepare`] (called once, when the traversal is
/// created), the traversal interacts with a matcher through 2 methods:
/// - [`Matcher::test_node_tuple`] is the prune test. It is called for every
///   [`NodeTuple`] that holds at least one non-leaf node.
/// - [`Matcher::compute_base_case`] is the exhaustive point-level evaluation.
///   It is called for every all-leaf [`NodeTuple`] that survives pruning (or,
///   in naive mode, once for the root tuple).
///
/// The contents of the accumulated results are entirely up to the matcher
/// (counts, weighted sums, histograms...). Callers read them directly from
/// the matcher after the traversal finishes.
///
/// <div class="warning">
///
/// **The prune test must be sound.** `test_node_tuple` must never return
/// `false` if any combination of points within the tuple's nodes satisfies
/// the matching criterion. Returning `true` conservatively is always safe (it
/// only costs time). An unsound test silently drops matches and the traversal
/// has no way to detect it. Comparing a pruned traversal against a naive one
/// on small inputs is the recommended way to check a new matcher.
///
/// </div>
///
/// Prune tests usually compare the regions described by
/// [`TreeNode::bounds`]. A matcher that needs a particular kind of region
/// constrains `N::Bounds` or implements the trait for a concrete node type.
///
/// # Symmetry
/// When a tree fills multiple slots, `compute_base_case` is responsible for
/// visiting each unordered combination of that tree's points only once. The
/// simplest way to honor this is to enumerate points with
/// [`NodeTuple::for_each_point_tuple`]. Note that in naive mode the nodes
/// passed to `compute_base_case` are the tree roots, which generally aren't
/// leaves.
///
/// # Faults
/// The traversal doesn't catch panics raised by a matcher. A panic aborts
/// the entire calculation since a partial traversal doesn't produce a
/// meaningful result.
pub trait Matcher<N: TreeNode> {
    /// Called once with the root tuple before the traversal begins.
    ///
    /// The assignment of trees to slots (see [`NodeTuple::tree_id`]) is the
    /// same for every tuple the matcher will see, so this is the place to
    /// precompute anything that only depends on it. The default does nothing.
    fn prepare(&mut self, root: &NodeTuple<N>) {
        let _ = root;
    }

    /// Returns `false` only if no combination of points drawn from the nodes
    /// of `nodes` can possibly match.
    fn test_node_tuple(&self, nodes: &NodeTuple<N>) -> bool;

    /// Evaluates every canonical combination of points drawn from the nodes
    /// of `nodes` and accumulates the matches.
    fn compute_base_case(&mut self, nodes: &NodeTuple<N>);

    /// The number of slots that the matcher was configured for.
    ///
    /// Matchers that can handle any number of slots return `None` (the
    /// default).
    fn tuple_size(&self) -> Option<usize> {
        None
    }
}
