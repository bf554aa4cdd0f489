//! Implements the multi-tree, depth-first branch-and-bound traversal

use crate::matcher::Matcher;
use crate::node::{Side, TreeNode};
use crate::node_tuple::NodeTuple;
use alloc::vec::Vec;

/// Diagnostic counters tracked over the course of a traversal.
///
/// Every terminal step of a (non-naive) traversal is exactly one of: a base
/// case or a prune. Children that are skipped because of symmetry aren't
/// counted at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraversalStats {
    pub n_base_cases: u64,
    pub n_prunes: u64,
}

/// Drives the N-point calculation over a set of trees.
///
/// The traversal is configured with an ordered list of `(root, multiplicity)`
/// pairs, where the multiplicity specifies how many correlation slots are
/// filled by the tree. A tree with a multiplicity above 1 denotes an
/// auto-correlation.
///
/// The matcher is a type parameter so that the prune test and base case
/// (which are invoked for every visited [`NodeTuple`]) are statically
/// dispatched.
///
/// # Naive Mode
/// In naive mode, [`NptTraversal::compute`] hands the root tuple directly to
/// [`Matcher::compute_base_case`]. This is a brute-force calculation that is
/// only practical for small inputs. It's useful for checking the pruned
/// traversal (and the matcher's prune test).
pub struct NptTraversal<N: TreeNode, M: Matcher<N>> {
    root: NodeTuple<N>,
    matcher: M,
    naive: bool,
    stats: TraversalStats,
}

impl<N: TreeNode, M: Matcher<N>> NptTraversal<N, M> {
    /// Create a new instance and hand the root tuple to
    /// [`Matcher::prepare`].
    ///
    /// This fails if `trees` is empty, if any multiplicity is zero, if any
    /// tree is empty, or if the matcher expects a different number of slots.
    pub fn new(trees: &[(N, usize)], mut matcher: M, naive: bool) -> Result<Self, &'static str> {
        let root = NodeTuple::new(trees)?;
        if matcher.tuple_size().is_some_and(|n| n != root.len()) {
            return Err("the matcher's tuple size must match the sum of the multiplicities");
        }
        matcher.prepare(&root);
        Ok(Self {
            root,
            matcher,
            naive,
            stats: TraversalStats::default(),
        })
    }

    /// The number of correlation slots
    pub fn n_slots(&self) -> usize {
        self.root.len()
    }

    pub fn is_naive(&self) -> bool {
        self.naive
    }

    /// Runs the calculation, accumulating results into the matcher.
    ///
    /// The counters (and the matcher) are never reset, so calling this twice
    /// accumulates contributions twice.
    pub fn compute(&mut self) {
        if self.naive {
            self.matcher.compute_base_case(&self.root);
            return;
        }

        // we use an explicit stack (rather than recursion) so that deep or
        // unbalanced trees can't exhaust the call stack. Pushing the right
        // child first means that left children are visited first, in the
        // same order as a recursive depth-first walk.
        let mut pending: Vec<NodeTuple<N>> = alloc::vec![self.root.clone()];
        while let Some(nodes) = pending.pop() {
            if nodes.all_leaves() {
                self.matcher.compute_base_case(&nodes);
                self.stats.n_base_cases += 1;
            } else if !self.matcher.test_node_tuple(&nodes) {
                self.stats.n_prunes += 1;
            } else if let Some(slot) = nodes.split_target() {
                for side in [Side::Right, Side::Left] {
                    if nodes.check_symmetry(slot, side) {
                        if let Some(child) = nodes.split(side) {
                            pending.push(child);
                        }
                    }
                }
            }
        }
    }

    pub fn stats(&self) -> TraversalStats {
        self.stats
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    pub fn into_matcher(self) -> M {
        self.matcher
    }
}
