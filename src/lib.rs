/*!
Provides a generic engine for computing N-point correlation statistics with a
multi-tree, branch-and-bound traversal.

# High-Level: N-Point Statistics

An N-point statistic counts (or weights) the tuples of N points that satisfy
some spatial criterion, e.g. "every pair of points in the tuple is separated
by a distance that falls inside of a given window". The points of a tuple may
be drawn from a single data set (an auto-correlation) or from several data
sets (a cross-correlation).

Checking every tuple directly scales as `O(n^N)`. Instead, we organize each
data set in a space-partitioning tree and walk N trees at once. At every step
we hold one tree node per slot of the tuple and ask a [`Matcher`] whether any
combination of points drawn from those nodes could match. When the answer is
no, the whole combination of subtrees is skipped.

# User Guide

1. Wrap each data set in a [`PointSet`] and build a [`KdTree`] from it.
2. Pick (or write) a [`Matcher`]. [`RangeMatcher`] and [`BinnedPairMatcher`]
   are provided.
3. Describe the calculation with an [`NptBuilder`], where each tree is
   registered with its multiplicity (the number of slots it fills), and build
   an [`Npt`].
4. Call [`Npt::compute`] and read the results from the matcher.

```
use ndarray::ArrayView2;
use npoint::{KdTree, NptBuilder, PointSet, RangeMatcher};
use std::num::NonZeroUsize;

let positions = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
let points = PointSet::new(ArrayView2::from_shape((1, 6), &positions).unwrap(), None).unwrap();
let tree = KdTree::build(&points, NonZeroUsize::new(2).unwrap());

// count the pairs of points separated by less than 1.5
let mut npt = NptBuilder::new()
    .tree(&tree, 2)
    .build(RangeMatcher::uniform(2, 0.0, 1.5).unwrap())
    .unwrap();
npt.compute();
assert_eq!(npt.matcher().n_matches(), 5);
```

When a tree fills several slots, each unordered combination of its points is
only visited once.

Writing a new [`Matcher`] requires care: its prune test must never discard a
combination of nodes that holds a match. [`NptBuilder::cross_check`] compares
the pruned calculation against a brute-force (naive) calculation, which is
a good way to test a new matcher on small inputs.

# Developer Guide

See the crate-level documentation for [`npoint_nostd_internal`].

*/

#![deny(rustdoc::broken_intra_doc_links)]

// inform build-system of the crates in this package
mod builder;
mod error;
mod kdtree;
mod matchers;

// pull in symbols that visible outside of the package
pub use builder::{CrossCheck, Npt, NptBuilder};
pub use error::Error;
pub use kdtree::{KdNode, KdTree, PointSet};
pub use matchers::{BinnedPairMatcher, MatchCount, RangeMatcher};
pub use npoint_nostd_internal::{
    BinEdges, BoundingBox, IrregularBinEdges, Matcher, NodeTuple, RegularBinEdges, Side,
    TraversalStats, TreeNode,
};
