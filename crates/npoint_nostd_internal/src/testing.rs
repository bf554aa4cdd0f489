//! Lightweight trees and matchers used by the unit tests of this crate

use crate::matcher::Matcher;
use crate::node::{Side, TreeNode};
use crate::node_tuple::NodeTuple;
use core::ops::Range;

/// A tree over the points `0..n_points` placed on a line (the position of a
/// point is its rank). Nodes are computed on the fly by halving ranges until
/// they hold no more than `leaf_size` points.
#[derive(Clone, Copy, Debug)]
pub struct RangeNode {
    start: usize,
    end: usize,
    leaf_size: usize,
}

impl RangeNode {
    pub fn root(n_points: usize, leaf_size: usize) -> RangeNode {
        RangeNode {
            start: 0,
            end: n_points,
            leaf_size,
        }
    }

    pub fn count_leaves(&self) -> usize {
        match (self.child(Side::Left), self.child(Side::Right)) {
            (Some(left), Some(right)) => left.count_leaves() + right.count_leaves(),
            _ => 1,
        }
    }
}

impl TreeNode for RangeNode {
    // the points sit at their ranks
    type Bounds = Range<usize>;

    fn is_leaf(&self) -> bool {
        self.end - self.start <= self.leaf_size
    }

    fn child(&self, side: Side) -> Option<RangeNode> {
        if self.is_leaf() {
            return None;
        }
        let mid = self.start + (self.end - self.start) / 2;
        let (start, end) = match side {
            Side::Left => (self.start, mid),
            Side::Right => (mid, self.end),
        };
        Some(RangeNode {
            start,
            end,
            leaf_size: self.leaf_size,
        })
    }

    fn point_range(&self) -> Range<usize> {
        self.start..self.end
    }

    fn bounds(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Counts tuples where every pair of points is separated by no more than
/// `max_sep` (positions are the ranks, offset by a per-tree shift).
pub struct SeparationCounter {
    pub max_sep: usize,
    /// added to the positions of the points from the tree with a given id
    pub offsets: [usize; 4],
    pub n_matches: u64,
}

impl SeparationCounter {
    pub fn new(max_sep: usize) -> Self {
        SeparationCounter {
            max_sep,
            offsets: [0; 4],
            n_matches: 0,
        }
    }

    fn span(&self, nodes: &NodeTuple<RangeNode>, slot: usize) -> Range<usize> {
        let offset = self.offsets[nodes.tree_id(slot)];
        let range = nodes.node(slot).bounds();
        (range.start + offset)..(range.end + offset)
    }
}

impl Matcher<RangeNode> for SeparationCounter {
    fn test_node_tuple(&self, nodes: &NodeTuple<RangeNode>) -> bool {
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let a = self.span(nodes, i);
                let b = self.span(nodes, j);
                // the gap between the closest points of the 2 spans
                let gap = if a.end <= b.start {
                    b.start - (a.end - 1)
                } else if b.end <= a.start {
                    a.start - (b.end - 1)
                } else {
                    0
                };
                if gap > self.max_sep {
                    return false;
                }
            }
        }
        true
    }

    fn compute_base_case(&mut self, nodes: &NodeTuple<RangeNode>) {
        let offsets = self.offsets;
        let max_sep = self.max_sep;
        let mut n_matches = 0;
        nodes.for_each_point_tuple(|ranks| {
            let pos = |slot: usize| ranks[slot] + offsets[nodes.tree_id(slot)];
            let matches = (0..ranks.len())
                .all(|i| ((i + 1)..ranks.len()).all(|j| pos(i).abs_diff(pos(j)) <= max_sep));
            if matches {
                n_matches += 1;
            }
        });
        self.n_matches += n_matches;
    }
}
