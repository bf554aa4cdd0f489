//! Defines [`NodeTuple`], the unit of work of the multi-tree traversal.
//!
//! # Symmetry
//!
//! When a single tree fills `k > 1` slots, each unordered k-subset of its
//! points shows up `k!` times among the ordered tuples spanned by the root
//! [`NodeTuple`]. We only want to count it once.
//!
//! Our canonical choice is the ordering where the point ranks (see
//! [`TreeNode`]) strictly increase with slot index, among the slots that draw
//! from the same tree. Because each node covers a contiguous range of ranks
//! (`[begin, end)`), a [`NodeTuple`] can only contain a canonical point tuple
//! if `begin(node_i) < end(node_j)` holds for every pair of same-tree slots
//! `i < j`. [`NodeTuple::check_symmetry`] rejects children that violate this
//! condition and [`NodeTuple::for_each_point_tuple`] only visits canonical
//! point tuples.
//!
//! The condition is necessary but not sufficient (e.g. 3 slots holding the
//! same single-point leaf). That is fine: the excess is filtered out by the
//! point-level enumeration, and no canonical tuple is ever discarded.

use crate::node::{Side, TreeNode};
use alloc::vec::Vec;
use core::ops::Range;

#[derive(Clone, Copy, Debug)]
struct Slot<N> {
    node: N,
    /// index of the configured tree that fills the slot
    tree_id: usize,
}

/// An assignment of a tree node to each correlation slot.
///
/// Instances are never mutated after construction. Children are produced by
/// [`NodeTuple::split`], which copies the parent and replaces the node in the
/// slot returned by [`NodeTuple::split_target`] with one of its children.
#[derive(Clone, Debug)]
pub struct NodeTuple<N: TreeNode> {
    slots: Vec<Slot<N>>,
    all_leaves: bool,
    split_target: Option<usize>,
}

impl<N: TreeNode> NodeTuple<N> {
    /// Builds the root tuple from `(root_node, multiplicity)` pairs, where
    /// each root is repeated according to its multiplicity.
    ///
    /// Slots are laid out in the order of `trees`. Every entry of `trees` is
    /// treated as a distinct tree (for symmetry purposes), even if 2 entries
    /// happen to hold the same root.
    pub fn new(trees: &[(N, usize)]) -> Result<Self, &'static str> {
        if trees.is_empty() {
            return Err("at least one tree must be specified");
        } else if trees.iter().any(|(_, multiplicity)| *multiplicity == 0) {
            return Err("each tree's multiplicity must be positive");
        } else if trees.iter().any(|(root, _)| root.point_range().is_empty()) {
            return Err("each tree must hold at least one point");
        }

        let mut slots = Vec::new();
        for (tree_id, (root, multiplicity)) in trees.iter().enumerate() {
            for _ in 0..*multiplicity {
                slots.push(Slot {
                    node: *root,
                    tree_id,
                });
            }
        }
        Ok(Self::from_slots(slots))
    }

    fn from_slots(slots: Vec<Slot<N>>) -> Self {
        let all_leaves = slots.iter().all(|slot| slot.node.is_leaf());

        // split the non-leaf node covering the most points. Ties go to the
        // lowest slot index
        let mut split_target: Option<(usize, usize)> = None;
        for (i, slot) in slots.iter().enumerate() {
            if slot.node.is_leaf() {
                continue;
            }
            let n_points = slot.node.point_range().len();
            if split_target.is_none_or(|(_, best)| n_points > best) {
                split_target = Some((i, n_points));
            }
        }

        NodeTuple {
            slots,
            all_leaves,
            split_target: split_target.map(|(i, _)| i),
        }
    }

    /// Produces the child tuple where the node in the split-target slot is
    /// replaced by its child on the specified `side`.
    ///
    /// Returns `None` when every slot holds a leaf.
    pub fn split(&self, side: Side) -> Option<Self> {
        let target = self.split_target?;
        let child = self.slots[target].node.child(side)?;
        let mut slots = self.slots.clone();
        slots[target].node = child;
        Some(Self::from_slots(slots))
    }

    /// The number of slots (i.e. the order of the correlation)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// This is always `false`, but clippy likes to see it next to `len`
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns whether every slot holds a leaf node
    pub fn all_leaves(&self) -> bool {
        self.all_leaves
    }

    /// The slot that should be split next.
    ///
    /// This is the non-leaf slot whose node covers the most points (ties are
    /// resolved in favor of the lowest slot index). It's `None` when every
    /// slot holds a leaf.
    pub fn split_target(&self) -> Option<usize> {
        self.split_target
    }

    pub fn node(&self, slot: usize) -> N {
        self.slots[slot].node
    }

    /// Index of the configured tree that fills `slot`
    pub fn tree_id(&self, slot: usize) -> usize {
        self.slots[slot].tree_id
    }

    /// Iterate over the nodes in slot order
    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.slots.iter().map(|slot| slot.node)
    }

    /// Returns whether descending into the `side` child of the node in `slot`
    /// could produce a canonical point tuple (see the module documentation).
    ///
    /// This is always `true` when no other slot shares the tree of `slot`.
    /// Otherwise, it is `false` when the node in `slot` is a leaf (there's no
    /// child to descend into).
    pub fn check_symmetry(&self, slot: usize, side: Side) -> bool {
        let tree_id = self.slots[slot].tree_id;
        let mut others = self
            .slots
            .iter()
            .enumerate()
            .filter(|(j, other)| *j != slot && other.tree_id == tree_id)
            .peekable();
        if others.peek().is_none() {
            return true;
        }
        let Some(child) = self.slots[slot].node.child(side) else {
            return false;
        };
        let child_range = child.point_range();

        others.all(|(j, other)| {
            let other_range = other.node.point_range();
            if j < slot {
                other_range.start < child_range.end
            } else {
                child_range.start < other_range.end
            }
        })
    }

    /// Calls `f` once for every canonical point tuple spanned by `self`.
    ///
    /// `f` receives one point rank per slot. Among slots that draw from the
    /// same tree, ranks strictly increase with the slot index, so that each
    /// unordered combination of a tree's points is visited once. Slots filled
    /// by distinct trees are combined exhaustively.
    ///
    /// This is intended to help implement [`crate::Matcher::compute_base_case`].
    pub fn for_each_point_tuple(&self, mut f: impl FnMut(&[usize])) {
        let n_slots = self.slots.len();
        if n_slots == 0 {
            return;
        }

        let ranges: Vec<Range<usize>> = self.nodes().map(|node| node.point_range()).collect();
        // for each slot, the closest preceding slot with the same tree
        let prev_same: Vec<Option<usize>> = (0..n_slots)
            .map(|i| (0..i).rev().find(|&j| self.slots[j].tree_id == self.slots[i].tree_id))
            .collect();

        let lower_bound = |level: usize, ranks: &[usize]| -> usize {
            match prev_same[level] {
                Some(j) => ranges[level].start.max(ranks[j] + 1),
                None => ranges[level].start,
            }
        };

        let mut ranks = alloc::vec![0_usize; n_slots];
        let mut level = 0;
        ranks[0] = lower_bound(0, &ranks);
        loop {
            if ranks[level] >= ranges[level].end {
                // this level is exhausted, so we backtrack
                if level == 0 {
                    break;
                }
                level -= 1;
                ranks[level] += 1;
            } else if level + 1 == n_slots {
                f(&ranks);
                ranks[level] += 1;
            } else {
                level += 1;
                ranks[level] = lower_bound(level, &ranks);
            }
        }
    }
}
