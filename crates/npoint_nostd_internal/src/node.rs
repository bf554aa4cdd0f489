use core::ops::Range;

/// Identifies one of the 2 children of a non-leaf node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// The capabilities that the traversal needs from a node of a binary
/// space-partitioning tree.
///
/// Types implementing this trait are expected to be lightweight handles
/// (e.g. a reference to the tree plus a node index). The tree owns its nodes
/// and is never mutated while it is being traversed.
///
/// # Point ranks
/// Every node covers a contiguous range of the tree's point "ranks" (i.e.
/// the position of a point in the tree's internal ordering). The 2 children
/// of a node partition the parent's range, with the left child covering the
/// lower ranks. The traversal relies upon these ranks to avoid visiting
/// permutations of the same tuple when a tree fills multiple slots.
///
/// # Bounds
/// Each node also describes the region of space that encloses its points.
/// The traversal itself never looks at it. It's consumed by the prune tests
/// of matchers, so its form is up to the tree (a bounding box, a ball...).
pub trait TreeNode: Copy {
    /// Describes the region enclosing the node's points
    type Bounds;

    /// Returns whether the node has no children
    fn is_leaf(&self) -> bool;

    /// Returns the specified child. This is `None` when `self` is a leaf
    fn child(&self, side: Side) -> Option<Self>;

    /// The range of point ranks covered by the node
    fn point_range(&self) -> Range<usize>;

    /// The region enclosing every point covered by the node
    fn bounds(&self) -> Self::Bounds;
}
