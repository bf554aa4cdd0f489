//! A simple kd-tree that serves as the spatial index for N-point calculations

use std::num::NonZeroUsize;
use std::ops::Range;

use ndarray::{Array2, ArrayView2};
use npoint_nostd_internal::{BoundingBox, Side, TreeNode};

/// Collection of point properties.
///
/// We place the following constraints on the positions array:
/// - axis 0 is the slow axis and it corresponds to different components of
///   a position.
/// - axis 1 is the fast axis. The length along this axis coincides with
///   the number of points.
/// - In other words the shape of the array is `(D, n_points)`, where `D` is
///   the number of spatial dimensions and `n_points` is the number of points.
#[derive(Clone)]
pub struct PointSet<'a> {
    positions: ArrayView2<'a, f64>,
    weights: Option<&'a [f64]>,
    n_points: usize,
    n_spatial_dims: usize,
}

impl<'a> PointSet<'a> {
    /// create a new instance
    ///
    /// An empty set of points is permitted (but a tree built from it can't
    /// be used in a calculation).
    pub fn new(
        positions: ArrayView2<'a, f64>,
        weights: Option<&'a [f64]>,
    ) -> Result<PointSet<'a>, &'static str> {
        let n_spatial_dims = positions.shape()[0];
        let n_points = positions.shape()[1];
        if n_spatial_dims == 0 {
            Err("positions must have at least 1 spatial dimension")
        } else if positions.iter().any(|x| !x.is_finite()) {
            Err("positions must all be finite")
        } else if weights.is_some_and(|w| w.len() != n_points) {
            Err("weights must have the same number of points as positions")
        } else {
            Ok(Self {
                positions,
                weights,
                n_points,
                n_spatial_dims,
            })
        }
    }

    pub fn n_points(&self) -> usize {
        self.n_points
    }

    pub fn n_spatial_dims(&self) -> usize {
        self.n_spatial_dims
    }

    /// If no weights are provided, returns 1.0, i.e., weights are just counts.
    pub fn get_weight(&self, idx: usize) -> f64 {
        if let Some(weights) = self.weights {
            weights[idx]
        } else {
            1.0
        }
    }
}

struct NodeData {
    ranks: Range<usize>,
    bounds: BoundingBox,
    children: Option<[usize; 2]>,
}

/// A kd-tree built over a copy of a [`PointSet`].
///
/// The tree stores the points in its own order (the point's "rank"), such
/// that every node covers a contiguous range of ranks. A node is split at the
/// midpoint of its bounding box, along the widest dimension. Points that lie
/// exactly on the midpoint go to the left child.
pub struct KdTree {
    // shape is (D, n_points), in rank order
    positions: Array2<f64>,
    weights: Vec<f64>,
    original_indices: Vec<usize>,
    nodes: Vec<NodeData>,
    leaf_size: NonZeroUsize,
}

impl KdTree {
    /// Build the tree. Nodes holding no more than `leaf_size` points are
    /// leaves.
    pub fn build(points: &PointSet, leaf_size: NonZeroUsize) -> KdTree {
        let n_points = points.n_points;
        let mut positions = points.positions.to_owned();
        let mut weights: Vec<f64> = (0..n_points).map(|i| points.get_weight(i)).collect();
        let mut original_indices: Vec<usize> = (0..n_points).collect();

        let mut nodes = vec![NodeData {
            ranks: 0..n_points,
            bounds: BoundingBox::from_points(positions.view(), 0..n_points),
            children: None,
        }];

        // we use an explicit stack since midpoint splits of strongly
        // clustered data can produce very deep trees
        let mut pending = vec![0_usize];
        while let Some(node_id) = pending.pop() {
            let ranks = nodes[node_id].ranks.clone();
            if ranks.len() <= leaf_size.get() {
                continue;
            }
            let (dim, width) = nodes[node_id].bounds.widest_dim();
            if width <= 0.0 {
                // every point is identical
                continue;
            }
            let midpoint = nodes[node_id].bounds.mins()[dim] + 0.5 * width;

            let split = partition(
                &mut positions,
                &mut weights,
                &mut original_indices,
                ranks.clone(),
                dim,
                midpoint,
            );
            if split == ranks.start || split == ranks.end {
                // this can only happen from round-off when width is tiny
                continue;
            }

            let left_id = nodes.len();
            for child_ranks in [ranks.start..split, split..ranks.end] {
                nodes.push(NodeData {
                    bounds: BoundingBox::from_points(positions.view(), child_ranks.clone()),
                    ranks: child_ranks,
                    children: None,
                });
            }
            nodes[node_id].children = Some([left_id, left_id + 1]);
            pending.push(left_id + 1);
            pending.push(left_id);
        }

        tracing::debug!(
            n_points,
            n_nodes = nodes.len(),
            leaf_size = leaf_size.get(),
            "built kd-tree"
        );

        KdTree {
            positions,
            weights,
            original_indices,
            nodes,
            leaf_size,
        }
    }

    pub fn root(&self) -> KdNode<'_> {
        KdNode { tree: self, id: 0 }
    }

    pub fn n_points(&self) -> usize {
        self.weights.len()
    }

    pub fn n_spatial_dims(&self) -> usize {
        self.positions.shape()[0]
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_size(&self) -> NonZeroUsize {
        self.leaf_size
    }

    /// The positions of every point, in rank order. The shape is
    /// `(D, n_points)`
    pub fn positions(&self) -> ArrayView2<'_, f64> {
        self.positions.view()
    }

    pub fn weight(&self, rank: usize) -> f64 {
        self.weights[rank]
    }

    /// Maps a rank back to the index of the point in the original
    /// [`PointSet`]
    pub fn original_index(&self, rank: usize) -> usize {
        self.original_indices[rank]
    }
}

/// Reorders the points in `ranks` so that the ones with a coordinate no larger
/// than `midpoint` along `dim` come first. Returns the first rank of the
/// remaining points.
fn partition(
    positions: &mut Array2<f64>,
    weights: &mut [f64],
    original_indices: &mut [usize],
    ranks: Range<usize>,
    dim: usize,
    midpoint: f64,
) -> usize {
    let n_spatial_dims = positions.shape()[0];
    let mut split = ranks.start;
    for rank in ranks {
        if positions[[dim, rank]] <= midpoint {
            if rank != split {
                for k in 0..n_spatial_dims {
                    positions.swap([k, rank], [k, split]);
                }
                weights.swap(rank, split);
                original_indices.swap(rank, split);
            }
            split += 1;
        }
    }
    split
}

/// A lightweight handle to a node of a [`KdTree`]
#[derive(Clone, Copy)]
pub struct KdNode<'a> {
    tree: &'a KdTree,
    id: usize,
}

impl<'a> KdNode<'a> {
    pub fn tree(&self) -> &'a KdTree {
        self.tree
    }

    /// The `dim` component of the position of the point at `rank`
    pub fn position(&self, rank: usize, dim: usize) -> f64 {
        self.tree.positions[[dim, rank]]
    }

    pub fn weight(&self, rank: usize) -> f64 {
        self.tree.weights[rank]
    }

    pub fn original_index(&self, rank: usize) -> usize {
        self.tree.original_indices[rank]
    }

    pub fn n_spatial_dims(&self) -> usize {
        self.tree.n_spatial_dims()
    }

    /// the number of points in the node
    pub fn count(&self) -> usize {
        self.tree.nodes[self.id].ranks.len()
    }

    /// Returns the number of leaves in the subtree rooted at this node
    pub fn count_leaves(&self) -> usize {
        let mut n_leaves = 0;
        let mut pending = vec![*self];
        while let Some(node) = pending.pop() {
            match (node.child(Side::Left), node.child(Side::Right)) {
                (Some(left), Some(right)) => {
                    pending.push(left);
                    pending.push(right);
                }
                _ => n_leaves += 1,
            }
        }
        n_leaves
    }

    /// Returns the depth of the subtree rooted at this node (a leaf has a
    /// depth of 0)
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut pending = vec![(*self, 0_usize)];
        while let Some((node, depth)) = pending.pop() {
            max_depth = max_depth.max(depth);
            for side in [Side::Left, Side::Right] {
                if let Some(child) = node.child(side) {
                    pending.push((child, depth + 1));
                }
            }
        }
        max_depth
    }
}

impl std::fmt::Debug for KdNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("KdNode")
            .field("id", &self.id)
            .field("ranks", &self.tree.nodes[self.id].ranks)
            .finish()
    }
}

impl<'a> TreeNode for KdNode<'a> {
    type Bounds = &'a BoundingBox;

    fn is_leaf(&self) -> bool {
        self.tree.nodes[self.id].children.is_none()
    }

    fn child(&self, side: Side) -> Option<Self> {
        let [left, right] = self.tree.nodes[self.id].children?;
        let id = match side {
            Side::Left => left,
            Side::Right => right,
        };
        Some(KdNode {
            tree: self.tree,
            id,
        })
    }

    fn point_range(&self) -> Range<usize> {
        self.tree.nodes[self.id].ranks.clone()
    }

    fn bounds(&self) -> &'a BoundingBox {
        &self.tree.nodes[self.id].bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn point_set_errors() {
        let positions = [0.0, 1.0, 2.0, 3.0];
        let view = ArrayView2::from_shape((2, 2), &positions).unwrap();
        assert!(PointSet::new(view, Some(&[1.0])).is_err());
        assert!(PointSet::new(view, Some(&[1.0, 2.0])).is_ok());

        let empty: [f64; 0] = [];
        let no_dims = ArrayView2::from_shape((0, 0), &empty).unwrap();
        assert!(PointSet::new(no_dims, None).is_err());

        let bad = [0.0, f64::NAN];
        let view = ArrayView2::from_shape((1, 2), &bad).unwrap();
        assert!(PointSet::new(view, None).is_err());
    }

    #[test]
    fn empty_tree() {
        let empty: [f64; 0] = [];
        let points = PointSet::new(ArrayView2::from_shape((3, 0), &empty).unwrap(), None).unwrap();
        let tree = KdTree::build(&points, leaf_size(2));
        assert_eq!(tree.n_points(), 0);
        assert!(tree.root().is_leaf());
        assert!(tree.root().point_range().is_empty());
    }

    #[test]
    fn line_of_points() {
        // 8 points along a line, given out of order
        let positions = [5.0, 0.0, 7.0, 2.0, 1.0, 6.0, 3.0, 4.0];
        let weights = [50.0, 0.0, 70.0, 20.0, 10.0, 60.0, 30.0, 40.0];
        let points = PointSet::new(
            ArrayView2::from_shape((1, 8), &positions).unwrap(),
            Some(&weights),
        )
        .unwrap();
        let tree = KdTree::build(&points, leaf_size(2));

        assert_eq!(tree.n_nodes(), 7);
        let root = tree.root();
        assert_eq!(root.count_leaves(), 4);
        assert_eq!(root.depth(), 2);

        let left = root.child(Side::Left).unwrap();
        let right = root.child(Side::Right).unwrap();
        assert_eq!(left.point_range(), 0..4);
        assert_eq!(right.point_range(), 4..8);
        assert_eq!(left.bounds().maxs(), &[3.0]);
        assert_eq!(right.bounds().mins(), &[4.0]);

        // the weights and original indices follow the points around
        for rank in 0..8 {
            let original = tree.original_index(rank);
            assert_eq!(tree.positions()[[0, rank]], positions[original]);
            assert_eq!(tree.weight(rank), weights[original]);
        }
    }

    #[test]
    fn leaves_respect_leaf_size() {
        let positions: Vec<f64> = (0..60).map(|i| ((i * 37) % 60) as f64 * 0.5).collect();
        let points =
            PointSet::new(ArrayView2::from_shape((2, 30), &positions).unwrap(), None).unwrap();
        let tree = KdTree::build(&points, leaf_size(3));

        let mut pending = vec![tree.root()];
        let mut n_covered = 0;
        while let Some(node) = pending.pop() {
            if node.is_leaf() {
                assert!(node.count() <= 3);
                n_covered += node.count();
            } else {
                let left = node.child(Side::Left).unwrap();
                let right = node.child(Side::Right).unwrap();
                assert_eq!(left.point_range().start, node.point_range().start);
                assert_eq!(left.point_range().end, right.point_range().start);
                assert_eq!(right.point_range().end, node.point_range().end);
                pending.push(left);
                pending.push(right);
            }
        }
        assert_eq!(n_covered, 30);
    }

    #[test]
    fn duplicate_points() {
        let positions = [1.0; 10];
        let points =
            PointSet::new(ArrayView2::from_shape((2, 5), &positions).unwrap(), None).unwrap();
        let tree = KdTree::build(&points, leaf_size(1));
        // identical points can't be split
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.root().count(), 5);
    }
}
