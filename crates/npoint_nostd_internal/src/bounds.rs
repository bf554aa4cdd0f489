//! Defines the axis-aligned hyper-rectangles that tree nodes use to describe
//! the region enclosing their points.

use alloc::vec::Vec;
use core::ops::Range;
use ndarray::ArrayView2;

/// An axis-aligned bounding box.
///
/// The separation queries all return squared distances so that we can avoid
/// square roots (`f64::sqrt` isn't available in no_std crates).
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    mins: Vec<f64>,
    maxs: Vec<f64>,
}

impl BoundingBox {
    /// Construct the smallest box enclosing the points at `ranks`.
    ///
    /// `positions` is expected to have the shape `(D, n_points)`. An empty
    /// range produces an "inverted" box (mins of `+inf`, maxs of `-inf`) that
    /// doesn't contain anything.
    pub fn from_points(positions: ArrayView2<f64>, ranks: Range<usize>) -> BoundingBox {
        let n_spatial_dims = positions.shape()[0];
        let mut mins = alloc::vec![f64::INFINITY; n_spatial_dims];
        let mut maxs = alloc::vec![f64::NEG_INFINITY; n_spatial_dims];
        for rank in ranks {
            for dim in 0..n_spatial_dims {
                let x = positions[[dim, rank]];
                if x < mins[dim] {
                    mins[dim] = x;
                }
                if x > maxs[dim] {
                    maxs[dim] = x;
                }
            }
        }
        BoundingBox { mins, maxs }
    }

    pub fn n_spatial_dims(&self) -> usize {
        self.mins.len()
    }

    pub fn mins(&self) -> &[f64] {
        &self.mins
    }

    pub fn maxs(&self) -> &[f64] {
        &self.maxs
    }

    /// Returns `true` if the box doesn't enclose any point
    pub fn is_empty(&self) -> bool {
        self.mins.iter().zip(&self.maxs).any(|(lo, hi)| lo > hi)
    }

    /// Returns the dimension where the box is widest, along with its width.
    /// Ties are resolved in favor of the lowest dimension.
    pub fn widest_dim(&self) -> (usize, f64) {
        let mut best = (0, self.maxs[0] - self.mins[0]);
        for dim in 1..self.n_spatial_dims() {
            let width = self.maxs[dim] - self.mins[dim];
            if width > best.1 {
                best = (dim, width);
            }
        }
        best
    }

    /// The smallest squared distance between any point in `self` and any
    /// point in `other`.
    pub fn min_squared_distance(&self, other: &BoundingBox) -> f64 {
        let mut sum = 0.0;
        for dim in 0..self.n_spatial_dims() {
            // at most one of these gaps is positive
            let gap_lo = other.mins[dim] - self.maxs[dim];
            let gap_hi = self.mins[dim] - other.maxs[dim];
            let gap = if gap_lo > 0.0 {
                gap_lo
            } else if gap_hi > 0.0 {
                gap_hi
            } else {
                0.0
            };
            sum += gap * gap;
        }
        sum
    }

    /// The largest squared distance between any point in `self` and any
    /// point in `other`.
    pub fn max_squared_distance(&self, other: &BoundingBox) -> f64 {
        let mut sum = 0.0;
        for dim in 0..self.n_spatial_dims() {
            let a = other.maxs[dim] - self.mins[dim];
            let b = self.maxs[dim] - other.mins[dim];
            let span = if a > b { a } else { b };
            sum += span * span;
        }
        sum
    }
}
