//! Machinery for the multi-tree N-point traversal that doesn't require the
//! standard library.
//!
//! The crate is organized around 3 pieces:
//! - [`TreeNode`] describes the (read-only) capabilities we need from a node
//!   of a space-partitioning tree.
//! - [`NodeTuple`] assigns one tree node to each correlation slot.
//! - [`NptTraversal`] walks the trees, asking a [`Matcher`] whether a
//!   [`NodeTuple`] can be pruned and handing it all-leaf tuples.
//!
//! Concrete trees and matchers live in the `npoint` crate.
#![no_std]

extern crate alloc;

mod bins;
mod bounds;
mod matcher;
mod misc;
mod node;
mod node_tuple;
mod traversal;

#[cfg(test)]
mod testing;

pub use bins::{BinEdges, IrregularBinEdges, RegularBinEdges};
pub use bounds::BoundingBox;
pub use matcher::Matcher;
pub use misc::squared_diff_norm;
pub use node::{Side, TreeNode};
pub use node_tuple::NodeTuple;
pub use traversal::{NptTraversal, TraversalStats};
