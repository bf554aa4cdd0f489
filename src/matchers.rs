//! Concrete [`Matcher`] implementations that operate on [`KdNode`]s

use std::collections::HashMap;

use npoint_nostd_internal::{BinEdges, Matcher, NodeTuple, TreeNode, squared_diff_norm};

use crate::error::Error;
use crate::kdtree::KdNode;

/// Implemented by matchers that can report the number of tuples that they
/// matched so far.
pub trait MatchCount {
    fn match_count(&self) -> u64;
}

/// the squared separation intervals spanned by the bounding boxes of 2 nodes
fn squared_separation_bounds(a: &KdNode, b: &KdNode) -> (f64, f64) {
    (
        a.bounds().min_squared_distance(b.bounds()),
        a.bounds().max_squared_distance(b.bounds()),
    )
}

/// Counts the tuples where the separation between every pair of points falls
/// inside of a per-pair distance window.
///
/// The windows are half-open, `[lower, upper)`. The window for the slot pair
/// `(i, j)` (with `i < j`) is stored at the pair's position in lexicographic
/// order, i.e. `(0, 1), (0, 2), ..., (1, 2), ...`.
///
/// When a tree fills several slots, the traversal only hands us a single
/// ordering of each combination of its points. Such a combination matches if
/// any assignment of its points to the tree's slots satisfies every window.
/// Slots filled by different trees never exchange windows.
///
/// Alongside the number of matches, we accumulate the weighted number of
/// matches, where each matching tuple contributes the product of its point
/// weights.
#[derive(Clone, Debug)]
pub struct RangeMatcher {
    tuple_size: usize,
    // we compare squared distances
    lower_sq: Vec<f64>,
    upper_sq: Vec<f64>,
    uniform: bool,
    // candidate assignments of tuple entries to slots, flattened with a
    // stride of tuple_size. Holds the identity until `prepare` learns which
    // slots share a tree
    orderings: Vec<usize>,
    n_matches: u64,
    weighted_matches: f64,
}

impl RangeMatcher {
    /// `lower` and `upper` must each hold one entry per slot pair.
    pub fn new(tuple_size: usize, lower: &[f64], upper: &[f64]) -> Result<Self, Error> {
        let err = |what: String| Error::matcher_config("RangeMatcher", what);
        if tuple_size == 0 {
            return Err(err("tuple_size must be positive".to_owned()));
        }
        let n_pairs = tuple_size * (tuple_size - 1) / 2;
        if lower.len() != n_pairs || upper.len() != n_pairs {
            return Err(err(format!(
                "{tuple_size}-tuples need {n_pairs} windows, got {} lower and {} upper bounds",
                lower.len(),
                upper.len()
            )));
        }
        for (pair, (lo, hi)) in lower.iter().zip(upper).enumerate() {
            if !(lo.is_finite() && *lo >= 0.0) {
                return Err(err(format!(
                    "the lower bound of window {pair} must be finite and non-negative"
                )));
            } else if hi.is_nan() || hi < lo {
                return Err(err(format!(
                    "the upper bound of window {pair} can't be smaller than the lower bound"
                )));
            }
        }

        Ok(RangeMatcher {
            tuple_size,
            lower_sq: lower.iter().map(|x| x * x).collect(),
            upper_sq: upper.iter().map(|x| x * x).collect(),
            uniform: lower.iter().zip(upper).all(|w| w == (&lower[0], &upper[0])),
            orderings: (0..tuple_size).collect(),
            n_matches: 0,
            weighted_matches: 0.0,
        })
    }

    /// Use the same window for every slot pair
    pub fn uniform(tuple_size: usize, lower: f64, upper: f64) -> Result<Self, Error> {
        let n_pairs = tuple_size.saturating_sub(1) * tuple_size / 2;
        RangeMatcher::new(tuple_size, &vec![lower; n_pairs], &vec![upper; n_pairs])
    }

    pub fn n_matches(&self) -> u64 {
        self.n_matches
    }

    pub fn weighted_matches(&self) -> f64 {
        self.weighted_matches
    }

    /// The number of assignments of tuple entries to slots that get checked
    /// for every candidate tuple
    pub fn n_orderings(&self) -> usize {
        self.orderings.len() / self.tuple_size
    }

    /// Returns whether any of the orderings satisfies every window, given a
    /// function that computes an interval bounding the squared separation
    /// between 2 entries of the tuple
    fn any_ordering_admits(&self, interval: impl Fn(usize, usize) -> (f64, f64)) -> bool {
        self.orderings
            .chunks_exact(self.tuple_size)
            .any(|ordering| self.windows_admit(ordering, &interval))
    }

    /// Checks every window, where the entry `ordering[i]` of a tuple is
    /// assigned to slot `i`
    fn windows_admit(
        &self,
        ordering: &[usize],
        interval: &impl Fn(usize, usize) -> (f64, f64),
    ) -> bool {
        let mut pair = 0;
        for i in 0..ordering.len() {
            for j in (i + 1)..ordering.len() {
                let (min_sq, max_sq) = interval(ordering[i], ordering[j]);
                if max_sq < self.lower_sq[pair] || min_sq >= self.upper_sq[pair] {
                    return false;
                }
                pair += 1;
            }
        }
        true
    }
}

/// Every assignment of tuple entries to slots that only exchanges slots
/// filled by the same tree, flattened with a stride of `tree_ids.len()`.
///
/// `tree_ids` holds the tree of each slot. The identity comes first.
fn same_tree_orderings(tree_ids: &[usize]) -> Vec<usize> {
    let n_slots = tree_ids.len();
    // the slots of each tree, in increasing order
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (slot, tree_id) in tree_ids.iter().enumerate() {
        match groups.iter_mut().find(|group| tree_ids[group[0]] == *tree_id) {
            Some(group) => group.push(slot),
            None => groups.push(vec![slot]),
        }
    }

    let mut perms = groups.clone();
    let mut out = Vec::new();
    loop {
        let start = out.len();
        out.resize(start + n_slots, 0);
        for (group, perm) in groups.iter().zip(&perms) {
            for (slot, entry) in group.iter().zip(perm) {
                out[start + slot] = *entry;
            }
        }
        // advance like an odometer. A group that wraps around is reset to its
        // first permutation and we move on to the preceding group
        if !(0..perms.len()).rev().any(|g| next_permutation(&mut perms[g])) {
            return out;
        }
    }
}

/// Rearranges `values` into the next permutation in lexicographic order.
///
/// Returns `false` (and sorts `values`) when `values` held the last one.
fn next_permutation(values: &mut [usize]) -> bool {
    let n = values.len();
    // find the rightmost ascent
    let Some(i) = (1..n).rev().find(|i| values[i - 1] < values[*i]) else {
        values.reverse();
        return false;
    };
    let mut j = n - 1;
    while values[j] <= values[i - 1] {
        j -= 1;
    }
    values.swap(i - 1, j);
    values[i..].reverse();
    true
}

impl MatchCount for RangeMatcher {
    fn match_count(&self) -> u64 {
        self.n_matches
    }
}

impl<'a> Matcher<KdNode<'a>> for RangeMatcher {
    fn prepare(&mut self, root: &NodeTuple<KdNode<'a>>) {
        // when every window is identical, exchanging slots changes nothing
        if !self.uniform {
            let tree_ids: Vec<usize> = (0..root.len()).map(|slot| root.tree_id(slot)).collect();
            self.orderings = same_tree_orderings(&tree_ids);
        }
    }

    fn test_node_tuple(&self, nodes: &NodeTuple<KdNode<'a>>) -> bool {
        self.any_ordering_admits(|a, b| squared_separation_bounds(&nodes.node(a), &nodes.node(b)))
    }

    fn compute_base_case(&mut self, nodes: &NodeTuple<KdNode<'a>>) {
        let n_spatial_dims = nodes.node(0).n_spatial_dims();

        let mut n_matches = 0;
        let mut weighted_matches = 0.0;
        nodes.for_each_point_tuple(|ranks| {
            let admitted = self.any_ordering_admits(|a, b| {
                let pos_a = nodes.node(a).tree().positions();
                let pos_b = nodes.node(b).tree().positions();
                let dist_sq = squared_diff_norm(pos_a, pos_b, ranks[a], ranks[b], n_spatial_dims);
                (dist_sq, dist_sq)
            });
            if admitted {
                n_matches += 1;
                weighted_matches += ranks
                    .iter()
                    .enumerate()
                    .map(|(slot, rank)| nodes.node(slot).weight(*rank))
                    .product::<f64>();
            }
        });
        self.n_matches += n_matches;
        self.weighted_matches += weighted_matches;
    }

    fn tuple_size(&self) -> Option<usize> {
        Some(self.tuple_size)
    }
}

/// Histograms pairs of points by their separation.
///
/// The bins are specified in terms of squared distance. Each pair whose
/// squared separation lands in a bin increments the bin's count and adds the
/// product of the 2 point weights to the bin's weight.
#[derive(Clone, Debug)]
pub struct BinnedPairMatcher<B: BinEdges> {
    squared_distance_bin_edges: B,
    counts: Vec<u64>,
    weights: Vec<f64>,
}

impl<B: BinEdges> BinnedPairMatcher<B> {
    pub fn new(squared_distance_bin_edges: B) -> Self {
        let n_bins = squared_distance_bin_edges.n_bins();
        BinnedPairMatcher {
            squared_distance_bin_edges,
            counts: vec![0; n_bins],
            weights: vec![0.0; n_bins],
        }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Returns the accumulated values, where the `"count"` and `"weight"`
    /// entries each hold one value per bin.
    pub fn get_output(&self) -> HashMap<&'static str, Vec<f64>> {
        HashMap::from([
            ("count", self.counts.iter().map(|c| *c as f64).collect()),
            ("weight", self.weights.clone()),
        ])
    }
}

impl<B: BinEdges> MatchCount for BinnedPairMatcher<B> {
    fn match_count(&self) -> u64 {
        self.counts.iter().sum()
    }
}

impl<'a, B: BinEdges> Matcher<KdNode<'a>> for BinnedPairMatcher<B> {
    fn test_node_tuple(&self, nodes: &NodeTuple<KdNode<'a>>) -> bool {
        let (min_sq, max_sq) = squared_separation_bounds(&nodes.node(0), &nodes.node(1));
        self.squared_distance_bin_edges.overlaps(min_sq, max_sq)
    }

    fn compute_base_case(&mut self, nodes: &NodeTuple<KdNode<'a>>) {
        let (node_a, node_b) = (nodes.node(0), nodes.node(1));
        let (positions_a, positions_b) = (node_a.tree().positions(), node_b.tree().positions());
        let n_spatial_dims = node_a.n_spatial_dims();

        let edges = &self.squared_distance_bin_edges;
        let (counts, weights) = (&mut self.counts, &mut self.weights);
        nodes.for_each_point_tuple(|ranks| {
            let dist_sq =
                squared_diff_norm(positions_a, positions_b, ranks[0], ranks[1], n_spatial_dims);
            if let Some(bin_index) = edges.bin_index(dist_sq) {
                counts[bin_index] += 1;
                weights[bin_index] += node_a.weight(ranks[0]) * node_b.weight(ranks[1]);
            }
        });
    }

    fn tuple_size(&self) -> Option<usize> {
        Some(2)
    }
}
