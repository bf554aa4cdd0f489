// the reason this is named mod.rs has to do with some complexities of how
// testing is handled
//
// we are following the advice of the rust book
// https://doc.rust-lang.org/book/ch11-03-test-organization.html#submodules-in-integration-tests

#![allow(dead_code)]

use ndarray::Array2;
use npoint::{KdTree, PointSet};
use rand::distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;
use std::num::NonZeroUsize;

// based on numpy!
// https://numpy.org/doc/stable/reference/generated/numpy.isclose.html
pub fn isclose(actual: f64, ref_val: f64, rtol: f64, atol: f64) -> bool {
    let actual_nan = actual.is_nan();
    let ref_nan = ref_val.is_nan();
    if actual_nan || ref_nan {
        actual_nan && ref_nan
    } else {
        (actual - ref_val).abs() <= (atol + rtol * ref_val.abs())
    }
}

/// Points drawn uniformly from a box with corners at the origin and at
/// `width` along every axis
pub struct RandomPoints {
    pub positions: Array2<f64>,
    pub weights: Vec<f64>,
}

impl RandomPoints {
    pub fn new(n_points: usize, n_spatial_dims: usize, width: f64, seed: u64) -> RandomPoints {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let position_dist = Uniform::new(0.0, width).unwrap();
        let weight_dist = Uniform::new_inclusive(0.5, 2.0).unwrap();

        let mut positions = Array2::zeros([n_spatial_dims, n_points]);
        for elem in positions.iter_mut() {
            *elem = position_dist.sample(&mut rng);
        }
        let weights = (0..n_points).map(|_| weight_dist.sample(&mut rng)).collect();
        RandomPoints { positions, weights }
    }

    pub fn n_points(&self) -> usize {
        self.weights.len()
    }

    pub fn point_set(&self) -> PointSet<'_> {
        PointSet::new(self.positions.view(), Some(&self.weights)).unwrap()
    }

    pub fn tree(&self, leaf_size: usize) -> KdTree {
        KdTree::build(&self.point_set(), NonZeroUsize::new(leaf_size).unwrap())
    }
}

fn squared_distance(a: &RandomPoints, i: usize, b: &RandomPoints, j: usize) -> f64 {
    let mut sum = 0.0;
    for k in 0..a.positions.shape()[0] {
        let diff = a.positions[[k, i]] - b.positions[[k, j]];
        sum += diff * diff;
    }
    sum
}

/// Brute-force reference for the number (and the weighted number) of tuples
/// whose pairwise separations all fall inside the corresponding windows.
///
/// When a set fills several slots, only tuples with increasing indices are
/// considered (i.e. we count unordered combinations). Such a combination
/// matches if any assignment of its points to the set's slots satisfies every
/// window.
pub fn brute_force_range_counts(
    sets: &[(&RandomPoints, usize)],
    lower: &[f64],
    upper: &[f64],
) -> (u64, f64) {
    let mut slots: Vec<(&RandomPoints, usize)> = Vec::new();
    for (set_id, (set, multiplicity)) in sets.iter().enumerate() {
        for _ in 0..*multiplicity {
            slots.push((*set, set_id));
        }
    }

    // the ways of handing the chosen points to the slots, without moving a
    // point to a slot that belongs to a different set
    let mut orderings = Vec::new();
    visit_orderings(&slots, &mut Vec::new(), &mut orderings);

    let matches_windows = |chosen: &[usize], ordering: &[usize]| {
        let mut pair = 0;
        for i in 0..chosen.len() {
            for j in (i + 1)..chosen.len() {
                let (a, b) = (ordering[i], ordering[j]);
                let dist_sq = squared_distance(slots[a].0, chosen[a], slots[b].0, chosen[b]);
                let (lo, hi) = (lower[pair], upper[pair]);
                if dist_sq < lo * lo || dist_sq >= hi * hi {
                    return false;
                }
                pair += 1;
            }
        }
        true
    };

    let mut n_matches = 0;
    let mut weighted = 0.0;
    let mut chosen = Vec::new();
    visit(&slots, &mut chosen, &mut |chosen: &[usize]| {
        if !orderings.iter().any(|ordering| matches_windows(chosen, ordering.as_slice())) {
            return;
        }
        n_matches += 1;
        weighted += (0..chosen.len())
            .map(|slot| slots[slot].0.weights[chosen[slot]])
            .product::<f64>();
    });
    (n_matches, weighted)
}

fn visit(
    slots: &[(&RandomPoints, usize)],
    chosen: &mut Vec<usize>,
    f: &mut impl FnMut(&[usize]),
) {
    let slot = chosen.len();
    if slot == slots.len() {
        f(chosen);
        return;
    }
    let (set, set_id) = slots[slot];
    let start = match slot.checked_sub(1) {
        Some(prev) if slots[prev].1 == set_id => chosen[prev] + 1,
        _ => 0,
    };
    for idx in start..set.n_points() {
        chosen.push(idx);
        visit(slots, chosen, f);
        chosen.pop();
    }
}

fn visit_orderings(
    slots: &[(&RandomPoints, usize)],
    ordering: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    let slot = ordering.len();
    if slot == slots.len() {
        out.push(ordering.clone());
        return;
    }
    for entry in 0..slots.len() {
        if slots[entry].1 == slots[slot].1 && !ordering.contains(&entry) {
            ordering.push(entry);
            visit_orderings(slots, ordering, out);
            ordering.pop();
        }
    }
}
