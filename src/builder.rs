use npoint_nostd_internal::{Matcher, NptTraversal, TraversalStats};

use crate::error::Error;
use crate::kdtree::{KdNode, KdTree};
use crate::matchers::MatchCount;

/// Configures an N-point calculation.
///
/// Each call to [`NptBuilder::tree`] appends a tree along with its
/// multiplicity (the number of correlation slots it fills). The order of the
/// calls determines the order of the slots. A single tree with a multiplicity
/// of 2 is a 2-point auto-correlation, while 2 trees that each have a
/// multiplicity of 1 is a 2-point cross-correlation.
///
/// Since [`NptBuilder::build`] only borrows the builder, a single
/// configuration can be used to build any number of calculations.
#[derive(Clone, Default)]
pub struct NptBuilder<'a> {
    trees: Vec<(&'a KdTree, usize)>,
    naive: bool,
}

impl<'a> NptBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(mut self, tree: &'a KdTree, multiplicity: usize) -> Self {
        self.trees.push((tree, multiplicity));
        self
    }

    /// When `true`, the calculation skips the traversal and evaluates every
    /// tuple of points with a single base case.
    pub fn naive(mut self, naive: bool) -> Self {
        self.naive = naive;
        self
    }

    pub fn build<M: Matcher<KdNode<'a>>>(&self, matcher: M) -> Result<Npt<'a, M>, Error> {
        let Some((first, _)) = self.trees.first() else {
            return Err(Error::empty_tree_list());
        };
        let n_spatial_dims = first.n_spatial_dims();
        for (tree_index, (tree, multiplicity)) in self.trees.iter().enumerate() {
            if *multiplicity == 0 {
                return Err(Error::multiplicity(tree_index));
            } else if tree.n_points() == 0 {
                return Err(Error::empty_tree(tree_index));
            } else if tree.n_spatial_dims() != n_spatial_dims {
                return Err(Error::dimension_mismatch(
                    tree_index,
                    n_spatial_dims,
                    tree.n_spatial_dims(),
                ));
            }
        }

        let n_slots: usize = self.trees.iter().map(|(_, multiplicity)| multiplicity).sum();
        if let Some(tuple_size) = matcher.tuple_size() {
            if tuple_size != n_slots {
                return Err(Error::tuple_size(tuple_size, n_slots));
            }
        }

        let roots: Vec<(KdNode<'a>, usize)> = self
            .trees
            .iter()
            .map(|(tree, multiplicity)| (tree.root(), *multiplicity))
            .collect();
        let traversal =
            NptTraversal::new(&roots, matcher, self.naive).map_err(Error::internal_legacy_adhoc)?;
        Ok(Npt { traversal })
    }

    /// Runs the configured calculation twice, once with pruning and once in
    /// naive mode, each with its own clone of `matcher`.
    ///
    /// This is only practical for small inputs. A [`tracing`] warning is
    /// emitted when the 2 calculations match a different number of tuples.
    pub fn cross_check<M>(&self, matcher: M) -> Result<CrossCheck<M>, Error>
    where
        M: Matcher<KdNode<'a>> + MatchCount + Clone,
    {
        let mut pruned = self.clone().naive(false).build(matcher.clone())?;
        let mut naive = self.clone().naive(true).build(matcher)?;
        pruned.compute();
        naive.compute();

        let out = CrossCheck {
            pruned_stats: pruned.stats(),
            pruned: pruned.into_matcher(),
            naive: naive.into_matcher(),
        };
        if !out.is_consistent() {
            tracing::warn!(
                pruned_matches = out.pruned.match_count(),
                naive_matches = out.naive.match_count(),
                "pruned and naive calculations disagree"
            );
        }
        Ok(out)
    }
}

/// A configured N-point calculation.
pub struct Npt<'a, M: Matcher<KdNode<'a>>> {
    traversal: NptTraversal<KdNode<'a>, M>,
}

impl<'a, M: Matcher<KdNode<'a>>> Npt<'a, M> {
    /// Runs the calculation, accumulating the results into the matcher.
    ///
    /// Nothing is reset between calls: calling this twice counts every match
    /// twice.
    pub fn compute(&mut self) {
        let span = tracing::debug_span!(
            "npt_compute",
            n_slots = self.traversal.n_slots(),
            naive = self.traversal.is_naive()
        );
        let _enter = span.enter();

        self.traversal.compute();

        let stats = self.traversal.stats();
        tracing::debug!(
            n_base_cases = stats.n_base_cases,
            n_prunes = stats.n_prunes,
            "finished traversal"
        );
    }

    pub fn n_slots(&self) -> usize {
        self.traversal.n_slots()
    }

    pub fn is_naive(&self) -> bool {
        self.traversal.is_naive()
    }

    /// The diagnostic counters. These are always zero in naive mode.
    pub fn stats(&self) -> TraversalStats {
        self.traversal.stats()
    }

    pub fn matcher(&self) -> &M {
        self.traversal.matcher()
    }

    pub fn into_matcher(self) -> M {
        self.traversal.into_matcher()
    }
}

/// The results of [`NptBuilder::cross_check`]
#[derive(Clone, Debug)]
pub struct CrossCheck<M> {
    pub pruned: M,
    pub naive: M,
    pub pruned_stats: TraversalStats,
}

impl<M: MatchCount> CrossCheck<M> {
    pub fn is_consistent(&self) -> bool {
        self.pruned.match_count() == self.naive.match_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdtree::PointSet;
    use crate::matchers::RangeMatcher;
    use ndarray::ArrayView2;
    use std::num::NonZeroUsize;

    fn tree(n_spatial_dims: usize, positions: &[f64]) -> KdTree {
        let n_points = positions.len() / n_spatial_dims;
        let view = ArrayView2::from_shape((n_spatial_dims, n_points), positions).unwrap();
        let points = PointSet::new(view, None).unwrap();
        KdTree::build(&points, NonZeroUsize::new(2).unwrap())
    }

    #[test]
    fn config_errors() {
        let a = tree(1, &[0.0, 1.0, 2.0, 3.0]);
        let b = tree(2, &[0.0, 1.0, 2.0, 3.0]);
        let empty = tree(1, &[]);
        let matcher = || RangeMatcher::uniform(2, 0.0, 1.0).unwrap();

        assert!(NptBuilder::new().build(matcher()).is_err());
        assert!(NptBuilder::new().tree(&a, 0).tree(&a, 2).build(matcher()).is_err());
        assert!(NptBuilder::new().tree(&empty, 2).build(matcher()).is_err());
        assert!(NptBuilder::new().tree(&a, 1).tree(&b, 1).build(matcher()).is_err());
        assert!(NptBuilder::new().tree(&a, 3).build(matcher()).is_err());
        assert!(NptBuilder::new().tree(&a, 1).tree(&a, 1).build(matcher()).is_ok());
    }

    #[test]
    fn error_messages() {
        let a = tree(1, &[0.0, 1.0, 2.0, 3.0]);
        let b = tree(2, &[0.0, 1.0, 2.0, 3.0]);
        let matcher = || RangeMatcher::uniform(2, 0.0, 1.0).unwrap();

        let Err(err) = NptBuilder::new().tree(&a, 1).tree(&b, 1).build(matcher()) else {
            panic!("expected an error");
        };
        assert_eq!(
            err.to_string(),
            "tree 1 has 2 spatial dimensions. It should have 1"
        );

        let Err(err) = NptBuilder::new().tree(&a, 3).build(matcher()) else {
            panic!("expected an error");
        };
        assert_eq!(
            err.to_string(),
            "the matcher operates on 2-tuples, but the multiplicities add up to 3"
        );
    }

    #[test]
    fn reuse_configuration() {
        let a = tree(1, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let builder = NptBuilder::new().tree(&a, 2);

        let mut first = builder.build(RangeMatcher::uniform(2, 0.0, 1.5).unwrap()).unwrap();
        let mut second = builder.build(RangeMatcher::uniform(2, 0.0, 1.5).unwrap()).unwrap();
        first.compute();
        second.compute();
        assert_eq!(first.matcher().n_matches(), 5);
        assert_eq!(first.stats(), second.stats());

        // repeated calls accumulate
        second.compute();
        assert_eq!(second.matcher().n_matches(), 10);
    }

    #[test]
    fn naive_mode() {
        let a = tree(1, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut npt = NptBuilder::new()
            .tree(&a, 2)
            .naive(true)
            .build(RangeMatcher::uniform(2, 0.0, 1.5).unwrap())
            .unwrap();
        assert!(npt.is_naive());
        assert_eq!(npt.n_slots(), 2);
        npt.compute();
        assert_eq!(npt.stats(), TraversalStats::default());
        assert_eq!(npt.into_matcher().n_matches(), 5);
    }

    #[test]
    fn cross_check() {
        let a = tree(1, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let check = NptBuilder::new()
            .tree(&a, 2)
            .cross_check(RangeMatcher::uniform(2, 0.0, 1.5).unwrap())
            .unwrap();
        assert!(check.is_consistent());
        assert_eq!(check.pruned.n_matches(), 7);
        assert!(check.pruned_stats.n_prunes > 0);
    }
}
