//! Implements types to represent "bin edges", used for binning tuples by
//! separation. The [`BinEdges`] trait provides a common interface that is
//! implemented by [`RegularBinEdges`] and [`IrregularBinEdges`]

/// Super simple. This can be expanded as needed.
pub trait BinEdges {
    /// Calculate the bin index for a given value. Values which are equal to
    /// boundary values are considered part of the higher bin, i.e. intervals
    /// do not include the right edge.
    fn bin_index(&self, value: f64) -> Option<usize>;

    fn n_bins(&self) -> usize;

    fn leftmost_edge(&self) -> f64;

    fn rightmost_edge(&self) -> f64;

    /// Returns whether any value in the closed interval `[lo, hi]` could be
    /// assigned to a bin.
    ///
    /// This is used for pruning, where `lo` and `hi` bound the values that a
    /// collection of tuples could produce.
    fn overlaps(&self, lo: f64, hi: f64) -> bool {
        hi >= self.leftmost_edge() && lo < self.rightmost_edge()
    }
}

/// Regular bins with uniform spacing
#[derive(Clone, Debug, PartialEq)]
pub struct RegularBinEdges {
    min: f64,
    max: f64,
    bin_size: f64,
    n_bins: usize,
}

impl RegularBinEdges {
    /// Note that we initialize with num_bins rather than bin_size
    pub fn new(min: f64, max: f64, n_bins: usize) -> Result<Self, &'static str> {
        if n_bins == 0 {
            Err("Number of bins must be greater than zero")
        } else if !min.is_finite() || !max.is_finite() {
            Err("Min and max values must be finite")
        } else if max <= min {
            Err("Maximum value must be greater than minimum value")
        } else {
            Ok(Self {
                min,
                max,
                bin_size: (max - min) / n_bins as f64,
                n_bins,
            })
        }
    }
}

impl BinEdges for RegularBinEdges {
    fn bin_index(&self, value: f64) -> Option<usize> {
        if value < self.min || value >= self.max {
            return None;
        }

        // this cast handles the truncation. The min call guards against
        // round-off right below self.max
        let index = ((value - self.min) / self.bin_size) as usize;

        Some(index.min(self.n_bins - 1))
    }

    fn n_bins(&self) -> usize {
        self.n_bins
    }

    fn leftmost_edge(&self) -> f64 {
        self.min
    }

    fn rightmost_edge(&self) -> f64 {
        self.max
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IrregularBinEdges<'a> {
    bin_edges: &'a [f64],
}

impl<'a> IrregularBinEdges<'a> {
    pub fn new(bin_edges: &'a [f64]) -> Result<IrregularBinEdges<'a>, &'static str> {
        if bin_edges.len() < 2 {
            return Err("A minimum of two bin edges are required");
        }

        // It may be worth supporting +inf as the last bin edge
        if bin_edges.iter().any(|&x| !x.is_finite()) {
            return Err("Bin edges must be finite");
        }

        if bin_edges.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err("Bin edges must be in strictly increasing order");
        }

        Ok(IrregularBinEdges { bin_edges })
    }

    pub fn as_slice(&self) -> &'a [f64] {
        self.bin_edges
    }
}

impl BinEdges for IrregularBinEdges<'_> {
    fn bin_index(&self, value: f64) -> Option<usize> {
        if value < self.leftmost_edge() || value >= self.rightmost_edge() {
            return None;
        }

        let index = self
            .bin_edges
            // There may be downsides to using total_cmp (perf?)
            .binary_search_by(|edge| edge.total_cmp(&value))
            // Ok is used for an exact match, Err for a lower bound
            .unwrap_or_else(|i| i - 1);

        Some(index)
    }

    fn n_bins(&self) -> usize {
        self.bin_edges.len() - 1
    }

    fn leftmost_edge(&self) -> f64 {
        self.bin_edges[0]
    }

    fn rightmost_edge(&self) -> f64 {
        self.bin_edges[self.bin_edges.len() - 1]
    }
}
