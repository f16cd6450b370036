//! Weighted distributions over grid cells.
//!
//! A [`Distribution`] maps each [`Coordinate`] to a non-negative weight. It is
//! not required to sum to 1 until [`Distribution::normalize`] is called.
//!
//! Entries are kept in an ordered map, so iteration always walks cells in
//! ascending coordinate order. Weighted selection depends on that order being
//! fixed for a given set of weights.

use crate::coordinate::Coordinate;
use crate::error::CollapseError;
use std::collections::BTreeMap;

/// Tolerance used when checking that a normalized distribution sums to 1.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// A mapping from grid cell to non-negative weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    weights: BTreeMap<Coordinate, f64>,
}

impl Distribution {
    /// Creates an empty distribution ("no viable outcome").
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight 1.0 on every cell of `[0, width) x [0, height)`.
    pub fn uniform(width: i32, height: i32) -> Self {
        (0..width)
            .flat_map(|x| (0..height).map(move |y| (Coordinate::new(x, y), 1.0)))
            .collect()
    }

    /// A single cell with weight 1.0.
    pub fn point_mass(coordinate: Coordinate) -> Self {
        std::iter::once((coordinate, 1.0)).collect()
    }

    /// Builds a distribution, rejecting negative or non-finite weights.
    pub fn try_from_weights<I>(entries: I) -> Result<Self, CollapseError>
    where
        I: IntoIterator<Item = (Coordinate, f64)>,
    {
        let mut dist = Self::new();
        for (coordinate, weight) in entries {
            if !weight.is_finite() {
                return Err(CollapseError::NonFiniteWeight { coordinate });
            }
            if weight < 0.0 {
                return Err(CollapseError::NegativeWeight { coordinate, weight });
            }
            dist.insert(coordinate, weight);
        }
        Ok(dist)
    }

    /// Sets the weight of a cell, replacing any previous weight.
    pub fn insert(&mut self, coordinate: Coordinate, weight: f64) {
        self.weights.insert(coordinate, weight);
    }

    /// Adds `weight` to a cell, treating an absent cell as zero.
    pub fn accumulate(&mut self, coordinate: Coordinate, weight: f64) {
        *self.weights.entry(coordinate).or_insert(0.0) += weight;
    }

    /// Weight of a cell (0.0 if absent).
    pub fn weight(&self, coordinate: Coordinate) -> f64 {
        self.weights.get(&coordinate).copied().unwrap_or(0.0)
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Number of stored entries, including zero-weight ones.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// True if at least one outcome has positive probability.
    pub fn is_viable(&self) -> bool {
        self.total() > 0.0
    }

    /// True if the weights sum to 1 within [`NORMALIZATION_TOLERANCE`].
    pub fn is_normalized(&self) -> bool {
        (self.total() - 1.0).abs() <= NORMALIZATION_TOLERANCE
    }

    /// Entries in ascending coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, f64)> + '_ {
        self.weights.iter().map(|(c, w)| (*c, *w))
    }

    /// Cells with strictly positive weight.
    pub fn support(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.iter().filter(|(_, w)| *w > 0.0).map(|(c, _)| c)
    }

    /// Cell with the highest weight (lowest coordinate wins ties).
    pub fn mode(&self) -> Option<(Coordinate, f64)> {
        self.iter()
            .filter(|(_, w)| *w > 0.0)
            .fold(None, |best, (c, w)| match best {
                Some((_, bw)) if bw >= w => best,
                _ => Some((c, w)),
            })
    }

    /// Multiplies every weight by `factor(coordinate)`.
    pub fn scale_by<F>(&mut self, mut factor: F)
    where
        F: FnMut(Coordinate) -> f64,
    {
        for (coordinate, weight) in self.weights.iter_mut() {
            *weight *= factor(*coordinate);
        }
    }

    /// Rescales weights to sum to 1.
    ///
    /// A zero total leaves the distribution untouched; there is nothing to
    /// normalize against.
    pub fn normalize(&mut self) {
        let total = self.total();
        if total > 0.0 {
            for weight in self.weights.values_mut() {
                *weight /= total;
            }
        }
    }

    /// Restricts two distributions to the cells where both are positive.
    ///
    /// Each coincident cell `c` receives the joint weight
    /// `self[c] * other[c]` in both results. Cells present on one side only
    /// contribute nothing, so both results are empty when there is no
    /// overlap.
    pub fn combine(&self, other: &Distribution) -> (Distribution, Distribution) {
        let mut result_self = Distribution::new();
        let mut result_other = Distribution::new();

        for (coordinate, p_self) in self.iter() {
            let p_other = other.weight(coordinate);
            if p_self > 0.0 && p_other > 0.0 {
                let joint = p_self * p_other;
                if joint > 0.0 {
                    result_self.accumulate(coordinate, joint);
                    result_other.accumulate(coordinate, joint);
                }
            }
        }

        (result_self, result_other)
    }

    /// Picks the cell selected by a uniform draw `r` in `[0, 1)`.
    ///
    /// Walks the entries in order, accumulating weights, and returns the first
    /// positive-weight cell whose cumulative sum reaches `r`. Assumes the
    /// distribution is normalized. If rounding leaves the final sum just below
    /// `r`, the last positive-weight cell is returned. `None` only when no
    /// cell has positive weight.
    pub fn select(&self, r: f64) -> Option<Coordinate> {
        let mut cumulative = 0.0;
        let mut last_viable = None;

        for (coordinate, weight) in self.iter() {
            if weight <= 0.0 {
                continue;
            }
            cumulative += weight;
            last_viable = Some(coordinate);
            if cumulative >= r {
                return Some(coordinate);
            }
        }

        last_viable
    }
}

impl FromIterator<(Coordinate, f64)> for Distribution {
    fn from_iter<I: IntoIterator<Item = (Coordinate, f64)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[((i32, i32), f64); N]> for Distribution {
    fn from(entries: [((i32, i32), f64); N]) -> Self {
        entries
            .into_iter()
            .map(|(c, w)| (Coordinate::from(c), w))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_uniform_covers_grid() {
        let dist = Distribution::uniform(3, 2);
        assert_eq!(dist.len(), 6);
        assert_eq!(dist.weight(Coordinate::new(2, 1)), 1.0);
        assert_eq!(dist.weight(Coordinate::new(3, 0)), 0.0);
    }

    #[test]
    fn test_normalize_sums_to_one() {
        let mut dist = Distribution::from([((0, 0), 2.0), ((1, 0), 6.0)]);
        dist.normalize();

        assert_relative_eq!(dist.weight(Coordinate::new(0, 0)), 0.25);
        assert_relative_eq!(dist.weight(Coordinate::new(1, 0)), 0.75);
        assert!(dist.is_normalized());
    }

    #[test]
    fn test_normalize_empty_is_noop() {
        let mut dist = Distribution::new();
        dist.normalize();
        assert!(dist.is_empty());
        assert!(!dist.is_viable());
    }

    #[test]
    fn test_normalize_all_zero_is_noop() {
        let original = Distribution::from([((0, 0), 0.0), ((4, 4), 0.0)]);
        let mut dist = original.clone();
        dist.normalize();
        assert_eq!(dist, original);
        assert!(!dist.is_viable());
    }

    #[test]
    fn test_combine_keeps_coincident_cell() {
        let a = Distribution::from([((0, 0), 0.5), ((1, 1), 0.5)]);
        let b = Distribution::from([((1, 1), 1.0)]);

        let (ra, rb) = a.combine(&b);

        assert_eq!(ra.len(), 1);
        assert_eq!(rb.len(), 1);
        assert_relative_eq!(ra.weight(Coordinate::new(1, 1)), 0.5);
        assert_relative_eq!(rb.weight(Coordinate::new(1, 1)), 0.5);
    }

    #[test]
    fn test_combine_disjoint_is_empty() {
        let a = Distribution::from([((0, 0), 1.0)]);
        let b = Distribution::from([((1, 1), 1.0)]);

        let (ra, rb) = a.combine(&b);

        assert!(ra.is_empty());
        assert!(rb.is_empty());
    }

    #[test]
    fn test_combine_ignores_zero_weights() {
        let a = Distribution::from([((0, 0), 0.0), ((1, 1), 1.0)]);
        let b = Distribution::from([((0, 0), 1.0), ((1, 1), 0.0)]);

        let (ra, rb) = a.combine(&b);

        assert!(ra.is_empty());
        assert!(rb.is_empty());
    }

    #[test]
    fn test_select_walks_cumulative_sum() {
        let dist = Distribution::from([((0, 0), 0.3), ((1, 0), 0.7)]);

        assert_eq!(dist.select(0.2), Some(Coordinate::new(0, 0)));
        assert_eq!(dist.select(0.3), Some(Coordinate::new(0, 0)));
        assert_eq!(dist.select(0.5), Some(Coordinate::new(1, 0)));
    }

    #[test]
    fn test_select_skips_zero_weight_cells() {
        let dist = Distribution::from([((0, 0), 0.0), ((0, 1), 1.0)]);
        assert_eq!(dist.select(0.0), Some(Coordinate::new(0, 1)));
    }

    #[test]
    fn test_select_falls_back_to_last_cell_on_rounding() {
        // Sums to slightly under 1.0
        let dist = Distribution::from([((0, 0), 0.1), ((0, 1), 0.2), ((0, 2), 0.699_999_999)]);
        assert_eq!(dist.select(0.999_999_999_9), Some(Coordinate::new(0, 2)));
    }

    #[test]
    fn test_select_without_support() {
        assert_eq!(Distribution::new().select(0.5), None);
        assert_eq!(Distribution::from([((0, 0), 0.0)]).select(0.0), None);
    }

    #[test]
    fn test_mode_prefers_heaviest() {
        let dist = Distribution::from([((0, 0), 0.2), ((2, 2), 0.5), ((3, 3), 0.5)]);
        assert_eq!(dist.mode(), Some((Coordinate::new(2, 2), 0.5)));
        assert_eq!(Distribution::new().mode(), None);
    }

    #[test]
    fn test_try_from_weights_rejects_bad_input() {
        let err = Distribution::try_from_weights([(Coordinate::new(1, 2), -0.5)]).unwrap_err();
        assert!(matches!(err, CollapseError::NegativeWeight { .. }));

        let err = Distribution::try_from_weights([(Coordinate::new(0, 0), f64::NAN)]).unwrap_err();
        assert_eq!(err, CollapseError::NonFiniteWeight { coordinate: Coordinate::new(0, 0) });

        let ok = Distribution::try_from_weights([(Coordinate::new(0, 0), 0.0)]).unwrap();
        assert_eq!(ok.len(), 1);
    }

    fn arb_distribution() -> impl Strategy<Value = Distribution> {
        prop::collection::btree_map((0..6i32, 0..6i32), 0.0..10.0f64, 0..20).prop_map(|m| {
            m.into_iter()
                .map(|((x, y), w)| (Coordinate::new(x, y), w))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(dist in arb_distribution()) {
            let mut once = dist.clone();
            once.normalize();
            let mut twice = once.clone();
            twice.normalize();

            if dist.is_viable() {
                prop_assert!(once.is_normalized(), "total={}", once.total());
            } else {
                prop_assert_eq!(&once, &dist);
            }
            for (c, w) in once.iter() {
                prop_assert!((w - twice.weight(c)).abs() < NORMALIZATION_TOLERANCE);
            }
        }

        #[test]
        fn combine_results_share_support(a in arb_distribution(), b in arb_distribution()) {
            let (ra, rb) = a.combine(&b);
            prop_assert_eq!(&ra, &rb);
            for c in ra.support() {
                prop_assert!(a.weight(c) > 0.0 && b.weight(c) > 0.0);
            }
        }

        #[test]
        fn select_lands_in_support(dist in arb_distribution(), r in 0.0..1.0f64) {
            let mut dist = dist;
            dist.normalize();
            match dist.select(r) {
                Some(c) => prop_assert!(dist.weight(c) > 0.0),
                None => prop_assert!(!dist.is_viable()),
            }
        }
    }
}
