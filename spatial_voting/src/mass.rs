//! Voter mass models.
//!
//! A model answers "how much of the electorate lies between two positions"
//! without rescanning voters. Every query works on the half-open interval
//! `(lo, hi]`, except that a lower bound at or below the spectrum start
//! includes the start itself. A voter sitting exactly on a boundary therefore
//! always belongs to the segment on its left.

use log::debug;
use std::fmt::Debug;
use std::sync::Arc;

use crate::config::*;

/// The capability shared by all voter populations.
///
/// Models are immutable once built, so a single model can be read from
/// several threads at once.
pub trait VoterMassModel: Debug + Send + Sync {
    fn spectrum(&self) -> Spectrum;

    /// Mass of voters in `(lo, hi]`. Bounds outside the spectrum are clamped.
    /// Returns zero when `hi <= lo`.
    fn mass_between(&self, lo: f64, hi: f64) -> f64;

    /// The position splitting the mass in two halves.
    fn median_position(&self) -> f64;

    fn total_mass(&self) -> f64;

    /// Smallest representable position whose cumulative mass reaches `mass`.
    /// This is the inverse transform used to sample candidates.
    fn position_at_mass(&self, mass: f64) -> f64;

    /// Number of distinct positions [`VoterMassModel::position_at_mass`] can
    /// return for a positive mass, the median excluded.
    fn sample_support(&self) -> usize;

    /// The nearest position the model can represent.
    fn snap(&self, position: f64) -> f64 {
        position
    }

    /// Number of representable positions strictly between two representable
    /// positions, or `None` when unbounded.
    fn positions_between(&self, lo: f64, hi: f64) -> Option<usize> {
        if hi > lo {
            None
        } else {
            Some(0)
        }
    }
}

pub type SharedModel = Arc<dyn VoterMassModel>;

/// A density sampled over a regular grid and turned into a prefix sum.
///
/// The spectrum is cut into `G` equal cells. The density is evaluated at
/// the centre of every cell, and `prefix[k]` holds the running sum of the
/// first `k` cells. The total mass is `prefix[G]`. Positions are resolved to the nearest cell boundary.
#[derive(Debug, Clone)]
pub struct ContinuousModel {
    spectrum: Spectrum,
    cell_width: f64,
    prefix: Vec<f64>,
    median_index: usize,
}

impl ContinuousModel {
    /// Samples `density` over `grid_sections` cells.
    ///
    /// Negative density values are treated as zero. A density with no
    /// positive mass is rejected.
    pub fn from_density<F>(
        spectrum: Spectrum,
        grid_sections: usize,
        density: F,
    ) -> Result<ContinuousModel, SimulationError>
    where
        F: Fn(f64) -> f64,
    {
        if grid_sections == 0 {
            return Err(SimulationError::ModelBuild {
                reason: "the grid needs at least one section".to_string(),
            });
        }
        let spectrum = Spectrum::new(spectrum.start, spectrum.end)?;
        let cell_width = spectrum.width() / grid_sections as f64;

        let mut prefix: Vec<f64> = Vec::with_capacity(grid_sections + 1);
        prefix.push(0.0);
        let mut running = 0.0;
        for k in 0..grid_sections {
            let x = spectrum.start + (k as f64 + 0.5) * cell_width;
            let height = density(x);
            if height.is_nan() || height.is_infinite() {
                return Err(SimulationError::ModelBuild {
                    reason: format!("density is not finite at {}", x),
                });
            }
            running += height.max(0.0);
            prefix.push(running);
        }

        let total = running;
        if total <= 0.0 {
            return Err(SimulationError::ModelBuild {
                reason: "density has zero total mass".to_string(),
            });
        }

        // The sums stay unnormalized: equal densities give bit-identical
        // masses, so tied shares compare equal.
        let median_index = prefix.partition_point(|&c| c < total / 2.0);
        let model = ContinuousModel {
            spectrum,
            cell_width,
            prefix,
            median_index,
        };
        debug!(
            "ContinuousModel: {} sections over {:?}, median at {}",
            grid_sections,
            spectrum,
            model.median_position()
        );
        Ok(model)
    }

    pub fn grid_sections(&self) -> usize {
        self.prefix.len() - 1
    }

    /// The index of the cell boundary nearest to `position`.
    fn index_of(&self, position: f64) -> usize {
        let p = self.spectrum.clamp(position);
        let idx = ((p - self.spectrum.start) / self.cell_width).round();
        // NaN casts to 0
        (idx as usize).min(self.grid_sections())
    }

    fn position_of(&self, index: usize) -> f64 {
        self.spectrum.start + index as f64 * self.cell_width
    }
}

impl VoterMassModel for ContinuousModel {
    fn spectrum(&self) -> Spectrum {
        self.spectrum
    }

    fn mass_between(&self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return 0.0;
        }
        let lo_idx = self.index_of(lo);
        let hi_idx = self.index_of(hi);
        if hi_idx <= lo_idx {
            return 0.0;
        }
        self.prefix[hi_idx] - self.prefix[lo_idx]
    }

    fn median_position(&self) -> f64 {
        self.position_of(self.median_index)
    }

    fn total_mass(&self) -> f64 {
        self.prefix[self.grid_sections()]
    }

    fn position_at_mass(&self, mass: f64) -> f64 {
        let idx = self
            .prefix
            .partition_point(|&c| c < mass)
            .min(self.grid_sections());
        self.position_of(idx)
    }

    fn sample_support(&self) -> usize {
        self.prefix
            .windows(2)
            .enumerate()
            .filter(|(k, w)| w[1] > w[0] && k + 1 != self.median_index)
            .count()
    }

    fn snap(&self, position: f64) -> f64 {
        self.position_of(self.index_of(position))
    }

    fn positions_between(&self, lo: f64, hi: f64) -> Option<usize> {
        let lo_idx = self.index_of(lo);
        let hi_idx = self.index_of(hi);
        Some(hi_idx.saturating_sub(lo_idx).saturating_sub(1))
    }
}

/// A finite population of voters, each carrying the same weight.
///
/// Mass is the fraction of voters in a range, so the total mass is 1.
#[derive(Debug, Clone)]
pub struct DiscreteModel {
    spectrum: Spectrum,
    // Sorted in ascending order.
    voters: Vec<f64>,
    median: f64,
}

impl DiscreteModel {
    pub fn from_voters(spectrum: Spectrum, voters: &[f64]) -> Result<DiscreteModel, SimulationError> {
        let spectrum = Spectrum::new(spectrum.start, spectrum.end)?;
        if voters.is_empty() {
            return Err(SimulationError::ModelBuild {
                reason: "no voters".to_string(),
            });
        }
        if let Some(v) = voters.iter().find(|v| !spectrum.contains(**v)) {
            return Err(SimulationError::ModelBuild {
                reason: format!("voter at {} lies outside {:?}", v, spectrum),
            });
        }
        let mut sorted = voters.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        debug!(
            "DiscreteModel: {} voters over {:?}, median {}",
            n, spectrum, median
        );
        Ok(DiscreteModel {
            spectrum,
            voters: sorted,
            median,
        })
    }

    pub fn voters(&self) -> &[f64] {
        &self.voters
    }

    fn count_at_or_below(&self, position: f64) -> usize {
        self.voters.partition_point(|&v| v <= position)
    }
}

impl VoterMassModel for DiscreteModel {
    fn spectrum(&self) -> Spectrum {
        self.spectrum
    }

    fn mass_between(&self, lo: f64, hi: f64) -> f64 {
        let lo = self.spectrum.clamp(lo);
        let hi = self.spectrum.clamp(hi);
        if hi <= lo {
            return 0.0;
        }
        let below = if lo <= self.spectrum.start {
            0
        } else {
            self.count_at_or_below(lo)
        };
        let count = self.count_at_or_below(hi) - below;
        count as f64 / self.voters.len() as f64
    }

    fn median_position(&self) -> f64 {
        self.median
    }

    fn total_mass(&self) -> f64 {
        1.0
    }

    fn position_at_mass(&self, mass: f64) -> f64 {
        let n = self.voters.len();
        let rank = (mass * n as f64).ceil();
        // NaN and negative ranks cast to 0
        let idx = (rank as usize).clamp(1, n) - 1;
        self.voters[idx]
    }

    fn sample_support(&self) -> usize {
        let mut distinct = self.voters.clone();
        distinct.dedup();
        distinct.iter().filter(|&&v| v != self.median).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_model(sections: usize) -> ContinuousModel {
        ContinuousModel::from_density(Spectrum::DISCRETE, sections, |_| 1.0).unwrap()
    }

    fn bump(x: f64) -> f64 {
        (-(x - 0.3) * (x - 0.3) / 0.02).exp()
    }

    #[test]
    fn continuous_mass_is_additive() {
        let model = ContinuousModel::from_density(Spectrum::UNIT, 1000, bump).unwrap();
        let points = [0.0, 0.05, 0.21, 0.3337, 0.5, 0.81, 1.0];
        for (i, &lo) in points.iter().enumerate() {
            for (j, &x) in points.iter().enumerate().skip(i) {
                for &hi in points.iter().skip(j) {
                    let whole = model.mass_between(lo, hi);
                    let split = model.mass_between(lo, x) + model.mass_between(x, hi);
                    assert!(whole >= 0.0);
                    assert!((whole - split).abs() < 1e-9, "{} {} {}", lo, x, hi);
                }
            }
        }
    }

    #[test]
    fn continuous_median_splits_mass() {
        let model = ContinuousModel::from_density(Spectrum::UNIT, 10_000, bump).unwrap();
        let median = model.median_position();
        let left = model.mass_between(0.0, median);
        let right = model.mass_between(median, 1.0);
        let total = model.total_mass();
        assert!((left / total - 0.5).abs() < 1e-3);
        assert!((right / total - 0.5).abs() < 1e-3);
        assert!((left + right - total).abs() < 1e-9);
        assert!((median - 0.3).abs() < 1e-2);
    }

    #[test]
    fn continuous_clamps_queries() {
        let model = uniform_model(200);
        assert_eq!(model.mass_between(-5.0, 25.0), model.total_mass());
        assert_eq!(model.mass_between(10.0, 5.0), 0.0);
        assert_eq!(model.total_mass(), 200.0);
        assert_eq!(model.mass_between(0.0, 5.0), 50.0);
    }

    #[test]
    fn continuous_rejects_zero_density() {
        let res = ContinuousModel::from_density(Spectrum::UNIT, 100, |_| 0.0);
        assert!(matches!(res, Err(SimulationError::ModelBuild { .. })));
        let res = ContinuousModel::from_density(Spectrum::UNIT, 100, |x| -x);
        assert!(matches!(res, Err(SimulationError::ModelBuild { .. })));
        let res = ContinuousModel::from_density(Spectrum::UNIT, 0, |_| 1.0);
        assert!(matches!(res, Err(SimulationError::ModelBuild { .. })));
    }

    #[test]
    fn continuous_snaps_to_boundaries() {
        let model = uniform_model(20);
        assert_eq!(model.snap(4.4), 4.0);
        assert_eq!(model.snap(4.6), 5.0);
        assert_eq!(model.median_position(), 10.0);
        assert_eq!(model.positions_between(0.0, 10.0), Some(9));
        assert_eq!(model.positions_between(10.0, 10.0), Some(0));
        // 20 cells with mass, the one ending on the median is excluded.
        assert_eq!(model.sample_support(), 19);
    }

    #[test]
    fn continuous_inverse_transform() {
        let model = uniform_model(20);
        assert_eq!(model.position_at_mass(5.0), 5.0);
        assert_eq!(model.position_at_mass(5.2), 6.0);
        assert_eq!(model.position_at_mass(20.0), 20.0);
    }

    #[test]
    fn discrete_counts_half_open_ranges() {
        let model = DiscreteModel::from_voters(Spectrum::DISCRETE, &[19.0, 1.0, 11.0, 9.0]).unwrap();
        assert_eq!(model.voters(), &[1.0, 9.0, 11.0, 19.0]);
        assert_eq!(model.median_position(), 10.0);
        assert_eq!(model.mass_between(0.0, 10.0), 0.5);
        assert_eq!(model.mass_between(10.0, 20.0), 0.5);
        // A voter on the upper bound is included, on the lower bound excluded.
        assert_eq!(model.mass_between(1.0, 9.0), 0.25);
        assert_eq!(model.mass_between(0.0, 1.0), 0.25);
        assert_eq!(model.mass_between(-3.0, 30.0), 1.0);
    }

    #[test]
    fn discrete_voter_on_start_is_counted_once() {
        let model = DiscreteModel::from_voters(Spectrum::DISCRETE, &[0.0, 5.0]).unwrap();
        assert_eq!(model.mass_between(0.0, 0.0), 0.0);
        assert_eq!(model.mass_between(0.0, 2.0), 0.5);
        assert_eq!(model.mass_between(0.0, 2.0) + model.mass_between(2.0, 20.0), 1.0);
    }

    #[test]
    fn discrete_median_odd_count() {
        let model = DiscreteModel::from_voters(Spectrum::DISCRETE, &[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(model.median_position(), 2.0);
        assert_eq!(model.sample_support(), 2);
    }

    #[test]
    fn discrete_inverse_transform() {
        let model = DiscreteModel::from_voters(Spectrum::DISCRETE, &[1.0, 9.0, 11.0, 19.0]).unwrap();
        assert_eq!(model.position_at_mass(0.1), 1.0);
        assert_eq!(model.position_at_mass(0.25), 1.0);
        assert_eq!(model.position_at_mass(0.26), 9.0);
        assert_eq!(model.position_at_mass(1.0), 19.0);
    }

    #[test]
    fn discrete_rejects_bad_input() {
        assert!(DiscreteModel::from_voters(Spectrum::DISCRETE, &[]).is_err());
        assert!(DiscreteModel::from_voters(Spectrum::DISCRETE, &[f64::NAN]).is_err());
        assert!(DiscreteModel::from_voters(Spectrum::DISCRETE, &[21.0]).is_err());
    }
}
