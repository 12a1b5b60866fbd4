// Tallying primitives shared by both election systems.

use crate::config::*;
use crate::mass::VoterMassModel;

/// Checks, snaps and sorts a private copy of the candidate positions.
pub(crate) fn sorted_candidates(
    model: &dyn VoterMassModel,
    candidates: &[f64],
) -> Result<Vec<f64>, SimulationError> {
    if candidates.is_empty() {
        return Err(SimulationError::DegenerateElection {
            reason: "no candidates".to_string(),
        });
    }
    if let Some(c) = candidates.iter().find(|c| !c.is_finite()) {
        return Err(SimulationError::DegenerateElection {
            reason: format!("candidate position {} cannot be ordered", c),
        });
    }
    let spectrum = model.spectrum();
    if let Some(c) = candidates.iter().find(|c| !spectrum.contains(**c)) {
        return Err(SimulationError::DegenerateElection {
            reason: format!("candidate position {} lies outside {:?}", c, spectrum),
        });
    }
    let mut sorted: Vec<f64> = candidates.iter().map(|c| model.snap(*c)).collect();
    sorted.sort_by(f64::total_cmp);
    if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
        return Err(SimulationError::DegenerateElection {
            reason: format!("duplicate candidate at {}", w[0]),
        });
    }
    Ok(sorted)
}

/// Splits the mass of `[lo, hi]` between sorted candidates, each voter going
/// to the nearest one. Boundaries are the snapped midpoints of neighbours.
///
/// Shares are fractions of the total mass. Equal masses give equal shares.
pub(crate) fn nearest_candidate_tally(
    model: &dyn VoterMassModel,
    candidates: &[f64],
    lo: f64,
    hi: f64,
) -> Tally {
    let total = model.total_mass();
    let mut tally: Tally = Vec::with_capacity(candidates.len());
    let mut left_bound = lo;
    for (idx, &c) in candidates.iter().enumerate() {
        let right_bound = match candidates.get(idx + 1) {
            Some(&next) => model.snap((c + next) / 2.0),
            None => hi,
        };
        tally.push((c, model.mass_between(left_bound, right_bound) / total));
        left_bound = right_bound;
    }
    tally
}

/// Index of the largest share. Ties go to the leftmost candidate.
pub(crate) fn first_max(tally: &[(f64, f64)]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &(_, share)) in tally.iter().enumerate() {
        match best {
            Some((_, best_share)) if share <= best_share => {}
            _ => best = Some((idx, share)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Index of the smallest share. Ties go to the leftmost candidate.
pub(crate) fn first_min(tally: &[(f64, f64)]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &(_, share)) in tally.iter().enumerate() {
        match best {
            Some((_, best_share)) if share >= best_share => {}
            _ => best = Some((idx, share)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mass::{ContinuousModel, DiscreteModel};

    #[test]
    fn ties_pick_the_leftmost() {
        let tally = vec![(1.0, 0.2), (2.0, 0.4), (3.0, 0.2), (4.0, 0.4)];
        assert_eq!(first_max(&tally), Some(1));
        assert_eq!(first_min(&tally), Some(0));
        assert_eq!(first_max(&[]), None);
    }

    #[test]
    fn candidates_are_checked() {
        let model = DiscreteModel::from_voters(Spectrum::DISCRETE, &[2.0, 5.0, 9.0]).unwrap();
        assert_eq!(sorted_candidates(&model, &[3.0, 1.0]).unwrap(), vec![1.0, 3.0]);
        assert!(sorted_candidates(&model, &[]).is_err());
        assert!(sorted_candidates(&model, &[1.0, f64::NAN]).is_err());
        assert!(sorted_candidates(&model, &[2.0, 2.0]).is_err());
    }

    #[test]
    fn candidates_outside_the_spectrum_are_rejected() {
        let discrete = DiscreteModel::from_voters(Spectrum::DISCRETE, &[2.0, 5.0, 9.0]).unwrap();
        let continuous = ContinuousModel::from_density(Spectrum::DISCRETE, 20, |_| 1.0).unwrap();
        let models: [&dyn VoterMassModel; 2] = [&discrete, &continuous];
        for model in models {
            assert!(matches!(
                sorted_candidates(model, &[3.0, 25.0]),
                Err(SimulationError::DegenerateElection { .. })
            ));
            assert!(sorted_candidates(model, &[-0.5, 3.0]).is_err());
            assert_eq!(sorted_candidates(model, &[20.0, 0.0]).unwrap(), vec![0.0, 20.0]);
        }
    }

    #[test]
    fn continuous_shares_are_fractions() {
        let model = ContinuousModel::from_density(Spectrum::DISCRETE, 20, |_| 1.0).unwrap();
        let tally = nearest_candidate_tally(&model, &[5.0, 15.0], 0.0, 20.0);
        assert_eq!(tally, vec![(5.0, 0.5), (15.0, 0.5)]);
    }

    #[test]
    fn candidates_snap_to_the_grid() {
        let model = ContinuousModel::from_density(Spectrum::DISCRETE, 20, |_| 1.0).unwrap();
        assert_eq!(sorted_candidates(&model, &[7.2, 3.9]).unwrap(), vec![4.0, 7.0]);
        // Both land on the same boundary.
        assert!(sorted_candidates(&model, &[4.1, 3.9]).is_err());
    }

    #[test]
    fn voter_on_midpoint_goes_left() {
        let model = DiscreteModel::from_voters(Spectrum::DISCRETE, &[2.0, 5.0, 9.0]).unwrap();
        let tally = nearest_candidate_tally(&model, &[3.0, 7.0], 0.0, 20.0);
        assert_eq!(tally.len(), 2);
        assert!((tally[0].1 - 2.0 / 3.0).abs() < 1e-12);
        assert!((tally[1].1 - 1.0 / 3.0).abs() < 1e-12);
    }
}
