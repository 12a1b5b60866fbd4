//! Candidate placement.

use log::debug;
use rand::Rng;

use crate::config::*;
use crate::mass::VoterMassModel;

/// Upper bound on draws per requested candidate before giving up.
const MAX_DRAWS_PER_CANDIDATE: usize = 10_000;

/// Draws an ascending set of distinct candidate positions, none of them on
/// the median.
pub fn generate_candidates<R: Rng + ?Sized>(
    model: &dyn VoterMassModel,
    mode: CandidateMode,
    rng: &mut R,
) -> Result<Vec<f64>, SimulationError> {
    let mut candidates = match mode {
        CandidateMode::FromDistribution(count) => sample_from_distribution(model, count, rng)?,
        CandidateMode::FixedSplit { left, right } => {
            let spectrum = model.spectrum();
            let median = model.median_position();
            if left == 0 && right == 0 {
                let available = [(spectrum.start, median), (median, spectrum.end)]
                    .iter()
                    .map(|&(lo, hi)| model.positions_between(lo, hi).unwrap_or(usize::MAX))
                    .fold(0usize, usize::saturating_add);
                return Err(SimulationError::InsufficientCandidates {
                    requested: 0,
                    available,
                });
            }
            let mut res = sample_in_range(model, spectrum.start, median, left, rng)?;
            res.extend(sample_in_range(model, median, spectrum.end, right, rng)?);
            res
        }
    };
    candidates.sort_by(f64::total_cmp);
    debug!("generate_candidates: {:?} -> {:?}", mode, candidates);
    Ok(candidates)
}

fn draw_budget(count: usize) -> usize {
    count.saturating_mul(MAX_DRAWS_PER_CANDIDATE)
}

/// Inverse-transform sampling against the voter mass.
fn sample_from_distribution<R: Rng + ?Sized>(
    model: &dyn VoterMassModel,
    count: usize,
    rng: &mut R,
) -> Result<Vec<f64>, SimulationError> {
    let available = model.sample_support();
    if count == 0 || count > available {
        return Err(SimulationError::InsufficientCandidates {
            requested: count,
            available,
        });
    }
    let median = model.median_position();
    let total = model.total_mass();
    let mut res: Vec<f64> = Vec::with_capacity(count);
    for _ in 0..draw_budget(count) {
        if res.len() == count {
            return Ok(res);
        }
        // In (0, total], so that the position always carries mass.
        let mass = total - rng.gen::<f64>() * total;
        let position = model.position_at_mass(mass);
        if position != median && !res.contains(&position) {
            res.push(position);
        }
    }
    if res.len() == count {
        Ok(res)
    } else {
        Err(SimulationError::InsufficientCandidates {
            requested: count,
            available: res.len(),
        })
    }
}

/// Uniform draws strictly inside `(lo, hi)`.
fn sample_in_range<R: Rng + ?Sized>(
    model: &dyn VoterMassModel,
    lo: f64,
    hi: f64,
    count: usize,
    rng: &mut R,
) -> Result<Vec<f64>, SimulationError> {
    if count == 0 {
        return Ok(vec![]);
    }
    let available = model.positions_between(lo, hi).unwrap_or(usize::MAX);
    if hi <= lo || count > available {
        return Err(SimulationError::InsufficientCandidates {
            requested: count,
            available: if hi <= lo { 0 } else { available },
        });
    }
    // An unbounded range does not bound `count`.
    let mut res: Vec<f64> = Vec::with_capacity(count.min(available));
    for _ in 0..draw_budget(count) {
        if res.len() == count {
            return Ok(res);
        }
        let position = model.snap(rng.gen_range(lo..hi));
        if position > lo && position < hi && !res.contains(&position) {
            res.push(position);
        }
    }
    if res.len() == count {
        Ok(res)
    } else {
        Err(SimulationError::InsufficientCandidates {
            requested: count,
            available: res.len(),
        })
    }
}
