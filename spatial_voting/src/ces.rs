//! The current election system: a plurality primary on each side of the
//! median, then a plurality general election between the two primary winners.

use log::debug;

use crate::config::*;
use crate::mass::VoterMassModel;
use crate::tally::{first_max, nearest_candidate_tally, sorted_candidates};

/// Resolves one election under the primary-then-general system.
///
/// Candidates may come in any order. A candidate sitting exactly on the
/// median belongs to neither bloc, which is reported as a degenerate
/// election.
pub fn resolve_ces(
    model: &dyn VoterMassModel,
    candidates: &[f64],
) -> Result<CesResult, SimulationError> {
    let sorted = sorted_candidates(model, candidates)?;
    let median = model.median_position();
    if sorted.contains(&median) {
        return Err(SimulationError::DegenerateElection {
            reason: format!("candidate on the median {}", median),
        });
    }
    let spectrum = model.spectrum();
    let (left, right): (Vec<f64>, Vec<f64>) = sorted.iter().partition(|&&c| c < median);

    let left_primary = run_primary(model, Side::Left, &left, spectrum.start, median)?;
    let right_primary = run_primary(model, Side::Right, &right, median, spectrum.end)?;

    let (winner, general) = match (&left_primary, &right_primary) {
        (Some(l), Some(r)) => {
            let tally = nearest_candidate_tally(model, &[l.winner, r.winner], spectrum.start, spectrum.end);
            let (left_share, right_share) = (tally[0].1, tally[1].1);
            debug!(
                "resolve_ces: general {} ({}) vs {} ({})",
                l.winner, left_share, r.winner, right_share
            );
            let winner = if left_share > right_share {
                ElectionWinner::Single(l.winner)
            } else if right_share > left_share {
                ElectionWinner::Single(r.winner)
            } else {
                ElectionWinner::Tie(vec![l.winner, r.winner])
            };
            (winner, Some(tally))
        }
        // No primary on one side: the other primary decides.
        (Some(p), None) | (None, Some(p)) => (ElectionWinner::Single(p.winner), None),
        (None, None) => {
            return Err(SimulationError::DegenerateElection {
                reason: "no primary could be held".to_string(),
            })
        }
    };
    debug!("resolve_ces: winner {:?}, median {}", winner, median);

    Ok(CesResult {
        winner,
        median,
        left_primary,
        right_primary,
        general,
    })
}

/// Plurality among the candidates of one bloc, counting only the voters in
/// `[lo, hi]`.
fn run_primary(
    model: &dyn VoterMassModel,
    side: Side,
    candidates: &[f64],
    lo: f64,
    hi: f64,
) -> Result<Option<PrimaryResult>, SimulationError> {
    if candidates.is_empty() {
        debug!("run_primary: no {:?} primary", side);
        return Ok(None);
    }
    let tally = nearest_candidate_tally(model, candidates, lo, hi);
    let winner_idx = first_max(&tally).ok_or_else(|| SimulationError::DegenerateElection {
        reason: format!("empty {:?} primary", side),
    })?;
    let winner = tally[winner_idx].0;
    debug!("run_primary: {:?} tally {:?}, winner {}", side, tally, winner);
    Ok(Some(PrimaryResult {
        side,
        tally,
        winner,
    }))
}
