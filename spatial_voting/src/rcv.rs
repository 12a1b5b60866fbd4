//! Instant-runoff elimination over the nearest-candidate partition.

use log::debug;

use crate::config::*;
use crate::mass::VoterMassModel;
use crate::tally::{first_max, first_min, nearest_candidate_tally, sorted_candidates};

/// Resolves one election by instant runoff.
///
/// Every round, each remaining candidate receives the mass of voters closer
/// to it than to any other remaining candidate. A candidate holding strictly
/// more than half of the total mass wins. Otherwise the candidate with the
/// smallest share is eliminated. An exact tie between the last two
/// candidates is reported as a tie.
pub fn resolve_rcv(
    model: &dyn VoterMassModel,
    candidates: &[f64],
) -> Result<RcvResult, SimulationError> {
    let mut remaining = sorted_candidates(model, candidates)?;
    let median = model.median_position();
    let spectrum = model.spectrum();

    let mut round_stats: Vec<RoundStats> = Vec::new();
    let mut eliminated: Vec<f64> = Vec::new();
    let mut round: u32 = 0;
    while !remaining.is_empty() {
        round += 1;
        let tally = nearest_candidate_tally(model, &remaining, spectrum.start, spectrum.end);
        debug!("resolve_rcv: round {} tally {:?}", round, tally);

        let top_idx = first_max(&tally).ok_or_else(|| SimulationError::DegenerateElection {
            reason: format!("empty tally in round {}", round),
        })?;
        let (top, top_share) = tally[top_idx];
        let winner = if remaining.len() == 1 || top_share > 0.5 {
            Some(ElectionWinner::Single(top))
        } else if remaining.len() == 2 && tally[0].1 == tally[1].1 {
            Some(ElectionWinner::Tie(remaining.clone()))
        } else {
            None
        };
        if let Some(winner) = winner {
            round_stats.push(RoundStats {
                round,
                tally,
                eliminated: None,
            });
            debug!(
                "resolve_rcv: winner {:?} after {} rounds, eliminated {:?}",
                winner, round, eliminated
            );
            return Ok(RcvResult {
                winner,
                median,
                round_stats,
                eliminated,
            });
        }

        let loser_idx = first_min(&tally).ok_or_else(|| SimulationError::DegenerateElection {
            reason: format!("empty tally in round {}", round),
        })?;
        let loser = remaining.remove(loser_idx);
        debug!("resolve_rcv: round {} eliminates {}", round, loser);
        eliminated.push(loser);
        round_stats.push(RoundStats {
            round,
            tally,
            eliminated: Some(loser),
        });
    }
    Err(SimulationError::DegenerateElection {
        reason: "every candidate was eliminated".to_string(),
    })
}
