use crate::config::*;
use crate::mass::VoterMassModel;
use crate::tally::sorted_candidates;

/// The mass of voters sharing one sincere ranking of the candidates.
#[derive(PartialEq, Debug, Clone)]
pub struct RankingMass {
    /// Candidate positions, most preferred first.
    pub ranking: Vec<f64>,
    pub mass: f64,
}

/// Splits the electorate by full preference ordering.
///
/// Voters rank candidates by distance. The ranking only changes when a voter
/// crosses the midpoint of two candidates, so the spectrum is cut at every
/// pairwise midpoint and each segment holds a single ranking. Segments are
/// returned in spectrum order, with masses as fractions of the electorate.
pub fn preference_histogram(
    model: &dyn VoterMassModel,
    candidates: &[f64],
) -> Result<Vec<RankingMass>, SimulationError> {
    let sorted = sorted_candidates(model, candidates)?;
    let spectrum = model.spectrum();
    let total = model.total_mass();

    let mut bounds: Vec<f64> = vec![spectrum.start, spectrum.end];
    for (i, a) in sorted.iter().enumerate() {
        for b in sorted.iter().skip(i + 1) {
            bounds.push(spectrum.clamp(model.snap((a + b) / 2.0)));
        }
    }
    bounds.sort_by(f64::total_cmp);
    bounds.dedup();

    let mut res: Vec<RankingMass> = Vec::with_capacity(bounds.len() - 1);
    for w in bounds.windows(2) {
        let (lo, hi) = (w[0], w[1]);
        let centre = (lo + hi) / 2.0;
        let mut ranking = sorted.clone();
        // Stable sort: equal distances keep the leftmost candidate first.
        ranking.sort_by(|x, y| (x - centre).abs().total_cmp(&(y - centre).abs()));
        res.push(RankingMass {
            ranking,
            mass: model.mass_between(lo, hi) / total,
        });
    }
    Ok(res)
}
