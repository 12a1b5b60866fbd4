//! Comparison of the two systems over a batch of trials.

use crate::trials::TrialResults;

/// Percentage of `val` in `total`, rounded to two decimals.
pub fn percentage(val: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (10_000.0 * val as f64 / total as f64).round() / 100.0
}

/// How often RCV polarization is above, equal to or below CES polarization.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct ComparisonStats {
    pub above: usize,
    pub equal: usize,
    pub below: usize,
}

impl ComparisonStats {
    pub fn from_results(results: &TrialResults) -> ComparisonStats {
        let mut stats = ComparisonStats::default();
        for (ces, rcv) in results.pairs() {
            if rcv > ces {
                stats.above += 1;
            } else if rcv == ces {
                stats.equal += 1;
            } else {
                stats.below += 1;
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.above + self.equal + self.below
    }

    pub fn above_pct(&self) -> f64 {
        percentage(self.above, self.total())
    }

    pub fn equal_pct(&self) -> f64 {
        percentage(self.equal, self.total())
    }

    pub fn below_pct(&self) -> f64 {
        percentage(self.below, self.total())
    }

    /// Share of trials where RCV was no more polarized than CES.
    pub fn no_worse_share(&self) -> f64 {
        ratio(self.below + self.equal, self.total())
    }

    pub fn tied_share(&self) -> f64 {
        ratio(self.equal, self.total())
    }
}

fn ratio(val: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        val as f64 / total as f64
    }
}

/// (CES, RCV) polarization points, grouped by comparison outcome.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ScatterPartition {
    pub above: Vec<(f64, f64)>,
    pub equal: Vec<(f64, f64)>,
    pub below: Vec<(f64, f64)>,
}

/// Groups the first `limit` trials for a scatter plot.
pub fn partition(results: &TrialResults, limit: usize) -> ScatterPartition {
    let mut res = ScatterPartition::default();
    for (ces, rcv) in results.pairs().take(limit) {
        let bucket = if rcv > ces {
            &mut res.above
        } else if rcv == ces {
            &mut res.equal
        } else {
            &mut res.below
        };
        bucket.push((ces, rcv));
    }
    res
}

/// Selects the trials with `left_candidates` candidates left of the median
/// whose winners had the given indices in the sorted candidate list.
pub fn select_by_winners(
    results: &TrialResults,
    left_candidates: usize,
    ces_winner: usize,
    rcv_winner: usize,
) -> Vec<(f64, f64)> {
    results
        .records
        .iter()
        .zip(results.pairs())
        .filter(|(r, _)| {
            r.left_candidates == left_candidates
                && r.ces_winner_index == Some(ces_winner)
                && r.rcv_winner_index == Some(rcv_winner)
        })
        .map(|(_, pair)| pair)
        .collect()
}
