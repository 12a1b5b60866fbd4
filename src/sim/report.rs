// JSON rendering of the simulation results.

use serde_json::{json, Value as JSValue};
use spatial_voting::histogram::RankingMass;
use spatial_voting::stats::{ComparisonStats, ScatterPartition};
use spatial_voting::*;

fn winner_js(winner: &ElectionWinner) -> JSValue {
    match winner {
        ElectionWinner::Single(p) => json!({ "position": p }),
        ElectionWinner::Tie(ps) => json!({
            "position": winner.position(),
            "tied": ps,
        }),
    }
}

fn tally_js(tally: &[(f64, f64)]) -> JSValue {
    JSValue::Array(
        tally
            .iter()
            .map(|(candidate, share)| json!({"candidate": candidate, "share": share}))
            .collect(),
    )
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Left => "left",
        Side::Right => "right",
    }
}

fn ces_js(res: &CesResult) -> JSValue {
    let primaries: Vec<JSValue> = [&res.left_primary, &res.right_primary]
        .iter()
        .filter_map(|p| p.as_ref())
        .map(|p| {
            json!({
                "side": side_name(p.side),
                "tally": tally_js(&p.tally),
                "winner": p.winner,
            })
        })
        .collect();
    json!({
        "winner": winner_js(&res.winner),
        "polarization": res.polarization(),
        "primaries": primaries,
        "general": res.general.as_ref().map(|t| tally_js(t)),
    })
}

fn rcv_js(res: &RcvResult) -> JSValue {
    let rounds: Vec<JSValue> = res
        .round_stats
        .iter()
        .map(|rs| {
            json!({
                "round": rs.round,
                "tally": tally_js(&rs.tally),
                "eliminated": rs.eliminated,
            })
        })
        .collect();
    json!({
        "winner": winner_js(&res.winner),
        "polarization": res.polarization(),
        "rounds": rounds,
        "eliminated": res.eliminated,
    })
}

pub fn election_js(candidates: &[f64], ces: &CesResult, rcv: &RcvResult) -> JSValue {
    json!({
        "candidates": candidates,
        "median": ces.median,
        "ces": ces_js(ces),
        "rcv": rcv_js(rcv),
    })
}

pub fn stats_js(stats: &ComparisonStats) -> JSValue {
    json!({
        "total": stats.total(),
        "above": stats.above,
        "equal": stats.equal,
        "below": stats.below,
        "abovePct": stats.above_pct(),
        "equalPct": stats.equal_pct(),
        "belowPct": stats.below_pct(),
        "noWorseShare": stats.no_worse_share(),
        "tiedShare": stats.tied_share(),
    })
}

/// Mean polarization of both systems, `null` for an empty run.
pub fn means_js(results: &TrialResults) -> JSValue {
    if results.is_empty() {
        return json!({"ces": null, "rcv": null});
    }
    let n = results.len() as f64;
    let (ces_sum, rcv_sum) = results
        .pairs()
        .fold((0.0, 0.0), |(c, r), (ces, rcv)| (c + ces, r + rcv));
    json!({"ces": ces_sum / n, "rcv": rcv_sum / n})
}

/// (CES, RCV) points as two-element arrays.
pub fn points_js(points: &[(f64, f64)]) -> JSValue {
    json!(points)
}

pub fn scatter_js(scatter: &ScatterPartition) -> JSValue {
    json!({
        "above": points_js(&scatter.above),
        "equal": points_js(&scatter.equal),
        "below": points_js(&scatter.below),
    })
}

pub fn histogram_js(histogram: &[RankingMass]) -> JSValue {
    JSValue::Array(
        histogram
            .iter()
            .map(|rm| json!({"ranking": rm.ranking, "mass": rm.mass}))
            .collect(),
    )
}
