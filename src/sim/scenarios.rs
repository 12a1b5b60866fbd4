use log::info;
use rand::RngCore;
use serde_json::{json, Value as JSValue};
use snafu::prelude::*;
use spatial_voting::builder::build_model;
use spatial_voting::candidates::generate_candidates;
use spatial_voting::histogram::preference_histogram;
use spatial_voting::stats::{partition, select_by_winners, ComparisonStats};
use spatial_voting::*;

use crate::sim::config_reader::{CandidateChoice, WinnerFilter};
use crate::sim::report;
use crate::sim::{SimResult, SimulationSnafu};

fn choose_candidates<R: RngCore>(
    model: &dyn VoterMassModel,
    choice: &CandidateChoice,
    rng: &mut R,
) -> SimResult<Vec<f64>> {
    match choice {
        CandidateChoice::Positions(positions) => Ok(positions.clone()),
        CandidateChoice::Drawn(mode) => {
            generate_candidates(model, *mode, rng).context(SimulationSnafu {})
        }
    }
}

/// A single election, reported round by round.
pub fn run_once<R: RngCore>(
    spec: &ModelSpec,
    choice: &CandidateChoice,
    rng: &mut R,
) -> SimResult<JSValue> {
    let model = build_model(spec, rng).context(SimulationSnafu {})?;
    let candidates = choose_candidates(model.as_ref(), choice, rng)?;
    info!("run_once: candidates {:?}", candidates);
    let (ces, rcv) = run_election(model.as_ref(), &candidates).context(SimulationSnafu {})?;
    Ok(report::election_js(&candidates, &ces, &rcv))
}

fn run_batch<R: RngCore>(
    spec: &ModelSpec,
    trial_config: &TrialConfig,
    rng: &mut R,
) -> SimResult<(TrialResults, ComparisonStats)> {
    let results = run_trials(spec, trial_config, rng).context(SimulationSnafu {})?;
    let stats = ComparisonStats::from_results(&results);
    info!(
        "run_batch: {} trials, RCV above {}%, equal {}%, below {}%",
        stats.total(),
        stats.above_pct(),
        stats.equal_pct(),
        stats.below_pct()
    );
    Ok((results, stats))
}

/// Monte Carlo trials with their comparison statistics and scatter points.
pub fn run_trial_batch<R: RngCore>(
    spec: &ModelSpec,
    trial_config: &TrialConfig,
    scatter_limit: usize,
    filter: Option<&WinnerFilter>,
    rng: &mut R,
) -> SimResult<JSValue> {
    let (results, stats) = run_batch(spec, trial_config, rng)?;
    let mut js = json!({
        "statistics": report::stats_js(&stats),
        "meanPolarization": report::means_js(&results),
        "scatter": report::scatter_js(&partition(&results, scatter_limit)),
    });
    if let Some(f) = filter {
        let selected = select_by_winners(&results, f.left_candidates, f.ces_winner, f.rcv_winner);
        info!("run_trial_batch: {} trials match {:?}", selected.len(), f);
        js["selected"] = report::points_js(&selected);
    }
    Ok(js)
}

/// Trials repeated for every candidate count in `min_count..=max_count`.
pub fn run_candidate_sweep<R: RngCore>(
    spec: &ModelSpec,
    trial_config: &TrialConfig,
    min_count: usize,
    max_count: usize,
    rng: &mut R,
) -> SimResult<JSValue> {
    let mut rows: Vec<JSValue> = Vec::with_capacity(max_count + 1 - min_count);
    for count in min_count..=max_count {
        let config = TrialConfig {
            candidates: CandidateMode::FromDistribution(count),
            ..trial_config.clone()
        };
        let (results, stats) = run_batch(spec, &config, rng)?;
        rows.push(json!({
            "candidates": count,
            "statistics": report::stats_js(&stats),
            "meanPolarization": report::means_js(&results),
        }));
    }
    Ok(JSValue::Array(rows))
}

/// Trials over a grid of normal distributions, one cell per
/// (mean, deviation) pair.
pub fn run_distribution_grid<R: RngCore>(
    spec: &ModelSpec,
    trial_config: &TrialConfig,
    means: &[f64],
    deviations: &[f64],
    rng: &mut R,
) -> SimResult<JSValue> {
    let mut cells: Vec<JSValue> = Vec::with_capacity(means.len() * deviations.len());
    for &mean in means {
        for &deviation in deviations {
            let cell_spec = ModelSpec {
                kind: DistributionKind::Normal {
                    location: mean,
                    scale: deviation,
                },
                ..spec.clone()
            };
            info!("run_distribution_grid: mean {} deviation {}", mean, deviation);
            let (_, stats) = run_batch(&cell_spec, trial_config, rng)?;
            cells.push(json!({
                "mean": mean,
                "deviation": deviation,
                "statistics": report::stats_js(&stats),
            }));
        }
    }
    Ok(JSValue::Array(cells))
}

/// The mass of every sincere ranking of the candidates.
pub fn run_histogram<R: RngCore>(
    spec: &ModelSpec,
    choice: &CandidateChoice,
    rng: &mut R,
) -> SimResult<JSValue> {
    let model = build_model(spec, rng).context(SimulationSnafu {})?;
    let candidates = choose_candidates(model.as_ref(), choice, rng)?;
    let histogram = preference_histogram(model.as_ref(), &candidates).context(SimulationSnafu {})?;
    Ok(json!({
        "candidates": candidates,
        "rankings": report::histogram_js(&histogram),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn once_with_drawn_candidates() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let spec = ModelSpec {
            grid_sections: 1000,
            ..ModelSpec::normal(0.5, 0.2)
        };
        let js = run_once(
            &spec,
            &CandidateChoice::Drawn(CandidateMode::FromDistribution(3)),
            &mut rng,
        )
        .unwrap();
        assert_eq!(js["candidates"].as_array().map(|a| a.len()), Some(3));
        assert!(js["rcv"]["rounds"].as_array().map_or(false, |r| !r.is_empty()));
    }

    #[test]
    fn candidate_on_the_median_fails() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let spec = ModelSpec::discrete(&[1.0, 9.0, 11.0, 19.0]);
        let res = run_once(&spec, &CandidateChoice::Positions(vec![5.0, 10.0]), &mut rng);
        assert!(matches!(res, Err(crate::sim::SimError::Simulation { .. })));
    }

    #[test]
    fn filter_adds_selected_points() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let spec = ModelSpec::discrete(&[1.0, 3.0, 9.0, 11.0, 17.0, 19.0]);
        let config = TrialConfig::new(20, CandidateMode::FixedSplit { left: 1, right: 1 });
        let filter = WinnerFilter {
            left_candidates: 1,
            ces_winner: 0,
            rcv_winner: 0,
        };
        let js = run_trial_batch(&spec, &config, 5, Some(&filter), &mut rng).unwrap();
        assert_eq!(js["statistics"]["total"], 20);
        assert!(js["selected"].is_array());
        let scatter = &js["scatter"];
        let shown: usize = ["above", "equal", "below"]
            .iter()
            .map(|k| scatter[*k].as_array().map_or(0, |a| a.len()))
            .sum();
        assert_eq!(shown, 5);
    }
}
