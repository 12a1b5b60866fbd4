use log::{debug, info, warn};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use snafu::{prelude::*, Snafu};
use spatial_voting::*;

use std::fs;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::sim::config_reader::*;

pub mod config_reader;
mod report;
mod scenarios;

#[derive(Debug, Snafu)]
pub enum SimError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Simulation failed"))]
    Simulation { source: SimulationError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SimResult<T> = Result<T, SimError>;

/// The scenarios the program knows how to run.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Scenario {
    Once,
    Trials,
    CandidateSweep,
    DistributionGrid,
    Histogram,
}

impl Scenario {
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Once => "once",
            Scenario::Trials => "trials",
            Scenario::CandidateSweep => "candidateSweep",
            Scenario::DistributionGrid => "distributionGrid",
            Scenario::Histogram => "histogram",
        }
    }
}

/// Layers the command line flags over the scenario file.
fn apply_overrides(mut config: SimConfig, args: &Args) -> SimConfig {
    if let Some(s) = &args.scenario {
        config.scenario = Some(s.clone());
    }
    if let Some(kind) = &args.distribution {
        let mut dist = config.distribution.unwrap_or_default();
        dist.kind = kind.clone();
        config.distribution = Some(dist);
    }
    if let Some(trials) = args.trials {
        let mut ts = config.trials.unwrap_or_default();
        ts.trials = Some(trials);
        config.trials = Some(ts);
    }
    if let Some(count) = args.candidates {
        // A count on the command line replaces any fixed split or position list.
        config.candidates = Some(CandidateSettings {
            count: Some(count),
            ..CandidateSettings::default()
        });
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => {
            info!("create_rng: seed {}", s);
            ChaCha8Rng::seed_from_u64(s)
        }
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Runs a validated scenario and returns its results.
pub fn run_scenario(config: &SimConfig) -> SimResult<JSValue> {
    let scenario = validate_scenario(config.scenario.as_deref())?;
    let spec = validate_distribution(config.distribution.as_ref())?;
    let mut rng = create_rng(config.seed);
    info!("run_scenario: {:?} with {:?}", scenario, spec);

    let results = match scenario {
        Scenario::Once => {
            let candidates = validate_candidates(config.candidates.as_ref())?;
            scenarios::run_once(&spec, &candidates, &mut rng)?
        }
        Scenario::Trials => {
            let trial_config = validate_trials(config)?;
            scenarios::run_trial_batch(
                &spec,
                &trial_config,
                config.scatter_limit(),
                config.filter.as_ref(),
                &mut rng,
            )?
        }
        Scenario::CandidateSweep => {
            let trial_config = validate_trials(config)?;
            let (min_count, max_count) = validate_sweep(config.sweep.as_ref())?;
            scenarios::run_candidate_sweep(&spec, &trial_config, min_count, max_count, &mut rng)?
        }
        Scenario::DistributionGrid => {
            let trial_config = validate_trials(config)?;
            let (means, deviations) = validate_grid(config.grid.as_ref())?;
            scenarios::run_distribution_grid(&spec, &trial_config, &means, &deviations, &mut rng)?
        }
        Scenario::Histogram => {
            let candidates = validate_candidates(config.candidates.as_ref())?;
            scenarios::run_histogram(&spec, &candidates, &mut rng)?
        }
    };
    Ok(json!({
        "scenario": scenario.name(),
        "results": results,
    }))
}

fn write_summary(pretty_js: &str, out: Option<&str>) -> SimResult<()> {
    match out {
        None | Some("stdout") => {
            println!("{}", pretty_js);
            Ok(())
        }
        Some(path) => {
            info!("write_summary: writing summary to {}", path);
            fs::write(path, pretty_js).context(WritingSummarySnafu { path })
        }
    }
}

/// Checks a summary against a reference file.
pub fn check_reference(pretty_js: &str, reference_path: &str) -> SimResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("check_reference: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

pub fn run_simulation(args: &Args) -> SimResult<()> {
    let file_config = match &args.config {
        Some(path) => read_config(path)?,
        None => SimConfig::default(),
    };
    let config = apply_overrides(file_config, args);
    info!("config: {:?}", config);

    let summary = run_scenario(&config)?;
    let pretty_js = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;

    let out = args.out.clone().or_else(|| config.output.clone());
    write_summary(&pretty_js, out.as_deref())?;

    if let Some(reference_path) = &args.reference {
        check_reference(&pretty_js, reference_path)?;
    }
    Ok(())
}
