use crate::sim::*;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::num::NonZeroUsize;

pub const DEFAULT_TRIALS_PER_RECREATION: usize = 100;
pub const DEFAULT_SCATTER_LIMIT: usize = 1000;
pub const DEFAULT_SWEEP: (usize, usize) = (3, 5);
pub const DEFAULT_GRID_SIZE: usize = 5;

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributionSettings {
    /// normal (default), randomNormal, uniform, randomSpline, discrete or discreteUniform
    #[serde(default)]
    pub kind: String,
    pub location: Option<f64>,
    pub scale: Option<f64>,
    #[serde(rename = "controlPoints")]
    pub control_points: Option<usize>,
    pub voters: Option<Vec<f64>>,
    #[serde(rename = "numVoters")]
    pub num_voters: Option<usize>,
    #[serde(rename = "spectrumStart")]
    pub spectrum_start: Option<f64>,
    #[serde(rename = "spectrumEnd")]
    pub spectrum_end: Option<f64>,
    #[serde(rename = "gridSections")]
    pub grid_sections: Option<usize>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateSettings {
    pub count: Option<usize>,
    #[serde(rename = "leftCount")]
    pub left_count: Option<usize>,
    #[serde(rename = "rightCount")]
    pub right_count: Option<usize>,
    pub positions: Option<Vec<f64>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrialSettings {
    pub trials: Option<usize>,
    #[serde(rename = "recreateDistribution")]
    pub recreate_distribution: Option<bool>,
    #[serde(rename = "trialsPerRecreation")]
    pub trials_per_recreation: Option<usize>,
    #[serde(rename = "scatterLimit")]
    pub scatter_limit: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepSettings {
    #[serde(rename = "minCandidates")]
    pub min_candidates: Option<usize>,
    #[serde(rename = "maxCandidates")]
    pub max_candidates: Option<usize>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridSettings {
    pub means: Option<Vec<f64>>,
    pub deviations: Option<Vec<f64>>,
}

/// Selects the trials where both winners sit at given indices of the sorted
/// candidate list.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct WinnerFilter {
    #[serde(rename = "leftCandidates")]
    pub left_candidates: usize,
    #[serde(rename = "cesWinner")]
    pub ces_winner: usize,
    #[serde(rename = "rcvWinner")]
    pub rcv_winner: usize,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    pub scenario: Option<String>,
    pub seed: Option<u64>,
    /// 'stdout' or a file path
    pub output: Option<String>,
    pub distribution: Option<DistributionSettings>,
    pub candidates: Option<CandidateSettings>,
    pub trials: Option<TrialSettings>,
    pub sweep: Option<SweepSettings>,
    pub grid: Option<GridSettings>,
    pub filter: Option<WinnerFilter>,
}

impl SimConfig {
    pub fn scatter_limit(&self) -> usize {
        self.trials
            .as_ref()
            .and_then(|ts| ts.scatter_limit)
            .unwrap_or(DEFAULT_SCATTER_LIMIT)
    }
}

/// Candidates given explicitly, or drawn for every election.
#[derive(PartialEq, Debug, Clone)]
pub enum CandidateChoice {
    Positions(Vec<f64>),
    Drawn(CandidateMode),
}

pub fn read_config(path: &str) -> SimResult<SimConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: SimConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> SimResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn validate_scenario(scenario: Option<&str>) -> SimResult<Scenario> {
    match scenario.unwrap_or("trials") {
        "once" => Ok(Scenario::Once),
        "trials" => Ok(Scenario::Trials),
        "candidateSweep" => Ok(Scenario::CandidateSweep),
        "distributionGrid" => Ok(Scenario::DistributionGrid),
        "histogram" => Ok(Scenario::Histogram),
        x => whatever!("Unknown scenario {:?}", x),
    }
}

pub fn validate_distribution(ds: Option<&DistributionSettings>) -> SimResult<ModelSpec> {
    let default_settings = DistributionSettings::default();
    let ds = ds.unwrap_or(&default_settings);

    let discrete = matches!(ds.kind.as_str(), "discrete" | "discreteUniform");
    let default_spectrum = if discrete {
        Spectrum::DISCRETE
    } else {
        Spectrum::UNIT
    };
    let spectrum = Spectrum::new(
        ds.spectrum_start.unwrap_or(default_spectrum.start),
        ds.spectrum_end.unwrap_or(default_spectrum.end),
    )
    .context(SimulationSnafu {})?;

    let kind = match ds.kind.as_str() {
        "" | "normal" => DistributionKind::Normal {
            location: ds.location.unwrap_or(ModelSpec::DEFAULT_NORMAL_LOCATION),
            scale: ds.scale.unwrap_or(ModelSpec::DEFAULT_NORMAL_SCALE),
        },
        "randomNormal" => DistributionKind::RandomNormal {
            scale: ds.scale.unwrap_or_else(|| spectrum.width()),
        },
        "uniform" => DistributionKind::Uniform,
        "randomSpline" => DistributionKind::RandomSpline {
            control_points: ds
                .control_points
                .unwrap_or(ModelSpec::DEFAULT_SPLINE_CONTROL_POINTS),
        },
        "discrete" => match &ds.voters {
            Some(voters) => DistributionKind::Discrete {
                voters: voters.clone(),
            },
            None => whatever!("The discrete distribution needs a list of voters"),
        },
        "discreteUniform" => match ds.num_voters {
            Some(num_voters) => DistributionKind::DiscreteUniform { num_voters },
            None => whatever!("The discreteUniform distribution needs numVoters"),
        },
        x => whatever!("Unknown distribution {:?}", x),
    };

    let grid_sections = ds.grid_sections.unwrap_or(ModelSpec::DEFAULT_GRID_SECTIONS);
    if grid_sections == 0 {
        whatever!("gridSections must be positive");
    }
    Ok(ModelSpec {
        kind,
        spectrum,
        grid_sections,
    })
}

pub fn validate_candidates(cs: Option<&CandidateSettings>) -> SimResult<CandidateChoice> {
    let default_settings = CandidateSettings::default();
    let cs = cs.unwrap_or(&default_settings);
    if let Some(positions) = &cs.positions {
        if positions.is_empty() {
            whatever!("The list of candidate positions is empty");
        }
        return Ok(CandidateChoice::Positions(positions.clone()));
    }
    if cs.left_count.is_some() || cs.right_count.is_some() {
        let left = cs.left_count.unwrap_or(0);
        let right = cs.right_count.unwrap_or(0);
        if left + right == 0 {
            whatever!("leftCount and rightCount are both zero");
        }
        return Ok(CandidateChoice::Drawn(CandidateMode::FixedSplit { left, right }));
    }
    let count = cs.count.unwrap_or(TrialConfig::DEFAULT_NUM_CANDIDATES);
    if count == 0 {
        whatever!("The number of candidates must be positive");
    }
    Ok(CandidateChoice::Drawn(CandidateMode::FromDistribution(count)))
}

pub fn validate_trials(config: &SimConfig) -> SimResult<TrialConfig> {
    let candidates = match validate_candidates(config.candidates.as_ref())? {
        CandidateChoice::Drawn(mode) => mode,
        CandidateChoice::Positions(_) => {
            whatever!("Fixed candidate positions cannot be used across trials")
        }
    };
    let default_settings = TrialSettings::default();
    let ts = config.trials.as_ref().unwrap_or(&default_settings);

    let trials_per_recreation = match (ts.recreate_distribution, ts.trials_per_recreation) {
        (Some(false), _) => None,
        (_, Some(0)) => whatever!("trialsPerRecreation must be positive"),
        (_, Some(k)) => NonZeroUsize::new(k),
        (Some(true), None) => NonZeroUsize::new(DEFAULT_TRIALS_PER_RECREATION),
        (None, None) => None,
    };
    Ok(TrialConfig {
        trials: ts.trials.unwrap_or(TrialConfig::DEFAULT_TRIALS),
        trials_per_recreation,
        candidates,
    })
}

pub fn validate_sweep(ss: Option<&SweepSettings>) -> SimResult<(usize, usize)> {
    let min_count = ss.and_then(|s| s.min_candidates).unwrap_or(DEFAULT_SWEEP.0);
    let max_count = ss.and_then(|s| s.max_candidates).unwrap_or(DEFAULT_SWEEP.1);
    if min_count == 0 || min_count > max_count {
        whatever!(
            "Invalid candidate range {}..={} for the sweep",
            min_count,
            max_count
        );
    }
    Ok((min_count, max_count))
}

pub fn validate_grid(gs: Option<&GridSettings>) -> SimResult<(Vec<f64>, Vec<f64>)> {
    let means = match gs.and_then(|g| g.means.clone()) {
        Some(m) => m,
        None => (0..DEFAULT_GRID_SIZE)
            .map(|i| (5.0 + i as f64) / 10.0)
            .collect(),
    };
    let deviations = match gs.and_then(|g| g.deviations.clone()) {
        Some(d) => d,
        None => (0..DEFAULT_GRID_SIZE)
            .map(|j| 0.05 * 2f64.powi(j as i32))
            .collect(),
    };
    if means.is_empty() || deviations.is_empty() {
        whatever!("The distribution grid needs at least one mean and one deviation");
    }
    Ok((means, deviations))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> SimConfig {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("{}");
        assert_eq!(validate_scenario(config.scenario.as_deref()).unwrap(), Scenario::Trials);
        assert_eq!(
            validate_distribution(config.distribution.as_ref()).unwrap(),
            ModelSpec::normal(0.5, 0.2)
        );
        let tc = validate_trials(&config).unwrap();
        assert_eq!(tc.trials, 500);
        assert_eq!(tc.trials_per_recreation, None);
        assert_eq!(tc.candidates, CandidateMode::FromDistribution(4));
        assert_eq!(config.scatter_limit(), 1000);
    }

    #[test]
    fn discrete_voters() {
        let config = parse(
            r#"{"distribution": {"kind": "discrete", "voters": [1, 9, 11, 19]},
                "candidates": {"positions": [5, 15]}}"#,
        );
        let spec = validate_distribution(config.distribution.as_ref()).unwrap();
        assert_eq!(spec, ModelSpec::discrete(&[1.0, 9.0, 11.0, 19.0]));
        assert_eq!(
            validate_candidates(config.candidates.as_ref()).unwrap(),
            CandidateChoice::Positions(vec![5.0, 15.0])
        );
        assert!(validate_trials(&config).is_err());
    }

    #[test]
    fn random_normal_scale_follows_spectrum() {
        let config = parse(
            r#"{"distribution": {"kind": "randomNormal", "spectrumStart": 0, "spectrumEnd": 20}}"#,
        );
        let spec = validate_distribution(config.distribution.as_ref()).unwrap();
        assert_eq!(spec.kind, DistributionKind::RandomNormal { scale: 20.0 });
    }

    #[test]
    fn recreation_settings() {
        let config = parse(r#"{"trials": {"recreateDistribution": true}}"#);
        assert_eq!(
            validate_trials(&config).unwrap().trials_per_recreation,
            NonZeroUsize::new(100)
        );
        let config = parse(r#"{"trials": {"trialsPerRecreation": 7}}"#);
        assert_eq!(
            validate_trials(&config).unwrap().trials_per_recreation,
            NonZeroUsize::new(7)
        );
        let config = parse(r#"{"trials": {"recreateDistribution": false, "trialsPerRecreation": 7}}"#);
        assert_eq!(validate_trials(&config).unwrap().trials_per_recreation, None);
        let config = parse(r#"{"trials": {"trialsPerRecreation": 0}}"#);
        assert!(validate_trials(&config).is_err());
    }

    #[test]
    fn fixed_split() {
        let config = parse(r#"{"candidates": {"leftCount": 2, "rightCount": 1}}"#);
        assert_eq!(
            validate_trials(&config).unwrap().candidates,
            CandidateMode::FixedSplit { left: 2, right: 1 }
        );
        let config = parse(r#"{"candidates": {"rightCount": 0}}"#);
        assert!(validate_candidates(config.candidates.as_ref()).is_err());
    }

    #[test]
    fn default_grid() {
        let (means, deviations) = validate_grid(None).unwrap();
        assert_eq!(means, vec![0.5, 0.6, 0.7, 0.8, 0.9]);
        assert_eq!(deviations, vec![0.05, 0.1, 0.2, 0.4, 0.8]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(validate_scenario(Some("runoff")).is_err());
        let config = parse(r#"{"distribution": {"kind": "cauchy"}}"#);
        assert!(validate_distribution(config.distribution.as_ref()).is_err());
        let config = parse(r#"{"distribution": {"kind": "discrete"}}"#);
        assert!(validate_distribution(config.distribution.as_ref()).is_err());
        let config = parse(r#"{"distribution": {"spectrumStart": 1, "spectrumEnd": 0}}"#);
        assert!(matches!(
            validate_distribution(config.distribution.as_ref()),
            Err(SimError::Simulation { .. })
        ));
        let sweep = SweepSettings {
            min_candidates: Some(6),
            max_candidates: Some(3),
        };
        assert!(validate_sweep(Some(&sweep)).is_err());
        assert_eq!(validate_sweep(None).unwrap(), (3, 5));
    }
}
