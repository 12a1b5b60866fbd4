use log::{debug, info, warn};
use rand::RngCore;

use crate::builder::{FixedModel, ModelFactory};
use crate::candidates::generate_candidates;
use crate::ces::resolve_ces;
use crate::config::*;
use crate::mass::{SharedModel, VoterMassModel};
use crate::rcv::resolve_rcv;

/// What a single trial produced, besides the two polarization values.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TrialRecord {
    pub num_candidates: usize,
    /// Candidates strictly left of the median.
    pub left_candidates: usize,
    /// Index of the CES winner in the sorted candidate list. `None` on a tie.
    pub ces_winner_index: Option<usize>,
    /// Index of the RCV winner in the sorted candidate list. `None` on a tie.
    pub rcv_winner_index: Option<usize>,
}

/// The index-aligned outcome of a Monte Carlo run.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct TrialResults {
    pub ces_polarization: Vec<f64>,
    pub rcv_polarization: Vec<f64>,
    pub records: Vec<TrialRecord>,
}

impl TrialResults {
    pub fn len(&self) -> usize {
        self.ces_polarization.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ces_polarization.is_empty()
    }

    /// (CES, RCV) polarization pairs in trial order.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.ces_polarization
            .iter()
            .copied()
            .zip(self.rcv_polarization.iter().copied())
    }
}

fn winner_index(candidates: &[f64], winner: &ElectionWinner) -> Option<usize> {
    match winner {
        ElectionWinner::Single(p) => candidates.iter().position(|c| c == p),
        ElectionWinner::Tie(_) => None,
    }
}

/// Runs `config.trials` independent elections and records the polarization
/// of both systems for each of them.
///
/// The model is built once from `factory`, and rebuilt every
/// `trials_per_recreation` trials when that is set. A failing trial aborts
/// the whole run so that both sequences stay aligned.
pub fn run_trials<F, R>(
    factory: &F,
    config: &TrialConfig,
    rng: &mut R,
) -> Result<TrialResults, SimulationError>
where
    F: ModelFactory + ?Sized,
    R: RngCore,
{
    info!(
        "run_trials: {} trials, {:?}, recreation every {:?}",
        config.trials, config.candidates, config.trials_per_recreation
    );
    let progress_every = (config.trials / 10).max(1);
    let mut res = TrialResults {
        ces_polarization: Vec::with_capacity(config.trials),
        rcv_polarization: Vec::with_capacity(config.trials),
        records: Vec::with_capacity(config.trials),
    };
    let mut model: Option<SharedModel> = None;
    for trial in 0..config.trials {
        let rebuild = match (&model, config.trials_per_recreation) {
            (None, _) => true,
            (Some(_), Some(k)) => trial % k.get() == 0,
            (Some(_), None) => false,
        };
        if rebuild {
            debug!("run_trials: building model for trial {}", trial);
            model = Some(factory.build_model(rng)?);
        }
        let current = match &model {
            Some(m) => m.clone(),
            None => {
                return Err(SimulationError::ModelBuild {
                    reason: "no model available".to_string(),
                })
            }
        };

        let (record, ces_pol, rcv_pol) = match run_one(current.as_ref(), config.candidates, rng) {
            Ok(x) => x,
            Err(e) => {
                warn!("run_trials: trial {} failed: {}", trial, e);
                return Err(e);
            }
        };
        res.ces_polarization.push(ces_pol);
        res.rcv_polarization.push(rcv_pol);
        res.records.push(record);

        if (trial + 1) % progress_every == 0 {
            info!("run_trials: {}/{} trials done", trial + 1, config.trials);
        }
    }
    Ok(res)
}

/// Runs trials against a single, already built model.
pub fn run_trials_with_model<R: RngCore>(
    model: SharedModel,
    config: &TrialConfig,
    rng: &mut R,
) -> Result<TrialResults, SimulationError> {
    run_trials(&FixedModel(model), config, rng)
}

fn run_one<R: RngCore>(
    model: &dyn VoterMassModel,
    mode: CandidateMode,
    rng: &mut R,
) -> Result<(TrialRecord, f64, f64), SimulationError> {
    let candidates = generate_candidates(model, mode, rng)?;
    let ces = resolve_ces(model, &candidates)?;
    let rcv = resolve_rcv(model, &candidates)?;
    let record = TrialRecord {
        num_candidates: candidates.len(),
        left_candidates: candidates.iter().filter(|&&c| c < ces.median).count(),
        ces_winner_index: winner_index(&candidates, &ces.winner),
        rcv_winner_index: winner_index(&candidates, &rcv.winner),
    };
    Ok((record, ces.polarization(), rcv.polarization()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ModelBuilder;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cell::Cell;
    use std::num::NonZeroUsize;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(2022)
    }

    // Counts how many models were requested.
    struct CountingFactory {
        spec: ModelSpec,
        builds: Cell<usize>,
    }

    impl ModelFactory for CountingFactory {
        fn build_model(&self, rng: &mut dyn RngCore) -> Result<SharedModel, SimulationError> {
            self.builds.set(self.builds.get() + 1);
            self.spec.build_model(rng)
        }
    }

    fn small_normal() -> ModelSpec {
        ModelSpec {
            grid_sections: 1_000,
            ..ModelSpec::normal(0.5, 0.2)
        }
    }

    #[test]
    fn sequences_are_aligned() {
        let config = TrialConfig::new(37, CandidateMode::FromDistribution(4));
        let res = run_trials(&small_normal(), &config, &mut create_test_rng()).unwrap();
        assert_eq!(res.len(), 37);
        assert_eq!(res.rcv_polarization.len(), 37);
        assert_eq!(res.records.len(), 37);
        assert!(res.pairs().all(|(c, r)| c >= 0.0 && r >= 0.0));
        assert!(res.records.iter().all(|r| r.num_candidates == 4));
    }

    #[test]
    fn rebuilds_on_schedule() {
        let factory = CountingFactory {
            spec: ModelSpec {
                kind: DistributionKind::RandomSpline { control_points: 10 },
                spectrum: Spectrum::UNIT,
                grid_sections: 500,
            },
            builds: Cell::new(0),
        };
        let mut config = TrialConfig::new(25, CandidateMode::FromDistribution(3));
        config.trials_per_recreation = NonZeroUsize::new(10);
        run_trials(&factory, &config, &mut create_test_rng()).unwrap();
        assert_eq!(factory.builds.get(), 3);

        factory.builds.set(0);
        config.trials_per_recreation = None;
        run_trials(&factory, &config, &mut create_test_rng()).unwrap();
        assert_eq!(factory.builds.get(), 1);
    }

    #[test]
    fn fixed_split_records_left_count() {
        let model = ModelBuilder::new(Spectrum::UNIT)
            .unwrap()
            .grid_sections(1_000)
            .unwrap()
            .uniform()
            .unwrap()
            .build(&mut create_test_rng())
            .unwrap();
        let config = TrialConfig::new(20, CandidateMode::FixedSplit { left: 2, right: 3 });
        let res = run_trials_with_model(model, &config, &mut create_test_rng()).unwrap();
        assert!(res.records.iter().all(|r| r.left_candidates == 2));
        assert!(res
            .records
            .iter()
            .all(|r| r.ces_winner_index.map_or(true, |i| i < 5)));
    }

    #[test]
    fn discrete_voters_run() {
        let model: SharedModel = std::sync::Arc::new(
            crate::mass::DiscreteModel::from_voters(Spectrum::DISCRETE, &[1.0, 9.0, 11.0, 19.0])
                .unwrap(),
        );
        let config = TrialConfig::new(10, CandidateMode::FromDistribution(2));
        let res = run_trials_with_model(model, &config, &mut create_test_rng()).unwrap();
        assert_eq!(res.len(), 10);
        // Candidates sit on voters, so a tie can only come from one per side.
        for (record, pol) in res.records.iter().zip(res.ces_polarization.iter()) {
            if record.ces_winner_index.is_none() {
                assert_eq!(record.left_candidates, 1);
                assert_eq!(*pol, 0.0);
            }
        }
    }

    #[test]
    fn failing_trial_aborts_the_run() {
        let model = ModelBuilder::new(Spectrum::DISCRETE)
            .unwrap()
            .voters(&[1.0, 9.0, 11.0, 19.0])
            .unwrap()
            .build(&mut create_test_rng())
            .unwrap();
        let config = TrialConfig::new(5, CandidateMode::FromDistribution(5));
        let res = run_trials_with_model(model, &config, &mut create_test_rng());
        assert!(matches!(
            res,
            Err(SimulationError::InsufficientCandidates { .. })
        ));
    }

    #[test]
    fn same_seed_same_results() {
        let config = TrialConfig::new(15, CandidateMode::FromDistribution(5));
        let a = run_trials(&small_normal(), &config, &mut create_test_rng()).unwrap();
        let b = run_trials(&small_normal(), &config, &mut create_test_rng()).unwrap();
        assert_eq!(a, b);
    }
}
