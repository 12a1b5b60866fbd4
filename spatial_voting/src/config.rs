// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::num::NonZeroUsize;

/// A closed interval of the ideological spectrum.
///
/// Continuous models are usually built over [`Spectrum::UNIT`] and discrete
/// voter lists over [`Spectrum::DISCRETE`], but nothing in the engine depends
/// on a particular interval.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Spectrum {
    pub start: f64,
    pub end: f64,
}

impl Spectrum {
    pub const UNIT: Spectrum = Spectrum {
        start: 0.0,
        end: 1.0,
    };

    pub const DISCRETE: Spectrum = Spectrum {
        start: 0.0,
        end: 20.0,
    };

    pub fn new(start: f64, end: f64) -> Result<Spectrum, SimulationError> {
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(SimulationError::ModelBuild {
                reason: format!("invalid spectrum [{}, {}]", start, end),
            });
        }
        Ok(Spectrum { start, end })
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// Out-of-interval positions are moved to the nearest edge.
    pub fn clamp(&self, position: f64) -> f64 {
        position.max(self.start).min(self.end)
    }

    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position <= self.end
    }
}

/// The shape of the voter population.
#[derive(PartialEq, Debug, Clone)]
pub enum DistributionKind {
    /// Normal density with a fixed location and scale.
    Normal { location: f64, scale: f64 },
    /// Normal density whose location is redrawn in the lower 40% of the
    /// spectrum every time the model is rebuilt.
    RandomNormal { scale: f64 },
    /// Flat density over the whole spectrum.
    Uniform,
    /// Smooth random curve interpolated through `control_points` random
    /// heights, redrawn on every rebuild.
    RandomSpline { control_points: usize },
    /// A fixed list of voter positions.
    Discrete { voters: Vec<f64> },
    /// `num_voters` voters drawn uniformly over the spectrum on every rebuild.
    DiscreteUniform { num_voters: usize },
}

impl DistributionKind {
    /// Discrete kinds are tallied per voter, the others through a sampled grid.
    pub fn is_discrete(&self) -> bool {
        matches!(
            self,
            DistributionKind::Discrete { .. } | DistributionKind::DiscreteUniform { .. }
        )
    }

    /// True when every build of this kind yields the same model.
    pub fn is_deterministic(&self) -> bool {
        matches!(
            self,
            DistributionKind::Normal { .. }
                | DistributionKind::Uniform
                | DistributionKind::Discrete { .. }
        )
    }
}

/// Everything needed to build a voter mass model.
#[derive(PartialEq, Debug, Clone)]
pub struct ModelSpec {
    pub kind: DistributionKind,
    pub spectrum: Spectrum,
    /// Number of grid cells of a continuous model. Ignored by discrete kinds.
    pub grid_sections: usize,
}

impl ModelSpec {
    pub const DEFAULT_GRID_SECTIONS: usize = 50_000;
    pub const DEFAULT_SPLINE_CONTROL_POINTS: usize = 10;
    pub const DEFAULT_NORMAL_LOCATION: f64 = 0.5;
    pub const DEFAULT_NORMAL_SCALE: f64 = 0.2;

    /// A normal distribution over the unit spectrum.
    pub fn normal(location: f64, scale: f64) -> ModelSpec {
        ModelSpec {
            kind: DistributionKind::Normal { location, scale },
            spectrum: Spectrum::UNIT,
            grid_sections: ModelSpec::DEFAULT_GRID_SECTIONS,
        }
    }

    /// A fixed list of voters over the discrete spectrum.
    pub fn discrete(voters: &[f64]) -> ModelSpec {
        ModelSpec {
            kind: DistributionKind::Discrete {
                voters: voters.to_vec(),
            },
            spectrum: Spectrum::DISCRETE,
            grid_sections: ModelSpec::DEFAULT_GRID_SECTIONS,
        }
    }
}

/// How candidates are placed for a trial.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum CandidateMode {
    /// Candidates are drawn from the voter distribution itself. How many land
    /// on each side of the median is a consequence of the draw.
    FromDistribution(usize),
    /// A fixed number of candidates strictly left and strictly right of the
    /// median, drawn uniformly within each side.
    FixedSplit { left: usize, right: usize },
}

impl CandidateMode {
    pub fn num_candidates(&self) -> usize {
        match *self {
            CandidateMode::FromDistribution(count) => count,
            CandidateMode::FixedSplit { left, right } => left + right,
        }
    }
}

/// The configuration of a Monte Carlo run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TrialConfig {
    pub trials: usize,
    /// Rebuild the voter model every that many trials. When absent, the model
    /// is built once for the whole run.
    pub trials_per_recreation: Option<NonZeroUsize>,
    pub candidates: CandidateMode,
}

impl TrialConfig {
    pub const DEFAULT_TRIALS: usize = 500;
    pub const DEFAULT_NUM_CANDIDATES: usize = 4;

    pub fn new(trials: usize, candidates: CandidateMode) -> TrialConfig {
        TrialConfig {
            trials,
            trials_per_recreation: None,
            candidates,
        }
    }
}

// ******** Output data structures *********

/// Vote share per candidate position, in ascending position order.
pub type Tally = Vec<(f64, f64)>;

/// The outcome of an election: one winner, or an exact tie between
/// several positions.
#[derive(PartialEq, Debug, Clone)]
pub enum ElectionWinner {
    Single(f64),
    Tie(Vec<f64>),
}

impl ElectionWinner {
    /// The position used for polarization. A tie counts as the mean of the
    /// tied positions.
    pub fn position(&self) -> f64 {
        match self {
            ElectionWinner::Single(p) => *p,
            ElectionWinner::Tie(ps) => ps.iter().sum::<f64>() / ps.len() as f64,
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, ElectionWinner::Tie(_))
    }

    /// Distance between the winner and the median voter.
    pub fn polarization(&self, median: f64) -> f64 {
        (self.position() - median).abs()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Side {
    Left,
    Right,
}

/// The plurality primary of one side of the median.
#[derive(PartialEq, Debug, Clone)]
pub struct PrimaryResult {
    pub side: Side,
    pub tally: Tally,
    pub winner: f64,
}

/// Result of the primary-then-general plurality system.
#[derive(PartialEq, Debug, Clone)]
pub struct CesResult {
    pub winner: ElectionWinner,
    pub median: f64,
    pub left_primary: Option<PrimaryResult>,
    pub right_primary: Option<PrimaryResult>,
    /// The general election tally, absent when one side had no primary.
    pub general: Option<Tally>,
}

impl CesResult {
    pub fn polarization(&self) -> f64 {
        self.winner.polarization(self.median)
    }
}

/// Statistics for one round of instant runoff.
#[derive(PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    pub tally: Tally,
    pub eliminated: Option<f64>,
}

/// Result of the instant-runoff system.
#[derive(PartialEq, Debug, Clone)]
pub struct RcvResult {
    pub winner: ElectionWinner,
    pub median: f64,
    pub round_stats: Vec<RoundStats>,
    /// Eliminated candidates, in elimination order.
    pub eliminated: Vec<f64>,
}

impl RcvResult {
    pub fn polarization(&self) -> f64 {
        self.winner.polarization(self.median)
    }

    /// The tally of the deciding round.
    pub fn final_tally(&self) -> Option<&Tally> {
        self.round_stats.last().map(|rs| &rs.tally)
    }
}

/// Errors that prevent a model build, a candidate draw or an election
/// from completing.
#[derive(PartialEq, Debug, Clone)]
pub enum SimulationError {
    /// The voter distribution is empty, degenerate or malformed.
    ModelBuild { reason: String },
    /// The requested candidates cannot be placed on the model.
    InsufficientCandidates { requested: usize, available: usize },
    /// The election cannot be decided with the given candidates.
    DegenerateElection { reason: String },
}

impl Error for SimulationError {}

impl Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::ModelBuild { reason } => {
                write!(f, "Cannot build voter model: {}", reason)
            }
            SimulationError::InsufficientCandidates {
                requested,
                available,
            } => write!(
                f,
                "Cannot place {} candidates, only {} positions available",
                requested, available
            ),
            SimulationError::DegenerateElection { reason } => {
                write!(f, "Degenerate election: {}", reason)
            }
        }
    }
}
