/*!
Spatial voting simulations on a one-dimensional spectrum.

Voters and candidates sit on an interval of the ideological spectrum, and
voters always support the nearest candidate. This crate compares two ways
of turning those sincere votes into a winner:

* the current election system ([`ces::resolve_ces`]): a plurality primary on
  each side of the median voter, then a plurality general election between
  the two primary winners,
* ranked choice voting ([`rcv::resolve_rcv`]): instant runoff, eliminating
  the weakest candidate until one holds a majority.

The outcome of both is measured by its polarization, the distance between
the winner and the median voter.

The electorate is a [`VoterMassModel`]: either a density sampled over a
fine grid ([`mass::ContinuousModel`]) or a finite list of voters
([`mass::DiscreteModel`]). Both resolvers only ask the model how much mass
lies between two positions, so they work unchanged on either.

```
use spatial_voting::*;
# use rand::SeedableRng;

let model = builder::ModelBuilder::new(Spectrum::DISCRETE)?
    .voters(&[1.0, 9.0, 11.0, 19.0])?
    .build(&mut rand::rngs::StdRng::seed_from_u64(0))?;
let (ces, rcv) = run_election(model.as_ref(), &[5.0, 15.0])?;
assert_eq!(ces.polarization(), 0.0);
assert_eq!(rcv.polarization(), 0.0);
# Ok::<(), SimulationError>(())
```

See the [`manual`] for the scenario files of the `polarsim` program.
 */

mod config;
mod tally;

pub mod builder;
pub mod candidates;
pub mod ces;
pub mod density;
pub mod histogram;
pub mod manual;
pub mod mass;
pub mod rcv;
pub mod stats;
pub mod trials;

use log::debug;

pub use crate::config::*;
pub use crate::mass::{SharedModel, VoterMassModel};
pub use crate::trials::{run_trials, run_trials_with_model, TrialRecord, TrialResults};

/// Resolves the same election under both systems.
pub fn run_election(
    model: &dyn VoterMassModel,
    candidates: &[f64],
) -> Result<(CesResult, RcvResult), SimulationError> {
    debug!(
        "run_election: {} candidates {:?}, median {}",
        candidates.len(),
        candidates,
        model.median_position()
    );
    let ces = ces::resolve_ces(model, candidates)?;
    let rcv = rcv::resolve_rcv(model, candidates)?;
    debug!(
        "run_election: CES {:?} ({}), RCV {:?} ({})",
        ces.winner,
        ces.polarization(),
        rcv.winner,
        rcv.polarization()
    );
    Ok((ces, rcv))
}
