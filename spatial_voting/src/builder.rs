use log::info;
use rand::{Rng, RngCore};
use std::sync::Arc;

use crate::config::*;
use crate::density::{flat_density, normal_pdf, random_spline, RANDOM_NORMAL_LOCATION_SPAN};
use crate::mass::{ContinuousModel, DiscreteModel, SharedModel};

/// Builds the voter model described by `spec`.
///
/// Random kinds draw their shape from `rng`. Deterministic kinds do not
/// touch it.
pub fn build_model<R: Rng + ?Sized>(
    spec: &ModelSpec,
    rng: &mut R,
) -> Result<SharedModel, SimulationError> {
    let spectrum = Spectrum::new(spec.spectrum.start, spec.spectrum.end)?;
    let model: SharedModel = match &spec.kind {
        DistributionKind::Normal { location, scale } => {
            check_scale(*scale)?;
            let (location, scale) = (*location, *scale);
            Arc::new(ContinuousModel::from_density(
                spectrum,
                spec.grid_sections,
                |x| normal_pdf(x, location, scale),
            )?)
        }
        DistributionKind::RandomNormal { scale } => {
            check_scale(*scale)?;
            let scale = *scale;
            let location =
                spectrum.start + rng.gen::<f64>() * RANDOM_NORMAL_LOCATION_SPAN * spectrum.width();
            info!("build_model: random normal location {}", location);
            Arc::new(ContinuousModel::from_density(
                spectrum,
                spec.grid_sections,
                |x| normal_pdf(x, location, scale),
            )?)
        }
        DistributionKind::Uniform => Arc::new(ContinuousModel::from_density(
            spectrum,
            spec.grid_sections,
            |x| flat_density(x, spectrum),
        )?),
        DistributionKind::RandomSpline { control_points } => {
            let spline = random_spline(spectrum, *control_points, rng)?;
            Arc::new(ContinuousModel::from_density(
                spectrum,
                spec.grid_sections,
                |x| spline.evaluate(x),
            )?)
        }
        DistributionKind::Discrete { voters } => {
            Arc::new(DiscreteModel::from_voters(spectrum, voters)?)
        }
        DistributionKind::DiscreteUniform { num_voters } => {
            let voters: Vec<f64> = (0..*num_voters)
                .map(|_| spectrum.start + rng.gen::<f64>() * spectrum.width())
                .collect();
            Arc::new(DiscreteModel::from_voters(spectrum, &voters)?)
        }
    };
    Ok(model)
}

fn check_scale(scale: f64) -> Result<(), SimulationError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::ModelBuild {
            reason: format!("normal scale must be positive, got {}", scale),
        })
    }
}

/// Produces voter models for a Monte Carlo run.
///
/// The driver calls the factory once at the start of a run and again at every
/// recreation boundary.
pub trait ModelFactory {
    fn build_model(&self, rng: &mut dyn RngCore) -> Result<SharedModel, SimulationError>;
}

impl ModelFactory for ModelSpec {
    fn build_model(&self, rng: &mut dyn RngCore) -> Result<SharedModel, SimulationError> {
        build_model(self, rng)
    }
}

/// A factory that always hands out the same model.
#[derive(Debug, Clone)]
pub struct FixedModel(pub SharedModel);

impl ModelFactory for FixedModel {
    fn build_model(&self, _rng: &mut dyn RngCore) -> Result<SharedModel, SimulationError> {
        Ok(self.0.clone())
    }
}

/// A builder for model specifications.
///
/// ```
/// use spatial_voting::builder::ModelBuilder;
/// use spatial_voting::{Spectrum, SimulationError, VoterMassModel};
/// # use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
/// let model = ModelBuilder::new(Spectrum::UNIT)?
///     .grid_sections(1_000)?
///     .normal(0.5, 0.1)?
///     .build(&mut rng)?;
///
/// assert!((model.median_position() - 0.5).abs() < 1e-2);
///
/// # Ok::<(), SimulationError>(())
/// ```
pub struct ModelBuilder {
    pub(crate) _spectrum: Spectrum,
    pub(crate) _grid_sections: usize,
    pub(crate) _kind: Option<DistributionKind>,
}

impl ModelBuilder {
    pub fn new(spectrum: Spectrum) -> Result<ModelBuilder, SimulationError> {
        Ok(ModelBuilder {
            _spectrum: Spectrum::new(spectrum.start, spectrum.end)?,
            _grid_sections: ModelSpec::DEFAULT_GRID_SECTIONS,
            _kind: None,
        })
    }

    pub fn grid_sections(self, sections: usize) -> Result<ModelBuilder, SimulationError> {
        if sections == 0 {
            return Err(SimulationError::ModelBuild {
                reason: "the grid needs at least one section".to_string(),
            });
        }
        Ok(ModelBuilder {
            _grid_sections: sections,
            ..self
        })
    }

    pub fn normal(self, location: f64, scale: f64) -> Result<ModelBuilder, SimulationError> {
        check_scale(scale)?;
        self.kind(DistributionKind::Normal { location, scale })
    }

    pub fn uniform(self) -> Result<ModelBuilder, SimulationError> {
        self.kind(DistributionKind::Uniform)
    }

    pub fn random_spline(self, control_points: usize) -> Result<ModelBuilder, SimulationError> {
        self.kind(DistributionKind::RandomSpline { control_points })
    }

    /// Uses a fixed list of voter positions.
    pub fn voters(self, voters: &[f64]) -> Result<ModelBuilder, SimulationError> {
        self.kind(DistributionKind::Discrete {
            voters: voters.to_vec(),
        })
    }

    pub fn kind(self, kind: DistributionKind) -> Result<ModelBuilder, SimulationError> {
        Ok(ModelBuilder {
            _kind: Some(kind),
            ..self
        })
    }

    pub fn spec(&self) -> Result<ModelSpec, SimulationError> {
        let kind = self._kind.clone().ok_or(SimulationError::ModelBuild {
            reason: "no distribution selected".to_string(),
        })?;
        Ok(ModelSpec {
            kind,
            spectrum: self._spectrum,
            grid_sections: self._grid_sections,
        })
    }

    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SharedModel, SimulationError> {
        build_model(&self.spec()?, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn builds_every_kind() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let kinds = vec![
            DistributionKind::Normal {
                location: 0.5,
                scale: 0.2,
            },
            DistributionKind::RandomNormal { scale: 1.0 },
            DistributionKind::Uniform,
            DistributionKind::RandomSpline { control_points: 10 },
        ];
        for kind in kinds {
            let spec = ModelSpec {
                kind,
                spectrum: Spectrum::UNIT,
                grid_sections: 2_000,
            };
            let model = build_model(&spec, &mut rng).unwrap();
            assert!(model.total_mass() > 0.0);
            assert!(Spectrum::UNIT.contains(model.median_position()));
        }
        let spec = ModelSpec {
            kind: DistributionKind::DiscreteUniform { num_voters: 51 },
            spectrum: Spectrum::DISCRETE,
            grid_sections: 0,
        };
        let model = build_model(&spec, &mut rng).unwrap();
        assert!(Spectrum::DISCRETE.contains(model.median_position()));
    }

    #[test]
    fn rejects_degenerate_specs() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let bad_scale = ModelSpec::normal(0.5, 0.0);
        assert!(matches!(
            build_model(&bad_scale, &mut rng),
            Err(SimulationError::ModelBuild { .. })
        ));
        let no_voters = ModelSpec::discrete(&[]);
        assert!(build_model(&no_voters, &mut rng).is_err());
        let empty_draw = ModelSpec {
            kind: DistributionKind::DiscreteUniform { num_voters: 0 },
            spectrum: Spectrum::DISCRETE,
            grid_sections: 1,
        };
        assert!(build_model(&empty_draw, &mut rng).is_err());
        assert!(ModelBuilder::new(Spectrum::UNIT).unwrap().spec().is_err());
        assert!(ModelBuilder::new(Spectrum { start: 1.0, end: 0.0 }).is_err());
    }

    #[test]
    fn fixed_model_hands_out_the_same_model() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let model = ModelBuilder::new(Spectrum::DISCRETE)
            .unwrap()
            .voters(&[1.0, 9.0, 11.0, 19.0])
            .unwrap()
            .build(&mut rng)
            .unwrap();
        let factory = FixedModel(model.clone());
        let again = factory.build_model(&mut rng).unwrap();
        assert!(Arc::ptr_eq(&model, &again));
    }

    #[test]
    fn random_kinds_change_between_builds() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let spec = ModelSpec {
            kind: DistributionKind::RandomSpline { control_points: 10 },
            spectrum: Spectrum::UNIT,
            grid_sections: 1_000,
        };
        let a = spec.build_model(&mut rng).unwrap();
        let b = spec.build_model(&mut rng).unwrap();
        assert_ne!(a.mass_between(0.0, 0.5), b.mass_between(0.0, 0.5));
    }
}
