//! Density shapes used to build continuous voter models.

use rand::Rng;

use crate::config::*;

const SQRT_TWO_PI: f64 = 2.506_628_274_631_000_2;

/// Share of the spectrum, from its start, in which a random normal location is drawn.
pub const RANDOM_NORMAL_LOCATION_SPAN: f64 = 0.4;

pub fn normal_pdf(x: f64, location: f64, scale: f64) -> f64 {
    let z = (x - location) / scale;
    (-0.5 * z * z).exp() / (scale * SQRT_TWO_PI)
}

/// Flat density. Left unnormalized so that equal ranges sum to equal masses.
pub fn flat_density(x: f64, spectrum: Spectrum) -> f64 {
    if spectrum.contains(x) {
        1.0
    } else {
        0.0
    }
}

/// Natural cubic spline through a set of control points.
///
/// Outside the control points the curve is held at the boundary values.
#[derive(PartialEq, Debug, Clone)]
pub struct NaturalSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    // Second derivatives at the control points.
    y2: Vec<f64>,
}

impl NaturalSpline {
    /// `xs` must be strictly increasing and hold at least two points.
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<NaturalSpline, SimulationError> {
        let n = xs.len();
        if n < 2 || ys.len() != n {
            return Err(SimulationError::ModelBuild {
                reason: format!(
                    "a spline needs at least two control points, got {} x and {} y",
                    n,
                    ys.len()
                ),
            });
        }
        if xs.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(SimulationError::ModelBuild {
                reason: "spline control points are not strictly increasing".to_string(),
            });
        }

        // Tridiagonal sweep, with zero curvature at both ends.
        let mut y2 = vec![0.0; n];
        let mut u = vec![0.0; n];
        for i in 1..n - 1 {
            let sig = (xs[i] - xs[i - 1]) / (xs[i + 1] - xs[i - 1]);
            let p = sig * y2[i - 1] + 2.0;
            y2[i] = (sig - 1.0) / p;
            let slope_diff =
                (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]) - (ys[i] - ys[i - 1]) / (xs[i] - xs[i - 1]);
            u[i] = (6.0 * slope_diff / (xs[i + 1] - xs[i - 1]) - sig * u[i - 1]) / p;
        }
        for k in (0..n - 1).rev() {
            y2[k] = y2[k] * y2[k + 1] + u[k];
        }

        Ok(NaturalSpline {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            y2,
        })
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let x = x.max(self.xs[0]).min(self.xs[n - 1]);
        let khi = self.xs.partition_point(|&v| v < x).clamp(1, n - 1);
        let klo = khi - 1;
        let h = self.xs[khi] - self.xs[klo];
        let a = (self.xs[khi] - x) / h;
        let b = (x - self.xs[klo]) / h;
        a * self.ys[klo]
            + b * self.ys[khi]
            + ((a * a * a - a) * self.y2[klo] + (b * b * b - b) * self.y2[khi]) * h * h / 6.0
    }
}

/// A random smooth curve: `control_points` heights drawn uniformly in
/// `[0, 1)` at evenly spaced positions across the spectrum.
pub fn random_spline<R: Rng + ?Sized>(
    spectrum: Spectrum,
    control_points: usize,
    rng: &mut R,
) -> Result<NaturalSpline, SimulationError> {
    if control_points < 2 {
        return Err(SimulationError::ModelBuild {
            reason: format!("{} spline control points, need at least 2", control_points),
        });
    }
    let step = spectrum.width() / (control_points - 1) as f64;
    let xs: Vec<f64> = (0..control_points)
        .map(|i| spectrum.start + i as f64 * step)
        .collect();
    let ys: Vec<f64> = (0..control_points).map(|_| rng.gen::<f64>()).collect();
    NaturalSpline::new(&xs, &ys)
}
