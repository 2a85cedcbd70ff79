//! Terrain slope along the traverse.

use crate::common::check_finite;
use crate::error::{ModelError, ModelResult};
use rv_core::CubicSpline;
use serde::{Deserialize, Serialize};

/// Raw (distance, angle) table as it appears in configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainSamples {
    /// Distance along the path [m], strictly increasing.
    pub distance: Vec<f64>,
    /// Terrain angle at each distance [deg], positive uphill.
    pub angle: Vec<f64>,
}

/// Terrain angle as a smooth function of traveled distance.
///
/// Queries outside the sampled range follow the end polynomial pieces of
/// the spline; the angle is not clamped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TerrainSamples", into = "TerrainSamples")]
pub struct TerrainProfile {
    spline: CubicSpline,
}

impl TerrainProfile {
    pub fn new(distance: &[f64], angle: &[f64]) -> ModelResult<Self> {
        if distance.len() != angle.len() {
            return Err(ModelError::ShapeMismatch {
                what: "terrain distance/angle samples",
                left: distance.len(),
                right: angle.len(),
            });
        }
        if distance.is_empty() {
            return Err(ModelError::InvalidArg {
                what: "terrain profile needs samples",
            });
        }
        let spline = CubicSpline::new(distance, angle)?;
        Ok(Self { spline })
    }

    /// Flat ground over `[0, length]`.
    pub fn flat(length: f64) -> ModelResult<Self> {
        Self::new(&[0.0, length], &[0.0, 0.0])
    }

    /// Terrain angle [deg] at `distance` [m].
    pub fn angle_at(&self, distance: f64) -> ModelResult<f64> {
        let d = check_finite(distance, "terrain query distance must be finite")?;
        Ok(self.spline.eval(d))
    }

    pub fn distances(&self) -> &[f64] {
        self.spline.knots()
    }

    pub fn angles(&self) -> &[f64] {
        self.spline.values()
    }

    /// Sampled distance range.
    pub fn extent(&self) -> (f64, f64) {
        self.spline.domain()
    }

    /// `num_points` evenly spaced (distance, angle) pairs across the
    /// sampled range.
    pub fn sample(&self, num_points: usize) -> (Vec<f64>, Vec<f64>) {
        self.spline.sample(num_points)
    }

    pub fn samples(&self) -> TerrainSamples {
        TerrainSamples {
            distance: self.distances().to_vec(),
            angle: self.angles().to_vec(),
        }
    }
}

impl TryFrom<TerrainSamples> for TerrainProfile {
    type Error = ModelError;

    fn try_from(samples: TerrainSamples) -> ModelResult<Self> {
        Self::new(&samples.distance, &samples.angle)
    }
}

impl From<TerrainProfile> for TerrainSamples {
    fn from(profile: TerrainProfile) -> Self {
        profile.samples()
    }
}
