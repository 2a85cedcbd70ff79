//! Experiment definition and end-of-mission conditions.

use crate::error::{SimError, SimResult};
use crate::events::{Direction, Event};
use rv_model::{TerrainProfile, TerrainSamples};
use serde::{Deserialize, Serialize};

/// Time span, initial state, terrain and rolling resistance of one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// `[t0, t_end]` [s].
    pub time_range: Vec<f64>,
    /// `[v0, x0]` (velocity [m/s], position [m]).
    pub initial_conditions: Vec<f64>,
    pub terrain: TerrainSamples,
    #[serde(alias = "Crr")]
    pub crr: f64,
}

impl Experiment {
    /// 1000 m traverse over rolling terrain at Crr 0.1.
    pub fn reference() -> Self {
        Self {
            time_range: vec![0.0, 20_000.0],
            initial_conditions: vec![0.3025, 0.0],
            terrain: TerrainSamples {
                distance: (0..=10).map(|i| 100.0 * i as f64).collect(),
                angle: vec![
                    11.509, 2.032, 7.182, 2.478, 5.511, 10.981, 5.601, -0.184, 0.714, 4.151, 4.042,
                ],
            },
            crr: 0.1,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        self.time_span()?;
        self.initial_state()?;
        self.terrain_profile()?;
        if !self.crr.is_finite() || self.crr <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "Crr must be a positive scalar",
            });
        }
        Ok(())
    }

    /// `(t0, t_end)` with `t_end > t0`.
    pub fn time_span(&self) -> SimResult<(f64, f64)> {
        let [t0, t_end] = pair(&self.time_range, "time_range must be [t0, t_end]")?;
        if !t0.is_finite() || !t_end.is_finite() {
            return Err(SimError::InvalidArg {
                what: "time_range must be finite",
            });
        }
        if t_end <= t0 {
            return Err(SimError::InvalidArg {
                what: "time_range must have positive length",
            });
        }
        Ok((t0, t_end))
    }

    /// `[v0, x0]`.
    pub fn initial_state(&self) -> SimResult<[f64; 2]> {
        let y0 = pair(
            &self.initial_conditions,
            "initial_conditions must be [velocity, position]",
        )?;
        if y0.iter().any(|v| !v.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "initial_conditions must be finite",
            });
        }
        Ok(y0)
    }

    pub fn terrain_profile(&self) -> SimResult<TerrainProfile> {
        Ok(TerrainProfile::try_from(self.terrain.clone())?)
    }
}

fn pair(values: &[f64], what: &'static str) -> SimResult<[f64; 2]> {
    <[f64; 2]>::try_from(values).map_err(|_| SimError::InvalidArg { what })
}

/// Thresholds that end a run early.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndConditions {
    /// Stop when the position reaches this [m].
    pub max_distance: f64,
    /// Stop when the time reaches this [s].
    pub max_time: f64,
    /// Stop when the velocity drops to this [m/s].
    pub min_velocity: f64,
}

impl EndConditions {
    pub fn reference() -> Self {
        Self {
            max_distance: 1000.0,
            max_time: 10_000.0,
            min_velocity: 0.01,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        let all_finite = [self.max_distance, self.max_time, self.min_velocity]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(SimError::InvalidArg {
                what: "end conditions must be finite",
            });
        }
        Ok(())
    }

    /// Terminal events on the `[velocity, position]` state.
    ///
    /// Distance and time fire on a crossing in either direction; the
    /// velocity threshold only when velocity is falling through it.
    pub fn events(&self) -> Vec<Event> {
        let Self {
            max_distance,
            max_time,
            min_velocity,
        } = *self;
        vec![
            Event::new("max_distance", Direction::Any, move |_, y| {
                max_distance - y[1]
            }),
            Event::new("max_time", Direction::Any, move |t, _| max_time - t),
            Event::new("min_velocity", Direction::Falling, move |_, y| {
                y[0] - min_velocity
            }),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    #[test]
    fn reference_is_valid() {
        let exp = Experiment::reference();
        exp.validate().unwrap();
        assert_eq!(exp.time_span().unwrap(), (0.0, 20_000.0));
        assert_eq!(exp.terrain.distance.len(), exp.terrain.angle.len());
        EndConditions::reference().validate().unwrap();
    }

    #[test]
    fn rejects_malformed_experiments() {
        let mut exp = Experiment::reference();
        exp.time_range = vec![];
        assert!(exp.validate().unwrap_err().is_invalid_argument());

        let mut exp = Experiment::reference();
        exp.time_range = vec![5.0, 5.0];
        assert!(exp.validate().is_err());

        let mut exp = Experiment::reference();
        exp.initial_conditions = vec![0.3, 0.0, 1.0];
        assert!(exp.validate().is_err());

        let mut exp = Experiment::reference();
        exp.terrain.angle.pop();
        assert!(exp.validate().unwrap_err().is_invalid_argument());

        let mut exp = Experiment::reference();
        exp.crr = -0.1;
        assert!(exp.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_thresholds() {
        let end = EndConditions {
            max_distance: f64::NAN,
            ..EndConditions::reference()
        };
        assert!(end.validate().is_err());
    }

    #[test]
    fn event_functions() {
        let events = EndConditions::reference().events();
        let y = DVector::from_vec(vec![0.5, 400.0]);
        assert_eq!(events[0].value(0.0, &y), 600.0);
        assert_eq!(events[1].value(2500.0, &y), 7500.0);
        assert!((events[2].value(0.0, &y) - 0.49).abs() < 1e-15);
        assert_eq!(events[2].direction(), Direction::Falling);
    }

    #[test]
    fn accepts_capitalised_crr() {
        let json = r#"{
            "time_range": [0, 100],
            "initial_conditions": [0.1, 0],
            "terrain": {"distance": [0, 50], "angle": [0, 5]},
            "Crr": 0.2
        }"#;
        let exp: Experiment = serde_json::from_str(json).unwrap();
        assert_eq!(exp.crr, 0.2);
        exp.validate().unwrap();
    }
}
