//! Top-speed sweeps over slope and rolling resistance.
//!
//! Cells are independent and evaluated in parallel. Runaway cells carry NaN
//! so that the grid stays rectangular.

use crate::error::{SolverError, SolverResult};
use crate::top_speed::{TopSpeedConfig, top_speed_with};
use rayon::prelude::*;
use rv_core::numeric::linspace;
use rv_model::{Planet, Rover};
use serde::Serialize;
use std::fmt;

/// Evenly spaced sweep over `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SweepDefinition {
    pub start: f64,
    pub end: f64,
    pub num_points: usize,
}

impl SweepDefinition {
    pub fn new(start: f64, end: f64, num_points: usize) -> SolverResult<Self> {
        let sweep = Self {
            start,
            end,
            num_points,
        };
        sweep.validate()?;
        Ok(sweep)
    }

    pub fn validate(&self) -> SolverResult<()> {
        let Self {
            start,
            end,
            num_points,
        } = *self;
        if !start.is_finite() || !end.is_finite() {
            return Err(SolverError::InvalidArg {
                what: "sweep bounds must be finite",
            });
        }
        if num_points < 2 {
            return Err(SolverError::InvalidArg {
                what: "sweep must have at least 2 points",
            });
        }
        if (start - end).abs() < 1e-12 {
            return Err(SolverError::InvalidArg {
                what: "sweep start and end must differ",
            });
        }
        Ok(())
    }

    /// Terrain angles −10°…35°, 25 points.
    pub fn slopes() -> Self {
        Self {
            start: -10.0,
            end: 35.0,
            num_points: 25,
        }
    }

    /// Crr 0.01…0.4, 25 points.
    pub fn rolling_resistance() -> Self {
        Self {
            start: 0.01,
            end: 0.4,
            num_points: 25,
        }
    }

    /// All points; the last equals `end` exactly.
    pub fn points(&self) -> Vec<f64> {
        linspace(self.start, self.end, self.num_points)
    }
}

impl fmt::Display for SweepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {} ({} points)",
            self.start, self.end, self.num_points
        )
    }
}

/// Which input a one-dimensional sweep varies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    SlopeDeg,
    Crr,
}

/// Top speed along one swept input.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopSpeedSweep {
    pub parameter: SweepParameter,
    /// Value of the input held fixed.
    pub fixed: f64,
    pub values: Vec<f64>,
    /// Top speed [m/s] per value, NaN where no equilibrium exists.
    pub top_speed: Vec<f64>,
}

/// Top speed over a slope × Crr grid.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopSpeedGrid {
    pub slopes_deg: Vec<f64>,
    pub crr: Vec<f64>,
    /// `top_speed[i][j]` is the speed at `slopes_deg[i]` and `crr[j]`.
    pub top_speed: Vec<Vec<f64>>,
}

impl TopSpeedGrid {
    /// Number of runaway cells.
    pub fn runaway_count(&self) -> usize {
        self.top_speed
            .iter()
            .flatten()
            .filter(|v| v.is_nan())
            .count()
    }
}

/// Sweep terrain angle at fixed Crr.
pub fn slope_sweep(
    rover: &Rover,
    planet: &Planet,
    slopes: &SweepDefinition,
    crr: f64,
    config: &TopSpeedConfig,
) -> SolverResult<TopSpeedSweep> {
    slopes.validate()?;
    let values = slopes.points();
    let top_speed = values
        .par_iter()
        .map(|&slope| Ok(top_speed_with(rover, planet, slope, crr, config)?.velocity()))
        .collect::<SolverResult<Vec<_>>>()?;
    Ok(TopSpeedSweep {
        parameter: SweepParameter::SlopeDeg,
        fixed: crr,
        values,
        top_speed,
    })
}

/// Sweep Crr at fixed terrain angle.
pub fn crr_sweep(
    rover: &Rover,
    planet: &Planet,
    crr: &SweepDefinition,
    slope_deg: f64,
    config: &TopSpeedConfig,
) -> SolverResult<TopSpeedSweep> {
    crr.validate()?;
    let values = crr.points();
    let top_speed = values
        .par_iter()
        .map(|&c| Ok(top_speed_with(rover, planet, slope_deg, c, config)?.velocity()))
        .collect::<SolverResult<Vec<_>>>()?;
    Ok(TopSpeedSweep {
        parameter: SweepParameter::Crr,
        fixed: slope_deg,
        values,
        top_speed,
    })
}

/// Sweep every (slope, Crr) pair.
pub fn grid_sweep(
    rover: &Rover,
    planet: &Planet,
    slopes: &SweepDefinition,
    crr: &SweepDefinition,
    config: &TopSpeedConfig,
) -> SolverResult<TopSpeedGrid> {
    slopes.validate()?;
    crr.validate()?;
    let slopes_deg = slopes.points();
    let crr = crr.points();
    let cols = crr.len();

    let flat = (0..slopes_deg.len() * cols)
        .into_par_iter()
        .map(|k| {
            let (i, j) = (k / cols, k % cols);
            Ok(top_speed_with(rover, planet, slopes_deg[i], crr[j], config)?.velocity())
        })
        .collect::<SolverResult<Vec<_>>>()?;

    let top_speed = flat.chunks(cols).map(<[f64]>::to_vec).collect();
    Ok(TopSpeedGrid {
        slopes_deg,
        crr,
        top_speed,
    })
}
