//! Run telemetry: trajectory samples and mission summary.

use crate::error::{SimError, SimResult};
use crate::integrator::Termination;
use rv_model::{Rover, battery_energy, mechanical_power};
use serde::Serialize;

/// Recorded trajectory and summary of one simulated traverse.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Telemetry {
    /// Sample times [s].
    pub time: Vec<f64>,
    /// Velocity at each sample [m/s].
    pub velocity: Vec<f64>,
    /// Position at each sample [m].
    pub position: Vec<f64>,
    /// Time of the last sample [s].
    pub completion_time: f64,
    /// Final minus initial position [m].
    pub distance_traveled: f64,
    pub max_velocity: f64,
    /// Distance over completion time, 0 when the completion time is 0.
    pub average_velocity: f64,
    /// Mechanical power of one drive unit at each sample [W].
    pub power: Vec<f64>,
    /// Battery energy drawn by all drive units [J].
    pub battery_energy: f64,
    /// Battery energy per meter [J/m], 0 when no distance was covered.
    pub energy_per_distance: f64,
    pub termination: Termination,
}

impl Telemetry {
    /// Aggregate a recorded trajectory.
    pub fn from_samples(
        time: Vec<f64>,
        velocity: Vec<f64>,
        position: Vec<f64>,
        rover: &Rover,
        termination: Termination,
    ) -> SimResult<Self> {
        if time.is_empty() || time.len() != velocity.len() || time.len() != position.len() {
            return Err(SimError::InvalidArg {
                what: "telemetry samples must be non-empty and of equal length",
            });
        }

        let completion_time = time[time.len() - 1];
        let distance_traveled = position[position.len() - 1] - position[0];
        let max_velocity = velocity.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average_velocity = if completion_time > 0.0 {
            distance_traveled / completion_time
        } else {
            0.0
        };
        let power = mechanical_power(&velocity, rover)?.into_vec();
        let battery_energy = battery_energy(&time, &velocity, rover)?;
        let energy_per_distance = if distance_traveled == 0.0 {
            0.0
        } else {
            battery_energy / distance_traveled
        };

        Ok(Self {
            time,
            velocity,
            position,
            completion_time,
            distance_traveled,
            max_velocity,
            average_velocity,
            power,
            battery_energy,
            energy_per_distance,
            termination,
        })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Human-readable summary, one quantity per line.
    pub fn summary_lines(&self) -> Vec<String> {
        let reason = match &self.termination {
            Termination::EndOfSpan => "end of time range".to_string(),
            Termination::Event { name, .. } => format!("event '{name}'"),
        };
        vec![
            format!("Stopped by:          {reason}"),
            format!("Completion time:     {:.2} s", self.completion_time),
            format!("Distance traveled:   {:.2} m", self.distance_traveled),
            format!("Max velocity:        {:.4} m/s", self.max_velocity),
            format!("Average velocity:    {:.4} m/s", self.average_velocity),
            format!("Battery energy:      {:.1} J", self.battery_energy),
            format!("Energy per distance: {:.2} J/m", self.energy_per_distance),
            format!("Samples:             {}", self.len()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rv_model::reference_rover;

    #[test]
    fn aggregates_summary_values() {
        let rover = reference_rover();
        let tm = Telemetry::from_samples(
            vec![0.0, 10.0, 20.0],
            vec![0.2, 0.3, 0.25],
            vec![5.0, 7.0, 10.0],
            &rover,
            Termination::EndOfSpan,
        )
        .unwrap();
        assert_eq!(tm.completion_time, 20.0);
        assert_eq!(tm.distance_traveled, 5.0);
        assert_eq!(tm.max_velocity, 0.3);
        assert_eq!(tm.average_velocity, 0.25);
        assert_eq!(tm.power.len(), 3);
        assert!(tm.battery_energy > 0.0);
        assert_eq!(tm.energy_per_distance, tm.battery_energy / 5.0);
        assert_eq!(tm.summary_lines().len(), 8);
    }

    #[test]
    fn zero_time_and_distance_give_zero_ratios() {
        let rover = reference_rover();
        let tm = Telemetry::from_samples(
            vec![0.0],
            vec![0.2],
            vec![3.0],
            &rover,
            Termination::EndOfSpan,
        )
        .unwrap();
        assert_eq!(tm.average_velocity, 0.0);
        assert_eq!(tm.battery_energy, 0.0);
        assert_eq!(tm.energy_per_distance, 0.0);
    }

    #[test]
    fn rejects_ragged_samples() {
        let rover = reference_rover();
        let err = Telemetry::from_samples(
            vec![0.0, 1.0],
            vec![0.2],
            vec![0.0, 0.2],
            &rover,
            Termination::EndOfSpan,
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
