//! Terminal events monitored during integration.
//!
//! An event is a scalar function `g(t, y)`; it fires when `g` reaches zero
//! inside an accepted step in the requested direction. Crossing rules:
//!
//! ```text
//! rising:  g_old <= 0 && g_new >= 0
//! falling: g_old >= 0 && g_new <= 0
//! any:     rising || falling
//! ```
//!
//! A value that merely touches zero at the start of a step and then moves
//! away in the other direction does not fire a one-sided event.

use nalgebra::DVector;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Any,
    Rising,
    Falling,
}

type EventFn = Box<dyn Fn(f64, &DVector<f64>) -> f64 + Send + Sync>;

/// Terminal event: integration stops at the first located zero.
pub struct Event {
    name: String,
    direction: Direction,
    function: EventFn,
}

impl Event {
    pub fn new<F>(name: impl Into<String>, direction: Direction, function: F) -> Self
    where
        F: Fn(f64, &DVector<f64>) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            direction,
            function: Box::new(function),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn value(&self, t: f64, y: &DVector<f64>) -> f64 {
        (self.function)(t, y)
    }

    /// Whether the step from `g_old` to `g_new` crosses zero in this
    /// event's direction.
    pub fn triggered(&self, g_old: f64, g_new: f64) -> bool {
        let rising = g_old <= 0.0 && g_new >= 0.0;
        let falling = g_old >= 0.0 && g_new <= 0.0;
        match self.direction {
            Direction::Any => rising || falling,
            Direction::Rising => rising,
            Direction::Falling => falling,
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

/// A located event.
#[derive(Clone, Debug, PartialEq)]
pub struct EventHit {
    /// Position of the event in the list handed to the integrator.
    pub index: usize,
    pub name: String,
    pub t: f64,
    pub y: DVector<f64>,
}
