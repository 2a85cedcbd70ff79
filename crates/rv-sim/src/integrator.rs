//! Variable-step BDF integrator with terminal events.
//!
//! The first step is backward Euler; later steps use variable-step BDF2:
//!
//! ```text
//! w  = h / h_prev
//! y1 - a1 * y0 + a2 * y_prev = h * b * f(t1, y1)
//! a1 = (1 + w)^2 / (1 + 2w),  a2 = w^2 / (1 + 2w),  b = (1 + w) / (1 + 2w)
//! ```
//!
//! The corrector is solved with Newton ([`rv_solver::newton_solve`]) from an
//! explicit predictor; the corrector-predictor difference gives the local
//! error estimate. Events are checked on every accepted step and located on
//! the cubic Hermite interpolant of the step.

use crate::error::{SimError, SimResult};
use crate::events::{Event, EventHit};
use crate::model::OdeSystem;
use nalgebra::DVector;
use rv_solver::{BisectionConfig, NewtonConfig, bisect, finite_difference_jacobian, newton_solve};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Step size and tolerance settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Relative tolerance of the local error test.
    pub rtol: f64,
    /// Absolute tolerance of the local error test.
    pub atol: f64,
    /// Upper bound on any step [s].
    pub max_step: f64,
    /// Initial step; estimated from the problem when absent.
    pub first_step: Option<f64>,
    /// Accepted plus rejected step attempts before giving up.
    pub max_steps: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            max_step: 1.0,
            first_step: None,
            max_steps: 1_000_000,
        }
    }
}

impl SolverOptions {
    pub fn validate(&self) -> SimResult<()> {
        if !self.rtol.is_finite() || self.rtol <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "rtol must be positive",
            });
        }
        if !self.atol.is_finite() || self.atol <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "atol must be positive",
            });
        }
        if self.max_step.is_nan() || self.max_step <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "max_step must be positive",
            });
        }
        if let Some(h) = self.first_step {
            if !h.is_finite() || h <= 0.0 {
                return Err(SimError::InvalidArg {
                    what: "first_step must be positive",
                });
            }
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        Ok(())
    }
}

/// Why integration stopped.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// Reached the end of the time span.
    EndOfSpan,
    /// A terminal event fired.
    Event { index: usize, name: String },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct StepStats {
    pub accepted: usize,
    pub rejected: usize,
}

/// Accepted samples of one integration, ending at the event time when an
/// event fired.
#[derive(Clone, Debug)]
pub struct Solution {
    pub t: Vec<f64>,
    pub y: Vec<DVector<f64>>,
    pub termination: Termination,
    pub event: Option<EventHit>,
    pub stats: StepStats,
}

impl Solution {
    /// Samples of state component `i`.
    pub fn component(&self, i: usize) -> Vec<f64> {
        self.y.iter().map(|y| y[i]).collect()
    }
}

/// Safety factor on the optimal step.
const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 2.0;
/// Error constants relating corrector-predictor difference to local error
/// (exact for constant steps).
const ERROR_CONST_BDF1: f64 = 0.5;
const ERROR_CONST_BDF2: f64 = 0.4;

#[derive(Clone, Debug)]
pub struct Bdf {
    pub options: SolverOptions,
}

impl Default for Bdf {
    fn default() -> Self {
        Self::new(SolverOptions::default())
    }
}

impl Bdf {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    /// Integrate `system` over `t_span` from `y0`, stopping at the first
    /// event that fires.
    ///
    /// # Errors
    /// `InvalidArg` for a malformed span, state or options (before any step),
    /// `IntegrationFailed` on step size underflow, step cap or non-finite
    /// state, and any error raised by the system itself.
    pub fn integrate<S: OdeSystem>(
        &self,
        system: &S,
        t_span: (f64, f64),
        y0: DVector<f64>,
        events: &[Event],
    ) -> SimResult<Solution> {
        let opts = &self.options;
        opts.validate()?;
        let (t0, t_end) = t_span;
        if !t0.is_finite() || !t_end.is_finite() {
            return Err(SimError::InvalidArg {
                what: "time span must be finite",
            });
        }
        if t_end <= t0 {
            return Err(SimError::InvalidArg {
                what: "time span must have positive length",
            });
        }
        if y0.len() != system.dimension() {
            return Err(SimError::InvalidArg {
                what: "initial state length does not match the system",
            });
        }
        if !all_finite(&y0) {
            return Err(SimError::InvalidArg {
                what: "initial state must be finite",
            });
        }

        let mut t = t0;
        let mut y = y0;
        let mut f = system.rhs(t, &y)?;
        let mut g: Vec<f64> = events.iter().map(|e| e.value(t, &y)).collect();

        let mut h = match opts.first_step {
            Some(h) => h,
            None => self.initial_step(system, t, &y, &f)?,
        }
        .min(opts.max_step);

        let mut history: Option<(f64, DVector<f64>)> = None;
        let mut ts = vec![t];
        let mut ys = vec![y.clone()];
        let mut stats = StepStats::default();

        loop {
            if stats.accepted + stats.rejected >= opts.max_steps {
                return Err(SimError::IntegrationFailed {
                    what: format!("step limit {} reached at t = {t}", opts.max_steps),
                });
            }

            let min_step = 10.0 * f64::EPSILON * t.abs().max(1.0);
            h = h.min(opts.max_step);
            // never leave a remainder shorter than the minimum step
            let last = t + h >= t_end - min_step;
            if last {
                h = t_end - t;
            }
            if h < min_step {
                return Err(SimError::IntegrationFailed {
                    what: format!("step size {h:e} underflow at t = {t}"),
                });
            }
            let t_new = if last { t_end } else { t + h };

            let (y_pred, a1, a2, b, error_const, order) = match &history {
                None => (&y + &f * h, 1.0, 0.0, 1.0, ERROR_CONST_BDF1, 1),
                Some((t_prev, y_prev)) => {
                    let h_prev = t - t_prev;
                    let w = h / h_prev;
                    let denom = 1.0 + 2.0 * w;
                    let c = (y_prev - &y + &f * h_prev) / (h_prev * h_prev);
                    (
                        &y + &f * h + c * (h * h),
                        (1.0 + w) * (1.0 + w) / denom,
                        w * w / denom,
                        (1.0 + w) / denom,
                        ERROR_CONST_BDF2,
                        2,
                    )
                }
            };
            let y_prev = history.as_ref().map(|(_, yp)| yp);

            let scale = self.scale(&y, &y_pred);
            let newton = NewtonConfig {
                max_iterations: 10,
                abs_tol: 1e-3 * scale.min(),
                rel_tol: 0.0,
                ..NewtonConfig::default()
            };
            let residual = |z: &DVector<f64>| -> SimResult<DVector<f64>> {
                let mut r = z - &y * a1 - system.rhs(t_new, z)? * (h * b);
                if let Some(yp) = y_prev {
                    r += yp * a2;
                }
                Ok(r)
            };
            let jacobian = |z: &DVector<f64>| {
                finite_difference_jacobian(z, None, residual, f64::EPSILON.sqrt())
            };

            let y_new = match newton_solve(y_pred.clone(), residual, jacobian, &newton) {
                Ok(res) => res.x,
                Err(e) if e.is_recoverable_by_step_reduction() => {
                    debug!(t, h, error = %e, "corrector failed, halving step");
                    stats.rejected += 1;
                    h *= 0.5;
                    continue;
                }
                Err(e) => return Err(e),
            };
            if !all_finite(&y_new) {
                return Err(SimError::IntegrationFailed {
                    what: format!("non-finite state at t = {t_new}"),
                });
            }

            let scale = self.scale(&y, &y_new);
            let err = ((&y_new - &y_pred) * error_const).component_div(&scale);
            let err_norm = err.norm() / (err.len() as f64).sqrt();
            let exponent = -1.0 / (order as f64 + 1.0);

            if err_norm > 1.0 {
                let factor = (SAFETY * err_norm.powf(exponent)).max(MIN_FACTOR);
                debug!(t, h, err_norm, "step rejected");
                stats.rejected += 1;
                h *= factor;
                continue;
            }

            stats.accepted += 1;
            let f_new = system.rhs(t_new, &y_new)?;
            let g_new: Vec<f64> = events.iter().map(|e| e.value(t_new, &y_new)).collect();

            let step = HermiteStep {
                t0: t,
                t1: t_new,
                y0: &y,
                f0: &f,
                y1: &y_new,
                f1: &f_new,
            };
            if let Some(hit) = locate_events(events, &g, &g_new, &step)? {
                debug!(event = %hit.name, t = hit.t, "terminal event");
                // an event already zero at the step start replaces that sample
                if hit.t <= t {
                    ts.pop();
                    ys.pop();
                }
                ts.push(hit.t);
                ys.push(hit.y.clone());
                return Ok(Solution {
                    t: ts,
                    y: ys,
                    termination: Termination::Event {
                        index: hit.index,
                        name: hit.name.clone(),
                    },
                    event: Some(hit),
                    stats,
                });
            }

            ts.push(t_new);
            ys.push(y_new.clone());
            if last {
                return Ok(Solution {
                    t: ts,
                    y: ys,
                    termination: Termination::EndOfSpan,
                    event: None,
                    stats,
                });
            }

            let factor = if err_norm == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * err_norm.powf(exponent)).clamp(MIN_FACTOR, MAX_FACTOR)
            };
            history = Some((t, y));
            t = t_new;
            y = y_new;
            f = f_new;
            g = g_new;
            h *= factor;
        }
    }

    fn scale(&self, a: &DVector<f64>, b: &DVector<f64>) -> DVector<f64> {
        a.zip_map(b, |x, z| {
            self.options.atol + self.options.rtol * x.abs().max(z.abs())
        })
    }

    /// Initial step from the size of the state, its derivative and a
    /// finite-difference estimate of the second derivative.
    fn initial_step<S: OdeSystem>(
        &self,
        system: &S,
        t0: f64,
        y0: &DVector<f64>,
        f0: &DVector<f64>,
    ) -> SimResult<f64> {
        let rms = |v: &DVector<f64>, scale: &DVector<f64>| {
            v.component_div(scale).norm() / (v.len() as f64).sqrt()
        };
        let scale = self.scale(y0, y0);
        let d0 = rms(y0, &scale);
        let d1 = rms(f0, &scale);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };

        let y1 = y0 + f0 * h0;
        let f1 = system.rhs(t0 + h0, &y1)?;
        let d2 = rms(&(f1 - f0), &scale) / h0;

        // first step is order 1
        let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).sqrt()
        };
        Ok((100.0 * h0).min(h1))
    }
}

fn all_finite(v: &DVector<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Cubic Hermite interpolant across one accepted step.
struct HermiteStep<'a> {
    t0: f64,
    t1: f64,
    y0: &'a DVector<f64>,
    f0: &'a DVector<f64>,
    y1: &'a DVector<f64>,
    f1: &'a DVector<f64>,
}

impl HermiteStep<'_> {
    fn eval(&self, t: f64) -> DVector<f64> {
        let h = self.t1 - self.t0;
        let s = (t - self.t0) / h;
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;
        self.y0 * h00 + self.f0 * (h10 * h) + self.y1 * h01 + self.f1 * (h11 * h)
    }
}

/// Earliest event firing inside the step, if any.
fn locate_events(
    events: &[Event],
    g_old: &[f64],
    g_new: &[f64],
    step: &HermiteStep<'_>,
) -> SimResult<Option<EventHit>> {
    let config = BisectionConfig {
        tolerance: 4.0 * f64::EPSILON * step.t1.abs().max(1.0),
        max_iterations: 200,
    };

    let mut first: Option<(usize, f64)> = None;
    for (i, event) in events.iter().enumerate() {
        if !event.triggered(g_old[i], g_new[i]) {
            continue;
        }
        let root = bisect(
            |t| Ok(event.value(t, &step.eval(t))),
            step.t0,
            step.t1,
            &config,
        )?
        .root;
        if first.is_none_or(|(_, t)| root < t) {
            first = Some((i, root));
        }
    }

    Ok(first.map(|(index, t)| EventHit {
        index,
        name: events[index].name().to_string(),
        t,
        y: step.eval(t),
    }))
}
