//! Simulated Annealing (SA).
//!
//! A single-solution trajectory metaheuristic inspired by the physical
//! annealing process. Accepts worsening moves with a probability that
//! decreases over time (temperature), allowing the search to escape
//! local optima.
//!
//! [`SaEngine`] runs several independent trajectories in parallel. They
//! share nothing but a lock-guarded register holding the best solution
//! found so far, which also drives periodic restarts. The cooling strategy
//! is one of seven closed-form schedules, or an adaptive schedule that
//! tunes its cooling rate from the recent acceptance rate.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Cerny (1985), "Thermodynamical Approach to the Travelling Salesman Problem"
//! - Geman & Geman (1984), logarithmic cooling

mod acceptance;
mod adaptive;
mod config;
mod register;
mod restart;
mod runner;
mod schedule;
mod types;
mod worker;

#[cfg(test)]
mod fixtures;

pub use acceptance::{acceptance_probability, metropolis};
pub use adaptive::{AdaptiveController, Adjustment};
pub use config::{AdaptiveConfig, CoolingStrategy, SaConfig};
pub use register::SharedBest;
pub use restart::RestartController;
pub use runner::{ProgressCallback, SaEngine, SaResult, StopCondition};
pub use schedule::{temperature, MIN_TEMPERATURE};
pub use types::SaProblem;
pub use worker::{ProgressFn, StopFn, Termination, WorkerStats};
