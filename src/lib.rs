//! Domain-agnostic parallel Simulated Annealing.
//!
//! - **Problem contract**: [`sa::SaProblem`] supplies random solutions,
//!   neighbors and energies. Everything domain-specific lives there.
//! - **Cooling**: seven schedules (linear, exponential, logarithmic,
//!   geometric, quadratic, hyperbolic, adaptive), see [`sa::CoolingStrategy`].
//! - **Parallel search**: [`sa::SaEngine`] runs independent workers that
//!   publish improvements to one shared best-solution register.
//! - **Robustness**: periodic restarts, adaptive cooling, cooperative
//!   cancellation, and run-wide abort when a worker fails.
//!
//! The engine logs through [`tracing`] and installs no subscriber.

pub mod error;
pub mod random;
pub mod sa;

pub use error::{ConfigError, SaError};
