//! SA configuration and cooling strategies.

use crate::error::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cooling strategy mapping an iteration index to a temperature.
///
/// With `T0` the initial temperature, `a` the cooling rate and `t` the
/// iteration index (from 0):
///
/// | Strategy | Temperature |
/// |---|---|
/// | `Linear` | `T0 * max(0, 1 - t / max_iterations)` |
/// | `Exponential` | `T0 * a^t` |
/// | `Logarithmic` | `T0 / ln(t + 2)` |
/// | `Geometric` | `T0 / (1 + a * t)` |
/// | `Quadratic` | `T0 / (1 + a * t^2)` |
/// | `Hyperbolic` | `T0 / (1 + a * sqrt(t))` |
/// | `Adaptive` | `T0 * a_0 * a_1 * ... * a_{t-1}`, with `a` tuned per worker |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CoolingStrategy {
    /// Fixed-duration cooling down to the temperature floor at `max_iterations`.
    Linear,

    /// Multiplicative cooling. Most widely used; typical rate 0.95–0.999.
    #[default]
    Exponential,

    /// Classic logarithmic schedule (Geman & Geman). Very slow; ignores the rate.
    Logarithmic,

    /// Inverse-linear cooling.
    Geometric,

    /// Inverse-quadratic cooling. Drops fast after the first few iterations.
    Quadratic,

    /// Inverse square-root cooling.
    Hyperbolic,

    /// Multiplicative cooling whose rate follows the recent acceptance rate.
    ///
    /// Each worker tracks its own running temperature, so
    /// [`temperature`](super::temperature) gives only the baseline `T0 * a^t`
    /// before the first rate adjustment. Read a worker's actual value from
    /// [`AdaptiveController::temperature`](super::AdaptiveController::temperature)
    /// or [`WorkerStats::final_temperature`](super::WorkerStats::final_temperature).
    /// See [`AdaptiveConfig`].
    Adaptive,
}

impl CoolingStrategy {
    /// All strategies, in declaration order.
    pub const ALL: [CoolingStrategy; 7] = [
        CoolingStrategy::Linear,
        CoolingStrategy::Exponential,
        CoolingStrategy::Logarithmic,
        CoolingStrategy::Geometric,
        CoolingStrategy::Quadratic,
        CoolingStrategy::Hyperbolic,
        CoolingStrategy::Adaptive,
    ];

    /// Whether `cooling_rate` must lie in (0, 1) for this strategy.
    ///
    /// `Linear` does not use the rate; `Adaptive` clamps it on its own.
    pub fn requires_unit_rate(self) -> bool {
        !matches!(self, CoolingStrategy::Linear | CoolingStrategy::Adaptive)
    }
}

/// Parameters of the adaptive cooling controller.
///
/// Only read when the strategy is [`CoolingStrategy::Adaptive`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdaptiveConfig {
    /// Number of recent moves the acceptance rate is measured over.
    pub window: usize,

    /// Below this acceptance rate the cooling rate moves toward 1 (slower cooling).
    pub low_acceptance: f64,

    /// Above this acceptance rate the cooling rate moves toward 0 (faster cooling).
    pub high_acceptance: f64,

    /// Fraction of the remaining distance the rate moves per adjustment, in (0, 1).
    pub step: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            window: 100,
            low_acceptance: 0.05,
            high_acceptance: 0.60,
            step: 0.1,
        }
    }
}

impl AdaptiveConfig {
    /// Validates the controller parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window == 0 {
            return Err(ConfigError::InvalidAdaptive(
                "window must be greater than zero".into(),
            ));
        }
        let in_unit = |x: f64| (0.0..=1.0).contains(&x);
        if !in_unit(self.low_acceptance)
            || !in_unit(self.high_acceptance)
            || self.low_acceptance >= self.high_acceptance
        {
            return Err(ConfigError::InvalidAdaptive(format!(
                "need 0 <= low_acceptance < high_acceptance <= 1, got {} and {}",
                self.low_acceptance, self.high_acceptance
            )));
        }
        if !(self.step > 0.0 && self.step < 1.0) {
            return Err(ConfigError::InvalidAdaptive(format!(
                "step must be in (0, 1), got {}",
                self.step
            )));
        }
        Ok(())
    }
}

/// Configuration for a Simulated Annealing run.
///
/// Immutable once a run starts; the engine validates it on construction.
///
/// # Examples
///
/// ```
/// use u_anneal::sa::{CoolingStrategy, SaConfig};
///
/// let config = SaConfig::default()
///     .with_initial_temperature(100.0)
///     .with_cooling_strategy(CoolingStrategy::Exponential)
///     .with_cooling_rate(0.995)
///     .with_max_iterations(20_000)
///     .with_restart_interval(2_000)
///     .with_thread_count(4)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SaConfig {
    /// Starting temperature `T0`. Higher values allow more exploration.
    pub initial_temperature: f64,

    /// Cooling rate `a`. Must be in (0, 1) for multiplicative strategies.
    pub cooling_rate: f64,

    /// Iterations executed by each worker.
    pub max_iterations: usize,

    /// Cooling strategy.
    pub cooling_strategy: CoolingStrategy,

    /// Iterations between restart attempts. 0 disables restarts.
    pub restart_interval: usize,

    /// Number of parallel workers.
    pub thread_count: usize,

    /// Adaptive controller parameters.
    pub adaptive: AdaptiveConfig,

    /// Sampling period of each worker's best-energy trace. 0 disables it.
    pub history_interval: usize,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            cooling_rate: 0.995,
            max_iterations: 10_000,
            cooling_strategy: CoolingStrategy::default(),
            restart_interval: 0,
            thread_count: 1,
            adaptive: AdaptiveConfig::default(),
            history_interval: 100,
            seed: None,
        }
    }
}

impl SaConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_cooling_strategy(mut self, strategy: CoolingStrategy) -> Self {
        self.cooling_strategy = strategy;
        self
    }

    pub fn with_restart_interval(mut self, n: usize) -> Self {
        self.restart_interval = n;
        self
    }

    pub fn with_thread_count(mut self, n: usize) -> Self {
        self.thread_count = n;
        self
    }

    pub fn with_adaptive(mut self, adaptive: AdaptiveConfig) -> Self {
        self.adaptive = adaptive;
        self
    }

    pub fn with_history_interval(mut self, n: usize) -> Self {
        self.history_interval = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_temperature > 0.0 && self.initial_temperature.is_finite()) {
            return Err(ConfigError::NonPositiveTemperature(self.initial_temperature));
        }
        if self.cooling_strategy.requires_unit_rate()
            && !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0)
        {
            return Err(ConfigError::CoolingRateOutOfRange {
                strategy: self.cooling_strategy,
                rate: self.cooling_rate,
            });
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroMaxIterations);
        }
        if self.thread_count == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if self.cooling_strategy == CoolingStrategy::Adaptive {
            self.adaptive.validate()?;
        }
        Ok(())
    }
}
