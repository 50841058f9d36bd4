//! Error types for annealing runs.

use crate::sa::CoolingStrategy;
use thiserror::Error;

/// Boxed error raised by a problem implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Invalid [`SaConfig`](crate::sa::SaConfig) values.
///
/// Always reported before any worker is spawned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `initial_temperature` is zero, negative, or not finite.
    #[error("initial_temperature must be positive and finite, got {0}")]
    NonPositiveTemperature(f64),

    /// A multiplicative schedule was given a cooling rate outside (0, 1).
    #[error("cooling_rate for {strategy:?} must be in (0, 1), got {rate}")]
    CoolingRateOutOfRange {
        /// Strategy the rate was checked against.
        strategy: CoolingStrategy,
        /// Offending rate.
        rate: f64,
    },

    /// `max_iterations` is zero.
    #[error("max_iterations must be greater than zero")]
    ZeroMaxIterations,

    /// `thread_count` is zero.
    #[error("thread_count must be at least 1")]
    ZeroThreads,

    /// Adaptive controller parameters are inconsistent.
    #[error("invalid adaptive cooling settings: {0}")]
    InvalidAdaptive(String),
}

/// Errors returned by [`SaEngine`](crate::sa::SaEngine).
///
/// Anything other than [`SaError::Config`] and [`SaError::AlreadyRunning`]
/// aborts the whole run. The best solution lodged before the failure stays
/// readable through the engine as a degraded, best-effort result.
#[derive(Debug, Error)]
pub enum SaError {
    /// Configuration rejected before the run started.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The problem's `energy`, `neighbor` or `random_solution` failed.
    #[error("problem evaluation failed in worker {worker}: {source}")]
    Problem {
        /// Index of the failing worker.
        worker: usize,
        /// Error returned by the problem.
        #[source]
        source: BoxError,
    },

    /// The problem returned a NaN energy.
    #[error("problem returned a NaN energy in worker {worker} at iteration {iteration}")]
    NanEnergy {
        /// Index of the failing worker.
        worker: usize,
        /// Iteration at which the energy was computed (0 for the initial solution).
        iteration: usize,
    },

    /// A progress callback or stop condition panicked.
    #[error("callback panicked in worker {worker}: {message}")]
    Callback {
        /// Index of the failing worker.
        worker: usize,
        /// Panic payload, if it was a string.
        message: String,
    },

    /// A worker panicked outside of a callback.
    #[error("worker {worker} panicked: {message}")]
    WorkerPanicked {
        /// Index of the failing worker.
        worker: usize,
        /// Panic payload, if it was a string.
        message: String,
    },

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        /// Index of the worker that could not be started.
        worker: usize,
        /// Error returned by the thread builder.
        #[source]
        source: std::io::Error,
    },

    /// All workers finished but none left a solution in the shared register.
    #[error("no worker produced a solution")]
    NoSolution,

    /// `optimize` was called while another run on the same engine was active.
    #[error("an optimization run is already in progress on this engine")]
    AlreadyRunning,
}

impl SaError {
    pub(crate) fn problem<E>(worker: usize, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SaError::Problem {
            worker,
            source: Box::new(err),
        }
    }

    /// Returns `true` for errors raised before any worker ran.
    pub fn is_config(&self) -> bool {
        matches!(self, SaError::Config(_))
    }

    /// Index of the worker that caused the failure, if any.
    pub fn worker(&self) -> Option<usize> {
        match self {
            SaError::Problem { worker, .. }
            | SaError::NanEnergy { worker, .. }
            | SaError::Callback { worker, .. }
            | SaError::WorkerPanicked { worker, .. }
            | SaError::Spawn { worker, .. } => Some(*worker),
            SaError::Config(_) | SaError::NoSolution | SaError::AlreadyRunning => None,
        }
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
