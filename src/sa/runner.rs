//! SA engine: configuration, worker spawning and reconciliation.

use super::config::SaConfig;
use super::register::SharedBest;
use super::types::SaProblem;
use super::worker::{ProgressFn, StopFn, Termination, Worker, WorkerReport, WorkerStats};
use crate::error::{panic_message, ConfigError, SaError};
use crate::random::worker_rng;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Boxed progress callback.
pub type ProgressCallback<'a, S> = Box<ProgressFn<'a, S>>;

/// Boxed stop condition.
pub type StopCondition<'a, S> = Box<StopFn<'a, S>>;

/// Result of a Simulated Annealing run.
#[derive(Debug, Clone)]
pub struct SaResult<S: Clone> {
    /// The best solution found by any worker.
    pub best: S,

    /// Energy of the best solution.
    pub best_energy: f64,

    /// Total iterations over all workers.
    pub iterations: usize,

    /// Per-worker statistics, ordered by worker index.
    pub workers: Vec<WorkerStats>,

    /// Every improvement of the shared best energy, in order.
    pub improvement_history: Vec<f64>,

    /// Whether cancelled externally.
    pub cancelled: bool,
}

impl<S: Clone> SaResult<S> {
    /// Accepted moves over all workers.
    pub fn accepted_moves(&self) -> usize {
        self.workers.iter().map(|w| w.accepted_moves).sum()
    }

    /// Fraction of proposed moves that were accepted.
    pub fn acceptance_ratio(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.accepted_moves() as f64 / self.iterations as f64
        }
    }

    /// Runs the problem's own feasibility check on the best solution.
    pub fn is_valid<P>(&self, problem: &P) -> bool
    where
        P: SaProblem<Solution = S>,
    {
        problem.validate(&self.best)
    }
}

/// Runs parallel Simulated Annealing on a borrowed problem.
///
/// Each of `thread_count` workers follows its own trajectory with its own
/// random stream. Workers share only the best solution found so far.
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use std::convert::Infallible;
/// use u_anneal::sa::{SaConfig, SaEngine, SaProblem};
///
/// struct Parabola;
///
/// impl SaProblem for Parabola {
///     type Solution = f64;
///     type Error = Infallible;
///
///     fn random_solution<R: Rng>(&self, rng: &mut R) -> Result<f64, Infallible> {
///         Ok(rng.random_range(-10.0..10.0))
///     }
///     fn energy(&self, x: &f64) -> Result<f64, Infallible> {
///         Ok((x - 3.0) * (x - 3.0))
///     }
///     fn neighbor<R: Rng>(&self, x: &f64, rng: &mut R) -> Result<f64, Infallible> {
///         Ok(x + rng.random_range(-0.5..0.5))
///     }
/// }
///
/// let config = SaConfig::default()
///     .with_initial_temperature(10.0)
///     .with_max_iterations(5_000)
///     .with_thread_count(2)
///     .with_seed(7);
/// let engine = SaEngine::new(&Parabola, config).unwrap();
/// let result = engine.optimize().unwrap();
/// assert!((result.best - 3.0).abs() < 0.5);
/// assert_eq!(engine.best_energy(), result.best_energy);
/// ```
pub struct SaEngine<'a, P: SaProblem> {
    problem: &'a P,
    config: SaConfig,
    progress: Option<ProgressCallback<'a, P::Solution>>,
    stop: Option<StopCondition<'a, P::Solution>>,
    best: SharedBest<P::Solution>,
    running: AtomicBool,
    stack_size: Option<usize>,
}

impl<'a, P: SaProblem> SaEngine<'a, P> {
    /// Validates `config` and creates an engine. Nothing runs yet.
    pub fn new(problem: &'a P, config: SaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            problem,
            config,
            progress: None,
            stop: None,
            best: SharedBest::new(),
            running: AtomicBool::new(false),
            stack_size: None,
        })
    }

    /// Sets the callback invoked after every iteration of every worker.
    ///
    /// Called concurrently when more than one worker runs. A panic inside
    /// it aborts the run with [`SaError::Callback`].
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, f64, &P::Solution) + Send + Sync + 'a,
    {
        self.set_progress_callback(callback);
        self
    }

    pub fn set_progress_callback<F>(&mut self, callback: F)
    where
        F: Fn(usize, f64, &P::Solution) + Send + Sync + 'a,
    {
        self.progress = Some(Box::new(callback));
    }

    /// Sets the condition each worker checks after every iteration.
    ///
    /// Returning `true` stops only the calling worker. For a run-wide stop,
    /// capture a shared flag in the closure. Called concurrently when more
    /// than one worker runs.
    pub fn with_stop_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(usize, f64, &P::Solution) -> bool + Send + Sync + 'a,
    {
        self.set_stop_condition(condition);
        self
    }

    pub fn set_stop_condition<F>(&mut self, condition: F)
    where
        F: Fn(usize, f64, &P::Solution) -> bool + Send + Sync + 'a,
    {
        self.stop = Some(Box::new(condition));
    }

    /// Sets the stack size, in bytes, of spawned worker threads.
    ///
    /// Defaults to the platform's thread default. A single-worker run stays
    /// on the calling thread and ignores it.
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    pub fn config(&self) -> &SaConfig {
        &self.config
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Runs with `config.thread_count` workers.
    pub fn optimize(&self) -> Result<SaResult<P::Solution>, SaError> {
        self.execute(self.config.thread_count, None)
    }

    /// Runs with `thread_count` workers instead of the configured count.
    pub fn optimize_with_threads(
        &self,
        thread_count: usize,
    ) -> Result<SaResult<P::Solution>, SaError> {
        self.execute(thread_count, None)
    }

    /// Runs with an optional cancellation token checked by every worker
    /// before each iteration.
    pub fn optimize_with_cancel(
        &self,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SaResult<P::Solution>, SaError> {
        self.execute(self.config.thread_count, cancel.as_deref())
    }

    /// Best energy of the current or last run (`+inf` before any run).
    ///
    /// During a run this is a snapshot. After a failed run it is the best
    /// energy reached before the failure, a degraded result.
    pub fn best_energy(&self) -> f64 {
        self.best.best_energy()
    }

    /// Best solution of the current or last run, see [`best_energy`](Self::best_energy).
    pub fn best_solution(&self) -> Option<P::Solution> {
        self.best.snapshot().map(|(solution, _)| solution)
    }

    fn execute(
        &self,
        thread_count: usize,
        cancel: Option<&AtomicBool>,
    ) -> Result<SaResult<P::Solution>, SaError> {
        if thread_count == 0 {
            return Err(ConfigError::ZeroThreads.into());
        }
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(SaError::AlreadyRunning);
        }
        let _running = RunningGuard(&self.running);

        self.best.reset();
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let started = Instant::now();
        tracing::info!(
            threads = thread_count,
            strategy = ?self.config.cooling_strategy,
            max_iterations = self.config.max_iterations,
            seed,
            "annealing run started"
        );

        let abort = AtomicBool::new(false);
        let outcomes: Vec<Result<WorkerReport<P::Solution>, SaError>> = if thread_count == 1 {
            vec![self.run_worker(0, seed, &abort, cancel)]
        } else {
            thread::scope(|s| {
                let mut handles = Vec::with_capacity(thread_count);
                let mut spawn_error = None;
                for index in 0..thread_count {
                    let abort = &abort;
                    let spawned = self
                        .worker_thread(index)
                        .spawn_scoped(s, move || self.run_worker(index, seed, abort, cancel));
                    match spawned {
                        Ok(handle) => handles.push(handle),
                        Err(source) => {
                            abort.store(true, Ordering::Relaxed);
                            tracing::warn!(
                                worker = index,
                                error = %source,
                                "failed to spawn worker, aborting run"
                            );
                            spawn_error = Some(SaError::Spawn {
                                worker: index,
                                source,
                            });
                            break;
                        }
                    }
                }
                let mut outcomes: Vec<_> = handles
                    .into_iter()
                    .enumerate()
                    .map(|(index, handle)| {
                        handle.join().unwrap_or_else(|payload| {
                            Err(SaError::WorkerPanicked {
                                worker: index,
                                message: panic_message(payload.as_ref()),
                            })
                        })
                    })
                    .collect();
                outcomes.extend(spawn_error.map(Err));
                outcomes
            })
        };

        let mut reports = Vec::with_capacity(thread_count);
        for outcome in outcomes {
            reports.push(outcome?);
        }

        // Reconcile local bests; workers already published, so this is a no-op
        // unless a worker returned without publishing.
        for report in &reports {
            if report.stats.best_energy <= self.best.best_energy() {
                self.best.try_improve(report.stats.best_energy, report.best.clone());
            }
        }

        let (best, best_energy) = self.best.snapshot().ok_or(SaError::NoSolution)?;
        let workers: Vec<WorkerStats> = reports.into_iter().map(|r| r.stats).collect();
        let iterations = workers.iter().map(|w| w.iterations).sum();
        let cancelled = workers.iter().any(|w| w.termination == Termination::Cancelled);

        tracing::info!(
            best_energy,
            iterations,
            cancelled,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "annealing run finished"
        );

        Ok(SaResult {
            best,
            best_energy,
            iterations,
            workers,
            improvement_history: self.best.history(),
            cancelled,
        })
    }

    fn worker_thread(&self, index: usize) -> thread::Builder {
        let builder = thread::Builder::new().name(format!("sa-worker-{index}"));
        match self.stack_size {
            Some(bytes) => builder.stack_size(bytes),
            None => builder,
        }
    }

    /// Runs one worker, converting panics to errors and raising the abort
    /// flag on failure so siblings stop at their next iteration.
    fn run_worker(
        &self,
        index: usize,
        seed: u64,
        abort: &AtomicBool,
        cancel: Option<&AtomicBool>,
    ) -> Result<WorkerReport<P::Solution>, SaError> {
        let worker = Worker {
            index,
            problem: self.problem,
            config: &self.config,
            register: &self.best,
            progress: self.progress.as_deref(),
            stop: self.stop.as_deref(),
            abort,
            cancel,
        };
        let mut rng = worker_rng(seed, index);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| worker.run(&mut rng)))
            .unwrap_or_else(|payload| {
                Err(SaError::WorkerPanicked {
                    worker: index,
                    message: panic_message(payload.as_ref()),
                })
            });

        if let Err(err) = &outcome {
            abort.store(true, Ordering::Relaxed);
            tracing::warn!(worker = index, error = %err, "worker failed, aborting run");
        }
        outcome
    }
}

/// Clears the running flag when a run ends, including on early return.
struct RunningGuard<'r>(&'r AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
