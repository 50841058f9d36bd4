//! Single annealing trajectory.

use super::acceptance::metropolis;
use super::adaptive::AdaptiveController;
use super::config::{CoolingStrategy, SaConfig};
use super::register::SharedBest;
use super::restart::RestartController;
use super::schedule::{clamp_temperature, temperature};
use super::types::SaProblem;
use crate::error::{panic_message, SaError};
use rand::Rng;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

/// Progress callback: `(iteration, current_energy, current_solution)`.
pub type ProgressFn<'a, S> = dyn Fn(usize, f64, &S) + Send + Sync + 'a;

/// Stop condition: `(iteration, current_energy, current_solution) -> stop`.
pub type StopFn<'a, S> = dyn Fn(usize, f64, &S) -> bool + Send + Sync + 'a;

/// Why a worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Ran all `max_iterations` iterations.
    MaxIterations,
    /// The stop condition returned `true`.
    StopCondition,
    /// The external cancel token was set.
    Cancelled,
    /// A sibling worker failed.
    Aborted,
}

/// Statistics of one worker's trajectory.
#[derive(Debug, Clone)]
pub struct WorkerStats {
    /// Worker index (also its random stream).
    pub worker: usize,

    /// Iterations executed (neighbor evaluations).
    pub iterations: usize,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of accepted moves that lowered the current energy.
    pub improving_moves: usize,

    /// Restart attempts.
    pub restarts: usize,

    /// Restarts that replaced the current solution.
    pub restarts_adopted: usize,

    /// Temperature of the last executed iteration.
    pub final_temperature: f64,

    /// Cooling rate at the end of the run (differs from the configured
    /// rate only for the adaptive strategy).
    pub final_cooling_rate: f64,

    /// Energy of the worker's best solution.
    pub best_energy: f64,

    /// Local best energy sampled every `history_interval` iterations.
    pub best_history: Vec<f64>,

    /// Why the worker stopped.
    pub termination: Termination,
}

/// Result handed back to the engine when a worker terminates.
#[derive(Debug, Clone)]
pub(crate) struct WorkerReport<S> {
    pub best: S,
    pub stats: WorkerStats,
}

/// Everything a worker borrows from the engine for one run.
pub(crate) struct Worker<'h, P: SaProblem> {
    pub index: usize,
    pub problem: &'h P,
    pub config: &'h SaConfig,
    pub register: &'h SharedBest<P::Solution>,
    pub progress: Option<&'h ProgressFn<'h, P::Solution>>,
    pub stop: Option<&'h StopFn<'h, P::Solution>>,
    pub abort: &'h AtomicBool,
    pub cancel: Option<&'h AtomicBool>,
}

impl<P: SaProblem> Worker<'_, P> {
    /// Runs the trajectory until a termination condition holds.
    #[tracing::instrument(level = "debug", name = "sa_worker", skip_all, fields(worker = self.index))]
    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<WorkerReport<P::Solution>, SaError> {
        let config = self.config;

        let mut current = self
            .problem
            .random_solution(rng)
            .map_err(|e| SaError::problem(self.index, e))?;
        let mut current_energy = self.evaluate(&current, 0)?;
        let mut best = current.clone();
        let mut best_energy = current_energy;
        self.publish(best_energy, &best);

        let mut adaptive = (config.cooling_strategy == CoolingStrategy::Adaptive).then(|| {
            AdaptiveController::new(
                config.adaptive.clone(),
                config.initial_temperature,
                config.cooling_rate,
            )
        });
        let mut restart = RestartController::new(config.restart_interval);

        let mut iterations = 0usize;
        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;
        let mut temp = clamp_temperature(config.initial_temperature);
        let mut best_history = Vec::new();
        let mut termination = Termination::MaxIterations;

        for iteration in 0..config.max_iterations {
            if self.abort.load(Ordering::Relaxed) {
                termination = Termination::Aborted;
                break;
            }
            if self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                termination = Termination::Cancelled;
                break;
            }

            temp = match &adaptive {
                Some(ctl) => ctl.temperature(),
                None => temperature(iteration, config),
            };

            let candidate = self
                .problem
                .neighbor(&current, rng)
                .map_err(|e| SaError::problem(self.index, e))?;
            let candidate_energy = self.evaluate(&candidate, iteration)?;

            let accepted = metropolis(current_energy, candidate_energy, temp, rng);
            if accepted {
                if candidate_energy < current_energy {
                    improving_moves += 1;
                }
                current = candidate;
                current_energy = candidate_energy;
                accepted_moves += 1;
            }
            if let Some(ctl) = adaptive.as_mut() {
                if let Some(adjustment) = ctl.record(accepted) {
                    tracing::trace!(
                        iteration,
                        ?adjustment,
                        rate = ctl.rate(),
                        "cooling rate adjusted"
                    );
                }
            }

            if current_energy < best_energy {
                best = current.clone();
                best_energy = current_energy;
                self.publish(best_energy, &best);
            }

            iterations = iteration + 1;
            if config.history_interval > 0 && iterations.is_multiple_of(config.history_interval) {
                best_history.push(best_energy);
            }

            self.report_progress(iteration, current_energy, &current)?;
            if self.should_stop(iteration, current_energy, &current)? {
                termination = Termination::StopCondition;
                break;
            }
            if iterations == config.max_iterations {
                break;
            }

            if restart.tick() {
                let fresh = self
                    .problem
                    .random_solution(rng)
                    .map_err(|e| SaError::problem(self.index, e))?;
                let fresh_energy = self.evaluate(&fresh, iteration)?;
                let adopted = restart.offer(fresh, fresh_energy, self.register);
                if let Some((solution, energy)) = adopted {
                    debug_assert!(energy < current_energy);
                    tracing::trace!(iteration, energy, "restart adopted");
                    current = solution;
                    current_energy = energy;
                    best = current.clone();
                    best_energy = energy;
                }
            }

            if let Some(ctl) = adaptive.as_mut() {
                ctl.cool();
            }
        }

        let final_cooling_rate = adaptive
            .as_ref()
            .map_or(config.cooling_rate, AdaptiveController::rate);

        tracing::debug!(
            iterations,
            accepted_moves,
            best_energy,
            ?termination,
            "worker finished"
        );

        Ok(WorkerReport {
            best,
            stats: WorkerStats {
                worker: self.index,
                iterations,
                accepted_moves,
                improving_moves,
                restarts: restart.attempts(),
                restarts_adopted: restart.adopted(),
                final_temperature: temp,
                final_cooling_rate,
                best_energy,
                best_history,
                termination,
            },
        })
    }

    fn evaluate(&self, solution: &P::Solution, iteration: usize) -> Result<f64, SaError> {
        let energy = self
            .problem
            .energy(solution)
            .map_err(|e| SaError::problem(self.index, e))?;
        if energy.is_nan() {
            return Err(SaError::NanEnergy {
                worker: self.index,
                iteration,
            });
        }
        Ok(energy)
    }

    /// Offers a new local best to the register, cloning only if it can win.
    fn publish(&self, energy: f64, solution: &P::Solution) {
        if energy <= self.register.best_energy() {
            self.register.try_improve(energy, solution.clone());
        }
    }

    fn report_progress(
        &self,
        iteration: usize,
        energy: f64,
        solution: &P::Solution,
    ) -> Result<(), SaError> {
        if let Some(callback) = self.progress {
            panic::catch_unwind(AssertUnwindSafe(|| callback(iteration, energy, solution)))
                .map_err(|payload| self.callback_error(payload.as_ref()))?;
        }
        Ok(())
    }

    fn should_stop(
        &self,
        iteration: usize,
        energy: f64,
        solution: &P::Solution,
    ) -> Result<bool, SaError> {
        match self.stop {
            Some(condition) => {
                panic::catch_unwind(AssertUnwindSafe(|| condition(iteration, energy, solution)))
                    .map_err(|payload| self.callback_error(payload.as_ref()))
            }
            None => Ok(false),
        }
    }

    fn callback_error(&self, payload: &(dyn std::any::Any + Send)) -> SaError {
        SaError::Callback {
            worker: self.index,
            message: panic_message(payload),
        }
    }
}
