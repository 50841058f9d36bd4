//! Shared best-solution register.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
struct BestSlot<S> {
    solution: Option<S>,
    energy: f64,
    history: Vec<f64>,
}

impl<S> BestSlot<S> {
    fn empty() -> Self {
        Self {
            solution: None,
            energy: f64::INFINITY,
            history: Vec::new(),
        }
    }
}

/// Lowest-energy solution found by any worker of a run.
///
/// The stored energy never increases between [`reset`](Self::reset) calls.
/// Updates go through one short critical section; the current energy is
/// mirrored in an atomic so readers never lock and worse candidates skip it.
#[derive(Debug)]
pub struct SharedBest<S> {
    slot: Mutex<BestSlot<S>>,
    energy_bits: AtomicU64,
}

impl<S: Clone> SharedBest<S> {
    /// Creates an empty register with energy `+inf`.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(BestSlot::empty()),
            energy_bits: AtomicU64::new(f64::INFINITY.to_bits()),
        }
    }

    /// Replaces the stored solution if `energy` is strictly lower.
    ///
    /// An empty register accepts any non-NaN energy. Returns whether the
    /// register changed. Ties keep the solution already stored.
    pub fn try_improve(&self, energy: f64, solution: S) -> bool {
        if energy.is_nan() {
            return false;
        }
        // The mirror only ever decreases, so a stale read is >= the locked value.
        if energy > self.best_energy() {
            return false;
        }

        let mut slot = self.slot.lock();
        if slot.solution.is_some() && energy >= slot.energy {
            return false;
        }
        slot.solution = Some(solution);
        slot.energy = energy;
        slot.history.push(energy);
        self.energy_bits.store(energy.to_bits(), Ordering::Release);
        true
    }

    /// Best energy seen so far; a snapshot if workers are still running.
    pub fn best_energy(&self) -> f64 {
        f64::from_bits(self.energy_bits.load(Ordering::Acquire))
    }

    /// Clone of the best solution and its energy.
    pub fn snapshot(&self) -> Option<(S, f64)> {
        let slot = self.slot.lock();
        slot.solution.clone().map(|s| (s, slot.energy))
    }

    /// Energies of every accepted improvement, in order.
    pub fn history(&self) -> Vec<f64> {
        self.slot.lock().history.clone()
    }

    /// Empties the register for a new run.
    pub fn reset(&self) {
        let mut slot = self.slot.lock();
        *slot = BestSlot::empty();
        self.energy_bits.store(f64::INFINITY.to_bits(), Ordering::Release);
    }
}

impl<S: Clone> Default for SharedBest<S> {
    fn default() -> Self {
        Self::new()
    }
}
