//! Periodic restarts from fresh random solutions.

use super::register::SharedBest;

/// Per-worker restart bookkeeping.
///
/// A restart offers a freshly drawn random solution to the shared register.
/// The worker jumps to it only if it beats the global best, which is never
/// worse than the worker's own current energy, so a restart cannot make the
/// trajectory worse.
#[derive(Debug, Clone)]
pub struct RestartController {
    interval: usize,
    since_last: usize,
    attempts: usize,
    adopted: usize,
}

impl RestartController {
    /// `interval == 0` disables restarts.
    pub fn new(interval: usize) -> Self {
        Self {
            interval,
            since_last: 0,
            attempts: 0,
            adopted: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.interval > 0
    }

    /// Counts one finished iteration. Returns `true` when a restart is due.
    pub fn tick(&mut self) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.since_last += 1;
        self.since_last >= self.interval
    }

    /// Iterations since the last restart attempt.
    pub fn since_last(&self) -> usize {
        self.since_last
    }

    /// Restart attempts so far.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Restarts whose solution the worker adopted.
    pub fn adopted(&self) -> usize {
        self.adopted
    }

    /// Offers an evaluated random solution to the register.
    ///
    /// Returns the solution to adopt if it improved the global best.
    /// The counter is reset either way.
    pub fn offer<S: Clone>(
        &mut self,
        candidate: S,
        energy: f64,
        register: &SharedBest<S>,
    ) -> Option<(S, f64)> {
        self.since_last = 0;
        self.attempts += 1;
        if register.try_improve(energy, candidate.clone()) {
            self.adopted += 1;
            Some((candidate, energy))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_never_due() {
        let mut ctl = RestartController::new(0);
        assert!(!ctl.is_enabled());
        for _ in 0..100 {
            assert!(!ctl.tick());
        }
        assert_eq!(ctl.since_last(), 0);
    }

    #[test]
    fn test_due_every_interval() {
        let mut ctl = RestartController::new(3);
        assert!(!ctl.tick());
        assert!(!ctl.tick());
        assert!(ctl.tick());

        let reg = SharedBest::new();
        reg.try_improve(1.0, 0u8);
        assert!(ctl.offer(9u8, 5.0, &reg).is_none());
        assert_eq!(ctl.since_last(), 0);
        assert!(!ctl.tick());
        assert!(!ctl.tick());
        assert!(ctl.tick());
    }

    #[test]
    fn test_adopts_only_global_improvement() {
        let mut ctl = RestartController::new(1);
        let reg = SharedBest::new();
        reg.try_improve(10.0, "incumbent");

        assert_eq!(ctl.offer("worse", 12.0, &reg), None);
        assert_eq!(ctl.offer("tie", 10.0, &reg), None);
        assert_eq!(ctl.offer("better", 4.0, &reg), Some(("better", 4.0)));
        assert_eq!(reg.snapshot(), Some(("better", 4.0)));
        assert_eq!(ctl.attempts(), 3);
        assert_eq!(ctl.adopted(), 1);
    }
}
