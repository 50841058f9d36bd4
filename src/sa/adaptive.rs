//! Acceptance-rate driven cooling for [`CoolingStrategy::Adaptive`].
//!
//! Each worker owns one controller. It keeps the outcome of the last
//! `window` moves and, after every `window` recorded moves, nudges the
//! cooling rate: a search that almost never accepts is cooling too fast, one
//! that accepts most moves is still wandering and can cool faster.
//!
//! [`CoolingStrategy::Adaptive`]: super::CoolingStrategy::Adaptive

use super::config::AdaptiveConfig;
use super::schedule::clamp_temperature;
use std::collections::VecDeque;

/// Lowest cooling rate the controller will use.
pub const MIN_RATE: f64 = 1e-6;

/// Highest cooling rate the controller will use.
pub const MAX_RATE: f64 = 1.0 - 1e-6;

/// Direction of a cooling-rate adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Rate moved toward 1.
    Slower,
    /// Rate moved toward 0.
    Faster,
}

/// Per-worker adaptive cooling state.
#[derive(Debug, Clone)]
pub struct AdaptiveController {
    settings: AdaptiveConfig,
    rate: f64,
    temperature: f64,
    outcomes: VecDeque<bool>,
    accepted_in_window: usize,
    since_adjustment: usize,
}

impl AdaptiveController {
    /// Creates a controller starting at `initial_temperature`.
    ///
    /// `initial_rate` is clamped into `[MIN_RATE, MAX_RATE]`.
    pub fn new(settings: AdaptiveConfig, initial_temperature: f64, initial_rate: f64) -> Self {
        let window = settings.window.max(1);
        Self {
            settings,
            rate: clamp_rate(initial_rate),
            temperature: clamp_temperature(initial_temperature),
            outcomes: VecDeque::with_capacity(window),
            accepted_in_window: 0,
            since_adjustment: 0,
        }
    }

    /// Current effective cooling rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Current temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Acceptance rate over the recorded window, `None` before any move.
    pub fn acceptance_rate(&self) -> Option<f64> {
        if self.outcomes.is_empty() {
            None
        } else {
            Some(self.accepted_in_window as f64 / self.outcomes.len() as f64)
        }
    }

    /// Records one move outcome and adjusts the rate when a window completes.
    pub fn record(&mut self, accepted: bool) -> Option<Adjustment> {
        let window = self.settings.window.max(1);
        if self.outcomes.len() == window {
            if let Some(true) = self.outcomes.pop_front() {
                self.accepted_in_window -= 1;
            }
        }
        self.outcomes.push_back(accepted);
        if accepted {
            self.accepted_in_window += 1;
        }

        self.since_adjustment += 1;
        if self.since_adjustment < window {
            return None;
        }
        self.since_adjustment = 0;

        let rate = self.accepted_in_window as f64 / self.outcomes.len() as f64;
        let step = self.settings.step;
        if rate < self.settings.low_acceptance {
            self.rate = clamp_rate(self.rate + step * (1.0 - self.rate));
            Some(Adjustment::Slower)
        } else if rate > self.settings.high_acceptance {
            self.rate = clamp_rate(self.rate - step * self.rate);
            Some(Adjustment::Faster)
        } else {
            None
        }
    }

    /// Applies one cooling step at the current rate.
    pub fn cool(&mut self) {
        self.temperature = clamp_temperature(self.temperature * self.rate);
    }
}

/// Clamps a cooling rate into `[MIN_RATE, MAX_RATE]`. NaN maps to `MAX_RATE`.
pub(crate) fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        return MAX_RATE;
    }
    rate.clamp(MIN_RATE, MAX_RATE)
}
