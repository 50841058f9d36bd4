//! Cooling schedules.

use super::adaptive::clamp_rate;
use super::config::{CoolingStrategy, SaConfig};

/// Lowest temperature any schedule returns.
///
/// Keeps the Metropolis ratio `delta / T` finite.
pub const MIN_TEMPERATURE: f64 = 1e-10;

/// Temperature at `iteration` for the configured strategy.
///
/// Pure in `(iteration, config)`.
///
/// For [`CoolingStrategy::Adaptive`] this is only the baseline
/// `T0 * a^t`, with `a` clamped the way the controller clamps it. A worker
/// follows it until the controller first adjusts the rate; from then on
/// the worker's temperature is [`AdaptiveController::temperature`], which
/// this function cannot know.
///
/// [`AdaptiveController::temperature`]: super::AdaptiveController::temperature
///
/// # Examples
///
/// ```
/// use u_anneal::sa::{temperature, CoolingStrategy, SaConfig};
///
/// let config = SaConfig::default()
///     .with_initial_temperature(100.0)
///     .with_cooling_rate(0.95)
///     .with_cooling_strategy(CoolingStrategy::Exponential);
/// let t = temperature(10, &config);
/// assert!((t - 100.0 * 0.95f64.powi(10)).abs() < 1e-9);
/// ```
pub fn temperature(iteration: usize, config: &SaConfig) -> f64 {
    let t0 = config.initial_temperature;
    let alpha = config.cooling_rate;
    let t = iteration as f64;

    let raw = match config.cooling_strategy {
        CoolingStrategy::Linear => {
            let progress = t / config.max_iterations.max(1) as f64;
            t0 * (1.0 - progress).max(0.0)
        }
        CoolingStrategy::Exponential => t0 * alpha.powf(t),
        CoolingStrategy::Adaptive => t0 * clamp_rate(alpha).powf(t),
        CoolingStrategy::Logarithmic => t0 / (t + 2.0).ln(),
        CoolingStrategy::Geometric => t0 / (1.0 + alpha * t),
        CoolingStrategy::Quadratic => t0 / (1.0 + alpha * t * t),
        CoolingStrategy::Hyperbolic => t0 / (1.0 + alpha * t.sqrt()),
    };

    clamp_temperature(raw)
}

/// Clamps a temperature to [`MIN_TEMPERATURE`]. NaN maps to the floor.
pub(crate) fn clamp_temperature(t: f64) -> f64 {
    if t >= MIN_TEMPERATURE {
        t
    } else {
        MIN_TEMPERATURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config(strategy: CoolingStrategy, rate: f64) -> SaConfig {
        SaConfig::default()
            .with_initial_temperature(100.0)
            .with_cooling_rate(rate)
            .with_cooling_strategy(strategy)
            .with_max_iterations(1000)
    }

    #[test]
    fn test_exponential_iteration_ten() {
        let t = temperature(10, &config(CoolingStrategy::Exponential, 0.95));
        assert!((t - 59.873_693_923_837_9).abs() < 1e-9, "got {t}");
    }

    #[test]
    fn test_all_start_at_initial_temperature() {
        for strategy in CoolingStrategy::ALL {
            let t = temperature(0, &config(strategy, 0.9));
            let expected = match strategy {
                CoolingStrategy::Logarithmic => 100.0 / 2f64.ln(),
                _ => 100.0,
            };
            assert!((t - expected).abs() < 1e-9, "{strategy:?}: {t}");
        }
    }

    #[test]
    fn test_formulas() {
        let t = 16usize;
        let g = temperature(t, &config(CoolingStrategy::Geometric, 0.5));
        assert!((g - 100.0 / 9.0).abs() < 1e-9);

        let q = temperature(t, &config(CoolingStrategy::Quadratic, 0.5));
        assert!((q - 100.0 / 129.0).abs() < 1e-9);

        let h = temperature(t, &config(CoolingStrategy::Hyperbolic, 0.5));
        assert!((h - 100.0 / 3.0).abs() < 1e-9);

        let l = temperature(t, &config(CoolingStrategy::Logarithmic, 0.5));
        assert!((l - 100.0 / 18f64.ln()).abs() < 1e-9);

        let lin = temperature(250, &config(CoolingStrategy::Linear, 0.5));
        assert!((lin - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_hits_floor_at_budget() {
        let cfg = config(CoolingStrategy::Linear, 0.5);
        assert_eq!(temperature(1000, &cfg), MIN_TEMPERATURE);
        assert_eq!(temperature(5000, &cfg), MIN_TEMPERATURE);
        assert!(temperature(999, &cfg) > MIN_TEMPERATURE);
    }

    #[test]
    fn test_exponential_underflow_is_clamped() {
        let t = temperature(1_000_000, &config(CoolingStrategy::Exponential, 0.5));
        assert_eq!(t, MIN_TEMPERATURE);
    }

    #[test]
    fn test_clamp_nan() {
        assert_eq!(clamp_temperature(f64::NAN), MIN_TEMPERATURE);
        assert_eq!(clamp_temperature(-3.0), MIN_TEMPERATURE);
        assert_eq!(clamp_temperature(2.0), 2.0);
    }

    #[test]
    fn test_adaptive_baseline_matches_untouched_controller() {
        use crate::sa::AdaptiveController;

        for rate in [0.9, 1.5] {
            let cfg = config(CoolingStrategy::Adaptive, rate);
            let mut ctl = AdaptiveController::new(cfg.adaptive.clone(), 100.0, rate);
            for t in 0..50 {
                let expected = ctl.temperature();
                let got = temperature(t, &cfg);
                assert!((got - expected).abs() <= 1e-9 * expected, "t={t}: {got} vs {expected}");
                ctl.cool();
            }
            assert!(temperature(49, &cfg) <= 100.0);
        }
    }

    fn strategy() -> impl Strategy<Value = CoolingStrategy> {
        prop::sample::select(CoolingStrategy::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_temperature_positive(
            s in strategy(),
            t0 in 1e-3f64..1e6,
            rate in 0.001f64..0.999,
            iter in 0usize..100_000,
        ) {
            let cfg = SaConfig::default()
                .with_initial_temperature(t0)
                .with_cooling_rate(rate)
                .with_cooling_strategy(s)
                .with_max_iterations(50_000);
            let t = temperature(iter, &cfg);
            prop_assert!(t >= MIN_TEMPERATURE);
            prop_assert!(t.is_finite());
        }

        #[test]
        fn prop_temperature_non_increasing(
            s in strategy(),
            rate in 0.001f64..0.999,
            iter in 0usize..50_000,
        ) {
            let cfg = SaConfig::default()
                .with_initial_temperature(500.0)
                .with_cooling_rate(rate)
                .with_cooling_strategy(s)
                .with_max_iterations(50_000);
            let now = temperature(iter, &cfg);
            let next = temperature(iter + 1, &cfg);
            prop_assert!(next <= now * (1.0 + 1e-12));
        }
    }
}
