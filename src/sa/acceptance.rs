//! Metropolis acceptance criterion.

use rand::Rng;

/// Probability of moving from `current` to `candidate` at `temperature`.
///
/// 1 for non-worsening candidates, `exp((current - candidate) / T)` otherwise.
/// A NaN candidate energy yields 0.
pub fn acceptance_probability(current: f64, candidate: f64, temperature: f64) -> f64 {
    if candidate <= current {
        1.0
    } else {
        let p = ((current - candidate) / temperature).exp();
        if p.is_nan() {
            0.0
        } else {
            p
        }
    }
}

/// Decides whether to move to `candidate`.
///
/// Non-worsening candidates are accepted without consuming randomness;
/// worse ones are accepted when a uniform draw in `[0, 1)` falls below
/// [`acceptance_probability`].
pub fn metropolis<R: Rng>(
    current: f64,
    candidate: f64,
    temperature: f64,
    rng: &mut R,
) -> bool {
    if candidate <= current {
        return true;
    }
    rng.random::<f64>() < acceptance_probability(current, candidate, temperature)
}
