//! Small problems shared by the SA unit tests.

use super::types::SaProblem;
use rand::Rng;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, thiserror::Error)]
#[error("energy evaluation failed")]
pub struct EvalError;

/// `f(x) = x^2`, minimum at 0.
pub struct Quadratic;

impl SaProblem for Quadratic {
    type Solution = f64;
    type Error = Infallible;

    fn random_solution<R: Rng>(&self, rng: &mut R) -> Result<f64, Infallible> {
        Ok(rng.random_range(-10.0..10.0))
    }

    fn energy(&self, x: &f64) -> Result<f64, Infallible> {
        Ok(x * x)
    }

    fn neighbor<R: Rng>(&self, x: &f64, rng: &mut R) -> Result<f64, Infallible> {
        Ok(x + rng.random_range(-1.0..1.0))
    }

    fn validate(&self, x: &f64) -> bool {
        x.is_finite()
    }
}

/// [`Quadratic`] that counts neighbor calls.
#[derive(Default)]
pub struct Counting {
    neighbors: AtomicUsize,
}

impl Counting {
    pub fn neighbors(&self) -> usize {
        self.neighbors.load(Ordering::Relaxed)
    }
}

impl SaProblem for Counting {
    type Solution = f64;
    type Error = Infallible;

    fn random_solution<R: Rng>(&self, rng: &mut R) -> Result<f64, Infallible> {
        Quadratic.random_solution(rng)
    }

    fn energy(&self, x: &f64) -> Result<f64, Infallible> {
        Quadratic.energy(x)
    }

    fn neighbor<R: Rng>(&self, x: &f64, rng: &mut R) -> Result<f64, Infallible> {
        self.neighbors.fetch_add(1, Ordering::Relaxed);
        Quadratic.neighbor(x, rng)
    }
}

/// Energies come from a fixed script indexed by a shared counter.
///
/// Every `random_solution` and `neighbor` call takes the next slot, so the
/// energies computed across all workers are the script prefix in some order,
/// whatever the random draws.
#[derive(Default)]
pub struct Scripted {
    next: AtomicUsize,
}

impl Scripted {
    /// Script period. Slot `k` and `k + LEN` share an energy.
    pub const LEN: usize = 1009;

    /// Energy of slot `k`. Zero exactly once per period, at `k = 864`.
    pub fn energy_at(k: usize) -> f64 {
        ((k * 7919 + 13) % Self::LEN) as f64
    }

    /// Number of slots handed out so far.
    pub fn handed_out(&self) -> usize {
        self.next.load(Ordering::Relaxed)
    }

    fn take(&self) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl SaProblem for Scripted {
    type Solution = usize;
    type Error = Infallible;

    fn random_solution<R: Rng>(&self, _rng: &mut R) -> Result<usize, Infallible> {
        Ok(self.take())
    }

    fn energy(&self, k: &usize) -> Result<f64, Infallible> {
        Ok(Self::energy_at(*k))
    }

    fn neighbor<R: Rng>(&self, _k: &usize, _rng: &mut R) -> Result<usize, Infallible> {
        Ok(self.take())
    }
}

/// Every neighbor is one unit worse; random solutions follow a fixed sequence
/// that first drops from 500 to 419.
#[derive(Default)]
pub struct ColdLadder {
    draws: AtomicUsize,
}

impl SaProblem for ColdLadder {
    type Solution = i64;
    type Error = Infallible;

    fn random_solution<R: Rng>(&self, _rng: &mut R) -> Result<i64, Infallible> {
        let k = self.draws.fetch_add(1, Ordering::Relaxed);
        Ok(((k * 7919 + 500) % 1000) as i64)
    }

    fn energy(&self, x: &i64) -> Result<f64, Infallible> {
        Ok(*x as f64)
    }

    fn neighbor<R: Rng>(&self, x: &i64, _rng: &mut R) -> Result<i64, Infallible> {
        Ok(x + 1)
    }
}

/// [`Quadratic`] whose energy fails from the `n`-th call on (0-based).
pub struct FailingEnergy {
    n: usize,
    calls: AtomicUsize,
}

impl FailingEnergy {
    pub fn after(n: usize) -> Self {
        Self {
            n,
            calls: AtomicUsize::new(0),
        }
    }
}

impl SaProblem for FailingEnergy {
    type Solution = f64;
    type Error = EvalError;

    fn random_solution<R: Rng>(&self, rng: &mut R) -> Result<f64, EvalError> {
        Ok(rng.random_range(-10.0..10.0))
    }

    fn energy(&self, x: &f64) -> Result<f64, EvalError> {
        if self.calls.fetch_add(1, Ordering::Relaxed) >= self.n {
            Err(EvalError)
        } else {
            Ok(x * x)
        }
    }

    fn neighbor<R: Rng>(&self, x: &f64, rng: &mut R) -> Result<f64, EvalError> {
        Ok(x + rng.random_range(-1.0..1.0))
    }
}

/// [`Quadratic`] whose energy turns NaN from the `n`-th call on (0-based).
pub struct NanEnergy {
    n: usize,
    calls: AtomicUsize,
}

impl NanEnergy {
    pub fn after(n: usize) -> Self {
        Self {
            n,
            calls: AtomicUsize::new(0),
        }
    }
}

impl SaProblem for NanEnergy {
    type Solution = f64;
    type Error = Infallible;

    fn random_solution<R: Rng>(&self, rng: &mut R) -> Result<f64, Infallible> {
        Quadratic.random_solution(rng)
    }

    fn energy(&self, x: &f64) -> Result<f64, Infallible> {
        if self.calls.fetch_add(1, Ordering::Relaxed) >= self.n {
            Ok(f64::NAN)
        } else {
            Ok(x * x)
        }
    }

    fn neighbor<R: Rng>(&self, x: &f64, rng: &mut R) -> Result<f64, Infallible> {
        Quadratic.neighbor(x, rng)
    }
}

/// Number of misplaced elements of a permutation of `0..n`.
pub struct PermSort {
    pub n: usize,
}

impl SaProblem for PermSort {
    type Solution = Vec<usize>;
    type Error = Infallible;

    fn random_solution<R: Rng>(&self, rng: &mut R) -> Result<Vec<usize>, Infallible> {
        let mut perm: Vec<usize> = (0..self.n).collect();
        crate::random::shuffle(&mut perm, rng);
        Ok(perm)
    }

    fn energy(&self, perm: &Vec<usize>) -> Result<f64, Infallible> {
        Ok(perm.iter().enumerate().filter(|&(i, &v)| i != v).count() as f64)
    }

    fn neighbor<R: Rng>(&self, perm: &Vec<usize>, rng: &mut R) -> Result<Vec<usize>, Infallible> {
        let mut new = perm.clone();
        let i = rng.random_range(0..self.n);
        let j = rng.random_range(0..self.n);
        new.swap(i, j);
        Ok(new)
    }
}
