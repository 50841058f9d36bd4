//! Seeded random number generation.
//!
//! Every worker gets its own ChaCha8 stream derived from one run seed, so
//! parallel trajectories never share or correlate their random draws and a
//! seeded single-worker run is fully reproducible.

use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generator type used by annealing workers.
pub type WorkerRng = ChaCha8Rng;

/// Creates a generator from a seed (stream 0).
pub fn create_rng(seed: u64) -> WorkerRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Creates the generator for `worker`, an independent stream of `seed`.
pub fn worker_rng(seed: u64, worker: usize) -> WorkerRng {
    let mut rng = create_rng(seed);
    rng.set_stream(worker as u64);
    rng
}

/// Shuffles a slice in place (Fisher-Yates).
pub fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}
