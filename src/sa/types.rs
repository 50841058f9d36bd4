//! Core trait for Simulated Annealing.

use rand::Rng;

/// Defines a Simulated Annealing problem.
///
/// The user implements random solution generation, neighbor generation and
/// energy evaluation. The engine handles temperature management, the
/// acceptance criterion, restarts and parallel coordination.
///
/// # Minimization
///
/// SA minimizes the energy. For maximization, negate it.
///
/// # Concurrency
///
/// With more than one worker, every method may be called concurrently from
/// several threads. Each worker passes its own random generator, so stateless
/// problems need no synchronization; problems with interior mutable state
/// must synchronize it themselves.
///
/// # Errors
///
/// Any `Err` aborts the run. Infallible problems use
/// [`std::convert::Infallible`].
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use std::convert::Infallible;
/// use u_anneal::sa::SaProblem;
///
/// struct TspProblem {
///     distances: Vec<Vec<f64>>,
/// }
///
/// impl SaProblem for TspProblem {
///     type Solution = Vec<usize>;
///     type Error = Infallible;
///
///     fn random_solution<R: Rng>(&self, rng: &mut R) -> Result<Vec<usize>, Infallible> {
///         let mut tour: Vec<usize> = (0..self.distances.len()).collect();
///         u_anneal::random::shuffle(&mut tour, rng);
///         Ok(tour)
///     }
///
///     fn energy(&self, tour: &Vec<usize>) -> Result<f64, Infallible> {
///         Ok(tour.windows(2).map(|w| self.distances[w[0]][w[1]]).sum())
///     }
///
///     fn neighbor<R: Rng>(&self, tour: &Vec<usize>, rng: &mut R) -> Result<Vec<usize>, Infallible> {
///         let mut new = tour.clone();
///         let i = rng.random_range(0..new.len());
///         let j = rng.random_range(0..new.len());
///         new.swap(i, j);
///         Ok(new)
///     }
/// }
/// ```
///
/// # References
///
/// Kirkpatrick et al. (1983), Cerny (1985)
pub trait SaProblem: Send + Sync {
    /// The solution representation type.
    type Solution: Clone + Send + Sync;

    /// Error raised by problem operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates a random solution. Used for each worker's start and for restarts.
    fn random_solution<R: Rng>(&self, rng: &mut R) -> Result<Self::Solution, Self::Error>;

    /// Computes the energy of a solution. Lower is better.
    ///
    /// Must be deterministic for a given solution. A NaN energy aborts the run.
    fn energy(&self, solution: &Self::Solution) -> Result<f64, Self::Error>;

    /// Generates a neighbor of the current solution.
    ///
    /// The neighbor should be "close" to the current solution
    /// (small perturbation) but the neighborhood must be connected
    /// (any solution reachable from any other via a sequence of moves).
    fn neighbor<R: Rng>(
        &self,
        solution: &Self::Solution,
        rng: &mut R,
    ) -> Result<Self::Solution, Self::Error>;

    /// Checks a solution for feasibility.
    ///
    /// Never called by the annealing loop; see
    /// [`SaResult::is_valid`](super::SaResult::is_valid).
    fn validate(&self, _solution: &Self::Solution) -> bool {
        true
    }
}
