//! Parent selection.
//!
//! Selection decides which evaluated individuals get to breed. The engine
//! only depends on the [`Selector`] trait; [`Tournament`] is the stock
//! implementation.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Miller & Goldberg (1995), "Genetic Algorithms, Tournament Selection,
//!   and the Effects of Noise"

use super::types::Individual;
use rand::Rng;

/// Chooses `k` parents from an evaluated population.
///
/// Implementations return copies of population members, never new
/// genomes, and must not modify the input. Every input individual is
/// evaluated when the engine calls this.
pub trait Selector: Send + Sync {
    /// Picks `k` individuals, with repetition allowed.
    fn select<R: Rng>(&self, population: &[Individual], k: usize, rng: &mut R) -> Vec<Individual>;
}

/// Tournament selection: for each slot, draw `size` entrants uniformly with
/// replacement and keep the fittest.
///
/// Higher `size` = stronger selection pressure.
/// - size=1: uniform random choice
/// - size=2-3: light to moderate pressure (typical default)
/// - size>5: strong pressure (risk of premature convergence)
///
/// Once `size` reaches the population size the whole population competes,
/// so the result is always the population's best individual.
///
/// # Examples
///
/// ```
/// use driver_ga::ga::{Genome, Individual, Selector, Tournament};
/// use rand::SeedableRng;
///
/// let pop = vec![
///     Individual::evaluated(Genome::from_u64(0, 2), 1.0),
///     Individual::evaluated(Genome::from_u64(3, 2), 9.0),
/// ];
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
/// let picked = Tournament::new(2).select(&pop, 3, &mut rng);
/// assert!(picked.iter().all(|ind| ind.fitness() == Some(9.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tournament {
    /// Entrants per tournament. Treated as 1 when 0.
    pub size: usize,
}

impl Tournament {
    /// A tournament with `size` entrants.
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl Default for Tournament {
    fn default() -> Self {
        Tournament::new(3)
    }
}

impl Selector for Tournament {
    fn select<R: Rng>(&self, population: &[Individual], k: usize, rng: &mut R) -> Vec<Individual> {
        select_tournament(population, k, self.size, rng)
    }
}

/// Runs `k` independent tournaments of `size` entrants and returns the
/// winners.
///
/// # Panics
/// Panics if `population` is empty.
pub fn select_tournament<R: Rng>(
    population: &[Individual],
    k: usize,
    size: usize,
    rng: &mut R,
) -> Vec<Individual> {
    assert!(
        !population.is_empty(),
        "cannot select from empty population"
    );
    debug_assert!(
        population.iter().all(Individual::is_evaluated),
        "selection requires an evaluated population"
    );

    (0..k)
        .map(|_| population[tournament(population, size, rng)].clone())
        .collect()
}

/// One tournament; returns the winner's index.
///
/// The first entrant drawn wins exact ties.
fn tournament<R: Rng>(population: &[Individual], size: usize, rng: &mut R) -> usize {
    let size = size.max(1);
    let n = population.len();

    if size >= n {
        return best_index(population);
    }

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..size {
        let idx = rng.random_range(0..n);
        if population[idx].rank_key() > population[best_idx].rank_key() {
            best_idx = idx;
        }
    }
    best_idx
}

/// Index of the fittest individual; the earliest one wins ties.
///
/// # Panics
/// Panics if `population` is empty.
pub(crate) fn best_index(population: &[Individual]) -> usize {
    assert!(!population.is_empty(), "population must not be empty");
    let mut best = 0;
    for (i, ind) in population.iter().enumerate().skip(1) {
        if ind.rank_key() > population[best].rank_key() {
            best = i;
        }
    }
    best
}
