//! Core value types for the GA framework.
//!
//! [`Genome`] is the unit of evolution, [`Individual`] pairs it with a cached
//! score, and [`FitnessOracle`] is the contract between the generic engine
//! and a concrete scoring function.

use crate::error::{EvolveError, Result};
use rand::Rng;
use std::fmt;

/// A fixed-length bit vector.
///
/// Genomes are values: crossover and mutation build new genomes instead of
/// editing an existing one, so population members never alias each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Genome {
    bits: Vec<bool>,
}

impl Genome {
    /// Wraps a bit vector of any length.
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Wraps a bit vector, rejecting it unless it has exactly `expected` bits.
    pub fn with_length(bits: Vec<bool>, expected: usize) -> Result<Self> {
        let genome = Self::new(bits);
        genome.check_length(expected)?;
        Ok(genome)
    }

    /// Draws `length` independent, uniformly distributed bits.
    pub fn random<R: Rng>(length: usize, rng: &mut R) -> Self {
        Self {
            bits: (0..length).map(|_| rng.random_bool(0.5)).collect(),
        }
    }

    /// Builds a genome from the low `length` bits of `value`, most
    /// significant bit first.
    ///
    /// ```
    /// use driver_ga::ga::Genome;
    ///
    /// let g = Genome::from_u64(0b0110, 4);
    /// assert_eq!(g.to_string(), "0110");
    /// ```
    pub fn from_u64(value: u64, length: usize) -> Self {
        let bits = (0..length)
            .rev()
            .map(|shift| shift < 64 && (value >> shift) & 1 == 1)
            .collect();
        Self { bits }
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns `true` for the zero-length genome.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// The bits in order.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Bit at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Reads `width` bits starting at `start` as an unsigned integer,
    /// most significant bit first.
    ///
    /// # Panics
    /// Panics if `width` is greater than 8 or the field runs past the end
    /// of the genome.
    pub fn field(&self, start: usize, width: usize) -> u8 {
        assert!(width <= 8, "field width {width} does not fit in a u8");
        self.bits[start..start + width]
            .iter()
            .fold(0u8, |acc, &b| (acc << 1) | b as u8)
    }

    /// Fails with [`EvolveError::InvalidGenomeLength`] unless the genome has
    /// exactly `expected` bits.
    pub fn check_length(&self, expected: usize) -> Result<()> {
        if self.bits.len() == expected {
            Ok(())
        } else {
            Err(EvolveError::InvalidGenomeLength {
                expected,
                actual: self.bits.len(),
            })
        }
    }

    pub(crate) fn into_bits(self) -> Vec<bool> {
        self.bits
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.bits {
            f.write_str(if b { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Draws a uniformly random genome of the given length.
pub fn random_genome<R: Rng>(length: usize, rng: &mut R) -> Genome {
    Genome::random(length, rng)
}

/// A genome together with its (possibly not yet computed) fitness.
///
/// Fitness starts unset and is filled in once by the engine through a
/// [`FitnessOracle`]. Higher fitness is better.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Individual {
    genome: Genome,
    fitness: Option<f64>,
}

impl Individual {
    /// A freshly born individual with unset fitness.
    pub fn new(genome: Genome) -> Self {
        Self {
            genome,
            fitness: None,
        }
    }

    /// An individual whose fitness is already known.
    pub fn evaluated(genome: Genome, fitness: f64) -> Self {
        Self {
            genome,
            fitness: Some(fitness),
        }
    }

    /// The genome.
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// The cached fitness, `None` until evaluated.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Whether the fitness has been computed.
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Scores the individual with `oracle` unless it already carries a
    /// fitness. Returns `true` when the oracle was called.
    pub fn evaluate_with<O: FitnessOracle + ?Sized>(&mut self, oracle: &O) -> Result<bool> {
        if self.fitness.is_some() {
            return Ok(false);
        }
        self.fitness = Some(checked_score(oracle, &self.genome)?);
        Ok(true)
    }

    /// Ordering key; unevaluated individuals rank below everything.
    pub(crate) fn rank_key(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    pub(crate) fn into_genome(self) -> Genome {
        self.genome
    }
}

/// A pure, deterministic scoring function over genomes.
///
/// Scores are non-negative; an oracle whose raw rules can go below zero must
/// clamp before returning. The engine caches the result per individual and
/// never asks twice for the same individual.
///
/// Any `Fn(&Genome) -> Result<f64>` closure is an oracle:
///
/// ```
/// use driver_ga::ga::{FitnessOracle, Genome};
///
/// let ones = |g: &Genome| -> driver_ga::Result<f64> { Ok(g.count_ones() as f64) };
/// assert_eq!(ones.evaluate(&Genome::from_u64(0b1011, 4)).unwrap(), 3.0);
/// ```
///
/// # Thread Safety
///
/// Oracles are `Send + Sync` so the `parallel` feature can evaluate a
/// population with rayon.
pub trait FitnessOracle: Send + Sync {
    /// Scores a genome. Only a malformed genome should make this fail.
    fn evaluate(&self, genome: &Genome) -> Result<f64>;
}

impl<F> FitnessOracle for F
where
    F: Fn(&Genome) -> Result<f64> + Send + Sync,
{
    fn evaluate(&self, genome: &Genome) -> Result<f64> {
        self(genome)
    }
}

/// Calls the oracle and rejects scores outside `[0, inf)`.
pub(crate) fn checked_score<O: FitnessOracle + ?Sized>(oracle: &O, genome: &Genome) -> Result<f64> {
    let score = oracle.evaluate(genome)?;
    if score.is_finite() && score >= 0.0 {
        Ok(score)
    } else {
        Err(EvolveError::InvalidScore(score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_genome_length() {
        let mut rng = StdRng::seed_from_u64(42);
        for len in [0, 1, 2, 16, 100] {
            assert_eq!(random_genome(len, &mut rng).len(), len);
        }
    }

    #[test]
    fn test_random_genome_uses_both_values() {
        let mut rng = StdRng::seed_from_u64(7);
        let g = random_genome(256, &mut rng);
        let ones = g.count_ones();
        assert!(ones > 64 && ones < 192, "suspicious bit balance: {ones}");
    }

    #[test]
    fn test_from_u64_and_field() {
        let g = Genome::from_u64(0b1101_0010, 8);
        assert_eq!(g.to_string(), "11010010");
        assert_eq!(g.field(0, 2), 0b11);
        assert_eq!(g.field(2, 2), 0b01);
        assert_eq!(g.field(4, 4), 0b0010);
        assert_eq!(Genome::from_u64(0xA5, 8).field(0, 8), 0xA5);
    }

    #[test]
    #[should_panic(expected = "field width 9 does not fit in a u8")]
    fn test_field_wider_than_u8_panics() {
        Genome::from_u64(0, 16).field(0, 9);
    }

    #[test]
    fn test_with_length_rejects_mismatch() {
        let err = Genome::with_length(vec![true; 3], 4).unwrap_err();
        assert_eq!(
            err,
            EvolveError::InvalidGenomeLength {
                expected: 4,
                actual: 3
            }
        );
        assert!(Genome::with_length(vec![false; 4], 4).is_ok());
    }

    #[test]
    fn test_new_individual_is_unset() {
        let ind = Individual::new(Genome::from_u64(3, 4));
        assert!(!ind.is_evaluated());
        assert_eq!(ind.fitness(), None);
        assert_eq!(ind.rank_key(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_evaluate_with_caches() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = AtomicUsize::new(0);
        let oracle = |g: &Genome| -> Result<f64> {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok(g.count_ones() as f64)
        };

        let mut ind = Individual::new(Genome::from_u64(0b111, 4));
        assert!(ind.evaluate_with(&oracle).unwrap());
        assert!(!ind.evaluate_with(&oracle).unwrap());
        assert_eq!(ind.fitness(), Some(3.0));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_negative_score_rejected() {
        let oracle = |_: &Genome| -> Result<f64> { Ok(-1.0) };
        let mut ind = Individual::new(Genome::from_u64(0, 2));
        assert_eq!(
            ind.evaluate_with(&oracle).unwrap_err(),
            EvolveError::InvalidScore(-1.0)
        );
        assert!(!ind.is_evaluated());
    }

    #[test]
    fn test_nan_score_rejected() {
        let oracle = |_: &Genome| -> Result<f64> { Ok(f64::NAN) };
        let mut ind = Individual::new(Genome::from_u64(0, 2));
        assert!(matches!(
            ind.evaluate_with(&oracle),
            Err(EvolveError::InvalidScore(_))
        ));
    }
}
