//! Variation operators for bit-string genomes.
//!
//! Both operators are pure: they read parent genomes and return new ones.
//! The engine depends only on the [`Crossover`] and [`Mutator`] traits, so a
//! caller can swap in a different recombination or perturbation scheme.
//!
//! # Crossover Operators
//!
//! - [`two_point_crossover`]: swap one contiguous segment between parents, O(L)
//!
//! # Mutation Operators
//!
//! - [`flip_bits`]: flip every bit independently with probability `indpb`, O(L)
//!
//! # References
//!
//! - De Jong (1975), "An Analysis of the Behavior of a Class of Genetic
//!   Adaptive Systems"
//! - Spears & De Jong (1991), "An Analysis of Multi-Point Crossover"

use super::types::Genome;
use crate::error::Result;
use rand::Rng;

/// Recombines two parents into two children of the same length.
pub trait Crossover: Send + Sync {
    /// Fails with [`InvalidGenomeLength`](crate::EvolveError::InvalidGenomeLength) when the parents
    /// differ in length.
    fn crossover<R: Rng>(&self, a: &Genome, b: &Genome, rng: &mut R) -> Result<(Genome, Genome)>;
}

/// Perturbs a genome, returning the perturbed copy.
pub trait Mutator: Send + Sync {
    /// Returns a genome of the same length as `genome`.
    fn mutate<R: Rng>(&self, genome: &Genome, rng: &mut R) -> Genome;
}

/// Two-point crossover with cut points drawn uniformly from `[0, L]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TwoPointCrossover;

impl Crossover for TwoPointCrossover {
    fn crossover<R: Rng>(&self, a: &Genome, b: &Genome, rng: &mut R) -> Result<(Genome, Genome)> {
        two_point_crossover(a, b, rng)
    }
}

/// Independent per-bit flips with probability `indpb`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlipBitMutation {
    /// Per-bit flip probability in `[0, 1]`.
    pub indpb: f64,
}

impl FlipBitMutation {
    /// Flip each bit with probability `indpb`.
    pub fn new(indpb: f64) -> Self {
        Self { indpb }
    }
}

impl Default for FlipBitMutation {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl Mutator for FlipBitMutation {
    fn mutate<R: Rng>(&self, genome: &Genome, rng: &mut R) -> Genome {
        flip_bits(genome, self.indpb, rng)
    }
}

// ============================================================================
// Crossover
// ============================================================================

/// Two-point crossover.
///
/// # Algorithm
///
/// 1. Draw two cut indices uniformly from `0..=L` and order them so `i <= j`
/// 2. Child 1 is parent `a` with `[i, j)` taken from `b`
/// 3. Child 2 is parent `b` with `[i, j)` taken from `a`
///
/// `i == j` leaves both children equal to their parents.
///
/// # Complexity
/// O(L) time, O(L) space
pub fn two_point_crossover<R: Rng>(
    a: &Genome,
    b: &Genome,
    rng: &mut R,
) -> Result<(Genome, Genome)> {
    b.check_length(a.len())?;
    let (i, j) = random_cuts(a.len(), rng);
    two_point_crossover_at(a, b, i, j)
}

/// Two-point crossover at fixed cut points.
///
/// The cut points may be given in either order.
///
/// # Panics
/// Panics if a cut point is greater than the genome length.
pub fn two_point_crossover_at(
    a: &Genome,
    b: &Genome,
    cut1: usize,
    cut2: usize,
) -> Result<(Genome, Genome)> {
    b.check_length(a.len())?;
    let (i, j) = if cut1 <= cut2 { (cut1, cut2) } else { (cut2, cut1) };
    assert!(j <= a.len(), "cut point {j} beyond genome length {}", a.len());

    let mut c1 = a.clone().into_bits();
    let mut c2 = b.clone().into_bits();
    c1[i..j].copy_from_slice(&b.bits()[i..j]);
    c2[i..j].copy_from_slice(&a.bits()[i..j]);
    Ok((Genome::new(c1), Genome::new(c2)))
}

// ============================================================================
// Mutation
// ============================================================================

/// Flip-bit mutation: each bit flips independently with probability
/// `indpb`.
///
/// `indpb = 0` returns an identical genome; `indpb = 1` returns the bitwise
/// complement.
///
/// # Complexity
/// O(L)
pub fn flip_bits<R: Rng>(genome: &Genome, indpb: f64, rng: &mut R) -> Genome {
    let bits = genome
        .bits()
        .iter()
        .map(|&b| if rng.random::<f64>() < indpb { !b } else { b })
        .collect();
    Genome::new(bits)
}

// ============================================================================
// Helpers
// ============================================================================

/// Two cut points in `0..=n`, ordered so the first is not greater.
fn random_cuts<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(0..=n);
    let b = rng.random_range(0..=n);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// ============================================================================
// Tests
// ============================================================================
