//! Genetic algorithm over fixed-length bit strings.
//!
//! A (μ+λ) evolutionary search driven by an injected [`FitnessOracle`].
//! The engine knows nothing about what the bits mean; the oracle maps a
//! [`Genome`] to a non-negative score and higher is better.
//!
//! # Key Types
//!
//! - [`EvolutionConfig`]: run parameters, presets, validation
//! - [`Engine`]: the generation state machine
//! - [`EvolutionResult`]: final population, statistics and elite archive
//!
//! # Operators
//!
//! - [`Tournament`] selection behind the [`Selector`] trait
//! - [`TwoPointCrossover`] behind the [`Crossover`] trait
//! - [`FlipBitMutation`] behind the [`Mutator`] trait
//!
//! # Bookkeeping
//!
//! - [`Logbook`]: one [`GenerationStats`] record per generation
//! - [`EliteArchive`]: the best individuals ever seen
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Eiben & Smith (2015), *Introduction to Evolutionary Computing*, ch. 5

mod archive;
mod config;
pub mod operators;
mod runner;
pub mod selection;
mod stats;
mod types;

pub use archive::EliteArchive;
pub use config::{EvolutionConfig, Replacement};
pub use operators::{Crossover, FlipBitMutation, Mutator, TwoPointCrossover};
pub use runner::{Engine, EvolutionResult, Phase};
pub use selection::{Selector, Tournament};
pub use stats::{GenerationStats, Logbook};
pub use types::{random_genome, FitnessOracle, Genome, Individual};
