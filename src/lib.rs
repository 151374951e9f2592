//! Evolutionary search for racing-driver candidate profiles.
//!
//! The crate has two layers:
//!
//! - [`ga`]: a (μ+λ) genetic algorithm over fixed-length bit strings.
//!   Tournament selection, two-point crossover, flip-bit mutation, a
//!   per-generation statistics log and an elite archive. The fitness
//!   function is injected through [`ga::FitnessOracle`].
//! - [`profile`]: the 16-bit driver-profile encoding and the two
//!   hand-authored rule tables that score it.
//!
//! # Example
//!
//! ```
//! use driver_ga::ga::{Engine, EvolutionConfig};
//! use driver_ga::profile::{DriverProfile, RevisedScoring};
//!
//! let config = EvolutionConfig::fast().with_seed(7);
//! let result = Engine::new(config, RevisedScoring)?.run()?;
//!
//! for candidate in &result.archive {
//!     let profile = DriverProfile::decode(candidate.genome())?;
//!     println!("{profile}fitness: {:?}\n", candidate.fitness());
//! }
//! # Ok::<(), driver_ga::EvolveError>(())
//! ```
//!
//! # Features
//!
//! - `parallel`: evaluate offspring with rayon when
//!   [`ga::EvolutionConfig::parallel`] is set
//! - `serde`: `Serialize`/`Deserialize` for configs, genomes, individuals,
//!   statistics and profiles

pub mod error;
pub mod ga;
pub mod profile;

pub use error::{EvolveError, Result};
