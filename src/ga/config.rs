//! GA configuration.
//!
//! [`EvolutionConfig`] holds every constant that controls one evolutionary
//! run. It is validated once, when the engine is built; nothing changes
//! mid-run.

use crate::error::{EvolveError, Result};

/// How the next population is formed from parents and offspring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Replacement {
    /// Keep the best `mu` of parents and offspring pooled together.
    ///
    /// The best fitness can never decrease from one generation to the next.
    #[default]
    MuPlusLambda,

    /// Keep the best `mu` of the offspring only. Requires `lambda >= mu`.
    ///
    /// Parents always die, which trades the no-regression guarantee for
    /// diversity.
    MuCommaLambda,
}

/// Configuration for the evolutionary run.
///
/// # Defaults
///
/// The defaults reproduce the reference driver-profile search:
///
/// ```
/// use driver_ga::ga::EvolutionConfig;
///
/// let config = EvolutionConfig::default();
/// assert_eq!(config.genome_length, 16);
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.generations, 100);
/// assert_eq!(config.archive_capacity, 7);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use driver_ga::ga::EvolutionConfig;
///
/// let config = EvolutionConfig::default()
///     .with_population_size(200)
///     .with_offspring_count(300)
///     .with_tournament_size(5)
///     .with_mutation_rate(0.2)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvolutionConfig {
    /// Number of bits per genome (L).
    pub genome_length: usize,

    /// Number of survivors kept each generation (`mu`).
    pub population_size: usize,

    /// Number of offspring bred each generation (`lambda`).
    pub offspring_count: usize,

    /// Probability that a pair of parents is recombined (`cxpb`).
    pub crossover_rate: f64,

    /// Probability that an offspring goes through bit-flip mutation (`mutpb`).
    pub mutation_rate: f64,

    /// Per-bit flip probability inside a mutation (`indpb`).
    pub bit_flip_rate: f64,

    /// Entrants per tournament. Larger means stronger selection pressure.
    pub tournament_size: usize,

    /// Number of generations after the initial one (`ngen`).
    pub generations: usize,

    /// Capacity of the elite archive (K).
    pub archive_capacity: usize,

    /// Survivor policy.
    pub replacement: Replacement,

    /// Evaluate offspring with rayon. Ignored without the `parallel` feature.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked between generations only, so a run may overshoot by one
    /// generation's worth of work.
    pub time_limit_ms: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            genome_length: 16,
            population_size: 100,
            offspring_count: 100,
            crossover_rate: 0.7,
            mutation_rate: 0.3,
            bit_flip_rate: 0.05,
            tournament_size: 3,
            generations: 100,
            archive_capacity: 7,
            replacement: Replacement::MuPlusLambda,
            parallel: false,
            seed: None,
            time_limit_ms: None,
        }
    }
}

impl EvolutionConfig {
    /// Sets the genome length.
    pub fn with_genome_length(mut self, n: usize) -> Self {
        self.genome_length = n;
        self
    }

    /// Sets the population size (`mu`).
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the offspring count (`lambda`).
    pub fn with_offspring_count(mut self, n: usize) -> Self {
        self.offspring_count = n;
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the per-bit flip probability.
    pub fn with_bit_flip_rate(mut self, rate: f64) -> Self {
        self.bit_flip_rate = rate;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the number of generations.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the elite archive capacity.
    pub fn with_archive_capacity(mut self, k: usize) -> Self {
        self.archive_capacity = k;
        self
    }

    /// Sets the replacement policy.
    pub fn with_replacement(mut self, replacement: Replacement) -> Self {
        self.replacement = replacement;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Preset for quick experiments: 50 survivors, 50 offspring, 50 generations.
    pub fn fast() -> Self {
        Self {
            population_size: 50,
            offspring_count: 50,
            generations: 50,
            ..Self::default()
        }
    }

    /// Preset with a larger population and a longer run.
    ///
    /// - mu: 200, lambda: 200, generations: 200
    pub fn balanced() -> Self {
        Self {
            population_size: 200,
            offspring_count: 200,
            generations: 200,
            ..Self::default()
        }
    }

    /// The parameters of the reference driver-profile search.
    ///
    /// - mu = lambda = 100, cxpb = 0.7, mutpb = 0.3, indpb = 0.05
    /// - tournament of 3, 100 generations, archive of 7
    pub fn reference() -> Self {
        Self::default()
    }

    /// Validates the configuration.
    ///
    /// Returns [`EvolveError::InvalidConfig`] describing the first parameter
    /// that is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.genome_length == 0 {
            return Err(invalid("genome_length must be at least 1"));
        }
        if self.population_size == 0 {
            return Err(invalid("population_size must be at least 1"));
        }
        if self.offspring_count == 0 {
            return Err(invalid("offspring_count must be at least 1"));
        }
        for (name, p) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
            ("bit_flip_rate", self.bit_flip_rate),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(&format!("{name} must be in [0, 1], got {p}")));
            }
        }
        if self.tournament_size == 0 {
            return Err(invalid("tournament_size must be at least 1"));
        }
        if self.archive_capacity == 0 {
            return Err(invalid("archive_capacity must be at least 1"));
        }
        if self.replacement == Replacement::MuCommaLambda
            && self.offspring_count < self.population_size
        {
            return Err(invalid(
                "mu,lambda replacement needs offspring_count >= population_size",
            ));
        }
        if self.time_limit_ms == Some(0) {
            return Err(invalid("time_limit_ms must be positive or None"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> EvolveError {
    EvolveError::InvalidConfig(msg.to_string())
}
