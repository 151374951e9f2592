//! GA evolutionary loop execution.
//!
//! [`Engine`] drives the generation state machine:
//!
//! ```text
//! Initialized → Evaluating → Selecting → Recombining → Evaluating → Replacing → Reporting
//!                    ↑                                                             │
//!                    └─────────────────────── (next generation) ───────────────────┘
//! ```
//!
//! The initial population goes straight from `Evaluating` to `Reporting`
//! (generation 0). `Evaluating` is the only phase that calls the oracle, so
//! an oracle error always leaves the engine parked in that phase.

use super::archive::EliteArchive;
use super::config::{EvolutionConfig, Replacement};
use super::operators::{Crossover, FlipBitMutation, Mutator, TwoPointCrossover};
use super::selection::{Selector, Tournament};
use super::stats::{GenerationStats, Logbook};
use super::types::{FitnessOracle, Genome, Individual};
use crate::error::Result;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Where the engine is in the generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Random population created, nothing evaluated yet.
    Initialized,
    /// Unscored individuals (initial population or offspring) await the oracle.
    Evaluating,
    /// Parents are about to be chosen.
    Selecting,
    /// Parents are about to be crossed and mutated into offspring.
    Recombining,
    /// Offspring are scored; survivors are about to be chosen.
    Replacing,
    /// Survivors are about to be summarized and offered to the archive.
    Reporting,
    /// The generation budget is spent.
    Terminated,
}

/// Result of a completed (or stopped) run.
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    /// Survivors of the last completed generation, fittest first.
    pub population: Vec<Individual>,

    /// One statistics record per completed generation, starting at 0.
    pub logbook: Logbook,

    /// Best individuals seen during the run, fittest first.
    pub archive: EliteArchive,

    /// Generations completed after the initial one.
    pub generations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Whether the run hit its wall-clock limit.
    pub timed_out: bool,
}

impl EvolutionResult {
    /// The fittest individual ever seen.
    pub fn best(&self) -> Option<&Individual> {
        self.archive.best()
    }

    /// Fitness of [`best`](Self::best).
    pub fn best_fitness(&self) -> Option<f64> {
        self.best().and_then(Individual::fitness)
    }

    /// Best fitness seen up to each generation.
    pub fn fitness_history(&self) -> Vec<f64> {
        self.logbook.best_so_far()
    }
}

type Observer = Box<dyn FnMut(&GenerationStats)>;

/// Runs one evolutionary search.
///
/// The oracle and the three variation operators are injected; all run
/// state (population, logbook, archive, RNG) lives in the engine and dies
/// with it.
///
/// # Usage
///
/// ```
/// use driver_ga::ga::{Engine, EvolutionConfig, Genome};
///
/// let config = EvolutionConfig::fast().with_genome_length(12).with_seed(42);
/// let ones = |g: &Genome| -> driver_ga::Result<f64> { Ok(g.count_ones() as f64) };
/// let result = Engine::new(config, ones)?.run()?;
/// assert_eq!(result.logbook.len(), 51);
/// assert!(result.best_fitness().unwrap() >= 10.0);
/// # Ok::<(), driver_ga::EvolveError>(())
/// ```
pub struct Engine<O, S = Tournament, C = TwoPointCrossover, M = FlipBitMutation> {
    config: EvolutionConfig,
    oracle: O,
    selector: S,
    crossover: C,
    mutator: M,
    rng: StdRng,
    phase: Phase,
    population: Vec<Individual>,
    // survivors not yet offered to the archive, aligned with `population`
    unreported: Vec<bool>,
    parents: Vec<Individual>,
    offspring: Vec<Individual>,
    offspring_new: Vec<bool>,
    evaluations: usize,
    logbook: Logbook,
    archive: EliteArchive,
    observer: Option<Observer>,
}

impl<O: FitnessOracle> Engine<O> {
    /// Builds an engine with tournament selection, two-point crossover and
    /// flip-bit mutation parameterized from `config`.
    ///
    /// Fails with [`InvalidConfig`](crate::EvolveError::InvalidConfig)
    /// before anything is allocated if `config` does not validate.
    pub fn new(config: EvolutionConfig, oracle: O) -> Result<Self> {
        let selector = Tournament::new(config.tournament_size);
        let mutator = FlipBitMutation::new(config.bit_flip_rate);
        Self::with_operators(config, oracle, selector, TwoPointCrossover, mutator)
    }
}

impl<O, S, C, M> Engine<O, S, C, M>
where
    O: FitnessOracle,
    S: Selector,
    C: Crossover,
    M: Mutator,
{
    /// Builds an engine with caller-supplied operators.
    ///
    /// `tournament_size` and `bit_flip_rate` in `config` are still
    /// validated but only the stock operators read them.
    pub fn with_operators(
        config: EvolutionConfig,
        oracle: O,
        selector: S,
        crossover: C,
        mutator: M,
    ) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let population: Vec<Individual> = (0..config.population_size)
            .map(|_| Individual::new(Genome::random(config.genome_length, &mut rng)))
            .collect();

        Ok(Self {
            unreported: vec![true; population.len()],
            population,
            parents: Vec::new(),
            offspring: Vec::new(),
            offspring_new: Vec::new(),
            evaluations: 0,
            logbook: Logbook::with_capacity(config.generations.saturating_add(1).min(1024)),
            archive: EliteArchive::new(config.archive_capacity),
            observer: None,
            phase: Phase::Initialized,
            rng,
            config,
            oracle,
            selector,
            crossover,
            mutator,
        })
    }

    /// Registers a callback invoked with every new statistics record.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&GenerationStats) + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the last reported generation, `None` before generation 0.
    pub fn generation(&self) -> Option<usize> {
        self.logbook.len().checked_sub(1)
    }

    /// Run parameters.
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Current population (fittest first once generation 0 is reported).
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Statistics recorded so far.
    pub fn logbook(&self) -> &Logbook {
        &self.logbook
    }

    /// Elite archive so far.
    pub fn archive(&self) -> &EliteArchive {
        &self.archive
    }

    /// Advances through one full generation and returns its statistics.
    ///
    /// The first call evaluates and reports the initial population
    /// (generation 0). Returns `Ok(None)` once terminated. An oracle error
    /// leaves the engine in [`Phase::Evaluating`]; individuals already
    /// scored keep their fitness, so calling `step` again resumes there.
    pub fn step(&mut self) -> Result<Option<GenerationStats>> {
        loop {
            match self.phase {
                Phase::Terminated => return Ok(None),
                Phase::Initialized => self.phase = Phase::Evaluating,
                Phase::Evaluating => self.evaluate()?,
                Phase::Selecting => self.select(),
                Phase::Recombining => self.recombine()?,
                Phase::Replacing => self.replace(),
                Phase::Reporting => return Ok(Some(self.report())),
            }
        }
    }

    /// Runs until the generation budget is spent.
    pub fn run(self) -> Result<EvolutionResult> {
        self.run_with_cancel(None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// The flag and the configured time limit are checked between
    /// generations only, so a stopped run never holds a half-built
    /// generation. Generation 0 always completes.
    pub fn run_with_cancel(mut self, cancel: Option<Arc<AtomicBool>>) -> Result<EvolutionResult> {
        let start = Instant::now();
        info!(
            "evolving: L={} mu={} lambda={} cxpb={} mutpb={} ngen={} replacement={:?}",
            self.config.genome_length,
            self.config.population_size,
            self.config.offspring_count,
            self.config.crossover_rate,
            self.config.mutation_rate,
            self.config.generations,
            self.config.replacement,
        );

        let mut cancelled = false;
        let mut timed_out = false;

        while self.phase != Phase::Terminated {
            if !self.logbook.is_empty() {
                if let Some(ref flag) = cancel {
                    if flag.load(Ordering::Relaxed) {
                        warn!("run cancelled after generation {}", self.logbook.len() - 1);
                        cancelled = true;
                        break;
                    }
                }
                if let Some(limit) = self.config.time_limit_ms {
                    if start.elapsed().as_millis() >= u128::from(limit) {
                        warn!(
                            "time limit of {limit} ms reached after generation {}",
                            self.logbook.len() - 1
                        );
                        timed_out = true;
                        break;
                    }
                }
            }
            self.step()?;
        }

        let result = self.finish(cancelled, timed_out);
        info!(
            "finished after {} generations in {:?}, best fitness {:?}",
            result.generations,
            start.elapsed(),
            result.best_fitness()
        );
        Ok(result)
    }

    /// Stops the run here and hands back everything recorded so far.
    pub fn into_result(self) -> EvolutionResult {
        self.finish(false, false)
    }

    fn finish(self, cancelled: bool, timed_out: bool) -> EvolutionResult {
        EvolutionResult {
            population: self.population,
            generations: self.logbook.len().saturating_sub(1),
            logbook: self.logbook,
            archive: self.archive,
            cancelled,
            timed_out,
        }
    }

    // ---- transitions ----

    fn evaluate(&mut self) -> Result<()> {
        let parallel = self.config.parallel;
        let calls = &mut self.evaluations;
        evaluate_pending(&self.oracle, &mut self.population, parallel, calls)?;
        evaluate_pending(&self.oracle, &mut self.offspring, parallel, calls)?;

        self.phase = if !self.offspring.is_empty() {
            Phase::Replacing
        } else if self.logbook.is_empty() {
            Phase::Reporting
        } else {
            Phase::Selecting
        };
        Ok(())
    }

    fn select(&mut self) {
        self.parents = self
            .selector
            .select(&self.population, self.config.offspring_count, &mut self.rng);
        self.phase = Phase::Recombining;
    }

    fn recombine(&mut self) -> Result<()> {
        let offspring = vary(
            &self.parents,
            &self.crossover,
            &self.mutator,
            &self.config,
            &mut self.rng,
        )?;
        self.offspring_new = offspring.iter().map(|o| !o.is_evaluated()).collect();
        self.offspring = offspring;
        self.parents.clear();
        self.phase = Phase::Evaluating;
        Ok(())
    }

    fn replace(&mut self) {
        let offspring = std::mem::take(&mut self.offspring);
        let offspring_new = std::mem::take(&mut self.offspring_new);
        let children = offspring.into_iter().zip(offspring_new);

        let pool: Vec<(Individual, bool)> = match self.config.replacement {
            Replacement::MuPlusLambda => {
                let parents = std::mem::take(&mut self.population)
                    .into_iter()
                    .zip(std::mem::take(&mut self.unreported));
                parents.chain(children).collect()
            }
            Replacement::MuCommaLambda => children.collect(),
        };

        self.retain_best(pool);
        self.phase = Phase::Reporting;
    }

    fn retain_best(&mut self, pool: Vec<(Individual, bool)>) {
        let (population, unreported): (Vec<_>, Vec<_>) =
            keep_best(pool, self.config.population_size).into_iter().unzip();
        self.population = population;
        self.unreported = unreported;
    }

    fn report(&mut self) -> GenerationStats {
        if self.logbook.is_empty() {
            // generation 0 has not been through a replacement yet
            let pool = std::mem::take(&mut self.population)
                .into_iter()
                .zip(std::mem::take(&mut self.unreported))
                .collect();
            self.retain_best(pool);
        }

        let generation = self.logbook.len();
        let stats =
            GenerationStats::from_population(generation, self.evaluations, &self.population);
        self.evaluations = 0;

        let fresh = self
            .population
            .iter()
            .zip(&self.unreported)
            .filter(|&(_, &new)| new)
            .map(|(ind, _)| ind.clone());
        let admitted = self.archive.update(fresh);
        self.unreported.iter_mut().for_each(|new| *new = false);

        debug!(
            "gen {generation}: evals={} mean={:.3} std={:.3} min={} max={} archived={admitted}",
            stats.evaluations, stats.mean, stats.std, stats.min, stats.max
        );

        self.logbook.push(stats);
        if let Some(observer) = self.observer.as_mut() {
            observer(&stats);
        }

        self.phase = if generation >= self.config.generations {
            Phase::Terminated
        } else {
            Phase::Evaluating
        };
        stats
    }
}

/// Crossover then mutation over consecutive parent pairs.
///
/// An odd last parent skips crossover. Offspring whose genome was not
/// touched keep their parent's cached fitness.
fn vary<C: Crossover, M: Mutator, R: Rng>(
    parents: &[Individual],
    crossover: &C,
    mutator: &M,
    config: &EvolutionConfig,
    rng: &mut R,
) -> Result<Vec<Individual>> {
    let length = config.genome_length;
    let mut offspring = Vec::with_capacity(parents.len());

    for pair in parents.chunks(2) {
        let mut children = pair.to_vec();
        if let [a, b] = pair {
            if rng.random::<f64>() < config.crossover_rate {
                let (g1, g2) = crossover.crossover(a.genome(), b.genome(), rng)?;
                g1.check_length(length)?;
                g2.check_length(length)?;
                children = vec![Individual::new(g1), Individual::new(g2)];
            }
        }

        for child in children {
            if rng.random::<f64>() < config.mutation_rate {
                let mutated = mutator.mutate(child.genome(), rng);
                mutated.check_length(length)?;
                offspring.push(Individual::new(mutated));
            } else {
                offspring.push(child);
            }
        }
    }

    Ok(offspring)
}

/// Keeps the `n` fittest entries; earlier entries win ties.
fn keep_best(mut pool: Vec<(Individual, bool)>, n: usize) -> Vec<(Individual, bool)> {
    // stable sort, descending
    pool.sort_by(|a, b| b.0.rank_key().total_cmp(&a.0.rank_key()));
    pool.truncate(n);
    pool
}

/// Scores every unevaluated individual, adding each successful oracle call
/// to `calls` as it completes.
///
/// Calls that succeed before a failure stay counted; their individuals keep
/// the cached fitness and are skipped on retry.
fn evaluate_pending<O: FitnessOracle>(
    oracle: &O,
    individuals: &mut [Individual],
    parallel: bool,
    calls: &mut usize,
) -> Result<()> {
    #[cfg(feature = "parallel")]
    {
        if parallel {
            use rayon::prelude::*;
            let outcomes: Vec<Result<bool>> = individuals
                .par_iter_mut()
                .map(|ind| ind.evaluate_with(oracle))
                .collect();

            let mut first_error = None;
            for outcome in outcomes {
                match outcome {
                    Ok(called) => *calls += usize::from(called),
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }
            return first_error.map_or(Ok(()), Err);
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    for ind in individuals.iter_mut() {
        if ind.evaluate_with(oracle)? {
            *calls += 1;
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvolveError;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    fn count_ones(g: &Genome) -> Result<f64> {
        Ok(g.count_ones() as f64)
    }

    fn small_config(seed: u64) -> EvolutionConfig {
        EvolutionConfig::default()
            .with_genome_length(20)
            .with_population_size(40)
            .with_offspring_count(40)
            .with_generations(40)
            .with_seed(seed)
    }

    #[test]
    fn test_onemax_convergence() {
        let result = Engine::new(small_config(42).with_generations(60), count_ones)
            .unwrap()
            .run()
            .unwrap();

        let best = result.best_fitness().unwrap();
        assert!(best >= 18.0, "expected >= 18 of 20 bits, got {best}");
        assert_eq!(result.generations, 60);
        assert!(!result.cancelled && !result.timed_out);
    }

    #[test]
    fn test_log_has_one_record_per_generation() {
        let result = Engine::new(small_config(1).with_generations(25), count_ones)
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(result.logbook.len(), 26);
        for (i, record) in result.logbook.records().iter().enumerate() {
            assert_eq!(record.generation, i);
            assert!(record.min <= record.mean && record.mean <= record.max);
            assert!(record.std >= 0.0);
        }
        assert_eq!(result.logbook.records()[0].evaluations, 40);
    }

    #[test]
    fn test_mu_plus_lambda_never_regresses() {
        for seed in 0..5 {
            let result = Engine::new(small_config(seed), count_ones)
                .unwrap()
                .run()
                .unwrap();
            for w in result.logbook.max_series().windows(2) {
                assert!(w[1] >= w[0], "seed {seed}: max fell from {} to {}", w[0], w[1]);
            }
            // mu+lambda also keeps the worst survivor from dropping
            for w in result.logbook.records().windows(2) {
                assert!(w[1].min >= w[0].min);
            }
        }
    }

    #[test]
    fn test_no_variation_keeps_initial_individuals() {
        let calls = AtomicUsize::new(0);
        let oracle = |g: &Genome| -> Result<f64> {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok(g.count_ones() as f64)
        };
        let config = EvolutionConfig::default()
            .with_genome_length(4)
            .with_population_size(4)
            .with_offspring_count(4)
            .with_generations(1)
            .with_crossover_rate(0.0)
            .with_mutation_rate(0.0)
            .with_seed(7);

        let mut engine = Engine::new(config, &oracle).unwrap();
        let gen0 = engine.step().unwrap().unwrap();
        let initial: Vec<Individual> = engine.population().to_vec();
        let gen1 = engine.step().unwrap().unwrap();
        assert_eq!(engine.phase(), Phase::Terminated);

        // offspring were unmodified copies, so nothing new was scored
        assert_eq!(calls.load(Ordering::Relaxed), 4);
        assert_eq!(gen0.evaluations, 4);
        assert_eq!(gen1.evaluations, 0);

        let survivors = engine.population();
        assert_eq!(survivors.len(), 4);
        for s in survivors {
            assert!(initial.iter().any(|i| i.genome() == s.genome()));
        }
        assert_eq!(gen1.max, gen0.max);
        // survivors dominate the initial population rank by rank
        for (s, i) in survivors.iter().zip(&initial) {
            assert!(s.fitness() >= i.fitness());
        }
    }

    #[test]
    fn test_constant_fitness() {
        let config = EvolutionConfig::default()
            .with_genome_length(2)
            .with_population_size(10)
            .with_offspring_count(10)
            .with_generations(6)
            .with_seed(3);
        let result = Engine::new(config, |_: &Genome| -> Result<f64> { Ok(5.0) })
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(result.logbook.len(), 7);
        for r in &result.logbook {
            assert_eq!((r.mean, r.std, r.min, r.max), (5.0, 0.0, 5.0, 5.0));
        }
        assert_eq!(result.archive.len(), 7);
        assert!(result.archive.iter().all(|i| i.fitness() == Some(5.0)));
    }

    #[test]
    fn test_archive_ignores_carried_over_survivors() {
        let config = EvolutionConfig::default()
            .with_genome_length(10)
            .with_population_size(8)
            .with_offspring_count(8)
            .with_generations(5)
            .with_archive_capacity(3)
            .with_crossover_rate(0.0)
            .with_mutation_rate(0.0)
            .with_seed(11);

        let mut engine = Engine::new(config, count_ones).unwrap();
        engine.step().unwrap();
        let mut expected = EliteArchive::new(3);
        expected.update(engine.population().iter().cloned());

        let result = engine.run().unwrap();
        assert_eq!(result.archive, expected);
        assert_eq!(result.logbook.total_evaluations(), 8);
    }

    #[test]
    fn test_zero_generations() {
        let mut engine = Engine::new(small_config(5).with_generations(0), count_ones).unwrap();
        assert_eq!(engine.phase(), Phase::Initialized);
        assert_eq!(engine.generation(), None);

        let stats = engine.step().unwrap().unwrap();
        assert_eq!(stats.generation, 0);
        assert_eq!(engine.phase(), Phase::Terminated);
        assert!(engine.step().unwrap().is_none());

        let result = engine.into_result();
        assert_eq!(result.generations, 0);
        assert_eq!(result.logbook.len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = small_config(0).with_crossover_rate(1.5);
        assert!(matches!(
            Engine::new(config, count_ones),
            Err(EvolveError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_oracle_failure_parks_in_evaluating() {
        let calls = AtomicUsize::new(0);
        let oracle = |g: &Genome| -> Result<f64> {
            if calls.fetch_add(1, Ordering::Relaxed) >= 6 {
                return Err(EvolveError::Oracle("scoring backend unavailable".into()));
            }
            Ok(g.count_ones() as f64)
        };
        let config = small_config(2)
            .with_population_size(4)
            .with_offspring_count(4)
            .with_mutation_rate(1.0)
            .with_bit_flip_rate(1.0);

        let mut engine = Engine::new(config, &oracle).unwrap();
        engine.step().unwrap();
        let err = engine.step().unwrap_err();
        assert_eq!(err, EvolveError::Oracle("scoring backend unavailable".into()));
        assert_eq!(engine.phase(), Phase::Evaluating);
        assert_eq!(engine.generation(), Some(0));
        assert_eq!(engine.logbook().len(), 1);
        assert_eq!(engine.population().len(), 4);
    }

    fn fails_once_at(call: usize, calls: &AtomicUsize, g: &Genome) -> Result<f64> {
        if calls.fetch_add(1, Ordering::Relaxed) == call {
            return Err(EvolveError::Oracle("transient scoring failure".into()));
        }
        Ok(g.count_ones() as f64)
    }

    fn always_rescored(seed: u64) -> EvolutionConfig {
        small_config(seed)
            .with_population_size(4)
            .with_offspring_count(4)
            .with_generations(3)
            .with_mutation_rate(1.0)
            .with_bit_flip_rate(1.0)
    }

    #[test]
    fn test_retry_after_oracle_failure_counts_every_call() {
        let calls = AtomicUsize::new(0);
        let oracle = |g: &Genome| -> Result<f64> { fails_once_at(6, &calls, g) };

        let mut engine = Engine::new(always_rescored(13), &oracle).unwrap();
        assert_eq!(engine.step().unwrap().unwrap().evaluations, 4);
        assert!(engine.step().is_err());
        assert_eq!(engine.phase(), Phase::Evaluating);

        // two offspring were scored before the failure, two after
        let gen1 = engine.step().unwrap().unwrap();
        assert_eq!(gen1.generation, 1);
        assert_eq!(gen1.evaluations, 4);

        while engine.step().unwrap().is_some() {}
        let result = engine.into_result();
        assert_eq!(result.logbook.len(), 4);
        let successful = calls.load(Ordering::Relaxed) - 1;
        assert_eq!(result.logbook.total_evaluations(), successful);
        assert_eq!(successful, 4 * 4);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_retry_counts_every_call() {
        let calls = AtomicUsize::new(0);
        let oracle = |g: &Genome| -> Result<f64> { fails_once_at(6, &calls, g) };

        let config = always_rescored(13).with_parallel(true);
        let mut engine = Engine::new(config, &oracle).unwrap();
        engine.step().unwrap();
        assert!(engine.step().is_err());
        while engine.step().unwrap().is_some() {}

        let result = engine.into_result();
        let successful = calls.load(Ordering::Relaxed) - 1;
        assert_eq!(result.logbook.total_evaluations(), successful);
    }

    #[test]
    fn test_unbounded_archive_capacity() {
        let config = small_config(17)
            .with_generations(5)
            .with_archive_capacity(usize::MAX);
        assert!(config.validate().is_ok());

        let result = Engine::new(config, count_ones).unwrap().run().unwrap();
        assert_eq!(result.archive.capacity(), usize::MAX);
        // every freshly scored survivor fits
        assert!(result.archive.len() >= 40);
        assert_eq!(result.best_fitness(), result.logbook.last().map(|r| r.max));
    }

    #[test]
    fn test_same_seed_same_run() {
        let a = Engine::new(small_config(99), count_ones).unwrap().run().unwrap();
        let b = Engine::new(small_config(99), count_ones).unwrap().run().unwrap();
        assert_eq!(a.logbook, b.logbook);
        assert_eq!(a.archive, b.archive);
        assert_eq!(a.population, b.population);
    }

    #[test]
    fn test_population_size_is_constant() {
        let mut engine = Engine::new(small_config(4).with_offspring_count(17), count_ones).unwrap();
        while engine.step().unwrap().is_some() {
            assert_eq!(engine.population().len(), 40);
            assert!(engine.population().iter().all(Individual::is_evaluated));
            assert!(engine.population().iter().all(|i| i.genome().len() == 20));
        }
    }

    #[test]
    fn test_comma_replacement() {
        let config = small_config(8)
            .with_population_size(20)
            .with_offspring_count(60)
            .with_replacement(Replacement::MuCommaLambda);
        let result = Engine::new(config, count_ones).unwrap().run().unwrap();
        assert_eq!(result.population.len(), 20);
        assert_eq!(result.logbook.len(), 41);
        assert!(result.best_fitness().unwrap() >= 15.0);
    }

    #[test]
    fn test_cancellation_before_second_generation() {
        let cancel = Arc::new(AtomicBool::new(true));
        let result = Engine::new(small_config(6), count_ones)
            .unwrap()
            .run_with_cancel(Some(cancel))
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.generations, 0);
        assert_eq!(result.logbook.len(), 1);
        assert_eq!(result.population.len(), 40);
        assert!(!result.archive.is_empty());
    }

    #[test]
    fn test_cancellation_from_another_thread() {
        let config = small_config(6).with_generations(1_000_000);
        let cancel = Arc::new(AtomicBool::new(false));

        let cancel_clone = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(10));
            cancel_clone.store(true, Ordering::Relaxed);
        });

        let result = Engine::new(config, count_ones)
            .unwrap()
            .run_with_cancel(Some(cancel))
            .unwrap();
        assert!(result.cancelled);
        assert!(result.generations < 1_000_000);
        assert_eq!(result.logbook.len(), result.generations + 1);
    }

    #[test]
    fn test_time_limit() {
        let slow = |g: &Genome| -> Result<f64> {
            std::thread::sleep(std::time::Duration::from_millis(1));
            Ok(g.count_ones() as f64)
        };
        let config = small_config(3)
            .with_population_size(5)
            .with_offspring_count(5)
            .with_mutation_rate(1.0)
            .with_generations(10_000)
            .with_time_limit_ms(20);
        let result = Engine::new(config, slow).unwrap().run().unwrap();
        assert!(result.timed_out);
        assert!(result.generations < 10_000);
    }

    #[test]
    fn test_observer_sees_every_generation() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let result = Engine::new(small_config(12).with_generations(9), count_ones)
            .unwrap()
            .with_observer(move |s: &GenerationStats| sink.lock().unwrap().push(s.generation))
            .run()
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), (0..=9).collect::<Vec<_>>());
        assert_eq!(result.fitness_history().len(), 10);
    }

    // ---- injected operators ----

    struct FirstOnly;

    impl Selector for FirstOnly {
        fn select<R: Rng>(
            &self,
            population: &[Individual],
            k: usize,
            _rng: &mut R,
        ) -> Vec<Individual> {
            vec![population[0].clone(); k]
        }
    }

    struct Truncating;

    impl Mutator for Truncating {
        fn mutate<R: Rng>(&self, genome: &Genome, _rng: &mut R) -> Genome {
            Genome::new(genome.bits()[1..].to_vec())
        }
    }

    #[test]
    fn test_custom_selector() {
        let config = small_config(21).with_crossover_rate(0.0).with_mutation_rate(0.0);
        let mut engine = Engine::with_operators(
            config,
            count_ones,
            FirstOnly,
            TwoPointCrossover,
            FlipBitMutation::default(),
        )
        .unwrap();
        engine.step().unwrap();
        let best = engine.population()[0].clone();
        let gen1 = engine.step().unwrap().unwrap();
        // every offspring is a copy of the best that keeps its fitness
        assert_eq!(gen1.evaluations, 0);
        assert_eq!(engine.population()[0], best);
        assert!(engine
            .population()
            .iter()
            .all(|i| i.fitness() == best.fitness()));
    }

    #[test]
    fn test_malformed_operator_output_is_rejected() {
        let config = small_config(0).with_mutation_rate(1.0);
        let mut engine = Engine::with_operators(
            config,
            count_ones,
            Tournament::default(),
            TwoPointCrossover,
            Truncating,
        )
        .unwrap();
        engine.step().unwrap();
        assert_eq!(
            engine.step().unwrap_err(),
            EvolveError::InvalidGenomeLength {
                expected: 20,
                actual: 19
            }
        );
        assert_eq!(engine.phase(), Phase::Recombining);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let seq = Engine::new(small_config(31), count_ones).unwrap().run().unwrap();
        let par = Engine::new(small_config(31).with_parallel(true), count_ones)
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(seq.logbook, par.logbook);
        assert_eq!(seq.archive, par.archive);
    }
}
