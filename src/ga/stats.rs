//! Per-generation population statistics.

use super::types::Individual;

/// Fitness summary of one generation's survivors.
///
/// `std` is the population standard deviation (divides by `n`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// Generation index; 0 is the initial population.
    pub generation: usize,

    /// Oracle calls made while producing this generation.
    pub evaluations: usize,

    /// Mean fitness.
    pub mean: f64,

    /// Standard deviation of fitness.
    pub std: f64,

    /// Lowest fitness.
    pub min: f64,

    /// Highest fitness.
    pub max: f64,
}

impl GenerationStats {
    /// Summarizes an evaluated, non-empty population.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn from_population(
        generation: usize,
        evaluations: usize,
        population: &[Individual],
    ) -> Self {
        assert!(!population.is_empty(), "population must not be empty");

        let scores: Vec<f64> = population.iter().map(Individual::rank_key).collect();
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n;
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            generation,
            evaluations,
            mean,
            std: variance.sqrt(),
            min,
            max,
        }
    }
}

/// Ordered log of [`GenerationStats`], one record per generation.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Logbook {
    records: Vec<GenerationStats>,
}

impl Logbook {
    /// An empty logbook.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            records: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, record: GenerationStats) {
        debug_assert_eq!(record.generation, self.records.len());
        self.records.push(record);
    }

    /// Records in generation order.
    pub fn records(&self) -> &[GenerationStats] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recent record.
    pub fn last(&self) -> Option<&GenerationStats> {
        self.records.last()
    }

    /// Mean fitness per generation.
    pub fn mean_series(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.mean).collect()
    }

    /// Maximum fitness per generation.
    pub fn max_series(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.max).collect()
    }

    /// Best fitness seen up to and including each generation.
    pub fn best_so_far(&self) -> Vec<f64> {
        self.records
            .iter()
            .scan(f64::NEG_INFINITY, |best, r| {
                *best = best.max(r.max);
                Some(*best)
            })
            .collect()
    }

    /// Total oracle calls over the whole run.
    pub fn total_evaluations(&self) -> usize {
        self.records.iter().map(|r| r.evaluations).sum()
    }
}

impl<'a> IntoIterator for &'a Logbook {
    type Item = &'a GenerationStats;
    type IntoIter = std::slice::Iter<'a, GenerationStats>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::Genome;

    fn population(scores: &[f64]) -> Vec<Individual> {
        scores
            .iter()
            .map(|&s| Individual::evaluated(Genome::from_u64(0, 4), s))
            .collect()
    }

    #[test]
    fn test_summary_values() {
        let scores = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = GenerationStats::from_population(3, 4, &population(&scores));
        assert_eq!(stats.generation, 3);
        assert_eq!(stats.evaluations, 4);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.std - 2.0).abs() < 1e-12);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn test_constant_population() {
        let stats = GenerationStats::from_population(0, 10, &population(&[5.0; 10]));
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.min, 5.0);
        assert_eq!(stats.max, 5.0);
    }

    #[test]
    fn test_single_individual() {
        let stats = GenerationStats::from_population(0, 1, &population(&[3.5]));
        assert_eq!(stats.mean, 3.5);
        assert_eq!(stats.std, 0.0);
    }

    #[test]
    #[should_panic(expected = "population must not be empty")]
    fn test_empty_population_panics() {
        GenerationStats::from_population(0, 0, &[]);
    }

    #[test]
    fn test_logbook_series() {
        let mut log = Logbook::new();
        assert!(log.is_empty());
        for (gen, scores) in [vec![1.0, 3.0], vec![2.0, 2.0], vec![4.0, 6.0]].iter().enumerate() {
            log.push(GenerationStats::from_population(gen, 2, &population(scores)));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.mean_series(), vec![2.0, 2.0, 5.0]);
        assert_eq!(log.max_series(), vec![3.0, 2.0, 6.0]);
        assert_eq!(log.best_so_far(), vec![3.0, 3.0, 6.0]);
        assert_eq!(log.total_evaluations(), 6);
        assert_eq!(log.last().map(|r| r.generation), Some(2));
    }
}
