//! Bounded archive of the best individuals seen during a run.

use super::types::Individual;

/// Upper bound on the entries reserved up front.
const PREALLOC_LIMIT: usize = 1024;

/// The top-K individuals ever offered, sorted by descending fitness.
///
/// Ties keep insertion order, so among equally fit individuals the one
/// seen first ranks higher and is the last to be evicted. A full archive
/// only admits an individual strictly fitter than its current worst entry.
///
/// ```
/// use driver_ga::ga::{EliteArchive, Genome, Individual};
///
/// let mut archive = EliteArchive::new(2);
/// for (i, f) in [3.0, 8.0, 5.0, 8.0].into_iter().enumerate() {
///     archive.insert(Individual::evaluated(Genome::from_u64(i as u64, 4), f));
/// }
/// let kept: Vec<f64> = archive.iter().filter_map(|ind| ind.fitness()).collect();
/// assert_eq!(kept, vec![8.0, 8.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EliteArchive {
    capacity: usize,
    entries: Vec<Individual>,
}

impl EliteArchive {
    /// An empty archive holding at most `capacity` individuals.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity.min(PREALLOC_LIMIT)),
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been admitted yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The fittest individual, if any.
    pub fn best(&self) -> Option<&Individual> {
        self.entries.first()
    }

    /// Fitness of the entry that would be evicted next.
    pub fn worst_fitness(&self) -> Option<f64> {
        self.entries.last().and_then(Individual::fitness)
    }

    /// Entries, fittest first.
    pub fn entries(&self) -> &[Individual] {
        &self.entries
    }

    /// Iterates entries, fittest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Individual> {
        self.entries.iter()
    }

    /// Consumes the archive, returning its entries fittest first.
    pub fn into_entries(self) -> Vec<Individual> {
        self.entries
    }

    /// Offers one individual. Returns `true` if it was admitted.
    ///
    /// Unevaluated individuals are never admitted.
    pub fn insert(&mut self, individual: Individual) -> bool {
        let Some(fitness) = individual.fitness() else {
            return false;
        };

        if self.entries.len() >= self.capacity {
            match self.worst_fitness() {
                Some(worst) if fitness > worst => {}
                _ => return false,
            }
        }

        // after every entry at least as fit: earlier arrivals win ties
        let pos = self.entries.partition_point(|e| e.rank_key() >= fitness);
        self.entries.insert(pos, individual);
        self.entries.truncate(self.capacity);
        true
    }

    /// Offers every individual in order. Returns how many were admitted.
    ///
    /// An admitted individual may be evicted again by a later one from the
    /// same batch.
    pub fn update<I>(&mut self, individuals: I) -> usize
    where
        I: IntoIterator<Item = Individual>,
    {
        individuals
            .into_iter()
            .map(|ind| self.insert(ind))
            .filter(|&admitted| admitted)
            .count()
    }
}

impl<'a> IntoIterator for &'a EliteArchive {
    type Item = &'a Individual;
    type IntoIter = std::slice::Iter<'a, Individual>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
