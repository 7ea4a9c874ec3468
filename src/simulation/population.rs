//! Truncation selection with elitism over a fixed set of brains.
//!
//! Brain `k` always drives agent `k`. Ranking sorts `(id, fitness)` pairs, so
//! slots never lose their identifier and no re-keying pass is needed.

use rand::Rng;
use tracing::{debug, warn};

use super::brain::Brain;
use super::brain::model::ModelReader;
use super::error::{Result, SimError};
use super::params::Params;

/// The brains of one training run, indexed by identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    brains: Vec<Brain>,
    generation: u32,
}

impl Population {
    /// Creates `params.population_size` randomly initialised brains.
    pub fn new<R: Rng + ?Sized>(params: &Params, rng: &mut R) -> Result<Self> {
        params.validate()?;
        let layer_sizes = params.layer_sizes();
        let brains = (0..params.population_size)
            .map(|id| Brain::new(id, &layer_sizes, params.initial_weight_scale, rng))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            brains,
            generation: 0,
        })
    }

    /// Wraps existing brains, re-numbering them `0..n` in order.
    pub fn from_brains(mut brains: Vec<Brain>) -> Result<Self> {
        let Some(first) = brains.first() else {
            return Err(SimError::Configuration(
                "population size must be at least 1".into(),
            ));
        };
        if let Some(odd) = brains.iter().find(|brain| !brain.same_topology(first)) {
            return Err(SimError::TopologyMismatch {
                expected: first.layer_sizes(),
                actual: odd.layer_sizes(),
            });
        }
        for (id, brain) in brains.iter_mut().enumerate() {
            brain.id = id;
        }

        Ok(Self {
            brains,
            generation: 0,
        })
    }

    /// Number of brains.
    pub fn len(&self) -> usize {
        self.brains.len()
    }

    /// Whether there are no brains. Constructors refuse empty populations.
    pub fn is_empty(&self) -> bool {
        self.brains.is_empty()
    }

    /// Number of completed `evolve` calls.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// The brain driving agent `id`.
    pub fn get(&self, id: usize) -> Option<&Brain> {
        self.brains.get(id)
    }

    /// All brains, ordered by identifier.
    pub fn brains(&self) -> &[Brain] {
        &self.brains
    }

    /// Replaces the worst half with mutated copies of the best half.
    ///
    /// `fitness[k]` scores brain `k`. Ranks are ascending (worst first) and
    /// stable, so ties keep identifier order. Rank `i` in the lower half takes
    /// a copy of rank `i + n/2` and is then mutated; the upper half survives
    /// untouched. With an odd size the best brain is not copied from; it and
    /// the median both carry over unchanged.
    ///
    /// Random draws are consumed pair by pair in rank order, and within a
    /// brain in the order documented on [`Brain::mutate`].
    pub fn evolve<R: Rng + ?Sized>(
        &mut self,
        fitness: &[f32],
        rate_percent: f32,
        magnitude: f32,
        rng: &mut R,
    ) -> Result<()> {
        if fitness.len() != self.brains.len() {
            return Err(SimError::FitnessLength {
                expected: self.brains.len(),
                actual: fitness.len(),
            });
        }

        let ranking = rank_ascending(fitness);
        let half = ranking.len() / 2;

        for (&worst, &best) in ranking[..half].iter().zip(&ranking[half..]) {
            let source = self.brains[best].clone();
            let target = &mut self.brains[worst];
            source.copy_into(target)?;
            target.mutate(rate_percent, magnitude, rng);
            debug!(
                from = best,
                into = worst,
                fitness = fitness[best],
                "cloned and mutated brain"
            );
        }

        self.generation += 1;
        Ok(())
    }

    /// Serializes every brain, prefixed with the brain count.
    pub fn save_to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.brains.len() as u32).to_le_bytes());
        for brain in &self.brains {
            brain.write_to(&mut out);
        }
        out
    }

    /// Replaces every brain's parameters from a population record.
    ///
    /// The count and every topology must match this population. Nothing is
    /// changed unless the whole record loads.
    pub fn load_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let mut reader = ModelReader::new(bytes);
        let count = reader.read_u32()? as usize;
        if count != self.brains.len() {
            return Err(SimError::CorruptModel(format!(
                "model holds {count} brains, population has {}",
                self.brains.len()
            )));
        }

        let loaded = self
            .brains
            .iter()
            .map(|brain| brain.read_record(&mut reader))
            .collect::<Result<Vec<_>>>()?;
        reader.finish()?;

        self.brains = loaded;
        Ok(())
    }

    /// Saves the population model to a file.
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        std::fs::write(path, self.save_to_bytes())?;
        Ok(())
    }

    /// Loads a population model from a file into this population.
    pub fn load_from_file(&mut self, path: &str) -> Result<()> {
        let bytes = std::fs::read(path)?;
        self.load_from_bytes(&bytes)
    }

    /// Builds a population from a saved model, or randomly if the model is unusable.
    ///
    /// Returns the population and the load error, if one occurred.
    pub fn load_or_random<R: Rng + ?Sized>(
        bytes: &[u8],
        params: &Params,
        rng: &mut R,
    ) -> Result<(Self, Option<SimError>)> {
        let mut population = Self::new(params, rng)?;
        match population.load_from_bytes(bytes) {
            Ok(()) => Ok((population, None)),
            Err(err) => {
                warn!(%err, "saved model rejected, starting from random brains");
                Ok((population, Some(err)))
            }
        }
    }
}

/// Identifiers ordered by ascending fitness; ties keep identifier order.
pub fn rank_ascending(fitness: &[f32]) -> Vec<usize> {
    let mut ranking: Vec<usize> = (0..fitness.len()).collect();
    ranking.sort_by(|&a, &b| fitness[a].total_cmp(&fitness[b]));
    ranking
}
