use std::collections::{HashMap, HashSet};

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::debug;

use crate::config::RECENCY_DECAY_BASE;
use crate::recipe_model::{Recipe, RecipeIdentity};

/// Entries of the recent usage sequence that make up one "week".
const DAYS_PER_WEEK: usize = 7;

/// Picks recipes at random while steering away from ones used recently.
///
/// The random source is passed into `select` so that concurrent plans never
/// share generator state and tests can replay an exact sequence of draws.
#[derive(Debug, Clone)]
pub struct RecencyWeightedSampler {
    decay_base: f64,
}

impl Default for RecencyWeightedSampler {
    fn default() -> Self {
        Self::new(RECENCY_DECAY_BASE)
    }
}

impl RecencyWeightedSampler {
    pub fn new(decay_base: f64) -> Self {
        Self { decay_base }
    }

    /// Computes the selection weight of every candidate identity.
    ///
    /// `recent_usage` is ordered most recent first. A match at position `i`
    /// multiplies the weight by `decay_base^(1 / weeks_ago)` where
    /// `weeks_ago = i / 7 + 1`, so repeated use compounds but never reaches zero.
    pub fn weights(
        &self,
        candidates: &[Recipe],
        recent_usage: &[Recipe],
    ) -> HashMap<RecipeIdentity, f64> {
        let mut weights: HashMap<RecipeIdentity, f64> = candidates
            .iter()
            .map(|recipe| (recipe.identity(), 1.0))
            .collect();

        for (position, previous) in recent_usage.iter().enumerate() {
            if let Some(weight) = weights.get_mut(&previous.identity()) {
                let weeks_ago = (position / DAYS_PER_WEEK + 1) as f64;
                *weight *= self.decay_base.powf(1.0 / weeks_ago);
            }
        }
        weights
    }

    /// Draws `min(day_count, distinct candidates)` recipes without replacement.
    ///
    /// Candidates sharing an identity are collapsed to their first occurrence
    /// so a schedule never repeats a recipe. An empty candidate list yields an
    /// empty schedule.
    pub fn select<R: Rng + ?Sized>(
        &self,
        candidates: &[Recipe],
        recent_usage: &[Recipe],
        day_count: usize,
        rng: &mut R,
    ) -> Vec<Recipe> {
        let weights = self.weights(candidates, recent_usage);

        let mut seen = HashSet::new();
        let mut pool: Vec<(&Recipe, f64)> = candidates
            .iter()
            .filter(|recipe| seen.insert(recipe.identity()))
            .map(|recipe| (recipe, weights.get(&recipe.identity()).copied().unwrap_or(1.0)))
            .collect();

        let target = day_count.min(pool.len());
        let mut selected = Vec::with_capacity(target);

        while selected.len() < target {
            let index = draw_index(&pool, rng);
            let (recipe, weight) = pool.remove(index);
            debug!(recipe = %recipe.name, weight, "sampled recipe");
            selected.push(recipe.clone());
        }
        selected
    }
}

/// Weighted choice over the remaining pool, uniform when the weights are
/// unusable (all zero or not finite).
fn draw_index<R: Rng + ?Sized>(pool: &[(&Recipe, f64)], rng: &mut R) -> usize {
    match WeightedIndex::new(pool.iter().map(|(_, weight)| *weight)) {
        Ok(distribution) => distribution.sample(rng),
        Err(_) => rng.gen_range(0..pool.len()),
    }
}
