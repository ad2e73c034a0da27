//! Elitist selection and next-generation assembly.

use log::debug;
use rand::seq::SliceRandom;

use super::genome::SimRng;
use crate::compute::Creature;
use crate::schema::{CourseConfig, ELITE_COUNT};

/// Rank creatures by fitness, highest first. Equal fitness keeps the current order.
pub fn rank_by_fitness(population: &mut [Creature]) {
    population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

/// Build the next generation from a ranked-in-place population.
///
/// The top [`ELITE_COUNT`] creatures are moved over untouched (their transient
/// state is cleared later by the reset). The rest are children of two parents
/// drawn uniformly, with replacement, from the top `breeding_pool`.
pub fn next_generation(
    mut population: Vec<Creature>,
    config: &CourseConfig,
    rng: &mut SimRng,
) -> Vec<Creature> {
    rank_by_fitness(&mut population);

    let size = config.population_size;
    let elitism = ELITE_COUNT.min(population.len());
    let pool_size = config.evolution.breeding_pool.min(population.len());
    let pool = &population[..pool_size];

    let mut children = Vec::with_capacity(size.saturating_sub(elitism));
    while elitism + children.len() < size {
        let (Some(parent1), Some(parent2)) = (pool.choose(rng), pool.choose(rng)) else {
            break;
        };
        let mut child = rng.crossover(parent1, parent2, config);
        rng.mutate(&mut child, config);
        children.push(child);
    }
    debug!(
        "Bred {} children from a pool of {}, keeping {} elites",
        children.len(),
        pool_size,
        elitism
    );

    population.truncate(elitism);
    population.extend(children);
    population
}
