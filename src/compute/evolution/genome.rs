//! Genome and Q-table manipulation utilities for evolutionary search.
//!
//! Provides random generation, crossover, and mutation operations.

use rand::prelude::*;
use rand_distr::StandardNormal;

use crate::compute::{Creature, QTable};
use crate::schema::{CourseConfig, Genome};

/// Random number generator shared by exploration and breeding.
///
/// Implements [`RngCore`], so it can be passed anywhere an `impl Rng` is expected.
#[derive(Debug, Clone)]
pub struct SimRng {
    rng: StdRng,
}

impl SimRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is set, entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::random, Self::new)
    }

    /// Uniform genome of `len` genes in `[-1, 1]`.
    pub fn random_genome(&mut self, len: usize) -> Genome {
        Genome::new((0..len).map(|_| self.rng.gen_range(-1.0..=1.0)).collect())
    }

    /// Per-gene coin flip between the two parents.
    pub fn crossover_genes(&mut self, parent1: &Genome, parent2: &Genome) -> Genome {
        Genome::new(
            parent1
                .genes
                .iter()
                .zip(&parent2.genes)
                .map(|(&a, &b)| if self.rng.gen_bool(0.5) { a } else { b })
                .collect(),
        )
    }

    /// Child at the start point with a crossed-over genome and the merged
    /// parent Q-tables (parent 2's rows win on shared states).
    pub fn crossover(
        &mut self,
        parent1: &Creature,
        parent2: &Creature,
        config: &CourseConfig,
    ) -> Creature {
        let genome = self.crossover_genes(&parent1.genome, &parent2.genome);
        let mut child = Creature::new(config.start_point(), genome, config.learning.epsilon_start);
        child.q_table = parent1.q_table.merged_with(&parent2.q_table);
        child
    }

    /// Replace each gene with a fresh uniform value with probability `rate`.
    pub fn mutate_genome(&mut self, genome: &mut Genome, rate: f32) {
        for gene in &mut genome.genes {
            if self.rng.r#gen::<f32>() < rate {
                *gene = self.rng.gen_range(-1.0..=1.0);
            }
        }
    }

    /// Add zero-mean Gaussian noise to each Q-value with probability `rate`.
    pub fn mutate_q_table(&mut self, table: &mut QTable, rate: f32, std_dev: f32) {
        for row in table.rows_mut() {
            for value in row.iter_mut() {
                if self.rng.r#gen::<f32>() < rate {
                    let noise: f32 = self.rng.sample(StandardNormal);
                    *value += noise * std_dev;
                }
            }
        }
    }

    /// Mutate a freshly bred child in place.
    pub fn mutate(&mut self, child: &mut Creature, config: &CourseConfig) {
        let rate = config.evolution.mutation_rate;
        self.mutate_genome(&mut child.genome, rate);
        self.mutate_q_table(&mut child.q_table, rate, config.evolution.q_mutation_std);
    }
}

impl RngCore for SimRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
