//! Evolution engine: selection, crossover and mutation between generations.
//!
//! # Overview
//!
//! Each generation the population is ranked by fitness. The two best
//! creatures survive unchanged; every other slot is filled by a child of two
//! parents drawn from the top of the ranking.
//!
//! - **Genome Operations** (`genome`): [`SimRng`] owns all randomness and
//!   implements crossover and mutation for both genetic representations.
//!   Genes are chosen per index by coin flip; Q-tables are merged by key with
//!   the second parent winning shared states.
//! - **Breeding** (`breeding`): elitism and parent sampling.
//! - **History** (`history`): per-generation statistics.
//!
//! # Example
//!
//! ```rust,no_run
//! use creature_course::compute::evolution::{SimRng, next_generation};
//! use creature_course::compute::Creature;
//! use creature_course::schema::CourseConfig;
//!
//! let config = CourseConfig::default();
//! let mut rng = SimRng::new(7);
//! let population: Vec<Creature> = (0..config.population_size)
//!     .map(|_| {
//!         let genome = rng.random_genome(config.genome_len());
//!         Creature::new(config.start_point(), genome, config.learning.epsilon_start)
//!     })
//!     .collect();
//!
//! let next = next_generation(population, &config, &mut rng);
//! assert_eq!(next.len(), config.population_size);
//! ```

mod breeding;
mod genome;
mod history;

pub use breeding::{next_generation, rank_by_fitness};
pub use genome::SimRng;
pub use history::{EvolutionHistory, GenerationSummary};
