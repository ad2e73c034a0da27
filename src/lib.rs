//! Creature Course - creatures learning to cross an obstacle field.
//!
//! A population of creatures starts at a fixed point and must reach a goal
//! through a field of static rectangular obstacles. Each creature refines a
//! tabular Q-learning policy while it is alive; between generations the
//! population is bred with elitism, crossover and mutation of both its genome
//! and its Q-table.
//!
//! # Architecture
//!
//! - `schema`: Configuration and genome types
//! - `compute`: Geometry, creature policy, course simulation and evolution
//! - `persistence`: Saving and restoring the best creature
//!
//! # Example
//!
//! ```rust,no_run
//! use creature_course::{CourseConfig, ObstacleCourse};
//!
//! let config = CourseConfig {
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//! let mut course = ObstacleCourse::new(config).expect("valid config");
//!
//! for _ in 0..10 {
//!     while !course.is_generation_complete() {
//!         course.tick();
//!     }
//!     course.evolve();
//!     course.reset_population();
//! }
//!
//! println!("Best fitness after 10 generations: {}", course.best_fitness());
//! ```

pub mod compute;
pub mod persistence;
pub mod schema;

// Re-export commonly used types
pub use compute::{Creature, CreatureStatus, ObstacleCourse};
pub use persistence::PersistenceError;
pub use schema::{ConfigError, CourseConfig};
