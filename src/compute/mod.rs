//! Compute module - Creature policy, course simulation and evolution.

mod course;
mod creature;
mod geometry;
mod q_table;

pub mod evolution;

pub use course::*;
pub use creature::*;
pub use geometry::*;
pub use q_table::*;
