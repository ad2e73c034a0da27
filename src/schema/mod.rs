//! Schema module - Configuration and genome types for the obstacle course.

mod config;
mod genome;

pub use config::*;
pub use genome::*;
