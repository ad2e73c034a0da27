//! Configuration types for the obstacle course simulation.

use serde::{Deserialize, Serialize};

use crate::compute::{Point, Rect};

fn default_cell_size() -> f32 {
    50.0
}

fn default_history_len() -> usize {
    10
}

/// Number of top-ranked creatures carried into the next generation unchanged.
pub const ELITE_COUNT: usize = 2;

/// Top-level course configuration. Values are fixed for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseConfig {
    /// Field width in pixels.
    pub width: f32,
    /// Field height in pixels.
    pub height: f32,
    /// Spawn point for every creature.
    pub start: (f32, f32),
    /// Goal point.
    pub goal: (f32, f32),
    /// Creature radius. Also the goal-reached threshold.
    pub creature_radius: f32,
    /// Distance covered by one cardinal move.
    pub step_size: f32,
    /// Edge length of the square tile used to discretize positions.
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    /// Static obstacle rectangles.
    pub obstacles: Vec<ObstacleConfig>,
    /// Number of creatures per generation.
    pub population_size: usize,
    /// Step cap per creature per generation.
    pub max_steps: usize,
    /// Length of the recent-position buffer used for the stagnation penalty.
    #[serde(default = "default_history_len")]
    pub history_len: usize,
    /// Q-learning and exploration parameters.
    #[serde(default)]
    pub learning: LearningConfig,
    /// Selection and mutation parameters.
    #[serde(default)]
    pub evolution: EvolutionConfig,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            start: (400.0, 550.0),
            goal: (750.0, 50.0),
            creature_radius: 5.0,
            step_size: 5.0,
            cell_size: default_cell_size(),
            obstacles: vec![
                ObstacleConfig::new(100.0, 150.0, 600.0, 20.0),
                ObstacleConfig::new(100.0, 300.0, 500.0, 20.0),
                ObstacleConfig::new(200.0, 450.0, 400.0, 20.0),
                ObstacleConfig::new(100.0, 150.0, 20.0, 300.0),
                ObstacleConfig::new(700.0, 150.0, 20.0, 300.0),
                ObstacleConfig::new(300.0, 300.0, 20.0, 150.0),
                ObstacleConfig::new(500.0, 0.0, 20.0, 300.0),
            ],
            population_size: 100,
            max_steps: 1000,
            history_len: default_history_len(),
            learning: LearningConfig::default(),
            evolution: EvolutionConfig::default(),
            random_seed: None,
        }
    }
}

/// An axis-aligned obstacle rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ObstacleConfig {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convert to a geometry rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Tabular Q-learning and epsilon-greedy exploration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Temporal-difference step size (alpha).
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    /// Future reward discount (gamma).
    #[serde(default = "default_discount_factor")]
    pub discount_factor: f32,
    /// Exploration rate at the start of every generation.
    #[serde(default = "default_epsilon_start")]
    pub epsilon_start: f32,
    /// Multiplicative decay applied on every action choice.
    #[serde(default = "default_epsilon_decay")]
    pub epsilon_decay: f32,
    /// Floor used when comparing against the exploration draw.
    #[serde(default = "default_epsilon_min")]
    pub epsilon_min: f32,
    /// Reward for reaching the goal, used both as TD reward and fitness bonus.
    #[serde(default = "default_goal_reward")]
    pub goal_reward: f32,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            discount_factor: default_discount_factor(),
            epsilon_start: default_epsilon_start(),
            epsilon_decay: default_epsilon_decay(),
            epsilon_min: default_epsilon_min(),
            goal_reward: default_goal_reward(),
        }
    }
}

fn default_learning_rate() -> f32 {
    0.1
}
fn default_discount_factor() -> f32 {
    0.95
}
fn default_epsilon_start() -> f32 {
    1.0
}
fn default_epsilon_decay() -> f32 {
    0.995
}
fn default_epsilon_min() -> f32 {
    0.01
}
fn default_goal_reward() -> f32 {
    1000.0
}

/// Generation-to-generation breeding parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Parents are drawn from this many top-ranked creatures.
    #[serde(default = "default_breeding_pool")]
    pub breeding_pool: usize,
    /// Per-gene and per-Q-value mutation probability.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f32,
    /// Standard deviation of the Gaussian noise added to mutated Q-values.
    #[serde(default = "default_q_mutation_std")]
    pub q_mutation_std: f32,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            breeding_pool: default_breeding_pool(),
            mutation_rate: default_mutation_rate(),
            q_mutation_std: default_q_mutation_std(),
        }
    }
}

fn default_breeding_pool() -> usize {
    20
}
fn default_mutation_rate() -> f32 {
    0.1
}
fn default_q_mutation_std() -> f32 {
    0.1
}

impl CourseConfig {
    /// Spawn point as a [`Point`].
    #[inline]
    pub fn start_point(&self) -> Point {
        Point::new(self.start.0, self.start.1)
    }

    /// Goal as a [`Point`].
    #[inline]
    pub fn goal_point(&self) -> Point {
        Point::new(self.goal.0, self.goal.1)
    }

    /// Field area in square pixels.
    #[inline]
    pub fn field_area(&self) -> f32 {
        self.width * self.height
    }

    /// Genome length: two genes per step.
    #[inline]
    pub fn genome_len(&self) -> usize {
        self.max_steps * 2
    }

    /// Whether a point keeps a creature of this radius fully inside the field.
    #[inline]
    pub fn in_bounds(&self, p: Point) -> bool {
        let r = self.creature_radius;
        !(p.x < r || p.x > self.width - r || p.y < r || p.y > self.height - r)
    }

    /// Obstacles as geometry rectangles.
    pub fn obstacle_rects(&self) -> Vec<Rect> {
        self.obstacles.iter().map(|o| o.to_rect()).collect()
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ConfigError::InvalidDimensions);
        }
        if !(self.creature_radius > 0.0) {
            return Err(ConfigError::NonPositive("creature_radius"));
        }
        if !(self.step_size > 0.0) {
            return Err(ConfigError::NonPositive("step_size"));
        }
        if !(self.cell_size > 0.0) {
            return Err(ConfigError::NonPositive("cell_size"));
        }
        if !self.in_bounds(self.start_point()) {
            return Err(ConfigError::OutsideField("start", self.start.0, self.start.1));
        }
        let inside = |(x, y): (f32, f32)| {
            (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
        };
        if !inside(self.goal) {
            return Err(ConfigError::OutsideField("goal", self.goal.0, self.goal.1));
        }
        for (i, o) in self.obstacles.iter().enumerate() {
            if o.width < 0.0 || o.height < 0.0 {
                return Err(ConfigError::InvalidObstacle(i));
            }
        }
        if self.population_size <= ELITE_COUNT {
            return Err(ConfigError::PopulationTooSmall(self.population_size));
        }
        if self.evolution.breeding_pool == 0 {
            return Err(ConfigError::EmptyBreedingPool);
        }
        if self.max_steps == 0 {
            return Err(ConfigError::NonPositive("max_steps"));
        }

        let check_unit = |value: f32, name: &'static str| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange { name, value })
            }
        };
        check_unit(self.learning.learning_rate, "learning_rate")?;
        check_unit(self.learning.discount_factor, "discount_factor")?;
        check_unit(self.learning.epsilon_start, "epsilon_start")?;
        check_unit(self.learning.epsilon_min, "epsilon_min")?;
        check_unit(self.evolution.mutation_rate, "mutation_rate")?;
        if !(self.learning.epsilon_decay > 0.0 && self.learning.epsilon_decay <= 1.0) {
            return Err(ConfigError::OutOfRange {
                name: "epsilon_decay",
                value: self.learning.epsilon_decay,
            });
        }
        if !(self.evolution.q_mutation_std >= 0.0) {
            return Err(ConfigError::OutOfRange {
                name: "q_mutation_std",
                value: self.evolution.q_mutation_std,
            });
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Field dimensions (width, height) must be positive")]
    InvalidDimensions,
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("{0} ({1}, {2}) lies outside the field")]
    OutsideField(&'static str, f32, f32),
    #[error("Obstacle {0} has a negative size")]
    InvalidObstacle(usize),
    #[error("Population size {0} must exceed the elite count ({elite})", elite = ELITE_COUNT)]
    PopulationTooSmall(usize),
    #[error("Breeding pool must be non-empty")]
    EmptyBreedingPool,
    #[error("{name} = {value} is out of range")]
    OutOfRange { name: &'static str, value: f32 },
}
