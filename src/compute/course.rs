//! The obstacle course: owns the population, the obstacles and the goal, and
//! drives one simulation step for every live creature.

use std::collections::HashSet;
use std::path::Path;

use log::{debug, info, warn};

use super::evolution::{EvolutionHistory, GenerationSummary, SimRng, next_generation};
use super::geometry::{collides, count_blocking, has_clear_path};
use super::{Creature, CreatureStatus, GridCell, Point, Rect};
use crate::persistence::{self, PersistenceError};
use crate::schema::{ConfigError, CourseConfig};

/// Reward for dying, whether by boxing in, leaving the field or hitting an obstacle.
const DEATH_REWARD: f32 = -100.0;
/// Cost of every step.
const STEP_REWARD: f32 = -1.0;
/// Scale applied to the stagnation penalty when shaping the per-step reward.
const STAGNATION_REWARD_SCALE: f32 = 10.0;

/// Population of creatures learning to cross a static obstacle field.
#[derive(Debug)]
pub struct ObstacleCourse {
    config: CourseConfig,
    obstacles: Vec<Rect>,
    goal: Point,
    population: Vec<Creature>,
    generation: usize,
    best_creature: Option<Creature>,
    best_fitness: f32,
    /// Grid cells entered by any creature this generation.
    visited_cells: HashSet<GridCell>,
    reached_goal: usize,
    history: EvolutionHistory,
    rng: SimRng,
}

impl ObstacleCourse {
    /// Validate `config` and spawn the first generation.
    pub fn new(config: CourseConfig) -> Result<Self, ConfigError> {
        let rng = SimRng::from_seed_option(config.random_seed);
        Self::with_rng(config, rng)
    }

    /// Like [`ObstacleCourse::new`] with an explicit random source.
    pub fn with_rng(config: CourseConfig, mut rng: SimRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let population = (0..config.population_size)
            .map(|_| {
                let genome = rng.random_genome(config.genome_len());
                Creature::new(config.start_point(), genome, config.learning.epsilon_start)
            })
            .collect();

        Ok(Self {
            obstacles: config.obstacle_rects(),
            goal: config.goal_point(),
            population,
            generation: 0,
            best_creature: None,
            best_fitness: f32::NEG_INFINITY,
            visited_cells: HashSet::new(),
            reached_goal: 0,
            history: EvolutionHistory::default(),
            rng,
            config,
        })
    }

    /// Advance every creature that is neither dead nor at the goal by one step.
    pub fn tick(&mut self) {
        let config = &self.config;
        let obstacles = &self.obstacles;
        let goal = self.goal;
        let radius = config.creature_radius;

        let mut tick_best: Option<(usize, f32)> = None;

        for (i, creature) in self.population.iter_mut().enumerate() {
            if creature.is_dead() || creature.reached_goal() {
                continue;
            }

            creature.direct_path_to_goal = has_clear_path(obstacles, creature.position, goal);

            let old_position = creature.position;
            creature.step(config, &mut self.rng);
            let new_state = creature.state(config.cell_size);
            self.visited_cells.insert(new_state);

            let mut reward = STEP_REWARD;
            if creature.is_dead() {
                reward = DEATH_REWARD;
            } else if collides(obstacles, old_position, creature.position, radius) {
                // Path and visited records keep the rejected point.
                creature.status = CreatureStatus::Dead;
                creature.position = old_position;
                reward = DEATH_REWARD;
            } else if creature.position.distance(goal) < radius {
                creature.status = CreatureStatus::ReachedGoal;
                self.reached_goal += 1;
                reward = config.learning.goal_reward;
            }
            reward -= creature.stagnation_penalty() * STAGNATION_REWARD_SCALE;

            creature.learn(reward, new_state, &config.learning);

            let blocking = count_blocking(obstacles, creature.position, goal);
            creature.compute_fitness(goal, blocking, self.visited_cells.len(), config);

            if tick_best.is_none_or(|(_, best)| creature.fitness > best) {
                tick_best = Some((i, creature.fitness));
            }
        }

        if let Some((i, fitness)) = tick_best
            && fitness > self.best_fitness
        {
            self.best_fitness = fitness;
            self.best_creature = Some(self.population[i].clone());
            debug!(
                "New best fitness {:.4} in generation {}",
                fitness, self.generation
            );
        }
    }

    /// True once every creature is dead, at the goal, or out of steps.
    /// A restored creature may already be past the cap.
    /// The host then calls [`ObstacleCourse::evolve`] and
    /// [`ObstacleCourse::reset_population`].
    pub fn is_generation_complete(&self) -> bool {
        self.population
            .iter()
            .all(|c| c.is_dead() || c.reached_goal() || c.steps >= self.config.max_steps)
    }

    /// Replace the population with elites plus bred children.
    pub fn evolve(&mut self) {
        let summary = GenerationSummary::from_population(
            self.generation,
            &self.population,
            self.reached_goal,
        );
        info!(
            "Generation {} done: best {:.4}, avg {:.4}, reached goal {}, dead {}",
            summary.generation,
            summary.best_fitness,
            summary.avg_fitness,
            summary.reached_goal,
            summary.dead
        );
        self.history.record(summary);

        let population = std::mem::take(&mut self.population);
        self.population = next_generation(population, &self.config, &mut self.rng);
        self.generation += 1;
        self.reached_goal = 0;
    }

    /// Clear per-generation state on every creature, elites included.
    pub fn reset_population(&mut self) {
        self.visited_cells.clear();
        let start = self.config.start_point();
        let epsilon = self.config.learning.epsilon_start;
        for creature in &mut self.population {
            creature.reset(start, epsilon);
        }
    }

    /// Run ticks until the generation completes, then evolve and reset.
    /// Returns the number of ticks taken.
    pub fn run_generation(&mut self) -> usize {
        let mut ticks = 0;
        while !self.is_generation_complete() {
            self.tick();
            ticks += 1;
        }
        self.evolve();
        self.reset_population();
        ticks
    }

    /// Put `creature` in population slot 0 and make it the best, keeping its
    /// stored fitness and transient state.
    pub fn install_best(&mut self, creature: Creature) {
        self.best_fitness = creature.fitness;
        if let Some(slot) = self.population.first_mut() {
            *slot = creature.clone();
        }
        self.best_creature = Some(creature);
    }

    /// Write the best creature to `path`. Returns `Ok(false)` when there is none yet.
    pub fn save_best<P: AsRef<Path>>(&self, path: P) -> Result<bool, PersistenceError> {
        let Some(best) = &self.best_creature else {
            return Ok(false);
        };
        persistence::save_creature(&path, best)?;
        info!("Best creature saved to {}", path.as_ref().display());
        Ok(true)
    }

    /// Restore the best creature from `path` if present.
    ///
    /// Missing or unreadable files leave the course unchanged.
    pub fn load_best<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let path = path.as_ref();
        match persistence::load_creature(path) {
            Ok(Some(creature)) => {
                self.install_best(creature);
                info!("Best creature loaded from {}", path.display());
                true
            }
            Ok(None) => {
                info!("No saved creature at {}", path.display());
                false
            }
            Err(e) => {
                warn!("Ignoring saved creature at {}: {}", path.display(), e);
                false
            }
        }
    }

    pub fn config(&self) -> &CourseConfig {
        &self.config
    }

    pub fn population(&self) -> &[Creature] {
        &self.population
    }

    pub fn population_mut(&mut self) -> &mut [Creature] {
        &mut self.population
    }

    pub fn obstacles(&self) -> &[Rect] {
        &self.obstacles
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Copy of the best creature taken when its fitness set the record.
    ///
    /// Its Q-table and position are frozen at that tick; the live creature
    /// in the population keeps learning.
    pub fn best_creature(&self) -> Option<&Creature> {
        self.best_creature.as_ref()
    }

    pub fn best_fitness(&self) -> f32 {
        self.best_fitness
    }

    /// Creatures that reached the goal this generation.
    pub fn reached_goal_count(&self) -> usize {
        self.reached_goal
    }

    /// Creatures not dead. Creatures at the goal count as alive.
    pub fn alive_count(&self) -> usize {
        self.population.iter().filter(|c| !c.is_dead()).count()
    }

    /// Grid cells entered by any creature this generation.
    pub fn visited_cells(&self) -> &HashSet<GridCell> {
        &self.visited_cells
    }

    pub fn history(&self) -> &EvolutionHistory {
        &self.history
    }
}
