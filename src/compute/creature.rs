//! A single learning creature: epsilon-greedy policy, grid movement,
//! temporal-difference updates and fitness shaping.

use std::collections::{HashSet, VecDeque};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::q_table::{Action, GridCell, QTable, max_value, ranked_actions};
use super::Point;
use crate::schema::{CourseConfig, Genome, LearningConfig};

/// Lifecycle state within one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CreatureStatus {
    #[default]
    Active,
    Dead,
    ReachedGoal,
}

/// The (state, heading) pair that produced the most recent move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: GridCell,
    /// Direction of travel. Cardinal for every move the policy makes.
    pub heading: (f32, f32),
}

/// One simulated creature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creature {
    pub position: Point,
    pub initial_position: Point,
    pub genome: Genome,
    pub q_table: QTable,
    pub fitness: f32,
    pub status: CreatureStatus,
    pub steps: usize,
    /// Pixels visited this generation, kept for drawing the trail.
    pub path: HashSet<(i32, i32)>,
    /// Pixels visited this generation; the policy never re-enters them.
    pub visited_positions: HashSet<(i32, i32)>,
    pub last: Option<Transition>,
    /// Closest distance to the goal seen this generation. `None` until measured.
    pub closest_distance_to_goal: Option<f32>,
    pub epsilon: f32,
    /// Most recent positions, oldest first.
    pub recent_positions: VecDeque<Point>,
    /// Whether the straight line to the goal was unobstructed at the last tick.
    pub direct_path_to_goal: bool,
}

impl Creature {
    /// Create a creature at `start` with an empty Q-table.
    pub fn new(start: Point, genome: Genome, epsilon: f32) -> Self {
        Self {
            position: start,
            initial_position: start,
            genome,
            q_table: QTable::new(),
            fitness: 0.0,
            status: CreatureStatus::Active,
            steps: 0,
            path: HashSet::new(),
            visited_positions: HashSet::new(),
            last: None,
            closest_distance_to_goal: None,
            epsilon,
            recent_positions: VecDeque::new(),
            direct_path_to_goal: false,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == CreatureStatus::Active
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.status == CreatureStatus::Dead
    }

    #[inline]
    pub fn reached_goal(&self) -> bool {
        self.status == CreatureStatus::ReachedGoal
    }

    /// Discretized state used as the Q-table key.
    #[inline]
    pub fn state(&self, cell_size: f32) -> GridCell {
        GridCell::containing(self.position, cell_size)
    }

    /// Whether a move would land on a pixel already visited this generation.
    fn leads_to_visited(&self, action: Action, step_size: f32) -> bool {
        let (dx, dy) = action.delta();
        let target = self.position.offset(dx, dy, step_size).pixel();
        self.visited_positions.contains(&target)
    }

    /// Epsilon-greedy choice among moves that do not revisit a pixel.
    ///
    /// Decays the stored rate on every call; the floor only applies to the
    /// comparison. Returns `None` when every neighbour has been visited.
    pub fn choose_action<R: Rng + ?Sized>(
        &mut self,
        state: GridCell,
        config: &CourseConfig,
        rng: &mut R,
    ) -> Option<Action> {
        let learning = &config.learning;
        self.epsilon *= learning.epsilon_decay;

        if rng.r#gen::<f32>() < learning.epsilon_min.max(self.epsilon) {
            let mut actions = Action::ALL;
            actions.shuffle(rng);
            return actions
                .into_iter()
                .find(|&a| !self.leads_to_visited(a, config.step_size));
        }

        let values = *self.q_table.entry_or_default(state);
        ranked_actions(&values)
            .into_iter()
            .find(|&a| !self.leads_to_visited(a, config.step_size))
    }

    /// Straight-line heading toward `goal`, at most one step long.
    ///
    /// Falls back to a random unvisited cardinal move when the straight move
    /// would revisit a pixel. Not used by [`Creature::step`].
    pub fn move_towards_goal<R: Rng + ?Sized>(
        &self,
        goal: Point,
        step_size: f32,
        rng: &mut R,
    ) -> Option<(f32, f32)> {
        let (dx, dy) = (goal.x - self.position.x, goal.y - self.position.y);
        let distance = dx.hypot(dy);
        if distance == 0.0 {
            return None;
        }
        let travel = step_size.min(distance);
        let target = self.position.offset(dx / distance, dy / distance, travel);
        if self.visited_positions.contains(&target.pixel()) {
            let mut actions = Action::ALL;
            actions.shuffle(rng);
            return actions
                .into_iter()
                .find(|&a| !self.leads_to_visited(a, step_size))
                .map(Action::delta);
        }
        Some((target.x - self.position.x, target.y - self.position.y))
    }

    /// Advance one step.
    ///
    /// No-op once frozen or at the step cap. Running out of moves or leaving
    /// the field kills the creature without moving it.
    pub fn step<R: Rng + ?Sized>(&mut self, config: &CourseConfig, rng: &mut R) {
        if !self.is_active() || self.steps >= config.max_steps {
            return;
        }

        let state = self.state(config.cell_size);
        let Some(action) = self.choose_action(state, config, rng) else {
            self.status = CreatureStatus::Dead;
            return;
        };

        let heading = action.delta();
        let candidate = self.position.offset(heading.0, heading.1, config.step_size);
        if config.in_bounds(candidate) {
            self.position = candidate;
            self.path.insert(candidate.pixel());
            self.visited_positions.insert(candidate.pixel());
            self.steps += 1;
        } else {
            self.status = CreatureStatus::Dead;
        }

        self.last = Some(Transition { state, heading });

        self.recent_positions.push_back(self.position);
        while self.recent_positions.len() > config.history_len {
            self.recent_positions.pop_front();
        }
    }

    /// Temporal-difference update of the last (state, action) toward
    /// `reward + gamma * max Q(new_state)`.
    pub fn learn(&mut self, reward: f32, new_state: GridCell, learning: &LearningConfig) {
        let Some(last) = self.last else {
            return;
        };
        let action = Action::from_heading(last.heading.0, last.heading.1);

        self.q_table.entry_or_default(last.state);
        let max_future = max_value(self.q_table.entry_or_default(new_state));

        let alpha = learning.learning_rate;
        let gamma = learning.discount_factor;
        let cell = &mut self.q_table.entry_or_default(last.state)[action.index()];
        *cell = (1.0 - alpha) * *cell + alpha * (reward + gamma * max_future);
    }

    /// Penalty for small average movement over the recent-position buffer.
    pub fn stagnation_penalty(&self) -> f32 {
        if self.recent_positions.len() < 2 {
            return 0.0;
        }
        let total: f32 = self
            .recent_positions
            .iter()
            .zip(self.recent_positions.iter().skip(1))
            .map(|(a, b)| a.distance(*b))
            .sum();
        let avg = total / (self.recent_positions.len() - 1) as f32;
        (1.0 - avg).max(0.0) * 0.5
    }

    /// Recompute and store fitness.
    ///
    /// Dead creatures score exactly zero. `visited_cells` is the number of grid
    /// cells reached by any creature this generation.
    pub fn compute_fitness(
        &mut self,
        goal: Point,
        obstacle_count: usize,
        visited_cells: usize,
        config: &CourseConfig,
    ) {
        if self.is_dead() {
            self.fitness = 0.0;
            return;
        }

        let area = config.field_area();
        let current = self.position.distance(goal);
        let distance_score = 1.0 / (current + 1.0);

        let closest = self
            .closest_distance_to_goal
            .map_or(current, |c| c.min(current));
        self.closest_distance_to_goal = Some(closest);
        let progress_score = (self.initial_position.distance(goal) - closest) / 100.0;

        let exploration_score = self.path.len() as f32 / area * 10.0;
        let novelty_score = visited_cells as f32 / (area / 100.0) * 5.0;
        let survival_bonus = self.steps as f32 / config.max_steps as f32;
        let obstacle_penalty = obstacle_count as f32 * 0.1;

        self.fitness = distance_score
            + progress_score
            + exploration_score
            + novelty_score
            + survival_bonus
            - obstacle_penalty
            - self.stagnation_penalty();

        if self.reached_goal() {
            self.fitness += config.learning.goal_reward;
        }
    }

    /// Clear per-generation state. Genome, Q-table and fitness are kept.
    pub fn reset(&mut self, start: Point, epsilon: f32) {
        self.position = start;
        self.initial_position = start;
        self.steps = 0;
        self.path.clear();
        self.visited_positions.clear();
        self.status = CreatureStatus::Active;
        self.last = None;
        self.closest_distance_to_goal = None;
        self.epsilon = epsilon;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn open_field() -> CourseConfig {
        CourseConfig {
            obstacles: vec![],
            ..Default::default()
        }
    }

    fn greedy(mut config: CourseConfig) -> CourseConfig {
        config.learning.epsilon_start = 0.0;
        config.learning.epsilon_min = 0.0;
        config
    }

    fn creature_at(x: f32, y: f32, config: &CourseConfig) -> Creature {
        Creature::new(Point::new(x, y), Genome::default(), config.learning.epsilon_start)
    }

    #[test]
    fn test_epsilon_decays_below_floor() {
        let mut config = open_field();
        config.learning.epsilon_start = 0.02;
        config.learning.epsilon_decay = 0.5;
        config.learning.epsilon_min = 0.01;
        let mut c = creature_at(400.0, 300.0, &config);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..5 {
            c.choose_action(c.state(config.cell_size), &config, &mut rng);
        }
        assert!((c.epsilon - 0.02 * 0.5f32.powi(5)).abs() < 1e-9);
        assert!(c.epsilon < config.learning.epsilon_min);
    }

    #[test]
    fn test_exploit_picks_highest_unvisited() {
        let config = greedy(open_field());
        let mut c = creature_at(400.0, 300.0, &config);
        let state = c.state(config.cell_size);
        c.q_table.insert(state, [0.1, 0.9, 0.5, 0.2]);
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(c.choose_action(state, &config, &mut rng), Some(Action::Up));

        c.visited_positions.insert((400, 295));
        assert_eq!(c.choose_action(state, &config, &mut rng), Some(Action::Right));
    }

    #[test]
    fn test_exploit_initializes_row() {
        let config = greedy(open_field());
        let mut c = creature_at(400.0, 300.0, &config);
        let state = c.state(config.cell_size);
        let mut rng = StdRng::seed_from_u64(7);

        // Ties keep table order, so the first action wins.
        assert_eq!(c.choose_action(state, &config, &mut rng), Some(Action::Down));
        assert_eq!(c.q_table.get(state), Some(&[0.0; 4]));
    }

    #[test]
    fn test_explore_avoids_visited() {
        let mut config = open_field();
        config.learning.epsilon_start = 1.0;
        config.learning.epsilon_min = 1.0;
        let mut c = creature_at(400.0, 300.0, &config);
        c.visited_positions.extend([(400, 305), (400, 295), (405, 300)]);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..10 {
            assert_eq!(
                c.choose_action(c.state(config.cell_size), &config, &mut rng),
                Some(Action::Left)
            );
        }
        assert!(c.q_table.is_empty());
    }

    #[test]
    fn test_boxed_in_creature_dies_in_place() {
        let config = greedy(open_field());
        let mut c = creature_at(400.0, 300.0, &config);
        c.visited_positions
            .extend([(400, 305), (400, 295), (405, 300), (395, 300)]);
        let mut rng = StdRng::seed_from_u64(3);

        c.step(&config, &mut rng);
        assert!(c.is_dead());
        assert_eq!(c.position, Point::new(400.0, 300.0));
        assert_eq!(c.steps, 0);
        assert!(c.last.is_none());
    }

    #[test]
    fn test_step_records_move() {
        let config = greedy(open_field());
        let mut c = creature_at(400.0, 300.0, &config);
        let mut rng = StdRng::seed_from_u64(3);

        c.step(&config, &mut rng);
        assert!(c.is_active());
        assert_eq!(c.position, Point::new(400.0, 305.0));
        assert_eq!(c.steps, 1);
        assert!(c.path.contains(&(400, 305)));
        assert!(c.visited_positions.contains(&(400, 305)));
        assert_eq!(
            c.last,
            Some(Transition {
                state: GridCell::new(8, 6),
                heading: (0.0, 1.0)
            })
        );
        assert_eq!(c.recent_positions.back(), Some(&Point::new(400.0, 305.0)));
    }

    #[test]
    fn test_out_of_bounds_kills_without_moving() {
        let config = greedy(open_field());
        // Down is the default greedy choice and leaves the field from here.
        let mut c = creature_at(400.0, 593.0, &config);
        let mut rng = StdRng::seed_from_u64(3);

        c.step(&config, &mut rng);
        assert!(c.is_dead());
        assert_eq!(c.position, Point::new(400.0, 593.0));
        assert_eq!(c.steps, 0);
        assert!(c.path.is_empty());
        assert!(c.last.is_some());
    }

    #[test]
    fn test_step_cap_freezes() {
        let mut config = greedy(open_field());
        config.max_steps = 3;
        let mut c = creature_at(400.0, 300.0, &config);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..10 {
            c.step(&config, &mut rng);
        }
        assert_eq!(c.steps, 3);
        assert!(c.is_active());
        assert_eq!(c.position, Point::new(400.0, 315.0));
    }

    #[test]
    fn test_recent_positions_bounded() {
        let mut config = greedy(open_field());
        config.history_len = 4;
        let mut c = creature_at(400.0, 100.0, &config);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..9 {
            c.step(&config, &mut rng);
        }
        assert_eq!(c.recent_positions.len(), 4);
        assert_eq!(c.recent_positions.front(), Some(&Point::new(400.0, 130.0)));
    }

    #[test]
    fn test_learn_td_update() {
        let config = open_field();
        let mut c = creature_at(400.0, 300.0, &config);
        let s0 = GridCell::new(8, 6);
        let s1 = GridCell::new(8, 7);
        c.q_table.insert(s0, [2.0, 0.0, 0.0, 0.0]);
        c.q_table.insert(s1, [1.0, 4.0, -3.0, 0.0]);
        c.last = Some(Transition {
            state: s0,
            heading: Action::Down.delta(),
        });

        c.learn(-1.0, s1, &config.learning);
        // (1 - 0.1) * 2 + 0.1 * (-1 + 0.95 * 4)
        let expected = 0.9 * 2.0 + 0.1 * (-1.0 + 0.95 * 4.0);
        assert!((c.q_table.get(s0).unwrap()[0] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_learn_without_transition_is_noop() {
        let config = open_field();
        let mut c = creature_at(400.0, 300.0, &config);
        c.learn(-100.0, GridCell::new(1, 1), &config.learning);
        assert!(c.q_table.is_empty());
    }

    #[test]
    fn test_learn_snaps_heading_to_cardinal() {
        let config = open_field();
        let mut c = creature_at(400.0, 300.0, &config);
        let mut rng = StdRng::seed_from_u64(3);
        let heading = c
            .move_towards_goal(Point::new(700.0, 250.0), config.step_size, &mut rng)
            .unwrap();
        c.last = Some(Transition {
            state: GridCell::new(8, 6),
            heading,
        });

        c.learn(10.0, GridCell::new(8, 6), &config.learning);
        let row = c.q_table.get(GridCell::new(8, 6)).unwrap();
        assert_eq!(row[Action::Right.index()], 1.0);
        assert_eq!(row.iter().filter(|v| **v != 0.0).count(), 1);
    }

    #[test]
    fn test_stagnation_penalty() {
        let config = open_field();
        let mut c = creature_at(0.0, 0.0, &config);
        assert_eq!(c.stagnation_penalty(), 0.0);

        c.recent_positions.extend([Point::new(0.0, 0.0), Point::new(0.0, 0.0)]);
        assert_eq!(c.stagnation_penalty(), 0.5);

        c.recent_positions.clear();
        c.recent_positions
            .extend([Point::new(0.0, 0.0), Point::new(0.5, 0.0), Point::new(0.5, 0.0)]);
        assert!((c.stagnation_penalty() - 0.375).abs() < 1e-6);

        c.recent_positions.push_back(Point::new(10.5, 0.0));
        assert_eq!(c.stagnation_penalty(), 0.0);
    }

    #[test]
    fn test_dead_fitness_is_zero() {
        let config = open_field();
        let mut c = creature_at(400.0, 300.0, &config);
        c.fitness = 55.0;
        c.status = CreatureStatus::Dead;
        c.compute_fitness(config.goal_point(), 3, 100, &config);
        assert_eq!(c.fitness, 0.0);
    }

    #[test]
    fn test_fitness_components() {
        let config = open_field();
        let goal = Point::new(400.0, 100.0);
        let mut c = creature_at(400.0, 300.0, &config);
        c.position = Point::new(400.0, 200.0);
        c.steps = 20;
        c.path.extend([(400, 205), (400, 200)]);

        c.compute_fitness(goal, 1, 48, &config);
        let expected = 1.0 / 101.0 + (200.0 - 100.0) / 100.0 + 2.0 / 480_000.0 * 10.0
            + 48.0 / 4800.0 * 5.0
            + 20.0 / 1000.0
            - 0.1;
        assert!((c.fitness - expected).abs() < 1e-5);
        assert_eq!(c.closest_distance_to_goal, Some(100.0));

        // Moving away keeps the best-ever distance.
        c.position = Point::new(400.0, 250.0);
        c.compute_fitness(goal, 0, 0, &config);
        assert_eq!(c.closest_distance_to_goal, Some(100.0));

        c.status = CreatureStatus::ReachedGoal;
        c.compute_fitness(goal, 0, 0, &config);
        assert!(c.fitness > config.learning.goal_reward);
    }

    #[test]
    fn test_reset_keeps_knowledge() {
        let config = open_field();
        let mut c = creature_at(100.0, 100.0, &config);
        c.q_table.insert(GridCell::new(2, 2), [1.0; 4]);
        c.genome = Genome::new(vec![0.5; 4]);
        c.fitness = 3.0;
        c.steps = 12;
        c.status = CreatureStatus::Dead;
        c.epsilon = 0.001;
        c.path.insert((1, 1));
        c.visited_positions.insert((1, 1));
        c.closest_distance_to_goal = Some(12.0);

        c.reset(config.start_point(), config.learning.epsilon_start);
        assert_eq!(c.position, config.start_point());
        assert_eq!(c.initial_position, config.start_point());
        assert!(c.is_active());
        assert_eq!(c.steps, 0);
        assert!(c.path.is_empty() && c.visited_positions.is_empty());
        assert!(c.last.is_none());
        assert!(c.closest_distance_to_goal.is_none());
        assert_eq!(c.epsilon, config.learning.epsilon_start);
        assert_eq!(c.q_table.len(), 1);
        assert_eq!(c.genome.len(), 4);
        assert_eq!(c.fitness, 3.0);
    }
}
