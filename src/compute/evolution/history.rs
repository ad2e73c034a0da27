//! Per-generation statistics.

use serde::{Deserialize, Serialize};

use crate::compute::Creature;

/// Summary of one finished generation, taken before breeding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: usize,
    pub best_fitness: f32,
    pub avg_fitness: f32,
    pub reached_goal: usize,
    pub dead: usize,
}

impl GenerationSummary {
    pub fn from_population(
        generation: usize,
        population: &[Creature],
        reached_goal: usize,
    ) -> Self {
        let best_fitness = population
            .iter()
            .map(|c| c.fitness)
            .fold(f32::NEG_INFINITY, f32::max);
        let avg_fitness = if population.is_empty() {
            0.0
        } else {
            population.iter().map(|c| c.fitness).sum::<f32>() / population.len() as f32
        };
        Self {
            generation,
            best_fitness,
            avg_fitness,
            reached_goal,
            dead: population.iter().filter(|c| c.is_dead()).count(),
        }
    }
}

/// Fitness history across generations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionHistory {
    pub generations: Vec<GenerationSummary>,
}

impl EvolutionHistory {
    pub fn record(&mut self, summary: GenerationSummary) {
        self.generations.push(summary);
    }

    pub fn last(&self) -> Option<&GenerationSummary> {
        self.generations.last()
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    /// Best fitness per generation, in order.
    pub fn best_fitness(&self) -> impl Iterator<Item = f32> + '_ {
        self.generations.iter().map(|s| s.best_fitness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{CreatureStatus, Point};
    use crate::schema::Genome;

    #[test]
    fn test_summary_from_population() {
        let pop: Vec<Creature> = [2.0, 4.0, 0.0]
            .iter()
            .map(|&f| {
                let mut c = Creature::new(Point::new(0.0, 0.0), Genome::default(), 1.0);
                c.fitness = f;
                if f == 0.0 {
                    c.status = CreatureStatus::Dead;
                }
                c
            })
            .collect();

        let summary = GenerationSummary::from_population(3, &pop, 1);
        assert_eq!(summary.generation, 3);
        assert_eq!(summary.best_fitness, 4.0);
        assert_eq!(summary.avg_fitness, 2.0);
        assert_eq!(summary.reached_goal, 1);
        assert_eq!(summary.dead, 1);

        let mut history = EvolutionHistory::default();
        history.record(summary.clone());
        assert_eq!(history.last(), Some(&summary));
        assert_eq!(history.best_fitness().collect::<Vec<_>>(), vec![4.0]);
    }
}
