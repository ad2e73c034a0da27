//! Genome representation carried by every creature.

use serde::{Deserialize, Serialize};

/// Dense gene vector with values in `[-1, 1]`, two genes per allowed step.
///
/// Bred and mutated every generation but not read by the movement policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    pub genes: Vec<f32>,
}

impl Genome {
    pub fn new(genes: Vec<f32>) -> Self {
        Self { genes }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_array() {
        let g = Genome::new(vec![0.25, -1.0]);
        assert_eq!(serde_json::to_string(&g).unwrap(), "[0.25,-1.0]");
    }
}
