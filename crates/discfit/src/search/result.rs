use serde::{Deserialize, Serialize};

/// Whether [`SearchResult::value`] is a score or a cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveSense {
    Maximize,
    Minimize,
}

/// Strategy that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    Grid,
    Powell,
    DifferentialEvolution,
    TwoPhase,
}

/// Best parameters found by one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub method: SearchMethod,
    pub params: Vec<f64>,
    /// Objective at `params`.
    pub value: f64,
    pub sense: ObjectiveSense,
    /// `false` when the iteration or generation budget ran out first.
    pub converged: bool,
    /// Objective evaluations spent.
    pub evaluations: usize,
    /// Sweeps, generations, or grid cells, depending on `method`.
    pub iterations: usize,
}

impl SearchResult {
    /// Whether `self` is at least as good as `other` under a shared sense.
    pub fn is_better_or_equal(&self, other: &SearchResult) -> bool {
        match self.sense {
            ObjectiveSense::Maximize => self.value >= other.value,
            ObjectiveSense::Minimize => self.value <= other.value,
        }
    }
}
