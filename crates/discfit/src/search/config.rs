use serde::{Deserialize, Serialize};

/// Grid search limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSearchConfig {
    /// Refuse grids with more cells than this.
    pub max_cells: u64,
}

impl Default for GridSearchConfig {
    fn default() -> Self {
        Self {
            max_cells: 50_000_000,
        }
    }
}

/// Powell direction-set minimizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowellConfig {
    /// Maximum number of full direction-set sweeps.
    pub max_iters: usize,
    /// Line-search bracket width at which the 1D search stops.
    pub xtol: f64,
    /// Relative cost decrease per sweep below which the search has converged.
    pub ftol: f64,
    /// First trial step along each direction.
    pub initial_step: f64,
    /// Evaluation budget per line search.
    pub line_max_evals: usize,
}

impl Default for PowellConfig {
    fn default() -> Self {
        Self {
            max_iters: 200,
            xtol: 1e-4,
            ftol: 1e-5,
            initial_step: 1.0,
            line_max_evals: 60,
        }
    }
}

/// Differential evolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Population size multiplier: the population holds `popsize * dim`
    /// members (at least 5).
    pub popsize: usize,
    /// Mutation scale range `[lo, hi]`; a new factor is drawn from it every
    /// generation.
    pub mutation: [f64; 2],
    /// Crossover probability.
    pub recombination: f64,
    pub max_generations: usize,
    /// Stop when `std(costs) <= atol + tol * |mean(costs)|`.
    pub tol: f64,
    pub atol: f64,
    /// RNG seed; `None` seeds from system entropy.
    pub seed: Option<u64>,
    /// Run a Powell polish on the best member afterwards.
    pub polish: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            popsize: 15,
            mutation: [0.5, 1.0],
            recombination: 0.7,
            max_generations: 1000,
            tol: 0.01,
            atol: 0.0,
            seed: None,
            polish: true,
        }
    }
}
