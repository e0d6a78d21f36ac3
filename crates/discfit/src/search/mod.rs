//! Search strategies over flat parameter vectors.
//!
//! - [`grid_search`]: exhaustive unit-step enumeration, maximizes a [`Scorer`].
//! - [`powell_minimize`]: local derivative-free refinement of a [`CostFunction`].
//! - [`differential_evolution`]: bounded stochastic global minimization.
//! - [`TwoPhaseSearch`]: global search handing its best member to Powell.
//!
//! All strategies are single-threaded and report progress through a
//! [`SearchObserver`].

mod bounds;
mod config;
mod evolution;
mod grid;
mod objective;
mod observer;
mod powell;
mod result;
mod two_phase;

pub use bounds::ParameterBox;
pub use config::{EvolutionConfig, GridSearchConfig, PowellConfig};
pub use evolution::differential_evolution;
pub use grid::{grid_search, GridSearchOutcome, ScoreGrid};
pub use objective::{
    reciprocal_cost, BandScorer, CostFunction, CurveScorer, FnCost, FnScorer, ReciprocalScore,
    ResidualCost, Scorer, INVALID_COST, ZERO_SCORE_EPSILON,
};
pub use observer::{HistoryObserver, NoopObserver, SearchObserver, TracingObserver};
pub use powell::powell_minimize;
pub use result::{ObjectiveSense, SearchMethod, SearchResult};
pub use two_phase::TwoPhaseSearch;
