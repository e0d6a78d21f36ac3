use serde::{Deserialize, Serialize};

use crate::error::FitError;

use super::bounds::ParameterBox;
use super::config::{EvolutionConfig, PowellConfig};
use super::evolution::differential_evolution;
use super::objective::CostFunction;
use super::observer::SearchObserver;
use super::powell::powell_minimize;
use super::result::{SearchMethod, SearchResult};

/// Bounded stochastic global search followed by an unbounded local polish.
///
/// Phase 1 runs differential evolution over the box; when
/// `evolution.polish` is set, phase 2 starts Powell from the best member and
/// keeps its answer if it is no worse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoPhaseSearch {
    pub evolution: EvolutionConfig,
    pub powell: PowellConfig,
}

impl TwoPhaseSearch {
    pub fn new(evolution: EvolutionConfig, powell: PowellConfig) -> Self {
        Self { evolution, powell }
    }

    pub fn run<C: CostFunction + ?Sized>(
        &self,
        cost: &C,
        bounds: &ParameterBox,
        observer: &mut dyn SearchObserver,
    ) -> Result<SearchResult, FitError> {
        let global = differential_evolution(cost, bounds, &self.evolution, observer)?;
        if !self.evolution.polish {
            return Ok(global);
        }

        let local = powell_minimize(cost, &global.params, &self.powell, observer)?;
        let evaluations = global.evaluations + local.evaluations;
        let iterations = global.iterations + local.iterations;
        tracing::debug!(
            global_cost = global.value,
            polished_cost = local.value,
            "two-phase search finished"
        );

        let best = if local.value <= global.value {
            local
        } else {
            tracing::debug!("polish did not improve the global candidate");
            global
        };
        Ok(SearchResult {
            method: SearchMethod::TwoPhase,
            evaluations,
            iterations,
            ..best
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::objective::FnCost;
    use crate::search::observer::HistoryObserver;

    #[test]
    fn polish_sharpens_the_global_candidate() {
        let cost = FnCost::new(2, |x: &[f64]| (x[0] - 0.3).powi(2) + (x[1] - 1.7).powi(2));
        let bounds = ParameterBox::new(vec![[-4.0, 4.0]; 2]).unwrap();
        let rough = EvolutionConfig {
            seed: Some(4),
            max_generations: 5,
            ..Default::default()
        };

        let global_only = TwoPhaseSearch::new(
            EvolutionConfig {
                polish: false,
                ..rough.clone()
            },
            PowellConfig::default(),
        );
        let mut history = HistoryObserver::default();
        let g = global_only.run(&cost, &bounds, &mut history).unwrap();
        assert_eq!(g.method, SearchMethod::DifferentialEvolution);
        assert_eq!(history.iterations.len(), g.iterations);

        let polished = TwoPhaseSearch::new(rough, PowellConfig::default())
            .run(&cost, &bounds, &mut HistoryObserver::default())
            .unwrap();
        assert_eq!(polished.method, SearchMethod::TwoPhase);
        assert!(polished.value <= g.value);
        assert!(polished.value < 1e-6);
        assert!(polished.evaluations > g.evaluations);
    }
}
