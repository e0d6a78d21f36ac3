//! Differential evolution over a closed parameter box.
//!
//! `best/1/bin` strategy: each trial vector is `best + F (r1 - r2)` mixed
//! with its parent by binomial crossover, then clipped into the box. `F` is
//! redrawn from the configured range every generation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::FitError;

use super::bounds::ParameterBox;
use super::config::EvolutionConfig;
use super::objective::CostFunction;
use super::observer::SearchObserver;
use super::result::{ObjectiveSense, SearchMethod, SearchResult};

const MIN_POPULATION: usize = 5;

fn validate(config: &EvolutionConfig) -> Result<(), FitError> {
    let [lo, hi] = config.mutation;
    if !(lo.is_finite() && hi.is_finite() && 0.0 <= lo && lo <= hi && hi <= 2.0) {
        return Err(FitError::InvalidParameter {
            name: "mutation",
            value: if lo.is_finite() && lo >= 0.0 { hi } else { lo },
            reason: "must satisfy 0 <= lo <= hi <= 2",
        });
    }
    if !(0.0..=1.0).contains(&config.recombination) {
        return Err(FitError::InvalidParameter {
            name: "recombination",
            value: config.recombination,
            reason: "must lie in [0, 1]",
        });
    }
    Ok(())
}

/// Latin hypercube initialization: each axis is split into `count` strata
/// and every stratum receives exactly one member.
fn latin_hypercube(bounds: &ParameterBox, count: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut pop = vec![vec![0.0; bounds.dim()]; count];
    let mut strata: Vec<usize> = (0..count).collect();
    for (k, &[lo, hi]) in bounds.bounds().iter().enumerate() {
        strata.shuffle(rng);
        for (member, &s) in pop.iter_mut().zip(&strata) {
            let u = (s as f64 + rng.gen::<f64>()) / count as f64;
            member[k] = lo + u * (hi - lo);
        }
    }
    pop
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Distinct random indices different from `exclude`.
fn pick_two(rng: &mut StdRng, len: usize, exclude: usize) -> (usize, usize) {
    let mut draw = |other: Option<usize>| loop {
        let k = rng.gen_range(0..len);
        if k != exclude && Some(k) != other {
            return k;
        }
    };
    let a = draw(None);
    let b = draw(Some(a));
    (a, b)
}

/// Minimize `cost` over `bounds` with differential evolution.
///
/// Stops when the population's cost spread satisfies
/// `std <= atol + tol * |mean|` (reported as converged) or after
/// `max_generations`. Does not polish; see
/// [`TwoPhaseSearch`](super::TwoPhaseSearch).
pub fn differential_evolution<C: CostFunction + ?Sized>(
    cost: &C,
    bounds: &ParameterBox,
    config: &EvolutionConfig,
    observer: &mut dyn SearchObserver,
) -> Result<SearchResult, FitError> {
    bounds.ensure_dim(cost.dim())?;
    validate(config)?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let dim = bounds.dim();
    let count = (config.popsize * dim).max(MIN_POPULATION);

    let mut population = latin_hypercube(bounds, count, &mut rng);
    let mut energies: Vec<f64> = population.iter().map(|m| cost.cost(m)).collect();
    let mut evaluations = count;

    let mut best = 0;
    for i in 1..count {
        if energies[i] < energies[best] {
            best = i;
        }
    }

    let mut converged = false;
    let mut generations = 0;
    let mut trial = vec![0.0; dim];

    for generation in 1..=config.max_generations {
        generations = generation;
        let [f_lo, f_hi] = config.mutation;
        let scale = if f_hi > f_lo {
            rng.gen_range(f_lo..f_hi)
        } else {
            f_lo
        };

        for i in 0..count {
            let (r1, r2) = pick_two(&mut rng, count, i);
            let forced = rng.gen_range(0..dim);
            for k in 0..dim {
                trial[k] = if k == forced || rng.gen::<f64>() < config.recombination {
                    population[best][k] + scale * (population[r1][k] - population[r2][k])
                } else {
                    population[i][k]
                };
            }
            bounds.clip(&mut trial);

            let e = cost.cost(&trial);
            evaluations += 1;
            if e <= energies[i] {
                population[i].copy_from_slice(&trial);
                energies[i] = e;
                if e < energies[best] {
                    best = i;
                }
            }
        }

        observer.on_iteration(generation, &population[best], energies[best]);
        observer.on_progress(generation as u64, config.max_generations as u64);

        let (mean, std) = mean_and_std(&energies);
        if std <= config.atol + config.tol * mean.abs() {
            converged = true;
            break;
        }
    }

    tracing::debug!(
        generations,
        evaluations,
        cost = energies[best],
        converged,
        "differential evolution finished"
    );

    Ok(SearchResult {
        method: SearchMethod::DifferentialEvolution,
        params: population[best].clone(),
        value: energies[best],
        sense: ObjectiveSense::Minimize,
        converged,
        evaluations,
        iterations: generations,
    })
}
