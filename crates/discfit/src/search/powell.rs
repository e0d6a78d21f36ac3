//! Powell's derivative-free direction-set minimizer.
//!
//! Each sweep runs a 1D line search along every direction in the set, then
//! replaces the direction of largest decrease with the net displacement of
//! the sweep when that displacement is still a descent direction.

use nalgebra::DVector;

use crate::error::FitError;

use super::config::PowellConfig;
use super::objective::CostFunction;
use super::observer::SearchObserver;
use super::result::{ObjectiveSense, SearchMethod, SearchResult};

const GOLD: f64 = 1.618_033_988_749_895;
const MAX_BRACKET_STEPS: usize = 40;

/// Cost function wrapper that counts evaluations.
struct Counted<'a, C: ?Sized> {
    cost: &'a C,
    evals: usize,
}

impl<C: CostFunction + ?Sized> Counted<'_, C> {
    fn eval(&mut self, x: &DVector<f64>) -> f64 {
        self.evals += 1;
        self.cost.cost(x.as_slice())
    }
}

/// Golden-section search inside a bracket `lo < mid < hi` with `f(mid)`
/// already known and no larger than either end.
///
/// The interval shrinks around the bracket's interior point, so the first
/// step costs one evaluation. Returns `(x, f(x))` at the best interior probe.
pub(crate) fn golden_section_minimize(
    mut f: impl FnMut(f64) -> f64,
    lo: f64,
    mid: f64,
    hi: f64,
    f_mid: f64,
    max_evals: usize,
    tol: f64,
) -> (f64, f64) {
    const R: f64 = GOLD - 1.0;
    const C: f64 = 2.0 - GOLD;

    let (mut x0, mut x3) = (lo, hi);
    let (mut x1, mut f1, mut x2, mut f2) = if (hi - mid).abs() > (mid - lo).abs() {
        let x2 = mid + C * (hi - mid);
        (mid, f_mid, x2, f(x2))
    } else {
        let x1 = mid - C * (mid - lo);
        (x1, f(x1), mid, f_mid)
    };
    let mut evals = 1;

    while evals < max_evals && (x3 - x0).abs() > tol {
        if f2 < f1 {
            x0 = x1;
            x1 = x2;
            f1 = f2;
            x2 = R * x1 + C * x3;
            f2 = f(x2);
        } else {
            x3 = x2;
            x2 = x1;
            f2 = f1;
            x1 = R * x2 + C * x0;
            f1 = f(x1);
        }
        evals += 1;
    }

    if f1 < f2 {
        (x1, f1)
    } else {
        (x2, f2)
    }
}

/// Find `t_lo < t_mid < t_hi` with `phi(t_mid)` no larger than either end.
///
/// Starts from `phi(0) = f0` and walks downhill with golden-ratio growth.
/// Returns `(t_lo, t_hi, t_mid, phi(t_mid))`.
fn bracket(mut phi: impl FnMut(f64) -> f64, f0: f64, step: f64) -> (f64, f64, f64, f64) {
    let mut a = 0.0;
    let (mut b, mut fb) = (step, phi(step));
    if fb >= f0 {
        let fm = phi(-step);
        if fm >= f0 {
            return (-step, step, 0.0, f0);
        }
        b = -step;
        fb = fm;
    }

    let mut c = b + GOLD * (b - a);
    let mut fc = phi(c);
    let mut steps = 0;
    while fc < fb && steps < MAX_BRACKET_STEPS {
        a = b;
        b = c;
        fb = fc;
        c = b + GOLD * (b - a);
        fc = phi(c);
        steps += 1;
    }
    (a.min(c), a.max(c), b, fb)
}

/// Minimize along `dir` from `x`. Returns the step `t` and the cost at
/// `x + t * dir`; `t = 0` when no probe beat `f0`.
fn line_minimize<C: CostFunction + ?Sized>(
    f: &mut Counted<'_, C>,
    x: &DVector<f64>,
    f0: f64,
    dir: &DVector<f64>,
    config: &PowellConfig,
) -> (f64, f64) {
    let mut phi = |t: f64| f.eval(&(x + dir * t));
    let (lo, hi, mid, fmid) = bracket(&mut phi, f0, config.initial_step);
    let (t, ft) = golden_section_minimize(
        &mut phi,
        lo,
        mid,
        hi,
        fmid,
        config.line_max_evals,
        config.xtol,
    );
    if ft < f0 {
        (t, ft)
    } else {
        (0.0, f0)
    }
}

/// Minimize `cost` starting from `x0` with Powell's method.
///
/// Unbounded: the caller seeds a sensible start. Running out of sweeps is
/// reported through `converged = false`, not as an error.
pub fn powell_minimize<C: CostFunction + ?Sized>(
    cost: &C,
    x0: &[f64],
    config: &PowellConfig,
    observer: &mut dyn SearchObserver,
) -> Result<SearchResult, FitError> {
    let n = cost.dim();
    if x0.len() != n {
        return Err(FitError::DimensionMismatch {
            expected: n,
            got: x0.len(),
        });
    }

    let mut f = Counted { cost, evals: 0 };
    let mut x = DVector::from_column_slice(x0);
    let mut fx = f.eval(&x);
    let mut dirs: Vec<DVector<f64>> = (0..n)
        .map(|i| {
            let mut d = DVector::zeros(n);
            d[i] = 1.0;
            d
        })
        .collect();

    let mut converged = false;
    let mut iterations = 0;

    for iter in 1..=config.max_iters {
        iterations = iter;
        let x_start = x.clone();
        let f_start = fx;
        let mut biggest_drop = 0.0;
        let mut biggest_idx = 0;

        for (i, dir) in dirs.iter().enumerate() {
            let (t, ft) = line_minimize(&mut f, &x, fx, dir, config);
            if fx - ft > biggest_drop {
                biggest_drop = fx - ft;
                biggest_idx = i;
            }
            if t != 0.0 {
                x += dir * t;
                fx = ft;
            }
        }

        observer.on_iteration(iter, x.as_slice(), fx);

        if 2.0 * (f_start - fx) <= config.ftol * (f_start.abs() + fx.abs()) + 1e-20 {
            converged = true;
            break;
        }

        let delta = &x - &x_start;
        let norm = delta.norm();
        if norm == 0.0 {
            continue;
        }
        let fe = f.eval(&(&x + &delta));
        if fe < f_start {
            let t = 2.0 * (f_start - 2.0 * fx + fe) * (f_start - fx - biggest_drop).powi(2)
                - biggest_drop * (f_start - fe).powi(2);
            if t < 0.0 {
                let unit = delta / norm;
                let (s, fs) = line_minimize(&mut f, &x, fx, &unit, config);
                if s != 0.0 {
                    x += &unit * s;
                    fx = fs;
                }
                dirs.swap_remove(biggest_idx);
                dirs.push(unit);
            }
        }
    }

    tracing::debug!(
        iterations,
        evaluations = f.evals,
        cost = fx,
        converged,
        "powell finished"
    );

    Ok(SearchResult {
        method: SearchMethod::Powell,
        params: x.iter().copied().collect(),
        value: fx,
        sense: ObjectiveSense::Minimize,
        converged,
        evaluations: f.evals,
        iterations,
    })
}
