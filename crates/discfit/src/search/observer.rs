/// Receives progress events from a running search.
///
/// `value` is the objective at `params`: a score for grid search, a cost for
/// the minimizers. All methods default to no-ops.
pub trait SearchObserver {
    /// A search iteration finished with `params` as its current best.
    fn on_iteration(&mut self, _iteration: usize, _params: &[f64], _value: f64) {}

    /// `done` of `total` units of work are complete.
    fn on_progress(&mut self, _done: u64, _total: u64) {}
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Forwards events to `tracing`.
///
/// Iterations are logged at `debug`; progress at `info` each time another
/// `progress_step` fraction of the work completes.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    pub label: &'static str,
    pub progress_step: f64,
    next_report: f64,
}

impl TracingObserver {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            progress_step: 0.1,
            next_report: 0.0,
        }
    }
}

impl SearchObserver for TracingObserver {
    fn on_iteration(&mut self, iteration: usize, params: &[f64], value: f64) {
        tracing::debug!(
            search = self.label,
            iteration,
            value,
            params = ?params,
            "search iteration"
        );
    }

    fn on_progress(&mut self, done: u64, total: u64) {
        if total == 0 {
            return;
        }
        let frac = done as f64 / total as f64;
        if frac >= self.next_report || done == total {
            tracing::info!(
                "{}: {}/{} ({:.0}%)",
                self.label,
                done,
                total,
                100.0 * frac
            );
            let step = self.progress_step.clamp(1e-6, 1.0);
            self.next_report = (frac / step).floor() * step + step;
        }
    }
}

/// Records every event. Handy for tests and for callers that plot afterwards.
#[derive(Debug, Clone, Default)]
pub struct HistoryObserver {
    pub iterations: Vec<(usize, Vec<f64>, f64)>,
    pub last_progress: Option<(u64, u64)>,
}

impl SearchObserver for HistoryObserver {
    fn on_iteration(&mut self, iteration: usize, params: &[f64], value: f64) {
        self.iterations.push((iteration, params.to_vec(), value));
    }

    fn on_progress(&mut self, done: u64, total: u64) {
        self.last_progress = Some((done, total));
    }
}
