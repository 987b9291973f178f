// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — External Risk Model Interface
// ─────────────────────────────────────────────────────────────────────
//! Risk model capability and heuristic fallback implementation.
//!
//! The trained classifier lives outside the kernel and is reached
//! through this trait. The heuristic model provides deterministic
//! scoring for tests and is the degraded fallback whenever the real
//! model is unavailable.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;

use axiom_types::{GuardError, GuardResult};

/// Trait for risk model backends.
///
/// Returns a risk-adjusted approval probability in [0, 1].
pub trait RiskModel: Send + Sync {
    fn predict(&self, features: &[f64]) -> GuardResult<f64>;
}

/// Deterministic heuristic model: `tanh(mean(features)) · 0.5 + 0.5`.
pub struct HeuristicModel;

impl HeuristicModel {
    pub fn score(features: &[f64]) -> f64 {
        if features.is_empty() {
            return 0.5;
        }
        let mean = features.iter().sum::<f64>() / features.len() as f64;
        mean.tanh() * 0.5 + 0.5
    }
}

impl RiskModel for HeuristicModel {
    fn predict(&self, features: &[f64]) -> GuardResult<f64> {
        Ok(Self::score(features))
    }
}

/// External model backed by a closure.
type PredictFn = Box<dyn Fn(&[f64]) -> GuardResult<f64> + Send + Sync>;

pub struct ExternalModel {
    predict_fn: PredictFn,
}

impl ExternalModel {
    pub fn new(predict_fn: impl Fn(&[f64]) -> GuardResult<f64> + Send + Sync + 'static) -> Self {
        Self {
            predict_fn: Box::new(predict_fn),
        }
    }
}

impl RiskModel for ExternalModel {
    fn predict(&self, features: &[f64]) -> GuardResult<f64> {
        (self.predict_fn)(features)
    }
}

/// Releases one in-flight slot when the worker finishes, however it ends.
struct InFlightSlot(Arc<AtomicUsize>);

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A risk model called on worker threads under a deadline, with at
/// most `max_in_flight` calls outstanding.
///
/// A call that overruns keeps its worker (and its slot) until the model
/// returns; its late answer is discarded. Once every slot is held by a
/// stuck call, further calls fail fast with `ModelUnavailable` instead
/// of spawning more threads.
pub struct BoundedModel {
    model: Arc<dyn RiskModel>,
    deadline: Duration,
    max_in_flight: usize,
    in_flight: Arc<AtomicUsize>,
}

impl BoundedModel {
    pub fn new(model: Arc<dyn RiskModel>, deadline: Duration, max_in_flight: usize) -> Self {
        Self {
            model,
            deadline,
            max_in_flight,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Worker threads currently running a model call.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> Option<InFlightSlot> {
        self.in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.max_in_flight).then_some(n + 1)
            })
            .ok()
            .map(|_| InFlightSlot(Arc::clone(&self.in_flight)))
    }

    /// Errors, panics, non-finite outputs, missed deadlines and a full
    /// worker cap all map to `ModelUnavailable`.
    pub fn predict(&self, features: Vec<f64>) -> GuardResult<f64> {
        let slot = self.acquire().ok_or_else(|| {
            GuardError::ModelUnavailable(format!(
                "{} model calls already in flight",
                self.max_in_flight
            ))
        })?;

        let (tx, rx) = crossbeam_channel::bounded(1);
        let worker = Arc::clone(&self.model);
        thread::Builder::new()
            .name("risk-model".to_string())
            .spawn(move || {
                let _slot = slot;
                let outcome = catch_unwind(AssertUnwindSafe(|| worker.predict(&features)))
                    .unwrap_or_else(|_| {
                        Err(GuardError::ModelUnavailable("model panicked".to_string()))
                    });
                let _ = tx.send(outcome);
            })
            .map_err(|e| GuardError::ModelUnavailable(format!("spawn failed: {e}")))?;

        let raw = match rx.recv_timeout(self.deadline) {
            Ok(Ok(raw)) => raw,
            Ok(Err(GuardError::ModelUnavailable(msg))) => {
                return Err(GuardError::ModelUnavailable(msg))
            }
            Ok(Err(e)) => return Err(GuardError::ModelUnavailable(e.to_string())),
            Err(RecvTimeoutError::Timeout) => {
                return Err(GuardError::ModelUnavailable(format!(
                    "deadline of {}ms exceeded",
                    self.deadline.as_millis()
                )))
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(GuardError::ModelUnavailable(
                    "model worker exited without a result".to_string(),
                ))
            }
        };
        if !raw.is_finite() {
            return Err(GuardError::ModelUnavailable(format!(
                "model returned non-finite score {raw}"
            )));
        }
        Ok(raw)
    }
}
