// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Axiom Guard Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, GuardResult};

/// Policy constants for the execution guard and risk fusion.
///
/// Weights are not part of this struct: they travel as an explicit
/// `WeightVector` value so updates never race with evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Composite (AAV) threshold: composite must be >= this to pass.
    /// Default: 0.65.
    pub min_composite: f64,

    /// Fused final score threshold for the risk validator.
    /// Default: 0.60.
    pub min_final: f64,

    /// Calibrated model score floor for the risk validator.
    /// Default: 0.2.
    pub min_calibrated: f64,

    /// Maximum tolerated simulation failure rate.
    /// Default: 0.25.
    pub sim_fail_rate_max: f64,

    /// Maximum tolerated secondary risk estimate (SEK).
    /// Default: 0.30.
    pub sek_max: f64,

    /// Composite share of the fused score, in [0, 1].
    /// Default: 0.7.
    pub alpha: f64,

    /// Fused scores below this are REJECT.
    /// Default: 0.5.
    pub reject_below: f64,

    /// Fused scores at or above this are ACCEPT; between the two is REVIEW.
    /// Default: 0.7.
    pub accept_at: f64,

    /// Deadline for one external model call, in milliseconds.
    /// Default: 50.
    pub model_deadline_ms: u64,

    /// Model calls allowed to run at once. Calls past the cap take the
    /// heuristic fallback without spawning a worker.
    /// Default: 4.
    pub model_max_in_flight: usize,

    /// Dimension of the byte-level reason embedding.
    /// Default: 64.
    pub embedding_dim: usize,

    /// Characters of `reason` fed to the embedding.
    /// Default: 4000.
    pub reason_max_chars: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            min_composite: 0.65,
            min_final: 0.60,
            min_calibrated: 0.2,
            sim_fail_rate_max: 0.25,
            sek_max: 0.30,
            alpha: 0.7,
            reject_below: 0.5,
            accept_at: 0.7,
            model_deadline_ms: 50,
            model_max_in_flight: 4,
            embedding_dim: 64,
            reason_max_chars: 4000,
        }
    }
}

fn check_unit(name: &str, value: f64) -> GuardResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(GuardError::Config(format!(
            "{name} must be in [0, 1], got {value}"
        )));
    }
    Ok(())
}

impl GuardConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> GuardResult<()> {
        check_unit("min_composite", self.min_composite)?;
        check_unit("min_final", self.min_final)?;
        check_unit("min_calibrated", self.min_calibrated)?;
        check_unit("sim_fail_rate_max", self.sim_fail_rate_max)?;
        check_unit("sek_max", self.sek_max)?;
        check_unit("alpha", self.alpha)?;
        check_unit("reject_below", self.reject_below)?;
        check_unit("accept_at", self.accept_at)?;
        if self.reject_below > self.accept_at {
            return Err(GuardError::Config(format!(
                "reject_below must be <= accept_at, got {} > {}",
                self.reject_below, self.accept_at
            )));
        }
        if self.model_deadline_ms == 0 {
            return Err(GuardError::Config(
                "model_deadline_ms must be > 0".to_string(),
            ));
        }
        if self.model_max_in_flight == 0 {
            return Err(GuardError::Config(
                "model_max_in_flight must be > 0".to_string(),
            ));
        }
        if self.embedding_dim == 0 {
            return Err(GuardError::Config(
                "embedding_dim must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> GuardResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| GuardError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}
