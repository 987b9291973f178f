// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Axiom Guard Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

use crate::record::GuardReport;

/// Root error type for all Axiom Guard failures.
#[derive(Error, Debug)]
pub enum GuardError {
    /// Input vectors disagree in length (caller error, not retryable).
    #[error("shape mismatch: {what} has length {actual}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// All weights sum to zero; the composite score is undefined.
    #[error("degenerate weights: sum of weights is zero")]
    DegenerateWeights,

    /// Decision carried no acceptable signature.
    #[error("invalid signatures")]
    InvalidSignatures,

    /// A blocking validator rejected the decision.
    #[error("blocked by validator: {}", failed_names(.report))]
    ValidatorFailure { report: Box<GuardReport> },

    /// External scoring model failed or missed its deadline.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Audit entry could not be durably persisted.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Merkle root requested over zero leaves.
    #[error("empty leaf set: merkle root needs at least one leaf")]
    EmptyLeafSet,

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Numerical error (NaN/Inf in computation).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Canonical serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

fn failed_names(report: &GuardReport) -> String {
    let names: Vec<&str> = report
        .results
        .iter()
        .filter(|r| r.blocking && !r.ok)
        .map(|r| r.name.as_str())
        .collect();
    names.join(", ")
}

impl GuardError {
    /// Caller errors abort evaluation before anything reaches the audit log.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            GuardError::ShapeMismatch { .. } | GuardError::DegenerateWeights
        )
    }
}

impl From<std::io::Error> for GuardError {
    fn from(e: std::io::Error) -> Self {
        GuardError::Storage(e.to_string())
    }
}

pub type GuardResult<T> = Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{GuardReport, ValidatorResult};

    #[test]
    fn test_shape_mismatch_message() {
        let err = GuardError::ShapeMismatch {
            what: "scores",
            expected: 8,
            actual: 7,
        };
        assert_eq!(
            err.to_string(),
            "shape mismatch: scores has length 7, expected 8"
        );
        assert!(err.is_input_error());
    }

    #[test]
    fn test_validator_failure_lists_blocking_failures() {
        let report = GuardReport::new(vec![
            ValidatorResult::new("axiom", false, true, 0.4, "AAV=0.400"),
            ValidatorResult::new("advisory", false, false, 0.1, "soft"),
            ValidatorResult::new("sek", true, true, 0.85, "sek=0.150"),
        ]);
        let err = GuardError::ValidatorFailure {
            report: Box::new(report),
        };
        assert_eq!(err.to_string(), "blocked by validator: axiom");
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: GuardError = io.into();
        assert!(matches!(err, GuardError::Storage(ref m) if m.contains("disk full")));
    }
}
