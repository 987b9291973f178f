// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Execution Guard
// ─────────────────────────────────────────────────────────────────────
//! Validator pipeline and execution gate for decision records.
//!
//! Per decision: `RECEIVED → VALIDATED → {EXECUTED | BLOCKED}`.
//!
//! - Missing signatures block immediately with `INVALID_SIGNATURES`;
//!   no validator and no model call runs.
//! - Validators run in a fixed order and aggregate into a
//!   `GuardReport`. Any blocking failure blocks with
//!   `BLOCKED_BY_VALIDATOR` and the full report.
//! - Input errors (shape, degenerate weights) abort evaluation before
//!   anything is logged.
//! - A blocked decision is never retried; callers resubmit a new record.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use axiom_audit::{AppendOptions, AuditEntry, AuditLog};
use axiom_types::{
    BlockReason, DecisionRecord, DecisionState, GuardConfig, GuardError, GuardReport, GuardResult,
    WeightVector,
};

use crate::fusion::RiskFusion;
use crate::validators::{standard_validators, EvaluationContext, Validator};

/// Authentication capability checked before any scoring.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, record: &DecisionRecord) -> bool;
}

/// Passes any record carrying at least one signature entry.
///
/// Signature blobs are not checked cryptographically.
pub struct PresenceVerifier;

impl SignatureVerifier for PresenceVerifier {
    fn verify(&self, record: &DecisionRecord) -> bool {
        !record.signatures.is_empty()
    }
}

/// Opaque identifier returned by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub txid: String,
}

/// Hand-off to whatever actually carries out an approved decision.
pub trait Executor: Send + Sync {
    fn execute(&self, record: &DecisionRecord, report: &GuardReport)
        -> GuardResult<ExecutionReceipt>;
}

/// Executor that only mints a `tx-<uuid>` receipt.
pub struct ReceiptExecutor;

impl Executor for ReceiptExecutor {
    fn execute(
        &self,
        _record: &DecisionRecord,
        _report: &GuardReport,
    ) -> GuardResult<ExecutionReceipt> {
        Ok(ExecutionReceipt {
            txid: format!("tx-{}", uuid::Uuid::new_v4()),
        })
    }
}

/// Terminal outcome of one guard evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    Executed {
        receipt: ExecutionReceipt,
        report: GuardReport,
    },
    Blocked {
        reason: BlockReason,
        /// `None` when blocked before validators ran.
        report: Option<GuardReport>,
    },
}

impl GuardOutcome {
    pub fn state(&self) -> DecisionState {
        match self {
            GuardOutcome::Executed { .. } => DecisionState::Executed,
            GuardOutcome::Blocked { .. } => DecisionState::Blocked,
        }
    }

    pub fn is_executed(&self) -> bool {
        matches!(self, GuardOutcome::Executed { .. })
    }

    pub fn report(&self) -> Option<&GuardReport> {
        match self {
            GuardOutcome::Executed { report, .. } => Some(report),
            GuardOutcome::Blocked { report, .. } => report.as_ref(),
        }
    }

    pub fn receipt(&self) -> Option<&ExecutionReceipt> {
        match self {
            GuardOutcome::Executed { receipt, .. } => Some(receipt),
            GuardOutcome::Blocked { .. } => None,
        }
    }

    /// Blocks as errors: `InvalidSignatures` or `ValidatorFailure`.
    pub fn into_result(self) -> GuardResult<(ExecutionReceipt, GuardReport)> {
        match self {
            GuardOutcome::Executed { receipt, report } => Ok((receipt, report)),
            GuardOutcome::Blocked {
                reason: BlockReason::InvalidSignatures,
                ..
            } => Err(GuardError::InvalidSignatures),
            GuardOutcome::Blocked {
                reason: BlockReason::BlockedByValidator,
                report,
            } => Err(GuardError::ValidatorFailure {
                report: Box::new(report.unwrap_or_else(|| GuardReport::new(Vec::new()))),
            }),
        }
    }

    /// Audit action name for this outcome.
    pub fn audit_action(&self) -> &'static str {
        match self {
            GuardOutcome::Executed { .. } => "decision_executed",
            GuardOutcome::Blocked { .. } => "decision_blocked",
        }
    }

    /// Payload logged for this outcome.
    ///
    /// `risk` holds the fused risk figures (composite, raw, calibrated,
    /// final score, action) when the `ai_risk` validator ran.
    pub fn audit_payload(&self, record: &DecisionRecord) -> Value {
        let block_reason = match self {
            GuardOutcome::Blocked { reason, .. } => Some(reason.to_string()),
            GuardOutcome::Executed { .. } => None,
        };
        let risk = self
            .report()
            .and_then(|r| r.result("ai_risk"))
            .and_then(|r| r.details.clone());
        json!({
            "decision_id": record.id,
            "reason": record.reason,
            "state": self.state(),
            "block_reason": block_reason,
            "receipt": self.receipt(),
            "risk": risk,
            "report": self.report(),
        })
    }
}

/// Ordered validator pipeline plus the executor it gates.
pub struct ExecutionGuard {
    config: GuardConfig,
    verifier: Box<dyn SignatureVerifier>,
    validators: Vec<Box<dyn Validator>>,
    executor: Box<dyn Executor>,
}

impl ExecutionGuard {
    /// Guard with the standard validator order and presence-only
    /// signature checks. Thresholds, bands and alpha all come from the
    /// fusion's config.
    pub fn new(fusion: Arc<RiskFusion>, executor: Box<dyn Executor>) -> GuardResult<Self> {
        let config = fusion.config().clone();
        config.validate()?;
        Ok(Self {
            config,
            verifier: Box::new(PresenceVerifier),
            validators: standard_validators(fusion),
            executor,
        })
    }

    /// Guard with an explicit validator list, run in the given order.
    pub fn with_validators(
        config: GuardConfig,
        validators: Vec<Box<dyn Validator>>,
        executor: Box<dyn Executor>,
    ) -> GuardResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            verifier: Box::new(PresenceVerifier),
            validators,
            executor,
        })
    }

    /// Append a validator after the existing ones.
    pub fn with_validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_signature_verifier(mut self, verifier: Box<dyn SignatureVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn validator_names(&self) -> Vec<&str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Run the pipeline for one decision.
    ///
    /// `Err` only for input errors or an executor failure; blocks are
    /// `Ok(GuardOutcome::Blocked)`.
    pub fn evaluate(
        &self,
        record: &DecisionRecord,
        weights: &WeightVector,
    ) -> GuardResult<GuardOutcome> {
        log::debug!("decision {}: {:?}", record.id, DecisionState::Received);

        if !self.verifier.verify(record) {
            log::error!(
                "decision {} blocked: {}",
                record.id,
                BlockReason::InvalidSignatures
            );
            return Ok(GuardOutcome::Blocked {
                reason: BlockReason::InvalidSignatures,
                report: None,
            });
        }
        log::debug!("decision {}: {:?}", record.id, DecisionState::Validated);

        let ctx = EvaluationContext {
            config: &self.config,
            weights,
        };
        let mut results = Vec::with_capacity(self.validators.len());
        for validator in &self.validators {
            let result = validator.evaluate(record, &ctx)?;
            if validator.is_stand_in() {
                log::debug!("validator {} is a stand-in estimator", validator.name());
            }
            results.push(result);
        }
        let report = GuardReport::new(results);

        if !report.overall_ok {
            let failed: Vec<&str> = report.blocking_failures().map(|r| r.name.as_str()).collect();
            log::error!(
                "decision {} blocked: {} ({})",
                record.id,
                BlockReason::BlockedByValidator,
                failed.join(", ")
            );
            return Ok(GuardOutcome::Blocked {
                reason: BlockReason::BlockedByValidator,
                report: Some(report),
            });
        }

        let receipt = self.executor.execute(record, &report)?;
        log::info!("decision {} executed: {}", record.id, receipt.txid);
        Ok(GuardOutcome::Executed { receipt, report })
    }

    /// Evaluate, then append the terminal outcome to `audit_log`.
    ///
    /// Input errors return before any append. If the append fails the
    /// call returns `Storage`; an unlogged decision is never reported
    /// as executed.
    pub fn evaluate_and_record(
        &self,
        record: &DecisionRecord,
        weights: &WeightVector,
        audit_log: &AuditLog,
        actor: &str,
    ) -> GuardResult<(GuardOutcome, AuditEntry)> {
        let outcome = self.evaluate(record, weights)?;
        let options = AppendOptions {
            commit_hash: record
                .meta
                .get("commit_hash")
                .and_then(Value::as_str)
                .map(str::to_string),
            merkle_leaf: None,
        };
        let entry = audit_log.append_with(
            actor,
            outcome.audit_action(),
            &outcome.audit_payload(record),
            options,
        )?;
        Ok((outcome, entry))
    }
}
