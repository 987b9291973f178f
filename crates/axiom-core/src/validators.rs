// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Decision Validators
// ─────────────────────────────────────────────────────────────────────
//! Validator capabilities run by the execution guard.
//!
//! Each validator is a pure function of the decision record plus the
//! shared config and weights. Validators never see each other's
//! results, so their order only affects report ordering.
//!
//! Standard order: `axiom` → `ai_risk` → `simulation` → `sek`.

use std::sync::Arc;

use axiom_types::{
    Action, DecisionRecord, GuardConfig, GuardError, GuardResult, ValidatorResult, WeightVector,
};

use crate::composite::score_record;
use crate::fusion::RiskFusion;

/// Read-only inputs shared by every validator for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub config: &'a GuardConfig,
    pub weights: &'a WeightVector,
}

/// A single check in the guard pipeline.
///
/// Errors are reserved for malformed input; a failed check is an
/// `Ok` result with `ok == false`.
pub trait Validator: Send + Sync {
    fn name(&self) -> &str;

    /// Fixed per validator.
    fn blocking(&self) -> bool;

    /// True for placeholder estimators awaiting a real implementation.
    fn is_stand_in(&self) -> bool {
        false
    }

    fn evaluate(
        &self,
        record: &DecisionRecord,
        ctx: &EvaluationContext<'_>,
    ) -> GuardResult<ValidatorResult>;
}

/// Composite (AAV) threshold check.
pub struct CompositeThresholdValidator;

impl Validator for CompositeThresholdValidator {
    fn name(&self) -> &str {
        "axiom"
    }

    fn blocking(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        record: &DecisionRecord,
        ctx: &EvaluationContext<'_>,
    ) -> GuardResult<ValidatorResult> {
        let aav = score_record(ctx.weights, record)?;
        let ok = aav >= ctx.config.min_composite;
        Ok(ValidatorResult::new(
            self.name(),
            ok,
            self.blocking(),
            aav,
            format!("AAV={aav:.3} (min {:.3})", ctx.config.min_composite),
        ))
    }
}

/// Fused risk check: final score and calibrated score must both clear
/// their floors, and the fused action must not be REJECT.
///
/// The fusion must be bound to the same config the guard evaluates
/// with; a mismatch is a `Config` error rather than a silent split.
pub struct RiskFusionValidator {
    fusion: Arc<RiskFusion>,
}

impl RiskFusionValidator {
    pub fn new(fusion: Arc<RiskFusion>) -> Self {
        Self { fusion }
    }
}

impl Validator for RiskFusionValidator {
    fn name(&self) -> &str {
        "ai_risk"
    }

    fn blocking(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        record: &DecisionRecord,
        ctx: &EvaluationContext<'_>,
    ) -> GuardResult<ValidatorResult> {
        if self.fusion.config() != ctx.config {
            return Err(GuardError::Config(
                "risk fusion config differs from guard config".to_string(),
            ));
        }
        let a = self.fusion.assess(record, ctx.weights)?;
        let ok = a.final_score >= ctx.config.min_final
            && a.calibrated >= ctx.config.min_calibrated
            && a.action != Action::Reject;
        let mut reason = format!(
            "final={:.3} calibrated={:.3} action={}",
            a.final_score, a.calibrated, a.action
        );
        if a.model_degraded {
            reason.push_str(" (model degraded)");
        }
        let details = serde_json::to_value(&a)
            .map_err(|e| GuardError::Numerical(format!("risk assessment: {e}")))?;
        Ok(
            ValidatorResult::new(self.name(), ok, self.blocking(), a.final_score, reason)
                .with_details(details),
        )
    }
}

type EstimateFn = Box<dyn Fn(&DecisionRecord) -> GuardResult<f64> + Send + Sync>;

/// Simulated failure-rate check: passes when the estimated failure
/// rate is at most `sim_fail_rate_max`.
pub struct SimulationValidator {
    estimate: EstimateFn,
    stand_in: bool,
}

impl SimulationValidator {
    /// Fixed failure rate used until a simulator is wired in.
    pub const STAND_IN_FAIL_RATE: f64 = 0.12;

    pub fn new(
        estimate: impl Fn(&DecisionRecord) -> GuardResult<f64> + Send + Sync + 'static,
    ) -> Self {
        Self {
            estimate: Box::new(estimate),
            stand_in: false,
        }
    }

    pub fn stand_in() -> Self {
        Self {
            estimate: Box::new(|_| Ok(Self::STAND_IN_FAIL_RATE)),
            stand_in: true,
        }
    }
}

impl Validator for SimulationValidator {
    fn name(&self) -> &str {
        "simulation"
    }

    fn blocking(&self) -> bool {
        true
    }

    fn is_stand_in(&self) -> bool {
        self.stand_in
    }

    fn evaluate(
        &self,
        record: &DecisionRecord,
        ctx: &EvaluationContext<'_>,
    ) -> GuardResult<ValidatorResult> {
        let rate = (self.estimate)(record)?;
        let ok = rate.is_finite() && rate <= ctx.config.sim_fail_rate_max;
        Ok(ValidatorResult::new(
            self.name(),
            ok,
            self.blocking(),
            1.0 - rate,
            format!("fail_rate={rate:.3} (max {:.3})", ctx.config.sim_fail_rate_max),
        ))
    }
}

/// Secondary risk estimate (SEK) check: passes when the estimate is at
/// most `sek_max`.
pub struct SecondaryRiskValidator {
    estimate: EstimateFn,
    stand_in: bool,
}

impl SecondaryRiskValidator {
    /// Fixed estimate used until a real estimator is wired in.
    pub const STAND_IN_ESTIMATE: f64 = 0.15;

    pub fn new(
        estimate: impl Fn(&DecisionRecord) -> GuardResult<f64> + Send + Sync + 'static,
    ) -> Self {
        Self {
            estimate: Box::new(estimate),
            stand_in: false,
        }
    }

    pub fn stand_in() -> Self {
        Self {
            estimate: Box::new(|_| Ok(Self::STAND_IN_ESTIMATE)),
            stand_in: true,
        }
    }
}

impl Validator for SecondaryRiskValidator {
    fn name(&self) -> &str {
        "sek"
    }

    fn blocking(&self) -> bool {
        true
    }

    fn is_stand_in(&self) -> bool {
        self.stand_in
    }

    fn evaluate(
        &self,
        record: &DecisionRecord,
        ctx: &EvaluationContext<'_>,
    ) -> GuardResult<ValidatorResult> {
        let sek = (self.estimate)(record)?;
        let ok = sek.is_finite() && sek <= ctx.config.sek_max;
        Ok(ValidatorResult::new(
            self.name(),
            ok,
            self.blocking(),
            1.0 - sek,
            format!("sek={sek:.3} (max {:.3})", ctx.config.sek_max),
        ))
    }
}

/// The standard validator set in pipeline order.
pub fn standard_validators(fusion: Arc<RiskFusion>) -> Vec<Box<dyn Validator>> {
    vec![
        Box::new(CompositeThresholdValidator),
        Box::new(RiskFusionValidator::new(fusion)),
        Box::new(SimulationValidator::stand_in()),
        Box::new(SecondaryRiskValidator::stand_in()),
    ]
}
