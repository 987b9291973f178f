// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Axiom Guard Decision Records
// ─────────────────────────────────────────────────────────────────────

use std::collections::BTreeMap;
use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Clamp a value to [lo, hi], mapping NaN to lo and Inf to nearest bound.
#[inline]
pub fn clamp_score(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_score: NaN detected, clamping to {lo:.4}");
        return lo;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { hi } else { lo };
        log::warn!("clamp_score: Inf detected, clamping to {boundary:.4}");
        return boundary;
    }
    value.clamp(lo, hi)
}

/// Current UTC time at second precision, `Z`-suffixed
/// (e.g. `2026-10-18T09:30:00Z`).
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Actor signature attached to a decision. Verification beyond
/// presence is delegated to a `SignatureVerifier` capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub actor_id: String,
    pub sig: String,
}

/// A decision submitted to the guard. Immutable once submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: String,
    /// Per-axis scores, ordered like the active `WeightVector`.
    pub scores: Vec<f64>,
    #[serde(default)]
    pub reason: String,
    /// Drift signal relative to the previous evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_score: Option<f64>,
    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

impl DecisionRecord {
    pub fn new(id: impl Into<String>, scores: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            scores,
            ..Default::default()
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta_score = Some(delta);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    pub fn signed_by(mut self, actor_id: impl Into<String>, sig: impl Into<String>) -> Self {
        self.signatures.push(Signature {
            actor_id: actor_id.into(),
            sig: sig.into(),
        });
        self
    }

    pub fn axis_count(&self) -> usize {
        self.scores.len()
    }
}

/// Verdict of one validator run against one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorResult {
    pub name: String,
    pub ok: bool,
    /// Fixed per validator: a blocking failure alone blocks the decision.
    pub blocking: bool,
    /// Diagnostic score, not used for aggregation.
    pub score: f64,
    pub reason: String,
    /// Structured figures behind `score`, when the validator has them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ValidatorResult {
    pub fn new(
        name: impl Into<String>,
        ok: bool,
        blocking: bool,
        score: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ok,
            blocking,
            score,
            reason: reason.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// True when this result forces the decision to be blocked.
    pub fn blocks(&self) -> bool {
        self.blocking && !self.ok
    }
}

/// Aggregated validator verdicts for one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardReport {
    pub timestamp: String,
    pub results: Vec<ValidatorResult>,
    pub overall_ok: bool,
}

impl GuardReport {
    /// Aggregate results in run order. Non-blocking failures never
    /// flip `overall_ok`.
    pub fn new(results: Vec<ValidatorResult>) -> Self {
        let overall_ok = !results.iter().any(ValidatorResult::blocks);
        Self {
            timestamp: utc_timestamp(),
            results,
            overall_ok,
        }
    }

    pub fn blocking_failures(&self) -> impl Iterator<Item = &ValidatorResult> {
        self.results.iter().filter(|r| r.blocks())
    }

    pub fn result(&self, name: &str) -> Option<&ValidatorResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

/// Three-way action band produced by risk fusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Reject,
    Review,
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Reject => "REJECT",
            Action::Review => "REVIEW",
            Action::Accept => "ACCEPT",
        };
        f.write_str(s)
    }
}

/// Lifecycle of one decision inside the guard.
///
/// `Received → Validated → {Executed | Blocked}`; the last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionState {
    Received,
    Validated,
    Executed,
    Blocked,
}

impl DecisionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, DecisionState::Executed | DecisionState::Blocked)
    }
}

/// Why a decision ended in `Blocked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockReason {
    InvalidSignatures,
    BlockedByValidator,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BlockReason::InvalidSignatures => "INVALID_SIGNATURES",
            BlockReason::BlockedByValidator => "BLOCKED_BY_VALIDATOR",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_nan() {
        assert_eq!(clamp_score(f64::NAN, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_clamp_pos_inf() {
        assert_eq!(clamp_score(f64::INFINITY, 0.0, 1.0), 1.0);
    }

    #[test]
    fn test_clamp_normal() {
        assert_eq!(clamp_score(0.75, 0.0, 1.0), 0.75);
        assert_eq!(clamp_score(-0.3, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_timestamp_is_second_precision_utc() {
        let ts = utc_timestamp();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2026-10-18T09:30:00Z".len());
        assert!(!ts.contains('.'));
    }

    #[test]
    fn test_report_blocking_failure_wins() {
        let report = GuardReport::new(vec![
            ValidatorResult::new("a", true, true, 0.9, ""),
            ValidatorResult::new("b", false, true, 0.1, ""),
            ValidatorResult::new("c", true, true, 0.9, ""),
        ]);
        assert!(!report.overall_ok);
        assert_eq!(report.blocking_failures().count(), 1);
    }

    #[test]
    fn test_report_ignores_non_blocking_failure() {
        let report = GuardReport::new(vec![
            ValidatorResult::new("a", true, true, 0.9, ""),
            ValidatorResult::new("advisory", false, false, 0.1, ""),
        ]);
        assert!(report.overall_ok);
        assert!(report.result("advisory").is_some());
    }

    #[test]
    fn test_empty_report_is_ok() {
        assert!(GuardReport::new(Vec::new()).overall_ok);
    }

    #[test]
    fn test_record_json_defaults() {
        let rec: DecisionRecord =
            serde_json::from_str(r#"{"id":"d-1","scores":[0.5,0.6]}"#).unwrap();
        assert_eq!(rec.axis_count(), 2);
        assert!(rec.signatures.is_empty());
        assert!(rec.delta_score.is_none());
        assert!(rec.meta.is_empty());
    }

    #[test]
    fn test_action_serializes_screaming() {
        assert_eq!(serde_json::to_string(&Action::Accept).unwrap(), "\"ACCEPT\"");
        assert_eq!(
            serde_json::to_string(&BlockReason::InvalidSignatures).unwrap(),
            "\"INVALID_SIGNATURES\""
        );
        assert_eq!(BlockReason::BlockedByValidator.to_string(), "BLOCKED_BY_VALIDATOR");
    }

    #[test]
    fn test_terminal_states() {
        assert!(DecisionState::Executed.is_terminal());
        assert!(DecisionState::Blocked.is_terminal());
        assert!(!DecisionState::Validated.is_terminal());
    }

    #[test]
    fn test_result_details_are_optional() {
        let plain = ValidatorResult::new("axiom", true, true, 0.9, "ok");
        let json = serde_json::to_value(&plain).unwrap();
        assert!(json.get("details").is_none());
        let back: ValidatorResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, plain);

        let detailed = plain.with_details(serde_json::json!({ "final_score": 0.8 }));
        let json = serde_json::to_value(&detailed).unwrap();
        assert_eq!(json["details"]["final_score"], 0.8);
    }
}
