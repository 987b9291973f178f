// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Axiom Guard Core Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Composite scoring, risk fusion, and the execution guard that gates
//! automated decisions.
//!
//! # Safety Invariants
//!
//! 1. **Deterministic scoring**: the composite is a left-to-right
//!    weighted mean; identical inputs give bit-identical scores. A zero
//!    weight sum is `DegenerateWeights`, never a silent 0.
//!
//! 2. **Blocking precedence**: any validator with `blocking = true` and
//!    `ok = false` blocks the decision, whatever the others report.
//!
//! 3. **Authentication first**: a record without signatures is blocked
//!    before any validator or model call runs.
//!
//! 4. **Bounded model calls**: the external risk model runs under a
//!    deadline with a cap on in-flight calls. Errors, panics, timeouts,
//!    non-finite outputs and a full cap degrade to the heuristic score
//!    instead of failing the pipeline.
//!
//! 5. **One policy**: the guard takes its thresholds, bands and alpha
//!    from its risk fusion's config, validated on construction.
//!
//! 6. **No execution without an audit trail**: `evaluate_and_record`
//!    returns `Storage` if the audit append fails, never an executed
//!    outcome. Input errors return before anything is appended.
//!
//! 7. **Immutable weights**: updates return a new, versioned
//!    `WeightVector`; evaluations never observe a half-applied update.

pub mod calibration;
pub mod composite;
pub mod features;
pub mod fusion;
pub mod guard;
pub mod model;
pub mod updates;
pub mod validators;

pub use calibration::{Calibrator, ExternalCalibrator, IsotonicCalibrator, PlattCalibrator};
pub use composite::{composite_score, mean_score, score_record, CompositeScorer};
pub use features::{byte_embedding, featurize, FeatureVector};
pub use fusion::{fuse, ActionBands, FusionOutcome, RiskAssessment, RiskFusion};
pub use guard::{
    ExecutionGuard, ExecutionReceipt, Executor, GuardOutcome, PresenceVerifier, ReceiptExecutor,
    SignatureVerifier,
};
pub use model::{BoundedModel, ExternalModel, HeuristicModel, RiskModel};
pub use updates::{bayes_update_axis, bayes_update_weight, gradient_descent_update};
pub use validators::{
    standard_validators, CompositeThresholdValidator, EvaluationContext, RiskFusionValidator,
    SecondaryRiskValidator, SimulationValidator, Validator,
};
