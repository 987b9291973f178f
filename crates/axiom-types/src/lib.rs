// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Axiom Guard Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! Axiom Guard, the scoring gate and audit trail for automated
//! decisions.

pub mod config;
pub mod error;
pub mod record;
pub mod weights;

pub use config::GuardConfig;
pub use error::{GuardError, GuardResult};
pub use record::{
    clamp_score, utc_timestamp, Action, BlockReason, DecisionRecord, DecisionState, GuardReport,
    Signature, ValidatorResult,
};
pub use weights::{AxisMap, AxisWeight, WeightVector, BASELINE_WEIGHTS, DEFAULT_AXES};
