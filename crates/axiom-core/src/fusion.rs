// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Risk Fusion
// ─────────────────────────────────────────────────────────────────────
//! Fuses the composite score with the external model's calibrated
//! prediction and bands the result into REJECT / REVIEW / ACCEPT.
//!
//! `final = alpha · composite + (1 − alpha) · calibrated`
//!
//! Fusion always produces a value. A missing or failing calibrator
//! passes the raw score through; an unavailable model is replaced by
//! the heuristic score over the same features.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use axiom_types::{
    clamp_score, Action, DecisionRecord, GuardConfig, GuardResult, WeightVector,
};

use crate::calibration::Calibrator;
use crate::features::featurize;
use crate::model::{BoundedModel, HeuristicModel, RiskModel};

/// Thresholds splitting the fused score into three actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionBands {
    pub reject_below: f64,
    pub accept_at: f64,
}

impl Default for ActionBands {
    fn default() -> Self {
        Self {
            reject_below: 0.5,
            accept_at: 0.7,
        }
    }
}

impl ActionBands {
    pub fn from_config(config: &GuardConfig) -> Self {
        Self {
            reject_below: config.reject_below,
            accept_at: config.accept_at,
        }
    }

    pub fn classify(&self, final_score: f64) -> Action {
        if final_score < self.reject_below {
            Action::Reject
        } else if final_score < self.accept_at {
            Action::Review
        } else {
            Action::Accept
        }
    }
}

/// Output of one `fuse` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionOutcome {
    pub calibrated: f64,
    pub final_score: f64,
    pub action: Action,
    /// True when a calibrator was supplied but failed.
    pub calibration_degraded: bool,
}

/// Calibrate `raw` (if possible) and fuse it with `composite`.
pub fn fuse(
    composite: f64,
    raw: f64,
    calibrator: Option<&dyn Calibrator>,
    alpha: f64,
    bands: &ActionBands,
) -> FusionOutcome {
    let (calibrated, calibration_degraded) = match calibrator {
        None => (raw, false),
        Some(c) => match c.transform(raw) {
            Ok(v) if v.is_finite() => (v, false),
            Ok(v) => {
                log::warn!("calibrator returned non-finite {v}, using raw score {raw:.4}");
                (raw, true)
            }
            Err(e) => {
                log::warn!("calibrator failed ({e}), using raw score {raw:.4}");
                (raw, true)
            }
        },
    };
    let alpha = clamp_score(alpha, 0.0, 1.0);
    let final_score = alpha * composite + (1.0 - alpha) * calibrated;
    FusionOutcome {
        calibrated,
        final_score,
        action: bands.classify(final_score),
        calibration_degraded,
    }
}

/// Full risk picture for one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub composite: f64,
    pub raw: f64,
    pub calibrated: f64,
    pub final_score: f64,
    pub action: Action,
    /// True when the external model was unavailable and the heuristic
    /// score stood in for it.
    pub model_degraded: bool,
    pub calibration_degraded: bool,
}

/// Model + calibrator capabilities bound to one validated configuration.
///
/// Thread-safe: holds only shared read-only capabilities and the model's
/// in-flight counter.
pub struct RiskFusion {
    config: GuardConfig,
    model: BoundedModel,
    calibrator: Option<Arc<dyn Calibrator>>,
}

impl RiskFusion {
    pub fn new(config: GuardConfig, model: Arc<dyn RiskModel>) -> GuardResult<Self> {
        config.validate()?;
        let model = BoundedModel::new(
            model,
            Duration::from_millis(config.model_deadline_ms),
            config.model_max_in_flight,
        );
        Ok(Self {
            config,
            model,
            calibrator: None,
        })
    }

    pub fn with_calibrator(mut self, calibrator: Arc<dyn Calibrator>) -> Self {
        self.calibrator = Some(calibrator);
        self
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn bands(&self) -> ActionBands {
        ActionBands::from_config(&self.config)
    }

    /// Featurize, query the model under its deadline, calibrate, fuse.
    ///
    /// Only composite failures (shape / degenerate weights) are errors.
    pub fn assess(
        &self,
        record: &DecisionRecord,
        weights: &WeightVector,
    ) -> GuardResult<RiskAssessment> {
        let features = featurize(record, weights, &self.config)?;

        let (raw, model_degraded) = match self.model.predict(features.values.clone()) {
            Ok(raw) => (raw, false),
            Err(e) => {
                let fallback = HeuristicModel::score(features.as_slice());
                log::warn!(
                    "decision {}: {e}; using heuristic score {fallback:.4}",
                    record.id
                );
                (fallback, true)
            }
        };

        let outcome = fuse(
            features.composite,
            raw,
            self.calibrator.as_deref(),
            self.config.alpha,
            &self.bands(),
        );

        Ok(RiskAssessment {
            composite: features.composite,
            raw,
            calibrated: outcome.calibrated,
            final_score: outcome.final_score,
            action: outcome.action,
            model_degraded,
            calibration_degraded: outcome.calibration_degraded,
        })
    }
}

#[cfg(test)]
mod tests {
    use axiom_types::GuardError;

    use super::*;
    use crate::calibration::{ExternalCalibrator, PlattCalibrator};
    use crate::model::ExternalModel;

    const S: [f64; 8] = [0.85, 0.78, 0.92, 0.70, 0.95, 0.82, 0.88, 0.91];

    #[test]
    fn test_banding_edges() {
        let bands = ActionBands::default();
        assert_eq!(bands.classify(0.4999), Action::Reject);
        assert_eq!(bands.classify(0.5), Action::Review);
        assert_eq!(bands.classify(0.6999), Action::Review);
        assert_eq!(bands.classify(0.7), Action::Accept);
    }

    #[test]
    fn test_alpha_one_passes_composite_through() {
        let out = fuse(0.8531, 0.0, None, 1.0, &ActionBands::default());
        assert_eq!(out.final_score, 0.8531);
        assert_eq!(out.action, Action::Accept);
        assert_eq!(out.calibrated, 0.0);
    }

    #[test]
    fn test_weighted_blend() {
        let out = fuse(0.8, 0.4, None, 0.7, &ActionBands::default());
        assert!((out.final_score - (0.7 * 0.8 + 0.3 * 0.4)).abs() < 1e-12);
        assert_eq!(out.action, Action::Accept);
    }

    #[test]
    fn test_calibrator_applied() {
        let cal = ExternalCalibrator::new(|x| Ok(x / 2.0));
        let out = fuse(0.0, 0.8, Some(&cal), 0.0, &ActionBands::default());
        assert_eq!(out.calibrated, 0.4);
        assert_eq!(out.final_score, 0.4);
        assert_eq!(out.action, Action::Reject);
        assert!(!out.calibration_degraded);
    }

    #[test]
    fn test_failing_calibrator_falls_back_to_raw() {
        let cal = ExternalCalibrator::new(|_| Err(GuardError::Numerical("broken".into())));
        let out = fuse(0.0, 0.6, Some(&cal), 0.0, &ActionBands::default());
        assert_eq!(out.calibrated, 0.6);
        assert_eq!(out.action, Action::Review);
        assert!(out.calibration_degraded);

        let nan = ExternalCalibrator::new(|_| Ok(f64::NAN));
        let out = fuse(0.0, 0.6, Some(&nan), 0.0, &ActionBands::default());
        assert_eq!(out.calibrated, 0.6);
        assert!(out.calibration_degraded);
    }

    #[test]
    fn test_custom_bands() {
        let bands = ActionBands {
            reject_below: 0.3,
            accept_at: 0.9,
        };
        assert_eq!(fuse(0.8, 0.8, None, 0.5, &bands).action, Action::Review);
    }

    #[test]
    fn test_assess_with_model() {
        let config = GuardConfig {
            alpha: 0.5,
            ..Default::default()
        };
        let fusion = RiskFusion::new(config, Arc::new(ExternalModel::new(|_| Ok(0.6)))).unwrap();
        let record = DecisionRecord::new("d", S.to_vec());
        let a = fusion.assess(&record, &WeightVector::baseline()).unwrap();
        assert!((a.composite - 6.185 / 7.25).abs() < 1e-12);
        assert_eq!(a.raw, 0.6);
        assert_eq!(a.calibrated, 0.6);
        assert!((a.final_score - (0.5 * a.composite + 0.3)).abs() < 1e-12);
        assert!(!a.model_degraded);
    }

    #[test]
    fn test_assess_degrades_on_model_failure() {
        let fusion = RiskFusion::new(
            GuardConfig::default(),
            Arc::new(ExternalModel::new(|_| {
                Err(GuardError::ModelUnavailable("offline".into()))
            })),
        )
        .unwrap();
        let record = DecisionRecord::new("d", S.to_vec()).with_reason("demo");
        let a = fusion.assess(&record, &WeightVector::baseline()).unwrap();
        assert!(a.model_degraded);
        assert!((0.0..=1.0).contains(&a.raw));
    }

    #[test]
    fn test_assess_applies_calibrator() {
        let fusion = RiskFusion::new(
            GuardConfig::default(),
            Arc::new(ExternalModel::new(|_| Ok(0.5))),
        )
        .unwrap()
        .with_calibrator(Arc::new(PlattCalibrator::new(-4.0, 2.0)));
        let a = fusion
            .assess(&DecisionRecord::new("d", S.to_vec()), &WeightVector::baseline())
            .unwrap();
        assert!((a.calibrated - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_assess_propagates_degenerate_weights() {
        let fusion = RiskFusion::new(GuardConfig::default(), Arc::new(HeuristicModel)).unwrap();
        let weights = WeightVector::uniform(&["A", "B"], 0.0).unwrap();
        let err = fusion
            .assess(&DecisionRecord::new("d", vec![0.5, 0.5]), &weights)
            .unwrap_err();
        assert!(matches!(err, GuardError::DegenerateWeights));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = GuardConfig {
            alpha: 7.0,
            reject_below: 0.9,
            accept_at: 0.1,
            ..Default::default()
        };
        let err = RiskFusion::new(config, Arc::new(HeuristicModel)).err().unwrap();
        assert!(matches!(err, GuardError::Config(_)));
    }

    #[test]
    fn test_saturated_model_falls_back_to_heuristic() {
        let (release, gate) = crossbeam_channel::unbounded::<()>();
        let config = GuardConfig {
            model_deadline_ms: 1,
            model_max_in_flight: 1,
            ..Default::default()
        };
        let fusion = RiskFusion::new(
            config,
            Arc::new(ExternalModel::new(move |_| {
                let _ = gate.recv();
                Ok(0.9)
            })),
        )
        .unwrap();
        let record = DecisionRecord::new("d", S.to_vec());
        for _ in 0..10 {
            let a = fusion.assess(&record, &WeightVector::baseline()).unwrap();
            assert!(a.model_degraded);
        }
        drop(release);
    }
}
