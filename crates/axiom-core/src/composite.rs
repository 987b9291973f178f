// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Composite Scorer (AAV)
// ─────────────────────────────────────────────────────────────────────
//! Weighted composite score over per-axis decision scores.
//!
//! `AAV = Σ(w_i · s_i · b_i · r_i) / Σ(w_i)`
//!
//! Biases `b` and reciprocities `r` default to all-ones. Sums run left
//! to right so identical inputs reproduce bit-identical results. A
//! zero weight sum is always `DegenerateWeights`, never a silent 0.

use axiom_types::{DecisionRecord, GuardError, GuardResult, WeightVector};

fn check_len(what: &'static str, expected: usize, actual: usize) -> GuardResult<()> {
    if expected != actual {
        return Err(GuardError::ShapeMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Compute the composite score.
pub fn composite_score(
    weights: &[f64],
    scores: &[f64],
    biases: Option<&[f64]>,
    reciprocities: Option<&[f64]>,
) -> GuardResult<f64> {
    let n = weights.len();
    check_len("scores", n, scores.len())?;
    if let Some(b) = biases {
        check_len("biases", n, b.len())?;
    }
    if let Some(r) = reciprocities {
        check_len("reciprocities", n, r.len())?;
    }

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in 0..n {
        let b = biases.map_or(1.0, |b| b[i]);
        let r = reciprocities.map_or(1.0, |r| r[i]);
        numerator += weights[i] * scores[i] * b * r;
        denominator += weights[i];
    }

    if denominator == 0.0 {
        return Err(GuardError::DegenerateWeights);
    }
    let aav = numerator / denominator;
    if !aav.is_finite() {
        return Err(GuardError::Numerical(format!(
            "composite score is not finite ({aav})"
        )));
    }
    Ok(aav)
}

/// Composite of a decision record under `weights`, no corrections.
pub fn score_record(weights: &WeightVector, record: &DecisionRecord) -> GuardResult<f64> {
    composite_score(&weights.values(), &record.scores, None, None)
}

/// Plain arithmetic mean, `None` for an empty slice.
pub fn mean_score(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum = scores.iter().fold(0.0, |acc, s| acc + s);
    Some(sum / scores.len() as f64)
}

/// Composite scorer bound to one weight vector and optional corrections.
#[derive(Debug, Clone)]
pub struct CompositeScorer {
    weights: WeightVector,
    biases: Option<Vec<f64>>,
    reciprocities: Option<Vec<f64>>,
}

impl CompositeScorer {
    pub fn new(weights: WeightVector) -> Self {
        Self {
            weights,
            biases: None,
            reciprocities: None,
        }
    }

    pub fn with_biases(mut self, biases: Vec<f64>) -> GuardResult<Self> {
        check_len("biases", self.weights.len(), biases.len())?;
        self.biases = Some(biases);
        Ok(self)
    }

    pub fn with_reciprocities(mut self, reciprocities: Vec<f64>) -> GuardResult<Self> {
        check_len("reciprocities", self.weights.len(), reciprocities.len())?;
        self.reciprocities = Some(reciprocities);
        Ok(self)
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    pub fn score(&self, scores: &[f64]) -> GuardResult<f64> {
        composite_score(
            &self.weights.values(),
            scores,
            self.biases.as_deref(),
            self.reciprocities.as_deref(),
        )
    }

    pub fn score_record(&self, record: &DecisionRecord) -> GuardResult<f64> {
        self.score(&record.scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: [f64; 8] = [1.0, 0.95, 0.90, 0.85, 0.95, 0.80, 0.85, 0.95];
    const S: [f64; 8] = [0.85, 0.78, 0.92, 0.70, 0.95, 0.82, 0.88, 0.91];

    #[test]
    fn test_weighted_mean_reference() {
        // Σ(w·s) = 6.185, Σw = 7.25
        let aav = composite_score(&W, &S, None, None).unwrap();
        assert!((aav - 6.185 / 7.25).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_weights_all_ones_is_exactly_one() {
        for n in 1..=16 {
            let w = vec![0.37; n];
            let s = vec![1.0; n];
            assert_eq!(composite_score(&w, &s, None, None).unwrap(), 1.0, "n={n}");
        }
    }

    #[test]
    fn test_zero_weights_is_degenerate_not_zero() {
        let err = composite_score(&[0.0, 0.0, 0.0], &[0.5, 0.9, 0.1], None, None).unwrap_err();
        assert!(matches!(err, GuardError::DegenerateWeights));
        let err = composite_score(&[], &[], None, None).unwrap_err();
        assert!(matches!(err, GuardError::DegenerateWeights));
    }

    #[test]
    fn test_shape_mismatch() {
        assert!(matches!(
            composite_score(&[1.0, 1.0], &[0.5], None, None),
            Err(GuardError::ShapeMismatch { what: "scores", expected: 2, actual: 1 })
        ));
        assert!(matches!(
            composite_score(&[1.0], &[0.5], Some(&[1.0, 1.0]), None),
            Err(GuardError::ShapeMismatch { what: "biases", .. })
        ));
        assert!(matches!(
            composite_score(&[1.0], &[0.5], None, Some(&[])),
            Err(GuardError::ShapeMismatch { what: "reciprocities", .. })
        ));
    }

    #[test]
    fn test_neutral_corrections_match_defaults() {
        let ones = [1.0; 8];
        let plain = composite_score(&W, &S, None, None).unwrap();
        let explicit = composite_score(&W, &S, Some(&ones), Some(&ones)).unwrap();
        assert_eq!(plain, explicit);
    }

    #[test]
    fn test_corrections_scale_numerator_only() {
        let aav = composite_score(&[1.0, 1.0], &[0.5, 0.5], Some(&[2.0, 1.0]), Some(&[1.0, 0.5]))
            .unwrap();
        // (1·0.5·2·1 + 1·0.5·1·0.5) / 2 = 0.625
        assert!((aav - 0.625).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let a = composite_score(&W, &S, None, None).unwrap();
        let b = composite_score(&W, &S, None, None).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_nan_score_is_numerical_error() {
        assert!(matches!(
            composite_score(&[1.0], &[f64::NAN], None, None),
            Err(GuardError::Numerical(_))
        ));
    }

    #[test]
    fn test_scorer_with_record() {
        let scorer = CompositeScorer::new(WeightVector::baseline());
        let record = DecisionRecord::new("demo-001", S.to_vec());
        let aav = scorer.score_record(&record).unwrap();
        assert_eq!(aav, score_record(&WeightVector::baseline(), &record).unwrap());
        assert!(CompositeScorer::new(WeightVector::baseline())
            .with_biases(vec![1.0; 3])
            .is_err());
    }

    #[test]
    fn test_mean_score() {
        assert_eq!(mean_score(&[]), None);
        assert!((mean_score(&[0.2, 0.4]).unwrap() - 0.3).abs() < 1e-12);
    }
}
