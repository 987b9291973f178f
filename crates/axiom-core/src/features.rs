// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Risk Model Feature Extraction
// ─────────────────────────────────────────────────────────────────────
//! Turns a decision record into the numeric vector handed to the
//! external risk model:
//!
//! `[composite, mean(scores), delta_score, embed(reason)...]`
//!
//! The reason embedding is a byte-level hash sketch so the kernel has
//! no dependency on a text encoder. A richer encoder can run outside
//! the kernel and pass its own feature vector to `RiskModel::predict`.

use axiom_types::{DecisionRecord, GuardConfig, GuardResult, WeightVector};

use crate::composite::{mean_score, score_record};

/// Numeric head + reason embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub composite: f64,
    pub mean: f64,
    pub delta: f64,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Byte sketch of `text`: slot `i` holds `(byte_i % 127) / 127` for
/// the first `dim` UTF-8 bytes; shorter texts leave trailing zeros.
pub fn byte_embedding(text: &str, dim: usize) -> Vec<f64> {
    let mut out = vec![0.0; dim];
    for (slot, byte) in out.iter_mut().zip(text.as_bytes()) {
        *slot = f64::from(byte % 127) / 127.0;
    }
    out
}

/// Build the model input for `record`.
///
/// Fails only when the composite itself fails (shape or degenerate
/// weights); those errors must abort evaluation.
pub fn featurize(
    record: &DecisionRecord,
    weights: &WeightVector,
    config: &GuardConfig,
) -> GuardResult<FeatureVector> {
    let composite = score_record(weights, record)?;
    let mean = mean_score(&record.scores).unwrap_or(composite);
    let delta = record.delta_score.unwrap_or(0.0);

    let reason: String = record.reason.chars().take(config.reason_max_chars).collect();
    let embedding = byte_embedding(&reason, config.embedding_dim);

    let mut values = Vec::with_capacity(3 + embedding.len());
    values.extend_from_slice(&[composite, mean, delta]);
    values.extend(embedding);

    Ok(FeatureVector {
        composite,
        mean,
        delta,
        values,
    })
}
