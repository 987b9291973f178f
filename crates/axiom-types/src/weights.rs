// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Axiom Guard Weight Configuration
// ─────────────────────────────────────────────────────────────────────
//! Versioned per-axis weights and the column-label → axis lookup.
//!
//! A `WeightVector` is an immutable value. Every update returns a new
//! vector with `version + 1`, so concurrent evaluations holding the
//! previous vector are never affected.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, GuardResult};

/// The eight default axes: (axis code, column label).
pub const DEFAULT_AXES: [(&str, &str); 8] = [
    ("INT", "Zámer (INT)"),
    ("LEX", "Existencia (LEX)"),
    ("WIS", "Múdrosť (WIS)"),
    ("REL", "Vzájomnosť (REL)"),
    ("VER", "Pravda (VER)"),
    ("LIB", "Sloboda (LIB)"),
    ("UNI", "Jednota (UNI)"),
    ("CRE", "Tvorba (CRE)"),
];

/// Baseline weights for `DEFAULT_AXES`, same order.
pub const BASELINE_WEIGHTS: [f64; 8] = [1.0, 0.95, 0.90, 0.85, 0.95, 0.80, 0.85, 0.95];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisWeight {
    pub axis: String,
    pub weight: f64,
}

/// Ordered, versioned axis weights.
///
/// Deserialization runs the same checks as `new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeightVector")]
pub struct WeightVector {
    version: u64,
    axes: Vec<AxisWeight>,
}

#[derive(Deserialize)]
struct RawWeightVector {
    version: u64,
    axes: Vec<AxisWeight>,
}

impl TryFrom<RawWeightVector> for WeightVector {
    type Error = GuardError;

    fn try_from(raw: RawWeightVector) -> GuardResult<Self> {
        if raw.version == 0 {
            return Err(GuardError::Config("weight vector version starts at 1".to_string()));
        }
        let mut checked = Self::new(raw.axes.into_iter().map(|a| (a.axis, a.weight)))?;
        checked.version = raw.version;
        Ok(checked)
    }
}

fn check_weight(axis: &str, weight: f64) -> GuardResult<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(GuardError::Config(format!(
            "weight for axis {axis} must be finite and >= 0, got {weight}"
        )));
    }
    Ok(())
}

impl WeightVector {
    /// Build version 1 from ordered (axis, weight) pairs.
    pub fn new<S: Into<String>>(pairs: impl IntoIterator<Item = (S, f64)>) -> GuardResult<Self> {
        let mut seen = HashSet::new();
        let mut axes = Vec::new();
        for (axis, weight) in pairs {
            let axis = axis.into();
            check_weight(&axis, weight)?;
            if !seen.insert(axis.clone()) {
                return Err(GuardError::Config(format!("duplicate axis {axis}")));
            }
            axes.push(AxisWeight { axis, weight });
        }
        Ok(Self { version: 1, axes })
    }

    /// Baseline weights over `DEFAULT_AXES`.
    pub fn baseline() -> Self {
        let axes = DEFAULT_AXES
            .iter()
            .zip(BASELINE_WEIGHTS)
            .map(|((code, _), weight)| AxisWeight {
                axis: (*code).to_string(),
                weight,
            })
            .collect();
        Self { version: 1, axes }
    }

    /// Equal weight `w` on every axis in `axes`.
    pub fn uniform(axes: &[&str], weight: f64) -> GuardResult<Self> {
        Self::new(axes.iter().map(|a| (*a, weight)))
    }

    /// Load from a JSON object of axis code → weight, ordered by `order`.
    ///
    /// Every axis in `order` must be present; extra keys are ignored.
    pub fn from_json(json: &str, order: &[&str]) -> GuardResult<Self> {
        let map: BTreeMap<String, f64> = serde_json::from_str(json)
            .map_err(|e| GuardError::Config(format!("JSON parse error: {e}")))?;
        let mut pairs = Vec::with_capacity(order.len());
        for axis in order {
            let weight = map
                .get(*axis)
                .copied()
                .ok_or_else(|| GuardError::Config(format!("missing weight for axis {axis}")))?;
            pairs.push((*axis, weight));
        }
        Self::new(pairs)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    pub fn axes(&self) -> &[AxisWeight] {
        &self.axes
    }

    pub fn axis_ids(&self) -> impl Iterator<Item = &str> {
        self.axes.iter().map(|a| a.axis.as_str())
    }

    /// Weights in axis order.
    pub fn values(&self) -> Vec<f64> {
        self.axes.iter().map(|a| a.weight).collect()
    }

    pub fn get(&self, axis: &str) -> Option<f64> {
        self.axes.iter().find(|a| a.axis == axis).map(|a| a.weight)
    }

    /// New version with one axis weight replaced.
    pub fn with_weight(&self, axis: &str, weight: f64) -> GuardResult<Self> {
        check_weight(axis, weight)?;
        let mut next = self.clone();
        let slot = next
            .axes
            .iter_mut()
            .find(|a| a.axis == axis)
            .ok_or_else(|| GuardError::Config(format!("unknown axis {axis}")))?;
        slot.weight = weight;
        next.version += 1;
        Ok(next)
    }

    /// New version with all weights replaced, axis order preserved.
    pub fn with_values(&self, values: &[f64]) -> GuardResult<Self> {
        if values.len() != self.axes.len() {
            return Err(GuardError::ShapeMismatch {
                what: "weights",
                expected: self.axes.len(),
                actual: values.len(),
            });
        }
        let mut next = self.clone();
        for (slot, &w) in next.axes.iter_mut().zip(values) {
            check_weight(&slot.axis, w)?;
            slot.weight = w;
        }
        next.version += 1;
        Ok(next)
    }
}

/// Maps free-text column labels to axis codes, in axis order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisMap {
    columns: Vec<(String, String)>,
}

impl Default for AxisMap {
    fn default() -> Self {
        Self {
            columns: DEFAULT_AXES
                .iter()
                .map(|(code, label)| ((*label).to_string(), (*code).to_string()))
                .collect(),
        }
    }
}

impl AxisMap {
    /// Build from ordered (column label, axis code) pairs.
    pub fn from_pairs<L: Into<String>, C: Into<String>>(
        pairs: impl IntoIterator<Item = (L, C)>,
    ) -> Self {
        Self {
            columns: pairs
                .into_iter()
                .map(|(l, c)| (l.into(), c.into()))
                .collect(),
        }
    }

    /// Axis codes in order, suitable for `WeightVector::from_json`.
    pub fn codes(&self) -> Vec<&str> {
        self.columns.iter().map(|(_, c)| c.as_str()).collect()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(l, _)| l.as_str())
    }

    pub fn code_for(&self, label: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| c.as_str())
    }

    /// Extract scores from one input row, ordered by axis.
    pub fn scores_from_row(&self, row: &BTreeMap<String, f64>) -> GuardResult<Vec<f64>> {
        self.columns
            .iter()
            .map(|(label, _)| {
                row.get(label)
                    .copied()
                    .ok_or_else(|| GuardError::Config(format!("missing column {label}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_shape() {
        let w = WeightVector::baseline();
        assert_eq!(w.len(), 8);
        assert_eq!(w.version(), 1);
        assert_eq!(w.get("VER"), Some(0.95));
        assert_eq!(w.axis_ids().next(), Some("INT"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        assert!(WeightVector::new([("A", 1.0), ("B", -0.1)]).is_err());
        assert!(WeightVector::new([("A", f64::NAN)]).is_err());
    }

    #[test]
    fn test_duplicate_axis_rejected() {
        assert!(WeightVector::new([("A", 1.0), ("A", 0.5)]).is_err());
    }

    #[test]
    fn test_from_json_uses_given_order() {
        let json = r#"{"LEX": 0.5, "INT": 1.0, "EXTRA": 3.0}"#;
        let w = WeightVector::from_json(json, &["INT", "LEX"]).unwrap();
        assert_eq!(w.values(), vec![1.0, 0.5]);
    }

    #[test]
    fn test_from_json_missing_axis() {
        let err = WeightVector::from_json(r#"{"INT": 1.0}"#, &["INT", "LEX"]).unwrap_err();
        assert!(err.to_string().contains("LEX"));
    }

    #[test]
    fn test_with_weight_bumps_version_and_keeps_input() {
        let w1 = WeightVector::baseline();
        let w2 = w1.with_weight("LIB", 0.5).unwrap();
        assert_eq!(w1.get("LIB"), Some(0.80));
        assert_eq!(w2.get("LIB"), Some(0.5));
        assert_eq!(w2.version(), 2);
        assert!(w1.with_weight("NOPE", 1.0).is_err());
    }

    #[test]
    fn test_with_values_shape_mismatch() {
        let w = WeightVector::baseline();
        assert!(matches!(
            w.with_values(&[1.0, 2.0]),
            Err(GuardError::ShapeMismatch { expected: 8, actual: 2, .. })
        ));
    }

    #[test]
    fn test_axis_map_scores_from_row() {
        let map = AxisMap::from_pairs([("Truth", "VER"), ("Freedom", "LIB")]);
        let mut row = BTreeMap::new();
        row.insert("Freedom".to_string(), 0.4);
        row.insert("Truth".to_string(), 0.9);
        assert_eq!(map.scores_from_row(&row).unwrap(), vec![0.9, 0.4]);
        assert_eq!(map.codes(), vec!["VER", "LIB"]);
        assert_eq!(map.code_for("Truth"), Some("VER"));

        row.remove("Truth");
        assert!(map.scores_from_row(&row).is_err());
    }

    #[test]
    fn test_default_axis_map_matches_baseline_order() {
        let map = AxisMap::default();
        let codes = map.codes();
        let baseline = WeightVector::baseline();
        let ids: Vec<&str> = baseline.axis_ids().collect();
        assert_eq!(codes, ids);
        assert_eq!(map.code_for("Pravda (VER)"), Some("VER"));
    }

    #[test]
    fn test_deserialize_enforces_invariants() {
        let ok: WeightVector =
            serde_json::from_str(r#"{"version":3,"axes":[{"axis":"A","weight":0.5}]}"#).unwrap();
        assert_eq!(ok.version(), 3);
        assert_eq!(ok.values(), vec![0.5]);

        let negative = r#"{"version":1,"axes":[{"axis":"A","weight":-1.0}]}"#;
        assert!(serde_json::from_str::<WeightVector>(negative).is_err());

        let duplicate =
            r#"{"version":1,"axes":[{"axis":"A","weight":1.0},{"axis":"A","weight":2.0}]}"#;
        assert!(serde_json::from_str::<WeightVector>(duplicate).is_err());

        let unversioned = r#"{"version":0,"axes":[]}"#;
        assert!(serde_json::from_str::<WeightVector>(unversioned).is_err());
    }

    #[test]
    fn test_serde_round_trip_keeps_version() {
        let next = WeightVector::baseline().with_weight("INT", 0.5).unwrap();
        let json = serde_json::to_string(&next).unwrap();
        let back: WeightVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, next);
    }
}
