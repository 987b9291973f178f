// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Score Calibration
// ─────────────────────────────────────────────────────────────────────
//! Monotone transforms mapping a raw model score to a calibrated
//! probability.
//!
//! Calibrators are fitted offline; the kernel only evaluates them.
//! A failing calibrator never fails the pipeline: risk fusion falls
//! back to the raw score.

use serde::{Deserialize, Serialize};

use axiom_types::{GuardError, GuardResult};

/// Trait for calibration backends.
pub trait Calibrator: Send + Sync {
    fn transform(&self, raw: f64) -> GuardResult<f64>;
}

/// Isotonic calibrator: monotone piecewise-linear interpolation over
/// fitted breakpoints, clipped to the end values out of bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsotonicCalibrator {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl IsotonicCalibrator {
    /// `xs` strictly increasing, `ys` non-decreasing, equal lengths, at least one point.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> GuardResult<Self> {
        if xs.is_empty() || xs.len() != ys.len() {
            return Err(GuardError::Config(format!(
                "isotonic calibrator needs matching non-empty breakpoints, got {} x / {} y",
                xs.len(),
                ys.len()
            )));
        }
        if xs.iter().chain(&ys).any(|v| !v.is_finite()) {
            return Err(GuardError::Config(
                "isotonic breakpoints must be finite".to_string(),
            ));
        }
        if xs.windows(2).any(|w| w[1] <= w[0]) {
            return Err(GuardError::Config(
                "isotonic xs must be strictly increasing".to_string(),
            ));
        }
        if ys.windows(2).any(|w| w[1] < w[0]) {
            return Err(GuardError::Config(
                "isotonic ys must be non-decreasing".to_string(),
            ));
        }
        Ok(Self { xs, ys })
    }

    pub fn from_json(json: &str) -> GuardResult<Self> {
        let parsed: Self = serde_json::from_str(json)
            .map_err(|e| GuardError::Config(format!("JSON parse error: {e}")))?;
        Self::new(parsed.xs, parsed.ys)
    }
}

impl Calibrator for IsotonicCalibrator {
    fn transform(&self, raw: f64) -> GuardResult<f64> {
        if !raw.is_finite() {
            return Err(GuardError::Numerical(format!(
                "cannot calibrate non-finite score {raw}"
            )));
        }
        let last = self.xs.len() - 1;
        if raw <= self.xs[0] {
            return Ok(self.ys[0]);
        }
        if raw >= self.xs[last] {
            return Ok(self.ys[last]);
        }
        // xs[i-1] < raw < xs[i] for the first i with xs[i] > raw.
        let i = self.xs.partition_point(|&x| x <= raw);
        let (x0, x1) = (self.xs[i - 1], self.xs[i]);
        let (y0, y1) = (self.ys[i - 1], self.ys[i]);
        Ok(y0 + (raw - x0) * (y1 - y0) / (x1 - x0))
    }
}

/// Platt scaling: `1 / (1 + exp(a·raw + b))`, monotone decreasing in
/// `a·raw`; fitted models have `a < 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlattCalibrator {
    pub a: f64,
    pub b: f64,
}

impl PlattCalibrator {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }
}

impl Calibrator for PlattCalibrator {
    fn transform(&self, raw: f64) -> GuardResult<f64> {
        let arg = (self.a * raw + self.b).clamp(-500.0, 500.0);
        let p = 1.0 / (1.0 + arg.exp());
        if !p.is_finite() {
            return Err(GuardError::Numerical(format!(
                "platt transform of {raw} is not finite"
            )));
        }
        Ok(p)
    }
}

/// External calibrator that calls a function pointer.
type TransformFn = Box<dyn Fn(f64) -> GuardResult<f64> + Send + Sync>;

pub struct ExternalCalibrator {
    transform_fn: TransformFn,
}

impl ExternalCalibrator {
    pub fn new(transform_fn: impl Fn(f64) -> GuardResult<f64> + Send + Sync + 'static) -> Self {
        Self {
            transform_fn: Box::new(transform_fn),
        }
    }
}

impl Calibrator for ExternalCalibrator {
    fn transform(&self, raw: f64) -> GuardResult<f64> {
        (self.transform_fn)(raw)
    }
}
