// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Weight Updates
// ─────────────────────────────────────────────────────────────────────
//! Offline weight updates. Every update returns a new `WeightVector`
//! with the version bumped; the input vector is never touched, so
//! evaluations holding the old version are unaffected.

use axiom_types::{GuardError, GuardResult, WeightVector};

/// Upper clip applied by gradient steps.
pub const MAX_WEIGHT: f64 = 2.0;

/// Posterior mean of `Beta(prior_a + successes, prior_b + failures)`.
pub fn bayes_update_weight(
    prior_a: f64,
    prior_b: f64,
    successes: u64,
    trials: u64,
) -> GuardResult<f64> {
    if !(prior_a.is_finite() && prior_b.is_finite()) || prior_a < 0.0 || prior_b < 0.0 {
        return Err(GuardError::Config(format!(
            "beta priors must be finite and non-negative, got a={prior_a} b={prior_b}"
        )));
    }
    if successes > trials {
        return Err(GuardError::Config(format!(
            "successes ({successes}) exceed trials ({trials})"
        )));
    }
    let a = prior_a + successes as f64;
    let b = prior_b + (trials - successes) as f64;
    if a + b <= 0.0 {
        return Err(GuardError::Config(
            "beta posterior is undefined with zero priors and no trials".to_string(),
        ));
    }
    Ok(a / (a + b))
}

/// Bayes update applied to one axis of `weights`.
pub fn bayes_update_axis(
    weights: &WeightVector,
    axis: &str,
    prior_a: f64,
    prior_b: f64,
    successes: u64,
    trials: u64,
) -> GuardResult<WeightVector> {
    let w = bayes_update_weight(prior_a, prior_b, successes, trials)?;
    weights.with_weight(axis, w)
}

/// One gradient step `w − lr·g`, clipped to `[0, MAX_WEIGHT]`.
pub fn gradient_descent_update(
    weights: &WeightVector,
    gradients: &[f64],
    learning_rate: f64,
) -> GuardResult<WeightVector> {
    if gradients.len() != weights.len() {
        return Err(GuardError::ShapeMismatch {
            what: "gradients",
            expected: weights.len(),
            actual: gradients.len(),
        });
    }
    if !learning_rate.is_finite() || gradients.iter().any(|g| !g.is_finite()) {
        return Err(GuardError::Numerical(
            "gradient step needs finite learning rate and gradients".to_string(),
        ));
    }
    let next: Vec<f64> = weights
        .values()
        .iter()
        .zip(gradients)
        .map(|(w, g)| (w - learning_rate * g).clamp(0.0, MAX_WEIGHT))
        .collect();
    weights.with_values(&next)
}
