use serde::{Deserialize, Serialize};

use crate::model::RadialPolynomial;

/// Termination settings for bisection inversion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InvertConfig {
    /// Absolute tolerance (pixels) on the reproduced distorted radius.
    pub tolerance: f64,
    /// Maximum interval-halving steps per inversion.
    pub max_iters: usize,
}

impl Default for InvertConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            max_iters: 100,
        }
    }
}

/// Outcome of a single radius inversion.
#[derive(Debug, Clone, Copy)]
pub struct Inversion {
    /// Best radius found.
    pub radius: f64,
    /// Model evaluations spent: the initial midpoint plus one per
    /// halving step.
    pub evals: u64,
}

/// Approximate the radius `v` with `model.evaluate(v) ≈ target`.
///
/// Bisection over `[0, upper)`. Best-effort: when the tolerance is not met
/// within the step budget, the best guess found is returned. Inversion
/// never fails, and callers must treat the result as an approximation.
///
/// Preconditions: `upper > 0`, and the model is monotonically
/// non-decreasing on `[0, upper)`. Pathological coefficient combinations
/// that break monotonicity may converge to a wrong root; this is not
/// detected.
pub fn invert_radius(
    model: &RadialPolynomial,
    target: f64,
    upper: f64,
    config: &InvertConfig,
) -> Inversion {
    let mut lower = 0.0;
    let mut upper = upper;
    let mut guess = 0.5 * (lower + upper);
    let mut value = model.evaluate(guess);
    let mut evals = 1u64;
    let mut steps = 0usize;

    while (value - target).abs() > config.tolerance && steps < config.max_iters {
        if value <= target {
            lower = guess;
        } else {
            upper = guess;
        }
        guess = 0.5 * (lower + upper);
        value = model.evaluate(guess);
        evals += 1;
        steps += 1;
    }

    Inversion {
        radius: guess,
        evals,
    }
}
