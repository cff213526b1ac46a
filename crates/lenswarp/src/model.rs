use serde::{Deserialize, Serialize};

/// Polynomial radial distortion profile.
///
/// Maps a radius `v` (pixels from the principal point) to a distorted
/// radius:
///
/// ```text
/// r_d = v + c2·v² + c4·v³ + c6·v⁴
/// ```
///
/// Positive coefficients push samples outward, negative pull them inward.
/// The default coefficients approximate a typical consumer-lens profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RadialPolynomial {
    /// Quadratic coefficient.
    pub c2: f64,
    /// Cubic coefficient.
    pub c4: f64,
    /// Quartic coefficient.
    pub c6: f64,
}

impl Default for RadialPolynomial {
    fn default() -> Self {
        Self {
            c2: 2e-5,
            c4: 5e-7,
            c6: 1e-8,
        }
    }
}

impl RadialPolynomial {
    /// Create a profile with explicit coefficients.
    pub fn new(c2: f64, c4: f64, c6: f64) -> Self {
        Self { c2, c4, c6 }
    }

    /// Identity profile (zero distortion).
    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Evaluate the profile at radius `v`.
    ///
    /// Pure and total over all real `v`; only non-negative radii occur in
    /// practice. Monotonically non-decreasing on the image domain for
    /// realistic coefficient magnitudes.
    pub fn evaluate(&self, v: f64) -> f64 {
        v + self.c2 * v * v + self.c4 * v * v * v + self.c6 * v * v * v * v
    }

    /// Returns `true` if all coefficients are zero (no distortion).
    pub fn is_identity(&self) -> bool {
        self.c2 == 0.0 && self.c4 == 0.0 && self.c6 == 0.0
    }
}
