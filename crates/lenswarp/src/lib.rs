//! lenswarp — radial lens distortion simulator for synthetic datasets.
//!
//! Given an undistorted source image, produces the image as seen through a
//! lens with a polynomial radial distortion profile, plus the dense
//! forward/inverse displacement maps that describe the warp. The pipeline
//! stages are:
//!
//! 1. **Model** – polynomial radial profile mapping radius → distorted radius.
//! 2. **Invert** – per-radius bisection inversion of the profile.
//! 3. **Field** – dense forward/inverse displacement fields over the grid.
//! 4. **Resample** – forward splat of source pixels with bilinear weights
//!    into an accumulation plane, followed by weight normalization.
//! 5. **Remap** – final pull-based bilinear resample through the inverse
//!    field.
//!
//! # Public API
//! - [`simulate`] with [`SimulateConfig`] as the primary entry point
//! - [`RadialPolynomial`] and [`InvertConfig`] for model tuning
//! - stage functions ([`build_fields`], [`scatter_resample`], [`remap`])
//!   for callers that only need part of the pipeline
//!
//! All computation is sequential and deterministic; image decode/encode is
//! the caller's concern.

mod field;
mod invert;
mod model;
mod pipeline;
mod remap;
mod resample;

#[cfg(test)]
mod test_utils;

pub use field::{build_fields, DisplacementField, FieldBuild, FieldPair, InvertStats};
pub use invert::{invert_radius, Inversion, InvertConfig};
pub use model::RadialPolynomial;
pub use pipeline::{simulate, SimulateConfig, Simulation};
pub use remap::{remap, sample_bilinear};
pub use resample::{scatter_resample, FloatBuffer, Scatter, WeightBuffer};
