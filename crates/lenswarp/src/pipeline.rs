//! Top-level pipeline orchestrator: fields → splat → remap.

use image::{ImageBuffer, Pixel};
use serde::{Deserialize, Serialize};

use crate::field::{build_fields, FieldPair};
use crate::invert::InvertConfig;
use crate::model::RadialPolynomial;
use crate::remap::remap;
use crate::resample::{scatter_resample, WeightBuffer};

/// Settings for one simulation run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SimulateConfig {
    /// Radial distortion profile to simulate.
    pub model: RadialPolynomial,
    /// Bisection termination settings for inverse-map construction.
    pub invert: InvertConfig,
}

/// Everything produced by one simulation run.
///
/// All buffers are owned by the result; nothing is shared across runs.
pub struct Simulation<P: Pixel<Subpixel = u8>> {
    /// Final distorted image.
    pub distorted: ImageBuffer<P, Vec<u8>>,
    /// Intermediate splat image before the final remap (diagnostics).
    pub intermediate: ImageBuffer<P, Vec<u8>>,
    /// Forward and inverse displacement fields.
    pub fields: FieldPair,
    /// Splat weight accumulation (diagnostics).
    pub weights: WeightBuffer,
    /// Mean bisection evaluations per pixel during inverse-map
    /// construction.
    pub mean_invert_evals: f64,
    /// Destination pixels never reached by any splat.
    pub zero_weight_pixels: u64,
}

/// Run the full distortion pipeline on a source image.
///
/// Stages run strictly in sequence, each consuming the complete output of
/// the previous one: displacement-field construction, forward splat with
/// weight normalization, final pull-based remap. Deterministic and
/// single-threaded; the source image is only read.
pub fn simulate<P: Pixel<Subpixel = u8>>(
    src: &ImageBuffer<P, Vec<u8>>,
    config: &SimulateConfig,
) -> Simulation<P> {
    let (width, height) = src.dimensions();
    let build = build_fields(width, height, &config.model, &config.invert);
    let scatter = scatter_resample(src, &build.fields.inverse);
    let distorted = remap(&scatter.image, &build.fields.inverse);

    Simulation {
        distorted,
        intermediate: scatter.image,
        fields: build.fields,
        weights: scatter.weights,
        mean_invert_evals: build.stats.mean_per_pixel(),
        zero_weight_pixels: scatter.zero_weight_pixels,
    }
}
