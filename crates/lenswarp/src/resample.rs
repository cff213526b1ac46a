use image::{ImageBuffer, Pixel};

use crate::field::DisplacementField;

/// Weights at or below this are treated as "no contribution".
const WEIGHT_EPS: f32 = 1e-6;

/// Channel-major float accumulation plane with the source image's
/// dimensions.
#[derive(Debug, Clone)]
pub struct FloatBuffer {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<f32>,
}

impl FloatBuffer {
    /// Zero-initialized plane.
    pub fn zeros(width: u32, height: u32, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0.0; width as usize * height as usize * channels],
        }
    }

    /// Plane width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Plane height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channels per pixel.
    pub fn channels(&self) -> usize {
        self.channels
    }

    fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels
    }

    /// Channel values accumulated at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> &[f32] {
        let i = self.idx(x, y);
        &self.data[i..i + self.channels]
    }

    fn add(&mut self, x: u32, y: u32, values: &[f32], weight: f32) {
        let i = self.idx(x, y);
        for (slot, v) in self.data[i..i + self.channels].iter_mut().zip(values) {
            *slot += v * weight;
        }
    }
}

/// Per-pixel splat weight accumulation (channel-independent).
#[derive(Debug, Clone)]
pub struct WeightBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl WeightBuffer {
    /// Zero-initialized buffer.
    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    /// Buffer width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Accumulated weight at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    fn add(&mut self, x: u32, y: u32, weight: f32) {
        self.data[y as usize * self.width as usize + x as usize] += weight;
    }
}

/// Output of [`scatter_resample`].
pub struct Scatter<P: Pixel<Subpixel = u8>> {
    /// Weight-normalized accumulation plane.
    pub accum: FloatBuffer,
    /// Accumulated splat weights.
    pub weights: WeightBuffer,
    /// Quantized intermediate image, consumed by the final remap.
    pub image: ImageBuffer<P, Vec<u8>>,
    /// Destination pixels no splat reached; these hold the sentinel 0.
    pub zero_weight_pixels: u64,
}

/// Forward-splat the source image through the inverse displacement field.
///
/// Every source pixel is scattered to `(x+dx, y+dy)`: the target splits
/// into an integer base and fractional offsets `(right, lower)` in
/// `[0, 1)`, and the pixel's channel values land in the 2×2 neighborhood
/// of the base with bilinear weights. Out-of-range taps are dropped
/// individually, so no out-of-range write ever happens and accumulated
/// weights stay non-negative.
///
/// Normalization divides each channel by the pixel's accumulated weight;
/// cells no splat reached keep the sentinel value 0 instead of a 0/0
/// division. Normalized values are clamped to `[0, 255]` before
/// quantization.
pub fn scatter_resample<P: Pixel<Subpixel = u8>>(
    src: &ImageBuffer<P, Vec<u8>>,
    inverse: &DisplacementField,
) -> Scatter<P> {
    let (width, height) = src.dimensions();
    let channels = P::CHANNEL_COUNT as usize;
    let mut accum = FloatBuffer::zeros(width, height, channels);
    let mut weights = WeightBuffer::zeros(width, height);
    let mut values = vec![0.0f32; channels];

    for y in 0..height {
        for x in 0..width {
            let [dx, dy] = inverse.get(x, y);
            let tx = x as f32 + dx;
            let ty = y as f32 + dy;
            let bx = tx.floor();
            let by = ty.floor();
            let right = tx - bx;
            let lower = ty - by;
            let bx = bx as i64;
            let by = by as i64;

            for (slot, &v) in values.iter_mut().zip(src.get_pixel(x, y).channels()) {
                *slot = v as f32;
            }

            let taps = [
                (bx, by, (1.0 - right) * (1.0 - lower)),
                (bx + 1, by, right * (1.0 - lower)),
                (bx, by + 1, (1.0 - right) * lower),
                (bx + 1, by + 1, right * lower),
            ];
            for (tap_x, tap_y, weight) in taps {
                if tap_x < 0 || tap_y < 0 || tap_x >= width as i64 || tap_y >= height as i64 {
                    continue;
                }
                accum.add(tap_x as u32, tap_y as u32, &values, weight);
                weights.add(tap_x as u32, tap_y as u32, weight);
            }
        }
    }

    let mut quantized = vec![0u8; width as usize * height as usize * channels];
    let mut zero_weight_pixels = 0u64;
    for y in 0..height {
        for x in 0..width {
            let weight = weights.get(x, y);
            let i = accum.idx(x, y);
            if weight <= WEIGHT_EPS {
                zero_weight_pixels += 1;
                for c in 0..channels {
                    accum.data[i + c] = 0.0;
                }
                continue;
            }
            for c in 0..channels {
                let v = (accum.data[i + c] / weight).clamp(0.0, 255.0);
                accum.data[i + c] = v;
                quantized[i + c] = v.round() as u8;
            }
        }
    }

    let image = ImageBuffer::from_raw(width, height, quantized)
        .expect("quantized plane matches image dimensions");

    Scatter {
        accum,
        weights,
        image,
        zero_weight_pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::build_fields;
    use crate::invert::InvertConfig;
    use crate::model::RadialPolynomial;
    use crate::test_utils::{flat_gray, gradient_gray};
    use image::{Rgb, RgbImage};

    #[test]
    fn zero_field_is_identity() {
        let src = gradient_gray(8, 8);
        let out = scatter_resample(&src, &DisplacementField::zeros(8, 8));
        assert_eq!(out.zero_weight_pixels, 0);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(out.weights.get(x, y), 1.0, "weight at ({x},{y})");
                assert_eq!(
                    out.image.get_pixel(x, y),
                    src.get_pixel(x, y),
                    "pixel at ({x},{y})"
                );
            }
        }
    }

    #[test]
    fn weights_stay_non_negative_under_distortion() {
        let src = gradient_gray(32, 32);
        let build = build_fields(
            32,
            32,
            &RadialPolynomial::default(),
            &InvertConfig::default(),
        );
        let out = scatter_resample(&src, &build.fields.inverse);
        for y in 0..32 {
            for x in 0..32 {
                assert!(out.weights.get(x, y) >= 0.0, "weight at ({x},{y})");
            }
        }
    }

    #[test]
    fn unreached_cells_hold_sentinel_zero() {
        let src = flat_gray(6, 6, 200);
        // push every splat far outside the grid
        let field = DisplacementField::from_fn(6, 6, |_, _| [1000.0, 1000.0]);
        let out = scatter_resample(&src, &field);
        assert_eq!(out.zero_weight_pixels, 36);
        for y in 0..6 {
            for x in 0..6 {
                assert_eq!(out.weights.get(x, y), 0.0);
                assert_eq!(out.image.get_pixel(x, y)[0], 0);
                assert_eq!(out.accum.get(x, y), [0.0f32].as_slice());
            }
        }
    }

    #[test]
    fn fractional_target_splits_weight_bilinearly() {
        // one bright pixel, displaced by exactly half a pixel in x
        let mut src = flat_gray(4, 4, 0);
        src.put_pixel(1, 1, image::Luma([100]));
        let field =
            DisplacementField::from_fn(4, 4, |x, y| if (x, y) == (1, 1) { [0.5, 0.0] } else { [0.0, 0.0] });
        let out = scatter_resample(&src, &field);
        // the displaced pixel leaves half its weight at home, half one to
        // the right; the right cell also keeps its own full-weight splat
        assert!((out.weights.get(1, 1) - 0.5).abs() < 1e-6);
        assert!((out.weights.get(2, 1) - 1.5).abs() < 1e-6);
        assert_eq!(out.image.get_pixel(1, 1)[0], 100);
        // (0.5·100 + 1.0·0) / 1.5
        assert_eq!(out.image.get_pixel(2, 1)[0], 33);
    }

    #[test]
    fn color_channels_are_preserved_independently() {
        let mut src = RgbImage::new(4, 4);
        for p in src.pixels_mut() {
            *p = Rgb([10, 20, 30]);
        }
        let out = scatter_resample(&src, &DisplacementField::zeros(4, 4));
        assert_eq!(out.zero_weight_pixels, 0);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(out.image.get_pixel(x, y), &Rgb([10, 20, 30]));
            }
        }
    }

    #[test]
    fn single_pixel_image_round_trips() {
        let src = flat_gray(1, 1, 128);
        let out = scatter_resample(&src, &DisplacementField::zeros(1, 1));
        assert_eq!(out.zero_weight_pixels, 0);
        assert_eq!(out.weights.get(0, 0), 1.0);
        assert_eq!(out.image.get_pixel(0, 0)[0], 128);
    }
}
