use image::{ImageBuffer, Pixel};

use crate::field::DisplacementField;

/// Bilinear sample at `(x, y)` with nearest-pixel extension.
///
/// Tap indices are clamped to the valid pixel range, so out-of-range
/// coordinates read the border instead of faulting. `out` must hold one
/// slot per channel.
pub fn sample_bilinear<P: Pixel<Subpixel = u8>>(
    img: &ImageBuffer<P, Vec<u8>>,
    x: f32,
    y: f32,
    out: &mut [f32],
) {
    let (width, height) = img.dimensions();
    let base_x = x.floor();
    let base_y = y.floor();
    let fx = x - base_x;
    let fy = y - base_y;

    let clamp_x = |v: i64| v.clamp(0, width as i64 - 1) as u32;
    let clamp_y = |v: i64| v.clamp(0, height as i64 - 1) as u32;
    let x0 = clamp_x(base_x as i64);
    let x1 = clamp_x(base_x as i64 + 1);
    let y0 = clamp_y(base_y as i64);
    let y1 = clamp_y(base_y as i64 + 1);

    let p00 = img.get_pixel(x0, y0).channels();
    let p10 = img.get_pixel(x1, y0).channels();
    let p01 = img.get_pixel(x0, y1).channels();
    let p11 = img.get_pixel(x1, y1).channels();

    for (c, slot) in out.iter_mut().enumerate() {
        *slot = (1.0 - fx) * (1.0 - fy) * p00[c] as f32
            + fx * (1.0 - fy) * p10[c] as f32
            + (1.0 - fx) * fy * p01[c] as f32
            + fx * fy * p11[c] as f32;
    }
}

/// Pull-based resample of the intermediate image through the inverse
/// field.
///
/// Every destination pixel reads the intermediate image at `(x+dx, y+dy)`
/// with clamped bilinear interpolation. One pass, no failure mode.
pub fn remap<P: Pixel<Subpixel = u8>>(
    intermediate: &ImageBuffer<P, Vec<u8>>,
    inverse: &DisplacementField,
) -> ImageBuffer<P, Vec<u8>> {
    let (width, height) = intermediate.dimensions();
    let channels = P::CHANNEL_COUNT as usize;
    let mut out = vec![0u8; width as usize * height as usize * channels];
    let mut sampled = vec![0.0f32; channels];

    for y in 0..height {
        for x in 0..width {
            let [dx, dy] = inverse.get(x, y);
            sample_bilinear(intermediate, x as f32 + dx, y as f32 + dy, &mut sampled);
            let i = (y as usize * width as usize + x as usize) * channels;
            for (slot, &v) in out[i..i + channels].iter_mut().zip(&sampled) {
                *slot = v.clamp(0.0, 255.0).round() as u8;
            }
        }
    }

    ImageBuffer::from_raw(width, height, out).expect("output plane matches image dimensions")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::gradient_gray;
    use image::{GrayImage, Luma};

    #[test]
    fn zero_field_is_identity() {
        let src = gradient_gray(7, 5);
        let out = remap(&src, &DisplacementField::zeros(7, 5));
        assert_eq!(out, src);
    }

    #[test]
    fn sampling_interpolates_between_neighbors() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([0]));
        img.put_pixel(1, 0, Luma([100]));
        let mut v = [0.0f32];
        sample_bilinear(&img, 0.5, 0.0, &mut v);
        assert!((v[0] - 50.0).abs() < 1e-5);
        sample_bilinear(&img, 0.25, 0.0, &mut v);
        assert!((v[0] - 25.0).abs() < 1e-5);
    }

    #[test]
    fn out_of_range_reads_clamp_to_border() {
        let src = gradient_gray(4, 4);
        let field = DisplacementField::from_fn(4, 4, |_, _| [-5.0, -5.0]);
        let out = remap(&src, &field);
        // every sample lands beyond the top-left corner
        let corner = src.get_pixel(0, 0);
        for p in out.pixels() {
            assert_eq!(p, corner);
        }
    }

    #[test]
    fn single_pixel_remap_is_identity() {
        let mut img = GrayImage::new(1, 1);
        img.put_pixel(0, 0, Luma([77]));
        let out = remap(&img, &DisplacementField::zeros(1, 1));
        assert_eq!(out.get_pixel(0, 0)[0], 77);
    }
}
