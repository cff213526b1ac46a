//! Shared test utilities for image-based unit tests.

use image::{GrayImage, Luma};

/// Constant-valued grayscale image.
pub(crate) fn flat_gray(w: u32, h: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(w, h, Luma([value]))
}

/// Grayscale ramp with distinct values across rows and columns.
pub(crate) fn gradient_gray(w: u32, h: u32) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]))
}
