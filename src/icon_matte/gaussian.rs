//! Selective Gaussian blur of the alpha channel.
//!
//! Only the anti-aliasing band is convolved: pixels whose alpha lies strictly
//! between 10 and 245, plus near-opaque pixels whose kernel window reaches a
//! non-opaque pixel. The latter lets a hard 0|255 step feather inward while
//! the transparent side stays untouched. Pixels with alpha 10 or below never
//! change, so the filter cannot raise a transparent pixel.
//!
//! With the `rayon` feature enabled rows are convolved in parallel.

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::icon_matte::alpha_channel::PixelBuffer;
use crate::icon_matte::quality::AlphaFilter;
use crate::utils::{round_alpha, validate_range_u32};

/// Pixels at or below this alpha are left alone
const BAND_LOW: u8 = 10;
/// Pixels at or above this alpha only blur next to a softer neighborhood
const BAND_HIGH: u8 = 245;

/// Normalized square Gaussian kernel with `sigma = radius / 2`
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    radius: u32,
    weights: Vec<f32>,
}

impl GaussianKernel {
    /// Builds a `(2r+1)²` kernel whose weights sum to 1
    ///
    /// A radius of 0 yields the identity kernel.
    pub fn new(radius: u32) -> Self {
        let size = (2 * radius + 1) as usize;
        if radius == 0 {
            return Self {
                radius,
                weights: vec![1.0],
            };
        }

        let sigma = radius as f32 / 2.0;
        let denominator = 2.0 * sigma * sigma;
        let r = radius as i64;

        let mut weights = Vec::with_capacity(size * size);
        for dy in -r..=r {
            for dx in -r..=r {
                let distance = (dx * dx + dy * dy) as f32;
                weights.push((-distance / denominator).exp());
            }
        }

        let total: f32 = weights.iter().sum();
        weights.iter_mut().for_each(|w| *w /= total);

        Self { radius, weights }
    }

    pub const fn radius(&self) -> u32 {
        self.radius
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Convolves the alpha channel at `(x, y)`, replicating edge pixels
    ///
    /// # Returns
    ///
    /// The weighted alpha and the minimum alpha seen inside the window
    pub fn convolve_alpha(&self, image: &PixelBuffer, x: u32, y: u32) -> (f32, u8) {
        let (width, height) = image.dimensions();
        let r = self.radius as i64;
        let size = (2 * self.radius + 1) as usize;

        let mut sum = 0.0;
        let mut minimum = u8::MAX;
        for (ky, dy) in (-r..=r).enumerate() {
            let sy = (i64::from(y) + dy).clamp(0, i64::from(height) - 1) as u32;
            for (kx, dx) in (-r..=r).enumerate() {
                let sx = (i64::from(x) + dx).clamp(0, i64::from(width) - 1) as u32;
                let alpha = image.get_pixel(sx, sy)[3];
                sum += self.weights[ky * size + kx] * f32::from(alpha);
                minimum = minimum.min(alpha);
            }
        }
        (sum, minimum)
    }
}

/// Gaussian alpha blur restricted to the anti-aliasing band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaussianAlphaBlur {
    radius: u32,
    passes: u32,
}

impl GaussianAlphaBlur {
    /// Create a new selective alpha blur
    ///
    /// # Arguments
    ///
    /// * `radius` - Kernel radius, 1..=16
    /// * `passes` - Number of repeated passes, 1..=8
    ///
    /// # Errors
    ///
    /// * `FilterError::InvalidParameter` - When either argument is out of range
    pub fn new(radius: u32, passes: u32) -> Result<Self, FilterError> {
        validate_range_u32("radius", radius, 1, 16, "blur radius must be 1..=16")?;
        validate_range_u32("passes", passes, 1, 8, "blur passes must be 1..=8")?;
        Ok(Self { radius, passes })
    }

    pub const fn radius(&self) -> u32 {
        self.radius
    }

    pub const fn passes(&self) -> u32 {
        self.passes
    }
}

impl AlphaFilter for GaussianAlphaBlur {
    fn apply(&self, image: &PixelBuffer) -> PixelBuffer {
        let kernel = GaussianKernel::new(self.radius);
        (0..self.passes).fold(image.clone(), |current, _| blur_pass(&current, &kernel))
    }
}

fn blurred_alpha(image: &PixelBuffer, kernel: &GaussianKernel, x: u32, y: u32) -> u8 {
    let alpha = image.get_pixel(x, y)[3];
    if alpha <= BAND_LOW {
        return alpha;
    }

    let (sum, minimum) = kernel.convolve_alpha(image, x, y);
    if alpha >= BAND_HIGH && minimum >= BAND_HIGH {
        return alpha;
    }
    round_alpha(sum)
}

fn blur_pass(image: &PixelBuffer, kernel: &GaussianKernel) -> PixelBuffer {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let mut alphas: Vec<u8> = image.pixels().map(|p| p[3]).collect();
    let fill_row = |(y, row): (usize, &mut [u8])| {
        for (x, alpha) in row.iter_mut().enumerate() {
            *alpha = blurred_alpha(image, kernel, x as u32, y as u32);
        }
    };

    #[cfg(feature = "rayon")]
    alphas
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(fill_row);
    #[cfg(not(feature = "rayon"))]
    alphas
        .chunks_mut(width as usize)
        .enumerate()
        .for_each(fill_row);

    let mut output = image.clone();
    for (pixel, alpha) in output.pixels_mut().zip(alphas) {
        pixel[3] = alpha;
    }
    output
}
