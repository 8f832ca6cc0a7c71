//! Neighborhood alpha filters for the anti-aliasing band.
//!
//! [`Subpixel`] softens mid-range alpha toward its 4-neighborhood and can
//! optionally sharpen it back; [`BlurSharpen`] blurs the outer edge and then
//! restores contrast where the blur moved a real transition.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::icon_matte::alpha_channel::{map_alpha, PixelBuffer};
use crate::icon_matte::boundary::BoundaryMap;
use crate::icon_matte::gaussian::GaussianKernel;
use crate::icon_matte::quality::AlphaFilter;
use crate::utils::{
    offset, round_alpha, validate_range_f32, validate_range_u32, NEIGHBORS_4, NEIGHBORS_8,
};

/// Neutral sharpness, no unsharp masking
const NEUTRAL_SHARPNESS: u32 = 100;
/// Alpha step to a neighbor that marks a transition
const TRANSITION_STEP: u8 = 20;

/// Mean alpha of the in-bounds neighbors at the given offsets
fn neighbor_mean(image: &PixelBuffer, x: u32, y: u32, offsets: &[(i64, i64)]) -> Option<f32> {
    let (width, height) = image.dimensions();
    let (sum, count) = offsets
        .iter()
        .filter_map(|&(dx, dy)| offset(x, y, dx, dy, width, height))
        .fold((0u32, 0u32), |(sum, count), (nx, ny)| {
            (sum + u32::from(image.get_pixel(nx, ny)[3]), count + 1)
        });
    (count > 0).then(|| sum as f32 / count as f32)
}

/// Sub-pixel alpha smoothing with optional unsharp masking
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Subpixel {
    threshold: u8,
    smooth: f32,
    sharpness: u32,
}

impl Subpixel {
    /// Create a new sub-pixel filter
    ///
    /// # Arguments
    ///
    /// * `threshold` - Pixels with `threshold < alpha < 255 - threshold` are filtered, 0..=127
    /// * `smooth` - Blend factor toward the 4-neighbor mean, 0.0..=1.0
    /// * `sharpness` - Unsharp gain in percent, 100 disables sharpening, 0..=300
    ///
    /// # Errors
    ///
    /// * `FilterError::InvalidParameter` - When any argument is out of range
    pub fn new(threshold: u8, smooth: f32, sharpness: u32) -> Result<Self, FilterError> {
        validate_range_u32(
            "threshold",
            u32::from(threshold),
            0,
            127,
            "threshold must be 0..=127",
        )?;
        validate_range_f32("smooth", smooth, 0.0, 1.0, "smooth must be 0.0..=1.0")?;
        validate_range_u32("sharpness", sharpness, 0, 300, "sharpness must be 0..=300")?;
        Ok(Self {
            threshold,
            smooth,
            sharpness,
        })
    }

    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    pub const fn smooth(&self) -> f32 {
        self.smooth
    }

    pub const fn sharpness(&self) -> u32 {
        self.sharpness
    }

    #[inline]
    fn in_band(&self, alpha: u8) -> bool {
        alpha > self.threshold && alpha < 255 - self.threshold
    }
}

impl AlphaFilter for Subpixel {
    fn apply(&self, image: &PixelBuffer) -> PixelBuffer {
        let gain = (self.sharpness as f32 - NEUTRAL_SHARPNESS as f32) / 100.0;

        map_alpha(image, |x, y, pixel| {
            let alpha = pixel[3];
            if !self.in_band(alpha) {
                return alpha;
            }

            let own = f32::from(alpha);
            let mut value = neighbor_mean(image, x, y, &NEIGHBORS_4)
                .map_or(own, |mean| own + (mean - own) * self.smooth);

            if self.sharpness != NEUTRAL_SHARPNESS {
                if let Some(low) = neighbor_mean(image, x, y, &NEIGHBORS_8) {
                    value += (value - low) * gain;
                }
            }
            round_alpha(value)
        })
    }
}

/// Edge blur followed by thresholded unsharp masking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlurSharpen {
    blur_radius: u32,
    sharpen_strength: u32,
    threshold: u8,
}

impl BlurSharpen {
    /// Create a new blur-then-sharpen filter
    ///
    /// # Arguments
    ///
    /// * `blur_radius` - Gaussian radius applied to outer-edge pixels, 1..=8
    /// * `sharpen_strength` - Unsharp gain in percent, 0..=300
    /// * `threshold` - Minimum blur displacement that triggers sharpening
    ///
    /// # Errors
    ///
    /// * `FilterError::InvalidParameter` - When a radius or strength is out of range
    pub fn new(
        blur_radius: u32,
        sharpen_strength: u32,
        threshold: u8,
    ) -> Result<Self, FilterError> {
        validate_range_u32("blur_radius", blur_radius, 1, 8, "blur radius must be 1..=8")?;
        validate_range_u32(
            "sharpen_strength",
            sharpen_strength,
            0,
            300,
            "sharpen strength must be 0..=300",
        )?;
        Ok(Self {
            blur_radius,
            sharpen_strength,
            threshold,
        })
    }

    pub const fn blur_radius(&self) -> u32 {
        self.blur_radius
    }

    pub const fn sharpen_strength(&self) -> u32 {
        self.sharpen_strength
    }

    pub const fn threshold(&self) -> u8 {
        self.threshold
    }
}

impl AlphaFilter for BlurSharpen {
    fn apply(&self, image: &PixelBuffer) -> PixelBuffer {
        let boundary = BoundaryMap::new(image);
        let kernel = GaussianKernel::new(self.blur_radius);

        let blurred = map_alpha(image, |x, y, pixel| {
            if boundary.is_outer_edge(x, y) {
                round_alpha(kernel.convolve_alpha(image, x, y).0)
            } else {
                pixel[3]
            }
        });

        let gain = self.sharpen_strength as f32 / 100.0;
        map_alpha(&blurred, |x, y, pixel| {
            let original = image.get_pixel(x, y)[3];
            let soft = pixel[3];
            if original == 0 || soft.abs_diff(original) <= self.threshold {
                return soft;
            }
            if !is_transition(image, x, y) {
                return soft;
            }
            let original = f32::from(original);
            round_alpha(original + (original - f32::from(soft)) * gain)
        })
    }
}

/// Whether some 8-neighbor is more than 20 alpha above and another more than
/// 20 below this pixel
fn is_transition(image: &PixelBuffer, x: u32, y: u32) -> bool {
    let (width, height) = image.dimensions();
    let alpha = image.get_pixel(x, y)[3];

    let (mut above, mut below) = (false, false);
    for (nx, ny) in NEIGHBORS_8
        .iter()
        .filter_map(|&(dx, dy)| offset(x, y, dx, dy, width, height))
    {
        let neighbor = image.get_pixel(nx, ny)[3];
        above |= neighbor > alpha.saturating_add(TRANSITION_STEP);
        below |= neighbor < alpha.saturating_sub(TRANSITION_STEP);
    }
    above && below
}
