//! Supersampled alpha anti-aliasing.
//!
//! The buffer is upscaled with Catmull-Rom, the alpha channel is pushed away
//! from the midpoint, and the result is brought back to the original size with
//! Lanczos3. Only the resampled alpha is kept; color channels come from the
//! input untouched.

use image::imageops::{self, FilterType};
use image::Rgba;
use imageproc::map::map_colors;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::icon_matte::alpha_channel::PixelBuffer;
use crate::icon_matte::quality::AlphaFilter;
use crate::utils::validate_range_u32;

/// Alpha midpoint used by the contrast push
const PIVOT: u8 = 128;

/// Upscale, sharpen alpha, downscale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Supersample {
    scale: u32,
}

impl Supersample {
    /// Create a new supersampler
    ///
    /// # Errors
    ///
    /// * `FilterError::InvalidParameter` - When `scale` is outside 2..=8
    pub fn new(scale: u32) -> Result<Self, FilterError> {
        validate_range_u32("scale", scale, 2, 8, "supersampling scale must be 2..=8")?;
        Ok(Self { scale })
    }

    pub const fn scale(&self) -> u32 {
        self.scale
    }
}

impl AlphaFilter for Supersample {
    fn apply(&self, image: &PixelBuffer) -> PixelBuffer {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return image.clone();
        }

        let upscaled = imageops::resize(
            image,
            width * self.scale,
            height * self.scale,
            FilterType::CatmullRom,
        );
        let pushed = map_colors(&upscaled, |Rgba([red, green, blue, alpha])| {
            Rgba([red, green, blue, push_contrast(alpha)])
        });
        let downscaled = imageops::resize(&pushed, width, height, FilterType::Lanczos3);

        let mut output = image.clone();
        for (pixel, resampled) in output.pixels_mut().zip(downscaled.pixels()) {
            pixel[3] = resampled[3];
        }
        output
    }
}

/// Halves alpha below the pivot and halves the distance to 255 above it
#[inline]
fn push_contrast(alpha: u8) -> u8 {
    if alpha < PIVOT {
        alpha / 2
    } else {
        alpha + (255 - alpha).div_ceil(2)
    }
}
