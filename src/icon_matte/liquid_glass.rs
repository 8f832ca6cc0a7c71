//! Liquid-glass outline removal.
//!
//! Icons rendered with a glassy bezel often keep a bright, translucent rim
//! after matting. This filter builds a process zone from the outer edge
//! inward, `width` rings deep, and fades bright pixels inside it: the further
//! a pixel's brightness exceeds the configured threshold the more alpha it
//! loses, and pixels that were already translucent (alpha below 180) lose a
//! further flat 70%.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::icon_matte::alpha_channel::{map_alpha, PixelBuffer};
use crate::icon_matte::boundary::BoundaryMap;
use crate::utils::{brightness, round_alpha, validate_range_u32};

/// Pixels below this alpha get the additional flat cut
const TRANSLUCENT_ALPHA: u8 = 180;
/// Fraction of alpha kept by translucent bright pixels after the flat cut
const TRANSLUCENT_KEEP: f32 = 0.3;

/// Parameters for liquid-glass outline removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiquidGlass {
    width: u8,
    brightness: u8,
}

impl LiquidGlass {
    /// Create new liquid-glass parameters
    ///
    /// # Arguments
    ///
    /// * `width` - Depth of the process zone in rings, 1..=5
    /// * `brightness` - Pixels brighter than this are faded
    ///
    /// # Errors
    ///
    /// * `FilterError::InvalidParameter` - When `width` is outside 1..=5
    pub fn new(width: u8, brightness: u8) -> Result<Self, FilterError> {
        validate_range_u32(
            "width",
            u32::from(width),
            1,
            5,
            "outline width must be 1..=5 pixels",
        )?;
        Ok(Self { width, brightness })
    }

    pub const fn width(&self) -> u8 {
        self.width
    }

    pub const fn brightness(&self) -> u8 {
        self.brightness
    }
}

/// Fades the bright outline within `params.width()` rings of transparency
///
/// Pixels deeper inside the icon, and transparent pixels, are never touched.
pub fn remove_liquid_glass(image: &PixelBuffer, params: &LiquidGlass) -> PixelBuffer {
    let boundary = BoundaryMap::with_depth(image, params.width);
    let threshold = f32::from(params.brightness);

    map_alpha(image, |x, y, pixel| {
        let alpha = pixel[3];
        if !boundary.within(x, y, params.width) {
            return alpha;
        }

        let light = brightness(pixel);
        if light <= threshold {
            return alpha;
        }

        // light > threshold implies threshold < 255, so the span is positive
        let excess = (light - threshold) / (255.0 - threshold);
        let mut faded = f32::from(alpha) * (1.0 - excess);
        if alpha < TRANSLUCENT_ALPHA {
            faded *= TRANSLUCENT_KEEP;
        }
        round_alpha(faded)
    })
}
