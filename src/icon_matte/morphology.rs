//! Grayscale morphology on the alpha channel.
//!
//! Dilation takes the maximum alpha over a `(2r+1)²` window and erosion the
//! minimum; running dilation then erosion closes pinholes and notches along
//! the icon boundary. Square windows are separable, so each operation runs as
//! a horizontal pass followed by a vertical pass. Only in-bounds pixels take
//! part in a window.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::icon_matte::alpha_channel::{AlphaChannelExt, AlphaMask, PixelBuffer};
use crate::icon_matte::quality::AlphaFilter;
use crate::utils::validate_range_u32;

/// Dilate-then-erode alpha close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Morphology {
    dilate_radius: u32,
    erode_radius: u32,
}

impl Morphology {
    /// Create a new morphological close
    ///
    /// A radius of 0 skips that half of the operation.
    ///
    /// # Errors
    ///
    /// * `FilterError::InvalidParameter` - When a radius exceeds 16
    pub fn new(dilate_radius: u32, erode_radius: u32) -> Result<Self, FilterError> {
        validate_range_u32("dilate_radius", dilate_radius, 0, 16, "radius must be 0..=16")?;
        validate_range_u32("erode_radius", erode_radius, 0, 16, "radius must be 0..=16")?;
        Ok(Self {
            dilate_radius,
            erode_radius,
        })
    }

    pub const fn dilate_radius(&self) -> u32 {
        self.dilate_radius
    }

    pub const fn erode_radius(&self) -> u32 {
        self.erode_radius
    }
}

impl AlphaFilter for Morphology {
    fn apply(&self, image: &PixelBuffer) -> PixelBuffer {
        let mask = image.alpha_mask();
        let dilated = dilate_alpha(&mask, self.dilate_radius);
        let closed = erode_alpha(&dilated, self.erode_radius);

        let mut output = image.clone();
        for (pixel, alpha) in output.pixels_mut().zip(closed.pixels()) {
            pixel[3] = alpha[0];
        }
        output
    }
}

/// Maximum alpha over a `(2r+1)²` window
pub fn dilate_alpha(mask: &AlphaMask, radius: u32) -> AlphaMask {
    window_filter(mask, radius, u8::max)
}

/// Minimum alpha over a `(2r+1)²` window
pub fn erode_alpha(mask: &AlphaMask, radius: u32) -> AlphaMask {
    window_filter(mask, radius, u8::min)
}

fn window_filter(mask: &AlphaMask, radius: u32, pick: fn(u8, u8) -> u8) -> AlphaMask {
    let (width, height) = mask.dimensions();
    if radius == 0 || width == 0 || height == 0 {
        return mask.clone();
    }

    let horizontal = AlphaMask::from_fn(width, height, |x, y| {
        let start = x.saturating_sub(radius);
        let end = (x + radius).min(width - 1);
        (start..=end)
            .map(|sx| mask.get_pixel(sx, y)[0])
            .reduce(pick)
            .map_or(image::Luma([0]), |v| image::Luma([v]))
    });

    AlphaMask::from_fn(width, height, |x, y| {
        let start = y.saturating_sub(radius);
        let end = (y + radius).min(height - 1);
        (start..=end)
            .map(|sy| horizontal.get_pixel(x, sy)[0])
            .reduce(pick)
            .map_or(image::Luma([0]), |v| image::Luma([v]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::opaque_square;
    use image::{Luma, Rgba};

    #[test]
    fn test_dilate_grows_square_by_radius() {
        let mask = opaque_square(9, 3, 3).alpha_mask();
        let dilated = dilate_alpha(&mask, 1);

        assert_eq!(dilated.get_pixel(2, 2), &Luma([255]));
        assert_eq!(dilated.get_pixel(1, 1), &Luma([0]));
        assert_eq!(dilated.pixels().filter(|p| p[0] == 255).count(), 25);
    }

    #[test]
    fn test_erode_shrinks_square_by_radius() {
        let mask = opaque_square(9, 2, 5).alpha_mask();
        let eroded = erode_alpha(&mask, 1);
        assert_eq!(eroded.pixels().filter(|p| p[0] == 255).count(), 9);
    }

    #[test]
    fn test_close_fills_pinhole() {
        let mut image = opaque_square(11, 2, 7);
        image.put_pixel(5, 5, Rgba([20, 40, 220, 0]));

        let closed = Morphology::new(1, 1).unwrap().apply(&image);
        assert_eq!(closed.get_pixel(5, 5)[3], 255);
        // The square itself keeps its extent
        assert_eq!(closed.get_pixel(2, 2)[3], 255);
        assert_eq!(closed.get_pixel(1, 1)[3], 0);
    }

    #[test]
    fn test_zero_radii_is_noop() {
        let image = opaque_square(6, 1, 3);
        assert_eq!(Morphology::new(0, 0).unwrap().apply(&image), image);
    }

    #[test]
    fn test_new_validates_radii() {
        assert!(Morphology::new(17, 0).is_err());
        assert!(Morphology::new(0, 17).is_err());
    }
}
