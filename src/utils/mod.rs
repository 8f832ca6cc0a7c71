//! Internal utility functions for icon-matte.
//!
//! This module contains the small numeric and neighborhood helpers shared by
//! the matting engine and every alpha filter.

use image::Rgba;
use imageproc::definitions::Clamp;

use crate::error::FilterError;

/// Offsets of the 8 immediate neighbors, row-major.
pub const NEIGHBORS_8: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Offsets of the 4 edge-adjacent neighbors.
pub const NEIGHBORS_4: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Rounds a floating-point alpha to the nearest integer and clamps it to `[0, 255]`.
///
/// `Clamp<f32>` on its own truncates, so the value is rounded first.
///
/// # Arguments
///
/// * `value` - The alpha value in 0..255 scale
///
/// # Returns
///
/// The stored alpha byte
#[inline]
pub fn round_alpha(value: f32) -> u8 {
    <u8 as Clamp<f32>>::clamp(value.round())
}

/// Unweighted mean of the R, G and B channels.
///
/// No luma weighting is applied.
#[inline]
pub fn brightness(pixel: &Rgba<u8>) -> f32 {
    let Rgba([red, green, blue, _]) = *pixel;
    (f32::from(red) + f32::from(green) + f32::from(blue)) / 3.0
}

/// Returns the in-bounds coordinate `(x + dx, y + dy)`, or `None` when it
/// falls outside a `width`×`height` raster.
#[inline]
pub fn offset(x: u32, y: u32, dx: i64, dy: i64, width: u32, height: u32) -> Option<(u32, u32)> {
    let nx = i64::from(x) + dx;
    let ny = i64::from(y) + dy;
    if nx < 0 || ny < 0 || nx >= i64::from(width) || ny >= i64::from(height) {
        None
    } else {
        Some((nx as u32, ny as u32))
    }
}

/// Validates that an integer parameter lies within an inclusive range.
///
/// # Returns
///
/// `Ok(())` if the value is in range, otherwise `FilterError::InvalidParameter`
pub fn validate_range_u32(
    name: &'static str,
    value: u32,
    min: u32,
    max: u32,
    reason: &'static str,
) -> Result<(), FilterError> {
    if value < min || value > max {
        Err(FilterError::InvalidParameter {
            name,
            value: value as f32,
            reason,
        })
    } else {
        Ok(())
    }
}

/// Validates that a floating-point parameter is finite and within an inclusive range.
pub fn validate_range_f32(
    name: &'static str,
    value: f32,
    min: f32,
    max: f32,
    reason: &'static str,
) -> Result<(), FilterError> {
    if !value.is_finite() || value < min || value > max {
        Err(FilterError::InvalidParameter {
            name,
            value,
            reason,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_alpha() {
        assert_eq!(round_alpha(-10.0), 0);
        assert_eq!(round_alpha(0.0), 0);
        assert_eq!(round_alpha(127.4), 127);
        assert_eq!(round_alpha(127.5), 128);
        assert_eq!(round_alpha(254.6), 255);
        assert_eq!(round_alpha(300.0), 255);
    }

    #[test]
    fn test_brightness_is_unweighted_mean() {
        assert_eq!(brightness(&Rgba([30, 60, 90, 0])), 60.0);
        assert_eq!(brightness(&Rgba([255, 0, 0, 255])), 85.0);
    }

    #[test]
    fn test_offset_bounds() {
        assert_eq!(offset(0, 0, -1, 0, 3, 3), None);
        assert_eq!(offset(2, 2, 1, 0, 3, 3), None);
        assert_eq!(offset(1, 1, 1, -1, 3, 3), Some((2, 0)));
    }

    #[test]
    fn test_validate_ranges() {
        assert!(validate_range_u32("scale", 2, 2, 8, "").is_ok());
        assert!(validate_range_u32("scale", 9, 2, 8, "").is_err());
        assert!(validate_range_f32("smooth", 0.5, 0.0, 1.0, "").is_ok());
        assert!(validate_range_f32("smooth", f32::NAN, 0.0, 1.0, "").is_err());
        assert!(validate_range_f32("smooth", 1.5, 0.0, 1.0, "").is_err());
    }
}
