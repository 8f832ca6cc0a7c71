//! Test utilities for icon-matte
//!
//! This module provides common fixtures for testing matting and alpha filters.
//! It is only compiled when running tests.

#[cfg(test)]
use image::Rgba;

#[cfg(test)]
use crate::icon_matte::alpha_channel::PixelBuffer;

/// Fill color used by the square fixtures.
#[cfg(test)]
pub const ICON_BLUE: Rgba<u8> = Rgba([20, 40, 220, 255]);

/// Creates a buffer filled with a single pixel value.
#[cfg(test)]
pub fn solid(width: u32, height: u32, pixel: Rgba<u8>) -> PixelBuffer {
    PixelBuffer::from_pixel(width, height, pixel)
}

/// Creates a `canvas`×`canvas` transparent image holding an opaque blue
/// square of side `side` whose top-left corner is at (`start`, `start`).
#[cfg(test)]
pub fn opaque_square(canvas: u32, start: u32, side: u32) -> PixelBuffer {
    PixelBuffer::from_fn(canvas, canvas, |x, y| {
        let inside = (start..start + side).contains(&x) && (start..start + side).contains(&y);
        if inside {
            ICON_BLUE
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Creates a horizontal alpha step: columns left of `edge` are transparent,
/// the rest opaque blue.
#[cfg(test)]
pub fn alpha_step(width: u32, height: u32, edge: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, _| {
        if x < edge {
            Rgba([0, 0, 0, 0])
        } else {
            ICON_BLUE
        }
    })
}

/// Creates an opaque blue icon with a one pixel wide ring of translucent
/// near-white pixels, surrounded by a one pixel transparent margin.
#[cfg(test)]
pub fn haloed_icon(size: u32) -> PixelBuffer {
    PixelBuffer::from_fn(size, size, |x, y| {
        let ring = x.min(y).min(size - 1 - x).min(size - 1 - y);
        match ring {
            0 => Rgba([0, 0, 0, 0]),
            1 => Rgba([250, 250, 250, 100]),
            _ => ICON_BLUE,
        }
    })
}

/// Counts pixels whose alpha is exactly 0.
#[cfg(test)]
pub fn count_transparent(image: &PixelBuffer) -> usize {
    image.pixels().filter(|p| p[3] == 0).count()
}

/// Counts pixels whose alpha is exactly 255.
#[cfg(test)]
pub fn count_opaque(image: &PixelBuffer) -> usize {
    image.pixels().filter(|p| p[3] == 255).count()
}

/// Compares two buffers' alpha channels with a tolerance.
///
/// # Returns
/// `true` if dimensions match and every alpha differs by at most `tolerance`
#[cfg(test)]
pub fn alphas_approx_equal(expected: &PixelBuffer, actual: &PixelBuffer, tolerance: u8) -> bool {
    expected.dimensions() == actual.dimensions()
        && expected
            .pixels()
            .zip(actual.pixels())
            .all(|(e, a)| e[3].abs_diff(a[3]) <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_square_with_valid_input_creates_image() {
        let image = opaque_square(5, 1, 3);
        assert_eq!(image.dimensions(), (5, 5));
        assert_eq!(image.get_pixel(0, 0)[3], 0);
        assert_eq!(image.get_pixel(1, 1), &ICON_BLUE);
        assert_eq!(image.get_pixel(3, 3), &ICON_BLUE);
        assert_eq!(image.get_pixel(4, 4)[3], 0);
        assert_eq!(count_opaque(&image), 9);
        assert_eq!(count_transparent(&image), 16);
    }

    #[test]
    fn haloed_icon_with_valid_input_creates_rings() {
        let image = haloed_icon(6);
        assert_eq!(image.get_pixel(0, 3)[3], 0);
        assert_eq!(image.get_pixel(1, 3), &Rgba([250, 250, 250, 100]));
        assert_eq!(image.get_pixel(2, 3), &ICON_BLUE);
    }

    #[test]
    fn alphas_approx_equal_with_tolerant_comparison_returns_true() {
        let image1 = solid(2, 2, Rgba([0, 0, 0, 100]));
        let mut image2 = image1.clone();
        image2.put_pixel(0, 0, Rgba([0, 0, 0, 101]));

        assert!(alphas_approx_equal(&image1, &image2, 1));
        assert!(!alphas_approx_equal(&image1, &image2, 0));
    }
}
