//! Edge refinement toolkit.
//!
//! Independent alpha filters for cleaning up a freshly matted icon. Each one
//! reads its input buffer and returns a new buffer, so filters compose in any
//! order; the pipeline applies them as smoothing, light-edge removal, erosion,
//! aggressive cleanup and finally liquid-glass removal.
//!
//! None of these filters ever raises a fully transparent pixel.

use image::Rgba;

use crate::error::FilterError;
use crate::icon_matte::alpha_channel::{map_alpha, PixelBuffer};
use crate::icon_matte::boundary::BoundaryMap;
use crate::icon_matte::liquid_glass::{remove_liquid_glass, LiquidGlass};
use crate::utils::{brightness, offset, round_alpha, NEIGHBORS_8};

/// Upper bound on erosion passes
pub const MAX_ERODE_PIXELS: u8 = 3;

/// Light-edge removal only considers pixels below this alpha
const LIGHT_EDGE_MAX_ALPHA: u8 = 200;
/// Light-edge removal only considers pixels brighter than this
const LIGHT_EDGE_MIN_BRIGHTNESS: f32 = 180.0;
/// Brightness above this is subtracted from a light edge's alpha
const LIGHT_EDGE_PIVOT: f32 = 128.0;

const CLEANUP_MAX_ALPHA: u8 = 128;
const CLEANUP_MIN_BRIGHTNESS: f32 = 150.0;
const CLEANUP_SOLID_ALPHA: u8 = 200;
const CLEANUP_MIN_SOLID_NEIGHBORS: usize = 3;

/// Trait for chaining edge refinement filters on RGBA buffers
///
/// Every method consumes the original image and returns the refined one.
pub trait EdgeRefineExt {
    /// See [`smooth_edges`]
    fn smooth_edges(self) -> Self;

    /// See [`remove_light_edges`]
    fn remove_light_edges(self) -> Self;

    /// See [`erode_edges`]
    ///
    /// # Errors
    ///
    /// * `FilterError::InvalidParameter` - When `passes` exceeds 3
    fn erode_edges(self, passes: u8) -> Result<Self, FilterError>
    where
        Self: Sized;

    /// See [`cleanup_edges`]
    fn cleanup_edges(self) -> Self;

    /// See [`remove_liquid_glass`]
    fn remove_liquid_glass(self, params: &LiquidGlass) -> Self;
}

impl EdgeRefineExt for PixelBuffer {
    fn smooth_edges(self) -> Self {
        smooth_edges(&self)
    }

    fn remove_light_edges(self) -> Self {
        remove_light_edges(&self)
    }

    fn erode_edges(self, passes: u8) -> Result<Self, FilterError> {
        erode_edges(&self, passes)
    }

    fn cleanup_edges(self) -> Self {
        cleanup_edges(&self)
    }

    fn remove_liquid_glass(self, params: &LiquidGlass) -> Self {
        remove_liquid_glass(&self, params)
    }
}

/// Replaces the alpha of every semi-transparent pixel with the 3×3 mean
///
/// Only in-bounds neighbors take part in the mean. Fully transparent and
/// fully opaque pixels keep their alpha.
pub fn smooth_edges(image: &PixelBuffer) -> PixelBuffer {
    let (width, height) = image.dimensions();

    map_alpha(image, |x, y, pixel| {
        let alpha = pixel[3];
        if !is_semi_transparent(pixel) {
            return alpha;
        }

        let (sum, count) = NEIGHBORS_8
            .iter()
            .filter_map(|&(dx, dy)| offset(x, y, dx, dy, width, height))
            .fold((u32::from(alpha), 1u32), |(sum, count), (nx, ny)| {
                (sum + u32::from(image.get_pixel(nx, ny)[3]), count + 1)
            });

        round_alpha(sum as f32 / count as f32)
    })
}

/// Fades bright, translucent pixels on the outer edge
///
/// Outer-edge pixels with alpha below 200 whose brightness exceeds 180 lose
/// `brightness - 128` alpha. These are the pale fringes left where a light
/// backdrop bled into anti-aliased icon edges.
pub fn remove_light_edges(image: &PixelBuffer) -> PixelBuffer {
    let boundary = BoundaryMap::new(image);

    map_alpha(image, |x, y, pixel| {
        let alpha = pixel[3];
        if alpha == 0 || alpha >= LIGHT_EDGE_MAX_ALPHA || !boundary.is_outer_edge(x, y) {
            return alpha;
        }

        let light = brightness(pixel);
        if light > LIGHT_EDGE_MIN_BRIGHTNESS {
            round_alpha(f32::from(alpha) - (light - LIGHT_EDGE_PIVOT))
        } else {
            alpha
        }
    })
}

/// Shrinks the visible region by `passes` rings
///
/// Each pass zeroes every visible pixel that has a fully transparent
/// 8-neighbor, so a pass removes exactly one ring. Zero passes return an
/// unchanged copy.
///
/// # Errors
///
/// * `FilterError::InvalidParameter` - When `passes` exceeds 3
pub fn erode_edges(image: &PixelBuffer, passes: u8) -> Result<PixelBuffer, FilterError> {
    if passes > MAX_ERODE_PIXELS {
        return Err(FilterError::InvalidParameter {
            name: "passes",
            value: f32::from(passes),
            reason: "erosion accepts 0..=3 passes",
        });
    }

    let mut current = image.clone();
    for _ in 0..passes {
        let boundary = BoundaryMap::new(&current);
        current = map_alpha(&current, |x, y, pixel| {
            if boundary.is_outer_edge(x, y) {
                0
            } else {
                pixel[3]
            }
        });
    }
    Ok(current)
}

/// Removes isolated light speckles
///
/// A pixel with alpha below 128 and brightness above 150 that has fewer than
/// three solid (alpha above 200) 8-neighbors becomes transparent.
pub fn cleanup_edges(image: &PixelBuffer) -> PixelBuffer {
    let (width, height) = image.dimensions();

    map_alpha(image, |x, y, pixel| {
        let alpha = pixel[3];
        if alpha == 0 || alpha >= CLEANUP_MAX_ALPHA || brightness(pixel) <= CLEANUP_MIN_BRIGHTNESS
        {
            return alpha;
        }

        let solid_neighbors = NEIGHBORS_8
            .iter()
            .filter_map(|&(dx, dy)| offset(x, y, dx, dy, width, height))
            .filter(|&(nx, ny)| image.get_pixel(nx, ny)[3] > CLEANUP_SOLID_ALPHA)
            .count();

        if solid_neighbors < CLEANUP_MIN_SOLID_NEIGHBORS {
            0
        } else {
            alpha
        }
    })
}

/// Whether the pixel is visible but not fully opaque
#[inline]
pub(crate) const fn is_semi_transparent(pixel: &Rgba<u8>) -> bool {
    pixel.0[3] > 0 && pixel.0[3] < 255
}
