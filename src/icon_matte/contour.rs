//! Contour re-rendering of the icon silhouette.
//!
//! Boundary pixels are grouped into contours, each contour is smoothed and
//! fitted with a closed spline, and the band around the old boundary is
//! repainted from the spline with three subpixel coverage samples per pixel.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use image::Rgba;
use itertools::iproduct;

use crate::error::FilterError;
use crate::icon_matte::alpha_channel::PixelBuffer;
use crate::icon_matte::geometry::{
    catmull_rom_closed, smooth_closed, sort_by_angle, Point, PointGrid, Polygon,
};
use crate::icon_matte::quality::AlphaFilter;
use crate::utils::{offset, validate_range_f32, validate_range_u32, NEIGHBORS_8};

/// A neighbor at or above this alpha makes a pixel touch the solid side
const SOLID_ALPHA: u8 = 200;
/// A neighbor below this alpha makes a pixel touch the clear side
const CLEAR_ALPHA: u8 = 50;
/// Boundary pixels this close (Manhattan) belong to the same contour
const LINK_DISTANCE: u32 = 2;
const MIN_CONTOUR_POINTS: usize = 3;
/// Half-window of the moving average applied before fitting
const SMOOTH_WINDOW: usize = 2;
const SPLINE_STEPS: usize = 8;
/// Subpixel sample offsets, one coverage pass each
const SAMPLE_OFFSETS: [(f32, f32); 3] = [(0.5, 0.5), (0.17, 0.83), (0.83, 0.17)];
const COVERAGE_PER_SAMPLE: u8 = 85;

/// Spline-based contour smoothing
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContourSmooth {
    radius: u32,
    strength: f32,
}

impl ContourSmooth {
    /// Create a new contour smoother
    ///
    /// # Arguments
    ///
    /// * `radius` - Pixels within this distance of the old contour are repainted, 1..=8
    /// * `strength` - Blend between raw and averaged contour points, 0.0..=1.0
    ///
    /// # Errors
    ///
    /// * `FilterError::InvalidParameter` - When either argument is out of range
    pub fn new(radius: u32, strength: f32) -> Result<Self, FilterError> {
        validate_range_u32("radius", radius, 1, 8, "contour radius must be 1..=8")?;
        validate_range_f32("strength", strength, 0.0, 1.0, "strength must be 0.0..=1.0")?;
        Ok(Self { radius, strength })
    }

    pub const fn radius(&self) -> u32 {
        self.radius
    }

    pub const fn strength(&self) -> f32 {
        self.strength
    }

    /// Fits a smoothed closed spline around one group of boundary pixels
    fn fit(&self, group: &[(u32, u32)]) -> Polygon {
        let mut points: Vec<Point> = group
            .iter()
            .map(|&(x, y)| Point::pixel_center(x, y))
            .collect();
        sort_by_angle(&mut points);
        let smoothed = smooth_closed(&points, SMOOTH_WINDOW, self.strength);
        Polygon::new(catmull_rom_closed(&smoothed, SPLINE_STEPS))
    }
}

impl AlphaFilter for ContourSmooth {
    fn apply(&self, image: &PixelBuffer) -> PixelBuffer {
        let (width, height) = image.dimensions();
        let grid = PointGrid::new(boundary_pixels(image), LINK_DISTANCE);
        let contours: Vec<Vec<(u32, u32)>> = grid
            .clusters(LINK_DISTANCE)
            .into_iter()
            .filter(|group| group.len() >= MIN_CONTOUR_POINTS)
            .collect();
        if contours.is_empty() {
            return image.clone();
        }

        let repaint = repaint_zone(&contours, self.radius, width, height);
        let mut coverage = vec![0u8; repaint.len()];
        for contour in &contours {
            let polygon = self.fit(contour);
            rasterize_max(&polygon, &repaint, &mut coverage, width, height);
        }

        let mut output = image.clone();
        for (x, y, pixel) in output.enumerate_pixels_mut() {
            let index = (y * width + x) as usize;
            if !repaint[index] {
                continue;
            }
            let alpha = coverage[index];
            if pixel[3] == 0 && alpha > 0 {
                if let Some(color) = nearest_solid_color(image, x, y, self.radius + 2) {
                    *pixel = color;
                }
            }
            pixel[3] = alpha;
        }
        output
    }
}

/// Pixels with both a solid and a clear 8-neighbor; out-of-bounds is clear
fn boundary_pixels(image: &PixelBuffer) -> Vec<(u32, u32)> {
    let (width, height) = image.dimensions();
    iproduct!(0..height, 0..width)
        .map(|(y, x)| (x, y))
        .filter(|&(x, y)| {
            let (mut solid, mut clear) = (false, false);
            for &(dx, dy) in &NEIGHBORS_8 {
                let alpha = offset(x, y, dx, dy, width, height)
                    .map_or(0, |(nx, ny)| image.get_pixel(nx, ny)[3]);
                solid |= alpha >= SOLID_ALPHA;
                clear |= alpha < CLEAR_ALPHA;
            }
            solid && clear
        })
        .collect()
}

/// Marks every pixel whose center is within `radius` of a contour pixel
fn repaint_zone(contours: &[Vec<(u32, u32)>], radius: u32, width: u32, height: u32) -> Vec<bool> {
    let mut zone = vec![false; width as usize * height as usize];
    let reach = radius as i64;
    let limit = reach * reach;

    for &(x, y) in contours.iter().flatten() {
        for (dy, dx) in iproduct!(-reach..=reach, -reach..=reach) {
            if dx * dx + dy * dy > limit {
                continue;
            }
            if let Some((nx, ny)) = offset(x, y, dx, dy, width, height) {
                zone[(ny * width + nx) as usize] = true;
            }
        }
    }
    zone
}

/// Accumulates subpixel coverage of `polygon` into `coverage`, keeping the
/// per-pixel maximum across polygons
fn rasterize_max(polygon: &Polygon, zone: &[bool], coverage: &mut [u8], width: u32, height: u32) {
    let Some((min_x, min_y, max_x, max_y)) = polygon.pixel_bounds(width, height) else {
        return;
    };

    for y in min_y..=max_y {
        let rows: Vec<(f32, Vec<f32>)> = SAMPLE_OFFSETS
            .iter()
            .map(|&(ox, oy)| (ox, polygon.crossings(y as f32 + oy)))
            .collect();

        for x in min_x..=max_x {
            let index = (y * width + x) as usize;
            if !zone[index] {
                continue;
            }
            let alpha = rows
                .iter()
                .filter(|(ox, crossings)| Polygon::contains_on_row(crossings, x as f32 + ox))
                .fold(0u8, |acc, _| acc.saturating_add(COVERAGE_PER_SAMPLE));
            coverage[index] = coverage[index].max(alpha);
        }
    }
}

/// Color of the closest solid pixel within `reach`, if any
fn nearest_solid_color(image: &PixelBuffer, x: u32, y: u32, reach: u32) -> Option<Rgba<u8>> {
    let (width, height) = image.dimensions();
    let reach = reach as i64;

    iproduct!(-reach..=reach, -reach..=reach)
        .filter_map(|(dy, dx)| {
            offset(x, y, dx, dy, width, height).map(|(nx, ny)| (dx * dx + dy * dy, nx, ny))
        })
        .filter(|&(_, nx, ny)| image.get_pixel(nx, ny)[3] >= SOLID_ALPHA)
        .min_by_key(|&(distance, _, _)| distance)
        .map(|(_, nx, ny)| {
            let Rgba([red, green, blue, _]) = *image.get_pixel(nx, ny);
            Rgba([red, green, blue, 0])
        })
}
