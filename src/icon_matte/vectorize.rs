//! Posterize-and-trace vectorization.
//!
//! Colors are quantized into a coarse RGB lattice, connected regions of equal
//! buckets are traced, and each region is repainted as a smoothed curved
//! polygon filled with its mean color. The result reads like a flat vector
//! redraw of the icon while staying inside the original silhouette.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use image::Rgba;
use itertools::Itertools;

use crate::error::FilterError;
use crate::icon_matte::alpha_channel::PixelBuffer;
use crate::icon_matte::geometry::{
    quadratic_midpoints_closed, smooth_closed, sort_by_angle, Point, Polygon,
};
use crate::icon_matte::quality::AlphaFilter;
use crate::utils::{offset, validate_range_u32, NEIGHBORS_4};

/// Regions smaller than this keep their original pixels
const MIN_REGION_PIXELS: usize = 8;
const CURVE_STEPS: usize = 4;

/// Quantize, trace and refill color regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vectorize {
    num_colors: u32,
    blur: u32,
}

impl Vectorize {
    /// Create a new vectorizer
    ///
    /// # Arguments
    ///
    /// * `num_colors` - Approximate palette size, 2..=256
    /// * `blur` - Moving-average radius applied to region outlines, 0..=8
    ///
    /// # Errors
    ///
    /// * `FilterError::InvalidParameter` - When either argument is out of range
    pub fn new(num_colors: u32, blur: u32) -> Result<Self, FilterError> {
        validate_range_u32("num_colors", num_colors, 2, 256, "palette size must be 2..=256")?;
        validate_range_u32("blur", blur, 0, 8, "outline blur must be 0..=8")?;
        Ok(Self { num_colors, blur })
    }

    pub const fn num_colors(&self) -> u32 {
        self.num_colors
    }

    pub const fn blur(&self) -> u32 {
        self.blur
    }

    /// Quantization levels per channel
    pub fn levels(&self) -> u32 {
        ((self.num_colors as f32).cbrt().round() as u32).max(2)
    }
}

/// Connected pixels sharing one color bucket
struct Region {
    pixels: Vec<(u32, u32)>,
}

impl Region {
    fn mean_color(&self, image: &PixelBuffer) -> Rgba<u8> {
        let mut sums = [0u64; 4];
        for &(x, y) in &self.pixels {
            let pixel = image.get_pixel(x, y);
            for (sum, &channel) in sums.iter_mut().zip(pixel.0.iter()) {
                *sum += u64::from(channel);
            }
        }
        let count = self.pixels.len().max(1) as u64;
        Rgba(sums.map(|sum| ((sum + count / 2) / count) as u8))
    }

    /// Region pixels with a 4-neighbor outside the region
    fn outline(&self, labels: &[Option<usize>], id: usize, width: u32, height: u32) -> Vec<Point> {
        self.pixels
            .iter()
            .filter(|&&(x, y)| {
                NEIGHBORS_4.iter().any(|&(dx, dy)| {
                    offset(x, y, dx, dy, width, height)
                        .map_or(true, |(nx, ny)| labels[(ny * width + nx) as usize] != Some(id))
                })
            })
            .map(|&(x, y)| Point::pixel_center(x, y))
            .collect()
    }
}

impl AlphaFilter for Vectorize {
    fn apply(&self, image: &PixelBuffer) -> PixelBuffer {
        let (width, height) = image.dimensions();
        let levels = self.levels();
        let (regions, labels) = label_regions(image, levels);

        // Pixels of tiny regions are never repainted
        let mut protected = vec![false; labels.len()];
        for region in regions.iter().filter(|r| r.pixels.len() < MIN_REGION_PIXELS) {
            for &(x, y) in &region.pixels {
                protected[(y * width + x) as usize] = true;
            }
        }

        let mut output = image.clone();
        let order = (0..regions.len())
            .filter(|&id| regions[id].pixels.len() >= MIN_REGION_PIXELS)
            .sorted_by_key(|&id| std::cmp::Reverse(regions[id].pixels.len()));

        for id in order {
            let region = &regions[id];
            let color = region.mean_color(image);

            let mut outline = region.outline(&labels, id, width, height);
            sort_by_angle(&mut outline);
            let smoothed = smooth_closed(&outline, self.blur as usize, 1.0);
            let polygon = Polygon::new(quadratic_midpoints_closed(&smoothed, CURVE_STEPS));

            let Some((min_x, min_y, max_x, max_y)) = polygon.pixel_bounds(width, height) else {
                continue;
            };
            for y in min_y..=max_y {
                let crossings = polygon.crossings(y as f32 + 0.5);
                for x in min_x..=max_x {
                    let index = (y * width + x) as usize;
                    if protected[index] || image.get_pixel(x, y)[3] == 0 {
                        continue;
                    }
                    if Polygon::contains_on_row(&crossings, x as f32 + 0.5) {
                        output.put_pixel(x, y, color);
                    }
                }
            }
        }
        output
    }
}

/// Bucket index of a channel value for the given number of levels
#[inline]
fn bucket(value: u8, levels: u32) -> u32 {
    let step = 256.0 / levels as f32;
    ((f32::from(value) / step) as u32).min(levels - 1)
}

fn bucket_key(pixel: &Rgba<u8>, levels: u32) -> (u32, u32, u32) {
    (
        bucket(pixel[0], levels),
        bucket(pixel[1], levels),
        bucket(pixel[2], levels),
    )
}

/// 4-connected flood fill over visible pixels with equal buckets
///
/// # Returns
///
/// The regions and a per-pixel region index (`None` for transparent pixels)
fn label_regions(image: &PixelBuffer, levels: u32) -> (Vec<Region>, Vec<Option<usize>>) {
    let (width, height) = image.dimensions();
    let mut labels: Vec<Option<usize>> = vec![None; width as usize * height as usize];
    let mut regions = Vec::new();

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] == 0 || labels[(y * width + x) as usize].is_some() {
            continue;
        }

        let id = regions.len();
        let key = bucket_key(pixel, levels);
        let mut pixels = Vec::new();
        let mut stack = vec![(x, y)];
        labels[(y * width + x) as usize] = Some(id);

        while let Some((cx, cy)) = stack.pop() {
            pixels.push((cx, cy));
            for &(dx, dy) in &NEIGHBORS_4 {
                let Some((nx, ny)) = offset(cx, cy, dx, dy, width, height) else {
                    continue;
                };
                let index = (ny * width + nx) as usize;
                let neighbor = image.get_pixel(nx, ny);
                if labels[index].is_none()
                    && neighbor[3] > 0
                    && bucket_key(neighbor, levels) == key
                {
                    labels[index] = Some(id);
                    stack.push((nx, ny));
                }
            }
        }
        regions.push(Region { pixels });
    }
    (regions, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::solid;

    fn two_tone() -> PixelBuffer {
        // Transparent margin, noisy red left half, blue right half
        PixelBuffer::from_fn(18, 18, |x, y| {
            if x == 0 || y == 0 || x == 17 || y == 17 {
                Rgba([0, 0, 0, 0])
            } else if x < 9 {
                if (x + y) % 2 == 0 {
                    Rgba([200, 0, 0, 255])
                } else {
                    Rgba([210, 0, 0, 255])
                }
            } else {
                Rgba([0, 0, 200, 255])
            }
        })
    }

    #[test]
    fn test_new_validates_parameters() {
        assert!(Vectorize::new(1, 0).is_err());
        assert!(Vectorize::new(257, 0).is_err());
        assert!(Vectorize::new(16, 9).is_err());
        assert!(Vectorize::new(256, 8).is_ok());
    }

    #[test]
    fn test_levels_from_palette_size() {
        assert_eq!(Vectorize::new(2, 0).unwrap().levels(), 2);
        assert_eq!(Vectorize::new(8, 0).unwrap().levels(), 2);
        assert_eq!(Vectorize::new(27, 0).unwrap().levels(), 3);
        assert_eq!(Vectorize::new(256, 0).unwrap().levels(), 6);
    }

    #[test]
    fn test_bucket_bounds() {
        assert_eq!(bucket(0, 2), 0);
        assert_eq!(bucket(127, 2), 0);
        assert_eq!(bucket(128, 2), 1);
        assert_eq!(bucket(255, 6), 5);
    }

    #[test]
    fn test_label_regions_splits_by_bucket() {
        let (regions, labels) = label_regions(&two_tone(), 2);
        assert_eq!(regions.len(), 2);
        assert_eq!(labels[0], None);
        assert_eq!(regions[0].pixels.len(), 8 * 16);
        assert_eq!(regions[1].pixels.len(), 8 * 16);
    }

    #[test]
    fn test_region_interior_takes_mean_color() {
        let image = two_tone();
        let result = Vectorize::new(8, 0).unwrap().apply(&image);

        assert_eq!(result.get_pixel(4, 8), &Rgba([205, 0, 0, 255]));
        assert_eq!(result.get_pixel(13, 8), &Rgba([0, 0, 200, 255]));
        assert_eq!(result.get_pixel(0, 0)[3], 0);
        assert_eq!(result.get_pixel(17, 9)[3], 0);
    }

    #[test]
    fn test_small_regions_keep_original_pixels() {
        let mut image = solid(12, 12, Rgba([0, 0, 200, 255]));
        image.put_pixel(5, 5, Rgba([0, 220, 0, 255]));
        image.put_pixel(6, 5, Rgba([0, 220, 0, 255]));

        let result = Vectorize::new(8, 1).unwrap().apply(&image);
        assert_eq!(result.get_pixel(5, 5), &Rgba([0, 220, 0, 255]));
        assert_eq!(result.get_pixel(6, 5), &Rgba([0, 220, 0, 255]));
    }
}
