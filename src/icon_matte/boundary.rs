//! Shared boundary classification for alpha edge filters.
//!
//! Every edge filter asks the same question: is this pixel visible and does it
//! touch a fully transparent 8-neighbor? [`BoundaryMap`] answers it once per
//! pass and additionally records how many rings inward from the transparent
//! region a pixel sits, which the liquid-glass filter uses as its process zone.
//!
//! Positions outside the raster count as fully transparent, so an icon that
//! fills its canvas still has an outer edge along the image border.

use std::collections::VecDeque;

use itertools::iproduct;

use crate::icon_matte::alpha_channel::PixelBuffer;
use crate::utils::{offset, NEIGHBORS_8};

const TRANSPARENT: u8 = 0;
const UNREACHED: u8 = u8::MAX;

/// Classification of a single pixel relative to the transparent region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelClass {
    /// Alpha is exactly 0
    Transparent,
    /// Visible pixel with at least one fully transparent 8-neighbor
    OuterEdge,
    /// Visible pixel surrounded by visible pixels
    Interior,
}

/// Per-pixel ring index measured inward from transparency
///
/// Ring 1 is the outer edge, ring 2 the visible pixels 8-adjacent to ring 1,
/// and so on up to the depth requested at construction. Deeper pixels are
/// reported as interior without a ring.
#[derive(Debug, Clone)]
pub struct BoundaryMap {
    width: u32,
    height: u32,
    rings: Vec<u8>,
}

impl BoundaryMap {
    /// Classifies outer-edge pixels only
    pub fn new(image: &PixelBuffer) -> Self {
        Self::with_depth(image, 1)
    }

    /// Classifies pixels and labels rings up to `depth` (clamped to 1..=254)
    pub fn with_depth(image: &PixelBuffer, depth: u8) -> Self {
        let (width, height) = image.dimensions();
        let depth = depth.clamp(1, UNREACHED - 1);
        let mut rings = vec![UNREACHED; width as usize * height as usize];
        let mut frontier = VecDeque::new();

        for (y, x) in iproduct!(0..height, 0..width) {
            let index = (y * width + x) as usize;
            if image.get_pixel(x, y)[3] == 0 {
                rings[index] = TRANSPARENT;
                continue;
            }
            let touches_transparent = NEIGHBORS_8.iter().any(|&(dx, dy)| {
                offset(x, y, dx, dy, width, height)
                    .map_or(true, |(nx, ny)| image.get_pixel(nx, ny)[3] == 0)
            });
            if touches_transparent {
                rings[index] = 1;
                frontier.push_back((x, y));
            }
        }

        while let Some((x, y)) = frontier.pop_front() {
            let ring = rings[(y * width + x) as usize];
            if ring >= depth {
                continue;
            }
            for &(dx, dy) in &NEIGHBORS_8 {
                if let Some((nx, ny)) = offset(x, y, dx, dy, width, height) {
                    let neighbor = (ny * width + nx) as usize;
                    if rings[neighbor] == UNREACHED {
                        rings[neighbor] = ring + 1;
                        frontier.push_back((nx, ny));
                    }
                }
            }
        }

        Self {
            width,
            height,
            rings,
        }
    }

    /// Out-of-raster positions read as transparent
    #[inline]
    fn ring_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return TRANSPARENT;
        }
        self.rings[(y * self.width + x) as usize]
    }

    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn class(&self, x: u32, y: u32) -> PixelClass {
        match self.ring_at(x, y) {
            TRANSPARENT => PixelClass::Transparent,
            1 => PixelClass::OuterEdge,
            _ => PixelClass::Interior,
        }
    }

    #[inline]
    pub fn is_outer_edge(&self, x: u32, y: u32) -> bool {
        self.ring_at(x, y) == 1
    }

    /// Ring index of a visible pixel, if it lies within the labelled depth
    pub fn ring(&self, x: u32, y: u32) -> Option<u8> {
        match self.ring_at(x, y) {
            TRANSPARENT | UNREACHED => None,
            ring => Some(ring),
        }
    }

    /// Whether the pixel is visible and at most `depth` rings from transparency
    pub fn within(&self, x: u32, y: u32, depth: u8) -> bool {
        self.ring(x, y).is_some_and(|ring| ring <= depth)
    }

    /// Coordinates of every outer-edge pixel in row-major order
    pub fn outer_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        iproduct!(0..self.height, 0..self.width)
            .map(|(y, x)| (x, y))
            .filter(|&(x, y)| self.is_outer_edge(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::opaque_square;

    #[test]
    fn test_outer_edge_of_centered_square() {
        // 3x3 opaque square at (2,2) inside a 7x7 transparent canvas
        let image = opaque_square(7, 2, 3);
        let map = BoundaryMap::new(&image);

        assert_eq!(map.class(0, 0), PixelClass::Transparent);
        assert_eq!(map.class(2, 2), PixelClass::OuterEdge);
        assert_eq!(map.class(3, 3), PixelClass::Interior);
        assert_eq!(map.outer_edges().count(), 8);
    }

    #[test]
    fn test_image_border_counts_as_transparent() {
        let image = opaque_square(3, 0, 3);
        let map = BoundaryMap::new(&image);

        assert!(map.is_outer_edge(0, 0));
        assert!(map.is_outer_edge(2, 1));
        assert_eq!(map.class(1, 1), PixelClass::Interior);
    }

    #[test]
    fn test_rings_follow_chebyshev_distance() {
        let image = opaque_square(9, 0, 9);
        let map = BoundaryMap::with_depth(&image, 3);

        assert_eq!(map.ring(0, 4), Some(1));
        assert_eq!(map.ring(1, 4), Some(2));
        assert_eq!(map.ring(2, 2), Some(3));
        assert_eq!(map.ring(4, 4), None);
        assert!(map.within(2, 5, 3));
        assert!(!map.within(2, 5, 2));
    }

    #[test]
    fn test_positions_outside_raster_are_transparent() {
        // Row 1 starts with an outer-edge pixel; x == width must not wrap onto it
        let image = opaque_square(4, 0, 4);
        let map = BoundaryMap::with_depth(&image, 2);

        assert!(map.is_outer_edge(0, 1));
        assert_eq!(map.class(4, 0), PixelClass::Transparent);
        assert!(!map.is_outer_edge(4, 0));
        assert_eq!(map.ring(0, 4), None);
        assert!(!map.within(7, 7, 2));
    }

    #[test]
    fn test_empty_image() {
        let map = BoundaryMap::new(&PixelBuffer::new(0, 0));
        assert_eq!(map.dimensions(), (0, 0));
        assert_eq!(map.outer_edges().count(), 0);
    }
}
