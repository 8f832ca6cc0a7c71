//! Planar geometry shared by the contour-based alpha filters.
//!
//! Points live in continuous pixel space where pixel `(x, y)` covers the unit
//! square starting at `(x, y)` and its center is `(x + 0.5, y + 0.5)`.

use std::collections::{HashMap, VecDeque};
use std::ops::{Add, Mul, Sub};

use itertools::{iproduct, Itertools};

/// A point in continuous pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Center of the pixel at integer coordinates
    pub fn pixel_center(x: u32, y: u32) -> Self {
        Self::new(x as f32 + 0.5, y as f32 + 0.5)
    }

    pub fn distance_squared(self, other: Self) -> f32 {
        let d = self - other;
        d.x * d.x + d.y * d.y
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Grid-bucket index over integer pixel coordinates
///
/// Neighbor queries only visit the buckets a query radius can reach, so
/// grouping `n` boundary pixels costs roughly `O(n)` instead of `O(n²)`.
#[derive(Debug, Clone)]
pub struct PointGrid {
    cell: u32,
    points: Vec<(u32, u32)>,
    buckets: HashMap<(u32, u32), Vec<usize>>,
}

impl PointGrid {
    /// Indexes `points` into square buckets of side `cell` (at least 1)
    pub fn new(points: Vec<(u32, u32)>, cell: u32) -> Self {
        let cell = cell.max(1);
        let mut buckets: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        for (index, &(x, y)) in points.iter().enumerate() {
            buckets.entry((x / cell, y / cell)).or_default().push(index);
        }
        Self {
            cell,
            points,
            buckets,
        }
    }

    pub fn points(&self) -> &[(u32, u32)] {
        &self.points
    }

    /// Indices of points within Manhattan `distance` of `points[index]`,
    /// excluding the point itself
    pub fn neighbors(&self, index: usize, distance: u32) -> Vec<usize> {
        let (x, y) = self.points[index];
        let reach = distance.div_ceil(self.cell);
        let (cx, cy) = (x / self.cell, y / self.cell);

        iproduct!(
            cx.saturating_sub(reach)..=cx + reach,
            cy.saturating_sub(reach)..=cy + reach
        )
        .filter_map(|key| self.buckets.get(&key))
        .flatten()
        .copied()
        .filter(|&other| {
            let (ox, oy) = self.points[other];
            other != index && x.abs_diff(ox) + y.abs_diff(oy) <= distance
        })
        .collect()
    }

    /// Connected groups of points, linking any two within Manhattan `distance`
    ///
    /// Groups are listed in order of their first member.
    pub fn clusters(&self, distance: u32) -> Vec<Vec<(u32, u32)>> {
        let mut visited = vec![false; self.points.len()];
        let mut groups = Vec::new();

        for start in 0..self.points.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let mut queue = VecDeque::from([start]);
            let mut group = Vec::new();

            while let Some(current) = queue.pop_front() {
                group.push(self.points[current]);
                for next in self.neighbors(current, distance) {
                    if !visited[next] {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }
            groups.push(group);
        }
        groups
    }
}

/// Arithmetic mean of the points, `None` for an empty slice
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Point::default(), |acc, &p| acc + p);
    Some(sum * (1.0 / points.len() as f32))
}

/// Orders points by polar angle around their centroid
pub fn sort_by_angle(points: &mut [Point]) {
    let Some(center) = centroid(points) else {
        return;
    };
    points.sort_by(|a, b| {
        let angle_a = (a.y - center.y).atan2(a.x - center.x);
        let angle_b = (b.y - center.y).atan2(b.x - center.x);
        angle_a.total_cmp(&angle_b)
    });
}

/// Cyclic moving average over `2 * radius + 1` points, blended by `strength`
///
/// A strength of 0 returns the input, 1 returns the plain average.
pub fn smooth_closed(points: &[Point], radius: usize, strength: f32) -> Vec<Point> {
    let n = points.len();
    if n == 0 || radius == 0 {
        return points.to_vec();
    }

    let window = (2 * radius + 1) as f32;
    let back = radius % n;
    (0..n)
        .map(|i| {
            let sum = (0..=2 * radius)
                .map(|k| points[(i + n - back + k) % n])
                .fold(Point::default(), |acc, p| acc + p);
            let average = sum * (1.0 / window);
            points[i] + (average - points[i]) * strength
        })
        .collect()
}

fn cubic_bezier(p0: Point, c1: Point, c2: Point, p1: Point, t: f32) -> Point {
    let u = 1.0 - t;
    p0 * (u * u * u) + c1 * (3.0 * u * u * t) + c2 * (3.0 * u * t * t) + p1 * (t * t * t)
}

fn quadratic_bezier(p0: Point, control: Point, p1: Point, t: f32) -> Point {
    let u = 1.0 - t;
    p0 * (u * u) + control * (2.0 * u * t) + p1 * (t * t)
}

/// Flattens a closed Catmull-Rom spline through `points`
///
/// Each segment is converted to a cubic Bezier with control points
/// `P1 + (P2 - P0) / 6` and `P2 - (P3 - P1) / 6` and sampled `steps` times.
pub fn catmull_rom_closed(points: &[Point], steps: usize) -> Vec<Point> {
    let n = points.len();
    if n < 3 || steps == 0 {
        return points.to_vec();
    }

    let mut path = Vec::with_capacity(n * steps);
    for i in 0..n {
        let p0 = points[(i + n - 1) % n];
        let p1 = points[i];
        let p2 = points[(i + 1) % n];
        let p3 = points[(i + 2) % n];
        let c1 = p1 + (p2 - p0) * (1.0 / 6.0);
        let c2 = p2 - (p3 - p1) * (1.0 / 6.0);
        for s in 0..steps {
            path.push(cubic_bezier(p1, c1, c2, p2, s as f32 / steps as f32));
        }
    }
    path
}

/// Flattens a closed path of quadratic curves through edge midpoints
///
/// Every input point acts as the control point of a curve running from the
/// midpoint of its incoming edge to the midpoint of its outgoing edge.
pub fn quadratic_midpoints_closed(points: &[Point], steps: usize) -> Vec<Point> {
    let n = points.len();
    if n < 3 || steps == 0 {
        return points.to_vec();
    }

    let midpoint = |i: usize| (points[i % n] + points[(i + 1) % n]) * 0.5;
    let mut path = Vec::with_capacity(n * steps);
    for i in 0..n {
        let start = midpoint(i + n - 1);
        let end = midpoint(i);
        for s in 0..steps {
            path.push(quadratic_bezier(start, points[i], end, s as f32 / steps as f32));
        }
    }
    path
}

/// Closed polygon filled with the even-odd rule
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Sorted x coordinates where the horizontal line at `y` crosses an edge
    pub fn crossings(&self, y: f32) -> Vec<f32> {
        let n = self.vertices.len();
        if n < 3 {
            return Vec::new();
        }

        (0..n)
            .filter_map(|i| {
                let a = self.vertices[i];
                let b = self.vertices[(i + 1) % n];
                // Half-open test so a vertex on the line counts once
                if (a.y <= y) != (b.y <= y) {
                    Some(a.x + (y - a.y) / (b.y - a.y) * (b.x - a.x))
                } else {
                    None
                }
            })
            .sorted_by(f32::total_cmp)
            .collect()
    }

    /// Whether `(x, y)` lies inside, given the crossings of its row
    pub fn contains_on_row(crossings: &[f32], x: f32) -> bool {
        crossings.iter().filter(|&&cx| cx < x).count() % 2 == 1
    }

    pub fn contains(&self, point: Point) -> bool {
        Self::contains_on_row(&self.crossings(point.y), point.x)
    }

    /// Integer pixel bounds `(min_x, min_y, max_x, max_y)` clamped to the raster
    pub fn pixel_bounds(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        if self.vertices.is_empty() || width == 0 || height == 0 {
            return None;
        }
        let (min, max) = self.vertices.iter().fold(
            (
                Point::new(f32::INFINITY, f32::INFINITY),
                Point::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
            ),
            |(min, max), p| {
                (
                    Point::new(min.x.min(p.x), min.y.min(p.y)),
                    Point::new(max.x.max(p.x), max.y.max(p.y)),
                )
            },
        );
        let clamp = |v: f32, limit: u32| (v.floor().max(0.0) as u32).min(limit - 1);
        Some((
            clamp(min.x, width),
            clamp(min.y, height),
            clamp(max.x, width),
            clamp(max.y, height),
        ))
    }
}
