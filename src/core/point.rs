//! 3D point types and the immutable point cloud.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point (or vector) in 3D space, f32 components.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
    /// Z coordinate
    pub z: f32,
}

impl Point3 {
    /// Origin point.
    pub const ZERO: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new point.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Point with all components set to `v`.
    #[inline]
    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    /// Dot product with another point (as vectors).
    #[inline]
    pub fn dot(&self, other: &Point3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Vector length (magnitude).
    #[inline]
    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min_components(&self, other: &Point3) -> Point3 {
        Point3::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max_components(&self, other: &Point3) -> Point3 {
        Point3::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Largest component value.
    #[inline]
    pub fn max_element(&self) -> f32 {
        self.x.max(self.y).max(self.z)
    }
}

impl Add for Point3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f32> for Point3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Point3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

/// An ordered, immutable collection of 3D points.
///
/// The position of a point in the collection is its identity: inlier sets
/// and the octree leaf lookup all refer to points by index.
#[derive(Clone, Debug, Default)]
pub struct PointCloud {
    points: Vec<Point3>,
}

impl PointCloud {
    /// Create a cloud from a list of points.
    pub fn from_points(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the cloud has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at the given index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Point3> {
        self.points.get(index).copied()
    }

    /// All points, in index order.
    #[inline]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Iterate over points in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Point3> {
        self.points.iter()
    }

    /// Axis-aligned bounding box as (min, max). `None` for an empty cloud.
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = *self.points.first()?;
        let mut min = first;
        let mut max = first;
        for p in &self.points[1..] {
            min = min.min_components(p);
            max = max.max_components(p);
        }
        Some((min, max))
    }

    /// Side length of the bounding cube: the largest extent across the
    /// three axes. Zero for an empty cloud.
    pub fn extent(&self) -> f32 {
        match self.bounds() {
            Some((min, max)) => (max - min).max_element(),
            None => 0.0,
        }
    }
}
