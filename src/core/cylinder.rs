//! Cylinder primitives as produced by a detector or annotated as ground truth.

use std::collections::BTreeSet;

use super::Point3;

/// A detected or ground-truth cylinder.
///
/// Carries the geometric parameters plus the set of point indices the
/// cylinder claims as inliers. The inlier set is ordered so iteration is
/// deterministic; membership tests are O(log n).
#[derive(Clone, Debug)]
pub struct Cylinder {
    /// Point on the cylinder axis.
    pub center: Point3,
    /// Unit axis direction. The sign is not meaningful: a detector may
    /// report either orientation for the same physical cylinder.
    pub normal: Point3,
    /// Cylinder radius.
    pub radius: f32,
    /// Indices into the point cloud this cylinder claims as inliers.
    pub inliers: BTreeSet<usize>,
}

impl Cylinder {
    /// Create a cylinder with no inliers.
    pub fn new(center: Point3, normal: Point3, radius: f32) -> Self {
        Self {
            center,
            normal,
            radius,
            inliers: BTreeSet::new(),
        }
    }

    /// Create a cylinder with the given inlier indices.
    pub fn with_inliers(
        center: Point3,
        normal: Point3,
        radius: f32,
        inliers: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            center,
            normal,
            radius,
            inliers: inliers.into_iter().collect(),
        }
    }

    /// Check whether a point index is an inlier of this cylinder.
    #[inline]
    pub fn contains_inlier(&self, index: usize) -> bool {
        self.inliers.contains(&index)
    }

    /// Number of claimed inliers.
    #[inline]
    pub fn inlier_count(&self) -> usize {
        self.inliers.len()
    }
}
