//! Shared builders for evaluation scenario tests.

use tulana::{Correspondences, Cylinder, MatchingConfig, Octree, Point3, PointCloud, RegionMetrics};

/// Points spaced widely along the x axis so each index lands in its own
/// octree leaf.
pub fn sparse_cloud(n: usize) -> PointCloud {
    PointCloud::from_points(
        (0..n)
            .map(|i| Point3::new(i as f32 * 10.0, 0.0, 0.0))
            .collect(),
    )
}

/// Cylinder along +Z claiming the given inlier indices.
pub fn z_cylinder(radius: f32, inliers: impl IntoIterator<Item = usize>) -> Cylinder {
    Cylinder::with_inliers(Point3::ZERO, Point3::new(0.0, 0.0, 1.0), radius, inliers)
}

/// Run the whole pipeline with default thresholds.
pub fn evaluate(
    cloud: &PointCloud,
    groundtruth: &[Cylinder],
    detections: &[Cylinder],
) -> RegionMetrics {
    let octree = Octree::new(cloud);
    let correspondences =
        Correspondences::compute(groundtruth, detections, &MatchingConfig::default());
    RegionMetrics::compute(&octree, groundtruth, detections, &correspondences)
}
