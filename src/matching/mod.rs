//! Correspondence matching between detected and ground-truth cylinders.
//!
//! Each detected (test) cylinder is mapped to at most one ground-truth
//! cylinder by inlier overlap, gated by a strict majority requirement and a
//! geometric equivalence test. Absence of a match is a normal outcome, not
//! an error.
//!
//! The matching is deterministic: it depends only on the collection order of
//! the ground-truth cylinders (first-match-wins for points claimed by more
//! than one ground-truth cylinder, earliest index wins overlap-count ties),
//! never on hash iteration order.

use serde::{Deserialize, Serialize};

use crate::core::Cylinder;

/// Geometric thresholds for the equivalence test.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum |dot| of the two unit axis normals. The default 0.86 accepts
    /// axes within roughly 30 degrees in either direction; the absolute
    /// value is taken because a detector's axis sign is arbitrary.
    pub min_normal_dot: f32,

    /// Maximum ratio of the larger radius to the smaller. Detections more
    /// than this factor off in radius are not the same physical cylinder
    /// even with matching inliers.
    pub max_radius_ratio: f32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_normal_dot: 0.86,
            max_radius_ratio: 2.0,
        }
    }
}

/// Geometric similarity check gating a high-overlap candidate.
///
/// Symmetric in its arguments.
pub fn is_equivalent(a: &Cylinder, b: &Cylinder, config: &MatchingConfig) -> bool {
    if a.normal.dot(&b.normal).abs() < config.min_normal_dot {
        return false;
    }
    let (min_r, max_r) = if a.radius < b.radius {
        (a.radius, b.radius)
    } else {
        (b.radius, a.radius)
    };
    max_r / min_r <= config.max_radius_ratio
}

/// Mapping from every test cylinder to its ground-truth match, or none.
///
/// Indexed by position in the test collection; `Some(i)` refers to index `i`
/// of the ground-truth collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Correspondences {
    matches: Vec<Option<usize>>,
}

impl Correspondences {
    /// Match every test cylinder against the ground-truth collection.
    pub fn compute(
        groundtruth: &[Cylinder],
        test: &[Cylinder],
        config: &MatchingConfig,
    ) -> Self {
        let matches = test
            .iter()
            .enumerate()
            .map(|(i, cylinder)| {
                let found = find_correspondence(groundtruth, cylinder, config);
                match found {
                    Some(gt) => log::trace!(
                        "test cylinder {} matched ground truth {} ({} inliers)",
                        i,
                        gt,
                        cylinder.inlier_count()
                    ),
                    None => log::trace!(
                        "test cylinder {} unmatched ({} inliers)",
                        i,
                        cylinder.inlier_count()
                    ),
                }
                found
            })
            .collect();

        Self { matches }
    }

    /// Match result for a test cylinder index.
    #[inline]
    pub fn get(&self, test_index: usize) -> Option<usize> {
        self.matches.get(test_index).copied().flatten()
    }

    /// Number of test cylinders covered by the mapping.
    #[inline]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Check if the mapping covers no test cylinders.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Iterate over `(test_index, ground_truth_match)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<usize>)> + '_ {
        self.matches.iter().copied().enumerate()
    }

    /// Number of distinct ground-truth cylinders that received a match.
    pub fn matched_ground_truth(&self, groundtruth_len: usize) -> usize {
        let mut matched = vec![false; groundtruth_len];
        for m in self.matches.iter().flatten() {
            matched[*m] = true;
        }
        matched.iter().filter(|&&m| m).count()
    }
}

/// Find the ground-truth cylinder a test cylinder corresponds to, if any.
fn find_correspondence(
    groundtruth: &[Cylinder],
    test: &Cylinder,
    config: &MatchingConfig,
) -> Option<usize> {
    let mut overlap = vec![0usize; groundtruth.len()];
    let mut unmatched = 0usize;

    // First ground-truth cylinder containing the point wins; points claimed
    // by none fall into the explicit unmatched bucket.
    for &inlier in &test.inliers {
        match groundtruth.iter().position(|gt| gt.contains_inlier(inlier)) {
            Some(i) => overlap[i] += 1,
            None => unmatched += 1,
        }
    }

    // Highest overlap wins; earliest index wins ties among ground truth.
    let (best, best_count) = overlap
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))?;

    // The unmatched bucket tying or exceeding every candidate means no
    // ground-truth cylinder dominates this detection.
    if best_count == 0 || unmatched >= best_count {
        return None;
    }

    // Strict majority: the match must account for more than half of the
    // test cylinder's inliers.
    if 2 * best_count <= test.inlier_count() {
        return None;
    }

    if !is_equivalent(&groundtruth[best], test, config) {
        return None;
    }

    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point3;

    const Z: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    fn cyl(normal: Point3, radius: f32, inliers: impl IntoIterator<Item = usize>) -> Cylinder {
        Cylinder::with_inliers(Point3::ZERO, normal, radius, inliers)
    }

    #[test]
    fn test_exact_match() {
        let groundtruth = vec![cyl(Z, 1.0, 0..10)];
        let test = vec![cyl(Z, 1.0, 0..10)];

        let corr = Correspondences::compute(&groundtruth, &test, &MatchingConfig::default());
        assert_eq!(corr.get(0), Some(0));
        assert_eq!(corr.matched_ground_truth(1), 1);
    }

    #[test]
    fn test_majority_required() {
        // 5 of 10 inliers overlap: exactly half, not a majority.
        let groundtruth = vec![cyl(Z, 1.0, 0..5)];
        let test = vec![cyl(Z, 1.0, 0..10)];

        let corr = Correspondences::compute(&groundtruth, &test, &MatchingConfig::default());
        assert_eq!(corr.get(0), None);
    }

    #[test]
    fn test_split_between_two_candidates() {
        // 50/50 split: neither candidate reaches a majority.
        let groundtruth = vec![cyl(Z, 1.0, 0..5), cyl(Z, 1.0, 5..10)];
        let test = vec![cyl(Z, 1.0, 0..10)];

        let corr = Correspondences::compute(&groundtruth, &test, &MatchingConfig::default());
        assert_eq!(corr.get(0), None);
    }

    #[test]
    fn test_unmatched_bucket_blocks_match() {
        // 6 overlapping, 6 claimed by no ground truth: tie goes unmatched.
        let groundtruth = vec![cyl(Z, 1.0, 0..6)];
        let test = vec![cyl(Z, 1.0, 0..12)];

        let corr = Correspondences::compute(&groundtruth, &test, &MatchingConfig::default());
        assert_eq!(corr.get(0), None);
    }

    #[test]
    fn test_first_match_wins_for_shared_inliers() {
        // Both ground-truth cylinders claim 0..8; the first in collection
        // order absorbs the shared points.
        let groundtruth = vec![cyl(Z, 1.0, 0..8), cyl(Z, 1.0, 0..8)];
        let test = vec![cyl(Z, 1.0, 0..8)];

        let corr = Correspondences::compute(&groundtruth, &test, &MatchingConfig::default());
        assert_eq!(corr.get(0), Some(0));
    }

    #[test]
    fn test_radius_ratio_rejects() {
        let groundtruth = vec![cyl(Z, 3.0, 0..10)];
        let test = vec![cyl(Z, 1.0, 0..10)];

        let corr = Correspondences::compute(&groundtruth, &test, &MatchingConfig::default());
        assert_eq!(corr.get(0), None);
    }

    #[test]
    fn test_normal_angle_rejects() {
        let x = Point3::new(1.0, 0.0, 0.0);
        let groundtruth = vec![cyl(x, 1.0, 0..10)];
        let test = vec![cyl(Z, 1.0, 0..10)];

        let corr = Correspondences::compute(&groundtruth, &test, &MatchingConfig::default());
        assert_eq!(corr.get(0), None);
    }

    #[test]
    fn test_flipped_normal_accepted() {
        let neg_z = Point3::new(0.0, 0.0, -1.0);
        let groundtruth = vec![cyl(Z, 1.0, 0..10)];
        let test = vec![cyl(neg_z, 1.0, 0..10)];

        let corr = Correspondences::compute(&groundtruth, &test, &MatchingConfig::default());
        assert_eq!(corr.get(0), Some(0));
    }

    #[test]
    fn test_equivalence_symmetry() {
        let config = MatchingConfig::default();
        let cases = [
            (cyl(Z, 1.0, []), cyl(Z, 1.9, [])),
            (cyl(Z, 1.0, []), cyl(Z, 2.5, [])),
            (cyl(Z, 1.0, []), cyl(Point3::new(1.0, 0.0, 0.0), 1.0, [])),
            (
                cyl(Point3::new(0.0, 0.0, -1.0), 0.5, []),
                cyl(Z, 0.9, []),
            ),
        ];

        for (a, b) in &cases {
            assert_eq!(
                is_equivalent(a, b, &config),
                is_equivalent(b, a, &config)
            );
        }
    }

    #[test]
    fn test_empty_inlier_sets_never_match() {
        let groundtruth = vec![cyl(Z, 1.0, [])];
        let test = vec![cyl(Z, 1.0, []), cyl(Z, 1.0, 0..4)];

        let corr = Correspondences::compute(&groundtruth, &test, &MatchingConfig::default());
        assert_eq!(corr.get(0), None);
        assert_eq!(corr.get(1), None);
        assert_eq!(corr.matched_ground_truth(1), 0);
    }

    #[test]
    fn test_deterministic() {
        let groundtruth = vec![cyl(Z, 1.0, 0..20), cyl(Z, 1.0, 10..40), cyl(Z, 1.2, 35..60)];
        let test = vec![cyl(Z, 1.0, 0..15), cyl(Z, 1.1, 30..55), cyl(Z, 1.0, 100..120)];
        let config = MatchingConfig::default();

        let first = Correspondences::compute(&groundtruth, &test, &config);
        let second = Correspondences::compute(&groundtruth, &test, &config);
        assert_eq!(first, second);
    }
}
