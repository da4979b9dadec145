//! Region-based detection metrics.
//!
//! Precision and recall are defined over octree leaf regions rather than
//! raw points: an inlier point only counts through the leaf it falls in, so
//! near-duplicate points along the same physical cylinder cannot inflate a
//! score, and a sparse but correct detection is not penalized like a wholly
//! wrong one. Each metric accumulates a numerator and a denominator set of
//! leaves and divides set sizes.
//!
//! ## Degenerate cases
//!
//! Every 0/0 is defined as **0.0**: an empty denominator set yields 0.0 for
//! that metric, and `precision + recall == 0` yields an F1 of 0.0. This is
//! the documented choice for the whole crate; no NaN ever escapes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::Cylinder;
use crate::matching::Correspondences;
use crate::octree::Octree;

/// Final evaluation scores for one comparison run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegionMetrics {
    /// Fraction of detection-touched leaf regions that are correct.
    pub precision: f32,

    /// Fraction of ground-truth-touched leaf regions that are recovered.
    pub recall: f32,

    /// Harmonic mean of precision and recall (0.0 when both are 0).
    pub f1: f32,

    /// Distinct ground-truth cylinders that received at least one match.
    pub matched_ground_truth: usize,

    /// Total ground-truth cylinders.
    pub total_ground_truth: usize,

    /// Fraction of point-touched leaf regions covered by ground-truth
    /// inliers. Diagnostic only, not part of precision/recall.
    pub coverage: f32,
}

impl RegionMetrics {
    /// Compute all metrics from the partition, the two cylinder
    /// collections, and their correspondence map.
    pub fn compute(
        octree: &Octree,
        groundtruth: &[Cylinder],
        test: &[Cylinder],
        correspondences: &Correspondences,
    ) -> Self {
        let precision = precision(octree, groundtruth, test, correspondences);
        let recall = recall(octree, groundtruth, test, correspondences);

        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            precision,
            recall,
            f1,
            matched_ground_truth: correspondences.matched_ground_truth(groundtruth.len()),
            total_ground_truth: groundtruth.len(),
            coverage: coverage(octree, groundtruth),
        }
    }

    /// Print a human-readable report to stdout.
    pub fn print(&self) {
        println!("=== Region Metrics ===");
        println!("Precision:    {:.4}", self.precision);
        println!("Recall:       {:.4}", self.recall);
        println!("F1-Score:     {:.4}", self.f1);
        println!(
            "Matched:      {}/{} ground-truth cylinders",
            self.matched_ground_truth, self.total_ground_truth
        );
        println!(
            "Coverage:     {:.4} of regions touched by ground truth",
            self.coverage
        );
    }
}

/// Leaf-region precision.
///
/// Denominator: leaves touched by any test-cylinder inlier. Numerator:
/// leaves touched by an inlier of a matched test cylinder that the matched
/// ground-truth cylinder also claims.
fn precision(
    octree: &Octree,
    groundtruth: &[Cylinder],
    test: &[Cylinder],
    correspondences: &Correspondences,
) -> f32 {
    let mut all_leaves = HashSet::new();
    let mut correct_leaves = HashSet::new();

    for (test_index, matched) in correspondences.iter() {
        let matched_gt = matched.map(|i| &groundtruth[i]);
        for &inlier in &test[test_index].inliers {
            let leaf = octree.find_leaf(inlier);
            all_leaves.insert(leaf);
            if matched_gt.is_some_and(|gt| gt.contains_inlier(inlier)) {
                correct_leaves.insert(leaf);
            }
        }
    }

    ratio(correct_leaves.len(), all_leaves.len())
}

/// Leaf-region recall.
///
/// Denominator: leaves touched by any ground-truth inlier. Numerator:
/// leaves touched by a ground-truth inlier that a test cylinder matched to
/// that ground truth also claims as its own.
fn recall(
    octree: &Octree,
    groundtruth: &[Cylinder],
    test: &[Cylinder],
    correspondences: &Correspondences,
) -> f32 {
    // Test cylinders matched to each ground-truth cylinder.
    let mut matched_tests: Vec<Vec<usize>> = vec![Vec::new(); groundtruth.len()];
    for (test_index, matched) in correspondences.iter() {
        if let Some(gt_index) = matched {
            matched_tests[gt_index].push(test_index);
        }
    }

    let mut all_leaves = HashSet::new();
    let mut correct_leaves = HashSet::new();

    for (gt_index, cylinder) in groundtruth.iter().enumerate() {
        for &inlier in &cylinder.inliers {
            let leaf = octree.find_leaf(inlier);
            all_leaves.insert(leaf);
            if matched_tests[gt_index]
                .iter()
                .any(|&t| test[t].contains_inlier(inlier))
            {
                correct_leaves.insert(leaf);
            }
        }
    }

    ratio(correct_leaves.len(), all_leaves.len())
}

/// Fraction of point-touched leaf regions containing ground-truth inliers.
///
/// Every point in the cloud is classified as cylinder (inlier of some
/// ground-truth cylinder) or not, and its leaf is added to the matching
/// set; the fraction is |cylinder leaves| over the two set sizes combined.
fn coverage(octree: &Octree, groundtruth: &[Cylinder]) -> f32 {
    let inlier_union: HashSet<usize> = groundtruth
        .iter()
        .flat_map(|c| c.inliers.iter().copied())
        .collect();

    let mut cylinder_leaves = HashSet::new();
    let mut other_leaves = HashSet::new();

    for point in 0..octree.point_count() {
        let leaf = octree.find_leaf(point);
        if inlier_union.contains(&point) {
            cylinder_leaves.insert(leaf);
        } else {
            other_leaves.insert(leaf);
        }
    }

    ratio(
        cylinder_leaves.len(),
        cylinder_leaves.len() + other_leaves.len(),
    )
}

/// Guarded division: 0/0 is defined as 0.
#[inline]
fn ratio(numerator: usize, denominator: usize) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}
