//! # Tulana
//!
//! Region-based evaluation of a cylinder-detection run against a
//! ground-truth annotation of the same 3D point cloud.
//!
//! ## Overview
//!
//! Detected cylinders are matched to ground-truth cylinders by shared
//! inlier points, then precision, recall, and F1 are computed over octree
//! leaf regions rather than raw points. Bucketing inliers into disjoint
//! leaf cubes ties correctness to spatial locality: an area of the cloud
//! counts once no matter how many near-duplicate points a detector sprays
//! into it.
//!
//! ## Pipeline
//!
//! ```rust,ignore
//! use tulana::{Correspondences, MatchingConfig, Octree, RegionMetrics};
//! use tulana::io::{load_geometry, load_point_cloud};
//!
//! let cloud = load_point_cloud(cloud_path)?;
//! let octree = Octree::new(&cloud);
//!
//! let groundtruth = load_geometry(groundtruth_path)?;
//! let detections = load_geometry(detections_path)?;
//!
//! let correspondences =
//!     Correspondences::compute(&groundtruth, &detections, &MatchingConfig::default());
//! let metrics = RegionMetrics::compute(&octree, &groundtruth, &detections, &correspondences);
//! metrics.print();
//! ```
//!
//! The whole run is single-threaded and batch: one cloud, one pair of
//! cylinder collections, one metrics computation.

#![warn(missing_docs)]

// Core geometric types
pub mod core;

// Spatial partition
pub mod octree;

// Detection-to-ground-truth matching
pub mod matching;

// Region metrics
pub mod evaluation;

// Unified configuration
pub mod config;

// Binary file formats
pub mod io;

// Re-export commonly used types
pub use config::{ConfigLoadError, OctreeSection, TulanaConfig};
pub use core::{Cylinder, Point3, PointCloud};
pub use evaluation::RegionMetrics;
pub use matching::{is_equivalent, Correspondences, MatchingConfig};
pub use octree::{NodeId, Octree, DEFAULT_MAX_DEPTH};
