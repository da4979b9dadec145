//! Core geometric types: points, point clouds, and cylinders.

mod cylinder;
mod point;

pub use cylinder::Cylinder;
pub use point::{Point3, PointCloud};
