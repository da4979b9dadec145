//! Binary loaders for the dataset (.pcl) and geometry (.geo) formats.
//!
//! Both formats come from the detector toolchain and use little-endian
//! encoding throughout; counts are u64 (the producing code's 64-bit
//! `size_t`), scalars are f32.
//!
//! ## Point cloud (.pcl)
//!
//! - `count: u64`, `flags: u64`
//! - `count` records: `position: 3xf32`, then per `flags` bit:
//!   color `3xf32` (bit 0), intensity `f32` (bit 1), normal `3xf32`
//!   (bit 2), normal confidence `f32` (bit 3), curvature `f32` (bit 4)
//!
//! Only positions are kept; optional fields are read to keep the record
//! boundary correct and discarded.
//!
//! ## Geometry (.geo)
//!
//! - `circle_count: u64`, `plane_count: u64`, `cylinder_count: u64`
//! - `cylinder_count` records: color `3xf32` (discarded), center `3xf32`,
//!   normal `3xf32`, radius `f32`, height `f32` (discarded),
//!   `inlier_count: u64`, `inlier_count x u64` point indices
//!
//! Circles and planes are only counted in the header; no records for them
//! follow in the files this tool consumes.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use crate::core::{Cylinder, Point3, PointCloud};

/// Point record carries per-point color (3 x f32).
pub const FLAG_COLOR: u64 = 1 << 0;
/// Point record carries intensity (f32).
pub const FLAG_INTENSITY: u64 = 1 << 1;
/// Point record carries a surface normal (3 x f32).
pub const FLAG_NORMAL: u64 = 1 << 2;
/// Point record carries normal confidence (f32).
pub const FLAG_NORMAL_CONFIDENCE: u64 = 1 << 3;
/// Point record carries curvature (f32).
pub const FLAG_CURVATURE: u64 = 1 << 4;

/// Error type for format I/O.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Underlying I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File ended inside a record
    #[error("truncated file while reading {0}")]
    Truncated(&'static str),
}

/// Result type alias for format I/O.
pub type Result<T> = std::result::Result<T, FormatError>;

fn read_exact_or<R: Read>(reader: &mut R, buf: &mut [u8], what: &'static str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            FormatError::Truncated(what)
        } else {
            FormatError::Io(e)
        }
    })
}

fn read_u64<R: Read>(reader: &mut R, what: &'static str) -> Result<u64> {
    let mut buf = [0u8; 8];
    read_exact_or(reader, &mut buf, what)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_f32s<R: Read>(reader: &mut R, out: &mut [f32], what: &'static str) -> Result<()> {
    let mut buf = [0u8; 4];
    for v in out.iter_mut() {
        read_exact_or(reader, &mut buf, what)?;
        *v = f32::from_le_bytes(buf);
    }
    Ok(())
}

fn read_point3<R: Read>(reader: &mut R, what: &'static str) -> Result<Point3> {
    let mut v = [0.0f32; 3];
    read_f32s(reader, &mut v, what)?;
    Ok(Point3::new(v[0], v[1], v[2]))
}

/// Load a point cloud from a .pcl file.
pub fn load_point_cloud(path: &Path) -> Result<PointCloud> {
    let file = File::open(path)?;
    read_point_cloud(&mut BufReader::new(file))
}

/// Read a point cloud from a reader in .pcl format.
pub fn read_point_cloud<R: Read>(reader: &mut R) -> Result<PointCloud> {
    let count = read_u64(reader, "point count")?;
    let flags = read_u64(reader, "flag mask")?;

    // Capacity capped so a corrupt header cannot trigger a huge allocation.
    let mut points = Vec::with_capacity((count as usize).min(1 << 22));
    let mut scratch = [0.0f32; 3];

    for i in 0..count {
        points.push(read_point3(reader, "point position")?);

        if flags & FLAG_COLOR != 0 {
            read_f32s(reader, &mut scratch, "point color")?;
        }
        if flags & FLAG_INTENSITY != 0 {
            read_f32s(reader, &mut scratch[..1], "point intensity")?;
        }
        if flags & FLAG_NORMAL != 0 {
            read_f32s(reader, &mut scratch, "point normal")?;
        }
        if flags & FLAG_NORMAL_CONFIDENCE != 0 {
            read_f32s(reader, &mut scratch[..1], "normal confidence")?;
        }
        if flags & FLAG_CURVATURE != 0 {
            read_f32s(reader, &mut scratch[..1], "point curvature")?;
        }

        if i > 0 && i % 1_000_000 == 0 {
            log::debug!("loading points: {}/{}", i, count);
        }
    }

    log::info!("loaded {} points (flags {:#x})", points.len(), flags);
    Ok(PointCloud::from_points(points))
}

/// Write a point cloud to a writer in .pcl format (positions only).
pub fn write_point_cloud<W: Write>(cloud: &PointCloud, writer: &mut W) -> Result<()> {
    writer.write_all(&(cloud.len() as u64).to_le_bytes())?;
    writer.write_all(&0u64.to_le_bytes())?; // no optional fields

    for p in cloud.iter() {
        writer.write_all(&p.x.to_le_bytes())?;
        writer.write_all(&p.y.to_le_bytes())?;
        writer.write_all(&p.z.to_le_bytes())?;
    }
    Ok(())
}

/// Save a point cloud to a .pcl file (positions only).
pub fn save_point_cloud(cloud: &PointCloud, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_point_cloud(cloud, &mut writer)?;
    Ok(writer.flush()?)
}

/// Load a cylinder collection from a .geo file.
///
/// Collection order follows file order; matching treats that order as
/// significant, so it must be preserved.
pub fn load_geometry(path: &Path) -> Result<Vec<Cylinder>> {
    let file = File::open(path)?;
    read_geometry(&mut BufReader::new(file))
}

/// Read a cylinder collection from a reader in .geo format.
pub fn read_geometry<R: Read>(reader: &mut R) -> Result<Vec<Cylinder>> {
    let _circle_count = read_u64(reader, "circle count")?;
    let _plane_count = read_u64(reader, "plane count")?;
    let cylinder_count = read_u64(reader, "cylinder count")?;

    let mut cylinders = Vec::with_capacity((cylinder_count as usize).min(1 << 16));
    let mut scratch = [0.0f32; 3];

    for _ in 0..cylinder_count {
        read_f32s(reader, &mut scratch, "cylinder color")?; // discarded
        let center = read_point3(reader, "cylinder center")?;
        let normal = read_point3(reader, "cylinder normal")?;
        let mut radius = [0.0f32];
        read_f32s(reader, &mut radius, "cylinder radius")?;
        read_f32s(reader, &mut scratch[..1], "cylinder height")?; // discarded

        let inlier_count = read_u64(reader, "inlier count")?;
        let mut cylinder = Cylinder::new(center, normal, radius[0]);
        for _ in 0..inlier_count {
            cylinder.inliers.insert(read_u64(reader, "inlier index")? as usize);
        }
        cylinders.push(cylinder);
    }

    log::info!("loaded {} cylinders", cylinders.len());
    Ok(cylinders)
}

/// Write a cylinder collection to a writer in .geo format.
///
/// Discarded fields (color, height) are written as zeros; circle and plane
/// counts are zero.
pub fn write_geometry<W: Write>(cylinders: &[Cylinder], writer: &mut W) -> Result<()> {
    writer.write_all(&0u64.to_le_bytes())?; // circles
    writer.write_all(&0u64.to_le_bytes())?; // planes
    writer.write_all(&(cylinders.len() as u64).to_le_bytes())?;

    for cylinder in cylinders {
        for _ in 0..3 {
            writer.write_all(&0f32.to_le_bytes())?; // color
        }
        for v in [
            cylinder.center.x,
            cylinder.center.y,
            cylinder.center.z,
            cylinder.normal.x,
            cylinder.normal.y,
            cylinder.normal.z,
            cylinder.radius,
            0.0, // height
        ] {
            writer.write_all(&v.to_le_bytes())?;
        }
        writer.write_all(&(cylinder.inliers.len() as u64).to_le_bytes())?;
        for &inlier in &cylinder.inliers {
            writer.write_all(&(inlier as u64).to_le_bytes())?;
        }
    }
    Ok(())
}

/// Save a cylinder collection to a .geo file.
pub fn save_geometry(cylinders: &[Cylinder], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_geometry(cylinders, &mut writer)?;
    Ok(writer.flush()?)
}
