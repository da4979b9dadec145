//! Compare a cylinder-detection result against ground truth.
//!
//! # Usage
//!
//! ```bash
//! tulana <DIRECTORY> <DATASET> <TECHNIQUE>
//! tulana --config tulana.yaml data/ bridge ransac
//! RUST_LOG=debug tulana data/ bridge ransac
//! ```
//!
//! Reads `{directory}{dataset}_{technique}.pcl`,
//! `{directory}{dataset}_ground_truth.geo`, and
//! `{directory}{dataset}_{technique}_{technique}.geo`, then prints
//! region-based precision, recall, F1, the matched ground-truth cylinder
//! count, and the ground-truth coverage fraction.

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::info;

use tulana::io::{load_geometry, load_point_cloud};
use tulana::{Correspondences, Octree, RegionMetrics, TulanaConfig};

/// Evaluate cylinder detections against a ground-truth annotation.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dataset directory (used as a raw path prefix)
    directory: String,

    /// Dataset name
    dataset: String,

    /// Technique suffix selecting the detection-result files
    technique: String,

    /// Configuration file path (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => TulanaConfig::load(path)?,
        None => TulanaConfig::load_default()?,
    };

    let cloud_path = format!(
        "{}{}_{}.pcl",
        args.directory, args.dataset, args.technique
    );
    let groundtruth_path = format!("{}{}_ground_truth.geo", args.directory, args.dataset);
    let detections_path = format!(
        "{}{}_{}_{}.geo",
        args.directory, args.dataset, args.technique, args.technique
    );

    info!("point cloud: {}", cloud_path);
    let cloud = load_point_cloud(Path::new(&cloud_path))?;

    let octree = Octree::build(&cloud, config.octree.max_depth);
    info!(
        "octree: size {:.3}, {} leaves, min region size {:.3}",
        octree.size(),
        octree.leaf_count(),
        cloud.extent() * 0.01
    );

    info!("ground truth: {}", groundtruth_path);
    let groundtruth = load_geometry(Path::new(&groundtruth_path))?;

    info!("detections: {}", detections_path);
    let detections = load_geometry(Path::new(&detections_path))?;

    let correspondences =
        Correspondences::compute(&groundtruth, &detections, &config.matching);
    let metrics = RegionMetrics::compute(&octree, &groundtruth, &detections, &correspondences);

    metrics.print();
    Ok(())
}
