//! Building plane extraction CLI
//!
//! Loads a LiDAR point cloud, runs the facetscan pipeline (outlier removal,
//! voxel downsampling, footprint crop, ground removal, RANSAC plane
//! extraction, roof/wall classification) and shows the classified result in
//! an interactive viewer and/or exports it as a colored PLY.
//!
//! ```bash
//! facetscan scan.laz --ground-z 0.5 --min-roof-height 4 \
//!     --polygon 281580.8,1614183.7 281535.7,1614142.9 281585.2,1614088.2 281630.1,1614128.8 \
//!     --export classified.ply
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use facetscan_algorithms::colorize_planes;
use facetscan_pipeline::{extract_building_planes, PipelineParams};

#[derive(Parser, Debug)]
#[command(name = "facetscan", version, about = "Classify building roofs and walls in LiDAR point clouds")]
struct Args {
    /// Input point cloud (.las, .laz or .ply)
    input: PathBuf,

    /// Neighbors considered by the statistical outlier filter
    #[arg(long, default_value_t = 10)]
    neighbors: usize,

    /// Standard deviation ratio of the outlier filter
    #[arg(long, default_value_t = 3.0)]
    std_ratio: f32,

    /// Voxel edge length for downsampling
    #[arg(long, default_value_t = 0.2)]
    voxel_size: f32,

    /// Footprint polygon vertices as x,y pairs; omit to keep the full extent
    #[arg(long, value_parser = parse_vertex, num_args = 3.., value_name = "X,Y")]
    polygon: Vec<[f32; 2]>,

    /// Ground threshold; points below this height are dropped
    #[arg(long, default_value_t = 0.5)]
    ground_z: f32,

    /// RANSAC inlier distance tolerance
    #[arg(long, default_value_t = 0.1)]
    distance_threshold: f32,

    /// RANSAC iterations per extracted plane
    #[arg(long, default_value_t = 1000)]
    iterations: usize,

    /// Minimum inlier count for a plane to be kept
    #[arg(long, default_value_t = 500)]
    min_inliers: usize,

    /// Maximum number of planes to extract
    #[arg(long, default_value_t = 20)]
    max_planes: usize,

    /// Seed for reproducible RANSAC runs
    #[arg(long)]
    seed: Option<u64>,

    /// Walls have |normal.z| below this threshold
    #[arg(long, default_value_t = 0.3)]
    wall_max_normal_z: f32,

    /// Roofs have |normal.z| above this threshold
    #[arg(long, default_value_t = 0.7)]
    roof_min_normal_z: f32,

    /// Minimum height for a plane to qualify as a roof
    #[arg(long, default_value_t = 4.0)]
    min_roof_height: f32,

    /// Write the classified cloud to a colored PLY file
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Skip the interactive viewer
    #[arg(long)]
    no_view: bool,
}

fn parse_vertex(s: &str) -> Result<[f32; 2], String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{}'", s))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x in '{}': {}", s, e))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y in '{}': {}", s, e))?;
    Ok([x, y])
}

fn params_from_args(args: &Args) -> PipelineParams {
    let mut params = PipelineParams::default();
    params.outlier.neighbors = args.neighbors;
    params.outlier.std_ratio = args.std_ratio;
    params.downsample.voxel_size = args.voxel_size;
    params.crop.polygon = args.polygon.clone();
    params.crop.ground_z = args.ground_z;
    params.ransac.distance_threshold = args.distance_threshold;
    params.ransac.iterations = args.iterations;
    params.ransac.min_inliers = args.min_inliers;
    params.ransac.max_planes = args.max_planes;
    params.ransac.seed = args.seed;
    params.classify.wall_max_normal_z = args.wall_max_normal_z;
    params.classify.roof_min_normal_z = args.roof_min_normal_z;
    params.classify.min_roof_height = args.min_roof_height;
    params
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let params = params_from_args(&args);

    let result = extract_building_planes(&args.input, &params)
        .with_context(|| format!("extraction failed for {}", args.input.display()))?;

    log::info!(
        "classified {} walls and {} roofs",
        result.wall_count(),
        result.roof_count()
    );

    if result.planes.is_empty() {
        log::warn!("no roof or wall planes found; consider relaxing the thresholds");
    }

    let colored = colorize_planes(&result.planes);

    if let Some(path) = &args.export {
        facetscan_io::write_colored_point_cloud(&colored, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {} classified points to {}", colored.len(), path.display());
    }

    if !args.no_view && !colored.is_empty() {
        facetscan_visualization::show_colored_point_cloud(&colored)
            .context("viewer failed")?;
    }

    Ok(())
}
