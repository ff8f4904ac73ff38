//! Extract And View Demo
//!
//! Loads a LAS/LAZ/PLY point cloud, runs the extraction pipeline with default
//! parameters and opens the classified result in the interactive viewer.
//!
//! ```bash
//! cargo run --release --bin extract_and_view -- path/to/scan.laz
//! ```

use facetscan_pipeline::{extract_building_planes, PipelineParams};
use facetscan_visualization::show_classified;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: extract_and_view <scan.las|scan.laz|scan.ply>"))?;

    let result = extract_building_planes(&path, &PipelineParams::default())?;
    println!(
        "classified {} walls and {} roofs",
        result.wall_count(),
        result.roof_count()
    );

    if result.planes.is_empty() {
        println!("nothing to show; no plane matched the classification rules");
        return Ok(());
    }

    show_classified(&result.planes)?;
    Ok(())
}
