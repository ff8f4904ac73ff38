//! Stage orchestration for building plane extraction

use crate::params::PipelineParams;
use facetscan_algorithms::{
    classify_planes, extract_planes, polygon_crop, remove_below, statistical_outlier_removal,
    voxel_downsample, ClassifiedPlane, PlaneClass,
};
use facetscan_core::{Error, Point3f, PointCloud, Result};
use facetscan_io::read_point_cloud;
use std::path::Path;

/// Point count accounting for one pipeline stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSummary {
    pub stage: &'static str,
    pub points_before: usize,
    pub points_after: usize,
}

/// Result of a pipeline run: classified planes plus per-stage accounting
#[derive(Debug)]
pub struct ExtractionResult {
    pub planes: Vec<ClassifiedPlane>,
    pub summaries: Vec<StageSummary>,
}

impl ExtractionResult {
    /// Planes classified as walls
    pub fn walls(&self) -> impl Iterator<Item = &ClassifiedPlane> {
        self.planes.iter().filter(|p| p.class == PlaneClass::Wall)
    }

    /// Planes classified as roofs
    pub fn roofs(&self) -> impl Iterator<Item = &ClassifiedPlane> {
        self.planes.iter().filter(|p| p.class == PlaneClass::Roof)
    }

    pub fn wall_count(&self) -> usize {
        self.walls().count()
    }

    pub fn roof_count(&self) -> usize {
        self.roofs().count()
    }
}

/// Sequential building plane extraction over a loaded point cloud
pub struct BuildingExtractor {
    params: PipelineParams,
}

impl BuildingExtractor {
    /// Create an extractor, rejecting invalid parameters up front
    pub fn new(params: PipelineParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Run the full pipeline on a point cloud
    ///
    /// Stages, in order: statistical outlier removal, voxel downsampling,
    /// footprint crop (skipped when no polygon is configured), ground
    /// removal, iterative RANSAC plane extraction, roof/wall classification.
    pub fn run(&self, cloud: &PointCloud<Point3f>) -> Result<ExtractionResult> {
        if cloud.is_empty() {
            return Err(Error::InvalidData("point cloud is empty".to_string()));
        }

        let mut summaries = Vec::new();

        let filtered = statistical_outlier_removal(
            cloud,
            self.params.outlier.neighbors,
            self.params.outlier.std_ratio,
        )?;
        record(&mut summaries, "outlier removal", cloud.len(), filtered.len());

        let downsampled = voxel_downsample(&filtered, self.params.downsample.voxel_size)?;
        record(
            &mut summaries,
            "voxel downsampling",
            filtered.len(),
            downsampled.len(),
        );

        let cropped = if self.params.crop.polygon.is_empty() {
            downsampled
        } else {
            let cropped = polygon_crop(&downsampled, &self.params.crop.polygon)?;
            record(
                &mut summaries,
                "footprint crop",
                downsampled.len(),
                cropped.len(),
            );
            cropped
        };

        let above_ground = remove_below(&cropped, self.params.crop.ground_z)?;
        record(
            &mut summaries,
            "ground removal",
            cropped.len(),
            above_ground.len(),
        );

        let detected = extract_planes(&above_ground, &self.params.ransac)?;
        log::info!("extracted {} candidate planes", detected.len());

        let planes = classify_planes(detected, &self.params.classify)?;
        for (index, classified) in planes.iter().enumerate() {
            log::info!(
                "plane {}: {} with {} points, height {:.2} to {:.2}",
                index + 1,
                classified.class,
                classified.plane.inlier_count(),
                classified.plane.min_height(),
                classified.plane.max_height(),
            );
        }

        Ok(ExtractionResult { planes, summaries })
    }
}

fn record(summaries: &mut Vec<StageSummary>, stage: &'static str, before: usize, after: usize) {
    log::info!("{}: {} -> {} points", stage, before, after);
    summaries.push(StageSummary {
        stage,
        points_before: before,
        points_after: after,
    });
}

/// Load a point cloud from disk and run the full pipeline on it
pub fn extract_building_planes<P: AsRef<Path>>(
    path: P,
    params: &PipelineParams,
) -> Result<ExtractionResult> {
    let cloud = read_point_cloud(path.as_ref())?;
    log::info!(
        "loaded {} points from {}",
        cloud.len(),
        path.as_ref().display()
    );
    BuildingExtractor::new(params.clone())?.run(&cloud)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cloud_is_rejected() {
        let extractor = BuildingExtractor::new(PipelineParams::default()).unwrap();
        let result = extractor.run(&PointCloud::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_params_rejected_at_construction() {
        let mut params = PipelineParams::default();
        params.downsample.voxel_size = 0.0;
        assert!(BuildingExtractor::new(params).is_err());
    }

    #[test]
    fn test_missing_input_file() {
        let result =
            extract_building_planes("no_such_scan_anywhere.laz", &PipelineParams::default());
        assert!(result.is_err());
    }
}
