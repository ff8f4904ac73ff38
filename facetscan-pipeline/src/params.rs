//! Pipeline parameter sets

use facetscan_core::{Error, Result};
use serde::{Deserialize, Serialize};

pub use facetscan_algorithms::{ClassifyParams, RansacParams};

/// Statistical outlier removal parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierParams {
    /// Number of nearest neighbors considered per point
    pub neighbors: usize,
    /// Standard deviation multiplier for the rejection threshold
    pub std_ratio: f32,
}

impl Default for OutlierParams {
    fn default() -> Self {
        Self {
            neighbors: 10,
            std_ratio: 3.0,
        }
    }
}

impl OutlierParams {
    pub fn validate(&self) -> Result<()> {
        if self.neighbors == 0 {
            return Err(Error::InvalidData(
                "neighbors must be greater than 0".to_string(),
            ));
        }
        if !(self.std_ratio.is_finite() && self.std_ratio > 0.0) {
            return Err(Error::InvalidData(
                "std_ratio must be positive and finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Voxel downsampling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownsampleParams {
    /// Edge length of the voxel cubes
    pub voxel_size: f32,
}

impl Default for DownsampleParams {
    fn default() -> Self {
        Self { voxel_size: 0.2 }
    }
}

impl DownsampleParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.voxel_size.is_finite() && self.voxel_size > 0.0) {
            return Err(Error::InvalidData(
                "voxel_size must be positive and finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Spatial cropping parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropParams {
    /// Footprint polygon as ordered `[x, y]` vertices; empty skips the crop
    pub polygon: Vec<[f32; 2]>,
    /// Ground threshold; points with `z` below it are dropped
    pub ground_z: f32,
}

impl Default for CropParams {
    fn default() -> Self {
        Self {
            polygon: Vec::new(),
            ground_z: 0.5,
        }
    }
}

impl CropParams {
    pub fn validate(&self) -> Result<()> {
        if !self.polygon.is_empty() && self.polygon.len() < 3 {
            return Err(Error::InvalidData(
                "polygon must have at least 3 vertices".to_string(),
            ));
        }
        if self
            .polygon
            .iter()
            .any(|v| !v[0].is_finite() || !v[1].is_finite())
        {
            return Err(Error::InvalidData(
                "polygon vertices must be finite".to_string(),
            ));
        }
        if !self.ground_z.is_finite() {
            return Err(Error::InvalidData(
                "ground_z must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete parameter set for a pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineParams {
    pub outlier: OutlierParams,
    pub downsample: DownsampleParams,
    pub crop: CropParams,
    pub ransac: RansacParams,
    pub classify: ClassifyParams,
}

impl PipelineParams {
    /// Check every stage's parameters before running anything
    pub fn validate(&self) -> Result<()> {
        self.outlier.validate()?;
        self.downsample.validate()?;
        self.crop.validate()?;
        self.ransac.validate()?;
        self.classify.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PipelineParams::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_stage_params_rejected() {
        let mut params = PipelineParams::default();
        params.downsample.voxel_size = -1.0;
        assert!(params.validate().is_err());

        let mut params = PipelineParams::default();
        params.outlier.neighbors = 0;
        assert!(params.validate().is_err());

        let mut params = PipelineParams::default();
        params.crop.polygon = vec![[0.0, 0.0], [1.0, 0.0]];
        assert!(params.validate().is_err());

        let mut params = PipelineParams::default();
        params.ransac.distance_threshold = f32::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_serde_roundtrip() {
        let mut params = PipelineParams::default();
        params.crop.polygon = vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
        params.ransac.seed = Some(42);

        let json = serde_json::to_string(&params).unwrap();
        let restored: PipelineParams = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.crop.polygon.len(), 4);
        assert_eq!(restored.ransac.seed, Some(42));
        assert!((restored.downsample.voxel_size - params.downsample.voxel_size).abs() < 1e-6);
    }
}
