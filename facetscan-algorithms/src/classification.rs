//! Roof/wall classification of detected planes

use crate::segmentation::DetectedPlane;
use facetscan_core::{ColoredPoint3f, Error, PointCloud, Result};
use serde::{Deserialize, Serialize};

/// The surface class assigned to a detected plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaneClass {
    Roof,
    Wall,
}

impl PlaneClass {
    /// Fixed display color per class: roofs red, walls blue
    pub fn color(&self) -> [u8; 3] {
        match self {
            PlaneClass::Roof => [255, 0, 0],
            PlaneClass::Wall => [0, 0, 255],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaneClass::Roof => "roof",
            PlaneClass::Wall => "wall",
        }
    }
}

impl std::fmt::Display for PlaneClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected plane with its assigned class
#[derive(Debug, Clone)]
pub struct ClassifiedPlane {
    pub class: PlaneClass,
    pub plane: DetectedPlane,
}

/// Thresholds for roof/wall classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyParams {
    /// A plane is a wall when |normal.z| is below this value
    pub wall_max_normal_z: f32,
    /// A plane is a roof when |normal.z| is above this value and the height
    /// requirement holds
    pub roof_min_normal_z: f32,
    /// Minimum highest-inlier height for a roof
    pub min_roof_height: f32,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            wall_max_normal_z: 0.3,
            roof_min_normal_z: 0.7,
            min_roof_height: 4.0,
        }
    }
}

impl ClassifyParams {
    /// Check the parameter set for invalid values
    ///
    /// Requiring `wall_max_normal_z <= roof_min_normal_z` keeps the two class
    /// bands disjoint, so a plane can never satisfy both rules.
    pub fn validate(&self) -> Result<()> {
        if !(self.wall_max_normal_z.is_finite() && self.wall_max_normal_z > 0.0) {
            return Err(Error::InvalidData(
                "wall_max_normal_z must be positive and finite".to_string(),
            ));
        }
        if !(self.roof_min_normal_z.is_finite() && self.roof_min_normal_z <= 1.0) {
            return Err(Error::InvalidData(
                "roof_min_normal_z must be finite and at most 1".to_string(),
            ));
        }
        if self.wall_max_normal_z > self.roof_min_normal_z {
            return Err(Error::InvalidData(
                "wall_max_normal_z must not exceed roof_min_normal_z".to_string(),
            ));
        }
        if !self.min_roof_height.is_finite() {
            return Err(Error::InvalidData(
                "min_roof_height must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Classify a single plane, or return `None` when it matches neither rule
///
/// Near-vertical surfaces (|normal.z| below `wall_max_normal_z`) are walls.
/// Near-horizontal surfaces (|normal.z| above `roof_min_normal_z`) whose
/// highest inlier reaches `min_roof_height` are roofs. Everything else is
/// considered ambiguous. The decision is a pure function of the plane and the
/// thresholds, so repeating it with unchanged thresholds yields the same
/// label.
pub fn classify_plane(plane: &DetectedPlane, params: &ClassifyParams) -> Option<PlaneClass> {
    let normal_z = plane.model.unit_normal().z.abs();

    if normal_z < params.wall_max_normal_z {
        Some(PlaneClass::Wall)
    } else if normal_z > params.roof_min_normal_z && plane.max_height() >= params.min_roof_height {
        Some(PlaneClass::Roof)
    } else {
        None
    }
}

/// Classify a set of detected planes into roofs and walls
///
/// Planes matching neither rule are dropped from the output.
pub fn classify_planes(
    planes: Vec<DetectedPlane>,
    params: &ClassifyParams,
) -> Result<Vec<ClassifiedPlane>> {
    params.validate()?;

    Ok(planes
        .into_iter()
        .filter_map(|plane| {
            classify_plane(&plane, params).map(|class| ClassifiedPlane { class, plane })
        })
        .collect())
}

/// Merge classified planes into a single cloud with per-class colors
pub fn colorize_planes(planes: &[ClassifiedPlane]) -> PointCloud<ColoredPoint3f> {
    let total: usize = planes.iter().map(|p| p.plane.points.len()).sum();
    let mut cloud = PointCloud::with_capacity(total);

    for classified in planes {
        let color = classified.class.color();
        cloud.extend(
            classified
                .plane
                .points
                .iter()
                .map(|point| ColoredPoint3f::new(*point, color)),
        );
    }

    cloud
}
