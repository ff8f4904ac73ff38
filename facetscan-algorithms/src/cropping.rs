//! Spatial cropping: footprint polygon filtering and ground removal

use facetscan_core::{Error, Point3f, PointCloud, Result};

/// Test whether the horizontal projection of a point lies inside a closed 2D
/// polygon, using the even-odd ray casting rule. Points exactly on an edge
/// may land on either side.
fn point_in_polygon(x: f32, y: f32, polygon: &[[f32; 2]]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;

    for i in 0..polygon.len() {
        let [xi, yi] = polygon[i];
        let [xj, yj] = polygon[j];

        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Polygon footprint filter
///
/// Retains only the points whose horizontal (x, y) projection lies inside the
/// given polygon. The polygon is an ordered vertex list in the horizontal
/// plane; it is treated as closed (the last vertex connects back to the
/// first).
///
/// # Arguments
/// * `cloud` - Input point cloud
/// * `polygon` - Ordered `[x, y]` vertices of the footprint
///
/// # Returns
/// * `Result<PointCloud<Point3f>>` - Points inside the footprint
pub fn polygon_crop(
    cloud: &PointCloud<Point3f>,
    polygon: &[[f32; 2]],
) -> Result<PointCloud<Point3f>> {
    if polygon.len() < 3 {
        return Err(Error::InvalidData(
            "polygon must have at least 3 vertices".to_string(),
        ));
    }

    if polygon
        .iter()
        .any(|v| !v[0].is_finite() || !v[1].is_finite())
    {
        return Err(Error::InvalidData(
            "polygon vertices must be finite".to_string(),
        ));
    }

    let filtered_points: Vec<Point3f> = cloud
        .points
        .iter()
        .filter(|p| point_in_polygon(p.x, p.y, polygon))
        .copied()
        .collect();

    Ok(PointCloud::from_points(filtered_points))
}

/// Ground removal
///
/// Discards all points whose z-coordinate is below `z_min`.
///
/// # Arguments
/// * `cloud` - Input point cloud
/// * `z_min` - Height threshold; points with `z < z_min` are dropped
///
/// # Returns
/// * `Result<PointCloud<Point3f>>` - Points at or above the threshold
pub fn remove_below(cloud: &PointCloud<Point3f>, z_min: f32) -> Result<PointCloud<Point3f>> {
    if !z_min.is_finite() {
        return Err(Error::InvalidData(
            "ground threshold must be finite".to_string(),
        ));
    }

    let filtered_points: Vec<Point3f> = cloud
        .points
        .iter()
        .filter(|p| p.z >= z_min)
        .copied()
        .collect();

    Ok(PointCloud::from_points(filtered_points))
}
