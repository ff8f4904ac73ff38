//! End-to-end pipeline tests on a synthetic building scene

use facetscan_core::{Point3f, PointCloud};
use facetscan_pipeline::{
    extract_building_planes, BuildingExtractor, PipelineParams, RansacParams,
};

/// Synthetic scan: a 10x10 m building with a flat roof at z=10 and four
/// walls, standing on a ground plane, plus a detached block outside the
/// footprint and a few isolated outlier returns.
fn synthetic_scan() -> PointCloud<Point3f> {
    let mut cloud = PointCloud::new();
    let steps = |n: usize| (0..n).map(|i| i as f32 * 0.5);

    // Ground plane at z=0, x/y in [0, 10]
    for x in steps(21) {
        for y in steps(21) {
            cloud.push(Point3f::new(x, y, 0.0));
        }
    }

    // Roof slab at z=10
    for x in steps(21) {
        for y in steps(21) {
            cloud.push(Point3f::new(x, y, 10.0));
        }
    }

    // Walls at x=0 and x=10, z in [0.5, 9.5]
    for y in steps(21) {
        for k in 0..19 {
            let z = 0.5 + k as f32 * 0.5;
            cloud.push(Point3f::new(0.0, y, z));
            cloud.push(Point3f::new(10.0, y, z));
        }
    }

    // Walls at y=0 and y=10; skip the corner columns already covered above
    for i in 0..19 {
        let x = 0.5 + i as f32 * 0.5;
        for k in 0..19 {
            let z = 0.5 + k as f32 * 0.5;
            cloud.push(Point3f::new(x, 0.0, z));
            cloud.push(Point3f::new(x, 10.0, z));
        }
    }

    // Detached block outside the footprint
    for i in 0..9 {
        for j in 0..9 {
            for k in 0..9 {
                cloud.push(Point3f::new(
                    20.0 + i as f32 * 0.5,
                    j as f32 * 0.5,
                    1.0 + k as f32 * 0.5,
                ));
            }
        }
    }

    // Isolated outlier returns
    cloud.push(Point3f::new(50.0, 50.0, 50.0));
    cloud.push(Point3f::new(-40.0, 10.0, 30.0));
    cloud.push(Point3f::new(25.0, -60.0, 12.0));

    cloud
}

fn scan_params() -> PipelineParams {
    let mut params = PipelineParams::default();
    params.crop.polygon = vec![[-1.0, -1.0], [11.0, -1.0], [11.0, 11.0], [-1.0, 11.0]];
    params.crop.ground_z = 0.5;
    params.ransac = RansacParams {
        distance_threshold: 0.05,
        iterations: 1000,
        min_inliers: 150,
        max_planes: 10,
        seed: Some(7),
        ..Default::default()
    };
    params
}

#[test]
fn test_full_pipeline_classifies_roof_and_walls() {
    let cloud = synthetic_scan();
    let extractor = BuildingExtractor::new(scan_params()).unwrap();
    let result = extractor.run(&cloud).unwrap();

    assert_eq!(result.roof_count(), 1, "expected exactly one roof plane");
    assert_eq!(result.wall_count(), 4, "expected four wall planes");

    let roof = result.roofs().next().unwrap();
    assert!(roof.plane.inlier_count() >= 400);
    assert!(roof.plane.max_height() >= 9.9);

    for wall in result.walls() {
        assert!(wall.plane.inlier_count() >= 300);
        assert!(wall.plane.model.unit_normal().z.abs() < 0.3);
    }
}

#[test]
fn test_stage_summaries_account_for_every_stage() {
    let cloud = synthetic_scan();
    let extractor = BuildingExtractor::new(scan_params()).unwrap();
    let result = extractor.run(&cloud).unwrap();

    let stages: Vec<&str> = result.summaries.iter().map(|s| s.stage).collect();
    assert_eq!(
        stages,
        vec![
            "outlier removal",
            "voxel downsampling",
            "footprint crop",
            "ground removal"
        ]
    );

    // No stage ever adds points
    for summary in &result.summaries {
        assert!(summary.points_after <= summary.points_before);
    }

    // The three isolated returns fall to the outlier filter
    assert_eq!(result.summaries[0].points_after, cloud.len() - 3);
    // The detached block (729 points) falls to the footprint crop
    let crop = &result.summaries[2];
    assert_eq!(crop.points_before - crop.points_after, 729);
    // The ground plane (441 points) falls to ground removal
    let ground = &result.summaries[3];
    assert_eq!(ground.points_before - ground.points_after, 441);
}

#[test]
fn test_detected_planes_respect_distance_threshold() {
    let cloud = synthetic_scan();
    let params = scan_params();
    let threshold = params.ransac.distance_threshold;
    let result = BuildingExtractor::new(params).unwrap().run(&cloud).unwrap();

    for classified in &result.planes {
        for point in &classified.plane.points {
            let dist = classified.plane.model.distance_to_point(point);
            assert!(
                dist <= threshold + 1e-5,
                "point at distance {} exceeds threshold {}",
                dist,
                threshold
            );
        }
    }
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let cloud = synthetic_scan();
    let extractor = BuildingExtractor::new(scan_params()).unwrap();

    let first = extractor.run(&cloud).unwrap();
    let second = extractor.run(&cloud).unwrap();

    assert_eq!(first.planes.len(), second.planes.len());
    for (a, b) in first.planes.iter().zip(second.planes.iter()) {
        assert_eq!(a.class, b.class);
        assert_eq!(a.plane.inlier_count(), b.plane.inlier_count());
    }
}

#[test]
fn test_pipeline_from_ply_file() {
    let temp_file = "test_pipeline_scene.ply";
    let cloud = synthetic_scan();
    facetscan_io::write_point_cloud(&cloud, temp_file).unwrap();

    let result = extract_building_planes(temp_file, &scan_params()).unwrap();
    assert_eq!(result.roof_count(), 1);
    assert_eq!(result.wall_count(), 4);

    let _ = std::fs::remove_file(temp_file);
}
