//! Nearest neighbor search implementations

use facetscan_core::{NearestNeighborSearch, Point3f};
use kiddo::{KdTree, SquaredEuclidean};

/// K-d tree backed nearest neighbor search
pub struct KdTreeSearch {
    tree: KdTree<f32, 3>,
}

impl KdTreeSearch {
    pub fn new(points: &[Point3f]) -> Self {
        let mut tree: KdTree<f32, 3> = KdTree::new();
        for (idx, point) in points.iter().enumerate() {
            tree.add(&[point.x, point.y, point.z], idx as u64);
        }
        Self { tree }
    }
}

impl NearestNeighborSearch for KdTreeSearch {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        self.tree
            .nearest_n::<SquaredEuclidean>(&[query.x, query.y, query.z], k)
            .into_iter()
            .map(|neighbor| (neighbor.item as usize, neighbor.distance.sqrt()))
            .collect()
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        self.tree
            .within_unsorted::<SquaredEuclidean>(&[query.x, query.y, query.z], radius * radius)
            .into_iter()
            .map(|neighbor| (neighbor.item as usize, neighbor.distance.sqrt()))
            .collect()
    }
}

/// Simple brute force nearest neighbor search for small datasets
pub struct BruteForceSearch {
    points: Vec<Point3f>,
}

impl BruteForceSearch {
    pub fn new(points: &[Point3f]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }
}

impl NearestNeighborSearch for BruteForceSearch {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        let mut distances: Vec<(usize, f32)> = self
            .points
            .iter()
            .enumerate()
            .map(|(idx, point)| {
                let dx = point.x - query.x;
                let dy = point.y - query.y;
                let dz = point.z - query.z;
                let distance = (dx * dx + dy * dy + dz * dz).sqrt();
                (idx, distance)
            })
            .collect();

        // Sort by distance and take k nearest
        distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        distances.truncate(k);
        distances
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        let radius_squared = radius * radius;
        self.points
            .iter()
            .enumerate()
            .filter_map(|(idx, point)| {
                let dx = point.x - query.x;
                let dy = point.y - query.y;
                let dz = point.z - query.z;
                let distance_squared = dx * dx + dy * dy + dz * dz;

                if distance_squared <= radius_squared {
                    Some((idx, distance_squared.sqrt()))
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<Point3f> {
        vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 2.0, 0.0),
            Point3f::new(0.0, 0.0, 3.0),
            Point3f::new(5.0, 5.0, 5.0),
        ]
    }

    #[test]
    fn test_k_nearest_matches_brute_force() {
        let points = sample_points();
        let kd = KdTreeSearch::new(&points);
        let brute = BruteForceSearch::new(&points);

        let query = Point3f::new(0.1, 0.1, 0.1);
        let mut kd_result = kd.find_k_nearest(&query, 3);
        let brute_result = brute.find_k_nearest(&query, 3);

        kd_result.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
        assert_eq!(kd_result.len(), 3);
        for (kd_hit, brute_hit) in kd_result.iter().zip(brute_result.iter()) {
            assert_eq!(kd_hit.0, brute_hit.0);
            assert!((kd_hit.1 - brute_hit.1).abs() < 1e-5);
        }
    }

    #[test]
    fn test_radius_neighbors_matches_brute_force() {
        let points = sample_points();
        let kd = KdTreeSearch::new(&points);
        let brute = BruteForceSearch::new(&points);

        let query = Point3f::new(0.0, 0.0, 0.0);
        let mut kd_result: Vec<usize> = kd
            .find_radius_neighbors(&query, 2.5)
            .into_iter()
            .map(|(idx, _)| idx)
            .collect();
        let mut brute_result: Vec<usize> = brute
            .find_radius_neighbors(&query, 2.5)
            .into_iter()
            .map(|(idx, _)| idx)
            .collect();

        kd_result.sort_unstable();
        brute_result.sort_unstable();
        assert_eq!(kd_result, brute_result);
        assert_eq!(kd_result, vec![0, 1, 2]);
    }
}
