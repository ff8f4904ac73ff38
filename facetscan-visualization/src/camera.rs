//! Camera utilities for 3D visualization

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};

/// An orbiting 3D camera for viewing point clouds
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    home_position: Point3<f32>,
    home_target: Point3<f32>,
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
            home_position: position,
            home_target: target,
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    /// Rotate the camera around the target
    ///
    /// `horizontal` and `vertical` are angle deltas in radians. The pitch is
    /// clamped short of the poles to keep the view matrix well defined.
    pub fn orbit(&mut self, horizontal: f32, vertical: f32) {
        let offset = self.position - self.target;
        let radius = offset.norm();
        if radius < 1e-6 {
            return;
        }

        let mut yaw = offset.y.atan2(offset.x);
        let mut pitch = (offset.z / radius).asin();

        yaw -= horizontal;
        pitch = (pitch + vertical).clamp(-1.54, 1.54);

        let (sin_pitch, cos_pitch) = pitch.sin_cos();
        let (sin_yaw, cos_yaw) = yaw.sin_cos();

        self.position = self.target
            + Vector3::new(
                radius * cos_pitch * cos_yaw,
                radius * cos_pitch * sin_yaw,
                radius * sin_pitch,
            );
    }

    /// Translate both camera and target in the view plane
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let offset = self.target - self.position;
        let distance = offset.norm();
        if distance < 1e-6 {
            return;
        }

        let forward = offset / distance;
        let right = forward.cross(&self.up);
        if right.norm() < 1e-6 {
            return;
        }
        let right = right.normalize();
        let true_up = right.cross(&forward);

        let translation = (right * -dx + true_up * dy) * distance;
        self.position += translation;
        self.target += translation;
    }

    /// Move the camera toward (positive amount) or away from the target
    pub fn zoom(&mut self, amount: f32) {
        let offset = self.position - self.target;
        let radius = offset.norm();
        if radius < 1e-6 {
            return;
        }

        let scale = (1.0 - amount).clamp(0.1, 10.0);
        let new_radius = (radius * scale).max(self.near * 2.0);
        self.position = self.target + offset / radius * new_radius;
    }

    /// Restore the camera pose set at construction or by the last `fit`
    pub fn reset(&mut self) {
        self.position = self.home_position;
        self.target = self.home_target;
    }

    /// Frame a bounding sphere: look at its center from a distance at which
    /// the sphere fills most of the view
    pub fn fit(&mut self, center: Point3<f32>, radius: f32) {
        let radius = radius.max(1e-3);
        let distance = radius / (self.fov * 0.5).tan() * 1.4;
        let direction = Vector3::new(1.0, -1.0, 0.7).normalize();

        self.target = center;
        self.position = center + direction * distance;
        self.far = self.far.max(distance + radius * 4.0);
        self.home_position = self.position;
        self.home_target = self.target;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Point3::new(5.0, 5.0, 5.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            std::f32::consts::FRAC_PI_4,
            16.0 / 9.0,
            0.1,
            1000.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_orbit_preserves_radius() {
        let mut camera = Camera::default();
        let radius = (camera.position - camera.target).norm();

        camera.orbit(0.3, 0.2);
        let new_radius = (camera.position - camera.target).norm();

        assert_relative_eq!(radius, new_radius, epsilon = 1e-4);
    }

    #[test]
    fn test_reset_restores_pose() {
        let mut camera = Camera::default();
        let home = camera.position;

        camera.orbit(1.0, 0.5);
        camera.pan(0.2, 0.1);
        camera.zoom(0.3);
        assert!((camera.position - home).norm() > 1e-3);

        camera.reset();
        assert_relative_eq!((camera.position - home).norm(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zoom_moves_toward_target() {
        let mut camera = Camera::default();
        let before = (camera.position - camera.target).norm();

        camera.zoom(0.2);
        let after = (camera.position - camera.target).norm();
        assert!(after < before);

        camera.zoom(-0.2);
        assert!((camera.position - camera.target).norm() > after);
    }

    #[test]
    fn test_fit_centers_target() {
        let mut camera = Camera::default();
        let center = Point3::new(100.0, 50.0, 10.0);

        camera.fit(center, 20.0);
        assert_eq!(camera.target, center);
        assert!((camera.position - center).norm() > 20.0);
    }

    #[test]
    fn test_pan_keeps_offset() {
        let mut camera = Camera::default();
        let offset = camera.position - camera.target;

        camera.pan(0.1, -0.2);
        let new_offset = camera.position - camera.target;
        assert_relative_eq!((offset - new_offset).norm(), 0.0, epsilon = 1e-4);
    }
}
