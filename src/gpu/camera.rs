//! Orbit camera.

use crate::config::CameraConfig;
use glam::{Mat4, Vec3};

/// Radians of rotation per pixel of mouse drag.
const ROTATE_SPEED: f32 = 0.005;
/// Distance change per scroll line.
const ZOOM_SPEED: f32 = 0.3;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 50.0;
const PITCH_LIMIT: f32 = 1.5;
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

/// Camera orbiting a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Camera {
    /// Camera at `(0, 0, 5)` looking at the origin.
    pub fn new() -> Self {
        Self::from_config(&CameraConfig::default())
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            yaw: config.yaw,
            pitch: config.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance: config.distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            target: Vec3::ZERO,
            fov_degrees: config.fov_degrees,
        }
    }

    /// World-space eye position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Orbit by a mouse drag of `(dx, dy)` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * ROTATE_SPEED;
        self.pitch = (self.pitch + dy * ROTATE_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move toward (positive) or away from (negative) the target.
    pub fn zoom(&mut self, scroll: f32) {
        self.distance = (self.distance - scroll * ZOOM_SPEED).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Slide the target in the view plane by a drag of `(dx, dy)` pixels.
    ///
    /// The step scales with distance so panning feels the same when zoomed.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let scale = self.distance * 0.001;
        self.target += (-right * dx + up * dy) * scale;
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, NEAR, FAR)
    }

    /// Combined projection * view.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_eye_position() {
        let camera = Camera::new();
        let eye = camera.position();
        assert!(eye.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-6));
        assert_eq!(camera.fov_degrees, 60.0);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = Camera::new();
        let clip = camera.view_proj(16.0 / 9.0) * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut camera = Camera::new();
        camera.rotate(0.0, 10_000.0);
        assert_eq!(camera.pitch, PITCH_LIMIT);
        camera.rotate(0.0, -100_000.0);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = Camera::new();
        camera.zoom(1_000.0);
        assert_eq!(camera.distance, MIN_DISTANCE);
        camera.zoom(-1_000.0);
        assert_eq!(camera.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_pan_moves_target_not_distance() {
        let mut camera = Camera::new();
        camera.pan(100.0, 0.0);
        assert!(camera.target.x < 0.0);
        assert!(camera.target.y.abs() < 1e-6);
        let offset = camera.position() - camera.target;
        assert!((offset.length() - 5.0).abs() < 1e-5);
    }
}
