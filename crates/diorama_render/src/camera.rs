//! Perspective camera
//!
//! The camera only knows where it is and what it looks at. Orbiting is the
//! controller's job; it drives the camera through [`CameraControl`].

use diorama_input::CameraControl;
use diorama_math::{mat4, Mat4, Vec3};

/// Perspective camera looking from `eye` towards `target`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub const DEFAULT_FOV: f32 = 75.0;
    pub const DEFAULT_NEAR: f32 = 0.1;
    pub const DEFAULT_FAR: f32 = 1000.0;

    /// Create a camera at the origin looking down -Z
    pub fn new() -> Self {
        Self {
            eye: Vec3::ZERO,
            target: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::Y,
            fov_degrees: Self::DEFAULT_FOV,
            aspect: 1.0,
            near: Self::DEFAULT_NEAR,
            far: Self::DEFAULT_FAR,
        }
    }

    /// Set the projection parameters
    pub fn with_projection(mut self, fov_degrees: f32, near: f32, far: f32) -> Self {
        self.fov_degrees = fov_degrees;
        self.near = near;
        self.far = far;
        self
    }

    /// Update the aspect ratio from a viewport size; zero sizes are ignored
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        mat4::look_at(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        mat4::perspective(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Combined projection * view
    pub fn view_proj(&self) -> Mat4 {
        mat4::mul(self.projection_matrix(), self.view_matrix())
    }

    /// Camera right and up axes in world space, used to face billboards
    pub fn billboard_axes(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.eye).normalized();
        let right = forward.cross(self.up).normalized();
        let up = right.cross(forward);
        (right, up)
    }
}

impl CameraControl for Camera {
    fn look_from(&mut self, eye: Vec3, target: Vec3) {
        self.eye = eye;
        self.target = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diorama_input::CameraController;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_camera_defaults() {
        let camera = Camera::new();
        assert_eq!(camera.fov_degrees, 75.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
    }

    #[test]
    fn test_set_viewport_updates_aspect() {
        let mut camera = Camera::new();
        camera.set_viewport(1600, 900);
        assert!((camera.aspect - 16.0 / 9.0).abs() < EPSILON);

        camera.set_viewport(0, 900);
        assert!((camera.aspect - 16.0 / 9.0).abs() < EPSILON);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let mut camera = Camera::new();
        camera.look_from(Vec3::new(50.0, 50.0, 50.0), Vec3::ZERO);
        camera.set_viewport(1280, 720);

        let ndc = mat4::project_point(camera.view_proj(), Vec3::ZERO);
        assert!(ndc.x.abs() < EPSILON && ndc.y.abs() < EPSILON, "got {:?}", ndc);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_controller_drives_camera() {
        let controller = CameraController::new();
        let mut camera = Camera::new();
        controller.apply(&mut camera);

        assert!(camera.eye.approx_eq(controller.position(), EPSILON));
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_billboard_axes_orthonormal() {
        let mut camera = Camera::new();
        camera.look_from(Vec3::new(30.0, 80.0, -20.0), Vec3::ZERO);
        let (right, up) = camera.billboard_axes();

        assert!((right.length() - 1.0).abs() < EPSILON);
        assert!((up.length() - 1.0).abs() < EPSILON);
        assert!(right.dot(up).abs() < EPSILON);
        assert!(right.y.abs() < EPSILON);
    }
}
