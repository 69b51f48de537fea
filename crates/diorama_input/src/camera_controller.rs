//! Orbit camera controller
//!
//! Controls:
//! - Left drag: orbit around the origin
//! - Mouse wheel: zoom in/out
//! - `reset()`: return to the home view
//!
//! The camera lives on a sphere centred on the world origin. `theta` is the
//! azimuth in the XZ plane, `phi` the polar angle measured from +Y.

use std::f32::consts::{FRAC_PI_4, PI};

use diorama_math::Vec3;

use crate::PointerEvent;

/// Closest the camera may get to either pole
pub const POLE_MARGIN: f32 = 0.1;
/// Smallest allowed `phi`
pub const MIN_PHI: f32 = POLE_MARGIN;
/// Largest allowed `phi`
pub const MAX_PHI: f32 = PI - POLE_MARGIN;

pub const DEFAULT_SENSITIVITY: f32 = 0.01;
pub const DEFAULT_ZOOM_SPEED: f32 = 3.0;
/// Distance units per wheel pixel before `zoom_speed` is applied
pub const WHEEL_SCALE: f32 = 0.01;
pub const DEFAULT_MIN_DISTANCE: f32 = 15.0;
pub const DEFAULT_MAX_DISTANCE: f32 = 200.0;

/// Orientation of the camera on its viewing sphere
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitState {
    /// Azimuth in radians; unbounded
    pub theta: f32,
    /// Polar angle from +Y in radians
    pub phi: f32,
    /// Distance from the origin
    pub distance: f32,
}

impl OrbitState {
    /// The default view: 45° above the horizon, 60 units out along +X
    pub const HOME: Self = Self {
        theta: 0.0,
        phi: FRAC_PI_4,
        distance: 60.0,
    };

    /// Spherical to Cartesian conversion
    pub fn position(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(
            self.distance * sin_phi * cos_theta,
            self.distance * cos_phi,
            self.distance * sin_phi * sin_theta,
        )
    }
}

impl Default for OrbitState {
    fn default() -> Self {
        Self::HOME
    }
}

/// Pointer drag bookkeeping
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerDragState {
    pub is_dragging: bool,
    pub last_x: f32,
    pub last_y: f32,
}

/// Trait for camera control
/// Lets the controller drive any camera implementation
pub trait CameraControl {
    /// Place the camera at `eye`, looking at `target`
    fn look_from(&mut self, eye: Vec3, target: Vec3);
}

/// Turns pointer drags and wheel input into an orbit camera position
#[derive(Clone, Debug)]
pub struct CameraController {
    orbit: OrbitState,
    drag: PointerDragState,
    home: OrbitState,
    position: Vec3,

    // Configuration
    pub sensitivity_h: f32,
    pub sensitivity_v: f32,
    pub zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraController {
    pub fn new() -> Self {
        let orbit = OrbitState::HOME;
        Self {
            orbit,
            drag: PointerDragState::default(),
            home: orbit,
            position: orbit.position(),
            sensitivity_h: DEFAULT_SENSITIVITY,
            sensitivity_v: DEFAULT_SENSITIVITY,
            zoom_speed: DEFAULT_ZOOM_SPEED,
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }

    /// Start a drag at pointer position `(x, y)`
    pub fn on_drag_start(&mut self, x: f32, y: f32) {
        self.drag = PointerDragState {
            is_dragging: true,
            last_x: x,
            last_y: y,
        };
    }

    /// Continue a drag; ignored when no drag is active
    pub fn on_drag_move(&mut self, x: f32, y: f32) {
        if !self.drag.is_dragging {
            return;
        }

        let dx = x - self.drag.last_x;
        let dy = y - self.drag.last_y;
        if dx.is_finite() && dy.is_finite() {
            self.orbit.theta -= dx * self.sensitivity_h;
            self.orbit.phi = (self.orbit.phi + dy * self.sensitivity_v).clamp(MIN_PHI, MAX_PHI);
            self.recompute_position();
            log::debug!(
                "orbit theta={:.3} phi={:.3} distance={:.1}",
                self.orbit.theta, self.orbit.phi, self.orbit.distance
            );
        }

        self.drag.last_x = x;
        self.drag.last_y = y;
    }

    /// End the current drag
    pub fn on_drag_end(&mut self) {
        self.drag.is_dragging = false;
    }

    /// Zoom by a wheel delta in pixels; positive moves the camera away
    pub fn on_scroll(&mut self, delta_y: f32) {
        if !delta_y.is_finite() {
            return;
        }
        self.orbit.distance = (self.orbit.distance + delta_y * WHEEL_SCALE * self.zoom_speed)
            .clamp(self.min_distance, self.max_distance);
        self.recompute_position();
        log::debug!("zoom distance={:.1}", self.orbit.distance);
    }

    /// Return to the home view
    pub fn reset(&mut self) {
        self.orbit = self.home;
        self.recompute_position();
        log::info!("Camera reset to home view");
    }

    /// Dispatch a pointer event to the matching operation
    ///
    /// `Resize` does not affect the orbit and is ignored here.
    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { x, y } => self.on_drag_start(x, y),
            PointerEvent::Move { x, y } => self.on_drag_move(x, y),
            PointerEvent::Up => self.on_drag_end(),
            PointerEvent::Wheel { delta_y } => self.on_scroll(delta_y),
            PointerEvent::Resize { .. } => {}
        }
    }

    fn recompute_position(&mut self) {
        self.position = self.orbit.position();
    }

    /// Push the current eye and target into a camera
    pub fn apply<C: CameraControl>(&self, camera: &mut C) {
        camera.look_from(self.position, self.target());
    }

    /// Current camera position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Look-at target, always the world origin
    pub fn target(&self) -> Vec3 {
        Vec3::ZERO
    }

    /// Current orbit state
    pub fn orbit(&self) -> OrbitState {
        self.orbit
    }

    /// Current drag state
    pub fn drag_state(&self) -> PointerDragState {
        self.drag
    }

    /// Whether a drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging
    }

    /// Allowed distance range
    pub fn distance_limits(&self) -> (f32, f32) {
        (self.min_distance, self.max_distance)
    }

    /// Builder: set horizontal and vertical drag sensitivity (radians per pixel)
    pub fn with_sensitivity(mut self, horizontal: f32, vertical: f32) -> Self {
        self.sensitivity_h = horizontal;
        self.sensitivity_v = vertical;
        self
    }

    /// Builder: set zoom speed multiplier
    pub fn with_zoom_speed(mut self, speed: f32) -> Self {
        self.zoom_speed = speed;
        self
    }

    /// Builder: set the allowed distance range
    ///
    /// Bounds are swapped if given in the wrong order; non-finite or
    /// non-positive bounds keep the defaults.
    pub fn with_distance_limits(mut self, min: f32, max: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        if min.is_finite() && max.is_finite() && min > 0.0 {
            self.min_distance = min;
            self.max_distance = max;
        } else {
            log::warn!("Ignoring invalid camera distance limits ({}, {})", min, max);
        }
        self.home.distance = self.home.distance.clamp(self.min_distance, self.max_distance);
        self.orbit.distance = self.orbit.distance.clamp(self.min_distance, self.max_distance);
        self.recompute_position();
        self
    }

    /// Builder: set the home view, also used as the starting view
    pub fn with_home(mut self, home: OrbitState) -> Self {
        let phi = if home.phi.is_finite() { home.phi.clamp(MIN_PHI, MAX_PHI) } else { OrbitState::HOME.phi };
        let distance = if home.distance.is_finite() {
            home.distance.clamp(self.min_distance, self.max_distance)
        } else {
            OrbitState::HOME.distance
        };
        let theta = if home.theta.is_finite() { home.theta } else { OrbitState::HOME.theta };

        self.home = OrbitState { theta, phi, distance };
        self.orbit = self.home;
        self.recompute_position();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_in_range(c: &CameraController) {
        let o = c.orbit();
        assert!(o.phi >= MIN_PHI && o.phi <= MAX_PHI, "phi out of range: {}", o.phi);
        assert!(o.distance >= 15.0 && o.distance <= 200.0, "distance out of range: {}", o.distance);
    }

    #[test]
    fn test_initial_state_is_home() {
        let c = CameraController::new();
        assert_eq!(c.orbit(), OrbitState::HOME);
        assert!(!c.is_dragging());
        // theta=0, phi=π/4, distance=60
        let expected = Vec3::new(60.0 * FRAC_PI_4.sin(), 60.0 * FRAC_PI_4.cos(), 0.0);
        assert!(c.position().approx_eq(expected, 1e-4));
        assert_eq!(c.target(), Vec3::ZERO);
    }

    #[test]
    fn test_position_on_equator() {
        let state = OrbitState { theta: 0.0, phi: FRAC_PI_2, distance: 60.0 };
        assert!(state.position().approx_eq(Vec3::new(60.0, 0.0, 0.0), 1e-4));
    }

    #[test]
    fn test_position_at_pole() {
        let state = OrbitState { theta: 0.0, phi: 0.0, distance: 60.0 };
        assert!(state.position().approx_eq(Vec3::new(0.0, 60.0, 0.0), 1e-4));
    }

    #[test]
    fn test_position_quarter_turn() {
        let state = OrbitState { theta: FRAC_PI_2, phi: FRAC_PI_2, distance: 20.0 };
        assert!(state.position().approx_eq(Vec3::new(0.0, 0.0, 20.0), 1e-4));
    }

    #[test]
    fn test_drag_updates_angles() {
        let mut c = CameraController::new();
        c.on_drag_start(100.0, 100.0);
        c.on_drag_move(110.0, 95.0);

        let o = c.orbit();
        assert!((o.theta - -0.1).abs() < 1e-6);
        assert!((o.phi - (FRAC_PI_4 - 0.05)).abs() < 1e-6);
        assert!(c.position().approx_eq(o.position(), 1e-6));
        assert_eq!(c.drag_state().last_x, 110.0);
        assert_eq!(c.drag_state().last_y, 95.0);
    }

    #[test]
    fn test_drag_move_without_start_is_noop() {
        let mut c = CameraController::new();
        let before = c.orbit();
        c.on_drag_move(500.0, -300.0);
        assert_eq!(c.orbit(), before);
        assert_eq!(c.position(), before.position());
    }

    #[test]
    fn test_drag_move_after_end_is_noop() {
        let mut c = CameraController::new();
        c.on_drag_start(0.0, 0.0);
        c.on_drag_end();
        let before = c.orbit();
        c.on_drag_move(50.0, 50.0);
        assert_eq!(c.orbit(), before);
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_phi_stays_clamped_for_any_drag_sequence() {
        let mut c = CameraController::new();
        c.on_drag_start(0.0, 0.0);
        let moves = [
            (0.0, 10_000.0), (3.0, -25_000.0), (-7.0, 400.0), (12.0, 1e9),
            (0.0, -1e9), (1.0, 1.0), (f32::MAX, f32::MAX), (0.0, f32::NAN), (5.0, 5.0),
        ];
        for (x, y) in moves {
            c.on_drag_move(x, y);
            assert_in_range(&c);
        }
    }

    #[test]
    fn test_phi_clamps_exactly_at_margin() {
        let mut c = CameraController::new();
        c.on_drag_start(0.0, 0.0);
        c.on_drag_move(0.0, -1000.0);
        assert_eq!(c.orbit().phi, MIN_PHI);
        c.on_drag_move(0.0, 5000.0);
        assert_eq!(c.orbit().phi, MAX_PHI);
    }

    #[test]
    fn test_theta_is_unbounded() {
        let mut c = CameraController::new();
        c.on_drag_start(0.0, 0.0);
        c.on_drag_move(-10_000.0, 0.0);
        assert!((c.orbit().theta - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_scroll_zooms() {
        let mut c = CameraController::new();
        c.on_scroll(100.0);
        assert!((c.orbit().distance - 63.0).abs() < 1e-4);
        c.on_scroll(-200.0);
        assert!((c.orbit().distance - 57.0).abs() < 1e-4);
        assert!((c.position().length() - 57.0).abs() < 1e-3);
    }

    #[test]
    fn test_distance_stays_clamped_for_any_scroll_sequence() {
        let mut c = CameraController::new();
        for delta in [1e6, -1e6, 53.0, -0.5, f32::INFINITY, f32::NAN, -120.0, 1e30] {
            c.on_scroll(delta);
            assert_in_range(&c);
        }
        c.on_scroll(1e6);
        assert_eq!(c.orbit().distance, 200.0);
        c.on_scroll(-1e6);
        assert_eq!(c.orbit().distance, 15.0);
    }

    #[test]
    fn test_reset_restores_home() {
        let mut c = CameraController::new();
        c.on_drag_start(0.0, 0.0);
        c.on_drag_move(321.0, -77.0);
        c.on_scroll(4000.0);

        c.reset();

        let o = c.orbit();
        assert_eq!(o.theta, 0.0);
        assert_eq!(o.phi, FRAC_PI_4);
        assert_eq!(o.distance, 60.0);
        assert!(c.position().approx_eq(OrbitState::HOME.position(), 1e-6));
    }

    #[test]
    fn test_reset_keeps_drag_state() {
        let mut c = CameraController::new();
        c.on_drag_start(10.0, 10.0);
        c.reset();
        assert!(c.is_dragging());
    }

    #[test]
    fn test_handle_dispatches_events() {
        let mut c = CameraController::new();
        c.handle(PointerEvent::Down { x: 0.0, y: 0.0 });
        assert!(c.is_dragging());
        c.handle(PointerEvent::Move { x: 10.0, y: 0.0 });
        assert!((c.orbit().theta + 0.1).abs() < 1e-6);
        c.handle(PointerEvent::Up);
        assert!(!c.is_dragging());
        c.handle(PointerEvent::Wheel { delta_y: 100.0 });
        assert!((c.orbit().distance - 63.0).abs() < 1e-4);

        let before = c.orbit();
        c.handle(PointerEvent::Resize { width: 800, height: 600 });
        assert_eq!(c.orbit(), before);
    }

    #[test]
    fn test_builders() {
        let c = CameraController::new()
            .with_sensitivity(0.02, 0.005)
            .with_zoom_speed(1.0)
            .with_distance_limits(300.0, 20.0)
            .with_home(OrbitState { theta: 1.0, phi: 0.0, distance: 10.0 });

        assert_eq!(c.sensitivity_h, 0.02);
        assert_eq!(c.sensitivity_v, 0.005);
        assert_eq!(c.zoom_speed, 1.0);
        assert_eq!(c.distance_limits(), (20.0, 300.0));
        // Home is clamped into the valid ranges
        assert_eq!(c.orbit(), OrbitState { theta: 1.0, phi: MIN_PHI, distance: 20.0 });
    }

    #[test]
    fn test_invalid_distance_limits_keep_defaults() {
        let c = CameraController::new().with_distance_limits(f32::NAN, 10.0);
        assert_eq!(c.distance_limits(), (15.0, 200.0));
        let c = CameraController::new().with_distance_limits(-5.0, 10.0);
        assert_eq!(c.distance_limits(), (15.0, 200.0));
    }

    struct RecordingCamera {
        eye: Vec3,
        target: Vec3,
    }

    impl CameraControl for RecordingCamera {
        fn look_from(&mut self, eye: Vec3, target: Vec3) {
            self.eye = eye;
            self.target = target;
        }
    }

    #[test]
    fn test_apply_to_camera() {
        let mut c = CameraController::new();
        c.on_scroll(-1e6);
        let mut camera = RecordingCamera { eye: Vec3::ZERO, target: Vec3::ONE };
        c.apply(&mut camera);
        assert_eq!(camera.eye, c.position());
        assert_eq!(camera.target, Vec3::ZERO);
    }
}
