//! Pointer events and their translation from winit
//!
//! The camera controller speaks in browser-style pointer terms: pixel
//! coordinates for drags and a `delta_y` in pixels for the wheel, positive
//! when the wheel turns towards the user.

use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Pixels per wheel "line" on devices that report line deltas
pub const PIXELS_PER_LINE: f32 = 100.0;

/// A pointer or viewport event consumed by the viewer
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Primary button pressed at `(x, y)`
    Down { x: f32, y: f32 },
    /// Pointer moved to `(x, y)`
    Move { x: f32, y: f32 },
    /// Primary button released
    Up,
    /// Wheel turned; positive zooms out
    Wheel { delta_y: f32 },
    /// Viewport resized to `width` x `height` physical pixels
    Resize { width: u32, height: u32 },
}

/// Convert a winit scroll delta to browser-style pixels
///
/// winit reports positive `y` when the wheel turns away from the user,
/// the opposite sign to the browser's `deltaY`.
pub fn wheel_delta_pixels(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
        MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => -(y as f32),
    }
}

/// Tracks the cursor so button presses can report where they happened
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerTracker {
    cursor: (f32, f32),
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known cursor position in physical pixels
    pub fn cursor(&self) -> (f32, f32) {
        self.cursor
    }

    /// Translate a window event, returning `None` for events the viewer ignores
    pub fn translate(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                Some(PointerEvent::Move { x: self.cursor.0, y: self.cursor.1 })
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => match state {
                ElementState::Pressed => Some(PointerEvent::Down { x: self.cursor.0, y: self.cursor.1 }),
                ElementState::Released => Some(PointerEvent::Up),
            },
            WindowEvent::MouseWheel { delta, .. } => Some(PointerEvent::Wheel {
                delta_y: wheel_delta_pixels(*delta),
            }),
            WindowEvent::Resized(size) => Some(PointerEvent::Resize {
                width: size.width,
                height: size.height,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;
    use winit::event::{DeviceId, TouchPhase};

    fn device() -> DeviceId {
        // SAFETY: only used as an opaque id in synthetic events
        unsafe { DeviceId::dummy() }
    }

    #[test]
    fn test_line_delta_sign_and_scale() {
        // Wheel towards the user: winit -1 line, browser +100 px (zoom out)
        assert_eq!(wheel_delta_pixels(MouseScrollDelta::LineDelta(0.0, -1.0)), 100.0);
        assert_eq!(wheel_delta_pixels(MouseScrollDelta::LineDelta(0.0, 2.0)), -200.0);
    }

    #[test]
    fn test_pixel_delta_sign() {
        let delta = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 35.0));
        assert_eq!(wheel_delta_pixels(delta), -35.0);
    }

    #[test]
    fn test_press_reports_last_cursor_position() {
        let mut tracker = PointerTracker::new();
        let moved = tracker.translate(&WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(120.0, 45.0),
        });
        assert_eq!(moved, Some(PointerEvent::Move { x: 120.0, y: 45.0 }));

        let pressed = tracker.translate(&WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Pressed,
            button: MouseButton::Left,
        });
        assert_eq!(pressed, Some(PointerEvent::Down { x: 120.0, y: 45.0 }));

        let released = tracker.translate(&WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Released,
            button: MouseButton::Left,
        });
        assert_eq!(released, Some(PointerEvent::Up));
    }

    #[test]
    fn test_other_buttons_ignored() {
        let mut tracker = PointerTracker::new();
        let event = WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Pressed,
            button: MouseButton::Right,
        };
        assert_eq!(tracker.translate(&event), None);
    }

    #[test]
    fn test_wheel_and_resize() {
        let mut tracker = PointerTracker::new();
        let wheel = tracker.translate(&WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::LineDelta(0.0, -1.0),
            phase: TouchPhase::Moved,
        });
        assert_eq!(wheel, Some(PointerEvent::Wheel { delta_y: 100.0 }));

        let resize = tracker.translate(&WindowEvent::Resized(PhysicalSize::new(1280, 720)));
        assert_eq!(resize, Some(PointerEvent::Resize { width: 1280, height: 720 }));
    }
}
