//! Orbit Camera Input Handling
//!
//! This crate turns pointer drags and wheel input into an orbit camera
//! position around the diorama's origin.

mod camera_controller;
mod pointer;

pub use camera_controller::{CameraController, CameraControl, OrbitState, PointerDragState};
pub use camera_controller::{MIN_PHI, MAX_PHI};
pub use pointer::{PointerEvent, PointerTracker, wheel_delta_pixels};
