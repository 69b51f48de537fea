//! Military base diorama
//!
//! An orbit-camera viewer for a procedurally dressed 3D military base with
//! spinning turrets, rotors and radar, flickering fires and drifting smoke.

pub mod config;
pub mod input;
pub mod scene;
pub mod systems;
