//! Scene construction utilities
//!
//! This module provides a declarative API for building the diorama.

mod scene_builder;

pub use scene_builder::{Scene, SceneBuilder};
