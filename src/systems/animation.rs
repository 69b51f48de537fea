//! Animation system
//!
//! Drives the scene's animation loop:
//! - Delta time calculation
//! - Pause and time scaling
//! - Ticking the animation updater
//! - Frame rate tracking for the window title

use std::time::Instant;
use diorama_core::{AnimationUpdater, FrameUpdate, World};

use crate::config::AnimationConfig;

/// Seconds between frame rate samples
const FPS_SAMPLE_INTERVAL: f32 = 0.5;

/// Manages the per-frame animation clock
pub struct AnimationSystem {
    last_frame: Instant,
    time_scale: f32,
    max_frame_dt: f32,
    paused: bool,
    frames: u32,
    sample_time: f32,
    fps: f32,
}

impl AnimationSystem {
    /// Create an animation system from config
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            last_frame: Instant::now(),
            time_scale: config.time_scale,
            max_frame_dt: config.max_frame_dt,
            paused: config.paused,
            frames: 0,
            sample_time: 0.0,
            fps: 0.0,
        }
    }

    /// Run one animation frame
    ///
    /// Measures the wall-clock time since the previous call and advances
    /// the updater by it, scaled and capped.
    pub fn update(&mut self, updater: &mut AnimationUpdater, world: &mut World) -> FrameUpdate {
        let now = Instant::now();
        let raw_dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.record_frame(raw_dt);
        updater.tick(world, self.step_seconds(raw_dt))
    }

    /// Seconds of animation time a frame of `raw_dt` wall-clock seconds advances
    pub fn step_seconds(&self, raw_dt: f32) -> f32 {
        if self.paused || !raw_dt.is_finite() {
            return 0.0;
        }
        // Cap dt so a stall (first frame, window drag) doesn't jump the scene
        (raw_dt.clamp(0.0, self.max_frame_dt) * self.time_scale).max(0.0)
    }

    fn record_frame(&mut self, raw_dt: f32) {
        self.frames += 1;
        self.sample_time += raw_dt;
        if self.sample_time >= FPS_SAMPLE_INTERVAL {
            self.fps = self.frames as f32 / self.sample_time;
            self.frames = 0;
            self.sample_time = 0.0;
        }
    }

    /// Toggle pause, returning the new state
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        log::info!("Animation {}", if self.paused { "paused" } else { "resumed" });
        self.paused
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Frames per second over the last sample interval
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for AnimationSystem {
    fn default() -> Self {
        Self::new(&AnimationConfig::default())
    }
}
