//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`DIORAMA_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

use diorama_core::Material;
use diorama_input::{CameraController, OrbitState};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DioramaConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Orbit camera configuration
    #[serde(default)]
    pub camera: CameraConfig,
    /// Animation clock configuration
    #[serde(default)]
    pub animation: AnimationConfig,
    /// Rendering configuration
    #[serde(default)]
    pub rendering: RenderingConfig,
    /// Scene generation
    #[serde(default)]
    pub scene: SceneConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl DioramaConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`DIORAMA_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // DIORAMA_WINDOW__TITLE=Test -> window.title = "Test"
        figment = figment.merge(Env::prefixed("DIORAMA_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Start in fullscreen mode
    pub fullscreen: bool,
    /// Enable VSync
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Military Base Diorama".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
        }
    }
}

/// Orbit camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Radians of azimuth per pixel dragged horizontally
    pub sensitivity_h: f32,
    /// Radians of polar angle per pixel dragged vertically
    pub sensitivity_v: f32,
    /// Distance change per 100 px of wheel travel
    pub zoom_speed: f32,
    /// Closest orbit distance
    pub min_distance: f32,
    /// Farthest orbit distance
    pub max_distance: f32,
    /// Home azimuth in radians
    pub home_theta: f32,
    /// Home polar angle in radians
    pub home_phi: f32,
    /// Home orbit distance
    pub home_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            sensitivity_h: 0.01,
            sensitivity_v: 0.01,
            zoom_speed: 3.0,
            min_distance: 15.0,
            max_distance: 200.0,
            home_theta: OrbitState::HOME.theta,
            home_phi: OrbitState::HOME.phi,
            home_distance: OrbitState::HOME.distance,
        }
    }
}

impl CameraConfig {
    /// Build an orbit controller with these tunables, starting at the home view
    pub fn to_controller(&self) -> CameraController {
        CameraController::new()
            .with_sensitivity(self.sensitivity_h, self.sensitivity_v)
            .with_zoom_speed(self.zoom_speed)
            .with_distance_limits(self.min_distance, self.max_distance)
            .with_home(OrbitState {
                theta: self.home_theta,
                phi: self.home_phi,
                distance: self.home_distance,
            })
    }
}

/// Animation clock configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Multiplier applied to wall-clock time
    pub time_scale: f32,
    /// Longest frame the animation will advance in one step, in seconds
    pub max_frame_dt: f32,
    /// Start with the animation paused
    pub paused: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_frame_dt: 0.25,
            paused: false,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Sky and fog color as 0xRRGGBB (sRGB)
    pub sky_color: u32,
    /// Distance where fog starts
    pub fog_near: f32,
    /// Distance where fog is opaque
    pub fog_far: f32,
    /// Direction towards the sun [x, y, z]
    pub light_dir: [f32; 3],
    /// Ambient light strength
    pub ambient_strength: f32,
    /// Sun diffuse strength
    pub diffuse_strength: f32,
    /// Multiplier on point light intensities
    pub point_light_scale: f32,
    /// Multiplier on particle sizes
    pub particle_size_scale: f32,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            sky_color: 0x87CEEB,
            fog_near: 100.0,
            fog_far: 400.0,
            light_dir: [100.0, 100.0, 50.0],
            ambient_strength: 0.45,
            diffuse_strength: 0.8,
            point_light_scale: 0.5,
            particle_size_scale: 1.0,
        }
    }
}

impl RenderingConfig {
    /// Sky color in linear RGB
    pub fn sky_linear(&self) -> [f32; 3] {
        let [r, g, b, _] = Material::from_hex(self.sky_color).base_color;
        [r, g, b]
    }
}

/// Scene generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for the terrain noise and object scatter
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self { seed: 1944 }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Show frame rate and camera distance in the window title
    pub show_stats: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_stats: false,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
