//! Point-sprite particle systems
//!
//! Positions and colors are flat `[x, y, z, x, y, z, ...]` buffers so they can
//! be uploaded to the GPU as-is. The base positions are captured once at
//! construction and never change.

use diorama_math::Vec3;

/// A fixed-size cloud of point particles
#[derive(Clone, Debug)]
pub struct ParticleSystem {
    /// Optional name (for lookup and logging)
    pub name: Option<String>,
    positions: Vec<f32>,
    colors: Vec<f32>,
    base_positions: Vec<f32>,
    /// Point size in world units
    pub size: f32,
    /// Opacity multiplier applied to every particle
    pub opacity: f32,
    /// Additive blending instead of alpha blending
    pub additive: bool,
    dirty: bool,
}

impl ParticleSystem {
    /// Create a particle system from flat position and color buffers
    ///
    /// Trailing coordinates that do not form a whole particle are dropped,
    /// and missing colors default to white.
    pub fn new(mut positions: Vec<f32>, mut colors: Vec<f32>) -> Self {
        let whole = positions.len() - positions.len() % 3;
        if whole != positions.len() {
            log::warn!("Particle buffer length {} is not a multiple of 3, truncating", positions.len());
            positions.truncate(whole);
        }
        colors.resize(whole, 1.0);

        Self {
            name: None,
            base_positions: positions.clone(),
            positions,
            colors,
            size: 1.0,
            opacity: 1.0,
            additive: false,
            dirty: true,
        }
    }

    /// Create a particle system from per-particle points and colors
    pub fn from_points(points: &[Vec3], colors: &[Vec3]) -> Self {
        let positions = points.iter().flat_map(|p| p.to_array()).collect();
        let colors = colors.iter().flat_map(|c| c.to_array()).collect();
        Self::new(positions, colors)
    }

    /// Set the name of this particle system
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the point size
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Set the opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Use additive blending
    pub fn with_additive(mut self, additive: bool) -> Self {
        self.additive = additive;
        self
    }

    /// Number of particles
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Current flat position buffer
    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Mutable flat position buffer; marks the system dirty
    #[inline]
    pub fn positions_mut(&mut self) -> &mut [f32] {
        self.dirty = true;
        &mut self.positions
    }

    /// Flat RGB color buffer
    #[inline]
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Positions captured at construction
    #[inline]
    pub fn base_positions(&self) -> &[f32] {
        &self.base_positions
    }

    /// Position of particle `index`
    pub fn position(&self, index: usize) -> Option<Vec3> {
        let i = index * 3;
        self.positions
            .get(i..i + 3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
    }

    /// Color of particle `index`
    pub fn color(&self, index: usize) -> Option<Vec3> {
        let i = index * 3;
        self.colors
            .get(i..i + 3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
    }

    /// Whether the position buffer changed since the last upload
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag the position buffer for re-upload
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the dirty flag after upload
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_captures_base_positions() {
        let mut system = ParticleSystem::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![0.5; 6]);
        assert_eq!(system.particle_count(), 2);

        system.positions_mut()[1] = 99.0;
        assert_eq!(system.positions()[1], 99.0);
        assert_eq!(system.base_positions()[1], 2.0);
    }

    #[test]
    fn test_truncates_partial_particle() {
        let system = ParticleSystem::new(vec![1.0, 2.0, 3.0, 4.0], vec![]);
        assert_eq!(system.particle_count(), 1);
        assert_eq!(system.colors(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_from_points() {
        let system = ParticleSystem::from_points(
            &[Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)],
            &[Vec3::new(1.0, 0.5, 0.0), Vec3::new(1.0, 0.8, 0.0)],
        );
        assert_eq!(system.position(1), Some(Vec3::new(4.0, 5.0, 6.0)));
        assert_eq!(system.color(0), Some(Vec3::new(1.0, 0.5, 0.0)));
        assert_eq!(system.position(2), None);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut system = ParticleSystem::new(vec![0.0; 3], vec![0.0; 3]);
        assert!(system.is_dirty());
        system.clear_dirty();
        assert!(!system.is_dirty());
        let _ = system.positions_mut();
        assert!(system.is_dirty());
    }

    #[test]
    fn test_builders() {
        let system = ParticleSystem::new(vec![0.0; 3], vec![0.0; 3])
            .with_name("smoke")
            .with_size(3.0)
            .with_opacity(0.4)
            .with_additive(true);
        assert_eq!(system.name.as_deref(), Some("smoke"));
        assert_eq!(system.size, 3.0);
        assert_eq!(system.opacity, 0.4);
        assert!(system.additive);
    }
}
