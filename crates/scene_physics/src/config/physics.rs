//! Physics tunables

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::foundation::math::Vec3;
use crate::scene::BoundingBox;

/// Tunables for the physics system and its broad-phase octree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Recursion budget of the root octree cell (0 = the root never subdivides)
    pub octree_max_levels: i32,

    /// Object count a leaf cell may hold before it subdivides
    pub max_objects_per_cell: usize,

    /// Minimum corner of the world volume covered by the octree
    pub world_min: Vec3,

    /// Maximum corner of the world volume covered by the octree
    pub world_max: Vec3,

    /// Downward gravitational acceleration applied along -Y
    pub gravity: f32,

    /// Speed below which drag snaps a velocity to exactly zero
    pub rest_velocity_threshold: f32,

    /// Fraction of the normal velocity removed in a static-vs-dynamic contact
    pub static_normal_damping: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            octree_max_levels: 5,
            max_objects_per_cell: 8,
            world_min: Vec3::new(-1000.0, -1000.0, -1000.0),
            world_max: Vec3::new(1000.0, 1000.0, 1000.0),
            gravity: 9.81,
            rest_velocity_threshold: 0.0001,
            static_normal_damping: 0.8,
        }
    }
}

impl Config for PhysicsConfig {}

impl PhysicsConfig {
    /// World volume covered by the root octree cell
    pub fn world_bounds(&self) -> BoundingBox {
        BoundingBox::new(self.world_min, self.world_max)
    }

    /// Builder pattern: Set octree depth and subdivision threshold
    pub fn with_octree(mut self, max_levels: i32, max_objects_per_cell: usize) -> Self {
        self.octree_max_levels = max_levels;
        self.max_objects_per_cell = max_objects_per_cell;
        self
    }

    /// Builder pattern: Set gravity
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Check that every tunable is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.octree_max_levels < 0 {
            return Err(ConfigError::Invalid(format!(
                "octree_max_levels must not be negative (got {})",
                self.octree_max_levels
            )));
        }
        if self.max_objects_per_cell == 0 {
            return Err(ConfigError::Invalid(
                "max_objects_per_cell must be at least 1".to_string(),
            ));
        }
        let inverted = (0..3).any(|axis| self.world_min[axis] > self.world_max[axis]);
        if inverted {
            return Err(ConfigError::Invalid(format!(
                "world bounds are inverted: {}",
                self.world_bounds()
            )));
        }
        if !(0.0..=1.0).contains(&self.static_normal_damping) {
            return Err(ConfigError::Invalid(format!(
                "static_normal_damping must lie in [0, 1] (got {})",
                self.static_normal_damping
            )));
        }
        if self.rest_velocity_threshold < 0.0 {
            return Err(ConfigError::Invalid(
                "rest_velocity_threshold must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PhysicsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world_bounds().get_size(), Vec3::new(2000.0, 2000.0, 2000.0));
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = PhysicsConfig::from_toml_str(
            "octree_max_levels = 3\nmax_objects_per_cell = 2\nworld_min = [-10.0, -10.0, -10.0]\n",
        )
        .unwrap();

        assert_eq!(config.octree_max_levels, 3);
        assert_eq!(config.max_objects_per_cell, 2);
        assert_eq!(config.world_min, Vec3::new(-10.0, -10.0, -10.0));
        assert_eq!(config.world_max, PhysicsConfig::default().world_max);
        assert_eq!(config.gravity, 9.81);
    }

    #[test]
    fn test_ron_config() {
        let config = PhysicsConfig::from_ron_str("(gravity: 3.5, static_normal_damping: 0.5)").unwrap();
        assert_eq!(config.gravity, 3.5);
        assert_eq!(config.static_normal_damping, 0.5);
        assert_eq!(config.octree_max_levels, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let negative_depth = PhysicsConfig::default().with_octree(-1, 8);
        assert!(matches!(negative_depth.validate(), Err(ConfigError::Invalid(_))));

        let zero_threshold = PhysicsConfig::default().with_octree(4, 0);
        assert!(zero_threshold.validate().is_err());

        let inverted = PhysicsConfig {
            world_min: Vec3::new(1.0, 0.0, 0.0),
            world_max: Vec3::new(0.0, 1.0, 1.0),
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let damping = PhysicsConfig {
            static_normal_damping: 1.5,
            ..Default::default()
        };
        assert!(damping.validate().is_err());
    }

    #[test]
    fn test_missing_file_reports_io_error() {
        let result = PhysicsConfig::load_from_file("does/not/exist/physics.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_save_and_reload_both_formats() {
        let config = PhysicsConfig::default().with_octree(3, 4).with_gravity(1.62);
        let dir = std::env::temp_dir();

        for name in ["scene_physics_test.toml", "scene_physics_test.ron"] {
            let path = dir.join(name);
            let path = path.to_string_lossy();
            config.save_to_file(&path).unwrap();
            let reloaded = PhysicsConfig::load_from_file(&path).unwrap();
            let _ = std::fs::remove_file(&*path);
            assert_eq!(reloaded, config);
        }
    }

    #[test]
    fn test_save_rejects_unknown_extension() {
        let result = PhysicsConfig::default().save_to_file("physics.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
