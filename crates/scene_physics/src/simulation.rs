//! Frame driver tying the scene and the physics system together

use crate::config::{ConfigError, PhysicsConfig};
use crate::physics::PhysicsSystem;
use crate::scene::Scene;

/// A scene plus the physics context that simulates it
///
/// Construct one at startup and call [`tick`](Self::tick) once per frame.
pub struct Simulation {
    /// The simulated scene
    pub scene: Scene,
    /// Physics context for `scene`
    pub physics: PhysicsSystem,
}

impl Simulation {
    /// Empty scene with a physics context built from `config`
    pub fn new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            scene: Scene::new(),
            physics: PhysicsSystem::new(config)?,
        })
    }

    /// Advance one frame: scene update (flush, awake, component update), then physics
    ///
    /// Returns the number of collisions handled by the physics step.
    pub fn tick(&mut self, dt: f32) -> usize {
        self.scene.update(dt);
        self.physics.update(&mut self.scene, dt)
    }
}
