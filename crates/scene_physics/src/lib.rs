//! # Scene Physics
//!
//! Scene graph, octree broad phase and separating-axis collision resolution
//! for a small real-time 3D engine.
//!
//! ## Features
//!
//! - **Scene Graph**: Arena-backed node hierarchy with lazily cached local
//!   transforms, world-space accessors and deferred insertion queues
//! - **Components**: Type-keyed behavior components with awake/update/collision hooks
//! - **Broad Phase**: Pooled octree rebuilt every tick
//! - **Narrow Phase**: Box-vs-box SAT with minimum translation vectors
//! - **Response**: Discrete impulse resolution for static and dynamic bodies
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_physics::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut sim = Simulation::new(PhysicsConfig::default())?;
//!
//!     let floor = sim.scene.add_node(Transform::new(
//!         Vec3::new(0.0, -1.0, 0.0),
//!         Quat::identity(),
//!         Vec3::new(10.0, 1.0, 10.0),
//!     ));
//!     sim.physics.add_collider(&mut sim.scene, floor, Collider::default())?;
//!
//!     let crate_box = sim.scene.add_node_at(Vec3::new(0.0, 3.0, 0.0));
//!     sim.physics.add_collider(&mut sim.scene, crate_box, Collider::default())?;
//!     sim.physics.add_rigidbody(&mut sim.scene, crate_box, Rigidbody::new(1.0, 0.98))?;
//!
//!     for _ in 0..600 {
//!         sim.tick(1.0 / 60.0);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod debug;
pub mod foundation;
pub mod physics;
pub mod scene;
pub mod simulation;
pub mod spatial;

#[cfg(test)]
mod tests;

pub use simulation::Simulation;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PhysicsConfig},
        debug::{DebugDrawSystem, DebugShape},
        foundation::{
            collections::NodeId,
            math::{Mat4, Quat, Transform, Vec3, Vec4},
        },
        physics::{
            BoxColliderSettings, Collider, Collision, PhysicsSystem, Rigidbody, RigidbodySettings,
        },
        scene::{BoundingBox, Component, ComponentContext, Scene, SceneError},
        spatial::Octree,
        Simulation,
    };
}
