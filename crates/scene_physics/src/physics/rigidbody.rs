//! Rigidbody component and per-tick integration

use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Quat, Vec3};
use crate::scene::{Component, Scene};

/// Persisted fields of a rigidbody
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidbodySettings {
    /// Mass; zero or less makes the body static
    pub mass: f32,
    /// Per-tick velocity scale factor
    pub drag: f32,
}

impl Default for RigidbodySettings {
    fn default() -> Self {
        Self { mass: 1.0, drag: 0.98 }
    }
}

/// Displacement produced by one integration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// World-space translation to apply
    pub translation: Vec3,
    /// World-space rotation to apply on top of the current one
    pub rotation: Quat,
}

/// Linear and angular motion state of a node
#[derive(Debug, Clone, PartialEq)]
pub struct Rigidbody {
    owner: Option<NodeId>,

    /// Linear velocity in world units per second
    pub velocity: Vec3,

    /// Angular velocity as a scaled rotation axis, radians per second
    pub angular_velocity: Vec3,

    /// Mass; zero or less makes the body static
    pub mass: f32,

    /// Per-tick velocity scale factor, applied regardless of `dt`
    pub drag: f32,

    /// Whether gravity accelerates this body
    pub use_gravity: bool,
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self::from_settings(&RigidbodySettings::default())
    }
}

impl Rigidbody {
    /// Body with the given mass and drag, gravity enabled, at rest
    pub fn new(mass: f32, drag: f32) -> Self {
        Self {
            owner: None,
            velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            mass,
            drag,
            use_gravity: true,
        }
    }

    /// Body that collision resolution never moves
    pub fn new_static() -> Self {
        Self::new(0.0, 1.0).with_gravity(false)
    }

    /// Build from persisted fields
    pub fn from_settings(settings: &RigidbodySettings) -> Self {
        Self::new(settings.mass, settings.drag)
    }

    /// Persisted fields of this body
    pub fn settings(&self) -> RigidbodySettings {
        RigidbodySettings {
            mass: self.mass,
            drag: self.drag,
        }
    }

    /// Builder pattern: Enable or disable gravity
    pub fn with_gravity(mut self, use_gravity: bool) -> Self {
        self.use_gravity = use_gravity;
        self
    }

    /// Builder pattern: Set initial linear velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder pattern: Set initial angular velocity
    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Node this body is attached to
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    /// Whether the body is immovable
    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }

    /// Reciprocal mass, zero for a static body
    pub fn inverse_mass(&self) -> f32 {
        if self.is_static() {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Change velocity by `impulse / mass`
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse * self.inverse_mass();
    }

    /// Scale both velocities by the drag factor, snapping slow ones to zero
    pub fn apply_drag(&mut self, rest_threshold: f32) {
        self.velocity = damp(self.velocity, self.drag, rest_threshold);
        self.angular_velocity = damp(self.angular_velocity, self.drag, rest_threshold);
    }

    /// Advance one tick and return the displacement for the owner
    ///
    /// Drag is applied first, then the (dragged) velocity moves the body, then
    /// gravity accelerates it for the next tick.
    pub fn integrate(&mut self, dt: f32, config: &PhysicsConfig) -> Motion {
        self.apply_drag(config.rest_velocity_threshold);

        let motion = Motion {
            translation: self.velocity * dt,
            rotation: Quat::from_scaled_axis(self.angular_velocity * dt),
        };

        if self.use_gravity {
            self.velocity.y -= config.gravity * dt;
        }
        motion
    }

    /// Box moment of inertia from the owner's world scale
    pub fn compute_inertia(&self, scene: &Scene) -> f32 {
        let scale = self
            .owner
            .and_then(|owner| scene.scale(owner))
            .unwrap_or_else(Vec3::zeros);
        self.mass / 12.0 * scale.magnitude_squared()
    }
}

fn damp(velocity: Vec3, drag: f32, rest_threshold: f32) -> Vec3 {
    if velocity.magnitude() > rest_threshold {
        velocity * drag
    } else {
        Vec3::zeros()
    }
}

impl Component for Rigidbody {
    fn on_attach(&mut self, owner: NodeId) {
        self.owner = Some(owner);
    }
}
