//! Collision detection, response and rigidbody integration
//!
//! The tick runs in a fixed order: integrate every rigidbody, rebuild the
//! octree from every collider-owning node, then for each collider query the
//! octree, run SAT against each candidate, resolve overlaps and notify both
//! nodes' components.

pub mod collider;
pub mod collision;
pub mod resolution;
pub mod rigidbody;
pub mod sat;
pub mod system;

pub use collider::{BoxColliderSettings, Collider};
pub use collision::Collision;
pub use resolution::{classify, resolve_collision_discrete, ContactKind};
pub use rigidbody::{Motion, Rigidbody, RigidbodySettings};
pub use sat::{sat_project, SatProjection};
pub use system::PhysicsSystem;
