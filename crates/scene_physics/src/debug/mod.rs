//! Debug visualization
//!
//! Collects line and box primitives emitted by colliders and the octree so a
//! renderer can pick them up after each tick.

pub mod draw;

pub use draw::{DebugDrawSystem, DebugShape};
