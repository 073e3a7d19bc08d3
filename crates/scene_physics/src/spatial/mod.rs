//! Spatial partitioning for the collision broad phase

pub mod octree;

pub use octree::{Octree, OctreeEntry};
