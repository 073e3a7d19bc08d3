//! Collision event record

use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec3;

use super::sat::SatProjection;

/// One resolved overlap between two nodes
///
/// Handed to the collision callbacks of both participants and then dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Node whose collider ran the query
    pub a: NodeId,
    /// Candidate node returned by the broad phase
    pub b: NodeId,
    /// Minimum translation vector, pointing from `a` toward `b`
    pub mtv: Vec3,
    /// Unit direction of `mtv`
    pub normal: Vec3,
    /// Approximate contact point
    pub point: Vec3,
}

impl Collision {
    /// Record an overlap found by the narrow phase
    pub fn new(a: NodeId, b: NodeId, projection: &SatProjection) -> Self {
        Self {
            a,
            b,
            mtv: projection.mtv,
            normal: projection.normal,
            point: projection.point,
        }
    }

    /// Penetration depth along the normal
    pub fn depth(&self) -> f32 {
        self.mtv.magnitude()
    }

    /// The participant that is not `node`
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// Whether `node` takes part in this collision
    pub fn involves(&self, node: NodeId) -> bool {
        node == self.a || node == self.b
    }
}
