//! Axis-aligned bounding volumes

use std::fmt;

use crate::foundation::math::Vec3;

/// Axis-Aligned Bounding Box used by the octree and collider bounds
///
/// All tests are boundary-inclusive; a zero-volume box is valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Vec3::zeros(),
            max: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl BoundingBox {
    /// Create a new bounding box from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Zero-volume box located at a single point, ready for [`expand`](Self::expand)
    pub fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Create a bounding box centered at a point with given half-extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest box enclosing every point, `None` for an empty slice
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::from_point(*first);
        for point in rest {
            bounds.expand(point);
        }
        Some(bounds)
    }

    /// Get the center of the bounding box
    pub fn get_center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the full size (max - min) of the bounding box
    pub fn get_size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get the extents (half-size) of the bounding box
    pub fn extents(&self) -> Vec3 {
        self.get_size() * 0.5
    }

    /// Check if this box contains a point
    pub fn contains(&self, point: &Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this box intersects another box (touching faces count)
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Widen the box so it includes a point
    pub fn expand(&mut self, point: &Vec3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Union of two boxes
    pub fn merge(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min: ({}, {}, {}) max: ({}, {}, {})",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        )
    }
}
