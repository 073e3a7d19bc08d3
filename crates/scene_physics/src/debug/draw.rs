//! Debug drawing primitives and the per-scene shape queue

use crate::foundation::math::{Vec3, Vec4};

/// Color used for collider wireframes
pub const COLLIDER_COLOR: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);

/// Color used for octree cell outlines
pub const OCTREE_COLOR: Vec4 = Vec4::new(1.0, 1.0, 0.0, 1.0);

/// Debug shape primitives that can be rendered for visualization
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Line segment from start to end
    Line {
        start: Vec3,
        end: Vec3,
        color: Vec4,
        duration: f32,
    },

    /// Axis-aligned box at center with half-extents
    Box {
        center: Vec3,
        extents: Vec3,
        color: Vec4,
        duration: f32,
    },
}

impl DebugShape {
    /// Remaining lifetime in seconds
    pub fn duration(&self) -> f32 {
        match self {
            DebugShape::Line { duration, .. } | DebugShape::Box { duration, .. } => *duration,
        }
    }

    /// Decrease duration by delta_time, returns true if expired
    pub fn tick(&mut self, delta_time: f32) -> bool {
        match self {
            DebugShape::Line { duration, .. } | DebugShape::Box { duration, .. } => {
                *duration -= delta_time;
                *duration <= 0.0
            }
        }
    }
}

/// Queue of debug shapes owned by a scene
///
/// Shapes drawn with a zero duration live for exactly one frame: they are
/// visible to whoever reads the queue after the tick that produced them and
/// expire at the start of the next one.
#[derive(Debug)]
pub struct DebugDrawSystem {
    shapes: Vec<DebugShape>,

    /// Master enable/disable flag
    pub enabled: bool,
}

impl DebugDrawSystem {
    /// Create an enabled, empty queue
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            enabled: true,
        }
    }

    /// Draw a line segment
    pub fn draw_line(&mut self, start: Vec3, end: Vec3, color: Vec4, duration: f32) {
        if !self.enabled {
            return;
        }

        self.shapes.push(DebugShape::Line {
            start,
            end,
            color,
            duration,
        });
    }

    /// Draw an axis-aligned box
    pub fn draw_box(&mut self, center: Vec3, extents: Vec3, color: Vec4, duration: f32) {
        if !self.enabled {
            return;
        }

        self.shapes.push(DebugShape::Box {
            center,
            extents,
            color,
            duration,
        });
    }

    /// Age every shape and drop the expired ones
    pub fn update(&mut self, delta_time: f32) {
        self.shapes.retain_mut(|shape| !shape.tick(delta_time));
    }

    /// Shapes currently queued
    pub fn shapes(&self) -> &[DebugShape] {
        if !self.enabled {
            return &[];
        }
        &self.shapes
    }

    /// Take every queued shape, leaving the queue empty
    pub fn drain(&mut self) -> Vec<DebugShape> {
        std::mem::take(&mut self.shapes)
    }

    /// Number of queued shapes
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Drop every queued shape
    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_shape_expiration() {
        let mut system = DebugDrawSystem::new();

        system.draw_box(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), OCTREE_COLOR, 1.0);
        assert_eq!(system.shape_count(), 1);

        system.update(0.5);
        assert_eq!(system.shape_count(), 1);

        // Total 1.1 seconds
        system.update(0.6);
        assert_eq!(system.shape_count(), 0);
    }

    #[test]
    fn test_zero_duration_lives_one_frame() {
        let mut system = DebugDrawSystem::new();
        system.draw_line(Vec3::zeros(), Vec3::x(), COLLIDER_COLOR, 0.0);

        assert_eq!(system.shapes().len(), 1);
        system.update(1.0 / 60.0);
        assert!(system.shapes().is_empty());
    }

    #[test]
    fn test_disabled_system_ignores_draws() {
        let mut system = DebugDrawSystem::new();
        system.enabled = false;
        system.draw_line(Vec3::zeros(), Vec3::y(), COLLIDER_COLOR, 5.0);

        assert_eq!(system.shape_count(), 0);
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut system = DebugDrawSystem::new();
        system.draw_line(Vec3::zeros(), Vec3::z(), COLLIDER_COLOR, 0.0);
        system.draw_line(Vec3::zeros(), Vec3::x(), COLLIDER_COLOR, 0.0);

        let drained = system.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[0], DebugShape::Line { end, .. } if end == Vec3::z()));
        assert_eq!(system.shape_count(), 0);
    }
}
