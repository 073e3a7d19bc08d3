//! Box collider component
//!
//! A collider owns eight local corner points and caches their world-space
//! image, the separating axes derived from them and their bounds. The cache is
//! keyed on the owner's full world matrix and is rebuilt only when that matrix
//! changes, so refreshing twice in a row is a no-op.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::debug::draw::COLLIDER_COLOR;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Mat4, Point3, Vec3, Vec4};
use crate::scene::{BoundingBox, Component, ComponentContext, Scene};

/// Corner sign pattern, in the order the local points are stored
const CORNER_SIGNS: [[f32; 3]; 8] = [
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
];

/// Directions shorter than this are not usable as separating axes
const AXIS_EPSILON: f32 = 1e-6;

/// Persisted fields of a box collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxColliderSettings {
    /// Offset of the box center in the owner's local space
    pub center: Vec3,
    /// Full edge lengths of the box in the owner's local space
    pub size: Vec3,
}

impl Default for BoxColliderSettings {
    fn default() -> Self {
        Self {
            center: Vec3::zeros(),
            size: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Box-shaped collision volume attached to a node
#[derive(Debug, Clone)]
pub struct Collider {
    owner: Option<NodeId>,
    center: Vec3,
    size: Vec3,
    local_points: [Vec3; 8],

    world_points: Vec<Vec3>,
    world_axes: Vec<Vec3>,
    world_bounds: BoundingBox,
    world_center: Vec3,
    /// World matrix the cache was built from; `None` means never built or owner gone
    last_world: Option<Mat4>,

    /// Push the box wireframe into the scene's debug queue every update
    pub draw_collider: bool,
    /// Wireframe color
    pub gizmo_color: Vec4,
}

impl Default for Collider {
    fn default() -> Self {
        Self::from_settings(&BoxColliderSettings::default())
    }
}

impl Collider {
    /// Box with the given local center offset and full edge lengths
    pub fn new(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        let local_points = CORNER_SIGNS.map(|[x, y, z]| center + half.component_mul(&Vec3::new(x, y, z)));

        Self {
            owner: None,
            center,
            size,
            local_points,
            world_points: Vec::new(),
            world_axes: Vec::new(),
            world_bounds: BoundingBox::from_point(center),
            world_center: center,
            last_world: None,
            draw_collider: false,
            gizmo_color: COLLIDER_COLOR,
        }
    }

    /// Build from persisted fields
    pub fn from_settings(settings: &BoxColliderSettings) -> Self {
        Self::new(settings.center, settings.size)
    }

    /// Persisted fields of this collider
    pub fn settings(&self) -> BoxColliderSettings {
        BoxColliderSettings {
            center: self.center,
            size: self.size,
        }
    }

    /// Builder pattern: Enable wireframe drawing
    pub fn with_debug_draw(mut self, color: Vec4) -> Self {
        self.draw_collider = true;
        self.gizmo_color = color;
        self
    }

    /// Node this collider is attached to
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    /// Local center offset
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Full local edge lengths
    pub fn size(&self) -> Vec3 {
        self.size
    }

    /// Corner points in the owner's local space
    pub fn local_points(&self) -> &[Vec3; 8] {
        &self.local_points
    }

    /// Whether the cache disagrees with the owner's current world matrix
    pub fn is_dirty(&self, scene: &Scene) -> bool {
        self.owner.and_then(|owner| scene.world_matrix(owner)) != self.last_world
    }

    /// Bring the world-space cache up to date with the owner's transform
    pub fn transform_collider(&mut self, scene: &Scene) {
        let world = self.owner.and_then(|owner| scene.world_matrix(owner));
        self.refresh(world);
    }

    /// Rebuild the cache from a world matrix, or empty it for a missing owner
    ///
    /// Returns whether anything was recomputed.
    pub fn refresh(&mut self, world: Option<Mat4>) -> bool {
        if world == self.last_world {
            return false;
        }
        self.last_world = world;

        let Some(world) = world else {
            self.world_points.clear();
            self.world_axes.clear();
            self.world_bounds = BoundingBox::from_point(Vec3::zeros());
            self.world_center = Vec3::zeros();
            return true;
        };

        self.world_points.clear();
        self.world_points.extend(
            self.local_points
                .iter()
                .map(|point| world.transform_point(&Point3::from(*point)).coords),
        );
        if self.world_points.iter().any(|point| point.iter().any(|c| c.is_nan())) {
            warn!("Collider on {:?} produced NaN world points", self.owner);
        }

        self.world_axes.clear();
        for (i, a) in self.world_points.iter().enumerate() {
            for b in &self.world_points[i + 1..] {
                if let Some(axis) = (b - a).try_normalize(AXIS_EPSILON) {
                    self.world_axes.push(axis);
                }
            }
        }

        self.world_bounds = BoundingBox::from_points(&self.world_points)
            .unwrap_or_else(|| BoundingBox::from_point(Vec3::zeros()));
        self.world_center = world.transform_point(&Point3::from(self.center)).coords;
        true
    }

    /// Corner points in world space as of the last refresh
    pub fn world_points(&self) -> &[Vec3] {
        &self.world_points
    }

    /// Separating-axis candidates: normalized directions between every pair of world points
    ///
    /// A box yields up to 28 candidates, only three of which are face
    /// normals. Zero-length directions are skipped.
    pub fn world_axes(&self) -> &[Vec3] {
        &self.world_axes
    }

    /// Axis-aligned box around the world points
    pub fn world_bounds(&self) -> BoundingBox {
        self.world_bounds
    }

    /// World position of the box center
    pub fn world_center(&self) -> Vec3 {
        self.world_center
    }

    /// Whether the cache holds any world geometry
    pub fn has_geometry(&self) -> bool {
        !self.world_points.is_empty()
    }

    /// Projection extents `(min, max)` of the world points on an axis
    pub fn project(&self, axis: &Vec3) -> Option<(f32, f32)> {
        let mut points = self.world_points.iter().map(|point| point.dot(axis));
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), value| (min.min(value), max.max(value))))
    }

    /// World point of this collider nearest to `target`
    ///
    /// Returns the zero vector when there are no world points.
    pub fn closest_point_to(&self, target: &Vec3) -> Vec3 {
        let closest = self.world_points.iter().min_by(|a, b| {
            (*a - target)
                .magnitude_squared()
                .total_cmp(&(*b - target).magnitude_squared())
        });

        match closest {
            Some(point) => *point,
            None => {
                warn!("Closest point requested from collider {:?} with no world points", self.owner);
                Vec3::zeros()
            }
        }
    }

    /// The 12 box edges in world space
    pub fn edges(&self) -> Vec<(Vec3, Vec3)> {
        if self.world_points.len() != CORNER_SIGNS.len() {
            return Vec::new();
        }

        let mut edges = Vec::with_capacity(12);
        for i in 0..CORNER_SIGNS.len() {
            for j in i + 1..CORNER_SIGNS.len() {
                let differing = (0..3).filter(|&axis| CORNER_SIGNS[i][axis] != CORNER_SIGNS[j][axis]).count();
                if differing == 1 {
                    edges.push((self.world_points[i], self.world_points[j]));
                }
            }
        }
        edges
    }
}

impl Component for Collider {
    fn on_attach(&mut self, owner: NodeId) {
        self.owner = Some(owner);
        self.last_world = None;
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, _dt: f32) {
        if self.is_dirty(ctx.scene) {
            self.transform_collider(ctx.scene);
        }

        if self.draw_collider {
            let debug = ctx.scene.debug_draw_mut();
            for (start, end) in self.edges() {
                debug.draw_line(start, end, self.gizmo_color, 0.0);
            }
        }
    }
}
