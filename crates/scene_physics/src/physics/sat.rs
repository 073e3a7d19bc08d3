//! Separating-axis narrow phase for box colliders

use crate::foundation::math::Vec3;

use super::collider::Collider;

/// Outcome of a separating-axis test
///
/// A zero `mtv` means the shapes do not overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatProjection {
    /// Minimum translation vector, pointing from the first shape toward the second
    pub mtv: Vec3,
    /// Unit direction of `mtv`, zero when there is no overlap
    pub normal: Vec3,
    /// Penetration depth along `normal`
    pub overlap: f32,
    /// First shape's closest corner to the second shape's center shifted by `mtv`
    pub point: Vec3,
}

impl SatProjection {
    /// The non-colliding result
    pub fn none() -> Self {
        Self {
            mtv: Vec3::zeros(),
            normal: Vec3::zeros(),
            overlap: 0.0,
            point: Vec3::zeros(),
        }
    }

    /// Whether the shapes overlap
    pub fn did_collide(&self) -> bool {
        self.mtv != Vec3::zeros()
    }
}

/// Test two colliders along every candidate axis of both
///
/// Any axis whose projections do not overlap proves separation and ends the
/// test. Otherwise the first axis with the strictly smallest overlap becomes
/// the push-out direction, oriented from `a`'s center toward `b`'s. Touching
/// shapes (zero overlap) and shapes without geometry do not collide.
///
/// Both colliders must have been refreshed against their owners' transforms.
pub fn sat_project(a: &Collider, b: &Collider) -> SatProjection {
    let mut best: Option<(Vec3, f32)> = None;

    for axis in a.world_axes().iter().chain(b.world_axes()) {
        let (Some((min_a, max_a)), Some((min_b, max_b))) = (a.project(axis), b.project(axis)) else {
            return SatProjection::none();
        };

        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap <= 0.0 {
            return SatProjection::none();
        }
        if best.map_or(true, |(_, smallest)| overlap < smallest) {
            best = Some((*axis, overlap));
        }
    }

    let Some((axis, overlap)) = best else {
        return SatProjection::none();
    };

    let toward_b = b.world_center() - a.world_center();
    let normal = if axis.dot(&toward_b) < 0.0 { -axis } else { axis };
    let mtv = normal * overlap;

    SatProjection {
        mtv,
        normal,
        overlap,
        point: a.closest_point_to(&(b.world_center() + mtv)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Transform};
    use crate::scene::Scene;
    use approx::assert_relative_eq;

    fn collider_at(scene: &mut Scene, transform: Transform) -> Collider {
        let node = scene.add_node(transform);
        scene.add_component(node, Collider::default()).unwrap();
        let mut collider = scene.get_component::<Collider>(node).unwrap().clone();
        collider.transform_collider(scene);
        collider
    }

    fn unit_at(scene: &mut Scene, position: Vec3) -> Collider {
        collider_at(scene, Transform::from_position(position))
    }

    #[test]
    fn test_co_located_unit_boxes() {
        let mut scene = Scene::new();
        let a = unit_at(&mut scene, Vec3::zeros());
        let b = unit_at(&mut scene, Vec3::zeros());

        let projection = sat_project(&a, &b);
        assert!(projection.did_collide());
        // First minimal axis is the edge from corner 0 to corner 1
        assert_relative_eq!(projection.mtv, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(projection.overlap, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_co_located_scaled_boxes_push_along_thinnest_extent() {
        let mut scene = Scene::new();
        let scaled = Transform::new(Vec3::zeros(), Quat::identity(), Vec3::new(2.0, 1.0, 3.0));
        let a = collider_at(&mut scene, scaled);
        let b = collider_at(&mut scene, scaled);

        let projection = sat_project(&a, &b);
        assert_relative_eq!(projection.mtv, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_separated_boxes_do_not_collide() {
        let mut scene = Scene::new();
        let a = unit_at(&mut scene, Vec3::zeros());
        let b = unit_at(&mut scene, Vec3::new(3.0, 0.2, 0.0));

        assert!(!a.world_bounds().intersects(&b.world_bounds()));
        let projection = sat_project(&a, &b);
        assert!(!projection.did_collide());
        assert_eq!(projection, SatProjection::none());
    }

    #[test]
    fn test_touching_boxes_do_not_collide() {
        let mut scene = Scene::new();
        let a = unit_at(&mut scene, Vec3::zeros());
        let b = unit_at(&mut scene, Vec3::new(1.0, 0.0, 0.0));

        assert!(!sat_project(&a, &b).did_collide());
    }

    #[test]
    fn test_mtv_points_from_a_toward_b() {
        let mut scene = Scene::new();
        let floor = collider_at(
            &mut scene,
            Transform::new(Vec3::new(0.0, -1.0, 0.0), Quat::identity(), Vec3::new(4.0, 1.0, 4.0)),
        );
        let crate_box = unit_at(&mut scene, Vec3::new(0.0, -0.2, 0.0));

        let down_into_floor = sat_project(&floor, &crate_box);
        assert_relative_eq!(down_into_floor.mtv, Vec3::new(0.0, 0.2, 0.0), epsilon = 1e-5);
        assert_relative_eq!(down_into_floor.normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);

        let reversed = sat_project(&crate_box, &floor);
        assert_relative_eq!(reversed.mtv, Vec3::new(0.0, -0.2, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_contact_point_is_a_corner_of_a() {
        let mut scene = Scene::new();
        let floor = collider_at(
            &mut scene,
            Transform::new(Vec3::new(0.0, -1.0, 0.0), Quat::identity(), Vec3::new(4.0, 1.0, 4.0)),
        );
        let crate_box = unit_at(&mut scene, Vec3::new(0.0, -0.2, 0.0));

        let projection = sat_project(&floor, &crate_box);
        assert!(floor.world_points().contains(&projection.point));
        // Top corners tie; the first in corner order wins
        assert_relative_eq!(projection.point, Vec3::new(2.0, -0.5, 2.0), epsilon = 1e-5);
    }

    #[test]
    fn test_empty_collider_never_collides() {
        let mut scene = Scene::new();
        let a = unit_at(&mut scene, Vec3::zeros());
        let detached = Collider::default();

        assert!(!sat_project(&a, &detached).did_collide());
        assert!(!sat_project(&detached, &detached).did_collide());
    }
}
