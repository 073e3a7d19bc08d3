//! Discrete impulse-based collision response

use log::trace;

use crate::config::PhysicsConfig;
use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec3;
use crate::scene::Scene;

use super::collision::Collision;
use super::rigidbody::Rigidbody;

/// How a collision was classified by the mass of its participants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Neither side can move; nothing is done
    BothStatic,
    /// Only `a` can move
    DynamicStatic,
    /// Only `b` can move
    StaticDynamic,
    /// Both sides move apart and exchange an impulse
    DynamicDynamic,
}

/// Whether a node carries a rigidbody with positive mass
pub fn is_dynamic(scene: &Scene, node: NodeId) -> bool {
    scene
        .get_component::<Rigidbody>(node)
        .map_or(false, |body| !body.is_static())
}

/// Classify a collision by which participants can move
pub fn classify(scene: &Scene, collision: &Collision) -> ContactKind {
    match (is_dynamic(scene, collision.a), is_dynamic(scene, collision.b)) {
        (false, false) => ContactKind::BothStatic,
        (true, false) => ContactKind::DynamicStatic,
        (false, true) => ContactKind::StaticDynamic,
        (true, true) => ContactKind::DynamicDynamic,
    }
}

/// Separate the participants of one collision and adjust their velocities
///
/// A static participant never moves. Against a static body the dynamic one
/// takes half the MTV and loses `static_normal_damping` of its velocity along
/// the normal. Two dynamic bodies each take half the MTV in opposite
/// directions and exchange an equal and opposite impulse that cancels their
/// relative normal velocity.
pub fn resolve_collision_discrete(scene: &mut Scene, collision: &Collision, config: &PhysicsConfig) -> ContactKind {
    let kind = classify(scene, collision);
    trace!("Resolving {:?} contact between {:?} and {:?}", kind, collision.a, collision.b);

    match kind {
        ContactKind::BothStatic => {}
        ContactKind::DynamicStatic => {
            resolve_static_dynamic(scene, collision.a, -collision.mtv, config.static_normal_damping);
        }
        ContactKind::StaticDynamic => {
            resolve_static_dynamic(scene, collision.b, collision.mtv, config.static_normal_damping);
        }
        ContactKind::DynamicDynamic => resolve_dynamic_dynamic(scene, collision.a, collision.b, collision.mtv),
    }
    kind
}

/// Push a dynamic body out of a static one along `push`
///
/// The normal damping is not scaled by mass, so the normal speed never grows.
fn resolve_static_dynamic(scene: &mut Scene, dynamic: NodeId, push: Vec3, damping: f32) {
    let Some(normal) = push.try_normalize(f32::EPSILON) else {
        return;
    };

    scene.translate(dynamic, push * 0.5);
    if let Some(body) = scene.get_component_mut::<Rigidbody>(dynamic) {
        let along_normal = body.velocity.dot(&normal);
        body.velocity -= normal * along_normal * damping;
    }
}

/// Split two dynamic bodies apart and exchange a normal impulse
fn resolve_dynamic_dynamic(scene: &mut Scene, a: NodeId, b: NodeId, mtv: Vec3) {
    let Some(normal) = mtv.try_normalize(f32::EPSILON) else {
        return;
    };

    scene.translate(a, -mtv * 0.5);
    scene.translate(b, mtv * 0.5);

    let (Some((velocity_a, inverse_a)), Some((velocity_b, inverse_b))) = (motion_state(scene, a), motion_state(scene, b)) else {
        return;
    };

    let inverse_sum = inverse_a + inverse_b;
    if inverse_sum <= 0.0 {
        return;
    }
    let impulse = (velocity_b - velocity_a).dot(&normal) / inverse_sum;

    if let Some(body) = scene.get_component_mut::<Rigidbody>(a) {
        body.apply_impulse(normal * impulse);
    }
    if let Some(body) = scene.get_component_mut::<Rigidbody>(b) {
        body.apply_impulse(-normal * impulse);
    }
}

fn motion_state(scene: &Scene, node: NodeId) -> Option<(Vec3, f32)> {
    scene
        .get_component::<Rigidbody>(node)
        .map(|body| (body.velocity, body.inverse_mass()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn body_at(scene: &mut Scene, position: Vec3, body: Option<Rigidbody>) -> NodeId {
        let node = scene.add_node_at(position);
        if let Some(body) = body {
            scene.add_component(node, body).unwrap();
        }
        node
    }

    fn collision(a: NodeId, b: NodeId, mtv: Vec3) -> Collision {
        Collision {
            a,
            b,
            mtv,
            normal: mtv.normalize(),
            point: Vec3::zeros(),
        }
    }

    #[test]
    fn test_static_body_is_never_moved() {
        let mut scene = Scene::new();
        let config = PhysicsConfig::default();
        let floor = body_at(&mut scene, Vec3::new(0.0, -1.0, 0.0), Some(Rigidbody::new_static()));
        let dynamic = body_at(
            &mut scene,
            Vec3::new(0.0, -0.2, 0.0),
            Some(Rigidbody::new(3.0, 0.98).with_velocity(Vec3::new(0.0, -1.0, 0.0))),
        );

        let kind = resolve_collision_discrete(&mut scene, &collision(floor, dynamic, Vec3::new(0.0, 0.2, 0.0)), &config);
        assert_eq!(kind, ContactKind::StaticDynamic);
        assert_relative_eq!(scene.position(floor).unwrap(), Vec3::new(0.0, -1.0, 0.0));
        assert_relative_eq!(scene.position(dynamic).unwrap(), Vec3::new(0.0, -0.1, 0.0), epsilon = 1e-6);
        let velocity = scene.get_component::<Rigidbody>(dynamic).unwrap().velocity;
        assert_relative_eq!(velocity, Vec3::new(0.0, -0.2, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_normal_velocity_is_only_ever_reduced() {
        let config = PhysicsConfig::default();
        let cases = [
            Vec3::new(0.0, -3.0, 0.0),
            Vec3::new(2.0, -1.0, 0.5),
            Vec3::new(0.0, 4.0, 0.0),
            Vec3::new(-1.0, 0.0, 1.0),
        ];

        for initial in cases {
            let mut scene = Scene::new();
            let anchor = body_at(&mut scene, Vec3::zeros(), None);
            let dynamic = body_at(&mut scene, Vec3::new(0.0, 0.8, 0.0), Some(Rigidbody::new(1.0, 1.0).with_velocity(initial)));
            let normal = Vec3::y();

            resolve_collision_discrete(&mut scene, &collision(dynamic, anchor, -normal * 0.2), &config);
            let after = scene.get_component::<Rigidbody>(dynamic).unwrap().velocity;
            assert!(after.dot(&normal).abs() <= initial.dot(&normal).abs() + 1e-6);
            // Tangential motion is untouched
            assert_relative_eq!(after.x, initial.x);
            assert_relative_eq!(after.z, initial.z);
        }
    }

    #[test]
    fn test_dynamic_static_moves_a_away_from_b() {
        let mut scene = Scene::new();
        let config = PhysicsConfig::default();
        let dynamic = body_at(&mut scene, Vec3::new(0.0, 0.8, 0.0), Some(Rigidbody::new(1.0, 1.0)));
        let anchor = body_at(&mut scene, Vec3::zeros(), None);

        let kind = resolve_collision_discrete(&mut scene, &collision(dynamic, anchor, Vec3::new(0.0, -0.2, 0.0)), &config);
        assert_eq!(kind, ContactKind::DynamicStatic);
        assert_relative_eq!(scene.position(dynamic).unwrap(), Vec3::new(0.0, 0.9, 0.0), epsilon = 1e-6);
        assert_relative_eq!(scene.position(anchor).unwrap(), Vec3::zeros());
    }

    #[test]
    fn test_both_static_is_a_no_op() {
        let mut scene = Scene::new();
        let config = PhysicsConfig::default();
        let a = body_at(&mut scene, Vec3::zeros(), Some(Rigidbody::new_static()));
        let b = body_at(&mut scene, Vec3::new(0.5, 0.0, 0.0), None);

        let kind = resolve_collision_discrete(&mut scene, &collision(a, b, Vec3::new(0.5, 0.0, 0.0)), &config);
        assert_eq!(kind, ContactKind::BothStatic);
        assert_relative_eq!(scene.position(a).unwrap(), Vec3::zeros());
        assert_relative_eq!(scene.position(b).unwrap(), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_dynamic_pair_splits_mtv_and_exchanges_impulse() {
        let mut scene = Scene::new();
        let config = PhysicsConfig::default();
        let a = body_at(
            &mut scene,
            Vec3::new(-0.4, 0.0, 0.0),
            Some(Rigidbody::new(1.0, 1.0).with_velocity(Vec3::new(2.0, 0.0, 0.0))),
        );
        let b = body_at(
            &mut scene,
            Vec3::new(0.4, 0.0, 0.0),
            Some(Rigidbody::new(1.0, 1.0).with_velocity(Vec3::new(-2.0, 0.0, 0.0))),
        );

        let kind = resolve_collision_discrete(&mut scene, &collision(a, b, Vec3::new(0.2, 0.0, 0.0)), &config);
        assert_eq!(kind, ContactKind::DynamicDynamic);
        assert_relative_eq!(scene.position(a).unwrap(), Vec3::new(-0.5, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(scene.position(b).unwrap(), Vec3::new(0.5, 0.0, 0.0), epsilon = 1e-6);

        let va = scene.get_component::<Rigidbody>(a).unwrap().velocity;
        let vb = scene.get_component::<Rigidbody>(b).unwrap().velocity;
        assert_relative_eq!(va.x, -vb.x, epsilon = 1e-6);
        assert_relative_eq!(va, Vec3::zeros(), epsilon = 1e-6);
    }

    #[test]
    fn test_dynamic_pair_conserves_momentum_with_unequal_masses() {
        let mut scene = Scene::new();
        let config = PhysicsConfig::default();
        let a = body_at(
            &mut scene,
            Vec3::zeros(),
            Some(Rigidbody::new(3.0, 1.0).with_velocity(Vec3::new(1.0, 0.0, 0.0))),
        );
        let b = body_at(
            &mut scene,
            Vec3::new(0.9, 0.0, 0.0),
            Some(Rigidbody::new(1.0, 1.0).with_velocity(Vec3::new(-1.0, 0.0, 0.0))),
        );

        resolve_collision_discrete(&mut scene, &collision(a, b, Vec3::new(0.1, 0.0, 0.0)), &config);
        let va = scene.get_component::<Rigidbody>(a).unwrap().velocity;
        let vb = scene.get_component::<Rigidbody>(b).unwrap().velocity;

        // 3 * 1 + 1 * -1 before the contact
        assert_relative_eq!(3.0 * va.x + vb.x, 2.0, epsilon = 1e-5);
        assert!(vb.x >= va.x - 1e-5);
    }
}
