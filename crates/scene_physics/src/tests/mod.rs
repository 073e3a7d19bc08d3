//! Whole-tick scenarios exercising the scene, broad phase, narrow phase and
//! resolver together


use crate::foundation::collections::NodeId;
use crate::foundation::logging;
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::physics::{Collider, Rigidbody};
use crate::Simulation;

pub(crate) const DT: f32 = 1.0 / 60.0;

/// Node with a collider and, optionally, a rigidbody
pub(crate) fn spawn_box(sim: &mut Simulation, position: Vec3, scale: Vec3, body: Option<Rigidbody>) -> NodeId {
    logging::init();
    let node = sim.scene.add_node(Transform::new(position, Quat::identity(), scale));
    sim.physics
        .add_collider(&mut sim.scene, node, Collider::default())
        .unwrap();
    if let Some(body) = body {
        sim.physics.add_rigidbody(&mut sim.scene, node, body).unwrap();
    }
    node
}
