//! Physics simulation context
//!
//! Owns the broad-phase octree, the tunables and flat tracking lists of the
//! nodes that carry colliders and rigidbodies. One [`PhysicsSystem::update`]
//! runs the whole tick: integrate, rebuild the octree, detect, resolve and
//! notify.

use log::{debug, trace};

use crate::config::{ConfigError, PhysicsConfig};
use crate::foundation::collections::NodeId;
use crate::foundation::math::Quat;
use crate::scene::{Scene, SceneError};
use crate::spatial::Octree;

use super::collider::Collider;
use super::collision::Collision;
use super::resolution::resolve_collision_discrete;
use super::rigidbody::Rigidbody;
use super::sat::sat_project;

/// Broad phase, narrow phase and integrator for one scene
pub struct PhysicsSystem {
    config: PhysicsConfig,
    octree: Octree,
    colliders: Vec<NodeId>,
    rigidbodies: Vec<NodeId>,

    /// Outline occupied octree cells in the scene's debug queue every tick
    pub draw_octree: bool,
}

impl PhysicsSystem {
    /// Create a physics context; the configuration is validated first
    pub fn new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            octree: Octree::from_config(&config),
            config,
            colliders: Vec::new(),
            rigidbodies: Vec::new(),
            draw_octree: false,
        })
    }

    /// Active tunables
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Octree as built by the last update
    pub fn octree(&self) -> &Octree {
        &self.octree
    }

    /// Nodes tracked as carrying a collider
    pub fn colliders(&self) -> &[NodeId] {
        &self.colliders
    }

    /// Nodes tracked as carrying a rigidbody
    pub fn rigidbodies(&self) -> &[NodeId] {
        &self.rigidbodies
    }

    /// Attach a collider to a node and start tracking it
    pub fn add_collider(&mut self, scene: &mut Scene, node: NodeId, collider: Collider) -> Result<(), SceneError> {
        scene.add_component(node, collider)?;
        self.track_collider(node);
        Ok(())
    }

    /// Attach a rigidbody to a node and start tracking it
    pub fn add_rigidbody(&mut self, scene: &mut Scene, node: NodeId, body: Rigidbody) -> Result<(), SceneError> {
        scene.add_component(node, body)?;
        self.track_rigidbody(node);
        Ok(())
    }

    /// Track a node whose collider was attached directly through the scene
    pub fn track_collider(&mut self, node: NodeId) {
        if !self.colliders.contains(&node) {
            self.colliders.push(node);
        }
    }

    /// Track a node whose rigidbody was attached directly through the scene
    pub fn track_rigidbody(&mut self, node: NodeId) {
        if !self.rigidbodies.contains(&node) {
            self.rigidbodies.push(node);
        }
    }

    /// Drop tracked nodes that were removed or lost their component
    ///
    /// Returns how many entries were dropped.
    pub fn prune(&mut self, scene: &Scene) -> usize {
        let before = self.colliders.len() + self.rigidbodies.len();
        self.colliders.retain(|&node| scene.has_component::<Collider>(node));
        self.rigidbodies.retain(|&node| scene.has_component::<Rigidbody>(node));

        let dropped = before - self.colliders.len() - self.rigidbodies.len();
        if dropped > 0 {
            debug!("Pruned {} expired physics tracking entries", dropped);
        }
        dropped
    }

    /// Run one physics tick and return the number of collisions handled
    ///
    /// Every rigidbody is integrated before any detection runs. The octree is
    /// rebuilt from every tracked collider, then each collider queries its
    /// world bounds and is tested against every candidate. Resolution is a
    /// single discrete pass in tracking order, so a pair can be visited from
    /// both sides within one tick; each visit reads freshly refreshed
    /// geometry. Each resolved collision is delivered to the candidate's
    /// components first and then to the querying node's. Every tracked
    /// collider is refreshed once more at the end, so caches read after the
    /// tick match the resolved positions.
    pub fn update(&mut self, scene: &mut Scene, dt: f32) -> usize {
        self.prune(scene);
        self.integrate(scene, dt);
        self.rebuild_octree(scene);

        let mut collisions = 0;
        for node in self.colliders.clone() {
            if !refresh_collider(scene, node) {
                continue;
            }
            let Some(area) = scene.get_component::<Collider>(node).map(Collider::world_bounds) else {
                continue;
            };

            for other in self.octree.query(&area) {
                if other == node {
                    continue;
                }
                if !refresh_collider(scene, node) || !refresh_collider(scene, other) {
                    continue;
                }

                let projection = match (
                    scene.get_component::<Collider>(node),
                    scene.get_component::<Collider>(other),
                ) {
                    (Some(a), Some(b)) => sat_project(a, b),
                    _ => continue,
                };
                if !projection.did_collide() {
                    continue;
                }

                let collision = Collision::new(node, other, &projection);
                resolve_collision_discrete(scene, &collision, &self.config);
                scene.dispatch_collision(other, &collision);
                scene.dispatch_collision(node, &collision);
                collisions += 1;
            }
        }

        for &node in &self.colliders {
            refresh_collider(scene, node);
        }

        trace!("Physics tick handled {} collision(s)", collisions);
        collisions
    }

    fn integrate(&mut self, scene: &mut Scene, dt: f32) {
        for &node in &self.rigidbodies {
            let Some(body) = scene.get_component_mut::<Rigidbody>(node) else {
                continue;
            };
            if body.is_static() {
                continue;
            }

            let motion = body.integrate(dt, &self.config);
            scene.translate(node, motion.translation);
            if motion.rotation != Quat::identity() {
                scene.rotate(node, motion.rotation);
            }
        }
    }

    fn rebuild_octree(&mut self, scene: &mut Scene) {
        self.octree.clear();
        for &node in &self.colliders {
            self.octree.insert_node(scene, node);
        }

        if self.draw_octree {
            self.octree.draw(scene.debug_draw_mut(), 0.0);
        }
    }
}

/// Bring a node's collider cache up to date; false if it has no usable geometry
fn refresh_collider(scene: &mut Scene, node: NodeId) -> bool {
    let world = scene.world_matrix(node);
    match scene.get_component_mut::<Collider>(node) {
        Some(collider) => {
            collider.refresh(world);
            collider.has_geometry()
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Transform, Vec3};
    use approx::assert_relative_eq;

    fn system() -> PhysicsSystem {
        PhysicsSystem::new(PhysicsConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PhysicsConfig::default().with_octree(-1, 8);
        assert!(matches!(PhysicsSystem::new(config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_tracking_is_deduplicated() {
        let mut scene = Scene::new();
        let mut physics = system();
        let node = scene.add_node_at(Vec3::zeros());

        physics.add_collider(&mut scene, node, Collider::default()).unwrap();
        physics.track_collider(node);
        assert_eq!(physics.colliders(), &[node]);
    }

    #[test]
    fn test_add_to_missing_node_fails() {
        let mut scene = Scene::new();
        let mut physics = system();
        let node = scene.add_node_at(Vec3::zeros());
        scene.remove_node(node);

        assert_eq!(
            physics.add_rigidbody(&mut scene, node, Rigidbody::default()),
            Err(SceneError::NodeNotFound(node))
        );
        assert!(physics.rigidbodies().is_empty());
    }

    #[test]
    fn test_prune_drops_removed_nodes() {
        let mut scene = Scene::new();
        let mut physics = system();
        let kept = scene.add_node_at(Vec3::zeros());
        let removed = scene.add_node_at(Vec3::new(10.0, 0.0, 0.0));
        physics.add_collider(&mut scene, kept, Collider::default()).unwrap();
        physics.add_collider(&mut scene, removed, Collider::default()).unwrap();
        physics.add_rigidbody(&mut scene, removed, Rigidbody::default()).unwrap();

        scene.remove_node(removed);
        assert_eq!(physics.prune(&scene), 2);
        assert_eq!(physics.colliders(), &[kept]);
        assert!(physics.rigidbodies().is_empty());
    }

    #[test]
    fn test_integration_runs_before_detection() {
        let mut scene = Scene::new();
        let mut physics = system();
        let falling = scene.add_node_at(Vec3::new(0.0, 5.0, 0.0));
        physics
            .add_rigidbody(&mut scene, falling, Rigidbody::new(1.0, 1.0).with_velocity(Vec3::new(0.0, -6.0, 0.0)))
            .unwrap();

        let collisions = physics.update(&mut scene, 0.5);
        assert_eq!(collisions, 0);
        assert_relative_eq!(scene.position(falling).unwrap(), Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_octree_rebuilt_from_tracked_colliders() {
        let mut scene = Scene::new();
        let mut physics = system();
        for x in 0..5 {
            let node = scene.add_node(Transform::from_position(Vec3::new(x as f32 * 3.0, 0.0, 0.0)));
            physics.add_collider(&mut scene, node, Collider::default()).unwrap();
        }

        assert_eq!(physics.update(&mut scene, 1.0 / 60.0), 0);
        assert_eq!(physics.octree().query(&physics.config().world_bounds()).len(), 5);
    }

    #[test]
    fn test_overlapping_static_colliders_still_report() {
        let mut scene = Scene::new();
        let mut physics = system();
        let a = scene.add_node_at(Vec3::zeros());
        let b = scene.add_node_at(Vec3::new(0.5, 0.0, 0.0));
        physics.add_collider(&mut scene, a, Collider::default()).unwrap();
        physics.add_collider(&mut scene, b, Collider::default()).unwrap();

        // Seen once from each side; neither node moves
        assert_eq!(physics.update(&mut scene, 1.0 / 60.0), 2);
        assert_relative_eq!(scene.position(a).unwrap(), Vec3::zeros());
        assert_relative_eq!(scene.position(b).unwrap(), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_collider_cache_matches_resolved_position() {
        let mut scene = Scene::new();
        let mut physics = system();
        let ground = scene.add_node_at(Vec3::zeros());
        let resting = scene.add_node_at(Vec3::new(0.0, 0.6, 0.0));
        physics.add_collider(&mut scene, ground, Collider::default()).unwrap();
        physics.add_collider(&mut scene, resting, Collider::default()).unwrap();
        physics
            .add_rigidbody(&mut scene, resting, Rigidbody::new(1.0, 1.0).with_gravity(false))
            .unwrap();

        assert!(physics.update(&mut scene, 1.0 / 60.0) > 0);

        let position = scene.position(resting).unwrap();
        assert!(position.y > 0.6);
        let collider = scene.get_component::<Collider>(resting).unwrap();
        assert_relative_eq!(collider.world_center(), position, epsilon = 1e-5);
        assert_relative_eq!(collider.world_bounds().min.y, position.y - 0.5, epsilon = 1e-5);
        assert!(!collider.is_dirty(&scene));
    }

    #[test]
    fn test_draw_octree_outlines_cells() {
        let mut scene = Scene::new();
        let mut physics = system();
        physics.draw_octree = true;
        let node = scene.add_node_at(Vec3::zeros());
        physics.add_collider(&mut scene, node, Collider::default()).unwrap();

        physics.update(&mut scene, 1.0 / 60.0);
        assert_eq!(scene.debug_draw().shape_count(), 1);
    }
}
