//! Scene arena: node storage, deferred hierarchy changes and world transforms
//!
//! Structural changes never take effect in the middle of a traversal. New
//! roots, new children and new components are staged in pending queues and
//! promoted at the start of the next [`Scene::update`] that reaches them.
//! Lookups see staged items immediately, so something added this frame can
//! be queried this frame.

use std::collections::HashSet;

use log::{debug, trace, warn};

use crate::debug::DebugDrawSystem;
use crate::foundation::collections::{ComponentId, NodeId, NodeMap};
use crate::foundation::math::{safe_component_div, translation_of, Mat4, Point3, Quat, Transform, Vec3};
use crate::physics::Collision;

use super::component::{Component, ComponentContext, ComponentSlot};
use super::error::SceneError;
use super::node::Node;
use super::transform::LocalTransform;

/// Owner of every node in a scene
pub struct Scene {
    nodes: NodeMap<Node>,
    roots: Vec<NodeId>,
    pending_roots: Vec<NodeId>,
    next_component_id: u64,
    debug_draw: DebugDrawSystem,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self {
            nodes: NodeMap::with_key(),
            roots: Vec::new(),
            pending_roots: Vec::new(),
            next_component_id: 0,
            debug_draw: DebugDrawSystem::new(),
        }
    }

    // ----- nodes -----

    /// Create a root node; it joins the live roots on the next update
    pub fn add_node(&mut self, transform: Transform) -> NodeId {
        let id = self.nodes.insert(Node::new(LocalTransform::new(transform)));
        self.pending_roots.push(id);
        trace!("Staged root node {:?}", id);
        id
    }

    /// Create a root node at a position
    pub fn add_node_at(&mut self, position: Vec3) -> NodeId {
        self.add_node(Transform::from_position(position))
    }

    /// Create a named root node
    pub fn add_named_node(&mut self, name: impl Into<String>, transform: Transform) -> NodeId {
        let id = self.add_node(transform);
        if let Some(node) = self.nodes.get_mut(id) {
            node.name = name.into();
        }
        id
    }

    /// Whether the handle still resolves
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Borrow a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutably borrow a node
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Number of nodes in the arena, staged ones included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Live root nodes
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Root nodes staged for the next update
    pub fn pending_roots(&self) -> &[NodeId] {
        &self.pending_roots
    }

    /// Attach `child` under `parent`
    ///
    /// The child is detached from its previous parent (or the root list)
    /// immediately and joins `parent`'s live children when `parent` is next
    /// updated. Attaching a node under itself or under one of its own
    /// descendants is rejected and leaves the hierarchy untouched.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if parent == child {
            warn!("Refusing to parent node {:?} to itself", child);
            return Err(SceneError::SelfParent(child));
        }
        if !self.contains(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        if !self.contains(child) {
            return Err(SceneError::NodeNotFound(child));
        }
        if self.would_create_cycle(parent, child) {
            warn!("Cyclic hierarchy detected, not attaching {:?} under {:?}", child, parent);
            return Err(SceneError::CyclicHierarchy { parent, child });
        }

        self.detach(child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.pending_children.push(child);
        }
        Ok(())
    }

    /// Attach under `parent`, or move back to the scene roots with `None`
    ///
    /// A node returned to the roots is staged like a freshly created one.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        match parent {
            Some(parent) => self.add_child(parent, child),
            None => {
                if !self.contains(child) {
                    return Err(SceneError::NodeNotFound(child));
                }
                self.detach(child);
                self.pending_roots.push(child);
                Ok(())
            }
        }
    }

    /// Whether attaching `child` under `parent` would close a loop
    ///
    /// Walks live and staged children below `child` looking for `parent`.
    pub fn would_create_cycle(&self, parent: NodeId, child: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut on_stack = HashSet::new();
        self.reaches(child, parent, &mut visited, &mut on_stack)
    }

    fn reaches(
        &self,
        current: NodeId,
        target: NodeId,
        visited: &mut HashSet<NodeId>,
        on_stack: &mut HashSet<NodeId>,
    ) -> bool {
        if current == target || on_stack.contains(&current) {
            return true;
        }
        if !visited.insert(current) {
            return false;
        }

        on_stack.insert(current);
        let found = self.nodes.get(current).map_or(false, |node| {
            node.all_children()
                .any(|next| self.reaches(next, target, visited, on_stack))
        });
        on_stack.remove(&current);
        found
    }

    /// Unlink a node from its parent or from the root lists
    fn detach(&mut self, id: NodeId) {
        self.roots.retain(|&root| root != id);
        self.pending_roots.retain(|&root| root != id);

        let parent = self.nodes.get_mut(id).and_then(|node| node.parent.take());
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.unlink_child(id);
        }
    }

    /// Remove a node and its whole subtree; returns whether the node existed
    ///
    /// Every handle into the subtree stops resolving.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            debug!("remove_node on expired handle {:?}", id);
            return false;
        }

        self.detach(id);
        let mut doomed = vec![id];
        let mut index = 0;
        while index < doomed.len() {
            let current = doomed[index];
            if let Some(node) = self.nodes.get(current) {
                doomed.extend(node.all_children());
            }
            index += 1;
        }

        debug!("Removing {} node(s) rooted at {:?}", doomed.len(), id);
        for node in doomed {
            self.nodes.remove(node);
        }
        true
    }

    /// First node with the given name, depth-first over the live hierarchy
    ///
    /// Staged roots and staged children are not searched.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if node.name == name {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    // ----- components -----

    /// Attach a component; it starts updating once its node is next updated
    ///
    /// `on_attach` runs immediately and the component is visible to
    /// [`get_component`](Self::get_component) straight away.
    pub fn add_component<T: Component>(&mut self, id: NodeId, mut component: T) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))?;
        let slot_id = ComponentId(self.next_component_id);
        self.next_component_id += 1;

        component.on_attach(id);
        node.pending_components.push(ComponentSlot::new(slot_id, Box::new(component)));
        Ok(())
    }

    /// First component of type `T` on a node
    ///
    /// A component whose own callback is currently running is not visible.
    pub fn get_component<T: Component>(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id)?.get_component::<T>()
    }

    /// Mutable variant of [`get_component`](Self::get_component)
    pub fn get_component_mut<T: Component>(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id)?.get_component_mut::<T>()
    }

    /// Whether a node carries a component of type `T`
    pub fn has_component<T: Component>(&self, id: NodeId) -> bool {
        self.nodes.get(id).map_or(false, Node::has_component::<T>)
    }

    /// Remove the first component of type `T`; returns whether one was removed
    pub fn remove_component<T: Component>(&mut self, id: NodeId) -> bool {
        self.nodes.get_mut(id).map_or(false, Node::remove_component::<T>)
    }

    /// Run a callback on one component with the scene unlocked
    ///
    /// The component is lifted out of its slot for the duration of the call
    /// and put back by id afterwards, unless the callback removed it.
    fn with_component<F>(&mut self, node: NodeId, slot: ComponentId, callback: F)
    where
        F: FnOnce(&mut dyn Component, &mut ComponentContext<'_>, &mut bool),
    {
        let taken = self
            .nodes
            .get_mut(node)
            .and_then(|n| n.slot_mut(slot))
            .and_then(|s| s.component.take().map(|c| (c, s.awake)));
        let Some((mut component, mut awake)) = taken else {
            return;
        };

        {
            let mut ctx = ComponentContext { scene: self, node };
            callback(&mut *component, &mut ctx, &mut awake);
        }

        match self.nodes.get_mut(node).and_then(|n| n.slot_mut(slot)) {
            Some(restored) => {
                restored.component = Some(component);
                restored.awake = awake;
            }
            None => trace!("Component {:?} on {:?} was removed during its callback", slot, node),
        }
    }

    // ----- frame -----

    /// Advance one frame
    ///
    /// Promotes staged roots, then walks the live hierarchy depth-first. Each
    /// node promotes its staged children and components, wakes components
    /// that have not run yet, updates them in insertion order and recurses.
    pub fn update(&mut self, dt: f32) {
        self.debug_draw.update(dt);

        for id in std::mem::take(&mut self.pending_roots) {
            if self.contains(id) {
                self.roots.push(id);
            }
        }

        for id in self.roots.clone() {
            self.update_node(id, dt);
        }
    }

    fn update_node(&mut self, id: NodeId, dt: f32) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.flush_pending();
        let slots: Vec<ComponentId> = node.components.iter().map(|slot| slot.id).collect();

        for slot in slots {
            self.with_component(id, slot, |component, ctx, awake| {
                if !*awake {
                    *awake = true;
                    component.awake(ctx);
                }
                component.update(ctx, dt);
            });
        }

        let Some(children) = self.nodes.get(id).map(|node| node.children.clone()) else {
            return;
        };
        for child in children {
            self.update_node(child, dt);
        }
    }

    /// Deliver a collision to every component on a node, live or staged
    pub fn dispatch_collision(&mut self, id: NodeId, collision: &Collision) {
        let Some(node) = self.nodes.get(id) else {
            debug!("Collision for expired node {:?} dropped", id);
            return;
        };

        for slot in node.slot_ids() {
            self.with_component(id, slot, |component, ctx, _| component.on_collision(ctx, collision));
        }
    }

    // ----- world space -----

    /// Composed world matrix (ancestors' local matrices times this one's)
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let node = self.nodes.get(id)?;
        let local = node.transform.matrix();
        Some(match node.parent.and_then(|parent| self.world_matrix(parent)) {
            Some(parent) => parent * local,
            None => local,
        })
    }

    fn parent_world_matrix(&self, id: NodeId) -> Option<Mat4> {
        self.nodes.get(id)?.parent.and_then(|parent| self.world_matrix(parent))
    }

    /// World position (translation of the world matrix)
    pub fn position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id).map(|matrix| translation_of(&matrix))
    }

    /// World rotation (product of ancestor rotations)
    pub fn rotation(&self, id: NodeId) -> Option<Quat> {
        let node = self.nodes.get(id)?;
        let local = node.transform.rotation();
        Some(match node.parent.and_then(|parent| self.rotation(parent)) {
            Some(parent) => parent * local,
            None => local,
        })
    }

    /// World scale (component-wise product of ancestor scales)
    pub fn scale(&self, id: NodeId) -> Option<Vec3> {
        let node = self.nodes.get(id)?;
        let local = node.transform.scale();
        Some(match node.parent.and_then(|parent| self.scale(parent)) {
            Some(parent) => parent.component_mul(&local),
            None => local,
        })
    }

    /// Move a node so its world position becomes `position`
    pub fn set_position(&mut self, id: NodeId, position: Vec3) {
        let local = match self.parent_world_matrix(id) {
            Some(parent) => match parent.try_inverse() {
                Some(inverse) => inverse.transform_point(&Point3::from(position)).coords,
                None => {
                    warn!("Parent of {:?} has a singular world matrix, using position as local", id);
                    position
                }
            },
            None => position,
        };

        match self.nodes.get_mut(id) {
            Some(node) => node.transform.set_position(local),
            None => debug!("set_position on expired handle {:?}", id),
        }
    }

    /// Rotate a node so its world rotation becomes `rotation`
    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) {
        let parent = self.nodes.get(id).and_then(|node| node.parent).and_then(|p| self.rotation(p));
        let local = match parent {
            Some(parent) => parent.inverse() * rotation,
            None => rotation,
        };

        match self.nodes.get_mut(id) {
            Some(node) => node.transform.set_rotation(local),
            None => debug!("set_rotation on expired handle {:?}", id),
        }
    }

    /// Scale a node so its world scale becomes `scale`
    ///
    /// Axes where an ancestor's scale has collapsed to zero keep the
    /// requested value as the local scale.
    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) {
        let parent = self.nodes.get(id).and_then(|node| node.parent).and_then(|p| self.scale(p));
        let local = match parent {
            Some(parent) => safe_component_div(&scale, &parent),
            None => scale,
        };

        match self.nodes.get_mut(id) {
            Some(node) => node.transform.set_scale(local),
            None => debug!("set_scale on expired handle {:?}", id),
        }
    }

    /// Offset the world position
    pub fn translate(&mut self, id: NodeId, delta: Vec3) {
        if let Some(position) = self.position(id) {
            self.set_position(id, position + delta);
        }
    }

    /// Apply a world-space rotation on top of the current one
    pub fn rotate(&mut self, id: NodeId, delta: Quat) {
        if let Some(rotation) = self.rotation(id) {
            self.set_rotation(id, delta * rotation);
        }
    }

    /// Multiply the world scale component-wise
    pub fn scale_by(&mut self, id: NodeId, factor: Vec3) {
        if let Some(scale) = self.scale(id) {
            self.set_scale(id, scale.component_mul(&factor));
        }
    }

    /// World-space forward direction (+Z basis of the world matrix)
    pub fn forward(&self, id: NodeId) -> Option<Vec3> {
        self.basis_direction(id, 2)
    }

    /// World-space right direction (+X basis of the world matrix)
    pub fn right(&self, id: NodeId) -> Option<Vec3> {
        self.basis_direction(id, 0)
    }

    /// World-space up direction (+Y basis of the world matrix)
    pub fn up(&self, id: NodeId) -> Option<Vec3> {
        self.basis_direction(id, 1)
    }

    fn basis_direction(&self, id: NodeId, column: usize) -> Option<Vec3> {
        let matrix = self.world_matrix(id)?;
        let axis = matrix.fixed_view::<3, 1>(0, column).into_owned();
        Some(axis.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros))
    }

    // ----- debug -----

    /// Debug shapes emitted during the last update
    pub fn debug_draw(&self) -> &DebugDrawSystem {
        &self.debug_draw
    }

    /// Mutable access to the debug shape queue
    pub fn debug_draw_mut(&mut self) -> &mut DebugDrawSystem {
        &mut self.debug_draw
    }
}
