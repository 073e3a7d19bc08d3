//! Scene node: one entity's placement and ownership in the hierarchy

use crate::foundation::collections::{ComponentId, NodeId};

use super::component::{Component, ComponentSlot};
use super::transform::LocalTransform;

/// A transform in the scene hierarchy together with its components
///
/// Nodes live in the [`Scene`](super::Scene) arena. Parent and child links are
/// plain handles; a handle whose node was removed simply stops resolving.
pub struct Node {
    /// Display name, used by [`Scene::find_by_name`](super::Scene::find_by_name)
    pub name: String,
    pub(crate) transform: LocalTransform,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) pending_children: Vec<NodeId>,
    pub(crate) components: Vec<ComponentSlot>,
    pub(crate) pending_components: Vec<ComponentSlot>,
}

impl Node {
    pub(crate) fn new(transform: LocalTransform) -> Self {
        Self {
            name: String::new(),
            transform,
            parent: None,
            children: Vec::new(),
            pending_children: Vec::new(),
            components: Vec::new(),
            pending_components: Vec::new(),
        }
    }

    /// Parent-relative transform
    pub fn local_transform(&self) -> &LocalTransform {
        &self.transform
    }

    /// Mutable parent-relative transform
    pub fn local_transform_mut(&mut self) -> &mut LocalTransform {
        &mut self.transform
    }

    /// Parent handle, if attached under another node
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Live children, in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Children staged by `add_child` and not yet flushed
    pub fn pending_children(&self) -> &[NodeId] {
        &self.pending_children
    }

    /// Number of live components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of components staged and not yet flushed
    pub fn pending_component_count(&self) -> usize {
        self.pending_components.len()
    }

    /// First component of type `T`, searching live components then the pending queue
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.all_slots().find_map(ComponentSlot::get::<T>)
    }

    /// Mutable variant of [`get_component`](Self::get_component)
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .iter_mut()
            .chain(self.pending_components.iter_mut())
            .find_map(ComponentSlot::get_mut::<T>)
    }

    /// Whether a component of type `T` is attached (live or pending)
    pub fn has_component<T: Component>(&self) -> bool {
        self.all_slots().any(ComponentSlot::is::<T>)
    }

    /// Promote staged children and components into the live lists
    pub(crate) fn flush_pending(&mut self) {
        self.children.append(&mut self.pending_children);
        self.components.append(&mut self.pending_components);
    }

    pub(crate) fn all_slots(&self) -> impl Iterator<Item = &ComponentSlot> {
        self.components.iter().chain(self.pending_components.iter())
    }

    pub(crate) fn slot_ids(&self) -> Vec<ComponentId> {
        self.all_slots().map(|slot| slot.id).collect()
    }

    pub(crate) fn slot_mut(&mut self, id: ComponentId) -> Option<&mut ComponentSlot> {
        self.components
            .iter_mut()
            .chain(self.pending_components.iter_mut())
            .find(|slot| slot.id == id)
    }

    /// Remove the first component of type `T`; returns whether one was found
    pub(crate) fn remove_component<T: Component>(&mut self) -> bool {
        if let Some(index) = self.components.iter().position(ComponentSlot::is::<T>) {
            self.components.remove(index);
            return true;
        }
        if let Some(index) = self.pending_components.iter().position(ComponentSlot::is::<T>) {
            self.pending_components.remove(index);
            return true;
        }
        false
    }

    /// Drop a child link from both the live and the pending list
    pub(crate) fn unlink_child(&mut self, child: NodeId) {
        self.children.retain(|&id| id != child);
        self.pending_children.retain(|&id| id != child);
    }

    /// Live and pending children
    pub(crate) fn all_children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().chain(self.pending_children.iter()).copied()
    }
}
