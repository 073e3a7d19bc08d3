//! Behavior components attached to scene nodes
//!
//! Components are stored as trait objects and looked up by concrete type.
//! While a component's callback runs it is lifted out of its slot, so the
//! callback may freely mutate the scene (including its own node) through the
//! [`ComponentContext`].

use std::any::Any;

use crate::foundation::collections::{ComponentId, NodeId};
use crate::physics::Collision;

use super::Scene;

/// Object-safe access to [`Any`] for component downcasting
pub trait AsAny {
    /// Borrow as [`Any`]
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as [`Any`]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Scene access handed to component callbacks
pub struct ComponentContext<'a> {
    /// The scene the owning node lives in
    pub scene: &'a mut Scene,
    /// The node that owns the component
    pub node: NodeId,
}

/// Pluggable node behavior
///
/// Every hook has a no-op default so a component implements only what it
/// reacts to.
pub trait Component: AsAny + 'static {
    /// Called once when the component is attached, before it is staged
    fn on_attach(&mut self, _owner: NodeId) {}

    /// Called once, right before the first [`update`](Self::update)
    fn awake(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called every scene update
    fn update(&mut self, _ctx: &mut ComponentContext<'_>, _dt: f32) {}

    /// Called when the owning node takes part in a resolved collision
    fn on_collision(&mut self, _ctx: &mut ComponentContext<'_>, _collision: &Collision) {}
}

/// Downcast a component trait object to its concrete type
pub fn downcast_ref<T: Component>(component: &dyn Component) -> Option<&T> {
    component.as_any().downcast_ref::<T>()
}

/// Mutably downcast a component trait object to its concrete type
pub fn downcast_mut<T: Component>(component: &mut dyn Component) -> Option<&mut T> {
    component.as_any_mut().downcast_mut::<T>()
}

/// One component together with its lifecycle bookkeeping
pub(crate) struct ComponentSlot {
    pub(crate) id: ComponentId,
    pub(crate) awake: bool,
    /// `None` while the component is lifted out for a callback
    pub(crate) component: Option<Box<dyn Component>>,
}

impl ComponentSlot {
    pub(crate) fn new(id: ComponentId, component: Box<dyn Component>) -> Self {
        Self {
            id,
            awake: false,
            component: Some(component),
        }
    }

    pub(crate) fn get<T: Component>(&self) -> Option<&T> {
        downcast_ref::<T>(self.component.as_deref()?)
    }

    pub(crate) fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        downcast_mut::<T>(self.component.as_deref_mut()?)
    }

    pub(crate) fn is<T: Component>(&self) -> bool {
        self.get::<T>().is_some()
    }
}
