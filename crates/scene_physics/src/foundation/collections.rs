//! Specialized collection types

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle to a scene node
    ///
    /// A handle stays valid until its node is removed from the scene; after
    /// that every lookup through it resolves to nothing.
    pub struct NodeId;
}

/// Handle-based map of scene nodes
pub type NodeMap<T> = SlotMap<NodeId, T>;

/// Identifier of one component slot, unique within a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u64);
