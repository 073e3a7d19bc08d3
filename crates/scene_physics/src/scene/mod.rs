//! Scene graph: nodes, transforms and behavior components

pub mod bounding_box;
pub mod component;
pub mod error;
pub mod node;
pub mod scene_graph;
pub mod transform;

pub use bounding_box::BoundingBox;
pub use component::{downcast_mut, downcast_ref, AsAny, Component, ComponentContext};
pub use error::SceneError;
pub use node::Node;
pub use scene_graph::Scene;
pub use transform::LocalTransform;
