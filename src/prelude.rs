//! Crate's core types reimports.

pub use crate::{
    bounding::{Aabb, Cube, Point, Real},
    collision::{CollisionPolicy, RadiusPolicy},
    config::{ConfigError, MergePolicy, TreeConfig},
    export::Snapshot,
    game::{Direction, MoveOutcome},
    load::{LoadError, LoadReport},
    node::NodeType,
    shared::SharedOctree,
    tree::Octree,
    NodeId, TreeError,
};

#[cfg(feature = "bevy")]
pub use crate::bevy_integration::HitResult;
