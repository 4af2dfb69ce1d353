//! Concurrent 3D point [`octree`](tree::Octree) with range, nearest neighbour
//! and collision-aware move queries.
//!
//! Points are plain `{x, y, z}` values over `f32` or `f64` and are identified
//! by their exact coordinates.
//!
//! ## Available methods:
//!
//! - ### Point operations
//!
//!   - [`Insertion`](tree::Octree::insert)
//!   - [`Removing`](tree::Octree::remove)
//!   - [`Searching`](tree::Octree::find)
//!
//! - ### Spatial queries
//!
//!   - [`Range query`](tree::Octree::range_query)
//!   - [`k nearest neighbours`](tree::Octree::nearest_neighbors)
//!   - [`Custom intersection`](tree::Octree::intersect_with)
//!
//! - ### Game layer
//!
//!   - [`Move with collision check`](tree::Octree::move_point)
//!   - [`Move by direction`](tree::Octree::move_by_direction)
//!   - [`Collision check`](tree::Octree::collision_check)
//!
//! - ### Rendering
//!
//!   - [`Structure export`](tree::Octree::export_structure)
//!
//! Share a tree between request handlers with [`SharedOctree`](shared::SharedOctree),
//! which serializes writers and lets readers run in parallel.
//!
//! To enable bevy integrations:
//!
//! ```toml
//! [dependencies]
//! pointree = { version = "0.1", features = ["bevy"] }
//! ```
//!
//! ## Optimizations:
//!
//! - Tree structure is represented by flat, reusable [`Pool`](`pool::Pool`).
//!   Nodes freed by merges are recycled.
//! - Few memory allocations. [`smallvec`] leaves and [`heapless`] traversal stacks.
//! - No smart pointers inside the tree ([`Rc`](`std::rc::Rc`), [`RefCell`](std::cell::RefCell) e.t.c)
//!
//! ## Example
//!
//! ```rust
//! use pointree::prelude::*;
//!
//! fn main() -> Result<(), TreeError> {
//!     let bounds = Cube::new(Point::zero(), 500.0)?;
//!     let mut tree = Octree::new(TreeConfig::new(bounds)).unwrap();
//!
//!     tree.insert(Point::new(0.0, 0.0, 0.0))?;
//!     tree.insert(Point::new(10.0, 10.0, 10.0))?;
//!     tree.insert(Point::new(500.0, 500.0, 500.0))?;
//!
//!     // Searching by position
//!     assert!(tree.contains(&Point::new(10.0, 10.0, 10.0)));
//!     assert_eq!(tree.find(&Point::new(1.0, 2.0, 8.0)), None);
//!
//!     // Range query
//!     let found = tree.range_query(Point::splat(-50.0), Point::splat(50.0))?;
//!     assert_eq!(found, vec![Point::zero(), Point::splat(10.0)]);
//!
//!     // Nearest neighbours
//!     let nearest = tree.nearest_neighbors(&Point::splat(400.0), 1);
//!     assert_eq!(nearest, vec![Point::splat(500.0)]);
//!
//!     // Moving into another point is refused
//!     let outcome = tree.move_point(Point::zero(), Point::splat(5.0), 30.0)?;
//!     assert_eq!(outcome, MoveOutcome::Blocked(Point::splat(10.0)));
//!
//!     Ok(())
//! }
//! ```
//!
//! Run the interactive demo:
//!
//! ```sh
//! cargo run --example game
//! ```

#[cfg(feature = "bevy")]
pub mod bevy_integration;
pub mod bounding;
pub mod collision;
pub mod config;
pub mod export;
pub mod game;
pub mod intersect_with;
pub mod load;
pub mod nearest;
pub mod node;
pub mod pool;
pub mod prelude;
pub mod shared;
pub mod tree;

use std::fmt;

/// Index [`tree.nodes`](pool::Pool) with it.
///
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub u32);

impl From<NodeId> for usize {
    fn from(value: NodeId) -> Self {
        value.0 as usize
    }
}

impl From<usize> for NodeId {
    fn from(value: usize) -> Self {
        NodeId(value as u32)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId {}", self.0)
    }
}

/// Enum of all possible errors of the octree's operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// Point is out of bounds of tree's [`Cube`](bounding::Cube).
    #[error("Out of tree bounds. {0}")]
    OutOfTreeBounds(String),

    /// Point to move is not stored in the tree.
    #[error("Point not found. {0}")]
    NotFound(String),

    /// Range query corners can not form a box.
    #[error("Invalid range. {0}")]
    InvalidRange(String),

    /// [`Cube`](bounding::Cube) bounds are not finite and positive.
    #[error("Cube dimensions should be finite and positive. {0}")]
    NotPositive(String),

    /// Unknown movement direction.
    #[error("Invalid direction. {0}")]
    InvalidDirection(String),
}
