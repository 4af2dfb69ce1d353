//! Read-only views of the tree structure.
//!
//! [`Snapshot`] is the nested, serializable form handed to renderers.
//! The [`Display`](fmt::Display) impl of [`Octree`] prints an indented text dump.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    bounding::{Point, Real},
    node::NodeType,
    tree::Octree,
    NodeId,
};

/// One node of the tree with its whole subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = ""))]
pub struct Snapshot<R: Real> {
    pub center: Point<R>,
    /// Full edge length of the node's cube.
    pub size: R,
    pub half_size: R,
    pub min: Point<R>,
    pub max: Point<R>,
    pub depth: u32,
    pub is_leaf: bool,
    /// Points in the whole subtree.
    pub count: usize,
    /// Points held by a leaf. Always empty for branches.
    pub points: Vec<Point<R>>,
    /// Eight children in octant order. Always empty for leaves.
    pub children: Vec<Snapshot<R>>,
}

impl<R: Real> Snapshot<R> {
    /// Number of nodes in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Snapshot::node_count).sum::<usize>()
    }
}

impl<R: Real> Octree<R> {
    /// Snapshot of the whole tree, starting at the root.
    pub fn export_structure(&self) -> Snapshot<R> {
        self.snapshot(self.root)
    }

    fn snapshot(&self, node: NodeId) -> Snapshot<R> {
        let n = &self.nodes[node];
        let (points, children) = match n.ntype {
            NodeType::Leaf(ref points) => (points.to_vec(), Vec::new()),
            NodeType::Branch(ref branch) => (
                Vec::new(),
                branch
                    .children
                    .iter()
                    .map(|&child| self.snapshot(child))
                    .collect(),
            ),
        };

        Snapshot {
            center: n.cube.center,
            size: n.cube.size(),
            half_size: n.cube.half_size,
            min: n.bounds.min,
            max: n.bounds.max,
            depth: n.depth,
            is_leaf: n.is_leaf(),
            count: n.count(),
            points,
            children,
        }
    }

    fn fmt_node(&self, node: NodeId, level: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = &self.nodes[node];
        let indent = "  ".repeat(level);
        match n.ntype {
            NodeType::Leaf(ref points) => {
                writeln!(
                    f,
                    "{indent}Leaf node at depth {} with {} points",
                    n.depth,
                    points.len()
                )?;
                for p in points {
                    writeln!(f, "{indent}  Point: {p}")?;
                }
            }
            NodeType::Branch(ref branch) => {
                writeln!(f, "{indent}Branch node at depth {}", n.depth)?;
                for child in branch.children {
                    self.fmt_node(child, level + 1, f)?;
                }
            }
        }
        Ok(())
    }
}

impl<R: Real> fmt::Display for Octree<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root, 0, f)
    }
}
