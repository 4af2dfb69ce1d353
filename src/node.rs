use smallvec::SmallVec;

use crate::{
    bounding::{octant_index, Aabb, Cube, Point, Real},
    NodeId,
};

/// Points held inline by a leaf before spilling to the heap.
pub const LEAF_INLINE: usize = 4;

/// Points held directly by a [`Leaf`](NodeType::Leaf), in insertion order.
pub type Points<R> = SmallVec<[Point<R>; LEAF_INLINE]>;

#[derive(Clone, Debug)]
pub struct Node<R: Real> {
    pub cube: Cube<R>,
    /// Exact extent of the node. Children share the parent's split plane,
    /// so every point routed here lies inside it.
    pub bounds: Aabb<R>,
    pub depth: u32,
    pub ntype: NodeType<R>,
    pub parent: Option<NodeId>,
}

impl<R: Real> Default for Node<R> {
    fn default() -> Self {
        let cube = Cube::<R>::default();
        Node {
            cube,
            bounds: cube.aabb(),
            depth: 0,
            ntype: Default::default(),
            parent: Default::default(),
        }
    }
}

impl<R: Real> Node<R> {
    pub(crate) fn from_cube(cube: Cube<R>, depth: u32, parent: Option<NodeId>) -> Self {
        Node {
            cube,
            bounds: cube.aabb(),
            depth,
            parent,
            ntype: Default::default(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.ntype, NodeType::Leaf(_))
    }

    /// Number of points stored in this node's subtree.
    pub fn count(&self) -> usize {
        match self.ntype {
            NodeType::Leaf(ref points) => points.len(),
            NodeType::Branch(ref branch) => branch.count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum NodeType<R: Real> {
    Leaf(Points<R>),
    Branch(Branch),
}

impl<R: Real> Default for NodeType<R> {
    fn default() -> Self {
        NodeType::Leaf(Points::new())
    }
}

#[derive(Default, Clone, Copy, PartialEq, Debug)]
pub struct Branch {
    pub children: [NodeId; 8],
    /// Points in the whole subtree.
    pub count: usize,
}

impl Branch {
    pub(crate) fn new(children: [NodeId; 8], count: usize) -> Self {
        Branch { children, count }
    }

    pub(crate) fn increment(&mut self) {
        self.count += 1;
    }

    pub(crate) fn decrement(&mut self) {
        debug_assert!(self.count > 0);
        self.count = self.count.saturating_sub(1);
    }

    pub fn find_child<R: Real>(&self, position: Point<R>, center: Point<R>) -> NodeId {
        self.children[octant_index(position, center)]
    }
}
