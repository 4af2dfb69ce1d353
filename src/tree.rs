use heapless::Vec as HVec;
use log::{debug, trace};

use crate::{
    bounding::{Cube, Point, Real},
    config::{ConfigError, TreeConfig},
    node::{Branch, Node, NodeType, Points},
    pool::Pool,
    NodeId, TreeError,
};

/// Octree of 3D points.
///
/// Leaves hold up to [`capacity`](TreeConfig::capacity) points and split into
/// eight octants when they overflow, unless they already sit at
/// [`max_depth`](TreeConfig::max_depth).
#[derive(Clone, Debug)]
pub struct Octree<R: Real> {
    pub nodes: Pool<Node<R>>,
    pub root: NodeId,
    pub(crate) config: TreeConfig<R>,
    pub(crate) len: usize,
}

impl<R: Real> Default for Octree<R> {
    fn default() -> Self {
        Octree::from_config(TreeConfig::default())
    }
}

impl<R: Real> Octree<R> {
    /// Validates `config` and builds an empty tree from it.
    pub fn new(config: TreeConfig<R>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    /// Empty tree over `cube` with default settings.
    pub fn from_cube(cube: Cube<R>) -> Self {
        Self::from_config(TreeConfig::new(cube))
    }

    /// Same as [`new`](Self::new), reserving room for `capacity` nodes.
    pub fn with_capacity(config: TreeConfig<R>, capacity: usize) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Octree {
            nodes: Pool::from_root(Node::from_cube(config.bounds, 0, None), capacity),
            root: Default::default(),
            config,
            len: 0,
        })
    }

    fn from_config(config: TreeConfig<R>) -> Self {
        Octree {
            nodes: Pool::from_root(Node::from_cube(config.bounds, 0, None), 1),
            root: Default::default(),
            config,
            len: 0,
        }
    }

    pub fn config(&self) -> &TreeConfig<R> {
        &self.config
    }

    /// Root cube.
    pub fn bounds(&self) -> Cube<R> {
        self.nodes[self.root].cube
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every point, leaving a single empty root leaf.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.insert(Node::from_cube(self.config.bounds, 0, None));
        self.len = 0;
    }

    /// Inserts a point.
    ///
    /// Duplicates are stored as separate entries.
    pub fn insert(&mut self, point: Point<R>) -> Result<(), TreeError> {
        let bounds = self.nodes[self.root].bounds;
        if !bounds.contains(point) {
            return Err(TreeError::OutOfTreeBounds(format!(
                "{point} is outside of {bounds}"
            )));
        }

        let mut node = self.root;
        loop {
            let n = &mut self.nodes[node];
            let center = n.cube.center;
            match n.ntype {
                NodeType::Branch(ref mut branch) => {
                    branch.increment();
                    node = branch.find_child(point, center);
                }
                NodeType::Leaf(ref mut points) => {
                    points.push(point);
                    break;
                }
            }
        }

        self.len += 1;
        trace!("Inserted {point} into {node}");
        self.split(node);
        Ok(())
    }

    /// Splits `node` while it overflows, cascading into the children
    /// that overflow in turn.
    fn split(&mut self, node: NodeId) {
        let mut pending: HVec<NodeId, 8> = HVec::new();
        // Fresh stack, can't be full.
        let _ = pending.push(node);

        while let Some(node) = pending.pop() {
            let capacity = self.config.capacity;
            let max_depth = self.config.max_depth;

            let n = &mut self.nodes[node];
            let depth = n.depth;
            let points = match n.ntype {
                NodeType::Leaf(ref mut points) if points.len() > capacity && depth < max_depth => {
                    std::mem::take(points)
                }
                _ => continue,
            };

            let center = n.cube.center;
            let children = self.nodes.branch(node);
            self.nodes[node].ntype = NodeType::Branch(Branch::new(children, points.len()));
            debug!("Split {node} at depth {depth} into {children:?}");

            let branch = Branch::new(children, 0);
            for point in points {
                if let NodeType::Leaf(ref mut held) =
                    self.nodes[branch.find_child(point, center)].ntype
                {
                    held.push(point);
                }
            }

            for child in children {
                if self.nodes[child].count() > capacity && pending.push(child).is_err() {
                    self.split(child);
                }
            }
        }
    }

    /// Id of the leaf whose cube would hold `point`.
    pub fn find_leaf(&self, point: &Point<R>) -> NodeId {
        let mut node = self.root;
        while let NodeType::Branch(ref branch) = self.nodes[node].ntype {
            node = branch.find_child(*point, self.nodes[node].cube.center);
        }
        node
    }

    /// Searches for a stored point with exactly the same coordinates.
    pub fn find(&self, point: &Point<R>) -> Option<Point<R>> {
        match self.nodes[self.find_leaf(point)].ntype {
            NodeType::Leaf(ref points) => points.iter().find(|p| *p == point).copied(),
            NodeType::Branch(_) => None,
        }
    }

    pub fn contains(&self, point: &Point<R>) -> bool {
        self.find(point).is_some()
    }

    /// Removes one stored point with exactly the same coordinates.
    ///
    /// Returns `false` when there is no such point.
    pub fn remove(&mut self, point: &Point<R>) -> bool {
        let leaf = self.find_leaf(point);
        let n = &mut self.nodes[leaf];
        let parent = n.parent;
        match n.ntype {
            NodeType::Leaf(ref mut points) => match points.iter().position(|p| p == point) {
                Some(idx) => {
                    points.remove(idx);
                }
                None => return false,
            },
            NodeType::Branch(_) => return false,
        }

        let mut current = parent;
        while let Some(node) = current {
            if let NodeType::Branch(ref mut branch) = self.nodes[node].ntype {
                branch.decrement();
            }
            current = self.nodes[node].parent;
        }

        self.len -= 1;
        trace!("Removed {point} from {leaf}");
        self.maybe_collapse(parent);
        true
    }

    /// Collapses the topmost ancestor of a shrunk leaf that satisfies
    /// the [`merge policy`](crate::config::MergePolicy).
    fn maybe_collapse(&mut self, parent: Option<NodeId>) {
        let mut target = None;
        let mut current = parent;
        while let Some(node) = current {
            match self.nodes[node].ntype {
                NodeType::Branch(Branch { count, .. })
                    if self
                        .config
                        .merge_policy
                        .should_merge(count, self.config.capacity) =>
                {
                    target = Some(node);
                    current = self.nodes[node].parent;
                }
                _ => break,
            }
        }

        if let Some(node) = target {
            self.collapse(node);
        }
    }

    /// Turns a branch into a leaf holding every point of its subtree.
    fn collapse(&mut self, node: NodeId) {
        let NodeType::Branch(branch) =
            std::mem::replace(&mut self.nodes[node].ntype, NodeType::Leaf(Points::new()))
        else {
            return;
        };

        let mut points = Points::new();
        for child in branch.children {
            self.drain_subtree(child, &mut points);
        }
        debug!(
            "Collapsed {node} at depth {} with {} points",
            self.nodes[node].depth,
            points.len()
        );
        self.nodes[node].ntype = NodeType::Leaf(points);
    }

    fn drain_subtree(&mut self, node: NodeId, points: &mut Points<R>) {
        match self.nodes.remove(node).map(|n| n.ntype) {
            Some(NodeType::Leaf(held)) => points.extend(held),
            Some(NodeType::Branch(branch)) => {
                for child in branch.children {
                    self.drain_subtree(child, points);
                }
            }
            None => (),
        }
    }

    /// Depth of the deepest node.
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or_default()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.leaf_count()
    }

    /// Every stored point, in octant order.
    pub fn points(&self) -> Vec<Point<R>> {
        self.intersect_with(|_| true)
    }
}
