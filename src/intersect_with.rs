//! Helper functions with a custom intersection closure.

use heapless::Vec as HVec;

use crate::{
    bounding::{Aabb, Point, Real},
    node::NodeType,
    tree::Octree,
    NodeId, TreeError,
};

const STACK: usize = 32;

impl<R: Real> Octree<R> {
    /// Intersect [`Octree`] with a custom intersection closure.
    ///
    /// The closure is called with node [`bounds`](crate::node::Node::bounds)
    /// to decide whether to descend and with the
    /// [`degenerate box`](Point::degenerate_aabb) of every stored point
    /// to decide whether to return it.
    ///
    /// Points come in octant order, leaves in insertion order.
    ///
    /// ```rust
    /// use pointree::prelude::*;
    ///
    /// let mut tree = Octree::from_cube(Cube::new(Point::zero(), 16.0).unwrap());
    ///
    /// let p = Point::new(1.0f32, 1.0, 1.0);
    /// tree.insert(p).unwrap();
    ///
    /// assert_eq!(tree.intersect_with(|_| true), vec![p]);
    /// ```
    pub fn intersect_with<F>(&self, what: F) -> Vec<Point<R>>
    where
        F: Fn(&Aabb<R>) -> bool,
    {
        let mut points = Vec::with_capacity(10);
        self.rintersect_with(self.root, &what, &mut |p: &Point<R>| points.push(*p));
        points
    }

    /// Same as [`intersect_with`](Self::intersect_with), but extends
    /// a supplied [`vector`](Vec) rather than allocating a new one.
    pub fn extend_intersect_with<F>(&self, what: F, points: &mut Vec<Point<R>>)
    where
        F: Fn(&Aabb<R>) -> bool,
    {
        self.rintersect_with(self.root, &what, &mut |p: &Point<R>| points.push(*p));
    }

    /// Passes each point intersected by the closure to `actor`.
    ///
    /// ```rust
    /// use pointree::prelude::*;
    ///
    /// let mut tree = Octree::from_cube(Cube::new(Point::zero(), 16.0).unwrap());
    /// tree.insert(Point::new(1.0f32, 1.0, 1.0)).unwrap();
    /// tree.insert(Point::new(-1.0, 1.0, 1.0)).unwrap();
    ///
    /// let mut count = 0;
    /// tree.intersect_with_for_each(|aabb| aabb.max.x >= 0.0, |_| count += 1);
    /// assert_eq!(count, 1);
    /// ```
    pub fn intersect_with_for_each<F, F2>(&self, what: F, mut actor: F2)
    where
        F: Fn(&Aabb<R>) -> bool,
        F2: FnMut(&Point<R>),
    {
        self.rintersect_with(self.root, &what, &mut actor);
    }

    fn rintersect_with<F, F2>(&self, node: NodeId, what: &F, actor: &mut F2)
    where
        F: Fn(&Aabb<R>) -> bool,
        F2: FnMut(&Point<R>),
    {
        // Heapless stack first, recursion once it can't take a whole branch.
        let mut stack = HVec::<_, STACK>::new();
        let _ = stack.push(node);
        while let Some(node) = stack.pop() {
            let n = &self.nodes[node];
            match n.ntype {
                NodeType::Leaf(ref points) => {
                    for p in points {
                        if what(&p.degenerate_aabb()) {
                            actor(p);
                        }
                    }
                }

                NodeType::Branch(ref branch) => {
                    if branch.count == 0 || !what(&n.bounds) {
                        continue;
                    }
                    if STACK - stack.len() < branch.children.len() {
                        for child in branch.children {
                            self.rintersect_with(child, what, actor);
                        }
                    } else {
                        // Reversed, so octant 0 is popped first.
                        for child in branch.children.iter().rev() {
                            let _ = stack.push(*child);
                        }
                    }
                }
            }
        }
    }

    /// Every stored point inside the box spanned by two opposite corners.
    ///
    /// Corners may come in any order. Box faces are inclusive.
    /// Fails with [`TreeError::InvalidRange`] when a corner has a NaN coordinate.
    pub fn range_query(&self, a: Point<R>, b: Point<R>) -> Result<Vec<Point<R>>, TreeError> {
        let aabb = Aabb::from_corners(a, b)?;
        Ok(self.intersect_aabb(&aabb))
    }

    /// Every stored point inside `aabb`.
    pub fn intersect_aabb(&self, aabb: &Aabb<R>) -> Vec<Point<R>> {
        self.intersect_with(|bounds| bounds.intersects(aabb))
    }
}
