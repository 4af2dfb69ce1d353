//! Nearest neighbour search.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use crate::{
    bounding::{Point, Real},
    node::NodeType,
    tree::Octree,
    NodeId,
};

/// Total order over non NaN reals.
#[derive(Clone, Copy, Debug, PartialEq)]
struct OrdReal<R: Real>(R);

impl<R: Real> Eq for OrdReal<R> {}

impl<R: Real> PartialOrd for OrdReal<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R: Real> Ord for OrdReal<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

/// Candidate kept in the result heap.
///
/// The worst candidate is on top, later finds lose ties.
#[derive(Clone, Copy, Debug)]
struct Candidate<R: Real> {
    distance: OrdReal<R>,
    seq: usize,
    point: Point<R>,
}

impl<R: Real> PartialEq for Candidate<R> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<R: Real> Eq for Candidate<R> {}

impl<R: Real> PartialOrd for Candidate<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R: Real> Ord for Candidate<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.distance, self.seq).cmp(&(other.distance, other.seq))
    }
}

impl<R: Real> Octree<R> {
    /// Up to `k` stored points closest to `target`, nearest first.
    ///
    /// Returns every point when the tree holds fewer than `k`.
    /// Points at equal distance come in no particular order.
    ///
    /// ```rust
    /// use pointree::prelude::*;
    ///
    /// let mut tree = Octree::from_cube(Cube::new(Point::zero(), 100.0).unwrap());
    /// for x in [1.0f64, 5.0, -3.0, 50.0] {
    ///     tree.insert(Point::new(x, 0.0, 0.0)).unwrap();
    /// }
    ///
    /// let nearest = tree.nearest_neighbors(&Point::zero(), 2);
    /// assert_eq!(nearest, vec![Point::new(1.0, 0.0, 0.0), Point::new(-3.0, 0.0, 0.0)]);
    /// ```
    pub fn nearest_neighbors(&self, target: &Point<R>, k: usize) -> Vec<Point<R>> {
        self.knn(target, k, |_| true)
            .into_iter()
            .map(|(p, _)| p)
            .collect()
    }

    /// Closest stored point and its distance to `target`.
    pub fn nearest_neighbor(&self, target: &Point<R>) -> Option<(Point<R>, R)> {
        self.knn(target, 1, |_| true)
            .pop()
            .map(|(p, d2)| (p, d2.sqrt()))
    }

    /// Closest stored point that is not at `target` itself, with its distance.
    pub fn nearest_other(&self, target: &Point<R>) -> Option<(Point<R>, R)> {
        self.knn(target, 1, |p| p != target)
            .pop()
            .map(|(p, d2)| (p, d2.sqrt()))
    }

    /// Best-first search.
    ///
    /// Nodes are visited by distance from `target` to their bounds and the
    /// search stops once the closest unvisited node is further than the
    /// current `k`-th candidate. Returns points with squared distances.
    fn knn<F>(&self, target: &Point<R>, k: usize, filter: F) -> Vec<(Point<R>, R)>
    where
        F: Fn(&Point<R>) -> bool,
    {
        if k == 0 || self.is_empty() || target.has_nan() {
            return Vec::new();
        }

        let mut queue: BinaryHeap<Reverse<(OrdReal<R>, NodeId)>> = BinaryHeap::new();
        let mut best: BinaryHeap<Candidate<R>> = BinaryHeap::with_capacity(k + 1);
        let mut seq = 0;

        queue.push(Reverse((
            OrdReal(self.nodes[self.root].bounds.distance_squared_to(target)),
            self.root,
        )));

        while let Some(Reverse((OrdReal(bound), node))) = queue.pop() {
            if best.len() == k {
                if let Some(worst) = best.peek() {
                    if bound > worst.distance.0 {
                        break;
                    }
                }
            }

            match self.nodes[node].ntype {
                NodeType::Leaf(ref points) => {
                    for p in points.iter().filter(|p| filter(p)) {
                        let distance = OrdReal(p.distance_squared(target));
                        if best.len() == k {
                            match best.peek() {
                                Some(worst) if distance < worst.distance => {
                                    best.pop();
                                }
                                _ => continue,
                            }
                        }
                        best.push(Candidate {
                            distance,
                            seq,
                            point: *p,
                        });
                        seq += 1;
                    }
                }
                NodeType::Branch(ref branch) => {
                    for child in branch.children {
                        if self.nodes[child].is_empty() {
                            continue;
                        }
                        queue.push(Reverse((
                            OrdReal(self.nodes[child].bounds.distance_squared_to(target)),
                            child,
                        )));
                    }
                }
            }
        }

        best.into_sorted_vec()
            .into_iter()
            .map(|c| (c.point, c.distance.0))
            .collect()
    }
}
