//! [Bevy](https://docs.rs/bevy/) game engine integrations.
//!
//! Adds the [Bevy](https://docs.rs/bevy/) game engine as a dependency.
//!
//! ### Intersections:
//! - [ray](RayCast3d) [picking](Octree::ray_cast)
//! - any [volume](IntersectsVolume) [intersection](Octree::intersect)
//!
//! ```ignore
//! let ray = RayCast3d::new(Vec3A::new(-10.0, 1.0, 1.0), Dir3A::X, 100.0);
//! assert_eq!(
//!   tree.ray_cast(&ray, 0.5),
//!   HitResult {
//!     point: Some(Point::splat(1.0)),
//!     distance: 10.5
//!   }
//! );
//! ```

use bevy::math::{
    bounding::{Aabb3d, BoundingSphere, IntersectsVolume, RayCast3d},
    Vec3, Vec3A,
};

use crate::{
    bounding::{Aabb, Cube, Point},
    node::NodeType,
    tree::Octree,
    NodeId,
};

impl Octree<f32> {
    /// Picks the stored point hit first by the [RayCast3d].
    ///
    /// Every point is treated as a cube of half size `pick_radius`.
    /// Returns a [HitResult] with the point and the distance along the ray.
    pub fn ray_cast(&self, ray: &RayCast3d, pick_radius: f32) -> HitResult {
        let mut hit = HitResult::default();
        self.recursive_ray_cast(self.root, ray, pick_radius.abs(), &mut hit);
        hit
    }

    fn recursive_ray_cast(&self, node: NodeId, ray: &RayCast3d, pick: f32, hit: &mut HitResult) {
        let n = &self.nodes[node];
        if n.is_empty() {
            return;
        }

        // Points on the faces reach out of the node by `pick`.
        let mut aabb: Aabb3d = n.bounds.into();
        aabb.min -= Vec3A::splat(pick);
        aabb.max += Vec3A::splat(pick);
        if !ray.intersects(&aabb) {
            return;
        }

        match n.ntype {
            NodeType::Branch(ref branch) => {
                for child in branch.children {
                    self.recursive_ray_cast(child, ray, pick, hit);
                }
            }

            NodeType::Leaf(ref points) => {
                for p in points {
                    let aabb: Aabb3d = Cube::new_unchecked(*p, pick).into();
                    if let Some(dist) = ray.aabb_intersection_at(&aabb) {
                        if hit.point.is_none() || hit.distance > dist {
                            hit.point = Some(*p);
                            hit.distance = dist;
                        }
                    }
                }
            }
        }
    }

    /// Every stored point inside a bevy bounding volume.
    ///
    /// ```rust
    /// use bevy::math::{bounding::BoundingSphere, Vec3};
    /// use pointree::prelude::*;
    ///
    /// let mut tree = Octree::from_cube(Cube::new(Point::zero(), 100.0).unwrap());
    /// tree.insert(Point::new(1.0, 0.0, 0.0)).unwrap();
    /// tree.insert(Point::new(50.0, 0.0, 0.0)).unwrap();
    ///
    /// let sphere = BoundingSphere::new(Vec3::ZERO, 10.0);
    /// assert_eq!(tree.intersect(&sphere), vec![Point::new(1.0, 0.0, 0.0)]);
    /// ```
    pub fn intersect<V: IntersectsVolume<Aabb3d>>(&self, volume: &V) -> Vec<Point<f32>> {
        self.intersect_with(|bounds| volume.intersects(&Aabb3d::from(*bounds)))
    }
}

/// Ray picking result.
///
/// Contains `Some(`[Point]`)` in case of intersection,
/// [None] otherwise.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct HitResult {
    pub point: Option<Point<f32>>,
    pub distance: f32,
}

impl From<Cube<f32>> for Aabb3d {
    fn from(value: Cube<f32>) -> Self {
        Aabb3d {
            min: value.min().into(),
            max: value.max().into(),
        }
    }
}

impl From<Aabb<f32>> for Aabb3d {
    fn from(value: Aabb<f32>) -> Self {
        Aabb3d {
            min: value.min.into(),
            max: value.max.into(),
        }
    }
}

impl From<Point<f32>> for Vec3A {
    fn from(value: Point<f32>) -> Self {
        Vec3A::new(value.x, value.y, value.z)
    }
}

impl From<Point<f32>> for Vec3 {
    fn from(value: Point<f32>) -> Self {
        Vec3::new(value.x, value.y, value.z)
    }
}

impl From<Vec3> for Point<f32> {
    fn from(value: Vec3) -> Self {
        Point::new(value.x, value.y, value.z)
    }
}

impl From<Vec3A> for Point<f32> {
    fn from(value: Vec3A) -> Self {
        Point::new(value.x, value.y, value.z)
    }
}

impl IntersectsVolume<Aabb3d> for Octree<f32> {
    /// Check if a [Aabb3d] volume intersects with the [Octree] root node.
    fn intersects(&self, volume: &Aabb3d) -> bool {
        let aabb: Aabb3d = self.bounds().into();
        volume.intersects(&aabb)
    }
}

impl IntersectsVolume<BoundingSphere> for Octree<f32> {
    /// Check if a [BoundingSphere] volume intersects with the [Octree] root node.
    fn intersects(&self, volume: &BoundingSphere) -> bool {
        let aabb: Aabb3d = self.bounds().into();
        volume.intersects(&aabb)
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::Dir3A;

    use super::*;

    fn tree() -> Octree<f32> {
        let mut tree = Octree::from_cube(Cube::new(Point::splat(4.0), 4.0).unwrap());
        tree.insert(Point::new(3.0, 1.0, 1.0)).unwrap();
        tree.insert(Point::new(1.0, 5.0, 1.0)).unwrap();
        tree.insert(Point::new(7.0, 7.0, 7.0)).unwrap();
        tree
    }

    #[test]
    fn test_ray_cast() {
        let tree = tree();

        // hit 2nd
        let ray = RayCast3d::new(Vec3A::new(1.0, 1.0, 1.0), Dir3A::Y, 10.0);
        assert_eq!(
            tree.ray_cast(&ray, 0.5),
            HitResult {
                point: Some(Point::new(1.0, 5.0, 1.0)),
                distance: 3.5
            }
        );

        // hit 1st
        let ray = RayCast3d::new(Vec3A::new(0.0, 1.0, 1.0), Dir3A::X, 10.0);
        assert_eq!(
            tree.ray_cast(&ray, 0.5),
            HitResult {
                point: Some(Point::new(3.0, 1.0, 1.0)),
                distance: 2.5
            }
        );

        // miss
        let ray = RayCast3d::new(Vec3A::ZERO, Dir3A::Y, 10.0);
        assert_eq!(tree.ray_cast(&ray, 0.5), HitResult::default());

        // miss, too short
        let ray = RayCast3d::new(Vec3A::new(0.0, 1.0, 1.0), Dir3A::X, 1.0);
        assert_eq!(tree.ray_cast(&ray, 0.5).point, None);
    }

    #[test]
    fn test_volume_intersection() {
        let tree = tree();

        let aabb = Aabb3d {
            min: Vec3A::ZERO,
            max: Vec3A::splat(3.0),
        };
        assert_eq!(tree.intersect(&aabb), vec![Point::new(3.0, 1.0, 1.0)]);

        let sphere = BoundingSphere::new(Vec3::splat(7.0), 1.0);
        assert_eq!(tree.intersect(&sphere), vec![Point::splat(7.0)]);

        assert!(tree.intersects(&sphere));
        let far = BoundingSphere::new(Vec3::splat(100.0), 1.0);
        assert!(!tree.intersects(&far));
        assert!(tree.intersect(&far).is_empty());
    }

    #[test]
    fn test_conversions() {
        let p = Point::new(1.0f32, 2.0, 3.0);
        assert_eq!(Vec3::from(p), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Point::from(Vec3A::new(1.0, 2.0, 3.0)), p);

        let aabb = Aabb3d::from(Cube::new_unchecked(p, 1.0));
        assert_eq!(aabb.min, Vec3A::new(0.0, 1.0, 2.0));
        assert_eq!(aabb.max, Vec3A::new(2.0, 3.0, 4.0));
        assert_eq!(Aabb3d::from(Cube::new_unchecked(p, 1.0).aabb()), aabb);
    }
}
