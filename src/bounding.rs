//! Bounding primitives.
//!
//! [`Point`], [`BVec3`], [`Cube`], [`Aabb`]

use std::{
    fmt::{Debug, Display},
    ops::{Add, AddAssign, Mul, Sub, SubAssign},
    str::FromStr,
};

use num::Float;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::TreeError;

/// Real number type the tree is built over: `f32` or `f64`.
pub trait Real:
    Float
    + AddAssign
    + SubAssign
    + FromStr
    + Default
    + Display
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}
impl Real for f32 {}
impl Real for f64 {}

#[inline]
pub(crate) fn two<R: Real>() -> R {
    R::one() + R::one()
}

/// A point in 3D space.
///
/// Two points are the same point only when all three coordinates are
/// exactly equal.
#[derive(Default, Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(bound(deserialize = ""))]
pub struct Point<R: Real> {
    pub x: R,
    pub y: R,
    pub z: R,
}

impl<R: Real> Add for Point<R> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl<R: Real> Sub for Point<R> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Point {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl<R: Real> Mul<R> for Point<R> {
    type Output = Self;

    fn mul(self, scale: R) -> Self {
        Point {
            x: self.x * scale,
            y: self.y * scale,
            z: self.z * scale,
        }
    }
}

impl<R: Real> AddAssign for Point<R> {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl<R: Real> SubAssign for Point<R> {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl<R: Real> Display for Point<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

impl<R: Real> From<[R; 3]> for Point<R> {
    fn from([x, y, z]: [R; 3]) -> Self {
        Point { x, y, z }
    }
}

impl<R: Real> Point<R> {
    pub fn new(x: R, y: R, z: R) -> Self {
        Point { x, y, z }
    }

    pub fn splat(value: R) -> Self {
        Point {
            x: value,
            y: value,
            z: value,
        }
    }

    pub fn zero() -> Self {
        Point::splat(R::zero())
    }

    pub fn le(&self, other: Self) -> BVec3 {
        BVec3::new(self.x <= other.x, self.y <= other.y, self.z <= other.z)
    }

    pub fn ge(&self, other: Self) -> BVec3 {
        BVec3::new(self.x >= other.x, self.y >= other.y, self.z >= other.z)
    }

    /// Component-wise minimum.
    pub fn min(&self, other: Self) -> Self {
        Point::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum.
    pub fn max(&self, other: Self) -> Self {
        Point::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn has_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    #[inline]
    pub fn distance_squared(&self, other: &Self) -> R {
        let d = *self - *other;
        d.x * d.x + d.y * d.y + d.z * d.z
    }

    /// Euclidean distance.
    #[inline]
    pub fn distance(&self, other: &Self) -> R {
        self.distance_squared(other).sqrt()
    }

    /// Zero sized [`Aabb`] located at this point.
    ///
    /// Lets node-level predicates be reused for points.
    pub fn degenerate_aabb(&self) -> Aabb<R> {
        Aabb {
            min: *self,
            max: *self,
        }
    }
}

/// Boolean Vec3 mask.
#[derive(Default, Clone, Copy, PartialEq, Debug)]
pub struct BVec3 {
    x: bool,
    y: bool,
    z: bool,
}

impl BVec3 {
    fn new(x: bool, y: bool, z: bool) -> Self {
        BVec3 { x, y, z }
    }

    pub fn all(&self) -> bool {
        self.x && self.y && self.z
    }

    pub fn any(&self) -> bool {
        self.x || self.y || self.z
    }

    pub fn none(&self) -> bool {
        !self.x && !self.y && !self.z
    }
}

/// Octant index of `position` relative to `center`.
///
/// One bit per axis (x: `0b001`, y: `0b010`, z: `0b100`),
/// set when the coordinate is greater or equal to the center.
#[inline]
pub fn octant_index<R: Real>(position: Point<R>, center: Point<R>) -> usize {
    let x = if position.x < center.x { 0 } else { 1 };
    let y = if position.y < center.y { 0 } else { 1 };
    let z = if position.z < center.z { 0 } else { 1 };

    x | y << 1 | z << 2
}

/// Axis aligned cube, the shape of every tree node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = ""))]
pub struct Cube<R: Real> {
    #[serde(default)]
    pub center: Point<R>,
    pub half_size: R,
}

impl<R: Real> Default for Cube<R> {
    fn default() -> Self {
        Cube {
            center: Point::zero(),
            half_size: R::one(),
        }
    }
}

impl<R: Real> Display for Cube<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cube(min: {}, max: {})", self.min(), self.max())
    }
}

impl<R: Real> Cube<R> {
    /// Creates a new [`Cube`] without any checks.
    pub fn new_unchecked(center: Point<R>, half_size: R) -> Self {
        Cube { center, half_size }
    }

    /// Creates a new [`Cube`].
    ///
    /// Checks that the center is finite and the half size is finite and positive.
    pub fn new(center: Point<R>, half_size: R) -> Result<Self, TreeError> {
        if !center.is_finite() || !half_size.is_finite() || half_size <= R::zero() {
            Err(TreeError::NotPositive(format!(
                "Center: {center}, half size: {half_size}"
            )))
        } else {
            Ok(Self::new_unchecked(center, half_size))
        }
    }

    pub fn min(&self) -> Point<R> {
        self.center - Point::splat(self.half_size)
    }

    pub fn max(&self) -> Point<R> {
        self.center + Point::splat(self.half_size)
    }

    /// Full edge length.
    pub fn size(&self) -> R {
        self.half_size * two()
    }

    /// Octant `i` of this cube, as indexed by [`octant_index`].
    pub fn octant(&self, i: usize) -> Cube<R> {
        let quarter = self.half_size / two();
        let offset = |bit: usize| if (i & bit) != 0 { quarter } else { -quarter };

        Cube {
            center: self.center + Point::new(offset(0b1), offset(0b10), offset(0b100)),
            half_size: quarter,
        }
    }

    #[inline]
    pub fn split(&self) -> [Cube<R>; 8] {
        std::array::from_fn(|i| self.octant(i))
    }

    /// Checks if the cube contains a [`position`](Point). Both faces are inclusive.
    pub fn contains(&self, position: Point<R>) -> bool {
        self.min().le(position).all() && self.max().ge(position).all()
    }

    /// Exact bounds of the cube.
    pub fn aabb(&self) -> Aabb<R> {
        Aabb {
            min: self.min(),
            max: self.max(),
        }
    }
}

/// Axis Aligned Bounding Box.
///
/// Used as a query volume and as the exact extent of tree nodes.
/// Always normalized: `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = ""))]
pub struct Aabb<R: Real> {
    pub min: Point<R>,
    pub max: Point<R>,
}

impl<R: Real> Display for Aabb<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Aabb(min: {}, max: {})", self.min, self.max)
    }
}

impl<R: Real> Aabb<R> {
    /// Creates an [`Aabb`] from two opposite corners, in any order.
    ///
    /// Fails for NaN coordinates.
    pub fn from_corners(a: Point<R>, b: Point<R>) -> Result<Self, TreeError> {
        if a.has_nan() || b.has_nan() {
            return Err(TreeError::InvalidRange(format!("{a} - {b}")));
        }
        Ok(Aabb {
            min: a.min(b),
            max: a.max(b),
        })
    }

    /// Box of `half_width` around `center`.
    pub fn around(center: Point<R>, half_width: R) -> Self {
        let extent = Point::splat(half_width.abs());
        Aabb {
            min: center - extent,
            max: center + extent,
        }
    }

    /// Checks if the box contains a [`position`](Point). Both faces are inclusive.
    pub fn contains(&self, position: Point<R>) -> bool {
        self.min.le(position).all() && self.max.ge(position).all()
    }

    /// Checks if two boxes touch or overlap.
    pub fn intersects(&self, other: &Aabb<R>) -> bool {
        self.min.le(other.max).all() && self.max.ge(other.min).all()
    }

    /// Octant `i` of this box, split at `center`.
    ///
    /// Faces are either the box's own faces or `center` itself, so a point
    /// sent to octant `i` by [`octant_index`] is always inside it.
    pub fn octant(&self, i: usize, center: Point<R>) -> Aabb<R> {
        let axis = |bit: usize, lo: R, mid: R, hi: R| {
            if (i & bit) != 0 {
                (mid, hi)
            } else {
                (lo, mid)
            }
        };
        let (min_x, max_x) = axis(0b1, self.min.x, center.x, self.max.x);
        let (min_y, max_y) = axis(0b10, self.min.y, center.y, self.max.y);
        let (min_z, max_z) = axis(0b100, self.min.z, center.z, self.max.z);

        Aabb {
            min: Point::new(min_x, min_y, min_z),
            max: Point::new(max_x, max_y, max_z),
        }
    }

    /// Squared distance from `position` to the closest point of the box.
    ///
    /// Zero when the position is inside.
    pub fn distance_squared_to(&self, position: &Point<R>) -> R {
        let axis = |p: R, lo: R, hi: R| {
            if p < lo {
                lo - p
            } else if p > hi {
                p - hi
            } else {
                R::zero()
            }
        };
        let dx = axis(position.x, self.min.x, self.max.x);
        let dy = axis(position.y, self.min.y, self.max.y);
        let dz = axis(position.z, self.min.z, self.max.z);
        dx * dx + dy * dy + dz * dz
    }
}

#[cfg(test)]
mod tests {
    use super::{octant_index, Aabb, Cube, Point};

    #[test]
    fn test_cube_contains() {
        let cube = Cube::new_unchecked(Point::splat(8.0f32), 8.0);
        assert!(cube.contains(Point::zero()));
        assert!(cube.contains(Point::splat(8.0)));
        assert!(cube.contains(Point::splat(16.0)));
        assert!(!cube.contains(Point::new(0.0, 16.1, 8.0)));
        assert!(!cube.contains(Point::new(f32::NAN, 1.0, 1.0)));
    }

    #[test]
    fn test_cube_constructor() {
        assert!(Cube::new(Point::splat(2.0f64), 2.0).is_ok());

        // Not positive
        assert!(Cube::new(Point::splat(0.0f64), 0.0).is_err());
        assert!(Cube::new(Point::splat(0.0f64), -4.0).is_err());

        // Not finite
        assert!(Cube::new(Point::splat(0.0f64), f64::INFINITY).is_err());
        assert!(Cube::new(Point::new(f64::NAN, 0.0, 0.0), 1.0).is_err());
    }

    #[test]
    fn test_octants() {
        let cube = Cube::new_unchecked(Point::zero(), 8.0f32);
        let octants = cube.split();

        for (i, octant) in octants.iter().enumerate() {
            assert_eq!(octant.half_size, 4.0);
            assert_eq!(octant_index(octant.center, cube.center), i);
            assert!(cube.contains(octant.min()));
            assert!(cube.contains(octant.max()));
        }

        assert_eq!(octants[0].center, Point::splat(-4.0));
        assert_eq!(octants[0b001].center, Point::new(4.0, -4.0, -4.0));
        assert_eq!(octants[0b110].center, Point::new(-4.0, 4.0, 4.0));
        assert_eq!(octants[7].center, Point::splat(4.0));
    }

    #[test]
    fn test_octant_index_boundary() {
        let center = Point::zero();
        assert_eq!(octant_index(Point::zero(), center), 7);
        assert_eq!(octant_index(Point::new(-0.5f32, 0.0, -0.5), center), 0b010);
    }

    #[test]
    fn test_aabb_corners_normalized() {
        let aabb = Aabb::from_corners(Point::new(5.0f32, -1.0, 3.0), Point::new(-5.0, 1.0, 3.0))
            .unwrap();
        assert_eq!(aabb.min, Point::new(-5.0, -1.0, 3.0));
        assert_eq!(aabb.max, Point::new(5.0, 1.0, 3.0));

        assert!(Aabb::from_corners(Point::new(f32::NAN, 0.0, 0.0), Point::zero()).is_err());
    }

    #[test]
    fn test_aabb_intersects_and_distance() {
        let aabb = Cube::new_unchecked(Point::zero(), 1.0f64).aabb();

        let touching = Aabb::around(Point::new(2.0, 0.0, 0.0), 1.0);
        assert!(aabb.intersects(&touching));

        let apart = Aabb::around(Point::new(3.0, 0.0, 0.0), 1.0);
        assert!(!aabb.intersects(&apart));

        assert_eq!(aabb.distance_squared_to(&Point::new(0.5, 0.5, 0.5)), 0.0);
        assert_eq!(aabb.distance_squared_to(&Point::new(3.0, 0.0, 0.0)), 4.0);
        assert_eq!(aabb.distance_squared_to(&Point::new(2.0, 2.0, 1.0)), 2.0);
    }

    #[test]
    fn test_aabb_octants_share_the_split_plane() {
        // 0.1 has no exact binary representation.
        let cube = Cube::new_unchecked(Point::splat(0.1f64), 0.3);
        let aabb = cube.aabb();

        for i in 0..8 {
            let octant = aabb.octant(i, cube.center);
            assert!(octant.min.le(octant.max).all());
            for (lo, hi, mid, bit) in [
                (octant.min.x, octant.max.x, cube.center.x, 0b1),
                (octant.min.y, octant.max.y, cube.center.y, 0b10),
                (octant.min.z, octant.max.z, cube.center.z, 0b100),
            ] {
                if i & bit != 0 {
                    assert_eq!(lo, mid);
                } else {
                    assert_eq!(hi, mid);
                }
            }
        }

        // Any point routed by the octant rule lands inside its octant box.
        let p = cube.center;
        assert!(aabb.octant(octant_index(p, cube.center), cube.center).contains(p));
    }

    #[test]
    fn test_point_math() {
        let a = Point::new(0.0f32, 0.0, 0.0);
        let b = Point::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b * 2.0, Point::new(6.0, 8.0, 0.0));
        assert_eq!(b - b, Point::zero());
        assert_eq!(format!("{b}"), "(3.00, 4.00, 0.00)");
    }
}
