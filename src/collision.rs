//! Collision rules applied when points move.

use crate::bounding::{Point, Real};

/// Decides whether a point may occupy a position next to others.
pub trait CollisionPolicy<R: Real> {
    /// Half width of the box that holds every point able to collide
    /// with a candidate position.
    fn reach(&self) -> R;

    /// Whether `other` blocks `candidate`.
    fn collides(&self, candidate: &Point<R>, other: &Point<R>) -> bool;

    /// First point among `others` blocking `candidate`.
    fn find_collision(&self, candidate: &Point<R>, others: &[Point<R>]) -> Option<Point<R>> {
        others
            .iter()
            .find(|other| self.collides(candidate, other))
            .copied()
    }
}

/// Points collide when they are strictly closer than `radius`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusPolicy<R: Real> {
    pub radius: R,
}

impl<R: Real> RadiusPolicy<R> {
    pub fn new(radius: R) -> Self {
        RadiusPolicy {
            radius: radius.abs(),
        }
    }
}

impl<R: Real> CollisionPolicy<R> for RadiusPolicy<R> {
    fn reach(&self) -> R {
        self.radius
    }

    #[inline]
    fn collides(&self, candidate: &Point<R>, other: &Point<R>) -> bool {
        candidate.distance_squared(other) < self.radius * self.radius
    }
}
