//! Moving points around without letting them overlap.

use std::{fmt, str::FromStr};

use log::debug;

use crate::{
    bounding::{Aabb, Point, Real},
    collision::{CollisionPolicy, RadiusPolicy},
    tree::Octree,
    TreeError,
};

/// Result of a move that passed validation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveOutcome<R: Real> {
    /// The point now lives at this position.
    Moved(Point<R>),
    /// The move was refused because of this point. The tree is unchanged.
    Blocked(Point<R>),
}

impl<R: Real> MoveOutcome<R> {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved(_))
    }

    pub fn point(&self) -> Point<R> {
        match self {
            MoveOutcome::Moved(p) | MoveOutcome::Blocked(p) => *p,
        }
    }
}

/// Axis aligned movement direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::PosX,
        Direction::NegX,
        Direction::PosY,
        Direction::NegY,
        Direction::PosZ,
        Direction::NegZ,
    ];

    /// Keyboard layout of the game client.
    ///
    /// `w`/`s` move along y, `d`/`a` along x, `e`/`f` along z.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(Direction::PosY),
            's' => Some(Direction::NegY),
            'd' => Some(Direction::PosX),
            'a' => Some(Direction::NegX),
            'e' => Some(Direction::PosZ),
            'f' => Some(Direction::NegZ),
            _ => None,
        }
    }

    /// Unit vector along the direction.
    pub fn unit<R: Real>(&self) -> Point<R> {
        let (o, z) = (R::one(), R::zero());
        match self {
            Direction::PosX => Point::new(o, z, z),
            Direction::NegX => Point::new(-o, z, z),
            Direction::PosY => Point::new(z, o, z),
            Direction::NegY => Point::new(z, -o, z),
            Direction::PosZ => Point::new(z, z, o),
            Direction::NegZ => Point::new(z, z, -o),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::PosX => "+x",
            Direction::NegX => "-x",
            Direction::PosY => "+y",
            Direction::NegY => "-y",
            Direction::PosZ => "+z",
            Direction::NegZ => "-z",
        };
        f.write_str(name)
    }
}

/// Accepts `+x`, `-y`, `x` (positive) and the single [`key`](Direction::from_key) letters.
impl FromStr for Direction {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        if let (Some(key), None) = (chars.next(), chars.next()) {
            if let Some(direction) = Direction::from_key(key) {
                return Ok(direction);
            }
        }

        match s.to_ascii_lowercase().as_str() {
            "+x" | "x" => Ok(Direction::PosX),
            "-x" => Ok(Direction::NegX),
            "+y" | "y" => Ok(Direction::PosY),
            "-y" => Ok(Direction::NegY),
            "+z" | "z" => Ok(Direction::PosZ),
            "-z" => Ok(Direction::NegZ),
            _ => Err(TreeError::InvalidDirection(s.to_string())),
        }
    }
}

impl<R: Real> Octree<R> {
    /// Moves a stored point unless another point is closer than
    /// `collision_radius` to the destination.
    ///
    /// Fails with [`TreeError::NotFound`] when `old` is not stored and with
    /// [`TreeError::OutOfTreeBounds`] when `new` is outside the tree.
    pub fn move_point(
        &mut self,
        old: Point<R>,
        new: Point<R>,
        collision_radius: R,
    ) -> Result<MoveOutcome<R>, TreeError> {
        self.move_point_with(old, new, &RadiusPolicy::new(collision_radius))
    }

    /// [`move_point`](Self::move_point) with a custom [`CollisionPolicy`].
    ///
    /// One stored instance of `old` is ignored during the collision check.
    pub fn move_point_with<P>(
        &mut self,
        old: Point<R>,
        new: Point<R>,
        policy: &P,
    ) -> Result<MoveOutcome<R>, TreeError>
    where
        P: CollisionPolicy<R>,
    {
        if !self.contains(&old) {
            return Err(TreeError::NotFound(format!("{old}")));
        }
        let bounds = self.bounds();
        if !bounds.contains(new) {
            return Err(TreeError::OutOfTreeBounds(format!(
                "{new} is outside of {bounds}"
            )));
        }

        let mut nearby = self.intersect_aabb(&Aabb::around(new, policy.reach()));
        if let Some(idx) = nearby.iter().position(|p| *p == old) {
            nearby.remove(idx);
        }
        if let Some(hit) = policy.find_collision(&new, &nearby) {
            debug!("Move {old} -> {new} blocked by {hit}");
            return Ok(MoveOutcome::Blocked(hit));
        }

        self.remove(&old);
        if let Err(err) = self.insert(new) {
            // Old position was inside the bounds a moment ago.
            let _ = self.insert(old);
            return Err(err);
        }
        debug!("Moved {old} -> {new}");
        Ok(MoveOutcome::Moved(new))
    }

    /// Moves a stored point by `step` along `direction`.
    ///
    /// ```rust
    /// use pointree::prelude::*;
    ///
    /// let mut tree = Octree::from_cube(Cube::new(Point::zero(), 1000.0).unwrap());
    /// tree.insert(Point::zero()).unwrap();
    ///
    /// let outcome = tree
    ///     .move_by_direction(Point::zero(), "w".parse().unwrap(), 50.0, 30.0)
    ///     .unwrap();
    /// assert_eq!(outcome, MoveOutcome::Moved(Point::new(0.0, 50.0, 0.0)));
    /// ```
    pub fn move_by_direction(
        &mut self,
        point: Point<R>,
        direction: Direction,
        step: R,
        collision_radius: R,
    ) -> Result<MoveOutcome<R>, TreeError> {
        let new = point + direction.unit() * step;
        self.move_point(point, new, collision_radius)
    }

    /// First stored point, other than `point` itself, closer than `radius`.
    pub fn collision_check(&self, point: &Point<R>, radius: R) -> Option<Point<R>> {
        let policy = RadiusPolicy::new(radius);
        let nearby: Vec<_> = self
            .intersect_aabb(&Aabb::around(*point, policy.reach()))
            .into_iter()
            .filter(|p| p != point)
            .collect();
        policy.find_collision(point, &nearby)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bounding::Cube, collision::CollisionPolicy, config::TreeConfig};

    fn tree() -> Octree<f64> {
        Octree::new(TreeConfig::new(Cube::new(Point::zero(), 500.0).unwrap())).unwrap()
    }

    #[test]
    fn test_move_blocked() {
        let mut tree = tree();
        tree.insert(Point::zero()).unwrap();
        tree.insert(Point::splat(10.0)).unwrap();
        tree.insert(Point::splat(500.0)).unwrap();
        let before = tree.points();

        let outcome = tree
            .move_point(Point::zero(), Point::splat(5.0), 30.0)
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Blocked(Point::splat(10.0)));
        assert!(!outcome.is_moved());

        assert_eq!(tree.points(), before);
        assert!(tree.contains(&Point::zero()));
        assert!(!tree.contains(&Point::splat(5.0)));
    }

    #[test]
    fn test_move() {
        let mut tree = tree();
        tree.insert(Point::zero()).unwrap();
        tree.insert(Point::splat(10.0)).unwrap();

        let outcome = tree
            .move_point(Point::zero(), Point::new(-100.0, 0.0, 0.0), 30.0)
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Moved(Point::new(-100.0, 0.0, 0.0)));
        assert_eq!(outcome.point(), Point::new(-100.0, 0.0, 0.0));

        assert!(!tree.contains(&Point::zero()));
        assert!(tree.contains(&Point::new(-100.0, 0.0, 0.0)));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_move_ignores_itself() {
        let mut tree = tree();
        tree.insert(Point::zero()).unwrap();

        // Destination within the radius of the old position.
        let outcome = tree
            .move_point(Point::zero(), Point::new(1.0, 0.0, 0.0), 30.0)
            .unwrap();
        assert!(outcome.is_moved());

        // A duplicate of the moving point still blocks.
        tree.insert(Point::new(1.0, 0.0, 0.0)).unwrap();
        let outcome = tree
            .move_point(Point::new(1.0, 0.0, 0.0), Point::new(2.0, 0.0, 0.0), 30.0)
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Blocked(Point::new(1.0, 0.0, 0.0)));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_move_errors() {
        let mut tree = tree();
        tree.insert(Point::zero()).unwrap();

        assert!(matches!(
            tree.move_point(Point::splat(1.0), Point::splat(2.0), 30.0),
            Err(TreeError::NotFound(_))
        ));
        assert!(matches!(
            tree.move_point(Point::zero(), Point::splat(501.0), 30.0),
            Err(TreeError::OutOfTreeBounds(_))
        ));
        assert!(tree.contains(&Point::zero()));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_move_exactly_on_radius() {
        let mut tree = tree();
        tree.insert(Point::zero()).unwrap();
        tree.insert(Point::new(60.0, 0.0, 0.0)).unwrap();

        let outcome = tree
            .move_point(Point::zero(), Point::new(30.0, 0.0, 0.0), 30.0)
            .unwrap();
        assert!(outcome.is_moved());
    }

    #[test]
    fn test_move_by_direction() {
        let mut tree = tree();
        tree.insert(Point::zero()).unwrap();
        tree.insert(Point::new(0.0, 0.0, -60.0)).unwrap();

        let outcome = tree
            .move_by_direction(Point::zero(), Direction::PosX, 50.0, 30.0)
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Moved(Point::new(50.0, 0.0, 0.0)));

        let outcome = tree
            .move_by_direction(Point::new(50.0, 0.0, 0.0), Direction::NegX, 50.0, 30.0)
            .unwrap();
        assert!(outcome.is_moved());

        let outcome = tree
            .move_by_direction(Point::zero(), Direction::NegZ, 50.0, 30.0)
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Blocked(Point::new(0.0, 0.0, -60.0)));

        assert!(matches!(
            tree.move_by_direction(Point::new(0.0, 0.0, -60.0), Direction::NegZ, 500.0, 30.0),
            Err(TreeError::OutOfTreeBounds(_))
        ));
    }

    #[test]
    fn test_collision_check() {
        let mut tree = tree();
        tree.insert(Point::zero()).unwrap();
        tree.insert(Point::new(10.0, 0.0, 0.0)).unwrap();
        tree.insert(Point::new(100.0, 0.0, 0.0)).unwrap();

        assert_eq!(
            tree.collision_check(&Point::zero(), 30.0),
            Some(Point::new(10.0, 0.0, 0.0))
        );
        assert_eq!(tree.collision_check(&Point::new(100.0, 0.0, 0.0), 30.0), None);
        assert_eq!(tree.collision_check(&Point::new(200.0, 0.0, 0.0), 30.0), None);
    }

    #[test]
    fn test_collision_agrees_with_move() {
        let mut tree = tree();
        let points = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(40.0, 0.0, 0.0),
            Point::new(0.0, -45.0, 10.0),
        ];
        for p in points {
            tree.insert(p).unwrap();
        }

        for new in [
            Point::new(20.0, 0.0, 0.0),
            Point::new(0.0, -20.0, 0.0),
            Point::new(-20.0, 0.0, 0.0),
        ] {
            let mut without = tree.clone();
            without.remove(&points[0]);
            let hit = without.collision_check(&new, 30.0);

            let outcome = tree.clone().move_point(points[0], new, 30.0).unwrap();
            assert_eq!(outcome.is_moved(), hit.is_none());
        }
    }

    struct Wall;

    impl CollisionPolicy<f64> for Wall {
        fn reach(&self) -> f64 {
            0.0
        }

        fn collides(&self, _: &Point<f64>, _: &Point<f64>) -> bool {
            false
        }

        fn find_collision(&self, candidate: &Point<f64>, _: &[Point<f64>]) -> Option<Point<f64>> {
            (candidate.x > 100.0).then(|| Point::new(100.0, candidate.y, candidate.z))
        }
    }

    #[test]
    fn test_custom_policy() {
        let mut tree = tree();
        tree.insert(Point::zero()).unwrap();

        let outcome = tree
            .move_point_with(Point::zero(), Point::new(150.0, 0.0, 0.0), &Wall)
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Blocked(Point::new(100.0, 0.0, 0.0)));

        let outcome = tree
            .move_point_with(Point::zero(), Point::new(90.0, 0.0, 0.0), &Wall)
            .unwrap();
        assert!(outcome.is_moved());
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("w".parse::<Direction>(), Ok(Direction::PosY));
        assert_eq!("S".parse::<Direction>(), Ok(Direction::NegY));
        assert_eq!("d".parse::<Direction>(), Ok(Direction::PosX));
        assert_eq!("a".parse::<Direction>(), Ok(Direction::NegX));
        assert_eq!("e".parse::<Direction>(), Ok(Direction::PosZ));
        assert_eq!("f".parse::<Direction>(), Ok(Direction::NegZ));
        assert_eq!(" -z ".parse::<Direction>(), Ok(Direction::NegZ));
        assert_eq!("y".parse::<Direction>(), Ok(Direction::PosY));
        assert!(matches!(
            "up".parse::<Direction>(),
            Err(TreeError::InvalidDirection(_))
        ));

        for direction in Direction::ALL {
            assert_eq!(direction.to_string().parse::<Direction>(), Ok(direction));
        }
        assert_eq!(Direction::NegY.unit::<f32>(), Point::new(0.0, -1.0, 0.0));
    }
}
