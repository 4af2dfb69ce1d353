//! Thread safe handle to a single [`Octree`].

use std::{
    io::BufRead,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use log::warn;

use crate::{
    bounding::{Point, Real},
    config::{ConfigError, TreeConfig},
    export::Snapshot,
    game::{Direction, MoveOutcome},
    load::{LoadError, LoadReport},
    tree::Octree,
    TreeError,
};

/// Cloneable handle to a tree shared between threads.
///
/// Readers run in parallel, writers hold the whole tree. A move keeps the
/// write lock across its collision check, removal and insertion, so no
/// other handle sees the point half moved.
///
/// ```rust
/// use pointree::prelude::*;
///
/// let tree = SharedOctree::<f64>::new(TreeConfig::default()).unwrap();
/// let handle = tree.clone();
///
/// std::thread::spawn(move || handle.insert(Point::splat(10.0)).unwrap())
///     .join()
///     .unwrap();
///
/// assert!(tree.find(&Point::splat(10.0)).is_some());
/// ```
#[derive(Clone, Debug)]
pub struct SharedOctree<R: Real> {
    inner: Arc<RwLock<Octree<R>>>,
}

impl<R: Real> Default for SharedOctree<R> {
    fn default() -> Self {
        SharedOctree::from(Octree::default())
    }
}

impl<R: Real> From<Octree<R>> for SharedOctree<R> {
    fn from(tree: Octree<R>) -> Self {
        SharedOctree {
            inner: Arc::new(RwLock::new(tree)),
        }
    }
}

impl<R: Real> SharedOctree<R> {
    pub fn new(config: TreeConfig<R>) -> Result<Self, ConfigError> {
        Ok(Octree::new(config)?.into())
    }

    /// Shared access for anything not covered by the methods below.
    pub fn read(&self) -> RwLockReadGuard<'_, Octree<R>> {
        self.inner.read().unwrap_or_else(|err| {
            warn!("Recovering poisoned octree lock");
            PoisonError::into_inner(err)
        })
    }

    /// Exclusive access for anything not covered by the methods below.
    pub fn write(&self) -> RwLockWriteGuard<'_, Octree<R>> {
        self.inner.write().unwrap_or_else(|err| {
            warn!("Recovering poisoned octree lock");
            PoisonError::into_inner(err)
        })
    }

    pub fn config(&self) -> TreeConfig<R> {
        *self.read().config()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn insert(&self, point: Point<R>) -> Result<(), TreeError> {
        self.write().insert(point)
    }

    pub fn remove(&self, point: &Point<R>) -> bool {
        self.write().remove(point)
    }

    pub fn clear(&self) {
        self.write().clear()
    }

    pub fn find(&self, point: &Point<R>) -> Option<Point<R>> {
        self.read().find(point)
    }

    pub fn range_query(&self, a: Point<R>, b: Point<R>) -> Result<Vec<Point<R>>, TreeError> {
        self.read().range_query(a, b)
    }

    pub fn nearest_neighbors(&self, target: &Point<R>, k: usize) -> Vec<Point<R>> {
        self.read().nearest_neighbors(target, k)
    }

    /// Moves a point using the configured collision radius.
    pub fn move_point(&self, old: Point<R>, new: Point<R>) -> Result<MoveOutcome<R>, TreeError> {
        let mut tree = self.write();
        let radius = tree.config().collision_radius;
        tree.move_point(old, new, radius)
    }

    /// Moves a point by the configured step, using the configured collision radius.
    pub fn move_by_direction(
        &self,
        point: Point<R>,
        direction: Direction,
    ) -> Result<MoveOutcome<R>, TreeError> {
        let mut tree = self.write();
        let TreeConfig {
            step,
            collision_radius,
            ..
        } = *tree.config();
        tree.move_by_direction(point, direction, step, collision_radius)
    }

    /// Collision check with the configured radius.
    pub fn collision_check(&self, point: &Point<R>) -> Option<Point<R>> {
        let tree = self.read();
        tree.collision_check(point, tree.config().collision_radius)
    }

    pub fn points(&self) -> Vec<Point<R>> {
        self.read().points()
    }

    pub fn export_structure(&self) -> Snapshot<R> {
        self.read().export_structure()
    }

    pub fn load_points<B: BufRead>(&self, reader: B) -> Result<LoadReport, LoadError> {
        self.write().load_points(reader)
    }
}
