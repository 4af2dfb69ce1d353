//! [`Pool`] implementation.

use std::{
    array::from_fn,
    ops::{Index, IndexMut},
};

use crate::{
    bounding::Real,
    node::{Node, NodeType},
    NodeId,
};

/// Slot of a [`Pool`].
#[derive(Clone)]
pub(crate) enum PoolItem<T> {
    Filled(T),
    Empty,
}

impl<T> From<T> for PoolItem<T> {
    fn from(item: T) -> Self {
        PoolItem::Filled(item)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for PoolItem<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolItem::Filled(item) => write!(f, "Filled({:?})", item),
            PoolItem::Empty => write!(f, "Empty"),
        }
    }
}

/// [`Pool`] data structure.
///
/// Flat arena of tree nodes addressed by [`NodeId`].
/// Removed slots are kept on a free list and reused by later insertions.
#[derive(Clone)]
pub struct Pool<T> {
    pub(crate) vec: Vec<PoolItem<T>>,
    pub(crate) garbage: Vec<usize>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Pool {
            vec: Default::default(),
            garbage: Default::default(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("vec", &self.vec)
            .field("garbage", &self.garbage)
            .finish()
    }
}

/// Indexing a [`pool`](Pool) with [`NodeId`]
///
/// ```ignore
/// let node = &tree.nodes[NodeId(42)];
/// ```
impl<T> Index<NodeId> for Pool<T> {
    type Output = T;

    fn index(&self, index: NodeId) -> &Self::Output {
        debug_assert!(!self.is_garbage(index), "Indexing garbage node: {index}");
        self.get_unchecked(index)
    }
}

/// Mutable Indexing a [`pool`](Pool) with [`NodeId`]
///
/// ```ignore
/// let mut node = &mut tree.nodes[NodeId(42)];
/// ```
impl<T> IndexMut<NodeId> for Pool<T> {
    fn index_mut(&mut self, index: NodeId) -> &mut Self::Output {
        debug_assert!(
            !self.is_garbage(index),
            "Mut Indexing garbaged node: {index}"
        );
        self.get_mut_unchecked(index)
    }
}

impl<T> Pool<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Pool {
            vec: Vec::with_capacity(capacity),
            garbage: Default::default(),
        }
    }

    #[inline(always)]
    pub(crate) fn insert(&mut self, t: T) -> NodeId {
        if let Some(idx) = self.garbage.pop() {
            self.vec[idx] = PoolItem::Filled(t);
            idx.into()
        } else {
            self.vec.push(PoolItem::Filled(t));
            (self.vec.len() - 1).into()
        }
    }

    /// Takes the item out of its slot and puts the slot on the free list.
    #[inline(always)]
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<T> {
        let index: usize = id.into();
        let item = std::mem::replace(self.vec.get_mut(index)?, PoolItem::Empty);
        match item {
            PoolItem::Filled(item) => {
                self.garbage.push(index);
                Some(item)
            }
            PoolItem::Empty => None,
        }
    }

    /// Drops every item.
    pub fn clear(&mut self) {
        self.vec.clear();
        self.garbage.clear();
    }

    /// Returns the number of actual items.
    ///
    /// Free slots are not counted.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.vec.len() - self.garbage_len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of free slots.
    #[inline(always)]
    pub fn garbage_len(&self) -> usize {
        self.garbage.len()
    }

    #[inline(always)]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        match self.vec.get(usize::from(id)) {
            Some(PoolItem::Filled(item)) => Some(item),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn get_unchecked(&self, id: NodeId) -> &T {
        if let PoolItem::Filled(ref item) = self.vec[usize::from(id)] {
            item
        } else {
            unreachable!("Accessing garbaged node: {id}")
        }
    }

    #[inline(always)]
    pub fn get_mut_unchecked(&mut self, id: NodeId) -> &mut T {
        if let PoolItem::Filled(ref mut item) = self.vec[usize::from(id)] {
            item
        } else {
            unreachable!("Accessing garbaged node: {id}")
        }
    }

    #[inline(always)]
    pub fn is_garbage(&self, id: NodeId) -> bool {
        !matches!(self.vec.get(usize::from(id)), Some(PoolItem::Filled(_)))
    }

    /// Returns a [`PoolIterator`], which iterates over the actual items.
    ///
    /// Free slots are skipped.
    pub fn iter(&self) -> PoolIterator<'_, T> {
        PoolIterator::new(self)
    }
}

impl<R: Real> Pool<Node<R>> {
    /// Construct a [`Pool`] of [`nodes`](Node) holding a single empty root.
    pub(crate) fn from_root(root: Node<R>, capacity: usize) -> Self {
        let mut pool = Pool::with_capacity(capacity.max(1));
        pool.insert(root);
        pool
    }

    /// Creates eight empty leaves, one per octant of `parent`.
    #[inline(always)]
    pub(crate) fn branch(&mut self, parent: NodeId) -> [NodeId; 8] {
        let Node {
            cube,
            bounds,
            depth,
            ..
        } = self[parent];
        let cubes = cube.split();
        from_fn(|i| {
            let mut node = Node::from_cube(cubes[i], depth + 1, Some(parent));
            node.bounds = bounds.octant(i, cube.center);
            self.insert(node)
        })
    }

    /// Number of leaves currently in the pool.
    pub fn leaf_count(&self) -> usize {
        self.iter()
            .filter(|node| matches!(node.ntype, NodeType::Leaf(_)))
            .count()
    }
}

/// Iterator for a [`Pool`].
///
/// Yields only an actual items.
/// Free slots are skipped.
#[derive(Clone)]
pub struct PoolIterator<'pool, T> {
    inner: std::slice::Iter<'pool, PoolItem<T>>,
    garbage_len: usize,
}

impl<'pool, T> PoolIterator<'pool, T> {
    fn new(pool: &'pool Pool<T>) -> Self {
        PoolIterator {
            inner: pool.vec.iter(),
            garbage_len: pool.garbage_len(),
        }
    }
}

impl<'pool, T> Iterator for PoolIterator<'pool, T> {
    type Item = &'pool T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                PoolItem::Filled(item) => return Some(item),
                PoolItem::Empty => continue,
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let hint = self.inner.size_hint();
        (
            hint.0.saturating_sub(self.garbage_len),
            hint.1.map(|x| x.saturating_sub(self.garbage_len)),
        )
    }
}

impl<'pool, T> std::iter::FusedIterator for PoolIterator<'pool, T> where
    std::slice::Iter<'pool, PoolItem<T>>: std::iter::FusedIterator
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounding::{Cube, Point};

    #[test]
    fn test_remove_reuses_slots() {
        let mut pool = Pool::<u32>::with_capacity(16);
        for i in 0..16 {
            assert_eq!(pool.insert(i), NodeId(i));
            assert_eq!(pool.len(), (i + 1) as usize);
            assert_eq!(pool.garbage_len(), 0);
        }

        for i in 0..8 {
            assert_eq!(pool.remove(NodeId(i)), Some(i));
            assert_eq!(pool.len(), (15 - i) as usize);
            assert_eq!(pool.garbage_len(), (i + 1) as usize);
        }

        // Second remove of the same slot is a no-op.
        assert_eq!(pool.remove(NodeId(3)), None);
        assert_eq!(pool.garbage_len(), 8);
        assert!(pool.is_garbage(NodeId(3)));
        assert!(pool.get(NodeId(3)).is_none());

        let reused = pool.insert(100);
        assert_eq!(reused, NodeId(7));
        assert_eq!(pool[reused], 100);
        assert_eq!(pool.garbage_len(), 7);
        assert_eq!(pool.iter().count(), 9);
    }

    #[test]
    fn test_branch() {
        let root = Node::from_cube(Cube::new_unchecked(Point::zero(), 8.0f32), 0, None);
        let mut pool = Pool::from_root(root, 16);

        let children = pool.branch(NodeId(0));
        assert_eq!(pool.len(), 9);
        assert_eq!(pool.leaf_count(), 9);

        for (i, child) in children.into_iter().enumerate() {
            assert_eq!(child, NodeId(i as u32 + 1));
            assert_eq!(pool[child].depth, 1);
            assert_eq!(pool[child].parent, Some(NodeId(0)));
            assert_eq!(pool[child].cube.half_size, 4.0);
            assert!(pool[child].bounds.contains(pool[child].cube.center));
            assert_eq!(pool[child].bounds, pool[child].cube.aabb());
            assert!(pool[child].is_empty());
        }
    }
}
