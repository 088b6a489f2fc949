//! An intrusive AVL tree augmented with subtree sizes, answering order-statistic queries.
//!
//! [`AvlTree`] is the intrusive core: items embed a [`Links`] and are owned by the tree through
//! their [`Linked`] handle. [`RankMap`] is an owning map keyed by `i64` built on top of it, and is
//! what most callers want.
//!
//! Besides the usual lookup, insertion and removal, both support:
//!
//! - [`rank`](RankMap::rank): the 1-based position of a key in sorted order,
//! - [`select`](RankMap::select): the entry at a given 1-based position,
//!
//! each in _O(log(n))_ time.
//!
//! # Example
//!
//! ```
//! use avl_rank::{Order, RankMap};
//!
//! let mut tree = RankMap::new();
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     tree.insert(key, key * 10).unwrap();
//! }
//!
//! assert_eq!(tree.select(4).unwrap().key(), 5);
//! assert_eq!(tree.rank(&7).unwrap(), 5);
//!
//! let keys: Vec<i64> = tree.traverse(Order::InOrder).map(|node| node.key()).collect();
//! assert_eq!(keys, [1, 3, 4, 5, 7, 8, 9]);
//! ```

// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`. Leaves have height 0; a missing child has
//   height -1.
// - The size of a node `x` is denoted `s(x)`. It counts the nodes of the subtree rooted at `x`,
//   including `x`. A missing child has size 0.
// - The balance factor of `x` is `h(left(x)) - h(right(x))`.
//
// Invariants holding whenever a public method returns:
// 1. Every balance factor is -1, 0 or 1.
// 2. `h(x) = 1 + max(h(left(x)), h(right(x)))`.
// 3. `s(x) = 1 + s(left(x)) + s(right(x))`.
// 4. Every child's parent link points back at its parent; the root has no parent.
//
// Mutations restore (1)-(3) bottom-up. The walk recomputes `h` and `s` at every ancestor of the
// modified slot, since sizes change all the way to the root even when no rotation happens.
// Rotations refresh the two nodes whose subtrees change before the walk moves past them.

use core::{
    cell::UnsafeCell, cmp::Ordering, fmt, marker::PhantomPinned, mem, ops::Not, pin::Pin,
    ptr::NonNull,
};
use std::borrow::Borrow;

use cordyceps::Linked;
use tracing::trace;

mod debug;
mod error;
mod iter;
pub mod map;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use iter::{Order, Traverse};
pub use map::{Node, RankMap};

/// An item that can be stored in an [`AvlTree`], ordered by its key.
pub trait TreeNode<L>: Linked<L> {
    type Key: Ord + fmt::Debug;

    /// Returns the key this item is ordered by.
    fn key(&self) -> &Self::Key;
}

/// An intrusive AVL tree whose nodes also track the size of their subtree.
pub struct AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    root: Link<T>,
    len: usize,
}

pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    parent: Link<T>,
    children: [Link<T>; 2],
    size: usize,
    height: i8,
    balance_factor: i8,
    _unpin: PhantomPinned,
}

type Link<T> = Option<NonNull<T>>;

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<T> {
        AvlTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree: 0 for a single node, -1 if the tree is empty.
    pub fn height(&self) -> i8 {
        unsafe { self.height_of(self.root) }
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let count = match self.root {
            Some(root) => unsafe {
                assert_eq!(self.links(root).parent(), None, "root has a parent pointer");
                self.assert_invariants_at(root, None, None)
            },
            None => 0,
        };

        assert_eq!(count, self.len, "`len` does not match the number of reachable nodes");
    }

    // Checks the subtree rooted at `node`, whose keys must lie strictly between the keys of
    // `lower` and `upper`. Returns the number of nodes in the subtree.
    unsafe fn assert_invariants_at(&self, node: NonNull<T>, lower: Link<T>, upper: Link<T>) -> usize {
        unsafe {
            let links = self.links(node);
            let key = node.as_ref().key();

            if let Some(lower) = lower {
                assert!(lower.as_ref().key() < key, "{:?} is left of {key:?}", lower.as_ref().key());
            }

            if let Some(upper) = upper {
                assert!(key < upper.as_ref().key(), "{:?} is right of {key:?}", upper.as_ref().key());
            }

            let mut count = 1;

            for (dir, lower, upper) in [(Dir::Left, lower, Some(node)), (Dir::Right, Some(node), upper)] {
                if let Some(child) = links.child(dir) {
                    // Ensure child's parent link points to this node.
                    let parent = self
                        .links(child)
                        .parent()
                        .expect("child parent pointer not set");
                    assert_eq!(node, parent);

                    count += self.assert_invariants_at(child, lower, upper);
                }
            }

            let left_height = self.height_of(links.left());
            let right_height = self.height_of(links.right());

            assert_eq!(links.height(), 1 + left_height.max(right_height), "stale height at {key:?}");
            assert_eq!(
                links.balance_factor(),
                left_height - right_height,
                "stale balance factor at {key:?}"
            );
            assert!(
                (-1..=1).contains(&links.balance_factor()),
                "{key:?} is unbalanced: {}",
                links.balance_factor()
            );
            assert_eq!(links.subtree_size(), count, "stale subtree size at {key:?}");

            count
        }
    }

    /// Returns a reference to the node corresponding to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    /// Returns a pinned mutable reference to the node corresponding to `key`.
    ///
    /// # Safety
    ///
    /// The caller must not modify the key of the returned node in a way that changes its ordering
    /// relative to the other keys in the tree.
    pub unsafe fn get_mut<Q>(&mut self, key: &Q) -> Option<Pin<&mut T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_mut())) }
    }

    /// Returns `true` if the tree contains a node corresponding to `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    fn get_raw<Q>(&self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            unsafe {
                match key.cmp(cur.as_ref().key().borrow()) {
                    Ordering::Less => opt_cur = self.links(cur).left(),
                    Ordering::Equal => return Some(cur),
                    Ordering::Greater => opt_cur = self.links(cur).right(),
                }
            }
        }
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<Pin<&T>> {
        self.first_raw()
            .map(|first| unsafe { Pin::new_unchecked(first.as_ref()) })
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<Pin<&T>> {
        self.last_raw()
            .map(|last| unsafe { Pin::new_unchecked(last.as_ref()) })
    }

    fn first_raw(&self) -> Link<T> {
        let root = self.root?;
        Some(unsafe { self.min_in_subtree(root).0 })
    }

    fn last_raw(&self) -> Link<T> {
        let mut cur = self.root?;

        while let Some(right) = unsafe { self.links(cur).right() } {
            cur = right;
        }

        Some(cur)
    }

    /// Returns the 1-based position of `key` in the sorted order of the tree.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn rank<Q>(&self, key: &Q) -> Option<usize>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        // Every node passed on the way right precedes `key`, along with its left subtree.
        let mut rank = 0;
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            unsafe {
                let left = self.links(cur).left();

                match key.cmp(cur.as_ref().key().borrow()) {
                    Ordering::Less => opt_cur = left,
                    Ordering::Equal => return Some(rank + self.size_of(left) + 1),
                    Ordering::Greater => {
                        rank += self.size_of(left) + 1;
                        opt_cur = self.links(cur).right();
                    }
                }
            }
        }

        None
    }

    /// Returns the node at the 1-based position `index` in the sorted order of the tree.
    ///
    /// Returns `None` if `index` is not in `1..=self.len()`. This operation completes in
    /// _O(log(n))_ time.
    pub fn select(&self, index: usize) -> Option<Pin<&T>> {
        if index == 0 || index > self.len {
            return None;
        }

        let mut index = index;
        let mut cur = self.root?;

        loop {
            unsafe {
                let left = self.links(cur).left();
                let left_size = self.size_of(left);

                match index.cmp(&(left_size + 1)) {
                    Ordering::Less => cur = left?,
                    Ordering::Equal => return Some(Pin::new_unchecked(cur.as_ref())),
                    Ordering::Greater => {
                        index -= left_size + 1;
                        cur = self.links(cur).right()?;
                    }
                }
            }
        }
    }

    /// Returns a lazy iterator over the nodes of the tree in the given order.
    pub fn traverse(&self, order: Order) -> Traverse<'_, T> {
        Traverse::new(self, order)
    }

    /// Returns an iterator over the nodes of the tree in ascending key order.
    pub fn iter(&self) -> Traverse<'_, T> {
        self.traverse(Order::InOrder)
    }

    /// Inserts an item into the tree.
    ///
    /// If the tree already contains an item with an equal key, the tree is left unchanged and
    /// `item` is handed back as the error.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, item: T::Handle) -> Result<Pin<&T>, T::Handle> {
        let ptr = T::into_ptr(item);

        let Some(root) = self.root else {
            // Tree is empty. Set `item` as the root and return.
            unsafe { self.links_mut(ptr).reset() };

            self.root = Some(ptr);
            self.len += 1;

            return Ok(unsafe { Pin::new_unchecked(ptr.as_ref()) });
        };

        // Descend the tree, looking for a vacant slot.
        let mut parent = root;
        let dir = loop {
            let ordering = unsafe { ptr.as_ref().key().cmp(parent.as_ref().key()) };

            let dir = match ordering {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Err(unsafe { T::from_ptr(ptr) }),
                Ordering::Greater => Dir::Right,
            };

            match unsafe { self.links(parent).child(dir) } {
                Some(child) => parent = child,
                None => break dir,
            }
        };

        unsafe {
            let links = self.links_mut(ptr);
            links.reset();
            links.set_parent(Some(parent));

            self.links_mut(parent).set_child(dir, Some(ptr));
        }

        self.len += 1;
        self.rebalance(Some(parent));

        Ok(unsafe { Pin::new_unchecked(ptr.as_ref()) })
    }

    /// Removes the item corresponding to `key` from the tree.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T::Handle>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.get_raw(key)?;
        Some(unsafe { self.remove_at(node) })
    }

    /// Removes and returns the minimum element of the tree.
    pub fn pop_first(&mut self) -> Option<T::Handle> {
        let first = self.first_raw()?;
        Some(unsafe { self.remove_at(first) })
    }

    /// Removes and returns the maximum element of the tree.
    pub fn pop_last(&mut self) -> Option<T::Handle> {
        let last = self.last_raw()?;
        Some(unsafe { self.remove_at(last) })
    }

    /// Removes an arbitrary node from the tree.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element of `self`, and not any
    /// other tree.
    pub unsafe fn remove_at(&mut self, node: NonNull<T>) -> T::Handle {
        // There are two cases:
        //
        // 1. `node` has a right child.
        //
        //    `node`'s successor, the least node of its right subtree, takes `node`'s place. The
        //    successor has no left child, so its own right child (if any) is elevated into the
        //    slot it leaves behind.
        //
        // 2. `node` has no right child.
        //
        //    `node`'s left child (if any) is elevated into `node`'s slot.
        //
        // Either way exactly one slot loses a node, and every ancestor of that slot needs its
        // height and size recomputed.
        unsafe {
            let parent = self.links(node).parent();
            let left = self.links(node).left();
            let right = self.links(node).right();

            let rebalance_from = match right {
                Some(right) => {
                    let (successor, successor_parent) = self.min_in_subtree(right);

                    let lowest_changed = match successor_parent {
                        Some(successor_parent) => {
                            // Elevate the successor's right child to replace it.
                            let successor_right = self.links(successor).right();
                            self.links_mut(successor_parent).set_left(successor_right);
                            self.maybe_set_parent(successor_right, Some(successor_parent));

                            self.links_mut(successor).set_right(Some(right));
                            self.links_mut(right).set_parent(Some(successor));

                            successor_parent
                        }

                        // The successor is `right` itself and keeps its right subtree.
                        None => successor,
                    };

                    self.links_mut(successor).set_left(left);
                    self.maybe_set_parent(left, Some(successor));

                    self.links_mut(successor).set_parent(parent);
                    self.replace_child_or_set_root(parent, node, Some(successor));

                    Some(lowest_changed)
                }

                None => {
                    self.replace_child_or_set_root(parent, node, left);
                    self.maybe_set_parent(left, parent);

                    parent
                }
            };

            self.links_mut(node).reset();
            self.len -= 1;

            self.rebalance(rebalance_from);

            T::from_ptr(node)
        }
    }

    /// Clears the tree, dropping all elements.
    ///
    /// Nodes are dropped in post-order: both subtrees of a node are gone before the node itself.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            unsafe {
                let links = self.links(cur);

                // Descend until a leaf is found, left subtrees first.
                if let Some(child) = links.left().or_else(|| links.right()) {
                    opt_cur = Some(child);
                    continue;
                }

                let parent = links.parent();
                self.replace_child_or_set_root(parent, cur, None);

                drop(T::from_ptr(cur));
                self.len -= 1;

                opt_cur = parent;
            }
        }

        debug_assert!(self.root.is_none());
        debug_assert_eq!(self.len(), 0);
    }

    // Rebalancing ============================================================

    // Walks from `start` up to the root, refreshing heights and sizes and rotating wherever a
    // balance factor has reached +/-2.
    fn rebalance(&mut self, start: Link<T>) {
        let mut opt_cur = start;

        while let Some(cur) = opt_cur {
            unsafe {
                self.update(cur);
                trace!(
                    key = ?cur.as_ref().key(),
                    balance_factor = self.links(cur).balance_factor(),
                    "rebalance"
                );

                let subtree_root = match self.links(cur).balance_factor() {
                    2 => {
                        if self.balance_of(self.links(cur).left()) >= 0 {
                            self.rotate_right(cur)
                        } else {
                            self.rotate_left_right(cur)
                        }
                    }

                    -2 => {
                        if self.balance_of(self.links(cur).right()) <= 0 {
                            self.rotate_left(cur)
                        } else {
                            self.rotate_right_left(cur)
                        }
                    }

                    _ => cur,
                };

                opt_cur = self.links(subtree_root).parent();
            }
        }
    }

    // Fixes a right-heavy `node`. Returns the new root of the rotated subtree.
    unsafe fn rotate_left(&mut self, node: NonNull<T>) -> NonNull<T> {
        unsafe {
            trace!(form = "left", pivot = ?node.as_ref().key(), "rotate");
            self.rotate(node, Dir::Left)
        }
    }

    // Fixes a left-heavy `node`. Returns the new root of the rotated subtree.
    unsafe fn rotate_right(&mut self, node: NonNull<T>) -> NonNull<T> {
        unsafe {
            trace!(form = "right", pivot = ?node.as_ref().key(), "rotate");
            self.rotate(node, Dir::Right)
        }
    }

    unsafe fn rotate_left_right(&mut self, node: NonNull<T>) -> NonNull<T> {
        unsafe {
            trace!(form = "left-right", pivot = ?node.as_ref().key(), "rotate");
            let left = self.links(node).left().expect("left-right rotation without a left child");
            self.rotate(left, Dir::Left);
            self.rotate(node, Dir::Right)
        }
    }

    unsafe fn rotate_right_left(&mut self, node: NonNull<T>) -> NonNull<T> {
        unsafe {
            trace!(form = "right-left", pivot = ?node.as_ref().key(), "rotate");
            let right = self.links(node).right().expect("right-left rotation without a right child");
            self.rotate(right, Dir::Right);
            self.rotate(node, Dir::Left)
        }
    }

    // Performs a rotation moving `down` down in direction `dir` and its `!dir` child up into its
    // place. Returns the child that moved up.
    //
    // The heights and sizes of both nodes are refreshed; those of their ancestors are not.
    unsafe fn rotate(&mut self, down: NonNull<T>, dir: Dir) -> NonNull<T> {
        unsafe {
            let up = self
                .links(down)
                .child(!dir)
                .expect("rotation without a child to move up");

            // `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
            let across = self.links(up).child(dir);
            self.links_mut(down).set_child(!dir, across);
            self.maybe_set_parent(across, Some(down));

            self.links_mut(up).set_child(dir, Some(down));
            let parent = self.links_mut(down).set_parent(Some(up));
            self.links_mut(up).set_parent(parent);
            self.replace_child_or_set_root(parent, down, Some(up));

            // `down` is now below `up`, so it must be refreshed first.
            self.update(down);
            self.update(up);

            up
        }
    }

    // Recomputes the height, balance factor and size of `node` from its children.
    unsafe fn update(&mut self, node: NonNull<T>) {
        unsafe {
            let left = self.links(node).left();
            let right = self.links(node).right();

            let left_height = self.height_of(left);
            let right_height = self.height_of(right);
            let size = 1 + self.size_of(left) + self.size_of(right);

            let links = self.links_mut(node);
            links.set_height(1 + left_height.max(right_height));
            links.set_balance_factor(left_height - right_height);
            links.set_subtree_size(size);
        }
    }

    // Support methods ========================================================

    #[inline]
    unsafe fn links<'a>(&self, node: NonNull<T>) -> &'a Links<T> {
        unsafe { T::links(node).as_ref() }
    }

    #[inline]
    unsafe fn links_mut<'a>(&mut self, node: NonNull<T>) -> &'a mut Links<T> {
        unsafe { T::links(node).as_mut() }
    }

    /// Returns the height of the pointed-to node, or -1 for a missing node.
    unsafe fn height_of(&self, node: Link<T>) -> i8 {
        node.map(|n| unsafe { self.links(n).height() })
            .unwrap_or(-1)
    }

    /// Returns the subtree size of the pointed-to node, or 0 for a missing node.
    unsafe fn size_of(&self, node: Link<T>) -> usize {
        node.map(|n| unsafe { self.links(n).subtree_size() })
            .unwrap_or(0)
    }

    unsafe fn balance_of(&self, node: Link<T>) -> i8 {
        node.map(|n| unsafe { self.links(n).balance_factor() })
            .unwrap_or(0)
    }

    // Returns the minimum node in the subtree.
    //
    // If the subtree root is not the minimum, also returns the minimum node's parent.
    #[inline]
    unsafe fn min_in_subtree(&self, root: NonNull<T>) -> (NonNull<T>, Option<NonNull<T>>) {
        let mut parent = None;
        let mut cur = root;

        while let Some(left) = unsafe { self.links(cur).left() } {
            parent = Some(cur);
            cur = left;
        }

        (cur, parent)
    }

    unsafe fn which_child(&self, parent: NonNull<T>, child: NonNull<T>) -> Dir {
        if unsafe { self.links(parent).left() } == Some(child) {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    unsafe fn maybe_set_parent(&mut self, opt_node: Link<T>, parent: Link<T>) {
        let Some(node) = opt_node else {
            return;
        };

        unsafe { self.links_mut(node).set_parent(parent) };
    }

    #[inline]
    unsafe fn replace_child_or_set_root(
        &mut self,
        parent: Link<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        match parent {
            Some(parent) => unsafe { self.replace_child(parent, old_child, new_child) },
            None => self.root = new_child,
        }
    }

    // Replaces the child pointer of `parent` pointing at `old_child` with `new_child`.
    //
    // `new_child`'s parent pointer is not updated.
    //
    // # Safety
    //
    // The caller must ensure that `old_child` is a child node of `parent`.
    unsafe fn replace_child(
        &mut self,
        parent: NonNull<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        unsafe {
            let dir = self.which_child(parent, old_child);

            debug_assert_eq!(
                self.links(parent).child(dir),
                Some(old_child),
                "`old_child` must be a child of `parent`"
            );

            self.links_mut(parent).set_child(dir, new_child);
        }
    }
}

impl<T> Default for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        AvlTree::new()
    }
}

impl<T> Drop for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                parent: None,
                children: [None; 2],
                size: 1,
                height: 0,
                balance_factor: 0,
                _unpin: PhantomPinned,
            }),
        }
    }

    /// Returns the height of this node's subtree. Leaves have height 0.
    #[inline]
    pub fn height(&self) -> i8 {
        unsafe { (*self.inner.get()).height }
    }

    /// Returns the number of nodes in this node's subtree, including itself.
    #[inline]
    pub fn subtree_size(&self) -> usize {
        unsafe { (*self.inner.get()).size }
    }

    /// Returns the height of the left subtree minus the height of the right subtree.
    #[inline]
    pub fn balance_factor(&self) -> i8 {
        unsafe { (*self.inner.get()).balance_factor }
    }

    #[inline]
    fn parent(&self) -> Link<T> {
        unsafe { (*self.inner.get()).parent }
    }

    #[inline]
    fn child(&self, dir: Dir) -> Link<T> {
        unsafe { (*self.inner.get()).children[dir as usize] }
    }

    #[inline]
    fn left(&self) -> Link<T> {
        self.child(Dir::Left)
    }

    #[inline]
    fn right(&self) -> Link<T> {
        self.child(Dir::Right)
    }

    #[inline]
    fn set_parent(&mut self, parent: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().parent, parent)
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().children[dir as usize], child)
    }

    #[inline]
    fn set_left(&mut self, left: Link<T>) -> Link<T> {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    fn set_right(&mut self, right: Link<T>) -> Link<T> {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    fn set_height(&mut self, height: i8) {
        self.inner.get_mut().height = height;
    }

    #[inline]
    fn set_balance_factor(&mut self, balance_factor: i8) {
        self.inner.get_mut().balance_factor = balance_factor;
    }

    #[inline]
    fn set_subtree_size(&mut self, size: usize) {
        self.inner.get_mut().size = size;
    }

    // Returns the links to the state of a detached leaf.
    fn reset(&mut self) {
        let inner = self.inner.get_mut();
        inner.parent = None;
        inner.children = [None; 2];
        inner.size = 1;
        inner.height = 0;
        inner.balance_factor = 0;
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("height", &self.height())
            .field("size", &self.subtree_size())
            .field("balance_factor", &self.balance_factor())
            .finish_non_exhaustive()
    }
}
