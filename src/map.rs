extern crate alloc;

use alloc::boxed::Box;
use core::{fmt, marker::PhantomPinned, ptr::NonNull};

use cordyceps::Linked;
use tracing::debug;

use crate::{AvlTree, Error, Links, Order, Result, TreeNode, Traverse};

/// An ordered map from `i64` keys to values, answering rank and select queries.
///
/// Backed by an [`AvlTree`] whose nodes track their subtree sizes.
pub struct RankMap<V> {
    tree: AvlTree<Node<V>>,
}

/// A key-value pair stored in a [`RankMap`], along with its position in the tree.
///
/// References to nodes borrow the map, so they cannot outlive a mutation that might move or drop
/// the node.
pub struct Node<V> {
    links: Links<Node<V>>,
    key: i64,
    value: V,
    _unpin: PhantomPinned,
}

impl<V> Node<V> {
    pub(crate) fn new(key: i64, value: V) -> Box<Self> {
        Box::new(Node {
            links: Links::new(),
            key,
            value,
            _unpin: PhantomPinned,
        })
    }

    /// Returns the key of this node.
    pub fn key(&self) -> i64 {
        self.key
    }

    /// Returns a reference to the value of this node.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns the height of this node's subtree. Leaves have height 0.
    pub fn height(&self) -> i8 {
        self.links.height()
    }

    /// Returns the number of nodes in this node's subtree, including itself.
    pub fn subtree_size(&self) -> usize {
        self.links.subtree_size()
    }

    /// Returns the height of the left subtree minus the height of the right subtree.
    pub fn balance_factor(&self) -> i8 {
        self.links.balance_factor()
    }

    /// Returns this node's parent, if any.
    pub fn parent(&self) -> Option<&Node<V>> {
        self.links.parent().map(|p| unsafe { p.as_ref() })
    }

    /// Returns this node's left child, if any.
    pub fn left(&self) -> Option<&Node<V>> {
        self.links.left().map(|l| unsafe { l.as_ref() })
    }

    /// Returns this node's right child, if any.
    pub fn right(&self) -> Option<&Node<V>> {
        self.links.right().map(|r| unsafe { r.as_ref() })
    }

    fn into_entry(self: Box<Self>) -> (i64, V) {
        let Node { key, value, .. } = *self;
        (key, value)
    }
}

impl<V: fmt::Debug> fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("links", &self.links)
            .finish()
    }
}

unsafe impl<V> Linked<Links<Node<V>>> for Node<V> {
    type Handle = Box<Self>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<Node<V>>> {
        let ptr = ptr.as_ptr();
        unsafe { NonNull::new_unchecked(core::ptr::addr_of_mut!((*ptr).links)) }
    }
}

impl<V> TreeNode<Links<Node<V>>> for Node<V> {
    type Key = i64;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

impl<V> RankMap<V> {
    /// Creates a new, empty `RankMap`.
    pub const fn new() -> Self {
        Self {
            tree: AvlTree::new(),
        }
    }

    /// Returns `true` if the map contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the map.
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the height of the underlying tree, or -1 if the map is empty.
    pub fn height(&self) -> i8 {
        self.tree.height()
    }

    /// Returns the node holding `key`.
    pub fn find(&self, key: &i64) -> Result<&Node<V>> {
        self.tree
            .get(key)
            .map(|node| node.get_ref())
            .ok_or(Error::NotFound(*key))
    }

    /// Returns `true` if the map contains a value associated with `key`.
    #[inline]
    pub fn contains_key(&self, key: &i64) -> bool {
        self.tree.contains_key(key)
    }

    /// Returns a reference to the value associated with `key`.
    #[inline]
    pub fn get(&self, key: &i64) -> Option<&V> {
        self.tree.get(key).map(|node| &node.get_ref().value)
    }

    /// Returns a mutable reference to the value associated with `key`.
    #[inline]
    pub fn get_mut(&mut self, key: &i64) -> Option<&mut V> {
        // SAFETY: Pinning is not structural for `node.value`, and the key is left untouched.
        unsafe {
            self.tree
                .get_mut(key)
                .map(|node| &mut node.get_unchecked_mut().value)
        }
    }

    /// Inserts `value` under `key`.
    ///
    /// If `key` is already present the map is left unchanged, `value` is dropped and
    /// [`Error::DuplicateKey`] is returned. Use [`get_mut`](Self::get_mut) to update an existing
    /// value.
    pub fn insert(&mut self, key: i64, value: V) -> Result<()> {
        match self.tree.insert(Node::new(key, value)) {
            Ok(_) => Ok(()),
            Err(_rejected) => {
                debug!(key, "rejected duplicate key");
                Err(Error::DuplicateKey(key))
            }
        }
    }

    /// Removes `key` from the map, returning its value.
    pub fn delete(&mut self, key: &i64) -> Result<V> {
        match self.tree.remove(key) {
            Some(node) => Ok(node.value),
            None => {
                debug!(key, "delete of missing key");
                Err(Error::NotFound(*key))
            }
        }
    }

    /// Returns the 1-based position of `key` in ascending key order.
    pub fn rank(&self, key: &i64) -> Result<usize> {
        self.tree.rank(key).ok_or_else(|| {
            debug!(key, "rank of missing key");
            Error::NotFound(*key)
        })
    }

    /// Returns the node at the 1-based position `index` in ascending key order.
    pub fn select(&self, index: usize) -> Result<&Node<V>> {
        self.tree
            .select(index)
            .map(|node| node.get_ref())
            .ok_or_else(|| {
                debug!(index, len = self.len(), "select out of range");
                Error::OutOfRange {
                    index,
                    len: self.len(),
                }
            })
    }

    /// Returns a lazy iterator over the nodes in the given order.
    pub fn traverse(&self, order: Order) -> Traverse<'_, Node<V>> {
        self.tree.traverse(order)
    }

    /// Returns an iterator over the entries in ascending key order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (i64, &V)> + '_ {
        self.tree.iter().map(|node| (node.key, &node.value))
    }

    /// Returns an iterator over the keys in ascending order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = i64> + '_ {
        self.tree.iter().map(|node| node.key)
    }

    /// Returns an iterator over the values in ascending key order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
        self.tree.iter().map(|node| &node.value)
    }

    /// Returns the first key-value pair in the map.
    ///
    /// The returned key is the minimum key in the map.
    #[inline]
    pub fn first_key_value(&self) -> Option<(i64, &V)> {
        self.tree.first().map(|node| (node.key, &node.get_ref().value))
    }

    /// Removes and returns the first key-value pair in the map.
    ///
    /// The returned key is the minimum key in the map.
    #[inline]
    pub fn pop_first(&mut self) -> Option<(i64, V)> {
        self.tree.pop_first().map(Node::into_entry)
    }

    /// Returns the last key-value pair in the map.
    ///
    /// The returned key is the maximum key in the map.
    #[inline]
    pub fn last_key_value(&self) -> Option<(i64, &V)> {
        self.tree.last().map(|node| (node.key, &node.get_ref().value))
    }

    /// Removes and returns the last key-value pair in the map.
    ///
    /// The returned key is the maximum key in the map.
    #[inline]
    pub fn pop_last(&mut self) -> Option<(i64, V)> {
        self.tree.pop_last().map(Node::into_entry)
    }

    /// Clears the map, dropping all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns a reference to the underlying tree.
    pub fn as_tree(&self) -> &AvlTree<Node<V>> {
        &self.tree
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        self.tree.assert_invariants();
    }
}

impl<V> Default for RankMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for RankMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Extend<(i64, V)> for RankMap<V> {
    /// Inserts every pair, skipping keys that are already present.
    ///
    /// Unlike `BTreeMap`, existing values are never overwritten: the first value seen for a key
    /// wins.
    fn extend<I: IntoIterator<Item = (i64, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            let _ = self.insert(key, value);
        }
    }
}

impl<V> FromIterator<(i64, V)> for RankMap<V> {
    fn from_iter<I: IntoIterator<Item = (i64, V)>>(iter: I) -> Self {
        let mut map = RankMap::new();
        map.extend(iter);
        map
    }
}
