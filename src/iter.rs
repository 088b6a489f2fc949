use core::iter::FusedIterator;

use crate::{AvlTree, Dir, Link, Links, TreeNode};

/// The order in which [`Traverse`] visits the nodes of a tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    /// Left subtree, node, right subtree: ascending key order.
    InOrder,
    /// Node, left subtree, right subtree.
    PreOrder,
    /// Left subtree, right subtree, node.
    PostOrder,
}

// Where the walk stands relative to the current node.
#[derive(Copy, Clone)]
enum Step {
    // The node was just entered from its parent.
    Enter,
    // The left subtree has been exhausted.
    LeftDone,
    // Both subtrees have been exhausted.
    RightDone,
}

/// A lazy depth-first walk over the nodes of an [`AvlTree`].
///
/// The walk follows parent links and needs no allocation. Each call to
/// [`traverse`](AvlTree::traverse) starts a fresh walk.
pub struct Traverse<'tree, T: TreeNode<Links<T>> + ?Sized> {
    tree: &'tree AvlTree<T>,
    order: Order,

    cur: Link<T>,
    step: Step,

    len: usize,
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Traverse<'tree, T> {
    pub(crate) fn new(tree: &'tree AvlTree<T>, order: Order) -> Self {
        Traverse {
            tree,
            order,

            cur: tree.root,
            step: Step::Enter,
            len: tree.len(),
        }
    }

    /// Returns the order of this walk.
    pub fn order(&self) -> Order {
        self.order
    }
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Iterator for Traverse<'tree, T> {
    type Item = &'tree T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(cur) = self.cur {
            let links = unsafe { self.tree.links(cur) };

            // Advance past `cur`'s current step, noting whether this step is where `order`
            // visits it.
            let visit = match self.step {
                Step::Enter => {
                    match links.left() {
                        Some(left) => self.cur = Some(left),
                        None => self.step = Step::LeftDone,
                    }

                    self.order == Order::PreOrder
                }

                Step::LeftDone => {
                    match links.right() {
                        Some(right) => {
                            self.cur = Some(right);
                            self.step = Step::Enter;
                        }
                        None => self.step = Step::RightDone,
                    }

                    self.order == Order::InOrder
                }

                Step::RightDone => {
                    // Ascend one level. The walk ends once the root is done.
                    if let Some(parent) = links.parent() {
                        self.step = match unsafe { self.tree.which_child(parent, cur) } {
                            Dir::Left => Step::LeftDone,
                            Dir::Right => Step::RightDone,
                        };
                    }

                    self.cur = links.parent();

                    self.order == Order::PostOrder
                }
            };

            if visit {
                self.len -= 1;
                return Some(unsafe { cur.as_ref() });
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> ExactSizeIterator for Traverse<'tree, T> {}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> FusedIterator for Traverse<'tree, T> {}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Clone for Traverse<'tree, T> {
    fn clone(&self) -> Self {
        Traverse {
            tree: self.tree,
            order: self.order,
            cur: self.cur,
            step: self.step,
            len: self.len,
        }
    }
}
