use core::{iter::FusedIterator, marker::PhantomData, ptr::NonNull};

use crate::{AvlTree, Link, Links, TreeNode};

// Walks the nodes of a half-open range of the tree from both ends.
//
// `front` and `back` are the next nodes to yield from each end; both are `None` once the range is
// exhausted. The walk follows parent links, so it needs no stack.
pub(crate) struct RawIter<T: TreeNode<Links<T>> + ?Sized> {
    tree: NonNull<AvlTree<T>>,

    front: Link<T>,
    back: Link<T>,
}

impl<T: TreeNode<Links<T>> + ?Sized> RawIter<T> {
    // Creates an iterator over `[first, end)`.
    //
    // # Safety
    //
    // `first` and `end` must each be `None` or a node of `tree`, and `end` must not come before
    // `first` in tree order. `tree` must outlive the iterator and stay unmodified while it is used.
    pub(crate) unsafe fn new(tree: NonNull<AvlTree<T>>, first: Link<T>, end: Link<T>) -> Self {
        let (front, back) = match first {
            Some(_) if first != end => {
                let back = unsafe {
                    let tree = tree.as_ref();
                    match end {
                        Some(end) => tree.predecessor_raw(end),
                        None => tree.last_raw(),
                    }
                };

                (first, back)
            }

            _ => (None, None),
        };

        RawIter { tree, front, back }
    }

    pub(crate) fn next(&mut self) -> Link<T> {
        let cur = self.front?;

        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.front = unsafe { self.tree.as_ref().successor_raw(cur) };
        }

        Some(cur)
    }

    pub(crate) fn next_back(&mut self) -> Link<T> {
        let cur = self.back?;

        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.back = unsafe { self.tree.as_ref().predecessor_raw(cur) };
        }

        Some(cur)
    }
}

impl<T: TreeNode<Links<T>> + ?Sized> Clone for RawIter<T> {
    fn clone(&self) -> Self {
        RawIter {
            tree: self.tree,
            front: self.front,
            back: self.back,
        }
    }
}

/// An iterator over the elements of an [`AvlTree`], in ascending key order.
///
/// Elements with equal keys are yielded in tree order. Use [`Iterator::rev`] to walk the tree in
/// descending order.
pub struct Iter<'tree, T: TreeNode<Links<T>> + ?Sized> {
    raw: RawIter<T>,
    phantom: PhantomData<&'tree AvlTree<T>>,
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Iter<'tree, T> {
    pub(crate) fn new(tree: &'tree AvlTree<T>) -> Self {
        unsafe { Iter::between(tree, tree.first_raw(), None) }
    }

    // # Safety
    //
    // See `RawIter::new`.
    pub(crate) unsafe fn between(tree: &'tree AvlTree<T>, first: Link<T>, end: Link<T>) -> Self {
        Iter {
            raw: unsafe { RawIter::new(tree.into(), first, end) },
            phantom: PhantomData,
        }
    }
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Iterator for Iter<'tree, T> {
    type Item = &'tree T;

    fn next(&mut self) -> Option<Self::Item> {
        self.raw.next().map(|node| unsafe { node.as_ref() })
    }
}

impl<T: TreeNode<Links<T>> + ?Sized> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.raw.next_back().map(|node| unsafe { node.as_ref() })
    }
}

impl<T: TreeNode<Links<T>> + ?Sized> FusedIterator for Iter<'_, T> {}

impl<T: TreeNode<Links<T>> + ?Sized> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            raw: self.raw.clone(),
            phantom: PhantomData,
        }
    }
}
