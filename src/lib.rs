//! An intrusive AVL tree which admits duplicate keys, and an ordered multiset built on top of it.
#![cfg_attr(not(feature = "std"), no_std)]

// Conventions used in comments:
// - The height `h(x)` of a node `x` is the number of nodes on the longest downward path from `x`.
//   A missing child has height 0 and a leaf has height 1.
// - The balance factor of `x` is `h(left(x)) - h(right(x))`.
// - `x` is "left-heavy" if its balance factor is above 1, "right-heavy" if it is below -1.
//
// The invariants of the tree are:
// 1. Every key in the left subtree of `x` is `<=` the key of `x`, and every key in the right
//    subtree of `x` is `>=` it. Equal keys may sit on either side of one another.
// 2. Every balance factor is -1, 0 or 1.
// 3. The height cached in the links of every node is exact.
//
// Insertion descends left whenever the new key is `<=` the current one, so a key equal to one
// already present lands in the left subtree of the first equal node on its path. Rotations
// preserve the in-order sequence, so lookups only ever depend on (1).

#[cfg(feature = "alloc")]
extern crate alloc;

use core::{
    borrow::Borrow, cell::UnsafeCell, marker::PhantomPinned, mem, ops::Not, pin::Pin,
    ptr::NonNull,
};

use cordyceps::Linked;

mod cursor;
#[cfg(feature = "alloc")]
mod debug;
mod iter;
#[cfg(all(feature = "alloc", any(test, feature = "model")))]
pub mod model;
#[cfg(feature = "alloc")]
pub mod multiset;
#[cfg(feature = "alloc")]
mod order;

#[cfg(all(test, feature = "alloc"))]
mod tests;

pub use cursor::{Cursor, CursorMut};
pub use iter::Iter;
#[cfg(feature = "alloc")]
pub use multiset::AvlMultiset;

pub trait TreeNode<L>: Linked<L> {
    type Key: Ord;

    fn key(&self) -> &Self::Key;
}

/// An intrusive AVL tree whose nodes may share keys.
///
/// The tree takes ownership of every inserted node's [`Linked::Handle`] and gives it back when the
/// node is removed. Dropping the tree drops every node still linked into it.
pub struct AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    root: Link<T>,
}

#[derive(Debug)]
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
    height: i8,
    _unpin: PhantomPinned,
}

type Link<T> = Option<NonNull<T>>;

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<T> {
        AvlTree { root: None }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the tree.
    ///
    /// No running count is kept; this walks the whole tree and completes in _O(n)_ time.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns the height of the tree, 0 if it is empty.
    pub fn height(&self) -> usize {
        unsafe { self.height_of(self.root) as usize }
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        if let Some(root) = self.root {
            unsafe {
                assert!(self.links(root).parent().is_none(), "root has a parent");
                self.assert_invariants_at(root);
            }
        }

        // The search order holds iff the in-order sequence is sorted.
        let mut prev: Option<&T> = None;
        for node in self.iter() {
            if let Some(prev) = prev {
                assert!(prev.key() <= node.key(), "in-order sequence is not sorted");
            }
            prev = Some(node);
        }
    }

    // Checks parent links, cached heights and balance factors below `node`, returning the height
    // of its subtree as recomputed from scratch.
    unsafe fn assert_invariants_at(&self, node: NonNull<T>) -> i8 {
        unsafe {
            let mut heights = [0; 2];

            for dir in [Dir::Left, Dir::Right] {
                if let Some(child) = self.links(node).child(dir) {
                    // Ensure child's parent link points to this node.
                    let parent = self
                        .links(child)
                        .parent()
                        .expect("child parent pointer not set");
                    assert_eq!(node, parent);

                    heights[dir as usize] = self.assert_invariants_at(child);
                }
            }

            let [left, right] = heights;
            let height = left.max(right) + 1;

            assert_eq!(self.links(node).height(), height, "cached height is stale");
            assert!((left - right).abs() <= 1, "balance factor out of range");

            height
        }
    }

    /// Returns a reference to the first node whose key is equal to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ptr = self.find_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    /// Returns `true` if the tree holds at least one node whose key is equal to `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_raw(key).is_some()
    }

    /// Returns the number of nodes whose key is equal to `key`.
    ///
    /// This operation completes in _O(log(n) + k)_ time, where `k` is the returned count.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut count = 0;
        let mut cur = self.lower_bound_raw(key);

        while let Some(node) = cur.filter(|n| unsafe { n.as_ref().key().borrow() == key }) {
            count += 1;
            cur = unsafe { self.successor_raw(node) };
        }

        count
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

    /// Returns an iterator over the elements of the tree, in ascending key order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Returns an iterator over the elements whose key is equal to `key`, in tree order.
    pub fn equal_range<Q>(&self, key: &Q) -> Iter<'_, T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let first = self.lower_bound_raw(key);
        let end = self.upper_bound_raw(key);

        unsafe { Iter::between(self, first, end) }
    }

    /// Returns a cursor pointing at the first element of the tree.
    ///
    /// If the tree is empty, the cursor points at the "ghost" non-element.
    pub fn cursor_first(&self) -> Cursor<'_, T> {
        Cursor::at(self, self.first_raw())
    }

    /// Returns a cursor pointing at the last element of the tree.
    ///
    /// If the tree is empty, the cursor points at the "ghost" non-element.
    pub fn cursor_last(&self) -> Cursor<'_, T> {
        Cursor::at(self, self.last_raw())
    }

    /// Returns a cursor pointing at the "ghost" non-element past the last element.
    pub fn cursor_end(&self) -> Cursor<'_, T> {
        Cursor::at(self, None)
    }

    /// Returns a mutable cursor pointing at the first element of the tree.
    pub fn cursor_first_mut(&mut self) -> CursorMut<'_, T> {
        let first = self.first_raw();
        CursorMut::at(self, first)
    }

    /// Returns a mutable cursor pointing at the last element of the tree.
    pub fn cursor_last_mut(&mut self) -> CursorMut<'_, T> {
        let last = self.last_raw();
        CursorMut::at(self, last)
    }

    /// Returns a mutable cursor pointing at the "ghost" non-element.
    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::at(self, None)
    }

    /// Returns a cursor pointing at the first element whose key is not less than `key`.
    ///
    /// If there is no such element, the cursor points at the "ghost" non-element.
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Cursor::at(self, self.lower_bound_raw(key))
    }

    /// Returns a cursor pointing at the first element whose key is greater than `key`.
    ///
    /// If there is no such element, the cursor points at the "ghost" non-element.
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Cursor::at(self, self.upper_bound_raw(key))
    }

    /// Returns a cursor pointing at the first element whose key is equal to `key`.
    ///
    /// If there is no such element, the cursor points at the "ghost" non-element.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Cursor::at(self, self.find_raw(key))
    }

    /// Mutable counterpart of [`lower_bound`](AvlTree::lower_bound).
    pub fn lower_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ptr = self.lower_bound_raw(key);
        CursorMut::at(self, ptr)
    }

    /// Mutable counterpart of [`upper_bound`](AvlTree::upper_bound).
    pub fn upper_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ptr = self.upper_bound_raw(key);
        CursorMut::at(self, ptr)
    }

    /// Mutable counterpart of [`find`](AvlTree::find).
    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ptr = self.find_raw(key);
        CursorMut::at(self, ptr)
    }

    pub(crate) fn first_raw(&self) -> Link<T> {
        self.root
            .map(|root| unsafe { self.extreme_in_subtree(root, Dir::Left) })
    }

    pub(crate) fn last_raw(&self) -> Link<T> {
        self.root
            .map(|root| unsafe { self.extreme_in_subtree(root, Dir::Right) })
    }

    pub(crate) fn lower_bound_raw<Q>(&self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cur = self.root?;

        unsafe {
            loop {
                let links = self.links(cur);

                if key <= cur.as_ref().key().borrow() {
                    // The answer is this node or lies in its left subtree.
                    match links.left() {
                        Some(left) => cur = left,
                        None => return Some(cur),
                    }
                } else {
                    // Every node up to and including this one is too small.
                    match links.right() {
                        Some(right) => cur = right,
                        None => return self.successor_raw(cur),
                    }
                }
            }
        }
    }

    pub(crate) fn upper_bound_raw<Q>(&self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cur = self.lower_bound_raw(key);

        while let Some(node) = cur.filter(|n| unsafe { n.as_ref().key().borrow() == key }) {
            cur = unsafe { self.successor_raw(node) };
        }

        cur
    }

    pub(crate) fn find_raw<Q>(&self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.lower_bound_raw(key)
            .filter(|n| unsafe { n.as_ref().key().borrow() == key })
    }

    // Returns the in-order successor (`Dir::Right`) or predecessor (`Dir::Left`) of `node`.
    //
    // If `node` has a child in direction `dir`, the neighbor is the extreme node of that subtree
    // in the opposite direction. Otherwise, ascend while `node` is a `dir` child; the parent
    // reached from the other side is the neighbor.
    unsafe fn neighbor_raw(&self, node: NonNull<T>, dir: Dir) -> Link<T> {
        unsafe {
            if let Some(child) = self.links(node).child(dir) {
                return Some(self.extreme_in_subtree(child, !dir));
            }

            let mut cur = node;
            while let Some(parent) = self.links(cur).parent() {
                if self.which_child(parent, Some(cur)) == !dir {
                    return Some(parent);
                }

                cur = parent;
            }

            None
        }
    }

    #[inline]
    pub(crate) unsafe fn successor_raw(&self, node: NonNull<T>) -> Link<T> {
        unsafe { self.neighbor_raw(node, Dir::Right) }
    }

    #[inline]
    pub(crate) unsafe fn predecessor_raw(&self, node: NonNull<T>) -> Link<T> {
        unsafe { self.neighbor_raw(node, Dir::Left) }
    }

    // Returns the left-most (`Dir::Left`) or right-most (`Dir::Right`) node in the subtree.
    #[inline]
    unsafe fn extreme_in_subtree(&self, root: NonNull<T>, dir: Dir) -> NonNull<T> {
        let mut cur = root;

        while let Some(child) = unsafe { self.links(cur).child(dir) } {
            cur = child;
        }

        cur
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
    // The caller must ensure that the following conditions hold:
    // - `old_child` is a child node of `parent`.
    // - `new_child` is not a child node of `parent`.
    unsafe fn replace_child(
        &mut self,
        parent: NonNull<T>,
        old_child: NonNull<T>,
        new_child: Option<NonNull<T>>,
    ) {
        unsafe {
            let dir = self.which_child(parent, Some(old_child));

            debug_assert_eq!(
                self.links(parent).child(dir),
                Some(old_child),
                "`old_child` must be a child of `parent`"
            );
            debug_assert!(
                new_child.is_none() || self.links(parent).child(!dir) != new_child,
                "`new_child` must not be a child of `parent`"
            );

            self.links_mut(parent).set_child(dir, new_child);
        }
    }

    #[inline]
    unsafe fn which_child(&self, parent: NonNull<T>, child: Link<T>) -> Dir {
        if unsafe { self.links(parent).left() } == child {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    #[inline]
    unsafe fn height_of(&self, node: Link<T>) -> i8 {
        node.map(|n| unsafe { self.links(n).height() })
            .unwrap_or(0)
    }

    #[inline]
    pub(crate) unsafe fn balance_factor(&self, node: NonNull<T>) -> i8 {
        unsafe {
            let links = self.links(node);
            self.height_of(links.left()) - self.height_of(links.right())
        }
    }

    #[inline]
    pub(crate) unsafe fn node_height(&self, node: NonNull<T>) -> i8 {
        unsafe { self.links(node).height() }
    }

    // Recomputes the cached height of `node` from its children. Returns `true` if it changed.
    #[inline]
    unsafe fn update_height(&mut self, node: NonNull<T>) -> bool {
        unsafe {
            let links = self.links(node);
            let height = self
                .height_of(links.left())
                .max(self.height_of(links.right()))
                .checked_add(1)
                .unwrap();

            self.links_mut(node).set_height(height) != height
        }
    }

    // Performs a rotation, moving `up` up and its parent `down` down.
    //
    // Heights of `down` and `up` are refreshed; heights of their ancestors are not.
    fn rotate_at(&mut self, down: NonNull<T>, up: NonNull<T>) {
        unsafe {
            // - `down` becomes the `dir` child of `up`.
            // - `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
            let dir = if self.links(down).right() == Some(up) {
                Dir::Left
            } else {
                Dir::Right
            };

            debug_assert!(self.root != Some(up));

            let across = self.links(up).child(dir);
            self.links_mut(down).set_child(!dir, across);
            self.maybe_set_parent(across, Some(down));

            self.links_mut(up).set_child(dir, Some(down));
            let parent = self.links_mut(down).set_parent(Some(up));
            self.links_mut(up).set_parent(parent);

            self.replace_child_or_set_root(parent, down, Some(up));

            self.update_height(down);
            self.update_height(up);
        }
    }

    // Performs a double rotation, moving `up` above both its parent `down_first` and its
    // grandparent `down_second`.
    //
    // Heights of all three nodes are refreshed; heights of their ancestors are not.
    fn rotate_twice_at(&mut self, down_second: NonNull<T>, down_first: NonNull<T>, up: NonNull<T>) {
        unsafe {
            let dir = if self.links(down_first).right() == Some(up) {
                Dir::Right
            } else {
                Dir::Left
            };

            let across_first = self.links(up).child(!dir);
            let across_second = self.links(up).child(dir);

            self.maybe_set_parent(across_first, Some(down_first));

            self.links_mut(down_first).set_child(dir, across_first);
            self.links_mut(down_first).set_parent(Some(up));

            self.maybe_set_parent(across_second, Some(down_second));

            self.links_mut(down_second).set_child(!dir, across_second);
            let parent = self.links_mut(down_second).set_parent(Some(up));

            self.links_mut(up).set_parent(parent);
            self.links_mut(up).set_child(!dir, Some(down_first));
            self.links_mut(up).set_child(dir, Some(down_second));

            self.replace_child_or_set_root(parent, down_second, Some(up));

            self.update_height(down_first);
            self.update_height(down_second);
            self.update_height(up);
        }
    }

    // Restores the balance of `node` if it is left- or right-heavy, returning the node which took
    // its place at the top of the subtree.
    //
    // Only one level of imbalance is repaired: the subtrees of `node` must satisfy invariant (2).
    unsafe fn rebalance_at(&mut self, node: NonNull<T>) -> Option<NonNull<T>> {
        unsafe {
            let heavy = match self.balance_factor(node) {
                -1..=1 => return None,
                factor if factor > 1 => Dir::Left,
                _ => Dir::Right,
            };

            let child = self
                .links(node)
                .child(heavy)
                .expect("heavy side must have a child");

            // A child leaning away from `heavy` would end up unbalanced in the other direction
            // after a single rotation.
            let child_factor = self.balance_factor(child);
            let zig_zag = match heavy {
                Dir::Left => child_factor < 0,
                Dir::Right => child_factor > 0,
            };

            if zig_zag {
                let grandchild = self
                    .links(child)
                    .child(!heavy)
                    .expect("inner grandchild must exist");

                tracing::trace!(?heavy, "double rotation");
                self.rotate_twice_at(node, child, grandchild);
                Some(grandchild)
            } else {
                tracing::trace!(?heavy, "single rotation");
                self.rotate_at(node, child);
                Some(child)
            }
        }
    }

    /// Inserts an item into the tree, returning a cursor pointing at it.
    ///
    /// Items whose keys are equal to keys already present are kept alongside them; the new item
    /// is placed somewhere among its equals.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, item: T::Handle) -> CursorMut<'_, T> {
        let ptr = T::into_ptr(item);

        unsafe { self.insert_below(None, ptr) };

        CursorMut::at(self, Some(ptr))
    }

    // Inserts `ptr` near `hint`, which must be a node of this tree or `None` for the root.
    pub(crate) unsafe fn insert_near_raw(&mut self, hint: Link<T>, ptr: NonNull<T>) {
        unsafe {
            let anchor = hint.map(|hint| self.anchor_for(hint, ptr.as_ref().key()));
            self.insert_below(anchor, ptr);
        }
    }

    // Ascends from `hint` to the lowest node whose subtree may receive `key` without violating
    // the search order. `key` must not be less than the nearest ancestor the subtree hangs to the
    // right of, nor greater than the nearest ancestor it hangs to the left of.
    unsafe fn anchor_for(&self, hint: NonNull<T>, key: &T::Key) -> NonNull<T> {
        let mut cur = hint;

        'ascend: loop {
            let mut lower_checked = false;
            let mut upper_checked = false;
            let mut child = cur;

            unsafe {
                while let Some(parent) = self.links(child).parent() {
                    let parent_key = parent.as_ref().key();

                    match self.which_child(parent, Some(child)) {
                        Dir::Right if !lower_checked => {
                            if key < parent_key {
                                cur = parent;
                                continue 'ascend;
                            }
                            lower_checked = true;
                        }
                        Dir::Left if !upper_checked => {
                            if key > parent_key {
                                cur = parent;
                                continue 'ascend;
                            }
                            upper_checked = true;
                        }
                        _ => (),
                    }

                    if lower_checked && upper_checked {
                        break;
                    }

                    child = parent;
                }
            }

            return cur;
        }
    }

    // Links `ptr` into the tree as a new leaf in the subtree rooted at `anchor` (the whole tree if
    // `anchor` is `None`), then rebalances.
    unsafe fn insert_below(&mut self, anchor: Link<T>, ptr: NonNull<T>) {
        unsafe {
            let links = self.links_mut(ptr);
            links.clear();
            links.set_height(1);
        }

        let Some(mut parent) = anchor.or(self.root) else {
            // Tree is empty. Set `item` as the root and return.
            self.root = Some(ptr);
            return;
        };

        // Descend the tree, looking for a free slot. Equal keys go left.
        loop {
            let dir = if unsafe { ptr.as_ref().key() <= parent.as_ref().key() } {
                Dir::Left
            } else {
                Dir::Right
            };

            unsafe {
                match self.links(parent).child(dir) {
                    // Descend.
                    Some(child) => parent = child,

                    // Set `item` as child.
                    None => {
                        self.links_mut(parent).set_child(dir, Some(ptr));
                        self.links_mut(ptr).set_parent(Some(parent));
                        break;
                    }
                }
            }
        }

        unsafe { self.rebalance_inserted(parent) };
    }

    // Performs a bottom-up rebalance of the tree, starting at the parent of a new leaf.
    //
    // Heights are refreshed on the way up. The first unbalanced node is repaired with a single or
    // double rotation, which brings its subtree back to the height it had before the insertion, so
    // nothing above it changes and the walk ends there.
    unsafe fn rebalance_inserted(&mut self, node: NonNull<T>) {
        let mut opt_cur = Some(node);

        while let Some(cur) = opt_cur {
            unsafe {
                let grew = self.update_height(cur);

                if self.rebalance_at(cur).is_some() || !grew {
                    return;
                }

                opt_cur = self.links(cur).parent();
            }
        }
    }

    // Performs a bottom-up rebalance of the tree, starting at the lowest node whose subtree lost a
    // level in a removal.
    //
    // A rotation here may itself lower the height of the rotated subtree, so the walk goes on
    // above it until a subtree's height stays the same.
    unsafe fn rebalance_removed(&mut self, mut opt_cur: Link<T>) {
        while let Some(cur) = opt_cur {
            unsafe {
                let shrank = self.update_height(cur);

                opt_cur = match self.rebalance_at(cur) {
                    Some(top) => self.links(top).parent(),
                    None if shrank => self.links(cur).parent(),
                    None => return,
                };
            }
        }
    }

    /// Removes an arbitrary node from the tree.
    ///
    /// The node is replaced by its in-order predecessor within its left subtree if it has one, or
    /// by its right child otherwise.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element of `self`, and not any
    /// other tree.
    pub unsafe fn remove_at(&mut self, node: NonNull<T>) -> T::Handle {
        unsafe {
            let parent = self.links(node).parent();
            let left = self.links(node).left();
            let right = self.links(node).right();

            let rebalance_from = match left {
                None => {
                    // Elevate the right child (which may be None).
                    self.replace_child_or_set_root(parent, node, right);
                    self.maybe_set_parent(right, parent);
                    parent
                }

                Some(left) => {
                    let replacement = self.extreme_in_subtree(left, Dir::Right);

                    let shrunk = if replacement == left {
                        // The replacement keeps its own left subtree.
                        replacement
                    } else {
                        // Elevate the replacement's left child to take its place.
                        let replacement_parent = self
                            .links(replacement)
                            .parent()
                            .expect("replacement below `left` must have a parent");
                        let replacement_left = self.links(replacement).left();

                        self.replace_child(replacement_parent, replacement, replacement_left);
                        self.maybe_set_parent(replacement_left, Some(replacement_parent));

                        self.links_mut(replacement).set_left(Some(left));
                        self.links_mut(left).set_parent(Some(replacement));

                        replacement_parent
                    };

                    self.links_mut(replacement).set_right(right);
                    self.maybe_set_parent(right, Some(replacement));

                    self.replace_child_or_set_root(parent, node, Some(replacement));
                    self.links_mut(replacement).set_parent(parent);

                    // Transfer height of `node` to `replacement`; the rebalance walk fixes it if
                    // the subtree shrank.
                    let height = self.links(node).height();
                    self.links_mut(replacement).set_height(height);

                    Some(shrunk)
                }
            };

            self.links_mut(node).clear();
            self.rebalance_removed(rebalance_from);

            T::from_ptr(node)
        }
    }

    /// Removes the nodes in the half-open range `[first, end)`, returning how many were removed.
    ///
    /// `end` being `None` denotes the end of the tree. Nodes are removed one at a time from the
    /// front of the range, each removal rebalancing the tree on its own.
    ///
    /// # Safety
    ///
    /// `first` and `end` must each be `None` or an element of `self`, and `end` must not come
    /// before `first` in the tree order.
    pub unsafe fn remove_range(
        &mut self,
        first: Option<NonNull<T>>,
        end: Option<NonNull<T>>,
    ) -> usize {
        let mut removed = 0;
        let mut cur = first;

        while cur != end {
            let Some(node) = cur else {
                break;
            };

            unsafe {
                cur = self.successor_raw(node);
                drop(self.remove_at(node));
            }

            removed += 1;
        }

        removed
    }

    /// Removes the first node whose key is equal to `key`.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T::Handle>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.find_raw(key)?;
        unsafe { Some(self.remove_at(node)) }
    }

    /// Removes every node whose key is equal to `key`, returning how many were removed.
    pub fn remove_all<Q>(&mut self, key: &Q) -> usize
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let first = self.lower_bound_raw(key);
        let end = self.upper_bound_raw(key);

        unsafe { self.remove_range(first, end) }
    }

    /// Removes and returns the minimum element of the tree.
    pub fn pop_first(&mut self) -> Option<T::Handle> {
        let first = self.first_raw()?;
        unsafe { Some(self.remove_at(first)) }
    }

    /// Removes and returns the maximum element of the tree.
    pub fn pop_last(&mut self) -> Option<T::Handle> {
        let last = self.last_raw()?;
        unsafe { Some(self.remove_at(last)) }
    }

    /// Clears the tree, removing all elements.
    ///
    /// Nodes are released without recursion, so the depth of the tree does not matter.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root;
        let mut released = 0_usize;

        while let Some(cur) = opt_cur {
            unsafe {
                // Descend to the minimum node.
                let cur = self.extreme_in_subtree(cur, Dir::Left);
                let parent = self.links(cur).parent();
                let right = self.links(cur).right();

                // Elevate the node's right child (which may be None).
                self.replace_child_or_set_root(parent, cur, right);
                self.maybe_set_parent(right, parent);

                // Drop the node.
                self.links_mut(cur).clear();
                drop(T::from_ptr(cur));
                released += 1;

                // If the node had no right child, climb to the parent. If the node had no parent,
                // the tree is empty.
                opt_cur = right.or(parent);
            }
        }

        debug_assert!(self.root.is_none());
        tracing::debug!(released, "cleared tree");
    }

    /// Exchanges the contents of two trees without touching any node.
    pub fn swap(&mut self, other: &mut AvlTree<T>) {
        mem::swap(&mut self.root, &mut other.root);
    }

    #[inline]
    pub(crate) unsafe fn links<'a>(&self, node: NonNull<T>) -> &'a Links<T> {
        unsafe { T::links(node).as_ref() }
    }

    #[inline]
    unsafe fn links_mut<'a>(&mut self, node: NonNull<T>) -> &'a mut Links<T> {
        unsafe { T::links(node).as_mut() }
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
                height: 0,
                _unpin: PhantomPinned,
            }),
        }
    }

    #[inline]
    fn height(&self) -> i8 {
        unsafe { (*self.inner.get()).height }
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
    fn set_height(&mut self, height: i8) -> i8 {
        mem::replace(&mut self.inner.get_mut().height, height)
    }

    // Unlinks the node from any tree.
    #[inline]
    fn clear(&mut self) {
        let inner = self.inner.get_mut();
        inner.parent = None;
        inner.children = [None; 2];
        inner.height = 0;
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Links::new()
    }
}
