//! An ordered multiset based on an [AVL tree].
//!
//! [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree

use alloc::boxed::Box;
use core::{
    borrow::Borrow,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    iter::FusedIterator,
    marker::{PhantomData, PhantomPinned},
    mem,
    ops::{Bound, RangeBounds},
    ptr::NonNull,
};

use cordyceps::Linked;

use crate::{iter::RawIter, AvlTree, Link, Links, TreeNode};

/// An ordered multiset based on an [AVL tree].
///
/// Keys are kept in ascending order and may occur any number of times. Lookups, insertions and
/// removals of a single element complete in _O(log(n))_ time.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to any
/// other key changes while it is in the multiset. The behavior resulting from such a logic error
/// is unspecified, but will not be undefined behavior.
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
pub struct AvlMultiset<K: Ord> {
    tree: AvlTree<SetNode<K>>,
}

struct SetNode<K> {
    links: Links<SetNode<K>>,
    key: K,
    _unpin: PhantomPinned,
}

impl<K> SetNode<K> {
    fn boxed(key: K) -> Box<SetNode<K>> {
        Box::new(SetNode {
            links: Links::new(),
            key,
            _unpin: PhantomPinned,
        })
    }

    #[allow(clippy::boxed_local)]
    fn into_key(node: Box<SetNode<K>>) -> K {
        let SetNode { key, .. } = *node;
        key
    }
}

unsafe impl<K> Linked<Links<SetNode<K>>> for SetNode<K> {
    type Handle = Box<Self>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<SetNode<K>>> {
        let ptr = ptr.as_ptr();
        unsafe { NonNull::new_unchecked(core::ptr::addr_of_mut!((*ptr).links)) }
    }
}

impl<K: Ord> TreeNode<Links<SetNode<K>>> for SetNode<K> {
    type Key = K;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

// SAFETY: the multiset owns its nodes exclusively and never shares them with another tree, so it
// may move between threads or be shared exactly like a collection of `K`.
unsafe impl<K: Ord + Send> Send for AvlMultiset<K> {}
unsafe impl<K: Ord + Sync> Sync for AvlMultiset<K> {}

impl<K: Ord> AvlMultiset<K> {
    /// Creates a new, empty `AvlMultiset`.
    pub const fn new() -> Self {
        Self {
            tree: AvlTree::new(),
        }
    }

    /// Returns `true` if the multiset contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the multiset, counting every occurrence.
    ///
    /// No running count is kept; this walks the whole multiset and completes in _O(n)_ time.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns an upper bound on the number of elements a multiset could hold, given that every
    /// element occupies at least a pointer-sized node.
    pub const fn max_size(&self) -> usize {
        usize::MAX / mem::size_of::<*const ()>()
    }

    /// Returns the height of the underlying tree, 0 if it is empty.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        self.tree.assert_invariants();
    }

    /// Adds an occurrence of `key` to the multiset, returning a cursor pointing at it.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: K) -> CursorMut<'_, K> {
        CursorMut {
            inner: self.tree.insert(SetNode::boxed(key)),
        }
    }

    /// Returns `true` if the multiset contains at least one occurrence of `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains_key(key)
    }

    /// Returns the number of occurrences of `key`.
    ///
    /// This operation completes in _O(log(n) + k)_ time, where `k` is the returned count.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.count(key)
    }

    /// Returns a cursor pointing at the first occurrence of `key`, or at the "ghost" non-element
    /// if there is none.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Cursor {
            inner: self.tree.find(key),
        }
    }

    /// Mutable counterpart of [`find`](AvlMultiset::find).
    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        CursorMut {
            inner: self.tree.find_mut(key),
        }
    }

    /// Returns a cursor pointing at the first element not less than `key`, or at the "ghost"
    /// non-element if there is none.
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Cursor {
            inner: self.tree.lower_bound(key),
        }
    }

    /// Returns a cursor pointing at the first element greater than `key`, or at the "ghost"
    /// non-element if there is none.
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Cursor {
            inner: self.tree.upper_bound(key),
        }
    }

    /// Mutable counterpart of [`lower_bound`](AvlMultiset::lower_bound).
    pub fn lower_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        CursorMut {
            inner: self.tree.lower_bound_mut(key),
        }
    }

    /// Mutable counterpart of [`upper_bound`](AvlMultiset::upper_bound).
    pub fn upper_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        CursorMut {
            inner: self.tree.upper_bound_mut(key),
        }
    }

    /// Returns an iterator over every occurrence of `key`.
    ///
    /// The iterator spans exactly the elements between
    /// [`lower_bound(key)`](AvlMultiset::lower_bound) and
    /// [`upper_bound(key)`](AvlMultiset::upper_bound).
    pub fn equal_range<Q>(&self, key: &Q) -> Iter<'_, K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Iter {
            inner: self.tree.equal_range(key),
        }
    }

    /// Returns an iterator over the elements within `range`, in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if the start of the range is greater than its end, or if both are equal and
    /// excluded.
    pub fn range<Q, R>(&self, range: R) -> Iter<'_, K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        R: RangeBounds<Q>,
    {
        let (first, end) = self.range_raw(&range);

        Iter {
            inner: unsafe { crate::Iter::between(&self.tree, first, end) },
        }
    }

    // Resolves `range` to the half-open node range `[first, end)`.
    fn range_raw<Q, R>(&self, range: &R) -> (Link<SetNode<K>>, Link<SetNode<K>>)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        R: RangeBounds<Q>,
    {
        match (range.start_bound(), range.end_bound()) {
            (Bound::Excluded(s), Bound::Excluded(e)) if s == e => {
                panic!("range start and end are equal and excluded in AvlMultiset")
            }
            (
                Bound::Included(s) | Bound::Excluded(s),
                Bound::Included(e) | Bound::Excluded(e),
            ) if s > e => {
                panic!("range start is greater than range end in AvlMultiset")
            }
            _ => (),
        }

        let first = match range.start_bound() {
            Bound::Included(key) => self.tree.lower_bound_raw(key),
            Bound::Excluded(key) => self.tree.upper_bound_raw(key),
            Bound::Unbounded => self.tree.first_raw(),
        };

        let end = match range.end_bound() {
            Bound::Included(key) => self.tree.upper_bound_raw(key),
            Bound::Excluded(key) => self.tree.lower_bound_raw(key),
            Bound::Unbounded => None,
        };

        (first, end)
    }

    /// Returns the minimum element of the multiset.
    pub fn first(&self) -> Option<&K> {
        self.tree.first().map(|node| &node.get_ref().key)
    }

    /// Returns the maximum element of the multiset.
    pub fn last(&self) -> Option<&K> {
        self.tree.last().map(|node| &node.get_ref().key)
    }

    /// Removes and returns one occurrence of the minimum element.
    pub fn pop_first(&mut self) -> Option<K> {
        self.tree.pop_first().map(SetNode::into_key)
    }

    /// Removes and returns one occurrence of the maximum element.
    pub fn pop_last(&mut self) -> Option<K> {
        self.tree.pop_last().map(SetNode::into_key)
    }

    /// Removes every occurrence of `key`, returning how many were removed.
    pub fn remove<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove_all(key)
    }

    /// Removes every element within `range`, returning how many were removed.
    ///
    /// Elements are removed one at a time from the front of the range.
    ///
    /// # Panics
    ///
    /// Panics if the start of the range is greater than its end, or if both are equal and
    /// excluded.
    pub fn remove_range<Q, R>(&mut self, range: R) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        R: RangeBounds<Q>,
    {
        let (first, end) = self.range_raw(&range);

        unsafe { self.tree.remove_range(first, end) }
    }

    /// Clears the multiset, removing all elements.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Exchanges the contents of two multisets without moving or copying any element.
    pub fn swap(&mut self, other: &mut AvlMultiset<K>) {
        self.tree.swap(&mut other.tree);
    }

    /// Returns an iterator over the elements of the multiset, in ascending order.
    ///
    /// Use [`Iterator::rev`] on the result to walk the multiset in descending order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.tree.iter(),
        }
    }

    /// Returns an iterator over mutable references to the elements of the multiset, in ascending
    /// order.
    ///
    /// Changing an element so that it compares differently to the others is a logic error.
    pub fn iter_mut(&mut self) -> IterMut<'_, K> {
        let first = self.tree.first_raw();

        IterMut {
            raw: unsafe { RawIter::new((&mut self.tree).into(), first, None) },
            phantom: PhantomData,
        }
    }

    /// Returns a cursor pointing at the minimum element.
    pub fn cursor_first(&self) -> Cursor<'_, K> {
        Cursor {
            inner: self.tree.cursor_first(),
        }
    }

    /// Returns a cursor pointing at the maximum element.
    pub fn cursor_last(&self) -> Cursor<'_, K> {
        Cursor {
            inner: self.tree.cursor_last(),
        }
    }

    /// Returns a cursor pointing at the "ghost" non-element.
    pub fn cursor_end(&self) -> Cursor<'_, K> {
        Cursor {
            inner: self.tree.cursor_end(),
        }
    }

    /// Returns a mutable cursor pointing at the minimum element.
    pub fn cursor_first_mut(&mut self) -> CursorMut<'_, K> {
        CursorMut {
            inner: self.tree.cursor_first_mut(),
        }
    }

    /// Returns a mutable cursor pointing at the maximum element.
    pub fn cursor_last_mut(&mut self) -> CursorMut<'_, K> {
        CursorMut {
            inner: self.tree.cursor_last_mut(),
        }
    }

    /// Returns a mutable cursor pointing at the "ghost" non-element.
    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, K> {
        CursorMut {
            inner: self.tree.cursor_end_mut(),
        }
    }
}

impl<K: Ord + fmt::Display> AvlMultiset<K> {
    /// Writes the elements in pre-order of the underlying tree, each followed by a space.
    pub fn write_pre_order<W: fmt::Write>(&self, w: W) -> fmt::Result {
        self.tree.write_pre_order(w)
    }

    /// Recursive counterpart of [`write_pre_order`](AvlMultiset::write_pre_order).
    pub fn write_pre_order_recursive<W: fmt::Write>(&self, w: W) -> fmt::Result {
        self.tree.write_pre_order_recursive(w)
    }

    /// Writes the elements in ascending order, each followed by a space.
    pub fn write_in_order<W: fmt::Write>(&self, w: W) -> fmt::Result {
        self.tree.write_in_order(w)
    }

    /// Recursive counterpart of [`write_in_order`](AvlMultiset::write_in_order).
    pub fn write_in_order_recursive<W: fmt::Write>(&self, w: W) -> fmt::Result {
        self.tree.write_in_order_recursive(w)
    }

    /// Writes the elements in post-order of the underlying tree, each followed by a space.
    pub fn write_post_order<W: fmt::Write>(&self, w: W) -> fmt::Result {
        self.tree.write_post_order(w)
    }

    /// Recursive counterpart of [`write_post_order`](AvlMultiset::write_post_order).
    pub fn write_post_order_recursive<W: fmt::Write>(&self, w: W) -> fmt::Result {
        self.tree.write_post_order_recursive(w)
    }

    /// Writes the elements level by level of the underlying tree, each followed by a space.
    pub fn write_level_order<W: fmt::Write>(&self, w: W) -> fmt::Result {
        self.tree.write_level_order(w)
    }

    /// Recursive counterpart of [`write_level_order`](AvlMultiset::write_level_order).
    pub fn write_level_order_recursive<W: fmt::Write>(&self, w: W) -> fmt::Result {
        self.tree.write_level_order_recursive(w)
    }

    /// Writes the elements in ascending order on one line.
    pub fn print<W: fmt::Write>(&self, w: W) -> fmt::Result {
        self.tree.print(w)
    }

    /// Writes the underlying tree as a Graphviz digraph.
    pub fn dotgraph<W: fmt::Write>(&self, name: &str, w: W) -> fmt::Result {
        self.tree.dotgraph(name, w)
    }
}

impl<K: Ord> Default for AvlMultiset<K> {
    fn default() -> Self {
        AvlMultiset::new()
    }
}

impl<K: Ord + Clone> Clone for AvlMultiset<K> {
    /// Builds a new multiset by inserting every element of `self` in ascending order.
    ///
    /// The copy holds the same elements, but its tree need not have the same shape.
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.extend(source.iter().cloned());
    }
}

impl<K: Ord> PartialEq for AvlMultiset<K> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<K: Ord> Eq for AvlMultiset<K> {}

impl<K: Ord> PartialOrd for AvlMultiset<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for AvlMultiset<K> {
    /// Compares the sorted sequences of elements lexicographically.
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: Ord + Hash> Hash for AvlMultiset<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut len = 0_usize;
        for key in self {
            key.hash(state);
            len += 1;
        }
        state.write_usize(len);
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for AvlMultiset<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord + fmt::Display> fmt::Display for AvlMultiset<K> {
    /// Draws the tree on its side, see [`AvlTree::write_sideways`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tree.write_sideways(f)
    }
}

impl<K: Ord> FromIterator<K> for AvlMultiset<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = AvlMultiset::new();
        set.extend(iter);
        set
    }
}

impl<K: Ord> Extend<K> for AvlMultiset<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: Ord + Copy + 'a> Extend<&'a K> for AvlMultiset<K> {
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<K: Ord, const N: usize> From<[K; N]> for AvlMultiset<K> {
    fn from(keys: [K; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl<'a, K: Ord> IntoIterator for &'a AvlMultiset<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K: Ord> IntoIterator for &'a mut AvlMultiset<K> {
    type Item = &'a mut K;
    type IntoIter = IterMut<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K: Ord> IntoIterator for AvlMultiset<K> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { set: self }
    }
}

/// An iterator over the elements of an [`AvlMultiset`].
pub struct Iter<'a, K: Ord> {
    inner: crate::Iter<'a, SetNode<K>>,
}

impl<'a, K: Ord> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|node| &node.key)
    }
}

impl<K: Ord> DoubleEndedIterator for Iter<'_, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|node| &node.key)
    }
}

impl<K: Ord> FusedIterator for Iter<'_, K> {}

impl<K: Ord> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

/// An iterator over mutable references to the elements of an [`AvlMultiset`].
pub struct IterMut<'a, K: Ord> {
    raw: RawIter<SetNode<K>>,
    phantom: PhantomData<&'a mut AvlMultiset<K>>,
}

impl<'a, K: Ord> Iterator for IterMut<'a, K> {
    type Item = &'a mut K;

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: every node is yielded at most once, and pinning is not structural for `key`.
        self.raw
            .next()
            .map(|node| unsafe { &mut (*node.as_ptr()).key })
    }
}

impl<K: Ord> DoubleEndedIterator for IterMut<'_, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.raw
            .next_back()
            .map(|node| unsafe { &mut (*node.as_ptr()).key })
    }
}

impl<K: Ord> FusedIterator for IterMut<'_, K> {}

/// An owning iterator over the elements of an [`AvlMultiset`], in ascending order.
pub struct IntoIter<K: Ord> {
    set: AvlMultiset<K>,
}

impl<K: Ord> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.set.pop_first()
    }
}

impl<K: Ord> DoubleEndedIterator for IntoIter<K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.set.pop_last()
    }
}

impl<K: Ord> FusedIterator for IntoIter<K> {}

/// A cursor over an [`AvlMultiset`].
///
/// A cursor points either to an element or to a "ghost" non-element that connects the last
/// element to the first. Two cursors are equal if they point at the same occurrence, or both at
/// the ghost.
pub struct Cursor<'a, K: Ord> {
    inner: crate::Cursor<'a, SetNode<K>>,
}

impl<'a, K: Ord> Cursor<'a, K> {
    /// Moves the cursor to the next element, or from the ghost to the first element.
    pub fn move_next(&mut self) {
        self.inner.move_next();
    }

    /// Moves the cursor to the previous element, or from the ghost to the last element.
    pub fn move_prev(&mut self) {
        self.inner.move_prev();
    }

    /// Returns the element pointed to by the cursor, or `None` at the ghost.
    pub fn get(&self) -> Option<&'a K> {
        self.inner.get().map(|node| &node.key)
    }

    /// Returns the element after the cursor without moving it.
    pub fn peek_next(&self) -> Option<&'a K> {
        self.inner.peek_next().map(|node| &node.key)
    }

    /// Returns the element before the cursor without moving it.
    pub fn peek_prev(&self) -> Option<&'a K> {
        self.inner.peek_prev().map(|node| &node.key)
    }

    /// Returns `true` if the cursor points at the "ghost" non-element.
    pub fn is_ghost(&self) -> bool {
        self.inner.is_ghost()
    }

    /// Returns the height of the subtree rooted at the current element, 0 at the ghost.
    pub fn height(&self) -> usize {
        self.inner.height()
    }

    /// Returns the balance factor of the current element, 0 at the ghost.
    pub fn balance_factor(&self) -> isize {
        self.inner.balance_factor()
    }
}

impl<K: Ord> Clone for Cursor<'_, K> {
    fn clone(&self) -> Self {
        Cursor {
            inner: self.inner.clone(),
        }
    }
}

impl<K: Ord> PartialEq for Cursor<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<K: Ord> Eq for Cursor<'_, K> {}

impl<K: Ord + fmt::Debug> fmt::Debug for Cursor<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get()).finish()
    }
}

/// A cursor over an [`AvlMultiset`] which supports editing operations.
pub struct CursorMut<'a, K: Ord> {
    inner: crate::CursorMut<'a, SetNode<K>>,
}

impl<'a, K: Ord> CursorMut<'a, K> {
    /// Returns a read-only cursor pointing to the current element.
    pub fn as_cursor(&self) -> Cursor<'_, K> {
        Cursor {
            inner: self.inner.as_cursor(),
        }
    }

    /// Moves the cursor to the next element, or from the ghost to the first element.
    pub fn move_next(&mut self) {
        self.inner.move_next();
    }

    /// Moves the cursor to the previous element, or from the ghost to the last element.
    pub fn move_prev(&mut self) {
        self.inner.move_prev();
    }

    /// Returns the element pointed to by the cursor, or `None` at the ghost.
    pub fn get(&self) -> Option<&K> {
        self.inner.get().map(|node| &node.key)
    }

    /// Returns a mutable reference to the element pointed to by the cursor.
    ///
    /// Changing the element so that it compares differently to the others is a logic error.
    pub fn get_mut(&mut self) -> Option<&mut K> {
        // SAFETY: pinning is not structural for `node.key`, and the multiset never relies on key
        // order for memory safety.
        unsafe {
            self.inner
                .get_mut()
                .map(|node| &mut node.get_unchecked_mut().key)
        }
    }

    /// Returns the element after the cursor without moving it.
    pub fn peek_next(&self) -> Option<&K> {
        self.inner.peek_next().map(|node| &node.key)
    }

    /// Returns the element before the cursor without moving it.
    pub fn peek_prev(&self) -> Option<&K> {
        self.inner.peek_prev().map(|node| &node.key)
    }

    /// Returns `true` if the cursor points at the "ghost" non-element.
    pub fn is_ghost(&self) -> bool {
        self.inner.is_ghost()
    }

    /// Adds an occurrence of `key`, searching for its place from the current element, and moves
    /// the cursor to it.
    ///
    /// The result is the same multiset as [`AvlMultiset::insert`] would produce; only the amount of
    /// tree walked differs.
    pub fn insert_near(&mut self, key: K) {
        self.inner.insert_near(SetNode::boxed(key));
    }

    /// Removes the current element and moves the cursor to the next one.
    ///
    /// Returns `None`, leaving the multiset unchanged, if the cursor points at the ghost.
    pub fn remove_current(&mut self) -> Option<K> {
        self.inner.remove_current().map(SetNode::into_key)
    }

    /// Removes the current element and moves the cursor to the previous one.
    ///
    /// Returns `None`, leaving the multiset unchanged, if the cursor points at the ghost.
    pub fn remove_current_and_move_prev(&mut self) -> Option<K> {
        self.inner
            .remove_current_and_move_prev()
            .map(SetNode::into_key)
    }
}
