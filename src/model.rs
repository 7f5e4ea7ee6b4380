//! Checks an [`AvlTree`] against a sorted `Vec`, which serves as the reference multiset.
//!
//! The `run_*` functions drive both with the same operations and panic on the first
//! disagreement. They are shared by the property tests and the fuzz targets.

extern crate std;

use std::{prelude::v1::*, ptr::NonNull};

use arbitrary::Arbitrary;
use cordyceps::Linked;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, Links, TreeNode};

#[derive(Debug)]
pub struct TestNode {
    pub links: Links<TestNode>,
    pub key: u32,
}

impl TestNode {
    pub fn new(key: u32) -> Box<TestNode> {
        Box::new(TestNode {
            links: Links::new(),
            key,
        })
    }
}

unsafe impl Linked<Links<TestNode>> for TestNode {
    type Handle = Box<TestNode>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<TestNode>> {
        let ptr = ptr.as_ptr();
        unsafe { NonNull::new_unchecked(core::ptr::addr_of_mut!((*ptr).links)) }
    }
}

impl TreeNode<Links<TestNode>> for TestNode {
    type Key = u32;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

/// A key operand, either picked from the keys currently stored or drawn at random.
///
/// Picking stored keys makes duplicates and hits far more likely than random values alone.
#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum KeyValue {
    Stored(usize),
    Random(u32),
}

impl KeyValue {
    fn resolve(self, sorted: &[u32]) -> u32 {
        match self {
            KeyValue::Stored(idx) if sorted.is_empty() => idx as u32,
            KeyValue::Stored(idx) => sorted[idx % sorted.len()],
            KeyValue::Random(v) => v,
        }
    }
}

proptest::prop_compose! {
    fn stored_strategy()(
        index in 0usize..1000,
    ) -> KeyValue {
        KeyValue::Stored(index)
    }
}

proptest::prop_compose! {
    // A narrow range, so that random keys collide with each other too.
    fn random_strategy()(
        random in 0u32..64,
    ) -> KeyValue {
        KeyValue::Random(random)
    }
}

fn key_strategy() -> impl Strategy<Value = KeyValue> {
    proptest::prop_oneof![stored_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(KeyValue),
    /// Inserts the second key using the first occurrence of the first one as a hint.
    InsertNear(KeyValue, KeyValue),
    Count(KeyValue),
    Find(KeyValue),
    LowerBound(KeyValue),
    UpperBound(KeyValue),
    EqualRange(KeyValue),
    RemoveOne(KeyValue),
    RemoveAll(KeyValue),
    RemoveRange(KeyValue, KeyValue),
    First,
    PopFirst,
    Last,
    PopLast,
}

impl Op {
    fn resolve(self, sorted: &[u32]) -> ResolvedOp {
        match self {
            Op::Insert(k) => ResolvedOp::Insert(k.resolve(sorted)),
            Op::InsertNear(h, k) => ResolvedOp::InsertNear(h.resolve(sorted), k.resolve(sorted)),
            Op::Count(k) => ResolvedOp::Count(k.resolve(sorted)),
            Op::Find(k) => ResolvedOp::Find(k.resolve(sorted)),
            Op::LowerBound(k) => ResolvedOp::LowerBound(k.resolve(sorted)),
            Op::UpperBound(k) => ResolvedOp::UpperBound(k.resolve(sorted)),
            Op::EqualRange(k) => ResolvedOp::EqualRange(k.resolve(sorted)),
            Op::RemoveOne(k) => ResolvedOp::RemoveOne(k.resolve(sorted)),
            Op::RemoveAll(k) => ResolvedOp::RemoveAll(k.resolve(sorted)),
            Op::RemoveRange(a, b) => {
                let (a, b) = (a.resolve(sorted), b.resolve(sorted));
                ResolvedOp::RemoveRange(a.min(b), a.max(b))
            }
            Op::First => ResolvedOp::First,
            Op::PopFirst => ResolvedOp::PopFirst,
            Op::Last => ResolvedOp::Last,
            Op::PopLast => ResolvedOp::PopLast,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum ResolvedOp {
    Insert(u32),
    InsertNear(u32, u32),
    Count(u32),
    Find(u32),
    LowerBound(u32),
    UpperBound(u32),
    EqualRange(u32),
    RemoveOne(u32),
    RemoveAll(u32),
    RemoveRange(u32, u32),
    First,
    PopFirst,
    Last,
    PopLast,
}

fn query_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        key_strategy().prop_map(Op::Count),
        key_strategy().prop_map(Op::Find),
        key_strategy().prop_map(Op::LowerBound),
        key_strategy().prop_map(Op::UpperBound),
        key_strategy().prop_map(Op::EqualRange),
        Just(Op::First),
        Just(Op::Last),
    ]
}

fn removal_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        2 => key_strategy().prop_map(Op::RemoveOne),
        1 => key_strategy().prop_map(Op::RemoveAll),
        1 => (key_strategy(), key_strategy()).prop_map(|(a, b)| Op::RemoveRange(a, b)),
        1 => Just(Op::PopFirst),
        1 => Just(Op::PopLast),
    ]
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        3 => key_strategy().prop_map(Op::Insert),
        2 => (key_strategy(), key_strategy()).prop_map(|(h, k)| Op::InsertNear(h, k)),
        3 => query_strategy(),
        3 => removal_strategy(),
    ]
}

fn lower_index(v: &[u32], key: u32) -> usize {
    v.partition_point(|&x| x < key)
}

fn upper_index(v: &[u32], key: u32) -> usize {
    v.partition_point(|&x| x <= key)
}

pub fn run_model_equivalence(ops: Vec<Op>) {
    let mut sorted: Vec<u32> = Vec::with_capacity(ops.len());
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    #[inline]
    #[allow(clippy::boxed_local)]
    fn node_key(node: Box<TestNode>) -> u32 {
        node.key
    }

    #[inline]
    fn ref_key(node: &TestNode) -> u32 {
        node.key
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let resolved = op.resolve(&sorted);

        match resolved {
            ResolvedOp::Insert(key) => {
                sorted.insert(upper_index(&sorted, key), key);

                let inserted = tree.insert(TestNode::new(key)).get().map(ref_key);
                assert_eq!(inserted, Some(key), "Op #{op_id}: {resolved:?}");
            }

            ResolvedOp::InsertNear(hint, key) => {
                sorted.insert(upper_index(&sorted, key), key);

                let mut curs = tree.find_mut(&hint);
                curs.insert_near(TestNode::new(key));
                assert_eq!(curs.get().map(ref_key), Some(key), "Op #{op_id}: {resolved:?}");
            }

            ResolvedOp::Count(key) => {
                let expected = upper_index(&sorted, key) - lower_index(&sorted, key);
                assert_eq!(tree.count(&key), expected, "Op #{op_id}: {resolved:?}");
                assert_eq!(tree.contains_key(&key), expected > 0, "Op #{op_id}: {resolved:?}");
            }

            ResolvedOp::Find(key) => {
                let expected = sorted.binary_search(&key).ok().map(|_| key);
                let found = tree.find(&key).get().map(ref_key);
                assert_eq!(found, expected, "Op #{op_id}: {resolved:?}");

                // `find` must land on the first occurrence.
                if found.is_some() {
                    let curs = tree.find(&key);
                    assert_eq!(curs, tree.lower_bound(&key), "Op #{op_id}: {resolved:?}");
                }
            }

            ResolvedOp::LowerBound(key) => {
                let expected = sorted.get(lower_index(&sorted, key)).copied();
                let found = tree.lower_bound(&key).get().map(ref_key);
                assert_eq!(found, expected, "Op #{op_id}: {resolved:?}");
            }

            ResolvedOp::UpperBound(key) => {
                let expected = sorted.get(upper_index(&sorted, key)).copied();
                let found = tree.upper_bound(&key).get().map(ref_key);
                assert_eq!(found, expected, "Op #{op_id}: {resolved:?}");
            }

            ResolvedOp::EqualRange(key) => {
                let expected = &sorted[lower_index(&sorted, key)..upper_index(&sorted, key)];
                let found: Vec<u32> = tree.equal_range(&key).map(ref_key).collect();
                assert_eq!(found, expected, "Op #{op_id}: {resolved:?}");

                let reversed: Vec<u32> = tree.equal_range(&key).rev().map(ref_key).collect();
                assert_eq!(reversed.len(), expected.len(), "Op #{op_id}: {resolved:?}");
            }

            ResolvedOp::RemoveOne(key) => {
                let expected = sorted
                    .binary_search(&key)
                    .ok()
                    .map(|_| sorted.remove(lower_index(&sorted, key)));

                let removed = tree.remove(&key).map(node_key);
                assert_eq!(removed, expected, "Op #{op_id}: {resolved:?}");
            }

            ResolvedOp::RemoveAll(key) => {
                let before = sorted.len();
                sorted.retain(|&x| x != key);

                assert_eq!(tree.remove_all(&key), before - sorted.len(), "Op #{op_id}: {resolved:?}");
            }

            ResolvedOp::RemoveRange(lo, hi) => {
                let before = sorted.len();
                sorted.retain(|&x| x < lo || x > hi);

                let removed = unsafe {
                    let first = tree.lower_bound_raw(&lo);
                    let end = tree.upper_bound_raw(&hi);
                    tree.remove_range(first, end)
                };
                assert_eq!(removed, before - sorted.len(), "Op #{op_id}: {resolved:?}");
            }

            ResolvedOp::First => {
                let expected = sorted.first().copied();
                assert_eq!(tree.first().map(|n| n.key), expected, "Op #{op_id}: {resolved:?}");
            }

            ResolvedOp::PopFirst => {
                let expected = (!sorted.is_empty()).then(|| sorted.remove(0));
                assert_eq!(tree.pop_first().map(node_key), expected, "Op #{op_id}: {resolved:?}");
            }

            ResolvedOp::Last => {
                let expected = sorted.last().copied();
                assert_eq!(tree.last().map(|n| n.key), expected, "Op #{op_id}: {resolved:?}");
            }

            ResolvedOp::PopLast => {
                let expected = sorted.pop();
                assert_eq!(tree.pop_last().map(node_key), expected, "Op #{op_id}: {resolved:?}");
            }
        }

        tree.assert_invariants();
        assert_eq!(tree.len(), sorted.len());
        assert!(tree.iter().map(ref_key).eq(sorted.iter().copied()));
        assert!(tree.iter().rev().map(ref_key).eq(sorted.iter().rev().copied()));
    }
}

#[derive(Clone, Debug, Arbitrary)]
pub enum CursorOp {
    // Get is not an operation as it's executed on every loop iteration to check equivalence.
    MovePrev,
    MoveNext,
    PeekNext,
    PeekPrev,
    RemoveCurrent,
    RemoveCurrentMovePrev,
}

pub fn cursor_op_strategy() -> impl Strategy<Value = CursorOp> {
    proptest::prop_oneof![
        Just(CursorOp::MovePrev),
        Just(CursorOp::MoveNext),
        Just(CursorOp::PeekNext),
        Just(CursorOp::PeekPrev),
        Just(CursorOp::RemoveCurrent),
        Just(CursorOp::RemoveCurrentMovePrev),
    ]
}

#[derive(Clone, Debug)]
pub struct CursorEquivalenceInput {
    pub keys: Vec<u32>,
    pub ops: Vec<CursorOp>,
}

impl<'a> arbitrary::Arbitrary<'a> for CursorEquivalenceInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        // Small keys, so that the tree holds plenty of duplicates.
        fn key(u: &mut arbitrary::Unstructured<'_>) -> u32 {
            u8::arbitrary(u).map_or(0, |k| u32::from(k % 32))
        }

        fn op(u: &mut arbitrary::Unstructured<'_>) -> CursorOp {
            CursorOp::arbitrary(u).unwrap_or(CursorOp::MoveNext)
        }

        let num_keys = u8::arbitrary(u)? % 100;
        let num_ops = u16::arbitrary(u)? % 1000;

        let keys = core::iter::repeat_with(|| key(u))
            .take(num_keys.into())
            .collect();

        let ops = core::iter::repeat_with(|| op(u))
            .take(num_ops.into())
            .collect();

        Ok(CursorEquivalenceInput { keys, ops })
    }
}

/// Walks a cursor over a tree holding `keys`, duplicates included, next to an index into the
/// sorted keys.
///
/// Equal keys are interchangeable, so the two agree as long as the cursor sits at the same
/// position in the in-order sequence as the index.
pub fn run_cursor_equivalence(keys: Vec<u32>, ops: Vec<CursorOp>) {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in &keys {
        tree.insert(TestNode::new(key));
    }

    let mut vec = keys;
    vec.sort_unstable();

    fn vec_curs_prev(v: &[u32], curs: Option<usize>) -> Option<usize> {
        match curs {
            Some(i) => i.checked_sub(1),
            None => v.len().checked_sub(1),
        }
    }

    fn vec_curs_next(v: &[u32], curs: Option<usize>) -> Option<usize> {
        match curs {
            Some(i) => i.checked_add(1).filter(|&i| i < v.len()),
            None => (!v.is_empty()).then_some(0),
        }
    }

    let mut vec_curs = vec_curs_next(&vec, None);
    let mut tree_curs = tree.cursor_first_mut();

    assert_eq!(vec_curs.map(|i| &vec[i]), tree_curs.get().map(TestNode::key));

    for op in ops {
        match op {
            CursorOp::MoveNext => {
                vec_curs = vec_curs_next(&vec, vec_curs);
                tree_curs.move_next();
            }

            CursorOp::MovePrev => {
                vec_curs = vec_curs_prev(&vec, vec_curs);
                tree_curs.move_prev();
            }

            CursorOp::PeekNext => {
                let v = vec_curs_next(&vec, vec_curs).map(|i| &vec[i]);
                let t = tree_curs.peek_next().map(TestNode::key);

                assert_eq!(v, t);
            }

            CursorOp::PeekPrev => {
                let v = vec_curs_prev(&vec, vec_curs).map(|i| &vec[i]);
                let t = tree_curs.peek_prev().map(TestNode::key);

                assert_eq!(v, t);
            }

            CursorOp::RemoveCurrent => {
                let v = vec_curs.map(|i| vec.remove(i));

                if vec_curs == Some(vec.len()) {
                    vec_curs = None;
                }

                let t = tree_curs.remove_current().map(|node| node.key);

                assert_eq!(v, t);
            }

            CursorOp::RemoveCurrentMovePrev => {
                let new_v_curs = vec_curs.map(|i| i.checked_sub(1));
                let v = vec_curs.map(|i| vec.remove(i));

                if let Some(vc) = new_v_curs {
                    vec_curs = vc;
                }

                let t = tree_curs
                    .remove_current_and_move_prev()
                    .map(|node| node.key);

                assert_eq!(v, t);
            }
        }

        assert_eq!(vec_curs.map(|i| &vec[i]), tree_curs.get().map(TestNode::key));
    }

    drop(tree_curs);
    tree.assert_invariants();
    assert!(tree.iter().map(|node| node.key).eq(vec.iter().copied()));
}
