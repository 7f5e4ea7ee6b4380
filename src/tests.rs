extern crate std;

use std::{ops::Range, prelude::v1::*};

use proptest::prelude::*;

use crate::model::{self, TestNode};

use super::*;

fn build(keys: &[u32]) -> AvlTree<TestNode> {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in keys {
        tree.insert(TestNode::new(key));
        tree.assert_invariants();
    }

    tree
}

fn keys_of(tree: &AvlTree<TestNode>) -> Vec<u32> {
    tree.iter().map(|node| node.key).collect()
}

// Calls `f` with every permutation of `keys`.
fn for_each_permutation(keys: &[u32], f: &mut dyn FnMut(&[u32])) {
    fn permute(keys: &mut Vec<u32>, k: usize, f: &mut dyn FnMut(&[u32])) {
        if k == keys.len() {
            f(keys.as_slice());
            return;
        }

        for i in k..keys.len() {
            keys.swap(k, i);
            permute(keys, k + 1, f);
            keys.swap(k, i);
        }
    }

    permute(&mut keys.to_vec(), 0, f);
}

fn insert_find_all(keys: &[u32]) {
    let tree = build(keys);

    for key in keys {
        let node = tree.find_raw(key).expect("item not found");
        assert_eq!(unsafe { node.as_ref().key() }, key);
        assert_eq!(tree.count(key), keys.iter().filter(|&k| k == key).count());
    }

    let mut sorted = keys.to_vec();
    sorted.sort_unstable();
    assert_eq!(keys_of(&tree), sorted);
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn distinct_elems_find() {
    for_each_permutation(&[0, 1], &mut insert_find_all);
    for_each_permutation(&[0, 1, 2], &mut insert_find_all);
    for_each_permutation(&[0, 1, 2, 3], &mut insert_find_all);
    for_each_permutation(&[0, 1, 2, 3, 4, 5], &mut insert_find_all);
}

#[test]
fn duplicate_elems_find() {
    insert_find_all(&[7, 7, 7, 7, 7, 7, 7, 7]);
    for_each_permutation(&[1, 1, 2], &mut insert_find_all);
    for_each_permutation(&[1, 1, 2, 2, 3], &mut insert_find_all);
    for_each_permutation(&[0, 3, 3, 3, 5, 5], &mut insert_find_all);
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree = build(keys);

    for key in keys {
        let node = tree.find_raw(key).expect("item not found");
        let removed = unsafe { tree.remove_at(node) };
        assert_eq!(removed.key, *key);
        tree.assert_invariants();
    }

    assert!(tree.is_empty());

    for &key in keys {
        tree.insert(TestNode::new(key));
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        let node = tree.find_raw(key).expect("item not found");
        unsafe { drop(tree.remove_at(node)) };
        tree.assert_invariants();
    }

    assert!(tree.is_empty());
}

#[test]
fn remove_distinct() {
    insert_remove_all(&[0]);
    for_each_permutation(&[0, 1], &mut insert_remove_all);
    for_each_permutation(&[0, 1, 2], &mut insert_remove_all);
    for_each_permutation(&[0, 1, 2, 3], &mut insert_remove_all);
    for_each_permutation(&[0, 1, 2, 3, 4, 5], &mut insert_remove_all);
}

#[test]
fn remove_duplicates() {
    insert_remove_all(&[4, 4, 4, 4, 4, 4, 4]);
    for_each_permutation(&[1, 1, 2, 2, 3], &mut insert_remove_all);
    for_each_permutation(&[0, 3, 3, 3, 5, 5], &mut insert_remove_all);
}

// Removing a node must rebalance every ancestor, not only the first one that rotates.
#[test]
fn remove_rebalances_whole_path() {
    for n in 1..100 {
        for victim in 0..n {
            let mut tree: AvlTree<TestNode> = AvlTree::new();
            for key in 0..n {
                tree.insert(TestNode::new(key));
            }

            assert!(tree.remove(&victim).is_some());
            tree.assert_invariants();
        }
    }
}

#[test]
fn ascending_inserts_stay_logarithmic() {
    let keys: Vec<u32> = (0..1023).collect();
    let tree = build(&keys);

    // A perfectly balanced tree of 1023 nodes has height 10; AVL trees stay within 1.44 log2(n).
    assert!(tree.height() <= 14, "height {}", tree.height());
    assert_eq!(tree.len(), 1023);
}

#[test]
fn equal_keys_go_left() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();
    tree.insert(TestNode::new(5));
    tree.insert(TestNode::new(5));

    let root = tree.root.expect("tree has a root");
    unsafe {
        assert!(tree.links(root).left().is_some());
        assert!(tree.links(root).right().is_none());
    }
}

#[test]
fn bounds_on_duplicates() {
    let tree = build(&[2, 4, 4, 4, 6]);

    let lower = tree.lower_bound(&4);
    assert_eq!(lower.get().map(|n| n.key), Some(4));
    assert_eq!(lower.peek_prev().map(|n| n.key), Some(2));

    let upper = tree.upper_bound(&4);
    assert_eq!(upper.get().map(|n| n.key), Some(6));

    assert_eq!(tree.equal_range(&4).count(), 3);
    assert_eq!(tree.equal_range(&3).count(), 0);
    assert!(tree.upper_bound(&6).is_ghost());
    assert!(tree.lower_bound(&7).is_ghost());
    assert_eq!(tree.lower_bound(&0).get().map(|n| n.key), Some(2));
}

#[test]
fn remove_all_and_range() {
    let mut tree = build(&[1, 3, 3, 3, 5, 7, 7, 9]);

    assert_eq!(tree.remove_all(&3), 3);
    tree.assert_invariants();
    assert_eq!(tree.remove_all(&3), 0);
    assert_eq!(keys_of(&tree), [1, 5, 7, 7, 9]);

    let removed = unsafe {
        let first = tree.lower_bound_raw(&5);
        let end = tree.upper_bound_raw(&7);
        tree.remove_range(first, end)
    };
    assert_eq!(removed, 3);
    tree.assert_invariants();
    assert_eq!(keys_of(&tree), [1, 9]);

    // An empty range removes nothing.
    let removed = unsafe {
        let end = tree.last_raw();
        tree.remove_range(end, end)
    };
    assert_eq!(removed, 0);
    assert_eq!(tree.len(), 2);
}

#[test]
fn cursor_ghost_wraps_around() {
    let tree = build(&[10, 20, 30]);

    let mut curs = tree.cursor_end();
    assert!(curs.is_ghost());
    assert_eq!(curs.peek_next().map(|n| n.key), Some(10));
    assert_eq!(curs.peek_prev().map(|n| n.key), Some(30));

    curs.move_prev();
    assert_eq!(curs.get().map(|n| n.key), Some(30));
    curs.move_next();
    assert!(curs.is_ghost());
    curs.move_next();
    assert_eq!(curs, tree.cursor_first());

    let empty: AvlTree<TestNode> = AvlTree::new();
    assert_eq!(empty.cursor_first(), empty.cursor_end());
    assert_eq!(empty.cursor_end().height(), 0);
}

#[test]
fn cursor_reports_height_and_balance() {
    let tree = build(&[2, 1, 3, 4]);

    // Root 2 with left 1 and right 3, which has right child 4.
    let root = tree.find(&2);
    assert_eq!(root.height(), 3);
    assert_eq!(root.balance_factor(), -1);

    let three = tree.find(&3);
    assert_eq!(three.height(), 2);
    assert_eq!(three.balance_factor(), -1);

    let four = tree.find(&4);
    assert_eq!(four.height(), 1);
    assert_eq!(four.balance_factor(), 0);
}

#[test]
fn removing_ghost_is_a_no_op() {
    let mut tree = build(&[1, 2]);
    let mut curs = tree.cursor_end_mut();

    assert!(curs.remove_current().is_none());
    assert!(curs.remove_current_and_move_prev().is_none());
    assert!(curs.is_ghost());
    drop(curs);

    assert_eq!(tree.len(), 2);
}

#[test]
fn insert_near_any_hint() {
    let keys = [5, 1, 9, 3, 7, 5, 5, 0, 10, 2];

    for hint in keys {
        for key in 0..12 {
            let mut tree = build(&keys);

            let mut curs = tree.find_mut(&hint);
            curs.insert_near(TestNode::new(key));
            assert_eq!(curs.get().map(|n| n.key), Some(key));
            drop(curs);

            tree.assert_invariants();
            assert_eq!(tree.count(&key), keys.iter().filter(|&&k| k == key).count() + 1);
        }
    }
}

#[test]
fn traversals() {
    // Inserting 1..=7 in this order builds a perfect tree without rotations.
    let tree = build(&[4, 2, 6, 1, 3, 5, 7]);

    fn render(f: impl FnOnce(&mut String) -> core::fmt::Result) -> String {
        let mut out = String::new();
        f(&mut out).expect("writing to a String cannot fail");
        out
    }

    let pre = render(|w| tree.write_pre_order(w));
    assert_eq!(pre, "4 2 1 3 6 5 7 ");
    assert_eq!(render(|w| tree.write_pre_order_recursive(w)), pre);

    let in_order = render(|w| tree.write_in_order(w));
    assert_eq!(in_order, "1 2 3 4 5 6 7 ");
    assert_eq!(render(|w| tree.write_in_order_recursive(w)), in_order);

    let post = render(|w| tree.write_post_order(w));
    assert_eq!(post, "1 3 2 5 7 6 4 ");
    assert_eq!(render(|w| tree.write_post_order_recursive(w)), post);

    let level = render(|w| tree.write_level_order(w));
    assert_eq!(level, "4 2 6 1 3 5 7 ");
    assert_eq!(render(|w| tree.write_level_order_recursive(w)), level);

    assert_eq!(render(|w| tree.print(w)), "1 2 3 4 5 6 7 \n");
}

#[test]
fn sideways_layout() {
    let tree = build(&[2, 1, 3]);

    let mut out = String::new();
    tree.write_sideways(&mut out).expect("writing to a String cannot fail");
    assert_eq!(out, "    3\n2\n    1\n");
}

#[test]
fn dotgraph_labels_duplicates_apart() {
    let tree = build(&[1, 1]);

    let mut out = String::new();
    tree.dotgraph("dups", &mut out)
        .expect("writing to a String cannot fail");

    assert!(out.contains("\"graphdups-0\" [label=\"1:2\"]"));
    assert!(out.contains("\"graphdups-1\" [label=\"1:1\"]"));
}

#[test]
fn swap_and_clear() {
    let mut a = build(&[1, 2, 3]);
    let mut b = build(&[9]);

    a.swap(&mut b);
    assert_eq!(keys_of(&a), [9]);
    assert_eq!(keys_of(&b), [1, 2, 3]);

    b.clear();
    assert!(b.is_empty());
    assert_eq!(b.height(), 0);
    b.assert_invariants();
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn model_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_model_equivalence(ops);
    }

    #[test]
    fn cursor_equivalence(
        keys in proptest::collection::vec(0u32..32, 0..100),
        ops in proptest::collection::vec(model::cursor_op_strategy(), FUZZ_RANGE),
    ) {
        model::run_cursor_equivalence(keys, ops);
    }
}
