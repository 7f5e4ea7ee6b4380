use avl_multiset::AvlMultiset;

fn set_of(keys: &[i32]) -> AvlMultiset<i32> {
    keys.iter().copied().collect()
}

#[test]
fn count_duplicates() {
    let mut ms = AvlMultiset::new();
    ms.insert(5);
    ms.insert(5);
    ms.insert(3);

    assert_eq!(ms.count(&5), 2);
    assert_eq!(ms.count(&3), 1);
    assert_eq!(ms.count(&9), 0);
    assert!(ms.contains(&3));
    assert!(!ms.contains(&9));
}

#[test]
fn insert_returns_cursor_at_new_element() {
    let mut ms = set_of(&[1, 3]);

    let mut curs = ms.insert(2);
    assert_eq!(curs.get(), Some(&2));
    assert_eq!(curs.peek_prev(), Some(&1));
    assert_eq!(curs.peek_next(), Some(&3));
    curs.move_next();
    assert_eq!(curs.get(), Some(&3));
}

#[test]
fn lower_bound_finds_first_not_less() {
    let ms = set_of(&[2, 4, 4, 6]);

    let curs = ms.lower_bound(&4);
    assert!(!curs.is_ghost());
    assert_eq!(curs.get(), Some(&4));
    assert_eq!(curs.peek_prev(), Some(&2));

    assert_eq!(ms.lower_bound(&3).get(), Some(&4));
    assert_eq!(ms.lower_bound(&5).get(), Some(&6));
}

#[test]
fn lower_bound_past_the_end() {
    let ms = set_of(&[1, 2]);

    assert!(ms.lower_bound(&5).is_ghost());
    assert_eq!(ms.lower_bound(&5), ms.cursor_end());
}

#[test]
fn upper_bound_skips_equal_keys() {
    let ms = set_of(&[2, 4, 4, 6]);

    assert_eq!(ms.upper_bound(&4).get(), Some(&6));
    assert_eq!(ms.upper_bound(&1).get(), Some(&2));
    assert!(ms.upper_bound(&6).is_ghost());
}

#[test]
fn equal_range_spans_all_occurrences() {
    let ms = set_of(&[3, 3, 4]);

    assert_eq!(ms.equal_range(&3).count(), 2);
    assert!(ms.equal_range(&3).all(|&k| k == 3));
    assert_eq!(ms.equal_range(&4).count(), 1);
    assert_eq!(ms.equal_range(&5).count(), 0);
}

#[test]
fn find_lands_on_first_occurrence() {
    let ms = set_of(&[1, 7, 7, 7, 8]);

    let curs = ms.find(&7);
    assert_eq!(curs.get(), Some(&7));
    assert_eq!(curs.peek_prev(), Some(&1));
    assert!(ms.find(&2).is_ghost());
}

#[test]
fn remove_by_key_removes_all_matches() {
    let mut ms = set_of(&[5, 5, 7]);

    assert_eq!(ms.remove(&5), 2);
    assert_eq!(ms.count(&5), 0);
    assert_eq!(ms.remove(&5), 0);
    assert_eq!(ms.len(), 1);
    ms.assert_invariants();
}

#[test]
fn remove_by_cursor_removes_single_element() {
    let mut ms = set_of(&[7, 8]);

    let mut curs = ms.find_mut(&7);
    assert_eq!(curs.remove_current(), Some(7));
    assert_eq!(curs.get(), Some(&8));

    assert_eq!(ms.count(&7), 0);
    assert_eq!(ms.len(), 1);
}

#[test]
fn remove_by_cursor_keeps_other_duplicates() {
    let mut ms = set_of(&[4, 4, 4]);

    let mut curs = ms.find_mut(&4);
    assert_eq!(curs.remove_current_and_move_prev(), Some(4));
    assert!(curs.is_ghost());

    assert_eq!(ms.count(&4), 2);
    ms.assert_invariants();
}

#[test]
fn remove_at_ghost_is_a_no_op() {
    let mut ms = set_of(&[1]);

    assert_eq!(ms.cursor_end_mut().remove_current(), None);
    assert_eq!(ms.len(), 1);
}

#[test]
fn remove_range_removes_half_open_span() {
    let mut ms = set_of(&[1, 2, 2, 3, 4, 5, 5, 6]);

    assert_eq!(ms.remove_range(2..5), 4);
    assert_eq!(ms.iter().copied().collect::<Vec<_>>(), [1, 5, 5, 6]);

    assert_eq!(ms.remove_range(5..=5), 2);
    assert_eq!(ms.remove_range::<i32, _>(..), 2);
    assert!(ms.is_empty());
    ms.assert_invariants();
}

#[test]
#[should_panic]
fn inverted_range_panics() {
    let ms = set_of(&[1, 2, 3]);
    #[allow(clippy::reversed_empty_ranges)]
    let _ = ms.range(3..1);
}

#[test]
fn range_iterates_both_ways() {
    let ms = set_of(&[1, 2, 2, 3, 4, 5]);

    assert_eq!(ms.range(2..4).copied().collect::<Vec<_>>(), [2, 2, 3]);
    assert_eq!(ms.range(2..=4).rev().copied().collect::<Vec<_>>(), [4, 3, 2, 2]);
    assert_eq!(ms.range(6..).count(), 0);
}

#[test]
fn size_and_empty() {
    let mut ms = AvlMultiset::new();
    assert!(ms.is_empty());

    ms.insert(1);
    ms.insert(2);
    assert!(!ms.is_empty());
    assert_eq!(ms.len(), 2);
    assert!(ms.max_size() > ms.len());

    ms.clear();
    assert!(ms.is_empty());
    assert_eq!(ms.len(), 0);
    assert_eq!(ms.height(), 0);
}

#[test]
fn clone_creates_equal_set() {
    let ms = set_of(&[1, 2]);

    let mut copy = ms.clone();
    assert_eq!(copy, ms);

    copy.insert(3);
    assert_ne!(copy, ms);
    assert_eq!(ms.len(), 2);
}

#[test]
fn clone_from_replaces_contents() {
    let a = set_of(&[1, 2]);
    let mut b = set_of(&[9, 9, 9]);

    b.clone_from(&a);
    assert_eq!(b, a);

    b.insert(5);
    assert_ne!(b, a);
}

#[test]
fn comparisons_are_lexicographic() {
    let a = set_of(&[1, 2]);
    let b = set_of(&[1, 3]);

    assert!(a < b);
    assert!(b > a);
    assert!(a != b);

    // A proper prefix sorts first.
    assert!(set_of(&[1]) < set_of(&[1, 1]));
    assert!(set_of(&[]) < set_of(&[0]));
    assert_eq!(set_of(&[3, 1, 2]), set_of(&[1, 2, 3]));
}

#[test]
fn iteration_is_in_order() {
    let ms = set_of(&[3, 1, 2, 2, 0]);

    let forward: Vec<i32> = ms.iter().copied().collect();
    assert_eq!(forward, [0, 1, 2, 2, 3]);

    let backward: Vec<i32> = ms.iter().rev().copied().collect();
    assert_eq!(backward, [3, 2, 2, 1, 0]);

    let mut curs = ms.cursor_last();
    let mut walked = Vec::new();
    while let Some(&k) = curs.get() {
        walked.push(k);
        curs.move_prev();
    }
    assert_eq!(walked, backward);

    let owned: Vec<i32> = ms.into_iter().rev().collect();
    assert_eq!(owned, backward);
}

#[test]
fn iter_mut_updates_in_place() {
    let mut ms = set_of(&[1, 2, 3]);

    for k in ms.iter_mut() {
        *k *= 10;
    }

    assert_eq!(ms.iter().copied().collect::<Vec<_>>(), [10, 20, 30]);
    ms.assert_invariants();
}

#[test]
fn swap_exchanges_contents() {
    let mut a = set_of(&[1, 2]);
    let mut b = set_of(&[100]);

    a.swap(&mut b);
    assert_eq!(a.count(&100), 1);
    assert_eq!(b.count(&1), 1);
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 2);
}

#[test]
fn pop_both_ends() {
    let mut ms = set_of(&[4, 1, 4, 9]);

    assert_eq!(ms.first(), Some(&1));
    assert_eq!(ms.last(), Some(&9));
    assert_eq!(ms.pop_first(), Some(1));
    assert_eq!(ms.pop_last(), Some(9));
    assert_eq!(ms.pop_last(), Some(4));
    assert_eq!(ms.pop_first(), Some(4));
    assert_eq!(ms.pop_first(), None);
}

#[test]
fn insert_near_matches_plain_insert() {
    let keys = [50, 20, 80, 10, 30, 70, 90, 30, 30];

    for hint in keys {
        for key in [0, 10, 25, 30, 31, 60, 95] {
            let mut plain = set_of(&keys);
            plain.insert(key);

            let mut hinted = set_of(&keys);
            let mut curs = hinted.find_mut(&hint);
            curs.insert_near(key);
            assert_eq!(curs.get(), Some(&key));

            hinted.assert_invariants();
            assert_eq!(hinted, plain);
        }
    }

    let mut ms = set_of(&[1, 2, 3]);
    ms.cursor_end_mut().insert_near(0);
    assert_eq!(ms.first(), Some(&0));
}

#[test]
fn many_duplicates_stay_balanced() {
    let mut ms = AvlMultiset::new();
    for _ in 0..1000 {
        ms.insert(42);
    }

    ms.assert_invariants();
    assert_eq!(ms.count(&42), 1000);
    assert!(ms.height() <= 14);

    let mut curs = ms.cursor_first_mut();
    for _ in 0..500 {
        assert_eq!(curs.remove_current(), Some(42));
    }
    drop(curs);

    ms.assert_invariants();
    assert_eq!(ms.len(), 500);
}

#[test]
fn cursor_height_and_balance() {
    let ms = set_of(&[2, 1, 3, 4]);

    let root = ms.find(&2);
    assert_eq!(root.height(), 3);
    assert_eq!(root.balance_factor(), -1);
    assert_eq!(ms.find(&4).height(), 1);
    assert_eq!(ms.cursor_end().balance_factor(), 0);
}

#[test]
fn traversal_orders() {
    let ms = set_of(&[4, 2, 6, 1, 3, 5, 7]);

    let mut out = String::new();
    ms.write_pre_order(&mut out).unwrap();
    assert_eq!(out, "4 2 1 3 6 5 7 ");

    out.clear();
    ms.write_post_order_recursive(&mut out).unwrap();
    assert_eq!(out, "1 3 2 5 7 6 4 ");

    out.clear();
    ms.write_level_order(&mut out).unwrap();
    assert_eq!(out, "4 2 6 1 3 5 7 ");

    out.clear();
    ms.print(&mut out).unwrap();
    assert_eq!(out, "1 2 3 4 5 6 7 \n");
}

#[test]
fn display_draws_tree_sideways() {
    let ms = set_of(&[2, 1, 3]);
    assert_eq!(ms.to_string(), "    3\n2\n    1\n");

    let empty: AvlMultiset<i32> = AvlMultiset::new();
    assert_eq!(empty.to_string(), "");
}

#[test]
fn debug_lists_elements() {
    let ms = set_of(&[2, 1, 2]);
    assert_eq!(format!("{ms:?}"), "{1, 2, 2}");
}

#[test]
fn works_with_borrowed_keys() {
    let mut ms: AvlMultiset<String> = ["pear", "apple", "pear"].map(String::from).into();

    assert_eq!(ms.count("pear"), 2);
    assert_eq!(ms.lower_bound("b").get().map(String::as_str), Some("pear"));
    assert_eq!(ms.remove("pear"), 2);
    assert_eq!(ms.first().map(String::as_str), Some("apple"));
}
