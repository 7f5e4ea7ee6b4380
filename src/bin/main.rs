use std::fmt;

use avl_multiset::AvlMultiset;

fn show(label: &str, f: impl FnOnce(&mut String) -> fmt::Result) -> fmt::Result {
    let mut out = String::new();
    f(&mut out)?;
    println!("{label:>12}: {out}");
    Ok(())
}

fn main() -> fmt::Result {
    let mut set: AvlMultiset<u32> = AvlMultiset::new();

    for key in [50, 20, 80, 10, 30, 70, 90, 30, 30, 60] {
        set.insert(key);
        set.assert_invariants();
    }

    println!("{set:?}");
    println!("len {} height {}", set.len(), set.height());
    println!("{set}");

    show("pre-order", |w| set.write_pre_order(w))?;
    show("in-order", |w| set.write_in_order(w))?;
    show("post-order", |w| set.write_post_order(w))?;
    show("level-order", |w| set.write_level_order(w))?;

    println!("count(30) = {}", set.count(&30));
    println!(
        "lower_bound(25) = {:?}, upper_bound(30) = {:?}",
        set.lower_bound(&25).get(),
        set.upper_bound(&30).get()
    );

    let mut curs = set.find_mut(&30);
    curs.insert_near(31);
    drop(curs);

    println!("removed {} copies of 30", set.remove(&30));
    set.assert_invariants();
    println!("{set:?}");

    let smallest = set.pop_first();
    println!("popped {smallest:?}, now {set:?}");

    Ok(())
}
