#![no_main]

use avl_multiset::model::{run_model_equivalence, Op};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|ops: Vec<Op>| { run_model_equivalence(ops) });
