#![no_main]

use std::cmp::Ordering;

use goldrun::harness::natural::natural_cmp;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let (a, b) = data;
    // Must never panic on arbitrary UTF-8 (multi-byte chars next to digit runs)
    let forward = natural_cmp(a, b);
    assert_eq!(forward, natural_cmp(b, a).reverse());
    assert_eq!(forward == Ordering::Equal, a == b);
});
