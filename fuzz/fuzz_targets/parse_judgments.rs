#![no_main]

use bitsim_core::dataset::read_judgments;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(judgments) = read_judgments(data, 3500) {
        assert!(judgments.len() <= 3500);
    }
});
