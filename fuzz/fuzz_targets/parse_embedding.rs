#![no_main]

use bitsim_core::{Radix, VectorStore, Vocabulary};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut vocab = Vocabulary::new();
    if let Ok(store) = VectorStore::read_building(data, &mut vocab, Radix::Decimal) {
        assert!(store.present() <= vocab.len());
        for (_, v) in store.iter() {
            assert_eq!(v.bits(), store.bits());
        }
    }
    let _ = VectorStore::read_filtered(data, &vocab, Radix::Hex);
});
