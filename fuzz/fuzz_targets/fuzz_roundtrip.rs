#![no_main]

use libfuzzer_sys::fuzz_target;
use lzbitmap::{compress_bound, compress_to_vec, decompress_to_vec, CompressConfig};

fuzz_target!(|data: &[u8]| {
    // Alternate between single and parallel paths based on the first byte
    let threads = data.first().map_or(1, |&b| (b % 4) as usize + 1);
    let config = CompressConfig { num_threads: threads, ..Default::default() };

    let compressed = compress_to_vec(data, &config).expect("compression should succeed");
    assert!(compressed.len() <= compress_bound(data.len()));

    let restored = decompress_to_vec(&compressed).expect("decompression should succeed");
    assert_eq!(restored, data);
});
