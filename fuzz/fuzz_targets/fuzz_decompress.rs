#![no_main]

use libfuzzer_sys::fuzz_target;
use lzbitmap::decompress;

fuzz_target!(|data: &[u8]| {
    // Decompression may fail on invalid input - that's OK
    // We're looking for panics/crashes, not errors
    let len = match decompress(None, data) {
        Ok(len) => len,
        Err(_) => return,
    };

    // Skip streams that expand beyond what is sensible to allocate
    if len > 16 * 1024 * 1024 {
        return;
    }

    // A stream that probes cleanly must decode into exactly that many bytes
    let mut out = vec![0u8; len];
    assert_eq!(decompress(Some(&mut out[..]), data).unwrap(), len);
});
