use crate::varint::varint_len;

/// Uncompressed size of every chunk except possibly the last
pub const CHUNK_SRC_SIZE: usize = 0x8000; // 32KB

/// Token tags (first byte of every token)
pub const TAG_CHUNK_END: u8 = 0x00;
pub const TAG_LITERAL: u8 = 0x01;
pub const TAG_RUN: u8 = 0x02;
pub const TAG_BACK_REF: u8 = 0x03;

/// Encoded size of the `ChunkEnd` marker
pub const CHUNK_END_SIZE: usize = 1;

/// Size of the stored form of a chunk holding `len` bytes:
/// one literal token covering everything, then the end marker.
pub const fn stored_chunk_size(len: usize) -> usize {
    1 + varint_len(len as u64) + len + CHUNK_END_SIZE
}

/// Worst-case compressed size of a chunk of at most `CHUNK_SRC_SIZE` bytes.
///
/// The encoder never emits anything larger than the stored form, which grows
/// monotonically with the chunk length, so the full-size stored form bounds
/// every chunk including a short final one.
pub const MAX_CHUNK_SIZE: usize = stored_chunk_size(CHUNK_SRC_SIZE);

/// Legacy length reported for the final chunk of a source.
///
/// No real chunk can be this large; see [`crate::ChunkOutput::reported_len`].
pub const LAST_CHUNK_SIZE: usize = usize::MAX;

/// Shortest back-reference the encoder emits
pub const MIN_MATCH: usize = 4;

/// Shortest run the encoder emits
pub const MIN_RUN: usize = 4;

/// Number of earlier positions examined per back-reference search
pub const MAX_CHAIN: usize = 32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_chunk_size() {
        // tag + 3-byte varint(32768) + payload + end marker
        assert_eq!(MAX_CHUNK_SIZE, 1 + 3 + 32768 + 1);
    }

    #[test]
    fn test_stored_size_is_monotonic() {
        let mut prev = stored_chunk_size(1);
        for len in 2..=CHUNK_SRC_SIZE {
            let size = stored_chunk_size(len);
            assert!(size > prev);
            prev = size;
        }
        assert_eq!(prev, MAX_CHUNK_SIZE);
    }

    #[test]
    fn test_sentinel_is_unreachable() {
        assert!(LAST_CHUNK_SIZE > MAX_CHUNK_SIZE);
    }
}
