//! Byte-aligned primitives for the token stream.
//!
//! Lengths and distances are LEB128 varints: 7 payload bits per byte,
//! least significant group first, high bit set on every byte but the last.

pub mod reader;
pub mod writer;

pub use reader::ByteReader;
pub use writer::ByteWriter;

/// Maximum encoded size of a 64-bit varint
pub const MAX_VARINT_LEN: usize = 10;

/// Number of bytes `value` occupies as a varint
pub const fn varint_len(value: u64) -> usize {
    let mut value = value;
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_len() {
        assert_eq!(varint_len(0), 1);
        assert_eq!(varint_len(127), 1);
        assert_eq!(varint_len(128), 2);
        assert_eq!(varint_len(16383), 2);
        assert_eq!(varint_len(16384), 3);
        assert_eq!(varint_len(32768), 3);
        assert_eq!(varint_len(u64::MAX), MAX_VARINT_LEN);
    }
}
