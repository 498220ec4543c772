use crate::error::{Error, Result};

/// Bounds-checked cursor over a compressed buffer
///
/// Every read either succeeds entirely within the slice or returns
/// `UnexpectedEof` carrying the offset where input ran out.
pub struct ByteReader<'a> {
    src: &'a [u8],
    /// Offset of the next unread byte
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self { src, pos: 0 }
    }

    /// Read a single byte
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self.src.get(self.pos).ok_or(Error::UnexpectedEof { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read a LEB128 varint
    ///
    /// Fails if the input ends before a terminating byte (high bit clear)
    /// or if the value does not fit in 64 bits.
    pub fn read_varint(&mut self) -> Result<u64> {
        let start = self.pos;
        let mut value: u64 = 0;
        let mut shift: u32 = 0;

        loop {
            let byte = self.read_u8()?;
            let payload = (byte & 0x7F) as u64;

            if shift > 63 || (shift == 63 && payload > 1) {
                return Err(Error::VarintOverflow { offset: start });
            }
            value |= payload << shift;

            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Borrow the next `n` bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::UnexpectedEof { offset: self.src.len() });
        }
        let bytes = &self.src[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Offset of the next unread byte
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.src.len() - self.pos
    }

    /// Whether all input has been consumed
    pub fn is_empty(&self) -> bool {
        self.pos >= self.src.len()
    }
}
