use crate::error::{Error, Result};

/// Bounds-checked writer into a caller-provided buffer
///
/// A write that does not fit fails with `DestinationTooSmall` and leaves
/// the buffer beyond the current position untouched.
pub struct ByteWriter<'a> {
    buf: &'a mut [u8],
    /// Next write position
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn reserve(&self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(Error::DestinationTooSmall { needed: self.pos + n, capacity: self.buf.len() });
        }
        Ok(())
    }

    /// Write a single byte
    #[inline]
    pub fn write_u8(&mut self, byte: u8) -> Result<()> {
        self.reserve(1)?;
        self.buf[self.pos] = byte;
        self.pos += 1;
        Ok(())
    }

    /// Write a LEB128 varint
    pub fn write_varint(&mut self, value: u64) -> Result<()> {
        self.reserve(super::varint_len(value))?;

        let mut value = value;
        while value >= 0x80 {
            self.buf[self.pos] = (value as u8 & 0x7F) | 0x80;
            self.pos += 1;
            value >>= 7;
        }
        self.buf[self.pos] = value as u8;
        self.pos += 1;
        Ok(())
    }

    /// Write raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// Total size of the underlying buffer
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Space left before the buffer is full
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::varint::ByteReader;

    #[test]
    fn test_write_varint() {
        let mut buf = [0u8; 8];
        let mut writer = ByteWriter::new(&mut buf);
        writer.write_varint(5).unwrap();
        writer.write_varint(300).unwrap();
        assert_eq!(writer.len(), 3);
        assert_eq!(&buf[..3], &[0x05, 0xAC, 0x02]);
    }

    #[test]
    fn test_varint_boundaries_read_back() {
        let values = [0u64, 1, 127, 128, 255, 16383, 16384, 32768, u32::MAX as u64, u64::MAX];
        let mut buf = [0u8; 64];
        let mut writer = ByteWriter::new(&mut buf);
        for &v in &values {
            writer.write_varint(v).unwrap();
        }
        let written = writer.len();

        let mut reader = ByteReader::new(&buf[..written]);
        for &v in &values {
            assert_eq!(reader.read_varint().unwrap(), v);
        }
        assert!(reader.is_empty());
    }

    #[test]
    fn test_write_overflow_is_atomic() {
        let mut buf = [0xEEu8; 3];
        let mut writer = ByteWriter::new(&mut buf);
        writer.write_u8(0x01).unwrap();

        // 16384 needs 3 bytes, only 2 left
        let err = writer.write_varint(16384).unwrap_err();
        assert!(matches!(err, Error::DestinationTooSmall { needed: 4, capacity: 3 }));
        assert_eq!(writer.len(), 1);

        let err = writer.write_bytes(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::DestinationTooSmall { needed: 4, capacity: 3 }));
        assert_eq!(buf, [0x01, 0xEE, 0xEE]);
    }
}
