use crate::error::{Error, Result};
use crate::format::Token;
use crate::varint::ByteReader;

/// Destination for decoded bytes
///
/// The decoder validates tokens against the chunk window before calling a
/// sink, so a sink only has to enforce its own capacity. Probe and real
/// decoding share the same parse and differ only in the sink.
pub trait Sink {
    /// Total bytes produced so far
    fn len(&self) -> usize;

    fn push_literal(&mut self, bytes: &[u8]) -> Result<()>;

    fn push_run(&mut self, value: u8, length: usize) -> Result<()>;

    /// Copy `length` bytes starting `distance` bytes behind the current end.
    /// Source and destination may overlap.
    fn push_copy(&mut self, distance: usize, length: usize) -> Result<()>;
}

/// Sink that only counts bytes (probe mode)
#[derive(Debug, Default)]
pub struct ProbeSink {
    len: usize,
}

impl ProbeSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn grow(&mut self, length: usize) -> Result<()> {
        self.len = self.len.checked_add(length).ok_or(Error::OutputOverflow)?;
        Ok(())
    }
}

impl Sink for ProbeSink {
    fn len(&self) -> usize {
        self.len
    }

    fn push_literal(&mut self, bytes: &[u8]) -> Result<()> {
        self.grow(bytes.len())
    }

    fn push_run(&mut self, _value: u8, length: usize) -> Result<()> {
        self.grow(length)
    }

    fn push_copy(&mut self, _distance: usize, length: usize) -> Result<()> {
        self.grow(length)
    }
}

/// Sink writing into a fixed-size buffer
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> SliceSink<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    /// Claim `length` more bytes, returning the range start
    #[inline]
    fn claim(&mut self, length: usize) -> Result<usize> {
        let needed = self.len.saturating_add(length);
        if needed > self.buf.len() {
            return Err(Error::DestinationTooSmall { needed, capacity: self.buf.len() });
        }
        let start = self.len;
        self.len = needed;
        Ok(start)
    }
}

impl Sink for SliceSink<'_> {
    fn len(&self) -> usize {
        self.len
    }

    fn push_literal(&mut self, bytes: &[u8]) -> Result<()> {
        let start = self.claim(bytes.len())?;
        self.buf[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn push_run(&mut self, value: u8, length: usize) -> Result<()> {
        let start = self.claim(length)?;
        self.buf[start..start + length].fill(value);
        Ok(())
    }

    fn push_copy(&mut self, distance: usize, length: usize) -> Result<()> {
        let source = self
            .len
            .checked_sub(distance)
            .ok_or(Error::InvalidBackReference { distance: distance as u64, available: self.len })?;
        let start = self.claim(length)?;

        if distance >= length {
            self.buf.copy_within(source..source + length, start);
        } else {
            // Overlapping copy: later bytes repeat ones written by this copy
            for i in 0..length {
                self.buf[start + i] = self.buf[source + i];
            }
        }
        Ok(())
    }
}

/// Decode one chunk from `reader` into `sink`.
///
/// Consumes tokens up to and including the chunk's `ChunkEnd` and returns
/// the number of bytes the chunk produced. Back-references are checked
/// against this chunk's output only; input that ends before the end marker
/// is rejected.
pub fn decode_chunk<S: Sink>(reader: &mut ByteReader<'_>, sink: &mut S) -> Result<usize> {
    let start = reader.position();
    let mut produced: usize = 0;

    loop {
        if reader.is_empty() {
            return Err(Error::UnterminatedChunk { offset: start });
        }

        let token = Token::read(reader)?;
        match token {
            Token::ChunkEnd => return Ok(produced),
            Token::Literal(bytes) => sink.push_literal(bytes)?,
            Token::Run { value, length } => sink.push_run(value, length)?,
            Token::BackRef { distance, length } => {
                if distance == 0 || distance > produced {
                    return Err(Error::InvalidBackReference {
                        distance: distance as u64,
                        available: produced,
                    });
                }
                sink.push_copy(distance, length)?;
            }
        }

        produced = produced.checked_add(token.uncompressed_size()).ok_or(Error::OutputOverflow)?;
    }
}
