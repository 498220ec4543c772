use super::constants::{TAG_BACK_REF, TAG_CHUNK_END, TAG_LITERAL, TAG_RUN};
use crate::error::{Error, Result};
use crate::varint::{varint_len, ByteReader, ByteWriter};

/// A single token in a chunk bitstream
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// Raw bytes copied verbatim
    Literal(&'a [u8]),
    /// `value` repeated `length` times
    Run { value: u8, length: usize },
    /// Copy `length` bytes from `distance` bytes back in the current chunk
    BackRef { distance: usize, length: usize },
    /// End of the current chunk
    ChunkEnd,
}

impl<'a> Token<'a> {
    /// Returns the uncompressed size this token represents
    pub fn uncompressed_size(&self) -> usize {
        match self {
            Token::Literal(bytes) => bytes.len(),
            Token::Run { length, .. } | Token::BackRef { length, .. } => *length,
            Token::ChunkEnd => 0,
        }
    }

    /// Returns the number of bytes this token occupies in the stream
    pub fn encoded_len(&self) -> usize {
        match self {
            Token::Literal(bytes) => 1 + varint_len(bytes.len() as u64) + bytes.len(),
            Token::Run { length, .. } => 2 + varint_len(*length as u64),
            Token::BackRef { distance, length } => {
                1 + varint_len(*distance as u64) + varint_len(*length as u64)
            }
            Token::ChunkEnd => 1,
        }
    }

    /// Append this token to `writer`
    ///
    /// Either the whole token fits or nothing is written.
    pub fn write(&self, writer: &mut ByteWriter<'_>) -> Result<()> {
        let needed = self.encoded_len();
        if needed > writer.remaining() {
            return Err(Error::DestinationTooSmall {
                needed: writer.len() + needed,
                capacity: writer.capacity(),
            });
        }

        match self {
            Token::Literal(bytes) => {
                writer.write_u8(TAG_LITERAL)?;
                writer.write_varint(bytes.len() as u64)?;
                writer.write_bytes(bytes)?;
            }
            Token::Run { value, length } => {
                writer.write_u8(TAG_RUN)?;
                writer.write_u8(*value)?;
                writer.write_varint(*length as u64)?;
            }
            Token::BackRef { distance, length } => {
                writer.write_u8(TAG_BACK_REF)?;
                writer.write_varint(*distance as u64)?;
                writer.write_varint(*length as u64)?;
            }
            Token::ChunkEnd => writer.write_u8(TAG_CHUNK_END)?,
        }
        Ok(())
    }

    /// Parse the next token from `reader`
    ///
    /// Structural checks only: the caller validates back-reference distances
    /// against its own window.
    pub fn read(reader: &mut ByteReader<'a>) -> Result<Token<'a>> {
        let offset = reader.position();
        let tag = reader.read_u8()?;

        match tag {
            TAG_CHUNK_END => Ok(Token::ChunkEnd),
            TAG_LITERAL => {
                let length = reader.read_varint()?;
                if length == 0 {
                    return Err(Error::EmptyToken { offset });
                }
                let available = reader.remaining();
                if length > available as u64 {
                    return Err(Error::TruncatedLiteral { length, available, offset });
                }
                Ok(Token::Literal(reader.read_bytes(length as usize)?))
            }
            TAG_RUN => {
                let value = reader.read_u8()?;
                let length = read_length(reader, offset)?;
                Ok(Token::Run { value, length })
            }
            TAG_BACK_REF => {
                let distance = reader.read_varint()?;
                let distance = usize::try_from(distance)
                    .map_err(|_| Error::InvalidBackReference { distance, available: 0 })?;
                let length = read_length(reader, offset)?;
                Ok(Token::BackRef { distance, length })
            }
            _ => Err(Error::InvalidTag { tag, offset }),
        }
    }
}

/// Read a non-zero run/copy length
fn read_length(reader: &mut ByteReader<'_>, offset: usize) -> Result<usize> {
    let length = reader.read_varint()?;
    if length == 0 {
        return Err(Error::EmptyToken { offset });
    }
    usize::try_from(length).map_err(|_| Error::OutputOverflow)
}
