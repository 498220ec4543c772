use log::trace;

use super::matcher::{run_length, MatchFinder};
use crate::error::{Error, Result};
use crate::format::{stored_chunk_size, Token, CHUNK_SRC_SIZE, LAST_CHUNK_SIZE, MIN_RUN};
use crate::varint::ByteWriter;

/// Result of encoding one chunk
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkOutput {
    /// Bytes written to the destination
    pub bytes_written: usize,
    /// This chunk reaches the end of the source; no later index is valid
    pub is_last: bool,
}

impl ChunkOutput {
    /// Length as reported by sentinel-driven callers: the real byte count,
    /// or [`LAST_CHUNK_SIZE`] for the final chunk.
    pub fn reported_len(&self) -> usize {
        if self.is_last {
            LAST_CHUNK_SIZE
        } else {
            self.bytes_written
        }
    }
}

/// Compress chunk `index` of `src` into `dest`.
///
/// The chunk covers `src[index * CHUNK_SRC_SIZE..]` up to `CHUNK_SRC_SIZE`
/// bytes and is encoded without reference to any other chunk, so calls for
/// different indices may run concurrently and their outputs concatenated in
/// index order form a valid stream. A destination of
/// [`MAX_CHUNK_SIZE`](crate::MAX_CHUNK_SIZE) bytes always suffices.
pub fn encode_chunk(dest: &mut [u8], src: &[u8], index: usize) -> Result<ChunkOutput> {
    let src_len = src.len();
    let offset = index
        .checked_mul(CHUNK_SRC_SIZE)
        .filter(|&offset| offset < src_len)
        .ok_or(Error::ChunkIndexOutOfRange { index, src_len })?;
    let end = offset + (src_len - offset).min(CHUNK_SRC_SIZE);
    let chunk = &src[offset..end];

    // Token output is only kept if it beats the stored form
    let stored_size = stored_chunk_size(chunk.len());
    let limit = dest.len().min(stored_size - 1);

    let bytes_written = match encode_tokens(&mut dest[..limit], chunk) {
        Ok(written) => written,
        Err(Error::DestinationTooSmall { .. }) => {
            trace!("chunk {} does not compress, storing {} bytes", index, chunk.len());
            write_stored(dest, chunk)?
        }
        Err(e) => return Err(e),
    };

    Ok(ChunkOutput { bytes_written, is_last: end == src_len })
}

/// Greedy parse: longest back-reference found, else longest run, else literal.
/// Equal coverage prefers the back-reference. Back-references come from the
/// bounded [`MatchFinder`] search and are not guaranteed optimal.
fn encode_tokens(out: &mut [u8], chunk: &[u8]) -> Result<usize> {
    let mut writer = ByteWriter::new(out);
    let mut finder = MatchFinder::new(chunk);
    let mut pos = 0;
    let mut literal_start = 0;

    while pos < chunk.len() {
        let run = run_length(chunk, pos);
        let token = match finder.find(pos) {
            Some(m) if m.length >= run => {
                Some(Token::BackRef { distance: m.distance, length: m.length })
            }
            _ if run >= MIN_RUN => Some(Token::Run { value: chunk[pos], length: run }),
            _ => None,
        };

        match token {
            Some(token) => {
                if literal_start < pos {
                    Token::Literal(&chunk[literal_start..pos]).write(&mut writer)?;
                }
                token.write(&mut writer)?;

                let next = pos + token.uncompressed_size();
                finder.insert_range(pos, next);
                pos = next;
                literal_start = pos;
            }
            None => {
                finder.insert(pos);
                pos += 1;
            }
        }
    }

    if literal_start < chunk.len() {
        Token::Literal(&chunk[literal_start..]).write(&mut writer)?;
    }
    Token::ChunkEnd.write(&mut writer)?;

    Ok(writer.len())
}

/// Write `chunk` as a single literal followed by the end marker
fn write_stored(dest: &mut [u8], chunk: &[u8]) -> Result<usize> {
    let mut writer = ByteWriter::new(dest);
    Token::Literal(chunk).write(&mut writer)?;
    Token::ChunkEnd.write(&mut writer)?;
    Ok(writer.len())
}
