pub mod decoder;
pub mod encoder;
pub mod matcher;

pub use decoder::{decode_chunk, ProbeSink, SliceSink, Sink};
pub use encoder::{encode_chunk, ChunkOutput};
pub use matcher::{Match, MatchFinder};

use crate::format::CHUNK_SRC_SIZE;

/// Number of chunks a source of `src_len` bytes splits into
pub fn chunk_count(src_len: usize) -> usize {
    src_len / CHUNK_SRC_SIZE + usize::from(src_len % CHUNK_SRC_SIZE != 0)
}
