pub mod chunk;
pub mod compressor;
pub mod decompressor;
pub mod error;
pub mod format;
pub mod varint;

pub use chunk::{chunk_count, encode_chunk, ChunkOutput};
pub use compressor::{
    compress, compress_bound, compress_to_vec, parallel::ParallelCompressor,
    single::SingleThreadedCompressor,
};
pub use decompressor::{decompress, decompress_to_vec, probe, StreamInfo};
pub use error::{Error, ErrorKind, Result};
pub use format::{CHUNK_SRC_SIZE, LAST_CHUNK_SIZE, MAX_CHUNK_SIZE};

/// Configuration for whole-buffer compression
#[derive(Clone, Debug, Default)]
pub struct CompressConfig {
    /// Number of worker threads (0 = auto, 1 = single-threaded)
    pub num_threads: usize,
    /// Chunks dispatched ahead of the next one to be written (0 = 4 per thread)
    pub max_in_flight: usize,
}

/// Statistics from a compression operation
#[derive(Clone, Debug, Default)]
pub struct CompressStats {
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub chunks_written: u64,
    /// Speculatively encoded chunks that were never written
    pub chunks_discarded: u64,
}

/// Trait for the complete compression operation
pub trait Compressor {
    /// Compress all of `src` into the front of `dest`.
    ///
    /// `dest` should be at least [`compress_bound`] bytes long; a shorter
    /// destination may fail with a range error.
    fn compress(&mut self, src: &[u8], dest: &mut [u8]) -> Result<CompressStats>;
}
