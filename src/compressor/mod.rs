pub mod parallel;
pub mod single;

pub use parallel::ParallelCompressor;
pub use single::SingleThreadedCompressor;

use crate::chunk::chunk_count;
use crate::error::{Error, Result};
use crate::format::MAX_CHUNK_SIZE;
use crate::{CompressConfig, Compressor};

/// Destination size that always holds the compressed form of `src_len` bytes
pub fn compress_bound(src_len: usize) -> usize {
    chunk_count(src_len).saturating_mul(MAX_CHUNK_SIZE)
}

/// Compress `src` on the calling thread.
///
/// With `dest == None` returns [`compress_bound`] for `src`, the size to
/// allocate before the real call. Returns the compressed length.
pub fn compress(dest: Option<&mut [u8]>, src: &[u8]) -> Result<usize> {
    match dest {
        None => Ok(compress_bound(src.len())),
        Some(dest) => {
            let stats = SingleThreadedCompressor::new().compress(src, dest)?;
            Ok(stats.output_bytes as usize)
        }
    }
}

/// Compress `src` into a new buffer using the configured thread count
pub fn compress_to_vec(src: &[u8], config: &CompressConfig) -> Result<Vec<u8>> {
    let size = compress_bound(src.len());

    let mut out = Vec::new();
    out.try_reserve_exact(size).map_err(|_| Error::AllocationFailed { size })?;
    out.resize(size, 0);

    let stats = ParallelCompressor::new(config.clone()).compress(src, &mut out)?;
    out.truncate(stats.output_bytes as usize);
    Ok(out)
}

/// Re-express a chunk-level capacity error relative to the whole destination
pub(crate) fn rebase_range_error(err: Error, offset: usize, capacity: usize) -> Error {
    match err {
        Error::DestinationTooSmall { needed, .. } => {
            Error::DestinationTooSmall { needed: offset.saturating_add(needed), capacity }
        }
        other => other,
    }
}
