use super::rebase_range_error;
use crate::chunk::encode_chunk;
use crate::error::Result;
use crate::{CompressStats, Compressor};

/// Single-threaded compressor: encodes chunk 0, 1, 2, ... straight into
/// the destination until the last chunk.
#[derive(Clone, Debug, Default)]
pub struct SingleThreadedCompressor;

impl SingleThreadedCompressor {
    pub fn new() -> Self {
        Self
    }
}

impl Compressor for SingleThreadedCompressor {
    fn compress(&mut self, src: &[u8], dest: &mut [u8]) -> Result<CompressStats> {
        let mut stats = CompressStats { input_bytes: src.len() as u64, ..Default::default() };
        if src.is_empty() {
            return Ok(stats);
        }

        let mut written = 0;
        let mut index = 0;
        loop {
            let output = encode_chunk(&mut dest[written..], src, index)
                .map_err(|e| rebase_range_error(e, written, dest.len()))?;

            written += output.bytes_written;
            stats.chunks_written += 1;
            if output.is_last {
                break;
            }
            index += 1;
        }

        stats.output_bytes = written as u64;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compress_bound, decompress_to_vec, Error, CHUNK_SRC_SIZE};

    #[test]
    fn test_compress_empty() {
        let mut dest = [0u8; 0];
        let stats = SingleThreadedCompressor::new().compress(&[], &mut dest).unwrap();
        assert_eq!(stats.output_bytes, 0);
        assert_eq!(stats.chunks_written, 0);
    }

    #[test]
    fn test_compress_multiple_chunks() {
        let src: Vec<u8> = (0..CHUNK_SRC_SIZE * 2 + 10).map(|i| (i / 1000) as u8).collect();
        let mut dest = vec![0u8; compress_bound(src.len())];

        let stats = SingleThreadedCompressor::new().compress(&src, &mut dest).unwrap();
        assert_eq!(stats.chunks_written, 3);
        assert_eq!(stats.input_bytes, src.len() as u64);
        assert!(stats.output_bytes < src.len() as u64 / 10);

        dest.truncate(stats.output_bytes as usize);
        assert_eq!(decompress_to_vec(&dest).unwrap(), src);
    }

    #[test]
    fn test_destination_too_small_reports_total() {
        let src = vec![0u8; CHUNK_SRC_SIZE * 2];
        // Room for the first chunk only
        let mut dest = vec![0u8; 6];
        let err = SingleThreadedCompressor::new().compress(&src, &mut dest).unwrap_err();
        assert!(matches!(err, Error::DestinationTooSmall { capacity: 6, .. }));
    }
}
