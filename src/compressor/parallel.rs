//! Parallel compressor built on index-addressed chunk encoding.
//!
//! Architecture:
//! - Main thread: dispatch chunk indices, receive encoded chunks, append them in index order
//! - Worker pool: encode chunks into private buffers
//!
//! The main thread does not precompute the chunk count. It keeps up to
//! `max_in_flight` indices outstanding. Once any result marks the end of the
//! source (a last chunk or an out-of-range index), no index past it is
//! issued. Indices already issued past the end are discarded along with any
//! other result for an index beyond the last chunk.

use std::collections::BTreeMap;

use crossbeam::channel::{unbounded, Receiver, Sender};
use log::debug;

use super::rebase_range_error;
use crate::chunk::encode_chunk;
use crate::error::{Error, Result};
use crate::format::MAX_CHUNK_SIZE;
use crate::{CompressConfig, CompressStats, Compressor};

/// Upper bound on dispatched-but-unwritten chunks per worker
const MAX_IN_FLIGHT_PER_THREAD: usize = 64;

/// Output of one worker for one chunk index
struct EncodedChunk {
    /// Chunk index, used for ordering output
    index: usize,
    /// Compressed bytes and last-chunk flag, or the encoder's error
    result: Result<CompressedChunk>,
}

struct CompressedChunk {
    data: Vec<u8>,
    is_last: bool,
}

/// Parallel compressor implementation
pub struct ParallelCompressor {
    config: CompressConfig,
}

impl ParallelCompressor {
    pub fn new(config: CompressConfig) -> Self {
        Self { config }
    }

    fn effective_threads(&self) -> usize {
        match self.config.num_threads {
            0 => num_cpus::get().clamp(1, 32),
            n => n.clamp(1, 32),
        }
    }

    fn effective_in_flight(&self, num_threads: usize) -> usize {
        match self.config.max_in_flight {
            0 => num_threads * 4,
            n => n.clamp(1, num_threads * MAX_IN_FLIGHT_PER_THREAD),
        }
    }
}

impl Compressor for ParallelCompressor {
    fn compress(&mut self, src: &[u8], dest: &mut [u8]) -> Result<CompressStats> {
        let num_threads = self.effective_threads();

        // For single thread, delegate to single-threaded implementation
        if num_threads == 1 || src.is_empty() {
            return super::single::SingleThreadedCompressor::new().compress(src, dest);
        }

        self.compress_parallel(src, dest, num_threads)
    }
}

impl ParallelCompressor {
    fn compress_parallel(
        &self,
        src: &[u8],
        dest: &mut [u8],
        num_threads: usize,
    ) -> Result<CompressStats> {
        let max_in_flight = self.effective_in_flight(num_threads);
        debug!(
            "compressing {} bytes on {} threads, up to {} chunks in flight",
            src.len(),
            num_threads,
            max_in_flight
        );

        // In-flight work is capped by max_in_flight, so the channels stay small
        let (job_tx, job_rx): (Sender<usize>, Receiver<usize>) = unbounded();
        let (result_tx, result_rx): (Sender<EncodedChunk>, Receiver<EncodedChunk>) = unbounded();

        // Use crossbeam's scoped threads so workers can borrow the source
        let result = crossbeam::scope(|scope| {
            for _ in 0..num_threads {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();

                scope.spawn(move |_| {
                    worker_thread(src, job_rx, result_tx);
                });
            }

            // Drop our copies of the channels that workers use
            drop(job_rx);
            drop(result_tx);

            Self::dispatch_and_write(src, dest, job_tx, result_rx, max_in_flight)
        });

        result.map_err(|_| Error::Internal("Thread panicked".to_string()))?
    }

    fn dispatch_and_write(
        src: &[u8],
        dest: &mut [u8],
        job_tx: Sender<usize>,
        result_rx: Receiver<EncodedChunk>,
        max_in_flight: usize,
    ) -> Result<CompressStats> {
        let mut stats = CompressStats { input_bytes: src.len() as u64, ..Default::default() };

        // Buffer for out-of-order chunks
        let mut pending: BTreeMap<usize, EncodedChunk> = BTreeMap::new();
        let mut next_dispatch: usize = 0;
        let mut next_write: usize = 0;
        let mut outstanding: usize = 0;
        // Lowest index known to lie past the end of the source
        let mut dispatch_limit = usize::MAX;
        let mut written: usize = 0;
        let mut finished = false;
        let mut failure: Option<Error> = None;

        while !finished && failure.is_none() {
            while next_dispatch - next_write < max_in_flight && next_dispatch < dispatch_limit {
                job_tx
                    .send(next_dispatch)
                    .map_err(|_| Error::Internal("Workers disconnected".to_string()))?;
                next_dispatch += 1;
                outstanding += 1;
            }

            let chunk = result_rx
                .recv()
                .map_err(|_| Error::Internal("Result channel disconnected".to_string()))?;
            outstanding -= 1;
            match &chunk.result {
                Ok(compressed) if compressed.is_last => {
                    dispatch_limit = dispatch_limit.min(chunk.index + 1);
                }
                Err(Error::ChunkIndexOutOfRange { .. }) => {
                    dispatch_limit = dispatch_limit.min(chunk.index);
                }
                _ => {}
            }
            pending.insert(chunk.index, chunk);

            // Write any consecutive buffered chunks
            while let Some(chunk) = pending.remove(&next_write) {
                match chunk.result {
                    Ok(compressed) => {
                        let end = written + compressed.data.len();
                        if end > dest.len() {
                            failure = Some(Error::DestinationTooSmall {
                                needed: end,
                                capacity: dest.len(),
                            });
                            break;
                        }
                        dest[written..end].copy_from_slice(&compressed.data);
                        written = end;
                        stats.chunks_written += 1;
                        next_write += 1;

                        if compressed.is_last {
                            finished = true;
                            break;
                        }
                    }
                    Err(e) => {
                        failure = Some(rebase_range_error(e, written, dest.len()));
                        break;
                    }
                }
            }
        }

        // Drop job_tx so workers exit once the queue drains
        drop(job_tx);

        // Every dispatched index must resolve before the output is final
        while outstanding > 0 {
            match result_rx.recv() {
                Ok(_) => {
                    outstanding -= 1;
                    stats.chunks_discarded += 1;
                }
                Err(_) => break,
            }
        }
        stats.chunks_discarded += pending.len() as u64;

        if let Some(e) = failure {
            return Err(e);
        }

        debug!(
            "wrote {} chunks ({} bytes), discarded {} speculative chunks",
            stats.chunks_written, written, stats.chunks_discarded
        );
        stats.output_bytes = written as u64;
        Ok(stats)
    }
}

/// Worker thread function: encodes chunks by index
fn worker_thread(src: &[u8], job_rx: Receiver<usize>, result_tx: Sender<EncodedChunk>) {
    let mut buf = vec![0u8; MAX_CHUNK_SIZE];

    while let Ok(index) = job_rx.recv() {
        let result = encode_chunk(&mut buf, src, index).map(|output| CompressedChunk {
            data: buf[..output.bytes_written].to_vec(),
            is_last: output.is_last,
        });

        if result_tx.send(EncodedChunk { index, result }).is_err() {
            // Main thread has stopped, exit
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compress_bound, SingleThreadedCompressor, CHUNK_SRC_SIZE};

    fn bitmap(size: usize) -> Vec<u8> {
        (0..size).map(|i| if (i / 37) % 11 == 0 { 0xF0 } else { 0x00 }).collect()
    }

    fn compress_with(config: CompressConfig, src: &[u8]) -> (Vec<u8>, CompressStats) {
        let mut dest = vec![0u8; compress_bound(src.len())];
        let stats = ParallelCompressor::new(config).compress(src, &mut dest).unwrap();
        dest.truncate(stats.output_bytes as usize);
        (dest, stats)
    }

    #[test]
    fn test_parallel_matches_single_threaded() {
        let src = bitmap(CHUNK_SRC_SIZE * 5 + 123);

        let mut expected = vec![0u8; compress_bound(src.len())];
        let single = SingleThreadedCompressor::new().compress(&src, &mut expected).unwrap();
        expected.truncate(single.output_bytes as usize);

        let (actual, stats) = compress_with(CompressConfig { num_threads: 4, ..Default::default() }, &src);
        assert_eq!(actual, expected);
        assert_eq!(stats.chunks_written, 6);
    }

    #[test]
    fn test_speculative_chunks_are_discarded() {
        // One chunk of input, but 8 indices dispatched up front
        let src = bitmap(1000);
        let config = CompressConfig { num_threads: 2, max_in_flight: 8 };
        let (_, stats) = compress_with(config, &src);
        assert_eq!(stats.chunks_written, 1);
        assert_eq!(stats.chunks_discarded, 7);
    }

    #[test]
    fn test_narrow_window() {
        let src = bitmap(CHUNK_SRC_SIZE * 3);
        let config = CompressConfig { num_threads: 3, max_in_flight: 1 };
        let (_, stats) = compress_with(config, &src);
        assert_eq!(stats.chunks_written, 3);
        assert_eq!(stats.chunks_discarded, 0);
    }

    #[test]
    fn test_destination_too_small() {
        let src = bitmap(CHUNK_SRC_SIZE * 2);
        let mut dest = vec![0u8; 4];
        let config = CompressConfig { num_threads: 2, ..Default::default() };
        let err = ParallelCompressor::new(config).compress(&src, &mut dest).unwrap_err();
        assert!(matches!(err, Error::DestinationTooSmall { capacity: 4, .. }));
    }

    #[test]
    fn test_effective_threads() {
        let config = CompressConfig { num_threads: 0, ..Default::default() };
        let compressor = ParallelCompressor::new(config);
        let threads = compressor.effective_threads();
        assert!(threads >= 1);
        assert!(threads <= 32);

        let config2 = CompressConfig { num_threads: 100, ..Default::default() };
        let compressor2 = ParallelCompressor::new(config2);
        assert_eq!(compressor2.effective_threads(), 32); // Capped at 32
        assert_eq!(compressor2.effective_in_flight(32), 128);
    }

    #[test]
    fn test_in_flight_is_capped() {
        let config = CompressConfig { num_threads: 2, max_in_flight: usize::MAX };
        let compressor = ParallelCompressor::new(config);
        assert_eq!(compressor.effective_in_flight(2), 2 * MAX_IN_FLIGHT_PER_THREAD);
    }

    #[test]
    fn test_huge_window_small_input() {
        let src = vec![0u8; 1000];
        let config = CompressConfig { num_threads: 2, max_in_flight: usize::MAX };
        let (compressed, stats) = compress_with(config, &src);
        assert_eq!(compressed, [0x02, 0x00, 0xE8, 0x07, 0x00]);
        assert_eq!(stats.chunks_written, 1);
        assert!(stats.chunks_discarded < (2 * MAX_IN_FLIGHT_PER_THREAD) as u64);
    }

    #[test]
    fn test_dispatch_stops_at_end_of_source() {
        // Window wider than the chunk count: later rounds must not dispatch past the end
        let src = bitmap(CHUNK_SRC_SIZE * 3);
        let config = CompressConfig { num_threads: 2, max_in_flight: 100 };
        let (_, stats) = compress_with(config, &src);
        assert_eq!(stats.chunks_written, 3);
        assert!(stats.chunks_discarded <= 97);
    }
}
