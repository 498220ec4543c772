//! Whole-stream decompression.
//!
//! A compressed stream is a back-to-back sequence of chunk bitstreams with
//! no header. Decoding repeats the chunk decoder until the input is used up.

use log::debug;

use crate::chunk::{decode_chunk, ProbeSink, SliceSink, Sink};
use crate::error::{Error, Result};
use crate::varint::ByteReader;

/// Shape of a compressed stream, as discovered by [`probe`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamInfo {
    /// Compressed size in bytes
    pub input_bytes: usize,
    /// Decompressed size in bytes
    pub output_bytes: usize,
    /// Number of chunk bitstreams in the stream
    pub chunks: u64,
}

fn decode_stream<S: Sink>(src: &[u8], sink: &mut S) -> Result<StreamInfo> {
    let mut reader = ByteReader::new(src);
    let mut chunks: u64 = 0;

    while !reader.is_empty() {
        decode_chunk(&mut reader, sink)?;
        chunks += 1;
    }

    Ok(StreamInfo { input_bytes: src.len(), output_bytes: sink.len(), chunks })
}

/// Parse the whole stream without producing output
pub fn probe(src: &[u8]) -> Result<StreamInfo> {
    decode_stream(src, &mut ProbeSink::new())
}

/// Decompress `src`.
///
/// With `dest == None` the stream is only parsed and the decompressed length
/// returned. With a destination, its length must equal that probed length:
/// running out of room and finishing short both fail with a range error.
/// The capacity check fires as soon as output overruns `dest`, before any
/// later tokens are parsed, so a range error does not mean the rest of the
/// stream is well-formed. On error, `dest` may hold partial output and
/// should be discarded.
pub fn decompress(dest: Option<&mut [u8]>, src: &[u8]) -> Result<usize> {
    match dest {
        None => probe(src).map(|info| info.output_bytes),
        Some(dest) => {
            let expected = dest.len();
            let info = decode_stream(src, &mut SliceSink::new(dest))?;
            if info.output_bytes != expected {
                return Err(Error::SizeMismatch { expected, found: info.output_bytes });
            }
            debug!(
                "decompressed {} chunks: {} -> {} bytes",
                info.chunks, info.input_bytes, info.output_bytes
            );
            Ok(info.output_bytes)
        }
    }
}

/// Probe, allocate exactly, then decompress
pub fn decompress_to_vec(src: &[u8]) -> Result<Vec<u8>> {
    let size = probe(src)?.output_bytes;

    let mut out = Vec::new();
    out.try_reserve_exact(size).map_err(|_| Error::AllocationFailed { size })?;
    out.resize(size, 0);

    decompress(Some(out.as_mut_slice()), src)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{TAG_BACK_REF, TAG_CHUNK_END, TAG_LITERAL, TAG_RUN};
    use crate::ErrorKind;

    const TWO_CHUNKS: [u8; 10] =
        [TAG_RUN, 0x00, 4, TAG_CHUNK_END, TAG_LITERAL, 2, b'o', b'k', TAG_CHUNK_END, TAG_CHUNK_END];

    #[test]
    fn test_empty_input() {
        assert_eq!(decompress(None, &[]).unwrap(), 0);
        let mut empty = [0u8; 0];
        assert_eq!(decompress(Some(&mut empty[..]), &[]).unwrap(), 0);
        assert_eq!(probe(&[]).unwrap().chunks, 0);
    }

    #[test]
    fn test_probe_counts_chunks() {
        let info = probe(&TWO_CHUNKS).unwrap();
        // Trailing bare end marker is an empty third chunk
        assert_eq!(info, StreamInfo { input_bytes: 10, output_bytes: 6, chunks: 3 });
    }

    #[test]
    fn test_probe_decode_parity() {
        let len = decompress(None, &TWO_CHUNKS).unwrap();
        let mut out = vec![0u8; len];
        assert_eq!(decompress(Some(&mut out[..]), &TWO_CHUNKS).unwrap(), len);
        assert_eq!(out, [0, 0, 0, 0, b'o', b'k']);
    }

    #[test]
    fn test_destination_one_short() {
        let mut out = vec![0u8; 5];
        let err = decompress(Some(&mut out[..]), &TWO_CHUNKS).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_capacity_checked_before_later_tokens() {
        // Run of 100, then a literal cut short
        let data = [TAG_RUN, 0x00, 100, TAG_LITERAL, 5, b'a'];
        assert_eq!(decompress(None, &data).unwrap_err().kind(), ErrorKind::Invalid);

        let mut out = vec![0u8; 10];
        let err = decompress(Some(&mut out[..]), &data).unwrap_err();
        assert!(matches!(err, Error::DestinationTooSmall { needed: 100, capacity: 10 }));
    }

    #[test]
    fn test_destination_too_large() {
        let mut out = vec![0u8; 7];
        let err = decompress(Some(&mut out[..]), &TWO_CHUNKS).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 7, found: 6 }));
    }

    #[test]
    fn test_cross_chunk_reference_rejected() {
        let data = [TAG_LITERAL, 4, 1, 2, 3, 4, TAG_CHUNK_END, TAG_BACK_REF, 4, 4, TAG_CHUNK_END];
        let err = decompress(None, &data).unwrap_err();
        assert!(matches!(err, Error::InvalidBackReference { distance: 4, available: 0 }));
    }

    #[test]
    fn test_truncated_stream() {
        let err = decompress(None, &TWO_CHUNKS[..7]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_decompress_to_vec() {
        assert_eq!(decompress_to_vec(&TWO_CHUNKS).unwrap(), vec![0, 0, 0, 0, b'o', b'k']);
        assert!(decompress_to_vec(&[0x42]).is_err());
    }
}
