//! Match finding inside a single chunk.
//!
//! The finder only ever sees the chunk's own bytes, so every match it
//! reports points inside the chunk-local window.

use crate::format::{MAX_CHAIN, MIN_MATCH};

const HASH_BITS: u32 = 13;
const HASH_SIZE: usize = 1 << HASH_BITS;
const NO_POS: u32 = u32::MAX;

/// A back-reference candidate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub distance: usize,
    pub length: usize,
}

/// Hash-chain match finder over one chunk
///
/// `head` maps a hash of `MIN_MATCH` bytes to the most recent position with
/// that hash; `prev` links each position to the previous one with the same
/// hash, so chains are walked nearest-first.
pub struct MatchFinder<'a> {
    data: &'a [u8],
    head: Vec<u32>,
    prev: Vec<u32>,
}

impl<'a> MatchFinder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        debug_assert!(data.len() < NO_POS as usize);
        Self { data, head: vec![NO_POS; HASH_SIZE], prev: vec![NO_POS; data.len()] }
    }

    #[inline]
    fn hash(&self, pos: usize) -> Option<usize> {
        let bytes = self.data.get(pos..pos + MIN_MATCH)?;
        let word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        Some((word.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize)
    }

    /// Make `pos` available as a match source for later positions
    #[inline]
    pub fn insert(&mut self, pos: usize) {
        if let Some(h) = self.hash(pos) {
            self.prev[pos] = self.head[h];
            self.head[h] = pos as u32;
        }
    }

    /// Insert every position in `start..end`
    pub fn insert_range(&mut self, start: usize, end: usize) {
        for pos in start..end {
            self.insert(pos);
        }
    }

    /// Longest match for the bytes at `pos` among the candidates examined.
    ///
    /// Bounded effort: only the nearest `MAX_CHAIN` positions sharing the
    /// hash bucket are compared, so a longer match further back can be
    /// missed. Matches may overlap `pos` (length greater than distance). On
    /// equal length the nearest source wins.
    pub fn find(&self, pos: usize) -> Option<Match> {
        let h = self.hash(pos)?;
        let remaining = self.data.len() - pos;
        let mut candidate = self.head[h];
        let mut best: Option<Match> = None;

        for _ in 0..MAX_CHAIN {
            if candidate == NO_POS {
                break;
            }
            let source = candidate as usize;
            let length = common_prefix(&self.data[source..], &self.data[pos..]);

            if length >= MIN_MATCH && best.map_or(true, |b| length > b.length) {
                best = Some(Match { distance: pos - source, length });
                if length == remaining {
                    break;
                }
            }
            candidate = self.prev[source];
        }

        best
    }
}

/// Number of bytes equal to `data[pos]` starting at `pos`
#[inline]
pub fn run_length(data: &[u8], pos: usize) -> usize {
    let value = data[pos];
    data[pos..].iter().take_while(|&&b| b == value).count()
}

#[inline]
fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
