use thiserror::Error;

/// Raw code for an environment failure (allocation, I/O, worker panic)
pub const ZBM_ERRNO: i32 = -1;
/// Raw code for compressed input that violates the format
pub const ZBM_INVAL: i32 = -2;
/// Raw code for a destination buffer of the wrong size
pub const ZBM_RANGE: i32 = -3;

/// Coarse classification of every [`Error`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// An underlying resource operation failed
    System,
    /// The compressed input (or a chunk request) is invalid
    Invalid,
    /// The destination capacity does not match the required output
    Range,
}

impl ErrorKind {
    /// Integer code used by the C-style `zbm_*` interfaces
    pub fn code(&self) -> i32 {
        match self {
            Self::System => ZBM_ERRNO,
            Self::Invalid => ZBM_INVAL,
            Self::Range => ZBM_RANGE,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Token stream errors
    #[error("Unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("Varint at offset {offset} does not fit in 64 bits")]
    VarintOverflow { offset: usize },

    #[error("Invalid token tag 0x{tag:02x} at offset {offset}")]
    InvalidTag { tag: u8, offset: usize },

    #[error("Token at offset {offset} covers zero bytes")]
    EmptyToken { offset: usize },

    #[error("Literal of {length} bytes at offset {offset} exceeds remaining input ({available} bytes)")]
    TruncatedLiteral { length: u64, available: usize, offset: usize },

    #[error("Back-reference distance {distance} exceeds available window {available}")]
    InvalidBackReference { distance: u64, available: usize },

    #[error("Chunk starting at offset {offset} has no end marker")]
    UnterminatedChunk { offset: usize },

    #[error("Decompressed length does not fit in usize")]
    OutputOverflow,

    // Chunk request errors
    #[error("Chunk index {index} is out of range for a {src_len}-byte source")]
    ChunkIndexOutOfRange { index: usize, src_len: usize },

    // Destination errors
    #[error("Destination too small: need {needed} bytes, have {capacity}")]
    DestinationTooSmall { needed: usize, capacity: usize },

    #[error("Size mismatch: expected {expected} bytes, got {found}")]
    SizeMismatch { expected: usize, found: usize },

    // Internal errors
    #[error("Failed to allocate {size} bytes")]
    AllocationFailed { size: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Classify this error as system, invalid-input or range failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::AllocationFailed { .. } | Error::Internal(_) => {
                ErrorKind::System
            }
            Error::UnexpectedEof { .. }
            | Error::VarintOverflow { .. }
            | Error::InvalidTag { .. }
            | Error::EmptyToken { .. }
            | Error::TruncatedLiteral { .. }
            | Error::InvalidBackReference { .. }
            | Error::UnterminatedChunk { .. }
            | Error::OutputOverflow
            | Error::ChunkIndexOutOfRange { .. } => ErrorKind::Invalid,
            Error::DestinationTooSmall { .. } | Error::SizeMismatch { .. } => ErrorKind::Range,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(ErrorKind::System.code(), -1);
        assert_eq!(ErrorKind::Invalid.code(), -2);
        assert_eq!(ErrorKind::Range.code(), -3);
    }

    #[test]
    fn test_error_kinds() {
        let io = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(io.kind(), ErrorKind::System);
        assert_eq!(Error::Internal("panic".into()).kind(), ErrorKind::System);
        assert_eq!(Error::AllocationFailed { size: 1 << 40 }.kind(), ErrorKind::System);

        assert_eq!(Error::InvalidTag { tag: 9, offset: 0 }.kind(), ErrorKind::Invalid);
        assert_eq!(
            Error::ChunkIndexOutOfRange { index: 3, src_len: 10 }.kind(),
            ErrorKind::Invalid
        );

        assert_eq!(Error::DestinationTooSmall { needed: 2, capacity: 1 }.kind(), ErrorKind::Range);
        assert_eq!(Error::SizeMismatch { expected: 2, found: 1 }.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_display() {
        let err = Error::InvalidBackReference { distance: 9, available: 4 };
        assert_eq!(err.to_string(), "Back-reference distance 9 exceeds available window 4");
    }
}
