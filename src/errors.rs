use std::io;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed block: {0}")]
    Format(#[from] FormatError),
    #[error("Codec failure: {0}")]
    Codec(#[from] CodecError),
    #[error("Invalid source configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Reader is unusable after a previous error")]
    ReaderFailed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Magic mismatch: expected {:02x?}, got {found:02x?}", repr::block::MAGIC)]
    BadMagic { found: [u8; 4] },
    #[error("Missing block size extra subfield")]
    MissingSizeSubfield,
    #[error("Block size extra subfield has length {len}, expected 2")]
    MalformedSizeSubfield { len: u16 },
    #[error("Extra subfield at {offset} overruns the extra field of length {extra_length}")]
    ExtraFieldOverrun { offset: usize, extra_length: u16 },
    #[error("Block of size {block_size} cannot hold its {framing} bytes of framing")]
    BlockTooSmall { block_size: u32, framing: usize },
    #[error("Block of {size} bytes exceeds the maximum of {}", repr::block::MAX_BLOCK_SIZE)]
    OversizedBlock { size: usize },
    #[error("Block decompressed to {actual} bytes, footer records {expected}")]
    DecompressedSizeMismatch { expected: u32, actual: usize },
    #[error("Checksum mismatch: footer records {expected:#010x}, data has {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("Block truncated")]
    Truncated,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("deflate failed: {0}")]
    Compress(#[from] flate2::CompressError),
    #[error("inflate failed: {0}")]
    Decompress(#[from] flate2::DecompressError),
    #[error("output buffer of {capacity} bytes is too small")]
    OutputTooSmall { capacity: usize },
    #[error("deflate stream ended before its final block")]
    Incomplete,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Begin offset {begin} is after end offset {end}")]
    InvertedWindow {
        begin: repr::VirtualOffset,
        end: repr::VirtualOffset,
    },
    #[error("Compressed offset {offset} does not fit in 48 bits")]
    CompressedOffsetOverflow { offset: u64 },
    #[error("Local offset {offset} does not fit in 16 bits")]
    LocalOffsetOverflow { offset: u64 },
    #[error("Offset {offset} is beyond the end of the file ({file_len} bytes)")]
    OffsetOutOfBounds { offset: u64, file_len: u64 },
    #[error("Local offset {local_offset} is beyond the {block_len} bytes of the block at {block_offset}")]
    LocalOffsetOutOfBlock {
        block_offset: u64,
        local_offset: u16,
        block_len: usize,
    },
    #[error("End offset {end} does not start a block: the block at {block_offset} extends to {next_offset}")]
    EndNotOnBlock {
        end: repr::VirtualOffset,
        block_offset: u64,
        next_offset: u64,
    },
}

impl FormatError {
    /// Map an unexpected end of input while reading framing to `Truncated`
    pub(crate) fn from_io(e: io::Error) -> Error {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            FormatError::Truncated.into()
        } else {
            e.into()
        }
    }
}
