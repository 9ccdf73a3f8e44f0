/// What to do with the CRC-32 recorded in each block footer when reading
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChecksumMode {
    /// Compute the checksum of every decoded block, and fail on a mismatch
    Verify,
    /// Trust the data. Skipped blocks are never checked in either mode
    Ignore,
}

impl Default for ChecksumMode {
    fn default() -> Self {
        ChecksumMode::Verify
    }
}

/// Deflate level used when writing compressed blocks
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CompressionLevel(pub u32);

impl CompressionLevel {
    pub const FAST: CompressionLevel = CompressionLevel(1);
    pub const BEST: CompressionLevel = CompressionLevel(9);

    pub(crate) fn to_flate2(self) -> flate2::Compression {
        flate2::Compression::new(self.0.min(9))
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        CompressionLevel(6)
    }
}
