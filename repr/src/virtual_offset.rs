use std::fmt;

/// A position in the decompressed stream of a BGZF file.
///
/// The upper 48 bits are the offset of a block in the file, the lower 16 bits an offset into
/// the decompressed data of that block. As long as the local offset never exceeds the size of
/// its block, ordering virtual offsets as integers orders the positions they name.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VirtualOffset(pub u64);

impl VirtualOffset {
    pub const MAX_COMPRESSED_OFFSET: u64 = (1 << 48) - 1;

    /// Pack a block offset and a local offset, if the block offset fits in 48 bits
    pub fn from_parts(compressed_offset: u64, local_offset: u16) -> Option<Self> {
        if compressed_offset > Self::MAX_COMPRESSED_OFFSET {
            return None;
        }
        Some(Self(compressed_offset << 16 | u64::from(local_offset)))
    }

    /// Offset of the block in the compressed file
    #[inline]
    pub fn compressed_offset(self) -> u64 {
        self.0 >> 16
    }

    /// Offset into the decompressed data of the block
    #[inline]
    pub fn local_offset(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    #[inline]
    pub fn into_parts(self) -> (u64, u16) {
        (self.compressed_offset(), self.local_offset())
    }
}

impl From<u64> for VirtualOffset {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<VirtualOffset> for u64 {
    fn from(offset: VirtualOffset) -> Self {
        offset.0
    }
}

impl fmt::Debug for VirtualOffset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("VirtualOffset")
            .field("compressed_offset", &self.compressed_offset())
            .field("local_offset", &self.local_offset())
            .finish()
    }
}

impl fmt::Display for VirtualOffset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.compressed_offset(), self.local_offset())
    }
}
