//! Block framing.
//!
//! ```text
//! offset  size  field
//! 0       4     magic: 1F 8B 08 04 (gzip, deflate, FEXTRA set)
//! 4       4     mtime (ignored)
//! 8       1     extra flags (ignored)
//! 9       1     OS (ignored)
//! 10      2     XLEN: length of the extra field
//! 12      XLEN  subfields: id[2], len: u16, data[len]
//! ...           payload: raw deflate
//! -8      4     CRC-32 of the decompressed payload
//! -4      4     decompressed size
//! ```
//!
//! Exactly one subfield is required, the size subfield (`BC`), whose two byte payload is the
//! total size of the block minus one. All integers are little endian.

use bitflags::bitflags;

/// The first four bytes of every block: gzip magic, deflate method, `FEXTRA` set
pub const MAGIC: [u8; 4] = [0x1f, 0x8b, 0x08, Flags::EXTRA.bits];

/// The fixed header written by this crate: no mtime, no extra flags, unknown OS
pub const FIXED_HEADER: [u8; 10] = [
    MAGIC[0], MAGIC[1], MAGIC[2], MAGIC[3], 0, 0, 0, 0, 0, 0xff,
];

/// Size of the fixed part of the header, including `XLEN`
pub const HEADER_SIZE: usize = FIXED_HEADER.len() + 2;

/// Size of a subfield header: 2 id bytes and a u16 length
pub const SUBFIELD_HEADER_SIZE: usize = 4;

pub const FOOTER_SIZE: usize = 8;

/// The identifier of the block size subfield
pub const SIZE_SUBFIELD_ID: [u8; 2] = [b'B', b'C'];

/// The length of the payload of the block size subfield
pub const SIZE_SUBFIELD_LEN: u16 = 2;

/// The total size of a block must be representable as `size - 1` in a u16
pub const MAX_BLOCK_SIZE: usize = u16::MAX as usize + 1;

/// The most decompressed data a single block may carry
pub const MAX_DECOMPRESSED_SIZE: usize = MAX_BLOCK_SIZE;

/// The most data put in a block by writers which must also be able to store it uncompressed:
/// leaves room for the header, the size subfield, the stored block header and the footer
pub const MAX_BLOCK_DATA: usize = 0xff00;

/// Deflate stored block overhead: BFINAL/BTYPE byte, LEN, NLEN
pub const STORED_HEADER_SIZE: usize = 5;

/// The empty block conventionally terminating a BGZF file
pub const EOF_MARKER: [u8; 28] = [
    0x1f, 0x8b, 0x08, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0x06, 0x00, 0x42, 0x43, 0x02, 0x00,
    0x1b, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

bitflags! {
    /// The gzip `FLG` byte
    pub struct Flags: u8 {
        const TEXT = 1;
        const HEADER_CRC = 1 << 1;
        const EXTRA = 1 << 2;
        const NAME = 1 << 3;
        const COMMENT = 1 << 4;
    }
}

/// The decoded variable part of a block header
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Header {
    /// Total size of the block on disk, header and footer included
    pub block_size: u32,
    /// Length of the extra field
    pub extra_length: u16,
}

impl Header {
    /// Size of the header on disk, extra field included
    pub fn size(self) -> usize {
        HEADER_SIZE + usize::from(self.extra_length)
    }

    /// Size of the payload, or `None` if the block is too small to hold its own framing
    pub fn data_size(self) -> Option<usize> {
        (self.block_size as usize).checked_sub(self.size() + FOOTER_SIZE)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Footer {
    pub crc32: u32,
    pub decompressed_size: u32,
}

impl Footer {
    /// A block without data terminates the stream
    pub fn is_terminator(self) -> bool {
        self.decompressed_size == 0
    }
}
