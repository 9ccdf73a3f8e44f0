//! A BGZF (blocked gzip) file is a series of gzip members packed back to back, each of which is
//! a self-delimiting [block](block/index.html):
//!
//! * A 12 byte fixed header, ending in the length of the extra field
//! * The extra field, a list of subfields, one of which records the size of the whole block
//! * The payload, a raw deflate stream (possibly a single stored deflate block)
//! * An 8 byte footer with the CRC-32 and the decompressed size of the payload
//!
//! Because every block records its own size, a reader can hop from block to block without
//! decompressing anything, and a position in the decompressed stream can be named by a
//! [`VirtualOffset`]: the file offset of a block, plus an offset into its decompressed data.
//!
//! A block with a decompressed size of zero marks the end of the stream.

pub mod block;
pub mod virtual_offset;

pub use virtual_offset::VirtualOffset;
