//! Reading and writing the framing of single blocks.
//!
//! Everything here works on plain `io::Read`/`io::Write` streams positioned at the start of the
//! relevant structure, so the same functions serve the reader, the writer and tests.

use crate::compression::{Compressor, Decompressor};
use crate::config::ChecksumMode;
use crate::errors::*;
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use repr::block::{
    Footer, Header, EOF_MARKER, FIXED_HEADER, FOOTER_SIZE, HEADER_SIZE, MAGIC,
    MAX_BLOCK_SIZE, MAX_DECOMPRESSED_SIZE, SIZE_SUBFIELD_ID, SIZE_SUBFIELD_LEN,
    STORED_HEADER_SIZE, SUBFIELD_HEADER_SIZE,
};
use static_assertions::const_assert_eq;
use std::io::{self, Read, Write};

const SIZE_SUBFIELD_SIZE: usize = SUBFIELD_HEADER_SIZE + SIZE_SUBFIELD_LEN as usize;

const_assert_eq!(EOF_MARKER.len(), HEADER_SIZE + SIZE_SUBFIELD_SIZE + 2 + FOOTER_SIZE);

/// Read the header of a block, leaving `stream` at the start of the payload.
///
/// Every subfield of the extra field is walked, unknown ones are skipped by their declared
/// length wherever they appear relative to the size subfield.
pub fn read_header<R: Read>(mut stream: R) -> Result<Header> {
    let mut fixed = [0; FIXED_HEADER.len()];
    stream.read_exact(&mut fixed).map_err(FormatError::from_io)?;
    let mut magic = [0; 4];
    magic.copy_from_slice(&fixed[..4]);
    if magic != MAGIC {
        return Err(FormatError::BadMagic { found: magic }.into());
    }
    // the rest of the fixed header (mtime, extra flags, os) is irrelevant

    let extra_length = stream.read_u16::<LE>().map_err(FormatError::from_io)?;
    let mut block_size = None;
    let mut offset = 0;
    while offset < usize::from(extra_length) {
        let remaining = usize::from(extra_length) - offset;
        let overrun = FormatError::ExtraFieldOverrun {
            offset,
            extra_length,
        };
        if remaining < SUBFIELD_HEADER_SIZE {
            return Err(overrun.into());
        }
        let mut id = [0; 2];
        stream.read_exact(&mut id).map_err(FormatError::from_io)?;
        let len = stream.read_u16::<LE>().map_err(FormatError::from_io)?;
        if usize::from(len) > remaining - SUBFIELD_HEADER_SIZE {
            return Err(overrun.into());
        }

        if id == SIZE_SUBFIELD_ID && block_size.is_none() {
            if len != SIZE_SUBFIELD_LEN {
                return Err(FormatError::MalformedSizeSubfield { len }.into());
            }
            let size_minus_one = stream.read_u16::<LE>().map_err(FormatError::from_io)?;
            block_size = Some(u32::from(size_minus_one) + 1);
        } else {
            skip(&mut stream, len.into())?;
        }
        offset += SUBFIELD_HEADER_SIZE + usize::from(len);
    }

    let block_size = block_size.ok_or(FormatError::MissingSizeSubfield)?;
    let header = Header {
        block_size,
        extra_length,
    };
    if header.data_size().is_none() {
        return Err(FormatError::BlockTooSmall {
            block_size,
            framing: header.size() + FOOTER_SIZE,
        }
        .into());
    }
    Ok(header)
}

pub fn read_footer<R: Read>(mut stream: R) -> Result<Footer> {
    let crc32 = stream.read_u32::<LE>().map_err(FormatError::from_io)?;
    let decompressed_size = stream.read_u32::<LE>().map_err(FormatError::from_io)?;
    if decompressed_size as usize > MAX_DECOMPRESSED_SIZE {
        return Err(FormatError::OversizedBlock {
            size: decompressed_size as usize,
        }
        .into());
    }
    Ok(Footer {
        crc32,
        decompressed_size,
    })
}

/// Write a block header for a payload of `payload_size` bytes.
///
/// `pre_size_subfield` and `post_size_subfield` are written verbatim into the extra field
/// before and after the size subfield. They must already be encoded as subfields.
///
/// Nothing is written if the resulting block would be too large.
pub fn write_header<W: Write>(
    mut stream: W,
    payload_size: usize,
    pre_size_subfield: &[u8],
    post_size_subfield: &[u8],
) -> Result<()> {
    let extra_size = pre_size_subfield.len() + SIZE_SUBFIELD_SIZE + post_size_subfield.len();
    let block_size = HEADER_SIZE + extra_size + payload_size + FOOTER_SIZE;
    if block_size > MAX_BLOCK_SIZE {
        return Err(FormatError::OversizedBlock { size: block_size }.into());
    }

    stream.write_all(&FIXED_HEADER)?;
    stream.write_u16::<LE>(extra_size as u16)?;
    stream.write_all(pre_size_subfield)?;
    stream.write_all(&SIZE_SUBFIELD_ID)?;
    stream.write_u16::<LE>(SIZE_SUBFIELD_LEN)?;
    stream.write_u16::<LE>((block_size - 1) as u16)?;
    stream.write_all(post_size_subfield)?;
    Ok(())
}

pub fn write_footer<W: Write>(mut stream: W, data: &[u8]) -> Result<()> {
    stream.write_u32::<LE>(checksum(data))?;
    stream.write_u32::<LE>(data.len() as u32)?;
    Ok(())
}

/// Write `data` as a block holding a single stored deflate block
pub fn write_uncompressed_block<W: Write>(
    mut stream: W,
    data: &[u8],
    pre_size_subfield: &[u8],
    post_size_subfield: &[u8],
) -> Result<()> {
    let len = u16::try_from(data.len())
        .map_err(|_| FormatError::OversizedBlock { size: data.len() })?;
    write_header(
        &mut stream,
        data.len() + STORED_HEADER_SIZE,
        pre_size_subfield,
        post_size_subfield,
    )?;
    // BFINAL set, BTYPE 00 (stored)
    stream.write_u8(1)?;
    stream.write_u16::<LE>(len)?;
    stream.write_u16::<LE>(!len)?;
    stream.write_all(data)?;
    write_footer(&mut stream, data)
}

/// Write `data` as a block compressed with `compressor`.
///
/// The compressor must produce a raw deflate stream.
pub fn write_compressed_block<W: Write, C: Compressor>(
    mut stream: W,
    data: &[u8],
    pre_size_subfield: &[u8],
    post_size_subfield: &[u8],
    mut compressor: C,
) -> Result<()> {
    if data.len() > MAX_DECOMPRESSED_SIZE {
        return Err(FormatError::OversizedBlock { size: data.len() }.into());
    }
    let mut compressed = vec![0; data.len() * 2 + 256];
    let compressed_size = compressor.compress(data, &mut compressed)?;
    write_header(
        &mut stream,
        compressed_size,
        pre_size_subfield,
        post_size_subfield,
    )?;
    stream.write_all(&compressed[..compressed_size])?;
    write_footer(&mut stream, data)
}

/// Decode the payload of a block into `dst`, replacing its contents.
///
/// A payload which is a single stored deflate block holding exactly the decompressed size is
/// copied out directly, anything else goes through `decompressor`.
pub fn decode_payload<D: Decompressor>(
    payload: &[u8],
    footer: Footer,
    mut decompressor: D,
    checksum_mode: ChecksumMode,
    dst: &mut Vec<u8>,
) -> Result<()> {
    let size = footer.decompressed_size as usize;
    dst.clear();
    match stored_data(payload, size) {
        Some(data) => dst.extend_from_slice(data),
        None => {
            // one spare byte, so the inflater can see the end of the stream with room left
            dst.resize(size + 1, 0);
            let actual = decompressor.decompress(payload, dst)?;
            dst.truncate(actual);
            if actual != size {
                return Err(FormatError::DecompressedSizeMismatch {
                    expected: footer.decompressed_size,
                    actual,
                }
                .into());
            }
        }
    }

    if checksum_mode == ChecksumMode::Verify {
        let actual = checksum(dst);
        if actual != footer.crc32 {
            return Err(FormatError::ChecksumMismatch {
                expected: footer.crc32,
                actual,
            }
            .into());
        }
    }
    Ok(())
}

pub fn checksum(data: &[u8]) -> u32 {
    let mut crc = flate2::Crc::new();
    crc.update(data);
    crc.sum()
}

fn stored_data(payload: &[u8], size: usize) -> Option<&[u8]> {
    if payload.len() != size + STORED_HEADER_SIZE || payload[0] != 1 {
        return None;
    }
    let len = u16::from_le_bytes([payload[1], payload[2]]);
    let nlen = u16::from_le_bytes([payload[3], payload[4]]);
    if usize::from(len) != size || nlen != !len {
        return None;
    }
    Some(&payload[STORED_HEADER_SIZE..])
}

fn skip<R: Read>(stream: R, len: u64) -> Result<()> {
    let skipped = io::copy(&mut stream.take(len), &mut io::sink())?;
    if skipped != len {
        return Err(FormatError::Truncated.into());
    }
    Ok(())
}
