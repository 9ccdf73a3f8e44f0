//! Sources of byte chunks.
//!
//! A [`DataChunkSource`] is bound to one backing store and hands out independent [`Reader`]s.
//! Each reader is a cursor over the logical byte stream of the store: for plain buffers and
//! files that is their contents, for BGZF files it is the decompressed data, optionally
//! limited to a window between two virtual offsets.
//!
//! Consumers call [`DataChunkReader::get_next_chunk`] until it returns an empty chunk, possibly
//! after a [`DataChunkReader::skip_bytes`] to resume at a known position. How the stream is cut
//! into chunks is entirely up to the caller.

mod bgzip;
mod file;
mod memory;

pub use bgzip::{virtual_offset, BgzipOptions, BgzipReader, BgzipSource, BgzipSourceBuilder};
pub use file::{FileReader, FileSource};
pub use memory::{MemoryReader, Residency};

use crate::chunk::DataChunk;
use crate::errors::Result;
use crate::stream::Stream;
use positioned_io::RandomAccessFile;
use repr::VirtualOffset;
use std::path::Path;
use std::sync::Arc;

pub trait DataChunkReader {
    /// Advance by `count` bytes. Skipping past the end leaves the reader at the end
    fn skip_bytes(&mut self, count: u64) -> Result<()>;

    /// Read the next `min(max_size, remaining)` bytes.
    ///
    /// The chunk is empty only when the reader is already at the end of the stream (or when
    /// `max_size` is 0).
    fn get_next_chunk(&mut self, max_size: usize, stream: &Stream) -> Result<DataChunk>;
}

#[derive(Debug, Clone)]
pub enum DataChunkSource {
    /// A buffer which is already where chunks live: chunks are views into it
    Device(Arc<[u8]>),
    /// A buffer in host memory: chunks are copies
    Host(Arc<[u8]>),
    File(FileSource),
    Bgzip(BgzipSource),
}

impl DataChunkSource {
    /// Open a new reader, positioned at the start of the stream
    pub fn create_reader(&self) -> Result<Reader> {
        let reader = match self {
            DataChunkSource::Device(buffer) => {
                Reader::Memory(MemoryReader::new(Arc::clone(buffer), Residency::Device))
            }
            DataChunkSource::Host(buffer) => {
                Reader::Memory(MemoryReader::new(Arc::clone(buffer), Residency::Host))
            }
            DataChunkSource::File(source) => Reader::File(source.create_reader()?),
            DataChunkSource::Bgzip(source) => Reader::Bgzip(source.create_reader()?),
        };
        Ok(reader)
    }
}

#[derive(Debug)]
pub enum Reader {
    Memory(MemoryReader),
    File(FileReader),
    Bgzip(BgzipReader<RandomAccessFile>),
}

impl Reader {
    pub fn as_bgzip(&self) -> Option<&BgzipReader<RandomAccessFile>> {
        match self {
            Reader::Bgzip(reader) => Some(reader),
            _ => None,
        }
    }
}

impl DataChunkReader for Reader {
    fn skip_bytes(&mut self, count: u64) -> Result<()> {
        match self {
            Reader::Memory(reader) => reader.skip_bytes(count),
            Reader::File(reader) => reader.skip_bytes(count),
            Reader::Bgzip(reader) => reader.skip_bytes(count),
        }
    }

    fn get_next_chunk(&mut self, max_size: usize, stream: &Stream) -> Result<DataChunk> {
        match self {
            Reader::Memory(reader) => reader.get_next_chunk(max_size, stream),
            Reader::File(reader) => reader.get_next_chunk(max_size, stream),
            Reader::Bgzip(reader) => reader.get_next_chunk(max_size, stream),
        }
    }
}

/// A source over a buffer which chunks may reference directly
pub fn make_source<B: Into<Arc<[u8]>>>(buffer: B) -> DataChunkSource {
    DataChunkSource::Device(buffer.into())
}

/// A source over host memory, copied into each chunk as it is read
pub fn make_source_from_host<B: Into<Arc<[u8]>>>(buffer: B) -> DataChunkSource {
    DataChunkSource::Host(buffer.into())
}

pub fn make_source_from_file<P: AsRef<Path>>(path: P) -> DataChunkSource {
    DataChunkSource::File(FileSource::new(path))
}

/// A source over the whole decompressed contents of a BGZF file
pub fn make_source_from_bgzip_file<P: AsRef<Path>>(path: P) -> Result<DataChunkSource> {
    BgzipSourceBuilder::new().build(path)
}

/// A source over the decompressed contents of a BGZF file in `[begin, end)`
pub fn make_source_from_bgzip_file_with_offsets<P, V>(
    path: P,
    begin: V,
    end: V,
) -> Result<DataChunkSource>
where
    P: AsRef<Path>,
    V: Into<VirtualOffset>,
{
    let mut builder = BgzipSourceBuilder::new();
    builder.set_window(begin.into(), end.into());
    builder.build(path)
}
