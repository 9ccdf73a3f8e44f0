//! Chunked readers over in-memory buffers, plain files and BGZF compressed files.
//!
//! Everything that can be read is a [`DataChunkSource`]. A source hands out independent
//! readers, and a reader hands out [`DataChunk`]s of whatever size the caller asks for, drawn
//! from the buffer pool of the [`Stream`] passed in.
//!
//! ```no_run
//! use bgzf_chunks::{make_source_from_bgzip_file, DataChunkReader, Stream};
//!
//! # fn main() -> bgzf_chunks::Result<()> {
//! let source = make_source_from_bgzip_file("reads.fastq.gz")?;
//! let mut reader = source.create_reader()?;
//! let stream = Stream::new();
//! loop {
//!     let chunk = reader.get_next_chunk(1 << 20, &stream)?;
//!     if chunk.size() == 0 {
//!         break;
//!     }
//!     // ...
//! }
//! # Ok(())
//! # }
//! ```

use slog::Drain;

pub mod block;
pub mod compression;
pub mod config;
pub mod errors;
pub mod positioned;
pub mod source;
pub mod write;

mod chunk;
mod pool;
mod stream;

pub use chunk::DataChunk;
pub use config::{ChecksumMode, CompressionLevel};
pub use errors::{CodecError, ConfigurationError, Error, FormatError, Result};
pub use repr::VirtualOffset;
pub use source::{
    make_source, make_source_from_bgzip_file, make_source_from_bgzip_file_with_offsets,
    make_source_from_file, make_source_from_host, virtual_offset, BgzipSourceBuilder,
    DataChunkReader, DataChunkSource, Reader,
};
pub use stream::{Stream, DEFAULT_POOL_CAPACITY};
pub use write::BlockWriter;

fn default_logger() -> slog::Logger {
    slog::Logger::root(slog_stdlog::StdLog.fuse(), slog::o!())
}
