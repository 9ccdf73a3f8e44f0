use crate::block;
use crate::compression::Deflate;
use crate::config::CompressionLevel;
use crate::errors::*;
use repr::block::{EOF_MARKER, MAX_BLOCK_DATA};
use repr::VirtualOffset;
use std::io;

/// Cuts a byte stream into BGZF blocks.
///
/// Data is buffered until a block is full, then written out in one go. [`finish`](Self::finish)
/// must be called to write the last partial block and the end of file marker.
#[derive(Debug)]
pub struct BlockWriter<W> {
    writer: W,
    /// `None` writes stored blocks
    compressor: Option<Deflate>,
    /// Bytes written to `writer`, which is where the current block will start
    compressed_offset: u64,
    current_block: Vec<u8>,
    output: Vec<u8>,
}

impl<W: io::Write> BlockWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_level(writer, CompressionLevel::default())
    }

    pub fn with_level(writer: W, level: CompressionLevel) -> Self {
        Self::with_compressor(writer, Some(Deflate::new(level)))
    }

    /// A writer which stores data without compressing it
    pub fn uncompressed(writer: W) -> Self {
        Self::with_compressor(writer, None)
    }

    fn with_compressor(writer: W, compressor: Option<Deflate>) -> Self {
        Self {
            writer,
            compressor,
            compressed_offset: 0,
            current_block: Vec::with_capacity(MAX_BLOCK_DATA),
            output: Vec::new(),
        }
    }

    /// The virtual offset the next byte written will have, if the file is still small enough
    /// to address
    pub fn position(&self) -> Option<VirtualOffset> {
        // current_block is flushed as soon as it is full, so its length always fits
        VirtualOffset::from_parts(self.compressed_offset, self.current_block.len() as u16)
    }

    pub fn write_data(&mut self, mut data: &[u8]) -> Result<()> {
        while MAX_BLOCK_DATA - self.current_block.len() <= data.len() {
            let (head, tail) = data.split_at(MAX_BLOCK_DATA - self.current_block.len());
            self.current_block.extend_from_slice(head);
            self.flush_block()?;
            data = tail;
        }
        self.current_block.extend_from_slice(data);
        Ok(())
    }

    /// Write out the data buffered so far as a block of its own, even if it is not full
    pub fn flush_block(&mut self) -> Result<()> {
        // an empty block would end the stream
        if self.current_block.is_empty() {
            return Ok(());
        }
        self.output.clear();
        match &mut self.compressor {
            Some(compressor) => block::write_compressed_block(
                &mut self.output,
                &self.current_block,
                &[],
                &[],
                compressor,
            )?,
            None => block::write_uncompressed_block(
                &mut self.output,
                &self.current_block,
                &[],
                &[],
            )?,
        }
        self.writer.write_all(&self.output)?;
        self.compressed_offset += self.output.len() as u64;
        self.current_block.clear();
        Ok(())
    }

    /// Write any buffered data and the end of file marker, and return the inner writer
    pub fn finish(mut self) -> Result<W> {
        self.flush_block()?;
        self.writer.write_all(&EOF_MARKER)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: io::Write> io::Write for BlockWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_all(buf)?;
        Ok(buf.len())
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.write_data(buf).map_err(into_io)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_block().map_err(into_io)?;
        self.writer.flush()
    }
}

fn into_io(err: Error) -> io::Error {
    match err {
        Error::Io(err) => err,
        err => io::Error::new(io::ErrorKind::Other, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{BgzipOptions, BgzipReader, DataChunkReader};
    use crate::stream::Stream;
    use std::io::Write;

    fn read_all(file: &[u8], options: BgzipOptions) -> Vec<u8> {
        let logger = slog::Logger::root(slog::Discard, slog::o!());
        let mut reader = BgzipReader::new(file, file.len() as u64, options, logger);
        let chunk = reader.get_next_chunk(usize::MAX, &Stream::new()).unwrap();
        chunk.to_vec()
    }

    #[test]
    fn block_boundaries() {
        let mut writer = BlockWriter::uncompressed(Vec::new());
        assert_eq!(writer.position(), VirtualOffset::from_parts(0, 0));

        writer.write_data(&vec![b'a'; MAX_BLOCK_DATA - 1]).unwrap();
        assert_eq!(
            writer.position(),
            VirtualOffset::from_parts(0, (MAX_BLOCK_DATA - 1) as u16)
        );

        // This fills the first block exactly, so the next byte starts the second one
        writer.write_data(b"b").unwrap();
        let second_block = writer.position().unwrap();
        assert!(second_block.compressed_offset() > MAX_BLOCK_DATA as u64);
        assert_eq!(second_block.local_offset(), 0);

        writer.write_data(b"cd").unwrap();
        let file = writer.finish().unwrap();
        assert!(file.ends_with(&EOF_MARKER));

        let data = read_all(&file, BgzipOptions::default());
        assert_eq!(data.len(), MAX_BLOCK_DATA + 2);
        assert_eq!(&data[MAX_BLOCK_DATA - 2..], b"abcd");
    }

    #[test]
    fn resume_from_position() {
        let text = "bananarama".repeat(20_000);
        let mut writer = BlockWriter::new(Vec::new());
        writer.write_all(text.as_bytes()).unwrap();
        let marker = writer.position().unwrap();
        writer.write_all(b"the end").unwrap();
        let file = writer.finish().unwrap();
        assert!(file.len() < text.len());

        let options = BgzipOptions {
            begin: marker,
            ..Default::default()
        };
        assert_eq!(read_all(&file, options), b"the end");

        let whole = read_all(&file, BgzipOptions::default());
        assert_eq!(&whole[..text.len()], text.as_bytes());
    }

    #[test]
    fn empty() {
        let file = BlockWriter::new(Vec::new()).finish().unwrap();
        assert_eq!(file, EOF_MARKER);
        assert!(read_all(&file, BgzipOptions::default()).is_empty());
    }
}
