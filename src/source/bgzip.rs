use super::{DataChunkReader, DataChunkSource};
use crate::block;
use crate::chunk::DataChunk;
use crate::compression::Deflate;
use crate::config::ChecksumMode;
use crate::errors::*;
use crate::positioned::{PositionedReader, SharedReadAt};
use crate::stream::Stream;
use positioned_io::RandomAccessFile;
use repr::block::{Footer, FOOTER_SIZE, MAX_BLOCK_SIZE};
use repr::VirtualOffset;
use slog::Logger;
use std::path::{Path, PathBuf};
use std::{fmt, fs, mem};

/// Pack a virtual offset from its parts, rejecting parts which do not fit
pub fn virtual_offset(
    compressed_offset: u64,
    local_offset: u64,
) -> Result<VirtualOffset, ConfigurationError> {
    let local = u16::try_from(local_offset).map_err(|_| ConfigurationError::LocalOffsetOverflow {
        offset: local_offset,
    })?;
    VirtualOffset::from_parts(compressed_offset, local).ok_or(
        ConfigurationError::CompressedOffsetOverflow {
            offset: compressed_offset,
        },
    )
}

/// The part of a BGZF file a reader covers, and how it treats checksums
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct BgzipOptions {
    /// The first position read
    pub begin: VirtualOffset,
    /// The position reading stops at. Unbounded if unset
    pub end: Option<VirtualOffset>,
    pub checksum_mode: ChecksumMode,
}

#[derive(Debug, Clone, Default)]
pub struct BgzipSourceBuilder {
    pub begin: Option<VirtualOffset>,
    pub end: Option<VirtualOffset>,
    pub checksum_mode: ChecksumMode,

    logger: Option<Logger>,
}

impl BgzipSourceBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set_window(&mut self, begin: VirtualOffset, end: VirtualOffset) -> &mut Self {
        self.begin = Some(begin);
        self.end = Some(end);
        self
    }

    pub fn set_checksum_mode(&mut self, mode: ChecksumMode) -> &mut Self {
        self.checksum_mode = mode;
        self
    }

    pub fn set_logger(&mut self, logger: Logger) -> &mut Self {
        self.logger = Some(logger);
        self
    }

    pub fn build<P: AsRef<Path>>(self, path: P) -> Result<DataChunkSource> {
        self._build(path.as_ref()).map(DataChunkSource::Bgzip)
    }

    fn _build(self, path: &Path) -> Result<BgzipSource> {
        let begin = self.begin.unwrap_or_default();
        if let Some(end) = self.end {
            if begin > end {
                return Err(ConfigurationError::InvertedWindow { begin, end }.into());
            }
        }

        let file_len = fs::metadata(path)?.len();
        for offset in Some(begin).iter().chain(self.end.iter()) {
            if offset.compressed_offset() > file_len {
                return Err(ConfigurationError::OffsetOutOfBounds {
                    offset: offset.compressed_offset(),
                    file_len,
                }
                .into());
            }
        }

        let logger = self.logger.unwrap_or_else(crate::default_logger);
        let logger = logger.new(slog::o!("file" => path.display().to_string()));
        slog::debug!(logger, "Opened BGZF source";
            "begin" => %begin,
            "end" => ?self.end,
            "file_len" => file_len,
            "checksum_mode" => ?self.checksum_mode
        );

        Ok(BgzipSource {
            path: path.to_path_buf(),
            options: BgzipOptions {
                begin,
                end: self.end,
                checksum_mode: self.checksum_mode,
            },
            logger,
        })
    }
}

/// A BGZF file, read through its decompressed contents
#[derive(Debug, Clone)]
pub struct BgzipSource {
    path: PathBuf,
    options: BgzipOptions,
    logger: Logger,
}

impl BgzipSource {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> BgzipOptions {
        self.options
    }

    pub fn create_reader(&self) -> Result<BgzipReader<RandomAccessFile>> {
        let file = fs::File::open(&self.path)?;
        let len = file.metadata()?.len();
        let file = RandomAccessFile::try_new(file)?;
        Ok(BgzipReader::new(file, len, self.options, self.logger.clone()))
    }
}

enum State {
    /// Positioned on a block header, `local_start` bytes into its data
    AtBlockStart { offset: u64, local_start: usize },
    BlockDecoded(DecodedBlock),
    EndOfStream,
    Failed,
}

struct DecodedBlock {
    offset: u64,
    next_offset: u64,
    /// Decompressed data, cut off at the end of the window
    data: Vec<u8>,
    consumed: usize,
    /// The window ends in this block
    last: bool,
}

/// What can be learned about a block without touching its payload
struct Frame {
    next_offset: u64,
    footer: Footer,
}

/// A cursor over the decompressed data of a BGZF file.
///
/// Blocks are decoded one at a time as reads reach them. Skips hop over whole blocks using only
/// their framing, so skipping far into a file costs a few small reads per block and no
/// decompression.
pub struct BgzipReader<R> {
    file: R,
    file_len: u64,
    state: State,
    end: Option<VirtualOffset>,
    checksum_mode: ChecksumMode,
    decompressor: Deflate,
    /// Raw block bytes of the block being decoded
    raw: Vec<u8>,
    /// Data buffer of the last finished block, reused for the next one
    spare: Vec<u8>,
    blocks_decoded: u64,
    logger: Logger,
}

impl<R: SharedReadAt> BgzipReader<R> {
    pub fn new(file: R, file_len: u64, options: BgzipOptions, logger: Logger) -> Self {
        let begin = options.begin;
        Self {
            file,
            file_len,
            state: State::AtBlockStart {
                offset: begin.compressed_offset(),
                local_start: usize::from(begin.local_offset()),
            },
            end: options.end,
            checksum_mode: options.checksum_mode,
            decompressor: Deflate::default(),
            raw: Vec::new(),
            spare: Vec::new(),
            blocks_decoded: 0,
            logger,
        }
    }

    /// Number of blocks decompressed so far
    pub fn blocks_decoded(&self) -> u64 {
        self.blocks_decoded
    }

    /// The position of the next byte to be read, or `None` at the end of the stream.
    ///
    /// Can be used as the begin offset of a new source to resume reading here.
    pub fn virtual_position(&self) -> Option<VirtualOffset> {
        let (offset, local) = match &self.state {
            State::AtBlockStart {
                offset,
                local_start,
            } => (*offset, *local_start),
            State::BlockDecoded(block) => (block.offset, block.consumed),
            State::EndOfStream | State::Failed => return None,
        };
        VirtualOffset::from_parts(offset, u16::try_from(local).ok()?)
    }

    fn skip(&mut self, mut count: u64) -> Result<()> {
        while count > 0 {
            match mem::replace(&mut self.state, State::Failed) {
                State::Failed => return Err(Error::ReaderFailed),
                State::EndOfStream => {
                    self.state = State::EndOfStream;
                    return Ok(());
                }
                State::BlockDecoded(mut block) => {
                    let available = (block.data.len() - block.consumed) as u64;
                    if count < available {
                        block.consumed += count as usize;
                        self.state = State::BlockDecoded(block);
                        return Ok(());
                    }
                    count -= available;
                    self.state = self.finish_block(block);
                }
                State::AtBlockStart {
                    offset,
                    local_start,
                } => {
                    if self.ends_at(offset) {
                        self.state = State::EndOfStream;
                        return Ok(());
                    }
                    let frame = match self.read_frame(offset)? {
                        Some(frame) if !frame.footer.is_terminator() => frame,
                        _ => {
                            self.state = State::EndOfStream;
                            return Ok(());
                        }
                    };
                    let size = frame.footer.decompressed_size as usize;
                    let (limit, last) = self.window_limit(offset, frame.next_offset, size)?;
                    check_local_start(offset, local_start, limit)?;

                    let available = (limit - local_start) as u64;
                    if count < available {
                        self.state = State::AtBlockStart {
                            offset,
                            local_start: local_start + count as usize,
                        };
                        return Ok(());
                    }
                    count -= available;
                    slog::trace!(self.logger, "Skipped block";
                        "offset" => offset,
                        "bytes" => available
                    );
                    self.state = next_state(frame.next_offset, last);
                }
            }
        }
        Ok(())
    }

    fn read(&mut self, max_size: usize, stream: &Stream) -> Result<DataChunk> {
        let mut buffer = stream.buffer(max_size);
        while buffer.len() < max_size {
            match mem::replace(&mut self.state, State::Failed) {
                State::Failed => return Err(Error::ReaderFailed),
                State::EndOfStream => {
                    self.state = State::EndOfStream;
                    break;
                }
                State::AtBlockStart {
                    offset,
                    local_start,
                } => {
                    self.state = self.decode_block(offset, local_start)?;
                }
                State::BlockDecoded(mut block) => {
                    let available = block.data.len() - block.consumed;
                    let take = available.min(max_size - buffer.len());
                    let start = block.consumed;
                    buffer.extend_from_slice(&block.data[start..start + take]);
                    block.consumed += take;
                    self.state = if block.consumed == block.data.len() {
                        self.finish_block(block)
                    } else {
                        State::BlockDecoded(block)
                    };
                }
            }
        }
        Ok(stream.chunk(buffer))
    }

    /// Read the header and footer of the block at `offset`, `None` if the file ends there
    fn read_frame(&self, offset: u64) -> Result<Option<Frame>> {
        if offset >= self.file_len {
            self.warn_missing_terminator(offset);
            return Ok(None);
        }
        let mut stream = PositionedReader::with_position(&self.file, offset);
        let header = block::read_header(&mut stream)?;
        let next_offset = offset + u64::from(header.block_size);
        stream.set_position(next_offset - FOOTER_SIZE as u64);
        let footer = block::read_footer(&mut stream)?;
        Ok(Some(Frame {
            next_offset,
            footer,
        }))
    }

    fn decode_block(&mut self, offset: u64, local_start: usize) -> Result<State> {
        // whatever follows the window is not ours to read
        if self.ends_at(offset) {
            return Ok(State::EndOfStream);
        }
        if offset >= self.file_len {
            self.warn_missing_terminator(offset);
            return Ok(State::EndOfStream);
        }

        // a block is never larger than MAX_BLOCK_SIZE, so read that much and parse in memory
        let mut raw = mem::take(&mut self.raw);
        let available = (self.file_len - offset).min(MAX_BLOCK_SIZE as u64) as usize;
        raw.resize(available, 0);
        self.file
            .read_exact_at(&mut raw, offset)
            .map_err(FormatError::from_io)?;

        let header = block::read_header(&raw[..])?;
        let block_size = header.block_size as usize;
        if block_size > raw.len() {
            return Err(FormatError::Truncated.into());
        }
        let footer_start = block_size - FOOTER_SIZE;
        let footer = block::read_footer(&raw[footer_start..block_size])?;
        let next_offset = offset + block_size as u64;
        if footer.is_terminator() {
            slog::trace!(self.logger, "Reached terminator block"; "offset" => offset);
            self.raw = raw;
            return Ok(State::EndOfStream);
        }

        let size = footer.decompressed_size as usize;
        let (limit, last) = self.window_limit(offset, next_offset, size)?;
        check_local_start(offset, local_start, limit)?;

        let mut data = mem::take(&mut self.spare);
        block::decode_payload(
            &raw[header.size()..footer_start],
            footer,
            &mut self.decompressor,
            self.checksum_mode,
            &mut data,
        )?;
        self.raw = raw;
        self.blocks_decoded += 1;
        data.truncate(limit);
        slog::trace!(self.logger, "Decoded block";
            "offset" => offset,
            "block_size" => block_size,
            "decompressed_size" => size,
            "start" => local_start,
            "limit" => limit
        );

        let block = DecodedBlock {
            offset,
            next_offset,
            data,
            consumed: local_start,
            last,
        };
        Ok(if block.consumed == block.data.len() {
            self.finish_block(block)
        } else {
            State::BlockDecoded(block)
        })
    }

    /// The window ends exactly where the block at `offset` starts
    fn ends_at(&self, offset: u64) -> bool {
        matches!(self.end, Some(end) if end.compressed_offset() == offset && end.local_offset() == 0)
    }

    /// How many bytes of the block at `offset` lie in the window, and whether the window ends
    /// with this block
    fn window_limit(&self, offset: u64, next_offset: u64, size: usize) -> Result<(usize, bool)> {
        let end = match self.end {
            Some(end) => end,
            None => return Ok((size, false)),
        };
        if end.compressed_offset() == offset {
            let local = usize::from(end.local_offset());
            if local > size {
                return Err(ConfigurationError::LocalOffsetOutOfBlock {
                    block_offset: offset,
                    local_offset: end.local_offset(),
                    block_len: size,
                }
                .into());
            }
            Ok((local, true))
        } else if end.compressed_offset() < next_offset {
            Err(ConfigurationError::EndNotOnBlock {
                end,
                block_offset: offset,
                next_offset,
            }
            .into())
        } else {
            Ok((size, false))
        }
    }

    fn finish_block(&mut self, block: DecodedBlock) -> State {
        self.spare = block.data;
        next_state(block.next_offset, block.last)
    }

    fn warn_missing_terminator(&self, offset: u64) {
        slog::warn!(self.logger, "File ends without a terminator block"; "offset" => offset);
    }

    fn fail(&self, err: Error) -> Error {
        if !matches!(err, Error::ReaderFailed) {
            slog::error!(self.logger, "Reader failed: {}", err);
        }
        err
    }
}

impl<R: SharedReadAt> DataChunkReader for BgzipReader<R> {
    fn skip_bytes(&mut self, count: u64) -> Result<()> {
        if let State::Failed = self.state {
            return Err(Error::ReaderFailed);
        }
        self.skip(count).map_err(|e| self.fail(e))
    }

    fn get_next_chunk(&mut self, max_size: usize, stream: &Stream) -> Result<DataChunk> {
        if let State::Failed = self.state {
            return Err(Error::ReaderFailed);
        }
        self.read(max_size, stream).map_err(|e| self.fail(e))
    }
}

impl<R> fmt::Debug for BgzipReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::AtBlockStart { .. } => "at block start",
            State::BlockDecoded(_) => "block decoded",
            State::EndOfStream => "end of stream",
            State::Failed => "failed",
        };
        f.debug_struct("BgzipReader")
            .field("file_len", &self.file_len)
            .field("state", &state)
            .field("end", &self.end)
            .field("checksum_mode", &self.checksum_mode)
            .field("blocks_decoded", &self.blocks_decoded)
            .finish_non_exhaustive()
    }
}

fn next_state(next_offset: u64, last: bool) -> State {
    if last {
        State::EndOfStream
    } else {
        State::AtBlockStart {
            offset: next_offset,
            local_start: 0,
        }
    }
}

fn check_local_start(offset: u64, local_start: usize, limit: usize) -> Result<()> {
    if local_start > limit {
        return Err(ConfigurationError::LocalOffsetOutOfBlock {
            block_offset: offset,
            local_offset: local_start as u16,
            block_len: limit,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use repr::block::EOF_MARKER;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct TestFile {
        bytes: Vec<u8>,
        /// Compressed offset of each data block
        offsets: Vec<u64>,
    }

    fn build(blocks: &[&[u8]], terminated: bool) -> TestFile {
        let mut bytes = Vec::new();
        let mut offsets = Vec::new();
        for data in blocks {
            offsets.push(bytes.len() as u64);
            block::write_uncompressed_block(&mut bytes, data, &[], &[]).unwrap();
        }
        if terminated {
            bytes.extend_from_slice(&EOF_MARKER);
        }
        TestFile { bytes, offsets }
    }

    fn reader(file: &TestFile, options: BgzipOptions) -> BgzipReader<&[u8]> {
        let logger = Logger::root(slog::Discard, slog::o!());
        BgzipReader::new(&file.bytes[..], file.bytes.len() as u64, options, logger)
    }

    fn window(file: &TestFile, begin: (usize, u16), end: (usize, u16)) -> BgzipOptions {
        BgzipOptions {
            begin: VirtualOffset::from_parts(file.offsets[begin.0], begin.1).unwrap(),
            end: Some(VirtualOffset::from_parts(file.offsets[end.0], end.1).unwrap()),
            ..Default::default()
        }
    }

    fn read_to_end<R: SharedReadAt>(reader: &mut BgzipReader<R>) -> Vec<u8> {
        let stream = Stream::new();
        let mut result = Vec::new();
        loop {
            let chunk = reader.get_next_chunk(7, &stream).unwrap();
            if chunk.size() == 0 {
                return result;
            }
            result.extend_from_slice(&chunk);
        }
    }

    #[test]
    fn reads_across_blocks() {
        let file = build(&[b"hello ", b"w", b"orld"], true);
        let mut reader = reader(&file, BgzipOptions::default());
        assert_eq!(read_to_end(&mut reader), b"hello world");
        assert_eq!(reader.virtual_position(), None);
    }

    #[test]
    fn skips_without_decompressing() {
        let blocks = [&[b'x'; 1000][..]; 10];
        let file = build(&blocks, true);
        let mut reader = reader(&file, BgzipOptions::default());

        reader.skip_bytes(5 * 1000 + 3).unwrap();
        assert_eq!(reader.blocks_decoded(), 0);
        assert_eq!(
            reader.virtual_position(),
            VirtualOffset::from_parts(file.offsets[5], 3)
        );

        let chunk = reader.get_next_chunk(4, &Stream::new()).unwrap();
        assert_eq!(chunk.size(), 4);
        assert_eq!(reader.blocks_decoded(), 1);
        assert_eq!(
            reader.virtual_position(),
            VirtualOffset::from_parts(file.offsets[5], 7)
        );

        reader.skip_bytes(u64::MAX).unwrap();
        assert_eq!(reader.get_next_chunk(4, &Stream::new()).unwrap().size(), 0);
        assert_eq!(reader.blocks_decoded(), 1);
    }

    #[test]
    fn resumes_from_virtual_position() {
        let file = build(&[b"0123456789", b"abcdefghij"], true);
        let mut first = reader(&file, BgzipOptions::default());
        first.skip_bytes(13).unwrap();
        let options = BgzipOptions {
            begin: first.virtual_position().unwrap(),
            ..Default::default()
        };
        let mut second = reader(&file, options);
        assert_eq!(read_to_end(&mut second), b"defghij");
    }

    #[test]
    fn window_within_one_block() {
        let file = build(&[b"0123456789", b"abcdefghij"], true);
        let mut reader = reader(&file, window(&file, (1, 2), (1, 5)));
        assert_eq!(read_to_end(&mut reader), b"cde");
    }

    #[test]
    fn window_across_blocks() {
        let file = build(&[b"0123456789", b"abcdefghij", b"ABCDEFGHIJ"], true);
        let mut reader = reader(&file, window(&file, (0, 8), (2, 1)));
        assert_eq!(read_to_end(&mut reader), b"89abcdefghijA");

        let mut reader = self::reader(&file, window(&file, (0, 8), (2, 1)));
        reader.skip_bytes(11).unwrap();
        assert_eq!(read_to_end(&mut reader), b"jA");
    }

    #[test]
    fn empty_window() {
        let file = build(&[b"0123456789"], true);
        let mut reader = reader(&file, window(&file, (0, 4), (0, 4)));
        assert!(read_to_end(&mut reader).is_empty());
    }

    #[test]
    fn window_end_past_block() {
        let file = build(&[b"0123456789", b"abc"], true);
        let mut reader = reader(&file, window(&file, (0, 0), (1, 4)));
        let stream = Stream::new();
        let chunk = reader.get_next_chunk(10, &stream).unwrap();
        assert_eq!(&*chunk, b"0123456789");
        let err = reader.get_next_chunk(10, &stream).unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::LocalOffsetOutOfBlock { local_offset: 4, .. })
        ));
        assert!(matches!(
            reader.get_next_chunk(10, &stream),
            Err(Error::ReaderFailed)
        ));
        assert!(matches!(reader.skip_bytes(1), Err(Error::ReaderFailed)));
        assert_eq!(reader.virtual_position(), None);
    }

    #[test]
    fn window_end_at_block_start_ignores_what_follows() {
        let mut file = build(&[b"partition"], false);
        let end = VirtualOffset::from_parts(file.bytes.len() as u64, 0).unwrap();
        file.bytes.extend_from_slice(b"trailing padding, not a block");
        let options = BgzipOptions {
            end: Some(end),
            ..Default::default()
        };

        let mut reader = reader(&file, options);
        assert_eq!(read_to_end(&mut reader), b"partition");
        assert_eq!(reader.virtual_position(), None);

        let mut reader = self::reader(&file, options);
        reader.skip_bytes(100).unwrap();
        assert!(read_to_end(&mut reader).is_empty());
        assert_eq!(reader.blocks_decoded(), 0);
    }

    #[test]
    fn window_end_before_next_block() {
        let file = build(&[b"partition", b"next partition"], true);
        let mut reader = reader(&file, window(&file, (0, 0), (1, 0)));
        assert_eq!(read_to_end(&mut reader), b"partition");
        assert_eq!(reader.blocks_decoded(), 1);
    }

    struct CountWarnings(Arc<AtomicUsize>);

    impl slog::Drain for CountWarnings {
        type Ok = ();
        type Err = slog::Never;

        fn log(
            &self,
            record: &slog::Record,
            _: &slog::OwnedKVList,
        ) -> Result<(), slog::Never> {
            if record.level() == slog::Level::Warning {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    #[test]
    fn window_end_at_file_end() {
        let file = build(&[b"partition"], false);
        let len = file.bytes.len() as u64;
        let read_with = |end: Option<VirtualOffset>| {
            let warnings = Arc::new(AtomicUsize::new(0));
            let logger = Logger::root(CountWarnings(Arc::clone(&warnings)), slog::o!());
            let options = BgzipOptions {
                end,
                ..Default::default()
            };
            let mut reader = BgzipReader::new(&file.bytes[..], len, options, logger);
            assert_eq!(read_to_end(&mut reader), b"partition");
            warnings.load(Ordering::SeqCst)
        };

        assert_eq!(read_with(VirtualOffset::from_parts(len, 0)), 0);
        // an unbounded reader really is missing its terminator
        assert_eq!(read_with(None), 1);
    }

    #[test]
    fn window_end_inside_block() {
        let file = build(&[b"0123456789", b"abc"], true);
        let options = BgzipOptions {
            end: Some(VirtualOffset::from_parts(file.offsets[1] - 3, 0).unwrap()),
            ..Default::default()
        };
        let mut reader = reader(&file, options);
        let err = reader.skip_bytes(1).unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::EndNotOnBlock { .. })
        ));
    }

    #[test]
    fn begin_past_block() {
        let file = build(&[b"0123456789"], true);
        let options = BgzipOptions {
            begin: VirtualOffset::from_parts(0, 11).unwrap(),
            ..Default::default()
        };
        let mut reader = reader(&file, options);
        let err = reader.get_next_chunk(1, &Stream::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::LocalOffsetOutOfBlock { .. })
        ));
    }

    #[test]
    fn missing_terminator() {
        let file = build(&[b"no ", b"terminator"], false);
        let mut reader = reader(&file, BgzipOptions::default());
        assert_eq!(read_to_end(&mut reader), b"no terminator");

        let mut reader = self::reader(&file, BgzipOptions::default());
        reader.skip_bytes(100).unwrap();
        assert!(read_to_end(&mut reader).is_empty());
    }

    #[test]
    fn stops_at_terminator() {
        let mut file = build(&[b"before"], true);
        block::write_uncompressed_block(&mut file.bytes, b"after", &[], &[]).unwrap();

        let mut reader = reader(&file, BgzipOptions::default());
        assert_eq!(read_to_end(&mut reader), b"before");

        let mut reader = self::reader(&file, BgzipOptions::default());
        reader.skip_bytes(6).unwrap();
        assert!(read_to_end(&mut reader).is_empty());
    }

    #[test]
    fn truncated_block() {
        let mut file = build(&[b"0123456789"], false);
        file.bytes.truncate(file.bytes.len() - 3);
        let mut reader = reader(&file, BgzipOptions::default());
        let err = reader.get_next_chunk(100, &Stream::new()).unwrap_err();
        assert!(matches!(err, Error::Format(FormatError::Truncated)));
    }

    #[test]
    fn checksum_modes() {
        let mut file = build(&[b"0123456789"], true);
        // first byte of the crc in the footer
        let crc_offset = file.offsets[0] as usize + 10 + 31 - FOOTER_SIZE;
        file.bytes[crc_offset] ^= 0xff;

        let mut verifying = reader(&file, BgzipOptions::default());
        let err = verifying.get_next_chunk(100, &Stream::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Format(FormatError::ChecksumMismatch { .. })
        ));

        let options = BgzipOptions {
            checksum_mode: ChecksumMode::Ignore,
            ..Default::default()
        };
        let mut ignoring = reader(&file, options);
        assert_eq!(read_to_end(&mut ignoring), b"0123456789");
    }

    #[test]
    fn reuses_chunk_buffers() {
        let file = build(&[b"0123456789"], true);
        let mut reader = reader(&file, BgzipOptions::default());
        let stream = Stream::with_pool_capacity(1);
        drop(reader.get_next_chunk(5, &stream).unwrap());
        assert_eq!(stream.idle_buffers(), 1);
        let chunk = reader.get_next_chunk(5, &stream).unwrap();
        assert_eq!(&*chunk, b"56789");
        assert_eq!(stream.idle_buffers(), 0);
    }

    #[test]
    fn builder_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.gz");
        let file = build(&[b"0123456789"], true);
        fs::write(&path, &file.bytes).unwrap();

        let mut builder = BgzipSourceBuilder::new();
        builder.set_window(
            VirtualOffset::from_parts(0, 5).unwrap(),
            VirtualOffset::from_parts(0, 4).unwrap(),
        );
        assert!(matches!(
            builder.build(&path),
            Err(Error::Configuration(ConfigurationError::InvertedWindow { .. }))
        ));

        let past_end = VirtualOffset::from_parts(file.bytes.len() as u64 + 1, 0).unwrap();
        let mut builder = BgzipSourceBuilder::new();
        builder.set_window(VirtualOffset::default(), past_end);
        assert!(matches!(
            builder.build(&path),
            Err(Error::Configuration(ConfigurationError::OffsetOutOfBounds { .. }))
        ));

        assert!(matches!(
            BgzipSourceBuilder::new().build(dir.path().join("missing.gz")),
            Err(Error::Io(_))
        ));

        let mut builder = BgzipSourceBuilder::new();
        builder.set_checksum_mode(ChecksumMode::Ignore);
        let source = builder.build(&path).unwrap();
        match source {
            DataChunkSource::Bgzip(source) => {
                assert_eq!(source.options().checksum_mode, ChecksumMode::Ignore);
                assert_eq!(source.path(), path);
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn offset_parts() {
        assert_eq!(
            virtual_offset(3, 4).unwrap(),
            VirtualOffset::from_parts(3, 4).unwrap()
        );
        assert!(matches!(
            virtual_offset(0, 1 << 16),
            Err(ConfigurationError::LocalOffsetOverflow { .. })
        ));
        assert!(matches!(
            virtual_offset(1 << 48, 0),
            Err(ConfigurationError::CompressedOffsetOverflow { .. })
        ));
    }
}
