use super::DataChunkReader;
use crate::chunk::DataChunk;
use crate::errors::Result;
use crate::positioned::SharedReadAt;
use crate::stream::Stream;
use positioned_io::RandomAccessFile;
use slog::Logger;
use std::fs;
use std::path::{Path, PathBuf};

/// A plain, uncompressed file
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    logger: Logger,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_logger(path, crate::default_logger())
    }

    pub fn with_logger<P: AsRef<Path>>(path: P, logger: Logger) -> Self {
        let path = path.as_ref().to_path_buf();
        let logger = logger.new(slog::o!("file" => path.display().to_string()));
        Self { path, logger }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn create_reader(&self) -> Result<FileReader> {
        let file = fs::File::open(&self.path)?;
        let len = file.metadata()?.len();
        let file = RandomAccessFile::try_new(file)?;
        slog::debug!(self.logger, "Opened file reader"; "len" => len);
        Ok(FileReader {
            file,
            len,
            position: 0,
        })
    }
}

/// Reads a file from its own handle; the length is fixed when the reader is opened
pub struct FileReader {
    file: RandomAccessFile,
    len: u64,
    position: u64,
}

impl FileReader {
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl DataChunkReader for FileReader {
    fn skip_bytes(&mut self, count: u64) -> Result<()> {
        self.position = self.position.saturating_add(count).min(self.len);
        Ok(())
    }

    fn get_next_chunk(&mut self, max_size: usize, stream: &Stream) -> Result<DataChunk> {
        let remaining = self.len - self.position;
        let size = usize::try_from(remaining).unwrap_or(usize::MAX).min(max_size);
        let mut buffer = stream.buffer(size);
        buffer.resize(size, 0);
        self.file.read_exact_at(&mut buffer, self.position)?;
        self.position += size as u64;
        Ok(stream.chunk(buffer))
    }
}

impl std::fmt::Debug for FileReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileReader")
            .field("len", &self.len)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}
