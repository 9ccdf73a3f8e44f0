use super::DataChunkReader;
use crate::chunk::DataChunk;
use crate::errors::Result;
use crate::stream::Stream;
use std::sync::Arc;

/// Where an in-memory buffer lives relative to the chunks read from it
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Residency {
    /// Chunks are views of the buffer
    Device,
    /// Chunks are copied out of the buffer
    Host,
}

#[derive(Debug)]
pub struct MemoryReader {
    buffer: Arc<[u8]>,
    position: usize,
    residency: Residency,
}

impl MemoryReader {
    pub fn new(buffer: Arc<[u8]>, residency: Residency) -> Self {
        Self {
            buffer,
            position: 0,
            residency,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl DataChunkReader for MemoryReader {
    fn skip_bytes(&mut self, count: u64) -> Result<()> {
        let remaining = self.buffer.len() - self.position;
        let count = usize::try_from(count).unwrap_or(usize::MAX).min(remaining);
        self.position += count;
        Ok(())
    }

    fn get_next_chunk(&mut self, max_size: usize, stream: &Stream) -> Result<DataChunk> {
        let size = max_size.min(self.buffer.len() - self.position);
        let range = self.position..self.position + size;
        self.position += size;
        let chunk = match self.residency {
            Residency::Device => stream.view_chunk(&self.buffer, range),
            Residency::Host => stream.copy_chunk(&self.buffer[range]),
        };
        Ok(chunk)
    }
}
