use crate::chunk::DataChunk;
use crate::pool::Pool;
use std::ops::Range;
use std::sync::Arc;

/// Number of idle chunk buffers a [`Stream`] keeps for reuse unless told otherwise
pub const DEFAULT_POOL_CAPACITY: usize = 4;

/// Upper bound on the memory reserved up front for a single chunk
const MAX_RESERVATION: usize = 4 * 1024 * 1024;

/// The execution context reads deliver their chunks into.
///
/// Chunks produced on a stream draw their buffers from the stream's pool, and return them when
/// dropped, so a consumer which drops each chunk before asking for the next one reads without
/// allocating. Clones share the same pool.
///
/// There is no process wide stream: callers without a stream of their own pass
/// `&Stream::default()`, which is an independent stream with [`DEFAULT_POOL_CAPACITY`].
#[derive(Debug, Clone)]
pub struct Stream {
    buffers: Arc<Pool<Vec<u8>>>,
}

impl Stream {
    pub fn new() -> Self {
        Self::with_pool_capacity(DEFAULT_POOL_CAPACITY)
    }

    pub fn with_pool_capacity(capacity: usize) -> Self {
        Self {
            buffers: Arc::new(Pool::new(capacity)),
        }
    }

    /// Number of buffers waiting for reuse
    pub fn idle_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// An empty buffer with room for at least `size_hint` bytes (up to a limit)
    pub(crate) fn buffer(&self, size_hint: usize) -> Vec<u8> {
        let mut buffer = self.buffers.detached();
        buffer.reserve(size_hint.min(MAX_RESERVATION));
        buffer
    }

    pub(crate) fn chunk(&self, buffer: Vec<u8>) -> DataChunk {
        DataChunk::pooled(buffer, Arc::clone(&self.buffers))
    }

    pub(crate) fn copy_chunk(&self, data: &[u8]) -> DataChunk {
        let mut buffer = self.buffer(data.len());
        buffer.extend_from_slice(data);
        self.chunk(buffer)
    }

    pub(crate) fn view_chunk(&self, buffer: &Arc<[u8]>, range: Range<usize>) -> DataChunk {
        DataChunk::view(Arc::clone(buffer), range)
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::new()
    }
}
