use crate::pool::Pool;
use std::ops::{Deref, Range};
use std::sync::Arc;
use std::{fmt, mem};

/// An immutable slice of a logical byte stream, owned by the caller of the read that produced it
pub struct DataChunk {
    data: ChunkData,
}

enum ChunkData {
    /// Bytes copied or decompressed into a buffer borrowed from a stream's pool
    Pooled {
        buffer: Vec<u8>,
        pool: Arc<Pool<Vec<u8>>>,
    },
    /// A window into a buffer which is already resident
    View {
        buffer: Arc<[u8]>,
        range: Range<usize>,
    },
}

impl DataChunk {
    pub(crate) fn pooled(buffer: Vec<u8>, pool: Arc<Pool<Vec<u8>>>) -> Self {
        Self {
            data: ChunkData::Pooled { buffer, pool },
        }
    }

    pub(crate) fn view(buffer: Arc<[u8]>, range: Range<usize>) -> Self {
        assert!(range.end <= buffer.len());
        Self {
            data: ChunkData::View { buffer, range },
        }
    }

    pub fn size(&self) -> usize {
        self.data().len()
    }

    pub fn data(&self) -> &[u8] {
        match &self.data {
            ChunkData::Pooled { buffer, .. } => buffer.as_slice(),
            ChunkData::View { buffer, range } => &buffer[range.clone()],
        }
    }
}

impl Deref for DataChunk {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.data()
    }
}

impl AsRef<[u8]> for DataChunk {
    fn as_ref(&self) -> &[u8] {
        self.data()
    }
}

impl Drop for DataChunk {
    fn drop(&mut self) {
        if let ChunkData::Pooled { buffer, pool } = &mut self.data {
            pool.recycle(mem::take(buffer));
        }
    }
}

impl fmt::Debug for DataChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.data {
            ChunkData::Pooled { .. } => "pooled",
            ChunkData::View { .. } => "view",
        };
        f.debug_struct("DataChunk")
            .field("size", &self.size())
            .field("kind", &kind)
            .finish()
    }
}
