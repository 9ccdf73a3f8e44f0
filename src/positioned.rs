use positioned_io::{RandomAccessFile, ReadAt};
use std::io;
use std::sync::Arc;

/// Positioned reads through a shared reference
pub trait SharedReadAt: Send + Sync {
    fn read_at(&self, buf: &mut [u8], pos: u64) -> io::Result<usize>;
    fn read_exact_at(&self, buf: &mut [u8], pos: u64) -> io::Result<()>;
}

impl SharedReadAt for RandomAccessFile {
    fn read_at(&self, buf: &mut [u8], pos: u64) -> io::Result<usize> {
        ReadAt::read_at(self, pos, buf)
    }

    fn read_exact_at(&self, buf: &mut [u8], pos: u64) -> io::Result<()> {
        ReadAt::read_exact_at(self, pos, buf)
    }
}

impl SharedReadAt for [u8] {
    fn read_at(&self, buf: &mut [u8], pos: u64) -> io::Result<usize> {
        let start = usize::try_from(pos).unwrap_or(usize::MAX).min(self.len());
        let available = &self[start..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        Ok(n)
    }

    fn read_exact_at(&self, buf: &mut [u8], pos: u64) -> io::Result<()> {
        if self.read_at(buf, pos)? == buf.len() {
            Ok(())
        } else {
            Err(io::ErrorKind::UnexpectedEof.into())
        }
    }
}

impl<R: SharedReadAt + ?Sized> SharedReadAt for &R {
    fn read_at(&self, buf: &mut [u8], pos: u64) -> io::Result<usize> {
        SharedReadAt::read_at(*self, buf, pos)
    }

    fn read_exact_at(&self, buf: &mut [u8], pos: u64) -> io::Result<()> {
        SharedReadAt::read_exact_at(*self, buf, pos)
    }
}

impl<R: SharedReadAt + ?Sized> SharedReadAt for Arc<R> {
    fn read_at(&self, buf: &mut [u8], pos: u64) -> io::Result<usize> {
        SharedReadAt::read_at(&**self, buf, pos)
    }

    fn read_exact_at(&self, buf: &mut [u8], pos: u64) -> io::Result<()> {
        SharedReadAt::read_exact_at(&**self, buf, pos)
    }
}

/// Sequential reads starting from a position in a [`SharedReadAt`]
pub struct PositionedReader<R> {
    reader: R,
    position: u64,
}

impl<R: SharedReadAt> PositionedReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_position(reader, 0)
    }

    pub fn with_position(reader: R, position: u64) -> Self {
        Self { reader, position }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn set_position(&mut self, position: u64) {
        self.position = position;
    }
}

impl<R: SharedReadAt> io::Read for PositionedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let position = self.position;
        let res = self.reader.read_at(buf, position)?;
        self.position += res as u64;
        Ok(res)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let position = self.position;
        self.reader.read_exact_at(buf, position)?;
        self.position += buf.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn sequential_reads() {
        let data: &[u8] = b"0123456789";
        let mut reader = PositionedReader::with_position(data, 2);
        let mut buf = [0; 3];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"234");
        assert_eq!(reader.position(), 5);

        reader.set_position(8);
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"89");
    }

    #[test]
    fn read_exact_past_end() {
        let data: &[u8] = b"0123";
        let mut reader = PositionedReader::with_position(data, 2);
        let mut buf = [0; 3];
        let err = reader.read_exact(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(reader.position(), 2);
    }
}
