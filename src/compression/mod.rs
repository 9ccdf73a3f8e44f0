use crate::errors::CodecError;

pub mod deflate;

pub use deflate::Deflate;

pub trait Compressor {
    /// Compress all of `src` into `dst`, returning the compressed size
    fn compress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError>;
}

pub trait Decompressor {
    /// Decompress all of `src` into `dst`, returning the decompressed size
    fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError>;
}

impl<C: Compressor + ?Sized> Compressor for &mut C {
    fn compress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
        (**self).compress(src, dst)
    }
}

impl<D: Decompressor + ?Sized> Decompressor for &mut D {
    fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
        (**self).decompress(src, dst)
    }
}
