use crate::config::CompressionLevel;
use crate::errors::CodecError;
use flate2::{FlushCompress, FlushDecompress};

/// Raw deflate: no zlib or gzip framing, the container provides its own
#[derive(Debug)]
pub struct Deflate {
    level: CompressionLevel,
    decompressor: flate2::Decompress,
    compressor: flate2::Compress,
}

impl Default for Deflate {
    fn default() -> Self {
        Self::new(CompressionLevel::default())
    }
}

impl Deflate {
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            level,
            decompressor: flate2::Decompress::new(false),
            compressor: flate2::Compress::new(level.to_flate2(), false),
        }
    }

    fn decompressor(&mut self) -> &mut flate2::Decompress {
        let decompressor = &mut self.decompressor;
        decompressor.reset(false);
        decompressor
    }

    fn compressor(&mut self) -> &mut flate2::Compress {
        let compressor = &mut self.compressor;
        compressor.reset();
        compressor
    }

    pub fn level(&self) -> CompressionLevel {
        self.level
    }
}

impl super::Compressor for Deflate {
    fn compress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
        let compressor = self.compressor();
        loop {
            let in_offset = min_mem(compressor.total_in(), src.len());
            let input = &src[in_offset..];

            let out_offset = min_mem(compressor.total_out(), dst.len());
            let output = &mut dst[out_offset..];

            let status = compressor.compress(input, output, FlushCompress::Finish)?;
            match status {
                flate2::Status::StreamEnd => break,
                _ if compressor.total_out() as usize >= dst.len() => {
                    return Err(CodecError::OutputTooSmall {
                        capacity: dst.len(),
                    })
                }
                flate2::Status::Ok => continue,
                flate2::Status::BufError => return Err(CodecError::Incomplete),
            }
        }
        Ok(compressor.total_out() as usize)
    }
}

impl super::Decompressor for Deflate {
    fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
        let decompressor = self.decompressor();
        loop {
            let in_offset = min_mem(decompressor.total_in(), src.len());
            let input = &src[in_offset..];

            let out_offset = min_mem(decompressor.total_out(), dst.len());
            let output = &mut dst[out_offset..];

            let status = decompressor.decompress(input, output, FlushDecompress::Finish)?;
            match status {
                flate2::Status::StreamEnd => break,
                _ if decompressor.total_out() as usize >= dst.len() => {
                    return Err(CodecError::OutputTooSmall {
                        capacity: dst.len(),
                    })
                }
                _ if decompressor.total_in() as usize >= src.len() => {
                    return Err(CodecError::Incomplete)
                }
                flate2::Status::Ok => continue,
                flate2::Status::BufError => return Err(CodecError::Incomplete),
            }
        }
        Ok(decompressor.total_out() as usize)
    }
}

fn min_mem(file_size: u64, mem_size: usize) -> usize {
    if file_size < mem_size as u64 {
        file_size as usize
    } else {
        mem_size
    }
}
