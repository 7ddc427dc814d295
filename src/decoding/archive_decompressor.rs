//! Reading an archive back into the original data.

use std::io::{BufWriter, Read, Write};

use tracing::debug;

use super::bit_reader::BitReader;
use crate::archive::{ArchiveHeader, ArchiveStats, HEADER_SIZE};
use crate::errors::ArchiveError;
use crate::huffman::CodeTree;

/// Decodes one archive from a source into a drain.
///
/// # Examples
/// ```
/// use huffarc::decoding::ArchiveDecompressor;
/// let (archive, _) = huffarc::compress_to_vec(b"abracadabra").unwrap();
///
/// let mut output: Vec<u8> = Vec::new();
/// let mut decompressor = ArchiveDecompressor::new();
/// decompressor.set_source(archive.as_slice());
/// decompressor.set_drain(&mut output);
/// decompressor.decompress().unwrap();
/// assert_eq!(output, b"abracadabra");
/// ```
pub struct ArchiveDecompressor<R: Read, W: Write> {
    compressed_data: Option<R>,
    decompressed_data: Option<W>,
}

impl<R: Read, W: Write> Default for ArchiveDecompressor<R, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Read, W: Write> ArchiveDecompressor<R, W> {
    pub fn new() -> Self {
        Self {
            compressed_data: None,
            decompressed_data: None,
        }
    }

    /// Before calling [ArchiveDecompressor::decompress] you need to set the source
    pub fn set_source(&mut self, compressed_data: R) -> Option<R> {
        self.compressed_data.replace(compressed_data)
    }

    /// Before calling [ArchiveDecompressor::decompress] you need to set the drain
    pub fn set_drain(&mut self, decompressed_data: W) -> Option<W> {
        self.decompressed_data.replace(decompressed_data)
    }

    pub fn take_drain(&mut self) -> Option<W> {
        self.decompressed_data.take()
    }

    /// Read the header and the tree, then decode exactly as many symbols as the header
    /// announces.
    ///
    /// The source is pulled one byte at a time and nothing after the payload is consumed,
    /// so whatever follows the archive is still there for the caller to read. Wrap sources
    /// like a `File` in a `BufReader` yourself.
    ///
    /// A payload that ends early or walks the tree into a child that doesn't exist fails
    /// with a format error.
    pub fn decompress(&mut self) -> Result<ArchiveStats, ArchiveError> {
        let source = self
            .compressed_data
            .as_mut()
            .ok_or(ArchiveError::MissingSource)?;
        let drain = self
            .decompressed_data
            .as_mut()
            .ok_or(ArchiveError::MissingDrain)?;

        let header = ArchiveHeader::read(&mut *source)?;

        let mut reader = BitReader::new(source);
        let tree = CodeTree::deserialize(&mut reader)?;
        reader.align_to_byte();
        let header_and_tree_bytes = HEADER_SIZE as u64 + reader.bytes_read();

        if header.symbol_count > 0 && tree.leaf_count() == 0 {
            return Err(ArchiveError::EmptyTree {
                symbol_count: header.symbol_count,
            });
        }

        reader.reset_counter();
        let mut output = BufWriter::new(drain);
        for _ in 0..header.symbol_count {
            let symbol = tree.decode_symbol(&mut reader)?;
            output
                .write_all(&[symbol])
                .map_err(ArchiveError::WriteDrainError)?;
        }
        output.flush().map_err(ArchiveError::WriteDrainError)?;
        let payload_bytes = reader.bytes_read();

        let stats = ArchiveStats {
            symbol_count: header.symbol_count,
            payload_bytes,
            header_and_tree_bytes,
        };
        debug!(
            "decompressed {} symbols from {} payload bytes behind {} bytes of header and tree",
            stats.symbol_count, stats.payload_bytes, stats.header_and_tree_bytes
        );
        Ok(stats)
    }
}
