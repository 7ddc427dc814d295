//! Utilities and interfaces for compressing data into a complete archive.

use std::io::{BufWriter, Read, Write};

use tracing::debug;

use super::bit_writer::BitWriter;
use crate::archive::{ArchiveHeader, ArchiveStats, HEADER_SIZE, PADDING_BIT};
use crate::errors::ArchiveError;
use crate::frequency::FrequencyTable;
use crate::huffman::CodeTree;

/// An interface for compressing arbitrary data into a Huffman coded archive.
///
/// `ArchiveCompressor` will generally be used by:
/// 1. Initializing a compressor with `ArchiveCompressor::new()`
/// 2. Providing the data with `set_source` and the output with `set_drain`
/// 3. Running `compress`, which reports the sizes of the archive sections
///
/// # Examples
/// ```
/// use huffarc::encoding::ArchiveCompressor;
/// let mock_data: &[_] = b"abracadabra";
/// let mut output: Vec<u8> = Vec::new();
/// let mut compressor = ArchiveCompressor::new();
/// compressor.set_source(mock_data);
/// compressor.set_drain(&mut output);
///
/// let stats = compressor.compress().unwrap();
/// assert_eq!(stats.symbol_count, 11);
/// ```
pub struct ArchiveCompressor<R: Read, W: Write> {
    uncompressed_data: Option<R>,
    compressed_data: Option<W>,
}

impl<R: Read, W: Write> Default for ArchiveCompressor<R, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Read, W: Write> ArchiveCompressor<R, W> {
    pub fn new() -> Self {
        Self {
            uncompressed_data: None,
            compressed_data: None,
        }
    }

    /// Before calling [ArchiveCompressor::compress] you need to set the source
    pub fn set_source(&mut self, uncompressed_data: R) -> Option<R> {
        self.uncompressed_data.replace(uncompressed_data)
    }

    /// Before calling [ArchiveCompressor::compress] you need to set the drain
    pub fn set_drain(&mut self, compressed_data: W) -> Option<W> {
        self.compressed_data.replace(compressed_data)
    }

    /// Hand back the drain, e.g. to inspect an in memory archive
    pub fn take_drain(&mut self) -> Option<W> {
        self.compressed_data.take()
    }

    /// Read the source until it is exhausted and write one archive to the drain.
    ///
    /// The source is read completely before anything is written, since the code tree
    /// depends on the frequencies of all bytes. Encoding then runs over the buffered data.
    pub fn compress(&mut self) -> Result<ArchiveStats, ArchiveError> {
        let source = self
            .uncompressed_data
            .as_mut()
            .ok_or(ArchiveError::MissingSource)?;
        let drain = self
            .compressed_data
            .as_mut()
            .ok_or(ArchiveError::MissingDrain)?;

        let mut input = Vec::new();
        source
            .read_to_end(&mut input)
            .map_err(ArchiveError::ReadSourceError)?;

        let frequencies = FrequencyTable::count(&input);
        let tree = CodeTree::build(&frequencies)?;

        let header = ArchiveHeader {
            symbol_count: input.len() as u64,
        };
        let mut buffered = BufWriter::new(drain);
        buffered
            .write_all(&header.serialize())
            .map_err(ArchiveError::WriteDrainError)?;

        let mut writer = BitWriter::new(buffered);
        tree.serialize(&mut writer)?;
        writer.pad_to_byte(PADDING_BIT)?;
        let header_and_tree_bytes = HEADER_SIZE as u64 + writer.bytes_written();

        writer.reset_counter();
        tree.encode(&input, &mut writer)?;
        writer.pad_to_byte(PADDING_BIT)?;
        let payload_bytes = writer.bytes_written();

        writer
            .into_inner()?
            .flush()
            .map_err(ArchiveError::WriteDrainError)?;

        let stats = ArchiveStats {
            symbol_count: header.symbol_count,
            payload_bytes,
            header_and_tree_bytes,
        };
        debug!(
            "compressed {} bytes into {} payload bytes behind {} bytes of header and tree",
            stats.symbol_count, stats.payload_bytes, stats.header_and_tree_bytes
        );
        Ok(stats)
    }
}
