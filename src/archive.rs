//! The archive layout and the one-call entry points for compressing and decompressing.
//!
//! An archive is laid out as follows, without a magic number or version field:
//!
//! | Offset | Field        | Encoding                                                 |
//! |--------|--------------|----------------------------------------------------------|
//! | 0      | symbol count | `u64`, little endian                                     |
//! | 8      | tree shape   | preorder bits, see [CodeTree::serialize](crate::huffman::CodeTree::serialize), padded to a byte |
//! | next   | payload      | concatenated symbol codes, padded to a byte              |
//!
//! Padding bits are always `1`. Neither the tree nor the payload carry a byte length,
//! the tree ends where its recursive structure ends and the payload ends after
//! `symbol count` decoded symbols.

use std::fmt;
use std::io::{self, Read, Write};

use crate::decoding::ArchiveDecompressor;
use crate::encoding::ArchiveCompressor;
use crate::errors::ArchiveError;

/// Size of the symbol count at the start of every archive
pub const HEADER_SIZE: usize = 8;

/// Value of the bits that fill up the last byte of the tree and of the payload
pub const PADDING_BIT: bool = true;

/// The fixed size header at the start of an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    /// How many symbols the payload decodes to, which is the length of the original data
    pub symbol_count: u64,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ArchiveHeaderError {
    #[error("Archive ended before its {HEADER_SIZE} byte header was complete")]
    NotEnoughBytes,
    #[error("Error while reading the archive header: {0}")]
    ReadError(#[source] io::Error),
}

impl ArchiveHeader {
    pub fn serialize(&self) -> [u8; HEADER_SIZE] {
        self.symbol_count.to_le_bytes()
    }

    /// Read exactly [HEADER_SIZE] bytes from `source`.
    pub fn read(source: &mut impl Read) -> Result<ArchiveHeader, ArchiveHeaderError> {
        let mut buf = [0u8; HEADER_SIZE];
        source.read_exact(&mut buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => ArchiveHeaderError::NotEnoughBytes,
            _ => ArchiveHeaderError::ReadError(e),
        })?;
        Ok(ArchiveHeader {
            symbol_count: u64::from_le_bytes(buf),
        })
    }
}

/// Sizes reported by a finished compression or decompression.
///
/// Decompressing an archive reports exactly the values that compressing the original
/// data reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArchiveStats {
    /// Number of bytes in the original data, which is the number of symbols in the payload
    pub symbol_count: u64,
    /// Bytes taken up by the encoded payload, padding included
    pub payload_bytes: u64,
    /// Bytes taken up by the header and the serialized tree
    pub header_and_tree_bytes: u64,
}

impl ArchiveStats {
    /// Total archive size in bytes
    pub fn archive_bytes(&self) -> u64 {
        self.header_and_tree_bytes + self.payload_bytes
    }
}

/// One value per line: symbol count, payload bytes, header and tree bytes
impl fmt::Display for ArchiveStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.symbol_count)?;
        writeln!(f, "{}", self.payload_bytes)?;
        write!(f, "{}", self.header_and_tree_bytes)
    }
}

/// Compress everything `source` yields into `drain`.
pub fn compress<R: Read, W: Write>(source: R, drain: W) -> Result<ArchiveStats, ArchiveError> {
    let mut compressor = ArchiveCompressor::new();
    compressor.set_source(source);
    compressor.set_drain(drain);
    compressor.compress()
}

/// Decompress the archive read from `source` into `drain`.
pub fn decompress<R: Read, W: Write>(source: R, drain: W) -> Result<ArchiveStats, ArchiveError> {
    let mut decompressor = ArchiveDecompressor::new();
    decompressor.set_source(source);
    decompressor.set_drain(drain);
    decompressor.decompress()
}

/// Compress `data` into a freshly allocated archive.
///
/// Room for the header and about as many bytes as `data` is reserved up front, an
/// allocation failure there is reported instead of aborting.
pub fn compress_to_vec(data: &[u8]) -> Result<(Vec<u8>, ArchiveStats), ArchiveError> {
    let needed = HEADER_SIZE + data.len();
    let mut output = Vec::new();
    output
        .try_reserve(needed)
        .map_err(|source| ArchiveError::AllocationFailure {
            needed: needed as u64,
            source,
        })?;
    let stats = compress(data, &mut output)?;
    Ok((output, stats))
}

pub fn decompress_to_vec(archive: &[u8]) -> Result<(Vec<u8>, ArchiveStats), ArchiveError> {
    let mut output = Vec::new();
    let stats = decompress(archive, &mut output)?;
    Ok((output, stats))
}

/// Compress and decompress `data`, panicking if anything about the round trip is off.
#[cfg(any(test, feature = "fuzz_exports"))]
pub fn round_trip(data: &[u8]) {
    let (archive, compressed) = compress_to_vec(data).unwrap();
    let (decoded, decompressed) = decompress_to_vec(&archive).unwrap();
    assert_eq!(decoded.as_slice(), data);
    assert_eq!(compressed, decompressed);
    assert_eq!(compressed.archive_bytes(), archive.len() as u64);
}
