//! A Huffman coding archiver.
//!
//! Data is compressed by counting how often every byte occurs, building a prefix-code
//! tree from those counts and writing each byte as its code. The archive carries the
//! tree shape in front of the payload, so it can be decoded without any side channel.
//!
//! ```
//! let (archive, stats) = huffarc::compress_to_vec(b"abracadabra").unwrap();
//! assert_eq!(stats.archive_bytes(), archive.len() as u64);
//!
//! let (data, _) = huffarc::decompress_to_vec(&archive).unwrap();
//! assert_eq!(data, b"abracadabra");
//! ```
#![deny(trivial_casts, trivial_numeric_casts, rust_2018_idioms)]

pub mod archive;
pub mod decoding;
pub mod encoding;
pub mod errors;
pub mod frequency;
pub mod huffman;

pub use archive::{compress, compress_to_vec, decompress, decompress_to_vec, ArchiveStats};
pub use decoding::ArchiveDecompressor;
pub use encoding::ArchiveCompressor;
pub use errors::{ArchiveError, ErrorKind};
