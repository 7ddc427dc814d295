//! Modules used for compressing data into the archive format.
pub mod bit_writer;
mod archive_compressor;
pub use archive_compressor::*;
