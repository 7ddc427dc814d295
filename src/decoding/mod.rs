//! Modules used for reading archives back: bit level input and the archive decompressor.
pub mod bit_reader;
mod archive_decompressor;
pub use archive_decompressor::*;
