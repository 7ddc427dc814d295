//! Errors surfaced by the archive level operations.
use std::collections::TryReserveError;
use std::io;

use crate::archive::ArchiveHeaderError;
use crate::decoding::bit_reader::GetBitsError;
use crate::encoding::bit_writer::BitWriterError;
use crate::huffman::{CodeTreeError, HuffmanDecoderError};

/// The broad class an error falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input or output could not be opened, read or written
    Resource,
    /// Memory ran out while building the code tree or buffering data
    AllocationFailure,
    /// The archive contents disagree with themselves, usually a corrupted or truncated file
    Format,
    /// A malformed invocation, only produced by front ends such as the command line
    InvalidArguments,
}

impl ErrorKind {
    /// Process exit code for this kind of failure, following the BSD `sysexits.h` values.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidArguments => 64,
            ErrorKind::Format => 65,
            ErrorKind::AllocationFailure => 71,
            ErrorKind::Resource => 74,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ArchiveError {
    #[error("No source was set before the operation started")]
    MissingSource,
    #[error("No drain was set before the operation started")]
    MissingDrain,
    #[error("Error while reading the source: {0}")]
    ReadSourceError(#[source] io::Error),
    #[error("Error while writing to the drain: {0}")]
    WriteDrainError(#[source] io::Error),
    #[error("Ran out of memory while reserving space for {needed} bytes")]
    AllocationFailure {
        needed: u64,
        #[source]
        source: TryReserveError,
    },
    #[error(transparent)]
    BitWriterError(#[from] BitWriterError),
    #[error(transparent)]
    CodeTreeError(#[from] CodeTreeError),
    #[error(transparent)]
    HuffmanDecoderError(#[from] HuffmanDecoderError),
    #[error(transparent)]
    ArchiveHeaderError(#[from] ArchiveHeaderError),
    #[error("Archive announces {symbol_count} symbols but its code tree has no leaves")]
    EmptyTree { symbol_count: u64 },
}

impl ArchiveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArchiveError::MissingSource
            | ArchiveError::MissingDrain
            | ArchiveError::ReadSourceError(_)
            | ArchiveError::WriteDrainError(_)
            | ArchiveError::BitWriterError(_) => ErrorKind::Resource,
            ArchiveError::AllocationFailure { .. } => ErrorKind::AllocationFailure,
            ArchiveError::CodeTreeError(e) => match e {
                CodeTreeError::AllocationFailure(_) => ErrorKind::AllocationFailure,
                CodeTreeError::BitWriterError(_) => ErrorKind::Resource,
                CodeTreeError::GetBitsError(e) => bits_error_kind(e),
                _ => ErrorKind::Format,
            },
            ArchiveError::HuffmanDecoderError(e) => match e {
                HuffmanDecoderError::GetBitsError(e) => bits_error_kind(e),
                _ => ErrorKind::Format,
            },
            ArchiveError::ArchiveHeaderError(e) => match e {
                ArchiveHeaderError::ReadError(_) => ErrorKind::Resource,
                _ => ErrorKind::Format,
            },
            ArchiveError::EmptyTree { .. } => ErrorKind::Format,
        }
    }
}

fn bits_error_kind(error: &GetBitsError) -> ErrorKind {
    match error {
        GetBitsError::ReadError(_) => ErrorKind::Resource,
        _ => ErrorKind::Format,
    }
}
