use std::io::{self, Write};

use crate::huffman::Code;

/// An interface for writing single bits into a byte oriented drain.
///
/// Bits are packed *most significant bit first*: the first bit added ends up in
/// the highest position of the first byte. Every time a byte fills up it is handed
/// to the drain, so the drain should be buffered if it is backed by a file.
pub struct BitWriter<W: Write> {
    drain: W,
    /// The byte that is currently being filled
    current: u8,
    /// Index of the next unoccupied bit in `current`, counted from the most significant bit
    pos: u8,
    /// Bits added since the counter was last reset, padding included
    bit_count: u64,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BitWriterError {
    #[error("Error while writing a byte to the drain: {0}")]
    WriteError(#[from] io::Error),
    #[error("Writer still holds {pending_bits} bits that don't fill a byte. Pad the stream before finishing it")]
    NotByteAligned { pending_bits: u8 },
}

impl<W: Write> BitWriter<W> {
    /// Initialize a new writer. Add bits with [BitWriter::add_bit], pad with
    /// [BitWriter::pad_to_byte] and get the drain back with [BitWriter::into_inner].
    pub fn new(drain: W) -> Self {
        Self {
            drain,
            current: 0,
            pos: 0,
            bit_count: 0,
        }
    }

    /// OR `bit` into the current byte at position `7 - pos`. Once eight bits are
    /// collected the byte is written to the drain and a fresh one is started.
    pub fn add_bit(&mut self, bit: bool) -> Result<(), BitWriterError> {
        self.current |= u8::from(bit) << (7 - self.pos);
        self.pos += 1;
        self.bit_count += 1;
        if self.pos == 8 {
            self.drain.write_all(&[self.current])?;
            self.current = 0;
            self.pos = 0;
        }
        Ok(())
    }

    /// Write all eight bits of `byte`, highest bit first.
    pub fn write_char(&mut self, byte: u8) -> Result<(), BitWriterError> {
        for shift in (0..8).rev() {
            self.add_bit((byte >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    /// Write every bit of a prefix code in path order.
    pub fn write_code(&mut self, code: &Code) -> Result<(), BitWriterError> {
        for &bit in code.bits() {
            self.add_bit(bit)?;
        }
        Ok(())
    }

    /// Fill up the partially written byte with `bit` until the stream is byte aligned.
    /// Does nothing if the stream is already aligned.
    pub fn pad_to_byte(&mut self, bit: bool) -> Result<(), BitWriterError> {
        while self.pos != 0 {
            self.add_bit(bit)?;
        }
        Ok(())
    }

    /// Position of the next bit inside the current byte, 0 means aligned
    pub fn pos(&self) -> u8 {
        self.pos
    }

    pub fn bits_written(&self) -> u64 {
        self.bit_count
    }

    /// Number of bytes touched since the last counter reset, a partially filled byte counts as one.
    pub fn bytes_written(&self) -> u64 {
        self.bit_count.div_ceil(8)
    }

    /// Start counting from zero again. The partially filled byte is kept as is.
    pub fn reset_counter(&mut self) {
        self.bit_count = 0;
    }

    /// Returns the drain that all complete bytes were written to.
    ///
    /// Fails if there are bits left that have not been padded into a full byte,
    /// because those would be lost.
    pub fn into_inner(self) -> Result<W, BitWriterError> {
        if self.pos != 0 {
            return Err(BitWriterError::NotByteAligned {
                pending_bits: self.pos,
            });
        }
        Ok(self.drain)
    }
}

#[cfg(test)]
mod tests {
    use super::{BitWriter, BitWriterError};
    use crate::huffman::Code;

    fn bits(pattern: &str) -> Vec<bool> {
        pattern.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn single_byte_msb_first() {
        let mut bw = BitWriter::new(Vec::new());
        for bit in bits("10110000") {
            bw.add_bit(bit).unwrap();
        }
        assert_eq!(vec![0b1011_0000], bw.into_inner().unwrap());
    }

    #[test]
    fn write_char_is_high_bit_first() {
        let mut bw = BitWriter::new(Vec::new());
        bw.write_char(0x41).unwrap();
        bw.write_char(0xFF).unwrap();
        bw.write_char(0x00).unwrap();
        assert_eq!(vec![0x41, 0xFF, 0x00], bw.into_inner().unwrap());
    }

    #[test]
    fn char_crossing_byte_boundary() {
        // 3 bits, then a full byte that straddles into the second output byte
        let mut bw = BitWriter::new(Vec::new());
        for bit in bits("101") {
            bw.add_bit(bit).unwrap();
        }
        bw.write_char(0b1100_1010).unwrap();
        assert_eq!(bw.pos(), 3);
        bw.pad_to_byte(false).unwrap();
        assert_eq!(
            vec![0b1011_1001, 0b0100_0000],
            bw.into_inner().unwrap()
        );
    }

    #[test]
    fn padding_with_ones() {
        let mut bw = BitWriter::new(Vec::new());
        bw.add_bit(false).unwrap();
        bw.add_bit(false).unwrap();
        bw.pad_to_byte(true).unwrap();
        assert_eq!(bw.bits_written(), 8);
        assert_eq!(vec![0b0011_1111], bw.into_inner().unwrap());
    }

    #[test]
    fn padding_aligned_stream_is_a_no_op() {
        let mut bw = BitWriter::new(Vec::new());
        bw.write_char(0xAB).unwrap();
        bw.pad_to_byte(true).unwrap();
        assert_eq!(bw.bits_written(), 8);
        assert_eq!(vec![0xAB], bw.into_inner().unwrap());
    }

    #[test]
    fn counters_round_up_and_reset() {
        let mut bw = BitWriter::new(Vec::new());
        assert_eq!(bw.bytes_written(), 0);
        bw.add_bit(true).unwrap();
        assert_eq!(bw.bits_written(), 1);
        assert_eq!(bw.bytes_written(), 1);
        for _ in 0..8 {
            bw.add_bit(false).unwrap();
        }
        assert_eq!(bw.bits_written(), 9);
        assert_eq!(bw.bytes_written(), 2);

        bw.reset_counter();
        assert_eq!(bw.bits_written(), 0);
        // The byte in progress survives the reset
        assert_eq!(bw.pos(), 1);
        bw.pad_to_byte(true).unwrap();
        assert_eq!(bw.bits_written(), 7);
        assert_eq!(bw.bytes_written(), 1);
        assert_eq!(vec![0b1000_0000, 0b0111_1111], bw.into_inner().unwrap());
    }

    #[test]
    fn write_code_follows_path_order() {
        let mut bw = BitWriter::new(Vec::new());
        let code = Code::from_bits(bits("110"));
        bw.write_code(&code).unwrap();
        bw.write_code(&code).unwrap();
        bw.pad_to_byte(true).unwrap();
        assert_eq!(vec![0b1101_1011], bw.into_inner().unwrap());
    }

    #[test]
    fn catches_unaligned_finish() {
        let mut bw = BitWriter::new(Vec::new());
        bw.add_bit(false).unwrap();
        assert!(matches!(
            bw.into_inner(),
            Err(BitWriterError::NotByteAligned { pending_bits: 1 })
        ));
    }

    #[test]
    fn drain_errors_are_reported() {
        struct Broken;
        impl std::io::Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk on fire"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut bw = BitWriter::new(Broken);
        for _ in 0..7 {
            bw.add_bit(true).unwrap();
        }
        // Only the eighth bit reaches the drain
        assert!(matches!(
            bw.add_bit(true),
            Err(BitWriterError::WriteError(_))
        ));
    }
}
