use std::io::{self, Read};

/// Reads single bits from a byte oriented source, most significant bit first.
///
/// A new byte is only pulled from the source once all eight bits of the previous one
/// were handed out, so the reader never consumes more of the source than needed.
pub struct BitReader<R: Read> {
    source: R,
    /// The byte bits are currently taken from
    current: u8,
    /// Index of the next bit in `current`. Zero means a fresh byte must be pulled first
    pos: u8,
    /// Bits consumed since the counter was last reset
    bit_count: u64,
    /// Bits consumed over the lifetime of the reader
    total_bits: u64,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GetBitsError {
    #[error("Source ended after {bits_read} bits while another bit was requested")]
    EndOfStream { bits_read: u64 },
    #[error("Error while reading a byte from the source: {0}")]
    ReadError(#[source] io::Error),
}

impl<R: Read> BitReader<R> {
    pub fn new(source: R) -> BitReader<R> {
        BitReader {
            source,
            current: 0,
            pos: 0,
            bit_count: 0,
            total_bits: 0,
        }
    }

    pub fn get_bit(&mut self) -> Result<bool, GetBitsError> {
        if self.pos == 0 {
            self.current = self.pull_byte()?;
        }
        let bit = (self.current >> (7 - self.pos)) & 1 == 1;
        self.pos = (self.pos + 1) % 8;
        self.bit_count += 1;
        self.total_bits += 1;
        Ok(bit)
    }

    /// Read eight bits and assemble them into a byte, first bit read is the highest.
    pub fn read_char(&mut self) -> Result<u8, GetBitsError> {
        let mut byte = 0;
        for _ in 0..8 {
            byte = (byte << 1) | u8::from(self.get_bit()?);
        }
        Ok(byte)
    }

    /// Skip whatever is left of the current byte. The skipped bits are counted as read.
    pub fn align_to_byte(&mut self) {
        if self.pos != 0 {
            let skipped = u64::from(8 - self.pos);
            self.bit_count += skipped;
            self.total_bits += skipped;
            self.pos = 0;
        }
    }

    pub fn bits_read(&self) -> u64 {
        self.bit_count
    }

    /// Number of bytes touched since the last counter reset, a partially read byte counts as one.
    pub fn bytes_read(&self) -> u64 {
        self.bit_count.div_ceil(8)
    }

    pub fn reset_counter(&mut self) {
        self.bit_count = 0;
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    fn pull_byte(&mut self) -> Result<u8, GetBitsError> {
        let mut buf = [0u8; 1];
        loop {
            match self.source.read(&mut buf) {
                Ok(0) => {
                    return Err(GetBitsError::EndOfStream {
                        bits_read: self.total_bits,
                    })
                }
                Ok(_) => return Ok(buf[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(GetBitsError::ReadError(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BitReader, GetBitsError};

    #[test]
    fn bits_come_out_high_to_low() {
        let source: &[u8] = &[0b1010_0011];
        let mut br = BitReader::new(source);
        let mut bits = Vec::new();
        for _ in 0..8 {
            bits.push(br.get_bit().unwrap());
        }
        assert_eq!(
            bits,
            vec![true, false, true, false, false, false, true, true]
        );
    }

    #[test]
    fn read_char_across_boundary() {
        let source: &[u8] = &[0b1011_1001, 0b0100_0000];
        let mut br = BitReader::new(source);
        assert!(br.get_bit().unwrap());
        assert!(!br.get_bit().unwrap());
        assert!(br.get_bit().unwrap());
        assert_eq!(br.read_char().unwrap(), 0b1100_1010);
        assert_eq!(br.bits_read(), 11);
        assert_eq!(br.bytes_read(), 2);
    }

    #[test]
    fn bytes_are_pulled_lazily() {
        let source: &[u8] = &[0xFF, 0x00];
        let mut br = BitReader::new(source);
        br.get_bit().unwrap();
        let rest = br.into_inner();
        // Only the first byte was taken from the source
        assert_eq!(rest, &[0x00]);
    }

    #[test]
    fn align_skips_rest_of_byte() {
        let source: &[u8] = &[0b1000_0000, 0x5A];
        let mut br = BitReader::new(source);
        assert!(br.get_bit().unwrap());
        br.align_to_byte();
        assert_eq!(br.bits_read(), 8);
        assert_eq!(br.read_char().unwrap(), 0x5A);

        // Aligning an aligned reader does nothing
        br.align_to_byte();
        assert_eq!(br.bits_read(), 16);
    }

    #[test]
    fn counter_reset() {
        let source: &[u8] = &[0xAA, 0xBB];
        let mut br = BitReader::new(source);
        br.read_char().unwrap();
        br.reset_counter();
        assert_eq!(br.bits_read(), 0);
        assert_eq!(br.bytes_read(), 0);
        br.get_bit().unwrap();
        assert_eq!(br.bytes_read(), 1);
    }

    #[test]
    fn end_of_stream() {
        let source: &[u8] = &[0x01];
        let mut br = BitReader::new(source);
        assert_eq!(br.read_char().unwrap(), 0x01);
        match br.get_bit() {
            Err(GetBitsError::EndOfStream { bits_read }) => assert_eq!(bits_read, 8),
            other => panic!("Expected end of stream, got: {other:?}"),
        }
    }
}
