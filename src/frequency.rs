//! Contains [FrequencyTable], the per-symbol occurrence counts a
//! [CodeTree](crate::huffman::CodeTree) is built from.

/// Counts how often every byte value occurs in some data.
///
/// Iteration always runs in ascending symbol order. That order doubles as the
/// insertion order when building a tree, which is what makes ties between equally
/// frequent symbols resolve the same way every time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    /// Index is the symbol
    counts: [u64; 256],
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyTable {
    pub fn new() -> Self {
        FrequencyTable { counts: [0; 256] }
    }

    /// Count every byte of `data`.
    pub fn count(data: &[u8]) -> Self {
        let mut table = Self::new();
        table.add(data);
        table
    }

    /// Add the bytes of `data` on top of what was already counted.
    pub fn add(&mut self, data: &[u8]) {
        for &symbol in data {
            self.counts[usize::from(symbol)] += 1;
        }
    }

    pub fn frequency(&self, symbol: u8) -> u64 {
        self.counts[usize::from(symbol)]
    }

    /// Number of symbols that occurred at least once
    pub fn distinct_symbols(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    /// Sum of all counts, the length of the counted data
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.distinct_symbols() == 0
    }

    /// Symbols with a non zero count together with that count, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }
}
