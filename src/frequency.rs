use std::io::Read;

use crate::container::read_chunk;
use crate::error::Result;

/// Byte counts gathered in a single pass over the input.
///
/// Besides the counts, the table remembers the order in which each distinct
/// byte was first seen. The tree builder seeds its heap in that order, which
/// is what makes the resulting tree reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
    first_seen: Vec<u8>,
    total: u64,
}

impl FrequencyTable {
    pub fn new() -> Self {
        FrequencyTable {
            counts: [0; 256],
            first_seen: Vec::new(),
            total: 0,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut table = FrequencyTable::new();
        table.record(bytes);
        table
    }

    /// Folds a chunk of input into the counts.
    pub fn record(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            self.add(byte, 1);
        }
    }

    /// Adds `count` occurrences of `byte`.
    pub fn add(&mut self, byte: u8, count: u64) {
        if count == 0 {
            return;
        }
        let slot = &mut self.counts[byte as usize];
        if *slot == 0 {
            self.first_seen.push(byte);
        }
        *slot += count;
        self.total += count;
    }

    pub fn get(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct bytes seen.
    pub fn distinct(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// `(byte, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.first_seen
            .iter()
            .map(move |&byte| (byte, self.counts[byte as usize]))
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Drains `reader` in chunks of at most `chunk_size` bytes and counts every
/// byte it yields.
pub fn count_frequencies<R: Read>(reader: &mut R, chunk_size: usize) -> Result<FrequencyTable> {
    let mut table = FrequencyTable::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = read_chunk(reader, &mut buf)?;
        if n == 0 {
            break;
        }
        table.record(&buf[..n]);
    }
    Ok(table)
}
