use std::fmt;

use crate::frequency::FrequencyTable;
use crate::hufftree::{HuffNode, HuffmanTree};

/// A variable-length code, bits packed MSB-first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Code {
    packed: Vec<u8>,
    len: usize,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// The empty code, assigned to the only symbol of a one-symbol input.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, bit: bool) {
        let offset = self.len % 8;
        if offset == 0 {
            self.packed.push(0);
        }
        if bit {
            if let Some(last) = self.packed.last_mut() {
                *last |= 1 << (7 - offset);
            }
        }
        self.len += 1;
    }

    pub fn bit(&self, i: usize) -> bool {
        self.packed[i / 8] & (1 << (7 - i % 8)) != 0
    }

    pub fn iter_bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bit(i))
    }

    /// The code split into `(bits, count)` groups of at most eight bits,
    /// right-aligned in each byte.
    pub(crate) fn groups(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        let full = self.len / 8;
        let tail = (self.len % 8) as u32;
        self.packed.iter().enumerate().filter_map(move |(i, &byte)| {
            if i < full {
                Some((byte, 8))
            } else if tail > 0 {
                Some((byte >> (8 - tail), tail))
            } else {
                None
            }
        })
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && (0..self.len).all(|i| self.bit(i) == other.bit(i))
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter_bits() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl From<&str> for Code {
    fn from(bits: &str) -> Self {
        let mut code = Code::new();
        for ch in bits.chars() {
            code.push(ch == '1');
        }
        code
    }
}

/// Byte to code mapping derived from a tree's leaf paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Option<Code>>,
}

impl CodeTable {
    /// Walks the tree appending `0` on every left step and `1` on every right
    /// step. A leaf root gets the empty code.
    pub fn generate(tree: &HuffmanTree) -> Self {
        let mut codes = vec![None; 256];
        let mut stack = vec![(tree.root(), Code::new())];
        while let Some((id, code)) = stack.pop() {
            match *tree.node(id) {
                HuffNode::Leaf { byte, .. } => {
                    codes[byte as usize] = Some(code);
                }
                HuffNode::Internal { left, right, .. } => {
                    let mut right_code = code.clone();
                    right_code.push(true);
                    stack.push((right, right_code));

                    let mut left_code = code;
                    left_code.push(false);
                    stack.push((left, left_code));
                }
            }
        }
        CodeTable { codes }
    }

    pub fn get(&self, byte: u8) -> Option<&Code> {
        self.codes[byte as usize].as_ref()
    }

    /// Number of bytes that have a code.
    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(byte, code)` pairs in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(byte, code)| code.as_ref().map(|c| (byte as u8, c)))
    }

    /// Payload size in bits for data with these frequencies, or `None` when a
    /// counted byte has no code.
    pub fn encoded_bits(&self, frequencies: &FrequencyTable) -> Option<u64> {
        frequencies.iter().try_fold(0u64, |acc, (byte, count)| {
            self.get(byte).map(|code| acc + count * code.len() as u64)
        })
    }
}

impl HuffmanTree {
    pub fn generate_table(&self) -> CodeTable {
        CodeTable::generate(self)
    }
}
