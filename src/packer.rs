use std::io::{Read, Write};

use crate::code_table::{Code, CodeTable};
use crate::container::read_chunk;
use crate::error::{HuffmanError, Result};

/// What the packer wrote once the last code is flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackSummary {
    /// Zero bits appended to fill the final byte, always below 8.
    pub padding: u8,
    pub payload_len: u64,
    /// Code bits written, padding excluded.
    pub bit_count: u64,
}

/// Appends codes to a byte sink MSB-first.
///
/// Whole bytes are staged in a buffer and handed to the sink once it reaches
/// `flush_at` bytes; at most seven bits are ever held back.
pub struct BitPacker<W: Write> {
    sink: W,
    acc: u16,
    pending: u32,
    staged: Vec<u8>,
    flush_at: usize,
    payload_len: u64,
    bit_count: u64,
}

impl<W: Write> BitPacker<W> {
    pub fn new(sink: W, flush_at: usize) -> Self {
        let flush_at = flush_at.max(1);
        BitPacker {
            sink,
            acc: 0,
            pending: 0,
            staged: Vec::with_capacity(flush_at),
            flush_at,
            payload_len: 0,
            bit_count: 0,
        }
    }

    /// Pushes the low `count` bits of `bits`, highest first. `count` is at
    /// most 8.
    pub fn push_bits(&mut self, bits: u8, count: u32) -> Result<()> {
        debug_assert!(count <= 8);
        if count == 0 {
            return Ok(());
        }
        let mask = ((1u16 << count) - 1) as u8;
        self.acc = (self.acc << count) | u16::from(bits & mask);
        self.pending += count;
        self.bit_count += u64::from(count);

        if self.pending >= 8 {
            self.pending -= 8;
            self.staged.push((self.acc >> self.pending) as u8);
            self.acc &= (1u16 << self.pending) - 1;
            if self.staged.len() >= self.flush_at {
                self.flush()?;
            }
        }
        Ok(())
    }

    pub fn push_code(&mut self, code: &Code) -> Result<()> {
        for (bits, count) in code.groups() {
            self.push_bits(bits, count)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.sink.write_all(&self.staged)?;
        self.payload_len += self.staged.len() as u64;
        self.staged.clear();
        Ok(())
    }

    /// Pads the last partial byte with zero bits and flushes everything.
    pub fn finish(mut self) -> Result<PackSummary> {
        let mut padding = 0;
        if self.pending > 0 {
            padding = 8 - self.pending;
            self.staged.push((self.acc << padding) as u8);
            self.acc = 0;
            self.pending = 0;
        }
        self.flush()?;
        self.sink.flush()?;
        Ok(PackSummary {
            padding: padding as u8,
            payload_len: self.payload_len,
            bit_count: self.bit_count,
        })
    }
}

/// Encodes every byte read from `reader` and writes the packed payload to
/// `writer`, reading at most `chunk_size` bytes at a time.
pub fn pack_stream<R: Read, W: Write>(
    reader: &mut R,
    table: &CodeTable,
    writer: W,
    chunk_size: usize,
) -> Result<PackSummary> {
    let mut packer = BitPacker::new(writer, chunk_size);
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = read_chunk(reader, &mut buf)?;
        if n == 0 {
            break;
        }
        for &byte in &buf[..n] {
            let code = table.get(byte).ok_or(HuffmanError::UnknownSymbol(byte))?;
            packer.push_code(code)?;
        }
    }
    packer.finish()
}

/// In-memory variant of [`pack_stream`]: returns the payload and its padding.
pub fn pack(table: &CodeTable, data: &[u8]) -> Result<(Vec<u8>, u8)> {
    let mut payload = Vec::new();
    let mut packer = BitPacker::new(&mut payload, data.len().max(1));
    for &byte in data {
        let code = table.get(byte).ok_or(HuffmanError::UnknownSymbol(byte))?;
        packer.push_code(code)?;
    }
    let summary = packer.finish()?;
    Ok((payload, summary.padding))
}
