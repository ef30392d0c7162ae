use std::io::{Cursor, Read, Write};

use crate::container::read_chunk;
use crate::error::{HuffmanError, Result};
use crate::hufftree::{HuffNode, HuffmanTree, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpackSummary {
    pub decoded_len: u64,
    pub payload_len: u64,
}

/// Root-to-leaf walk that survives chunk boundaries.
///
/// `current` is the node reached by the bits consumed so far; it is back at
/// the root whenever no code is half read.
#[derive(Debug)]
pub struct TreeWalker<'t> {
    tree: &'t HuffmanTree,
    current: NodeId,
    decoded: u64,
}

impl<'t> TreeWalker<'t> {
    pub fn new(tree: &'t HuffmanTree) -> Self {
        TreeWalker {
            tree,
            current: tree.root(),
            decoded: 0,
        }
    }

    pub fn decoded(&self) -> u64 {
        self.decoded
    }

    /// Consumes the top `count` bits of `byte`, appending every completed
    /// symbol to `out`.
    pub fn feed(&mut self, byte: u8, count: u32, out: &mut Vec<u8>) -> Result<()> {
        for i in 0..count {
            let bit = byte & (0x80 >> i) != 0;
            let HuffNode::Internal { left, right, .. } = *self.tree.node(self.current) else {
                return Err(HuffmanError::payload(
                    "bit left over with no branch to take",
                ));
            };
            self.current = if bit { right } else { left };

            if let HuffNode::Leaf { byte: symbol, .. } = *self.tree.node(self.current) {
                out.push(symbol);
                self.decoded += 1;
                self.current = self.tree.root();
            }
        }
        Ok(())
    }

    /// Fails if the bits ran out halfway down the tree.
    pub fn finish(self) -> Result<u64> {
        if self.current != self.tree.root() {
            return Err(HuffmanError::payload(
                "payload ends in the middle of a code",
            ));
        }
        Ok(self.decoded)
    }
}

/// Decodes a packed payload read from `reader` into `writer`.
///
/// The last byte read is always held back until the source is exhausted,
/// so the trailing `padding` bits can be dropped without knowing the payload
/// length in advance.
pub fn unpack_stream<R: Read, W: Write>(
    reader: &mut R,
    padding: u8,
    tree: &HuffmanTree,
    mut writer: W,
    chunk_size: usize,
) -> Result<UnpackSummary> {
    if padding >= 8 {
        return Err(HuffmanError::payload(format!(
            "padding of {} bits is not below 8",
            padding
        )));
    }

    let mut buf = vec![0u8; chunk_size.max(1)];

    if tree.is_single_leaf() {
        return unpack_single_leaf(reader, padding, tree, writer, &mut buf);
    }

    let mut walker = TreeWalker::new(tree);
    let mut out = Vec::with_capacity(buf.len() * 2);
    let mut held: Option<u8> = None;
    let mut payload_len = 0u64;

    loop {
        let n = read_chunk(reader, &mut buf)?;
        if n == 0 {
            break;
        }
        payload_len += n as u64;
        for &byte in &buf[..n] {
            if let Some(prev) = held.replace(byte) {
                walker.feed(prev, 8, &mut out)?;
            }
        }
        writer.write_all(&out)?;
        out.clear();
    }

    match held {
        Some(last) => walker.feed(last, 8 - u32::from(padding), &mut out)?,
        None if padding > 0 => {
            return Err(HuffmanError::payload("padding declared for an empty payload"))
        }
        None => {}
    }
    writer.write_all(&out)?;
    writer.flush()?;

    let decoded_len = walker.finish()?;
    if decoded_len != tree.weight() {
        return Err(HuffmanError::payload(format!(
            "decoded {} symbols, tree accounts for {}",
            decoded_len,
            tree.weight()
        )));
    }

    Ok(UnpackSummary {
        decoded_len,
        payload_len,
    })
}

/// A leaf root spends no bits per symbol: the count comes from its weight.
fn unpack_single_leaf<R: Read, W: Write>(
    reader: &mut R,
    padding: u8,
    tree: &HuffmanTree,
    mut writer: W,
    buf: &mut [u8],
) -> Result<UnpackSummary> {
    let HuffNode::Leaf { byte, weight } = *tree.node(tree.root()) else {
        return Err(HuffmanError::payload("expected a leaf at the root"));
    };
    if padding != 0 || read_chunk(reader, buf)? != 0 {
        return Err(HuffmanError::payload(
            "single-symbol tree carries no payload bits",
        ));
    }

    buf.fill(byte);
    let mut remaining = weight;
    while remaining > 0 {
        let n = remaining.min(buf.len() as u64) as usize;
        writer.write_all(&buf[..n])?;
        remaining -= n as u64;
    }
    writer.flush()?;

    Ok(UnpackSummary {
        decoded_len: weight,
        payload_len: 0,
    })
}

/// In-memory variant of [`unpack_stream`].
pub fn unpack(payload: &[u8], padding: u8, tree: &HuffmanTree) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    unpack_stream(
        &mut Cursor::new(payload),
        padding,
        tree,
        &mut out,
        payload.len().max(1),
    )?;
    Ok(out)
}
