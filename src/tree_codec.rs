//! Text form of a [`HuffmanTree`], stored in the container header.
//!
//! Nodes are written in preorder (node, left, right) and joined by `,,`.
//! A present node is `<symbol> ##<weight>-<True|False>`, where the flag tells
//! whether the node is a leaf and internal nodes use `None` as their symbol.
//! An absent child is the bare token `None`. For `"hello"`:
//!
//! ```text
//! None ##5-False,,None ##2-False,,o ##1-True,,None,,None,,e ##1-True,,...
//! ```
//!
//! A leaf symbol is always exactly one escaped unit: printable ASCII other
//! than `\` as itself, `\` as `\\`, anything else as `\xHH`. The parser reads
//! that one unit and then insists on ` ##`, so a symbol can never be mistaken
//! for a delimiter, even when it is `,`, `#`, `-`, a space, or `N`.

use std::io::Write;

use crate::error::{HuffmanError, Result};
use crate::hufftree::{HuffNode, HuffmanTree, NodeId};

const SEPARATOR: &[u8] = b",,";
const ABSENT: &[u8] = b"None";
const WEIGHT_MARK: &[u8] = b" ##";

impl HuffmanTree {
    /// Serializes the tree in preorder, absent children included.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() * 16);
        let mut stack = vec![Some(self.root())];
        let mut first = true;

        while let Some(slot) = stack.pop() {
            if !first {
                out.extend_from_slice(SEPARATOR);
            }
            first = false;

            let Some(id) = slot else {
                out.extend_from_slice(ABSENT);
                continue;
            };

            match *self.node(id) {
                HuffNode::Leaf { weight, byte } => {
                    write_symbol(&mut out, byte);
                    write_weight(&mut out, weight, true);
                    stack.push(None);
                    stack.push(None);
                }
                HuffNode::Internal {
                    weight,
                    left,
                    right,
                } => {
                    out.extend_from_slice(ABSENT);
                    write_weight(&mut out, weight, false);
                    stack.push(Some(right));
                    stack.push(Some(left));
                }
            }
        }
        out
    }

    /// Rebuilds a tree from [`serialize`](Self::serialize) output.
    ///
    /// Anything that is not exactly one well-formed tree is rejected with
    /// [`HuffmanError::CorruptHeader`].
    pub fn deserialize(data: &[u8]) -> Result<HuffmanTree> {
        let mut parser = Parser { data, pos: 0 };
        let mut nodes: Vec<HuffNode> = Vec::new();
        let mut seen = [false; 256];
        let mut open: Vec<Frame> = Vec::new();
        let mut root = None;

        loop {
            if parser.pos > 0 {
                parser.expect(SEPARATOR, "missing ',,' between nodes")?;
            }

            let mut finished = match parser.token()? {
                Token::Present(frame) => {
                    open.push(frame);
                    continue;
                }
                Token::Absent => None,
            };

            // hand the finished child to its parent, closing every frame
            // that now has both children
            loop {
                let Some(frame) = open.last_mut() else {
                    match finished {
                        Some(id) => root = Some(id),
                        None => return Err(HuffmanError::header("root node is absent")),
                    }
                    break;
                };
                frame.children.push(finished);
                if frame.children.len() < 2 {
                    break;
                }

                let frame = match open.pop() {
                    Some(frame) => frame,
                    None => break,
                };
                let node = frame.close(&nodes, &mut seen)?;
                finished = Some(nodes.len());
                nodes.push(node);
            }

            if let Some(root) = root {
                if parser.pos != data.len() {
                    return Err(HuffmanError::header(format!(
                        "{} trailing bytes after tree",
                        data.len() - parser.pos
                    )));
                }
                return Ok(HuffmanTree::from_parts(nodes, root));
            }
        }
    }
}

fn write_symbol(out: &mut Vec<u8>, byte: u8) {
    match byte {
        b'\\' => out.extend_from_slice(b"\\\\"),
        0x20..=0x7e => out.push(byte),
        _ => {
            // writing into a Vec cannot fail
            let _ = write!(out, "\\x{:02x}", byte);
        }
    }
}

fn write_weight(out: &mut Vec<u8>, weight: u64, is_leaf: bool) {
    out.extend_from_slice(WEIGHT_MARK);
    let _ = write!(out, "{}-{}", weight, if is_leaf { "True" } else { "False" });
}

/// A present node whose children are still being read.
struct Frame {
    byte: Option<u8>,
    weight: u64,
    is_leaf: bool,
    children: Vec<Option<NodeId>>,
}

impl Frame {
    fn close(self, nodes: &[HuffNode], seen: &mut [bool; 256]) -> Result<HuffNode> {
        match (self.byte, self.children[0], self.children[1]) {
            (Some(byte), None, None) => {
                if !self.is_leaf {
                    return Err(HuffmanError::header(format!(
                        "symbol {:#04x} on a node flagged internal",
                        byte
                    )));
                }
                if self.weight == 0 {
                    return Err(HuffmanError::header(format!(
                        "leaf {:#04x} has zero weight",
                        byte
                    )));
                }
                if std::mem::replace(&mut seen[byte as usize], true) {
                    return Err(HuffmanError::header(format!(
                        "symbol {:#04x} appears on more than one leaf",
                        byte
                    )));
                }
                Ok(HuffNode::Leaf {
                    weight: self.weight,
                    byte,
                })
            }
            (None, Some(left), Some(right)) => {
                if self.is_leaf {
                    return Err(HuffmanError::header("leaf flag on a node without a symbol"));
                }
                let sum = nodes[left]
                    .weight()
                    .checked_add(nodes[right].weight())
                    .ok_or_else(|| HuffmanError::header("weight overflow"))?;
                if sum != self.weight {
                    return Err(HuffmanError::header(format!(
                        "internal weight {} does not match children total {}",
                        self.weight, sum
                    )));
                }
                Ok(HuffNode::Internal {
                    weight: self.weight,
                    left,
                    right,
                })
            }
            (Some(byte), _, _) => Err(HuffmanError::header(format!(
                "leaf {:#04x} has children",
                byte
            ))),
            (None, _, _) => Err(HuffmanError::header("internal node is missing a child")),
        }
    }
}

enum Token {
    Present(Frame),
    Absent,
}

struct Parser<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn rest(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    fn expect(&mut self, literal: &[u8], msg: &str) -> Result<()> {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(HuffmanError::header(format!("{} at offset {}", msg, self.pos)))
        }
    }

    fn next_byte(&mut self) -> Result<u8> {
        let byte = *self
            .rest()
            .first()
            .ok_or_else(|| HuffmanError::header("tree ends in the middle of a node"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn token(&mut self) -> Result<Token> {
        let byte = if self.rest().starts_with(ABSENT) {
            self.pos += ABSENT.len();
            if !self.rest().starts_with(WEIGHT_MARK) {
                return Ok(Token::Absent);
            }
            None
        } else {
            Some(self.symbol()?)
        };

        self.expect(WEIGHT_MARK, "expected ' ##'")?;
        let weight = self.weight()?;
        self.expect(b"-", "expected '-' after weight")?;
        let is_leaf = if self.rest().starts_with(b"True") {
            self.pos += 4;
            true
        } else if self.rest().starts_with(b"False") {
            self.pos += 5;
            false
        } else {
            return Err(HuffmanError::header(format!(
                "expected leaf flag at offset {}",
                self.pos
            )));
        };

        Ok(Token::Present(Frame {
            byte,
            weight,
            is_leaf,
            children: Vec::with_capacity(2),
        }))
    }

    fn symbol(&mut self) -> Result<u8> {
        match self.next_byte()? {
            b'\\' => match self.next_byte()? {
                b'\\' => Ok(b'\\'),
                b'x' => {
                    let hi = hex_digit(self.next_byte()?)?;
                    let lo = hex_digit(self.next_byte()?)?;
                    Ok(hi << 4 | lo)
                }
                other => Err(HuffmanError::header(format!(
                    "unknown escape '\\{}'",
                    other as char
                ))),
            },
            byte => Ok(byte),
        }
    }

    fn weight(&mut self) -> Result<u64> {
        let digits = self.rest().iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return Err(HuffmanError::header(format!(
                "expected weight at offset {}",
                self.pos
            )));
        }
        let mut weight: u64 = 0;
        for &d in &self.rest()[..digits] {
            weight = weight
                .checked_mul(10)
                .and_then(|w| w.checked_add(u64::from(d - b'0')))
                .ok_or_else(|| HuffmanError::header("weight does not fit in 64 bits"))?;
        }
        self.pos += digits;
        Ok(weight)
    }
}

fn hex_digit(byte: u8) -> Result<u8> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => Err(HuffmanError::header(format!(
            "invalid hex digit '{}'",
            byte as char
        ))),
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    const HELLO_TREE: &str = "None ##5-False,,None ##2-False,,o ##1-True,,None,,None,,\
e ##1-True,,None,,None,,None ##3-False,,h ##1-True,,None,,None,,l ##2-True,,None,,None";

    fn assert_corrupt(data: &[u8]) {
        match HuffmanTree::deserialize(data) {
            Err(HuffmanError::CorruptHeader(_)) => {}
            other => panic!("expected CorruptHeader for {:?}, got {:?}", String::from_utf8_lossy(data), other),
        }
    }

    #[test]
    fn serializes_hello() {
        let tree = HuffmanTree::from_bytes(b"hello").unwrap();
        let text = tree.serialize();
        assert_eq!(String::from_utf8(text.clone()).unwrap(), HELLO_TREE);
        assert_eq!(text.len(), 142);
    }

    #[test]
    fn deserializes_hello() {
        let tree = HuffmanTree::deserialize(HELLO_TREE.as_bytes()).unwrap();
        let original = HuffmanTree::from_bytes(b"hello").unwrap();

        assert_eq!(tree.leaf_paths(), original.leaf_paths());
        assert_eq!(tree.weight(), 5);
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn single_leaf_round_trip() {
        let tree = HuffmanTree::from_bytes(b"zzz").unwrap();
        let text = tree.serialize();
        assert_eq!(text, b"z ##3-True,,None,,None");

        let back = HuffmanTree::deserialize(&text).unwrap();
        assert!(back.is_single_leaf());
        assert_eq!(back.weight(), 3);
    }

    #[test]
    fn delimiter_like_symbols_round_trip() {
        let data = b",,,, ## -- NNNN None \\\\ True False\n\x00\xff";
        let tree = HuffmanTree::from_bytes(data).unwrap();
        let back = HuffmanTree::deserialize(&tree.serialize()).unwrap();
        assert_eq!(back.leaf_paths(), tree.leaf_paths());
    }

    #[test]
    fn escapes_non_printable_bytes() {
        let tree = HuffmanTree::from_bytes(b"\n\n").unwrap();
        assert_eq!(tree.serialize(), b"\\x0a ##2-True,,None,,None");

        let tree = HuffmanTree::from_bytes(b"\\").unwrap();
        assert_eq!(tree.serialize(), b"\\\\ ##1-True,,None,,None");
    }

    #[test]
    fn every_byte_value_round_trips() {
        let data: Vec<u8> = (0..=255u8).flat_map(|b| vec![b; b as usize % 5 + 1]).collect();
        let tree = HuffmanTree::from_bytes(&data).unwrap();
        let back = HuffmanTree::deserialize(&tree.serialize()).unwrap();
        assert_eq!(back.leaf_paths(), tree.leaf_paths());
        assert_eq!(back.leaf_count(), 256);
    }

    #[test]
    fn every_truncation_is_rejected() {
        let text = HELLO_TREE.as_bytes();
        for len in 0..text.len() {
            assert_corrupt(&text[..len]);
        }
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut text = HELLO_TREE.as_bytes().to_vec();
        text.extend_from_slice(b",,None");
        assert_corrupt(&text);
    }

    #[test]
    fn malformed_nodes_are_rejected() {
        // absent root
        assert_corrupt(b"None");
        // leaf flagged internal
        assert_corrupt(b"a ##1-False,,None,,None");
        // internal flagged leaf
        assert_corrupt(b"None ##2-True,,a ##1-True,,None,,None,,b ##1-True,,None,,None");
        // weights disagree
        assert_corrupt(b"None ##3-False,,a ##1-True,,None,,None,,b ##1-True,,None,,None");
        // internal node with one child
        assert_corrupt(b"None ##1-False,,a ##1-True,,None,,None,,None");
        // leaf with a child
        assert_corrupt(b"a ##2-True,,b ##2-True,,None,,None,,None");
        // duplicate symbol
        assert_corrupt(b"None ##2-False,,a ##1-True,,None,,None,,a ##1-True,,None,,None");
        // zero weight leaf
        assert_corrupt(b"a ##0-True,,None,,None");
        // bad flag, bad escape, overflowing weight
        assert_corrupt(b"a ##1-Yes,,None,,None");
        assert_corrupt(b"\\q ##1-True,,None,,None");
        assert_corrupt(b"a ##99999999999999999999999-True,,None,,None");
        // wrong separator
        assert_corrupt(b"a ##1-True,None,None");
    }

    #[quickcheck]
    fn tree_round_trip(data: Vec<u8>) -> bool {
        if data.is_empty() {
            return true;
        }
        let tree = HuffmanTree::from_bytes(&data).unwrap();
        let back = HuffmanTree::deserialize(&tree.serialize()).unwrap();
        back.leaf_paths() == tree.leaf_paths() && back.weight() == tree.weight()
    }
}
