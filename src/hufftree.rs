use std::collections::BTreeMap;

use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::min_heap::MinHeap;

/// Index of a node inside a [`HuffmanTree`] arena.
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        weight: u64,
        byte: u8,
    },
    Internal {
        weight: u64,
        left: NodeId,
        right: NodeId,
    },
}

impl HuffNode {
    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }

    pub fn byte(&self) -> Option<u8> {
        match self {
            HuffNode::Leaf { byte, .. } => Some(*byte),
            HuffNode::Internal { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self {
            HuffNode::Leaf { .. } => None,
            HuffNode::Internal { left, right, .. } => Some((*left, *right)),
        }
    }
}

/// A Huffman tree stored as an arena of nodes.
///
/// Children are addressed by index, and every traversal over the tree runs on
/// an explicit stack, so heavily skewed trees cannot exhaust the call stack.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<HuffNode>,
    root: NodeId,
}

/// Heap entry for the builder: ordered by weight alone.
#[derive(Debug, Clone, Copy)]
struct Pending {
    weight: u64,
    id: NodeId,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.weight.partial_cmp(&other.weight)
    }
}

impl HuffmanTree {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        HuffmanTree::from_frequencies(&FrequencyTable::from_bytes(bytes))
    }

    /// Builds the tree by repeatedly merging the two lightest nodes.
    ///
    /// Leaves enter the heap in first-seen order. The first node removed
    /// becomes the left child and the second the right child.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self> {
        if frequencies.is_empty() {
            return Err(HuffmanError::EmptyInput);
        }

        let mut nodes = Vec::with_capacity(2 * frequencies.distinct() - 1);
        let mut pending = Vec::with_capacity(frequencies.distinct());
        for (byte, weight) in frequencies.iter() {
            pending.push(Pending {
                weight,
                id: nodes.len(),
            });
            nodes.push(HuffNode::Leaf { weight, byte });
        }

        let mut heap = MinHeap::build(pending);
        while heap.heap_size() > 1 {
            let (Some(x), Some(y)) = (heap.extract_min(), heap.extract_min()) else {
                break;
            };
            let weight = x.weight + y.weight;
            let id = nodes.len();
            nodes.push(HuffNode::Internal {
                weight,
                left: x.id,
                right: y.id,
            });
            heap.insert(Pending { weight, id });
        }

        let root = heap.extract_min().ok_or(HuffmanError::EmptyInput)?.id;
        Ok(HuffmanTree { nodes, root })
    }

    /// Assembles a tree from parts, used by the deserializer once it has
    /// validated the shape.
    pub(crate) fn from_parts(nodes: Vec<HuffNode>, root: NodeId) -> Self {
        HuffmanTree { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &HuffNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Total weight at the root, i.e. the number of encoded symbols.
    pub fn weight(&self) -> u64 {
        self.nodes[self.root].weight()
    }

    /// A lone leaf at the root: every symbol of the input is the same byte.
    pub fn is_single_leaf(&self) -> bool {
        self.nodes[self.root].is_leaf()
    }

    /// Maps every leaf byte to its root-to-leaf path, `false` for left and
    /// `true` for right. Two trees with equal paths decode identically.
    pub fn leaf_paths(&self) -> BTreeMap<u8, Vec<bool>> {
        let mut paths = BTreeMap::new();
        let mut stack = vec![(self.root, Vec::new())];
        while let Some((id, path)) = stack.pop() {
            match self.nodes[id] {
                HuffNode::Leaf { byte, .. } => {
                    paths.insert(byte, path);
                }
                HuffNode::Internal { left, right, .. } => {
                    let mut right_path = path.clone();
                    right_path.push(true);
                    stack.push((right, right_path));

                    let mut left_path = path;
                    left_path.push(false);
                    stack.push((left, left_path));
                }
            }
        }
        paths
    }

    /// Preorder (node, left, right) walk over node ids.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some((left, right)) = self.nodes[id].children() {
                stack.push(right);
                stack.push(left);
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn paths_as_strings(tree: &HuffmanTree) -> BTreeMap<char, String> {
        tree.leaf_paths()
            .into_iter()
            .map(|(byte, path)| {
                let bits = path.iter().map(|&b| if b { '1' } else { '0' }).collect();
                (byte as char, bits)
            })
            .collect()
    }

    #[test]
    fn builds_hello_tree() {
        let tree = HuffmanTree::from_bytes(b"hello").unwrap();

        assert_eq!(tree.weight(), 5);
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.len(), 7);

        let paths = paths_as_strings(&tree);
        assert_eq!(paths[&'o'], "00");
        assert_eq!(paths[&'e'], "01");
        assert_eq!(paths[&'h'], "10");
        assert_eq!(paths[&'l'], "11");
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = HuffmanTree::from_bytes(b"").unwrap_err();
        assert!(matches!(err, HuffmanError::EmptyInput));
    }

    #[test]
    fn single_symbol_gives_leaf_root() {
        let tree = HuffmanTree::from_bytes(b"aaaa").unwrap();

        assert!(tree.is_single_leaf());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.weight(), 4);
        assert_eq!(tree.node(tree.root()).byte(), Some(b'a'));
    }

    #[test]
    fn internal_weight_is_sum_of_children() {
        let mut rng = StdRng::seed_from_u64(3);
        let data: Vec<u8> = (0..5000).map(|_| rng.gen_range(0..40u8)).collect();
        let tree = HuffmanTree::from_bytes(&data).unwrap();

        for id in tree.preorder() {
            if let Some((left, right)) = tree.node(id).children() {
                assert_eq!(
                    tree.node(id).weight(),
                    tree.node(left).weight() + tree.node(right).weight()
                );
            }
        }
        assert_eq!(tree.weight(), 5000);
    }

    #[test]
    fn same_input_builds_same_tree() {
        let data = b"abracadabra, said the wizard";
        let a = HuffmanTree::from_bytes(data).unwrap();
        let b = HuffmanTree::from_bytes(data).unwrap();
        assert_eq!(a.leaf_paths(), b.leaf_paths());
    }

    #[test]
    fn skewed_frequencies_build_deep_tree() {
        // fibonacci counts force a caterpillar tree
        let mut freq = FrequencyTable::new();
        let (mut a, mut b) = (1u64, 1u64);
        for byte in 0..40u8 {
            freq.add(byte, a);
            let next = a + b;
            a = b;
            b = next;
        }
        let tree = HuffmanTree::from_frequencies(&freq).unwrap();
        let deepest = tree.leaf_paths().values().map(Vec::len).max().unwrap();
        assert_eq!(deepest, 39);
        assert_eq!(tree.leaf_count(), 40);
    }
}
