//! # huff_zip
//!
//! Lossless file compression with Huffman coding.
//!
//! Compression counts every byte of the input, builds a Huffman tree from the
//! counts, stores the tree in a small text header and bit-packs the codes
//! behind it. Decompression reads the tree back and walks it bit by bit. Both
//! directions stream in bounded chunks.
//!
//! ## Quick Start
//!
//! ```no_run
//! use huff_zip::HuffmanCodec;
//! use std::fs::File;
//!
//! let codec = HuffmanCodec::default();
//!
//! // Compress a file
//! let input = File::open("input.txt")?;
//! let output = File::create("input.txt.huffman")?;
//! codec.encode_from_file(input, output)?;
//!
//! // Decompress a file
//! let compressed = File::open("input.txt.huffman")?;
//! let decompressed = File::create("input.txt.decoded")?;
//! codec.decode_from_file(compressed, decompressed)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! In memory:
//!
//! ```
//! use huff_zip::HuffmanCodec;
//!
//! let codec = HuffmanCodec::default();
//! let packed = codec.encode(b"hello").unwrap();
//! assert_eq!(&packed[packed.len() - 2..], &[0x9f, 0x00]);
//! assert_eq!(codec.decode(&packed).unwrap(), b"hello");
//! ```

pub mod code_table;
pub mod config;
pub mod container;
pub mod error;
pub mod frequency;
pub mod huffman_codec;
pub mod hufftree;
pub mod packer;
pub mod tree_codec;
pub mod unpacker;

// Internal modules - not part of public API
mod min_heap;

// Re-export main types for convenience
pub use code_table::{Code, CodeTable};
pub use config::CodecConfig;
pub use container::ContainerHeader;
pub use error::{HuffmanError, Result};
pub use frequency::{count_frequencies, FrequencyTable};
pub use huffman_codec::{DecodeSummary, EncodeSummary, HuffmanCodec};
pub use hufftree::{HuffNode, HuffmanTree, NodeId};
pub use packer::{pack, pack_stream, BitPacker, PackSummary};
pub use unpacker::{unpack, unpack_stream, TreeWalker, UnpackSummary};
