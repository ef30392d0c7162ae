use std::io::{BufWriter, Cursor, Read, Seek, SeekFrom, Write};

use crate::code_table::CodeTable;
use crate::config::CodecConfig;
use crate::container::ContainerHeader;
use crate::error::{HuffmanError, Result};
use crate::frequency::count_frequencies;
use crate::hufftree::HuffmanTree;
use crate::packer::pack_stream;
use crate::unpacker::unpack_stream;

/// Sizes from one compression run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSummary {
    pub original_len: u64,
    pub distinct_symbols: usize,
    pub tree_len: usize,
    pub payload_len: u64,
    pub padding: u8,
}

impl EncodeSummary {
    /// Bytes written, header included.
    pub fn compressed_len(&self) -> u64 {
        // length prefix, tree, padding byte and three separators
        self.tree_len as u64 + 8 + self.payload_len
    }
}

/// Sizes from one decompression run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeSummary {
    pub decoded_len: u64,
    pub payload_len: u64,
}

/// End-to-end compressor: counts, builds the tree, writes the container and
/// streams the payload, or the reverse.
///
/// Each call builds its own tree and tables; nothing is kept between calls.
#[derive(Debug, Clone, Default)]
pub struct HuffmanCodec {
    config: CodecConfig,
}

impl HuffmanCodec {
    pub fn new(config: CodecConfig) -> Self {
        HuffmanCodec { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compresses `input` into `output`.
    ///
    /// The input is read twice: once to count, then again from the start to
    /// pack. The padding follows from the counts and code lengths, so the
    /// header is written before the payload and nothing is buffered whole.
    pub fn encode_from_file<R, W>(&self, mut input: R, output: W) -> Result<EncodeSummary>
    where
        R: Read + Seek,
        W: Write,
    {
        let chunk_size = self.config.chunk_size;
        let start = input.stream_position()?;

        let frequencies = count_frequencies(&mut input, chunk_size)?;
        let tree = HuffmanTree::from_frequencies(&frequencies)?;
        let table = CodeTable::generate(&tree);
        let tree_data = tree.serialize();

        let total_bits = table
            .encoded_bits(&frequencies)
            .ok_or_else(|| HuffmanError::payload("counted byte missing from code table"))?;
        let padding = ((8 - total_bits % 8) % 8) as u8;

        let mut output = BufWriter::with_capacity(chunk_size, output);
        let header = ContainerHeader::new(tree_data, padding);
        header.write_to(&mut output)?;

        input.seek(SeekFrom::Start(start))?;
        let packed = pack_stream(&mut input, &table, &mut output, chunk_size)?;
        output.flush()?;

        if packed.padding != padding || packed.bit_count != total_bits {
            return Err(HuffmanError::payload(format!(
                "input changed between passes: expected {} bits, packed {}",
                total_bits, packed.bit_count
            )));
        }

        Ok(EncodeSummary {
            original_len: frequencies.total(),
            distinct_symbols: frequencies.distinct(),
            tree_len: header.tree_data.len(),
            payload_len: packed.payload_len,
            padding,
        })
    }

    /// Decompresses a container read from `input` into `output`.
    pub fn decode_from_file<R, W>(&self, input: R, output: W) -> Result<DecodeSummary>
    where
        R: Read,
        W: Write,
    {
        let chunk_size = self.config.chunk_size;
        let mut input = input;

        let header = ContainerHeader::read_from(&mut input)?;
        let tree = HuffmanTree::deserialize(&header.tree_data)?;

        let mut output = BufWriter::with_capacity(chunk_size, output);
        let unpacked = unpack_stream(&mut input, header.padding, &tree, &mut output, chunk_size)?;
        output.flush()?;

        Ok(DecodeSummary {
            decoded_len: unpacked.decoded_len,
            payload_len: unpacked.payload_len,
        })
    }

    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_from_file(Cursor::new(data), &mut out)?;
        Ok(out)
    }

    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.decode_from_file(data, &mut out)?;
        Ok(out)
    }
}
