use std::io::{self, Read, Write};

use crate::error::{HuffmanError, Result};

const NEWLINE: u8 = b'\n';

/// Everything in a compressed file ahead of the packed payload.
///
/// On disk:
///
/// ```text
/// [u32 big-endian] tree length
/// '\n'
/// [tree length bytes] serialized tree
/// '\n'
/// [u8] padding
/// '\n'
/// [rest of file] payload
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub tree_data: Vec<u8>,
    pub padding: u8,
}

impl ContainerHeader {
    pub fn new(tree_data: Vec<u8>, padding: u8) -> Self {
        ContainerHeader { tree_data, padding }
    }

    /// Bytes the header occupies on disk.
    pub fn encoded_len(&self) -> usize {
        4 + 1 + self.tree_data.len() + 1 + 1 + 1
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let tree_len = u32::try_from(self.tree_data.len())
            .map_err(|_| HuffmanError::header("serialized tree exceeds 4 GiB"))?;
        writer.write_all(&tree_len.to_be_bytes())?;
        writer.write_all(&[NEWLINE])?;
        writer.write_all(&self.tree_data)?;
        writer.write_all(&[NEWLINE, self.padding, NEWLINE])?;
        Ok(())
    }

    /// Reads the header and leaves `reader` positioned at the payload.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut tree_len_bytes = [0u8; 4];
        read_header_bytes(reader, &mut tree_len_bytes, "tree length")?;
        let tree_len = u32::from_be_bytes(tree_len_bytes) as u64;
        expect_newline(reader, "after tree length")?;

        // take() keeps a bogus length from allocating before the bytes exist
        let mut tree_data = Vec::new();
        reader.by_ref().take(tree_len).read_to_end(&mut tree_data)?;
        if tree_data.len() as u64 != tree_len {
            return Err(HuffmanError::header(format!(
                "tree length is {} but only {} bytes follow",
                tree_len,
                tree_data.len()
            )));
        }
        expect_newline(reader, "after tree")?;

        let mut padding = [0u8; 1];
        read_header_bytes(reader, &mut padding, "padding")?;
        let padding = padding[0];
        if padding >= 8 {
            return Err(HuffmanError::header(format!(
                "padding of {} bits is not below 8",
                padding
            )));
        }
        expect_newline(reader, "after padding")?;

        Ok(ContainerHeader { tree_data, padding })
    }
}

fn read_header_bytes<R: Read>(reader: &mut R, buf: &mut [u8], field: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => HuffmanError::header(format!("file ends before {}", field)),
        _ => HuffmanError::Io(e),
    })
}

fn expect_newline<R: Read>(reader: &mut R, place: &str) -> Result<()> {
    let mut byte = [0u8; 1];
    read_header_bytes(reader, &mut byte, &format!("separator {}", place))?;
    if byte[0] != NEWLINE {
        return Err(HuffmanError::header(format!(
            "expected '\\n' {}, found {:#04x}",
            place, byte[0]
        )));
    }
    Ok(())
}

/// One `read` call that retries on `Interrupted`. Returns 0 only at end of
/// input.
pub(crate) fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
