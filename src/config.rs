/// Default read size for every streaming pass, 64 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Tuning knobs for [`HuffmanCodec`](crate::HuffmanCodec).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Upper bound on the bytes read from a source in one call.
    pub chunk_size: usize,
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chunk size. A zero size is clamped to one byte.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
