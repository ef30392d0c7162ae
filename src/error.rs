use std::io;

use thiserror::Error;

/// Everything that can go wrong while compressing or decompressing.
///
/// Errors are raised where the broken invariant is first noticed and handed
/// back to the caller untouched.
#[derive(Error, Debug)]
pub enum HuffmanError {
    #[error("input is empty, nothing to encode")]
    EmptyInput,

    #[error("corrupt header: {0}")]
    CorruptHeader(String),

    #[error("byte {0:#04x} has no entry in the code table")]
    UnknownSymbol(u8),

    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl HuffmanError {
    pub(crate) fn header(msg: impl Into<String>) -> Self {
        HuffmanError::CorruptHeader(msg.into())
    }

    pub(crate) fn payload(msg: impl Into<String>) -> Self {
        HuffmanError::CorruptPayload(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, HuffmanError>;
