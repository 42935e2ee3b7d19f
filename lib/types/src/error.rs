use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("truncated input: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("unknown swap order type {0}")]
    UnknownOrderType(u8),

    #[error("unknown hash type {0}")]
    UnknownHashType(String),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
