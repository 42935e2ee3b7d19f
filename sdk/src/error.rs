use gliaswap_types::hexstr::encode_prefixed;
use thiserror::Error;

use crate::collaborators::IndexerError;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown asset {}", encode_prefixed(.type_hash))]
    UnknownAsset { type_hash: [u8; 32] },

    #[error("cell {}:{} is not a live order cell", encode_prefixed(.tx_hash), .index)]
    NotCancelable { tx_hash: [u8; 32], index: u32 },

    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u128, available: u128 },

    #[error("arithmetic overflow")]
    Overflow,

    #[error(transparent)]
    IndexerUnavailable(#[from] IndexerError),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SdkError>;
