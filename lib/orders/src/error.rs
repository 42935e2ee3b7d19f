use gliaswap_types::hexstr::encode_prefixed;
use gliaswap_types::DecodeError;
use thiserror::Error;

/// Why one order could not be reconstructed. Never fatal for a whole query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    #[error("cannot decode cell {}:{}: {}", encode_prefixed(.tx_hash), .index, .source)]
    Decode {
        tx_hash: [u8; 32],
        index: u32,
        #[source]
        source: DecodeError,
    },

    #[error("unknown asset {}", encode_prefixed(.type_hash))]
    UnknownAsset { type_hash: [u8; 32] },

    #[error("unknown pool {}", encode_prefixed(.pool_id))]
    UnknownPool { pool_id: [u8; 32] },

    #[error("pool {} has no info cell", encode_prefixed(.pool_id))]
    MissingInfoCell { pool_id: [u8; 32] },

    #[error("cell {}:{} was consumed without a successor for its owner", encode_prefixed(.tx_hash), .index)]
    DanglingLineage { tx_hash: [u8; 32], index: u32 },

    #[error("cell {}:{} is its own ancestor", encode_prefixed(.tx_hash), .index)]
    Cycle { tx_hash: [u8; 32], index: u32 },

    #[error("request transaction {} has no matching request cell", encode_prefixed(.tx_hash))]
    MissingRequestOutput { tx_hash: [u8; 32] },
}

impl ChainError {
    pub fn decode(tx_hash: [u8; 32], index: u32, source: DecodeError) -> Self {
        ChainError::Decode { tx_hash, index, source }
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
