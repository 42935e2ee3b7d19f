// ============ Gliaswap CKB Types ============
// Shared cell, script and codec definitions for the order engine and SDK.
// Layouts mirror the deployed order lock scripts byte for byte.

pub mod cell;
pub mod codec;
pub mod deployment;
pub mod error;
pub mod hexstr;
pub mod molecule;
pub mod script;
pub mod token;

pub use cell::{
    CellDep, CellInput, CellOutput, DepType, OutPoint, Transaction, TransactionWithStatus,
    TxStatus, UnsignedTransaction, SHANNONS_PER_BYTE,
};
pub use codec::{
    decode_data, decode_sudt_data, encode_data, encode_sudt_data, LiquidityOrderArgs,
    SwapOrderArgs, SwapOrderType, TipsArgs, ORDER_VERSION, SUDT_DATA_SIZE,
};
pub use deployment::{DeployedScript, Deployment};
pub use error::DecodeError;
pub use script::{ckb_blake2b, HashType, Script, ScriptRef};
pub use token::{PoolInfo, Registry, Token, TokenAmount, TokenInfo, CKB_TYPE_HASH};
