// ============ Requests ============
// Typed user requests accepted by the transaction builder.

use gliaswap_types::{Script, UnsignedTransaction};
use serde::{Deserialize, Serialize};

/// A token reference and an amount, as submitted by a client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAmount {
    #[serde(with = "gliaswap_types::hexstr::fixed")]
    pub type_hash: [u8; 32],
    #[serde(with = "gliaswap_types::hexstr::u128_string")]
    pub balance: u128,
}

/// `asset_out.balance` is the minimum the user accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub lock: Script,
    pub asset_in: AssetAmount,
    pub asset_out: AssetAmount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLiquidityRequest {
    pub lock: Script,
    #[serde(with = "gliaswap_types::hexstr::fixed")]
    pub pool_id: [u8; 32],
    pub asset_a: AssetAmount,
    pub asset_b: AssetAmount,
    #[serde(with = "gliaswap_types::hexstr::u128_string")]
    pub min_a: u128,
    #[serde(with = "gliaswap_types::hexstr::u128_string")]
    pub min_b: u128,
}

/// First deposit into an empty pool; no minimums apply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisLiquidityRequest {
    pub lock: Script,
    #[serde(with = "gliaswap_types::hexstr::fixed")]
    pub pool_id: [u8; 32],
    pub asset_a: AssetAmount,
    pub asset_b: AssetAmount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLiquidityRequest {
    pub lock: Script,
    #[serde(with = "gliaswap_types::hexstr::fixed")]
    pub pool_id: [u8; 32],
    pub lp_token: Script,
    #[serde(with = "gliaswap_types::hexstr::u128_string")]
    pub lp_amount: u128,
    #[serde(with = "gliaswap_types::hexstr::u128_string")]
    pub min_a: u128,
    #[serde(with = "gliaswap_types::hexstr::u128_string")]
    pub min_b: u128,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    #[serde(with = "gliaswap_types::hexstr::fixed")]
    pub tx_hash: [u8; 32],
    pub index: u32,
    pub lock: Script,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionWithFee {
    pub transaction: UnsignedTransaction,
    /// Shannons.
    pub fee: u64,
}
