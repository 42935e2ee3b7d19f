// ============ Order Codecs ============
// Fixed-width layouts carried in order-lock args and sUDT cell data.
// Byte offsets are part of the wire contract: every field keeps its full
// width regardless of value, and all integers are little-endian.
//
// Swap args (66 bytes):
//   user_lock_hash[32] | version u8 | amount_in u128 | min_amount_out u128 | order_type u8
// Liquidity args (113 bytes):
//   info_type_hash[32] | version u8 | sudt_min u128 | ckb_min u64 | user_lock_hash[32] | tips
// Tips (24 bytes):
//   tips u64 | tips_sudt u128
// sUDT data: amount u128 (trailing bytes ignored)

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};
use crate::hexstr;

pub const ORDER_VERSION: u8 = 1;

fn ensure_len(data: &[u8], expected: usize) -> Result<()> {
    if data.len() < expected {
        return Err(DecodeError::Truncated { expected, actual: data.len() });
    }
    Ok(())
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

fn read_u128(data: &[u8], offset: usize) -> u128 {
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&data[offset..offset + 16]);
    u128::from_le_bytes(buf)
}

fn read_hash(data: &[u8], offset: usize) -> [u8; 32] {
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&data[offset..offset + 32]);
    hash
}

// ============ Swap Order Type ============

/// `BuyCkb` pays CKB for sUDT; `SellCkb` pays sUDT for CKB.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapOrderType {
    SellCkb = 0,
    BuyCkb = 1,
}

impl TryFrom<u8> for SwapOrderType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(SwapOrderType::SellCkb),
            1 => Ok(SwapOrderType::BuyCkb),
            other => Err(DecodeError::UnknownOrderType(other)),
        }
    }
}

// ============ Swap Order Args ============

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapOrderArgs {
    pub user_lock_hash: [u8; 32],
    pub version: u8,
    pub amount_in: u128,
    pub min_amount_out: u128,
    pub order_type: SwapOrderType,
}

impl SwapOrderArgs {
    pub const SERIALIZED_SIZE: usize = 32 + 1 + 16 + 16 + 1; // 66

    pub fn serialize(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut buf = [0u8; Self::SERIALIZED_SIZE];
        let mut offset = 0;

        buf[offset..offset + 32].copy_from_slice(&self.user_lock_hash);
        offset += 32;
        buf[offset] = self.version;
        offset += 1;
        buf[offset..offset + 16].copy_from_slice(&self.amount_in.to_le_bytes());
        offset += 16;
        buf[offset..offset + 16].copy_from_slice(&self.min_amount_out.to_le_bytes());
        offset += 16;
        buf[offset] = self.order_type as u8;

        buf
    }

    pub fn deserialize(data: &[u8]) -> Result<Self> {
        ensure_len(data, Self::SERIALIZED_SIZE)?;
        Ok(Self {
            user_lock_hash: read_hash(data, 0),
            version: data[32],
            amount_in: read_u128(data, 33),
            min_amount_out: read_u128(data, 49),
            order_type: SwapOrderType::try_from(data[65])?,
        })
    }

    pub fn encode_args(&self) -> String {
        hexstr::encode_prefixed(&self.serialize())
    }

    pub fn decode_args(args_hex: &str) -> Result<Self> {
        Self::deserialize(&hexstr::decode_prefixed(args_hex)?)
    }
}

// ============ Tips Args ============

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TipsArgs {
    pub tips: u64,
    pub tips_sudt: u128,
}

impl TipsArgs {
    pub const SERIALIZED_SIZE: usize = 8 + 16; // 24

    pub fn serialize(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut buf = [0u8; Self::SERIALIZED_SIZE];
        buf[0..8].copy_from_slice(&self.tips.to_le_bytes());
        buf[8..24].copy_from_slice(&self.tips_sudt.to_le_bytes());
        buf
    }

    pub fn deserialize(data: &[u8]) -> Result<Self> {
        ensure_len(data, Self::SERIALIZED_SIZE)?;
        Ok(Self {
            tips: read_u64(data, 0),
            tips_sudt: read_u128(data, 8),
        })
    }
}

// ============ Liquidity Order Args ============

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiquidityOrderArgs {
    pub info_type_hash: [u8; 32],
    pub version: u8,
    pub sudt_min: u128,
    pub ckb_min: u64,
    pub user_lock_hash: [u8; 32],
    pub tips: TipsArgs,
}

impl LiquidityOrderArgs {
    const TIPS_OFFSET: usize = 32 + 1 + 16 + 8 + 32; // 89
    pub const SERIALIZED_SIZE: usize = Self::TIPS_OFFSET + TipsArgs::SERIALIZED_SIZE; // 113

    pub fn serialize(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut buf = [0u8; Self::SERIALIZED_SIZE];
        let mut offset = 0;

        buf[offset..offset + 32].copy_from_slice(&self.info_type_hash);
        offset += 32;
        buf[offset] = self.version;
        offset += 1;
        buf[offset..offset + 16].copy_from_slice(&self.sudt_min.to_le_bytes());
        offset += 16;
        buf[offset..offset + 8].copy_from_slice(&self.ckb_min.to_le_bytes());
        offset += 8;
        buf[offset..offset + 32].copy_from_slice(&self.user_lock_hash);
        offset += 32;
        buf[offset..].copy_from_slice(&self.tips.serialize());

        buf
    }

    pub fn deserialize(data: &[u8]) -> Result<Self> {
        ensure_len(data, Self::SERIALIZED_SIZE)?;
        Ok(Self {
            info_type_hash: read_hash(data, 0),
            version: data[32],
            sudt_min: read_u128(data, 33),
            ckb_min: read_u64(data, 49),
            user_lock_hash: read_hash(data, 57),
            tips: TipsArgs::deserialize(&data[Self::TIPS_OFFSET..])?,
        })
    }

    pub fn encode_args(&self) -> String {
        hexstr::encode_prefixed(&self.serialize())
    }

    pub fn decode_args(args_hex: &str) -> Result<Self> {
        Self::deserialize(&hexstr::decode_prefixed(args_hex)?)
    }
}

// ============ sUDT Cell Data ============

pub const SUDT_DATA_SIZE: usize = 16;

pub fn encode_sudt_data(amount: u128) -> [u8; SUDT_DATA_SIZE] {
    amount.to_le_bytes()
}

pub fn decode_sudt_data(data: &[u8]) -> Result<u128> {
    ensure_len(data, SUDT_DATA_SIZE)?;
    Ok(read_u128(data, 0))
}

pub fn encode_data(amount: u128) -> String {
    hexstr::encode_prefixed(&encode_sudt_data(amount))
}

pub fn decode_data(data_hex: &str) -> Result<u128> {
    decode_sudt_data(&hexstr::decode_prefixed(data_hex)?)
}

// ============ Tests ============
