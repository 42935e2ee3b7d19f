// ============ Tokens, Pools & Registry ============

use serde::{Deserialize, Serialize};

use crate::cell::CellOutput;
use crate::script::{Script, ScriptRef};

/// Type hash standing for the native CKB token, which has no type script.
pub const CKB_TYPE_HASH: [u8; 32] = [0u8; 32];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimal: u8,
    pub logo_uri: String,
}

/// Registry entry. Identity is the type hash; a token carries no balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    #[serde(with = "crate::hexstr::fixed")]
    pub type_hash: [u8; 32],
    pub type_script: Option<Script>,
    pub info: TokenInfo,
}

impl Token {
    pub fn ckb() -> Self {
        Self {
            type_hash: CKB_TYPE_HASH,
            type_script: None,
            info: TokenInfo {
                name: "CKB".to_string(),
                symbol: "CKB".to_string(),
                decimal: 8,
                logo_uri: String::new(),
            },
        }
    }

    pub fn sudt(type_script: Script, info: TokenInfo) -> Self {
        Self {
            type_hash: type_script.to_hash(),
            type_script: Some(type_script),
            info,
        }
    }

    pub fn is_ckb(&self) -> bool {
        self.type_script.is_none()
    }

    pub fn with_balance(&self, balance: u128) -> TokenAmount {
        TokenAmount {
            token: self.clone(),
            balance,
        }
    }
}

/// An amount of a token, built fresh for each response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    #[serde(flatten)]
    pub token: Token,
    #[serde(with = "crate::hexstr::u128_string")]
    pub balance: u128,
}

// ============ Pools ============

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolInfo {
    /// Hash of the pool info cell's type script.
    #[serde(with = "crate::hexstr::fixed")]
    pub pool_id: [u8; 32],
    pub token_a: Token,
    pub token_b: Token,
    pub info_cell: Option<CellOutput>,
}

impl PoolInfo {
    /// Both sides are sUDTs; otherwise token A is CKB.
    pub fn is_sudt_sudt(&self) -> bool {
        !self.token_a.is_ckb()
    }

    /// LP token type: the sUDT type script owned by the pool's info lock.
    pub fn lp_token_type_script(&self, sudt_type: &ScriptRef) -> Option<Script> {
        self.info_cell
            .as_ref()
            .map(|cell| sudt_type.with_args(cell.lock_script.to_hash().to_vec()))
    }

    pub fn contains(&self, type_hash: &[u8; 32]) -> bool {
        &self.token_a.type_hash == type_hash || &self.token_b.type_hash == type_hash
    }
}

// ============ Registry ============

/// Read-only token/pool lookup table, populated once and shared by reference.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Registry {
    tokens: Vec<Token>,
    pools: Vec<PoolInfo>,
}

impl Registry {
    pub fn new(tokens: Vec<Token>, pools: Vec<PoolInfo>) -> Self {
        Self { tokens, pools }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn pools(&self) -> &[PoolInfo] {
        &self.pools
    }

    pub fn token_by_type_hash(&self, type_hash: &[u8; 32]) -> Option<&Token> {
        self.tokens.iter().find(|t| &t.type_hash == type_hash)
    }

    /// Type scripts of every registered sUDT (CKB has none).
    pub fn type_scripts(&self) -> Vec<&Script> {
        self.tokens.iter().filter_map(|t| t.type_script.as_ref()).collect()
    }

    pub fn pool_by_id(&self, pool_id: &[u8; 32]) -> Option<&PoolInfo> {
        self.pools.iter().find(|p| &p.pool_id == pool_id)
    }

    /// Pool trading the two tokens, in either order.
    pub fn pool_by_tokens(&self, a: &[u8; 32], b: &[u8; 32]) -> Option<&PoolInfo> {
        self.pools.iter().find(|p| a != b && p.contains(a) && p.contains(b))
    }
}
