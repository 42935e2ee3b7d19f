// ============ Deployment ============
// Where each script lives on chain and the constants tied to the deployed
// contracts' ABI. Loaded from configuration, never hard-coded.

use serde::{Deserialize, Serialize};

use crate::cell::{CellDep, SHANNONS_PER_BYTE};
use crate::script::{Script, ScriptRef};

pub const DEFAULT_LP_TOKEN_ARGS_LEN: usize = 65;
pub const DEFAULT_MIN_SUDT_CELL_CAPACITY: u64 = 142 * SHANNONS_PER_BYTE;
pub const DEFAULT_MIN_CHANGE_CAPACITY: u64 = 61 * SHANNONS_PER_BYTE;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedScript {
    #[serde(flatten)]
    pub script: ScriptRef,
    pub cell_dep: CellDep,
}

impl DeployedScript {
    pub fn with_args(&self, args: Vec<u8>) -> Script {
        self.script.with_args(args)
    }

    pub fn matches(&self, script: &Script) -> bool {
        self.script.matches(script)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub swap_order_lock: DeployedScript,
    /// Liquidity request lock for CKB/sUDT pools.
    pub liquidity_order_lock: DeployedScript,
    /// Liquidity request lock for sUDT/sUDT pools.
    pub token_token_liquidity_lock: DeployedScript,
    pub info_type: DeployedScript,
    pub sudt_type: DeployedScript,
    /// User lock types accepted by the builder.
    pub user_locks: Vec<DeployedScript>,
    /// Args length that marks an LP-token cell in CKB/sUDT pools.
    #[serde(default = "default_lp_token_args_len")]
    pub lp_token_args_len: usize,
    #[serde(default = "default_min_sudt_cell_capacity")]
    pub min_sudt_cell_capacity: u64,
    #[serde(default = "default_min_change_capacity")]
    pub min_change_capacity: u64,
}

fn default_lp_token_args_len() -> usize {
    DEFAULT_LP_TOKEN_ARGS_LEN
}

fn default_min_sudt_cell_capacity() -> u64 {
    DEFAULT_MIN_SUDT_CELL_CAPACITY
}

fn default_min_change_capacity() -> u64 {
    DEFAULT_MIN_CHANGE_CAPACITY
}

impl Deployment {
    pub fn user_lock(&self, lock: &Script) -> Option<&DeployedScript> {
        self.user_locks.iter().find(|l| l.matches(lock))
    }

    pub fn is_order_lock(&self, lock: &Script) -> bool {
        self.swap_order_lock.matches(lock)
            || self.liquidity_order_lock.matches(lock)
            || self.token_token_liquidity_lock.matches(lock)
    }
}
