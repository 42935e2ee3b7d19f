// ============ SDK Configuration ============
// Deployment description plus builder/query tuning, read from JSON.

use std::path::Path;

use gliaswap_types::Deployment;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SdkError};

/// Shannons per 1000 bytes.
pub const DEFAULT_FEE_RATE: u64 = 1_000;
pub const DEFAULT_BRIDGE_TOLERANCE_MS: u64 = 30 * 60 * 1_000;

const TESTNET: &str = include_str!("../../config/testnet.json");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkConfig {
    #[serde(flatten)]
    pub deployment: Deployment,
    #[serde(default = "default_fee_rate")]
    pub fee_rate: u64,
    #[serde(default = "default_bridge_tolerance_ms")]
    pub bridge_tolerance_ms: u64,
}

fn default_fee_rate() -> u64 {
    DEFAULT_FEE_RATE
}

fn default_bridge_tolerance_ms() -> u64 {
    DEFAULT_BRIDGE_TOLERANCE_MS
}

impl SdkConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|e| SdkError::Config(e.to_string()))?;
        if config.fee_rate == 0 {
            return Err(SdkError::Config("feeRate must be positive".to_string()));
        }
        if config.deployment.user_locks.is_empty() {
            return Err(SdkError::Config("no user locks configured".to_string()));
        }
        Ok(config)
    }

    /// Public testnet deployment bundled with the crate.
    pub fn testnet() -> Result<Self> {
        Self::from_json(TESTNET)
    }
}
