// ============ Bridge Match Chain ============
// Attaches ETH-side bridge events to the CKB swap chains they belong to.
// Matching is by exact user lock hash and an origin-timestamp window.

use std::collections::HashMap;

use gliaswap_types::hexstr::encode_prefixed;
use gliaswap_types::OutPoint;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::{OrderChain, OrderKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeDirection {
    /// ETH lock ahead of a CKB order.
    In,
    /// ETH unlock after a CKB settlement.
    Out,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeKind {
    PureCross,
    CrossChainOrder,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeEvent {
    #[serde(with = "gliaswap_types::hexstr::fixed")]
    pub eth_tx_hash: [u8; 32],
    #[serde(with = "gliaswap_types::hexstr::fixed")]
    pub user_lock_hash: [u8; 32],
    #[serde(with = "gliaswap_types::hexstr::u128_string")]
    pub lock_amount: u128,
    /// Milliseconds since the epoch.
    pub timestamp: u64,
    pub direction: BridgeDirection,
    pub kind: BridgeKind,
}

/// Result of correlating a batch of events with a batch of chains.
#[derive(Clone, Debug, Default)]
pub struct BridgeMatch {
    attached: HashMap<OutPoint, BridgeEvent>,
    unmatched: Vec<BridgeEvent>,
}

impl BridgeMatch {
    /// Each event goes to the most recent eligible swap chain; ties fall to
    /// the smallest origin transaction hash. A chain takes at most one event.
    pub fn correlate(mut events: Vec<BridgeEvent>, chains: &[OrderChain<'_>], tolerance_ms: u64) -> Self {
        events.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.eth_tx_hash.cmp(&b.eth_tx_hash))
        });

        let mut result = Self::default();
        for event in events {
            let candidate = chains
                .iter()
                .filter(|c| matches!(c.kind(), OrderKind::Swap(_)))
                .filter(|c| c.kind().user_lock_hash() == &event.user_lock_hash)
                .filter(|c| c.origin().tx.timestamp.abs_diff(event.timestamp) <= tolerance_ms)
                .filter(|c| !result.attached.contains_key(&c.origin().out_point()))
                .max_by(|a, b| {
                    a.origin()
                        .tx
                        .timestamp
                        .cmp(&b.origin().tx.timestamp)
                        .then_with(|| b.origin().tx.hash().cmp(&a.origin().tx.hash()))
                });

            match candidate {
                Some(chain) => {
                    result.attached.insert(chain.origin().out_point(), event);
                }
                None => {
                    debug!(
                        eth_tx_hash = %encode_prefixed(&event.eth_tx_hash),
                        timestamp = event.timestamp,
                        "bridge event has no matching order"
                    );
                    result.unmatched.push(event);
                }
            }
        }
        result
    }

    pub fn event_for(&self, chain: &OrderChain<'_>) -> Option<&BridgeEvent> {
        self.attached.get(&chain.origin().out_point())
    }

    pub fn unmatched(&self) -> &[BridgeEvent] {
        &self.unmatched
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }
}
