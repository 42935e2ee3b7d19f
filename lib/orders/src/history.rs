// ============ Order History ============
// Kind dispatch from a reconstructed chain to its history view.

use tracing::warn;

use crate::bridge::{BridgeEvent, BridgeMatch};
use crate::chain::{OrderChain, OrderContext, OrderHistory, OrderKind};
use crate::error::Result;
use crate::{liquidity, swap};

pub fn order_history(
    chain: &OrderChain<'_>,
    bridge: Option<&BridgeEvent>,
    ctx: &OrderContext<'_>,
) -> Result<OrderHistory> {
    match chain.kind() {
        OrderKind::Swap(args) => swap::history(chain, args, bridge, ctx),
        OrderKind::Liquidity(args) => liquidity::history(chain, args, ctx),
    }
}

/// Histories for every chain that can describe itself. An order that fails
/// is logged and left out; the rest are returned in chain order.
pub fn order_histories(
    chains: &[OrderChain<'_>],
    bridge: &BridgeMatch,
    ctx: &OrderContext<'_>,
) -> Vec<OrderHistory> {
    chains
        .iter()
        .filter_map(|chain| match order_history(chain, bridge.event_for(chain), ctx) {
            Ok(history) => Some(history),
            Err(error) => {
                warn!(%error, "skipping order");
                None
            }
        })
        .collect()
}
