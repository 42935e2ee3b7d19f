// ============ Swap Orders ============
// Status and fill derivation for swap chains. A swap either still sits in
// the order lock, or has been settled into a cell owned by the user.

use gliaswap_types::{decode_sudt_data, SwapOrderArgs, SwapOrderType, Token};

use crate::bridge::{BridgeEvent, BridgeKind};
use crate::chain::{OrderChain, OrderContext, OrderHistory, OrderStatus, OrderType, Stage};
use crate::error::{ChainError, Result};

/// What the user received once the order cell was consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub received: u128,
    pub refunded: bool,
}

/// `None` while the tip is still held by the swap order lock.
pub fn settlement(chain: &OrderChain<'_>, args: &SwapOrderArgs, ctx: &OrderContext<'_>) -> Result<Option<Settlement>> {
    let tip = chain.tip();
    if !chain.is_processed() || ctx.deployment.swap_order_lock.matches(&tip.cell.lock_script) {
        return Ok(None);
    }

    let settlement = match args.order_type {
        SwapOrderType::BuyCkb => {
            if tip.cell.type_script.is_none() {
                // refund of the paid CKB carries no sUDT
                Settlement { received: 0, refunded: true }
            } else {
                let received = decode_sudt_data(tip.data())
                    .map_err(|e| ChainError::decode(tip.tx.hash(), tip.index, e))?;
                Settlement {
                    received,
                    refunded: received < args.min_amount_out,
                }
            }
        }
        SwapOrderType::SellCkb => {
            let origin = chain.origin().cell.capacity;
            match tip.cell.capacity.checked_sub(origin) {
                Some(income) => Settlement {
                    received: income as u128,
                    refunded: (income as u128) < args.min_amount_out,
                },
                None => Settlement { received: 0, refunded: true },
            }
        }
    };
    Ok(Some(settlement))
}

pub fn status(chain: &OrderChain<'_>, settlement: Option<Settlement>) -> OrderStatus {
    let tip_pending = chain.tip().tx.is_pending();
    match settlement {
        None if chain.len() == 1 && tip_pending => OrderStatus::Pending,
        None => OrderStatus::Open,
        Some(s) => OrderStatus::settled(tip_pending, s.refunded),
    }
}

pub fn order_type(bridge: Option<&BridgeEvent>) -> OrderType {
    match bridge.map(|e| e.kind) {
        None => OrderType::Order,
        Some(BridgeKind::PureCross) => OrderType::CrossChain,
        Some(BridgeKind::CrossChainOrder) => OrderType::CrossChainOrder,
    }
}

/// (paid, received) tokens. The sUDT side is identified by the order cell's type.
fn tokens(chain: &OrderChain<'_>, args: &SwapOrderArgs, ctx: &OrderContext<'_>) -> Result<(Token, Token)> {
    let origin = chain.origin();
    let type_hash = origin
        .cell
        .type_script
        .as_ref()
        .map(|s| s.to_hash())
        .ok_or(ChainError::UnknownAsset { type_hash: gliaswap_types::CKB_TYPE_HASH })?;
    let sudt = ctx
        .registry
        .token_by_type_hash(&type_hash)
        .ok_or(ChainError::UnknownAsset { type_hash })?
        .clone();

    Ok(match args.order_type {
        SwapOrderType::BuyCkb => (Token::ckb(), sudt),
        SwapOrderType::SellCkb => (sudt, Token::ckb()),
    })
}

pub fn history(
    chain: &OrderChain<'_>,
    args: &SwapOrderArgs,
    bridge: Option<&BridgeEvent>,
    ctx: &OrderContext<'_>,
) -> Result<OrderHistory> {
    let settlement = settlement(chain, args, ctx)?;
    let (paid, wanted) = tokens(chain, args, ctx)?;
    let received = settlement.map_or(args.min_amount_out, |s| s.received);

    Ok(OrderHistory {
        pool_id: None,
        transaction_hash: chain.tip().tx.hash(),
        timestamp: chain.origin().tx.timestamp,
        amount_in: paid.with_balance(args.amount_in),
        amount_out: wanted.with_balance(received),
        stage: Stage {
            status: status(chain, settlement),
            steps: chain.steps(bridge),
        },
        order_type: order_type(bridge),
    })
}
