// ============ Liquidity Orders ============
// Add/remove requests against a pool. CKB/sUDT pools use one request cell;
// sUDT/sUDT pools put a pair of request cells under the token-token lock.

use gliaswap_types::{
    decode_sudt_data, CellOutput, LiquidityOrderArgs, PoolInfo, Script, TransactionWithStatus,
};

use crate::chain::{OrderChain, OrderContext, OrderHistory, OrderStatus, OrderType, Stage};
use crate::error::{ChainError, Result};

pub fn pool<'r>(args: &LiquidityOrderArgs, ctx: &OrderContext<'r>) -> Result<&'r PoolInfo> {
    ctx.registry
        .pool_by_id(&args.info_type_hash)
        .ok_or(ChainError::UnknownPool { pool_id: args.info_type_hash })
}

/// Add requests carry a registered sUDT; remove requests carry the LP token.
pub fn order_type(chain: &OrderChain<'_>, ctx: &OrderContext<'_>) -> OrderType {
    let registered = chain
        .origin()
        .cell
        .type_script
        .as_ref()
        .is_some_and(|t| ctx.registry.token_by_type_hash(&t.to_hash()).is_some());
    if registered {
        OrderType::Add
    } else {
        OrderType::Remove
    }
}

fn lp_type_script(pool: &PoolInfo, ctx: &OrderContext<'_>) -> Result<Script> {
    pool.lp_token_type_script(&ctx.deployment.sudt_type.script)
        .ok_or(ChainError::MissingInfoCell { pool_id: pool.pool_id })
}

/// LP-token cell test for this pool's flavour. LP minted by an sUDT/sUDT add
/// sits under the token-token lock; LP handed back to the user, from a
/// refunded remove or any CKB/sUDT pool, sits under the user's own lock.
fn lp_cell_matcher<'c>(
    pool: &PoolInfo,
    args: &'c LiquidityOrderArgs,
    order_type: OrderType,
    ctx: &'c OrderContext<'_>,
) -> Result<Box<dyn Fn(&CellOutput) -> bool + 'c>> {
    let owned = move |cell: &CellOutput| cell.lock_script.to_hash() == args.user_lock_hash;
    if pool.is_sudt_sudt() {
        let lp_type = lp_type_script(pool, ctx)?;
        let lock = &ctx.deployment.token_token_liquidity_lock;
        Ok(Box::new(move |cell| {
            let held = match order_type {
                OrderType::Remove => owned(cell),
                _ => lock.matches(&cell.lock_script),
            };
            held && cell.type_script.as_ref() == Some(&lp_type)
        }))
    } else {
        let sudt = &ctx.deployment.sudt_type;
        let args_len = ctx.deployment.lp_token_args_len;
        Ok(Box::new(move |cell| {
            owned(cell)
                && cell
                    .type_script
                    .as_ref()
                    .is_some_and(|t| sudt.matches(t) && t.args.len() == args_len)
        }))
    }
}

pub fn status(
    chain: &OrderChain<'_>,
    args: &LiquidityOrderArgs,
    ctx: &OrderContext<'_>,
) -> Result<OrderStatus> {
    if !chain.is_processed() {
        return Ok(if chain.origin().tx.is_pending() {
            OrderStatus::Pending
        } else {
            OrderStatus::Open
        });
    }

    let pool = pool(args, ctx)?;
    let order_type = order_type(chain, ctx);
    let is_lp = lp_cell_matcher(pool, args, order_type, ctx)?;
    let tip = chain.tip();
    let has_lp = tip.tx.transaction.outputs.iter().any(|o| is_lp(o));

    // a settled add mints LP tokens; a refunded remove hands them back
    let canceled = match order_type {
        OrderType::Remove => has_lp,
        _ => !has_lp,
    };
    Ok(OrderStatus::settled(tip.tx.is_pending(), canceled))
}

/// First request output under the token-token lock carrying `type_script`.
fn find_output<'t>(
    tx: &'t TransactionWithStatus,
    ctx: &OrderContext<'_>,
    type_script: Option<&Script>,
) -> Result<(u32, &'t CellOutput)> {
    let lock = &ctx.deployment.token_token_liquidity_lock;
    tx.transaction
        .outputs
        .iter()
        .enumerate()
        .find(|(_, o)| lock.matches(&o.lock_script) && o.has_type(type_script))
        .map(|(i, o)| (i as u32, o))
        .ok_or(ChainError::MissingRequestOutput { tx_hash: tx.hash() })
}

fn sudt_amount(tx: &TransactionWithStatus, (index, cell): (u32, &CellOutput)) -> Result<u128> {
    decode_sudt_data(&cell.data).map_err(|e| ChainError::decode(tx.hash(), index, e))
}

/// (token A, token B) amounts, read from the request transaction.
pub fn amounts(
    chain: &OrderChain<'_>,
    args: &LiquidityOrderArgs,
    pool: &PoolInfo,
    ctx: &OrderContext<'_>,
) -> Result<(u128, u128)> {
    let origin = chain.origin();
    let request_tx = origin.tx;
    let order_type = order_type(chain, ctx);

    if pool.is_sudt_sudt() {
        return match order_type {
            OrderType::Remove => {
                let lp_type = lp_type_script(pool, ctx)?;
                let burn = find_output(request_tx, ctx, Some(&lp_type))?;
                let lp = sudt_amount(request_tx, burn)?;
                Ok((lp, lp))
            }
            _ => {
                let a = find_output(request_tx, ctx, pool.token_a.type_script.as_ref())?;
                let b = find_output(request_tx, ctx, pool.token_b.type_script.as_ref())?;
                Ok((sudt_amount(request_tx, a)?, sudt_amount(request_tx, b)?))
            }
        };
    }

    match order_type {
        OrderType::Remove => Ok((args.ckb_min as u128, args.sudt_min)),
        _ => {
            let reserved = ctx.deployment.min_sudt_cell_capacity.saturating_mul(2);
            let ckb = origin.cell.capacity.saturating_sub(reserved) as u128;
            let sudt = decode_sudt_data(origin.data())
                .map_err(|e| ChainError::decode(request_tx.hash(), origin.index, e))?;
            Ok((ckb, sudt))
        }
    }
}

pub fn history(chain: &OrderChain<'_>, args: &LiquidityOrderArgs, ctx: &OrderContext<'_>) -> Result<OrderHistory> {
    let pool = pool(args, ctx)?;
    let (a, b) = amounts(chain, args, pool, ctx)?;

    Ok(OrderHistory {
        pool_id: Some(pool.pool_id),
        transaction_hash: chain.tip().tx.hash(),
        timestamp: chain.origin().tx.timestamp,
        amount_in: pool.token_a.with_balance(a),
        amount_out: pool.token_b.with_balance(b),
        stage: Stage {
            status: status(chain, args, ctx)?,
            steps: chain.steps(None),
        },
        order_type: order_type(chain, ctx),
    })
}
