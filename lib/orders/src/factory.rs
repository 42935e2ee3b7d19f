// ============ Order Chain Factory ============
// Rebuilds order chains from a flat set of indexed transactions.
//
// Nodes live in an arena keyed by out-point. Order-form cells seed nodes;
// each order-form node is followed into the transaction that spent it, where
// it claims exactly one successor. One transaction may consume several orders
// of the same user (a matcher batch, a cancel-and-replace), so successors are
// claimed per spending transaction in three rounds:
//
// 1. an order-form output that continues the spent order (a partial fill)
// 2. a user cell handing back exactly what the order locked up (a refund)
// 3. a user cell in the order's settled form
// 4. any user cell still unclaimed
//
// Orders of the same kind and direction settled differently in one
// transaction cannot be told apart; they take cells in input order. An order
// left without a successor dangles. Settled (user-owned) nodes end
// their chain.

use std::collections::{HashMap, HashSet};

use gliaswap_types::{
    decode_sudt_data, CellOutput, Deployment, LiquidityOrderArgs, OutPoint, Script, SwapOrderArgs, SwapOrderType,
    TransactionWithStatus,
};
use tracing::{debug, warn};

use crate::chain::{ChainNode, OrderChain, OrderKind};
use crate::error::ChainError;

/// Chains rebuilt from one transaction set, plus the orders that were dropped.
#[derive(Debug, Default)]
pub struct ChainSet<'a> {
    pub chains: Vec<OrderChain<'a>>,
    pub rejected: Vec<ChainError>,
}

struct Slot {
    tx: usize,
    index: u32,
    /// Set for cells still held by an order lock.
    order: Option<OrderKind>,
    prev: Option<usize>,
    next: Option<usize>,
    dangling: bool,
}

pub struct OrderChainFactory<'d> {
    deployment: &'d Deployment,
}

impl<'d> OrderChainFactory<'d> {
    pub fn new(deployment: &'d Deployment) -> Self {
        Self { deployment }
    }

    fn decode_order(&self, lock: &Script) -> Option<gliaswap_types::error::Result<OrderKind>> {
        let d = self.deployment;
        if d.swap_order_lock.matches(lock) {
            Some(SwapOrderArgs::deserialize(&lock.args).map(OrderKind::Swap))
        } else if d.liquidity_order_lock.matches(lock) || d.token_token_liquidity_lock.matches(lock) {
            Some(LiquidityOrderArgs::deserialize(&lock.args).map(OrderKind::Liquidity))
        } else {
            None
        }
    }

    /// Build every chain owned by `user_lock_hash`. `type_script` narrows the
    /// order cells considered; `None` accepts any type.
    pub fn build<'a>(
        &self,
        user_lock_hash: &[u8; 32],
        type_script: Option<&Script>,
        txs: &'a [TransactionWithStatus],
    ) -> ChainSet<'a> {
        let mut set = ChainSet::default();

        let mut spent_by: HashMap<OutPoint, usize> = HashMap::new();
        for (pos, tx) in txs.iter().enumerate() {
            for input in &tx.transaction.inputs {
                spent_by.entry(input.previous_output).or_insert(pos);
            }
        }

        // ---- seed order-form nodes ----
        let mut slots: Vec<Slot> = Vec::new();
        let mut by_out_point: HashMap<OutPoint, usize> = HashMap::new();
        for (pos, tx) in txs.iter().enumerate() {
            let mut seeded: Vec<&Script> = Vec::new();
            for (i, cell) in tx.transaction.outputs.iter().enumerate() {
                let index = i as u32;
                let kind = match self.decode_order(&cell.lock_script) {
                    None => continue,
                    Some(Ok(kind)) => kind,
                    Some(Err(e)) => {
                        set.rejected.push(ChainError::decode(tx.hash(), index, e));
                        continue;
                    }
                };
                if kind.user_lock_hash() != user_lock_hash {
                    continue;
                }
                if type_script.is_some_and(|t| cell.type_script.as_ref() != Some(t)) {
                    continue;
                }
                // paired sUDT/sUDT requests share one lock; the first stands for the order
                if self.deployment.token_token_liquidity_lock.matches(&cell.lock_script) {
                    if seeded.contains(&&cell.lock_script) {
                        continue;
                    }
                    seeded.push(&cell.lock_script);
                }

                by_out_point.insert(tx.out_point(index), slots.len());
                slots.push(Slot { tx: pos, index, order: Some(kind), prev: None, next: None, dangling: false });
            }
        }

        // ---- link successors ----
        let mut spent_orders: HashMap<usize, Vec<(usize, usize)>> = HashMap::new();
        for (slot, seed) in slots.iter().enumerate() {
            let out_point = txs[seed.tx].out_point(seed.index);
            let Some(&spender) = spent_by.get(&out_point) else {
                continue;
            };
            let position = txs[spender]
                .transaction
                .inputs
                .iter()
                .position(|input| input.previous_output == out_point)
                .unwrap_or(usize::MAX);
            spent_orders.entry(spender).or_default().push((position, slot));
        }

        let mut spenders: Vec<usize> = spent_orders.keys().copied().collect();
        spenders.sort_unstable();
        for spender in spenders {
            let mut spent = spent_orders.remove(&spender).unwrap_or_default();
            spent.sort_unstable();
            let spent: Vec<usize> = spent.into_iter().map(|(_, slot)| slot).collect();
            self.link_spender(user_lock_hash, spender, &spent, txs, &mut slots, &mut by_out_point);
        }

        // ---- walk from origins ----
        let mut visited: HashSet<usize> = HashSet::new();
        for origin in 0..slots.len() {
            let Some(kind) = slots[origin].order.clone() else { continue };
            if slots[origin].prev.is_some() {
                continue;
            }

            let mut path = vec![origin];
            visited.insert(origin);
            let mut at = origin;
            while let Some(next) = slots[at].next {
                if !visited.insert(next) {
                    break;
                }
                path.push(next);
                at = next;
            }

            let tip = &slots[at];
            if tip.dangling {
                let tx_hash = txs[tip.tx].hash();
                warn!(tx_hash = %gliaswap_types::hexstr::encode_prefixed(&tx_hash), index = tip.index, "dropping order with dangling lineage");
                set.rejected.push(ChainError::DanglingLineage { tx_hash, index: tip.index });
                continue;
            }

            // liveness is judged along the order's own lineage; a payout the
            // user spends later, say to fund the next order, is still the tip
            let last = path.len() - 1;
            let nodes = path
                .iter()
                .enumerate()
                .map(|(n, &slot)| {
                    let tx = &txs[slots[slot].tx];
                    ChainNode {
                        tx,
                        cell: &tx.transaction.outputs[slots[slot].index as usize],
                        index: slots[slot].index,
                        live: n == last,
                    }
                })
                .collect();
            if let Some(chain) = OrderChain::new(kind, nodes) {
                set.chains.push(chain);
            }
        }

        // ---- anything unreached hangs off a cycle ----
        for start in 0..slots.len() {
            if visited.contains(&start) || slots[start].order.is_none() {
                continue;
            }
            let mut at = start;
            while visited.insert(at) {
                match slots[at].next {
                    Some(next) => at = next,
                    None => break,
                }
            }
            let tx_hash = txs[slots[start].tx].hash();
            warn!(tx_hash = %gliaswap_types::hexstr::encode_prefixed(&tx_hash), index = slots[start].index, "dropping order caught in a lineage cycle");
            set.rejected.push(ChainError::Cycle { tx_hash, index: slots[start].index });
        }

        for error in set.rejected.iter().filter(|e| matches!(e, ChainError::Decode { .. })) {
            warn!(%error, "dropping undecodable order cell");
        }

        set.chains.sort_by(|a, b| {
            b.origin()
                .tx
                .timestamp
                .cmp(&a.origin().tx.timestamp)
                .then_with(|| a.origin().tx.hash().cmp(&b.origin().tx.hash()))
        });
        debug!(chains = set.chains.len(), rejected = set.rejected.len(), "order chains rebuilt");
        set
    }

    /// Pairs every order consumed by `spender` with at most one successor,
    /// in the input order of the spending transaction.
    fn link_spender(
        &self,
        user_lock_hash: &[u8; 32],
        spender: usize,
        spent: &[usize],
        txs: &[TransactionWithStatus],
        slots: &mut Vec<Slot>,
        by_out_point: &mut HashMap<OutPoint, usize>,
    ) {
        let tx = &txs[spender];
        let outputs = tx.transaction.outputs.len() as u32;

        let mut unlinked = Vec::new();
        for &current in spent {
            let next = (0..outputs).find_map(|i| {
                let &slot = by_out_point.get(&tx.out_point(i))?;
                let free = slots[slot].order.is_some() && slots[slot].prev.is_none();
                (free && continues(&slots[current], &slots[slot], txs)).then_some(slot)
            });
            match next {
                Some(next) => {
                    slots[next].prev = Some(current);
                    slots[current].next = Some(next);
                }
                None => unlinked.push(current),
            }
        }

        for round in [Round::Refund, Round::Settlement, Round::Any] {
            let mut left = Vec::new();
            for current in unlinked {
                let found = {
                    let kind = slots[current].order.as_ref();
                    let order_cell = &txs[slots[current].tx].transaction.outputs[slots[current].index as usize];
                    (0..outputs).find(|&i| {
                        let cell = &tx.transaction.outputs[i as usize];
                        !by_out_point.contains_key(&tx.out_point(i))
                            && &cell.lock_script.to_hash() == user_lock_hash
                            && kind.is_some_and(|k| round.accepts(k, order_cell, cell))
                    })
                };
                match found {
                    Some(index) => {
                        let next = slots.len();
                        by_out_point.insert(tx.out_point(index), next);
                        slots.push(Slot { tx: spender, index, order: None, prev: Some(current), next: None, dangling: false });
                        slots[current].next = Some(next);
                    }
                    None => left.push(current),
                }
            }
            unlinked = left;
        }

        for current in unlinked {
            slots[current].dangling = true;
        }
    }
}

/// Whether order cell `next` carries on `spent` after a partial fill: same
/// owner, same lock and type, and for swaps the same direction with no more
/// left to pay in. Anything else in the same transaction is a new order.
fn continues(spent: &Slot, next: &Slot, txs: &[TransactionWithStatus]) -> bool {
    let (Some(a), Some(b)) = (&spent.order, &next.order) else {
        return false;
    };
    let a_cell = &txs[spent.tx].transaction.outputs[spent.index as usize];
    let b_cell = &txs[next.tx].transaction.outputs[next.index as usize];
    if a_cell.type_script != b_cell.type_script
        || a_cell.lock_script.code_hash != b_cell.lock_script.code_hash
        || a_cell.lock_script.hash_type != b_cell.lock_script.hash_type
    {
        return false;
    }

    match (a, b) {
        (OrderKind::Swap(a), OrderKind::Swap(b)) => {
            a.user_lock_hash == b.user_lock_hash
                && a.order_type == b.order_type
                && b.amount_in <= a.amount_in
        }
        (OrderKind::Liquidity(a), OrderKind::Liquidity(b)) => a == b,
        _ => false,
    }
}

#[derive(Clone, Copy)]
enum Round {
    Refund,
    Settlement,
    Any,
}

impl Round {
    fn accepts(self, kind: &OrderKind, order_cell: &CellOutput, cell: &CellOutput) -> bool {
        match self {
            Round::Refund => refunds(kind, order_cell, cell),
            Round::Settlement => settles(kind, order_cell, cell),
            Round::Any => true,
        }
    }
}

/// Whether `cell` hands back what the order locked up: the paid CKB without
/// any income, the unsold sUDT in full, or the liquidity request's own asset.
fn refunds(kind: &OrderKind, order_cell: &CellOutput, cell: &CellOutput) -> bool {
    match kind {
        OrderKind::Swap(args) => match args.order_type {
            SwapOrderType::BuyCkb => cell.type_script.is_none() && cell.capacity <= order_cell.capacity,
            SwapOrderType::SellCkb => {
                cell.type_script.is_some()
                    && cell.type_script == order_cell.type_script
                    && decode_sudt_data(&cell.data)
                        .is_ok_and(|amount| decode_sudt_data(&order_cell.data).is_ok_and(|locked| amount == locked))
            }
        },
        OrderKind::Liquidity(_) => cell.type_script.is_some() && cell.type_script == order_cell.type_script,
    }
}

/// Whether `cell` is what a filled order pays out: the sUDT bought, capacity
/// above the order cell's own for a sale, or for a liquidity request
/// something other than what it locked up.
fn settles(kind: &OrderKind, order_cell: &CellOutput, cell: &CellOutput) -> bool {
    match kind {
        OrderKind::Swap(args) => match args.order_type {
            SwapOrderType::BuyCkb => cell.type_script.is_some() && cell.type_script == order_cell.type_script,
            SwapOrderType::SellCkb => cell.type_script.is_none() && cell.capacity > order_cell.capacity,
        },
        OrderKind::Liquidity(_) => cell.type_script != order_cell.type_script,
    }
}
