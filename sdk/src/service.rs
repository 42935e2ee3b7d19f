// ============ Order Service ============
// Fetches a user's order transactions and turns them into history views.
// Indexer calls are the only suspension points; reconstruction is sync.

use futures::future::try_join_all;
use gliaswap_orders::{
    order_histories, BridgeMatch, OrderChain, OrderChainFactory, OrderContext, OrderHistory,
    OrderKind,
};
use gliaswap_types::{LiquidityOrderArgs, Registry, Script, SwapOrderArgs, TransactionWithStatus};
use tracing::debug;

use crate::collaborators::{BridgeEventSource, Indexer, QueryOptions, SortOrder};
use crate::config::SdkConfig;
use crate::error::Result;

pub struct OrderService<'r, I, B> {
    config: &'r SdkConfig,
    registry: &'r Registry,
    indexer: I,
    bridge: B,
}

impl<'r, I: Indexer, B: BridgeEventSource> OrderService<'r, I, B> {
    pub fn new(config: &'r SdkConfig, registry: &'r Registry, indexer: I, bridge: B) -> Self {
        Self { config, registry, indexer, bridge }
    }

    fn context(&self) -> OrderContext<'r> {
        OrderContext {
            registry: self.registry,
            deployment: &self.config.deployment,
        }
    }

    /// Swap orders of `lock`, one indexer query per registered sUDT.
    pub async fn swap_orders(&self, lock: &Script) -> Result<Vec<OrderHistory>> {
        let user = lock.to_hash();
        let order_lock = self.config.deployment.swap_order_lock.with_args(user.to_vec());
        let queries: Vec<QueryOptions> = self
            .registry
            .type_scripts()
            .into_iter()
            .map(|type_script| QueryOptions {
                lock: order_lock.clone(),
                args_len: Some(SwapOrderArgs::SERIALIZED_SIZE),
                type_script: Some(type_script.clone()),
                order: SortOrder::Desc,
            })
            .collect();

        let (tx_sets, events) = futures::try_join!(
            try_join_all(queries.iter().map(|q| self.indexer.collect_transactions(q))),
            self.bridge.bridge_history(lock, false),
        )?;

        let factory = OrderChainFactory::new(&self.config.deployment);
        let mut chains: Vec<OrderChain<'_>> = Vec::new();
        for (txs, query) in tx_sets.iter().zip(&queries) {
            chains.extend(factory.build(&user, query.type_script.as_ref(), txs).chains);
        }

        let bridge = BridgeMatch::correlate(events, &chains, self.config.bridge_tolerance_ms);
        let mut histories = order_histories(&chains, &bridge, &self.context());
        newest_first(&mut histories);
        debug!(
            queries = queries.len(),
            chains = chains.len(),
            bridged = bridge.attached_count(),
            "swap orders rebuilt"
        );
        Ok(histories)
    }

    /// Liquidity orders of `lock`, optionally narrowed to one pool.
    pub async fn liquidity_orders(&self, lock: &Script, pool_id: Option<[u8; 32]>) -> Result<Vec<OrderHistory>> {
        let user = lock.to_hash();
        let d = &self.config.deployment;
        // liquidity args open with the pool's info type hash, not the user's
        // lock hash, so only a pool can narrow the query; the user is picked
        // out during reconstruction
        let prefix = pool_id.map_or_else(Vec::new, |pool| pool.to_vec());
        let queries = [&d.liquidity_order_lock, &d.token_token_liquidity_lock].map(|l| QueryOptions {
            lock: l.with_args(prefix.clone()),
            args_len: Some(LiquidityOrderArgs::SERIALIZED_SIZE),
            type_script: None,
            order: SortOrder::Desc,
        });

        let tx_sets = try_join_all(queries.iter().map(|q| self.indexer.collect_transactions(q))).await?;
        let txs = merge_by_hash(tx_sets);

        let chains: Vec<OrderChain<'_>> = OrderChainFactory::new(d)
            .build(&user, None, &txs)
            .chains
            .into_iter()
            .filter(|chain| match (chain.kind(), &pool_id) {
                (OrderKind::Liquidity(args), Some(pool)) => &args.info_type_hash == pool,
                (OrderKind::Liquidity(_), None) => true,
                (OrderKind::Swap(_), _) => false,
            })
            .collect();

        let mut histories = order_histories(&chains, &BridgeMatch::default(), &self.context());
        newest_first(&mut histories);
        debug!(transactions = txs.len(), chains = chains.len(), "liquidity orders rebuilt");
        Ok(histories)
    }

    /// Every order of `lock`, newest first.
    pub async fn reconstruct_orders(&self, lock: &Script) -> Result<Vec<OrderHistory>> {
        let (mut swaps, liquidity) =
            futures::try_join!(self.swap_orders(lock), self.liquidity_orders(lock, None))?;
        swaps.extend(liquidity);
        newest_first(&mut swaps);
        Ok(swaps)
    }
}

fn newest_first(histories: &mut [OrderHistory]) {
    histories.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// One copy of each transaction across several query results, newest first.
fn merge_by_hash(sets: Vec<Vec<TransactionWithStatus>>) -> Vec<TransactionWithStatus> {
    let mut merged: Vec<TransactionWithStatus> = Vec::new();
    for tx in sets.into_iter().flatten() {
        if !merged.iter().any(|t| t.hash() == tx.hash()) {
            merged.push(tx);
        }
    }
    merged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    merged
}
