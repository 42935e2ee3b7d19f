// ============ In-Memory Ledger ============
// A transaction store that answers every collaborator contract locally.
// Backs the SDK's tests and offline demos.

use std::collections::HashSet;

use async_trait::async_trait;
use gliaswap_orders::{BridgeEvent, BridgeKind};
use gliaswap_types::{CellOutput, OutPoint, Script, TransactionWithStatus};

use crate::collaborators::{
    BridgeEventSource, CellCollector, Indexer, IndexerError, LiveCell, QueryOptions, SortOrder,
};

#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    txs: Vec<TransactionWithStatus>,
    events: Vec<BridgeEvent>,
    offline: bool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tx: TransactionWithStatus) {
        self.txs.push(tx);
    }

    pub fn push_event(&mut self, event: BridgeEvent) {
        self.events.push(event);
    }

    /// Every query fails while offline.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn transactions(&self) -> &[TransactionWithStatus] {
        &self.txs
    }

    fn check_online(&self) -> Result<(), IndexerError> {
        if self.offline {
            return Err(IndexerError("memory ledger offline".to_string()));
        }
        Ok(())
    }

    fn output(&self, out_point: &OutPoint) -> Option<&CellOutput> {
        self.txs
            .iter()
            .find(|t| t.hash() == out_point.tx_hash)
            .and_then(|t| t.transaction.outputs.get(out_point.index as usize))
    }

    fn spent(&self) -> HashSet<OutPoint> {
        self.txs
            .iter()
            .flat_map(|t| t.transaction.inputs.iter().map(|i| i.previous_output))
            .collect()
    }

    fn live_cells(&self) -> Vec<LiveCell> {
        let spent = self.spent();
        let mut cells = Vec::new();
        for tx in &self.txs {
            for (i, cell) in tx.transaction.outputs.iter().enumerate() {
                let out_point = tx.out_point(i as u32);
                if !spent.contains(&out_point) {
                    cells.push(LiveCell { out_point, cell: cell.clone() });
                }
            }
        }
        cells
    }
}

fn matches_query(cell: &CellOutput, query: &QueryOptions) -> bool {
    let lock = &cell.lock_script;
    lock.same_code(&query.lock.code_hash, query.lock.hash_type)
        && lock.args.starts_with(&query.lock.args)
        && query.args_len.map_or(true, |len| lock.args.len() == len)
        && query
            .type_script
            .as_ref()
            .map_or(true, |t| cell.type_script.as_ref() == Some(t))
}

#[async_trait]
impl Indexer for MemoryLedger {
    async fn collect_transactions(
        &self,
        query: &QueryOptions,
    ) -> Result<Vec<TransactionWithStatus>, IndexerError> {
        self.check_online()?;
        let mut found: Vec<TransactionWithStatus> = self
            .txs
            .iter()
            .filter(|t| {
                t.transaction.outputs.iter().any(|o| matches_query(o, query))
                    || t.transaction
                        .inputs
                        .iter()
                        .filter_map(|i| self.output(&i.previous_output))
                        .any(|o| matches_query(o, query))
            })
            .cloned()
            .collect();

        found.sort_by_key(|t| t.timestamp);
        if query.order == SortOrder::Desc {
            found.reverse();
        }
        Ok(found)
    }
}

#[async_trait]
impl CellCollector for MemoryLedger {
    async fn collect_cells(
        &self,
        lock: &Script,
        type_script: Option<&Script>,
    ) -> Result<Vec<LiveCell>, IndexerError> {
        self.check_online()?;
        Ok(self
            .live_cells()
            .into_iter()
            .filter(|c| &c.cell.lock_script == lock && c.cell.type_script.as_ref() == type_script)
            .collect())
    }

    async fn live_cell(&self, out_point: &OutPoint) -> Result<Option<LiveCell>, IndexerError> {
        self.check_online()?;
        Ok(self.live_cells().into_iter().find(|c| &c.out_point == out_point))
    }
}

#[async_trait]
impl BridgeEventSource for MemoryLedger {
    async fn bridge_history(
        &self,
        lock: &Script,
        pure_cross_only: bool,
    ) -> Result<Vec<BridgeEvent>, IndexerError> {
        self.check_online()?;
        let user = lock.to_hash();
        Ok(self
            .events
            .iter()
            .filter(|e| e.user_lock_hash == user)
            .filter(|e| !pure_cross_only || e.kind == BridgeKind::PureCross)
            .cloned()
            .collect())
    }
}
