// ============ Collaborators ============
// Contracts for the network-facing services the SDK drives. Implementations
// own transport, timeouts and retries; errors pass through unchanged.

use async_trait::async_trait;
use gliaswap_orders::BridgeEvent;
use gliaswap_types::{CellOutput, OutPoint, Script, TransactionWithStatus};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("indexer unavailable: {0}")]
pub struct IndexerError(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Transaction query by lock (args matched as a prefix) and exact type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryOptions {
    pub lock: Script,
    /// `None` accepts any args length.
    pub args_len: Option<usize>,
    /// `None` accepts any type.
    pub type_script: Option<Script>,
    pub order: SortOrder,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveCell {
    pub out_point: OutPoint,
    pub cell: CellOutput,
}

#[async_trait]
pub trait Indexer: Send + Sync {
    async fn collect_transactions(
        &self,
        query: &QueryOptions,
    ) -> Result<Vec<TransactionWithStatus>, IndexerError>;
}

#[async_trait]
pub trait CellCollector: Send + Sync {
    /// Live cells under `lock` whose type equals `type_script` (`None`: untyped cells).
    async fn collect_cells(
        &self,
        lock: &Script,
        type_script: Option<&Script>,
    ) -> Result<Vec<LiveCell>, IndexerError>;

    async fn live_cell(&self, out_point: &OutPoint) -> Result<Option<LiveCell>, IndexerError>;
}

#[async_trait]
pub trait BridgeEventSource: Send + Sync {
    async fn bridge_history(
        &self,
        lock: &Script,
        pure_cross_only: bool,
    ) -> Result<Vec<BridgeEvent>, IndexerError>;
}
