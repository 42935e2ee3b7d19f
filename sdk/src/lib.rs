// ============ Gliaswap SDK ============
// Off-chain entry points: order history reconstruction against an indexer,
// and unsigned transaction building for swap, liquidity and cancel requests.
// Transactions come back unsigned with a witness placeholder for any CKB wallet.

pub mod builder;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod memory;
pub mod request;
pub mod service;


pub use builder::TransactionBuilder;
pub use collaborators::{
    BridgeEventSource, CellCollector, Indexer, IndexerError, LiveCell, QueryOptions, SortOrder,
};
pub use config::SdkConfig;
pub use error::{Result, SdkError};
pub use memory::MemoryLedger;
pub use request::{
    AddLiquidityRequest, AssetAmount, CancelRequest, GenesisLiquidityRequest,
    RemoveLiquidityRequest, SwapRequest, TransactionWithFee,
};
pub use service::OrderService;
