// ============ Gliaswap Order Engine ============
// Rebuilds order lineages from indexed transactions and derives each
// order's status, fill amounts and step history. Pure and synchronous:
// everything here works over a transaction set fetched by the caller.

pub mod bridge;
pub mod chain;
pub mod error;
pub mod factory;
pub mod history;
pub mod liquidity;
pub mod swap;

#[cfg(test)]
mod testing;

pub use bridge::{BridgeDirection, BridgeEvent, BridgeKind, BridgeMatch};
pub use chain::{
    ChainNode, OrderChain, OrderContext, OrderHistory, OrderKind, OrderStatus, OrderType, Stage,
    Step,
};
pub use error::ChainError;
pub use factory::{ChainSet, OrderChainFactory};
pub use history::{order_histories, order_history};
