// ============ Order Chains ============
// One logical order as the lineage of cells it occupied, origin first.
// Nodes borrow from the transaction set they were reconstructed from.

use gliaswap_types::{
    CellOutput, Deployment, LiquidityOrderArgs, OutPoint, Registry, SwapOrderArgs, TokenAmount,
    TransactionWithStatus,
};
use serde::Serialize;

use crate::bridge::{BridgeDirection, BridgeEvent};

#[derive(Clone, Copy, Debug)]
pub struct ChainNode<'a> {
    pub tx: &'a TransactionWithStatus,
    pub cell: &'a CellOutput,
    pub index: u32,
    /// The cell is unspent in the observed transaction set.
    pub live: bool,
}

impl<'a> ChainNode<'a> {
    pub fn out_point(&self) -> OutPoint {
        self.tx.out_point(self.index)
    }

    pub fn data(&self) -> &'a [u8] {
        &self.cell.data
    }

    pub fn step(&self) -> Step {
        Step {
            transaction_hash: self.tx.hash(),
            index: Some(self.index),
        }
    }
}

/// Order parameters decoded from the origin cell's lock args.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderKind {
    Swap(SwapOrderArgs),
    Liquidity(LiquidityOrderArgs),
}

impl OrderKind {
    pub fn user_lock_hash(&self) -> &[u8; 32] {
        match self {
            OrderKind::Swap(args) => &args.user_lock_hash,
            OrderKind::Liquidity(args) => &args.user_lock_hash,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrderChain<'a> {
    kind: OrderKind,
    nodes: Vec<ChainNode<'a>>,
}

impl<'a> OrderChain<'a> {
    /// `nodes` runs origin to tip; only the tip may be live.
    pub(crate) fn new(kind: OrderKind, nodes: Vec<ChainNode<'a>>) -> Option<Self> {
        let (tip, rest) = nodes.split_last()?;
        if !tip.live || rest.iter().any(|n| n.live) {
            return None;
        }
        Some(Self { kind, nodes })
    }

    pub fn kind(&self) -> &OrderKind {
        &self.kind
    }

    pub fn nodes(&self) -> &[ChainNode<'a>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn origin(&self) -> &ChainNode<'a> {
        &self.nodes[0]
    }

    pub fn tip(&self) -> &ChainNode<'a> {
        &self.nodes[self.nodes.len() - 1]
    }

    /// The origin cell has been consumed at least once.
    pub fn is_processed(&self) -> bool {
        self.nodes.len() > 1
    }

    /// Origin-to-tip steps, led by the tip once it is confirmed, and wrapped
    /// by the ETH side of a correlated bridge transfer.
    pub fn steps(&self, bridge: Option<&BridgeEvent>) -> Vec<Step> {
        let mut steps = Vec::with_capacity(self.nodes.len() + 3);

        if let Some(event) = bridge.filter(|e| e.direction == BridgeDirection::In) {
            // submit + lock confirmation; the ETH side has no output index
            steps.push(Step::external(event.eth_tx_hash));
            steps.push(Step::external(event.eth_tx_hash));
        }

        let tip = self.tip();
        if !tip.tx.is_pending() {
            steps.push(tip.step());
        }
        steps.extend(self.nodes.iter().map(ChainNode::step));

        if let Some(event) = bridge.filter(|e| e.direction == BridgeDirection::Out) {
            steps.push(Step::external(event.eth_tx_hash));
        }

        steps
    }
}

// ============ History View ============

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Open,
    Canceling,
    Canceled,
    Completed,
}

impl OrderStatus {
    /// Resolution of an order whose origin cell has been consumed.
    pub(crate) fn settled(tip_pending: bool, canceled: bool) -> Self {
        match (canceled, tip_pending) {
            (true, true) => OrderStatus::Canceling,
            (true, false) => OrderStatus::Canceled,
            (false, true) => OrderStatus::Open,
            (false, false) => OrderStatus::Completed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum OrderType {
    Order,
    CrossChain,
    CrossChainOrder,
    #[serde(rename = "add")]
    Add,
    #[serde(rename = "remove")]
    Remove,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(with = "gliaswap_types::hexstr::fixed")]
    pub transaction_hash: [u8; 32],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl Step {
    pub fn external(transaction_hash: [u8; 32]) -> Self {
        Self { transaction_hash, index: None }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub status: OrderStatus,
    pub steps: Vec<Step>,
}

/// Read-only view of one order, recomputed on every query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistory {
    #[serde(
        with = "gliaswap_types::hexstr::option_fixed",
        skip_serializing_if = "Option::is_none"
    )]
    pub pool_id: Option<[u8; 32]>,
    #[serde(with = "gliaswap_types::hexstr::fixed")]
    pub transaction_hash: [u8; 32],
    pub timestamp: u64,
    pub amount_in: TokenAmount,
    pub amount_out: TokenAmount,
    pub stage: Stage,
    #[serde(rename = "type")]
    pub order_type: OrderType,
}

/// Read-only lookups an order needs to describe itself.
#[derive(Clone, Copy, Debug)]
pub struct OrderContext<'r> {
    pub registry: &'r Registry,
    pub deployment: &'r Deployment,
}
