// ============ Shared Test World ============
// The bundled testnet deployment, a two-pool registry, and cell builders
// for every shape the order engine and builder deal in.

use gliaswap_orders::{
    order_history, OrderChain, OrderChainFactory, OrderContext, OrderHistory,
};
use gliaswap_sdk::SdkConfig;
use gliaswap_types::{
    encode_sudt_data, CellInput, CellOutput, HashType, LiquidityOrderArgs, OutPoint, PoolInfo,
    Registry, Script, SwapOrderArgs, SwapOrderType, TipsArgs, Token, TokenInfo, Transaction,
    TransactionWithStatus, TxStatus, UnsignedTransaction, ORDER_VERSION, SHANNONS_PER_BYTE,
};

pub const CKB: u64 = SHANNONS_PER_BYTE;
pub const ORDER_CAPACITY: u64 = 300 * CKB;

// ============ Transactions ============

pub fn transaction(
    hash: u8,
    status: TxStatus,
    spends: Vec<OutPoint>,
    outputs: Vec<CellOutput>,
) -> TransactionWithStatus {
    TransactionWithStatus {
        transaction: Transaction {
            hash: [hash; 32],
            inputs: spends.into_iter().map(CellInput::new).collect(),
            outputs,
        },
        status,
        timestamp: 1_000 * hash as u64,
    }
}

pub fn committed(hash: u8, spends: Vec<OutPoint>, outputs: Vec<CellOutput>) -> TransactionWithStatus {
    transaction(hash, TxStatus::Committed, spends, outputs)
}

pub fn pending(hash: u8, spends: Vec<OutPoint>, outputs: Vec<CellOutput>) -> TransactionWithStatus {
    transaction(hash, TxStatus::Pending, spends, outputs)
}

/// A built transaction as the indexer would report it once broadcast.
pub fn broadcast(hash: u8, status: TxStatus, tx: &UnsignedTransaction) -> TransactionWithStatus {
    TransactionWithStatus {
        transaction: Transaction {
            hash: [hash; 32],
            inputs: tx.inputs.clone(),
            outputs: tx.outputs.clone(),
        },
        status,
        timestamp: 1_000 * hash as u64,
    }
}

pub fn op(hash: u8, index: u32) -> OutPoint {
    OutPoint::new([hash; 32], index)
}

// ============ World ============

fn info(symbol: &str) -> TokenInfo {
    TokenInfo {
        name: symbol.to_string(),
        symbol: symbol.to_string(),
        decimal: 8,
        logo_uri: String::new(),
    }
}

pub struct World {
    pub config: SdkConfig,
    pub registry: Registry,
}

impl World {
    pub fn new() -> Self {
        let config = SdkConfig::testnet().unwrap();
        let d = &config.deployment;
        let glia = Token::sudt(d.sudt_type.with_args(vec![0x01; 32]), info("GLIA"));
        let eth = Token::sudt(d.sudt_type.with_args(vec![0x02; 32]), info("ETH"));

        let pool = |owner: u8, token_a: &Token, token_b: &Token| {
            let type_script = d.info_type.with_args(vec![owner; 32]);
            PoolInfo {
                pool_id: type_script.to_hash(),
                token_a: token_a.clone(),
                token_b: token_b.clone(),
                info_cell: Some(CellOutput {
                    capacity: 250 * CKB,
                    lock_script: Script::new([0x61; 32], HashType::Type, vec![owner; 32]),
                    type_script: Some(type_script),
                    data: vec![],
                }),
            }
        };

        let pools = vec![pool(0x01, &Token::ckb(), &glia), pool(0x02, &glia, &eth)];
        let registry = Registry::new(vec![Token::ckb(), glia, eth], pools);
        Self { config, registry }
    }

    pub fn context(&self) -> OrderContext<'_> {
        OrderContext {
            registry: &self.registry,
            deployment: &self.config.deployment,
        }
    }

    pub fn user_lock(&self) -> Script {
        self.config.deployment.user_locks[0].with_args(vec![0x11; 20])
    }

    pub fn stranger_lock(&self) -> Script {
        self.config.deployment.user_locks[0].with_args(vec![0x22; 20])
    }

    pub fn glia(&self) -> Script {
        self.config.deployment.sudt_type.with_args(vec![0x01; 32])
    }

    pub fn eth(&self) -> Script {
        self.config.deployment.sudt_type.with_args(vec![0x02; 32])
    }

    pub fn single_pool(&self) -> &PoolInfo {
        &self.registry.pools()[0]
    }

    pub fn dual_pool(&self) -> &PoolInfo {
        &self.registry.pools()[1]
    }

    pub fn single_lp(&self) -> Script {
        self.config.deployment.sudt_type.with_args(vec![0x51; 65])
    }

    pub fn dual_lp(&self) -> Script {
        self.dual_pool()
            .lp_token_type_script(&self.config.deployment.sudt_type.script)
            .unwrap()
    }

    // ============ Order Cells ============

    pub fn swap_args(&self, order_type: SwapOrderType, amount_in: u128, min_amount_out: u128) -> SwapOrderArgs {
        SwapOrderArgs {
            user_lock_hash: self.user_lock().to_hash(),
            version: ORDER_VERSION,
            amount_in,
            min_amount_out,
            order_type,
        }
    }

    pub fn swap_cell(&self, args: &SwapOrderArgs) -> CellOutput {
        let sudt = match args.order_type {
            SwapOrderType::SellCkb => args.amount_in,
            SwapOrderType::BuyCkb => 0,
        };
        CellOutput {
            capacity: ORDER_CAPACITY,
            lock_script: self
                .config
                .deployment
                .swap_order_lock
                .with_args(args.serialize().to_vec()),
            type_script: Some(self.glia()),
            data: encode_sudt_data(sudt).to_vec(),
        }
    }

    pub fn liquidity_args(&self, pool: &PoolInfo, ckb_min: u64, sudt_min: u128) -> LiquidityOrderArgs {
        LiquidityOrderArgs {
            info_type_hash: pool.pool_id,
            version: ORDER_VERSION,
            sudt_min,
            ckb_min,
            user_lock_hash: self.user_lock().to_hash(),
            tips: TipsArgs::default(),
        }
    }

    /// CKB/GLIA request cell: `capacity` CKB-side funds, `amount` of `type_script`.
    pub fn single_request(&self, args: &LiquidityOrderArgs, capacity: u64, type_script: Script, amount: u128) -> CellOutput {
        CellOutput {
            capacity,
            lock_script: self
                .config
                .deployment
                .liquidity_order_lock
                .with_args(args.serialize().to_vec()),
            type_script: Some(type_script),
            data: encode_sudt_data(amount).to_vec(),
        }
    }

    pub fn pair_request(&self, args: &LiquidityOrderArgs, type_script: Script, amount: u128) -> CellOutput {
        CellOutput {
            capacity: 235 * CKB,
            lock_script: self
                .config
                .deployment
                .token_token_liquidity_lock
                .with_args(args.serialize().to_vec()),
            type_script: Some(type_script),
            data: encode_sudt_data(amount).to_vec(),
        }
    }

    // ============ User Cells ============

    pub fn user_sudt(&self, type_script: Script, amount: u128) -> CellOutput {
        CellOutput {
            capacity: 142 * CKB,
            lock_script: self.user_lock(),
            type_script: Some(type_script),
            data: encode_sudt_data(amount).to_vec(),
        }
    }

    pub fn user_plain(&self, capacity: u64) -> CellOutput {
        CellOutput {
            capacity,
            lock_script: self.user_lock(),
            type_script: None,
            data: vec![],
        }
    }

    // ============ Reconstruction ============

    pub fn chains<'a>(&self, type_script: Option<&Script>, txs: &'a [TransactionWithStatus]) -> Vec<OrderChain<'a>> {
        OrderChainFactory::new(&self.config.deployment)
            .build(&self.user_lock().to_hash(), type_script, txs)
            .chains
    }

    /// History of every GLIA swap chain in `txs`, without bridge events.
    pub fn swap_histories(&self, txs: &[TransactionWithStatus]) -> Vec<OrderHistory> {
        let glia = self.glia();
        self.chains(Some(&glia), txs)
            .iter()
            .map(|chain| order_history(chain, None, &self.context()).unwrap())
            .collect()
    }
}
