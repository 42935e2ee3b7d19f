// Shared fixtures for unit tests across the order modules.

use gliaswap_types::{
    encode_sudt_data, CellDep, CellOutput, DepType, DeployedScript, Deployment, HashType,
    LiquidityOrderArgs, OutPoint, PoolInfo, Registry, Script, ScriptRef, SwapOrderArgs,
    SwapOrderType, Token, TokenInfo, SHANNONS_PER_BYTE,
};

use crate::bridge::{BridgeDirection, BridgeEvent, BridgeKind};
use crate::chain::OrderContext;

pub const ORDER_CAPACITY: u64 = 300 * SHANNONS_PER_BYTE;
pub const SUDT_INFO: &str = "GLIA";
pub const SINGLE_POOL: [u8; 32] = [0x51; 32];
pub const DUAL_POOL: [u8; 32] = [0x52; 32];

fn deployed(code: u8, hash_type: HashType) -> DeployedScript {
    DeployedScript {
        script: ScriptRef { code_hash: [code; 32], hash_type },
        cell_dep: CellDep {
            out_point: OutPoint::new([code; 32], 0),
            dep_type: DepType::Code,
        },
    }
}

pub fn user_lock() -> Script {
    Script::new([0x9b; 32], HashType::Type, vec![0x11; 20])
}

fn info(symbol: &str) -> TokenInfo {
    TokenInfo {
        name: symbol.to_string(),
        symbol: symbol.to_string(),
        decimal: 8,
        logo_uri: String::new(),
    }
}

pub struct Fixture {
    pub deployment: Deployment,
    pub registry: Registry,
}

impl Fixture {
    pub fn new() -> Self {
        let deployment = Deployment {
            swap_order_lock: deployed(0xA1, HashType::Data),
            liquidity_order_lock: deployed(0xA2, HashType::Data),
            token_token_liquidity_lock: deployed(0xA3, HashType::Data),
            info_type: deployed(0xA4, HashType::Data),
            sudt_type: deployed(0xA5, HashType::Type),
            user_locks: vec![deployed(0x9b, HashType::Type)],
            lp_token_args_len: 65,
            min_sudt_cell_capacity: 142 * SHANNONS_PER_BYTE,
            min_change_capacity: 61 * SHANNONS_PER_BYTE,
        };

        let glia = Token::sudt(deployment.sudt_type.with_args(vec![0x01; 32]), info(SUDT_INFO));
        let eth = Token::sudt(deployment.sudt_type.with_args(vec![0x02; 32]), info("ETH"));
        let info_cell = |owner: u8| CellOutput {
            capacity: 250 * SHANNONS_PER_BYTE,
            lock_script: Script::new([0x61; 32], HashType::Type, vec![owner; 32]),
            type_script: Some(deployment.info_type.with_args(vec![owner; 32])),
            data: vec![],
        };

        let pools = vec![
            PoolInfo {
                pool_id: SINGLE_POOL,
                token_a: Token::ckb(),
                token_b: glia.clone(),
                info_cell: Some(info_cell(0x01)),
            },
            PoolInfo {
                pool_id: DUAL_POOL,
                token_a: glia.clone(),
                token_b: eth.clone(),
                info_cell: Some(info_cell(0x02)),
            },
        ];
        let registry = Registry::new(vec![Token::ckb(), glia, eth], pools);

        Self { deployment, registry }
    }

    pub fn sudt_script(&self) -> Script {
        self.deployment.sudt_type.with_args(vec![0x01; 32])
    }

    pub fn eth_script(&self) -> Script {
        self.deployment.sudt_type.with_args(vec![0x02; 32])
    }

    pub fn single_lp_script(&self) -> Script {
        self.deployment.sudt_type.with_args(vec![0x51; 65])
    }

    pub fn dual_lp_script(&self) -> Script {
        self.registry.pools()[1]
            .lp_token_type_script(&self.deployment.sudt_type.script)
            .unwrap()
    }

    pub fn swap_order_cell(&self, args: &SwapOrderArgs, capacity: u64) -> CellOutput {
        let data = match args.order_type {
            SwapOrderType::SellCkb => args.amount_in,
            SwapOrderType::BuyCkb => 0,
        };
        CellOutput {
            capacity,
            lock_script: self.deployment.swap_order_lock.with_args(args.serialize().to_vec()),
            type_script: Some(self.sudt_script()),
            data: encode_sudt_data(data).to_vec(),
        }
    }

    pub fn liquidity_request(
        &self,
        args: &LiquidityOrderArgs,
        capacity: u64,
        type_script: Option<Script>,
        amount: u128,
    ) -> CellOutput {
        CellOutput {
            capacity,
            lock_script: self.deployment.liquidity_order_lock.with_args(args.serialize().to_vec()),
            type_script,
            data: encode_sudt_data(amount).to_vec(),
        }
    }

    pub fn token_token_request(
        &self,
        args: &LiquidityOrderArgs,
        type_script: Option<Script>,
        amount: u128,
    ) -> CellOutput {
        CellOutput {
            capacity: 235 * SHANNONS_PER_BYTE,
            lock_script: self
                .deployment
                .token_token_liquidity_lock
                .with_args(args.serialize().to_vec()),
            type_script,
            data: encode_sudt_data(amount).to_vec(),
        }
    }
}

pub fn context(fixture: &Fixture) -> OrderContext<'_> {
    OrderContext {
        registry: &fixture.registry,
        deployment: &fixture.deployment,
    }
}

pub fn bridge_event(kind: BridgeKind, timestamp: u64) -> BridgeEvent {
    BridgeEvent {
        eth_tx_hash: [0xEE; 32],
        user_lock_hash: user_lock().to_hash(),
        lock_amount: 1_000,
        timestamp,
        direction: BridgeDirection::In,
        kind,
    }
}
