// ============ Transaction Builder ============
// Turns validated requests into unsigned transactions: one order cell (or a
// refund for cancels), the user's funding inputs, change, and a size-based fee.

use gliaswap_types::hexstr::encode_prefixed;
use gliaswap_types::molecule::witness_args_with_lock;
use gliaswap_types::{
    decode_sudt_data, encode_sudt_data, CellDep, CellInput, CellOutput, DeployedScript, Deployment,
    LiquidityOrderArgs, OutPoint, PoolInfo, Registry, Script, SwapOrderArgs, SwapOrderType, TipsArgs,
    Token, UnsignedTransaction, ORDER_VERSION,
};
use tracing::debug;

use crate::collaborators::{CellCollector, LiveCell};
use crate::config::SdkConfig;
use crate::error::{Result, SdkError};
use crate::request::{
    AddLiquidityRequest, AssetAmount, CancelRequest, GenesisLiquidityRequest,
    RemoveLiquidityRequest, SwapRequest, TransactionWithFee,
};

/// secp256k1 recoverable signature.
pub const SIGNATURE_PLACEHOLDER_SIZE: usize = 65;

struct SwapOrder<'r> {
    args: SwapOrderArgs,
    lock: Script,
    sudt: &'r Token,
}

/// An sUDT amount the user's inputs must cover.
struct SudtSpend {
    type_script: Script,
    amount: u128,
}

pub struct TransactionBuilder<'r, C> {
    config: &'r SdkConfig,
    registry: &'r Registry,
    collector: C,
}

impl<'r, C: CellCollector> TransactionBuilder<'r, C> {
    pub fn new(config: &'r SdkConfig, registry: &'r Registry, collector: C) -> Self {
        Self { config, registry, collector }
    }

    fn deployment(&self) -> &'r Deployment {
        &self.config.deployment
    }

    // ============ Validation ============

    fn user_lock(&self, lock: &Script) -> Result<&'r DeployedScript> {
        self.deployment().user_lock(lock).ok_or_else(|| {
            SdkError::InvalidRequest(format!(
                "unsupported lock code hash {}",
                encode_prefixed(&lock.code_hash)
            ))
        })
    }

    fn token(&self, asset: &AssetAmount) -> Result<&'r Token> {
        if asset.balance == 0 {
            return Err(SdkError::InvalidRequest("amount must be positive".to_string()));
        }
        self.registry
            .token_by_type_hash(&asset.type_hash)
            .ok_or(SdkError::UnknownAsset { type_hash: asset.type_hash })
    }

    fn pool(&self, pool_id: &[u8; 32]) -> Result<&'r PoolInfo> {
        self.registry
            .pool_by_id(pool_id)
            .ok_or(SdkError::UnknownAsset { type_hash: *pool_id })
    }

    fn sudt_type(token: &Token) -> Result<Script> {
        token
            .type_script
            .clone()
            .ok_or(SdkError::UnknownAsset { type_hash: token.type_hash })
    }

    /// Capacity floor for an order cell: the sUDT minimum or what it occupies.
    fn order_cell_floor(&self, cell: &CellOutput) -> u64 {
        self.deployment().min_sudt_cell_capacity.max(cell.occupied_capacity())
    }

    // ============ Swap ============

    fn swap_order(&self, request: &SwapRequest) -> Result<SwapOrder<'r>> {
        self.user_lock(&request.lock)?;
        let paid = self.token(&request.asset_in)?;
        let wanted = self.token(&request.asset_out)?;

        let (order_type, sudt) = match (paid.is_ckb(), wanted.is_ckb()) {
            (true, false) => (SwapOrderType::BuyCkb, wanted),
            (false, true) => (SwapOrderType::SellCkb, paid),
            _ => {
                return Err(SdkError::InvalidRequest(
                    "a swap trades CKB against one sUDT".to_string(),
                ))
            }
        };

        let args = SwapOrderArgs {
            user_lock_hash: request.lock.to_hash(),
            version: ORDER_VERSION,
            amount_in: request.asset_in.balance,
            min_amount_out: request.asset_out.balance,
            order_type,
        };
        let lock = self.deployment().swap_order_lock.with_args(args.serialize().to_vec());
        Ok(SwapOrder { args, lock, sudt })
    }

    /// The order lock a swap request would be placed under.
    pub fn build_swap_lock(&self, request: &SwapRequest) -> Result<Script> {
        Ok(self.swap_order(request)?.lock)
    }

    pub async fn build_swap(&self, request: &SwapRequest) -> Result<TransactionWithFee> {
        let order = self.swap_order(request)?;
        let d = self.deployment();
        let sudt_type = Self::sudt_type(order.sudt)?;

        let sudt_in = match order.args.order_type {
            SwapOrderType::SellCkb => order.args.amount_in,
            SwapOrderType::BuyCkb => 0,
        };
        let mut cell = CellOutput {
            capacity: 0,
            lock_script: order.lock,
            type_script: Some(sudt_type.clone()),
            data: encode_sudt_data(sudt_in).to_vec(),
        };
        let floor = self.order_cell_floor(&cell);

        let spends = match order.args.order_type {
            SwapOrderType::BuyCkb => {
                let paid = u64::try_from(order.args.amount_in).map_err(|_| SdkError::Overflow)?;
                cell.capacity = floor.checked_add(paid).ok_or(SdkError::Overflow)?;
                Vec::new()
            }
            SwapOrderType::SellCkb => {
                cell.capacity = floor;
                vec![SudtSpend { type_script: sudt_type, amount: order.args.amount_in }]
            }
        };

        let deps = vec![d.swap_order_lock.cell_dep.clone(), d.sudt_type.cell_dep.clone()];
        self.complete(&request.lock, Vec::new(), vec![cell], spends, deps).await
    }

    // ============ Liquidity ============

    pub async fn build_add_liquidity(&self, request: &AddLiquidityRequest) -> Result<TransactionWithFee> {
        self.add_liquidity(
            &request.lock,
            &request.pool_id,
            (&request.asset_a, &request.asset_b),
            (request.min_a, request.min_b),
        )
        .await
    }

    pub async fn build_genesis_liquidity(&self, request: &GenesisLiquidityRequest) -> Result<TransactionWithFee> {
        self.add_liquidity(&request.lock, &request.pool_id, (&request.asset_a, &request.asset_b), (0, 0))
            .await
    }

    /// Token A's minimum lives in `ckb_min`, token B's in `sudt_min`.
    fn liquidity_args(&self, lock: &Script, pool_id: [u8; 32], (min_a, min_b): (u128, u128)) -> Result<LiquidityOrderArgs> {
        Ok(LiquidityOrderArgs {
            info_type_hash: pool_id,
            version: ORDER_VERSION,
            sudt_min: min_b,
            ckb_min: u64::try_from(min_a).map_err(|_| SdkError::Overflow)?,
            user_lock_hash: lock.to_hash(),
            tips: TipsArgs::default(),
        })
    }

    async fn add_liquidity(
        &self,
        lock: &Script,
        pool_id: &[u8; 32],
        (asset_a, asset_b): (&AssetAmount, &AssetAmount),
        minimums: (u128, u128),
    ) -> Result<TransactionWithFee> {
        self.user_lock(lock)?;
        let token_a = self.token(asset_a)?;
        let token_b = self.token(asset_b)?;
        let pool = self.pool(pool_id)?;
        if token_a.type_hash != pool.token_a.type_hash || token_b.type_hash != pool.token_b.type_hash {
            return Err(SdkError::InvalidRequest("assets do not match the pool".to_string()));
        }

        let d = self.deployment();
        let args = self.liquidity_args(lock, pool.pool_id, minimums)?.serialize().to_vec();
        let type_b = Self::sudt_type(token_b)?;

        if pool.is_sudt_sudt() {
            let type_a = Self::sudt_type(token_a)?;
            let request_lock = d.token_token_liquidity_lock.with_args(args);
            let outputs: Vec<CellOutput> = [(&type_a, asset_a.balance), (&type_b, asset_b.balance)]
                .into_iter()
                .map(|(type_script, amount)| {
                    let mut cell = CellOutput {
                        capacity: 0,
                        lock_script: request_lock.clone(),
                        type_script: Some(type_script.clone()),
                        data: encode_sudt_data(amount).to_vec(),
                    };
                    cell.capacity = self.order_cell_floor(&cell);
                    cell
                })
                .collect();
            let spends = vec![
                SudtSpend { type_script: type_a, amount: asset_a.balance },
                SudtSpend { type_script: type_b, amount: asset_b.balance },
            ];
            let deps = vec![d.token_token_liquidity_lock.cell_dep.clone(), d.sudt_type.cell_dep.clone()];
            return self.complete(lock, Vec::new(), outputs, spends, deps).await;
        }

        // CKB/sUDT: the CKB side rides in the request cell's capacity
        let ckb = u64::try_from(asset_a.balance).map_err(|_| SdkError::Overflow)?;
        let reserved = d.min_sudt_cell_capacity.checked_mul(2).ok_or(SdkError::Overflow)?;
        let cell = CellOutput {
            capacity: ckb.checked_add(reserved).ok_or(SdkError::Overflow)?,
            lock_script: d.liquidity_order_lock.with_args(args),
            type_script: Some(type_b.clone()),
            data: encode_sudt_data(asset_b.balance).to_vec(),
        };
        let spends = vec![SudtSpend { type_script: type_b, amount: asset_b.balance }];
        let deps = vec![d.liquidity_order_lock.cell_dep.clone(), d.sudt_type.cell_dep.clone()];
        self.complete(lock, Vec::new(), vec![cell], spends, deps).await
    }

    pub async fn build_remove_liquidity(&self, request: &RemoveLiquidityRequest) -> Result<TransactionWithFee> {
        self.user_lock(&request.lock)?;
        if request.lp_amount == 0 {
            return Err(SdkError::InvalidRequest("amount must be positive".to_string()));
        }
        let pool = self.pool(&request.pool_id)?;
        let d = self.deployment();

        let lp_matches = if pool.is_sudt_sudt() {
            pool.lp_token_type_script(&d.sudt_type.script).as_ref() == Some(&request.lp_token)
        } else {
            d.sudt_type.matches(&request.lp_token) && request.lp_token.args.len() == d.lp_token_args_len
        };
        if !lp_matches {
            return Err(SdkError::InvalidRequest("LP token does not belong to the pool".to_string()));
        }

        let request_lock = if pool.is_sudt_sudt() {
            &d.token_token_liquidity_lock
        } else {
            &d.liquidity_order_lock
        };
        let args = self.liquidity_args(&request.lock, pool.pool_id, (request.min_a, request.min_b))?;
        let mut cell = CellOutput {
            capacity: 0,
            lock_script: request_lock.with_args(args.serialize().to_vec()),
            type_script: Some(request.lp_token.clone()),
            data: encode_sudt_data(request.lp_amount).to_vec(),
        };
        // room for the two cells the pool pays out
        let reserved = d.min_sudt_cell_capacity.checked_mul(2).ok_or(SdkError::Overflow)?;
        cell.capacity = reserved.max(cell.occupied_capacity());

        let spends = vec![SudtSpend { type_script: request.lp_token.clone(), amount: request.lp_amount }];
        let deps = vec![request_lock.cell_dep.clone(), d.sudt_type.cell_dep.clone()];
        self.complete(&request.lock, Vec::new(), vec![cell], spends, deps).await
    }

    // ============ Cancel ============

    pub async fn build_cancel(&self, request: &CancelRequest) -> Result<TransactionWithFee> {
        self.user_lock(&request.lock)?;
        let d = self.deployment();
        let out_point = OutPoint::new(request.tx_hash, request.index);
        let order = self
            .collector
            .live_cell(&out_point)
            .await?
            .ok_or(SdkError::NotCancelable { tx_hash: request.tx_hash, index: request.index })?;

        let lock = &order.cell.lock_script;
        let owner = if d.swap_order_lock.matches(lock) {
            SwapOrderArgs::deserialize(&lock.args).map(|a| (a.user_lock_hash, &d.swap_order_lock))
        } else if d.liquidity_order_lock.matches(lock) {
            LiquidityOrderArgs::deserialize(&lock.args).map(|a| (a.user_lock_hash, &d.liquidity_order_lock))
        } else if d.token_token_liquidity_lock.matches(lock) {
            LiquidityOrderArgs::deserialize(&lock.args)
                .map(|a| (a.user_lock_hash, &d.token_token_liquidity_lock))
        } else {
            return Err(SdkError::InvalidRequest("cell is not held by an order lock".to_string()));
        };
        let (owner, order_lock) =
            owner.map_err(|e| SdkError::InvalidRequest(format!("undecodable order args: {e}")))?;
        if owner != request.lock.to_hash() {
            return Err(SdkError::InvalidRequest("order belongs to another lock".to_string()));
        }

        let refund = CellOutput {
            capacity: order.cell.capacity,
            lock_script: request.lock.clone(),
            type_script: order.cell.type_script.clone(),
            data: order.cell.data.clone(),
        };
        let mut deps = vec![order_lock.cell_dep.clone()];
        if refund.type_script.as_ref().is_some_and(|t| d.sudt_type.matches(t)) {
            deps.push(d.sudt_type.cell_dep.clone());
        }
        self.complete(&request.lock, vec![order], vec![refund], Vec::new(), deps).await
    }

    // ============ Assembly ============

    /// Fund `outputs` from the user's cells, add change, and settle the fee.
    async fn complete(
        &self,
        lock: &Script,
        mut inputs: Vec<LiveCell>,
        mut outputs: Vec<CellOutput>,
        spends: Vec<SudtSpend>,
        deps: Vec<CellDep>,
    ) -> Result<TransactionWithFee> {
        let d = self.deployment();
        let mut cell_deps: Vec<CellDep> = Vec::with_capacity(deps.len() + 1);
        for dep in deps.into_iter().chain([self.user_lock(lock)?.cell_dep.clone()]) {
            if !cell_deps.contains(&dep) {
                cell_deps.push(dep);
            }
        }

        for spend in spends {
            let mut gathered: u128 = 0;
            for cell in self.collector.collect_cells(lock, Some(&spend.type_script)).await? {
                if gathered >= spend.amount {
                    break;
                }
                // skip cells whose data is not an sUDT amount
                let Ok(balance) = decode_sudt_data(&cell.cell.data) else {
                    continue;
                };
                gathered = gathered.checked_add(balance).ok_or(SdkError::Overflow)?;
                inputs.push(cell);
            }
            if gathered < spend.amount {
                return Err(SdkError::InsufficientBalance { required: spend.amount, available: gathered });
            }
            if gathered > spend.amount {
                let mut change = CellOutput {
                    capacity: 0,
                    lock_script: lock.clone(),
                    type_script: Some(spend.type_script),
                    data: encode_sudt_data(gathered - spend.amount).to_vec(),
                };
                change.capacity = self.order_cell_floor(&change);
                outputs.push(change);
            }
        }

        let mut plain = self.collector.collect_cells(lock, None).await?.into_iter();
        let change_index = outputs.len();
        outputs.push(CellOutput {
            capacity: 0,
            lock_script: lock.clone(),
            type_script: None,
            data: Vec::new(),
        });

        loop {
            let input_capacity = inputs
                .iter()
                .try_fold(0u64, |acc, c| acc.checked_add(c.cell.capacity))
                .ok_or(SdkError::Overflow)?;
            let draft = assemble(lock, &cell_deps, &inputs, &outputs);
            let output_capacity = draft.total_output_capacity().ok_or(SdkError::Overflow)?;
            let fee = self.fee(draft.serialized_size_in_block())?;
            let required = output_capacity
                .checked_add(fee)
                .and_then(|c| c.checked_add(d.min_change_capacity))
                .ok_or(SdkError::Overflow)?;

            if input_capacity >= required {
                outputs[change_index].capacity = input_capacity - output_capacity - fee;
                let transaction = assemble(lock, &cell_deps, &inputs, &outputs);
                debug!(
                    fee,
                    inputs = transaction.inputs.len(),
                    outputs = transaction.outputs.len(),
                    "transaction assembled"
                );
                return Ok(TransactionWithFee { transaction, fee });
            }

            match plain.next() {
                Some(cell) => inputs.push(cell),
                None => {
                    return Err(SdkError::InsufficientBalance {
                        required: required as u128,
                        available: input_capacity as u128,
                    })
                }
            }
        }
    }

    /// `fee_rate` shannons per 1000 bytes, rounded up.
    fn fee(&self, size: usize) -> Result<u64> {
        let scaled = (size as u64)
            .checked_mul(self.config.fee_rate)
            .ok_or(SdkError::Overflow)?;
        Ok(scaled.div_ceil(1_000))
    }
}

/// Witness placeholder sits at the first input the user signs for.
fn assemble(lock: &Script, cell_deps: &[CellDep], inputs: &[LiveCell], outputs: &[CellOutput]) -> UnsignedTransaction {
    let signer = inputs.iter().position(|c| &c.cell.lock_script == lock);
    let witnesses = (0..inputs.len())
        .map(|i| {
            if Some(i) == signer {
                witness_args_with_lock(&[0u8; SIGNATURE_PLACEHOLDER_SIZE])
            } else {
                Vec::new()
            }
        })
        .collect();

    UnsignedTransaction {
        cell_deps: cell_deps.to_vec(),
        inputs: inputs.iter().map(|c| CellInput::new(c.out_point)).collect(),
        outputs: outputs.to_vec(),
        witnesses,
    }
}
