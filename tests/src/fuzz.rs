// ============ Gliaswap Fuzz / Property-Based Tests ============
// Random order histories from a deterministic PRNG, reproducible from the
// seed alone, plus proptest cases over the order args.
//
// Invariants:
// - status only moves forward as an order's transaction set grows
// - every rebuilt chain has exactly one live node, its tip
// - orders settled together each keep their own payout
// - rebuilding does not depend on indexer ordering
// - built transactions balance: inputs = outputs + fee

use gliaswap_orders::OrderStatus;
use gliaswap_sdk::{AssetAmount, MemoryLedger, SwapRequest, TransactionBuilder};
use gliaswap_types::{CellOutput, OutPoint, SwapOrderType, TransactionWithStatus, CKB_TYPE_HASH};
use proptest::prelude::*;

use crate::support::*;

// ============ Deterministic PRNG ============

struct TestRng {
    state: u64,
}

impl TestRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn range_u64(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        min + (self.next_u64() % (max - min))
    }

    fn range_u128(&mut self, min: u128, max: u128) -> u128 {
        self.range_u64(min as u64, max as u64) as u128
    }

    fn coin(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.range_u64(0, i as u64 + 1) as usize;
            items.swap(i, j);
        }
    }
}

// ============ Status Monotonicity ============

fn rank(status: OrderStatus) -> u8 {
    match status {
        OrderStatus::Pending => 0,
        OrderStatus::Open => 1,
        OrderStatus::Canceling => 2,
        OrderStatus::Canceled | OrderStatus::Completed => 3,
    }
}

/// Snapshots of one order's transactions as an indexer would see them over
/// time: each transaction first unconfirmed, then committed.
fn lifecycle(world: &World, rng: &mut TestRng) -> (Vec<Vec<TransactionWithStatus>>, bool) {
    let order_type = if rng.coin() { SwapOrderType::BuyCkb } else { SwapOrderType::SellCkb };
    let min_out = match order_type {
        SwapOrderType::BuyCkb => rng.range_u128(10, 10_000),
        SwapOrderType::SellCkb => rng.range_u128(10 * CKB as u128, 1_000 * CKB as u128),
    };
    let args = world.swap_args(order_type, rng.range_u128(1, 1_000_000), min_out);

    let mut txs: Vec<(u8, Vec<OutPoint>, Vec<CellOutput>)> = vec![(1, vec![], vec![world.swap_cell(&args)])];
    let fills = rng.range_u64(0, 3) as u8;
    for k in 0..fills {
        txs.push((2 + k, vec![op(1 + k, 0)], vec![world.swap_cell(&args)]));
    }

    let settle = 2 + fills;
    let received = rng.range_u128(min_out / 2, min_out * 2);
    let payout = match order_type {
        SwapOrderType::BuyCkb => world.user_sudt(world.glia(), received),
        SwapOrderType::SellCkb => world.user_plain(ORDER_CAPACITY + received as u64),
    };
    txs.push((settle, vec![op(settle - 1, 0)], vec![payout]));

    let mut snapshots = Vec::new();
    let mut seen: Vec<TransactionWithStatus> = Vec::new();
    for (hash, spends, outputs) in txs {
        seen.push(pending(hash, spends.clone(), outputs.clone()));
        snapshots.push(seen.clone());
        seen.pop();
        seen.push(committed(hash, spends, outputs));
        snapshots.push(seen.clone());
    }
    (snapshots, received >= min_out)
}

#[test]
fn test_fuzz_status_never_moves_backward() {
    let world = World::new();
    let mut rng = TestRng::new(0xDEAD_BEEF_CAFE_0001);

    for _ in 0..300 {
        let (snapshots, filled) = lifecycle(&world, &mut rng);
        let mut last = OrderStatus::Pending;
        let mut canceled_branch = false;

        for txs in &snapshots {
            let histories = world.swap_histories(txs);
            assert_eq!(histories.len(), 1);
            let status = histories[0].stage.status;

            assert!(rank(status) >= rank(last), "{last:?} -> {status:?}");
            if matches!(status, OrderStatus::Canceling | OrderStatus::Canceled) {
                canceled_branch = true;
            }
            assert!(!(canceled_branch && status == OrderStatus::Completed));
            last = status;
        }

        let expected = if filled { OrderStatus::Completed } else { OrderStatus::Canceled };
        assert_eq!(last, expected);
    }
}

// ============ Tip Uniqueness ============

#[test]
fn test_fuzz_one_live_tip_per_chain() {
    let world = World::new();
    let mut rng = TestRng::new(0xDEAD_BEEF_CAFE_0002);

    for _ in 0..200 {
        let orders = rng.range_u64(1, 6) as usize;
        let mut txs: Vec<TransactionWithStatus> = Vec::new();
        let mut lengths: Vec<usize> = Vec::new();
        let mut hash: u8 = 1;

        for _ in 0..orders {
            let args = world.swap_args(SwapOrderType::BuyCkb, rng.range_u128(1, 5_000), 100);
            txs.push(committed(hash, vec![], vec![world.swap_cell(&args)]));
            let mut len = 1;
            for _ in 0..rng.range_u64(0, 3) {
                txs.push(committed(hash + 1, vec![op(hash, 0)], vec![world.swap_cell(&args)]));
                hash += 1;
                len += 1;
            }
            if rng.coin() {
                let payout = world.user_sudt(world.glia(), rng.range_u128(0, 300));
                txs.push(pending(hash + 1, vec![op(hash, 0)], vec![payout]));
                hash += 1;
                len += 1;
            }
            hash += 1;
            lengths.push(len);
        }

        let mut reordered = txs.clone();
        rng.shuffle(&mut reordered);
        let ordered = world.chains(None, &txs);
        let shuffled = world.chains(None, &reordered);

        assert_eq!(ordered.len(), orders);
        assert_eq!(shuffled.len(), orders);
        for chain in &shuffled {
            assert_eq!(chain.nodes().iter().filter(|n| n.live).count(), 1);
            assert!(chain.tip().live);
        }

        // chains come back newest origin first, whatever order the indexer used
        let mut expected_lengths = lengths.clone();
        expected_lengths.reverse();
        let rebuilt: Vec<usize> = shuffled.iter().map(|c| c.len()).collect();
        assert_eq!(rebuilt, expected_lengths);
        for (a, b) in ordered.iter().zip(&shuffled) {
            assert_eq!(a.tip().out_point(), b.tip().out_point());
        }
    }
}

// ============ Batch Settlement ============

#[test]
fn test_fuzz_batches_pair_each_order_with_its_payout() {
    let world = World::new();
    let mut rng = TestRng::new(0xDEAD_BEEF_CAFE_0004);

    for _ in 0..200 {
        // one outcome per direction; same-direction orders are interchangeable
        let buys_filled = rng.coin();
        let sells_filled = rng.coin();
        let orders = rng.range_u64(2, 7) as u8;

        let mut txs = Vec::new();
        let mut inputs = Vec::new();
        let mut payouts = Vec::new();
        let mut expected: Vec<(u8, SwapOrderType, OrderStatus)> = Vec::new();
        let (mut bought, mut sold) = (0u128, 0u128);

        for hash in 1..=orders {
            let order_type = if rng.coin() { SwapOrderType::BuyCkb } else { SwapOrderType::SellCkb };
            let (args, filled) = match order_type {
                SwapOrderType::BuyCkb => {
                    let args = world.swap_args(order_type, rng.range_u128(1, 1_000_000), 100);
                    if buys_filled {
                        let received = rng.range_u128(100, 10_000);
                        bought += received;
                        payouts.push(world.user_sudt(world.glia(), received));
                    } else {
                        payouts.push(world.user_plain(ORDER_CAPACITY - rng.range_u64(0, 10) * CKB));
                    }
                    (args, buys_filled)
                }
                SwapOrderType::SellCkb => {
                    let args = world.swap_args(order_type, rng.range_u128(20_000, 1_000_000), 10 * CKB as u128);
                    if sells_filled {
                        let income = rng.range_u64(10, 500) * CKB;
                        sold += income as u128;
                        payouts.push(world.user_plain(ORDER_CAPACITY + income));
                    } else {
                        payouts.push(world.user_sudt(world.glia(), args.amount_in));
                    }
                    (args, sells_filled)
                }
            };
            txs.push(committed(hash, vec![], vec![world.swap_cell(&args)]));
            inputs.push(op(hash, 0));
            let status = if filled { OrderStatus::Completed } else { OrderStatus::Canceled };
            expected.push((hash, order_type, status));
        }

        rng.shuffle(&mut inputs);
        rng.shuffle(&mut payouts);
        let batch = orders + 1;
        txs.push(committed(batch, inputs, payouts));

        let histories = world.swap_histories(&txs);
        assert_eq!(histories.len(), orders as usize);
        let (mut bought_seen, mut sold_seen) = (0u128, 0u128);
        for history in &histories {
            assert_eq!(history.transaction_hash, [batch; 32]);
            let origin = (history.timestamp / 1_000) as u8;
            let &(_, order_type, status) = expected.iter().find(|(hash, ..)| *hash == origin).unwrap();
            assert_eq!(history.stage.status, status, "order {origin} ({order_type:?})");
            if status == OrderStatus::Completed {
                match order_type {
                    SwapOrderType::BuyCkb => bought_seen += history.amount_out.balance,
                    SwapOrderType::SellCkb => sold_seen += history.amount_out.balance,
                }
            }
        }
        assert_eq!((bought_seen, sold_seen), (bought, sold));
    }
}

// ============ Builder Balance ============

#[tokio::test]
async fn test_fuzz_built_swaps_balance() {
    let world = World::new();
    let mut rng = TestRng::new(0xDEAD_BEEF_CAFE_0003);

    for _ in 0..50 {
        let mut ledger = MemoryLedger::new();
        let cells: Vec<_> = (0..rng.range_u64(1, 6))
            .map(|_| world.user_plain(rng.range_u64(100, 3_000) * CKB))
            .collect();
        let funds: u64 = cells.iter().map(|c| c.capacity).sum();
        ledger.push(committed(0x10, vec![], cells));

        let amount = rng.range_u64(1, 2_000) * CKB;
        let request = SwapRequest {
            lock: world.user_lock(),
            asset_in: AssetAmount { type_hash: CKB_TYPE_HASH, balance: amount as u128 },
            asset_out: AssetAmount { type_hash: world.glia().to_hash(), balance: 1 },
        };
        let builder = TransactionBuilder::new(&world.config, &world.registry, ledger.clone());

        let Ok(built) = builder.build_swap(&request).await else {
            // only a shortfall may fail
            assert!(funds < amount + 400 * CKB);
            continue;
        };
        let tx = &built.transaction;
        let inputs: u64 = tx
            .inputs
            .iter()
            .map(|i| ledger.transactions()[0].transaction.outputs[i.previous_output.index as usize].capacity)
            .sum();

        assert_eq!(inputs, tx.total_output_capacity().unwrap() + built.fee);
        assert_eq!(built.fee, tx.serialized_size_in_block() as u64);
        let change = tx.outputs.last().unwrap();
        assert!(change.capacity >= world.config.deployment.min_change_capacity);
        assert_eq!(tx.witnesses.len(), tx.inputs.len());
    }
}

// ============ Proptest ============

proptest! {
    #[test]
    fn prop_open_order_reports_its_args(
        amount_in in 1u128..=u128::MAX,
        min_out in 1u128..=u128::MAX,
        buy in any::<bool>(),
    ) {
        let world = World::new();
        let order_type = if buy { SwapOrderType::BuyCkb } else { SwapOrderType::SellCkb };
        let args = world.swap_args(order_type, amount_in, min_out);
        let txs = vec![committed(1, vec![], vec![world.swap_cell(&args)])];

        let histories = world.swap_histories(&txs);
        prop_assert_eq!(histories.len(), 1);
        prop_assert_eq!(histories[0].amount_in.balance, amount_in);
        prop_assert_eq!(histories[0].amount_out.balance, min_out);
        prop_assert_eq!(histories[0].stage.status, OrderStatus::Open);
    }
}
