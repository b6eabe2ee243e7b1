//! 交易协调器集成测试
//!
//! 全部基于内存账本 (MockLedger) 和脚本化的 relay，不需要网络连接。
//!
//! 运行测试:
//!     cargo test --test coordinator_tests -- --nocapture
//!
//! 测试模块：
//! - venue_priority: 流动性来源的优先级和回退
//! - preflight: 余额预检
//! - pipeline: 报价 → 模拟 → 提交 → 确认 全流程
//! - user_lifecycle: 用户资料加载和结果通知

use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use sol_swap_engine::common::mock_rpc::MockLedger;
use sol_swap_engine::common::BlockhashCache;
use sol_swap_engine::swqos::{BundleStatus, RelayClient};
use sol_swap_engine::trading::submitter::SettlementSubmitter;
use sol_swap_engine::trading::{
    FeeDistributor, ReferralChain, SwapCoordinator, SwapDirection, SwapError, SwapIntent,
    SwapVenue, VenueKind, VenueOutcome, VenueQuote,
};
use solana_sdk::{
    hash::Hash, pubkey::Pubkey, signature::Keypair, signer::Signer,
    transaction::VersionedTransaction,
};
use solana_system_interface::instruction::transfer;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const TREASURY: Pubkey = Pubkey::new_from_array([7u8; 32]);

// ============================================================================
// 测试替身
// ============================================================================

/// 固定行为的流动性来源，记录被调用次数
struct FakeVenue {
    kind: VenueKind,
    behavior: FakeBehavior,
    calls: AtomicUsize,
}

#[derive(Clone, Copy)]
enum FakeBehavior {
    Quote { output: u64 },
    Unavailable,
    Fail,
}

impl FakeVenue {
    fn new(kind: VenueKind, behavior: FakeBehavior) -> Arc<Self> {
        Arc::new(Self { kind, behavior, calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SwapVenue for FakeVenue {
    fn kind(&self) -> VenueKind {
        self.kind
    }

    async fn try_build(&self, intent: &SwapIntent) -> Result<VenueOutcome, SwapError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            FakeBehavior::Quote { output } => Ok(VenueOutcome::Quote(VenueQuote {
                venue: self.kind,
                input_amount: intent.amount,
                estimated_output_amount: output,
                instructions: vec![transfer(&intent.payer.pubkey(), &Pubkey::new_unique(), 1)],
                address_lookup_tables: Vec::new(),
            })),
            FakeBehavior::Unavailable => Ok(VenueOutcome::Unavailable("no pool".to_string())),
            FakeBehavior::Fail => Err(SwapError::Venue {
                venue: self.kind,
                message: "upstream returned 500".to_string(),
            }),
        }
    }
}

/// 按脚本返回 bundle 状态的 relay
struct ScriptedRelay {
    tip_account: Pubkey,
    statuses: Mutex<VecDeque<BundleStatus>>,
    bundles: Mutex<Vec<Vec<VersionedTransaction>>>,
}

impl ScriptedRelay {
    fn new(statuses: Vec<BundleStatus>) -> Arc<Self> {
        Arc::new(Self {
            tip_account: Pubkey::new_unique(),
            statuses: Mutex::new(statuses.into()),
            bundles: Mutex::new(Vec::new()),
        })
    }

    fn landing_on(attempt: usize) -> Arc<Self> {
        let mut statuses = vec![BundleStatus::Pending; attempt - 1];
        statuses.push(BundleStatus::Landed);
        Self::new(statuses)
    }

    fn sent(&self) -> Vec<Vec<VersionedTransaction>> {
        self.bundles.lock().clone()
    }
}

#[async_trait::async_trait]
impl RelayClient for ScriptedRelay {
    async fn send_bundle(&self, transactions: &[VersionedTransaction]) -> Result<String> {
        self.bundles.lock().push(transactions.to_vec());
        Ok("bundle-1".to_string())
    }

    async fn get_bundle_status(&self, _bundle_id: &str) -> Result<BundleStatus> {
        Ok(self.statuses.lock().pop_front().unwrap_or(BundleStatus::Pending))
    }

    fn tip_account(&self) -> Result<Pubkey> {
        Ok(self.tip_account)
    }
}

struct Harness {
    ledger: Arc<MockLedger>,
    relay: Arc<ScriptedRelay>,
    coordinator: SwapCoordinator,
}

async fn harness_with(
    venues: Vec<Arc<dyn SwapVenue>>,
    relay: Arc<ScriptedRelay>,
    ledger: Arc<MockLedger>,
    refresh_cache: bool,
) -> Harness {
    let cache = Arc::new(BlockhashCache::new(ledger.clone(), Duration::from_secs(60)));
    if refresh_cache {
        ledger.set_blockhash(Hash::new_unique());
        cache.refresh().await.unwrap();
    }
    let submitter = SettlementSubmitter::new(relay.clone(), Duration::from_millis(1), 5);
    let coordinator =
        SwapCoordinator::new(venues, ledger.clone(), cache, FeeDistributor::new(TREASURY, 90), submitter);
    Harness { ledger, relay, coordinator }
}

async fn harness(venues: Vec<Arc<dyn SwapVenue>>) -> Harness {
    harness_with(venues, ScriptedRelay::landing_on(1), Arc::new(MockLedger::new()), true).await
}

fn buy_intent(payer: Arc<Keypair>, amount: u64) -> SwapIntent {
    SwapIntent::new(
        payer,
        Pubkey::new_unique(),
        amount,
        SwapDirection::Buy,
        1_000,
        0,
        ReferralChain::empty(),
    )
}

fn funded_payer(ledger: &MockLedger, lamports: u64) -> Arc<Keypair> {
    let payer = Arc::new(Keypair::new());
    ledger.set_balance(payer.pubkey(), lamports);
    payer
}

// ============================================================================
// 模块 1: 流动性来源优先级
// ============================================================================

mod venue_priority_tests {
    use super::*;

    #[tokio::test]
    async fn first_quoting_venue_wins_and_later_ones_are_skipped() {
        let raydium = FakeVenue::new(VenueKind::RaydiumAmmV4, FakeBehavior::Quote { output: 42 });
        let pump = FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Quote { output: 7 });
        let jupiter = FakeVenue::new(VenueKind::Jupiter, FakeBehavior::Quote { output: 9 });
        let h = harness(vec![raydium.clone(), pump.clone(), jupiter.clone()]).await;

        let intent = buy_intent(Arc::new(Keypair::new()), 1_000);
        let quote = h.coordinator.select_quote(&intent).await.unwrap();
        assert_eq!(quote.venue, VenueKind::RaydiumAmmV4);
        assert_eq!(quote.estimated_output_amount, 42);
        assert_eq!((raydium.calls(), pump.calls(), jupiter.calls()), (1, 0, 0));
    }

    #[tokio::test]
    async fn unavailable_and_failing_venues_fall_through() {
        let raydium = FakeVenue::new(VenueKind::RaydiumAmmV4, FakeBehavior::Fail);
        let pump = FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Unavailable);
        let jupiter = FakeVenue::new(VenueKind::Jupiter, FakeBehavior::Quote { output: 9 });
        let h = harness(vec![raydium.clone(), pump.clone(), jupiter.clone()]).await;

        let intent = buy_intent(Arc::new(Keypair::new()), 1_000);
        let quote = h.coordinator.select_quote(&intent).await.unwrap();
        assert_eq!(quote.venue, VenueKind::Jupiter);
        assert_eq!((raydium.calls(), pump.calls(), jupiter.calls()), (1, 1, 1));
    }

    #[tokio::test]
    async fn last_venue_error_is_fatal() {
        let pump = FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Unavailable);
        let jupiter = FakeVenue::new(VenueKind::Jupiter, FakeBehavior::Fail);
        let h = harness(vec![pump, jupiter]).await;

        let err = h.coordinator.run(&buy_intent(Arc::new(Keypair::new()), 1_000)).await.unwrap_err();
        assert!(matches!(err, SwapError::Venue { venue: VenueKind::Jupiter, .. }));
        assert_eq!(err.kind(), "venue_error");
    }

    #[tokio::test]
    async fn all_unavailable_is_no_liquidity() {
        let h = harness(vec![
            FakeVenue::new(VenueKind::RaydiumAmmV4, FakeBehavior::Unavailable),
            FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Unavailable),
        ]).await;
        let outcome = h.coordinator.execute_swap(&buy_intent(Arc::new(Keypair::new()), 1_000)).await;
        assert!(!outcome.success);
        assert!(h.relay.sent().is_empty());

        let err = h.coordinator.run(&buy_intent(Arc::new(Keypair::new()), 1_000)).await.unwrap_err();
        assert!(matches!(err, SwapError::NoLiquidity));
    }

    #[tokio::test]
    async fn venue_order_is_preserved() {
        let h = harness(vec![
            FakeVenue::new(VenueKind::RaydiumAmmV4, FakeBehavior::Unavailable),
            FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Unavailable),
            FakeVenue::new(VenueKind::Jupiter, FakeBehavior::Unavailable),
        ]).await;
        let order: Vec<VenueKind> = h.coordinator.venues().collect();
        assert_eq!(order, vec![VenueKind::RaydiumAmmV4, VenueKind::PumpFun, VenueKind::Jupiter]);
    }
}

// ============================================================================
// 模块 2: 余额预检
// ============================================================================

mod preflight_tests {
    use super::*;

    #[tokio::test]
    async fn insufficient_balance_stops_before_submission() {
        let venue = FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Quote { output: 1 });
        let h = harness(vec![venue]).await;
        let payer = funded_payer(&h.ledger, 1_000_000);

        let outcome = h.coordinator.execute_swap(&buy_intent(payer.clone(), 10_000_000)).await;
        assert!(!outcome.success);
        assert_eq!(outcome.balance, Some(1_000_000));
        assert!(h.relay.sent().is_empty());
        assert_eq!(h.ledger.calls.simulate_transaction.load(Ordering::SeqCst), 0);

        // fee 90_000 + tip 0 + input 10_000_000 + reserve 3_000_000
        let err = h.coordinator.run(&buy_intent(payer, 10_000_000)).await.unwrap_err();
        assert!(matches!(
            err,
            SwapError::InsufficientFunds { balance: 1_000_000, required: 13_090_000 }
        ));
    }

    #[tokio::test]
    async fn exact_requirement_passes() {
        let venue = FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Quote { output: 1 });
        let h = harness(vec![venue]).await;
        let payer = funded_payer(&h.ledger, 13_090_000);
        let receipt = h.coordinator.run(&buy_intent(payer, 10_000_000)).await.unwrap();
        assert_eq!(receipt.fee_lamports, 90_000);
    }

    #[tokio::test]
    async fn sells_skip_the_balance_check() {
        let venue = FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Quote { output: 500_000 });
        let h = harness(vec![venue]).await;
        let intent = SwapIntent::new(
            Arc::new(Keypair::new()),
            Pubkey::new_unique(),
            1_000_000,
            SwapDirection::Sell,
            500,
            0,
            ReferralChain::empty(),
        );
        let receipt = h.coordinator.run(&intent).await.unwrap();
        // sell fee is charged on the estimated SOL output
        assert_eq!(receipt.fee_lamports, 4_500);
        assert_eq!(h.ledger.calls.get_balance.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_amount_is_rejected_before_any_venue_runs() {
        let venue = FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Quote { output: 1 });
        let h = harness(vec![venue.clone()]).await;
        let err = h.coordinator.run(&buy_intent(Arc::new(Keypair::new()), 0)).await.unwrap_err();
        assert!(matches!(err, SwapError::InvalidIntent(_)));
        assert_eq!(venue.calls(), 0);
    }
}

// ============================================================================
// 模块 3: 全流程
// ============================================================================

mod pipeline_tests {
    use super::*;
    use sol_swap_engine::common::bonding_curve::BondingCurveState;
    use sol_swap_engine::instruction::utils::pumpfun::{
        accounts::PUMPFUN, get_bonding_curve_pda, global_constants::*,
    };
    use sol_swap_engine::instruction::{PumpFunVenue, RaydiumAmmV4Venue};

    fn seed_curve(ledger: &MockLedger, mint: &Pubkey) {
        let state = BondingCurveState {
            virtual_token_reserves: INITIAL_VIRTUAL_TOKEN_RESERVES,
            virtual_sol_reserves: INITIAL_VIRTUAL_SOL_RESERVES,
            real_token_reserves: INITIAL_REAL_TOKEN_RESERVES,
            real_sol_reserves: 0,
            token_total_supply: TOKEN_TOTAL_SUPPLY,
            complete: false,
            creator: Some(Pubkey::new_unique()),
        };
        ledger.set_account_data(get_bonding_curve_pda(mint), PUMPFUN, state.to_account_data());
    }

    #[tokio::test]
    async fn pump_buy_lands_and_reports_the_swap_signature() {
        let ledger = Arc::new(MockLedger::new());
        let mint = Pubkey::new_unique();
        seed_curve(&ledger, &mint);
        let venues: Vec<Arc<dyn SwapVenue>> = vec![
            Arc::new(RaydiumAmmV4Venue::new(ledger.clone())),
            Arc::new(PumpFunVenue::new(ledger.clone())),
        ];
        let h = harness_with(venues, ScriptedRelay::landing_on(3), ledger, true).await;
        let payer = funded_payer(&h.ledger, 1_000_000_000);
        let referrers = [Pubkey::new_unique(), Pubkey::new_unique()];
        let intent = SwapIntent::new(
            payer,
            mint,
            10_000_000,
            SwapDirection::Buy,
            1_000,
            10_000,
            ReferralChain::from_ancestors(&referrers),
        );

        let receipt = h.coordinator.run(&intent).await.unwrap();
        assert_eq!(receipt.venue, VenueKind::PumpFun);
        assert_eq!(receipt.estimated_output_amount, 357_666_666_666);
        assert_eq!(receipt.fee_lamports, 90_000);

        let sent = h.relay.sent();
        assert_eq!(sent.len(), 1);
        let bundle = &sent[0];
        assert_eq!(bundle.len(), 2, "swap then fee");
        assert_eq!(receipt.signature, bundle[0].signatures[0]);
        assert_ne!(receipt.signature, bundle[1].signatures[0]);

        // tip goes to the relay's account inside the swap transaction
        assert!(bundle[0].message.static_account_keys().contains(&h.relay.tip_account));
        assert!(!bundle[1].message.static_account_keys().contains(&h.relay.tip_account));
        let fee_keys = bundle[1].message.static_account_keys();
        assert!(fee_keys.contains(&TREASURY));
        assert!(referrers.iter().all(|r| fee_keys.contains(r)));

        assert_eq!(h.ledger.simulated_transactions().len(), 2);
    }

    #[tokio::test]
    async fn no_fee_transaction_when_fee_rounds_to_zero() {
        let venue = FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Quote { output: 1 });
        let h = harness(vec![venue]).await;
        let payer = funded_payer(&h.ledger, 1_000_000_000);
        let receipt = h.coordinator.run(&buy_intent(payer, 100)).await.unwrap();
        assert_eq!(receipt.fee_lamports, 0);
        assert_eq!(h.relay.sent()[0].len(), 1);
    }

    #[tokio::test]
    async fn simulation_failure_is_reported_and_nothing_is_submitted() {
        let venue = FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Quote { output: 1 });
        let h = harness(vec![venue]).await;
        let payer = funded_payer(&h.ledger, 1_000_000_000);
        h.ledger.fail_simulation(
            "InstructionError(2, Custom(6002))",
            vec!["Program log: Error: slippage exceeded".to_string()],
        );

        let err = h.coordinator.run(&buy_intent(payer, 10_000_000)).await.unwrap_err();
        let SwapError::SimulationFailed { diagnostic } = err else {
            panic!("expected simulation failure, got {:?}", err);
        };
        assert!(diagnostic.contains("Custom(6002)"));
        assert!(diagnostic.contains("slippage exceeded"));
        assert!(h.relay.sent().is_empty());
    }

    #[tokio::test]
    async fn cold_cache_fails_fast() {
        let venue = FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Quote { output: 1 });
        let h = harness_with(
            vec![venue],
            ScriptedRelay::landing_on(1),
            Arc::new(MockLedger::new()),
            false,
        ).await;
        let payer = funded_payer(&h.ledger, 1_000_000_000);
        let err = h.coordinator.run(&buy_intent(payer, 10_000_000)).await.unwrap_err();
        assert!(matches!(err, SwapError::MetadataUnavailable));
        assert_eq!(h.ledger.calls.get_latest_blockhash.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_bundle_is_terminal() {
        let venue = FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Quote { output: 1 });
        let h = harness_with(
            vec![venue],
            ScriptedRelay::new(vec![BundleStatus::Pending, BundleStatus::Rejected]),
            Arc::new(MockLedger::new()),
            true,
        ).await;
        let payer = funded_payer(&h.ledger, 1_000_000_000);
        let err = h.coordinator.run(&buy_intent(payer, 10_000_000)).await.unwrap_err();
        assert!(matches!(err, SwapError::RelayRejected(_)));
    }

    #[tokio::test]
    async fn never_landing_times_out() {
        let venue = FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Quote { output: 1 });
        let h = harness_with(
            vec![venue],
            ScriptedRelay::new(Vec::new()),
            Arc::new(MockLedger::new()),
            true,
        ).await;
        let payer = funded_payer(&h.ledger, 1_000_000_000);
        let outcome = h.coordinator.execute_swap(&buy_intent(payer.clone(), 10_000_000)).await;
        assert!(!outcome.success);
        assert_eq!(outcome.signature, None);

        let err = h.coordinator.run(&buy_intent(payer, 10_000_000)).await.unwrap_err();
        assert!(matches!(err, SwapError::RelayTimeout { attempts: 5 }));
        assert!(err.is_retryable());
    }
}

// ============================================================================
// 模块 4: 用户生命周期
// ============================================================================

mod user_lifecycle_tests {
    use super::*;
    use sol_swap_engine::trading::{
        Notifier, SwapOutcome, UserProfile, UserProfileProvider, UserSwapRequest,
    };

    struct StaticProfiles {
        profile: Option<UserProfile>,
    }

    #[async_trait::async_trait]
    impl UserProfileProvider for StaticProfiles {
        async fn load_profile(&self, user_id: &str) -> Result<UserProfile> {
            self.profile.clone().ok_or_else(|| anyhow!("unknown user {}", user_id))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        outcomes: Arc<Mutex<Vec<(String, SwapOutcome)>>>,
        fail: bool,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, user_id: &str, outcome: SwapOutcome) -> BoxFuture<'static, Result<()>> {
            let outcomes = self.outcomes.clone();
            let user_id = user_id.to_string();
            let fail = self.fail;
            Box::pin(async move {
                outcomes.lock().push((user_id, outcome));
                if fail { Err(anyhow!("chat unreachable")) } else { Ok(()) }
            })
        }
    }

    fn request(direction: SwapDirection) -> UserSwapRequest {
        UserSwapRequest {
            user_id: "user-42".to_string(),
            mint: Pubkey::new_unique(),
            amount: 10_000_000,
            direction,
        }
    }

    #[tokio::test]
    async fn successful_swap_is_notified() {
        let venue = FakeVenue::new(VenueKind::RaydiumAmmV4, FakeBehavior::Quote { output: 77 });
        let h = harness(vec![venue]).await;
        let keypair = Keypair::new();
        h.ledger.set_balance(keypair.pubkey(), 1_000_000_000);
        let profiles = StaticProfiles {
            profile: Some(UserProfile {
                secret_key: keypair.to_base58_string(),
                slippage_basis_points: 1_000,
                tip_lamports: 0,
                referral_chain: ReferralChain::empty(),
            }),
        };
        let notifier = RecordingNotifier::default();

        let outcome = h.coordinator.execute_for_user(&profiles, &notifier, &request(SwapDirection::Buy)).await;
        assert!(outcome.success);
        assert_eq!(outcome.estimated_output_amount, 77);
        assert_eq!(outcome.input_amount, 10_000_000);
        assert!(outcome.signature.is_some());

        let notified = notifier.outcomes.lock().clone();
        assert_eq!(notified, vec![("user-42".to_string(), outcome)]);
    }

    #[tokio::test]
    async fn bad_secret_key_fails_without_touching_venues() {
        let venue = FakeVenue::new(VenueKind::RaydiumAmmV4, FakeBehavior::Quote { output: 77 });
        let h = harness(vec![venue.clone()]).await;
        let profiles = StaticProfiles {
            profile: Some(UserProfile {
                secret_key: "not-a-key".to_string(),
                slippage_basis_points: 1_000,
                tip_lamports: 0,
                referral_chain: ReferralChain::empty(),
            }),
        };
        let notifier = RecordingNotifier::default();

        let outcome = h.coordinator.execute_for_user(&profiles, &notifier, &request(SwapDirection::Sell)).await;
        assert_eq!(outcome, SwapOutcome::failed());
        assert_eq!(venue.calls(), 0);
        assert_eq!(notifier.outcomes.lock().len(), 1);
    }

    #[tokio::test]
    async fn notifier_failure_does_not_change_the_outcome() {
        let h = harness(vec![FakeVenue::new(VenueKind::PumpFun, FakeBehavior::Unavailable)]).await;
        let profiles = StaticProfiles { profile: None };
        let notifier = RecordingNotifier { fail: true, ..Default::default() };

        let outcome = h.coordinator.execute_for_user(&profiles, &notifier, &request(SwapDirection::Buy)).await;
        assert!(!outcome.success);
        assert_eq!(notifier.outcomes.lock().len(), 1);
    }
}
