use crate::{
    common::{
        spl_token::{create_associated_token_account_idempotent, get_associated_token_address},
        LedgerRpc,
    },
    constants::{TOKEN_PROGRAM, TOKEN_PROGRAM_META, WSOL_MINT},
    instruction::utils::{
        raydium_amm_v4::{
            accounts, find_wsol_pools_by_mint, get_vault_signer, select_deepest_pool,
            PoolSnapshot, SWAP_BASE_IN_DISCRIMINATOR,
        },
        raydium_amm_v4_types::MarketStateV3,
    },
    trading::{
        common::wsol_manager::{close_wsol, create_wsol_ata, handle_wsol},
        core::{
            errors::SwapError,
            params::{SwapDirection, SwapIntent},
            traits::{SwapVenue, VenueKind, VenueOutcome, VenueQuote},
        },
    },
    utils::calc::{common::calculate_with_slippage_sell, raydium_amm_v4::compute_swap_amount},
};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signer::Signer,
};
use std::sync::Arc;
use tracing::debug;

/// Raydium Liquidity Pool V4 venue
///
/// 程序地址: 675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8
pub struct RaydiumAmmV4Venue {
    rpc: Arc<dyn LedgerRpc>,
}

impl RaydiumAmmV4Venue {
    pub fn new(rpc: Arc<dyn LedgerRpc>) -> Self {
        Self { rpc }
    }

    fn venue_error(context: &str, err: anyhow::Error) -> SwapError {
        SwapError::Venue { venue: VenueKind::RaydiumAmmV4, message: format!("{}: {:#}", context, err) }
    }

    async fn fetch_market(&self, pool: &PoolSnapshot) -> Result<Option<MarketStateV3>, SwapError> {
        let account = self
            .rpc
            .get_account(&pool.info.market)
            .await
            .map_err(|e| Self::venue_error("failed to fetch market", e))?;
        Ok(account.and_then(|account| MarketStateV3::decode(&account.data)))
    }

    /// Seller's token account: the ATA when it is among the owner's accounts,
    /// otherwise the first one the node returns.
    async fn find_source_token_account(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Option<Pubkey>, SwapError> {
        let candidates = self
            .rpc
            .get_token_accounts_by_owner(owner, mint)
            .await
            .map_err(|e| Self::venue_error("failed to list token accounts", e))?;
        let ata = get_associated_token_address(owner, mint);
        if candidates.contains(&ata) {
            return Ok(Some(ata));
        }
        Ok(candidates.first().copied())
    }
}

#[async_trait::async_trait]
impl SwapVenue for RaydiumAmmV4Venue {
    fn kind(&self) -> VenueKind {
        VenueKind::RaydiumAmmV4
    }

    async fn try_build(&self, intent: &SwapIntent) -> Result<VenueOutcome, SwapError> {
        let pools = find_wsol_pools_by_mint(self.rpc.as_ref(), &intent.mint)
            .await
            .map_err(|e| Self::venue_error("pool search failed", e))?;
        if pools.is_empty() {
            return Ok(VenueOutcome::Unavailable("no wSOL pool for mint".to_string()));
        }
        let Some(pool) = select_deepest_pool(self.rpc.as_ref(), pools)
            .await
            .map_err(|e| Self::venue_error("failed to read pool vaults", e))?
        else {
            return Ok(VenueOutcome::Unavailable("no tradeable pool".to_string()));
        };

        let (reserve_in, reserve_out) = match intent.direction {
            SwapDirection::Buy => (pool.native_reserve(), pool.token_reserve()),
            SwapDirection::Sell => (pool.token_reserve(), pool.native_reserve()),
        };
        let fees = &pool.info.fees;
        let quote = match compute_swap_amount(
            intent.amount,
            reserve_in,
            reserve_out,
            fees.swap_fee_numerator,
            fees.swap_fee_denominator,
        ) {
            Some(quote) if quote.amount_out > 0 => quote,
            _ => return Ok(VenueOutcome::Unavailable("pool cannot price the input".to_string())),
        };
        let minimum_amount_out =
            calculate_with_slippage_sell(quote.amount_out, intent.slippage_basis_points);

        let Some(market) = self.fetch_market(&pool).await? else {
            return Ok(VenueOutcome::Unavailable("market account missing".to_string()));
        };
        let vault_signer = match get_vault_signer(
            &pool.info.market,
            market.vault_signer_nonce,
            &pool.info.serum_dex,
        ) {
            Ok(signer) => signer,
            Err(e) => return Ok(VenueOutcome::Unavailable(e.to_string())),
        };

        let payer = intent.payer.pubkey();
        let wsol_account = get_associated_token_address(&payer, &WSOL_MINT);
        let mut instructions = Vec::with_capacity(6);
        match intent.direction {
            SwapDirection::Buy => {
                let destination = get_associated_token_address(&payer, &intent.mint);
                instructions.extend(
                    handle_wsol(&payer, intent.amount)
                        .map_err(|e| Self::venue_error("failed to wrap SOL", e))?,
                );
                instructions.push(create_associated_token_account_idempotent(
                    &payer,
                    &payer,
                    &intent.mint,
                    &TOKEN_PROGRAM,
                ));
                instructions.push(build_swap_base_in_instruction(
                    &pool,
                    &market,
                    &vault_signer,
                    &wsol_account,
                    &destination,
                    &payer,
                    intent.amount,
                    minimum_amount_out,
                ));
            }
            SwapDirection::Sell => {
                let Some(source) = self.find_source_token_account(&payer, &intent.mint).await?
                else {
                    return Ok(VenueOutcome::Unavailable("seller has no token account".to_string()));
                };
                instructions.push(create_wsol_ata(&payer));
                instructions.push(build_swap_base_in_instruction(
                    &pool,
                    &market,
                    &vault_signer,
                    &source,
                    &wsol_account,
                    &payer,
                    intent.amount,
                    minimum_amount_out,
                ));
            }
        }
        instructions
            .push(close_wsol(&payer).map_err(|e| Self::venue_error("failed to close wSOL", e))?);

        debug!(
            pool = %pool.address,
            amount_out = quote.amount_out,
            minimum_amount_out,
            fee = quote.fee_amount,
            price_impact_bps = ?quote.price_impact_bps,
            "raydium v4 quote"
        );
        Ok(VenueOutcome::Quote(VenueQuote {
            venue: VenueKind::RaydiumAmmV4,
            input_amount: intent.amount,
            estimated_output_amount: quote.amount_out,
            instructions,
            address_lookup_tables: Vec::new(),
        }))
    }
}

/// `SwapBaseIn`: tag 9, `amount_in`, `minimum_amount_out` over 18 accounts.
#[allow(clippy::too_many_arguments)]
pub fn build_swap_base_in_instruction(
    pool: &PoolSnapshot,
    market: &MarketStateV3,
    vault_signer: &Pubkey,
    user_source: &Pubkey,
    user_destination: &Pubkey,
    owner: &Pubkey,
    amount_in: u64,
    minimum_amount_out: u64,
) -> Instruction {
    let info = &pool.info;
    let accounts: [AccountMeta; 18] = [
        TOKEN_PROGRAM_META,
        AccountMeta::new(pool.address, false),
        accounts::AUTHORITY_META,
        AccountMeta::new(info.open_orders, false),
        AccountMeta::new(info.target_orders, false),
        AccountMeta::new(info.token_coin, false),
        AccountMeta::new(info.token_pc, false),
        AccountMeta::new_readonly(info.serum_dex, false),
        AccountMeta::new(info.market, false),
        AccountMeta::new(market.bids, false),
        AccountMeta::new(market.asks, false),
        AccountMeta::new(market.event_queue, false),
        AccountMeta::new(market.coin_vault, false),
        AccountMeta::new(market.pc_vault, false),
        AccountMeta::new_readonly(*vault_signer, false),
        AccountMeta::new(*user_source, false),
        AccountMeta::new(*user_destination, false),
        AccountMeta::new_readonly(*owner, true),
    ];

    let mut data = [0u8; 17];
    data[0] = SWAP_BASE_IN_DISCRIMINATOR;
    data[1..9].copy_from_slice(&amount_in.to_le_bytes());
    data[9..17].copy_from_slice(&minimum_amount_out.to_le_bytes());

    Instruction::new_with_bytes(accounts::RAYDIUM_AMM_V4, &data, accounts.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::mock_rpc::MockLedger;
    use crate::common::spl_token::packed_token_account;
    use crate::instruction::utils::raydium_amm_v4::pool_status;
    use crate::instruction::utils::raydium_amm_v4_types::{AmmInfo, Fees};
    use crate::trading::core::params::ReferralChain;
    use solana_sdk::signature::Keypair;

    struct Fixture {
        ledger: Arc<MockLedger>,
        mint: Pubkey,
        pool: Pubkey,
    }

    fn token_account(amount: u64) -> Vec<u8> {
        packed_token_account(Pubkey::new_unique(), Pubkey::new_unique(), amount)
    }

    fn fixture() -> Fixture {
        let ledger = Arc::new(MockLedger::new());
        let mint = Pubkey::new_unique();
        let serum = Pubkey::new_unique();
        let market_address = Pubkey::new_unique();
        let nonce = (0u64..256)
            .find(|n| get_vault_signer(&market_address, *n, &serum).is_ok())
            .unwrap();

        let info = AmmInfo {
            status: pool_status::SWAP_ONLY,
            fees: Fees { swap_fee_numerator: 25, swap_fee_denominator: 10_000, ..Default::default() },
            token_coin: Pubkey::new_unique(),
            token_pc: Pubkey::new_unique(),
            coin_mint: mint,
            pc_mint: WSOL_MINT,
            open_orders: Pubkey::new_unique(),
            market: market_address,
            serum_dex: serum,
            target_orders: Pubkey::new_unique(),
            ..Default::default()
        };
        let pool = Pubkey::new_unique();
        ledger.set_account_data(pool, accounts::RAYDIUM_AMM_V4, borsh::to_vec(&info).unwrap());
        ledger.set_account_data(info.token_coin, TOKEN_PROGRAM, token_account(200_000_000));
        ledger.set_account_data(info.token_pc, TOKEN_PROGRAM, token_account(100_000_000));
        let market = MarketStateV3 {
            own_address: market_address,
            vault_signer_nonce: nonce,
            coin_vault: Pubkey::new_unique(),
            pc_vault: Pubkey::new_unique(),
            event_queue: Pubkey::new_unique(),
            bids: Pubkey::new_unique(),
            asks: Pubkey::new_unique(),
        };
        ledger.set_account_data(market_address, serum, market.to_account_data());
        Fixture { ledger, mint, pool }
    }

    fn intent(mint: Pubkey, payer: Arc<Keypair>, direction: SwapDirection) -> SwapIntent {
        SwapIntent::new(payer, mint, 1_000_000, direction, 100, 0, ReferralChain::empty())
    }

    #[tokio::test]
    async fn buy_goes_through_the_pool_with_wsol_wrapping() {
        let f = fixture();
        let venue = RaydiumAmmV4Venue::new(f.ledger.clone());
        let payer = Arc::new(Keypair::new());
        let outcome = venue.try_build(&intent(f.mint, payer.clone(), SwapDirection::Buy)).await.unwrap();
        let VenueOutcome::Quote(quote) = outcome else { panic!("expected quote") };

        // 200e6 * 997_500 / (100e6 + 997_500)
        assert_eq!(quote.estimated_output_amount, 1_975_296);
        // wrap (3) + mint ATA + swap + close
        assert_eq!(quote.instructions.len(), 6);
        let swap = &quote.instructions[4];
        assert_eq!(swap.program_id, accounts::RAYDIUM_AMM_V4);
        assert_eq!(swap.accounts.len(), 18);
        assert_eq!(swap.accounts[1].pubkey, f.pool);
        assert_eq!(swap.data[0], 9);
        assert_eq!(u64::from_le_bytes(swap.data[1..9].try_into().unwrap()), 1_000_000);
        // 1% slippage on the expected output
        assert_eq!(u64::from_le_bytes(swap.data[9..17].try_into().unwrap()), 1_955_543);
        assert!(swap.accounts[17].is_signer);
        assert_eq!(swap.accounts[17].pubkey, payer.pubkey());
    }

    #[tokio::test]
    async fn sell_prefers_the_associated_token_account() {
        let f = fixture();
        let payer = Arc::new(Keypair::new());
        let ata = get_associated_token_address(&payer.pubkey(), &f.mint);
        let other = Pubkey::new_unique();
        f.ledger.set_token_accounts(payer.pubkey(), f.mint, vec![other, ata]);

        let venue = RaydiumAmmV4Venue::new(f.ledger.clone());
        let outcome = venue.try_build(&intent(f.mint, payer.clone(), SwapDirection::Sell)).await.unwrap();
        let VenueOutcome::Quote(quote) = outcome else { panic!("expected quote") };
        assert_eq!(quote.instructions.len(), 3);
        assert_eq!(quote.instructions[1].accounts[15].pubkey, ata);
    }

    #[tokio::test]
    async fn sell_without_token_account_is_unavailable() {
        let f = fixture();
        let venue = RaydiumAmmV4Venue::new(f.ledger.clone());
        let payer = Arc::new(Keypair::new());
        let outcome = venue.try_build(&intent(f.mint, payer, SwapDirection::Sell)).await.unwrap();
        assert!(matches!(outcome, VenueOutcome::Unavailable(_)));
    }

    #[tokio::test]
    async fn unknown_mint_is_unavailable() {
        let f = fixture();
        let venue = RaydiumAmmV4Venue::new(f.ledger.clone());
        let outcome = venue
            .try_build(&intent(Pubkey::new_unique(), Arc::new(Keypair::new()), SwapDirection::Buy))
            .await
            .unwrap();
        assert!(matches!(outcome, VenueOutcome::Unavailable(_)));
    }
}
