//! The collateralized-debt engine
//!
//! Owns the ledger, the collaborator handles, and the reentrancy latch, and
//! exposes the public entry points. Every mutating entry point follows the
//! same discipline: acquire the latch, validate inputs, apply ledger effects
//! optimistically while journaling their compensations, perform external
//! calls (journaled the same way), and re-check the acting account's health
//! factor last. Any failure unwinds the journal in reverse, so the whole
//! call is observably all-or-nothing even across external-call boundaries.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::EngineError;
use crate::external::{OraclePrice, PriceOracle, SyntheticUnit, TokenLedger};
use crate::health::{self, LIQUIDATOR_BONUS_PCT, MIN_HEALTH_FACTOR};
use crate::id::{AccountId, AssetId};
use crate::latch::{LatchGuard, ReentrancyLatch};
use crate::ledger::{AssetConfig, Ledger};
use crate::math::{self, UNIT_DECIMALS};

/// Read-only summary of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountInformation {
    /// Outstanding minted debt, unit-of-account fixed point.
    pub debt: u128,
    /// Nominal (not risk-adjusted) collateral value, unit-of-account fixed
    /// point.
    pub collateral_value: u128,
}

/// Compensating action recorded while an operation is in flight, replayed in
/// reverse if the operation has to abort.
enum Undo {
    CreditCollateral { account: AccountId, asset: AssetId, amount: u128 },
    DebitCollateral { account: AccountId, asset: AssetId, amount: u128 },
    CreditDebt { account: AccountId, amount: u128 },
    DebitDebt { account: AccountId, amount: u128 },
    /// Send a collateral transfer back the way it came.
    ReturnToken { slot: usize, from: AccountId, to: AccountId, amount: u128 },
    /// Send a synthetic-unit transfer back the way it came.
    ReturnSynthetic { from: AccountId, to: AccountId, amount: u128 },
    /// Re-create units destroyed by a burn.
    RemintSynthetic { account: AccountId, amount: u128 },
    /// Claw back and destroy units created by a mint.
    UnmintSynthetic { account: AccountId, amount: u128 },
}

pub struct Engine {
    vault: AccountId,
    ledger: Ledger,
    // Parallel to `ledger.registry()`: slot i holds asset i's collaborators.
    oracles: Vec<Arc<dyn PriceOracle>>,
    tokens: Vec<Arc<dyn TokenLedger>>,
    synthetic: Arc<dyn SyntheticUnit>,
    latch: Arc<ReentrancyLatch>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("vault", &self.vault)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Build an engine from parallel registry sequences. The sequences must
    /// agree in length, assets must be unique, and each asset's decimal
    /// configuration must be representable; any violation is a
    /// `MismatchedRegistryConfig` rejection. The registry is immutable
    /// afterwards.
    pub fn new(
        vault: AccountId,
        assets: Vec<AssetConfig>,
        oracles: Vec<Arc<dyn PriceOracle>>,
        tokens: Vec<Arc<dyn TokenLedger>>,
        synthetic: Arc<dyn SyntheticUnit>,
    ) -> Result<Self, EngineError> {
        if oracles.len() != assets.len() {
            return Err(EngineError::MismatchedRegistryConfig(format!(
                "{} assets but {} oracles",
                assets.len(),
                oracles.len()
            )));
        }
        if tokens.len() != assets.len() {
            return Err(EngineError::MismatchedRegistryConfig(format!(
                "{} assets but {} token ledgers",
                assets.len(),
                tokens.len()
            )));
        }
        for (i, cfg) in assets.iter().enumerate() {
            if assets[..i].iter().any(|prev| prev.asset == cfg.asset) {
                return Err(EngineError::MismatchedRegistryConfig(format!(
                    "duplicate asset {}",
                    cfg.asset
                )));
            }
            if cfg.oracle_decimals > UNIT_DECIMALS {
                return Err(EngineError::MismatchedRegistryConfig(format!(
                    "asset {}: oracle decimals {} exceed unit-of-account decimals {}",
                    cfg.asset, cfg.oracle_decimals, UNIT_DECIMALS
                )));
            }
            if math::pow10(cfg.decimals).is_none() {
                return Err(EngineError::MismatchedRegistryConfig(format!(
                    "asset {}: {} decimals is not representable",
                    cfg.asset, cfg.decimals
                )));
            }
        }
        Ok(Self {
            vault,
            ledger: Ledger::new(assets),
            oracles,
            tokens,
            synthetic,
            latch: ReentrancyLatch::new(),
        })
    }

    /// Rebuild an engine around previously captured ledger state. Used by
    /// tooling that persists the ledger between invocations; every seeded
    /// position must reference a registered asset.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        vault: AccountId,
        assets: Vec<AssetConfig>,
        oracles: Vec<Arc<dyn PriceOracle>>,
        tokens: Vec<Arc<dyn TokenLedger>>,
        synthetic: Arc<dyn SyntheticUnit>,
        positions: Vec<(AccountId, AssetId, u128)>,
        debts: Vec<(AccountId, u128)>,
    ) -> Result<Self, EngineError> {
        let mut engine = Self::new(vault, assets, oracles, tokens, synthetic)?;
        for (account, asset, amount) in positions {
            if engine.ledger.slot_of(asset).is_none() {
                return Err(EngineError::UnknownAsset(asset));
            }
            engine.ledger.credit_collateral(account, asset, amount)?;
        }
        for (account, amount) in debts {
            engine.ledger.credit_debt(account, amount)?;
        }
        Ok(engine)
    }

    /// The engine's own account on the external ledgers, where deposited
    /// collateral and in-flight synthetic units are held.
    pub fn vault(&self) -> AccountId {
        self.vault
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // ------------------------------------------------------------------
    // Valuation (read-only)
    // ------------------------------------------------------------------

    fn slot(&self, asset: AssetId) -> Result<usize, EngineError> {
        self.ledger
            .slot_of(asset)
            .ok_or(EngineError::UnknownAsset(asset))
    }

    /// Current oracle price scaled up to unit-of-account fixed point.
    fn scaled_price(&self, slot: usize) -> Result<u128, EngineError> {
        let cfg = self.ledger.registry()[slot];
        let OraclePrice { price, .. } = self.oracles[slot].latest_price();
        if price == 0 {
            return Err(EngineError::InvalidOraclePrice(cfg.asset));
        }
        let scale = math::pow10(UNIT_DECIMALS - cfg.oracle_decimals)
            .ok_or(EngineError::ArithmeticOverflow)?;
        price.checked_mul(scale).ok_or(EngineError::ArithmeticOverflow)
    }

    /// Value of `amount` native units of `asset` in unit-of-account fixed
    /// point, at the current oracle price.
    pub fn asset_value(&self, asset: AssetId, amount: u128) -> Result<u128, EngineError> {
        let slot = self.slot(asset)?;
        let cfg = self.ledger.registry()[slot];
        let price = self.scaled_price(slot)?;
        let unit = math::pow10(cfg.decimals).ok_or(EngineError::ArithmeticOverflow)?;
        math::mul_div(price, amount, unit).ok_or(EngineError::ArithmeticOverflow)
    }

    /// Inverse of `asset_value`: the quantity of `asset` worth `value` at
    /// the current oracle price.
    pub fn token_amount_from_value(&self, asset: AssetId, value: u128) -> Result<u128, EngineError> {
        let slot = self.slot(asset)?;
        let cfg = self.ledger.registry()[slot];
        let price = self.scaled_price(slot)?;
        let unit = math::pow10(cfg.decimals).ok_or(EngineError::ArithmeticOverflow)?;
        math::mul_div(value, unit, price).ok_or(EngineError::ArithmeticOverflow)
    }

    /// Sum of `asset_value` over every registered asset the account holds.
    pub fn account_collateral_value(&self, account: AccountId) -> Result<u128, EngineError> {
        let mut total: u128 = 0;
        for cfg in self.ledger.registry() {
            let amount = self.ledger.collateral_of(account, cfg.asset);
            if amount == 0 {
                continue;
            }
            let value = self.asset_value(cfg.asset, amount)?;
            total = total.checked_add(value).ok_or(EngineError::ArithmeticOverflow)?;
        }
        Ok(total)
    }

    pub fn health_factor(&self, account: AccountId) -> Result<u128, EngineError> {
        let collateral_value = self.account_collateral_value(account)?;
        health::health_factor(collateral_value, self.ledger.debt_of(account))
    }

    pub fn account_information(&self, account: AccountId) -> Result<AccountInformation, EngineError> {
        Ok(AccountInformation {
            debt: self.ledger.debt_of(account),
            collateral_value: self.account_collateral_value(account)?,
        })
    }

    // ------------------------------------------------------------------
    // Mutating entry points
    // ------------------------------------------------------------------

    /// Deposit `amount` of `asset` as collateral for `account`.
    ///
    /// Deposits cannot reduce solvency, so there is no trailing health
    /// check.
    pub fn deposit_collateral(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), EngineError> {
        let _guard = LatchGuard::acquire(&self.latch)?;
        let mut journal = Vec::new();
        let result = self.deposit_inner(&mut journal, account, asset, amount);
        self.commit(journal, result, || {
            info!("deposit: account={account} asset={asset} amount={amount}");
        })
    }

    /// Redeem `amount` of `asset` back to `account`, then verify the
    /// account is still solvent.
    pub fn redeem_collateral(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), EngineError> {
        let _guard = LatchGuard::acquire(&self.latch)?;
        let mut journal = Vec::new();
        let mut result = self.redeem_inner(&mut journal, account, account, asset, amount);
        if result.is_ok() {
            result = self.check_health(account);
        }
        self.commit(journal, result, || {
            info!("redeem: account={account} asset={asset} amount={amount}");
        })
    }

    /// Mint `amount` of the synthetic unit against `account`'s collateral.
    ///
    /// The health check runs after the external mint; if it fails, the
    /// journal reverts the external mint as well.
    pub fn mint_debt(&mut self, account: AccountId, amount: u128) -> Result<(), EngineError> {
        let _guard = LatchGuard::acquire(&self.latch)?;
        let mut journal = Vec::new();
        let mut result = self.mint_inner(&mut journal, account, amount);
        if result.is_ok() {
            result = self.check_health(account);
        }
        self.commit(journal, result, || {
            info!("mint: account={account} amount={amount}");
        })
    }

    /// Burn `amount` of the caller's own debt, paid from the caller's
    /// synthetic balance.
    ///
    /// Burning can only improve the health factor; the trailing check is
    /// kept for auditability.
    pub fn burn_debt(&mut self, account: AccountId, amount: u128) -> Result<(), EngineError> {
        let _guard = LatchGuard::acquire(&self.latch)?;
        let mut journal = Vec::new();
        let mut result = self.burn_inner(&mut journal, account, account, amount);
        if result.is_ok() {
            result = self.check_health(account);
        }
        self.commit(journal, result, || {
            info!("burn: account={account} amount={amount}");
        })
    }

    /// Composite deposit + mint under a single latch acquisition and a
    /// single trailing health check.
    pub fn deposit_and_mint(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: u128,
        mint_amount: u128,
    ) -> Result<(), EngineError> {
        let _guard = LatchGuard::acquire(&self.latch)?;
        let mut journal = Vec::new();
        let mut result = self.deposit_inner(&mut journal, account, asset, amount);
        if result.is_ok() {
            result = self.mint_inner(&mut journal, account, mint_amount);
        }
        if result.is_ok() {
            result = self.check_health(account);
        }
        self.commit(journal, result, || {
            info!("deposit+mint: account={account} asset={asset} amount={amount} mint={mint_amount}");
        })
    }

    /// Composite burn-then-redeem under a single latch acquisition and a
    /// single trailing health check.
    pub fn redeem_for_burn(
        &mut self,
        account: AccountId,
        asset: AssetId,
        redeem_amount: u128,
        burn_amount: u128,
    ) -> Result<(), EngineError> {
        let _guard = LatchGuard::acquire(&self.latch)?;
        let mut journal = Vec::new();
        let mut result = self.burn_inner(&mut journal, account, account, burn_amount);
        if result.is_ok() {
            result = self.redeem_inner(&mut journal, account, account, asset, redeem_amount);
        }
        if result.is_ok() {
            result = self.check_health(account);
        }
        self.commit(journal, result, || {
            info!("burn+redeem: account={account} asset={asset} redeem={redeem_amount} burn={burn_amount}");
        })
    }

    /// Forcibly close part of an undercollateralized position.
    ///
    /// The liquidator repays `debt_to_cover` of the target's debt and
    /// receives the equivalent collateral plus a bonus. The whole operation
    /// is void unless the target's health factor strictly improves and the
    /// liquidator itself remains solvent.
    pub fn liquidate(
        &mut self,
        liquidator: AccountId,
        asset: AssetId,
        target: AccountId,
        debt_to_cover: u128,
    ) -> Result<(), EngineError> {
        let _guard = LatchGuard::acquire(&self.latch)?;
        if debt_to_cover == 0 {
            return Err(EngineError::ZeroAmount);
        }
        // Preconditions run before any mutation: a rejected liquidation
        // leaves no trace.
        let hf_before = self.health_factor(target)?;
        if hf_before >= MIN_HEALTH_FACTOR {
            return Err(EngineError::TargetHealthy(hf_before));
        }
        let base = self.token_amount_from_value(asset, debt_to_cover)?;
        let bonus = math::pct(base, LIQUIDATOR_BONUS_PCT).ok_or(EngineError::ArithmeticOverflow)?;
        let seized = base.checked_add(bonus).ok_or(EngineError::ArithmeticOverflow)?;

        let mut journal = Vec::new();
        let mut result = self.redeem_inner(&mut journal, target, liquidator, asset, seized);
        if result.is_ok() {
            result = self.burn_inner(&mut journal, target, liquidator, debt_to_cover);
        }
        if result.is_ok() {
            // Postcondition A: the target must be strictly better off.
            result = match self.health_factor(target) {
                Ok(hf_after) if hf_after > hf_before => Ok(()),
                Ok(hf_after) => Err(EngineError::HealthFactorNotImproved {
                    before: hf_before,
                    after: hf_after,
                }),
                Err(e) => Err(e),
            };
        }
        if result.is_ok() {
            // Postcondition B: the liquidator may not leave itself insolvent.
            result = self.check_health(liquidator);
        }
        self.commit(journal, result, || {
            info!(
                "liquidate: liquidator={liquidator} target={target} asset={asset} \
                 debt_covered={debt_to_cover} seized={seized}"
            );
        })
    }

    // ------------------------------------------------------------------
    // Inner steps (latch already held by the caller)
    // ------------------------------------------------------------------

    fn deposit_inner(
        &mut self,
        journal: &mut Vec<Undo>,
        account: AccountId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), EngineError> {
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }
        let slot = self.slot(asset)?;
        self.ledger.credit_collateral(account, asset, amount)?;
        journal.push(Undo::DebitCollateral { account, asset, amount });
        self.tokens[slot]
            .transfer_from(account, self.vault, amount)
            .map_err(EngineError::CollateralTransferFailed)?;
        journal.push(Undo::ReturnToken { slot, from: self.vault, to: account, amount });
        Ok(())
    }

    /// Shared by self-redemption (`from == to`) and liquidation seizure
    /// (`from` is the target, `to` the liquidator).
    fn redeem_inner(
        &mut self,
        journal: &mut Vec<Undo>,
        from: AccountId,
        to: AccountId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), EngineError> {
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }
        let slot = self.slot(asset)?;
        self.ledger.debit_collateral(from, asset, amount)?;
        journal.push(Undo::CreditCollateral { account: from, asset, amount });
        self.tokens[slot]
            .transfer_from(self.vault, to, amount)
            .map_err(EngineError::CollateralTransferFailed)?;
        journal.push(Undo::ReturnToken { slot, from: to, to: self.vault, amount });
        Ok(())
    }

    fn mint_inner(
        &mut self,
        journal: &mut Vec<Undo>,
        account: AccountId,
        amount: u128,
    ) -> Result<(), EngineError> {
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }
        self.ledger.credit_debt(account, amount)?;
        journal.push(Undo::DebitDebt { account, amount });
        self.synthetic
            .mint(account, amount)
            .map_err(EngineError::SyntheticMintFailed)?;
        journal.push(Undo::UnmintSynthetic { account, amount });
        Ok(())
    }

    /// Shared by self-service burning (`on_behalf_of == payer`) and
    /// liquidation repayment (`on_behalf_of` is the target, `payer` the
    /// liquidator).
    fn burn_inner(
        &mut self,
        journal: &mut Vec<Undo>,
        on_behalf_of: AccountId,
        payer: AccountId,
        amount: u128,
    ) -> Result<(), EngineError> {
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }
        self.ledger.debit_debt(on_behalf_of, amount)?;
        journal.push(Undo::CreditDebt { account: on_behalf_of, amount });
        self.synthetic
            .transfer_from(payer, self.vault, amount)
            .map_err(EngineError::SyntheticTransferFailed)?;
        journal.push(Undo::ReturnSynthetic { from: self.vault, to: payer, amount });
        self.synthetic
            .burn(self.vault, amount)
            .map_err(EngineError::SyntheticBurnFailed)?;
        journal.push(Undo::RemintSynthetic { account: self.vault, amount });
        Ok(())
    }

    fn check_health(&self, account: AccountId) -> Result<(), EngineError> {
        let hf = self.health_factor(account)?;
        if health::is_broken(hf) {
            return Err(EngineError::BrokenHealthFactor(hf));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Journal
    // ------------------------------------------------------------------

    /// On success, drop the journal and log; on failure, unwind it and
    /// surface the original error (or the rollback error if a compensation
    /// itself was refused).
    fn commit(
        &mut self,
        journal: Vec<Undo>,
        result: Result<(), EngineError>,
        log_success: impl FnOnce(),
    ) -> Result<(), EngineError> {
        match result {
            Ok(()) => {
                log_success();
                Ok(())
            }
            Err(err) => {
                debug!("aborting: {err}");
                match self.unwind(journal) {
                    Ok(()) => Err(err),
                    Err(rollback) => {
                        warn!("rollback failed after {err}: {rollback}");
                        Err(rollback)
                    }
                }
            }
        }
    }

    fn unwind(&mut self, journal: Vec<Undo>) -> Result<(), EngineError> {
        for undo in journal.into_iter().rev() {
            match undo {
                Undo::CreditCollateral { account, asset, amount } => {
                    self.ledger.credit_collateral(account, asset, amount)?;
                }
                Undo::DebitCollateral { account, asset, amount } => {
                    self.ledger.debit_collateral(account, asset, amount)?;
                }
                Undo::CreditDebt { account, amount } => {
                    self.ledger.credit_debt(account, amount)?;
                }
                Undo::DebitDebt { account, amount } => {
                    self.ledger.debit_debt(account, amount)?;
                }
                Undo::ReturnToken { slot, from, to, amount } => {
                    self.tokens[slot]
                        .transfer_from(from, to, amount)
                        .map_err(EngineError::RollbackFailed)?;
                }
                Undo::ReturnSynthetic { from, to, amount } => {
                    self.synthetic
                        .transfer_from(from, to, amount)
                        .map_err(EngineError::RollbackFailed)?;
                }
                Undo::RemintSynthetic { account, amount } => {
                    self.synthetic
                        .mint(account, amount)
                        .map_err(EngineError::RollbackFailed)?;
                }
                Undo::UnmintSynthetic { account, amount } => {
                    self.synthetic
                        .transfer_from(account, self.vault, amount)
                        .and_then(|()| self.synthetic.burn(self.vault, amount))
                        .map_err(EngineError::RollbackFailed)?;
                }
            }
        }
        Ok(())
    }
}
