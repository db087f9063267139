//! End-to-end deposit / mint / redeem / burn scenarios

use pegmint_engine::{EngineError, TokenLedger, MAX_HEALTH_FACTOR, MIN_HEALTH_FACTOR, PRECISION};
use pegmint_integration_tests::{acct, weth, world, UNIT};

#[test]
fn deposit_then_valuation_matches_oracle() {
    let w = world(2_000);
    // 10 units at $2000/unit is 20000 in the unit of account.
    assert_eq!(w.engine.asset_value(weth(), 10 * UNIT).unwrap(), 20_000 * PRECISION);
}

#[test]
fn mint_at_the_exact_boundary_is_allowed() {
    let mut w = world(2_000);
    w.engine.deposit_collateral(acct("alice"), weth(), 10 * UNIT).unwrap();
    // 20000 of collateral counts as 10000; minting all of it lands exactly
    // on a health factor of 1.0, which is solvent.
    w.engine.mint_debt(acct("alice"), 10_000 * PRECISION).unwrap();
    assert_eq!(w.engine.health_factor(acct("alice")).unwrap(), MIN_HEALTH_FACTOR);
}

#[test]
fn minting_past_the_boundary_is_rejected() {
    let mut w = world(2_000);
    w.engine.deposit_collateral(acct("alice"), weth(), 10 * UNIT).unwrap();
    let err = w.engine.mint_debt(acct("alice"), 20_001 * PRECISION).unwrap_err();
    assert!(matches!(err, EngineError::BrokenHealthFactor(_)));
    // Nothing was committed, internally or externally.
    assert_eq!(w.engine.ledger().debt_of(acct("alice")), 0);
    assert_eq!(w.synthetic.total_supply(), 0);
}

#[test]
fn zero_debt_means_maximal_health_factor() {
    let mut w = world(2_000);
    // With no collateral at all.
    assert_eq!(w.engine.health_factor(acct("alice")).unwrap(), MAX_HEALTH_FACTOR);
    // And with collateral but no debt.
    w.engine.deposit_collateral(acct("alice"), weth(), 5 * UNIT).unwrap();
    assert_eq!(w.engine.health_factor(acct("alice")).unwrap(), MAX_HEALTH_FACTOR);
}

#[test]
fn two_deposits_equal_one_deposit_of_the_sum() {
    let mut split = world(2_000);
    split.engine.deposit_collateral(acct("alice"), weth(), 3 * UNIT).unwrap();
    split.engine.deposit_collateral(acct("alice"), weth(), 7 * UNIT).unwrap();

    let mut single = world(2_000);
    single.engine.deposit_collateral(acct("alice"), weth(), 10 * UNIT).unwrap();

    assert_eq!(
        split.engine.ledger().collateral_of(acct("alice"), weth()),
        single.engine.ledger().collateral_of(acct("alice"), weth()),
    );
    assert_eq!(
        split.token.balance_of(acct("vault")),
        single.token.balance_of(acct("vault")),
    );
}

#[test]
fn burn_more_than_minted_is_rejected() {
    let mut w = world(2_000);
    w.engine.deposit_and_mint(acct("alice"), weth(), 10 * UNIT, 1_000 * PRECISION).unwrap();
    let err = w.engine.burn_debt(acct("alice"), 1_001 * PRECISION).unwrap_err();
    assert_eq!(
        err,
        EngineError::BurnExceedsDebt {
            requested: 1_001 * PRECISION,
            outstanding: 1_000 * PRECISION,
        }
    );
}

#[test]
fn full_repayment_releases_all_collateral() {
    let mut w = world(2_000);
    w.engine.deposit_and_mint(acct("alice"), weth(), 10 * UNIT, 8_000 * PRECISION).unwrap();
    w.engine
        .redeem_for_burn(acct("alice"), weth(), 10 * UNIT, 8_000 * PRECISION)
        .unwrap();
    assert_eq!(w.engine.ledger().debt_of(acct("alice")), 0);
    assert_eq!(w.engine.ledger().collateral_of(acct("alice"), weth()), 0);
    assert_eq!(w.token.balance_of(acct("alice")), 1_000 * UNIT);
    assert_eq!(w.synthetic.total_supply(), 0);
}

#[test]
fn failed_collateral_transfer_rolls_the_deposit_back() {
    let mut w = world(2_000);
    w.token.fail_next_transfer();
    let err = w.engine.deposit_collateral(acct("alice"), weth(), UNIT).unwrap_err();
    assert!(matches!(err, EngineError::CollateralTransferFailed(_)));
    assert_eq!(w.engine.ledger().collateral_of(acct("alice"), weth()), 0);
    assert_eq!(w.token.balance_of(acct("alice")), 1_000 * UNIT);
}

#[test]
fn rejected_external_mint_rolls_the_debt_back() {
    let mut w = world(2_000);
    w.engine.deposit_collateral(acct("alice"), weth(), 10 * UNIT).unwrap();
    w.synthetic.fail_next_mint();
    let err = w.engine.mint_debt(acct("alice"), 100 * PRECISION).unwrap_err();
    assert!(matches!(err, EngineError::SyntheticMintFailed(_)));
    assert_eq!(w.engine.ledger().debt_of(acct("alice")), 0);
}

#[test]
fn redeeming_into_insolvency_is_fully_unwound() {
    let mut w = world(2_000);
    w.engine.deposit_and_mint(acct("alice"), weth(), 10 * UNIT, 10_000 * PRECISION).unwrap();
    let err = w.engine.redeem_collateral(acct("alice"), weth(), UNIT).unwrap_err();
    assert!(matches!(err, EngineError::BrokenHealthFactor(_)));
    // Position and external balances both restored.
    assert_eq!(w.engine.ledger().collateral_of(acct("alice"), weth()), 10 * UNIT);
    assert_eq!(w.token.balance_of(acct("alice")), 990 * UNIT);
    assert_eq!(w.token.balance_of(acct("vault")), 10 * UNIT);
}
