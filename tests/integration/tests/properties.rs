//! Property tests over the public entry points

use proptest::prelude::*;

use pegmint_engine::{MIN_HEALTH_FACTOR, PRECISION};
use pegmint_integration_tests::{acct, weth, world, DOLLAR, UNIT};

proptest! {
    /// Valuation round-trip: converting an amount to unit-of-account value
    /// and back loses at most the fixed-point rounding remainder.
    #[test]
    fn valuation_roundtrip_within_tolerance(
        price_dollars in 1u128..1_000_000u128,
        amount in 1u128..10_000_000_000_000u128,
    ) {
        let w = world(price_dollars);
        let value = w.engine.asset_value(weth(), amount).unwrap();
        let back = w.engine.token_amount_from_value(weth(), value).unwrap();
        prop_assert!(back <= amount);
        // Scaled prices of at least $1 bound the floor-division loss to two
        // native units.
        prop_assert!(amount - back <= 2);
    }

    /// Splitting a deposit in two yields the same position as one deposit
    /// of the sum.
    #[test]
    fn deposit_additivity(
        x in 1u128..500u128,
        y in 1u128..500u128,
    ) {
        let mut split = world(2_000);
        split.engine.deposit_collateral(acct("alice"), weth(), x * UNIT).unwrap();
        split.engine.deposit_collateral(acct("alice"), weth(), y * UNIT).unwrap();

        let mut single = world(2_000);
        single.engine.deposit_collateral(acct("alice"), weth(), (x + y) * UNIT).unwrap();

        prop_assert_eq!(
            split.engine.ledger().collateral_of(acct("alice"), weth()),
            single.engine.ledger().collateral_of(acct("alice"), weth())
        );
    }

    /// After any sequence of successful operations, every account is either
    /// debt-free or at/above the minimum health factor.
    #[test]
    fn solvency_invariant_holds_after_any_sequence(
        ops in prop::collection::vec((0u8..4, 1u128..50u128), 1..25),
        price_dollars in 100u128..10_000u128,
    ) {
        let mut w = world(price_dollars);
        for (kind, magnitude) in ops {
            // Failed operations are expected along the way; the invariant
            // is about what commits.
            let _ = match kind {
                0 => w.engine.deposit_collateral(acct("alice"), weth(), magnitude * UNIT),
                1 => w.engine.mint_debt(acct("alice"), magnitude * 10 * PRECISION),
                2 => w.engine.redeem_collateral(acct("alice"), weth(), magnitude * UNIT),
                _ => w.engine.burn_debt(acct("alice"), magnitude * 10 * PRECISION),
            };
        }
        for account in w.engine.ledger().accounts() {
            let debt = w.engine.ledger().debt_of(account);
            let hf = w.engine.health_factor(account).unwrap();
            prop_assert!(debt == 0 || hf >= MIN_HEALTH_FACTOR);
        }
    }

    /// The liquidation bonus never lets a seizure exceed 110% of the priced
    /// repayment.
    #[test]
    fn liquidation_seizure_is_bounded(
        cover in 100u128..5_000u128,
    ) {
        let mut w = world(2_000);
        w.engine.deposit_and_mint(acct("alice"), weth(), 10 * UNIT, 10_000 * PRECISION).unwrap();
        w.engine.deposit_and_mint(acct("liquidator"), weth(), 500 * UNIT, 10_000 * PRECISION).unwrap();
        w.oracle.set_price(1_800 * DOLLAR, 1);

        let cover = cover * PRECISION;
        let before = w.engine.ledger().collateral_of(acct("alice"), weth());
        if w.engine.liquidate(acct("liquidator"), weth(), acct("alice"), cover).is_ok() {
            let seized = before - w.engine.ledger().collateral_of(acct("alice"), weth());
            let priced = w.engine.token_amount_from_value(weth(), cover).unwrap();
            prop_assert!(seized <= priced + priced / 10 + 1);
            prop_assert!(seized >= priced);
        }
    }
}
