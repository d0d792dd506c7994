//! Property-based tests for the core book math.
//!
//! These tests verify invariants hold under random inputs.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tickbook::*;

// Strategies for generating test data
fn price_strategy() -> impl proptest::strategy::Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|x| Decimal::new(x, 2)) // 0.01 to 10,000.00
}

fn size_strategy() -> impl proptest::strategy::Strategy<Value = Decimal> {
    (1i64..10_000i64).prop_map(|x| Decimal::new(x, 4)) // 0.0001 to 1.0
}

fn side_strategy() -> impl proptest::strategy::Strategy<Value = Side> {
    prop_oneof![Just(Side::Long), Just(Side::Short)]
}

fn path_strategy() -> impl proptest::strategy::Strategy<Value = Vec<Decimal>> {
    proptest::collection::vec(price_strategy(), 1..40)
}

fn threshold_strategy() -> impl proptest::strategy::Strategy<Value = Decimal> {
    (1i64..=100i64).prop_map(|x| Decimal::new(x, 2)) // 0.01 to 1.00
}

fn position(id: u64, side: Side, size: Decimal, entry: Decimal) -> Position {
    Position::open(
        PositionId(id),
        Symbol::new("EURUSD"),
        StrategyId::new("prop"),
        side,
        Size::new_unchecked(size),
        Price::new_unchecked(entry),
        Timestamp::from_millis(0),
    )
}

proptest! {
    /// P&L is zero when the current price equals the entry price
    #[test]
    fn pnl_zero_at_entry(
        side in side_strategy(),
        size in size_strategy(),
        entry in price_strategy(),
    ) {
        let pos = position(1, side, size, entry);
        prop_assert_eq!(pos.pnl_at(Price::new_unchecked(entry)).value(), Decimal::ZERO);
        prop_assert_eq!(pos.unrealized_pnl(), None);
    }

    /// P&L sign is correct for longs: profit when price > entry
    #[test]
    fn pnl_sign_long(
        size in size_strategy(),
        entry in price_strategy(),
        delta in -500i64..=500i64,
    ) {
        let pos = position(1, Side::Long, size, entry);
        let current = entry + Decimal::new(delta, 2);

        if current > Decimal::ZERO {
            let pnl = pos.pnl_at(Price::new_unchecked(current));
            if current > entry {
                prop_assert!(pnl.value() > Decimal::ZERO, "long should profit when price > entry");
            } else if current < entry {
                prop_assert!(pnl.value() < Decimal::ZERO, "long should lose when price < entry");
            }
        }
    }

    /// P&L sign is correct for shorts: profit when price < entry
    #[test]
    fn pnl_sign_short(
        size in size_strategy(),
        entry in price_strategy(),
        delta in -500i64..=500i64,
    ) {
        let pos = position(1, Side::Short, size, entry);
        let current = entry + Decimal::new(delta, 2);

        if current > Decimal::ZERO {
            let pnl = pos.pnl_at(Price::new_unchecked(current));
            if current < entry {
                prop_assert!(pnl.value() > Decimal::ZERO, "short should profit when price < entry");
            } else if current > entry {
                prop_assert!(pnl.value() < Decimal::ZERO, "short should lose when price > entry");
            }
        }
    }

    /// A long and a short of the same size at the same entry are exact mirrors
    #[test]
    fn long_short_pnl_mirror(
        size in size_strategy(),
        entry in price_strategy(),
        current in price_strategy(),
    ) {
        let long = position(1, Side::Long, size, entry);
        let short = position(2, Side::Short, size, entry);
        let at = Price::new_unchecked(current);

        prop_assert_eq!(long.pnl_at(at), short.pnl_at(at).negate());
    }

    /// Excursions bracket the running P&L and only ever ratchet outward
    #[test]
    fn excursions_bracket_pnl(
        side in side_strategy(),
        size in size_strategy(),
        entry in price_strategy(),
        path in path_strategy(),
    ) {
        let mut pos = position(1, side, size, entry);
        let mut previous_mfe = Quote::zero();
        let mut previous_mae = Quote::zero();

        for price in path {
            pos.mark(Price::new_unchecked(price));
            let pnl = pos.unrealized_pnl().unwrap();

            prop_assert!(pos.max_favorable_excursion >= pnl, "MFE below current P&L");
            prop_assert!(pos.max_adverse_excursion <= pnl, "MAE above current P&L");
            prop_assert!(pos.max_favorable_excursion.value() >= Decimal::ZERO);
            prop_assert!(pos.max_adverse_excursion.value() <= Decimal::ZERO);
            prop_assert!(pos.max_favorable_excursion >= previous_mfe, "MFE moved down");
            prop_assert!(pos.max_adverse_excursion <= previous_mae, "MAE moved up");

            previous_mfe = pos.max_favorable_excursion;
            previous_mae = pos.max_adverse_excursion;
        }
    }

    /// The trailing stop fires exactly when the closed form says it should:
    /// MFE > 0 and current P&L < MFE * (1 - threshold)
    #[test]
    fn trailing_stop_matches_the_closed_form(
        entry in price_strategy(),
        path in path_strategy(),
        threshold in threshold_strategy(),
    ) {
        let mut pos = position(1, Side::Long, dec!(1), entry);
        for price in path {
            pos.mark(Price::new_unchecked(price));
        }

        let mfe = pos.max_favorable_excursion.value();
        let pnl = pos.unrealized_pnl().unwrap().value();
        let expected = mfe > Decimal::ZERO && pnl < mfe * (Decimal::ONE - threshold);

        let evaluator = ExitEvaluator::new(&RiskConfig::new(threshold)).unwrap();
        let signals = evaluator.evaluate(std::slice::from_ref(&pos));

        if expected {
            prop_assert_eq!(
                signals,
                vec![ExitSignal {
                    position_id: PositionId(1),
                    reason: ExitReason::MfeTrailingStop,
                }]
            );
        } else {
            prop_assert!(
                signals.is_empty(),
                "flagged with MFE {} and P&L {} at threshold {}",
                mfe,
                pnl,
                threshold
            );
        }
    }

    /// A group on one instrument is flagged whole or not at all
    #[test]
    fn group_exits_are_all_or_none(
        entry_a in price_strategy(),
        entry_b in price_strategy(),
        path in path_strategy(),
        threshold in threshold_strategy(),
    ) {
        let mut a = position(1, Side::Long, dec!(1), entry_a);
        let mut b = position(2, Side::Long, dec!(1), entry_b);
        for price in path {
            let at = Price::new_unchecked(price);
            a.mark(at);
            b.mark(at);
        }

        let evaluator = ExitEvaluator::new(&RiskConfig::new(threshold)).unwrap();
        let signals = evaluator.evaluate(&[a, b]);
        let flagged: Vec<u64> = signals.iter().map(|s| s.position_id.0).collect();

        prop_assert!(
            flagged.is_empty() || flagged == vec![1, 2],
            "partial group exit: {:?}",
            flagged
        );
    }

    /// Snapshot totals are a plain fold over the book: exposure counts every
    /// position, unrealized P&L only the marked ones
    #[test]
    fn snapshot_totals_fold_over_the_book(
        book in proptest::collection::vec(
            (side_strategy(), size_strategy(), price_strategy(), proptest::option::of(price_strategy())),
            0..12,
        ),
    ) {
        let mut positions = Vec::new();
        let mut expected_exposure = Decimal::ZERO;
        let mut expected_pnl = Decimal::ZERO;

        for (i, (side, size, entry, marked_at)) in book.iter().enumerate() {
            let mut pos = position(i as u64 + 1, *side, *size, *entry);
            expected_exposure += side.sign() * *size;
            if let Some(current) = marked_at {
                pos.mark(Price::new_unchecked(*current));
                expected_pnl += pos.unrealized_pnl().unwrap().value();
            }
            positions.push(pos);
        }

        let metrics = MetricsCalculator::new().snapshot(&positions);
        prop_assert_eq!(metrics.total_positions, positions.len());
        prop_assert_eq!(metrics.net_exposure, expected_exposure);
        prop_assert_eq!(metrics.total_unrealized_pnl.value(), expected_pnl);
    }

    /// Max drawdown equals a brute-force scan over the same equity series
    #[test]
    fn drawdown_matches_a_brute_force_scan(
        entry in price_strategy(),
        path in path_strategy(),
    ) {
        let mut pos = position(1, Side::Long, dec!(1), entry);
        let mut analytics = PortfolioAnalytics::new();
        let mut equities = Vec::new();

        for (i, price) in path.iter().enumerate() {
            pos.mark(Price::new_unchecked(*price));
            analytics.record_sample(Timestamp::from_millis(i as i64), std::slice::from_ref(&pos));
            equities.push(pos.unrealized_pnl().unwrap().value());
        }

        // the book starts flat, so the running peak starts at zero
        let mut peak = Decimal::ZERO;
        let mut worst = Decimal::ZERO;
        for equity in equities {
            if equity > peak {
                peak = equity;
            }
            if peak - equity > worst {
                worst = peak - equity;
            }
        }

        prop_assert_eq!(analytics.max_drawdown().unwrap().value(), worst);
    }

    /// Threshold validation accepts exactly the interval (0, 1]
    #[test]
    fn threshold_validation_matches_the_documented_interval(
        raw in (-200i64..=200i64).prop_map(|x| Decimal::new(x, 2)),
    ) {
        let valid = raw > Decimal::ZERO && raw <= Decimal::ONE;
        prop_assert_eq!(RiskConfig::new(raw).validate().is_ok(), valid);
    }
}

/// Non-proptest stress scenarios
#[cfg(test)]
mod stress_tests {
    use super::*;

    #[test]
    fn extreme_price_movements() {
        let mut pos = position(1, Side::Long, dec!(1), dec!(50000));

        // 50% crash
        pos.mark(Price::new_unchecked(dec!(25000)));
        assert_eq!(pos.unrealized_pnl().unwrap().value(), dec!(-25000));
        assert_eq!(pos.max_adverse_excursion.value(), dec!(-25000));

        // 100% pump
        pos.mark(Price::new_unchecked(dec!(100000)));
        assert_eq!(pos.unrealized_pnl().unwrap().value(), dec!(50000));
        assert_eq!(pos.max_favorable_excursion.value(), dec!(50000));
        assert_eq!(pos.max_adverse_excursion.value(), dec!(-25000));
    }

    #[test]
    fn hair_trigger_threshold() {
        // at 0.01 the group tolerates giving back one percent of its peak
        let evaluator = ExitEvaluator::new(&RiskConfig::new(dec!(0.01))).unwrap();

        let mut pos = position(1, Side::Long, dec!(1), dec!(10000));
        pos.mark(Price::new_unchecked(dec!(10100))); // MFE 100, floor 99

        pos.mark(Price::new_unchecked(dec!(10099))); // P&L 99: holds
        assert!(evaluator.evaluate(std::slice::from_ref(&pos)).is_empty());

        pos.mark(Price::new_unchecked(dec!(10098))); // P&L 98: flagged
        assert_eq!(evaluator.evaluate(std::slice::from_ref(&pos)).len(), 1);
    }

    #[test]
    fn excursions_survive_thousands_of_marks() {
        let mut pos = position(1, Side::Long, dec!(1), dec!(5000));

        // deterministic sawtooth around the entry
        for i in 0i64..10_000 {
            let offset = (i % 401) - 200; // -200 to +200
            pos.mark(Price::new_unchecked(dec!(5000) + Decimal::from(offset)));
        }

        assert_eq!(pos.max_favorable_excursion.value(), dec!(200));
        assert_eq!(pos.max_adverse_excursion.value(), dec!(-200));
        let pnl = pos.unrealized_pnl().unwrap();
        assert!(pnl <= pos.max_favorable_excursion);
        assert!(pnl >= pos.max_adverse_excursion);
    }

    #[test]
    fn wide_group_flags_in_one_pass() {
        let evaluator = ExitEvaluator::new(&RiskConfig::new(dec!(0.5))).unwrap();

        let mut book: Vec<Position> = (1..=100)
            .map(|id| position(id, Side::Long, dec!(1), dec!(100)))
            .collect();
        for pos in &mut book {
            pos.mark(Price::new_unchecked(dec!(110)));
        }
        assert!(evaluator.evaluate(&book).is_empty());

        // every member gives back past the shared floor
        for pos in &mut book {
            pos.mark(Price::new_unchecked(dec!(104)));
        }
        let signals = evaluator.evaluate(&book);
        assert_eq!(signals.len(), 100);
        let ids: Vec<u64> = signals.iter().map(|s| s.position_id.0).collect();
        assert_eq!(ids, (1..=100).collect::<Vec<u64>>());
    }
}
