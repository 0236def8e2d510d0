//! Brokerage (agent) fee lookup.

use rust_decimal::Decimal;

use crate::Manwon;
use crate::models::BrokerageTier;

/// Fee schedule over an ordered tier table.
///
/// The first tier whose upper bound is strictly greater than the price
/// applies; prices beyond every finite bound fall into the final, unbounded
/// tier.
///
/// # Example
///
/// ```
/// use bridge_core::calculations::BrokerageFeeSchedule;
/// use bridge_core::{Manwon, SimulationConfig};
/// use rust_decimal_macros::dec;
///
/// let config = SimulationConfig::korea_2025();
/// let schedule = BrokerageFeeSchedule::new(&config.fees.brokerage_tiers);
///
/// assert_eq!(schedule.fee(Manwon::new(dec!(60000))), Manwon::new(dec!(240)));
/// // 9 eok is not below the 9 eok bound, so the 0.5% tier applies.
/// assert_eq!(schedule.fee(Manwon::new(dec!(90000))), Manwon::new(dec!(450)));
/// ```
#[derive(Debug, Clone)]
pub struct BrokerageFeeSchedule<'a> {
    tiers: &'a [BrokerageTier],
}

impl<'a> BrokerageFeeSchedule<'a> {
    pub fn new(tiers: &'a [BrokerageTier]) -> Self {
        Self { tiers }
    }

    /// Rate for `price`; zero only for an empty table.
    pub fn rate(
        &self,
        price: Manwon,
    ) -> Decimal {
        self.tiers
            .iter()
            .find(|t| t.applies_to(price))
            .or(self.tiers.last())
            .map_or(Decimal::ZERO, |t| t.rate)
    }

    pub fn fee(
        &self,
        price: Manwon,
    ) -> Manwon {
        price * self.rate(price)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::SimulationConfig;

    fn tiers() -> Vec<BrokerageTier> {
        SimulationConfig::korea_2025().fees.brokerage_tiers
    }

    #[test]
    fn rate_for_each_tier() {
        let tiers = tiers();
        let schedule = BrokerageFeeSchedule::new(&tiers);

        let cases = [
            (dec!(3000), dec!(0.006)),
            (dec!(10000), dec!(0.005)),
            (dec!(60000), dec!(0.004)),
            (dec!(100000), dec!(0.005)),
            (dec!(130000), dec!(0.006)),
            (dec!(200000), dec!(0.007)),
        ];
        for (price, expected) in cases {
            assert_eq!(schedule.rate(Manwon::new(price)), expected, "price {price}");
        }
    }

    #[test]
    fn bound_is_exclusive() {
        let tiers = tiers();
        let schedule = BrokerageFeeSchedule::new(&tiers);

        assert_eq!(schedule.rate(Manwon::new(dec!(4999))), dec!(0.006));
        assert_eq!(schedule.rate(Manwon::new(dec!(5000))), dec!(0.005));
        assert_eq!(schedule.rate(Manwon::new(dec!(150000))), dec!(0.007));
    }

    #[test]
    fn fee_multiplies_price_by_rate() {
        let tiers = tiers();
        let schedule = BrokerageFeeSchedule::new(&tiers);

        assert_eq!(
            schedule.fee(Manwon::new(dec!(110000))),
            Manwon::new(dec!(550))
        );
    }

    #[test]
    fn empty_table_charges_nothing() {
        let schedule = BrokerageFeeSchedule::new(&[]);

        assert_eq!(schedule.fee(Manwon::new(dec!(90000))), Manwon::ZERO);
    }

    #[test]
    fn bounded_table_falls_back_to_last_tier() {
        let tiers = vec![BrokerageTier {
            upper_bound: Some(Manwon::new(dec!(100))),
            rate: dec!(0.01),
        }];
        let schedule = BrokerageFeeSchedule::new(&tiers);

        assert_eq!(schedule.rate(Manwon::new(dec!(500))), dec!(0.01));
    }
}
