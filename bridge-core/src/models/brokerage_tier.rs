use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Manwon;

/// One tier of the brokerage (agent) fee schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerageTier {
    /// Exclusive upper bound; `None` for the final, unbounded tier.
    pub upper_bound: Option<Manwon>,
    pub rate: Decimal,
}

impl BrokerageTier {
    pub fn applies_to(
        &self,
        price: Manwon,
    ) -> bool {
        self.upper_bound.is_none_or(|bound| price < bound)
    }
}
