use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Manwon;

/// One row of the progressive capital-gains rate schedule.
///
/// Tax for a base that falls in this bracket is
/// `base × rate − progressive_deduction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive upper bound of the bracket; `None` for the top bracket.
    pub upper_bound: Option<Manwon>,
    pub rate: Decimal,
    pub progressive_deduction: Manwon,
}

impl TaxBracket {
    pub fn contains(
        &self,
        tax_base: Manwon,
    ) -> bool {
        self.upper_bound.is_none_or(|bound| tax_base <= bound)
    }
}
