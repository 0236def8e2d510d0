//! Plain-text rendering of results for the terminal.

use std::fmt;

use bridge_core::calculations::common::round_half_up;
use bridge_core::money::MANWON_PER_EOK;
use bridge_core::{
    Criterion, DsrBand, Manwon, ScenarioComparison, ScenarioOutcome, SimulationConfig,
};
use rust_decimal::Decimal;

/// Formats an amount the way listings quote it: eok with two decimals from
/// one eok up, whole man-won with thousands separators below.
pub fn format_money(amount: Manwon) -> String {
    if amount.value().abs() >= MANWON_PER_EOK {
        return format!("{:.2} eok", amount.as_eok());
    }
    let rounded = round_half_up(amount.value(), 0);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}{} man", group_thousands(&digits))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn format_signed(amount: Manwon) -> String {
    if amount > Manwon::ZERO {
        format!("+{}", format_money(amount))
    } else {
        format_money(amount)
    }
}

fn format_rate(fraction: Decimal) -> String {
    format!("{}%", (fraction * Decimal::ONE_HUNDRED).normalize())
}

/// Full breakdown of one scenario.
pub struct ResultReport<'a> {
    pub outcome: &'a ScenarioOutcome,
    pub config: &'a SimulationConfig,
}

impl fmt::Display for ResultReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = &self.outcome.result;
        let band = DsrBand::classify(r.dsr_ratio, self.config);

        writeln!(f, "== {} ==", self.outcome.name)?;
        if r.is_feasible() {
            writeln!(f, "Funds sufficient: {} left", format_money(r.cash_balance))?;
        } else {
            writeln!(f, "Funds short: {} missing", format_money(r.deficit()))?;
        }

        writeln!(f, "\n[Selling]")?;
        writeln!(f, "  Capital gains tax:    {}", format_money(r.capital_gains_tax))?;
        writeln!(f, "  Agent fee (sale):     {}", format_money(r.old_house_agent_fee))?;
        writeln!(f, "  Net sale proceeds:    {}", format_money(r.net_sale_proceeds))?;

        writeln!(f, "\n[Buying]")?;
        writeln!(
            f,
            "  Acquisition tax:      {} ({})",
            format_money(r.acquisition_tax),
            format_rate(r.details.acquisition.combined_rate)
        )?;
        writeln!(f, "  Agent fee (purchase): {}", format_money(r.new_house_agent_fee))?;
        writeln!(f, "  Moving cost:          {}", format_money(r.moving_cost))?;
        writeln!(f, "  Closing costs:        {}", format_money(r.total_closing_costs))?;

        writeln!(f, "\n[Loan]")?;
        writeln!(f, "  LTV limit:            {}", format_money(r.max_loan_ltv))?;
        writeln!(
            f,
            "  DSR limit:            {} (stress rate {}%)",
            format_money(r.max_loan_dsr),
            r.details.loan_limits.stress_rate.normalize()
        )?;
        writeln!(f, "  Maximum loan:         {}", format_money(r.max_loan_possible))?;
        writeln!(f, "  Required loan:        {}", format_money(r.final_loan_amount))?;
        writeln!(f, "  Monthly payment:      {}", format_money(r.monthly_payment))?;

        writeln!(f, "\n[Safety]")?;
        match r.dsr_ratio {
            Some(ratio) => writeln!(
                f,
                "  DSR ratio:            {}% ({})",
                ratio.round_dp(1),
                band.label()
            )?,
            None => writeln!(f, "  DSR ratio:            n/a (no income)")?,
        }
        writeln!(
            f,
            "  Monthly net income:   {} ({})",
            format_money(r.monthly_net_income),
            if r.is_cash_flow_safe { "positive" } else { "negative" }
        )
    }
}

/// Both scenarios followed by their differences.
pub struct ComparisonReport<'a> {
    pub comparison: &'a ScenarioComparison,
    pub config: &'a SimulationConfig,
}

impl fmt::Display for ComparisonReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let c = self.comparison;
        for outcome in [&c.a, &c.b] {
            writeln!(
                f,
                "{}",
                ResultReport {
                    outcome,
                    config: self.config,
                }
            )?;
        }

        writeln!(f, "== {} vs {} (B - A) ==", c.a.name, c.b.name)?;
        writeln!(f, "  Cash balance:         {}", format_signed(c.cash_balance_delta))?;
        writeln!(f, "  Required loan:        {}", format_signed(c.final_loan_delta))?;
        writeln!(f, "  Monthly payment:      {}", format_signed(c.monthly_payment_delta))?;
        writeln!(f, "  Closing costs:        {}", format_signed(c.closing_costs_delta))?;
        writeln!(
            f,
            "Preferred: {} ({})",
            c.outcome(c.preferred).name,
            c.preferred.as_str()
        )
    }
}

pub struct CriteriaReport<'a> {
    pub year: i32,
    pub criteria: &'a [Criterion],
}

impl fmt::Display for CriteriaReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Regulatory criteria ({})", self.year)?;
        for c in self.criteria {
            writeln!(f, "  {:<20} {}", format!("{}:", c.label), c.value)?;
            writeln!(f, "  {:<20} {}", "", c.note)?;
        }
        Ok(())
    }
}
