use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::quote::QuoteLineItem;

/// 12%, applied to every quote unless configured otherwise.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(12, 0, 0, false, 2);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub taxable_amount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub tax_rate: Decimal,
}

/// Sums billable rows and applies tax.
///
/// Rows failing [`QuoteLineItem::is_billable`] count toward neither subtotal
/// nor tax. Tax-exempt rows count toward the subtotal only. `tax_rate` must be
/// non-negative.
pub fn calculate_totals(items: &[QuoteLineItem], tax_rate: Decimal) -> QuoteTotals {
    let billable = || items.iter().filter(|item| item.is_billable());

    let subtotal = saturating_sum(billable());
    let taxable_amount = saturating_sum(billable().filter(|item| !item.meta.tax_exempt));

    let tax = round_tax(taxable_amount, tax_rate);
    let total = round_total(subtotal, tax);

    QuoteTotals { subtotal, taxable_amount, tax, total, tax_rate }
}

/// Amounts past `Decimal::MAX` saturate instead of overflowing.
fn saturating_sum<'a>(items: impl Iterator<Item = &'a QuoteLineItem>) -> Decimal {
    items.fold(Decimal::ZERO, |sum, item| {
        sum.saturating_add(item.qty.saturating_mul(item.unit_price))
    })
}

/// First rounding step: tax on its own, to cents.
pub fn round_tax(taxable_amount: Decimal, tax_rate: Decimal) -> Decimal {
    round2(taxable_amount.saturating_mul(tax_rate))
}

/// Second rounding step: the unrounded subtotal plus the already rounded tax.
pub fn round_total(subtotal: Decimal, tax: Decimal) -> Decimal {
    round2(subtotal.saturating_add(tax))
}

pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Nearest whole unit, halves away from zero.
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
