//! Derived receipt totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use receipt_core::Money;

use crate::item::LineItem;

/// Adjustment inputs applied on top of the item lines. All non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustments {
    /// Percentage, e.g. `10` for 10%.
    pub tax_percent: Decimal,
    pub discount: Money,
    pub paid: Money,
}

/// Totals derived from the items and adjustments at the moment of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsSnapshot {
    pub subtotal: Money,
    pub tax_percent: Decimal,
    pub tax_amount: Money,
    pub discount: Money,
    /// `subtotal + tax_amount - discount`; negative when the discount exceeds the bill.
    pub total: Money,
    pub paid: Money,
    /// `paid - total`, never below zero.
    pub change: Money,
}

/// Largest accepted tax percentage (10 000%).
pub const MAX_TAX_PERCENT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Sum of the line totals, `None` if it overflows.
pub fn checked_subtotal<'a>(items: impl IntoIterator<Item = &'a LineItem>) -> Option<Money> {
    items.into_iter().try_fold(Money::zero(), |acc, item| {
        acc.checked_add(item.checked_line_total()?)
    })
}

/// Pure derivation of the totals; recomputed on every call.
///
/// Arithmetic saturates instead of panicking. A [`crate::Ledger`] keeps its
/// subtotal and adjustments bounded, so its totals never reach saturation.
pub fn compute_totals(items: &[LineItem], adjustments: &Adjustments) -> TotalsSnapshot {
    let subtotal = items
        .iter()
        .fold(Money::zero(), |acc, item| acc.saturating_add(item.line_total()));
    let tax_amount = subtotal.percent(adjustments.tax_percent);
    let total = subtotal
        .saturating_add(tax_amount)
        .saturating_sub(adjustments.discount);
    let change = adjustments.paid.saturating_sub(total).max(Money::zero());

    TotalsSnapshot {
        subtotal,
        tax_percent: adjustments.tax_percent,
        tax_amount,
        discount: adjustments.discount,
        total,
        paid: adjustments.paid,
        change,
    }
}
