//! Exact monetary amounts.
//!
//! Amounts are decimals, never floats: `2 × 5.00 + 3.50` is exactly `13.50` and
//! 10% of it is exactly `1.35`. Rounding happens only when an amount is displayed.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Decimal places shown on a receipt.
pub const DISPLAY_SCALE: u32 = 2;

/// A currency amount. May be negative (a discount larger than the bill).
///
/// There are no panicking operators: `checked_*` reports overflow, `saturating_*`
/// pins at the decimal range.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl ValueObject for Money {}

impl Money {
    /// Largest amount a receipt accepts (one quadrillion). Keeping the subtotal,
    /// discount and paid amount under this bound keeps every derived total far
    /// inside the decimal range.
    pub const MAX: Money = Money(Decimal::from_parts(0xA4C6_8000, 0x3_8D7E, 0, false, 0));

    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// `self × quantity`, `None` on overflow.
    pub fn checked_times(self, quantity: i64) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    pub fn checked_add(self, rhs: Money) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn saturating_times(self, quantity: i64) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    pub fn saturating_add(self, rhs: Money) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    pub fn saturating_sub(self, rhs: Money) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// `self × percent / 100`, saturating.
    pub fn percent(self, percent: Decimal) -> Self {
        Self(self.0.saturating_mul(percent) / Decimal::ONE_HUNDRED)
    }

    /// Amount rounded half away from zero to [`DISPLAY_SCALE`] places.
    pub fn rounded(self) -> Decimal {
        let mut d = self
            .0
            .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        d.rescale(DISPLAY_SCALE);
        d
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

/// Always two decimals: `13.5` displays as `13.50`.
impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(&self.rounded().to_string())
    }
}
