use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use receipt_core::{DomainError, DomainResult, Entity, Money};

/// Line item identifier, unique within a ledger and never reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| DomainError::invalid_id(format!("ItemId: {e}")))
    }
}

/// Receipt line: label, quantity, unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ItemId,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl LineItem {
    /// `quantity × unit_price`; derived, never stored.
    pub fn line_total(&self) -> Money {
        self.unit_price.saturating_times(self.quantity)
    }

    pub fn checked_line_total(&self) -> Option<Money> {
        self.unit_price.checked_times(self.quantity)
    }
}

impl Entity for LineItem {
    type Id = ItemId;

    fn id(&self) -> &ItemId {
        &self.id
    }
}

/// Item fields as submitted, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, quantity: i64, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// Validate and build the item stored under `id`. The name is stored trimmed.
    pub fn to_item(&self, id: ItemId) -> DomainResult<LineItem> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }

        if self.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        if self.unit_price.is_sign_negative() && !self.unit_price.is_zero() {
            return Err(DomainError::validation("unit_price must not be negative"));
        }

        let item = LineItem {
            id,
            name: name.to_string(),
            quantity: self.quantity,
            unit_price: Money::new(self.unit_price),
        };

        match item.checked_line_total() {
            Some(total) if total <= Money::MAX => Ok(item),
            _ => Err(DomainError::validation(format!(
                "line total must not exceed {}",
                Money::MAX
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn line_total_is_quantity_times_price() {
        let item = ItemDraft::new("Pepsi", 2, dec!(5.00))
            .to_item(ItemId::new(1))
            .unwrap();
        assert_eq!(item.line_total(), Money::new(dec!(10.00)));
    }

    #[test]
    fn name_is_trimmed() {
        let item = ItemDraft::new("  Chips ", 1, dec!(3.50))
            .to_item(ItemId::new(1))
            .unwrap();
        assert_eq!(item.name, "Chips");
    }

    #[test]
    fn zero_price_is_allowed() {
        assert!(ItemDraft::new("Freebie", 1, dec!(0)).to_item(ItemId::new(1)).is_ok());
    }

    #[test]
    fn invalid_drafts_are_rejected() {
        for (draft, reason) in [
            (ItemDraft::new("", 1, dec!(5)), "name"),
            (ItemDraft::new("   ", 1, dec!(5)), "name"),
            (ItemDraft::new("X", 0, dec!(5)), "quantity"),
            (ItemDraft::new("X", -3, dec!(5)), "quantity"),
            (ItemDraft::new("X", 1, dec!(-5)), "unit_price"),
        ] {
            match draft.to_item(ItemId::new(1)) {
                Err(DomainError::Validation(msg)) if msg.contains(reason) => {}
                other => panic!("expected {reason} validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn overflowing_line_totals_are_rejected() {
        let max_price = rust_decimal::Decimal::MAX;
        for draft in [
            ItemDraft::new("X", 1000, max_price),
            ItemDraft::new("X", 2, Money::MAX.amount()),
        ] {
            match draft.to_item(ItemId::new(1)) {
                Err(DomainError::Validation(msg)) if msg.contains("line total") => {}
                other => panic!("expected line total validation error, got {other:?}"),
            }
        }
        assert!(ItemDraft::new("X", 1, Money::MAX.amount()).to_item(ItemId::new(1)).is_ok());
    }

    #[test]
    fn item_id_parses_from_text() {
        assert_eq!(" 42 ".parse::<ItemId>().unwrap(), ItemId::new(42));
        assert!(matches!(
            "abc".parse::<ItemId>(),
            Err(DomainError::InvalidId(_))
        ));
    }
}
