//! Parsing of the live item form.
//!
//! The form holds raw text exactly as typed. Item fields are validated when the
//! form is submitted; adjustment fields (tax, discount, paid) are coerced instead.

use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use receipt_core::{DomainError, DomainResult};

use crate::item::{ItemDraft, LineItem};

/// Raw contents of the add/edit item form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemForm {
    pub name: String,
    pub quantity: String,
    pub unit_price: String,
}

impl Default for ItemForm {
    /// The cleared form: empty name and price, quantity 1.
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: "1".to_string(),
            unit_price: String::new(),
        }
    }
}

impl ItemForm {
    pub fn new(
        name: impl Into<String>,
        quantity: impl Into<String>,
        unit_price: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            unit_price: unit_price.into(),
        }
    }

    /// Pre-populate the form from an item about to be edited.
    pub fn from_item(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity.to_string(),
            unit_price: item.unit_price.amount().normalize().to_string(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Parse the numeric fields. Name checks happen when the draft is applied.
    pub fn parse(&self) -> DomainResult<ItemDraft> {
        Ok(ItemDraft {
            name: self.name.clone(),
            quantity: parse_quantity(&self.quantity)?,
            unit_price: parse_price(&self.unit_price)?,
        })
    }
}

/// A positive whole number. `"2.0"` is accepted as 2.
pub fn parse_quantity(raw: &str) -> DomainResult<i64> {
    let value = Decimal::from_str(raw.trim())
        .map_err(|_| DomainError::validation(format!("quantity is not a number: {raw:?}")))?;

    if !value.fract().is_zero() {
        return Err(DomainError::validation("quantity must be a whole number"));
    }

    match value.to_i64() {
        Some(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(DomainError::validation("quantity must be positive")),
    }
}

/// A non-negative decimal price.
pub fn parse_price(raw: &str) -> DomainResult<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::validation("unit_price is required"));
    }

    let value = Decimal::from_str(raw)
        .map_err(|_| DomainError::validation(format!("unit_price is not a number: {raw:?}")))?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(DomainError::validation("unit_price must not be negative"));
    }
    Ok(value)
}

/// Adjustment input: empty, non-numeric and negative text all become 0.
pub fn coerce_amount(raw: &str) -> Decimal {
    match Decimal::from_str(raw.trim()) {
        Ok(value) if value > Decimal::ZERO => value,
        _ => Decimal::ZERO,
    }
}
