//! Receipt ledger domain module.
//!
//! Line items, the in-progress edit, the adjustment inputs (tax, discount, paid)
//! and the totals derived from them. Pure deterministic logic: no IO, no rendering.

pub mod form;
pub mod item;
pub mod ledger;
pub mod totals;

pub use form::{ItemForm, coerce_amount, parse_price, parse_quantity};
pub use item::{ItemDraft, ItemId, LineItem};
pub use ledger::{
    BeginEdit, EditState, ItemAdded, ItemRemoved, ItemRow, ItemUpdated, Ledger, LedgerCommand,
    LedgerEvent, LedgerView, RemoveItem, UpdateItem,
};
pub use totals::{Adjustments, TotalsSnapshot, compute_totals};
