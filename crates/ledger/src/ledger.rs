use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use receipt_core::entity::position_of;
use receipt_core::{Aggregate, AggregateRoot, DomainError, DomainResult, LedgerId, Money};

use crate::item::{ItemDraft, ItemId, LineItem};
use crate::totals::{
    Adjustments, MAX_TAX_PERCENT, TotalsSnapshot, checked_subtotal, compute_totals,
};

/// Whether the form is creating a new item or editing an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "item_id", rename_all = "lowercase")]
pub enum EditState {
    #[default]
    Idle,
    Editing(ItemId),
}

impl EditState {
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            EditState::Idle => None,
            EditState::Editing(id) => Some(*id),
        }
    }
}

/// Aggregate root: the receipt being built in one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    id: LedgerId,
    items: Vec<LineItem>,
    adjustments: Adjustments,
    editing: EditState,
    next_item_id: u64,
    version: u64,
}

impl Ledger {
    /// A fresh, empty ledger for a new session.
    pub fn new() -> Self {
        Self::empty(LedgerId::new())
    }

    /// An empty ledger with a known id.
    pub fn empty(id: LedgerId) -> Self {
        Self {
            id,
            items: Vec::new(),
            adjustments: Adjustments::default(),
            editing: EditState::Idle,
            next_item_id: 1,
            version: 0,
        }
    }

    /// Items in display (insertion) order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&LineItem> {
        position_of(&self.items, &id).map(|pos| &self.items[pos])
    }

    pub fn adjustments(&self) -> &Adjustments {
        &self.adjustments
    }

    pub fn editing(&self) -> EditState {
        self.editing
    }

    pub fn editing_id(&self) -> Option<ItemId> {
        self.editing.item_id()
    }

    /// Totals for the current state. Never cached.
    pub fn compute_totals(&self) -> TotalsSnapshot {
        compute_totals(&self.items, &self.adjustments)
    }

    /// Read-only snapshot for the presentation layer.
    pub fn view(&self) -> LedgerView {
        LedgerView {
            ledger_id: self.id,
            items: self.items.iter().map(ItemRow::from).collect(),
            editing: self.editing,
            totals: self.compute_totals(),
        }
    }

    /// Append a new item.
    pub fn add_item(
        &mut self,
        name: &str,
        quantity: i64,
        unit_price: Decimal,
    ) -> DomainResult<LineItem> {
        let draft = ItemDraft::new(name, quantity, unit_price);
        let events = self.dispatch("add_item", &LedgerCommand::AddItem(draft))?;
        touched_item(&events)
    }

    /// Replace an item's fields in place. Ends any edit in progress.
    pub fn update_item(
        &mut self,
        id: ItemId,
        name: &str,
        quantity: i64,
        unit_price: Decimal,
    ) -> DomainResult<LineItem> {
        let command = LedgerCommand::UpdateItem(UpdateItem {
            item_id: id,
            draft: ItemDraft::new(name, quantity, unit_price),
        });
        let events = self.dispatch("update_item", &command)?;
        touched_item(&events)
    }

    /// Submit the item form: updates the item being edited, otherwise adds a new one.
    pub fn submit_item(&mut self, draft: &ItemDraft) -> DomainResult<LineItem> {
        let events = self.dispatch("submit_item", &LedgerCommand::SubmitItem(draft.clone()))?;
        touched_item(&events)
    }

    /// Remove an item. Removing an absent id is a no-op.
    pub fn remove_item(&mut self, id: ItemId) {
        // Never rejected: an absent id decides no events.
        let _ = self.dispatch(
            "remove_item",
            &LedgerCommand::RemoveItem(RemoveItem { item_id: id }),
        );
    }

    /// Start editing an item, returning its current values for the form.
    pub fn begin_edit(&mut self, id: ItemId) -> DomainResult<LineItem> {
        self.dispatch("begin_edit", &LedgerCommand::BeginEdit(BeginEdit { item_id: id }))?;
        self.item(id).cloned().ok_or_else(DomainError::not_found)
    }

    pub fn cancel_edit(&mut self) {
        let _ = self.dispatch("cancel_edit", &LedgerCommand::CancelEdit);
    }

    /// Negative or out-of-range values are coerced to zero.
    pub fn set_tax_percent(&mut self, value: Decimal) {
        let _ = self.dispatch("set_tax_percent", &LedgerCommand::SetTaxPercent(value));
    }

    /// Negative or out-of-range values are coerced to zero.
    pub fn set_discount_amount(&mut self, value: Decimal) {
        let _ = self.dispatch("set_discount_amount", &LedgerCommand::SetDiscount(value));
    }

    /// Negative or out-of-range values are coerced to zero.
    pub fn set_paid_amount(&mut self, value: Decimal) {
        let _ = self.dispatch("set_paid_amount", &LedgerCommand::SetPaid(value));
    }

    /// Decide and apply one command, logging the outcome.
    fn dispatch(
        &mut self,
        operation: &'static str,
        command: &LedgerCommand,
    ) -> DomainResult<Vec<LedgerEvent>> {
        let events = self
            .execute(command)
            .inspect_err(|err| self.log_rejected(operation, err))?;
        for event in &events {
            tracing::debug!(
                ledger_id = %self.id,
                version = self.version,
                event = event.event_type(),
                "applied ledger event"
            );
        }
        Ok(events)
    }

    fn log_rejected(&self, operation: &'static str, err: &DomainError) {
        tracing::debug!(ledger_id = %self.id, operation, error = %err, "ledger command rejected");
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateRoot for Ledger {
    type Id = LedgerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: UpdateItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub item_id: ItemId,
    pub draft: ItemDraft,
}

/// Command: RemoveItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub item_id: ItemId,
}

/// Command (and event payload): BeginEdit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginEdit {
    pub item_id: ItemId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCommand {
    AddItem(ItemDraft),
    UpdateItem(UpdateItem),
    /// Add or update, depending on the edit state.
    SubmitItem(ItemDraft),
    RemoveItem(RemoveItem),
    BeginEdit(BeginEdit),
    CancelEdit,
    SetTaxPercent(Decimal),
    SetDiscount(Decimal),
    SetPaid(Decimal),
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub item: LineItem,
}

/// Event: ItemUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdated {
    pub item: LineItem,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub item_id: ItemId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    ItemAdded(ItemAdded),
    ItemUpdated(ItemUpdated),
    ItemRemoved(ItemRemoved),
    EditStarted(BeginEdit),
    EditCancelled,
    TaxPercentSet { tax_percent: Decimal },
    DiscountSet { discount: Money },
    PaidSet { paid: Money },
}

impl LedgerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::ItemAdded(_) => "receipt.item.added",
            LedgerEvent::ItemUpdated(_) => "receipt.item.updated",
            LedgerEvent::ItemRemoved(_) => "receipt.item.removed",
            LedgerEvent::EditStarted(_) => "receipt.edit.started",
            LedgerEvent::EditCancelled => "receipt.edit.cancelled",
            LedgerEvent::TaxPercentSet { .. } => "receipt.tax_percent.set",
            LedgerEvent::DiscountSet { .. } => "receipt.discount.set",
            LedgerEvent::PaidSet { .. } => "receipt.paid.set",
        }
    }
}

impl Aggregate for Ledger {
    type Command = LedgerCommand;
    type Event = LedgerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LedgerEvent::ItemAdded(e) => {
                self.next_item_id = self.next_item_id.max(e.item.id.value() + 1);
                self.items.push(e.item.clone());
            }
            LedgerEvent::ItemUpdated(e) => {
                if let Some(pos) = position_of(&self.items, &e.item.id) {
                    self.items[pos] = e.item.clone();
                }
                self.editing = EditState::Idle;
            }
            LedgerEvent::ItemRemoved(e) => {
                self.items.retain(|item| item.id != e.item_id);
                if self.editing == EditState::Editing(e.item_id) {
                    self.editing = EditState::Idle;
                }
            }
            LedgerEvent::EditStarted(e) => {
                self.editing = EditState::Editing(e.item_id);
            }
            LedgerEvent::EditCancelled => {
                self.editing = EditState::Idle;
            }
            LedgerEvent::TaxPercentSet { tax_percent } => {
                self.adjustments.tax_percent = *tax_percent;
            }
            LedgerEvent::DiscountSet { discount } => {
                self.adjustments.discount = *discount;
            }
            LedgerEvent::PaidSet { paid } => {
                self.adjustments.paid = *paid;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LedgerCommand::AddItem(draft) => self.handle_add(draft),
            LedgerCommand::UpdateItem(cmd) => self.handle_update(cmd.item_id, &cmd.draft),
            LedgerCommand::SubmitItem(draft) => match self.editing {
                EditState::Editing(id) => self.handle_update(id, draft),
                EditState::Idle => self.handle_add(draft),
            },
            LedgerCommand::RemoveItem(cmd) => Ok(self.decide_remove(cmd.item_id)),
            LedgerCommand::BeginEdit(cmd) => {
                if self.item(cmd.item_id).is_none() {
                    return Err(DomainError::not_found());
                }
                Ok(vec![LedgerEvent::EditStarted(cmd.clone())])
            }
            LedgerCommand::CancelEdit => Ok(self.decide_cancel_edit()),
            LedgerCommand::SetTaxPercent(value) => Ok(vec![LedgerEvent::TaxPercentSet {
                tax_percent: within(*value, MAX_TAX_PERCENT),
            }]),
            LedgerCommand::SetDiscount(value) => Ok(vec![LedgerEvent::DiscountSet {
                discount: Money::new(within(*value, Money::MAX.amount())),
            }]),
            LedgerCommand::SetPaid(value) => Ok(vec![LedgerEvent::PaidSet {
                paid: Money::new(within(*value, Money::MAX.amount())),
            }]),
        }
    }
}

impl Ledger {
    fn handle_add(&self, draft: &ItemDraft) -> DomainResult<Vec<LedgerEvent>> {
        let item = self.decide_add(draft)?;
        Ok(vec![LedgerEvent::ItemAdded(ItemAdded { item })])
    }

    fn handle_update(&self, id: ItemId, draft: &ItemDraft) -> DomainResult<Vec<LedgerEvent>> {
        let item = self.decide_update(id, draft)?;
        Ok(vec![LedgerEvent::ItemUpdated(ItemUpdated { item })])
    }

    fn decide_add(&self, draft: &ItemDraft) -> DomainResult<LineItem> {
        let item = draft.to_item(ItemId::new(self.next_item_id))?;
        ensure_subtotal_in_range(self.items.iter().chain([&item]))?;
        Ok(item)
    }

    fn decide_update(&self, id: ItemId, draft: &ItemDraft) -> DomainResult<LineItem> {
        if self.item(id).is_none() {
            return Err(DomainError::not_found());
        }
        let item = draft.to_item(id)?;
        let others = self.items.iter().filter(|existing| existing.id != id);
        ensure_subtotal_in_range(others.chain([&item]))?;
        Ok(item)
    }

    fn decide_remove(&self, id: ItemId) -> Vec<LedgerEvent> {
        if self.item(id).is_none() {
            return Vec::new();
        }
        vec![LedgerEvent::ItemRemoved(ItemRemoved { item_id: id })]
    }

    fn decide_cancel_edit(&self) -> Vec<LedgerEvent> {
        match self.editing {
            EditState::Idle => Vec::new(),
            EditState::Editing(_) => vec![LedgerEvent::EditCancelled],
        }
    }
}

/// `value` if it lies in `0..=max`, otherwise zero.
fn within(value: Decimal, max: Decimal) -> Decimal {
    if value.is_sign_negative() || value > max {
        Decimal::ZERO
    } else {
        value
    }
}

fn ensure_subtotal_in_range<'a>(
    items: impl IntoIterator<Item = &'a LineItem>,
) -> DomainResult<()> {
    match checked_subtotal(items) {
        Some(subtotal) if subtotal <= Money::MAX => Ok(()),
        _ => Err(DomainError::validation(format!(
            "subtotal must not exceed {}",
            Money::MAX
        ))),
    }
}

/// The item carried by an add or update event.
fn touched_item(events: &[LedgerEvent]) -> DomainResult<LineItem> {
    events
        .iter()
        .find_map(|event| match event {
            LedgerEvent::ItemAdded(e) => Some(e.item.clone()),
            LedgerEvent::ItemUpdated(e) => Some(e.item.clone()),
            _ => None,
        })
        .ok_or_else(DomainError::not_found)
}

/// Item as shown on the receipt, with its derived line total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRow {
    pub id: ItemId,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

impl From<&LineItem> for ItemRow {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total(),
        }
    }
}

/// Everything the presentation layer re-renders after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerView {
    pub ledger_id: LedgerId,
    pub items: Vec<ItemRow>,
    pub editing: EditState,
    pub totals: TotalsSnapshot,
}
