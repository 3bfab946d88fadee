//! Plain-text receipt layout.

use chrono::{DateTime, Utc};

use receipt_ledger::{ItemRow, LedgerView};

const ID_WIDTH: usize = 3;
const QTY_WIDTH: usize = 4;
const MONEY_WIDTH: usize = 9;
/// Id, quantity, price and total columns plus the four gaps between columns.
const FIXED_WIDTH: usize = ID_WIDTH + QTY_WIDTH + 2 * MONEY_WIDTH + 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLayout {
    pub title: String,
    pub width: usize,
}

impl ReceiptLayout {
    fn name_width(&self) -> usize {
        self.width.saturating_sub(FIXED_WIDTH).max(4)
    }

    fn line_width(&self) -> usize {
        FIXED_WIDTH + self.name_width()
    }
}

/// Render the receipt for `view`. Pure: same inputs, same text.
pub fn render_receipt(
    view: &LedgerView,
    layout: &ReceiptLayout,
    issued_at: DateTime<Utc>,
) -> String {
    let width = layout.line_width();
    let name_width = layout.name_width();
    let rule = "-".repeat(width);
    let mut lines = Vec::with_capacity(view.items.len() + 14);

    lines.push(center(&layout.title, width));
    lines.push(center(
        &issued_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        width,
    ));
    lines.push(rule.clone());
    lines.push(format!(
        "{:>id$} {:<name$} {:>qty$} {:>money$} {:>money$}",
        "#",
        "Item",
        "Qty",
        "Price",
        "Total",
        id = ID_WIDTH,
        name = name_width,
        qty = QTY_WIDTH,
        money = MONEY_WIDTH,
    ));

    if view.items.is_empty() {
        lines.push(center("(no items)", width));
    }
    for row in &view.items {
        lines.push(item_line(row, name_width));
    }

    let totals = &view.totals;
    lines.push(rule.clone());
    lines.push(amount_line("Subtotal:", &totals.subtotal.to_string(), width));
    lines.push(amount_line(
        &format!("Tax ({}%):", totals.tax_percent.normalize()),
        &totals.tax_amount.to_string(),
        width,
    ));
    lines.push(amount_line("Discount:", &format!("- {}", totals.discount), width));
    lines.push(amount_line("Total:", &totals.total.to_string(), width));
    lines.push(amount_line("Paid:", &totals.paid.to_string(), width));
    lines.push(amount_line("Change:", &totals.change.to_string(), width));
    lines.push(rule);

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn item_line(row: &ItemRow, name_width: usize) -> String {
    format!(
        "{:>id$} {:<name$} {:>qty$} {:>money$} {:>money$}",
        row.id.value(),
        truncate(&row.name, name_width),
        row.quantity,
        row.unit_price,
        row.line_total,
        id = ID_WIDTH,
        name = name_width,
        qty = QTY_WIDTH,
        money = MONEY_WIDTH,
    )
}

fn amount_line(label: &str, value: &str, width: usize) -> String {
    let pad = width.saturating_sub(label.chars().count()).max(value.chars().count() + 1);
    format!("{label}{value:>pad$}")
}

fn center(text: &str, width: usize) -> String {
    format!("{:^width$}", truncate(text, width)).trim_end().to_string()
}

/// Cut to `max` characters, marking the cut with `~`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}~", cut.trim_end())
}
