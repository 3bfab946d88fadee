//! Line-oriented front end over the ledger.
//!
//! Each input line is one form action. After every mutation the receipt is
//! re-rendered, the way the live form redraws.

use core::str::FromStr;
use std::io::{BufRead, Write};

use chrono::{DateTime, Utc};
use thiserror::Error;

use receipt_core::DomainError;
use receipt_ledger::{ItemForm, ItemId, Ledger, coerce_amount};

use crate::config::Config;
use crate::print::Printer;
use crate::render::{ReceiptLayout, render_receipt};

pub const HELP: &str = "\
commands:
  add <name> <qty> <price>   add an item, or save the item being edited
  edit <id>                  load an item into the form
  cancel | clear             drop the edit in progress and clear the form
  rm <id>                    remove an item
  tax <percent>              set the tax percentage
  discount <amount>          set the discount
  paid <amount>              set the amount paid
  show                       render the receipt
  json                       dump items, edit state and totals as JSON
  print                      send the receipt to the printer
  help                       this text
  quit                       leave
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(ItemForm),
    Edit(ItemId),
    Cancel,
    Remove(ItemId),
    Tax(String),
    Discount(String),
    Paid(String),
    Show,
    Json,
    Print,
    Help,
    Quit,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    InvalidId(#[from] DomainError),
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let keyword = words.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        match keyword.as_str() {
            "add" | "submit" | "save" => {
                let usage = ParseError::Usage("add <name> <qty> <price>");
                let [name @ .., quantity, price] = args.as_slice() else {
                    return Err(usage);
                };
                if name.is_empty() {
                    return Err(usage);
                }
                Ok(Command::Submit(ItemForm::new(name.join(" "), *quantity, *price)))
            }
            "edit" => Ok(Command::Edit(single_id(&args, "edit <id>")?)),
            "rm" | "remove" | "delete" => Ok(Command::Remove(single_id(&args, "rm <id>")?)),
            "cancel" | "clear" => Ok(Command::Cancel),
            "tax" => Ok(Command::Tax(args.join(" "))),
            "discount" => Ok(Command::Discount(args.join(" "))),
            "paid" => Ok(Command::Paid(args.join(" "))),
            "show" => Ok(Command::Show),
            "json" => Ok(Command::Json),
            "print" => Ok(Command::Print),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

fn single_id(args: &[&str], usage: &'static str) -> Result<ItemId, ParseError> {
    match args {
        [id] => Ok(id.parse::<ItemId>()?),
        _ => Err(ParseError::Usage(usage)),
    }
}

/// Whether the session continues after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    ledger: Ledger,
    form: ItemForm,
    layout: ReceiptLayout,
    printer: Box<dyn Printer>,
    clock: fn() -> DateTime<Utc>,
    prompt: Option<&'static str>,
}

impl Shell {
    pub fn new(config: &Config, printer: Box<dyn Printer>) -> Self {
        Self {
            ledger: Ledger::new(),
            form: ItemForm::default(),
            layout: config.layout(),
            printer,
            clock: Utc::now,
            prompt: None,
        }
    }

    /// Fixed issue time, for reproducible receipts.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_prompt(mut self, prompt: &'static str) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn form(&self) -> &ItemForm {
        &self.form
    }

    /// The receipt as currently displayed.
    pub fn render(&self) -> String {
        render_receipt(&self.ledger.view(), &self.layout, (self.clock)())
    }

    /// Read commands until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> anyhow::Result<()> {
        self.write_prompt(out)?;
        for line in input.lines() {
            let line = line?;
            if self.execute(&line, out)? == Flow::Quit {
                break;
            }
            self.write_prompt(out)?;
        }
        Ok(())
    }

    /// Execute one input line. Only output failures are errors; rejected
    /// commands are reported on `out` and the session carries on.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> anyhow::Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                return Ok(Flow::Continue);
            }
        };
        tracing::debug!(?command, "shell command");

        match command {
            Command::Submit(form) => {
                self.form = form;
                let editing = self.ledger.editing_id().is_some();
                match self
                    .form
                    .parse()
                    .and_then(|draft| self.ledger.submit_item(&draft))
                {
                    Ok(item) => {
                        self.form.clear();
                        let verb = if editing { "updated" } else { "added" };
                        writeln!(out, "{verb} #{} {}", item.id, item.name)?;
                        self.redraw(out)?;
                    }
                    Err(err) => report(out, &err)?,
                }
            }
            Command::Edit(id) => match self.ledger.begin_edit(id) {
                Ok(item) => {
                    self.form = ItemForm::from_item(&item);
                    writeln!(
                        out,
                        "editing #{}: {} {} {} (save with `add <name> <qty> <price>`)",
                        item.id, self.form.name, self.form.quantity, self.form.unit_price
                    )?;
                }
                Err(err) => report(out, &err)?,
            },
            Command::Cancel => {
                self.ledger.cancel_edit();
                self.form.clear();
                writeln!(out, "form cleared")?;
            }
            Command::Remove(id) => {
                self.ledger.remove_item(id);
                self.redraw(out)?;
            }
            Command::Tax(raw) => {
                self.ledger.set_tax_percent(coerce_amount(&raw));
                self.redraw(out)?;
            }
            Command::Discount(raw) => {
                self.ledger.set_discount_amount(coerce_amount(&raw));
                self.redraw(out)?;
            }
            Command::Paid(raw) => {
                self.ledger.set_paid_amount(coerce_amount(&raw));
                self.redraw(out)?;
            }
            Command::Show => self.redraw(out)?,
            Command::Json => {
                writeln!(out, "{}", serde_json::to_string_pretty(&self.ledger.view())?)?;
            }
            Command::Print => {
                self.printer.print(&self.render());
                writeln!(out, "sent to printer")?;
            }
            Command::Help => write!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn redraw<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write!(out, "{}", self.render())
    }

    fn write_prompt<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        if let Some(prompt) = self.prompt {
            write!(out, "{prompt}")?;
            out.flush()?;
        }
        Ok(())
    }
}

fn report<W: Write>(out: &mut W, err: &DomainError) -> std::io::Result<()> {
    match err {
        DomainError::Validation(reason) => writeln!(out, "ignored: {reason}"),
        DomainError::NotFound => writeln!(out, "error: item not found"),
        other => writeln!(out, "error: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multi_word_item_names() {
        assert_eq!(
            "add Diet Pepsi 2 5.00".parse::<Command>(),
            Ok(Command::Submit(ItemForm::new("Diet Pepsi", "2", "5.00")))
        );
    }

    #[test]
    fn add_needs_a_name_quantity_and_price() {
        assert_eq!(
            "add 2 5".parse::<Command>(),
            Err(ParseError::Usage("add <name> <qty> <price>"))
        );
    }

    #[test]
    fn parses_ids_and_adjustments() {
        assert_eq!("edit 3".parse::<Command>(), Ok(Command::Edit(ItemId::new(3))));
        assert_eq!("RM 3".parse::<Command>(), Ok(Command::Remove(ItemId::new(3))));
        assert_eq!("tax 7.5".parse::<Command>(), Ok(Command::Tax("7.5".to_string())));
        assert_eq!("paid".parse::<Command>(), Ok(Command::Paid(String::new())));
        assert!(matches!(
            "edit abc".parse::<Command>(),
            Err(ParseError::InvalidId(DomainError::InvalidId(_)))
        ));
        assert_eq!("edit".parse::<Command>(), Err(ParseError::Usage("edit <id>")));
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert_eq!(
            "frobnicate".parse::<Command>(),
            Err(ParseError::Unknown("frobnicate".to_string()))
        );
    }
}
