use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use receipt_cli::{Config, Flow, Printer, Shell};
use receipt_core::Money;
use receipt_ledger::EditState;
use rust_decimal_macros::dec;

#[derive(Clone, Default)]
struct RecordingPrinter {
    jobs: Rc<RefCell<Vec<String>>>,
}

impl Printer for RecordingPrinter {
    fn print(&self, document: &str) {
        self.jobs.borrow_mut().push(document.to_string());
    }
}

fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
}

fn spawn_shell() -> (Shell, RecordingPrinter) {
    let config = Config::from_lookup(|key| match key {
        "RECEIPT_SHOP_NAME" => Some("Samad Express".to_string()),
        _ => None,
    });
    let printer = RecordingPrinter::default();
    let shell = Shell::new(&config, Box::new(printer.clone())).with_clock(fixed_clock);
    (shell, printer)
}

fn run(shell: &mut Shell, script: &str) -> String {
    let mut out = Vec::new();
    shell.run(script.as_bytes(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn full_receipt_session() {
    let (mut shell, printer) = spawn_shell();
    let output = run(
        &mut shell,
        "add Pepsi 2 5.00\nadd Chips 1 3.50\ntax 10\ndiscount 1\npaid 15\nprint\n",
    );

    assert!(output.contains("added #1 Pepsi"));
    assert!(output.contains("added #2 Chips"));
    assert!(output.contains("sent to printer"));

    let totals = shell.ledger().compute_totals();
    assert_eq!(totals.total, Money::new(dec!(13.85)));
    assert_eq!(totals.change, Money::new(dec!(1.15)));

    let jobs = printer.jobs.borrow();
    assert_eq!(jobs.len(), 1);
    assert!(jobs[0].contains("Samad Express"));
    assert!(jobs[0].contains("2026-10-19 09:30 UTC"));
    assert!(jobs[0].contains("13.85"));
    assert!(jobs[0].lines().any(|l| l.starts_with("Change:") && l.ends_with("1.15")));
}

#[test]
fn edit_then_save_updates_in_place() {
    let (mut shell, _) = spawn_shell();
    let output = run(
        &mut shell,
        "add Pepsi 2 5.00\nadd Chips 1 3.50\nedit 1\nadd Cola 3 4\n",
    );

    assert!(output.contains("editing #1: Pepsi 2 5"));
    assert!(output.contains("updated #1 Cola"));

    let items = shell.ledger().items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "Cola");
    assert_eq!(items[0].quantity, 3);
    assert_eq!(items[1].name, "Chips");
    assert_eq!(shell.ledger().editing(), EditState::Idle);
    assert_eq!(shell.form().quantity, "1");
}

#[test]
fn invalid_submissions_are_ignored() {
    let (mut shell, _) = spawn_shell();
    let output = run(&mut shell, "add X 0 5\nadd X 1 -5\nadd X 1 abc\n");

    assert_eq!(output.matches("ignored:").count(), 3);
    assert!(shell.ledger().items().is_empty());
}

#[test]
fn deleting_the_edited_item_returns_to_create_mode() {
    let (mut shell, _) = spawn_shell();
    let output = run(&mut shell, "add Pepsi 2 5\nedit 1\nrm 1\nrm 1\nadd Gum 1 1\n");

    assert!(output.contains("added #2 Gum"));
    assert_eq!(shell.ledger().items().len(), 1);
    assert_eq!(shell.ledger().editing(), EditState::Idle);
}

#[test]
fn missing_ids_and_bad_input_do_not_end_the_session() {
    let (mut shell, _) = spawn_shell();
    let output = run(&mut shell, "edit 9\nfrobnicate\nedit x\nshow\n");

    assert!(output.contains("error: item not found"));
    assert!(output.contains("error: unknown command: frobnicate"));
    assert!(output.contains("error: invalid identifier"));
    assert!(output.contains("(no items)"));
}

#[test]
fn adjustments_coerce_garbage_to_zero() {
    let (mut shell, _) = spawn_shell();
    run(&mut shell, "tax 10\ntax ten\ndiscount -4\npaid\n");

    let totals = shell.ledger().compute_totals();
    assert_eq!(totals.tax_percent, dec!(0));
    assert_eq!(totals.discount, Money::zero());
    assert_eq!(totals.paid, Money::zero());
}

#[test]
fn json_dump_and_quit() {
    let (mut shell, _) = spawn_shell();
    let output = run(&mut shell, "add Pepsi 2 5.00\njson\nquit\nadd Chips 1 3.50\n");

    assert!(output.contains("\"subtotal\": \"10.00\""));
    assert!(output.contains("\"mode\": \"idle\""));
    // Nothing after `quit` runs.
    assert_eq!(shell.ledger().items().len(), 1);
}

#[test]
fn execute_reports_flow() {
    let (mut shell, _) = spawn_shell();
    let mut out = Vec::new();
    assert_eq!(shell.execute("", &mut out).unwrap(), Flow::Continue);
    assert_eq!(shell.execute("help", &mut out).unwrap(), Flow::Continue);
    assert_eq!(shell.execute("exit", &mut out).unwrap(), Flow::Quit);
    assert!(String::from_utf8(out).unwrap().contains("commands:"));
}

#[test]
fn amounts_beyond_the_decimal_range_are_ignored() {
    let (mut shell, _) = spawn_shell();
    let output = run(
        &mut shell,
        "add X 1000 79228162514264337593543950335\n\
         add X 2 1000000000000000\n\
         tax 79228162514264337593543950335\n\
         show\n",
    );

    assert_eq!(output.matches("ignored: line total").count(), 2);
    assert!(shell.ledger().items().is_empty());
    assert_eq!(shell.ledger().compute_totals().tax_percent, dec!(0));
    assert!(output.contains("(no items)"));
}

#[test]
fn receipt_at_the_amount_limits_still_renders() {
    let (mut shell, printer) = spawn_shell();
    let output = run(
        &mut shell,
        "add Big 1 1000000000000000\n\
         add Extra 1 0.01\n\
         tax 10000\n\
         discount 1000000000000000\n\
         paid 1000000000000000\n\
         print\n",
    );

    assert!(output.contains("ignored: subtotal"));
    assert_eq!(shell.ledger().items().len(), 1);
    let totals = shell.ledger().compute_totals();
    assert_eq!(totals.total, Money::new(dec!(100000000000000000)));
    assert!(printer.jobs.borrow()[0].contains("100000000000000000.00"));
}
