//! `receipt-cli`
//!
//! **Responsibility:** the presentation layer over the receipt ledger.
//!
//! - Environment configuration
//! - Plain-text receipt rendering
//! - The print trigger (stdout or a host print command)
//! - A line-oriented interactive shell standing in for the item form
//!
//! All arithmetic and validation live in `receipt-ledger`; nothing here computes totals.

pub mod config;
pub mod print;
pub mod render;
pub mod shell;

pub use config::Config;
pub use print::{CommandPrinter, Printer, StdoutPrinter};
pub use render::{ReceiptLayout, render_receipt};
pub use shell::{Command, Flow, ParseError, Shell};
