//! Runtime configuration, read once from the environment at start-up.

use receipt_observability::LogFormat;

use crate::print::{CommandPrinter, Printer, StdoutPrinter};
use crate::render::ReceiptLayout;

pub const DEFAULT_SHOP_NAME: &str = "Receipt";
pub const DEFAULT_WIDTH: usize = 42;
pub const MIN_WIDTH: usize = 36;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `RECEIPT_SHOP_NAME`: title printed at the top of the receipt.
    pub shop_name: String,
    /// `RECEIPT_WIDTH`: rendered line width in characters.
    pub width: usize,
    /// `RECEIPT_PRINT_COMMAND`: host command receiving the receipt on stdin.
    pub print_command: Option<String>,
    /// `RECEIPT_LOG_FORMAT`: `json` or `pretty`.
    pub log_format: LogFormat,
    warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shop_name: DEFAULT_SHOP_NAME.to_string(),
            width: DEFAULT_WIDTH,
            print_command: None,
            log_format: LogFormat::default(),
            warnings: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unusable values fall back to defaults and are
    /// recorded in [`Config::warnings`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(name) = lookup("RECEIPT_SHOP_NAME").filter(|v| !v.trim().is_empty()) {
            config.shop_name = name.trim().to_string();
        }

        if let Some(raw) = lookup("RECEIPT_WIDTH") {
            match raw.trim().parse::<usize>() {
                Ok(width) if width >= MIN_WIDTH => config.width = width,
                Ok(width) => {
                    config.width = MIN_WIDTH;
                    config.warnings.push(format!(
                        "RECEIPT_WIDTH={width} is below the minimum; using {MIN_WIDTH}"
                    ));
                }
                Err(_) => config.warnings.push(format!(
                    "RECEIPT_WIDTH={raw:?} is not a number; using {DEFAULT_WIDTH}"
                )),
            }
        }

        config.print_command = lookup("RECEIPT_PRINT_COMMAND").filter(|v| !v.trim().is_empty());

        if let Some(raw) = lookup("RECEIPT_LOG_FORMAT") {
            match raw.parse::<LogFormat>() {
                Ok(format) => config.log_format = format,
                Err(err) => config.warnings.push(format!("RECEIPT_LOG_FORMAT: {err}; using json")),
            }
        }

        config
    }

    /// Problems found while reading the environment, to be logged once tracing is up.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn layout(&self) -> ReceiptLayout {
        ReceiptLayout {
            title: self.shop_name.clone(),
            width: self.width,
        }
    }

    pub fn printer(&self) -> Box<dyn Printer> {
        match self.print_command.as_deref().and_then(CommandPrinter::parse) {
            Some(printer) => Box::new(printer),
            None => Box::new(StdoutPrinter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config, Config::default());
        assert_eq!(config.width, 42);
        assert_eq!(config.layout().width, DEFAULT_WIDTH);
        assert!(config.warnings().is_empty());
    }

    #[test]
    fn reads_all_variables() {
        let config = config_from(&[
            ("RECEIPT_SHOP_NAME", " Samad Express "),
            ("RECEIPT_WIDTH", "48"),
            ("RECEIPT_PRINT_COMMAND", "lp -d kitchen"),
            ("RECEIPT_LOG_FORMAT", "pretty"),
        ]);
        assert_eq!(config.shop_name, "Samad Express");
        assert_eq!(config.width, 48);
        assert_eq!(config.print_command.as_deref(), Some("lp -d kitchen"));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.warnings().is_empty());
    }

    #[test]
    fn bad_values_fall_back_with_warnings() {
        let config = config_from(&[
            ("RECEIPT_WIDTH", "wide"),
            ("RECEIPT_LOG_FORMAT", "xml"),
            ("RECEIPT_SHOP_NAME", "   "),
        ]);
        assert_eq!(config.width, DEFAULT_WIDTH);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.shop_name, DEFAULT_SHOP_NAME);
        assert_eq!(config.warnings().len(), 2);
    }

    #[test]
    fn narrow_width_is_raised_to_minimum() {
        let config = config_from(&[("RECEIPT_WIDTH", "20")]);
        assert_eq!(config.width, 36);
        assert_eq!(config.width, MIN_WIDTH);
        assert_eq!(config.warnings().len(), 1);
    }
}
