use std::io::{IsTerminal, Write};

use receipt_cli::shell::HELP;
use receipt_cli::{Config, Shell};
use receipt_core::AggregateRoot;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    receipt_observability::init(config.log_format);
    for warning in config.warnings() {
        tracing::warn!("{warning}");
    }

    let mut shell = Shell::new(&config, config.printer());
    tracing::info!(
        ledger_id = %shell.ledger().id(),
        shop = %config.shop_name,
        "receipt session started"
    );

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    if stdin.is_terminal() {
        shell = shell.with_prompt("> ");
        write!(stdout, "{HELP}")?;
    }

    shell.run(stdin.lock(), &mut stdout)?;

    tracing::info!(
        ledger_id = %shell.ledger().id(),
        items = shell.ledger().items().len(),
        "receipt session ended"
    );
    Ok(())
}
