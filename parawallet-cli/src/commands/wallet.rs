//! Wallet command - show address and balance

use anyhow::{anyhow, Result};
use colored::Colorize;
use parawallet_core::adapters::Endpoint;
use parawallet_core::{LogEvent, WalletSnapshot};

use super::{
    finish_spinner, get_context, get_logger, log_event, print_ok, report_failure, run_async,
    spinner,
};
use crate::output::create_table;

pub fn run(json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("wallet"));

    let ctx = get_context()?;
    let mut panel = ctx.wallet_panel();

    let pb = spinner("Fetching wallet...", json);
    let ok = run_async(&ctx, panel.fetch(&ctx.client))?;
    finish_spinner(pb);

    if !ok {
        let message = panel
            .state()
            .error()
            .unwrap_or("Failed to fetch wallet")
            .to_string();
        log_event(
            &logger,
            LogEvent::new("wallet_fetch_failed")
                .with_endpoint(Endpoint::FetchWallet.name())
                .with_command("wallet")
                .with_error(&message),
        );
        return Err(report_failure(json, message));
    }
    log_event(
        &logger,
        LogEvent::new("wallet_fetched").with_endpoint(Endpoint::FetchWallet.name()),
    );

    let snapshot = panel
        .snapshot()
        .ok_or_else(|| anyhow!("Failed to fetch wallet"))?;

    if json {
        return print_ok(snapshot);
    }

    println!("{}", render(snapshot, &ctx.config.faucet_url));
    Ok(())
}

/// Wallet table followed by the faucet hint, shown for every balance
fn render(snapshot: &WalletSnapshot, faucet_url: &str) -> String {
    let mut table = create_table();
    table.add_row(vec!["Address", snapshot.address.as_str()]);
    table.add_row(vec!["Balance".to_string(), format!("{} ETH", snapshot.balance_eth)]);

    format!(
        "{}\n\n{} {}",
        table,
        "Need test ETH? Try the faucet:".dimmed(),
        faucet_url.cyan()
    )
}
