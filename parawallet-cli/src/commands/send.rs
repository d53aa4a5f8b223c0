//! Send command - transfer funds from the wallet

use anyhow::{anyhow, Result};
use colored::Colorize;
use dialoguer::Confirm;
use parawallet_core::adapters::Endpoint;
use parawallet_core::LogEvent;

use super::{
    finish_spinner, get_context, get_logger, log_event, print_ok, report_failure, run_async,
    spinner, value_or_prompt,
};

pub fn run(to: Option<String>, amount: Option<String>, yes: bool, json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("send"));

    let ctx = get_context()?;
    if !ctx.session.is_logged_in() {
        return Err(report_failure(
            json,
            "Not logged in. Run 'pw login' first.".to_string(),
        ));
    }

    let mut form = ctx.send_form();
    form.to = value_or_prompt(to, "Recipient address", json)?;
    form.amount = value_or_prompt(amount, "Amount (ETH)", json)?;

    if !yes && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Send {} ETH to {}?", form.amount, form.to))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let pb = spinner("Sending...", json);
    let ok = run_async(&ctx, form.submit(&ctx.client))?;
    finish_spinner(pb);

    if !ok {
        let message = form
            .state()
            .error()
            .unwrap_or("Transaction failed")
            .to_string();
        log_event(
            &logger,
            LogEvent::new("transfer_failed")
                .with_endpoint(Endpoint::SubmitTransfer.name())
                .with_command("send")
                .with_error(&message),
        );
        return Err(report_failure(json, message));
    }
    log_event(
        &logger,
        LogEvent::new("transfer_submitted").with_endpoint(Endpoint::SubmitTransfer.name()),
    );

    let result = form
        .state()
        .result()
        .ok_or_else(|| anyhow!("Transaction failed"))?;
    let explorer_url = result.explorer_url(&ctx.config.explorer_tx_url);

    if json {
        return print_ok(serde_json::json!({
            "transaction_hash": result.transaction_hash,
            "explorer_url": explorer_url,
        }));
    }

    println!("{} Transaction sent", "✓".green());
    println!("  Hash: {}", result.transaction_hash);
    println!("  View: {}", explorer_url.cyan());
    Ok(())
}
