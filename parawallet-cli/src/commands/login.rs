//! Login command - authenticate and remember the session

use anyhow::Result;
use colored::Colorize;
use parawallet_core::adapters::Endpoint;
use parawallet_core::LogEvent;

use super::{
    finish_spinner, get_context, get_logger, log_event, password_or_prompt, print_ok,
    report_failure, run_async, spinner, value_or_prompt,
};

pub fn run(email: Option<String>, password: Option<String>, json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("login"));

    let ctx = get_context()?;
    let mut form = ctx.login_form();
    form.email = value_or_prompt(email, "Email", json)?;
    form.password = password_or_prompt(password, false, json)?;

    let pb = spinner("Logging in...", json);
    let ok = run_async(&ctx, form.submit(&ctx.client))?;
    finish_spinner(pb);

    if !ok {
        let message = form.state().error().unwrap_or("Login failed").to_string();
        log_event(
            &logger,
            LogEvent::new("login_failed")
                .with_endpoint(Endpoint::Authenticate.name())
                .with_command("login")
                .with_error(&message),
        );
        return Err(report_failure(json, message));
    }
    log_event(
        &logger,
        LogEvent::new("login_succeeded").with_endpoint(Endpoint::Authenticate.name()),
    );

    let account = form
        .state()
        .result()
        .map(|s| s.account_identifier().to_string())
        .unwrap_or_default();

    if json {
        return print_ok(serde_json::json!({
            "account": account,
        }));
    }

    println!("{} Logged in as {}", "✓".green(), account.bold());
    Ok(())
}
