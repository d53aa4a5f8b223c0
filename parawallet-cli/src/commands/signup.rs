//! Signup command - create an account and its custodial wallet

use anyhow::Result;
use colored::Colorize;
use parawallet_core::adapters::Endpoint;
use parawallet_core::LogEvent;

use super::{
    finish_spinner, get_context, get_logger, log_event, password_or_prompt, print_ok,
    report_failure, run_async, spinner, value_or_prompt,
};

pub fn run(email: Option<String>, password: Option<String>, login: bool, json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("signup"));

    let ctx = get_context()?;
    let email = value_or_prompt(email, "Email", json)?;
    let password = password_or_prompt(password, true, json)?;

    let mut form = ctx.signup_form();
    form.email = email.clone();
    form.password = password.clone();

    let pb = spinner("Creating account...", json);
    let created = run_async(&ctx, form.submit(&ctx.client))?;
    finish_spinner(pb);

    if !created {
        let message = form.state().error().unwrap_or("Signup failed").to_string();
        log_event(
            &logger,
            LogEvent::new("signup_failed")
                .with_endpoint(Endpoint::CreateAccount.name())
                .with_command("signup")
                .with_error(&message),
        );
        return Err(report_failure(json, message));
    }
    log_event(
        &logger,
        LogEvent::new("signup_succeeded").with_endpoint(Endpoint::CreateAccount.name()),
    );

    let message = form.success_message().unwrap_or_default();
    let wallet_address = form
        .state()
        .result()
        .map(|r| r.wallet_address.clone())
        .unwrap_or_default();

    // Signing up never logs in; --login performs a real login afterwards
    let mut logged_in_as = None;
    if login {
        let mut login_form = ctx.login_form();
        login_form.email = email;
        login_form.password = password;

        let pb = spinner("Logging in...", json);
        let ok = run_async(&ctx, login_form.submit(&ctx.client))?;
        finish_spinner(pb);

        if !ok {
            let message = login_form.state().error().unwrap_or("Login failed").to_string();
            log_event(
                &logger,
                LogEvent::new("login_failed")
                    .with_endpoint(Endpoint::Authenticate.name())
                    .with_command("signup")
                    .with_error(&message),
            );
            return Err(report_failure(
                json,
                format!("Account created, but login failed: {}", message),
            ));
        }
        log_event(
            &logger,
            LogEvent::new("login_succeeded").with_endpoint(Endpoint::Authenticate.name()),
        );
        logged_in_as = login_form
            .state()
            .result()
            .map(|s| s.account_identifier().to_string());
    }

    if json {
        return print_ok(serde_json::json!({
            "message": message,
            "wallet_address": wallet_address,
            "logged_in": logged_in_as.is_some(),
            "account": logged_in_as,
        }));
    }

    println!("{} {}", "✓".green(), message);
    match logged_in_as {
        Some(account) => println!("Logged in as {}", account.bold()),
        None => println!("{}", "Run 'pw login' to use your wallet.".dimmed()),
    }

    Ok(())
}
