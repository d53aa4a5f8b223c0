//! Status command - show session state and backend settings

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use parawallet_core::SessionState;

use super::{get_context, get_logger, log_event, print_ok};
use crate::output::create_table;

pub fn run(json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, parawallet_core::LogEvent::new("command_executed").with_command("status"));

    let ctx = get_context()?;
    let now = Utc::now();

    let (account, expires_at, expired) = match ctx.session.state() {
        SessionState::LoggedIn(session) => (
            Some(session.account_identifier().to_string()),
            session.expires_at(),
            session.is_expired(now),
        ),
        SessionState::LoggedOut => (None, None, false),
    };

    if json {
        return print_ok(serde_json::json!({
            "logged_in": account.is_some(),
            "account": account,
            "token_expires_at": expires_at.map(|t| t.to_rfc3339()),
            "token_expired": expired,
            "api_base_url": ctx.config.api_base_url,
            "api_url_from_env": ctx.config.api_url_from_env,
            "timeout_secs": ctx.config.timeout_secs,
        }));
    }

    println!("{}", "Para Wallet Status".bold());
    println!();

    let mut table = create_table();
    match &account {
        Some(account) => table.add_row(vec!["Session", &format!("Logged in as {}", account)]),
        None => table.add_row(vec!["Session", "Logged out"]),
    };
    if let Some(exp) = expires_at {
        let label = if expired {
            format!("{} (expired)", exp.format("%Y-%m-%d %H:%M:%S UTC"))
        } else {
            exp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
        };
        table.add_row(vec!["Token expires".to_string(), label]);
    }
    let backend = if ctx.config.api_url_from_env {
        format!("{} (from PARAWALLET_API_URL)", ctx.config.api_base_url)
    } else {
        ctx.config.api_base_url.clone()
    };
    table.add_row(vec!["Backend".to_string(), backend]);
    println!("{}", table);

    if expired {
        println!();
        println!(
            "{}",
            "Your session token has expired. Run 'pw login' again.".yellow()
        );
    } else if account.is_none() {
        println!();
        println!("{}", "Run 'pw login' or 'pw signup' to get started.".dimmed());
    }

    Ok(())
}
