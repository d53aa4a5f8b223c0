//! CLI command implementations

pub mod config;
pub mod login;
pub mod logout;
pub mod logs;
pub mod send;
pub mod signup;
pub mod status;
pub mod wallet;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use parawallet_core::config::Config;
use parawallet_core::{EntryPoint, LogEvent, LoggingService, OperationResult, ParaWalletContext};
use thiserror::Error;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let app_dir = get_app_dir().ok()?;
    std::fs::create_dir_all(&app_dir).ok()?;
    LoggingService::new(&app_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the app directory from environment or default
pub fn get_app_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("PARAWALLET_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".parawallet"))
        .ok_or_else(|| anyhow!("Could not find home directory; set PARAWALLET_DIR"))
}

/// Get or create the wallet context
pub fn get_context() -> Result<ParaWalletContext> {
    let app_dir = get_app_dir()?;
    let ctx = ParaWalletContext::new(&app_dir).context("Failed to initialize wallet context")?;
    show_config_warnings(&ctx.config);
    Ok(ctx)
}

/// Report settings that were ignored while loading (stderr, so `--json` stays clean)
pub fn show_config_warnings(config: &Config) {
    for w in &config.warnings {
        eprintln!("{} {}", "Warning:".yellow(), w);
    }
}

/// Drive `fut` to completion on a fresh runtime.
///
/// Ctrl-C cancels the context's root token, so whichever form is in flight
/// resolves as cancelled instead of the process dying mid-request.
pub fn run_async<F: Future>(ctx: &ParaWalletContext, fut: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let shutdown = ctx.shutdown();

    Ok(runtime.block_on(async move {
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
        let output = fut.await;
        watcher.abort();
        output
    }))
}

/// Spinner shown while a request is in flight (interactive terminals only)
pub fn spinner(message: &str, json: bool) -> Option<ProgressBar> {
    if json || atty::isnt(atty::Stream::Stdout) {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

pub fn finish_spinner(pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}

/// Use the given value, or prompt for it on an interactive terminal
pub fn value_or_prompt(value: Option<String>, prompt: &str, json: bool) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None if json || atty::isnt(atty::Stream::Stdin) => {
            Err(anyhow!("{} is required", prompt))
        }
        None => Ok(Input::new().with_prompt(prompt).interact_text()?),
    }
}

/// Use the given password, or prompt for it (optionally twice)
pub fn password_or_prompt(value: Option<String>, confirm: bool, json: bool) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None if json || atty::isnt(atty::Stream::Stdin) => Err(anyhow!("Password is required")),
        None => {
            let mut prompt = Password::new().with_prompt("Password");
            if confirm {
                prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
            }
            Ok(prompt.interact()?)
        }
    }
}

/// Print a JSON value, pretty
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print `data` in the `--json` success envelope
pub fn print_ok<T: serde::Serialize>(data: T) -> Result<()> {
    print_json(&OperationResult::ok(data))
}

/// A failure already printed as a `--json` envelope; `main` stays quiet
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ReportedFailure(pub String);

/// Turn a form's error message into the command's error, printing the
/// `--json` failure envelope first when asked to
pub fn report_failure(json: bool, message: String) -> anyhow::Error {
    if json {
        let _ = print_json(&OperationResult::<()>::fail(message.clone()));
        return ReportedFailure(message).into();
    }
    anyhow!(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_failure_is_marked_as_reported() {
        let err = report_failure(true, "Invalid credentials".to_string());
        let reported = err.downcast_ref::<ReportedFailure>().unwrap();
        assert_eq!(reported.0, "Invalid credentials");
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_plain_failure_is_left_for_main() {
        let err = report_failure(false, "Invalid credentials".to_string());
        assert!(err.downcast_ref::<ReportedFailure>().is_none());
        assert_eq!(err.to_string(), "Invalid credentials");
    }
}
