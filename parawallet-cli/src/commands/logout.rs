//! Logout command - forget the stored session

use anyhow::Result;
use colored::Colorize;
use parawallet_core::LogEvent;

use super::{get_app_dir, get_logger, log_event, print_ok, report_failure};

pub fn run(json: bool) -> Result<()> {
    let logger = get_logger();
    let app_dir = get_app_dir()?;

    // Works without settings or a backend, so a broken config can't block it
    let was_logged_in = match parawallet_core::forget_stored_session(&app_dir) {
        Ok(was_logged_in) => was_logged_in,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("logout").with_command("logout").with_error(e.to_string()),
            );
            return Err(report_failure(json, e.to_string()));
        }
    };
    log_event(&logger, LogEvent::new("logout").with_command("logout"));

    if json {
        return print_ok(serde_json::json!({
            "was_logged_in": was_logged_in,
        }));
    }

    if was_logged_in {
        println!("{} Logged out", "✓".green());
    } else {
        println!("{}", "Not logged in".dimmed());
    }
    Ok(())
}
