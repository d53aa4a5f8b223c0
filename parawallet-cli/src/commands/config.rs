//! Config command - view or change settings

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use parawallet_core::config::Config;

use super::{get_app_dir, print_ok, show_config_warnings};
use crate::output::{create_table, success, warning};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the wallet backend URL
    SetUrl {
        /// Backend root, e.g. http://localhost:3000
        url: String,
    },
    /// Set the request timeout (0 disables it)
    SetTimeout {
        /// Timeout in seconds
        secs: u64,
    },
    /// Set the block explorer and faucet links
    SetExplorer {
        /// Transaction URL prefix; the hash is appended
        tx_url: String,
        /// Faucet URL shown for empty wallets
        #[arg(long)]
        faucet: Option<String>,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let app_dir = get_app_dir()?;
    let mut config = Config::load(&app_dir)?;
    show_config_warnings(&config);

    match command {
        ConfigCommands::Show { json } => {
            if json {
                return print_ok(serde_json::json!({
                    "api_base_url": config.api_base_url,
                    "api_url_from_env": config.api_url_from_env,
                    "timeout_secs": config.timeout_secs,
                    "explorer_tx_url": config.explorer_tx_url,
                    "faucet_url": config.faucet_url,
                    "settings_path": app_dir.join("settings.json").to_string_lossy(),
                }));
            }

            println!("{}", "Settings".bold());
            let mut table = create_table();
            table.add_row(vec!["Backend URL", config.api_base_url.as_str()]);
            let timeout = match config.timeout_secs {
                0 => "disabled".to_string(),
                secs => format!("{}s", secs),
            };
            table.add_row(vec!["Timeout".to_string(), timeout]);
            table.add_row(vec!["Explorer", config.explorer_tx_url.as_str()]);
            table.add_row(vec!["Faucet", config.faucet_url.as_str()]);
            println!("{}", table);
            println!("{}", app_dir.join("settings.json").display().to_string().dimmed());
        }
        ConfigCommands::SetUrl { url } => {
            let env_active = config.api_url_from_env;
            config.set_api_url(&url)?;
            config.save(&app_dir)?;
            success(&format!("Backend URL set to {}", config.api_base_url));
            if env_active {
                warning("PARAWALLET_API_URL is set and still takes precedence");
            }
        }
        ConfigCommands::SetTimeout { secs } => {
            config.set_timeout_secs(secs);
            config.save(&app_dir)?;
            if secs == 0 {
                success("Request timeout disabled");
            } else {
                success(&format!("Request timeout set to {}s", secs));
            }
        }
        ConfigCommands::SetExplorer { tx_url, faucet } => {
            config.set_explorer_tx_url(&tx_url)?;
            if let Some(f) = faucet {
                config.set_faucet_url(&f)?;
            }
            config.save(&app_dir)?;
            success(&format!("Explorer set to {}", config.explorer_tx_url));
        }
    }

    Ok(())
}
