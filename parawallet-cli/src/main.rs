//! Para Wallet CLI - custodial wallet in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{config, login, logout, logs, send, signup, status, wallet};

/// Para Wallet - custodial wallet in your terminal
#[derive(Parser)]
#[command(name = "pw", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and its custodial wallet
    Signup {
        /// Account email (prompted if omitted)
        #[arg(long)]
        email: Option<String>,
        /// Account password (prompted if omitted)
        #[arg(long, env = "PARAWALLET_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Log in with the same credentials afterwards
        #[arg(long)]
        login: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log in and remember the session
    Login {
        /// Account email (prompted if omitted)
        #[arg(long)]
        email: Option<String>,
        /// Account password (prompted if omitted)
        #[arg(long, env = "PARAWALLET_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget the stored session
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show session status and backend settings
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show wallet address and balance
    Wallet {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send funds from the wallet
    Send {
        /// Recipient address
        to: Option<String>,
        /// Amount in ETH, sent exactly as typed
        amount: Option<String>,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View or change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.downcast_ref::<commands::ReportedFailure>().is_none() {
                output::error(&e.to_string());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Signup {
            email,
            password,
            login,
            json,
        } => signup::run(email, password, login, json),
        Commands::Login {
            email,
            password,
            json,
        } => login::run(email, password, json),
        Commands::Logout { json } => logout::run(json),
        Commands::Status { json } => status::run(json),
        Commands::Wallet { json } => wallet::run(json),
        Commands::Send {
            to,
            amount,
            yes,
            json,
        } => send::run(to, amount, yes, json),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
