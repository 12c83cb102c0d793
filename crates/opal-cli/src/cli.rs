//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Check Opal card balances and trips from the terminal.
#[derive(Parser, Debug)]
#[command(name = "opal")]
#[command(author, version, about)]
pub struct Args {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Auth record file (default: $OPAL_AUTH_FILE, then config, then ~/.opal)
    #[arg(long, global = true, value_name = "PATH")]
    pub auth_file: Option<PathBuf>,

    /// Keep the auth record in the OS keychain under this account instead of a file
    #[arg(long, global = true, value_name = "ACCOUNT", conflicts_with = "auth_file")]
    pub keychain: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Store a username and password for later commands
    Init,

    /// Log in now and save the new session
    Login,

    /// Show cards and balances
    Overview {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one page of a card's transactions
    Activity {
        /// Card position as listed by `overview`, starting at 0
        #[arg(short, long, default_value_t = 0)]
        card: u32,

        /// Pages back from the most recent
        #[arg(short, long, default_value_t = 0)]
        page: u32,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}
