//! opal - Opal card balances and trips from the terminal.
//!
//! Credentials and the site's session cookies are kept in an auth record
//! (a file or the OS keychain). Commands that talk to the site save the
//! refreshed session when they succeed.

mod cli;
mod config;
mod output;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use opal_core::auth::SERVICE_NAME;
use opal_core::{ActivityRequest, AuthRecord, AuthStore, FileAuthStore, KeychainAuthStore, OpalClient};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Args, Command};
use config::{Config, AUTH_FILE_ENV};

type BoxedStore = Box<dyn AuthStore + Send + Sync>;

/// Initialize the tracing subscriber for logging
fn init_tracing(verbose: u8) {
    // RUST_LOG wins over -v
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(args.verbose);
    debug!(?args, "CLI arguments parsed");

    let config = Config::load().context("loading config")?;
    let store = open_store(&args, &config)?;

    match args.command {
        Command::Init => init(store.as_ref()),
        Command::Login => {
            let mut client = connect(store, &config)?;
            client.login().await.context("logging in")?;
            client.save_session().context("saving session")?;
            println!("Logged in as {}.", client.record().username);
            Ok(())
        }
        Command::Overview { json } => {
            let mut client = connect(store, &config)?;
            let overview = client.overview().await.context("fetching overview")?;
            client.save_session().context("saving session")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                print!("{}", output::overview_table(&overview));
            }
            Ok(())
        }
        Command::Activity { card, page, json } => {
            let mut client = connect(store, &config)?;
            let request = ActivityRequest::new(card).with_offset(page);
            let activity = client
                .activity(&request)
                .await
                .with_context(|| format!("fetching activity for card {card}, page {page}"))?;
            client.save_session().context("saving session")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&activity)?);
            } else {
                print!("{}", output::activity_table(&activity, page));
            }
            Ok(())
        }
    }
}

fn open_store(args: &Args, config: &Config) -> Result<BoxedStore> {
    if let Some(account) = &args.keychain {
        let store = KeychainAuthStore::new(SERVICE_NAME, account)
            .with_context(|| format!("opening keychain entry for {account}"))?;
        return Ok(Box::new(store));
    }

    let env = std::env::var_os(AUTH_FILE_ENV).map(PathBuf::from);
    let path = config.auth_file(args.auth_file.clone(), env)?;
    debug!(path = %path.display(), "Using auth file");
    Ok(Box::new(FileAuthStore::new(path)))
}

fn connect(store: BoxedStore, config: &Config) -> Result<OpalClient> {
    let client_config = config.client_config()?;
    OpalClient::new(store, &client_config)
        .context("loading auth record (run `opal init` first)")
}

/// Prompt for credentials and store them with no session.
fn init(store: &(dyn AuthStore + Send + Sync)) -> Result<()> {
    let username = prompt_username()?;
    if username.is_empty() {
        bail!("Username required");
    }
    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        bail!("Password required");
    }

    store
        .save(&AuthRecord::new(username, password))
        .context("saving auth record")?;
    info!("Auth record written");
    println!("Saved. Run `opal overview` to log in and fetch your cards.");
    Ok(())
}

fn prompt_username() -> Result<String> {
    print!("Username: ");
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    Ok(username.trim().to_string())
}
