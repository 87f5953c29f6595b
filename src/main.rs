//! Ledgerdash main entry point

use anyhow::Context;
use clap::Parser;
use ledgerdash_api::start_server;
use ledgerdash_config::{hash_password, Config};
use ledgerdash_core::Store;
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "ledgerdash")]
#[command(version = "0.1.0")]
#[command(about = "A small self-hosted income and expense dashboard", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,

    /// Print an argon2 hash of PASSWORD for `users[].password_hash` and exit
    #[arg(long, value_name = "PASSWORD")]
    hash_password: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    if let Some(password) = args.hash_password {
        println!("{}", hash_password(&password)?);
        return Ok(());
    }

    // There are no built-in users, so the server never starts without a valid file
    let config = match Config::load(args.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.to_details());
            return Err(e).with_context(|| format!("Failed to load {}", args.config.display()));
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();

    log::info!(
        "Config loaded from {} ({} users)",
        args.config.display(),
        config.users.len()
    );

    let rt = Runtime::new()?;
    rt.block_on(async {
        let store = Store::connect(&config.database)
            .await
            .with_context(|| format!("Failed to open database {}", config.database.url))?;
        start_server(config, store).await.context("Server error")
    })
}
