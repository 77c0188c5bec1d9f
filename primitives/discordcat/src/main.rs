//! discordcat - Discord Webhook Cat
//!
//! Posts standard input as a message, or a file as an attachment, to a
//! Discord webhook picked by channel nickname.
//!
//! # Usage
//!
//! ```bash
//! # Register a channel nickname (the first one becomes the default)
//! discordcat --configure
//!
//! # Send a message to the default channel
//! echo "deploy finished" | discordcat
//!
//! # Send to a named channel with a custom author
//! make test 2>&1 | discordcat -c ci --username builder
//!
//! # Upload a file under a different name
//! discordcat -f target/report.html --filename report.html
//!
//! # Skip the settings file entirely
//! echo hi | discordcat --webhook_url https://discord.com/api/webhooks/...
//! ```

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use discordcat::{Args, Completion, ConfigStore, Report, Stream};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

const GREEN: &str = "\x1b[01;32m";
const RED: &str = "\x1b[01;31m";
const RESET: &str = "\x1b[0m";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn invoke(args: &Args) -> anyhow::Result<Completion> {
    let store = match &args.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::beside_executable().context("Failed to locate settings file")?,
    };

    let stdin = BufReader::new(tokio::io::stdin());
    let completion = discordcat::run(args, &store, stdin, tokio::io::stdout()).await?;
    Ok(completion)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    let report = Report::for_result(&invoke(&args).await);
    match report.line {
        Some((Stream::Stdout, line)) => println!("{GREEN}{line}{RESET}"),
        Some((Stream::Stderr, line)) => eprintln!("{RED}{line}{RESET}"),
        None => {}
    }
    ExitCode::from(report.exit_status)
}
