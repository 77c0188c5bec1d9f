//! Command-line surface and the per-invocation control flow.
//!
//! ```text
//! configure?  -> Configuring -> exit
//! otherwise   -> Loading -> Resolving -> Sending-File | Sending-Message -> exit
//! ```
//!
//! An explicit `--webhook_url` skips `Loading`: the settings file is not
//! read, so it may be missing or malformed.

use std::path::PathBuf;

use anyhow::Error as AnyError;
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncReadExt, AsyncWrite};
use tracing::debug;

use crate::config::{ConfigStore, Settings};
use crate::configure::Configurator;
use crate::dispatch::{DispatchRequest, Dispatcher, Outcome};
use crate::error::{Error, Result};
use crate::resolve::resolve_webhook;

/// Pipes text or a file to a Discord channel webhook.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "discordcat")]
#[command(about = "Posts stdin or a file to a Discord webhook")]
pub struct Args {
    /// Set up a channel nickname interactively. Other flags are ignored.
    #[arg(long)]
    pub configure: bool,

    /// Author name shown on text messages.
    #[arg(long, env = "DISCORDCAT_USERNAME")]
    pub username: Option<String>,

    /// Configured channel nickname to post to.
    #[arg(short, long, env = "DISCORDCAT_CHANNEL")]
    pub channel: Option<String>,

    /// Upload this file instead of sending stdin as text.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Filename reported for the upload. Defaults to the file path.
    #[arg(long)]
    pub filename: Option<String>,

    /// Post to this webhook URL, bypassing the configured channels.
    #[arg(long = "webhook_url", alias = "webhook-url", env = "DISCORDCAT_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Settings file to use instead of `.discordcat` beside the executable.
    #[arg(long, env = "DISCORDCAT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// How an invocation finished without error.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Configured(Settings),
    Sent {
        request: DispatchRequest,
        outcome: Outcome,
    },
}

impl Completion {
    /// Whether the result line belongs on stderr.
    pub fn is_failure(&self) -> bool {
        matches!(self, Completion::Sent { outcome, .. } if !outcome.is_delivered())
    }

    /// Human-readable result line, or `None` when there is nothing to report.
    pub fn summary(&self) -> Option<String> {
        let Completion::Sent { request, outcome } = self else {
            return None;
        };
        let line = match (request, outcome) {
            (DispatchRequest::Message { content, .. }, Outcome::Delivered) => {
                format!("Send message \"{content}\"")
            }
            (DispatchRequest::Message { content, .. }, Outcome::Rejected { status }) => {
                format!("Failed send message \"{content}\" ({})", status.as_u16())
            }
            (DispatchRequest::File { .. }, Outcome::Delivered) => "Send file".to_string(),
            (DispatchRequest::File { .. }, Outcome::Rejected { status }) => {
                format!("Failed send file \"{}\"", status.as_u16())
            }
        };
        Some(line)
    }
}

/// Where a result line is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// What the process prints and the status it exits with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub line: Option<(Stream, String)>,
    pub exit_status: u8,
}

impl Report {
    /// Maps a finished invocation to output and exit status.
    ///
    /// Configuring and any delivery that reached the webhook exit 0, even
    /// when the webhook rejected it. Every error exits 1.
    pub fn for_result(result: &std::result::Result<Completion, AnyError>) -> Self {
        match result {
            Ok(completion) => {
                let stream = if completion.is_failure() {
                    Stream::Stderr
                } else {
                    Stream::Stdout
                };
                Self {
                    line: completion.summary().map(|line| (stream, line)),
                    exit_status: 0,
                }
            }
            Err(e) => {
                let line = match e.downcast_ref::<Error>() {
                    Some(Error::UnknownChannel(name)) => format!("Unknown channel {name:?}"),
                    _ => format!("{e:#}"),
                };
                Self {
                    line: Some((Stream::Stderr, line)),
                    exit_status: 1,
                }
            }
        }
    }
}

/// Removes exactly one trailing `\n`, if present.
pub fn strip_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

/// Runs one invocation.
///
/// `stdin` supplies the prompt answers in configure mode and the message
/// text in message mode. It is not read in file mode. `prompt` receives the
/// configure prompts.
///
/// # Errors
///
/// Any [`Error`]; the caller reports it and exits with status 1 (see
/// [`Report::for_result`]). A webhook that answers with an unexpected status
/// is not an error, see [`Completion::is_failure`].
pub async fn run<R, W>(args: &Args, store: &ConfigStore, stdin: R, prompt: W) -> Result<Completion>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if args.configure {
        let settings = Configurator::new(stdin, prompt).run(store).await?;
        return Ok(Completion::Configured(settings));
    }

    let webhook_url = match args.webhook_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => resolve_webhook(Some(url), None, &Settings::default())?,
        None => {
            let settings = store.load()?;
            resolve_webhook(None, args.channel.as_deref(), &settings)?
        }
    };

    let request = match &args.file {
        Some(path) => DispatchRequest::file(path, args.filename.as_deref()),
        None => {
            let content = read_message(stdin).await?;
            DispatchRequest::message(content, args.username.as_deref())
        }
    };
    debug!(?request, "Dispatching");

    let outcome = Dispatcher::new()?.dispatch(&request, &webhook_url).await?;
    Ok(Completion::Sent { request, outcome })
}

async fn read_message<R>(mut stdin: R) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut bytes = Vec::new();
    stdin.read_to_end(&mut bytes).await.map_err(Error::Stdin)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok(strip_trailing_newline(text))
}
