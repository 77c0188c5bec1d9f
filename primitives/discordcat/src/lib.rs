//! discordcat - pipe text and files to Discord webhooks.
//!
//! Channel nicknames map to webhook URLs in a small TOML settings file.
//! A run either configures a new nickname interactively or posts one
//! message (read from stdin) or one file to the resolved webhook.

pub mod cli;
pub mod config;
pub mod configure;
pub mod dispatch;
pub mod error;
pub mod resolve;

pub use cli::{Args, Completion, Report, Stream, run};
pub use config::{ConfigStore, Settings};
pub use dispatch::{DispatchRequest, Dispatcher, Outcome};
pub use error::{Error, Result};
pub use resolve::resolve_webhook;
