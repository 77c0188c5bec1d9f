//! Error types for discordcat.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No settings file exists at the configured path.
    #[error("config file not found at {}; run with --configure first", path.display())]
    ConfigNotFound { path: PathBuf },

    /// The settings file exists but is not valid TOML for [`crate::config::Settings`].
    #[error("failed to parse config at {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Neither an explicit webhook URL nor a configured channel matched.
    #[error("unknown channel: {0:?}")]
    UnknownChannel(String),

    /// The attachment could not be read.
    #[error("failed to read file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read standard input: {0}")]
    Stdin(#[source] std::io::Error),

    /// Transport-level failure talking to the webhook (DNS, refused, TLS...).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Interactive input ended before the named answer was given.
    #[error("input closed while waiting for {0}")]
    PromptClosed(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
