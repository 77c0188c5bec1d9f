//! Persisted channel settings.
//!
//! The settings file is plain TOML:
//!
//! ```toml
//! default_channel = "general"
//!
//! [channels]
//! general = "https://discord.com/api/webhooks/..."
//! ```
//!
//! Writes are a whole-file rewrite with no locking. Two concurrent
//! `--configure` runs race and the last writer wins.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// File name of the settings file, placed next to the executable by default.
pub const CONFIG_FILE_NAME: &str = ".discordcat";

/// Channel nickname to webhook URL mapping plus the default channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Channel used when none is given on the command line. It does not
    /// have to be a key of `channels`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_channel: Option<String>,

    #[serde(default)]
    pub channels: BTreeMap<String, String>,

    /// Keys this tool does not use. Kept so a rewrite does not drop them.
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl Settings {
    /// Settings for a first-ever configuration: the new channel becomes the default.
    pub fn seeded(name: &str, webhook_url: &str) -> Self {
        let mut channels = BTreeMap::new();
        channels.insert(name.to_string(), webhook_url.to_string());
        Self {
            default_channel: Some(name.to_string()),
            channels,
            extra: toml::Table::new(),
        }
    }
}

/// Reads and writes [`Settings`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir of the running executable>/.discordcat`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the executable path cannot be determined.
    pub fn beside_executable() -> Result<Self> {
        let exe = std::env::current_exe().map_err(|source| Error::Io {
            path: PathBuf::from("<current executable>"),
            source,
        })?;
        let dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::new(dir.join(CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings file.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigNotFound`] if the file is absent, [`Error::ConfigParse`]
    /// if it is malformed, [`Error::Io`] for any other read failure.
    pub fn load(&self) -> Result<Settings> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound {
                    path: self.path.clone(),
                });
            }
            Err(source) => {
                return Err(Error::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let settings: Settings = toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: self.path.clone(),
            source,
        })?;
        debug!(
            path = %self.path.display(),
            channels = settings.channels.len(),
            "Loaded settings"
        );
        Ok(settings)
    }

    /// Overwrites the settings file with `settings`.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigSerialize`] or [`Error::Io`] on write failure.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let content = toml::to_string(settings)?;
        std::fs::write(&self.path, content).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "Saved settings");
        Ok(())
    }

    /// Inserts or overwrites `channels[name]` and rewrites the file.
    ///
    /// When no settings file exists yet, `name` also becomes the default
    /// channel. An existing default is left alone.
    ///
    /// # Errors
    ///
    /// Propagates parse and I/O failures from [`load`](Self::load) and
    /// [`save`](Self::save). A missing file is not an error.
    pub fn upsert_channel(&self, name: &str, webhook_url: &str) -> Result<Settings> {
        let settings = match self.load() {
            Ok(mut settings) => {
                settings
                    .channels
                    .insert(name.to_string(), webhook_url.to_string());
                settings
            }
            Err(Error::ConfigNotFound { .. }) => {
                debug!(path = %self.path.display(), "No settings file yet, creating one");
                Settings::seeded(name, webhook_url)
            }
            Err(e) => return Err(e),
        };

        self.save(&settings)?;
        Ok(settings)
    }
}
