//! Interactive `--configure` flow.

use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::config::{ConfigStore, Settings};
use crate::error::{Error, Result};

const NICKNAME_PROMPT: &str = "Nickname for channel: ";
const WEBHOOK_PROMPT: &str = "Please input webhook url: ";

/// Asks for a channel nickname and a webhook URL, then stores them.
///
/// Input and prompt output are injected so the flow can run against the
/// terminal or against in-memory buffers.
pub struct Configurator<R, W> {
    input: R,
    output: W,
}

impl<R, W> Configurator<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prompts for both answers and upserts the channel into `store`.
    ///
    /// # Errors
    ///
    /// [`Error::PromptClosed`] if input ends before an answer, [`Error::Io`]
    /// on terminal failures, and anything [`ConfigStore::upsert_channel`] returns.
    pub async fn run(&mut self, store: &ConfigStore) -> Result<Settings> {
        let name = self.ask(NICKNAME_PROMPT, "channel nickname").await?;
        let webhook_url = self.ask(WEBHOOK_PROMPT, "webhook url").await?;

        let settings = store.upsert_channel(&name, &webhook_url)?;
        info!(channel = %name, path = %store.path().display(), "Channel configured");
        Ok(settings)
    }

    async fn ask(&mut self, prompt: &str, what: &'static str) -> Result<String> {
        self.output
            .write_all(prompt.as_bytes())
            .await
            .map_err(terminal_error)?;
        self.output.flush().await.map_err(terminal_error)?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .await
            .map_err(terminal_error)?;
        if read == 0 {
            return Err(Error::PromptClosed(what));
        }
        Ok(line.trim().to_string())
    }
}

fn terminal_error(source: std::io::Error) -> Error {
    Error::Io {
        path: PathBuf::from("<terminal>"),
        source,
    }
}
