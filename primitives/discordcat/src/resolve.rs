//! Picks the webhook URL for an invocation.

use tracing::debug;

use crate::config::Settings;
use crate::error::{Error, Result};

/// Resolves the webhook URL to post to.
///
/// Precedence, highest first:
/// 1. a non-empty `webhook_url`, used verbatim without consulting `settings`;
/// 2. `channel` (or the default channel when `channel` is absent or empty),
///    looked up in `settings.channels`.
///
/// A channel mapped to an empty URL counts as unresolved.
///
/// # Errors
///
/// [`Error::UnknownChannel`] when nothing resolves.
pub fn resolve_webhook(
    webhook_url: Option<&str>,
    channel: Option<&str>,
    settings: &Settings,
) -> Result<String> {
    if let Some(url) = webhook_url.filter(|u| !u.is_empty()) {
        debug!("Using explicit webhook URL");
        return Ok(url.to_string());
    }

    let name = channel
        .filter(|c| !c.is_empty())
        .or(settings.default_channel.as_deref())
        .unwrap_or_default();

    match settings.channels.get(name) {
        Some(url) if !url.is_empty() => {
            debug!(channel = name, "Resolved channel");
            Ok(url.clone())
        }
        _ => Err(Error::UnknownChannel(name.to_string())),
    }
}
