//! Account credentials and the write-port handshakes.
//!
//! The write port runs a fixed greeting/prompt choreography before it
//! accepts messages. Two entry points exist: [`authorize`] replays a
//! previously issued token, [`register`] asks the server to mint a new
//! account. Both leave the caller-owned stream behind; on failure the
//! caller closes it by dropping it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transport::LineStream;
use crate::writer::sanitize;

/// Credentials issued by the server at registration.
///
/// The `account_hash` is an opaque token replayed verbatim on every
/// connection; the engine never interprets it. Immutable for the lifetime
/// of a session and re-used across reconnect attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Server-assigned nickname.
    pub nickname: String,
    /// Opaque auth token.
    pub account_hash: String,
}

impl Credentials {
    /// Load credentials from a JSON file written by [`Credentials::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| Error::Protocol {
            message: format!("credentials file {}: {e}", path.display()),
        })
    }

    /// Write credentials as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let raw = serde_json::to_string_pretty(self).map_err(|e| Error::Protocol {
            message: format!("serializing credentials: {e}"),
        })?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

/// Authenticate on a freshly opened write-port stream.
///
/// Exchange: read the greeting, send the token line, read the JSON
/// credentials reply, read the welcome line. A JSON `null` reply means the
/// server does not know the token; that is [`Error::InvalidToken`] and is
/// never worth retrying. On success the stream is positioned immediately
/// after the welcome line, ready for message traffic.
pub async fn authorize(stream: &mut LineStream, token: &str) -> Result<Credentials> {
    let greeting = stream.read_line().await?;
    tracing::debug!(line = greeting.trim_end(), "server greeting");

    stream.write_line(token).await?;

    let reply = stream.read_line().await?;
    let credentials: Option<Credentials> =
        serde_json::from_str(reply.trim_end()).map_err(|e| Error::Protocol {
            message: format!("credentials line is not JSON: {e}"),
        })?;
    let Some(credentials) = credentials else {
        return Err(Error::InvalidToken);
    };

    let welcome = stream.read_line().await?;
    tracing::debug!(line = welcome.trim_end(), "post-auth welcome");

    tracing::info!(nickname = %credentials.nickname, "authorized");
    Ok(credentials)
}

/// Register a new account on a freshly opened write-port stream.
///
/// Sending an empty line instead of a token asks the server for a new
/// account; it answers with a nickname prompt, takes the desired nickname
/// (flattened to one line), and replies with freshly minted credentials.
pub async fn register(stream: &mut LineStream, nickname: &str) -> Result<Credentials> {
    let greeting = stream.read_line().await?;
    tracing::debug!(line = greeting.trim_end(), "server greeting");

    stream.write_line("").await?;

    let prompt = stream.read_line().await?;
    tracing::debug!(line = prompt.trim_end(), "nickname prompt");

    stream.write_line(&sanitize(nickname)).await?;

    let reply = stream.read_line().await?;
    let credentials: Credentials =
        serde_json::from_str(reply.trim_end()).map_err(|e| Error::Protocol {
            message: format!("registration reply is not JSON: {e}"),
        })?;

    tracing::info!(nickname = %credentials.nickname, "registered new account");
    Ok(credentials)
}
