//! Write channel: authentication and outgoing messages.
//!
//! One connection to the write port per attempt. The channel authenticates
//! first, announces the confirmed nickname, then drains the send queue.
//! Keep-alive pings share the same merged sender as user messages, so the
//! two can never write concurrently on one socket; ordering on the wire is
//! first-dequeued-first-sent.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::auth;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::event::{ConnectionState, StateGuard, StatusEvent};
use crate::session::Sinks;
use crate::transport::LineStream;
use crate::watchdog::{Pulse, PulseTx};

/// Flatten user-entered text to a single protocol line by stripping
/// embedded newlines.
pub fn sanitize(text: &str) -> String {
    text.replace(['\n', '\r'], "")
}

/// Run the write channel for one connection attempt.
///
/// `authorized` is flipped once the auth handshake completes; the
/// supervisor reads it to decide whether the attempt counts as successful
/// when it later fails. A rejected token propagates as
/// [`Error::InvalidToken`] and ends the session for good.
pub async fn run_write_channel(
    config: &SessionConfig,
    token: &str,
    outbound: &mut mpsc::UnboundedReceiver<String>,
    sinks: &Sinks,
    pulse_tx: &PulseTx,
    authorized: &AtomicBool,
) -> Result<()> {
    let state = StateGuard::new(&sinks.status, StatusEvent::WriteStateChanged);
    state.report(ConnectionState::Initiated);

    let mut stream = LineStream::open(&config.host, config.write_port).await?;
    state.report(ConnectionState::Established);

    let credentials = auth::authorize(&mut stream, token).await?;
    authorized.store(true, Ordering::Relaxed);
    let _ = pulse_tx.send(Pulse("authorization done"));
    let _ = sinks
        .status
        .send(StatusEvent::NicknameReceived(credentials.nickname));

    let mut keep_alive = config.keep_alive_interval.map(|every| {
        // interval() fires immediately; the first ping should wait a full
        // period so it never races the handshake traffic.
        let mut interval = interval_at(Instant::now() + every, every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    loop {
        let message = match keep_alive.as_mut() {
            Some(interval) => tokio::select! {
                message = outbound.recv() => message.ok_or(Error::Shutdown)?,
                _ = interval.tick() => String::new(),
            },
            None => outbound.recv().await.ok_or(Error::Shutdown)?,
        };

        submit(&mut stream, &message).await?;
        let _ = pulse_tx.send(Pulse("message sent"));

        // One acknowledgement line per send keeps the protocol
        // duplex-synchronized; against a half-open peer this read is what
        // stalls the loop so the watchdog can notice the silence.
        let ack = stream.read_line().await?;
        tracing::trace!(line = ack.trim_end(), "server acknowledgement");
    }
}

/// Frame one outgoing message.
///
/// Non-empty text is a message line followed by a blank terminator line;
/// empty input is still framed, as the bare-newline keep-alive.
async fn submit(stream: &mut LineStream, text: &str) -> Result<()> {
    let text = sanitize(text);
    if text.is_empty() {
        stream.write_line("").await
    } else {
        tracing::debug!(message = %text, "sending message");
        stream.write_line(&text).await?;
        stream.write_line("").await
    }
}
