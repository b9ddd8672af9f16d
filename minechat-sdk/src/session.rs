//! Session supervisor.
//!
//! Runs the read channel, write channel, and watchdog as one cancellation
//! group per connection attempt, then classifies whatever fault ended the
//! group: transient network failures reconnect (forever), a rejected token
//! or protocol violation propagates. Reconnection is decided here and only
//! here; the channels never retry on their own.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::event::StatusTx;
use crate::reader::run_read_channel;
use crate::watchdog::{run_watchdog, Pulse, PulseTx};
use crate::writer::run_write_channel;

/// The outbound queues a session writes into. The presentation layer
/// consumes `display` and `status`; the persistence layer consumes
/// `persist`. All unbounded: the only blocking points in the engine are
/// socket I/O, queue receives, and timers.
pub struct Sinks {
    /// Inbound chat lines, trailing newline trimmed.
    pub display: mpsc::UnboundedSender<String>,
    /// Inbound chat lines, raw, append-ready for the history file.
    pub persist: mpsc::UnboundedSender<String>,
    /// Connection state transitions and the confirmed nickname.
    pub status: StatusTx,
}

/// Run a chat session until it fails for good.
///
/// Retryable faults (DNS, refused, reset, liveness timeout) reconnect
/// indefinitely: the first `attempts_before_backoff` consecutive failures
/// retry immediately, after that each attempt is preceded by the fixed
/// `backoff` delay. An attempt that got through the auth handshake resets
/// the failure count. [`Error::InvalidToken`] and anything else
/// non-transient propagate to the caller, so this function only ever
/// returns an error.
pub async fn run_session(
    config: SessionConfig,
    token: String,
    sinks: Sinks,
    mut outbound: mpsc::UnboundedReceiver<String>,
) -> Result<()> {
    // A blank token can never authorize; fail before touching the network.
    if token.trim().is_empty() {
        tracing::error!("no account token configured");
        return Err(Error::InvalidToken);
    }

    let (pulse_tx, mut pulse_rx) = mpsc::unbounded_channel();
    let mut failed_attempts: u32 = 0;

    loop {
        if failed_attempts >= config.attempts_before_backoff {
            tracing::info!(
                delay_ms = config.backoff.as_millis() as u64,
                "delaying next connection attempt"
            );
            tokio::time::sleep(config.backoff).await;
        }

        // Pulses left over from the previous attempt must not count toward
        // the new one's liveness.
        while pulse_rx.try_recv().is_ok() {}

        let authorized = AtomicBool::new(false);
        let result = run_attempt(
            &config,
            &token,
            &sinks,
            &pulse_tx,
            &mut pulse_rx,
            &mut outbound,
            &authorized,
        )
        .await;

        match result {
            // The group runs until something faults; a clean return only
            // happens if a channel loop is ever given a way to finish.
            Ok(()) => return Ok(()),
            Err(err) if err.is_transient() => {
                if authorized.load(Ordering::Relaxed) {
                    failed_attempts = 0;
                } else {
                    failed_attempts += 1;
                }
                tracing::warn!(error = %err, failed_attempts, "connection lost, reconnecting");
            }
            Err(err) => {
                tracing::error!(error = %err, "unrecoverable session fault");
                return Err(err);
            }
        }
    }
}

/// One connection attempt: read channel, write channel and watchdog racing
/// in a single `select!`. The first task to exit wins; the losers are
/// dropped mid-await, which closes their sockets, so no socket ever
/// carries over into the next attempt.
async fn run_attempt(
    config: &SessionConfig,
    token: &str,
    sinks: &Sinks,
    pulse_tx: &PulseTx,
    pulse_rx: &mut mpsc::UnboundedReceiver<Pulse>,
    outbound: &mut mpsc::UnboundedReceiver<String>,
    authorized: &AtomicBool,
) -> Result<()> {
    if config.watchdog_enabled {
        tokio::select! {
            result = run_read_channel(config, sinks, pulse_tx) => result,
            result = run_write_channel(config, token, outbound, sinks, pulse_tx, authorized) => result,
            result = run_watchdog(config.watchdog_window, pulse_rx) => result,
        }
    } else {
        tokio::select! {
            result = run_read_channel(config, sinks, pulse_tx) => result,
            result = run_write_channel(config, token, outbound, sinks, pulse_tx, authorized) => result,
        }
    }
}
