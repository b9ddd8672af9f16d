//! Liveness watchdog.
//!
//! The two channels spend most of their time parked in blocking reads, so
//! a peer that stops talking without closing the socket would stall the
//! session forever. Both channels report a [`Pulse`] whenever they observe
//! traffic; the watchdog declares the session dead when the pulse queue
//! stays quiet for a whole window, and that fault is what makes the
//! supervisor tear the connection pair down and reconnect.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::error::{Error, Result};

/// Liveness marker with a short human-readable reason. The watchdog only
/// cares that pulses keep arriving; the reason is for the debug log.
#[derive(Debug, Clone, Copy)]
pub struct Pulse(pub &'static str);

/// Sender half of the pulse queue.
pub type PulseTx = mpsc::UnboundedSender<Pulse>;

/// Wait on the pulse queue forever, failing the session when a whole
/// `window` elapses without one.
///
/// The timeout is the fault this task exists to raise; it is never caught
/// here, and the supervisor classifies it as retryable.
pub async fn run_watchdog(
    window: Duration,
    pulses: &mut mpsc::UnboundedReceiver<Pulse>,
) -> Result<()> {
    loop {
        match timeout(window, pulses.recv()).await {
            Ok(Some(Pulse(reason))) => {
                tracing::debug!(reason, "connection is alive");
            }
            Ok(None) => return Err(Error::Shutdown),
            Err(_) => {
                tracing::warn!(window_ms = window.as_millis() as u64, "liveness timeout");
                return Err(Error::LivenessTimeout(window));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn quiet_queue_times_out() {
        let (_tx, mut rx) = mpsc::unbounded_channel::<Pulse>();
        let err = run_watchdog(Duration::from_millis(50), &mut rx)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LivenessTimeout(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn pulses_keep_it_running() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let feeder = tokio::spawn(async move {
            for _ in 0..5 {
                tokio::time::sleep(Duration::from_millis(20)).await;
                let _ = tx.send(Pulse("test traffic"));
            }
            // Dropping the sender ends the watchdog with Shutdown rather
            // than a timeout.
        });

        let err = run_watchdog(Duration::from_millis(100), &mut rx)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Shutdown));
        feeder.await.unwrap();
    }
}
