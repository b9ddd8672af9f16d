//! Read channel: the room feed.
//!
//! One connection to the read port per attempt. Every inbound line goes to
//! two sinks (trimmed of its trailing newline for display, untouched for
//! the history file) and feeds the watchdog one pulse. Faults are never
//! handled here; they bubble to the supervisor, which owns retry policy.

use crate::config::SessionConfig;
use crate::error::Result;
use crate::event::{ConnectionState, StateGuard, StatusEvent};
use crate::session::Sinks;
use crate::transport::LineStream;
use crate::watchdog::{Pulse, PulseTx};

/// Run the read channel for one connection attempt.
///
/// Emits `ReadStateChanged(Initiated | Established)` around the socket
/// open; `Closed` is emitted on every exit path, including cancellation by
/// the supervisor.
pub async fn run_read_channel(
    config: &SessionConfig,
    sinks: &Sinks,
    pulse_tx: &PulseTx,
) -> Result<()> {
    let state = StateGuard::new(&sinks.status, StatusEvent::ReadStateChanged);
    state.report(ConnectionState::Initiated);

    let mut stream = LineStream::open(&config.host, config.read_port).await?;
    state.report(ConnectionState::Established);

    loop {
        let line = stream.read_line().await?;
        let _ = pulse_tx.send(Pulse("new message in chat"));
        let _ = sinks.persist.send(line.clone());
        let _ = sinks
            .display
            .send(line.trim_end_matches(['\n', '\r']).to_string());
    }
}
