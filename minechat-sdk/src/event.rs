//! Status events emitted by the channels for the UI layer to consume.

use tokio::sync::mpsc;

/// Lifecycle of one connection attempt on one channel.
///
/// Within a channel the states are strictly ordered: `Initiated` always
/// precedes `Established` precedes `Closed`. There is no ordering guarantee
/// between the read and write channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// A connection attempt has started but the socket is not open yet.
    Initiated,
    /// The socket is open.
    Established,
    /// The channel loop has exited, by error or cancellation; the socket
    /// is closed.
    Closed,
}

impl ConnectionState {
    /// Human-readable label for status panels.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Initiated => "connection establishment...",
            ConnectionState::Established => "connection established",
            ConnectionState::Closed => "connection closed",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Events that the engine emits to the consumer (TUI, GUI, bot, etc.)
#[derive(Debug, Clone)]
pub enum StatusEvent {
    /// The read channel moved to a new connection state.
    ReadStateChanged(ConnectionState),

    /// The write channel moved to a new connection state.
    WriteStateChanged(ConnectionState),

    /// The auth handshake completed and the server confirmed our nickname.
    /// Emitted exactly once per successful connection attempt, before any
    /// outbound message is sent.
    NicknameReceived(String),
}

/// Sender half of the status queue.
pub type StatusTx = mpsc::UnboundedSender<StatusEvent>;

/// Reports one channel's state transitions and guarantees the terminal
/// `Closed` transition on every exit path.
///
/// The channel loops run inside the supervisor's `select!`; when a sibling
/// task faults they are cancelled by being dropped mid-await, so `Closed`
/// cannot be emitted by straight-line code. Dropping the guard emits it
/// instead, which covers error returns and cancellation alike.
pub(crate) struct StateGuard<'a> {
    status: &'a StatusTx,
    wrap: fn(ConnectionState) -> StatusEvent,
}

impl<'a> StateGuard<'a> {
    pub(crate) fn new(status: &'a StatusTx, wrap: fn(ConnectionState) -> StatusEvent) -> Self {
        Self { status, wrap }
    }

    pub(crate) fn report(&self, state: ConnectionState) {
        let _ = self.status.send((self.wrap)(state));
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        self.report(ConnectionState::Closed);
    }
}
