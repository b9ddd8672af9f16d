//! Session configuration.

use std::time::Duration;

/// Default read-port (room feed) for a minechat server.
pub const DEFAULT_READ_PORT: u16 = 5000;
/// Default write-port (auth + outgoing messages).
pub const DEFAULT_WRITE_PORT: u16 = 5050;

/// Tunables for one chat session.
///
/// The historical client variants (with/without watchdog, with/without
/// keep-alive pings, with/without bounded retry) are all expressed through
/// this one struct instead of separate code paths.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Chat server host name or address.
    pub host: String,
    /// Port streaming the room feed (server -> client only).
    pub read_port: u16,
    /// Port accepting authentication and outgoing messages.
    pub write_port: u16,
    /// Whether the liveness watchdog runs at all.
    pub watchdog_enabled: bool,
    /// How long the watchdog tolerates silence before it declares the
    /// session dead.
    pub watchdog_window: Duration,
    /// Interval between keep-alive pings on an idle write channel.
    /// `None` disables keep-alives.
    pub keep_alive_interval: Option<Duration>,
    /// Delay inserted between reconnect attempts once the grace period of
    /// immediate retries is used up.
    pub backoff: Duration,
    /// How many consecutive failed attempts reconnect immediately before
    /// the backoff delay kicks in.
    pub attempts_before_backoff: u32,
}

impl SessionConfig {
    /// Config for `host` with the default ports and policy.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            read_port: DEFAULT_READ_PORT,
            write_port: DEFAULT_WRITE_PORT,
            watchdog_enabled: true,
            watchdog_window: Duration::from_secs(3),
            keep_alive_interval: Some(Duration::from_secs(2)),
            backoff: Duration::from_secs(3),
            attempts_before_backoff: 2,
        }
    }
}
