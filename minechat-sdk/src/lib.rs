//! Session engine for the minechat protocol.
//!
//! The chat server speaks a line-delimited UTF-8 text protocol over two
//! independent TCP connections: a read port that streams the room feed, and
//! a write port that authenticates a client and accepts its messages. This
//! crate owns the whole connection lifecycle:
//!
//! - [`transport`]: TCP line framing (one connection per channel).
//! - [`auth`]: the token handshake on the write port, plus new-account
//!   registration and the credentials file format.
//! - [`reader`] / [`writer`]: the two channel loops, decoupled from the
//!   presentation layer through unbounded [`tokio::sync::mpsc`] queues.
//! - [`watchdog`]: liveness tracking; the only way a half-open connection
//!   (socket up, peer silent) ever gets noticed.
//! - [`session`]: the supervisor that runs the three as one cancellation
//!   group and decides between reconnecting and giving up.
//!
//! Consumers hand [`session::run_session`] a [`session::Sinks`] bundle and
//! a receiver of outgoing text, then render whatever arrives on the display
//! and status queues. The engine never touches the screen or the log file.
//!
//! ## Reconnection
//!
//! Reconnection lives in exactly one place, the supervisor. Transient
//! faults (DNS, refused, reset, liveness timeout) are retried forever:
//! immediately for the first [`config::SessionConfig::attempts_before_backoff`]
//! failures, then with a fixed delay between attempts. A rejected token is
//! fatal and is never retried.

pub mod auth;
pub mod config;
pub mod error;
pub mod event;
pub mod reader;
pub mod session;
pub mod transport;
pub mod watchdog;
pub mod writer;

pub use auth::Credentials;
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use event::{ConnectionState, StatusEvent};
pub use session::{run_session, Sinks};
